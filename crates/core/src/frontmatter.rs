//! YAML frontmatter.
//!
//! The block is read into a JSON object so derived metadata (`minutes`,
//! `words`, `excerpt`) can be written next to author-supplied keys.

use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

/// Frontmatter of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Frontmatter {
    /// Parsed block; always a JSON object.
    pub value: JsonValue,
    /// Byte offset where the markdown body starts.
    pub body_start: usize,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            value: JsonValue::Object(Map::new()),
            body_start: 0,
        }
    }
}

/// Errors from reading a frontmatter block.
#[derive(Debug, Error)]
pub enum FrontmatterError {
    /// Opening `---` without a closing one.
    #[error("Unterminated YAML frontmatter block: expected closing '---'")]
    Unterminated,
    /// YAML failed to parse.
    #[error("Frontmatter parse error: {0}")]
    Parse(String),
    /// Top-level YAML node was not a mapping.
    #[error("Frontmatter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// Reads the leading frontmatter block of `input`, if any.
///
/// Leading blank lines and a byte order mark may precede the opening fence.
pub fn extract_frontmatter(input: &str) -> Result<Frontmatter, FrontmatterError> {
    let Some(block) = locate(input)? else {
        return Ok(Frontmatter::default());
    };
    Ok(Frontmatter {
        value: parse_yaml(&input[block.yaml_start..block.yaml_end])?,
        body_start: block.body_start,
    })
}

/// Length of the leading frontmatter block including its fences, or 0 when
/// there is no complete block.
pub fn frontmatter_len(input: &str) -> usize {
    match locate(input) {
        Ok(Some(block)) => block.body_start,
        _ => 0,
    }
}

struct Block {
    yaml_start: usize,
    yaml_end: usize,
    body_start: usize,
}

/// Lines of `input` with their starting byte offsets.
fn lines_with_offsets(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input.split_inclusive('\n').scan(0usize, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

fn locate(input: &str) -> Result<Option<Block>, FrontmatterError> {
    let bom = if input.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };
    let mut lines = lines_with_offsets(&input[bom..]).skip_while(|(_, line)| line.trim().is_empty());

    let Some((open_at, open_line)) = lines.next() else {
        return Ok(None);
    };
    if !is_fence(open_line) {
        return Ok(None);
    }
    let yaml_start = bom + open_at + open_line.len();

    for (at, line) in lines {
        if is_fence(line) {
            return Ok(Some(Block {
                yaml_start,
                yaml_end: bom + at,
                body_start: bom + at + line.len(),
            }));
        }
    }
    Err(FrontmatterError::Unterminated)
}

fn parse_yaml(block: &str) -> Result<JsonValue, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(JsonValue::Object(Map::new()));
    }
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|err| FrontmatterError::Parse(err.to_string()))?;
    match serde_json::to_value(yaml).map_err(|err| FrontmatterError::Parse(err.to_string()))? {
        JsonValue::Null => Ok(JsonValue::Object(Map::new())),
        value @ JsonValue::Object(_) => Ok(value),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_block_means_empty_object() {
        let fm = extract_frontmatter("# Title\nBody").unwrap();
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(frontmatter_len("# Title"), 0);
    }

    #[test]
    fn reads_mapping_and_body_offset() {
        let input = "---\ntitle: Example\ntags:\n  - rust\n---\n# Content";
        let fm = extract_frontmatter(input).unwrap();
        assert_eq!(fm.value["title"], "Example");
        assert_eq!(fm.value["tags"][0], "rust");
        assert_eq!(fm.body_start, input.find("# Content").unwrap());
        assert_eq!(frontmatter_len(input), fm.body_start);
    }

    #[test]
    fn empty_block_and_crlf() {
        let input = "---\r\n---\r\nBody";
        let fm = extract_frontmatter(input).unwrap();
        assert_eq!(fm.value, JsonValue::Object(Map::new()));
        assert_eq!(&input[fm.body_start..], "Body");
    }

    #[test]
    fn bom_and_blank_lines_before_fence() {
        let input = "\u{feff}\n   \n---\nfoo: bar\n---\nBody";
        let fm = extract_frontmatter(input).unwrap();
        assert_eq!(fm.value["foo"], "bar");
        assert_eq!(&input[fm.body_start..], "Body");
    }

    #[test]
    fn rejects_bad_blocks() {
        assert!(matches!(
            extract_frontmatter("---\ninvalid: [x\n---\n"),
            Err(FrontmatterError::Parse(_))
        ));
        assert!(matches!(
            extract_frontmatter("---\ntitle: test"),
            Err(FrontmatterError::Unterminated)
        ));
        assert!(matches!(
            extract_frontmatter("---\n- a\n- b\n---\n"),
            Err(FrontmatterError::InvalidRootType)
        ));
        assert_eq!(frontmatter_len("---\ntitle: test"), 0);
    }
}
