//! Line-level tracking of literal blocks.
//!
//! Directive syntax inside code and raw HTML must survive untouched, so the
//! preprocessor feeds every line through [`LiteralBlocks`] first. Fences are
//! tracked by [`FenceTracker`]; indented code, raw HTML blocks and fences
//! inside blockquotes are layered on top of it.

/// Open fence: marker character, opening run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenFence {
    marker: char,
    length: usize,
}

/// Tracks whether the current line belongs to a fenced code block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    /// Creates a tracker outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while inside a fence.
    pub fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feeds one line. Returns true if the line is part of a fence (opener,
    /// content, or closer) and must be passed through verbatim.
    pub fn observe(&mut self, line: &str) -> bool {
        let (columns, offset) = indentation(line);
        let rest = &line[offset..];

        match self.open {
            None => {
                // 4+ columns is indented code, not a fence.
                if columns > 3 {
                    return false;
                }
                match fence_run(rest) {
                    Some((marker, length)) => {
                        if marker == '`' && rest[length..].contains('`') {
                            return false;
                        }
                        self.open = Some(OpenFence { marker, length });
                        true
                    }
                    None => false,
                }
            }
            Some(open) => {
                if columns <= 3
                    && let Some((marker, length)) = fence_run(rest)
                    && marker == open.marker
                    && length >= open.length
                    && rest[length..].trim().is_empty()
                {
                    self.open = None;
                }
                true
            }
        }
    }
}

/// How a raw HTML block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HtmlEnd {
    /// First line containing this text (ASCII case-insensitive).
    Marker(&'static str),
    /// Next blank line.
    BlankLine,
}

/// Tags that start an HTML block ending at a blank line.
const HTML_BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption", "center",
    "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link", "main", "menu",
    "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param", "search", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title", "tr", "track", "ul",
];

/// Tags whose HTML block runs to the matching closing tag.
const HTML_RAW_TAGS: &[(&str, &str)] = &[
    ("pre", "</pre>"),
    ("script", "</script>"),
    ("style", "</style>"),
    ("textarea", "</textarea>"),
];

/// Classifies lines whose content markdown keeps literal: fenced code (also
/// inside blockquotes), indented code and raw HTML blocks.
///
/// This is a line-level approximation of CommonMark block structure. List
/// item content offsets are tracked so indented list paragraphs are not
/// mistaken for code.
#[derive(Debug, Clone)]
pub struct LiteralBlocks {
    raw_html: bool,
    fence: FenceTracker,
    /// Quote depth and content offset of the open fence.
    fence_at: (usize, usize),
    /// End condition and quote depth of the open HTML block.
    html: Option<(HtmlEnd, usize)>,
    /// Content columns of the enclosing list items.
    lists: Vec<usize>,
    depth: usize,
    paragraph: bool,
}

impl LiteralBlocks {
    /// Creates a tracker at the start of a document. `raw_html` mirrors
    /// whether the parser recognizes HTML blocks.
    pub fn new(raw_html: bool) -> Self {
        Self {
            raw_html,
            fence: FenceTracker::new(),
            fence_at: (0, 0),
            html: None,
            lists: Vec::new(),
            depth: 0,
            paragraph: false,
        }
    }

    /// Feeds one line. Returns true if the line belongs to a literal block
    /// and must be passed through verbatim.
    pub fn observe(&mut self, line: &str) -> bool {
        let (depth, content) = strip_quote_markers(line);
        if depth != self.depth {
            if depth < self.depth {
                if self.fence.in_fence() && depth < self.fence_at.0 {
                    self.fence = FenceTracker::new();
                }
                if matches!(self.html, Some((_, opened)) if depth < opened) {
                    self.html = None;
                }
            }
            self.lists.clear();
            self.depth = depth;
        }
        let blank = content.trim().is_empty();

        if let Some((end, _)) = self.html {
            match end {
                HtmlEnd::BlankLine if blank => {
                    self.html = None;
                    self.paragraph = false;
                    return false;
                }
                HtmlEnd::BlankLine => {}
                HtmlEnd::Marker(marker) => {
                    if contains_ignore_case(content, marker) {
                        self.html = None;
                    }
                }
            }
            return true;
        }

        if self.fence.in_fence() {
            self.fence.observe(strip_columns(content, self.fence_at.1));
            return true;
        }

        if blank {
            self.paragraph = false;
            return false;
        }

        let (columns, _) = indentation(content);
        if !self.paragraph || list_marker_width(content.trim_start()).is_some() {
            while self.lists.last().is_some_and(|width| columns < *width) {
                self.lists.pop();
            }
        }
        let base = self.lists.last().copied().unwrap_or(0);
        let relative = columns.saturating_sub(base);
        let rest = strip_columns(content, base);

        if relative >= 4 {
            return !self.paragraph;
        }

        if self.fence.observe(rest) {
            self.fence_at = (depth, base);
            self.paragraph = false;
            return true;
        }

        let trimmed = rest.trim_start();
        if self.raw_html
            && let Some(end) = html_block_start(trimmed, self.paragraph)
        {
            let closed = match end {
                HtmlEnd::Marker(marker) => contains_ignore_case(&trimmed[1..], marker),
                HtmlEnd::BlankLine => false,
            };
            if !closed {
                self.html = Some((end, depth));
            }
            self.paragraph = false;
            return true;
        }

        if let Some(width) = list_marker_width(trimmed) {
            self.lists.push(columns + width);
            self.paragraph = true;
            return false;
        }

        self.paragraph = !(trimmed.starts_with('#') || trimmed.starts_with("::"));
        false
    }
}

/// Strips blockquote markers. Returns the quote depth and the rest.
fn strip_quote_markers(line: &str) -> (usize, &str) {
    let mut depth = 0;
    let mut rest = line;
    loop {
        let (columns, offset) = indentation(rest);
        match rest[offset..].strip_prefix('>') {
            Some(after) if columns <= 3 => {
                depth += 1;
                rest = after.strip_prefix(' ').unwrap_or(after);
            }
            _ => return (depth, rest),
        }
    }
}

/// Drops up to `columns` columns of leading whitespace.
fn strip_columns(text: &str, columns: usize) -> &str {
    let mut seen = 0;
    for (offset, byte) in text.bytes().enumerate() {
        if seen >= columns {
            return &text[offset..];
        }
        match byte {
            b' ' => seen += 1,
            b'\t' => seen += 4 - seen % 4,
            _ => return &text[offset..],
        }
    }
    &text[text.len()..]
}

/// Width of a list item marker plus its following spaces, if `text` starts
/// with one.
fn list_marker_width(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let marker = match bytes.first()? {
        b'-' | b'*' | b'+' => 1,
        b'0'..=b'9' => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            match bytes.get(digits) {
                Some(b'.' | b')') if digits <= 9 => digits + 1,
                _ => return None,
            }
        }
        _ => return None,
    };
    let spaces = bytes[marker..].iter().take_while(|b| **b == b' ').count();
    match spaces {
        0 if marker < bytes.len() => None,
        0 => Some(marker + 1),
        1..=4 => Some(marker + spaces),
        _ => Some(marker + 1),
    }
}

/// End condition of the HTML block started by `line`, if any. Generic tags
/// cannot interrupt a paragraph.
fn html_block_start(line: &str, in_paragraph: bool) -> Option<HtmlEnd> {
    let after = line.strip_prefix('<')?;
    if after.starts_with("!--") {
        return Some(HtmlEnd::Marker("-->"));
    }
    if after.starts_with('?') {
        return Some(HtmlEnd::Marker("?>"));
    }
    if after.starts_with("![CDATA[") {
        return Some(HtmlEnd::Marker("]]>"));
    }
    if after
        .strip_prefix('!')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic()))
    {
        return Some(HtmlEnd::Marker(">"));
    }

    let (closing, name_start) = match after.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, after),
    };
    let name_len = name_start
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
        .count();
    if name_len == 0 || !name_start.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let name = name_start[..name_len].to_ascii_lowercase();
    let tail = &name_start[name_len..];

    let delimited = tail.is_empty() || tail.starts_with([' ', '\t', '>']);
    if !closing
        && delimited
        && let Some((_, end)) = HTML_RAW_TAGS.iter().find(|(tag, _)| *tag == name)
    {
        return Some(HtmlEnd::Marker(*end));
    }
    if HTML_BLOCK_TAGS.contains(&name.as_str()) && (delimited || tail.starts_with("/>")) {
        return Some(HtmlEnd::BlankLine);
    }

    let whole = line.trim_end();
    let tag_like = !tail.is_empty() && (delimited || tail.starts_with("/>"));
    if !in_paragraph && tag_like && whole.ends_with('>') && !whole[1..].contains('<') {
        return Some(HtmlEnd::BlankLine);
    }
    None
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}

/// Visual columns and byte length of leading whitespace. Tabs advance to the
/// next multiple of four.
fn indentation(line: &str) -> (usize, usize) {
    let mut columns = 0;
    for (offset, byte) in line.bytes().enumerate() {
        match byte {
            b' ' => columns += 1,
            b'\t' => columns += 4 - columns % 4,
            _ => return (columns, offset),
        }
    }
    (columns, line.len())
}

/// Marker and length of a run of three or more backticks or tildes.
fn fence_run(text: &str) -> Option<(char, usize)> {
    let marker = text.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let length = text.chars().take_while(|c| *c == marker).count();
    (length >= 3).then_some((marker, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(lines: &[&str]) -> Vec<bool> {
        let mut tracker = FenceTracker::new();
        lines.iter().map(|line| tracker.observe(line)).collect()
    }

    #[test]
    fn backtick_fence_covers_opener_to_closer() {
        assert_eq!(
            feed(&["before", "```js", ":::note", "```", "after"]),
            vec![false, true, true, true, false]
        );
    }

    #[test]
    fn closer_needs_same_marker_and_enough_length() {
        let mut tracker = FenceTracker::new();
        tracker.observe("````markdown");
        assert!(tracker.observe("```"));
        assert!(tracker.in_fence());
        assert!(tracker.observe("~~~~"));
        assert!(tracker.in_fence());
        assert!(tracker.observe("`````"));
        assert!(!tracker.in_fence());
    }

    #[test]
    fn info_string_does_not_close() {
        let mut tracker = FenceTracker::new();
        tracker.observe("~~~");
        tracker.observe("~~~ts");
        assert!(tracker.in_fence());
        tracker.observe("  ~~~");
        assert!(!tracker.in_fence());
    }

    #[test]
    fn indented_markers_do_not_open() {
        assert_eq!(feed(&["    ```", "\t```", "   ```"]), vec![false, false, true]);
    }

    #[test]
    fn two_markers_or_inline_code_do_not_open() {
        assert_eq!(feed(&["``", "```a` b```"]), vec![false, false]);
    }

    fn literal(lines: &[&str]) -> Vec<bool> {
        let mut blocks = LiteralBlocks::new(true);
        lines.iter().map(|line| blocks.observe(line)).collect()
    }

    #[test]
    fn indented_code_needs_a_break_from_paragraphs() {
        assert_eq!(
            literal(&["Example:", "", "    :::note", "    Body", "", "    :::", "after"]),
            vec![false, false, true, true, false, true, false]
        );
        assert_eq!(literal(&["Text", "    continued"]), vec![false, false]);
        assert_eq!(literal(&["# Title", "    code"]), vec![false, true]);
    }

    #[test]
    fn list_content_is_not_indented_code() {
        assert_eq!(
            literal(&["1. Step", "", "    :::note", "    x", "    :::", "", "        code"]),
            vec![false, false, false, false, false, false, true]
        );
        assert_eq!(literal(&["- item", "", "text", "", "    code"]), vec![false, false, false, false, true]);
    }

    #[test]
    fn fences_inside_blockquotes() {
        assert_eq!(
            literal(&["> ```md", "> Use :kbd[x]{} here", "> ```", "> :kbd[y]"]),
            vec![true, true, true, false]
        );
    }

    #[test]
    fn quoted_fence_ends_with_the_quote() {
        assert_eq!(literal(&["> ```", "> a", "", "b"]), vec![true, true, false, false]);
    }

    #[test]
    fn html_blocks_run_to_their_end_condition() {
        assert_eq!(
            literal(&["<div>", "Press :kbd[Ctrl] now", "</div>", "", ":kbd[x]"]),
            vec![true, true, true, false, false]
        );
        assert_eq!(
            literal(&["<!--", ":::note", "-->", ":kbd[x]"]),
            vec![true, true, true, false]
        );
        assert_eq!(
            literal(&["<pre>", "", ":kbd[x]", "</PRE>", "after"]),
            vec![true, true, true, true, false]
        );
        assert_eq!(literal(&["<!-- one line -->", "x"]), vec![true, false]);
    }

    #[test]
    fn inline_html_does_not_start_a_block() {
        assert_eq!(literal(&["Text", "<span>x</span>"]), vec![false, false]);
        assert_eq!(literal(&["<span>a</span> :kbd[x]"]), vec![false]);
        assert_eq!(literal(&["<custom-tag>", "x"]), vec![true, true]);
        assert_eq!(literal(&["<https://example.com>", ":kbd[x]"]), vec![false, false]);
    }

    #[test]
    fn html_is_ignored_when_disabled() {
        let mut blocks = LiteralBlocks::new(false);
        assert!(!blocks.observe("<div>"));
        assert!(!blocks.observe("Press :kbd[Ctrl] now"));
    }
}
