//! Directive syntax preprocessing.
//!
//! markdown-rs has no directive extension, so directive syntax is replaced
//! by placeholder tokens before parsing and turned back into directive nodes
//! by the mdast adapter. Tokens are built from private-use characters that
//! markdown never interprets:
//!
//! ```text
//! :::note[Title]{.wide}          ###### \u{E000}0\u{E001}
//! Content                  =>    Content
//! :::                            ###### \u{E000}/\u{E001}
//!
//! ::github{repo="a/b"}           ###### \u{E000}1\u{E001}
//! Press :kbd[Ctrl]{} now.        Press \u{E000}2\u{E001} now.
//! ```
//!
//! Block markers are single-line ATX headings, so they interrupt paragraphs
//! the way directive fences do and every input line still maps to exactly one
//! output line. The number in a token indexes [`Preprocessed::openings`].

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::code_fence::LiteralBlocks;
use crate::error::{Diagnostics, ParseWarning, SourceLocation};
use crate::tree::{DirectiveKind, is_valid_directive_name};

/// Starts a placeholder token.
pub const TOKEN_START: char = '\u{E000}';
/// Ends a placeholder token.
pub const TOKEN_END: char = '\u{E001}';

const BLOCK_PREFIX: &str = "###### ";

/// Parsed directive syntax (`:::name[label]{attrs}` and friends).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectiveOpening {
    /// Directive shape.
    pub kind: DirectiveKind,
    /// Directive name as written.
    pub name: String,
    /// Label captured from bracket syntax `[...]`.
    pub label: Option<String>,
    /// Raw attribute source (without surrounding braces).
    pub raw_attrs: String,
    /// Where the directive starts in the original source.
    pub location: SourceLocation,
    /// The directive as written.
    pub source: String,
}

/// A placeholder token found in parsed text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token {
    /// Opening of the directive at this index.
    Open(usize),
    /// End of the innermost open container.
    Close,
}

impl Token {
    fn write(self, out: &mut String) {
        match self {
            Token::Open(index) => write!(out, "{}{}{}", TOKEN_START, index, TOKEN_END).ok(),
            Token::Close => write!(out, "{}/{}", TOKEN_START, TOKEN_END).ok(),
        };
    }

    /// Parses text consisting of exactly one token.
    pub fn parse(text: &str) -> Option<Token> {
        let inner = text.strip_prefix(TOKEN_START)?.strip_suffix(TOKEN_END)?;
        if inner == "/" {
            return Some(Token::Close);
        }
        inner.parse().ok().map(Token::Open)
    }
}

/// Piece of a text value split around inline tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text.
    Text(&'a str),
    /// An inline token.
    Token(Token),
}

/// Splits `text` around placeholder tokens. Malformed tokens stay text.
pub fn split_tokens(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(TOKEN_START) {
        let after = &rest[start..];
        let token = after
            .find(TOKEN_END)
            .and_then(|end| Token::parse(&after[..end + TOKEN_END.len_utf8()]).map(|t| (t, end)));
        match token {
            Some((token, end)) => {
                if start > 0 {
                    segments.push(Segment::Text(&rest[..start]));
                }
                segments.push(Segment::Token(token));
                rest = &after[end + TOKEN_END.len_utf8()..];
            }
            None => {
                let skip = start + TOKEN_START.len_utf8();
                segments.push(Segment::Text(&rest[..skip]));
                rest = &rest[skip..];
            }
        }
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    segments
}

/// Result of [`preprocess_directives`].
#[derive(Debug, Default)]
pub struct Preprocessed {
    /// Rewritten markdown.
    pub text: String,
    /// Every directive found, indexed by its token number.
    pub openings: Vec<DirectiveOpening>,
    /// Warnings such as auto-closed containers.
    pub diagnostics: Diagnostics,
}

/// Parses a container opening line such as `:::note[Title]{#id .class}`.
///
/// Three or more colons open a container; the bare closer (`:::`) is not an
/// opening.
pub fn parse_container_opening(line: &str) -> Option<DirectiveOpening> {
    let trimmed = line.trim();
    let colons = trimmed.chars().take_while(|c| *c == ':').count();
    if colons < 3 {
        return None;
    }
    let mut opening = parse_syntax(&trimmed[colons..], DirectiveKind::Container, true)?;
    opening.source = trimmed.to_string();
    Some(opening)
}

/// Parses a leaf directive line such as `::github{repo="owner/repo"}`.
///
/// The directive must be the only content of the line.
pub fn parse_leaf_directive(line: &str) -> Option<DirectiveOpening> {
    let trimmed = line.trim();
    let rest = trimmed.strip_prefix("::")?;
    if rest.starts_with(':') {
        return None;
    }
    let (mut opening, consumed) = parse_syntax_prefix(rest, DirectiveKind::Leaf)?;
    if !rest[consumed..].trim().is_empty() {
        return None;
    }
    opening.source = trimmed.to_string();
    Some(opening)
}

/// Check if a line is a container closer (`:::`, or more colons).
pub fn is_directive_closer(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3 && trimmed.chars().all(|c| c == ':')
}

/// Parses `name[label]{attrs}` (or the legacy `name[label] key="v"` form when
/// `trailing_attrs` is set).
fn parse_syntax(input: &str, kind: DirectiveKind, trailing_attrs: bool) -> Option<DirectiveOpening> {
    let (mut opening, consumed) = parse_syntax_prefix(input, kind)?;
    let remaining = input[consumed..].trim();
    if !remaining.is_empty() {
        if !trailing_attrs || !opening.raw_attrs.is_empty() {
            return None;
        }
        opening.raw_attrs = remaining.to_string();
    }
    Some(opening)
}

/// Parses a marker starting at the directive name. Returns the opening and
/// the number of bytes consumed.
fn parse_syntax_prefix(input: &str, kind: DirectiveKind) -> Option<(DirectiveOpening, usize)> {
    let name_len = input
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(input.len());
    let name = &input[..name_len];
    if !is_valid_directive_name(name) {
        return None;
    }

    let mut cursor = name_len;
    let mut label = None;
    if input[cursor..].starts_with('[') {
        let end = find_balanced(&input[cursor..], '[', ']')?;
        label = Some(input[cursor + 1..cursor + end].to_string());
        cursor += end + 1;
    }

    let mut raw_attrs = String::new();
    if input[cursor..].starts_with('{') {
        let end = find_attrs_end(&input[cursor..])?;
        raw_attrs = input[cursor + 1..cursor + end].trim().to_string();
        cursor += end + 1;
    }

    Some((
        DirectiveOpening {
            kind,
            name: name.to_string(),
            label,
            raw_attrs,
            location: SourceLocation::new(1, 1),
            source: String::new(),
        },
        cursor,
    ))
}

/// Byte index of the bracket closing the one at index 0.
fn find_balanced(input: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Byte index of the `}` closing an attribute block, honoring quotes.
fn find_attrs_end(input: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in input.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '}') => return Some(i),
            (None, '{') => return None,
            _ => {}
        }
    }
    None
}

/// Tokenize attributes respecting quoted values.
/// Splits on whitespace but keeps quoted strings intact.
fn tokenize_attrs(attrs: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut token_start: Option<usize> = None;
    let mut in_quotes = false;
    let mut quote_char = '"';

    for (i, c) in attrs.char_indices() {
        match c {
            '"' | '\'' if !in_quotes => {
                if token_start.is_none() {
                    token_start = Some(i);
                }
                in_quotes = true;
                quote_char = c;
            }
            c if c == quote_char && in_quotes => {
                in_quotes = false;
            }
            c if c.is_whitespace() && !in_quotes => {
                if let Some(start) = token_start {
                    let token = &attrs[start..i];
                    if !token.is_empty() {
                        tokens.push(token);
                    }
                    token_start = None;
                }
            }
            _ => {
                if token_start.is_none() {
                    token_start = Some(i);
                }
            }
        }
    }

    // Capture final token
    if let Some(start) = token_start {
        let token = &attrs[start..];
        if !token.is_empty() {
            tokens.push(token);
        }
    }

    tokens
}

/// Parses directive attribute syntax into key/value pairs, in source order.
///
/// Supports `#id`, `.class`, `key="value"`, `key='value'`, `key=value`, and
/// bare `key` (empty value). Surrounding braces are optional.
pub fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix('{')
        .and_then(|inner| inner.strip_suffix('}'))
        .unwrap_or(raw);

    let mut attributes = Vec::new();
    for token in tokenize_attrs(raw) {
        if let Some(id) = token.strip_prefix('#') {
            if !id.is_empty() {
                attributes.push(("id".to_string(), id.to_string()));
            }
            continue;
        }
        if let Some(class) = token.strip_prefix('.') {
            if !class.is_empty() {
                attributes.push(("class".to_string(), class.to_string()));
            }
            continue;
        }
        match token.split_once('=') {
            Some((key, value)) => {
                let key = key.trim();
                if key.is_empty() {
                    continue;
                }
                attributes.push((key.to_string(), unquote(value.trim()).to_string()));
            }
            None => attributes.push((token.to_string(), String::new())),
        }
    }
    attributes
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Replaces text directives (`:name[label]{attrs}`) in one line with inline
/// tokens, pushing each one onto `openings`.
///
/// A text directive needs a label or an attribute block, must not follow an
/// alphanumeric character or another colon, and is ignored inside inline
/// code spans.
pub fn rewrite_text_directives<'a>(
    line: &'a str,
    line_number: usize,
    openings: &mut Vec<DirectiveOpening>,
) -> Cow<'a, str> {
    if !line.contains(':') {
        return Cow::Borrowed(line);
    }

    let mut output = String::with_capacity(line.len());
    let mut cursor = 0usize;
    let mut code_ticks: Option<usize> = None;
    let bytes = line.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'`' {
            let run = bytes[i..].iter().take_while(|c| **c == b'`').count();
            code_ticks = match code_ticks {
                None => Some(run),
                Some(open) if open == run => None,
                other => other,
            };
            i += run;
            continue;
        }

        if b == b':' && code_ticks.is_none() {
            let prev_ok = i == 0 || {
                let prev = bytes[i - 1];
                !(prev.is_ascii_alphanumeric() || prev == b':' || prev == b'\\')
            };
            if prev_ok
                && let Some((mut opening, consumed)) =
                    parse_syntax_prefix(&line[i + 1..], DirectiveKind::Text)
                && (opening.label.is_some() || line[..i + 1 + consumed].ends_with('}'))
            {
                opening.location = SourceLocation::new(line_number, line[..i].chars().count() + 1);
                opening.source = line[i..i + 1 + consumed].to_string();
                output.push_str(&line[cursor..i]);
                Token::Open(openings.len()).write(&mut output);
                openings.push(opening);
                i += 1 + consumed;
                cursor = i;
                continue;
            }
        }
        i += 1;
    }

    if cursor == 0 {
        return Cow::Borrowed(line);
    }
    output.push_str(&line[cursor..]);
    Cow::Owned(output)
}

fn write_block_token(output: &mut String, indent: &str, token: Token) {
    output.push_str(indent);
    output.push_str(BLOCK_PREFIX);
    token.write(output);
    output.push('\n');
}

/// Puts the written directive back in place of every token in `text`.
///
/// Used for literal values (code, raw HTML) where a token must never
/// surface. A block token line becomes the directive line again and a
/// closer becomes `:::`.
pub fn restore_tokens<'a>(text: &'a str, openings: &[DirectiveOpening]) -> Cow<'a, str> {
    if !text.contains(TOKEN_START) {
        return Cow::Borrowed(text);
    }
    let written = |token: Token| match token {
        Token::Open(index) => openings.get(index).map(|opening| opening.source.as_str()),
        Token::Close => Some(":::"),
    };

    let mut output = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        let indent = &body[..body.len() - body.trim_start().len()];
        if let Some(token) = body.trim_start().strip_prefix(BLOCK_PREFIX).and_then(Token::parse)
            && let Some(source) = written(token)
        {
            output.push_str(indent);
            output.push_str(source);
            output.push_str(&line[body.len()..]);
            continue;
        }
        for segment in split_tokens(line) {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Token(token) => match written(token) {
                    Some(source) => output.push_str(source),
                    None => token.write(&mut output),
                },
            }
        }
    }
    Cow::Owned(output)
}

/// Replaces directive syntax outside literal blocks with placeholder tokens.
///
/// Fenced and indented code are left alone, and so are raw HTML blocks when
/// `raw_html` is set. Container directives nest; unclosed containers are
/// closed at the end of input and reported as warnings. A leading YAML
/// frontmatter block is passed through untouched.
pub fn preprocess_directives(input: &str, raw_html: bool) -> Preprocessed {
    let body_start = crate::frontmatter::frontmatter_len(input);
    let (front, body) = input.split_at(body_start);
    let front_lines = front.lines().count();

    let mut literal = LiteralBlocks::new(raw_html);
    let mut output = String::with_capacity(input.len() + 64);
    output.push_str(front);
    let mut openings = Vec::new();
    let mut diagnostics = Diagnostics::new();
    // (opening index, indentation)
    let mut open: Vec<(usize, String)> = Vec::new();

    for (index, line) in body.lines().enumerate() {
        let line_number = front_lines + index + 1;
        if literal.observe(line) {
            writeln!(output, "{}", line).ok();
            continue;
        }

        let indent = &line[..line.len() - line.trim_start().len()];
        let column = indent.chars().count() + 1;

        if is_directive_closer(line) {
            match open.pop() {
                Some((_, opener_indent)) => {
                    write_block_token(&mut output, &opener_indent, Token::Close)
                }
                None => {
                    diagnostics.add_warning_at("Stray directive closer", line_number, column);
                    writeln!(output, "{}", line).ok();
                }
            }
            continue;
        }

        let block = parse_container_opening(line).or_else(|| parse_leaf_directive(line));
        if let Some(mut opening) = block {
            opening.location = SourceLocation::new(line_number, column);
            if opening.kind == DirectiveKind::Container {
                open.push((openings.len(), indent.to_string()));
            }
            write_block_token(&mut output, indent, Token::Open(openings.len()));
            openings.push(opening);
            continue;
        }

        let rewritten = rewrite_text_directives(line, line_number, &mut openings);
        writeln!(output, "{}", rewritten).ok();
    }

    while let Some((index, indent)) = open.pop() {
        let opening = &openings[index];
        diagnostics.add_warning(ParseWarning::UnclosedDirective {
            location: opening.location.clone(),
            name: opening.name.clone(),
        });
        write_block_token(&mut output, &indent, Token::Close);
    }

    if !openings.is_empty() {
        log::debug!("preprocessed {} directive(s)", openings.len());
    }

    Preprocessed {
        text: output,
        openings,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(index: usize) -> String {
        let mut out = String::new();
        Token::Open(index).write(&mut out);
        out
    }

    #[test]
    fn parse_simple_container() {
        let opening = parse_container_opening(":::note").unwrap();
        assert_eq!(opening.kind, DirectiveKind::Container);
        assert_eq!(opening.name, "note");
        assert!(opening.label.is_none());
        assert!(opening.raw_attrs.is_empty());
    }

    #[test]
    fn parse_container_with_label_and_attrs() {
        let opening = parse_container_opening(":::tip[My [nested] Title]{#x .wide}").unwrap();
        assert_eq!(opening.name, "tip");
        assert_eq!(opening.label.as_deref(), Some("My [nested] Title"));
        assert_eq!(opening.raw_attrs, "#x .wide");
    }

    #[test]
    fn legacy_trailing_attrs_are_kept() {
        let opening = parse_container_opening(":::warning data-test=\"yes\"").unwrap();
        assert_eq!(opening.name, "warning");
        assert_eq!(opening.raw_attrs, "data-test=\"yes\"");
    }

    #[test]
    fn closer_is_not_an_opening() {
        assert!(parse_container_opening(":::").is_none());
        assert!(parse_container_opening("::::").is_none());
        assert!(is_directive_closer(":::"));
        assert!(is_directive_closer("  ::::  "));
        assert!(!is_directive_closer(":::note"));
        assert!(!is_directive_closer("::"));
    }

    #[test]
    fn leaf_directive_must_fill_the_line() {
        let opening = parse_leaf_directive("::github{repo=\"saicaca/fuwari\"}").unwrap();
        assert_eq!(opening.kind, DirectiveKind::Leaf);
        assert_eq!(opening.name, "github");
        assert_eq!(opening.raw_attrs, "repo=\"saicaca/fuwari\"");
        assert!(parse_leaf_directive("::github{repo=\"a/b\"} trailing").is_none());
        assert!(parse_leaf_directive(":::note").is_none());
    }

    #[test]
    fn attributes_parse_shortcuts_and_quotes() {
        let attrs = parse_attributes("{#intro .a .b title=\"foo bar\" lang='en' n=3 open}");
        assert_eq!(
            attrs,
            vec![
                ("id".to_string(), "intro".to_string()),
                ("class".to_string(), "a".to_string()),
                ("class".to_string(), "b".to_string()),
                ("title".to_string(), "foo bar".to_string()),
                ("lang".to_string(), "en".to_string()),
                ("n".to_string(), "3".to_string()),
                ("open".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn tokenize_attrs_with_spaces_in_quotes() {
        let tokens = tokenize_attrs("title=\"foo bar\" id=\"test\"");
        assert_eq!(tokens, vec!["title=\"foo bar\"", "id=\"test\""]);
    }

    #[test]
    fn tokens_round_trip_through_split() {
        let text = format!("a{}b{}/{}", open(12), TOKEN_START, TOKEN_END);
        assert_eq!(
            split_tokens(&text),
            vec![
                Segment::Text("a"),
                Segment::Token(Token::Open(12)),
                Segment::Text("b"),
                Segment::Token(Token::Close),
            ]
        );
        assert_eq!(Token::parse(&open(3)), Some(Token::Open(3)));
        assert_eq!(Token::parse("3"), None);
    }

    #[test]
    fn malformed_tokens_stay_text() {
        let text = format!("x{}y", TOKEN_START);
        let joined: String = split_tokens(&text)
            .into_iter()
            .map(|segment| match segment {
                Segment::Text(text) => text.to_string(),
                Segment::Token(_) => "!".to_string(),
            })
            .collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn text_directives_are_replaced_inline() {
        let mut openings = Vec::new();
        let out = rewrite_text_directives("Press :kbd[Ctrl+C] to copy.", 4, &mut openings);
        assert_eq!(out, format!("Press {} to copy.", open(0)));
        assert_eq!(openings.len(), 1);
        assert_eq!(openings[0].name, "kbd");
        assert_eq!(openings[0].label.as_deref(), Some("Ctrl+C"));
        assert_eq!(openings[0].location, SourceLocation::new(4, 7));
    }

    #[test]
    fn text_directive_requires_label_or_attrs() {
        let mut openings = Vec::new();
        let out = rewrite_text_directives("Note: this is prose", 1, &mut openings);
        assert_eq!(out, "Note: this is prose");
        assert!(openings.is_empty());

        rewrite_text_directives("see :badge{kind=new}", 1, &mut openings);
        assert_eq!(openings.len(), 1);
        assert_eq!(openings[0].raw_attrs, "kind=new");
    }

    #[test]
    fn text_directives_skip_code_and_urls() {
        let mut openings = Vec::new();
        rewrite_text_directives("`:kbd[x]` and https://a.b/c[d] and a:b[c]", 1, &mut openings);
        assert!(openings.is_empty());
    }

    #[test]
    fn preprocess_container_and_leaf() {
        let input = ":::note[Heads up]\nBody\n:::\n\n::github{repo=\"a/b\"}";
        let result = preprocess_directives(input, true);
        assert_eq!(result.openings.len(), 2);
        let lines: Vec<_> = result.text.lines().collect();
        assert_eq!(lines.len(), input.lines().count());
        assert_eq!(lines[0], format!("###### {}", open(0)));
        assert_eq!(lines[1], "Body");
        assert_eq!(lines[2], format!("###### {}/{}", TOKEN_START, TOKEN_END));
        assert_eq!(lines[4], format!("###### {}", open(1)));
        assert_eq!(result.openings[0].label.as_deref(), Some("Heads up"));
        assert_eq!(result.openings[1].kind, DirectiveKind::Leaf);
        assert!(!result.diagnostics.has_any());
    }

    #[test]
    fn preprocess_preserves_code_fence() {
        let input = "```\n:::note\n```";
        let result = preprocess_directives(input, true);
        assert!(result.openings.is_empty());
        assert!(result.text.contains(":::note"));
    }

    #[test]
    fn preprocess_leaves_indented_code_alone() {
        let input = "Example:\n\n    :::note\n    Body\n    :::";
        let result = preprocess_directives(input, true);
        assert!(result.openings.is_empty());
        assert_eq!(result.text, format!("{}\n", input));
        assert!(!result.diagnostics.has_any());
    }

    #[test]
    fn preprocess_leaves_quoted_fences_alone() {
        let input = "> ```md\n> Use :kbd[x]{} here\n> ```\n> Press :kbd[y]";
        let result = preprocess_directives(input, true);
        assert_eq!(result.openings.len(), 1);
        assert_eq!(result.openings[0].label.as_deref(), Some("y"));
        assert!(result.text.contains("> Use :kbd[x]{} here\n"));
    }

    #[test]
    fn preprocess_leaves_html_blocks_alone() {
        let input = "<div>\nPress :kbd[Ctrl] now\n</div>\n\n:kbd[Esc]";
        let result = preprocess_directives(input, true);
        assert_eq!(result.openings.len(), 1);
        assert_eq!(result.openings[0].label.as_deref(), Some("Esc"));
        assert!(result.text.contains("Press :kbd[Ctrl] now"));

        let result = preprocess_directives(input, false);
        assert_eq!(result.openings.len(), 2);
    }

    #[test]
    fn restore_tokens_gives_back_written_syntax() {
        let input = ":::note[Hi]\nPress :kbd[Ctrl]{.key} now\n:::";
        let result = preprocess_directives(input, true);
        assert_eq!(result.openings[1].source, ":kbd[Ctrl]{.key}");
        assert_eq!(restore_tokens(&result.text, &result.openings), format!("{}\n", input));
        assert!(matches!(restore_tokens("plain", &result.openings), Cow::Borrowed("plain")));
    }

    #[test]
    fn preprocess_nested_and_unclosed() {
        let input = ":::note\nOuter\n  :::tip\n  Inner\n  :::";
        let result = preprocess_directives(input, true);
        assert_eq!(result.openings.len(), 2);
        assert_eq!(result.openings[1].location, SourceLocation::new(3, 3));
        assert!(result.text.contains(&format!("  ###### {}", open(1))));
        assert_eq!(result.diagnostics.warnings.len(), 1);
        assert_eq!(
            result.diagnostics.warnings[0],
            ParseWarning::UnclosedDirective {
                location: SourceLocation::new(1, 1),
                name: "note".into(),
            }
        );
    }

    #[test]
    fn preprocess_skips_frontmatter() {
        let input = "---\ntitle: a :b[c]\n---\n:::note\nx\n:::";
        let result = preprocess_directives(input, true);
        assert!(result.text.starts_with("---\ntitle: a :b[c]\n---\n"));
        assert_eq!(result.openings.len(), 1);
        assert_eq!(result.openings[0].location.line, 4);
    }

    #[test]
    fn stray_closer_is_reported_and_kept() {
        let result = preprocess_directives("text\n:::", true);
        assert!(result.openings.is_empty());
        assert!(result.text.contains(":::"));
        assert_eq!(result.diagnostics.warnings.len(), 1);
    }
}
