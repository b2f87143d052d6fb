//! GitHub alert blockquotes (`> [!NOTE]`) as container directives.
//!
//! ```text
//! > [!WARNING] Read this first
//! > The API is unstable.
//! ```
//!
//! becomes a `warning` container directive whose label paragraph holds
//! `Read this first` and whose body holds the rest of the quote.

use crate::tree::{Directive, Node, NodeKind, Properties};
use crate::visit::visit_mut;

/// Alert types recognized in `[!TYPE]` markers.
pub const ALERT_TYPES: &[&str] = &["note", "tip", "important", "caution", "warning"];

/// Rewrites every alert blockquote in `tree`. Returns how many were converted.
pub fn convert_github_alerts(tree: &mut Node) -> usize {
    let mut converted = 0usize;
    visit_mut(tree, |node| {
        if convert_alert(node) {
            converted += 1;
        }
    });
    if converted > 0 {
        log::debug!("converted {} GitHub alert(s) to directives", converted);
    }
    converted
}

/// Parses a leading `[!TYPE]` marker. Returns the lower-cased type and the
/// text following the marker.
pub fn parse_alert_marker(text: &str) -> Option<(String, &str)> {
    let rest = text.trim_start().strip_prefix("[!")?;
    let close = rest.find(']')?;
    let name = rest[..close].to_ascii_lowercase();
    if !ALERT_TYPES.contains(&name.as_str()) {
        return None;
    }
    Some((name, &rest[close + 1..]))
}

fn convert_alert(node: &mut Node) -> bool {
    if !matches!(node.kind, NodeKind::Blockquote) {
        return false;
    }
    let name = match node.children.first() {
        Some(first) if first.is_paragraph() => match first.children.first().map(|c| &c.kind) {
            Some(NodeKind::Text { value }) => match parse_alert_marker(value) {
                Some((name, _)) => name,
                None => return false,
            },
            _ => return false,
        },
        _ => return false,
    };

    let mut children = std::mem::take(&mut node.children);
    let mut rest = children.split_off(1);
    let first = children.remove(0);
    let position = first.position.clone();
    let (label, body) = split_marker_line(first.children);

    let mut new_children = Vec::with_capacity(rest.len() + 2);
    if !label.is_empty() {
        new_children.push(Node::label(label).with_position(position.clone()));
    }
    if !body.is_empty() {
        new_children.push(Node::paragraph(body).with_position(position));
    }
    new_children.append(&mut rest);

    node.kind = NodeKind::ContainerDirective(Directive {
        name,
        attributes: Properties::new(),
    });
    node.children = new_children;
    true
}

/// Splits the inline children of the marker paragraph into the label (rest
/// of the marker line) and the body (everything after the first line end).
fn split_marker_line(inlines: Vec<Node>) -> (Vec<Node>, Vec<Node>) {
    let mut label = Vec::new();
    let mut body = Vec::new();
    let mut in_body = false;

    for (index, mut child) in inlines.into_iter().enumerate() {
        if in_body {
            body.push(child);
            continue;
        }
        if index == 0
            && let NodeKind::Text { value } = &mut child.kind
        {
            let after = parse_alert_marker(value)
                .map(|(_, after)| after.to_string())
                .unwrap_or_default();
            *value = after;
        }
        if let NodeKind::Text { value } = &child.kind {
            if let Some((head, tail)) = value.split_once('\n') {
                let head = if label.is_empty() {
                    head.trim()
                } else {
                    head.trim_end()
                };
                if !head.is_empty() {
                    label.push(Node::text(head));
                }
                if !tail.is_empty() {
                    body.push(Node::text(tail));
                }
                in_body = true;
            } else {
                let value = if label.is_empty() {
                    value.trim_start()
                } else {
                    value.as_str()
                };
                if !value.is_empty() {
                    label.push(Node::text(value));
                }
            }
            continue;
        }
        if matches!(child.kind, NodeKind::Break) {
            in_body = true;
            continue;
        }
        label.push(child);
    }

    if let Some(Node {
        kind: NodeKind::Text { value },
        ..
    }) = label.last_mut()
    {
        let trimmed = value.trim_end().to_string();
        *value = trimmed;
    }
    label.retain(|node| node.value() != Some(""));

    (label, body)
}
