//! Heading ids and anchor links.

use mdweave_core::{Diagnostics, RecoverableError, Slugger, extract_custom_id};
use serde::Serialize;

use crate::convert::heading_depth;
use crate::element::{Element, HastNode, Root};

/// Heading metadata collected while assigning ids.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    /// Heading depth (1-6).
    pub depth: u8,
    /// Element id.
    pub slug: String,
    /// Visible heading text.
    pub text: String,
}

/// Gives every heading an `id` and returns the headings in document order.
///
/// A trailing `{#custom-id}` sets the id explicitly and is removed from the
/// heading text. Headings that already carry an `id` keep it. With
/// `anchors`, each heading gets an appended `a.anchor` link to itself.
///
/// An explicit id that repeats an earlier one is kept as written and
/// reported as a warning in `diagnostics`.
pub fn slug_headings(
    root: &mut Root,
    anchors: bool,
    diagnostics: &mut Diagnostics,
) -> Vec<HeadingEntry> {
    let mut walker = Walker {
        slugger: Slugger::new(),
        anchors,
        diagnostics,
        entries: Vec::new(),
    };
    walker.walk(&mut root.children);
    walker.entries
}

struct Walker<'a> {
    slugger: Slugger,
    anchors: bool,
    diagnostics: &'a mut Diagnostics,
    entries: Vec<HeadingEntry>,
}

impl Walker<'_> {
    fn walk(&mut self, children: &mut [HastNode]) {
        for child in children {
            let Some(element) = child.as_element_mut() else {
                continue;
            };
            match heading_depth(element) {
                Some(depth) => {
                    let entry = self.slug_heading(element, depth);
                    self.entries.push(entry);
                }
                None => self.walk(&mut element.children),
            }
        }
    }

    fn slug_heading(&mut self, element: &mut Element, depth: u8) -> HeadingEntry {
        let custom_id = take_custom_id(element);
        let text = element.text_content().trim().to_string();

        let explicit = custom_id.or_else(|| element.properties.get_str("id").map(str::to_string));
        let slug = match explicit {
            Some(id) => {
                if self.slugger.contains(&id) {
                    log::warn!("duplicate heading id `{}`", id);
                    self.diagnostics.add_error(RecoverableError::warning(
                        format!("Duplicate heading id `{}`", id),
                        None,
                    ));
                }
                self.slugger.reserve(&id);
                id
            }
            None => self.slugger.slug(&text),
        };
        element.properties.insert("id", slug.as_str());

        if self.anchors {
            element.children.push(anchor(&slug).into());
        }

        HeadingEntry { depth, slug, text }
    }
}

/// Strips `{#id}` from the last text child and returns the id.
fn take_custom_id(element: &mut Element) -> Option<String> {
    let Some(HastNode::Text { value }) = element.children.last_mut() else {
        return None;
    };
    let (rest, id) = extract_custom_id(value);
    let id = id?.to_string();
    let rest = rest.to_string();
    if rest.is_empty() {
        element.children.pop();
    } else {
        *value = rest;
    }
    Some(id)
}

fn anchor(slug: &str) -> Element {
    Element::new("a")
        .with_class("anchor")
        .with_property("href", format!("#{}", slug))
        .child(
            Element::new("span")
                .with_class("anchor-icon")
                .with_property("data-pagefind-ignore", true)
                .child("#"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heading(tag: &str, text: &str) -> HastNode {
        Element::new(tag).child(text).into()
    }

    #[test]
    fn assigns_unique_slugs() {
        let mut root = Root::new(vec![
            heading("h1", "Hello World"),
            heading("h2", "Hello World"),
            Element::new("blockquote")
                .child(Element::new("h3").child("Nested"))
                .into(),
        ]);
        let entries = slug_headings(&mut root, false, &mut Diagnostics::new());
        let slugs: Vec<_> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["hello-world", "hello-world-1", "nested"]);
        assert_eq!(entries[2].depth, 3);
        let first = root.children[0].as_element().unwrap();
        assert_eq!(first.properties.get_str("id"), Some("hello-world"));
    }

    #[test]
    fn custom_ids_are_stripped_and_reserved() {
        let mut root = Root::new(vec![
            heading("h2", "Install {#setup}"),
            heading("h2", "Setup"),
        ]);
        let entries = slug_headings(&mut root, false, &mut Diagnostics::new());
        assert_eq!(entries[0].slug, "setup");
        assert_eq!(entries[0].text, "Install");
        assert_eq!(entries[1].slug, "setup-1");
        assert_eq!(root.children[0].text_content(), "Install");
    }

    #[test]
    fn existing_ids_win() {
        let mut root = Root::new(vec![
            Element::new("h2")
                .with_property("id", "fixed")
                .child("Title")
                .into(),
        ]);
        let entries = slug_headings(&mut root, false, &mut Diagnostics::new());
        assert_eq!(entries[0].slug, "fixed");
    }

    #[test]
    fn repeated_explicit_ids_are_reported() {
        let mut root = Root::new(vec![
            heading("h2", "One {#dup}"),
            heading("h2", "Two {#dup}"),
            heading("h2", "Dup"),
        ]);
        let mut diagnostics = Diagnostics::new();
        let entries = slug_headings(&mut root, false, &mut diagnostics);
        let slugs: Vec<_> = entries.iter().map(|e| e.slug.as_str()).collect();
        assert_eq!(slugs, vec!["dup", "dup", "dup-1"]);
        assert_eq!(diagnostics.errors.len(), 1);
        assert_eq!(
            diagnostics.errors[0].to_string(),
            "warning: Duplicate heading id `dup`"
        );
    }

    #[test]
    fn anchors_are_appended() {
        let mut root = Root::new(vec![heading("h2", "Usage")]);
        slug_headings(&mut root, true, &mut Diagnostics::new());
        let json = serde_json::to_string(&root).unwrap();
        insta::assert_snapshot!(json, @r##"{"type":"root","children":[{"type":"element","tagName":"h2","properties":{"id":"usage"},"children":[{"type":"text","value":"Usage"},{"type":"element","tagName":"a","properties":{"className":["anchor"],"href":"#usage"},"children":[{"type":"element","tagName":"span","properties":{"className":["anchor-icon"],"data-pagefind-ignore":true},"children":[{"type":"text","value":"#"}]}]}]}]}"##);
    }
}
