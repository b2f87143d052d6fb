//! Wraps each heading and the content under it in a `section`.

use crate::convert::heading_depth;
use crate::element::{Element, HastNode, Root};

/// Groups top-level content into nested `section` elements.
///
/// A section runs from its heading up to the next heading of the same or a
/// shallower depth. Content before the first heading stays unwrapped.
pub fn sectionize(root: &mut Root) {
    let children = std::mem::take(&mut root.children);
    let mut out = Vec::with_capacity(children.len());
    let mut open: Vec<(u8, Element)> = Vec::new();

    for child in children {
        if let Some(depth) = child.as_element().and_then(heading_depth) {
            while open.last().is_some_and(|(d, _)| *d >= depth) {
                close(&mut open, &mut out);
            }
            open.push((depth, Element::new("section").child(child)));
            continue;
        }
        match open.last_mut() {
            Some((_, section)) => section.children.push(child),
            None => out.push(child),
        }
    }
    while !open.is_empty() {
        close(&mut open, &mut out);
    }
    root.children = out;
}

fn close(open: &mut Vec<(u8, Element)>, out: &mut Vec<HastNode>) {
    let Some((_, section)) = open.pop() else {
        return;
    };
    match open.last_mut() {
        Some((_, parent)) => parent.children.push(section.into()),
        None => out.push(section.into()),
    }
}
