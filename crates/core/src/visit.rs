//! Depth-first tree traversal.
//!
//! All visitors are pre-order: the callback sees a node before any of its
//! children, and siblings in document order. Visitors never add or remove
//! children themselves; mutable visitors hand the callback `&mut Node` and
//! then descend into whatever children the node has afterwards.

use crate::tree::Node;

/// Calls `callback` once for every node, the root included.
pub fn visit<'a, F>(node: &'a Node, mut callback: F)
where
    F: FnMut(&'a Node),
{
    walk(node, &mut callback);
}

fn walk<'a, F>(node: &'a Node, callback: &mut F)
where
    F: FnMut(&'a Node),
{
    callback(node);
    for child in &node.children {
        walk(child, callback);
    }
}

/// Like [`visit`], also passing the depth (root = 0).
pub fn visit_with_depth<'a, F>(node: &'a Node, mut callback: F)
where
    F: FnMut(&'a Node, usize),
{
    walk_with_depth(node, 0, &mut callback);
}

fn walk_with_depth<'a, F>(node: &'a Node, depth: usize, callback: &mut F)
where
    F: FnMut(&'a Node, usize),
{
    callback(node, depth);
    for child in &node.children {
        walk_with_depth(child, depth + 1, callback);
    }
}

/// Fallible traversal. The first error stops the walk and is returned as-is.
pub fn try_visit<'a, E, F>(node: &'a Node, mut callback: F) -> Result<(), E>
where
    F: FnMut(&'a Node) -> Result<(), E>,
{
    try_walk(node, &mut callback)
}

fn try_walk<'a, E, F>(node: &'a Node, callback: &mut F) -> Result<(), E>
where
    F: FnMut(&'a Node) -> Result<(), E>,
{
    callback(node)?;
    for child in &node.children {
        try_walk(child, callback)?;
    }
    Ok(())
}

/// Mutable pre-order traversal.
pub fn visit_mut<F>(node: &mut Node, mut callback: F)
where
    F: FnMut(&mut Node),
{
    walk_mut(node, &mut callback);
}

fn walk_mut<F>(node: &mut Node, callback: &mut F)
where
    F: FnMut(&mut Node),
{
    callback(node);
    for child in &mut node.children {
        walk_mut(child, callback);
    }
}

/// Fallible mutable traversal.
pub fn try_visit_mut<E, F>(node: &mut Node, mut callback: F) -> Result<(), E>
where
    F: FnMut(&mut Node) -> Result<(), E>,
{
    try_walk_mut(node, &mut callback)
}

fn try_walk_mut<E, F>(node: &mut Node, callback: &mut F) -> Result<(), E>
where
    F: FnMut(&mut Node) -> Result<(), E>,
{
    callback(node)?;
    for child in &mut node.children {
        try_walk_mut(child, callback)?;
    }
    Ok(())
}
