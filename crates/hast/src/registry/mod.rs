//! Directive-name to component mapping.
//!
//! Rendering looks up each element's tag name here; a hit replaces the
//! element with the component's output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::AdmonitionVariant;

/// Built-in registry contents.
pub mod defaults;

pub use defaults::{DEFAULT_REGISTRY, default_registry};

/// What a registered name renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "component", rename_all = "camelCase")]
pub enum ComponentKind {
    /// Callout block of the given variant.
    Admonition {
        /// Visual variant.
        variant: AdmonitionVariant,
    },
    /// Repository card placeholder.
    GithubCard,
}

/// Component registry keyed by directive name.
///
/// `ComponentRegistry::default()` holds the built-in set; [`ComponentRegistry::new`]
/// starts empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRegistry {
    components: BTreeMap<String, ComponentKind>,
}

impl ComponentRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
        }
    }

    /// Maps `name` to `kind`, replacing any previous mapping.
    pub fn register(&mut self, name: impl Into<String>, kind: ComponentKind) -> &mut Self {
        self.components.insert(name.into(), kind);
        self
    }

    /// Removes a mapping.
    pub fn unregister(&mut self, name: &str) -> Option<ComponentKind> {
        self.components.remove(name)
    }

    /// Component registered for `name`.
    pub fn get(&self, name: &str) -> Option<ComponentKind> {
        self.components.get(name).copied()
    }

    /// Returns true if `name` has a component.
    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Number of mappings.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Adds every mapping of `other`, overriding on conflict.
    pub fn extend(&mut self, other: &ComponentRegistry) {
        for (name, kind) in &other.components {
            self.components.insert(name.clone(), *kind);
        }
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        default_registry()
    }
}
