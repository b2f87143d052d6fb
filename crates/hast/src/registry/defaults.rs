//! Built-in registry: the five admonition variants and the repository card.

use once_cell::sync::Lazy;

use super::{ComponentKind, ComponentRegistry};
use crate::components::AdmonitionVariant;

/// Shared instance of [`default_registry`].
pub static DEFAULT_REGISTRY: Lazy<ComponentRegistry> = Lazy::new(default_registry);

/// Creates the built-in registry.
///
/// ```
/// use mdweave_hast::registry::{ComponentKind, default_registry};
///
/// let registry = default_registry();
/// assert_eq!(registry.get("github"), Some(ComponentKind::GithubCard));
/// assert!(registry.contains("warning"));
/// ```
pub fn default_registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    for variant in AdmonitionVariant::ALL {
        registry.register(variant.as_str(), ComponentKind::Admonition { variant });
    }
    registry.register("github", ComponentKind::GithubCard);
    registry
}
