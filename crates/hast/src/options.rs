//! Processing options.

use std::num::NonZeroU32;

use mdweave_core::{DEFAULT_WORDS_PER_MINUTE, ParseOptions, WeaveError};
use serde::{Deserialize, Serialize};

use crate::registry::{ComponentRegistry, DEFAULT_REGISTRY};

/// Options for [`crate::process`].
///
/// Deserializes from camelCase JSON; missing fields take their defaults.
///
/// ```
/// use mdweave_hast::Options;
///
/// let options = Options::from_json(r#"{ "enableHeadingAnchors": false, "wordsPerMinute": 250 }"#).unwrap();
/// assert!(!options.enable_heading_anchors);
/// assert!(options.enable_directives);
/// assert_eq!(options.words_per_minute.get(), 250);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Options {
    /// Recognize directive syntax.
    pub enable_directives: bool,
    /// Turn `> [!NOTE]` blockquotes into directives.
    pub enable_github_alerts: bool,
    /// Append `a.anchor` links to headings.
    pub enable_heading_anchors: bool,
    /// Wrap headings and their content in `section` elements. On by default;
    /// turn it off to keep headings as direct children of the root.
    pub enable_sections: bool,
    /// Parse `$inline$` and `$$block$$` math.
    pub enable_math: bool,
    /// GitHub Flavored Markdown constructs.
    pub enable_gfm: bool,
    /// Reading speed for the reading-time estimate.
    pub words_per_minute: NonZeroU32,
    /// Component registry. `None` uses the built-in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentRegistry>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enable_directives: true,
            enable_github_alerts: true,
            enable_heading_anchors: true,
            enable_sections: true,
            enable_math: true,
            enable_gfm: true,
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
            components: None,
        }
    }
}

impl Options {
    /// Reads options from JSON.
    pub fn from_json(json: &str) -> Result<Self, WeaveError> {
        serde_json::from_str(json).map_err(|err| WeaveError::InvalidOptions(err.to_string()))
    }

    /// Parser options implied by these options.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            gfm: self.enable_gfm,
            directives: self.enable_directives,
            math: self.enable_math,
            ..ParseOptions::markdown()
        }
    }

    /// Registry to render components with.
    pub fn registry(&self) -> &ComponentRegistry {
        self.components.as_ref().unwrap_or(&*DEFAULT_REGISTRY)
    }
}
