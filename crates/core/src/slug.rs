//! Heading slugs compatible with github-slugger.

use std::collections::HashMap;

/// Splits a trailing `{#custom-id}` off heading text.
///
/// ```
/// use mdweave_core::slug::extract_custom_id;
///
/// assert_eq!(extract_custom_id("Setup {#install}"), ("Setup", Some("install")));
/// assert_eq!(extract_custom_id("Setup"), ("Setup", None));
/// ```
pub fn extract_custom_id(text: &str) -> (&str, Option<&str>) {
    let trimmed = text.trim_end();
    let Some(inner) = trimmed.strip_suffix('}') else {
        return (text, None);
    };
    let Some(open) = inner.rfind("{#") else {
        return (text, None);
    };
    let id = &inner[open + 2..];
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        (inner[..open].trim_end(), Some(id))
    } else {
        (text, None)
    }
}

/// Lowercases `text`, keeps letters, digits, `-` and `_`, turns spaces into
/// hyphens, and drops everything else. Runs of hyphens are not collapsed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            ' ' => slug.push('-'),
            '-' | '_' => slug.push(ch),
            c if c.is_alphanumeric() => slug.extend(c.to_lowercase()),
            _ => {}
        }
    }
    slug
}

/// Produces unique slugs within one document.
///
/// Repeated slugs get `-1`, `-2`, ... suffixes in order of appearance.
#[derive(Debug, Default, Clone)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Creates an empty slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Slug for the next heading with this text.
    pub fn slug(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("heading");
        }
        let mut n = self.seen.get(&base).copied().unwrap_or(0);
        let mut candidate = if n == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, n)
        };
        while self.seen.contains_key(&candidate) {
            n += 1;
            candidate = format!("{}-{}", base, n);
        }
        self.seen.insert(base, n + 1);
        self.seen.entry(candidate.clone()).or_insert(1);
        candidate
    }

    /// Returns true if `slug` was already handed out or reserved.
    pub fn contains(&self, slug: &str) -> bool {
        self.seen.contains_key(slug)
    }

    /// Marks `slug` as taken, e.g. by an explicit `{#id}`.
    pub fn reserve(&mut self, slug: &str) {
        self.seen.entry(slug.to_string()).or_insert(1);
    }
}
