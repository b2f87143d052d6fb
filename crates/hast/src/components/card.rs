//! Repository card placeholder.
//!
//! Emits the static skeleton a client-side script fills in later. Nothing
//! here talks to the network. Element ids come from a per-document
//! [`Slugger`], so the same repository can appear more than once.

use mdweave_core::{Properties, Slugger};

use super::ComponentError;
use crate::element::{Element, HastNode};

/// Renders a repository card, substituting the hidden diagnostic fragment
/// for invalid input.
pub fn render_card(
    properties: &Properties,
    children: Vec<HastNode>,
    ids: &mut Slugger,
) -> Element {
    try_render_card(properties, children, ids).unwrap_or_else(|err| {
        log::warn!("github card: {}", err);
        err.to_element()
    })
}

/// Renders a repository card for `repo="owner/name"`.
///
/// The first card for a repository gets ids under `GC-owner-name`; later
/// ones, or repositories that slugify alike, get a numeric suffix.
pub fn try_render_card(
    properties: &Properties,
    children: Vec<HastNode>,
    ids: &mut Slugger,
) -> Result<Element, ComponentError> {
    if !children.is_empty() {
        return Err(ComponentError::CardNotLeaf);
    }
    let repo = properties
        .get_str("repo")
        .ok_or(ComponentError::InvalidRepository)?;
    let (owner, name) = split_repo(repo).ok_or(ComponentError::InvalidRepository)?;

    let id = format!("GC-{}", ids.slug(&format!("{} {}", owner, name)));
    let slot = |suffix: &str, class: &str, placeholder: &str| {
        let element = Element::new("div")
            .with_property("id", format!("{}-{}", id, suffix))
            .with_class(class);
        if placeholder.is_empty() {
            element
        } else {
            element.child(placeholder)
        }
    };

    let title_bar = Element::new("div").with_class("gc-titlebar").child(
        Element::new("div")
            .with_class("gc-titlebar-left")
            .child(
                Element::new("div")
                    .with_class("gc-owner")
                    .child(slot("avatar", "gc-avatar", ""))
                    .child(Element::new("div").with_class("gc-user").child(owner)),
            )
            .child(Element::new("div").with_class("gc-divider").child("/"))
            .child(Element::new("div").with_class("gc-repo").child(name)),
    )
    .child(Element::new("div").with_class("github-logo"));

    let language = Element::new("span")
        .with_property("id", format!("{}-language", id))
        .with_class("gc-language")
        .child("Waiting...");
    let info_bar = Element::new("div")
        .with_class("gc-infobar")
        .child(slot("stars", "gc-stars", "00K"))
        .child(slot("forks", "gc-forks", "0K"))
        .child(slot("license", "gc-license", "0K"))
        .child(language);

    Ok(Element::new("a")
        .with_property("id", format!("{}-card", id))
        .with_class("card-github fetch-waiting no-styling")
        .with_property("href", format!("https://github.com/{}", repo))
        .with_property("target", "_blank")
        .with_property("repo", repo)
        .child(title_bar)
        .child(slot("description", "gc-description", "Waiting for api.github.com..."))
        .child(info_bar))
}

/// Splits `owner/name`; both halves must be non-empty and there must be
/// exactly one slash.
fn split_repo(repo: &str) -> Option<(&str, &str)> {
    let (owner, name) = repo.trim().split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(value: &str) -> Properties {
        Properties::from_attributes([("repo", value)])
    }

    fn card(value: &str, ids: &mut Slugger) -> Element {
        render_card(&repo(value), Vec::new(), ids)
    }

    fn slot_ids(element: &Element) -> Vec<String> {
        let own = element.properties.get_str("id").map(str::to_string);
        let nested = element
            .children
            .iter()
            .filter_map(HastNode::as_element)
            .flat_map(slot_ids);
        own.into_iter().chain(nested).collect()
    }

    #[test]
    fn renders_placeholder_card() {
        let card = card("withastro/astro", &mut Slugger::new());
        assert_eq!(card.tag_name, "a");
        assert_eq!(card.classes(), vec!["card-github", "fetch-waiting", "no-styling"]);
        assert_eq!(
            card.properties.get_str("href"),
            Some("https://github.com/withastro/astro")
        );
        assert_eq!(card.properties.get_str("target"), Some("_blank"));
        assert_eq!(card.properties.get_str("repo"), Some("withastro/astro"));
        assert_eq!(card.properties.get_str("id"), Some("GC-withastro-astro-card"));
        insta::assert_snapshot!(card.text_content(), @"withastro/astroWaiting for api.github.com...00K0K0KWaiting...");
    }

    #[test]
    fn ids_are_deterministic() {
        let a = card("Owner/My.Repo", &mut Slugger::new());
        let b = card("Owner/My.Repo", &mut Slugger::new());
        assert_eq!(a, b);
        assert_eq!(a.properties.get_str("id"), Some("GC-owner-myrepo-card"));
    }

    #[test]
    fn repeated_cards_get_distinct_ids() {
        let mut ids = Slugger::new();
        let first = card("a/b", &mut ids);
        let second = card("a/b", &mut ids);
        let dotted = card("a/b.c", &mut ids);
        let plain = card("a/bc", &mut ids);
        assert_eq!(second.properties.get_str("id"), Some("GC-a-b-1-card"));
        assert_eq!(dotted.properties.get_str("id"), Some("GC-a-bc-card"));
        assert_eq!(plain.properties.get_str("id"), Some("GC-a-bc-1-card"));

        let mut all: Vec<String> = [first, second, dotted, plain].iter().flat_map(slot_ids).collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
        assert_eq!(total, 4 * 7);
    }

    #[test]
    fn children_make_it_invalid() {
        let card = render_card(&repo("a/b"), vec![HastNode::text("label")], &mut Slugger::new());
        assert_eq!(card.tag_name, "div");
        assert!(card.has_class("hidden"));
        assert_eq!(
            card.text_content(),
            r#"Invalid directive. ("github" directive must be leaf type "::github{repo="owner/repo"}")"#
        );
    }

    #[test]
    fn bad_repositories_are_rejected() {
        for props in [Properties::new(), repo("astro"), repo("/astro"), repo("a/b/c")] {
            assert_eq!(
                try_render_card(&props, Vec::new(), &mut Slugger::new()),
                Err(ComponentError::InvalidRepository)
            );
        }
        assert_eq!(
            card("nope", &mut Slugger::new()).text_content(),
            r#"Invalid repository. ("repo" attribute must be in the format "owner/repo")"#
        );
    }
}
