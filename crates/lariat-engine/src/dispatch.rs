#![forbid(unsafe_code)]

//! Dispatch boundary.
//!
//! When a gesture ends with links inside the marquee, the engine hands the
//! sink an ordered request and is done: opening tabs or windows, copying
//! formatted text, and bookmark creation all live behind [`DispatchSink`].
//!
//! The `block` (deduplicate) and `reverse` options are applied here, on the
//! final list, after the selection engine has been queried and before the
//! sink sees anything.

use lariat_core::settings::ActionOptions;

/// One link in a dispatch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedLink {
    /// Absolute URL.
    pub url: String,

    /// Link text at snapshot time. May be empty.
    pub title: String,
}

impl MatchedLink {
    /// Create a matched link.
    #[must_use]
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// What a finished gesture sends to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// The resolved action's id. The sink owns the action semantics.
    pub action_id: String,

    /// Matched links after the `block`/`reverse` transforms.
    pub links: Vec<MatchedLink>,
}

/// Receiver for finished selections.
pub trait DispatchSink {
    /// Handle one gesture's worth of links. Only called with a non-empty
    /// list.
    fn dispatch(&mut self, request: DispatchRequest);
}

/// Apply dispatch-time transforms: deduplicate by URL (first occurrence
/// wins, order preserved) when `block` is set, then reverse when `reverse`
/// is set.
#[must_use]
pub fn finalize_links(mut links: Vec<MatchedLink>, options: &ActionOptions) -> Vec<MatchedLink> {
    if options.block {
        let mut seen = std::collections::HashSet::new();
        links.retain(|link| seen.insert(link.url.clone()));
    }
    if options.reverse {
        links.reverse();
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(block: bool, reverse: bool) -> ActionOptions {
        ActionOptions {
            block,
            reverse,
            ..ActionOptions::default()
        }
    }

    fn sample() -> Vec<MatchedLink> {
        vec![
            MatchedLink::new("https://a.example/", "first a"),
            MatchedLink::new("https://b.example/", "b"),
            MatchedLink::new("https://a.example/", "second a"),
        ]
    }

    #[test]
    fn block_keeps_first_occurrence() {
        let out = finalize_links(sample(), &options(true, false));
        assert_eq!(
            out,
            vec![
                MatchedLink::new("https://a.example/", "first a"),
                MatchedLink::new("https://b.example/", "b"),
            ]
        );
    }

    #[test]
    fn reverse_flips_order() {
        let out = finalize_links(sample(), &options(false, true));
        assert_eq!(out[0].url, "https://a.example/");
        assert_eq!(out[0].title, "second a");
        assert_eq!(out[2].title, "first a");
    }

    #[test]
    fn block_applies_before_reverse() {
        let out = finalize_links(sample(), &options(true, true));
        assert_eq!(
            out,
            vec![
                MatchedLink::new("https://b.example/", "b"),
                MatchedLink::new("https://a.example/", "first a"),
            ]
        );
    }

    #[test]
    fn no_options_is_identity() {
        assert_eq!(finalize_links(sample(), &options(false, false)), sample());
    }
}
