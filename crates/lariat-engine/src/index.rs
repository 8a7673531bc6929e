#![forbid(unsafe_code)]

//! Link geometry snapshot.
//!
//! A gesture works against a frozen view of the page's links, taken once
//! when the gesture arms. [`GeometryIndex::snapshot`] walks the host's
//! candidates in document order, drops the ones that can never be selected,
//! and resolves the rest to page-coordinate boxes the marquee overlap test
//! runs against.
//!
//! Rejection order per candidate:
//! 1. `javascript:` URLs (case-insensitive), empty raw hrefs, and the
//!    `"#"` placeholder.
//! 2. The action's ignore list, matched against both URL and inner markup.
//! 3. Hidden elements (visibility hidden or display none).
//!
//! Survivors get their viewport rect shifted into page coordinates and, for
//! image links, widened to the union with any direct image child's box.
//!
//! # Invariants
//!
//! 1. Output preserves document order; `LinkId` is the output position.
//! 2. Rejected candidates are simply absent, never an error.
//! 3. An ignore list that fails to compile disables that step for the
//!    whole snapshot (logged), it does not reject anything.

use lariat_core::filter::IgnoreFilter;
use lariat_core::geometry::{PagePoint, PageRect};
use lariat_core::settings::ActionOptions;
use tracing::{debug, warn};

use crate::host::{LinkCandidate, PageHost};

/// Stable handle for one snapshotted link, valid for the owning snapshot's
/// lifetime only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(usize);

impl LinkId {
    /// Position in the snapshot's document order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One selectable link, frozen at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedLink {
    /// Handle within this snapshot.
    pub id: LinkId,

    /// Absolute URL, the filter and dispatch subject.
    pub href: String,

    /// Link text, carried to dispatch as the title.
    pub title: String,

    /// Bounding box in page coordinates, image-expanded.
    pub rect: PageRect,

    /// Heading-child flag for the smart-selection heuristic. Computed only
    /// when the action's smart mode is off; carried, not consumed, here.
    pub important: bool,
}

/// Document-ordered snapshot of the page's selectable links.
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    links: Vec<IndexedLink>,
}

impl GeometryIndex {
    /// Snapshot the host's links under the given action options.
    #[must_use]
    pub fn snapshot(host: &dyn PageHost, options: &ActionOptions) -> Self {
        let ignore = compile_ignore(options);
        let scroll = host.scroll();
        let candidates = host.link_candidates();
        let total = candidates.len();

        let mut links = Vec::new();
        for candidate in candidates {
            if !accepts(&candidate, ignore.as_ref()) {
                continue;
            }
            let rect = page_rect(&candidate, scroll);
            links.push(IndexedLink {
                id: LinkId(links.len()),
                href: candidate.href,
                title: candidate.text,
                rect,
                important: options.smart == 0 && is_heading_tag(&candidate.parent_tag),
            });
        }

        debug!(total, kept = links.len(), "link snapshot built");
        Self { links }
    }

    /// All links, in document order.
    #[must_use]
    pub fn links(&self) -> &[IndexedLink] {
        &self.links
    }

    /// Look up one link by handle.
    #[must_use]
    pub fn link(&self, id: LinkId) -> Option<&IndexedLink> {
        self.links.get(id.index())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
impl GeometryIndex {
    /// Build a snapshot directly from (href, title, rect) rows.
    pub(crate) fn from_test_links(rows: Vec<(&str, &str, PageRect)>) -> Self {
        let links = rows
            .into_iter()
            .enumerate()
            .map(|(i, (href, title, rect))| IndexedLink {
                id: LinkId(i),
                href: href.to_string(),
                title: title.to_string(),
                rect,
                important: false,
            })
            .collect();
        Self { links }
    }
}

fn compile_ignore(options: &ActionOptions) -> Option<IgnoreFilter> {
    match IgnoreFilter::try_compile(options.ignore.mode, &options.ignore.patterns) {
        Ok(filter) => filter,
        Err(error) => {
            warn!(%error, "ignore list failed to compile, step disabled");
            None
        }
    }
}

fn accepts(candidate: &LinkCandidate, ignore: Option<&IgnoreFilter>) -> bool {
    if has_scheme(&candidate.href, "javascript:") {
        return false;
    }
    if candidate.raw_href.is_empty() || candidate.raw_href == "#" {
        return false;
    }
    if let Some(ignore) = ignore
        && !ignore.keeps(&candidate.href, &candidate.markup)
    {
        return false;
    }
    !candidate.hidden
}

fn page_rect(candidate: &LinkCandidate, scroll: PagePoint) -> PageRect {
    let mut rect = candidate.rect.to_page(scroll);
    for image in &candidate.image_rects {
        rect = rect.union(&image.to_page(scroll));
    }
    rect
}

/// Case-insensitive scheme prefix test. `get` rather than slicing: a
/// multibyte character straddling the cut can never equal an ASCII scheme.
fn has_scheme(url: &str, scheme: &str) -> bool {
    url.get(..scheme.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
}

/// `H` followed by one digit, the heading tags the importance flag keys on.
fn is_heading_tag(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    bytes.len() == 2 && bytes[0].eq_ignore_ascii_case(&b'H') && bytes[1].is_ascii_digit()
}
