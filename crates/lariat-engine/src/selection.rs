#![forbid(unsafe_code)]

//! Live marquee selection.
//!
//! One [`SelectionEngine`] exists per gesture. It owns the frozen
//! [`GeometryIndex`], the marquee rectangle spanned between the immutable
//! anchor and the moving cursor, and the link filter. Every cursor move
//! recomputes the full overlap pass over the snapshot; link counts are
//! assumed bounded, so no spatial index is kept.
//!
//! # Invariants
//!
//! 1. The engine stays dormant until the cursor leaves a 5px dead zone
//!    around the anchor on at least one axis; below that, `update` changes
//!    nothing and reports nothing, so a click never reads as a drag.
//! 2. Once the threshold is crossed the engine stays active for the rest
//!    of the gesture.
//! 3. `selected` holds document-ordered ids of links that both overlap the
//!    marquee and pass the filter; a broken filter fails open.
//!
//! # Failure Modes
//!
//! - Filter pattern fails to compile upstream: the filter arrives here as
//!   [`LinkFilter::Broken`], every overlapping link passes, and the label
//!   carries a "Filter invalid" marker.

use std::collections::HashSet;

use lariat_core::filter::LinkFilter;
use lariat_core::geometry::{PagePoint, PageRect};

use crate::index::{GeometryIndex, IndexedLink, LinkId};

/// Distance from the anchor, on either axis, before a drag counts.
pub const DRAG_THRESHOLD_PX: f64 = 5.0;

// ---------------------------------------------------------------------------
// Marquee rectangle
// ---------------------------------------------------------------------------

/// The dragged rectangle: immutable anchor, moving cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    anchor: PagePoint,
    cursor: PagePoint,
}

impl Marquee {
    /// Start a marquee at the gesture's pointer-down position.
    #[must_use]
    pub const fn new(anchor: PagePoint) -> Self {
        Self {
            anchor,
            cursor: anchor,
        }
    }

    /// Move the cursor corner.
    pub fn set_cursor(&mut self, cursor: PagePoint) {
        self.cursor = cursor;
    }

    #[must_use]
    pub fn anchor(&self) -> PagePoint {
        self.anchor
    }

    #[must_use]
    pub fn cursor(&self) -> PagePoint {
        self.cursor
    }

    /// Normalized bounds between anchor and cursor.
    #[must_use]
    pub fn rect(&self) -> PageRect {
        PageRect::from_points(self.anchor, self.cursor)
    }

    /// Whether the drag has left the dead zone on either axis.
    #[must_use]
    pub fn exceeds_threshold(&self, threshold: f64) -> bool {
        let rect = self.rect();
        rect.width() >= threshold || rect.height() >= threshold
    }
}

// ---------------------------------------------------------------------------
// Selection engine
// ---------------------------------------------------------------------------

/// Selection state reported after each live recompute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionUpdate {
    /// Selected link ids, document order.
    pub selected: Vec<LinkId>,

    /// Unique URLs among selected links, the number the label shows.
    pub display_count: usize,

    /// Overlapped links missing from the display count: filter drops plus
    /// collapsed duplicate URLs.
    pub filtered_count: usize,
}

/// Per-gesture selection state.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    index: GeometryIndex,
    filter: LinkFilter,
    marquee: Marquee,
    threshold: f64,
    active: bool,
    selected: Vec<LinkId>,
    overlap_count: usize,
    display_count: usize,
}

impl SelectionEngine {
    /// Begin a gesture at `anchor` over a frozen snapshot.
    #[must_use]
    pub fn begin(anchor: PagePoint, index: GeometryIndex, filter: LinkFilter) -> Self {
        Self {
            index,
            filter,
            marquee: Marquee::new(anchor),
            threshold: DRAG_THRESHOLD_PX,
            active: false,
            selected: Vec::new(),
            overlap_count: 0,
            display_count: 0,
        }
    }

    /// Override the dead-zone size.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Move the cursor and recompute.
    ///
    /// Returns `None` while the drag is still inside the dead zone; once it
    /// escapes, returns the recomputed selection and counts on every call.
    pub fn update(&mut self, cursor: PagePoint) -> Option<SelectionUpdate> {
        self.marquee.set_cursor(cursor);
        if !self.active {
            if !self.marquee.exceeds_threshold(self.threshold) {
                return None;
            }
            self.active = true;
        }
        Some(self.recompute())
    }

    /// Finish the gesture at `release`, returning the final filtered links
    /// in document order. Inactive gestures (never left the dead zone)
    /// produce nothing.
    pub fn end(&mut self, release: PagePoint) -> Vec<&IndexedLink> {
        if !self.active {
            return Vec::new();
        }
        self.marquee.set_cursor(release);
        self.recompute();
        self.selected
            .iter()
            .filter_map(|id| self.index.link(*id))
            .collect()
    }

    /// Swap the filter mid-gesture (settings push) and rerun the pass so
    /// highlights and counts reflect the new filter immediately.
    pub fn set_filter(&mut self, filter: LinkFilter) {
        self.filter = filter;
        if self.active {
            self.recompute();
        }
    }

    fn recompute(&mut self) -> SelectionUpdate {
        let rect = self.marquee.rect();
        let mut unique: HashSet<&str> = HashSet::new();

        self.selected.clear();
        self.overlap_count = 0;
        for link in self.index.links() {
            if !link.rect.overlaps(&rect) {
                continue;
            }
            self.overlap_count += 1;
            if self.filter.should_select(&link.href) {
                self.selected.push(link.id);
                unique.insert(link.href.as_str());
            }
        }
        self.display_count = unique.len();

        SelectionUpdate {
            selected: self.selected.clone(),
            display_count: self.display_count,
            filtered_count: self.filtered_count(),
        }
    }

    /// The count label for the current state, with the armed profile's name
    /// appended when there is one.
    #[must_use]
    pub fn label(&self, profile_name: Option<&str>) -> String {
        let count = self.display_count;
        let noun = if count == 1 { "link" } else { "links" };
        let filtered = self.filtered_count();

        let mut label = if count == 1 {
            "1 link selected".to_string()
        } else {
            format!("{count} links selected")
        };
        if self.filter.is_broken() {
            label.push_str(" (Filter invalid)");
        } else if self.filter.is_active() && filtered > 0 {
            label = format!("{count} {noun} ({filtered} filtered)");
        }
        if let Some(name) = profile_name
            && !name.is_empty()
        {
            label.push_str(" — ");
            label.push_str(name);
        }
        label
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn marquee(&self) -> &Marquee {
        &self.marquee
    }

    /// Selected link ids, document order.
    #[must_use]
    pub fn selected(&self) -> &[LinkId] {
        &self.selected
    }

    /// Whether a link is currently inside the selection.
    #[must_use]
    pub fn is_selected(&self, id: LinkId) -> bool {
        self.selected.binary_search(&id).is_ok()
    }

    #[must_use]
    pub fn index(&self) -> &GeometryIndex {
        &self.index
    }

    #[must_use]
    pub fn filter(&self) -> &LinkFilter {
        &self.filter
    }

    fn filtered_count(&self) -> usize {
        self.overlap_count - self.display_count
    }
}
