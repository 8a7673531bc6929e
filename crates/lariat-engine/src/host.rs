#![forbid(unsafe_code)]

//! Host page abstraction.
//!
//! The engine never touches a DOM directly. Everything it needs from the
//! page arrives through [`PageHost`]: the URL, viewport and scroll metrics,
//! and the raw link candidates a snapshot is built from. The host only
//! *reads* page structure; the single mutation the engine asks for is a
//! relative scroll during edge autoscroll.
//!
//! # Invariants
//!
//! 1. `link_candidates` returns elements in document order.
//! 2. Candidate rects are viewport-relative at the moment of the call;
//!    the engine converts to page coordinates itself using `scroll`.
//! 3. `scroll_by` clamps to the document's valid scroll range.

use lariat_core::geometry::{PagePoint, ViewportRect};

/// Viewport dimensions in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    /// Create a size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A raw anchor element as the host sees it, before any snapshot filtering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkCandidate {
    /// Resolved absolute URL (the DOM `href` property).
    pub href: String,

    /// Literal attribute value (the DOM `href` attribute). Empty or `"#"`
    /// placeholders are rejected at snapshot time.
    pub raw_href: String,

    /// Visible text, used as the dispatch title.
    pub text: String,

    /// Inner markup, matched by the ignore list alongside the URL.
    pub markup: String,

    /// Computed-style hidden (visibility hidden or display none).
    pub hidden: bool,

    /// Bounding rect in viewport coordinates.
    pub rect: ViewportRect,

    /// Bounding rects of direct image children, for image links whose
    /// visual extent exceeds the anchor's own box.
    pub image_rects: Vec<ViewportRect>,

    /// Tag name of the immediate parent element, uppercase (`"H2"`, `"P"`).
    pub parent_tag: String,
}

/// Read access to the page the engine is attached to.
pub trait PageHost {
    /// The page URL, checked against the scheme and block-list gates.
    fn url(&self) -> &str;

    /// Current viewport size.
    fn viewport(&self) -> ViewportSize;

    /// Current scroll offsets in page coordinates.
    fn scroll(&self) -> PagePoint;

    /// Total scrollable document height.
    fn document_height(&self) -> f64;

    /// All anchor elements on the page, in document order.
    fn link_candidates(&self) -> Vec<LinkCandidate>;

    /// Scroll the page by a relative delta, clamped to the valid range.
    fn scroll_by(&mut self, dx: f64, dy: f64);
}
