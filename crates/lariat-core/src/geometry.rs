#![forbid(unsafe_code)]

//! Page-coordinate geometry primitives.
//!
//! Everything the engine measures lives in *page coordinates*: CSS pixels
//! from the document origin, unaffected by scrolling. Fixed-position visuals
//! (the marquee box, highlight overlays, the count label) are placed in
//! *viewport coordinates*, obtained by subtracting the current scroll
//! offsets. [`PageRect`] and [`ViewportRect`] convert in both directions.
//!
//! The overlap predicate is inclusive: rectangles that merely touch along an
//! edge count as overlapping. Selection is a grab, not a containment test,
//! so the marquee brushing a link's edge selects it.
//!
//! ```
//! use lariat_core::geometry::{PagePoint, PageRect};
//!
//! let marquee = PageRect::from_points(PagePoint::new(10.0, 10.0), PagePoint::new(120.0, 15.0));
//! let link = PageRect::from_origin_size(0.0, 0.0, 50.0, 20.0);
//! assert!(marquee.overlaps(&link));
//! ```

/// A point in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PagePoint {
    /// X offset from the document origin, CSS pixels.
    pub x: f64,
    /// Y offset from the document origin, CSS pixels.
    pub y: f64,
}

impl PagePoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in page coordinates.
///
/// Invariant: `x1 <= x2` and `y1 <= y2`. Constructors normalize.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PageRect {
    /// Left edge.
    pub x1: f64,
    /// Top edge.
    pub y1: f64,
    /// Right edge.
    pub x2: f64,
    /// Bottom edge.
    pub y2: f64,
}

impl PageRect {
    /// Build from two corner points in any order.
    #[must_use]
    pub fn from_points(a: PagePoint, b: PagePoint) -> Self {
        Self {
            x1: a.x.min(b.x),
            y1: a.y.min(b.y),
            x2: a.x.max(b.x),
            y2: a.y.max(b.y),
        }
    }

    /// Build from an origin and a size. Negative sizes are clamped to zero.
    #[must_use]
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width.max(0.0),
            y2: y + height.max(0.0),
        }
    }

    /// Width of the rectangle.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    /// Height of the rectangle.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> PagePoint {
        PagePoint::new(self.x1, self.y1)
    }

    /// Inclusive AABB overlap: touching edges count.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.x1 > other.x2 || self.x2 < other.x1 || self.y1 > other.y2 || self.y2 < other.y1)
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    /// Project into viewport coordinates given the current scroll offsets.
    #[must_use]
    pub fn to_viewport(&self, scroll: PagePoint) -> ViewportRect {
        ViewportRect {
            left: self.x1 - scroll.x,
            top: self.y1 - scroll.y,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// A rectangle in viewport coordinates, as reported by the host's bounding
/// rects and consumed by fixed-position placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportRect {
    /// Distance from the viewport's left edge.
    pub left: f64,
    /// Distance from the viewport's top edge.
    pub top: f64,
    /// Width in CSS pixels.
    pub width: f64,
    /// Height in CSS pixels.
    pub height: f64,
}

impl ViewportRect {
    /// Create a viewport rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Convert to page coordinates given the current scroll offsets.
    #[must_use]
    pub fn to_page(&self, scroll: PagePoint) -> PageRect {
        PageRect::from_origin_size(
            self.left + scroll.x,
            self.top + scroll.y,
            self.width,
            self.height,
        )
    }
}

/// A point in viewport coordinates, for fixed-position placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportPoint {
    /// Distance from the viewport's left edge.
    pub x: f64,
    /// Distance from the viewport's top edge.
    pub y: f64,
}

impl ViewportPoint {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Project a page point into the viewport given the current scroll.
    #[must_use]
    pub fn from_page(point: PagePoint, scroll: PagePoint) -> Self {
        Self {
            x: point.x - scroll.x,
            y: point.y - scroll.y,
        }
    }
}
