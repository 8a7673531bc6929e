#![forbid(unsafe_code)]

//! Overlay surface abstraction.
//!
//! The engine draws three things while a gesture runs: the marquee box, the
//! count label that rides 12px off the pointer, and one highlight per
//! selected link. All placement is in viewport coordinates; the engine does
//! the page-to-viewport projection before calling in.
//!
//! Highlight overlays are keyed by [`LinkId`] so a surface can create them
//! lazily on first selection and merely hide them when a link drops out of
//! the marquee, instead of churning the overlay tree on every pointer move.
//! `clear_overlays` is the hard reset at gesture end.

use lariat_core::geometry::{ViewportPoint, ViewportRect};

use crate::index::LinkId;

/// Offset of the count label from the pointer, both axes.
pub const LABEL_POINTER_OFFSET_PX: f64 = 12.0;

/// Draw target for gesture visuals.
pub trait Surface {
    /// Show or move the marquee box. `color` is a normalized `#RRGGBB`.
    fn show_marquee(&mut self, rect: ViewportRect, color: &str);

    /// Hide the marquee box without destroying it.
    fn hide_marquee(&mut self);

    /// Show or move the count label.
    fn show_label(&mut self, text: &str, at: ViewportPoint);

    /// Hide the count label.
    fn hide_label(&mut self);

    /// Show or move the highlight for one link.
    fn highlight(&mut self, id: LinkId, rect: ViewportRect, color: &str);

    /// Hide the highlight for one link. May be called for links that were
    /// never highlighted; surfaces ignore unknown ids.
    fn clear_highlight(&mut self, id: LinkId);

    /// Destroy all overlays (marquee, label, highlights).
    fn clear_overlays(&mut self);

    /// Enable or disable the page's native text/element selection.
    fn set_text_selection_enabled(&mut self, enabled: bool);
}
