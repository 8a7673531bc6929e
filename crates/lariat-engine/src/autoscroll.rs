#![forbid(unsafe_code)]

//! Edge autoscroll.
//!
//! Dragging a marquee toward a viewport edge scrolls the page so the
//! selection can extend past what is visible. The decision is a pure
//! function of the pointer's viewport-relative Y: inside the bottom 20px
//! band scroll down, inside the top 20px band (when there is anywhere to
//! scroll up to) scroll up, with three speed tiers that get faster the
//! closer the pointer sits to the physical edge.
//!
//! [`AutoscrollController`] owns only the poll deadline. The activation
//! layer applies the returned delta to the host, shifts the virtual pointer
//! by the same amount, and re-runs selection so the marquee tracks the new
//! scroll position.
//!
//! # Invariants
//!
//! 1. `scroll_delta` is pure; all scheduling state lives in the controller.
//! 2. A pointer outside both bands yields `None`; the caller clears the
//!    poll until the next pointer move.
//! 3. A pointer past the physical edge (negative distance) uses the
//!    fastest tier.

use std::time::Duration;

use web_time::Instant;

/// Height of the top and bottom trigger bands.
pub const EDGE_ZONE_PX: f64 = 20.0;

const FAST_TIER_PX: f64 = 2.0;
const MID_TIER_PX: f64 = 10.0;
const FAST_SPEED_PX: f64 = 60.0;
const MID_SPEED_PX: f64 = 30.0;
const BASE_SPEED_PX: f64 = 10.0;

/// Scroll decision for one poll tick.
///
/// `pointer_page_y` is the virtual pointer's page Y, `viewport_height` the
/// visible height, `scroll_y` the current vertical scroll offset. Returns
/// the signed scroll delta (positive scrolls down), or `None` when the
/// pointer is outside both edge bands.
#[must_use]
pub fn scroll_delta(pointer_page_y: f64, viewport_height: f64, scroll_y: f64) -> Option<f64> {
    let y = pointer_page_y - scroll_y;
    if y > viewport_height - EDGE_ZONE_PX {
        Some(speed_for(viewport_height - y))
    } else if scroll_y > 0.0 && y < EDGE_ZONE_PX {
        Some(-speed_for(y))
    } else {
        None
    }
}

/// Speed tier for a distance-from-edge.
fn speed_for(distance: f64) -> f64 {
    if distance < FAST_TIER_PX {
        FAST_SPEED_PX
    } else if distance < MID_TIER_PX {
        MID_SPEED_PX
    } else {
        BASE_SPEED_PX
    }
}

/// Poll-deadline bookkeeping for the autoscroll loop.
#[derive(Debug, Clone)]
pub struct AutoscrollController {
    interval: Duration,
    deadline: Option<Instant>,
}

impl AutoscrollController {
    /// Create a controller polling at `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Arm the poll if it is not already running.
    pub fn ensure_armed(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.interval);
        }
    }

    /// Schedule the next tick after a step was applied.
    pub fn rearm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Stop polling.
    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// The pending poll deadline, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the poll deadline has arrived.
    #[must_use]
    pub fn due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}
