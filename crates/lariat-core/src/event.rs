#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! This module defines the standard event types the engine consumes. The
//! embedder translates host events (DOM mouse/keyboard events in a browser,
//! synthetic events in tests) into these types and feeds them to the
//! activation controller. All events derive `Clone` and `PartialEq` for use
//! in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Pointer coordinates are page coordinates (CSS pixels from the document
//!   origin), not viewport coordinates.
//! - `Modifiers` use bitflags; bit order matches the shift/alt/ctrl/meta
//!   digit order used in trigger signatures.
//! - Key tokens carry the already-normalized (trimmed, lowercased) character
//!   for printable keys. End and Home are distinguished because they scroll
//!   the page and must never be tracked as held trigger keys.

use bitflags::bitflags;

use crate::geometry::PagePoint;

/// An input event fed to the activation controller.
///
/// Each variant corresponds to one host listener. The controller answers
/// with an [`InputDisposition`] telling the embedder whether to swallow the
/// native event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer button pressed.
    PointerDown(PointerEvent),

    /// Pointer moved while the engine holds move/up listeners.
    PointerMove(PointerEvent),

    /// Pointer button released.
    PointerUp(PointerEvent),

    /// Pointer left the document area (fires alongside a final move).
    PointerOut(PointerEvent),

    /// Wheel scroll during a gesture. The engine re-projects its visuals;
    /// the scroll itself belongs to the page.
    Wheel,

    /// Key pressed.
    KeyDown(KeyPress),

    /// Key released.
    KeyUp(KeyPress),

    /// Window lost focus. Clears held-key state.
    Blur,

    /// The host is about to open the native context menu.
    ContextMenu,
}

/// What the embedder should do with the native event it just forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    /// Stop propagation and prevent the default action.
    Consume,

    /// Let the event proceed untouched.
    PassThrough,
}

impl InputDisposition {
    /// True if the native event should be swallowed.
    #[must_use]
    pub const fn is_consumed(self) -> bool {
        matches!(self, Self::Consume)
    }
}

/// A pointer event in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// X coordinate (page pixels, document origin).
    pub x: f64,

    /// Y coordinate (page pixels, document origin).
    pub y: f64,

    /// The button involved. For move events this is the button still held.
    pub button: MouseButton,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// What kind of element the event targeted.
    pub target: TargetKind,
}

impl PointerEvent {
    /// Create a pointer event with no modifiers on a normal target.
    #[must_use]
    pub const fn new(x: f64, y: f64, button: MouseButton) -> Self {
        Self {
            x,
            y,
            button,
            modifiers: Modifiers::NONE,
            target: TargetKind::Normal,
        }
    }

    /// Set the modifier state.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the target kind.
    #[must_use]
    pub const fn with_target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }

    /// Position as a page point.
    #[must_use]
    pub const fn pos(&self) -> PagePoint {
        PagePoint::new(self.x, self.y)
    }
}

/// What kind of element an event targeted.
///
/// The host decides: inputs, textareas, and content-editable elements (or
/// descendants of one) are `Editable`. No gesture may start from an editable
/// target and key events on them are ignored entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetKind {
    /// An ordinary page element.
    #[default]
    Normal,

    /// An input, textarea, or content-editable element.
    Editable,
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// The key, normalized (see [`KeyToken`]).
    pub token: KeyToken,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// True for auto-repeat events. Repeats never update held-key state.
    pub repeat: bool,

    /// What kind of element the event targeted.
    pub target: TargetKind,
}

impl KeyPress {
    /// Create a key press with default modifiers.
    #[must_use]
    pub const fn new(token: KeyToken) -> Self {
        Self {
            token,
            modifiers: Modifiers::NONE,
            repeat: false,
            target: TargetKind::Normal,
        }
    }

    /// Convenience constructor for a printable key, normalizing the char.
    #[must_use]
    pub fn char(c: char) -> Self {
        Self::new(KeyToken::Char(c.to_ascii_lowercase()))
    }

    /// Set the modifier state.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Mark as an auto-repeat event.
    #[must_use]
    pub const fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Set the target kind.
    #[must_use]
    pub const fn with_target(mut self, target: TargetKind) -> Self {
        self.target = target;
        self
    }
}

/// A normalized key identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyToken {
    /// A printable key, lowercased. This is what trigger profiles match.
    Char(char),

    /// End key. Scrolls the page; excluded from held-key tracking.
    End,

    /// Home key. Scrolls the page; excluded from held-key tracking.
    Home,

    /// Any other key (modifiers, arrows, function keys).
    Other,
}

bitflags! {
    /// Modifier keys that can be held during an event.
    ///
    /// Bit order matches the shift/alt/ctrl/meta digit order of trigger
    /// signatures (see `Signature`'s `Display`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Meta/Command/Windows key.
        const META  = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

impl Modifiers {
    /// Build from the four modifier booleans of a host event.
    #[must_use]
    pub fn from_flags(shift: bool, alt: bool, ctrl: bool, meta: bool) -> Self {
        let mut mods = Self::NONE;
        if shift {
            mods |= Self::SHIFT;
        }
        if alt {
            mods |= Self::ALT;
        }
        if ctrl {
            mods |= Self::CTRL;
        }
        if meta {
            mods |= Self::META;
        }
        mods
    }
}

/// Mouse button identifiers, following the web button numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) button, index 0.
    Left,

    /// Auxiliary (middle/wheel) button, index 1.
    Middle,

    /// Secondary (right) button, index 2.
    Right,

    /// Browser-back button, index 3.
    Back,

    /// Browser-forward button, index 4.
    Forward,

    /// Any other button index.
    Other(u8),
}

impl MouseButton {
    /// Map a host button index to a button.
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            3 => Self::Back,
            4 => Self::Forward,
            n => Self::Other(n),
        }
    }

    /// The host button index. Trigger signatures compare on this.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Middle => 1,
            Self::Right => 2,
            Self::Back => 3,
            Self::Forward => 4,
            Self::Other(n) => n,
        }
    }

    /// True for the primary button.
    #[must_use]
    pub const fn is_primary(self) -> bool {
        matches!(self, Self::Left)
    }
}
