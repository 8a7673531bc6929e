#![forbid(unsafe_code)]

//! Settings payload model.
//!
//! The settings collaborator (extension background/storage layer) owns
//! normalization and persistence; the engine receives the already-normalized
//! payload as JSON (at attach time and again on every push update) and
//! treats it as read-only input. This module is the typed mirror of that
//! payload: defaulted serde structs so partial payloads parse, plus the
//! validation attach uses to refuse operating on broken state.
//!
//! Wire shape (camelCase, as produced by the collaborator):
//!
//! ```json
//! {
//!   "actions": {
//!     "101": {
//!       "mouse": 0, "key": 90, "action": "tabs", "color": "#FFA500",
//!       "options": {
//!         "smart": 0, "ignore": [0], "delay": 0, "close": 0,
//!         "block": true, "reverse": false, "end": false,
//!         "filterPattern": "", "filterMode": "exclude",
//!         "filterCaseInsensitive": true, "copy": 0
//!       }
//!     }
//!   },
//!   "profiles": [
//!     { "id": "p1", "name": "Open tabs",
//!       "trigger": { "kind": "key", "key": "z",
//!                    "mods": { "shift": false, "alt": false,
//!                              "ctrl": false, "meta": false },
//!                    "mouseButton": 0 },
//!       "actionId": "101" }
//!   ],
//!   "blocked": ["^https?://intranet\\."]
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use regex::RegexBuilder;
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::filter::{FilterMode, IgnoreMode};
use crate::trigger::{TriggerKind, TriggerProfile, normalize_key};

/// Fallback marquee color when an action's color is missing or malformed.
pub const DEFAULT_SELECTION_COLOR: &str = "#3b82f6";

/// Ordered action map. `BTreeMap` keeps "first action" deterministic for the
/// empty-profile-list fallback.
pub type ActionMap = BTreeMap<String, ActionConfig>;

// ---------------------------------------------------------------------------
// Top-level payload
// ---------------------------------------------------------------------------

/// The full settings payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Actions by id.
    pub actions: ActionMap,

    /// Trigger profiles, in priority (list) order.
    pub profiles: Vec<TriggerProfile>,

    /// Per-site block patterns (regex strings, case-insensitive). A page
    /// whose URL matches any non-empty pattern never attaches.
    pub blocked: Vec<String>,

    /// Verbose-diagnostics toggle from the options page.
    pub debug_mode: bool,
}

impl Settings {
    /// Parse a payload from JSON. Missing fields take their defaults; type
    /// mismatches are a [`SettingsError::Json`].
    pub fn from_json_str(s: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(s).map_err(SettingsError::Json)
    }

    /// Validate the payload for attach.
    ///
    /// Returns a list of violations; empty means valid. Dangling profile
    /// action ids are deliberately *not* violations (they are skipped at
    /// match time), and malformed colors are not either (they normalize to
    /// the default).
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.actions.is_empty() {
            errors.push("actions map is empty".into());
        }

        for profile in &self.profiles {
            if profile.action_id.is_empty() {
                errors.push(format!("profile {:?} has an empty actionId", profile.id));
            }
            if let Some(modifier) = self_excluded_modifier(profile) {
                errors.push(format!(
                    "profile {:?} uses {modifier} both as key and as required modifier",
                    profile.id
                ));
            }
        }

        errors
    }

    /// First action id in map order, the empty-profile-list fallback target.
    #[must_use]
    pub fn first_action_id(&self) -> Option<&str> {
        self.actions.keys().next().map(String::as_str)
    }

    /// Look up an action by id.
    #[must_use]
    pub fn action(&self, id: &str) -> Option<&ActionConfig> {
        self.actions.get(id)
    }

    /// The action the engine derives ambient color/filter state from: the
    /// given id when it resolves, otherwise the first configured action.
    #[must_use]
    pub fn active_or_first(&self, active: Option<&str>) -> Option<(&str, &ActionConfig)> {
        if let Some(id) = active
            && let Some((key, cfg)) = self.actions.get_key_value(id)
        {
            return Some((key.as_str(), cfg));
        }
        self.actions
            .iter()
            .next()
            .map(|(id, cfg)| (id.as_str(), cfg))
    }

    /// True if any non-empty blocked pattern matches the page URL. Patterns
    /// compile case-insensitively; uncompilable ones are skipped (see
    /// [`Settings::invalid_blocked_patterns`] for surfacing them).
    #[must_use]
    pub fn blocks_url(&self, url: &str) -> bool {
        self.blocked
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .any(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| re.is_match(url))
                    .unwrap_or(false)
            })
    }

    /// The blocked-list entries that fail to compile, for logging.
    #[must_use]
    pub fn invalid_blocked_patterns(&self) -> Vec<(&str, regex::Error)> {
        self.blocked
            .iter()
            .filter(|pattern| !pattern.is_empty())
            .filter_map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .err()
                    .map(|e| (pattern.as_str(), e))
            })
            .collect()
    }
}

/// The modifier name a key-kind profile illegally doubles as, if any.
fn self_excluded_modifier(profile: &TriggerProfile) -> Option<&'static str> {
    if profile.trigger.kind != TriggerKind::Key {
        return None;
    }
    let key = normalize_key(&profile.trigger.key)?;
    let mods = profile.trigger.mods;
    match key.as_str() {
        "shift" if mods.shift => Some("shift"),
        "alt" if mods.alt => Some("alt"),
        "ctrl" | "control" if mods.ctrl => Some("ctrl"),
        "meta" if mods.meta => Some("meta"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// One configured action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionConfig {
    /// Legacy single-action trigger button. Superseded by profiles; carried
    /// for payload fidelity.
    pub mouse: i64,

    /// Legacy single-action trigger keycode. Superseded by profiles.
    pub key: i64,

    /// What the dispatch sink does with the matched links.
    pub action: ActionKind,

    /// Marquee/highlight color, `#RRGGBB`.
    pub color: String,

    /// Behavior knobs.
    pub options: ActionOptions,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            mouse: 0,
            key: 90,
            action: ActionKind::Tabs,
            color: "#FFA500".to_string(),
            options: ActionOptions::default(),
        }
    }
}

impl ActionConfig {
    /// The action's color, normalized (see [`normalize_hex_color`]).
    #[must_use]
    pub fn normalized_color(&self) -> String {
        normalize_hex_color(&self.color)
    }
}

/// What a dispatched selection is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Open each link in a tab.
    #[default]
    Tabs,

    /// Open the links in a new window.
    Win,

    /// Copy formatted text.
    Copy,

    /// File as bookmarks.
    Bm,

    /// Export the list.
    Export,
}

/// Behavior knobs of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionOptions {
    /// Smart-select mode. `0` enables the heading-importance flag on
    /// snapshot candidates; `1` disables it.
    pub smart: u8,

    /// Snapshot-time ignore list, `[mode, ...patterns]` on the wire.
    pub ignore: IgnoreList,

    /// Seconds between opens (dispatch-sink concern).
    pub delay: u32,

    /// Seconds before auto-closing opened tabs (dispatch-sink concern).
    pub close: u32,

    /// Deduplicate dispatched links by URL (first occurrence wins).
    pub block: bool,

    /// Reverse the dispatched link order.
    pub reverse: bool,

    /// Open new tabs at the end of the tab strip (dispatch-sink concern).
    pub end: bool,

    /// Link-filter pattern; empty disables the filter.
    pub filter_pattern: String,

    /// Keep or drop filter matches.
    pub filter_mode: FilterMode,

    /// Case-insensitive filter matching.
    pub filter_case_insensitive: bool,

    /// Copy format index (dispatch-sink concern).
    pub copy: u8,
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            smart: 0,
            ignore: IgnoreList::default(),
            delay: 0,
            close: 0,
            block: true,
            reverse: false,
            end: false,
            filter_pattern: String::new(),
            filter_mode: FilterMode::Exclude,
            filter_case_insensitive: true,
            copy: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Ignore list (heterogeneous wire array)
// ---------------------------------------------------------------------------

/// The snapshot-time ignore list.
///
/// Wire form is a heterogeneous array: element 0 is the mode flag
/// (0 = exclude matches, 1 = include only matches), the rest are pattern
/// fragments. `[0]` alone (or an empty array) disables the step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IgnoreList {
    /// Keep-or-drop mode.
    pub mode: IgnoreMode,

    /// Pattern fragments, joined with `|` at compile time.
    pub patterns: Vec<String>,
}

impl IgnoreList {
    /// Build a list.
    #[must_use]
    pub fn new(mode: IgnoreMode, patterns: Vec<String>) -> Self {
        Self { mode, patterns }
    }

    /// True when no patterns are configured (step disabled).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Serialize for IgnoreList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(1 + self.patterns.len()))?;
        seq.serialize_element(&self.mode.to_wire())?;
        for pattern in &self.patterns {
            seq.serialize_element(pattern)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for IgnoreList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IgnoreListVisitor;

        impl<'de> Visitor<'de> for IgnoreListVisitor {
            type Value = IgnoreList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array of [mode, ...patterns]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<IgnoreList, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mode = match seq.next_element::<i64>()? {
                    Some(flag) => IgnoreMode::from_wire(flag),
                    None => IgnoreMode::default(),
                };
                let mut patterns = Vec::new();
                while let Some(pattern) = seq.next_element::<String>()? {
                    patterns.push(pattern);
                }
                Ok(IgnoreList { mode, patterns })
            }
        }

        deserializer.deserialize_seq(IgnoreListVisitor)
    }
}

// ---------------------------------------------------------------------------
// Color normalization
// ---------------------------------------------------------------------------

/// Normalize a color to `#RRGGBB`.
///
/// A bare `RRGGBB` gains the `#`; anything else falls back to
/// [`DEFAULT_SELECTION_COLOR`].
#[must_use]
pub fn normalize_hex_color(value: &str) -> String {
    let hex = value.trim();
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return format!("#{digits}");
    }
    DEFAULT_SELECTION_COLOR.to_string()
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that keep a settings payload from being used.
#[derive(Debug)]
pub enum SettingsError {
    /// JSON parse error.
    Json(serde_json::Error),

    /// Validation violations (see [`Settings::validate`]).
    Validation(Vec<String>),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
