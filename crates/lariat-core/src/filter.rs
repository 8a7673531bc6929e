#![forbid(unsafe_code)]

//! Link filtering.
//!
//! Two separate filters act on links at different moments:
//!
//! - [`LinkFilter`] runs on every overlap recompute, against hrefs of links
//!   inside the marquee. It is configured per action
//!   (`filterPattern`/`filterMode`/`filterCaseInsensitive`) and **fails
//!   open**: an uncompilable pattern selects everything and is surfaced in
//!   the count label rather than silently dropping links.
//! - [`IgnoreFilter`] runs once per snapshot, against hrefs *and* inner
//!   markup, deciding which anchors become candidates at all. It comes from
//!   the action's `ignore` list (`[mode, ...patterns]`, patterns joined with
//!   `|`). An uncompilable joined pattern disables the step for that
//!   snapshot.
//!
//! Both match case-insensitively when so configured (the ignore list always
//! does, matching the settings collaborator's contract).

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Per-action link filter
// ---------------------------------------------------------------------------

/// Whether a filter match keeps or drops a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Keep links the pattern matches.
    Include,

    /// Drop links the pattern matches.
    #[default]
    Exclude,
}

/// The compiled per-action link filter.
#[derive(Debug, Clone)]
pub enum LinkFilter {
    /// No pattern configured; every link passes.
    Disabled,

    /// A compiled pattern and its mode.
    Active {
        /// The compiled pattern.
        regex: Regex,
        /// Keep or drop on match.
        mode: FilterMode,
    },

    /// The configured pattern failed to compile. Every link passes and the
    /// selection label surfaces the breakage.
    Broken,
}

impl LinkFilter {
    /// Compile a filter, folding compile failure into [`LinkFilter::Broken`].
    #[must_use]
    pub fn compile(pattern: &str, mode: FilterMode, case_insensitive: bool) -> Self {
        match Self::try_compile(pattern, mode, case_insensitive) {
            Ok(filter) => filter,
            Err(_) => Self::Broken,
        }
    }

    /// Compile a filter, reporting the compile failure to the caller (which
    /// logs it and stores [`LinkFilter::Broken`]).
    pub fn try_compile(
        pattern: &str,
        mode: FilterMode,
        case_insensitive: bool,
    ) -> Result<Self, regex::Error> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(Self::Disabled);
        }
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self::Active { regex, mode })
    }

    /// Whether a selected link passes the filter.
    #[must_use]
    pub fn should_select(&self, url: &str) -> bool {
        match self {
            Self::Disabled | Self::Broken => true,
            Self::Active { regex, mode } => {
                let matches = regex.is_match(url);
                match mode {
                    FilterMode::Include => matches,
                    FilterMode::Exclude => !matches,
                }
            }
        }
    }

    /// True when the configured pattern failed to compile.
    #[must_use]
    pub const fn is_broken(&self) -> bool {
        matches!(self, Self::Broken)
    }

    /// True when a pattern is compiled and filtering.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::Disabled
    }
}

// ---------------------------------------------------------------------------
// Snapshot-time ignore filter
// ---------------------------------------------------------------------------

/// Mode flag at `ignore[0]` in the wire shape.
///
/// Serialized as an integer inside the `ignore` array (see
/// `settings::IgnoreList`), not via derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IgnoreMode {
    /// Drop anchors the pattern matches.
    #[default]
    Exclude,

    /// Keep only anchors the pattern matches.
    Include,
}

impl IgnoreMode {
    /// Map the wire integer (0 = exclude, 1 = include). Unknown values fall
    /// back to exclude, the permissive mode.
    #[must_use]
    pub const fn from_wire(value: i64) -> Self {
        match value {
            1 => Self::Include,
            _ => Self::Exclude,
        }
    }

    /// The wire integer.
    #[must_use]
    pub const fn to_wire(self) -> i64 {
        match self {
            Self::Exclude => 0,
            Self::Include => 1,
        }
    }
}

/// Compiled snapshot-time ignore filter.
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    mode: IgnoreMode,
    regex: Regex,
}

impl IgnoreFilter {
    /// Compile the ignore list's patterns into one case-insensitive
    /// alternation. `Ok(None)` means the list has no patterns and the step
    /// is disabled.
    pub fn try_compile(
        mode: IgnoreMode,
        patterns: &[String],
    ) -> Result<Option<Self>, regex::Error> {
        if patterns.is_empty() {
            return Ok(None);
        }
        let joined = patterns.join("|");
        let regex = RegexBuilder::new(&joined).case_insensitive(true).build()?;
        Ok(Some(Self { mode, regex }))
    }

    /// Whether an anchor survives the ignore step. Tested against both the
    /// href and the anchor's inner markup.
    #[must_use]
    pub fn keeps(&self, href: &str, markup: &str) -> bool {
        let matched = self.regex.is_match(href) || self.regex.is_match(markup);
        match self.mode {
            IgnoreMode::Exclude => !matched,
            IgnoreMode::Include => matched,
        }
    }

    /// The configured mode.
    #[must_use]
    pub const fn mode(&self) -> IgnoreMode {
        self.mode
    }
}
