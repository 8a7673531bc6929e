#![forbid(unsafe_code)]

//! Trigger profiles, signatures, and resolution.
//!
//! A *trigger profile* maps an input combination (optional key, modifier
//! set, mouse button) to an action id. At pointer-down the engine asks
//! [`TriggerRegistry::resolve`] which profile, if any, the current input
//! arms. Matching is signature-based: the held key + its modifiers + the
//! pressed button form a key-kind [`Signature`]; the pointer event's
//! modifiers + button form a mods-kind signature. Key-kind profiles are
//! tried first, then mods-kind profiles, each in list order, first match
//! wins.
//!
//! # Invariants
//!
//! 1. Resolution is pure: same inputs, same answer, no internal state.
//! 2. A key-kind profile can only match while its key is held. Pointer-downs
//!    with no held key go through [`TriggerRegistry::resolve_late`] after the
//!    grace window instead.
//! 3. A profile whose action id is absent from the action set never matches
//!    (dangling reference); scanning continues past it.
//! 4. Upstream normalization guarantees signature uniqueness within a
//!    profile list; the registry itself just takes the first match.
//!
//! # Failure Modes
//!
//! - Empty profile list: falls back to the first configured action, primary
//!   button only. No profiles and no actions resolves nothing.
//! - Malformed profiles (key-kind without a key) produce mods-kind
//!   signatures and therefore never match the key pass; they are inert
//!   rather than an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::{Modifiers, MouseButton};
use crate::settings::ActionMap;

// ---------------------------------------------------------------------------
// Profile model (wire shape)
// ---------------------------------------------------------------------------

/// A named rule mapping an input combination to an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerProfile {
    /// Stable profile id, assigned by the settings collaborator.
    pub id: String,

    /// Human-readable name, shown in the selection count label.
    pub name: String,

    /// The input combination.
    pub trigger: TriggerSpec,

    /// Target action id in the action map.
    pub action_id: String,
}

impl Default for TriggerProfile {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            trigger: TriggerSpec::default(),
            action_id: String::new(),
        }
    }
}

/// The input combination of a profile.
///
/// `key` is meaningful only when `kind` is [`TriggerKind::Key`]; upstream
/// normalization keeps it a single lowercase character and guarantees the
/// key does not simultaneously appear as a required modifier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerSpec {
    /// Whether a held key participates in matching.
    pub kind: TriggerKind,

    /// Activation key for key-kind triggers.
    pub key: String,

    /// Required modifier state.
    pub mods: ModFlags,

    /// Required mouse button (web button index).
    pub mouse_button: u8,
}

impl TriggerSpec {
    /// The signature this spec matches against.
    #[must_use]
    pub fn signature(&self) -> Signature {
        if self.kind == TriggerKind::Key
            && let Some(key) = normalize_key(&self.key)
        {
            return Signature::Key {
                key,
                mods: self.mods.to_modifiers(),
                button: self.mouse_button,
            };
        }
        Signature::Mods {
            mods: self.mods.to_modifiers(),
            button: self.mouse_button,
        }
    }
}

/// Which matching pass a trigger participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    /// Matches while the profile's key is held.
    Key,

    /// Matches on modifiers + button alone (includes the bare
    /// "left-drag, no key" profile).
    #[default]
    Mods,
}

/// Wire shape of a modifier requirement: four independent booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModFlags {
    pub shift: bool,
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
}

impl ModFlags {
    /// Collapse into the bitflag form used for matching.
    #[must_use]
    pub fn to_modifiers(self) -> Modifiers {
        Modifiers::from_flags(self.shift, self.alt, self.ctrl, self.meta)
    }

    /// Expand from the bitflag form.
    #[must_use]
    pub fn from_modifiers(mods: Modifiers) -> Self {
        Self {
            shift: mods.contains(Modifiers::SHIFT),
            alt: mods.contains(Modifiers::ALT),
            ctrl: mods.contains(Modifiers::CTRL),
            meta: mods.contains(Modifiers::META),
        }
    }
}

/// Normalize a raw key string: trim, lowercase, reject empty.
#[must_use]
pub fn normalize_key(raw: &str) -> Option<String> {
    let s = raw.trim().to_lowercase();
    if s.is_empty() { None } else { Some(s) }
}

// ---------------------------------------------------------------------------
// Signatures
// ---------------------------------------------------------------------------

/// The identity an input combination matches on.
///
/// Two forms: key-kind (held key + its modifiers + button) and mods-kind
/// (modifiers + button, key absent). `Display` renders the canonical log
/// form, e.g. `key:z|mods:0100|btn:0`, where the four digits are
/// shift/alt/ctrl/meta.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signature {
    /// A held-key combination.
    Key {
        /// Normalized (trimmed, lowercased) key.
        key: String,
        /// Modifiers captured when the key went down.
        mods: Modifiers,
        /// Web button index.
        button: u8,
    },

    /// A modifier-only combination.
    Mods {
        /// Modifiers on the pointer event itself.
        mods: Modifiers,
        /// Web button index.
        button: u8,
    },
}

impl Signature {
    /// Key-kind signature for the currently held key.
    #[must_use]
    pub fn held(key: &str, mods: Modifiers, button: MouseButton) -> Self {
        Self::Key {
            key: key.to_string(),
            mods,
            button: button.index(),
        }
    }

    /// Mods-kind signature for a pointer event.
    #[must_use]
    pub fn mods_only(mods: Modifiers, button: MouseButton) -> Self {
        Self::Mods {
            mods,
            button: button.index(),
        }
    }
}

fn write_mod_bits(f: &mut fmt::Formatter<'_>, mods: Modifiers) -> fmt::Result {
    for flag in [
        Modifiers::SHIFT,
        Modifiers::ALT,
        Modifiers::CTRL,
        Modifiers::META,
    ] {
        write!(f, "{}", u8::from(mods.contains(flag)))?;
    }
    Ok(())
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key { key, mods, button } => {
                write!(f, "key:{key}|mods:")?;
                write_mod_bits(f, *mods)?;
                write!(f, "|btn:{button}")
            }
            Self::Mods { mods, button } => {
                write!(f, "mods:")?;
                write_mod_bits(f, *mods)?;
                write!(f, "|btn:{button}")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Held-key state
// ---------------------------------------------------------------------------

/// The key currently held for trigger matching.
///
/// Captured on a non-repeat key-down of a printable key, together with the
/// modifier state *at that moment*; the pointer event's own modifiers are
/// deliberately not used for key-kind matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldKey {
    /// Lowercased printable key.
    pub key: char,

    /// Modifiers held when the key went down.
    pub modifiers: Modifiers,
}

impl HeldKey {
    /// Create a held-key record.
    #[must_use]
    pub const fn new(key: char, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    fn signature(&self, button: MouseButton) -> Signature {
        Signature::Key {
            key: self.key.to_string(),
            mods: self.modifiers,
            button: button.index(),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// What a successful resolution armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTrigger<'a> {
    /// The action to dispatch at gesture end.
    pub action_id: &'a str,

    /// The matching profile; `None` for the empty-profile-list fallback.
    pub profile: Option<&'a TriggerProfile>,
}

/// Matches input combinations against a profile list.
///
/// Borrowed per resolution from the current settings; holds no state of its
/// own (invariant 1 above).
#[derive(Debug, Clone, Copy)]
pub struct TriggerRegistry<'a> {
    profiles: &'a [TriggerProfile],
    actions: &'a ActionMap,
}

impl<'a> TriggerRegistry<'a> {
    /// Create a registry over the given profile list and action set.
    #[must_use]
    pub fn new(profiles: &'a [TriggerProfile], actions: &'a ActionMap) -> Self {
        Self { profiles, actions }
    }

    /// Resolve a pointer-down into an action, if any profile matches.
    ///
    /// `held` is the tracked held key (with its captured modifiers),
    /// `pointer_mods` the modifier state on the pointer event itself. The
    /// key pass runs first, then the mods pass; within a pass, list order
    /// decides.
    #[must_use]
    pub fn resolve(
        &self,
        held: Option<&HeldKey>,
        pointer_mods: Modifiers,
        button: MouseButton,
    ) -> Option<ResolvedTrigger<'a>> {
        if self.profiles.is_empty() {
            return self.fallback(button);
        }

        if let Some(held) = held {
            let sig = held.signature(button);
            if let Some(found) = self.scan(TriggerKind::Key, &sig) {
                return Some(found);
            }
        }

        let sig = Signature::mods_only(pointer_mods, button);
        self.scan(TriggerKind::Mods, &sig)
    }

    /// Late-arm resolution: key-kind profiles only, against the key that
    /// arrived during the grace window and the original pointer-down button.
    #[must_use]
    pub fn resolve_late(
        &self,
        held: &HeldKey,
        button: MouseButton,
    ) -> Option<ResolvedTrigger<'a>> {
        let sig = held.signature(button);
        self.scan(TriggerKind::Key, &sig)
    }

    fn scan(&self, kind: TriggerKind, sig: &Signature) -> Option<ResolvedTrigger<'a>> {
        self.profiles
            .iter()
            .filter(|p| p.trigger.kind == kind)
            .find(|p| p.trigger.signature() == *sig && self.actions.contains_key(&p.action_id))
            .map(|p| ResolvedTrigger {
                action_id: &p.action_id,
                profile: Some(p),
            })
    }

    /// With no profiles configured, a primary-button drag falls back to the
    /// first configured action.
    fn fallback(&self, button: MouseButton) -> Option<ResolvedTrigger<'a>> {
        if !button.is_primary() {
            return None;
        }
        self.actions.keys().next().map(|id| ResolvedTrigger {
            action_id: id,
            profile: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ActionConfig;

    fn actions(ids: &[&str]) -> ActionMap {
        ids.iter()
            .map(|id| ((*id).to_string(), ActionConfig::default()))
            .collect()
    }

    fn key_profile(key: &str, mods: ModFlags, button: u8, action_id: &str) -> TriggerProfile {
        TriggerProfile {
            id: format!("p-{key}-{button}"),
            name: format!("{key} profile"),
            trigger: TriggerSpec {
                kind: TriggerKind::Key,
                key: key.to_string(),
                mods,
                mouse_button: button,
            },
            action_id: action_id.to_string(),
        }
    }

    fn mods_profile(mods: ModFlags, button: u8, action_id: &str) -> TriggerProfile {
        TriggerProfile {
            id: format!("m-{button}"),
            name: "mods profile".to_string(),
            trigger: TriggerSpec {
                kind: TriggerKind::Mods,
                key: String::new(),
                mods,
                mouse_button: button,
            },
            action_id: action_id.to_string(),
        }
    }

    const SHIFT: ModFlags = ModFlags {
        shift: true,
        alt: false,
        ctrl: false,
        meta: false,
    };

    #[test]
    fn held_key_matches_key_profile() {
        let profiles = vec![key_profile("z", ModFlags::default(), 0, "101")];
        let acts = actions(&["101"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let held = HeldKey::new('z', Modifiers::NONE);
        let resolved = reg.resolve(Some(&held), Modifiers::NONE, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("101"));
    }

    #[test]
    fn key_profile_needs_held_key() {
        let profiles = vec![key_profile("z", ModFlags::default(), 0, "101")];
        let acts = actions(&["101"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        assert!(reg.resolve(None, Modifiers::NONE, MouseButton::Left).is_none());
    }

    #[test]
    fn held_key_modifiers_must_match() {
        let profiles = vec![key_profile("z", SHIFT, 0, "101")];
        let acts = actions(&["101"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let bare = HeldKey::new('z', Modifiers::NONE);
        assert!(reg.resolve(Some(&bare), Modifiers::NONE, MouseButton::Left).is_none());

        let shifted = HeldKey::new('z', Modifiers::SHIFT);
        // Pointer modifiers are irrelevant to the key pass.
        let resolved = reg.resolve(Some(&shifted), Modifiers::NONE, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("101"));
    }

    #[test]
    fn mods_profile_matches_without_key() {
        let profiles = vec![mods_profile(SHIFT, 0, "202")];
        let acts = actions(&["202"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let resolved = reg.resolve(None, Modifiers::SHIFT, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("202"));
        assert!(reg.resolve(None, Modifiers::NONE, MouseButton::Left).is_none());
    }

    #[test]
    fn bare_left_drag_profile_matches_empty_mods() {
        let profiles = vec![mods_profile(ModFlags::default(), 0, "202")];
        let acts = actions(&["202"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let resolved = reg.resolve(None, Modifiers::NONE, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("202"));
        assert!(reg.resolve(None, Modifiers::NONE, MouseButton::Right).is_none());
    }

    #[test]
    fn key_pass_beats_mods_pass_regardless_of_list_order() {
        let profiles = vec![
            mods_profile(ModFlags::default(), 0, "202"),
            key_profile("z", ModFlags::default(), 0, "101"),
        ];
        let acts = actions(&["101", "202"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let held = HeldKey::new('z', Modifiers::NONE);
        let resolved = reg.resolve(Some(&held), Modifiers::NONE, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("101"));
    }

    #[test]
    fn first_match_wins_within_a_pass() {
        let profiles = vec![
            key_profile("z", ModFlags::default(), 0, "101"),
            key_profile("z", ModFlags::default(), 0, "202"),
        ];
        let acts = actions(&["101", "202"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let held = HeldKey::new('z', Modifiers::NONE);
        let resolved = reg.resolve(Some(&held), Modifiers::NONE, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("101"));
    }

    #[test]
    fn dangling_action_is_skipped_scanning_continues() {
        let profiles = vec![
            key_profile("z", ModFlags::default(), 0, "gone"),
            key_profile("z", ModFlags::default(), 0, "101"),
        ];
        let acts = actions(&["101"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let held = HeldKey::new('z', Modifiers::NONE);
        let resolved = reg.resolve(Some(&held), Modifiers::NONE, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("101"));
    }

    #[test]
    fn empty_profiles_fall_back_to_first_action_primary_button_only() {
        let profiles = Vec::new();
        let acts = actions(&["300", "101"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let resolved = reg.resolve(None, Modifiers::NONE, MouseButton::Left);
        // BTreeMap order: smallest id first.
        assert_eq!(resolved.map(|r| r.action_id), Some("101"));
        assert!(resolved.and_then(|r| r.profile).is_none());

        assert!(reg.resolve(None, Modifiers::NONE, MouseButton::Right).is_none());

        let empty = ActionMap::new();
        let reg = TriggerRegistry::new(&profiles, &empty);
        assert!(reg.resolve(None, Modifiers::NONE, MouseButton::Left).is_none());
    }

    #[test]
    fn resolve_late_matches_key_profiles_only() {
        let profiles = vec![
            mods_profile(ModFlags::default(), 0, "202"),
            key_profile("z", ModFlags::default(), 0, "101"),
        ];
        let acts = actions(&["101", "202"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let held = HeldKey::new('z', Modifiers::NONE);
        let resolved = reg.resolve_late(&held, MouseButton::Left);
        assert_eq!(resolved.map(|r| r.action_id), Some("101"));

        let wrong = HeldKey::new('x', Modifiers::NONE);
        assert!(reg.resolve_late(&wrong, MouseButton::Left).is_none());
    }

    #[test]
    fn resolve_is_idempotent() {
        let profiles = vec![
            key_profile("z", SHIFT, 2, "101"),
            mods_profile(SHIFT, 0, "202"),
        ];
        let acts = actions(&["101", "202"]);
        let reg = TriggerRegistry::new(&profiles, &acts);

        let held = HeldKey::new('z', Modifiers::SHIFT);
        let first = reg.resolve(Some(&held), Modifiers::SHIFT, MouseButton::Right);
        let second = reg.resolve(Some(&held), Modifiers::SHIFT, MouseButton::Right);
        assert_eq!(first.map(|r| r.action_id), Some("101"));
        assert_eq!(first.map(|r| r.action_id), second.map(|r| r.action_id));
    }

    #[test]
    fn signature_display_renders_canonical_form() {
        let key = Signature::held("z", Modifiers::ALT, MouseButton::Left);
        assert_eq!(key.to_string(), "key:z|mods:0100|btn:0");

        let mods = Signature::mods_only(Modifiers::SHIFT | Modifiers::META, MouseButton::Right);
        assert_eq!(mods.to_string(), "mods:1001|btn:2");
    }

    #[test]
    fn spec_without_key_yields_mods_signature() {
        let spec = TriggerSpec {
            kind: TriggerKind::Key,
            key: "  ".to_string(),
            mods: ModFlags::default(),
            mouse_button: 0,
        };
        assert!(matches!(spec.signature(), Signature::Mods { .. }));

        let spec = TriggerSpec {
            kind: TriggerKind::Key,
            key: " Z ".to_string(),
            mods: ModFlags::default(),
            mouse_button: 0,
        };
        assert_eq!(
            spec.signature(),
            Signature::held("z", Modifiers::NONE, MouseButton::Left)
        );
    }
}
