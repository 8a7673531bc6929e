#![forbid(unsafe_code)]

//! Fixture builders for downstream tests.
//!
//! Gated behind the `test-helpers` feature so production builds never carry
//! them. Consumers enable the feature from their dev-dependencies.

use crate::settings::{ActionConfig, ActionMap, Settings};
use crate::trigger::{ModFlags, TriggerKind, TriggerProfile, TriggerSpec};

/// A settings payload with a single default action under `id` and no
/// profiles, the smallest state the engine will attach with.
#[must_use]
pub fn settings_one_action(id: &str) -> Settings {
    let mut actions = ActionMap::new();
    actions.insert(id.to_string(), ActionConfig::default());
    Settings {
        actions,
        ..Settings::default()
    }
}

/// A key-kind profile: hold `key`, drag with `button`.
#[must_use]
pub fn key_profile(id: &str, key: char, button: u8, action_id: &str) -> TriggerProfile {
    TriggerProfile {
        id: id.to_string(),
        name: format!("profile {id}"),
        trigger: TriggerSpec {
            kind: TriggerKind::Key,
            key: key.to_string(),
            mods: ModFlags::default(),
            mouse_button: button,
        },
        action_id: action_id.to_string(),
    }
}

/// A mods-kind profile: drag with `button` while `mods` are down.
#[must_use]
pub fn mods_profile(id: &str, mods: ModFlags, button: u8, action_id: &str) -> TriggerProfile {
    TriggerProfile {
        id: id.to_string(),
        name: format!("profile {id}"),
        trigger: TriggerSpec {
            kind: TriggerKind::Mods,
            key: String::new(),
            mods,
            mouse_button: button,
        },
        action_id: action_id.to_string(),
    }
}

/// A collaborator-shaped JSON payload: one tabs action (`"101"`) and one
/// key profile (hold `z`, left button).
#[must_use]
pub fn payload_json() -> &'static str {
    r##"{
        "actions": {
            "101": {
                "mouse": 0, "key": 90, "action": "tabs", "color": "#FFA500",
                "options": {
                    "smart": 0, "ignore": [0], "delay": 0, "close": 0,
                    "block": true, "reverse": false, "end": false,
                    "filterPattern": "", "filterMode": "exclude",
                    "filterCaseInsensitive": true, "copy": 0
                }
            }
        },
        "profiles": [
            { "id": "p1", "name": "Open tabs",
              "trigger": { "kind": "key", "key": "z",
                           "mods": { "shift": false, "alt": false,
                                     "ctrl": false, "meta": false },
                           "mouseButton": 0 },
              "actionId": "101" }
        ],
        "blocked": []
    }"##
}
