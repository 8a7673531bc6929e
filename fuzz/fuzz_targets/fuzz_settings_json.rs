#![no_main]

use lariat_core::settings::Settings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes to the settings parser.
    // Parsing must never panic regardless of input; bad payloads are Err.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(settings) = Settings::from_json_str(text) else {
        return;
    };

    // A payload that parses must survive the derived passes too: validation,
    // block-list matching (which compiles user regexes), and color
    // normalization.
    let _ = settings.validate();
    let _ = settings.blocks_url("https://example.com/some/path");
    let _ = settings.invalid_blocked_patterns();
    for action in settings.actions.values() {
        let _ = action.normalized_color();
    }
});
