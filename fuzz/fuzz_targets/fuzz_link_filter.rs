#![no_main]

use arbitrary::Arbitrary;
use lariat_core::filter::{FilterMode, IgnoreFilter, IgnoreMode, LinkFilter};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    pattern: String,
    include: bool,
    case_insensitive: bool,
    ignore_patterns: Vec<String>,
    ignore_include: bool,
    url: String,
    markup: String,
}

fuzz_target!(|input: Input| {
    // Filter compilation and matching must never panic. Uncompilable
    // patterns degrade to the broken (fail-open) filter.
    let mode = if input.include {
        FilterMode::Include
    } else {
        FilterMode::Exclude
    };
    let filter = LinkFilter::compile(&input.pattern, mode, input.case_insensitive);
    let _ = filter.should_select(&input.url);

    // Same contract for the snapshot-time ignore step.
    let ignore_mode = if input.ignore_include {
        IgnoreMode::Include
    } else {
        IgnoreMode::Exclude
    };
    if let Ok(Some(ignore)) = IgnoreFilter::try_compile(ignore_mode, &input.ignore_patterns) {
        let _ = ignore.keeps(&input.url, &input.markup);
    }
});
