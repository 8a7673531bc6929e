//! Benchmark: marquee overlap sweep and trigger resolution.
//!
//! Run with: `cargo bench -p lariat-core --bench overlap_bench`
//!
//! Measures the per-pointer-move cost of intersecting one marquee rect
//! against a snapshot's worth of link rects, and the per-pointer-down cost
//! of resolving a gesture against a profile list. Both sit on the hot input
//! path, so they are kept allocation-free.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lariat_core::event::{Modifiers, MouseButton};
use lariat_core::geometry::{PagePoint, PageRect};
use lariat_core::settings::{ActionConfig, ActionMap};
use lariat_core::trigger::{
    HeldKey, ModFlags, TriggerKind, TriggerProfile, TriggerRegistry, TriggerSpec,
};

/// A column of link-sized rects, like a search-results page.
fn link_rects(count: usize) -> Vec<PageRect> {
    (0..count)
        .map(|i| {
            let top = 40.0 * i as f64;
            PageRect::from_points(
                PagePoint::new(16.0, top),
                PagePoint::new(480.0, top + 18.0),
            )
        })
        .collect()
}

fn profile_list(count: usize) -> (Vec<TriggerProfile>, ActionMap) {
    let mut actions = ActionMap::new();
    let profiles = (0..count)
        .map(|i| {
            let id = format!("a{i}");
            actions.insert(id.clone(), ActionConfig::default());
            TriggerProfile {
                id: format!("p{i}"),
                name: format!("profile {i}"),
                trigger: TriggerSpec {
                    kind: TriggerKind::Key,
                    key: char::from(b'a' + (i % 26) as u8).to_string(),
                    mods: ModFlags::default(),
                    mouse_button: 0,
                },
                action_id: id,
            }
        })
        .collect();
    (profiles, actions)
}

// ===========================================================================
// Marquee overlap sweep
// ===========================================================================

fn bench_overlap_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlap_sweep");

    for count in [100usize, 1_000, 5_000] {
        let rects = link_rects(count);
        let marquee = PageRect::from_points(
            PagePoint::new(0.0, 500.0),
            PagePoint::new(600.0, 2_500.0),
        );

        group.bench_function(format!("{count}_links"), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for rect in &rects {
                    if marquee.overlaps(black_box(rect)) {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });
    }

    group.finish();
}

// ===========================================================================
// Trigger resolution
// ===========================================================================

fn bench_trigger_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("trigger_resolution");

    for count in [1usize, 8, 24] {
        let (profiles, actions) = profile_list(count);
        let registry = TriggerRegistry::new(&profiles, &actions);
        // Worst case: the held key matches only the last profile.
        let last_key = char::from(b'a' + ((count - 1) % 26) as u8);
        let held = HeldKey::new(last_key, Modifiers::NONE);

        group.bench_function(format!("{count}_profiles"), |b| {
            b.iter(|| {
                black_box(registry.resolve(
                    Some(black_box(&held)),
                    Modifiers::NONE,
                    MouseButton::Left,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_overlap_sweep, bench_trigger_resolution);
criterion_main!(benches);
