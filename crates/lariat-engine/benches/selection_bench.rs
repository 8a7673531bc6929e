//! Benchmarks for the per-move selection pass.
//!
//! Every pointer move during an active gesture recomputes the overlap set
//! over the frozen snapshot, so this path bounds how large a page stays
//! smooth. Measures snapshot construction and a simulated diagonal sweep.
//!
//! Run with: cargo bench -p lariat-engine --bench selection_bench

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use lariat_core::filter::LinkFilter;
use lariat_core::geometry::{PagePoint, ViewportRect};
use lariat_core::settings::ActionOptions;

use lariat_engine::host::{LinkCandidate, PageHost, ViewportSize};
use lariat_engine::index::GeometryIndex;
use lariat_engine::selection::SelectionEngine;

struct BenchPage {
    links: Vec<LinkCandidate>,
}

impl PageHost for BenchPage {
    fn url(&self) -> &str {
        "https://bench.test/"
    }

    fn viewport(&self) -> ViewportSize {
        ViewportSize::new(1280.0, 1024.0)
    }

    fn scroll(&self) -> PagePoint {
        PagePoint::default()
    }

    fn document_height(&self) -> f64 {
        100_000.0
    }

    fn link_candidates(&self) -> Vec<LinkCandidate> {
        self.links.clone()
    }

    fn scroll_by(&mut self, _dx: f64, _dy: f64) {}
}

/// A tall index page: `n` links stacked in two columns, 28px apart.
fn link_column(n: usize) -> BenchPage {
    let links = (0..n)
        .map(|i| {
            let href = format!("https://bench.test/item/{i}");
            LinkCandidate {
                href: href.clone(),
                raw_href: href,
                text: format!("item {i}"),
                rect: ViewportRect::new(
                    if i % 2 == 0 { 40.0 } else { 660.0 },
                    (i / 2) as f64 * 28.0,
                    560.0,
                    20.0,
                ),
                ..LinkCandidate::default()
            }
        })
        .collect();
    BenchPage { links }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/snapshot");
    for n in [100usize, 1_000, 5_000] {
        let page = link_column(n);
        let options = ActionOptions::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(GeometryIndex::snapshot(&page, &options)));
        });
    }
    group.finish();
}

fn bench_marquee_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection/sweep");
    for n in [100usize, 1_000, 5_000] {
        let index = GeometryIndex::snapshot(&link_column(n), &ActionOptions::default());
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut engine = SelectionEngine::begin(
                    PagePoint::new(10.0, 10.0),
                    index.clone(),
                    LinkFilter::Disabled,
                );
                // 60 moves of a diagonal drag, one per frame.
                for step in 1..=60u32 {
                    let cursor =
                        PagePoint::new(10.0 + f64::from(step) * 20.0, 10.0 + f64::from(step) * 40.0);
                    black_box(engine.update(cursor));
                }
                black_box(engine.end(PagePoint::new(1210.0, 2410.0)).len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_snapshot, bench_marquee_sweep);
criterion_main!(benches);
