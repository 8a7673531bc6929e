#![forbid(unsafe_code)]

//! End-to-end tests for the marquee-to-dispatch pipeline.
//!
//! Validates:
//! - Snapshot rejection of placeholder, script, ignored, and hidden anchors
//! - Image-expanded hitboxes for picture links
//! - Include/exclude/broken link filters and their label text
//! - Duplicate-URL collapsing in the count label vs. the dispatch payload
//! - Block (dedup) and reverse post-processing order at dispatch
//! - Profile names surfacing in the count label

use std::collections::BTreeMap;
use std::time::Duration;

use lariat_core::event::{InputEvent, KeyPress, MouseButton, PointerEvent};
use lariat_core::filter::{FilterMode, IgnoreMode};
use lariat_core::geometry::{PagePoint, ViewportPoint, ViewportRect};
use lariat_core::settings::{IgnoreList, Settings};
use lariat_core::test_support::{key_profile, settings_one_action};
use lariat_core::trigger::HeldKey;

use lariat_engine::activation::{ActivationConfig, ActivationController};
use lariat_engine::dispatch::{DispatchRequest, DispatchSink};
use lariat_engine::host::{LinkCandidate, PageHost, ViewportSize};
use lariat_engine::index::LinkId;
use lariat_engine::surface::Surface;

use web_time::Instant;

// ============================================================================
// Fake collaborators
// ============================================================================

struct FakePage {
    url: String,
    viewport: ViewportSize,
    scroll: PagePoint,
    doc_height: f64,
    links: Vec<LinkCandidate>,
}

impl FakePage {
    fn new(links: Vec<LinkCandidate>) -> Self {
        Self {
            url: "https://news.example/".to_string(),
            viewport: ViewportSize::new(1024.0, 768.0),
            scroll: PagePoint::default(),
            doc_height: 3000.0,
            links,
        }
    }
}

impl PageHost for FakePage {
    fn url(&self) -> &str {
        &self.url
    }

    fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    fn scroll(&self) -> PagePoint {
        self.scroll
    }

    fn document_height(&self) -> f64 {
        self.doc_height
    }

    fn link_candidates(&self) -> Vec<LinkCandidate> {
        self.links.clone()
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) {
        let max_y = (self.doc_height - self.viewport.height).max(0.0);
        self.scroll.x = (self.scroll.x + dx).max(0.0);
        self.scroll.y = (self.scroll.y + dy).clamp(0.0, max_y);
    }
}

#[derive(Default)]
struct RecordingSurface {
    label: Option<String>,
    highlighted: BTreeMap<usize, ViewportRect>,
    text_selection_enabled: bool,
}

impl Surface for RecordingSurface {
    fn show_marquee(&mut self, _rect: ViewportRect, _color: &str) {}

    fn hide_marquee(&mut self) {}

    fn show_label(&mut self, text: &str, _at: ViewportPoint) {
        self.label = Some(text.to_string());
    }

    fn hide_label(&mut self) {
        self.label = None;
    }

    fn highlight(&mut self, id: LinkId, rect: ViewportRect, _color: &str) {
        self.highlighted.insert(id.index(), rect);
    }

    fn clear_highlight(&mut self, id: LinkId) {
        self.highlighted.remove(&id.index());
    }

    fn clear_overlays(&mut self) {
        self.label = None;
        self.highlighted.clear();
    }

    fn set_text_selection_enabled(&mut self, enabled: bool) {
        self.text_selection_enabled = enabled;
    }
}

#[derive(Default)]
struct RecordingSink {
    requests: Vec<DispatchRequest>,
}

impl DispatchSink for RecordingSink {
    fn dispatch(&mut self, request: DispatchRequest) {
        self.requests.push(request);
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// A plain anchor at viewport position `(x, y)`, sized 200x20.
fn anchor(href: &str, text: &str, x: f64, y: f64) -> LinkCandidate {
    LinkCandidate {
        href: href.to_string(),
        raw_href: href.to_string(),
        text: text.to_string(),
        rect: ViewportRect::new(x, y, 200.0, 20.0),
        ..LinkCandidate::default()
    }
}

type Controller = ActivationController<FakePage, RecordingSurface, RecordingSink>;

fn attach(page: FakePage, settings: Settings) -> Controller {
    match ActivationController::attach(
        page,
        RecordingSurface {
            text_selection_enabled: true,
            ..RecordingSurface::default()
        },
        RecordingSink::default(),
        settings,
        ActivationConfig::default(),
    ) {
        Ok(controller) => controller,
        Err(reason) => panic!("attach declined: {reason}"),
    }
}

fn down(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerDown(PointerEvent::new(x, y, MouseButton::Left))
}

fn mv(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerMove(PointerEvent::new(x, y, MouseButton::Left))
}

fn up(x: f64, y: f64) -> InputEvent {
    InputEvent::PointerUp(PointerEvent::new(x, y, MouseButton::Left))
}

/// Sweep a marquee over `(from..to)` and settle the release debounce.
fn sweep(ctrl: &mut Controller, from: (f64, f64), to: (f64, f64)) {
    let t = Instant::now();
    ctrl.feed(&down(from.0, from.1), t);
    ctrl.feed(&mv(to.0, to.1), t + Duration::from_millis(30));
    ctrl.feed(&up(to.0, to.1), t + Duration::from_millis(60));
    ctrl.poll(t + Duration::from_millis(200));
}

fn dispatched_urls(ctrl: &Controller) -> Vec<String> {
    ctrl.sink()
        .requests
        .iter()
        .flat_map(|r| r.links.iter().map(|l| l.url.clone()))
        .collect()
}

// ============================================================================
// Snapshot rejection
// ============================================================================

#[test]
fn e2e_placeholder_script_and_hidden_anchors_never_dispatch() {
    let mut script = anchor("javascript:void(0)", "script", 50.0, 100.0);
    script.raw_href = "javascript:void(0)".to_string();

    let mut empty = anchor("https://news.example/self", "empty", 50.0, 130.0);
    empty.raw_href = String::new();

    let mut hash = anchor("https://news.example/self", "hash", 50.0, 160.0);
    hash.raw_href = "#".to_string();

    let mut hidden = anchor("https://news.example/hidden", "hidden", 50.0, 190.0);
    hidden.hidden = true;

    let real = anchor("https://news.example/story", "story", 50.0, 220.0);

    let page = FakePage::new(vec![script, empty, hash, hidden, real]);
    let mut ctrl = attach(page, settings_one_action("101"));

    sweep(&mut ctrl, (20.0, 80.0), (300.0, 260.0));

    assert_eq!(dispatched_urls(&ctrl), ["https://news.example/story"]);
}

#[test]
fn e2e_ignore_list_drops_matching_anchors_before_selection() {
    let mut settings = settings_one_action("101");
    if let Some(action) = settings.actions.get_mut("101") {
        action.options.ignore = IgnoreList {
            mode: IgnoreMode::Exclude,
            patterns: vec!["sponsored".to_string(), "tracking".to_string()],
        };
    }

    let mut promoted = anchor("https://news.example/a", "ad", 50.0, 100.0);
    promoted.markup = "<span class=\"SPONSORED\">ad</span>".to_string();

    let page = FakePage::new(vec![
        promoted,
        anchor("https://tracking.example/b", "b", 50.0, 130.0),
        anchor("https://news.example/c", "c", 50.0, 160.0),
    ]);
    let mut ctrl = attach(page, settings);

    sweep(&mut ctrl, (20.0, 80.0), (300.0, 200.0));

    // The markup match and the href match both fall away at snapshot time.
    assert_eq!(dispatched_urls(&ctrl), ["https://news.example/c"]);
}

#[test]
fn e2e_image_rects_extend_the_anchor_hitbox() {
    // A 1x1 anchor wrapping a large image: the union covers the image.
    let mut picture = anchor("https://news.example/photo", "photo", 400.0, 400.0);
    picture.rect = ViewportRect::new(400.0, 400.0, 1.0, 1.0);
    picture.image_rects = vec![ViewportRect::new(400.0, 400.0, 300.0, 200.0)];

    let page = FakePage::new(vec![picture]);
    let mut ctrl = attach(page, settings_one_action("101"));

    // Sweep a region that misses the anchor box but crosses the image.
    sweep(&mut ctrl, (600.0, 450.0), (680.0, 550.0));

    assert_eq!(dispatched_urls(&ctrl), ["https://news.example/photo"]);
}

// ============================================================================
// Link filters
// ============================================================================

#[test]
fn e2e_exclude_filter_narrows_dispatch_and_label() {
    let mut settings = settings_one_action("101");
    if let Some(action) = settings.actions.get_mut("101") {
        action.options.filter_pattern = "comments".to_string();
        action.options.filter_mode = FilterMode::Exclude;
    }

    let page = FakePage::new(vec![
        anchor("https://news.example/story-1", "one", 50.0, 100.0),
        anchor("https://news.example/story-1/comments", "talk", 50.0, 130.0),
        anchor("https://news.example/story-2", "two", 50.0, 160.0),
    ]);
    let mut ctrl = attach(page, settings);

    let t = Instant::now();
    ctrl.feed(&down(20.0, 80.0), t);
    ctrl.feed(&mv(300.0, 200.0), t + Duration::from_millis(30));
    assert_eq!(
        ctrl.surface().label.as_deref(),
        Some("2 links (1 filtered)")
    );

    ctrl.feed(&up(300.0, 200.0), t + Duration::from_millis(60));
    ctrl.poll(t + Duration::from_millis(200));
    assert_eq!(
        dispatched_urls(&ctrl),
        ["https://news.example/story-1", "https://news.example/story-2"]
    );
}

#[test]
fn e2e_include_filter_keeps_only_matches() {
    let mut settings = settings_one_action("101");
    if let Some(action) = settings.actions.get_mut("101") {
        action.options.filter_pattern = r"/docs/".to_string();
        action.options.filter_mode = FilterMode::Include;
    }

    let page = FakePage::new(vec![
        anchor("https://news.example/docs/install", "install", 50.0, 100.0),
        anchor("https://news.example/pricing", "pricing", 50.0, 130.0),
        anchor("https://news.example/docs/api", "api", 50.0, 160.0),
    ]);
    let mut ctrl = attach(page, settings);

    sweep(&mut ctrl, (20.0, 80.0), (300.0, 200.0));

    assert_eq!(
        dispatched_urls(&ctrl),
        [
            "https://news.example/docs/install",
            "https://news.example/docs/api"
        ]
    );
}

#[test]
fn e2e_broken_filter_fails_open_and_flags_the_label() {
    let mut settings = settings_one_action("101");
    if let Some(action) = settings.actions.get_mut("101") {
        action.options.filter_pattern = "[unclosed".to_string();
    }

    let page = FakePage::new(vec![
        anchor("https://news.example/a", "a", 50.0, 100.0),
        anchor("https://news.example/b", "b", 50.0, 130.0),
    ]);
    let mut ctrl = attach(page, settings);

    let t = Instant::now();
    ctrl.feed(&down(20.0, 80.0), t);
    ctrl.feed(&mv(300.0, 170.0), t + Duration::from_millis(30));
    assert_eq!(
        ctrl.surface().label.as_deref(),
        Some("2 links selected (Filter invalid)")
    );

    ctrl.feed(&up(300.0, 170.0), t + Duration::from_millis(60));
    ctrl.poll(t + Duration::from_millis(200));
    assert_eq!(
        dispatched_urls(&ctrl),
        ["https://news.example/a", "https://news.example/b"]
    );
}

// ============================================================================
// Labels
// ============================================================================

#[test]
fn e2e_duplicate_hrefs_collapse_in_the_label_not_the_payload() {
    let mut settings = settings_one_action("101");
    if let Some(action) = settings.actions.get_mut("101") {
        action.options.block = false;
    }

    let page = FakePage::new(vec![
        anchor("https://news.example/story", "headline", 50.0, 100.0),
        anchor("https://news.example/story", "thumbnail", 50.0, 130.0),
    ]);
    let mut ctrl = attach(page, settings);

    let t = Instant::now();
    ctrl.feed(&down(20.0, 80.0), t);
    ctrl.feed(&mv(300.0, 170.0), t + Duration::from_millis(30));
    assert_eq!(ctrl.surface().label.as_deref(), Some("1 link selected"));

    ctrl.feed(&up(300.0, 170.0), t + Duration::from_millis(60));
    ctrl.poll(t + Duration::from_millis(200));

    // With dedup off, both anchors ride along.
    assert_eq!(
        dispatched_urls(&ctrl),
        ["https://news.example/story", "https://news.example/story"]
    );
}

#[test]
fn e2e_profile_name_lands_in_the_label() {
    let mut settings = settings_one_action("101");
    let mut profile = key_profile("p1", 'z', 0, "101");
    profile.name = "Research".to_string();
    settings.profiles = vec![profile];
    let page = FakePage::new(vec![anchor("https://news.example/a", "a", 50.0, 100.0)]);
    let mut ctrl = attach(page, settings);

    let t = Instant::now();
    ctrl.feed(&InputEvent::KeyDown(KeyPress::char('z')), t);
    ctrl.feed(&down(20.0, 80.0), t + Duration::from_millis(10));
    ctrl.feed(&mv(300.0, 140.0), t + Duration::from_millis(40));

    assert_eq!(
        ctrl.surface().label.as_deref(),
        Some("1 link selected — Research")
    );
    assert_eq!(ctrl.held_key(), Some(HeldKey::new('z', Default::default())));
}

// ============================================================================
// Dispatch post-processing
// ============================================================================

#[test]
fn e2e_block_dedup_keeps_the_first_occurrence() {
    let page = FakePage::new(vec![
        anchor("https://news.example/story", "headline", 50.0, 100.0),
        anchor("https://news.example/other", "other", 50.0, 130.0),
        anchor("https://news.example/story", "thumbnail", 50.0, 160.0),
    ]);
    let mut ctrl = attach(page, settings_one_action("101"));

    sweep(&mut ctrl, (20.0, 80.0), (300.0, 200.0));

    let request = &ctrl.sink().requests[0];
    let titles: Vec<&str> = request.links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["headline", "other"]);
}

#[test]
fn e2e_reverse_dispatches_bottom_up() {
    let mut settings = settings_one_action("101");
    if let Some(action) = settings.actions.get_mut("101") {
        action.options.reverse = true;
    }

    let page = FakePage::new(vec![
        anchor("https://news.example/1", "1", 50.0, 100.0),
        anchor("https://news.example/2", "2", 50.0, 130.0),
        anchor("https://news.example/3", "3", 50.0, 160.0),
    ]);
    let mut ctrl = attach(page, settings);

    sweep(&mut ctrl, (20.0, 80.0), (300.0, 200.0));

    assert_eq!(
        dispatched_urls(&ctrl),
        [
            "https://news.example/3",
            "https://news.example/2",
            "https://news.example/1"
        ]
    );
}

#[test]
fn e2e_dedup_runs_before_reverse() {
    let mut settings = settings_one_action("101");
    if let Some(action) = settings.actions.get_mut("101") {
        action.options.reverse = true;
    }

    let page = FakePage::new(vec![
        anchor("https://news.example/story", "first", 50.0, 100.0),
        anchor("https://news.example/other", "other", 50.0, 130.0),
        anchor("https://news.example/story", "second", 50.0, 160.0),
    ]);
    let mut ctrl = attach(page, settings);

    sweep(&mut ctrl, (20.0, 80.0), (300.0, 200.0));

    // Dedup keeps the first occurrence (title "first"), then the order
    // flips, so the duplicate-free list arrives bottom-up.
    let request = &ctrl.sink().requests[0];
    let titles: Vec<&str> = request.links.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["other", "first"]);
}

// ============================================================================
// Highlight bookkeeping
// ============================================================================

#[test]
fn e2e_highlights_follow_the_marquee_and_clear_at_the_end() {
    let page = FakePage::new(vec![
        anchor("https://news.example/a", "a", 50.0, 100.0),
        anchor("https://news.example/b", "b", 50.0, 400.0),
    ]);
    let mut ctrl = attach(page, settings_one_action("101"));

    let t = Instant::now();
    ctrl.feed(&down(20.0, 80.0), t);
    ctrl.feed(&mv(300.0, 150.0), t + Duration::from_millis(20));
    assert_eq!(ctrl.surface().highlighted.len(), 1);
    assert!(!ctrl.surface().text_selection_enabled);

    // Extend over the second link.
    ctrl.feed(&mv(300.0, 450.0), t + Duration::from_millis(40));
    assert_eq!(ctrl.surface().highlighted.len(), 2);

    // Shrink back: the far highlight must drop.
    ctrl.feed(&mv(300.0, 150.0), t + Duration::from_millis(60));
    assert_eq!(ctrl.surface().highlighted.len(), 1);

    ctrl.feed(&up(300.0, 150.0), t + Duration::from_millis(80));
    ctrl.poll(t + Duration::from_millis(250));
    assert!(ctrl.surface().highlighted.is_empty());
    assert!(ctrl.surface().text_selection_enabled);
}
