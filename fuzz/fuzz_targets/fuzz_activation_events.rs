#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use web_time::Instant;

use lariat_core::event::{
    InputEvent, KeyPress, KeyToken, Modifiers, MouseButton, PointerEvent, TargetKind,
};
use lariat_core::geometry::{PagePoint, ViewportPoint, ViewportRect};
use lariat_core::settings::{ActionConfig, Settings};

use lariat_engine::activation::{ActivationConfig, ActivationController};
use lariat_engine::dispatch::{DispatchRequest, DispatchSink};
use lariat_engine::host::{LinkCandidate, PageHost, ViewportSize};
use lariat_engine::index::LinkId;
use lariat_engine::surface::Surface;

#[derive(Arbitrary, Debug)]
enum Ev {
    Down { x: i16, y: i16, button: u8, mods: u8, editable: bool },
    Move { x: i16, y: i16 },
    Out { x: i16, y: i16 },
    Up { x: i16, y: i16 },
    Wheel,
    KeyDown { c: char, mods: u8, repeat: bool, editable: bool },
    KeyUp { c: char },
    End,
    Home,
    Blur,
    ContextMenu,
    AdvanceMs(u16),
    Poll,
}

struct FuzzPage {
    scroll: PagePoint,
}

impl PageHost for FuzzPage {
    fn url(&self) -> &str {
        "https://fuzz.test/"
    }

    fn viewport(&self) -> ViewportSize {
        ViewportSize::new(800.0, 600.0)
    }

    fn scroll(&self) -> PagePoint {
        self.scroll
    }

    fn document_height(&self) -> f64 {
        5000.0
    }

    fn link_candidates(&self) -> Vec<LinkCandidate> {
        (0..12)
            .map(|i| {
                let href = format!("https://fuzz.test/{i}");
                LinkCandidate {
                    href: href.clone(),
                    raw_href: href,
                    text: format!("{i}"),
                    rect: ViewportRect::new(10.0, f64::from(i) * 40.0, 300.0, 20.0),
                    ..LinkCandidate::default()
                }
            })
            .collect()
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll.x = (self.scroll.x + dx).max(0.0);
        self.scroll.y = (self.scroll.y + dy).clamp(0.0, 4400.0);
    }
}

struct NullSurface;

impl Surface for NullSurface {
    fn show_marquee(&mut self, _rect: ViewportRect, _color: &str) {}
    fn hide_marquee(&mut self) {}
    fn show_label(&mut self, _text: &str, _at: ViewportPoint) {}
    fn hide_label(&mut self) {}
    fn highlight(&mut self, _id: LinkId, _rect: ViewportRect, _color: &str) {}
    fn clear_highlight(&mut self, _id: LinkId) {}
    fn clear_overlays(&mut self) {}
    fn set_text_selection_enabled(&mut self, _enabled: bool) {}
}

struct NullSink;

impl DispatchSink for NullSink {
    fn dispatch(&mut self, _request: DispatchRequest) {}
}

fn target(editable: bool) -> TargetKind {
    if editable {
        TargetKind::Editable
    } else {
        TargetKind::Normal
    }
}

fn pointer(x: i16, y: i16, button: u8, mods: u8, editable: bool) -> PointerEvent {
    PointerEvent::new(f64::from(x), f64::from(y), MouseButton::from_index(button))
        .with_modifiers(Modifiers::from_bits_truncate(mods))
        .with_target(target(editable))
}

fuzz_target!(|events: Vec<Ev>| {
    // The controller must never panic on any event/timing interleaving.
    let mut settings = Settings::default();
    settings
        .actions
        .insert("101".to_string(), ActionConfig::default());

    let Ok(mut ctrl) = ActivationController::attach(
        FuzzPage {
            scroll: PagePoint::default(),
        },
        NullSurface,
        NullSink,
        settings,
        ActivationConfig::default(),
    ) else {
        return;
    };

    let start = Instant::now();
    let mut elapsed = Duration::ZERO;

    for ev in events {
        let now = start + elapsed;
        match ev {
            Ev::Down { x, y, button, mods, editable } => {
                let _ = ctrl.feed(
                    &InputEvent::PointerDown(pointer(x, y, button, mods, editable)),
                    now,
                );
            }
            Ev::Move { x, y } => {
                let _ = ctrl.feed(
                    &InputEvent::PointerMove(pointer(x, y, 0, 0, false)),
                    now,
                );
            }
            Ev::Out { x, y } => {
                let _ = ctrl.feed(&InputEvent::PointerOut(pointer(x, y, 0, 0, false)), now);
            }
            Ev::Up { x, y } => {
                let _ = ctrl.feed(&InputEvent::PointerUp(pointer(x, y, 0, 0, false)), now);
            }
            Ev::Wheel => {
                let _ = ctrl.feed(&InputEvent::Wheel, now);
            }
            Ev::KeyDown { c, mods, repeat, editable } => {
                let mut key = KeyPress::char(c)
                    .with_modifiers(Modifiers::from_bits_truncate(mods))
                    .with_target(target(editable));
                if repeat {
                    key = key.repeated();
                }
                let _ = ctrl.feed(&InputEvent::KeyDown(key), now);
            }
            Ev::KeyUp { c } => {
                let _ = ctrl.feed(&InputEvent::KeyUp(KeyPress::char(c)), now);
            }
            Ev::End => {
                let _ = ctrl.feed(&InputEvent::KeyDown(KeyPress::new(KeyToken::End)), now);
            }
            Ev::Home => {
                let _ = ctrl.feed(&InputEvent::KeyDown(KeyPress::new(KeyToken::Home)), now);
            }
            Ev::Blur => {
                let _ = ctrl.feed(&InputEvent::Blur, now);
            }
            Ev::ContextMenu => {
                let _ = ctrl.feed(&InputEvent::ContextMenu, now);
            }
            Ev::AdvanceMs(ms) => {
                elapsed += Duration::from_millis(u64::from(ms));
            }
            Ev::Poll => {
                let _ = ctrl.poll(now);
            }
        }
    }

    let _ = ctrl.detach();
});
