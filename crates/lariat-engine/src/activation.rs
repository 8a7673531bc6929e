#![forbid(unsafe_code)]

//! Gesture lifecycle: owns the phase machine from pointer-down to dispatch.
//!
//! [`ActivationController`] is the engine's entry point. The embedder feeds
//! it [`InputEvent`]s plus a timestamp and gets back an [`InputDisposition`]
//! telling it whether to swallow the native event. Deadlines (late-arm
//! grace, release debounce, autoscroll ticks) are driven by the embedder
//! calling [`poll`](ActivationController::poll); the controller never spawns
//! timers of its own.
//!
//! # State Machine
//!
//! The controller is always in exactly one phase:
//!
//! - **Idle**: no gesture. Pointer-downs are matched against the trigger
//!   profiles; a match arms a gesture, a miss opens the late-arm window.
//! - **LateArmPending**: a pointer-down matched nothing, but a key-kind
//!   profile may still complete the combination. If its key arrives within
//!   the grace window the gesture arms at the original anchor; otherwise the
//!   window lapses back to Idle.
//! - **Armed**: trigger matched, link snapshot frozen, marquee anchored.
//!   Nothing is drawn until the drag escapes the dead zone.
//! - **Active**: the drag crossed the threshold. Marquee, count label, and
//!   highlights track every move; edge proximity drives autoscroll.
//! - **Releasing**: the button came up. Dispatch is deferred by a short
//!   debounce so a bounced button (or a quick re-press) resumes the gesture
//!   instead of splitting it in two.
//!
//! # Invariants
//!
//! 1. A link snapshot is taken exactly once per gesture, at arm time. Links
//!    added to the page mid-drag are not selectable until the next gesture.
//! 2. `gesture` is `Some` exactly in the Armed, Active, and Releasing
//!    phases.
//! 3. Every deadline is owned by the phase that set it; leaving the phase
//!    cancels the deadline. There are no orphaned timers.
//! 4. Dispatch happens at most once per gesture, only from Releasing, and
//!    only when the final selection is non-empty.
//! 5. Page text selection is disabled while visuals are on screen and
//!    restored on every path out of a gesture (finish, abort, detach).
//!
//! # Failure Modes
//!
//! - A link filter that fails to compile is logged and stored as broken:
//!   selection fails open, the label says "(Filter invalid)".
//! - If the armed action disappears from the action map before the gesture
//!   finishes (settings update mid-drag), the update re-points the gesture
//!   at the surviving fallback action rather than killing the drag.
//! - Events from editable targets (inputs, textareas, content-editable) are
//!   passed through untouched and never update held-key state.

use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};
use web_time::Instant;

use lariat_core::event::{
    InputDisposition, InputEvent, KeyPress, KeyToken, MouseButton, PointerEvent, TargetKind,
};
use lariat_core::filter::LinkFilter;
use lariat_core::geometry::{PagePoint, ViewportPoint};
use lariat_core::settings::{ActionOptions, Settings, SettingsError};
use lariat_core::trigger::{HeldKey, TriggerRegistry};

use crate::autoscroll::{self, AutoscrollController};
use crate::dispatch::{DispatchRequest, DispatchSink, MatchedLink, finalize_links};
use crate::host::PageHost;
use crate::index::GeometryIndex;
use crate::selection::{DRAG_THRESHOLD_PX, SelectionEngine};
use crate::surface::{LABEL_POINTER_OFFSET_PX, Surface};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing knobs for the gesture lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationConfig {
    /// How long after an unmatched pointer-down a trigger key may still
    /// arrive and arm the gesture (default: 250ms).
    pub late_arm_grace: Duration,

    /// How long a release is held back before dispatch, so a bounced button
    /// resumes instead of re-triggering (default: 100ms).
    pub release_debounce: Duration,

    /// Tick interval for edge autoscroll (default: 100ms).
    pub autoscroll_interval: Duration,

    /// Minimum marquee extent, on either axis, before the drag counts as a
    /// selection (default: 5px).
    pub drag_threshold_px: f64,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            late_arm_grace: Duration::from_millis(250),
            release_debounce: Duration::from_millis(100),
            autoscroll_interval: Duration::from_millis(100),
            drag_threshold_px: DRAG_THRESHOLD_PX,
        }
    }
}

/// Why [`ActivationController::attach`] refused to start on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclineReason {
    /// The page URL is not http or https.
    UnsupportedScheme,

    /// A user block-list pattern matches the page URL.
    BlockedPage,

    /// The settings payload failed validation; the problems are listed.
    InvalidSettings(Vec<String>),
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedScheme => write!(f, "page scheme is not http(s)"),
            Self::BlockedPage => write!(f, "page URL matches the block list"),
            Self::InvalidSettings(problems) => {
                write!(f, "settings rejected: {}", problems.join("; "))
            }
        }
    }
}

impl std::error::Error for DeclineReason {}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

/// Lifecycle phase. Deadlines live inside the phase that owns them, so a
/// phase change is also a cancellation.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    LateArmPending {
        deadline: Instant,
        anchor: PagePoint,
        button: MouseButton,
    },
    Armed,
    Active,
    Releasing {
        deadline: Instant,
        release: PagePoint,
    },
}

/// Everything frozen at arm time plus the live selection pass.
struct Gesture {
    action_id: String,
    profile_name: Option<String>,
    color: String,
    selection: SelectionEngine,
}

// ---------------------------------------------------------------------------
// ActivationController
// ---------------------------------------------------------------------------

/// Drives the whole gesture lifecycle over an abstract page.
///
/// Call [`feed`](Self::feed) for every input event and
/// [`poll`](Self::poll) whenever a previously returned deadline comes due.
pub struct ActivationController<H, S, D> {
    host: H,
    surface: S,
    sink: D,
    settings: Settings,
    config: ActivationConfig,

    phase: Phase,
    gesture: Option<Gesture>,

    // Held-key tracking for key-kind triggers
    held: Option<HeldKey>,

    // Edge autoscroll; ticks only while Active or Releasing
    autoscroll: AutoscrollController,

    // Last pointer position in page coordinates. Autoscroll advances this
    // virtually while the physical pointer sits still at the edge.
    pointer: PagePoint,
}

impl<H, S, D> fmt::Debug for ActivationController<H, S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationController")
            .field("phase", &self.phase)
            .field("held", &self.held)
            .field("pointer", &self.pointer)
            .finish()
    }
}

impl<H, S, D> ActivationController<H, S, D>
where
    H: PageHost,
    S: Surface,
    D: DispatchSink,
{
    /// Attach the engine to a page, gate-checking the URL and settings.
    ///
    /// Declines on non-http(s) schemes, invalid settings, and block-listed
    /// pages, in that order. Unparsable block patterns are logged and
    /// skipped rather than declining the whole page.
    pub fn attach(
        host: H,
        surface: S,
        sink: D,
        settings: Settings,
        config: ActivationConfig,
    ) -> Result<Self, DeclineReason> {
        if !is_http_url(host.url()) {
            debug!(url = host.url(), "declining non-http page");
            return Err(DeclineReason::UnsupportedScheme);
        }

        let problems = settings.validate();
        if !problems.is_empty() {
            warn!(?problems, "declining attach, settings invalid");
            return Err(DeclineReason::InvalidSettings(problems));
        }

        for (pattern, error) in settings.invalid_blocked_patterns() {
            warn!(pattern, %error, "ignoring unparsable block pattern");
        }
        if settings.blocks_url(host.url()) {
            debug!(url = host.url(), "declining block-listed page");
            return Err(DeclineReason::BlockedPage);
        }

        let autoscroll = AutoscrollController::new(config.autoscroll_interval);
        debug!(debug_mode = settings.debug_mode, "engine attached");
        Ok(Self {
            host,
            surface,
            sink,
            settings,
            config,
            phase: Phase::Idle,
            gesture: None,
            held: None,
            autoscroll,
            pointer: PagePoint::default(),
        })
    }

    /// Process one input event.
    ///
    /// Expired deadlines are settled first, so an event arriving after a
    /// deadline (but before the embedder's `poll`) still sees the
    /// post-deadline state.
    pub fn feed(&mut self, event: &InputEvent, now: Instant) -> InputDisposition {
        self.expire(now);

        match event {
            InputEvent::PointerDown(p) => self.on_pointer_down(p, now),
            InputEvent::PointerMove(p) | InputEvent::PointerOut(p) => self.on_pointer_move(p, now),
            InputEvent::PointerUp(p) => self.on_pointer_up(p, now),
            InputEvent::Wheel => {
                // The page owns the scroll; we only re-project visuals.
                self.render();
                InputDisposition::PassThrough
            }
            InputEvent::KeyDown(k) => self.on_key_down(k),
            InputEvent::KeyUp(k) => self.on_key_up(k),
            InputEvent::Blur => {
                self.held = None;
                InputDisposition::PassThrough
            }
            InputEvent::ContextMenu => {
                if self.gesture.is_some() {
                    InputDisposition::Consume
                } else {
                    InputDisposition::PassThrough
                }
            }
        }
    }

    /// Settle expired deadlines and report the next one, if any.
    ///
    /// The embedder should schedule a wake-up for the returned instant.
    /// Returns `None` when no deadline is pending.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        self.expire(now);

        let late_arm = match self.phase {
            Phase::LateArmPending { deadline, .. } => Some(deadline),
            _ => None,
        };
        let release = match self.phase {
            Phase::Releasing { deadline, .. } => Some(deadline),
            _ => None,
        };
        [late_arm, release, self.autoscroll.deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Replace the settings, re-deriving the live gesture's palette.
    ///
    /// An invalid payload is rejected whole; the previous settings stay in
    /// force. A gesture armed on an action that no longer exists is
    /// re-pointed at the first surviving action so the drag can finish.
    pub fn apply_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        let problems = settings.validate();
        if !problems.is_empty() {
            warn!(?problems, "rejecting settings update");
            return Err(SettingsError::Validation(problems));
        }
        for (pattern, error) in settings.invalid_blocked_patterns() {
            warn!(pattern, %error, "ignoring unparsable block pattern");
        }
        self.settings = settings;

        if let Some(gesture) = self.gesture.as_mut()
            && let Some((resolved_id, action)) =
                self.settings.active_or_first(Some(&gesture.action_id))
        {
            gesture.color = action.normalized_color();
            gesture.selection.set_filter(compile_filter(&action.options));
            if resolved_id != gesture.action_id {
                debug!(
                    from = %gesture.action_id,
                    to = resolved_id,
                    "armed action vanished, re-pointing gesture"
                );
                gesture.action_id = resolved_id.to_owned();
            }
        }
        self.render();
        debug!("settings replaced");
        Ok(())
    }

    /// Tear the engine down, restoring the page and returning the
    /// collaborators.
    pub fn detach(mut self) -> (H, S, D) {
        self.gesture = None;
        self.phase = Phase::Idle;
        self.restore_page();
        debug!("engine detached");
        let Self {
            host, surface, sink, ..
        } = self;
        (host, surface, sink)
    }

    /// The settings currently in force.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The timing configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ActivationConfig {
        &self.config
    }

    /// Whether a gesture is in flight (armed, selecting, or releasing).
    #[inline]
    #[must_use]
    pub fn has_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// Whether selection visuals are on screen.
    #[inline]
    #[must_use]
    pub fn is_selecting(&self) -> bool {
        matches!(self.phase, Phase::Active | Phase::Releasing { .. })
    }

    /// The tracked held key, if any.
    #[inline]
    #[must_use]
    pub fn held_key(&self) -> Option<HeldKey> {
        self.held
    }

    /// The attached page.
    #[inline]
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable page access, for embedders that fold state updates into the
    /// host between events.
    #[inline]
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The draw target.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The dispatch sink.
    #[inline]
    #[must_use]
    pub fn sink(&self) -> &D {
        &self.sink
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl<H, S, D> ActivationController<H, S, D>
where
    H: PageHost,
    S: Surface,
    D: DispatchSink,
{
    fn on_pointer_down(&mut self, p: &PointerEvent, now: Instant) -> InputDisposition {
        if p.target == TargetKind::Editable {
            return InputDisposition::PassThrough;
        }

        match self.phase {
            Phase::Releasing { .. } => {
                // Bounce: the release was not final after all. Drop the
                // pending dispatch and keep selecting.
                self.phase = Phase::Active;
                self.pointer = p.pos();
                if let Some(gesture) = self.gesture.as_mut() {
                    gesture.selection.update(self.pointer);
                }
                self.render();
                debug!("gesture resumed across release bounce");
                InputDisposition::Consume
            }
            Phase::Armed | Phase::Active => {
                // A second down without an up in between means we missed the
                // release. Throw the stale gesture away and start over.
                self.abort_gesture();
                self.try_arm_or_wait(p, now)
            }
            Phase::LateArmPending { .. } => {
                self.phase = Phase::Idle;
                self.try_arm_or_wait(p, now)
            }
            Phase::Idle => self.try_arm_or_wait(p, now),
        }
    }

    fn try_arm_or_wait(&mut self, p: &PointerEvent, now: Instant) -> InputDisposition {
        let resolved = TriggerRegistry::new(&self.settings.profiles, &self.settings.actions)
            .resolve(self.held.as_ref(), p.modifiers, p.button)
            .map(|r| (r.action_id.to_owned(), r.profile.map(|pr| pr.name.clone())));

        if let Some((action_id, profile_name)) = resolved
            && self.arm(&action_id, profile_name, p.pos())
        {
            return InputDisposition::Consume;
        }

        self.phase = Phase::LateArmPending {
            deadline: now + self.config.late_arm_grace,
            anchor: p.pos(),
            button: p.button,
        };
        InputDisposition::PassThrough
    }

    /// Freeze a snapshot and enter Armed. Returns false if the action id is
    /// not in the map (resolution guarantees it is, so false means the map
    /// changed underneath us).
    fn arm(&mut self, action_id: &str, profile_name: Option<String>, anchor: PagePoint) -> bool {
        let Some(action) = self.settings.actions.get(action_id) else {
            return false;
        };
        let filter = compile_filter(&action.options);
        let color = action.normalized_color();
        let index = GeometryIndex::snapshot(&self.host, &action.options);
        debug!(action_id, links = index.len(), "gesture armed");

        let selection = SelectionEngine::begin(anchor, index, filter)
            .with_threshold(self.config.drag_threshold_px);
        self.gesture = Some(Gesture {
            action_id: action_id.to_owned(),
            profile_name,
            color,
            selection,
        });
        self.phase = Phase::Armed;
        self.pointer = anchor;
        true
    }

    fn on_pointer_move(&mut self, p: &PointerEvent, now: Instant) -> InputDisposition {
        match self.phase {
            Phase::Idle | Phase::LateArmPending { .. } => InputDisposition::PassThrough,
            Phase::Armed => {
                self.pointer = p.pos();
                let crossed = self
                    .gesture
                    .as_mut()
                    .is_some_and(|g| g.selection.update(p.pos()).is_some());
                if crossed {
                    self.phase = Phase::Active;
                    self.surface.set_text_selection_enabled(false);
                    self.autoscroll.ensure_armed(now);
                    self.render();
                    debug!("drag escaped dead zone, selection live");
                }
                InputDisposition::Consume
            }
            Phase::Active | Phase::Releasing { .. } => {
                self.pointer = p.pos();
                if let Some(gesture) = self.gesture.as_mut() {
                    gesture.selection.update(p.pos());
                }
                self.render();
                self.autoscroll.ensure_armed(now);
                InputDisposition::Consume
            }
        }
    }

    fn on_pointer_up(&mut self, p: &PointerEvent, now: Instant) -> InputDisposition {
        match self.phase {
            Phase::Idle => InputDisposition::PassThrough,
            Phase::LateArmPending { .. } => {
                self.phase = Phase::Idle;
                InputDisposition::PassThrough
            }
            Phase::Armed => {
                // Click, not a drag.
                self.abort_gesture();
                debug!("gesture aborted inside dead zone");
                InputDisposition::Consume
            }
            Phase::Active | Phase::Releasing { .. } => {
                self.pointer = p.pos();
                self.phase = Phase::Releasing {
                    deadline: now + self.config.release_debounce,
                    release: p.pos(),
                };
                InputDisposition::Consume
            }
        }
    }

    fn on_key_down(&mut self, k: &KeyPress) -> InputDisposition {
        if k.target == TargetKind::Editable {
            return InputDisposition::PassThrough;
        }
        // End and Home scroll the page; they are never tracked as held.
        if let KeyToken::Char(c) = k.token
            && !k.repeat
        {
            self.held = Some(HeldKey::new(c, k.modifiers));

            if let Phase::LateArmPending { anchor, button, .. } = self.phase {
                let resolved =
                    TriggerRegistry::new(&self.settings.profiles, &self.settings.actions)
                        .resolve_late(&HeldKey::new(c, k.modifiers), button)
                        .map(|r| (r.action_id.to_owned(), r.profile.map(|pr| pr.name.clone())));
                if let Some((action_id, profile_name)) = resolved
                    && self.arm(&action_id, profile_name, anchor)
                {
                    debug!(key = %c, "late key completed the trigger");
                }
            }
        }
        InputDisposition::PassThrough
    }

    fn on_key_up(&mut self, k: &KeyPress) -> InputDisposition {
        if k.target == TargetKind::Editable {
            return InputDisposition::PassThrough;
        }
        if let KeyToken::Char(c) = k.token
            && self.held.is_some_and(|held| held.key == c)
        {
            self.held = None;
        }
        InputDisposition::PassThrough
    }

    /// Settle every deadline at or before `now`.
    fn expire(&mut self, now: Instant) {
        if let Phase::LateArmPending { deadline, .. } = self.phase
            && now >= deadline
        {
            self.phase = Phase::Idle;
            debug!("late-arm grace lapsed");
        }

        if let Phase::Releasing { deadline, release } = self.phase
            && now >= deadline
        {
            self.finish(release);
        }

        if self.autoscroll.due(now) {
            match self.phase {
                Phase::Active | Phase::Releasing { .. } => self.autoscroll_step(now),
                _ => self.autoscroll.clear(),
            }
        }
    }

    /// Final recompute at the release point, dispatch, restore the page.
    fn finish(&mut self, release: PagePoint) {
        self.phase = Phase::Idle;
        let Some(mut gesture) = self.gesture.take() else {
            self.restore_page();
            return;
        };

        let links: Vec<MatchedLink> = gesture
            .selection
            .end(release)
            .into_iter()
            .map(|link| MatchedLink::new(link.href.clone(), link.title.clone()))
            .collect();

        if !links.is_empty() {
            match self.settings.actions.get(&gesture.action_id) {
                Some(action) => {
                    let links = finalize_links(links, &action.options);
                    info!(
                        action_id = %gesture.action_id,
                        count = links.len(),
                        "dispatching selection"
                    );
                    self.sink.dispatch(DispatchRequest {
                        action_id: gesture.action_id.clone(),
                        links,
                    });
                }
                None => {
                    warn!(
                        action_id = %gesture.action_id,
                        "armed action no longer configured, dropping selection"
                    );
                }
            }
        }
        self.restore_page();
    }

    /// Drop the gesture without dispatching.
    fn abort_gesture(&mut self) {
        self.gesture = None;
        self.phase = Phase::Idle;
        self.restore_page();
    }

    fn restore_page(&mut self) {
        self.autoscroll.clear();
        self.surface.clear_overlays();
        self.surface.set_text_selection_enabled(true);
    }

    /// One autoscroll tick: move the page, drag the virtual pointer with
    /// it, recompute, re-render.
    fn autoscroll_step(&mut self, now: Instant) {
        let viewport = self.host.viewport();
        let scroll = self.host.scroll();
        match autoscroll::scroll_delta(self.pointer.y, viewport.height, scroll.y) {
            Some(delta) => {
                self.host.scroll_by(0.0, delta);
                self.pointer.y += delta;
                if let Some(gesture) = self.gesture.as_mut() {
                    gesture.selection.update(self.pointer);
                }
                self.render();
                self.autoscroll.rearm(now);
            }
            None => self.autoscroll.clear(),
        }
    }

    /// Project the marquee, label, and highlights into the viewport.
    ///
    /// No-op until the drag has escaped the dead zone.
    fn render(&mut self) {
        let Some(gesture) = &self.gesture else {
            return;
        };
        if !gesture.selection.is_active() {
            return;
        }

        let scroll = self.host.scroll();
        self.surface.show_marquee(
            gesture.selection.marquee().rect().to_viewport(scroll),
            &gesture.color,
        );

        let label = gesture.selection.label(gesture.profile_name.as_deref());
        let cursor = ViewportPoint::from_page(self.pointer, scroll);
        self.surface.show_label(
            &label,
            ViewportPoint::new(
                cursor.x + LABEL_POINTER_OFFSET_PX,
                cursor.y + LABEL_POINTER_OFFSET_PX,
            ),
        );

        for link in gesture.selection.index().links() {
            if gesture.selection.is_selected(link.id) {
                self.surface
                    .highlight(link.id, link.rect.to_viewport(scroll), &gesture.color);
            } else {
                self.surface.clear_highlight(link.id);
            }
        }
    }
}

/// Compile an action's link filter, downgrading a bad pattern to
/// [`LinkFilter::Broken`] with a log line.
fn compile_filter(options: &ActionOptions) -> LinkFilter {
    match LinkFilter::try_compile(
        &options.filter_pattern,
        options.filter_mode,
        options.filter_case_insensitive,
    ) {
        Ok(filter) => filter,
        Err(error) => {
            warn!(%error, pattern = %options.filter_pattern, "filter pattern rejected");
            LinkFilter::Broken
        }
    }
}

/// True for http and https URLs, matched case-insensitively.
fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
