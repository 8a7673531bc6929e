#![forbid(unsafe_code)]

//! Lariat Engine
//!
//! This crate ties the core types (events, triggers, filters, settings) into
//! a complete link-selection engine: snapshotting a page's links, tracking a
//! marquee drag, autoscrolling at the viewport edges, and dispatching the
//! final selection to an action sink.
//!
//! # Key Components
//!
//! - [`ActivationController`] - The gesture state machine and engine entry point
//! - [`PageHost`] - Read access to the page (URL, metrics, link candidates)
//! - [`Surface`] - Draw target for the marquee, count label, and highlights
//! - [`DispatchSink`] - Receiver for the finalized selection
//! - [`GeometryIndex`] - Per-gesture frozen snapshot of selectable links
//! - [`SelectionEngine`] - Marquee geometry, overlap pass, and label text
//! - [`AutoscrollController`] - Deadline bookkeeping for edge autoscroll
//!
//! # Role in Lariat
//! `lariat-engine` is the orchestrator. The embedder translates host events
//! into `lariat-core` event types, feeds them to [`ActivationController`],
//! and obeys the returned disposition; everything between pointer-down and
//! dispatch happens in here.
//!
//! # How it fits in the system
//! The engine sits between the embedder's three adapters: it reads pages
//! through [`PageHost`], draws through [`Surface`], and hands completed
//! selections to [`DispatchSink`]. It owns no platform resources and never
//! spawns timers; the embedder drives deadlines via
//! [`ActivationController::poll`].

pub mod activation;
pub mod autoscroll;
pub mod dispatch;
pub mod host;
pub mod index;
pub mod selection;
pub mod surface;

pub use activation::{ActivationConfig, ActivationController, DeclineReason};
pub use autoscroll::AutoscrollController;
pub use dispatch::{DispatchRequest, DispatchSink, MatchedLink};
pub use host::{LinkCandidate, PageHost, ViewportSize};
pub use index::{GeometryIndex, IndexedLink, LinkId};
pub use selection::{Marquee, SelectionEngine, SelectionUpdate};
pub use surface::Surface;
