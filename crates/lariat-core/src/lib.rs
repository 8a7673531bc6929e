#![forbid(unsafe_code)]

//! Core: input events, page geometry, trigger matching, and settings.
//!
//! # Role in Lariat
//! `lariat-core` is the data layer. It owns the normalized input event types,
//! page/viewport geometry math, the trigger-profile registry, the link and
//! ignore filters, and the typed settings payload that the engine consumes.
//!
//! # Primary responsibilities
//! - **Event**: canonical pointer/key input events in page coordinates.
//! - **Geometry**: page-space rectangles, inclusive overlap, viewport mapping.
//! - **Trigger**: profile signatures and two-pass gesture resolution.
//! - **Filter**: selection-time link filters and snapshot-time ignore lists.
//! - **Settings**: the collaborator payload, validation, and block list.
//!
//! # How it fits in the system
//! The engine (`lariat-engine`) feeds `lariat-core` events through its state
//! machine and uses the registry, filters, and geometry here to decide what a
//! marquee selects. Everything in this crate is pure and host-independent, so
//! it tests without any page abstraction.

pub mod event;
pub mod filter;
pub mod geometry;
pub mod settings;
pub mod trigger;

#[cfg(feature = "test-helpers")]
pub mod test_support;
