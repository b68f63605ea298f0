#![forbid(unsafe_code)]

//! Core: document model, selectors, geometry, events and scheduling.
//!
//! # Role in FrankenPage
//! `fpage-core` is the input layer. It owns the host-supplied document model,
//! the viewport geometry the observers measure against, the canonical
//! [`event::PageEvent`] values the runtime consumes, and the deterministic
//! timer queue every rate-limited behaviour schedules on.
//!
//! # Primary responsibilities
//! - **Document**: arena of elements with classes, attributes, inline styles
//!   and layout rectangles.
//! - **Selectors**: a small selector engine plus ordered fallback chains.
//! - **Scheduler**: [`scheduler::TimerQueue`] and [`scheduler::RateLimiter`]
//!   (leading throttle / trailing debounce).
//! - **Config**: [`config::PageConfig`] with env and file overrides.
//!
//! # How it fits in the system
//! `fpage-runtime` mounts its components against a [`dom::Document`] and
//! routes [`event::PageEvent`] values to them. `fpage-widgets` builds the
//! boundary widgets on the same primitives, and `fpage-web` drives the whole
//! thing from a host with a [`clock::DeterministicClock`].

pub mod clock;
pub mod config;
pub mod dom;
pub mod event;
pub mod geometry;
pub mod logging;
pub mod scheduler;
pub mod selector;

pub use clock::{DeterministicClock, MonotonicClock, WallClock};
pub use config::{ConfigError, PageConfig};
pub use dom::{Document, Element, NodeId};
pub use event::{Key, PageEffect, PageEvent};
pub use geometry::{BreakpointClass, Rect, RootMargin, Viewport};
pub use scheduler::{CallOutcome, RateLimiter, RatePolicy, TimerId, TimerQueue};
pub use selector::{SelectorChain, SelectorError, SelectorList};
