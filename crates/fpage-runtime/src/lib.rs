#![forbid(unsafe_code)]

//! Runtime: navigation, viewport observation, form validation and dispatch.
//!
//! # Role in FrankenPage
//! `fpage-runtime` owns the page's behaviour. [`PageRuntime::bootstrap`]
//! mounts every component against a [`fpage_core::Document`], then the host
//! feeds it [`fpage_core::PageEvent`] values and advances time. Components
//! mutate the document and queue [`fpage_core::PageEffect`] values for the
//! host to carry out.
//!
//! # Components
//! - [`nav::NavController`]: burger menu state machine.
//! - [`viewport`]: scroll-spy, sticky header, reveal, count-up and the
//!   back-to-top button, built on [`viewport::VisibilityObserver`].
//! - [`forms::FormEngine`]: per-field validation and the submission gate.
//! - Boundary widgets from `fpage-widgets`.
//!
//! Every component degrades to "not mounted" when its markup is missing.

pub mod forms;
pub mod nav;
pub mod program;
pub mod viewport;

use fpage_core::SelectorList;

pub use forms::{FieldRole, FieldValidationState, FormEngine, FormSubmissionState};
pub use nav::{MenuState, NavController};
pub use program::{PageRuntime, RuntimeCx, TimerToken};
pub use viewport::{ObserverOptions, ViewportEngine, VisibilityEntry, VisibilityObserver};

/// Parse a built-in selector, logging instead of failing.
pub(crate) fn selector(src: &str) -> Option<SelectorList> {
    match SelectorList::parse(src) {
        Ok(sel) => Some(sel),
        Err(err) => {
            tracing::warn!(
                target: "fpage::runtime",
                selector = src,
                %err,
                "built-in selector rejected"
            );
            None
        }
    }
}
