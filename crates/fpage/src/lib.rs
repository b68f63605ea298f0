#![forbid(unsafe_code)]

//! FrankenPage public facade crate.
//!
//! This crate provides the stable surface area for hosts. It re-exports the
//! common types from the internal crates and offers a prelude for day-to-day
//! usage.
//!
//! ```ignore
//! use fpage::prelude::*;
//!
//! let mut page = fpage::bootstrap(document, Viewport::new(1280.0, 800.0));
//! page.dispatch(PageEvent::Scroll { y: 640.0 });
//! page.advance(Duration::from_millis(100));
//! for effect in page.take_effects() { /* navigate, alert, scroll */ }
//! ```

pub mod error;

pub use error::{DegradationAction, Error, Result};

// --- Core re-exports -------------------------------------------------------

pub use fpage_core::{
    BreakpointClass, DeterministicClock, Document, Element, Key, MonotonicClock, NodeId,
    PageConfig, PageEffect, PageEvent, RateLimiter, RatePolicy, Rect, RootMargin, SelectorChain,
    SelectorList, TimerQueue, Viewport, WallClock,
};

// --- Runtime re-exports ----------------------------------------------------

pub use fpage_runtime::{FormEngine, MenuState, NavController, PageRuntime, ViewportEngine};

// --- Widget re-exports -----------------------------------------------------

pub use fpage_widgets::{
    MediaOptimizer, Microinteractions, Poll, PollResults, PrivacyModal, SmoothScroll, Widget,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use fpage_web::{WebOutputs, WebPage, WebPageError};

/// Bootstrap a page with defaults overridden by `FPAGE_*` variables.
#[must_use]
pub fn bootstrap(document: Document, viewport: Viewport) -> PageRuntime {
    PageRuntime::bootstrap(document, viewport, PageConfig::from_env())
}

/// Load a [`PageConfig`] from a `.toml` or `.json` file. Values that need
/// clamping are rejected.
#[cfg(feature = "page-config")]
pub fn load_config(path: impl AsRef<std::path::Path>) -> Result<PageConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => PageConfig::from_json_str(&text)?,
        _ => PageConfig::from_toml_str(&text)?,
    };
    let problems = config.validate();
    if problems.is_empty() {
        Ok(config)
    } else {
        Err(fpage_core::ConfigError::Validation(problems).into())
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Document, Element, Error, Key, NodeId, PageConfig, PageEffect, PageEvent, PageRuntime,
        Rect, Result, Viewport,
    };

    #[cfg(feature = "web")]
    pub use crate::WebPage;

    pub use crate::{core, runtime, widgets};

    pub use std::time::Duration;
}

pub use fpage_core as core;
pub use fpage_runtime as runtime;
#[cfg(feature = "web")]
pub use fpage_web as web;
pub use fpage_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn bootstrap_mounts_from_the_prelude() {
        let mut doc = Document::new();
        let body = doc.body();
        let section = doc.append(body, Element::new("section").with_id("poll-section"));
        let button = doc.append(section, Element::new("button").with_id("vote-button"));

        let mut page = crate::bootstrap(doc, Viewport::default());
        assert!(page.poll().is_some());
        page.dispatch(PageEvent::click(button));
        assert_eq!(page.take_effects().len(), 1);
    }

    #[cfg(feature = "web")]
    #[test]
    fn web_page_is_reachable() {
        let mut page = WebPage::new(Document::new(), Viewport::default(), PageConfig::default());
        page.advance(Duration::from_millis(5));
        assert_eq!(page.now(), Duration::from_millis(5));
    }
}
