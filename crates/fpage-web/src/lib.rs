#![forbid(unsafe_code)]

//! `fpage-web` drives a FrankenPage runtime from a host environment.
//!
//! Design goals:
//! - **Host-driven I/O**: the embedding environment (a JS shim, a test, a
//!   replayed session) pushes input events and viewport changes.
//! - **Deterministic time**: the host advances a monotonic clock explicitly;
//!   timers fire only inside [`WebPage::advance`].
//! - **No blocking / no threads**: suitable for `wasm32-unknown-unknown`.
//!
//! Outward effects (navigation, alerts, scrolls) are buffered together with
//! host-readable log lines in [`WebOutputs`] until the host takes them.
//!
//! With feature `input-parser`, hosts can push JSON-encoded input records
//! (see [`input_parser`]) and record/replay whole sessions as JSONL (see
//! [`session_record`]).

#[cfg(feature = "input-parser")]
pub mod input_parser;
#[cfg(feature = "input-parser")]
pub mod session_record;

use core::time::Duration;

use fpage_core::{
    DeterministicClock, Document, MonotonicClock, PageConfig, PageEffect, PageEvent, Viewport,
};
use fpage_runtime::PageRuntime;

/// Web driver error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebPageError {
    /// The page was disposed; no further input is accepted.
    Disposed,
    /// A JSON input record could not be turned into an event.
    #[cfg(feature = "input-parser")]
    Input(input_parser::InputParseError),
}

impl core::fmt::Display for WebPageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Disposed => write!(f, "page disposed"),
            #[cfg(feature = "input-parser")]
            Self::Input(e) => write!(f, "input error: {e}"),
        }
    }
}

impl std::error::Error for WebPageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Disposed => None,
            #[cfg(feature = "input-parser")]
            Self::Input(e) => Some(e),
        }
    }
}

#[cfg(feature = "input-parser")]
impl From<input_parser::InputParseError> for WebPageError {
    fn from(e: input_parser::InputParseError) -> Self {
        Self::Input(e)
    }
}

/// Captured outputs for host consumption.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct WebOutputs {
    /// Effects the host must carry out, in emission order.
    pub effects: Vec<PageEffect>,
    /// Log lines written by the driver.
    pub logs: Vec<String>,
}

impl WebOutputs {
    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.logs.is_empty()
    }
}

/// Human-readable one-line description of an effect.
#[must_use]
pub fn describe_effect(effect: &PageEffect) -> String {
    match effect {
        PageEffect::Navigate(url) => format!("navigate {url}"),
        PageEffect::Alert(message) => format!("alert {message:?}"),
        PageEffect::ScrollTo { top, smooth } => {
            format!("scroll-to {top} ({})", if *smooth { "smooth" } else { "instant" })
        }
    }
}

/// A bootstrapped page driven by the host.
///
/// - push events via [`Self::push_event`]
/// - advance time via [`Self::advance`] or [`Self::set_time`]
/// - read effects and logs via [`Self::take_outputs`]
#[derive(Debug)]
pub struct WebPage {
    runtime: PageRuntime,
    clock: DeterministicClock,
    outputs: WebOutputs,
}

impl WebPage {
    /// Bootstrap a page over `document`.
    #[must_use]
    pub fn new(document: Document, viewport: Viewport, config: PageConfig) -> Self {
        let mut page = Self {
            runtime: PageRuntime::bootstrap(document, viewport, config),
            clock: DeterministicClock::new(),
            outputs: WebOutputs::default(),
        };
        page.collect_effects();
        page
    }

    /// Bootstrap with defaults overridden by `FPAGE_*` environment variables.
    #[must_use]
    pub fn from_env(document: Document, viewport: Viewport) -> Self {
        Self::new(document, viewport, PageConfig::from_env())
    }

    /// The runtime behind the page.
    #[must_use]
    pub const fn runtime(&self) -> &PageRuntime {
        &self.runtime
    }

    /// Mutable access to the runtime, e.g. to adjust layout rects.
    pub fn runtime_mut(&mut self) -> &mut PageRuntime {
        &mut self.runtime
    }

    /// Current host time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now_mono()
    }

    /// Deliver one event.
    pub fn push_event(&mut self, event: PageEvent) -> Result<(), WebPageError> {
        if self.runtime.is_disposed() {
            return Err(WebPageError::Disposed);
        }
        tracing::trace!(target: "fpage::runtime", kind = event.kind_name(), "host event");
        self.runtime.dispatch(event);
        self.collect_effects();
        Ok(())
    }

    /// Deliver a JSON-encoded input record. Returns whether it mapped to an
    /// event; unknown kinds are skipped.
    #[cfg(feature = "input-parser")]
    pub fn push_input(&mut self, json: &str) -> Result<bool, WebPageError> {
        if self.runtime.is_disposed() {
            return Err(WebPageError::Disposed);
        }
        match input_parser::parse_input(self.runtime.document(), json)? {
            Some(event) => {
                self.push_event(event)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Advance time by `dt`, firing due timers. Returns how many fired.
    pub fn advance(&mut self, dt: Duration) -> usize {
        self.clock.advance(dt);
        let fired = self.runtime.advance(dt);
        self.collect_effects();
        fired
    }

    /// Move time forward to `now`. Earlier instants are ignored.
    pub fn set_time(&mut self, now: Duration) -> usize {
        match now.checked_sub(self.clock.now_mono()) {
            Some(dt) if !dt.is_zero() => self.advance(dt),
            _ => 0,
        }
    }

    /// Append a line to the captured log.
    pub fn write_log(&mut self, text: &str) {
        self.outputs.logs.push(text.to_owned());
    }

    /// Captured outputs so far.
    #[must_use]
    pub const fn outputs(&self) -> &WebOutputs {
        &self.outputs
    }

    /// Take captured outputs, leaving empty defaults.
    pub fn take_outputs(&mut self) -> WebOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Tear the page down. Pending effects stay available.
    pub fn dispose(&mut self) {
        self.runtime.dispose();
        self.collect_effects();
        self.write_log("page disposed");
    }

    fn collect_effects(&mut self) {
        let ms = self.clock.now_mono().as_millis();
        for effect in self.runtime.take_effects() {
            self.outputs
                .logs
                .push(format!("[{ms}ms] {}", describe_effect(&effect)));
            self.outputs.effects.push(effect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpage_core::{Element, NodeId};

    use pretty_assertions::assert_eq;

    fn poll_page() -> (Document, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let section = doc.append(body, Element::new("section").with_id("poll-section"));
        doc.append(section, Element::new("div").with_class("poll-options"));
        let button = doc.append(section, Element::new("button").with_id("vote-button"));
        (doc, button)
    }

    #[test]
    fn deterministic_clock_tracks_host_time() {
        let mut page = WebPage::new(Document::new(), Viewport::default(), PageConfig::default());
        assert_eq!(page.now(), Duration::ZERO);
        page.advance(Duration::from_millis(10));
        page.set_time(Duration::from_millis(25));
        assert_eq!(page.now(), Duration::from_millis(25));

        // Going backwards is a no-op.
        assert_eq!(page.set_time(Duration::from_millis(5)), 0);
        assert_eq!(page.now(), Duration::from_millis(25));
        assert_eq!(page.runtime().now(), Duration::from_millis(25));
    }

    #[test]
    fn effects_are_captured_with_log_lines() {
        let (doc, button) = poll_page();
        let mut page = WebPage::new(doc, Viewport::default(), PageConfig::default());
        page.advance(Duration::from_millis(40));
        page.push_event(PageEvent::click(button)).unwrap();
        page.write_log("host note");

        let outputs = page.take_outputs();
        assert_eq!(outputs.effects.len(), 1);
        assert!(matches!(outputs.effects[0], PageEffect::Alert(_)));
        assert_eq!(outputs.logs.len(), 2);
        assert!(outputs.logs[0].starts_with("[40ms] alert "));
        assert_eq!(outputs.logs[1], "host note");
        assert!(page.outputs().is_empty());
    }

    #[test]
    fn disposed_page_rejects_input() {
        let (doc, button) = poll_page();
        let mut page = WebPage::new(doc, Viewport::default(), PageConfig::default());
        page.dispose();
        assert_eq!(
            page.push_event(PageEvent::click(button)),
            Err(WebPageError::Disposed)
        );
        assert_eq!(page.take_outputs().logs, vec!["page disposed"]);
    }

    #[test]
    fn effect_descriptions() {
        assert_eq!(
            describe_effect(&PageEffect::Navigate("thank_you.html".into())),
            "navigate thank_you.html"
        );
        assert_eq!(
            describe_effect(&PageEffect::ScrollTo {
                top: 0.0,
                smooth: true
            }),
            "scroll-to 0 (smooth)"
        );
        assert_eq!(WebPageError::Disposed.to_string(), "page disposed");
    }
}
