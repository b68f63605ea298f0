#![forbid(unsafe_code)]

//! Boundary widgets for FrankenPage.
//!
//! These are one-shot pieces of DOM wiring with no shared timing state:
//! media hints and fallbacks, the privacy modal, the poll simulation, smooth
//! anchor scrolling and hover/ripple micro-interactions. Each one mounts
//! against the document, degrades to "not mounted" when its markup is
//! missing, and then reacts to [`PageEvent`]s routed by the runtime.

pub mod media;
pub mod micro;
pub mod poll;
pub mod privacy_modal;
pub mod smooth_scroll;

use std::time::Duration;

use fpage_core::{Document, NodeId, PageConfig, PageEffect, PageEvent, SelectorList, Viewport};

pub use media::MediaOptimizer;
pub use micro::Microinteractions;
pub use poll::{Poll, PollResults};
pub use privacy_modal::PrivacyModal;
pub use smooth_scroll::SmoothScroll;

/// Deferred work a widget asks the runtime to run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetTask {
    /// Detach a node (e.g. an expired ripple).
    Remove(NodeId),
}

impl WidgetTask {
    /// Carry out the task.
    pub fn run(self, doc: &mut Document) {
        match self {
            Self::Remove(node) => doc.detach(node),
        }
    }
}

/// Everything a widget may touch while handling an event.
pub struct WidgetCx<'a> {
    pub doc: &'a mut Document,
    pub viewport: Viewport,
    pub config: &'a PageConfig,
    pub effects: &'a mut Vec<PageEffect>,
    /// Tasks to run after the given delay.
    pub deferred: &'a mut Vec<(Duration, WidgetTask)>,
}

/// A boundary widget.
pub trait Widget: Sized {
    /// Short name for logs.
    const NAME: &'static str;

    /// Attach to the document. `None` when the markup the widget needs is
    /// absent; nothing is modified in that case.
    fn mount(doc: &mut Document, config: &PageConfig) -> Option<Self>;

    /// React to one event. Returns whether the widget acted on it.
    fn handle(&mut self, event: &PageEvent, cx: &mut WidgetCx<'_>) -> bool;
}

/// Parse a built-in selector, logging instead of failing.
pub(crate) fn builtin_selector(src: &str) -> Option<SelectorList> {
    match SelectorList::parse(src) {
        Ok(sel) => Some(sel),
        Err(err) => {
            tracing::warn!(
                target: "fpage::widgets",
                selector = src,
                %err,
                "built-in selector rejected"
            );
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Owned state backing a [`WidgetCx`] in unit tests.
    pub struct Harness {
        pub doc: Document,
        pub viewport: Viewport,
        pub config: PageConfig,
        pub effects: Vec<PageEffect>,
        pub deferred: Vec<(Duration, WidgetTask)>,
    }

    impl Harness {
        pub fn new(doc: Document) -> Self {
            Self {
                doc,
                viewport: Viewport::default(),
                config: PageConfig::default(),
                effects: Vec::new(),
                deferred: Vec::new(),
            }
        }

        pub fn mount<W: Widget>(&mut self) -> Option<W> {
            W::mount(&mut self.doc, &self.config)
        }

        pub fn send<W: Widget>(&mut self, widget: &mut W, event: PageEvent) -> bool {
            let mut cx = WidgetCx {
                doc: &mut self.doc,
                viewport: self.viewport,
                config: &self.config,
                effects: &mut self.effects,
                deferred: &mut self.deferred,
            };
            widget.handle(&event, &mut cx)
        }
    }
}
