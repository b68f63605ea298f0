#![forbid(unsafe_code)]

//! Viewport observation engine.
//!
//! Four behaviours share the page's scroll position:
//!
//! | Behaviour | Driven by | Notes |
//! |-----------|-----------|-------|
//! | [`ScrollSpy`] | visibility, band `-20% 0px -70% 0px` | last intersecting section wins |
//! | [`StickyHeader`] | throttled scroll offset | subtle vs. pronounced shadow |
//! | [`Reveal`] | visibility, threshold 0.1 | one-shot |
//! | [`CountUp`] | visibility, threshold 0.5 | one-shot, frame-stepped |
//!
//! plus the [`ScrollTopButton`], which also polls the throttled offset.
//! Visibility is re-measured by the runtime after every scroll or resize;
//! the observers only report changes.
//!
//! [`CountUp`] is mounted separately by the runtime because it mounts after
//! the forms engine.

pub mod count_up;
pub mod observer;
pub mod reveal;
pub mod scroll_top;
pub mod spy;
pub mod sticky;

use fpage_core::{Document, PageConfig, PageEvent, TimerId, Viewport};

pub use count_up::CountUp;
pub use observer::{ObserverOptions, VisibilityEntry, VisibilityObserver};
pub use reveal::Reveal;
pub use scroll_top::ScrollTopButton;
pub use spy::ScrollSpy;
pub use sticky::StickyHeader;

use crate::program::RuntimeCx;

/// Spy, sticky header, reveal and back-to-top.
#[derive(Debug, Clone)]
pub struct ViewportEngine {
    spy: Option<ScrollSpy>,
    sticky: Option<StickyHeader>,
    reveal: Option<Reveal>,
    scroll_top: ScrollTopButton,
}

impl ViewportEngine {
    pub fn mount(doc: &mut Document, config: &PageConfig) -> Self {
        let spy = ScrollSpy::mount(doc);
        let sticky = StickyHeader::mount(doc, config);
        let reveal = Reveal::mount(doc);
        let scroll_top = ScrollTopButton::mount(doc, config);
        tracing::debug!(
            target: "fpage::viewport",
            spy = spy.is_some(),
            sticky = sticky.is_some(),
            reveal = reveal.is_some(),
            "viewport engine mounted"
        );
        Self {
            spy,
            sticky,
            reveal,
            scroll_top,
        }
    }

    #[must_use]
    pub const fn spy(&self) -> Option<&ScrollSpy> {
        self.spy.as_ref()
    }

    #[must_use]
    pub const fn sticky(&self) -> Option<&StickyHeader> {
        self.sticky.as_ref()
    }

    #[must_use]
    pub const fn reveal(&self) -> Option<&Reveal> {
        self.reveal.as_ref()
    }

    #[must_use]
    pub const fn scroll_top(&self) -> &ScrollTopButton {
        &self.scroll_top
    }

    pub fn handle(&mut self, event: &PageEvent, cx: &mut RuntimeCx<'_>) -> bool {
        match *event {
            PageEvent::Scroll { y } => {
                if let Some(sticky) = self.sticky.as_mut() {
                    sticky.on_scroll(y, cx);
                }
                self.scroll_top.on_scroll(y, cx);
                true
            }
            PageEvent::Click { target, .. } => self.scroll_top.on_click(target, cx),
            _ => false,
        }
    }

    pub fn on_sticky_timer(&mut self, id: TimerId, cx: &mut RuntimeCx<'_>) {
        if let Some(sticky) = self.sticky.as_mut() {
            sticky.on_timer(id, cx);
        }
    }

    pub fn on_scroll_top_timer(&mut self, id: TimerId, cx: &mut RuntimeCx<'_>) {
        self.scroll_top.on_timer(id, cx);
    }

    /// Measure spy then reveal targets and apply their batches.
    pub fn refresh(&mut self, doc: &mut Document, viewport: &Viewport) {
        if let Some(spy) = self.spy.as_mut() {
            let batch = spy.observer_mut().collect(doc, viewport);
            spy.apply(doc, &batch);
        }
        if let Some(reveal) = self.reveal.as_mut() {
            let batch = reveal.observer_mut().collect(doc, viewport);
            reveal.apply(doc, &batch);
        }
    }

    pub fn dispose(&mut self, cx: &mut RuntimeCx<'_>) {
        if let Some(sticky) = self.sticky.as_mut() {
            sticky.dispose(cx);
        }
        self.scroll_top.dispose(cx);
    }
}
