#![forbid(unsafe_code)]

//! Header elevation driven by throttled scroll position.

use fpage_core::{Document, NodeId, PageConfig, RateLimiter, SelectorChain, TimerId};

use crate::program::{RuntimeCx, TimerToken};

/// Header strategies, first hit wins.
pub const HEADER_STRATEGIES: [&str; 2] = [".l-header", "header"];

/// Shadow below the threshold.
pub const SHADOW_SUBTLE: &str = "var(--shadow-sm)";
/// Shadow at or past the threshold.
pub const SHADOW_PRONOUNCED: &str = "var(--shadow-md)";

#[derive(Debug, Clone)]
pub struct StickyHeader {
    header: NodeId,
    scroll: RateLimiter<f64>,
}

impl StickyHeader {
    pub fn mount(doc: &Document, config: &PageConfig) -> Option<Self> {
        let header = SelectorChain::parse(HEADER_STRATEGIES)
            .ok()?
            .first_match(doc, doc.root())?;
        Some(Self {
            header,
            scroll: RateLimiter::throttle(config.scroll_throttle()),
        })
    }

    #[must_use]
    pub const fn header(&self) -> NodeId {
        self.header
    }

    pub fn on_scroll(&mut self, y: f64, cx: &mut RuntimeCx<'_>) {
        self.scroll.call(y, cx.timers, TimerToken::StickyScroll);
    }

    pub fn on_timer(&mut self, id: TimerId, cx: &mut RuntimeCx<'_>) {
        if let Some(y) = self.scroll.fire(id) {
            self.apply(cx.doc, y, cx.config);
        }
    }

    /// Pick the shadow for a scroll offset.
    pub fn apply(&self, doc: &mut Document, y: f64, config: &PageConfig) {
        let shadow = if y < config.sticky_threshold {
            SHADOW_SUBTLE
        } else {
            SHADOW_PRONOUNCED
        };
        if doc.style(self.header, "box-shadow") != Some(shadow) {
            tracing::debug!(target: "fpage::viewport", y, shadow, "header elevation");
            doc.set_style(self.header, "box-shadow", shadow);
        }
    }

    pub fn dispose(&mut self, cx: &mut RuntimeCx<'_>) {
        self.scroll.dispose(cx.timers);
    }
}
