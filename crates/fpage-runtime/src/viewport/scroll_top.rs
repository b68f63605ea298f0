#![forbid(unsafe_code)]

//! Floating back-to-top button.

use fpage_core::{Document, Element, NodeId, PageConfig, PageEffect, RateLimiter, TimerId};

use crate::program::{RuntimeCx, TimerToken};

/// Accessible label of the button.
pub const SCROLL_TOP_LABEL: &str = "Nach oben scrollen";

#[derive(Debug, Clone)]
pub struct ScrollTopButton {
    button: NodeId,
    scroll: RateLimiter<f64>,
    visible: bool,
}

impl ScrollTopButton {
    /// Append the (hidden) button to `body`.
    pub fn mount(doc: &mut Document, config: &PageConfig) -> Self {
        let body = doc.body();
        let button = doc.append(
            body,
            Element::new("button")
                .with_class("scroll-to-top")
                .with_attr("type", "button")
                .with_attr("aria-label", SCROLL_TOP_LABEL)
                .with_text("↑")
                .with_style("position", "fixed")
                .with_style("bottom", "30px")
                .with_style("right", "30px")
                .with_style("width", "50px")
                .with_style("height", "50px")
                .with_style("background", "var(--color-primary)")
                .with_style("color", "var(--color-white)")
                .with_style("border", "none")
                .with_style("border-radius", "50%")
                .with_style("font-size", "24px")
                .with_style("cursor", "pointer")
                .with_style("opacity", "0")
                .with_style("visibility", "hidden")
                .with_style("transition", "all 0.3s ease-in-out")
                .with_style("z-index", "999")
                .with_style("box-shadow", "var(--shadow-lg)"),
        );
        Self {
            button,
            scroll: RateLimiter::throttle(config.scroll_throttle()),
            visible: false,
        }
    }

    #[must_use]
    pub const fn button(&self) -> NodeId {
        self.button
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn on_scroll(&mut self, y: f64, cx: &mut RuntimeCx<'_>) {
        self.scroll.call(y, cx.timers, TimerToken::ScrollTopScroll);
    }

    pub fn on_timer(&mut self, id: TimerId, cx: &mut RuntimeCx<'_>) {
        let Some(y) = self.scroll.fire(id) else {
            return;
        };
        self.visible = y > cx.config.scroll_top_threshold;
        let (opacity, visibility) = if self.visible {
            ("1", "visible")
        } else {
            ("0", "hidden")
        };
        cx.doc.set_style(self.button, "opacity", opacity);
        cx.doc.set_style(self.button, "visibility", visibility);
    }

    /// Clicks on the button scroll smoothly to the top.
    pub fn on_click(&self, target: NodeId, cx: &mut RuntimeCx<'_>) -> bool {
        if !cx.doc.contains(self.button, target) {
            return false;
        }
        cx.effects.push(PageEffect::ScrollTo {
            top: 0.0,
            smooth: true,
        });
        true
    }

    pub fn dispose(&mut self, cx: &mut RuntimeCx<'_>) {
        self.scroll.dispose(cx.timers);
    }
}
