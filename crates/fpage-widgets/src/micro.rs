#![forbid(unsafe_code)]

//! Hover lift and click ripple.
//!
//! Target sets are captured on mount, the way per-element listeners would
//! be; elements added later get no effects.

use ahash::AHashSet;
use fpage_core::{Document, Element, NodeId, PageConfig, PageEvent, Rect};

use crate::{Widget, WidgetCx, WidgetTask, builtin_selector};

const BUTTONS: &str = ".c-button, button, .btn";
const CARDS: &str = ".c-card, .trust-badge, .accordion-item";
const RIPPLE_HOSTS: &str = ".c-button, button, a, .nav-link";

/// Keyframes injected once into `head`.
pub const RIPPLE_KEYFRAMES: &str =
    "@keyframes ripple-animation { to { transform: scale(4); opacity: 0; } }";

/// Hover and ripple state.
#[derive(Debug, Clone)]
pub struct Microinteractions {
    buttons: AHashSet<NodeId>,
    cards: AHashSet<NodeId>,
    ripple_hosts: AHashSet<NodeId>,
    style: NodeId,
}

impl Microinteractions {
    /// The injected keyframes element.
    #[must_use]
    pub const fn style_element(&self) -> NodeId {
        self.style
    }

    fn hover(&self, doc: &mut Document, node: NodeId, entering: bool) -> bool {
        let mut acted = false;
        if self.buttons.contains(&node) {
            let lift = if entering { "translateY(-2px)" } else { "translateY(0)" };
            doc.set_style(node, "transform", lift);
            acted = true;
        }
        if self.cards.contains(&node) {
            if entering {
                doc.set_style(node, "transition", "all 0.3s ease-out");
                doc.set_style(node, "transform", "translateY(-4px)");
                doc.set_style(node, "box-shadow", "var(--shadow-lg)");
            } else {
                doc.set_style(node, "transform", "translateY(0)");
                doc.remove_style(node, "box-shadow");
            }
            acted = true;
        }
        acted
    }

    /// Append a ripple to `host` centred on the pointer.
    fn ripple(doc: &mut Document, host: NodeId, rect: Rect, x: f64, y: f64) -> NodeId {
        let size = rect.width.max(rect.height);
        let left = x - rect.x - size / 2.0;
        let top = y - rect.y - size / 2.0;
        doc.set_style(host, "position", "relative");
        doc.set_style(host, "overflow", "hidden");
        doc.append(
            host,
            Element::new("span")
                .with_class("ripple")
                .with_style("position", "absolute")
                .with_style("width", &format!("{size}px"))
                .with_style("height", &format!("{size}px"))
                .with_style("border-radius", "50%")
                .with_style("background", "rgba(255, 255, 255, 0.5)")
                .with_style("left", &format!("{left}px"))
                .with_style("top", &format!("{top}px"))
                .with_style("transform", "scale(0)")
                .with_style("animation", "ripple-animation 0.6s ease-out")
                .with_style("pointer-events", "none"),
        )
    }
}

impl Widget for Microinteractions {
    const NAME: &'static str = "micro";

    fn mount(doc: &mut Document, _config: &PageConfig) -> Option<Self> {
        let root = doc.root();
        let buttons = doc.query_all(root, &builtin_selector(BUTTONS)?).into_iter().collect();
        let cards = doc.query_all(root, &builtin_selector(CARDS)?).into_iter().collect();
        let ripple_hosts = doc
            .query_all(root, &builtin_selector(RIPPLE_HOSTS)?)
            .into_iter()
            .collect();
        let head = doc.head();
        let style = doc.append(head, Element::new("style").with_text(RIPPLE_KEYFRAMES));
        Some(Self {
            buttons,
            cards,
            ripple_hosts,
            style,
        })
    }

    fn handle(&mut self, event: &PageEvent, cx: &mut WidgetCx<'_>) -> bool {
        match *event {
            PageEvent::PointerEnter(node) => self.hover(cx.doc, node, true),
            PageEvent::PointerLeave(node) => self.hover(cx.doc, node, false),
            PageEvent::Click {
                target,
                client_x,
                client_y,
            } => {
                // Every registered host on the bubbling path gets its own ripple.
                let mut acted = false;
                let mut cursor = Some(target);
                while let Some(node) = cursor {
                    if self.ripple_hosts.contains(&node) {
                        let doc_rect = cx.doc.rect(node);
                        let client_rect = Rect::new(
                            doc_rect.x,
                            doc_rect.y - cx.viewport.scroll_y,
                            doc_rect.width,
                            doc_rect.height,
                        );
                        let span = Self::ripple(cx.doc, node, client_rect, client_x, client_y);
                        cx.deferred
                            .push((cx.config.ripple_lifetime(), WidgetTask::Remove(span)));
                        acted = true;
                    }
                    cursor = cx.doc.parent(node);
                }
                acted
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use std::time::Duration;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let button = doc.append(
            body,
            Element::new("button")
                .with_class("c-button")
                .with_rect(Rect::new(100.0, 900.0, 120.0, 40.0)),
        );
        let card = doc.append(body, Element::new("div").with_class("c-card"));
        let plain = doc.append(body, Element::new("p"));
        (doc, button, card, plain)
    }

    #[test]
    fn mount_injects_one_keyframes_style() {
        let (doc, ..) = page();
        let mut h = Harness::new(doc);
        let micro: Microinteractions = h.mount().unwrap();
        let head = h.doc.head();
        assert_eq!(h.doc.children(head), &[micro.style_element()]);
        assert!(h.doc.text(micro.style_element()).contains("ripple-animation"));
    }

    #[test]
    fn hover_lifts_and_resets() {
        let (doc, button, card, plain) = page();
        let mut h = Harness::new(doc);
        let mut micro: Microinteractions = h.mount().unwrap();

        assert!(h.send(&mut micro, PageEvent::PointerEnter(button)));
        assert_eq!(h.doc.style(button, "transform"), Some("translateY(-2px)"));
        h.send(&mut micro, PageEvent::PointerLeave(button));
        assert_eq!(h.doc.style(button, "transform"), Some("translateY(0)"));

        h.send(&mut micro, PageEvent::PointerEnter(card));
        assert_eq!(h.doc.style(card, "transform"), Some("translateY(-4px)"));
        assert_eq!(h.doc.style(card, "box-shadow"), Some("var(--shadow-lg)"));
        h.send(&mut micro, PageEvent::PointerLeave(card));
        assert_eq!(h.doc.style(card, "box-shadow"), None);

        assert!(!h.send(&mut micro, PageEvent::PointerEnter(plain)));
    }

    #[test]
    fn click_adds_ripple_and_schedules_removal() {
        let (doc, button, _, _) = page();
        let mut h = Harness::new(doc);
        h.viewport = h.viewport.with_scroll(800.0);
        let mut micro: Microinteractions = h.mount().unwrap();

        let click = PageEvent::Click {
            target: button,
            client_x: 160.0,
            client_y: 120.0,
        };
        assert!(h.send(&mut micro, click));
        let span = h.doc.children(button)[0];
        assert!(h.doc.has_class(span, "ripple"));
        assert_eq!(h.doc.style(span, "width"), Some("120px"));
        // client (160, 120) relative to the button at client (100, 100).
        assert_eq!(h.doc.style(span, "left"), Some("0px"));
        assert_eq!(h.doc.style(span, "top"), Some("-40px"));
        assert_eq!(
            h.deferred,
            vec![(Duration::from_millis(600), WidgetTask::Remove(span))]
        );

        h.deferred[0].1.run(&mut h.doc);
        assert!(h.doc.children(button).is_empty());
    }
}
