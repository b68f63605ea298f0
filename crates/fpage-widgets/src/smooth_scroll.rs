#![forbid(unsafe_code)]

//! In-page anchor scrolling with a sticky-header offset.

use fpage_core::{Document, NodeId, PageConfig, PageEffect, PageEvent, SelectorList};

use crate::{Widget, WidgetCx, builtin_selector};

/// Routes clicks on `a[href^="#"]` to a smooth [`PageEffect::ScrollTo`].
#[derive(Debug, Clone)]
pub struct SmoothScroll {
    anchors: SelectorList,
}

impl SmoothScroll {
    /// Scroll offset for a target at document offset `target_y`.
    #[must_use]
    pub fn offset_for(target_y: f64, viewport_width: f64, config: &PageConfig) -> f64 {
        let header = if viewport_width < config.breakpoint_mobile {
            config.header_height_mobile
        } else {
            config.header_height
        };
        target_y - header
    }

    fn target_of(doc: &Document, href: &str) -> Option<NodeId> {
        match href {
            "#" | "#!" => None,
            _ => doc.by_id(href.strip_prefix('#')?),
        }
    }
}

impl Widget for SmoothScroll {
    const NAME: &'static str = "smooth-scroll";

    fn mount(_doc: &mut Document, _config: &PageConfig) -> Option<Self> {
        Some(Self {
            anchors: builtin_selector(r##"a[href^="#"]"##)?,
        })
    }

    fn handle(&mut self, event: &PageEvent, cx: &mut WidgetCx<'_>) -> bool {
        let PageEvent::Click { target, .. } = *event else {
            return false;
        };
        let Some(anchor) = cx.doc.closest(target, &self.anchors) else {
            return false;
        };
        let Some(dest) = cx.doc.attr(anchor, "href").and_then(|h| Self::target_of(cx.doc, h)) else {
            return false;
        };
        let top = Self::offset_for(cx.doc.rect(dest).y, cx.viewport.width, cx.config);
        tracing::trace!(target: "fpage::widgets", top, "anchor scroll");
        cx.effects.push(PageEffect::ScrollTo { top, smooth: true });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use fpage_core::{Element, Rect, Viewport};

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append(
            body,
            Element::new("section")
                .with_id("kontakt")
                .with_rect(Rect::new(0.0, 1500.0, 1280.0, 400.0)),
        );
        let good = doc.append(body, Element::new("a").with_attr("href", "#kontakt"));
        let bare = doc.append(body, Element::new("a").with_attr("href", "#"));
        let missing = doc.append(body, Element::new("a").with_attr("href", "#nirgends"));
        (doc, good, bare, missing)
    }

    #[test]
    fn desktop_offset_uses_full_header() {
        let (doc, good, _, _) = page();
        let mut h = Harness::new(doc);
        let mut scroll: SmoothScroll = h.mount().unwrap();

        assert!(h.send(&mut scroll, PageEvent::click(good)));
        assert_eq!(
            h.effects,
            vec![PageEffect::ScrollTo {
                top: 1428.0,
                smooth: true
            }]
        );
    }

    #[test]
    fn mobile_offset_uses_compact_header() {
        let (doc, good, _, _) = page();
        let mut h = Harness::new(doc);
        h.viewport = Viewport::new(375.0, 700.0);
        let mut scroll: SmoothScroll = h.mount().unwrap();

        h.send(&mut scroll, PageEvent::click(good));
        assert_eq!(
            h.effects,
            vec![PageEffect::ScrollTo {
                top: 1436.0,
                smooth: true
            }]
        );
    }

    #[test]
    fn placeholder_and_dangling_anchors_are_ignored() {
        let (doc, _, bare, missing) = page();
        let mut h = Harness::new(doc);
        let mut scroll: SmoothScroll = h.mount().unwrap();

        assert!(!h.send(&mut scroll, PageEvent::click(bare)));
        assert!(!h.send(&mut scroll, PageEvent::click(missing)));
        assert!(h.effects.is_empty());
    }
}
