#![forbid(unsafe_code)]

//! Static privacy notice shown in place of in-page privacy anchors.

use fpage_core::{Document, Element, NodeId, PageConfig, PageEvent, SelectorList};

use crate::{Widget, WidgetCx, builtin_selector};

const LINK_SELECTOR: &str = r#"a[href*="privacy"], a[href*="datenschutz"]"#;

/// Modal heading.
pub const MODAL_TITLE: &str = "Datenschutzerklärung";
/// Full privacy page linked from the modal.
pub const PRIVACY_PAGE: &str = "privacy.html";

/// Privacy modal state.
#[derive(Debug, Clone)]
pub struct PrivacyModal {
    links: Vec<NodeId>,
    link_selector: SelectorList,
    open: Option<OpenModal>,
}

#[derive(Debug, Clone, Copy)]
struct OpenModal {
    backdrop: NodeId,
    close: NodeId,
}

impl PrivacyModal {
    /// Whether the modal is currently shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Backdrop node of the open modal.
    #[must_use]
    pub fn backdrop(&self) -> Option<NodeId> {
        self.open.map(|m| m.backdrop)
    }

    /// Close button of the open modal.
    #[must_use]
    pub fn close_button(&self) -> Option<NodeId> {
        self.open.map(|m| m.close)
    }

    /// Links captured at mount.
    #[must_use]
    pub fn links(&self) -> &[NodeId] {
        &self.links
    }

    fn show(&mut self, doc: &mut Document) {
        let body = doc.body();
        let backdrop = doc.append(body, Element::new("div").with_class("privacy-modal"));
        let dialog = doc.append(
            backdrop,
            Element::new("div")
                .with_class("privacy-modal__dialog")
                .with_attr("role", "dialog")
                .with_attr("aria-modal", "true"),
        );
        let close = doc.append(
            dialog,
            Element::new("button")
                .with_class("close-modal")
                .with_attr("type", "button")
                .with_attr("aria-label", "Schließen")
                .with_text("×"),
        );
        doc.append(dialog, Element::new("h2").with_text(MODAL_TITLE));
        doc.append(
            dialog,
            Element::new("p").with_text(
                "Wir verarbeiten Ihre Daten ausschließlich zur Bearbeitung Ihrer Anfrage. \
                 Details finden Sie in unserer vollständigen Datenschutzerklärung.",
            ),
        );
        doc.append(
            dialog,
            Element::new("a")
                .with_attr("href", PRIVACY_PAGE)
                .with_text("Vollständige Datenschutzerklärung"),
        );
        tracing::debug!(target: "fpage::widgets", "privacy modal opened");
        self.open = Some(OpenModal { backdrop, close });
    }

    fn hide(&mut self, doc: &mut Document) {
        if let Some(modal) = self.open.take() {
            doc.detach(modal.backdrop);
            tracing::debug!(target: "fpage::widgets", "privacy modal closed");
        }
    }
}

impl Widget for PrivacyModal {
    const NAME: &'static str = "privacy-modal";

    fn mount(doc: &mut Document, _config: &PageConfig) -> Option<Self> {
        let link_selector = builtin_selector(LINK_SELECTOR)?;
        let links = doc.query_all(doc.root(), &link_selector);
        if links.is_empty() {
            return None;
        }
        Some(Self {
            links,
            link_selector,
            open: None,
        })
    }

    fn handle(&mut self, event: &PageEvent, cx: &mut WidgetCx<'_>) -> bool {
        let PageEvent::Click { target, .. } = *event else {
            return false;
        };

        if let Some(modal) = self.open {
            if target == modal.backdrop || cx.doc.contains(modal.close, target) {
                self.hide(cx.doc);
                return true;
            }
            return false;
        }

        let Some(link) = cx.doc.closest(target, &self.link_selector) else {
            return false;
        };
        let is_fragment = cx.doc.attr(link, "href").is_some_and(|h| h.contains('#'));
        if !self.links.contains(&link) || !is_fragment {
            return false;
        }
        self.show(cx.doc);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;

    fn page() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.body();
        let footer = doc.append(body, Element::new("footer"));
        let anchor = doc.append(footer, Element::new("a").with_attr("href", "#privacy"));
        let inner = doc.append(anchor, Element::new("span").with_text("Datenschutz"));
        let external = doc.append(footer, Element::new("a").with_attr("href", "datenschutz.html"));
        (doc, anchor, inner, external)
    }

    #[test]
    fn anchor_click_opens_modal() {
        let (doc, _, inner, _) = page();
        let mut h = Harness::new(doc);
        let mut modal: PrivacyModal = h.mount().unwrap();
        assert_eq!(modal.links().len(), 2);

        assert!(h.send(&mut modal, PageEvent::click(inner)));
        let backdrop = modal.backdrop().unwrap();
        assert!(h.doc.has_class(backdrop, "privacy-modal"));
        assert!(h.doc.text_content(backdrop).contains(MODAL_TITLE));
        assert!(h.effects.is_empty());
    }

    #[test]
    fn page_link_is_left_alone() {
        let (doc, _, _, external) = page();
        let mut h = Harness::new(doc);
        let mut modal: PrivacyModal = h.mount().unwrap();

        assert!(!h.send(&mut modal, PageEvent::click(external)));
        assert!(!modal.is_open());
        assert!(h.effects.is_empty());
    }

    #[test]
    fn close_button_and_backdrop_close() {
        let (doc, anchor, _, _) = page();
        let mut h = Harness::new(doc);
        let mut modal: PrivacyModal = h.mount().unwrap();

        h.send(&mut modal, PageEvent::click(anchor));
        let close = modal.close_button().unwrap();
        let backdrop = modal.backdrop().unwrap();
        assert!(h.send(&mut modal, PageEvent::click(close)));
        assert!(!modal.is_open());
        assert!(!h.doc.is_connected(backdrop));

        h.send(&mut modal, PageEvent::click(anchor));
        let backdrop = modal.backdrop().unwrap();
        assert!(h.send(&mut modal, PageEvent::click(backdrop)));
        assert!(!modal.is_open());
    }

    #[test]
    fn click_inside_dialog_keeps_it_open() {
        let (doc, anchor, _, _) = page();
        let mut h = Harness::new(doc);
        let mut modal: PrivacyModal = h.mount().unwrap();

        h.send(&mut modal, PageEvent::click(anchor));
        let backdrop = modal.backdrop().unwrap();
        let dialog = h.doc.children(backdrop)[0];
        assert!(!h.send(&mut modal, PageEvent::click(dialog)));
        assert!(modal.is_open());
    }

    #[test]
    fn no_links_means_no_modal() {
        let mut h = Harness::new(Document::new());
        assert!(h.mount::<PrivacyModal>().is_none());
    }
}
