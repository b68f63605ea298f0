#![forbid(unsafe_code)]

//! Scroll-spy: highlight the nav link of the section in the reading band.

use fpage_core::{Document, NodeId, RootMargin, SelectorList};

use super::observer::{ObserverOptions, VisibilityEntry, VisibilityObserver};

/// Band from 20% to 30% below the viewport top.
pub const SPY_MARGIN: &str = "-20% 0px -70% 0px";

const SECTIONS: &str = "section[id]";
const LINKS: &str = ".c-nav__item, .nav-link";
const ACTIVE_CLASS: &str = "active";

/// Scroll-spy state.
#[derive(Debug, Clone)]
pub struct ScrollSpy {
    observer: VisibilityObserver,
    links: SelectorList,
    active: Option<NodeId>,
}

impl ScrollSpy {
    /// Observe every `section[id]`. `None` when there are none.
    pub fn mount(doc: &Document) -> Option<Self> {
        let sections = doc.query_all(doc.root(), &crate::selector(SECTIONS)?);
        if sections.is_empty() {
            return None;
        }
        let margin = RootMargin::parse(SPY_MARGIN).ok()?;
        let mut observer =
            VisibilityObserver::new(ObserverOptions::default().with_root_margin(margin));
        for section in sections {
            observer.observe(section);
        }
        Some(Self {
            observer,
            links: crate::selector(LINKS)?,
            active: None,
        })
    }

    /// Link currently marked, if any.
    #[must_use]
    pub const fn active(&self) -> Option<NodeId> {
        self.active
    }

    pub fn observer_mut(&mut self) -> &mut VisibilityObserver {
        &mut self.observer
    }

    /// Apply one batch. Each intersecting entry clears every link, then marks
    /// the link pointing at its section; the last one wins.
    pub fn apply(&mut self, doc: &mut Document, batch: &[VisibilityEntry]) {
        for entry in batch.iter().filter(|e| e.is_intersecting) {
            let Some(id) = doc.id_of(entry.target).map(str::to_string) else {
                continue;
            };
            let links = doc.query_all(doc.root(), &self.links);
            for &link in &links {
                doc.remove_class(link, ACTIVE_CLASS);
                doc.remove_attr(link, "aria-current");
            }
            let href = format!("#{id}");
            self.active = links
                .into_iter()
                .find(|&link| doc.attr(link, "href") == Some(href.as_str()));
            if let Some(link) = self.active {
                doc.add_class(link, ACTIVE_CLASS);
                doc.set_attr(link, "aria-current", "page");
            }
            tracing::debug!(
                target: "fpage::viewport",
                section = %id,
                linked = self.active.is_some(),
                "spy target"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpage_core::{Element, Rect, Viewport};

    fn page(sections: &[(&str, f64)]) -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body();
        let nav = doc.append(body, Element::new("nav").with_class("c-nav"));
        let links = sections
            .iter()
            .map(|(id, _)| {
                doc.append(
                    nav,
                    Element::new("a")
                        .with_class("c-nav__item")
                        .with_attr("href", &format!("#{id}")),
                )
            })
            .collect();
        for &(id, y) in sections {
            doc.append(
                body,
                Element::new("section")
                    .with_id(id)
                    .with_rect(Rect::new(0.0, y, 1280.0, 20.0)),
            );
        }
        (doc, links)
    }

    fn scrolled(y: f64) -> Viewport {
        let mut viewport = Viewport::new(1280.0, 800.0);
        viewport.scroll_y = y;
        viewport
    }

    #[test]
    fn later_section_in_one_batch_wins() {
        // Band at scroll 1000 is 1160..1240; both sections sit inside it.
        let (mut doc, links) = page(&[("a", 1170.0), ("b", 1200.0)]);
        let mut spy = ScrollSpy::mount(&doc).expect("sections");

        let batch = spy.observer_mut().collect(&doc, &scrolled(1000.0));
        assert_eq!(batch.iter().filter(|e| e.is_intersecting).count(), 2);
        spy.apply(&mut doc, &batch);

        assert_eq!(spy.active(), Some(links[1]));
        assert!(doc.has_class(links[1], ACTIVE_CLASS));
        assert_eq!(doc.attr(links[1], "aria-current"), Some("page"));
        assert!(!doc.has_class(links[0], ACTIVE_CLASS));
        assert_eq!(doc.attr(links[0], "aria-current"), None);
    }

    #[test]
    fn section_without_link_clears_the_marker() {
        let (mut doc, links) = page(&[("a", 1170.0)]);
        let body = doc.body();
        doc.append(
            body,
            Element::new("section")
                .with_id("orphan")
                .with_rect(Rect::new(0.0, 2170.0, 1280.0, 20.0)),
        );
        let mut spy = ScrollSpy::mount(&doc).expect("sections");

        let batch = spy.observer_mut().collect(&doc, &scrolled(1000.0));
        spy.apply(&mut doc, &batch);
        assert_eq!(spy.active(), Some(links[0]));

        let batch = spy.observer_mut().collect(&doc, &scrolled(2000.0));
        spy.apply(&mut doc, &batch);
        assert_eq!(spy.active(), None);
        assert!(!doc.has_class(links[0], ACTIVE_CLASS));
    }

    #[test]
    fn no_sections_means_no_spy() {
        assert!(ScrollSpy::mount(&Document::new()).is_none());
    }
}
