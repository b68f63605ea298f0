#![forbid(unsafe_code)]

//! One-shot fade-in of cards, badges, images and buttons.

use fpage_core::{Document, RootMargin};

use super::observer::{ObserverOptions, VisibilityEntry, VisibilityObserver};

const TARGETS: &str = ".c-card, .trust-badge, img, .c-button";
const MARGIN: &str = "0px 0px -50px 0px";
const THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct Reveal {
    observer: VisibilityObserver,
    revealed: usize,
}

impl Reveal {
    /// Prime every target as hidden and observe it. `None` without targets.
    pub fn mount(doc: &mut Document) -> Option<Self> {
        let targets = doc.query_all(doc.root(), &crate::selector(TARGETS)?);
        if targets.is_empty() {
            return None;
        }
        let options = ObserverOptions::default()
            .with_root_margin(RootMargin::parse(MARGIN).ok()?)
            .with_threshold(THRESHOLD);
        let mut observer = VisibilityObserver::new(options);
        for node in targets {
            doc.set_style(node, "opacity", "0");
            doc.set_style(node, "transform", "translateY(20px)");
            doc.set_style(node, "transition", "opacity 0.6s ease-out, transform 0.6s ease-out");
            observer.observe(node);
        }
        Some(Self {
            observer,
            revealed: 0,
        })
    }

    pub fn observer_mut(&mut self) -> &mut VisibilityObserver {
        &mut self.observer
    }

    /// Elements revealed so far.
    #[must_use]
    pub const fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn apply(&mut self, doc: &mut Document, batch: &[VisibilityEntry]) {
        for entry in batch.iter().filter(|e| e.is_intersecting) {
            doc.set_style(entry.target, "opacity", "1");
            doc.set_style(entry.target, "transform", "translateY(0)");
            self.observer.unobserve(entry.target);
            self.revealed += 1;
        }
    }
}
