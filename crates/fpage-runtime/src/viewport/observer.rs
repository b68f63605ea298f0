#![forbid(unsafe_code)]

//! Threshold-crossing visibility notifications.
//!
//! A [`VisibilityObserver`] watches an ordered set of nodes against the
//! viewport (grown or shrunk by a root margin). Each [`collect`] reports the
//! nodes whose intersecting state is new or changed since the last report,
//! as one batch in observation order.
//!
//! A target intersects when it overlaps the margin-adjusted root and
//! `overlap / target_area >= threshold`. With a zero threshold, edge contact
//! is enough. Detached nodes never intersect.
//!
//! [`collect`]: VisibilityObserver::collect

use fpage_core::geometry::intersection_ratio;
use fpage_core::{Document, NodeId, RootMargin, Viewport};

/// Observer configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverOptions {
    pub root_margin: RootMargin,
    pub threshold: f64,
}

impl Default for ObserverOptions {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::ZERO,
            threshold: 0.0,
        }
    }
}

impl ObserverOptions {
    #[must_use]
    pub fn with_root_margin(mut self, margin: RootMargin) -> Self {
        self.root_margin = margin;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }
}

/// One visibility change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
    /// Visible fraction of the target; `0.0` when not touching.
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    node: NodeId,
    /// Last reported state; `None` until the first report.
    last: Option<bool>,
}

/// Watches nodes and reports threshold crossings.
#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    options: ObserverOptions,
    observed: Vec<Observation>,
}

impl VisibilityObserver {
    #[must_use]
    pub fn new(options: ObserverOptions) -> Self {
        Self {
            options,
            observed: Vec::new(),
        }
    }

    #[must_use]
    pub const fn options(&self) -> &ObserverOptions {
        &self.options
    }

    /// Start observing. Returns `false` if the node is already observed.
    pub fn observe(&mut self, node: NodeId) -> bool {
        if self.is_observed(node) {
            return false;
        }
        self.observed.push(Observation { node, last: None });
        true
    }

    /// Stop observing. Returns whether the node was observed.
    pub fn unobserve(&mut self, node: NodeId) -> bool {
        let before = self.observed.len();
        self.observed.retain(|o| o.node != node);
        self.observed.len() != before
    }

    #[must_use]
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.observed.iter().any(|o| o.node == node)
    }

    /// Observed nodes in observation order.
    pub fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.observed.iter().map(|o| o.node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Measure one node without recording anything.
    #[must_use]
    pub fn measure(&self, doc: &Document, viewport: &Viewport, node: NodeId) -> VisibilityEntry {
        let root = self.options.root_margin.apply(viewport.visible_rect());
        let ratio = doc
            .is_connected(node)
            .then(|| intersection_ratio(&doc.rect(node), &root))
            .flatten();
        let is_intersecting = match ratio {
            None => false,
            Some(_) if self.options.threshold <= 0.0 => true,
            Some(r) => r >= self.options.threshold,
        };
        VisibilityEntry {
            target: node,
            is_intersecting,
            ratio: ratio.unwrap_or(0.0),
        }
    }

    /// Report every node whose state is new or changed.
    pub fn collect(&mut self, doc: &Document, viewport: &Viewport) -> Vec<VisibilityEntry> {
        let mut batch = Vec::new();
        for i in 0..self.observed.len() {
            let entry = self.measure(doc, viewport, self.observed[i].node);
            let obs = &mut self.observed[i];
            if obs.last != Some(entry.is_intersecting) {
                obs.last = Some(entry.is_intersecting);
                batch.push(entry);
            }
        }
        batch
    }
}
