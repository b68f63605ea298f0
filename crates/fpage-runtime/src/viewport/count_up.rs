#![forbid(unsafe_code)]

//! Count-up ramps for `[data-count]` statistics.
//!
//! On first intersection (threshold 0.5) the element stops being observed
//! and a linear ramp starts: `step = target / (duration / frame)`, and each
//! frame adds `step`, shows the floored value and requests another frame
//! until the running value reaches the target, which is then shown exactly.
//! The first frame runs immediately. Ramps are never cancelled.

use ahash::AHashMap;
use fpage_core::{Document, NodeId, PageConfig};

use super::observer::{ObserverOptions, VisibilityEntry, VisibilityObserver};
use crate::program::{RuntimeCx, TimerToken};

const TARGETS: &str = "[data-count]";
const THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Ramp {
    target: i64,
    step: f64,
    current: f64,
}

/// Count-up animations.
#[derive(Debug, Clone)]
pub struct CountUp {
    observer: VisibilityObserver,
    ramps: AHashMap<NodeId, Ramp>,
    finished: Vec<NodeId>,
}

/// Lenient integer parse: optional whitespace and sign, then the leading
/// run of ASCII digits. Trailing garbage is ignored.
#[must_use]
pub fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Digit runs past i64 saturate instead of rejecting the element.
    let value = digits.as_bytes()[..end].iter().fold(0i64, |acc, &b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -value } else { value })
}

impl CountUp {
    /// Observe every `[data-count]` element. `None` without any.
    pub fn mount(doc: &Document) -> Option<Self> {
        let targets = doc.query_all(doc.root(), &crate::selector(TARGETS)?);
        if targets.is_empty() {
            return None;
        }
        let mut observer =
            VisibilityObserver::new(ObserverOptions::default().with_threshold(THRESHOLD));
        for node in targets {
            observer.observe(node);
        }
        Some(Self {
            observer,
            ramps: AHashMap::new(),
            finished: Vec::new(),
        })
    }

    pub fn observer_mut(&mut self) -> &mut VisibilityObserver {
        &mut self.observer
    }

    /// Whether a ramp is in progress for `node`.
    #[must_use]
    pub fn is_running(&self, node: NodeId) -> bool {
        self.ramps.contains_key(&node)
    }

    /// Elements whose ramp completed, in completion order.
    #[must_use]
    pub fn finished(&self) -> &[NodeId] {
        &self.finished
    }

    /// Start ramps for newly intersecting elements.
    pub fn apply(&mut self, batch: &[VisibilityEntry], cx: &mut RuntimeCx<'_>) {
        for entry in batch.iter().filter(|e| e.is_intersecting) {
            let node = entry.target;
            self.observer.unobserve(node);
            let Some(target) = cx.doc.attr(node, "data-count").and_then(parse_count) else {
                tracing::warn!(
                    target: "fpage::viewport",
                    raw = cx.doc.attr(node, "data-count").unwrap_or_default(),
                    "data-count is not a number; skipped"
                );
                continue;
            };
            self.ramps.insert(
                node,
                Ramp {
                    target,
                    step: Self::step_for(target, cx.config),
                    current: 0.0,
                },
            );
            tracing::debug!(target: "fpage::viewport", target_value = target, "count-up started");
            self.frame(node, cx);
        }
    }

    fn step_for(target: i64, config: &PageConfig) -> f64 {
        let frames = config.count_up_duration_ms as f64 / config.frame_interval_ms.max(1) as f64;
        if frames > 0.0 {
            target as f64 / frames
        } else {
            target as f64
        }
    }

    /// Run one frame for `node`.
    pub fn frame(&mut self, node: NodeId, cx: &mut RuntimeCx<'_>) {
        let Some(ramp) = self.ramps.get_mut(&node) else {
            return;
        };
        ramp.current += ramp.step;
        if ramp.current < ramp.target as f64 {
            let shown = ramp.current.floor() as i64;
            cx.doc.set_text(node, &shown.to_string());
            cx.timers
                .schedule(cx.config.frame_interval(), TimerToken::CountUpFrame(node));
        } else {
            cx.doc.set_text(node, &ramp.target.to_string());
            self.ramps.remove(&node);
            self.finished.push(node);
            tracing::trace!(target: "fpage::viewport", "count-up finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parse_accepts_leading_integer() {
        assert_eq!(parse_count("1500"), Some(1500));
        assert_eq!(parse_count("  42+"), Some(42));
        assert_eq!(parse_count("98%"), Some(98));
        assert_eq!(parse_count("-7"), Some(-7));
        assert_eq!(parse_count("3.9"), Some(3));
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("-"), None);
    }

    #[test]
    fn oversized_counts_saturate() {
        assert_eq!(parse_count("99999999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_count("-99999999999999999999999 users"), Some(-i64::MAX));
        assert_eq!(parse_count("9223372036854775807"), Some(i64::MAX));
    }

    #[test]
    fn default_step_is_target_over_125_frames() {
        let step = CountUp::step_for(250, &PageConfig::default());
        assert!((step - 2.0).abs() < 1e-12);
    }
}
