#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] wraps a [`WebPage`] and records every JSON input record
//! and time step the host pushes, plus a checkpoint for every effect the page
//! emits. [`replay`] feeds the same inputs through a freshly bootstrapped page
//! and verifies that the effect stream matches exactly.
//!
//! # Trace format
//!
//! A trace serializes as JSONL, one [`TraceRecord`] per line:
//!
//! - **Header**: schema version and initial viewport.
//! - **Input**: a timestamped input record (see [`crate::input_parser`]).
//! - **Tick**: time advanced to `ts_ms`.
//! - **Effect**: effect checkpoint with FNV-1a checksum and chaining.
//! - **Summary**: total effects and final checksum chain.
//!
//! # Determinism contract
//!
//! Given the same document, config and recorded inputs, replay produces the
//! same effects in the same order. Time only advances through tick records
//! and targets resolve by selector against the replayed document.

use core::time::Duration;

use fpage_core::PageEffect;
use serde::{Deserialize, Serialize};

use crate::input_parser::InputParseError;
use crate::{WebPage, WebPageError};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "fpage-session-v1";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = fnv1a64_bytes(FNV_OFFSET_BASIS, &prev.to_le_bytes());
    fnv1a64_bytes(hash, &next.to_le_bytes())
}

/// FNV-1a checksum of one effect.
#[must_use]
pub fn checksum_effect(effect: &PageEffect) -> u64 {
    let hash = FNV_OFFSET_BASIS;
    match effect {
        PageEffect::Navigate(url) => fnv1a64_bytes(fnv1a64_bytes(hash, &[1]), url.as_bytes()),
        PageEffect::Alert(message) => {
            fnv1a64_bytes(fnv1a64_bytes(hash, &[2]), message.as_bytes())
        }
        PageEffect::ScrollTo { top, smooth } => {
            let hash = fnv1a64_bytes(hash, &[3, u8::from(*smooth)]);
            fnv1a64_bytes(hash, &top.to_bits().to_le_bytes())
        }
    }
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema: String,
        width: f64,
        height: f64,
        scroll_y: f64,
    },
    /// An input record delivered at `ts_ms`.
    Input { ts_ms: u64, input: String },
    /// Time advanced to `ts_ms`.
    Tick { ts_ms: u64 },
    /// Effect checkpoint.
    Effect {
        effect_idx: u64,
        ts_ms: u64,
        checksum: u64,
        checksum_chain: u64,
    },
    /// Trace summary (must be last).
    Summary {
        total_effects: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Number of effect checkpoints in the trace.
    pub fn effect_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Effect { .. }))
            .count() as u64
    }

    /// Extract the final checksum chain from the summary record.
    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Serialize as JSONL.
    pub fn to_jsonl(&self) -> Result<String, ReplayError> {
        let mut out = String::new();
        for record in &self.records {
            let line =
                serde_json::to_string(record).map_err(|e| ReplayError::Format(e.to_string()))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }

    /// Parse JSONL, skipping blank lines.
    pub fn from_jsonl(src: &str) -> Result<Self, ReplayError> {
        let records = src
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| ReplayError::Format(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }
}

/// Records a session for deterministic replay.
#[derive(Debug)]
pub struct SessionRecorder {
    page: WebPage,
    records: Vec<TraceRecord>,
    effects: Vec<PageEffect>,
    checksum_chain: u64,
}

impl SessionRecorder {
    /// Start recording `page` as it is now.
    #[must_use]
    pub fn new(page: WebPage) -> Self {
        let viewport = page.runtime().viewport();
        let records = vec![TraceRecord::Header {
            schema: SCHEMA_VERSION.to_string(),
            width: viewport.width,
            height: viewport.height,
            scroll_y: viewport.scroll_y,
        }];
        let mut rec = Self {
            page,
            records,
            effects: Vec::new(),
            checksum_chain: 0,
        };
        rec.record_effects();
        rec
    }

    /// Record and deliver an input record. Inputs the page rejects are not
    /// recorded.
    pub fn push_input(&mut self, json: &str) -> Result<bool, WebPageError> {
        let mapped = self.page.push_input(json)?;
        if mapped {
            self.records.push(TraceRecord::Input {
                ts_ms: self.ts_ms(),
                input: json.to_string(),
            });
            self.record_effects();
        }
        Ok(mapped)
    }

    /// Record a time advancement.
    pub fn advance_time(&mut self, dt: Duration) {
        self.page.advance(dt);
        self.records.push(TraceRecord::Tick {
            ts_ms: self.ts_ms(),
        });
        self.record_effects();
    }

    /// Effects captured so far, in emission order.
    #[must_use]
    pub fn effects(&self) -> &[PageEffect] {
        &self.effects
    }

    /// Access the underlying page.
    #[must_use]
    pub const fn page(&self) -> &WebPage {
        &self.page
    }

    /// Finish recording and return the completed trace.
    pub fn finish(mut self) -> SessionTrace {
        let total_effects = self.effects.len() as u64;
        self.records.push(TraceRecord::Summary {
            total_effects,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    fn ts_ms(&self) -> u64 {
        self.page.now().as_millis() as u64
    }

    fn record_effects(&mut self) {
        let ts_ms = self.ts_ms();
        for effect in self.page.take_outputs().effects {
            let checksum = checksum_effect(&effect);
            let chain = fnv1a64_pair(self.checksum_chain, checksum);
            self.records.push(TraceRecord::Effect {
                effect_idx: self.effects.len() as u64,
                ts_ms,
                checksum,
                checksum_chain: chain,
            });
            self.checksum_chain = chain;
            self.effects.push(effect);
        }
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Effects produced by the replayed page.
    pub total_effects: u64,
    /// Final checksum chain from replay.
    pub final_checksum_chain: u64,
    /// First effect where replay diverged, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether the replay reproduced the recorded effect stream.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Description of a divergence during replay. `None` marks a missing
/// effect on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub effect_idx: u64,
    pub expected: Option<u64>,
    pub actual: Option<u64>,
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The trace is missing a header record.
    MissingHeader,
    /// The header names a schema this build does not read.
    UnsupportedSchema(String),
    /// A recorded input no longer maps onto the page.
    Input(InputParseError),
    /// The page rejected input.
    Page(WebPageError),
    /// JSONL (de)serialization failed.
    Format(String),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::UnsupportedSchema(s) => write!(f, "unsupported trace schema: {s}"),
            Self::Input(e) => write!(f, "input error: {e}"),
            Self::Page(e) => write!(f, "page error: {e}"),
            Self::Format(msg) => write!(f, "trace format error: {msg}"),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<WebPageError> for ReplayError {
    fn from(e: WebPageError) -> Self {
        match e {
            WebPageError::Input(inner) => Self::Input(inner),
            other => Self::Page(other),
        }
    }
}

/// Replay a recorded trace through a freshly bootstrapped `page`.
///
/// Inputs and ticks are fed in trace order; each effect checkpoint is
/// compared against the next effect the replayed page emitted.
pub fn replay(mut page: WebPage, trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    match trace.records.first() {
        Some(TraceRecord::Header { schema, .. }) if schema == SCHEMA_VERSION => {}
        Some(TraceRecord::Header { schema, .. }) => {
            return Err(ReplayError::UnsupportedSchema(schema.clone()));
        }
        _ => return Err(ReplayError::MissingHeader),
    }

    let mut produced: std::collections::VecDeque<u64> = page
        .take_outputs()
        .effects
        .iter()
        .map(checksum_effect)
        .collect();
    let mut total_effects = produced.len() as u64;
    let mut checked: u64 = 0;
    let mut checksum_chain: u64 = 0;
    let mut first_mismatch: Option<ReplayMismatch> = None;

    let mut note = |idx: u64, expected: Option<u64>, actual: Option<u64>| {
        if first_mismatch.is_none() && expected != actual {
            first_mismatch = Some(ReplayMismatch {
                effect_idx: idx,
                expected,
                actual,
            });
        }
    };

    for record in &trace.records {
        match record {
            TraceRecord::Input { input, .. } => {
                page.push_input(input)?;
            }
            TraceRecord::Tick { ts_ms } => {
                page.set_time(Duration::from_millis(*ts_ms));
            }
            TraceRecord::Effect {
                effect_idx,
                checksum,
                ..
            } => {
                let actual = produced.pop_front();
                if let Some(actual) = actual {
                    checksum_chain = fnv1a64_pair(checksum_chain, actual);
                }
                note(*effect_idx, Some(*checksum), actual);
                checked += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
        let fresh = page.take_outputs().effects;
        total_effects += fresh.len() as u64;
        produced.extend(fresh.iter().map(checksum_effect));
    }

    // Effects the recording never saw.
    for (i, extra) in produced.into_iter().enumerate() {
        note(checked + i as u64, None, Some(extra));
    }

    Ok(ReplayResult {
        total_effects,
        final_checksum_chain: checksum_chain,
        first_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fpage_core::{Document, Element, PageConfig, Viewport};
    use pretty_assertions::assert_eq;

    fn poll_doc() -> Document {
        let mut doc = Document::new();
        let body = doc.body();
        let section = doc.append(body, Element::new("section").with_id("poll-section"));
        let options = doc.append(section, Element::new("div").with_class("poll-options"));
        doc.append(
            options,
            Element::new("input")
                .with_id("option-berlin")
                .with_class("c-checkbox")
                .with_attr("type", "checkbox"),
        );
        doc.append(section, Element::new("button").with_id("vote-button"));
        doc
    }

    fn page() -> WebPage {
        WebPage::new(poll_doc(), Viewport::default(), PageConfig::default())
    }

    fn record_session() -> SessionTrace {
        let mut rec = SessionRecorder::new(page());
        rec.push_input(r##"{"kind":"click","target":"#vote-button"}"##).unwrap();
        rec.advance_time(Duration::from_millis(50));
        rec.push_input(r##"{"kind":"toggle","target":"#option-berlin","checked":true}"##)
            .unwrap();
        rec.push_input(r##"{"kind":"click","target":"#vote-button"}"##).unwrap();
        rec.advance_time(Duration::from_millis(600));
        rec.finish()
    }

    // ---- FNV-1a hash tests ----

    #[test]
    fn fnv1a64_pair_is_deterministic() {
        assert_eq!(fnv1a64_pair(0, 1234), fnv1a64_pair(0, 1234));
        assert_ne!(fnv1a64_pair(0, 1), fnv1a64_pair(0, 2));
        assert_ne!(fnv1a64_pair(1, 0), fnv1a64_pair(2, 0));
    }

    #[test]
    fn effect_checksums_separate_kinds() {
        let nav = checksum_effect(&PageEffect::Navigate("x".into()));
        let alert = checksum_effect(&PageEffect::Alert("x".into()));
        assert_ne!(nav, alert);
        assert_ne!(
            checksum_effect(&PageEffect::ScrollTo {
                top: 1.0,
                smooth: true
            }),
            checksum_effect(&PageEffect::ScrollTo {
                top: 1.0,
                smooth: false
            })
        );
    }

    // ---- Recorder ----

    #[test]
    fn recorder_produces_header_and_summary() {
        let trace = record_session();
        assert!(matches!(
            &trace.records[0],
            TraceRecord::Header { schema, .. } if schema == SCHEMA_VERSION
        ));
        assert!(matches!(
            trace.records.last().unwrap(),
            TraceRecord::Summary {
                total_effects: 1,
                ..
            }
        ));
        assert_eq!(trace.effect_count(), 1);
    }

    #[test]
    fn unknown_inputs_are_not_recorded() {
        let mut rec = SessionRecorder::new(page());
        assert_eq!(rec.push_input(r#"{"kind":"touch"}"#), Ok(false));
        assert!(rec.push_input(r##"{"kind":"click","target":"#nope"}"##).is_err());
        let trace = rec.finish();
        assert_eq!(trace.records.len(), 2);
    }

    // ---- Record and replay ----

    #[test]
    fn record_replay_identical_effects() {
        let trace = record_session();
        let result = replay(page(), &trace).unwrap();
        assert!(result.ok(), "replay mismatch: {:?}", result.first_mismatch);
        assert_eq!(result.total_effects, 1);
        assert_eq!(
            Some(result.final_checksum_chain),
            trace.final_checksum_chain()
        );
    }

    #[test]
    fn replay_detects_divergent_page() {
        let trace = record_session();
        // A page without the poll cannot resolve the recorded targets.
        let bare = WebPage::new(Document::new(), Viewport::default(), PageConfig::default());
        let err = replay(bare, &trace).unwrap_err();
        assert!(matches!(err, ReplayError::Input(InputParseError::TargetNotFound(_))));
    }

    #[test]
    fn replay_reports_missing_effect() {
        let mut trace = record_session();
        let summary = trace.records.pop().unwrap();
        trace.records.push(TraceRecord::Effect {
            effect_idx: 1,
            ts_ms: 650,
            checksum: 7,
            checksum_chain: 0,
        });
        trace.records.push(summary);
        let result = replay(page(), &trace).unwrap();
        assert_eq!(
            result.first_mismatch,
            Some(ReplayMismatch {
                effect_idx: 1,
                expected: Some(7),
                actual: None,
            })
        );
    }

    #[test]
    fn jsonl_round_trip_preserves_trace() {
        let trace = record_session();
        let text = trace.to_jsonl().unwrap();
        assert_eq!(text.lines().count(), trace.records.len());
        assert!(text.lines().next().unwrap().contains(r#""type":"header""#));
        assert_eq!(SessionTrace::from_jsonl(&text).unwrap(), trace);
    }

    // ---- Replay error cases ----

    #[test]
    fn replay_missing_header_returns_error() {
        let result = replay(page(), &SessionTrace::default());
        assert_eq!(result, Err(ReplayError::MissingHeader));

        let trace = SessionTrace {
            records: vec![TraceRecord::Tick { ts_ms: 0 }],
        };
        assert_eq!(replay(page(), &trace), Err(ReplayError::MissingHeader));
    }

    #[test]
    fn replay_rejects_foreign_schema() {
        let trace = SessionTrace {
            records: vec![TraceRecord::Header {
                schema: "golden-trace-v1".into(),
                width: 1.0,
                height: 1.0,
                scroll_y: 0.0,
            }],
        };
        assert!(matches!(
            replay(page(), &trace),
            Err(ReplayError::UnsupportedSchema(_))
        ));
    }

    #[test]
    fn malformed_jsonl_is_a_format_error() {
        assert!(matches!(
            SessionTrace::from_jsonl("{\"type\":\"tick\"}\n"),
            Err(ReplayError::Format(_))
        ));
    }
}
