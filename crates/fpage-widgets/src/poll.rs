#![forbid(unsafe_code)]

//! Illustrative poll.
//!
//! Not a polling backend. A vote adds one to a fixed baseline for each
//! checked option, renders a percentage breakdown and disables voting for
//! the rest of the page load, so the baseline is incremented at most once.

use fpage_core::{Document, Element, NodeId, PageConfig, PageEffect, PageEvent};

use crate::{Widget, WidgetCx, builtin_selector};

/// Baseline counts: `(checkbox id, label, votes)`.
pub const POLL_BASELINE: [(&str, &str, u32); 4] = [
    ("option-bavaria", "Bayern", 35),
    ("option-berlin", "Berlin", 28),
    ("option-coast", "Nordseeküste", 22),
    ("option-rhine", "Rheintal", 15),
];

/// Alert shown when voting with nothing selected.
pub const EMPTY_VOTE_MESSAGE: &str = "Bitte wählen Sie mindestens eine Option aus.";
/// Button label after voting.
pub const THANK_YOU_LABEL: &str = "Danke für Ihre Stimme!";

/// One row of a tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub votes: u32,
}

/// Tally after a vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollResults {
    entries: Vec<PollEntry>,
}

impl PollResults {
    /// Baseline plus one vote per selected known option. Unknown ids are
    /// ignored; duplicates count once.
    #[must_use]
    pub fn tally<'a>(selected: impl IntoIterator<Item = &'a str>) -> Self {
        let selected: Vec<&str> = selected.into_iter().collect();
        let entries = POLL_BASELINE
            .iter()
            .map(|&(id, label, votes)| PollEntry {
                id,
                label,
                votes: votes + u32::from(selected.contains(&id)),
            })
            .collect();
        Self { entries }
    }

    /// Rows in display order.
    #[must_use]
    pub fn entries(&self) -> &[PollEntry] {
        &self.entries
    }

    /// Sum of all votes.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.entries.iter().map(|e| e.votes).sum()
    }

    /// Share of each row in percent, in display order.
    #[must_use]
    pub fn percentages(&self) -> Vec<f64> {
        let total = f64::from(self.total());
        self.entries
            .iter()
            .map(|e| {
                if total > 0.0 {
                    f64::from(e.votes) / total * 100.0
                } else {
                    0.0
                }
            })
            .collect()
    }
}

/// Poll widget state.
#[derive(Debug, Clone)]
pub struct Poll {
    section: NodeId,
    button: NodeId,
    results: Option<PollResults>,
}

impl Poll {
    /// Results, once a vote went through.
    #[must_use]
    pub fn results(&self) -> Option<&PollResults> {
        self.results.as_ref()
    }

    /// The vote button.
    #[must_use]
    pub const fn button(&self) -> NodeId {
        self.button
    }

    fn render(&self, doc: &mut Document, results: &PollResults) {
        let Some(container) = builtin_selector(".poll-options")
            .and_then(|sel| doc.query(self.section, &sel).or_else(|| doc.query(doc.root(), &sel)))
        else {
            tracing::warn!(target: "fpage::widgets", "poll has no .poll-options container");
            return;
        };

        doc.clear_children(container);
        doc.append(container, Element::new("h4").with_class("mb-4").with_text("Ergebnisse:"));
        for (entry, pct) in results.entries().iter().zip(results.percentages()) {
            let pct = format!("{pct:.1}");
            let row = doc.append(container, Element::new("div").with_class("poll-result mb-4"));
            let head = doc.append(
                row,
                Element::new("div").with_class("d-flex justify-content-between mb-2"),
            );
            doc.append(head, Element::new("span").with_text(entry.label));
            doc.append(
                head,
                Element::new("span")
                    .with_class("poll-percentage")
                    .with_text(&format!("{pct}%")),
            );
            let bar = doc.append(row, Element::new("div").with_class("poll-bar"));
            doc.append(
                bar,
                Element::new("div")
                    .with_class("poll-fill")
                    .with_style("width", &format!("{pct}%")),
            );
        }
    }
}

impl Widget for Poll {
    const NAME: &'static str = "poll";

    fn mount(doc: &mut Document, _config: &PageConfig) -> Option<Self> {
        let section = doc.by_id("poll-section")?;
        let button = doc.by_id("vote-button")?;
        Some(Self {
            section,
            button,
            results: None,
        })
    }

    fn handle(&mut self, event: &PageEvent, cx: &mut WidgetCx<'_>) -> bool {
        let PageEvent::Click { target, .. } = *event else {
            return false;
        };
        if self.results.is_some() || !cx.doc.contains(self.button, target) {
            return false;
        }

        let Some(checked_sel) = builtin_selector(".c-checkbox:checked") else {
            return false;
        };
        let checked = cx.doc.query_all(cx.doc.root(), &checked_sel);
        if checked.is_empty() {
            tracing::debug!(target: "fpage::widgets", "vote without selection");
            cx.effects.push(PageEffect::Alert(EMPTY_VOTE_MESSAGE.to_string()));
            return true;
        }

        let results = PollResults::tally(checked.iter().filter_map(|&n| cx.doc.id_of(n)));
        self.render(cx.doc, &results);
        cx.doc.set_disabled(self.button, true);
        cx.doc.set_text(self.button, THANK_YOU_LABEL);
        tracing::debug!(target: "fpage::widgets", total = results.total(), "poll closed");
        self.results = Some(results);
        true
    }
}
