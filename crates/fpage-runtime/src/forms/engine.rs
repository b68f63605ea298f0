#![forbid(unsafe_code)]

//! Per-form validation wiring and the simulated submission.

use ahash::AHashMap;
use fpage_core::{Document, Element, NodeId, PageEffect, PageEvent, SelectorList};

use super::rules::{FieldSnapshot, Validators};
use crate::program::{RuntimeCx, TimerToken};

const FIELDS: &str = r#"input:not([type="hidden"]), textarea, select"#;
const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
const ERROR_NODE: &str = ".c-form__error";

/// Label shown while the submission is pending.
pub const PENDING_LABEL: &str = "Wird gesendet...";

/// Last validation result for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationState {
    pub value: String,
    pub is_valid: bool,
    /// Failing rule's message; empty when valid.
    pub message: String,
}

/// Submission state of one form. `pending` never resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormSubmissionState {
    pub pending: bool,
}

#[derive(Debug, Clone)]
struct FormEntry {
    form: NodeId,
    fields: Vec<NodeId>,
    submission: FormSubmissionState,
}

/// Validation for every `form` on the page.
#[derive(Debug, Clone)]
pub struct FormEngine {
    forms: Vec<FormEntry>,
    validators: Validators,
    fields: SelectorList,
    submit_button: SelectorList,
    error_node: SelectorList,
    states: AHashMap<NodeId, FieldValidationState>,
}

impl FormEngine {
    /// Capture every form and its fields. `None` without forms.
    pub fn mount(doc: &Document) -> Option<Self> {
        let form_nodes = doc.query_all(doc.root(), &crate::selector("form")?);
        if form_nodes.is_empty() {
            return None;
        }
        let validators = match Validators::compile() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(target: "fpage::forms", %err, "validation patterns rejected");
                return None;
            }
        };
        let fields = crate::selector(FIELDS)?;
        let forms = form_nodes
            .into_iter()
            .map(|form| FormEntry {
                form,
                fields: doc.query_all(form, &fields),
                submission: FormSubmissionState::default(),
            })
            .collect::<Vec<_>>();
        tracing::debug!(target: "fpage::forms", forms = forms.len(), "forms mounted");
        Some(Self {
            forms,
            validators,
            fields,
            submit_button: crate::selector(SUBMIT_BUTTON)?,
            error_node: crate::selector(ERROR_NODE)?,
            states: AHashMap::new(),
        })
    }

    /// Forms in document order.
    pub fn forms(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.forms.iter().map(|f| f.form)
    }

    /// Last validation result for a field.
    #[must_use]
    pub fn field_state(&self, field: NodeId) -> Option<&FieldValidationState> {
        self.states.get(&field)
    }

    /// Submission state for a form.
    #[must_use]
    pub fn submission(&self, form: NodeId) -> Option<FormSubmissionState> {
        self.forms.iter().find(|f| f.form == form).map(|f| f.submission)
    }

    fn is_field(&self, node: NodeId) -> bool {
        self.forms.iter().any(|f| f.fields.contains(&node))
    }

    /// Validate one field and mirror the result into the document.
    pub fn validate_field(&mut self, doc: &mut Document, field: NodeId) -> bool {
        let snapshot = FieldSnapshot::read(doc, field);
        let failure = self.validators.check(&snapshot);
        let is_valid = failure.is_none();
        let message = failure.unwrap_or_default();

        let (add, remove) = if is_valid {
            ("is-valid", "is-invalid")
        } else {
            ("is-invalid", "is-valid")
        };
        doc.remove_class(field, remove);
        doc.add_class(field, add);
        if let Some(error) = doc
            .parent(field)
            .and_then(|parent| doc.query(parent, &self.error_node))
        {
            doc.set_text(error, message);
        }

        tracing::debug!(target: "fpage::forms", field = field.index(), is_valid, "field validated");
        self.states.insert(
            field,
            FieldValidationState {
                value: snapshot.value,
                is_valid,
                message: message.to_string(),
            },
        );
        is_valid
    }

    pub fn handle(&mut self, event: &PageEvent, cx: &mut RuntimeCx<'_>) -> bool {
        match *event {
            PageEvent::Blur(field) if self.is_field(field) => {
                self.validate_field(cx.doc, field);
                true
            }
            PageEvent::Input { target, .. } | PageEvent::Toggle { target, .. }
                if self.is_field(target) && cx.doc.has_class(target, "is-invalid") =>
            {
                self.validate_field(cx.doc, target);
                true
            }
            PageEvent::Submit(node) => self.submit(node, cx),
            _ => false,
        }
    }

    /// Run the submission gate for the form containing `node`.
    fn submit(&mut self, node: NodeId, cx: &mut RuntimeCx<'_>) -> bool {
        let Some(idx) = self.forms.iter().position(|f| cx.doc.contains(f.form, node)) else {
            return false;
        };
        if self.forms[idx].submission.pending {
            tracing::debug!(target: "fpage::forms", "submission already pending");
            return true;
        }
        let form = self.forms[idx].form;

        // Every field is validated so each one shows its state.
        let fields = cx.doc.query_all(form, &self.fields);
        let mut all_valid = true;
        for field in fields {
            all_valid &= self.validate_field(cx.doc, field);
        }

        if !all_valid {
            if let Some(sel) = crate::selector(".is-invalid")
                && let Some(first) = cx.doc.query(form, &sel)
            {
                cx.doc.focus(first);
            }
            tracing::debug!(target: "fpage::forms", "submission blocked");
            return true;
        }

        self.forms[idx].submission.pending = true;
        if let Some(button) = cx.doc.query(form, &self.submit_button) {
            cx.doc.set_disabled(button, true);
            cx.doc.clear_children(button);
            cx.doc.set_text(button, PENDING_LABEL);
            cx.doc.prepend(
                button,
                Element::new("span").with_class("spinner-border spinner-border-sm me-2"),
            );
        }
        cx.timers
            .schedule(cx.config.submit_delay(), TimerToken::SubmitRedirect(form));
        tracing::debug!(target: "fpage::forms", "submission pending");
        true
    }

    /// The simulated delay elapsed.
    pub fn on_redirect(&self, form: NodeId, cx: &mut RuntimeCx<'_>) {
        if self.submission(form).is_some_and(|s| s.pending) {
            cx.effects
                .push(PageEffect::Navigate(cx.config.confirmation_url.clone()));
        }
    }
}
