#![forbid(unsafe_code)]

//! Form validation engine.
//!
//! Fields validate on blur, and on input only while already marked
//! invalid. A submit validates every non-hidden field; if all pass the form
//! turns pending, its submit button is disabled and a delayed navigation to
//! the confirmation page is scheduled. Nothing is sent over the network.

pub mod engine;
pub mod rules;

pub use engine::{FieldValidationState, FormEngine, FormSubmissionState, PENDING_LABEL};
pub use rules::{FieldRole, FieldSnapshot, Validators};
