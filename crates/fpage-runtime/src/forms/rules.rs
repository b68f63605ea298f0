#![forbid(unsafe_code)]

//! Field roles and validation rules.
//!
//! Rule precedence for one field:
//!
//! 1. required and blank (after trimming) → required message;
//! 2. otherwise, if non-blank, the role's pattern;
//! 3. a required checkbox that is unchecked → acceptance message, whatever
//!    happened above.
//!
//! Fields without a recognised role pass once the required checks pass.
//!
//! The message rule counts every character, line breaks included, so a
//! multi-line message of ten or more characters passes. A `.` without the
//! `s` flag would instead reject any message containing a newline.

use fpage_core::{Document, NodeId};
use regex::Regex;

pub const MSG_REQUIRED: &str = "Dieses Feld ist erforderlich.";
pub const MSG_EMAIL: &str = "Bitte geben Sie eine gültige E-Mail-Adresse ein.";
pub const MSG_PHONE: &str = "Bitte geben Sie eine gültige Telefonnummer ein (10-20 Zeichen).";
pub const MSG_NAME: &str = "Bitte geben Sie einen gültigen Namen ein (2-50 Zeichen).";
pub const MSG_MESSAGE: &str = "Die Nachricht muss mindestens 10 Zeichen lang sein.";
pub const MSG_CHECKBOX: &str = "Bitte akzeptieren Sie die Bedingungen.";

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^[0-9\s+\-()]{10,20}$";
const NAME_PATTERN: &str = r"^[a-zA-ZÀ-ÿ\s'\-]{2,50}$";
const MESSAGE_PATTERN: &str = r"(?s)^.{10,}$";

/// What a field holds, decided by type, id and name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Email,
    Phone,
    Name,
    Message,
    Other,
}

impl FieldRole {
    /// Classify by control type, id and name. Earlier roles win.
    #[must_use]
    pub fn classify(control_type: &str, id: Option<&str>, name: Option<&str>) -> Self {
        let is = |want: &str| id == Some(want) || name == Some(want);
        if control_type == "email" || is("email") || id == Some("newsletter-email") {
            Self::Email
        } else if control_type == "tel" || is("phone") {
            Self::Phone
        } else if is("firstname") || is("lastname") {
            Self::Name
        } else if is("message") {
            Self::Message
        } else {
            Self::Other
        }
    }
}

/// The parts of a control the rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSnapshot {
    pub value: String,
    pub control_type: String,
    pub required: bool,
    pub checked: bool,
    pub role: FieldRole,
}

impl FieldSnapshot {
    /// Read a control from the document. Checkboxes and radios without an
    /// explicit value report `"on"`.
    #[must_use]
    pub fn read(doc: &Document, node: NodeId) -> Self {
        let el = doc.element(node);
        let control_type = el.control_type();
        let mut value = el.value().to_string();
        if value.is_empty() && matches!(control_type.as_str(), "checkbox" | "radio") {
            value.push_str("on");
        }
        let role = FieldRole::classify(&control_type, el.attr("id"), el.attr("name"));
        Self {
            value,
            required: el.has_attr("required"),
            checked: el.checked(),
            control_type,
            role,
        }
    }
}

/// Compiled role patterns.
#[derive(Debug, Clone)]
pub struct Validators {
    email: Regex,
    phone: Regex,
    name: Regex,
    message: Regex,
}

impl Validators {
    pub fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(EMAIL_PATTERN)?,
            phone: Regex::new(PHONE_PATTERN)?,
            name: Regex::new(NAME_PATTERN)?,
            message: Regex::new(MESSAGE_PATTERN)?,
        })
    }

    /// Failing rule's message, or `None` when the field passes.
    #[must_use]
    pub fn check(&self, field: &FieldSnapshot) -> Option<&'static str> {
        let value = field.value.trim();
        let mut failure = if field.required && value.is_empty() {
            Some(MSG_REQUIRED)
        } else if value.is_empty() {
            None
        } else {
            match field.role {
                FieldRole::Email => (!self.email.is_match(value)).then_some(MSG_EMAIL),
                FieldRole::Phone => (!self.phone.is_match(value)).then_some(MSG_PHONE),
                FieldRole::Name => (!self.name.is_match(value)).then_some(MSG_NAME),
                FieldRole::Message => (!self.message.is_match(value)).then_some(MSG_MESSAGE),
                FieldRole::Other => None,
            }
        };
        if field.control_type == "checkbox" && field.required && !field.checked {
            failure = Some(MSG_CHECKBOX);
        }
        failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(role: FieldRole, value: &str) -> FieldSnapshot {
        FieldSnapshot {
            value: value.to_string(),
            control_type: "text".to_string(),
            required: false,
            checked: false,
            role,
        }
    }

    fn validators() -> Validators {
        Validators::compile().unwrap()
    }

    #[test]
    fn roles_follow_type_then_id_then_name() {
        assert_eq!(FieldRole::classify("email", None, None), FieldRole::Email);
        assert_eq!(FieldRole::classify("text", Some("newsletter-email"), None), FieldRole::Email);
        assert_eq!(FieldRole::classify("text", None, Some("email")), FieldRole::Email);
        assert_eq!(FieldRole::classify("tel", Some("email"), None), FieldRole::Email);
        assert_eq!(FieldRole::classify("tel", None, None), FieldRole::Phone);
        assert_eq!(FieldRole::classify("text", Some("lastname"), None), FieldRole::Name);
        assert_eq!(FieldRole::classify("textarea", None, Some("message")), FieldRole::Message);
        assert_eq!(FieldRole::classify("text", Some("company"), None), FieldRole::Other);
    }

    #[test]
    fn email_rule() {
        let v = validators();
        assert_eq!(v.check(&field(FieldRole::Email, "not-an-email")), Some(MSG_EMAIL));
        assert_eq!(v.check(&field(FieldRole::Email, "valid@example.com")), None);
        assert_eq!(v.check(&field(FieldRole::Email, "a b@c.de")), Some(MSG_EMAIL));
    }

    #[test]
    fn phone_rule_counts_10_to_20_chars() {
        let v = validators();
        assert_eq!(v.check(&field(FieldRole::Phone, "+49 (89) 123-456")), None);
        assert_eq!(v.check(&field(FieldRole::Phone, "12345")), Some(MSG_PHONE));
        assert_eq!(v.check(&field(FieldRole::Phone, "0123456789x")), Some(MSG_PHONE));
        assert_eq!(v.check(&field(FieldRole::Phone, &"1".repeat(21))), Some(MSG_PHONE));
    }

    #[test]
    fn name_rule_accepts_diacritics() {
        let v = validators();
        assert_eq!(v.check(&field(FieldRole::Name, "Jürgen O'Neil-Müller")), None);
        assert_eq!(v.check(&field(FieldRole::Name, "J")), Some(MSG_NAME));
        assert_eq!(v.check(&field(FieldRole::Name, "R2D2")), Some(MSG_NAME));
    }

    #[test]
    fn message_rule_counts_newlines() {
        let v = validators();
        assert_eq!(v.check(&field(FieldRole::Message, "zu kurz")), Some(MSG_MESSAGE));
        assert_eq!(v.check(&field(FieldRole::Message, "Hallo,\nich hätte gern")), None);
    }

    #[test]
    fn required_blank_wins_for_every_role() {
        let v = validators();
        for role in [
            FieldRole::Email,
            FieldRole::Phone,
            FieldRole::Name,
            FieldRole::Message,
            FieldRole::Other,
        ] {
            let mut f = field(role, "   ");
            f.required = true;
            assert_eq!(v.check(&f), Some(MSG_REQUIRED), "{role:?}");
        }
    }

    #[test]
    fn optional_blank_passes() {
        assert_eq!(validators().check(&field(FieldRole::Email, "")), None);
    }

    #[test]
    fn required_checkbox_must_be_checked() {
        let v = validators();
        let mut f = FieldSnapshot {
            value: "on".to_string(),
            control_type: "checkbox".to_string(),
            required: true,
            checked: false,
            role: FieldRole::Other,
        };
        assert_eq!(v.check(&f), Some(MSG_CHECKBOX));
        f.checked = true;
        assert_eq!(v.check(&f), None);
    }
}
