//! Field validators.
//!
//! Each validator is a pure function of `(field, value)` that returns a
//! human-readable message when the value is unacceptable. Nothing here records
//! state; the form store decides when to run them and when to show the result.
use crate::catalog;
use crate::draft::{Field, FieldKind, FieldValue, ProofOfPayment};
use regex::Regex;
use std::sync::OnceLock;

/// Upper bound for proof-of-payment uploads (5 MiB).
pub const MAX_PROOF_BYTES: u64 = 5 * 1024 * 1024;

pub const INVALID_EMAIL_MESSAGE: &str =
    "Please enter a valid email address (e.g. name@example.com)";
pub const INVALID_PHONE_MESSAGE: &str =
    "Please enter a valid phone number with country code (e.g. +91 98765 43210)";
pub const PROOF_TOO_LARGE_MESSAGE: &str = "Proof of payment must be 5 MB or smaller";
pub const PROOF_CONTENT_TYPE_MESSAGE: &str = "Proof of payment must be an image or a PDF";

/// Free-mail providers whose two-label domains get a TLD typo check.
const FREE_MAIL_PROVIDERS: [(&str, &str); 3] =
    [("gmail", "com"), ("googlemail", "com"), ("icloud", "com")];

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("email pattern compiles")
    })
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(r"^\+[0-9]{10,15}$").expect("phone pattern compiles"))
}

/// Validate one field value; `None` means the value is acceptable.
pub fn validate(field: Field, value: &FieldValue) -> Option<String> {
    match (field.kind(), value) {
        (FieldKind::Flag, _) => None,
        (FieldKind::File, FieldValue::File(proof)) => validate_proof(proof.as_ref()),
        (FieldKind::Choice, FieldValue::Text(text)) => validate_choice(field, text),
        (FieldKind::Text, FieldValue::Text(text)) => match field {
            Field::Email => validate_email(text),
            Field::Phone => validate_phone(text),
            field if field.is_mandatory() => validate_required(field, text),
            _ => None,
        },
        (_, value) => Some(format!(
            "{} received an unsupported value ({value:?})",
            field.label()
        )),
    }
}

/// Presence rule: missing or whitespace-only input is rejected.
pub fn validate_required(field: Field, text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return Some(required_message(field));
    }
    None
}

pub fn required_message(field: Field) -> String {
    format!("{} is required", field.label())
}

pub fn validate_email(raw: &str) -> Option<String> {
    let email = raw.trim();
    if email.is_empty() {
        return Some(required_message(Field::Email));
    }
    if !email_regex().is_match(email) {
        return Some(INVALID_EMAIL_MESSAGE.to_string());
    }
    free_mail_typo(email)
}

/// Flag `name@gmail.co`-style typos; regional domains with more labels pass.
fn free_mail_typo(email: &str) -> Option<String> {
    let (_, domain) = email.rsplit_once('@')?;
    let domain = domain.to_ascii_lowercase();
    let (provider, tld) = domain.split_once('.')?;
    if tld.contains('.') {
        return None;
    }
    let (provider, canonical_tld) = FREE_MAIL_PROVIDERS
        .iter()
        .find(|(name, _)| *name == provider)?;
    if tld != *canonical_tld && tld.len() < 3 {
        return Some(format!(
            "Please check the email domain; did you mean {provider}.{canonical_tld}?"
        ));
    }
    None
}

pub fn validate_phone(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return Some(required_message(Field::Phone));
    }
    let compact: String = raw
        .chars()
        .filter(|ch| !ch.is_whitespace() && *ch != '-')
        .collect();
    if !phone_regex().is_match(&compact) {
        return Some(INVALID_PHONE_MESSAGE.to_string());
    }
    None
}

pub fn validate_choice(field: Field, id: &str) -> Option<String> {
    let id = id.trim();
    if id.is_empty() {
        return Some(format!("Please select a {}", field.label().to_ascii_lowercase()));
    }
    if !catalog::is_valid_choice(field, id) {
        return Some(format!("{id:?} is not a valid {}", field.label().to_ascii_lowercase()));
    }
    None
}

pub fn validate_proof(proof: Option<&ProofOfPayment>) -> Option<String> {
    let Some(proof) = proof else {
        return Some(required_message(Field::PaymentProof));
    };
    if proof.size_bytes > MAX_PROOF_BYTES {
        return Some(PROOF_TOO_LARGE_MESSAGE.to_string());
    }
    if !is_accepted_content_type(&proof.content_type) {
        return Some(PROOF_CONTENT_TYPE_MESSAGE.to_string());
    }
    None
}

pub fn is_accepted_content_type(content_type: &str) -> bool {
    content_type.starts_with("image/") || content_type == "application/pdf"
}

/// Format check used by the global validity flag.
pub fn email_passes(raw: &str) -> bool {
    validate_email(raw).is_none()
}

pub fn phone_passes(raw: &str) -> bool {
    validate_phone(raw).is_none()
}
