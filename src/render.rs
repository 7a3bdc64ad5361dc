//! Plain-text and JSON views of the registration form.
//!
//! Rendering is pure: every function returns the text it would print so the
//! views can be tested without capturing stdout.
use crate::auth::VerificationStatus;
use crate::catalog::{
    self, BANK_DETAILS, CO_AUTHOR_CERTIFICATE_FEE, EARLY_BIRD_DEADLINE, FEE_TIERS,
};
use crate::controller::{Focus, Notices, RegistrationController};
use crate::draft::{Field, FieldKind, FieldValue, RegistrationDraft, Step};
use crate::records::PAYMENT_STATUS_PENDING;
use serde::Serialize;

pub const STATUS_SCHEMA_VERSION: u32 = 1;

/// Machine-readable snapshot of the form as `confreg status --json` prints it.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub schema_version: u32,
    pub step: u8,
    pub step_title: String,
    pub verification: VerificationStatus,
    pub verification_required: bool,
    pub can_submit: bool,
    pub fields: Vec<FieldReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub next_action: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldReport {
    pub field: Field,
    pub label: String,
    pub value: String,
    pub mandatory: bool,
    pub touched: bool,
    /// Only present once the field has been touched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build a status report for the current step, or for every field when `all`.
pub fn build_status(controller: &RegistrationController<'_>, all: bool) -> StatusReport {
    let form = controller.form();
    let step = controller.step();
    let fields = if all {
        Field::ALL.to_vec()
    } else {
        step.fields()
    };
    let fields = fields
        .into_iter()
        .map(|field| FieldReport {
            field,
            label: field.label().to_string(),
            value: display_value(form.draft(), field),
            mandatory: field.is_mandatory(),
            touched: form.is_touched(field),
            error: form.visible_error(field).map(str::to_string),
        })
        .collect();
    StatusReport {
        schema_version: STATUS_SCHEMA_VERSION,
        step: step.number(),
        step_title: step.title().to_string(),
        verification: controller.verification().status().clone(),
        verification_required: controller.options().require_email_verification,
        can_submit: controller.can_submit(),
        fields,
        banner: controller.notices().banner.clone(),
        next_action: next_action(controller),
    }
}

fn next_action(controller: &RegistrationController<'_>) -> String {
    let step = controller.step();
    let email = controller.draft().personal.email.trim();
    let verified = controller.verification().is_verified(email);
    if step == Step::Personal && controller.options().require_email_verification && !verified {
        if email.is_empty() {
            return "confreg set email <address>".to_string();
        }
        return "confreg request-link, then confreg verify <redirect-url>".to_string();
    }
    if step == Step::Review {
        if controller.can_submit() {
            return "confreg submit".to_string();
        }
        return "confreg status --all (fix the fields marked with errors)".to_string();
    }
    "confreg next".to_string()
}

/// Value as shown to the user: choice labels, yes/no flags, file summaries.
pub fn display_value(draft: &RegistrationDraft, field: Field) -> String {
    match draft.value(field) {
        FieldValue::Text(text) if field.kind() == FieldKind::Choice && !text.is_empty() => {
            catalog::choice_label(field, &text)
        }
        FieldValue::Text(text) => text,
        FieldValue::Flag(true) => "yes".to_string(),
        FieldValue::Flag(false) => "no".to_string(),
        FieldValue::File(Some(proof)) => format!(
            "{} ({}, {})",
            proof.file_name,
            proof.content_type,
            human_size(proof.size_bytes)
        ),
        FieldValue::File(None) => String::new(),
    }
}

fn human_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value >= KIB * KIB {
        format!("{:.1} MB", value / (KIB * KIB))
    } else if value >= KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

pub fn render_status_text(report: &StatusReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Step {} of {}: {}\n",
        report.step,
        Step::ALL.len(),
        report.step_title
    ));
    let verification = match report.verification.email() {
        Some(email) => format!("{} ({email})", report.verification.label()),
        None => report.verification.label().to_string(),
    };
    let suffix = if report.verification_required {
        ""
    } else {
        " [not required]"
    };
    out.push_str(&format!("Email verification: {verification}{suffix}\n"));
    if let Some(banner) = &report.banner {
        out.push_str(&format!("! {banner}\n"));
    }
    out.push('\n');
    for field in &report.fields {
        let marker = if field.mandatory { "*" } else { " " };
        let value = if field.value.is_empty() {
            "-"
        } else {
            field.value.as_str()
        };
        out.push_str(&format!("{marker} {:<26} {value}\n", field.label));
        if let Some(error) = &field.error {
            out.push_str(&format!("    error: {error}\n"));
        }
    }
    out.push('\n');
    let submit = if report.can_submit {
        "enabled"
    } else {
        "disabled"
    };
    out.push_str(&format!("Submit: {submit}\n"));
    out.push_str(&format!("Next: {}\n", report.next_action));
    out
}

/// Alerts, info lines, the banner and the focus target produced by an action.
pub fn render_notices(notices: &Notices) -> String {
    let mut out = String::new();
    if let Some(banner) = &notices.banner {
        out.push_str(&format!("! {banner}\n"));
    }
    if let Some(alert) = &notices.alert {
        out.push_str(&format!("error: {alert}\n"));
    }
    if let Some(info) = &notices.info {
        out.push_str(&format!("{info}\n"));
    }
    if let Some(Focus::Field { field, .. }) = notices.focus {
        out.push_str(&format!("-> {}\n", field.label()));
    }
    out
}

/// Field errors to print after an edit or blur, touched fields only.
pub fn render_field_errors(controller: &RegistrationController<'_>, fields: &[Field]) -> String {
    let mut out = String::new();
    for &field in fields {
        if let Some(error) = controller.form().visible_error(field) {
            out.push_str(&format!("{}: {error}\n", field.as_str()));
        }
    }
    out
}

/// Review summary grouped by step, as shown before final submission.
pub fn render_review(draft: &RegistrationDraft) -> String {
    let mut out = String::new();
    for step in Step::ALL {
        let fields = step.fields();
        if fields.is_empty() {
            continue;
        }
        out.push_str(&format!("{}\n", step.title()));
        for field in fields {
            let value = display_value(draft, field);
            let value = if value.is_empty() { "-" } else { value.as_str() };
            out.push_str(&format!("  {:<26} {value}\n", field.label()));
        }
        out.push('\n');
    }
    out
}

pub fn render_fees() -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<24} {:<22} {:<28} {:>8}\n",
        "ID", "Category", "Participant", "Amount"
    ));
    for tier in FEE_TIERS {
        out.push_str(&format!(
            "{:<24} {:<22} {:<28} {:>8}  {}\n",
            tier.id,
            tier.category,
            tier.origin.label(),
            tier.amount,
            tier.rate.label()
        ));
    }
    out.push_str(&format!(
        "\nEarly bird rates apply until {EARLY_BIRD_DEADLINE}.\n"
    ));
    out.push_str(&format!(
        "Certificates for co-authors who do not register cost {CO_AUTHOR_CERTIFICATE_FEE} each.\n"
    ));
    out
}

/// Payment instructions shown after a successful submission.
pub fn render_payment() -> String {
    let mut out = String::new();
    out.push_str("Registration received. Payment status: ");
    out.push_str(PAYMENT_STATUS_PENDING);
    out.push_str("\n\nTransfer the registration fee to:\n");
    for (label, value) in BANK_DETAILS {
        out.push_str(&format!("  {label:<16} {value}\n"));
    }
    out.push_str("\nYour payment will be verified manually against the transaction ID you provided.\n");
    out
}
