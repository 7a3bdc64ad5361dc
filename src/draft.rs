//! Typed registration draft.
//!
//! The draft is composed of one record per form step so each step can be
//! validated on its own and field coverage is checked by the compiler.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Form steps in display order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    #[default]
    Personal,
    Paper,
    Payment,
    Review,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Personal, Step::Paper, Step::Payment, Step::Review];

    /// One-based index, as persisted under the step key.
    pub fn number(self) -> u8 {
        match self {
            Step::Personal => 1,
            Step::Paper => 2,
            Step::Payment => 3,
            Step::Review => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Step> {
        Step::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Personal => "Personal Information",
            Step::Paper => "Paper & Preferences",
            Step::Payment => "Payment Details",
            Step::Review => "Review & Submit",
        }
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Step> {
        self.number().checked_sub(1).and_then(Step::from_number)
    }

    /// Fields edited on this step, in form order.
    pub fn fields(self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| field.step() == self)
            .collect()
    }
}

/// How a field is edited and which validator rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice,
    Flag,
    File,
}

/// Every form field, declared in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Nationality,
    Email,
    Phone,
    Affiliation,
    PlaceOfAffiliation,
    Institution,
    Country,
    PaperTitle,
    TrackNumber,
    PaperId,
    DietaryRequirements,
    Accommodation,
    AmountPaid,
    PaymentAccount,
    TransactionId,
    PaymentProof,
}

impl Field {
    pub const ALL: [Field; 17] = [
        Field::Name,
        Field::Nationality,
        Field::Email,
        Field::Phone,
        Field::Affiliation,
        Field::PlaceOfAffiliation,
        Field::Institution,
        Field::Country,
        Field::PaperTitle,
        Field::TrackNumber,
        Field::PaperId,
        Field::DietaryRequirements,
        Field::Accommodation,
        Field::AmountPaid,
        Field::PaymentAccount,
        Field::TransactionId,
        Field::PaymentProof,
    ];

    /// Stable identifier, shared with the remote record schema where one exists.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Nationality => "nationality",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Affiliation => "affiliation",
            Field::PlaceOfAffiliation => "place_of_affiliation",
            Field::Institution => "institution",
            Field::Country => "country",
            Field::PaperTitle => "paper_title",
            Field::TrackNumber => "track_number",
            Field::PaperId => "paper_id",
            Field::DietaryRequirements => "dietary_requirements",
            Field::Accommodation => "accommodation",
            Field::AmountPaid => "amount_paid",
            Field::PaymentAccount => "payment_account",
            Field::TransactionId => "transaction_id",
            Field::PaymentProof => "payment_proof",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Full name",
            Field::Nationality => "Nationality",
            Field::Email => "Email",
            Field::Phone => "Phone number",
            Field::Affiliation => "Affiliation",
            Field::PlaceOfAffiliation => "Place of affiliation",
            Field::Institution => "Institution",
            Field::Country => "Country",
            Field::PaperTitle => "Paper title",
            Field::TrackNumber => "Research track",
            Field::PaperId => "Paper ID",
            Field::DietaryRequirements => "Dietary requirements",
            Field::Accommodation => "Accommodation assistance",
            Field::AmountPaid => "Amount paid",
            Field::PaymentAccount => "Payer account / UPI ID",
            Field::TransactionId => "Transaction ID",
            Field::PaymentProof => "Proof of payment",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Country | Field::TrackNumber | Field::AmountPaid => FieldKind::Choice,
            Field::Accommodation => FieldKind::Flag,
            Field::PaymentProof => FieldKind::File,
            _ => FieldKind::Text,
        }
    }

    pub fn step(self) -> Step {
        match self {
            Field::Name
            | Field::Nationality
            | Field::Email
            | Field::Phone
            | Field::Affiliation
            | Field::PlaceOfAffiliation
            | Field::Institution
            | Field::Country => Step::Personal,
            Field::PaperTitle
            | Field::TrackNumber
            | Field::PaperId
            | Field::DietaryRequirements
            | Field::Accommodation => Step::Paper,
            Field::AmountPaid
            | Field::PaymentAccount
            | Field::TransactionId
            | Field::PaymentProof => Step::Payment,
        }
    }

    pub fn is_mandatory(self) -> bool {
        !matches!(self, Field::DietaryRequirements | Field::Accommodation)
    }

    pub fn mandatory() -> impl Iterator<Item = Field> {
        Field::ALL.into_iter().filter(|field| field.is_mandatory())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        let normalized = raw.trim().replace('-', "_").to_ascii_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == normalized)
            .ok_or_else(|| anyhow!("unknown field {raw:?}"))
    }
}

/// Value exchanged between the form store, validators and the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    File(Option<ProofOfPayment>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Presence check used by the global validity flag.
    pub fn is_filled(&self) -> bool {
        match self {
            FieldValue::Text(text) => !text.trim().is_empty(),
            FieldValue::Flag(_) => true,
            FieldValue::File(file) => file.is_some(),
        }
    }

    /// Parse raw command-line input for a field of the given kind.
    pub fn parse_for(field: Field, raw: &str) -> Result<Self> {
        match field.kind() {
            FieldKind::Text | FieldKind::Choice => Ok(FieldValue::Text(raw.to_string())),
            FieldKind::Flag => parse_flag(raw).map(FieldValue::Flag),
            FieldKind::File => Err(anyhow!(
                "{} is a file field; use `confreg attach <path>`",
                field.as_str()
            )),
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Ok(true),
        "false" | "no" | "n" | "0" | "off" => Ok(false),
        other => Err(anyhow!("expected yes/no, got {other:?}")),
    }
}

/// Metadata for an uploaded proof-of-payment file.
///
/// Only metadata is persisted; the file itself is re-read from `path` when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOfPayment {
    pub file_name: String,
    pub size_bytes: u64,
    pub content_type: String,
    pub path: PathBuf,
}

impl ProofOfPayment {
    /// Read file metadata without loading the contents.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata =
            std::fs::metadata(path).with_context(|| format!("read {}", path.display()))?;
        if !metadata.is_file() {
            return Err(anyhow!("{} is not a file", path.display()));
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            content_type: content_type_for(path).to_string(),
            file_name,
            size_bytes: metadata.len(),
            path: path.to_path_buf(),
        })
    }

    /// True when the referenced file still exists with the recorded size.
    pub fn still_matches_disk(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|metadata| metadata.is_file() && metadata.len() == self.size_bytes)
            .unwrap_or(false)
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub name: String,
    pub nationality: String,
    pub email: String,
    pub phone: String,
    pub affiliation: String,
    pub place_of_affiliation: String,
    pub institution: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperDetails {
    pub paper_title: String,
    pub track_number: String,
    pub paper_id: String,
    pub dietary_requirements: String,
    pub accommodation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDetails {
    pub amount_paid: String,
    pub payment_account: String,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofOfPayment>,
}

/// The in-progress registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationDraft {
    pub personal: PersonalInfo,
    pub paper: PaperDetails,
    pub payment: PaymentDetails,
}

impl RegistrationDraft {
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Name => FieldValue::text(&self.personal.name),
            Field::Nationality => FieldValue::text(&self.personal.nationality),
            Field::Email => FieldValue::text(&self.personal.email),
            Field::Phone => FieldValue::text(&self.personal.phone),
            Field::Affiliation => FieldValue::text(&self.personal.affiliation),
            Field::PlaceOfAffiliation => FieldValue::text(&self.personal.place_of_affiliation),
            Field::Institution => FieldValue::text(&self.personal.institution),
            Field::Country => FieldValue::text(&self.personal.country),
            Field::PaperTitle => FieldValue::text(&self.paper.paper_title),
            Field::TrackNumber => FieldValue::text(&self.paper.track_number),
            Field::PaperId => FieldValue::text(&self.paper.paper_id),
            Field::DietaryRequirements => FieldValue::text(&self.paper.dietary_requirements),
            Field::Accommodation => FieldValue::Flag(self.paper.accommodation),
            Field::AmountPaid => FieldValue::text(&self.payment.amount_paid),
            Field::PaymentAccount => FieldValue::text(&self.payment.payment_account),
            Field::TransactionId => FieldValue::text(&self.payment.transaction_id),
            Field::PaymentProof => FieldValue::File(self.payment.proof.clone()),
        }
    }

    /// Store a value; fails when the value kind does not match the field.
    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<()> {
        match (field, value) {
            (Field::Accommodation, FieldValue::Flag(flag)) => self.paper.accommodation = flag,
            (Field::PaymentProof, FieldValue::File(file)) => self.payment.proof = file,
            (field, FieldValue::Text(text))
                if matches!(field.kind(), FieldKind::Text | FieldKind::Choice) =>
            {
                *self.text_slot(field) = text;
            }
            (field, value) => {
                return Err(anyhow!(
                    "value {value:?} does not fit field {}",
                    field.as_str()
                ))
            }
        }
        Ok(())
    }

    fn text_slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.personal.name,
            Field::Nationality => &mut self.personal.nationality,
            Field::Email => &mut self.personal.email,
            Field::Phone => &mut self.personal.phone,
            Field::Affiliation => &mut self.personal.affiliation,
            Field::PlaceOfAffiliation => &mut self.personal.place_of_affiliation,
            Field::Institution => &mut self.personal.institution,
            Field::Country => &mut self.personal.country,
            Field::PaperTitle => &mut self.paper.paper_title,
            Field::TrackNumber => &mut self.paper.track_number,
            Field::PaperId => &mut self.paper.paper_id,
            Field::DietaryRequirements => &mut self.paper.dietary_requirements,
            Field::AmountPaid => &mut self.payment.amount_paid,
            Field::PaymentAccount => &mut self.payment.payment_account,
            Field::TransactionId => &mut self.payment.transaction_id,
            Field::Accommodation | Field::PaymentProof => {
                unreachable!("non-text field routed to text slot")
            }
        }
    }
}
