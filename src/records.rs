//! Remote registration records.
//!
//! A record is written once per successful submission and never updated from
//! here; payment review happens out of band.
use crate::draft::RegistrationDraft;
use crate::remote::SupabaseClient;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const PAYMENT_STATUS_PENDING: &str = "pending";

/// Row inserted into the registrations table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedRegistrationRecord {
    pub name: String,
    pub nationality: String,
    pub email: String,
    pub phone: String,
    pub affiliation: String,
    pub place_of_affiliation: String,
    pub institution: String,
    pub country: String,
    pub paper_title: String,
    pub track_number: String,
    pub paper_id: String,
    pub amount_paid: String,
    pub payment_account: String,
    pub transaction_id: String,
    pub dietary_requirements: String,
    pub accommodation: bool,
    pub payment_status: String,
}

impl PersistedRegistrationRecord {
    /// Map a validated draft to the remote schema; payment always starts pending.
    pub fn from_draft(draft: &RegistrationDraft) -> Self {
        let personal = &draft.personal;
        let paper = &draft.paper;
        let payment = &draft.payment;
        let clean = |text: &str| text.trim().to_string();
        Self {
            name: clean(&personal.name),
            nationality: clean(&personal.nationality),
            email: clean(&personal.email),
            phone: clean(&personal.phone),
            affiliation: clean(&personal.affiliation),
            place_of_affiliation: clean(&personal.place_of_affiliation),
            institution: clean(&personal.institution),
            country: clean(&personal.country),
            paper_title: clean(&paper.paper_title),
            track_number: clean(&paper.track_number),
            paper_id: clean(&paper.paper_id),
            amount_paid: clean(&payment.amount_paid),
            payment_account: clean(&payment.payment_account),
            transaction_id: clean(&payment.transaction_id),
            dietary_requirements: clean(&paper.dietary_requirements),
            accommodation: paper.accommodation,
            payment_status: PAYMENT_STATUS_PENDING.to_string(),
        }
    }
}

/// Write-once store for registration records.
pub trait RecordStore {
    fn insert_registration(&self, record: &PersistedRegistrationRecord) -> Result<()>;
}

pub struct SupabaseRecords {
    client: SupabaseClient,
    table: String,
}

impl SupabaseRecords {
    pub fn new(client: SupabaseClient, table: &str) -> Self {
        Self {
            client,
            table: table.to_string(),
        }
    }
}

impl RecordStore for SupabaseRecords {
    fn insert_registration(&self, record: &PersistedRegistrationRecord) -> Result<()> {
        let path = format!("rest/v1/{}", self.table);
        self.client
            .post_json(
                &path,
                &[],
                std::slice::from_ref(record),
                None,
                Some("return=minimal"),
            )
            .with_context(|| format!("insert into {}", self.table))
    }
}
