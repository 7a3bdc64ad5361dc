//! Draft persistence adapter.
//!
//! Write-through: the controller calls [`DraftPersistence::save`] after every
//! state change. The proof-of-payment file is stored as metadata only and is
//! dropped on load when the file on disk no longer matches.
use crate::draft::{RegistrationDraft, Step};
use crate::storage::KeyValueStore;
use anyhow::{Context, Result};

pub const DRAFT_KEY: &str = "registrationDraft";
pub const STEP_KEY: &str = "registrationStep";
pub const VERIFIED_EMAIL_KEY: &str = "verifiedEmail";

pub struct DraftPersistence<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> DraftPersistence<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn save(&self, draft: &RegistrationDraft, step: Step) -> Result<()> {
        let text = serde_json::to_string(draft).context("serialize registration draft")?;
        self.store.set(DRAFT_KEY, &text)?;
        self.store.set(STEP_KEY, &step.number().to_string())?;
        Ok(())
    }

    /// Restore the saved draft and step, or defaults when nothing usable is stored.
    pub fn load(&self) -> Result<(RegistrationDraft, Step)> {
        let draft = match self.store.get(DRAFT_KEY)? {
            Some(text) => parse_draft(&text),
            None => RegistrationDraft::default(),
        };
        let step = match self.store.get(STEP_KEY)? {
            Some(text) => parse_step(&text),
            None => Step::default(),
        };
        Ok((draft, step))
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(DRAFT_KEY)?;
        self.store.remove(STEP_KEY)?;
        Ok(())
    }

    pub fn verified_email(&self) -> Result<Option<String>> {
        self.store.get(VERIFIED_EMAIL_KEY)
    }

    pub fn save_verified_email(&self, email: &str) -> Result<()> {
        self.store.set(VERIFIED_EMAIL_KEY, email)
    }

    pub fn clear_verified_email(&self) -> Result<()> {
        self.store.remove(VERIFIED_EMAIL_KEY)
    }
}

fn parse_draft(text: &str) -> RegistrationDraft {
    let mut draft: RegistrationDraft = match serde_json::from_str(text) {
        Ok(draft) => draft,
        Err(err) => {
            tracing::warn!(error = %err, "stored draft is unreadable; starting a new one");
            return RegistrationDraft::default();
        }
    };
    if let Some(proof) = &draft.payment.proof {
        if !proof.still_matches_disk() {
            tracing::warn!(
                file = %proof.path.display(),
                "proof of payment changed or disappeared since it was attached; re-attach it"
            );
            draft.payment.proof = None;
        }
    }
    draft
}

fn parse_step(text: &str) -> Step {
    let step = text.trim().parse::<u8>().ok().and_then(Step::from_number);
    match step {
        Some(step) => step,
        None => {
            tracing::warn!(value = text, "stored step is invalid; starting at step 1");
            Step::default()
        }
    }
}
