//! Form state store: field values, touched set, error map and the in-flight flag.
use crate::draft::{Field, FieldValue, RegistrationDraft};
use crate::validate::{self, email_passes, phone_passes};
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Mutable form state for one registration draft.
///
/// Errors are recorded for every validated field but only surface through
/// [`FormState::visible_error`] once the field has been touched.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    draft: RegistrationDraft,
    touched: BTreeSet<Field>,
    errors: BTreeMap<Field, String>,
    submitting: bool,
}

impl FormState {
    pub fn new(draft: RegistrationDraft) -> Self {
        Self {
            draft,
            ..Self::default()
        }
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    /// Apply an edit. The field is validated and marked touched, except the
    /// email field which waits for blur so typing does not flash an error.
    pub fn set_value(&mut self, field: Field, value: FieldValue) -> Result<()> {
        if self.submitting {
            return Err(anyhow!(
                "cannot edit {} while a submission is in flight",
                field.as_str()
            ));
        }
        self.draft.set(field, value)?;
        if field == Field::Email {
            self.errors.remove(&Field::Email);
            return Ok(());
        }
        self.touched.insert(field);
        self.revalidate(field);
        Ok(())
    }

    /// Blur: mark touched and validate the current value.
    pub fn mark_touched(&mut self, field: Field) {
        self.touched.insert(field);
        self.revalidate(field);
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    /// Error to display for a field; untouched fields never show one.
    pub fn visible_error(&self, field: Field) -> Option<&str> {
        if !self.touched.contains(&field) {
            return None;
        }
        self.errors
            .get(&field)
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Record an externally produced error (e.g. an unverified email) as touched.
    pub fn force_error(&mut self, field: Field, message: impl Into<String>) {
        self.touched.insert(field);
        self.errors.insert(field, message.into());
    }

    /// Global validity: every mandatory field filled and email/phone well formed.
    pub fn is_valid(&self) -> bool {
        let filled = Field::mandatory().all(|field| self.draft.value(field).is_filled());
        filled
            && email_passes(&self.draft.personal.email)
            && phone_passes(&self.draft.personal.phone)
    }

    /// Force-touch and validate the given fields; returns the failing ones in form order.
    pub fn validate_fields(&mut self, fields: &[Field]) -> Vec<Field> {
        let mut invalid = Vec::new();
        for &field in fields {
            self.touched.insert(field);
            if self.revalidate(field) {
                invalid.push(field);
            }
        }
        invalid.sort();
        invalid
    }

    /// Force-validate every mandatory field regardless of prior interaction.
    pub fn validate_all(&mut self) -> Vec<Field> {
        let fields: Vec<Field> = Field::mandatory().collect();
        self.validate_fields(&fields)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    /// Discard the draft and all interaction state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Re-run the validator for one field; returns true when it failed.
    fn revalidate(&mut self, field: Field) -> bool {
        match validate::validate(field, &self.draft.value(field)) {
            Some(message) => {
                self.errors.insert(field, message);
                true
            }
            None => {
                self.errors.remove(&field);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "form_tests.rs"]
mod tests;
