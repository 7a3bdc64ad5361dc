//! Registration controller.
//!
//! Owns the form store, the current step, the verification sub-flow and the
//! submission coordinator. Storage, auth and the record store are injected;
//! the controller lives for one page load (`init` .. `dispose`).
use crate::auth::{
    parse_redirect, scrub_redirect_url, AuthEvent, AuthService, AuthSubscription,
    EmailVerification,
};
use crate::draft::{Field, FieldValue, ProofOfPayment, RegistrationDraft, Step};
use crate::form::FormState;
use crate::persistence::DraftPersistence;
use crate::records::{PersistedRegistrationRecord, RecordStore};
use crate::storage::KeyValueStore;
use crate::validate;
use anyhow::{anyhow, Result};
use std::path::Path;

pub const PAYMENT_PAGE: &str = "payment";
pub const ENTER_EMAIL_FIRST_MESSAGE: &str = "Please enter your email address first.";
pub const LINK_FAILED_MESSAGE: &str = "Could not send the verification link. Please try again.";
pub const LINK_EXPIRED_MESSAGE: &str =
    "Your verification link has expired. Please request a new one.";
pub const VERIFICATION_FAILED_MESSAGE: &str =
    "Email verification failed. Please request a new link.";
pub const VERIFY_EMAIL_MESSAGE: &str = "Please verify your email address before continuing";
pub const SUBMIT_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

/// Collaborators injected into the controller.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub store: &'a dyn KeyValueStore,
    pub auth: &'a dyn AuthService,
    pub records: &'a dyn RecordStore,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub redirect_url: String,
    pub require_email_verification: bool,
}

/// Where the user's attention should go after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Scroll to a field; `shake` requests the transient error cue.
    Field { field: Field, shake: bool },
    Banner,
}

/// User-facing messages produced by the last action.
///
/// `alert` and `info` belong to a single action; the banner stays until it is
/// dismissed or the email is verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notices {
    pub alert: Option<String>,
    pub info: Option<String>,
    pub banner: Option<String>,
    pub focus: Option<Focus>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Success,
    Failure,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Blocked { invalid: Vec<Field>, focus: Field },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(Step),
    Blocked { invalid: Vec<Field> },
    NeedsVerification,
    NoFurtherStep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    Sent { email: String },
    MissingEmail,
    InvalidEmail,
    AlreadyVerified,
    InFlight,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectOutcome {
    /// The redirect URL with auth parameters removed.
    pub location: String,
    pub verified: bool,
}

pub struct RegistrationController<'a> {
    persistence: DraftPersistence<'a>,
    auth: &'a dyn AuthService,
    records: &'a dyn RecordStore,
    options: ControllerOptions,
    on_navigate: Box<dyn FnMut(&str) + 'a>,
    form: FormState,
    step: Step,
    verification: EmailVerification,
    subscription: Option<AuthSubscription>,
    phase: SubmitPhase,
    notices: Notices,
}

impl<'a> RegistrationController<'a> {
    /// Mount: restore the draft and step, subscribe to auth events and reuse
    /// an existing session whose email matches the draft.
    pub fn init(
        services: Services<'a>,
        options: ControllerOptions,
        on_navigate: impl FnMut(&str) + 'a,
    ) -> Result<Self> {
        let persistence = DraftPersistence::new(services.store);
        let (draft, step) = persistence.load()?;
        let subscription = services.auth.subscribe();
        let mut controller = Self {
            persistence,
            auth: services.auth,
            records: services.records,
            options,
            on_navigate: Box::new(on_navigate),
            form: FormState::new(draft),
            step,
            verification: EmailVerification::default(),
            subscription: Some(subscription),
            phase: SubmitPhase::Idle,
            notices: Notices::default(),
        };
        controller.restore_verification()?;
        Ok(controller)
    }

    fn restore_verification(&mut self) -> Result<()> {
        let email = self.form.draft().personal.email.trim().to_string();
        if email.is_empty() {
            return Ok(());
        }
        match self.auth.current_session() {
            Ok(Some(session)) if session.email.trim() == email => {
                tracing::debug!(email = %email, "reusing existing session");
                self.verification.verified(&email);
                return Ok(());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %format!("{err:#}"), "session lookup failed"),
        }
        if self.persistence.verified_email()?.as_deref().map(str::trim) == Some(email.as_str()) {
            self.verification.verified(&email);
        }
        Ok(())
    }

    /// Release the auth subscription. Safe to call more than once.
    pub fn dispose(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.auth.unsubscribe(subscription.id);
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn draft(&self) -> &RegistrationDraft {
        self.form.draft()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn verification(&self) -> &EmailVerification {
        &self.verification
    }

    pub fn phase(&self) -> SubmitPhase {
        self.phase
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Whether the final submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.form.is_valid() && !self.form.is_submitting()
    }

    fn begin_action(&mut self) {
        self.notices.alert = None;
        self.notices.info = None;
        self.notices.focus = None;
    }

    fn persist(&self) -> Result<()> {
        self.persistence.save(self.form.draft(), self.step)
    }

    pub fn set_value(&mut self, field: Field, value: FieldValue) -> Result<()> {
        self.begin_action();
        self.form.set_value(field, value)?;
        if field == Field::Email {
            let email = self.form.draft().personal.email.clone();
            if self.verification.email_changed(&email) {
                tracing::info!("email changed; verification must be repeated");
            }
        }
        self.persist()
    }

    /// Parse raw text for `field` and apply it.
    pub fn set_text(&mut self, field: Field, raw: &str) -> Result<()> {
        let value = FieldValue::parse_for(field, raw)?;
        self.set_value(field, value)
    }

    pub fn blur(&mut self, field: Field) {
        self.begin_action();
        self.form.mark_touched(field);
    }

    /// Attach a proof-of-payment file. A file that fails validation is not
    /// stored; its message is returned and recorded against the field.
    pub fn attach_proof(&mut self, path: &Path) -> Result<Option<String>> {
        self.begin_action();
        if self.form.is_submitting() {
            return Err(anyhow!("cannot attach a file while a submission is in flight"));
        }
        let proof = ProofOfPayment::from_path(path)?;
        if let Some(message) = validate::validate_proof(Some(&proof)) {
            self.form.force_error(Field::PaymentProof, message.clone());
            self.notices.focus = Some(Focus::Field {
                field: Field::PaymentProof,
                shake: false,
            });
            return Ok(Some(message));
        }
        self.form
            .set_value(Field::PaymentProof, FieldValue::File(Some(proof)))?;
        self.persist()?;
        Ok(None)
    }

    /// Validate the current step and advance. Leaving the step that holds the
    /// email requires a verified address when verification is enforced.
    pub fn next_step(&mut self) -> Result<StepOutcome> {
        self.begin_action();
        self.pump_auth_events()?;
        let Some(next) = self.step.next() else {
            return Ok(StepOutcome::NoFurtherStep);
        };
        let invalid = self.form.validate_fields(&self.step.fields());
        if let Some(&first) = invalid.first() {
            self.focus_field(first);
            return Ok(StepOutcome::Blocked { invalid });
        }
        if self.step == Field::Email.step() && !self.email_verified_or_optional() {
            self.form.force_error(Field::Email, VERIFY_EMAIL_MESSAGE);
            self.focus_field(Field::Email);
            return Ok(StepOutcome::NeedsVerification);
        }
        self.step = next;
        self.persist()?;
        Ok(StepOutcome::Moved(next))
    }

    pub fn previous_step(&mut self) -> Result<Option<Step>> {
        self.begin_action();
        let Some(previous) = self.step.previous() else {
            return Ok(None);
        };
        self.step = previous;
        self.persist()?;
        Ok(Some(previous))
    }

    fn email_verified_or_optional(&self) -> bool {
        !self.options.require_email_verification
            || self.verification.is_verified(&self.form.draft().personal.email)
    }

    fn focus_field(&mut self, field: Field) {
        self.notices.focus = Some(Focus::Field { field, shake: true });
    }

    /// Ask the identity service for a magic link to the draft's email.
    pub fn request_link(&mut self) -> Result<LinkOutcome> {
        self.begin_action();
        self.pump_auth_events()?;
        let email = self.form.draft().personal.email.trim().to_string();
        self.form.mark_touched(Field::Email);
        if email.is_empty() {
            self.notices.alert = Some(ENTER_EMAIL_FIRST_MESSAGE.to_string());
            self.focus_field(Field::Email);
            return Ok(LinkOutcome::MissingEmail);
        }
        if self.form.errors().contains_key(&Field::Email) {
            self.focus_field(Field::Email);
            return Ok(LinkOutcome::InvalidEmail);
        }
        if self.verification.is_verified(&email) {
            self.notices.info = Some(format!("{email} is already verified."));
            return Ok(LinkOutcome::AlreadyVerified);
        }
        if !self.verification.begin_sending() {
            return Ok(LinkOutcome::InFlight);
        }
        let result = self
            .auth
            .request_magic_link(&email, &self.options.redirect_url);
        self.verification.finish_sending();
        match result {
            Ok(()) => {
                tracing::info!(email = %email, "verification link requested");
                self.verification.link_sent(&email);
                self.notices.info = Some(format!(
                    "Check your inbox: we sent a verification link to {email}."
                ));
                Ok(LinkOutcome::Sent { email })
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "verification link request failed");
                self.notices.alert = Some(LINK_FAILED_MESSAGE.to_string());
                Ok(LinkOutcome::Failed)
            }
        }
    }

    /// Handle the page being loaded from a magic-link redirect.
    pub fn handle_redirect(&mut self, url: &str) -> Result<RedirectOutcome> {
        self.begin_action();
        let redirect = parse_redirect(url)?;
        let location = scrub_redirect_url(url)?;
        if redirect.is_error() {
            tracing::warn!(
                error = redirect.error.as_deref().unwrap_or_default(),
                code = redirect.error_code.as_deref().unwrap_or_default(),
                "verification redirect carried an error"
            );
            let message = if redirect.is_expired_link() {
                LINK_EXPIRED_MESSAGE
            } else {
                VERIFICATION_FAILED_MESSAGE
            };
            self.show_banner(message);
        } else if let Some(tokens) = &redirect.tokens {
            if let Err(err) = self.auth.establish_session(tokens) {
                tracing::error!(error = %format!("{err:#}"), "could not establish session");
                self.show_banner(VERIFICATION_FAILED_MESSAGE);
            }
        }
        self.pump_auth_events()?;
        let verified = self
            .verification
            .is_verified(&self.form.draft().personal.email);
        Ok(RedirectOutcome { location, verified })
    }

    fn show_banner(&mut self, message: &str) {
        self.notices.banner = Some(message.to_string());
        self.notices.focus = Some(Focus::Banner);
    }

    /// Apply auth events delivered since the last call.
    pub fn pump_auth_events(&mut self) -> Result<()> {
        let events = match &self.subscription {
            Some(subscription) => subscription.pending(),
            None => return Ok(()),
        };
        for event in events {
            match event {
                AuthEvent::SignedIn { email } => {
                    tracing::info!(email = %email, "email verified");
                    self.verification.verified(&email);
                    self.persistence.save_verified_email(email.trim())?;
                    self.notices.banner = None;
                    if self.verification.is_verified(&self.form.draft().personal.email) {
                        self.form.mark_touched(Field::Email);
                    }
                }
                // A proven address stays verified after the session ends.
                AuthEvent::SignedOut => tracing::debug!("auth session ended"),
            }
        }
        Ok(())
    }

    /// Run the submission coordinator once.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        self.begin_action();
        if self.form.is_submitting() {
            return Err(anyhow!("a submission is already in flight"));
        }
        self.pump_auth_events()?;
        self.phase = SubmitPhase::Validating;
        self.form.set_submitting(true);

        let mut invalid = self.form.validate_all();
        if !self.email_verified_or_optional() && !invalid.contains(&Field::Email) {
            self.form.force_error(Field::Email, VERIFY_EMAIL_MESSAGE);
            invalid.push(Field::Email);
            invalid.sort();
        }
        if let Some(&focus) = invalid.first() {
            self.form.set_submitting(false);
            self.phase = SubmitPhase::Blocked;
            self.focus_field(focus);
            tracing::debug!(count = invalid.len(), first = %focus, "submission blocked");
            return Ok(SubmitOutcome::Blocked { invalid, focus });
        }

        self.phase = SubmitPhase::Submitting;
        let record = PersistedRegistrationRecord::from_draft(self.form.draft());
        match self.records.insert_registration(&record) {
            Ok(()) => {
                tracing::info!(email = %record.email, "registration submitted");
                // The row is already written; a failed local cleanup is only logged.
                if let Err(err) = self.persistence.clear() {
                    tracing::error!(
                        error = %format!("{err:#}"),
                        "could not clear the stored draft after submission"
                    );
                }
                self.form.reset();
                self.step = Step::default();
                self.verification.reset();
                self.phase = SubmitPhase::Success;
                (self.on_navigate)(PAYMENT_PAGE);
                Ok(SubmitOutcome::Submitted)
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "registration insert failed");
                self.form.set_submitting(false);
                self.phase = SubmitPhase::Failure;
                self.notices.alert = Some(SUBMIT_FAILED_MESSAGE.to_string());
                Ok(SubmitOutcome::Failed {
                    message: SUBMIT_FAILED_MESSAGE.to_string(),
                })
            }
        }
    }

    /// Start over: discard the draft, its stored copy and the verification state.
    pub fn reset(&mut self) -> Result<()> {
        self.begin_action();
        if self.form.is_submitting() {
            return Err(anyhow!("cannot start over while a submission is in flight"));
        }
        self.form.reset();
        self.step = Step::default();
        self.verification.reset();
        self.phase = SubmitPhase::Idle;
        self.persistence.clear()?;
        self.persistence.clear_verified_email()?;
        Ok(())
    }
}

impl Drop for RegistrationController<'_> {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
