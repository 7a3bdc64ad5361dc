//! In-memory fakes shared by unit tests.
use crate::auth::{
    AuthBroadcaster, AuthEvent, AuthService, AuthSubscription, RedirectTokens, Session,
    SubscriptionId,
};
use crate::draft::{ProofOfPayment, RegistrationDraft};
use crate::records::{PersistedRegistrationRecord, RecordStore};
use crate::storage::KeyValueStore;
use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A draft that passes every validator. The proof points at a path that need not exist.
pub fn valid_draft() -> RegistrationDraft {
    let mut draft = RegistrationDraft::default();
    draft.personal.name = "Asha Rao".to_string();
    draft.personal.nationality = "Indian".to_string();
    draft.personal.email = "asha@example.org".to_string();
    draft.personal.phone = "+91 98765 43210".to_string();
    draft.personal.affiliation = "Faculty".to_string();
    draft.personal.place_of_affiliation = "Bangalore".to_string();
    draft.personal.institution = "BNMIT".to_string();
    draft.personal.country = "india".to_string();
    draft.paper.paper_title = "Digital Strategy in SMEs".to_string();
    draft.paper.track_number = "track1".to_string();
    draft.paper.paper_id = "ICSM-042".to_string();
    draft.paper.dietary_requirements = "Vegetarian".to_string();
    draft.paper.accommodation = true;
    draft.payment.amount_paid = "faculty-indian-early".to_string();
    draft.payment.payment_account = "asha@upi".to_string();
    draft.payment.transaction_id = "TXN123456".to_string();
    draft.payment.proof = Some(ProofOfPayment {
        file_name: "receipt.png".to_string(),
        size_bytes: 2048,
        content_type: "image/png".to_string(),
        path: PathBuf::from("/nonexistent/receipt.png"),
    });
    draft
}

/// Like [`valid_draft`] but with a real proof file under `dir`.
pub fn valid_draft_with_proof_file(dir: &Path) -> RegistrationDraft {
    let path = dir.join("receipt.png");
    std::fs::write(&path, vec![0u8; 2048]).expect("write proof file");
    let mut draft = valid_draft();
    draft.payment.proof = Some(ProofOfPayment::from_path(&path).expect("proof metadata"));
    draft
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    pub writes: Cell<usize>,
    /// When set, every `remove` fails with this message.
    pub remove_error: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if let Some(message) = self.remove_error.borrow().as_ref() {
            return Err(anyhow!("{message}"));
        }
        self.writes.set(self.writes.get() + 1);
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAuth {
    pub broadcaster: AuthBroadcaster,
    pub link_requests: RefCell<Vec<(String, String)>>,
    pub fail_link_requests: Cell<bool>,
    pub session: RefCell<Option<Session>>,
}

impl FakeAuth {
    pub fn with_session(email: &str) -> Self {
        let auth = Self::default();
        *auth.session.borrow_mut() = Some(session_for(email));
        auth
    }

    /// Simulate the out-of-band sign-in completing.
    pub fn sign_in(&self, email: &str) {
        *self.session.borrow_mut() = Some(session_for(email));
        self.broadcaster.emit(AuthEvent::SignedIn {
            email: email.to_string(),
        });
    }
}

pub fn session_for(email: &str) -> Session {
    Session {
        access_token: "access-token".to_string(),
        refresh_token: Some("refresh-token".to_string()),
        email: email.to_string(),
        expires_at: None,
    }
}

impl AuthService for FakeAuth {
    fn request_magic_link(&self, email: &str, redirect_to: &str) -> Result<()> {
        self.link_requests
            .borrow_mut()
            .push((email.to_string(), redirect_to.to_string()));
        if self.fail_link_requests.get() {
            return Err(anyhow!("auth service unavailable"));
        }
        Ok(())
    }

    fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.session.borrow().clone())
    }

    fn establish_session(&self, tokens: &RedirectTokens) -> Result<Session> {
        let email = tokens
            .access_token
            .strip_prefix("token-for:")
            .ok_or_else(|| anyhow!("unknown access token"))?;
        self.sign_in(email);
        Ok(session_for(email))
    }

    fn subscribe(&self) -> AuthSubscription {
        self.broadcaster.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.broadcaster.unsubscribe(id);
    }
}

#[derive(Default)]
pub struct FakeRecords {
    pub inserted: RefCell<Vec<PersistedRegistrationRecord>>,
    pub fail_with: RefCell<Option<String>>,
}

impl FakeRecords {
    pub fn failing(message: &str) -> Self {
        let records = Self::default();
        *records.fail_with.borrow_mut() = Some(message.to_string());
        records
    }
}

impl RecordStore for FakeRecords {
    fn insert_registration(&self, record: &PersistedRegistrationRecord) -> Result<()> {
        if let Some(message) = self.fail_with.borrow().as_ref() {
            return Err(anyhow!("{message}"));
        }
        self.inserted.borrow_mut().push(record.clone());
        Ok(())
    }
}
