//! Passwordless email verification.
//!
//! The controller depends on [`AuthService`] only. Sign-in completion is
//! delivered as [`AuthEvent`]s over a subscription the controller owns for its
//! lifetime and releases on dispose.
mod redirect;
mod supabase;
mod verification;

pub use redirect::{parse_redirect, scrub_redirect_url, RedirectTokens};
pub use supabase::SupabaseAuth;
pub use verification::{EmailVerification, VerificationStatus};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::sync::mpsc::{self, Receiver, Sender};

/// An authenticated session established by a magic link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub email: String,
    /// Expiry as seconds since the Unix epoch, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { email: String },
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Receiving end of an auth event subscription.
pub struct AuthSubscription {
    pub id: SubscriptionId,
    events: Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Drain events delivered since the last call without blocking.
    pub fn pending(&self) -> Vec<AuthEvent> {
        self.events.try_iter().collect()
    }
}

/// External identity service used for magic-link verification.
pub trait AuthService {
    /// Ask the service to email a one-time sign-in link that redirects to `redirect_to`.
    fn request_magic_link(&self, email: &str, redirect_to: &str) -> Result<()>;
    /// Session left behind by an earlier sign-in, if still current.
    fn current_session(&self) -> Result<Option<Session>>;
    /// Turn redirect tokens into a session and announce the sign-in to subscribers.
    fn establish_session(&self, tokens: &RedirectTokens) -> Result<Session>;
    fn subscribe(&self) -> AuthSubscription;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Fan-out of auth events to channel subscribers.
#[derive(Default)]
pub struct AuthBroadcaster {
    next_id: Cell<u64>,
    subscribers: RefCell<Vec<(SubscriptionId, Sender<AuthEvent>)>>,
}

impl AuthBroadcaster {
    pub fn subscribe(&self) -> AuthSubscription {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        let (sender, events) = mpsc::channel();
        self.subscribers.borrow_mut().push((id, sender));
        AuthSubscription { id, events }
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .borrow_mut()
            .retain(|(existing, _)| *existing != id);
    }

    /// Deliver to every live subscriber; receivers that were dropped are pruned.
    pub fn emit(&self, event: AuthEvent) {
        self.subscribers
            .borrow_mut()
            .retain(|(_, sender)| sender.send(event.clone()).is_ok());
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
