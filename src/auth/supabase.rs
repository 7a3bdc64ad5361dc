//! Hosted auth (GoTrue-compatible) implementation of [`AuthService`].
use super::{
    AuthBroadcaster, AuthEvent, AuthService, AuthSubscription, RedirectTokens, Session,
    SubscriptionId,
};
use crate::remote::SupabaseClient;
use crate::storage::KeyValueStore;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

pub const SESSION_KEY: &str = "authSession";

#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    email: Option<String>,
}

pub struct SupabaseAuth<'a> {
    client: SupabaseClient,
    store: &'a dyn KeyValueStore,
    broadcaster: AuthBroadcaster,
}

impl<'a> SupabaseAuth<'a> {
    pub fn new(client: SupabaseClient, store: &'a dyn KeyValueStore) -> Self {
        Self {
            client,
            store,
            broadcaster: AuthBroadcaster::default(),
        }
    }
}

impl AuthService for SupabaseAuth<'_> {
    fn request_magic_link(&self, email: &str, redirect_to: &str) -> Result<()> {
        let body = serde_json::json!({ "email": email, "create_user": true });
        self.client
            .post_json("auth/v1/otp", &[("redirect_to", redirect_to)], &body, None, None)
            .context("request sign-in link")
    }

    /// Stored session, if present and not expired. Reads local state only.
    fn current_session(&self) -> Result<Option<Session>> {
        let Some(text) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        let session: Session = match serde_json::from_str(&text) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "stored auth session is unreadable; ignoring it");
                return Ok(None);
            }
        };
        if let Some(expires_at) = session.expires_at {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .context("compute timestamp")?
                .as_secs();
            if expires_at <= now {
                tracing::info!(email = %session.email, "stored auth session expired");
                self.store.remove(SESSION_KEY)?;
                self.broadcaster.emit(AuthEvent::SignedOut);
                return Ok(None);
            }
        }
        Ok(Some(session))
    }

    fn establish_session(&self, tokens: &RedirectTokens) -> Result<Session> {
        let user: UserResponse = self
            .client
            .get_json("auth/v1/user", &tokens.access_token)
            .context("look up signed-in user")?;
        let email = user
            .email
            .filter(|email| !email.trim().is_empty())
            .ok_or_else(|| anyhow!("signed-in user has no email address"))?;
        let session = Session {
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            email: email.clone(),
            expires_at: tokens.expires_at,
        };
        let text = serde_json::to_string(&session).context("serialize auth session")?;
        self.store.set(SESSION_KEY, &text)?;
        self.broadcaster.emit(AuthEvent::SignedIn { email });
        Ok(session)
    }

    fn subscribe(&self) -> AuthSubscription {
        self.broadcaster.subscribe()
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.broadcaster.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use crate::test_support::MemoryStore;

    fn offline_auth(store: &MemoryStore) -> SupabaseAuth<'_> {
        let client = SupabaseClient::new(&BackendConfig {
            url: "http://127.0.0.1:9".to_string(),
            anon_key: "anon".to_string(),
        });
        SupabaseAuth::new(client, store)
    }

    #[test]
    fn current_session_reads_unexpired_local_session() {
        let store = MemoryStore::default();
        let auth = offline_auth(&store);
        assert_eq!(auth.current_session().unwrap(), None);

        store.insert_raw(
            SESSION_KEY,
            r#"{"access_token":"abc","email":"asha@example.org","expires_at":32503680000}"#,
        );
        let session = auth.current_session().unwrap().expect("session");
        assert_eq!(session.email, "asha@example.org");
    }

    #[test]
    fn expired_or_corrupt_sessions_are_ignored() {
        let store = MemoryStore::default();
        let auth = offline_auth(&store);
        let subscription = auth.subscribe();
        store.insert_raw(
            SESSION_KEY,
            r#"{"access_token":"abc","email":"asha@example.org","expires_at":1}"#,
        );
        assert_eq!(auth.current_session().unwrap(), None);
        assert_eq!(store.raw(SESSION_KEY), None);
        assert_eq!(subscription.pending(), vec![AuthEvent::SignedOut]);

        store.insert_raw(SESSION_KEY, "garbage");
        assert_eq!(auth.current_session().unwrap(), None);
    }
}
