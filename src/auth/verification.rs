//! Verification state bound to one literal email address.
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    LinkSent {
        email: String,
    },
    Verified {
        email: String,
    },
}

impl VerificationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            VerificationStatus::Unverified => "unverified",
            VerificationStatus::LinkSent { .. } => "link-sent",
            VerificationStatus::Verified { .. } => "verified",
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            VerificationStatus::Unverified => None,
            VerificationStatus::LinkSent { email } | VerificationStatus::Verified { email } => {
                Some(email.as_str())
            }
        }
    }
}

/// Email verification sub-flow state.
///
/// Moves forward only (`unverified -> link-sent -> verified`); any change to the
/// email address the status is bound to drops it back to `unverified`.
#[derive(Debug, Clone, Default)]
pub struct EmailVerification {
    status: VerificationStatus,
    sending: bool,
}

impl EmailVerification {
    pub fn status(&self) -> &VerificationStatus {
        &self.status
    }

    #[cfg(test)]
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Claim the in-flight slot; false when a request is already running.
    pub fn begin_sending(&mut self) -> bool {
        if self.sending {
            return false;
        }
        self.sending = true;
        true
    }

    pub fn finish_sending(&mut self) {
        self.sending = false;
    }

    pub fn link_sent(&mut self, email: &str) {
        if self.is_verified(email) {
            return;
        }
        self.status = VerificationStatus::LinkSent {
            email: email.trim().to_string(),
        };
    }

    pub fn verified(&mut self, email: &str) {
        self.status = VerificationStatus::Verified {
            email: email.trim().to_string(),
        };
    }

    pub fn is_verified(&self, email: &str) -> bool {
        matches!(&self.status, VerificationStatus::Verified { email: bound } if bound == email.trim())
    }

    /// React to the draft's email changing; returns true when the status was invalidated.
    pub fn email_changed(&mut self, email: &str) -> bool {
        let stale = matches!(self.status.email(), Some(bound) if bound != email.trim());
        if stale {
            self.status = VerificationStatus::Unverified;
        }
        stale
    }

    pub fn reset(&mut self) {
        self.status = VerificationStatus::Unverified;
        self.sending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_moves_forward_and_binds_to_address() {
        let mut verification = EmailVerification::default();
        assert_eq!(verification.status().label(), "unverified");

        verification.link_sent("asha@example.org");
        assert_eq!(verification.status().label(), "link-sent");
        assert!(!verification.is_verified("asha@example.org"));

        verification.verified("asha@example.org");
        assert!(verification.is_verified(" asha@example.org "));
        assert!(!verification.is_verified("ASHA@example.org"));

        // A late "link sent" must not demote a verified address.
        verification.link_sent("asha@example.org");
        assert_eq!(verification.status().label(), "verified");
    }

    #[test]
    fn changing_email_invalidates_verification() {
        let mut verification = EmailVerification::default();
        verification.verified("asha@example.org");
        assert!(!verification.email_changed("asha@example.org"));
        assert!(verification.email_changed("asha@example.com"));
        assert_eq!(verification.status(), &VerificationStatus::Unverified);
        assert!(!verification.email_changed("anything@example.org"));
    }

    #[test]
    fn in_flight_flag_blocks_duplicate_requests() {
        let mut verification = EmailVerification::default();
        assert!(verification.begin_sending());
        assert!(!verification.begin_sending());
        verification.finish_sending();
        assert!(verification.begin_sending());
    }
}
