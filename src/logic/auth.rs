//! Admin authentication: a session-scoped flag plus a pluggable password check.

use crate::models::LeaderboardError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Session key remembering a successful admin login.
pub const ADMIN_SESSION_KEY: &str = "admin_authenticated";

/// Boolean flags scoped to one browser session.
pub trait SessionFlagStore {
    fn get_flag(&self, key: &str) -> bool;
    fn set_flag(&self, key: &str) -> Result<(), LeaderboardError>;
    fn clear_flag(&self, key: &str);
}

/// Flags kept in process memory. Clones share the same flags.
#[derive(Clone, Debug, Default)]
pub struct MemorySession {
    flags: Arc<Mutex<HashSet<String>>>,
}

impl SessionFlagStore for MemorySession {
    fn get_flag(&self, key: &str) -> bool {
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    fn set_flag(&self, key: &str) -> Result<(), LeaderboardError> {
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string());
        Ok(())
    }

    fn clear_flag(&self, key: &str) {
        self.flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Decides whether a submitted admin password is acceptable.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, candidate: &str) -> bool;
}

/// One shared secret, compared as plain text. No lockout or rate limiting.
#[derive(Clone)]
pub struct SharedSecretVerifier {
    secret: String,
}

impl SharedSecretVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, candidate: &str) -> bool {
        candidate == self.secret
    }
}

/// Admin login state for one session.
pub struct AdminSession<S> {
    flags: S,
}

impl<S: SessionFlagStore> AdminSession<S> {
    pub fn new(flags: S) -> Self {
        Self { flags }
    }

    pub fn is_authenticated(&self) -> bool {
        self.flags.get_flag(ADMIN_SESSION_KEY)
    }

    pub fn login(&self, password: &str, verifier: &dyn CredentialVerifier) -> Result<(), LeaderboardError> {
        if !verifier.verify(password) {
            log::warn!("Rejected admin login attempt");
            return Err(LeaderboardError::InvalidPassword);
        }
        self.flags.set_flag(ADMIN_SESSION_KEY)?;
        log::info!("Admin logged in");
        Ok(())
    }

    pub fn logout(&self) {
        self.flags.clear_flag(ADMIN_SESSION_KEY);
        log::info!("Admin logged out");
    }

    pub fn require(&self) -> Result<(), LeaderboardError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(LeaderboardError::NotAuthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_sets_flag_shared_across_clones() {
        let flags = MemorySession::default();
        let session = AdminSession::new(flags.clone());
        let verifier = SharedSecretVerifier::new("admin123");

        assert_eq!(
            session.login("nope", &verifier),
            Err(LeaderboardError::InvalidPassword)
        );
        assert!(!session.is_authenticated());

        session.login("admin123", &verifier).unwrap();
        assert!(AdminSession::new(flags.clone()).is_authenticated());

        session.logout();
        assert!(!AdminSession::new(flags).is_authenticated());
    }
}
