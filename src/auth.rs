//! Minimal "is someone signed in" gate. The dashboard core never looks at it;
//! the host checks it before letting the user change anything.

use crate::error::{DashboardError, Result};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SESSION_KEY: &str = "userSessionClaims";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: String,
}

impl User {
    /// Stand-in account used until a real identity provider exists.
    pub fn mock() -> Self {
        Self {
            id: "12345-abcde".into(),
            name: "Tom Gordon".into(),
            email: "tom@mocked.com".into(),
            avatar_url: String::new(),
        }
    }
}

pub struct AuthSession {
    storage: Arc<dyn KeyValueStore>,
    user: Option<User>,
}

impl AuthSession {
    /// Pick up a previously stored session. Unreadable or corrupt claims are
    /// treated as signed out.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let user = match storage.get(SESSION_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(error = %e, "stored session is corrupt");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                None
            }
        };
        Self { storage, user }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn login(&mut self) -> Result<&User> {
        let user = User::mock();
        let raw = serde_json::to_string(&user)
            .map_err(DashboardError::storage)?;
        self.storage.set(SESSION_KEY, &raw)?;
        tracing::info!(user = %user.id, "signed in");
        Ok(&*self.user.insert(user))
    }

    /// Sign out locally even when the stored claims cannot be removed.
    pub fn logout(&mut self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "could not remove stored session");
        }
        self.user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn login_persists_and_logout_clears() {
        let storage = MemoryStore::new();
        let mut auth = AuthSession::restore(Arc::new(storage.clone()));
        assert!(!auth.is_authenticated());
        assert_eq!(auth.login().unwrap().name, "Tom Gordon");

        let restored = AuthSession::restore(Arc::new(storage.clone()));
        assert_eq!(restored.user(), Some(&User::mock()));

        auth.logout();
        assert!(!auth.is_authenticated());
        assert!(!AuthSession::restore(Arc::new(storage)).is_authenticated());
    }

    #[test]
    fn corrupt_claims_mean_signed_out() {
        let storage = MemoryStore::new();
        storage.set(SESSION_KEY, "not json").unwrap();
        assert!(!AuthSession::restore(Arc::new(storage)).is_authenticated());
    }

    #[test]
    fn failed_login_stays_signed_out() {
        let storage = MemoryStore::new();
        storage.set_fail_writes(true);
        let mut auth = AuthSession::restore(Arc::new(storage));
        assert!(auth.login().is_err());
        assert!(!auth.is_authenticated());
    }
}
