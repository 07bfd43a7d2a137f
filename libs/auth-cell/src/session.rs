use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use shared_models::auth::{Role, Session, User};

/// In-process session registry keyed by token. The auth flow is the only
/// writer; every other component reads.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        token: &str,
        user: User,
        role: Role,
        doctor_kind: Option<String>,
    ) -> Session {
        let session = Session {
            token: token.to_string(),
            user,
            role,
            doctor_kind,
            created_at: Utc::now(),
        };

        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        sessions.insert(token.to_string(), session.clone());
        debug!("Session opened for user {}", session.user.id);

        session
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        sessions.get(token).cloned()
    }

    /// Remove a session. Idempotent: removing an unknown token is not an error.
    pub fn remove(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        sessions.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: Some("user@example.com".to_string()),
            role: Some("patient".to_string()),
            created_at: None,
        }
    }

    #[test]
    fn login_writes_and_session_reads() {
        let store = SessionStore::new();
        store.insert("token-1", test_user("u1"), Role::Patient, None);

        let session = store.get("token-1").unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.role, Role::Patient);
    }

    #[test]
    fn logout_removes_and_is_idempotent() {
        let store = SessionStore::new();
        store.insert("token-1", test_user("u1"), Role::Patient, None);

        assert!(store.remove("token-1"));
        assert!(!store.remove("token-1"));
        assert!(store.get("token-1").is_none());
    }

    #[test]
    fn unknown_token_reads_nothing() {
        let store = SessionStore::new();
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }
}
