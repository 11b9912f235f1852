//! Login sessions and permission checks.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::db::Database;
use crate::error::KayuError;
use crate::models::{Permission, User};

/// A logged-in user, keyed by an opaque bearer token.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

/// What a successful login hands back to the client.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: Uuid,
    pub user: User,
    pub permissions: Vec<Permission>,
}

/// In-memory session table with a time-to-live and a size cap.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, (Instant, Session)>>,
    ttl: Duration,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            Duration::from_secs(config.session_ttl_secs),
            config.max_sessions,
        )
    }

    /// Verify credentials against the database and open a session.
    pub fn login(
        &self,
        db: &Database,
        email: &str,
        password: &str,
    ) -> Result<LoginOutcome, KayuError> {
        let user = db.verify_credentials(email, password)?;
        let token = self.issue(&user);
        Ok(LoginOutcome {
            token,
            permissions: user.role.permissions().to_vec(),
            user,
        })
    }

    /// Open a session for an already-authenticated user.
    pub fn issue(&self, user: &User) -> Uuid {
        let mut map = self.sessions.lock().expect("sessions mutex poisoned");
        evict_expired(&mut map, self.ttl);
        if map.len() >= self.max_sessions {
            evict_oldest(&mut map);
        }
        let token = Uuid::new_v4();
        map.insert(
            token,
            (
                Instant::now(),
                Session {
                    user_id: user.id,
                    email: user.email.clone(),
                },
            ),
        );
        token
    }

    /// Look up a live session.
    pub fn resolve(&self, token: &Uuid) -> Option<Session> {
        let mut map = self.sessions.lock().expect("sessions mutex poisoned");
        evict_expired(&mut map, self.ttl);
        map.get(token).map(|(_, session)| session.clone())
    }

    /// End a session. Returns false if the token was unknown or expired.
    pub fn logout(&self, token: &Uuid) -> bool {
        let mut map = self.sessions.lock().expect("sessions mutex poisoned");
        evict_expired(&mut map, self.ttl);
        map.remove(token).is_some()
    }

    /// Drop every session belonging to `user_id`.
    pub fn revoke_user(&self, user_id: &Uuid) {
        let mut map = self.sessions.lock().expect("sessions mutex poisoned");
        map.retain(|_, (_, session)| session.user_id != *user_id);
    }

    pub fn len(&self) -> usize {
        let mut map = self.sessions.lock().expect("sessions mutex poisoned");
        evict_expired(&mut map, self.ttl);
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn evict_expired(map: &mut HashMap<Uuid, (Instant, Session)>, ttl: Duration) {
    let now = Instant::now();
    map.retain(|_, (created, _)| now.duration_since(*created) < ttl);
}

fn evict_oldest(map: &mut HashMap<Uuid, (Instant, Session)>) {
    if let Some(oldest) = map.iter().min_by_key(|(_, (t, _))| *t).map(|(id, _)| *id) {
        map.remove(&oldest);
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn parse_bearer(header: &str) -> Option<Uuid> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Uuid::parse_str(token.trim()).ok()
}

/// `Forbidden` unless the user is active and their role grants `permission`.
pub fn authorize(user: &User, permission: Permission) -> Result<(), KayuError> {
    if !user.is_active() {
        return Err(KayuError::Unauthorized(format!(
            "Account {} is inactive",
            user.email
        )));
    }
    if !user.role.has(permission) {
        return Err(KayuError::Forbidden(format!(
            "Role '{}' lacks permission '{permission}'",
            user.role
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::{NewUser, Role, UserStatus};

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(60), 3)
    }

    fn seeded_db() -> Database {
        let db = test_db();
        db.create_user(&NewUser {
            email: "kasir@kayulog.com".to_string(),
            name: "Kasir".to_string(),
            role: Role::Cashier,
            password: "kasir123".to_string(),
            status: None,
        })
        .unwrap();
        db
    }

    #[test]
    fn test_login_resolve_logout() {
        let db = seeded_db();
        let sessions = store();
        let outcome = sessions.login(&db, "kasir@kayulog.com", "kasir123").unwrap();
        assert_eq!(outcome.permissions.len(), 7);

        let session = sessions.resolve(&outcome.token).unwrap();
        assert_eq!(session.user_id, outcome.user.id);

        assert!(sessions.logout(&outcome.token));
        assert!(sessions.resolve(&outcome.token).is_none());
        assert!(!sessions.logout(&outcome.token));
    }

    #[test]
    fn test_bad_password_opens_no_session() {
        let db = seeded_db();
        let sessions = store();
        let err = sessions.login(&db, "kasir@kayulog.com", "nope").unwrap_err();
        assert!(matches!(err, KayuError::Unauthorized(_)));
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_expired_sessions_evicted() {
        let db = seeded_db();
        let sessions = SessionStore::new(Duration::from_millis(20), 10);
        let outcome = sessions.login(&db, "kasir@kayulog.com", "kasir123").unwrap();
        std::thread::sleep(Duration::from_millis(40));
        assert!(sessions.resolve(&outcome.token).is_none());
        assert_eq!(sessions.len(), 0);
    }

    #[test]
    fn test_oldest_evicted_at_capacity() {
        let db = seeded_db();
        let sessions = store();
        let first = sessions.login(&db, "kasir@kayulog.com", "kasir123").unwrap();
        for _ in 0..3 {
            std::thread::sleep(Duration::from_millis(2));
            sessions.login(&db, "kasir@kayulog.com", "kasir123").unwrap();
        }
        assert_eq!(sessions.len(), 3);
        assert!(sessions.resolve(&first.token).is_none());
    }

    #[test]
    fn test_revoke_user() {
        let db = seeded_db();
        let sessions = store();
        let outcome = sessions.login(&db, "kasir@kayulog.com", "kasir123").unwrap();
        sessions.revoke_user(&outcome.user.id);
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_parse_bearer() {
        let token = Uuid::new_v4();
        assert_eq!(parse_bearer(&format!("Bearer {token}")), Some(token));
        assert_eq!(parse_bearer(&format!("bearer  {token}")), Some(token));
        assert_eq!(parse_bearer(&format!("Basic {token}")), None);
        assert_eq!(parse_bearer("Bearer not-a-uuid"), None);
        assert_eq!(parse_bearer(""), None);
    }

    #[test]
    fn test_authorize() {
        let mut user = seeded_db()
            .find_user_by_email("kasir@kayulog.com")
            .unwrap()
            .unwrap();
        assert!(authorize(&user, Permission::SalesAdd).is_ok());
        assert!(matches!(
            authorize(&user, Permission::InventoryAdd),
            Err(KayuError::Forbidden(_))
        ));
        user.status = UserStatus::Inactive;
        assert!(matches!(
            authorize(&user, Permission::SalesAdd),
            Err(KayuError::Unauthorized(_))
        ));
    }
}
