use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{not_found, Database};
use crate::error::KayuError;
use crate::models::{validate_password, NewUser, Role, User, UserStatus, UserUpdate};

const SELECT_USER: &str =
    "SELECT id, email, name, role, status, created_at, last_login_at FROM users";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        email: row.get("email")?,
        name: row.get("name")?,
        role: row.get("role")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        last_login_at: row.get("last_login_at")?,
    })
}

pub(super) fn list_users_in(conn: &Connection) -> Result<Vec<User>, KayuError> {
    let mut stmt = conn.prepare(&format!("{SELECT_USER} ORDER BY created_at"))?;
    let rows = stmt.query_map([], user_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn get_user_in(conn: &Connection, id: Uuid) -> Result<User, KayuError> {
    conn.query_row(&format!("{SELECT_USER} WHERE id = ?1"), [id], user_from_row)
        .map_err(not_found("User", id))
}

fn count_active_admins(conn: &Connection) -> Result<i64, KayuError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM users WHERE role = ?1 AND status = ?2",
        params![Role::Admin, UserStatus::Active],
        |row| row.get(0),
    )?)
}

fn last_admin_error() -> KayuError {
    KayuError::ValidationError("At least one active admin must remain".to_string())
}

impl Database {
    /// Create an account. Emails are unique regardless of case.
    pub fn create_user(&self, new: &NewUser) -> Result<User, KayuError> {
        new.validate()?;
        let email = new.email.trim().to_lowercase();
        let conn = self.conn();

        let exists: Option<Uuid> = conn
            .query_row("SELECT id FROM users WHERE email = ?1", [&email], |row| {
                row.get(0)
            })
            .optional()?;
        if exists.is_some() {
            return Err(KayuError::ValidationError(format!(
                "A user with email '{email}' already exists"
            )));
        }

        let hash = bcrypt::hash(&new.password, self.hash_cost)?;
        let user = User {
            id: Uuid::new_v4(),
            email,
            name: new.name.trim().to_string(),
            role: new.role,
            status: new.status.unwrap_or(UserStatus::Active),
            created_at: Utc::now(),
            last_login_at: None,
        };
        conn.execute(
            "INSERT INTO users (id, email, name, role, status, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.email,
                user.name,
                user.role,
                user.status,
                hash,
                user.created_at
            ],
        )?;
        tracing::info!("Created {} user {}", user.role, user.email);
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<User>, KayuError> {
        list_users_in(&self.conn())
    }

    pub fn get_user(&self, id: Uuid) -> Result<User, KayuError> {
        get_user_in(&self.conn(), id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, KayuError> {
        Ok(self
            .conn()
            .query_row(
                &format!("{SELECT_USER} WHERE email = ?1"),
                [email.trim()],
                user_from_row,
            )
            .optional()?)
    }

    pub fn update_user(&self, id: Uuid, update: &UserUpdate) -> Result<User, KayuError> {
        if let Some(password) = &update.password {
            validate_password(password)?;
        }
        let conn = self.conn();
        let mut user = get_user_in(&conn, id)?;
        let was_active_admin = user.role == Role::Admin && user.is_active();

        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(KayuError::ValidationError(
                    "User name must not be empty".to_string(),
                ));
            }
            user.name = name.trim().to_string();
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        let still_active_admin = user.role == Role::Admin && user.is_active();
        if was_active_admin && !still_active_admin && count_active_admins(&conn)? <= 1 {
            return Err(last_admin_error());
        }

        conn.execute(
            "UPDATE users SET name = ?2, role = ?3, status = ?4 WHERE id = ?1",
            params![user.id, user.name, user.role, user.status],
        )?;
        if let Some(password) = &update.password {
            let hash = bcrypt::hash(password, self.hash_cost)?;
            conn.execute(
                "UPDATE users SET password_hash = ?2 WHERE id = ?1",
                params![user.id, hash],
            )?;
            tracing::info!("Password changed for {}", user.email);
        }
        Ok(user)
    }

    pub fn delete_user(&self, id: Uuid) -> Result<(), KayuError> {
        let conn = self.conn();
        let user = get_user_in(&conn, id)?;
        if user.role == Role::Admin && user.is_active() && count_active_admins(&conn)? <= 1 {
            return Err(last_admin_error());
        }
        conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        tracing::info!("Deleted user {}", user.email);
        Ok(())
    }

    /// Check an email/password pair. Unknown emails, wrong passwords and
    /// inactive accounts all fail with the same `Unauthorized`. On success the
    /// login time is recorded.
    pub fn verify_credentials(&self, email: &str, password: &str) -> Result<User, KayuError> {
        let conn = self.conn();
        let found: Option<(User, String)> = conn
            .query_row(
                "SELECT id, email, name, role, status, created_at, last_login_at,
                    password_hash FROM users WHERE email = ?1",
                [email.trim()],
                |row| Ok((user_from_row(row)?, row.get("password_hash")?)),
            )
            .optional()?;

        let rejected = || KayuError::Unauthorized("Invalid email or password".to_string());
        let Some((mut user, hash)) = found else {
            tracing::warn!("Login attempt for unknown email {}", email.trim());
            return Err(rejected());
        };
        if !bcrypt::verify(password, &hash)? || !user.is_active() {
            tracing::warn!("Rejected login for {}", user.email);
            return Err(rejected());
        }

        let now = Utc::now();
        conn.execute(
            "UPDATE users SET last_login_at = ?2 WHERE id = ?1",
            params![user.id, now],
        )?;
        user.last_login_at = Some(now);
        tracing::info!("User {} logged in", user.email);
        Ok(user)
    }

    /// Create the first admin account when the users table is empty.
    /// Returns the new account, or `None` when users already exist.
    pub fn bootstrap_admin(&self, email: &str, password: &str) -> Result<Option<User>, KayuError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(None);
        }
        let user = self.create_user(&NewUser {
            email: email.to_string(),
            name: "Administrator".to_string(),
            role: Role::Admin,
            password: password.to_string(),
            status: None,
        })?;
        tracing::warn!("Created default admin {}; change its password", user.email);
        Ok(Some(user))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_db;
    use crate::error::KayuError;
    use crate::models::{NewUser, Role, UserStatus, UserUpdate};

    fn cashier() -> NewUser {
        NewUser {
            email: "Kasir@KayuLog.com".to_string(),
            name: "Kasir".to_string(),
            role: Role::Cashier,
            password: "kasir123".to_string(),
            status: None,
        }
    }

    #[test]
    fn test_create_normalizes_email() {
        let db = test_db();
        let user = db.create_user(&cashier()).unwrap();
        assert_eq!(user.email, "kasir@kayulog.com");
        assert!(db.find_user_by_email("KASIR@kayulog.com").unwrap().is_some());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let db = test_db();
        db.create_user(&cashier()).unwrap();
        let err = db.create_user(&cashier()).unwrap_err();
        assert!(matches!(err, KayuError::ValidationError(_)));
    }

    #[test]
    fn test_verify_credentials() {
        let db = test_db();
        db.create_user(&cashier()).unwrap();

        let user = db.verify_credentials("kasir@kayulog.com", "kasir123").unwrap();
        assert!(user.last_login_at.is_some());
        assert!(db.get_user(user.id).unwrap().last_login_at.is_some());

        assert!(matches!(
            db.verify_credentials("kasir@kayulog.com", "salah"),
            Err(KayuError::Unauthorized(_))
        ));
        assert!(matches!(
            db.verify_credentials("nobody@kayulog.com", "kasir123"),
            Err(KayuError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_inactive_user_cannot_login() {
        let db = test_db();
        let user = db.create_user(&cashier()).unwrap();
        db.update_user(
            user.id,
            &UserUpdate {
                status: Some(UserStatus::Inactive),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(matches!(
            db.verify_credentials("kasir@kayulog.com", "kasir123"),
            Err(KayuError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_password_change() {
        let db = test_db();
        let user = db.create_user(&cashier()).unwrap();
        db.update_user(
            user.id,
            &UserUpdate {
                password: Some("baru12345".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(db.verify_credentials("kasir@kayulog.com", "kasir123").is_err());
        assert!(db.verify_credentials("kasir@kayulog.com", "baru12345").is_ok());
    }

    #[test]
    fn test_bootstrap_admin_only_once() {
        let db = test_db();
        let admin = db.bootstrap_admin("admin@kayulog.com", "admin123").unwrap();
        assert_eq!(admin.unwrap().role, Role::Admin);
        assert!(db.bootstrap_admin("other@kayulog.com", "admin123").unwrap().is_none());
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_last_admin_is_protected() {
        let db = test_db();
        let admin = db.bootstrap_admin("admin@kayulog.com", "admin123").unwrap().unwrap();
        assert!(matches!(db.delete_user(admin.id), Err(KayuError::ValidationError(_))));
        let demote = db.update_user(
            admin.id,
            &UserUpdate {
                role: Some(Role::Cashier),
                ..Default::default()
            },
        );
        assert!(demote.is_err());

        let cashier = db.create_user(&cashier()).unwrap();
        db.delete_user(cashier.id).unwrap();
        assert_eq!(db.list_users().unwrap().len(), 1);
    }
}
