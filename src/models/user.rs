use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KayuError;

/// A single capability, written as `resource:action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Permission {
    DashboardView,
    InventoryView,
    InventoryAdd,
    InventoryEdit,
    InventoryDelete,
    SalesView,
    SalesAdd,
    SalesEdit,
    SalesDelete,
    ContactsView,
    ContactsAdd,
    ContactsEdit,
    ContactsDelete,
    ExpensesView,
    ExpensesAdd,
    ExpensesEdit,
    ExpensesDelete,
    ReportsView,
    ReportsExport,
    SettingsView,
    SettingsEdit,
    UsersView,
    UsersAdd,
    UsersEdit,
    UsersDelete,
}

impl Permission {
    pub const ALL: [Permission; 25] = [
        Permission::DashboardView,
        Permission::InventoryView,
        Permission::InventoryAdd,
        Permission::InventoryEdit,
        Permission::InventoryDelete,
        Permission::SalesView,
        Permission::SalesAdd,
        Permission::SalesEdit,
        Permission::SalesDelete,
        Permission::ContactsView,
        Permission::ContactsAdd,
        Permission::ContactsEdit,
        Permission::ContactsDelete,
        Permission::ExpensesView,
        Permission::ExpensesAdd,
        Permission::ExpensesEdit,
        Permission::ExpensesDelete,
        Permission::ReportsView,
        Permission::ReportsExport,
        Permission::SettingsView,
        Permission::SettingsEdit,
        Permission::UsersView,
        Permission::UsersAdd,
        Permission::UsersEdit,
        Permission::UsersDelete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::DashboardView => "dashboard:view",
            Permission::InventoryView => "inventory:view",
            Permission::InventoryAdd => "inventory:add",
            Permission::InventoryEdit => "inventory:edit",
            Permission::InventoryDelete => "inventory:delete",
            Permission::SalesView => "sales:view",
            Permission::SalesAdd => "sales:add",
            Permission::SalesEdit => "sales:edit",
            Permission::SalesDelete => "sales:delete",
            Permission::ContactsView => "contacts:view",
            Permission::ContactsAdd => "contacts:add",
            Permission::ContactsEdit => "contacts:edit",
            Permission::ContactsDelete => "contacts:delete",
            Permission::ExpensesView => "expenses:view",
            Permission::ExpensesAdd => "expenses:add",
            Permission::ExpensesEdit => "expenses:edit",
            Permission::ExpensesDelete => "expenses:delete",
            Permission::ReportsView => "reports:view",
            Permission::ReportsExport => "reports:export",
            Permission::SettingsView => "settings:view",
            Permission::SettingsEdit => "settings:edit",
            Permission::UsersView => "users:view",
            Permission::UsersAdd => "users:add",
            Permission::UsersEdit => "users:edit",
            Permission::UsersDelete => "users:delete",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Permission::ALL
            .iter()
            .find(|p| p.as_str() == wanted)
            .copied()
            .ok_or_else(|| KayuError::ParseError(format!("Unknown permission: '{s}'")))
    }
}

impl From<Permission> for String {
    fn from(p: Permission) -> Self {
        p.as_str().to_string()
    }
}

impl TryFrom<String> for Permission {
    type Error = KayuError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

const CASHIER_PERMISSIONS: [Permission; 7] = [
    Permission::DashboardView,
    Permission::InventoryView,
    Permission::SalesView,
    Permission::SalesAdd,
    Permission::ContactsView,
    Permission::ContactsAdd,
    Permission::ReportsView,
];

/// User role. Each role maps to a fixed capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Cashier,
}

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::Admin => &Permission::ALL,
            Role::Cashier => &CASHIER_PERMISSIONS,
        }
    }

    pub fn permission_set(&self) -> BTreeSet<Permission> {
        self.permissions().iter().copied().collect()
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Cashier => write!(f, "cashier"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Ok(Role::Admin),
            "cashier" | "kasir" => Ok(Role::Cashier),
            _ => Err(KayuError::ParseError(format!("Unknown role: '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = KayuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            _ => Err(KayuError::ParseError(format!("Unknown user status: '{s}'"))),
        }
    }
}

/// An account. The password hash never leaves the database layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.is_active() && self.role.has(permission)
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password: String,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn validate_password(password: &str) -> Result<(), KayuError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(KayuError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl NewUser {
    pub fn validate(&self) -> Result<(), KayuError> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(KayuError::ValidationError(format!(
                "Invalid email address: '{}'",
                self.email
            )));
        }
        if self.name.trim().is_empty() {
            return Err(KayuError::ValidationError(
                "User name must not be empty".to_string(),
            ));
        }
        validate_password(&self.password)
    }
}

/// Partial update for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_every_permission() {
        for p in Permission::ALL {
            assert!(Role::Admin.has(p), "admin missing {p}");
        }
    }

    #[test]
    fn test_cashier_capabilities() {
        assert!(Role::Cashier.has(Permission::SalesAdd));
        assert!(Role::Cashier.has(Permission::ContactsAdd));
        assert!(Role::Cashier.has(Permission::ReportsView));
        assert!(!Role::Cashier.has(Permission::InventoryAdd));
        assert!(!Role::Cashier.has(Permission::ReportsExport));
        assert!(!Role::Cashier.has(Permission::UsersView));
        assert_eq!(Role::Cashier.permission_set().len(), 7);
    }

    #[test]
    fn test_permission_strings_roundtrip() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
        assert!("inventory:fly".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_serde_as_tag() {
        let json = serde_json::to_string(&Permission::ReportsExport).unwrap();
        assert_eq!(json, "\"reports:export\"");
        let p: Permission = serde_json::from_str("\"users:delete\"").unwrap();
        assert_eq!(p, Permission::UsersDelete);
    }

    #[test]
    fn test_role_parse_aliases() {
        assert_eq!("Kasir".parse::<Role>().unwrap(), Role::Cashier);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_inactive_user_has_no_permissions() {
        let user = User {
            id: Uuid::new_v4(),
            email: "admin@kayulog.com".to_string(),
            name: "Administrator".to_string(),
            role: Role::Admin,
            status: UserStatus::Inactive,
            created_at: Utc::now(),
            last_login_at: None,
        };
        assert!(!user.has_permission(Permission::DashboardView));
    }

    #[test]
    fn test_new_user_validation() {
        let mut nu = NewUser {
            email: "kasir@kayulog.com".to_string(),
            name: "Kasir".to_string(),
            role: Role::Cashier,
            password: "kasir123".to_string(),
            status: None,
        };
        assert!(nu.validate().is_ok());
        nu.password = "123".to_string();
        assert!(nu.validate().is_err());
        nu.password = "kasir123".to_string();
        nu.email = "not-an-email".to_string();
        assert!(nu.validate().is_err());
    }
}
