//! Role-based permissions derived from a [`UserProfile`].

use std::fmt;

use serde::Serialize;

use super::{Role, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewAllUsers,
    ManageUsers,
    ViewAllClients,
    ManageClients,
    ManageDealers,
    ViewOrders,
    ViewTransfers,
    UploadFiles,
    ViewAnalytics,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Self; 10] = [
        Self::ViewAllUsers,
        Self::ManageUsers,
        Self::ViewAllClients,
        Self::ManageClients,
        Self::ManageDealers,
        Self::ViewOrders,
        Self::ViewTransfers,
        Self::UploadFiles,
        Self::ViewAnalytics,
        Self::ManageSettings,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewAllUsers => "view_all_users",
            Self::ManageUsers => "manage_users",
            Self::ViewAllClients => "view_all_clients",
            Self::ManageClients => "manage_clients",
            Self::ManageDealers => "manage_dealers",
            Self::ViewOrders => "view_orders",
            Self::ViewTransfers => "view_transfers",
            Self::UploadFiles => "upload_files",
            Self::ViewAnalytics => "view_analytics",
            Self::ManageSettings => "manage_settings",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const CLIENT_ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ViewAllUsers,
    Permission::ManageUsers,
    Permission::ViewOrders,
    Permission::ViewTransfers,
    Permission::UploadFiles,
    Permission::ViewAnalytics,
];

const USER_PERMISSIONS: &[Permission] = &[
    Permission::ViewOrders,
    Permission::ViewTransfers,
    Permission::UploadFiles,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    SuperAdmin,
    ClientAdmin,
    User,
    None,
}

impl AccessLevel {
    /// A global admin outranks any client role.
    #[must_use]
    pub const fn for_roles(role: Role, global_role: Role) -> Self {
        match (role, global_role) {
            (_, Role::Admin) => Self::SuperAdmin,
            (Role::Admin, Role::User) => Self::ClientAdmin,
            (Role::User, Role::User) => Self::User,
            _ => Self::None,
        }
    }

    #[must_use]
    pub const fn permissions(self) -> &'static [Permission] {
        match self {
            Self::SuperAdmin => &Permission::ALL,
            Self::ClientAdmin => CLIENT_ADMIN_PERMISSIONS,
            Self::User => USER_PERMISSIONS,
            Self::None => &[],
        }
    }

    #[must_use]
    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SuperAdmin => "superadmin",
            Self::ClientAdmin => "client admin",
            Self::User => "user",
            Self::None => "none",
        })
    }
}

/// Signed-out users have no permissions.
#[must_use]
pub fn has_permission(profile: Option<&UserProfile>, permission: Permission) -> bool {
    profile.is_some_and(|profile| profile.access_level().grants(permission))
}

#[must_use]
pub fn has_any_permission(profile: Option<&UserProfile>, permissions: &[Permission]) -> bool {
    permissions
        .iter()
        .any(|permission| has_permission(profile, *permission))
}

/// An empty `permissions` list is satisfied only by a signed-in user.
#[must_use]
pub fn has_all_permissions(profile: Option<&UserProfile>, permissions: &[Permission]) -> bool {
    profile.is_some()
        && permissions
            .iter()
            .all(|permission| has_permission(profile, *permission))
}
