use std::fmt;

use serde::{Deserialize, Serialize};

use super::permission::PermissionSet;
use super::role::Role;

// ---------------------------------------------------------------------------
// Principal
// ---------------------------------------------------------------------------

/// The authenticated identity and its authorization attributes.
///
/// `role` and `permissions` are assigned together when the principal is
/// authenticated (or switched to by an admin) and are never edited
/// mid-session; [`PrincipalPatch`] has no field for either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    /// Opaque stable identifier.
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: PermissionSet,
    pub department: String,

    /// Student number, students only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,

    /// Year of study, students only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    /// Academic or administrative title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Unix timestamp (seconds) of the last successful authentication or
    /// role switch.
    #[serde(default)]
    pub last_login: i64,

    /// Set when an admin is previewing this role; holds the role switched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switched_from: Option<Role>,
}

impl Principal {
    pub fn has_permission(&self, capability: &str) -> bool {
        self.permissions.allows(capability)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Shallow merge: only the fields present in `patch` are overwritten.
    pub fn apply(&mut self, patch: PrincipalPatch) {
        let PrincipalPatch {
            name,
            email,
            department,
            student_id,
            year,
            title,
        } = patch;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(department) = department {
            self.department = department;
        }
        if student_id.is_some() {
            self.student_id = student_id;
        }
        if year.is_some() {
            self.year = year;
        }
        if title.is_some() {
            self.title = title;
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> ({})", self.name, self.email, self.role)
    }
}

// ---------------------------------------------------------------------------
// Profile update
// ---------------------------------------------------------------------------

/// Fields a signed-in principal may change about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PrincipalPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
