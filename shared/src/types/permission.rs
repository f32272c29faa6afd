use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag that grants every capability check.
pub const WILDCARD: &str = "all";

/// Capability tags the dashboard views gate on.
pub mod capability {
    pub const STUDENTS: &str = "students";
    pub const ACADEMICS: &str = "academics";
    pub const SCHEDULE: &str = "schedule";
    pub const FINANCIAL: &str = "financial";
    pub const EXAMS: &str = "exams";
    pub const ROOMS: &str = "rooms";
    pub const ALUMNI: &str = "alumni";
    pub const TRANSCRIPTS: &str = "transcripts";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const REPORTS: &str = "reports";
}

/// Set of capability tags held by a principal.
///
/// A set containing [`WILDCARD`] allows every capability regardless of what
/// else it lists. Serialized as a plain JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding only the wildcard.
    pub fn wildcard() -> Self {
        Self::from_tags([WILDCARD])
    }

    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tags.into_iter().map(Into::into).collect())
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    /// Wildcard or exact (case-sensitive) membership.
    pub fn allows(&self, capability: &str) -> bool {
        self.is_wildcard() || self.0.contains(capability)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_tags(iter)
    }
}

impl fmt::Display for PermissionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.iter().collect();
        write!(f, "[{}]", tags.join(", "))
    }
}
