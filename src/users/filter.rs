//! User Filters

use serde::{Deserialize, Serialize};

use crate::users::records::User;

/// Criteria for listing users.
///
/// Every criterion that is set must match. The default filter has no criteria and matches every
/// user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    /// Only users whose id starts with this prefix
    pub id_prefix: Option<String>,

    /// Only users whose display name contains this text
    pub name_contains: Option<String>,

    /// Only users with this `active` flag
    pub active: Option<bool>,
}

impl UserFilter {
    /// Filter matching every user.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to ids starting with `prefix`.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    /// Restrict to display names containing `text`.
    #[must_use]
    pub fn with_name_containing(mut self, text: impl Into<String>) -> Self {
        self.name_contains = Some(text.into());
        self
    }

    /// Restrict to users with the given `active` flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Whether the filter has no criteria.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_prefix.is_none() && self.name_contains.is_none() && self.active.is_none()
    }

    /// Whether `user` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        let id_matches = self
            .id_prefix
            .as_deref()
            .is_none_or(|prefix| user.id.as_str().starts_with(prefix));

        let name_matches = self
            .name_contains
            .as_deref()
            .is_none_or(|text| user.display_name.contains(text));

        let active_matches = self.active.is_none_or(|active| user.active == active);

        id_matches && name_matches && active_matches
    }
}
