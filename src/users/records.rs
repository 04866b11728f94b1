//! User Records

use std::fmt::{Display, Formatter, Result as FmtResult};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::users::draft::UserDraft;

/// User primary key.
///
/// Supplied by the operator when the user is created and immutable afterwards. An empty or
/// whitespace-only id is representable so that callers can be told their input was malformed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Unwrap into the raw id.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.0, f)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// User Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    /// Primary key
    pub id: UserId,

    /// Name shown to operators
    pub display_name: String,

    /// Login secret, stored exactly as submitted
    #[serde(skip_serializing)]
    pub secret: String,

    /// Contact email address
    pub contact: String,

    /// Free-form note
    pub note: Option<String>,

    /// Whether the user is active
    pub active: bool,

    /// When the user was created
    pub created_at: Timestamp,

    /// When the user was last changed
    pub updated_at: Timestamp,
}

impl User {
    /// Build the record stored for a newly created user.
    ///
    /// New users are always active and both timestamps are set to `now`.
    #[must_use]
    pub fn created(draft: UserDraft, now: Timestamp) -> Self {
        Self {
            id: draft.id,
            display_name: draft.display_name,
            secret: draft.secret,
            contact: draft.contact,
            note: draft.note,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a draft on top of this record.
    ///
    /// The id, the `active` flag and the creation time are kept from `self`. The update time never
    /// moves before the creation time, even when the clock steps backwards.
    #[must_use]
    pub fn updated(&self, draft: UserDraft, now: Timestamp) -> Self {
        Self {
            id: self.id.clone(),
            display_name: draft.display_name,
            secret: draft.secret,
            contact: draft.contact,
            note: draft.note,
            active: self.active,
            created_at: self.created_at,
            updated_at: now.max(self.created_at),
        }
    }
}
