//! User Drafts

use crate::users::records::UserId;

/// Validated, caller-supplied user data.
///
/// This is everything an operator controls about a user. The `active` flag and the timestamps are
/// owned by the service and have no place here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    /// Primary key
    pub id: UserId,

    /// Name shown to operators
    pub display_name: String,

    /// Login secret
    pub secret: String,

    /// Contact email address
    pub contact: String,

    /// Free-form note
    pub note: Option<String>,
}
