//! Roster prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    users::{User, UserDraft, UserFilter, UserForm, UserId},
    validation::{Field, Violation, ViolationKind, Violations},
};
