//! Roster
//!
//! Roster manages user records through a confirm-before-commit form workflow. This crate holds the
//! domain model shared by the service and web layers: the stored [`users::User`] record, the
//! detached [`users::UserForm`] carried between workflow steps, and the field validation rules.

pub mod prelude;
pub mod users;
pub mod validation;
