//! Roster Domain Concerns

pub mod users;
