//! Roster application services and persistence.

pub mod clock;
pub mod context;
pub mod database;
pub mod domain;
