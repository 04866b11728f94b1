//! Users

pub mod errors;
pub mod service;
pub mod store;

pub use errors::UsersServiceError;
pub use service::*;
