//! Users

pub mod draft;
pub mod filter;
pub mod form;
pub mod records;

pub use draft::UserDraft;
pub use filter::UserFilter;
pub use form::UserForm;
pub use records::{User, UserId};
