//! Users

mod errors;
pub(crate) mod handlers;
mod params;
pub(crate) mod views;
mod workflow;
