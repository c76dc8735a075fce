//! Centralized error handling for streamcast
//!
//! One typed error enum covers the whole application so that the web layer,
//! the service layer and the repositories agree on what a validation failure,
//! a missing record or a lifecycle conflict looks like.

pub mod types;

pub use types::{AppError, AppResult};
