//! HTTP layer of docintel.
//!
//! [`api::router`] exposes the upload routes over an [`AppState`]; the same
//! state backs the `docintel extract` command.

pub mod api;
pub mod service;

pub use api::{ApiError, router};
pub use service::{AppState, ServiceError};
