//! Common Infrastructure
//!
//! Error handling, response envelope, and logging setup

pub mod error;
pub mod logger;

pub use error::{AppError, AppResponse, AppResult, ok, ok_with_message};
