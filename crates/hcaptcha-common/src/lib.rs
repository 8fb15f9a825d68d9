//! # hCaptcha Common
//!
//! Shared types, defaults, and errors used across the hCaptcha guard.
//!
//! ## Modules
//! - `types` - siteverify wire types (outbound form, inbound JSON reply)
//! - `error` - configuration and verification errors
//! - `constants` - immutable defaults

pub mod constants;
pub mod error;
pub mod types;

pub use error::{ConfigError, VerifyError};
pub use types::*;
