//! # roster_core
//!
//! Core domain logic for Roster.

pub mod models;
pub mod normalize;
pub mod selection;
pub mod servers;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Errors raised when parsing user-supplied enum names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown status kind: {0}")]
    UnknownStatusKind(String),
}

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
