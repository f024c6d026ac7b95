//! Error types for Paisa
//!
//! Missing or malformed user data is never an error in this crate; absent
//! fields and empty results cover those cases. The variants here are
//! reserved for programmer errors (bad configuration, impossible sessions)
//! and for failures reported by injected collaborators.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid session: {0}")]
    InvalidSession(String),

    #[error("Payment verification failed: {0}")]
    Verifier(String),
}

pub type Result<T> = std::result::Result<T, Error>;
