use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),
}

impl Error {
    /// Returns a stable error code for this error variant.
    /// These codes are stable and can be used by clients for error classification.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Io(_) => "IO_ERROR",
            Error::Serialization(_) => "SERIALIZATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::AlreadyExists(_) => "ALREADY_EXISTS",
            Error::InvalidArgument(_) => "INVALID_ARGUMENT",
            Error::InvalidSlug(_) => "INVALID_SLUG",
            Error::Corruption(_) => "CORRUPTION",
        }
    }

    /// Returns true if the error was caused by the caller's input rather than
    /// by the store itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_)
                | Error::AlreadyExists(_)
                | Error::InvalidArgument(_)
                | Error::InvalidSlug(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
