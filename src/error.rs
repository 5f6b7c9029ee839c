//! Errors for the fallible edges of the crate (configuration and storage)
//!
//! The simulation itself never fails.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Malformed JSON in a tuning file or stored blob
    Json(serde_json::Error),
    /// Native storage I/O failure
    Io(std::io::Error),
    /// A tuning value that would break the simulation
    InvalidTuning { field: &'static str, reason: String },
    /// Browser storage unavailable or rejected the write
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
            Self::Io(e) => write!(f, "storage I/O failed: {e}"),
            Self::InvalidTuning { field, reason } => {
                write!(f, "invalid tuning value `{field}`: {reason}")
            }
            Self::Storage(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
