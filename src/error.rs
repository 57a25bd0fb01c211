//! Error types for kernel loading and ephemeris/frame queries

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the ephemeris/frame provider
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("Failed to read kernel '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name}:{line}: {message}")]
    KernelParse {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("No leapseconds kernel loaded; cannot convert UTC '{0}'")]
    MissingLeapSeconds(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Unknown frame: {0}")]
    UnknownFrame(String),

    #[error("Invalid definition for frame {frame}: {message}")]
    InvalidFrame { frame: String, message: String },

    #[error("No fixed-offset path between frames {from} and {to}")]
    NoFramePath { from: String, to: String },

    #[error("Field of view for instrument {id} is not defined: {message}")]
    InvalidFieldOfView { id: i32, message: String },

    #[error("Unknown aberration correction: {0}")]
    InvalidAberration(String),

    #[error("Ephemeris query failed: {0}")]
    Query(String),
}

pub type Result<T> = std::result::Result<T, EphemerisError>;
