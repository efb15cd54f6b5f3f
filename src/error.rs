// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GestureError>;

#[derive(Debug, Error)]
pub enum GestureError {
    #[error("line {line}: malformed landmark sample: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected 21 landmarks, got {0}")]
    LandmarkCount(usize),

    #[error("landmark {index} has {len} coordinates, expected 2 or 3")]
    LandmarkArity { index: usize, len: usize },

    #[error("mode {0} is out of range 0..=4")]
    InvalidMode(usize),

    #[error("unknown callback slot `{0}`")]
    UnknownSlot(String),

    #[error("{0} command modules configured, at most 5 modes exist")]
    TooManyModes(usize),

    #[error("command `{command}` for {slot} exited with {status}")]
    CommandFailed {
        slot: String,
        command: String,
        status: String,
    },

    #[error("invalid config {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
