// dispatcher/src/error.rs

use std::io;
use std::path::PathBuf;
use buddy_allocator::AllocError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("could not open {path:?}: {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A job record parsed fine but carries values the dispatcher cannot run.
    #[error("job file has invalid entries (line {line}): {reason}")]
    InvalidRecord { line: usize, reason: String },

    #[error("invalid {name} `{input}`, please enter a positive integer")]
    InvalidParameter { name: &'static str, input: String },

    #[error("memory allocator failure: {0}")]
    Allocator(#[from] AllocError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
