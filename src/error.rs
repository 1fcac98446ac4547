use crate::session::SessionState;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The transport failed before a complete response arrived.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// The server answered, but not the way the protocol requires.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server refused a PATCH because its offset differs from the declared one.
    #[error("offset conflict: declared {declared}, server reports {server:?}")]
    OffsetConflict { declared: u64, server: Option<u64> },

    /// The upload resource does not exist (anymore).
    #[error("upload not found: {0}")]
    NotFound(String),

    #[error("cannot {operation} while session is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("chunk ends at byte {end}, past the upload length {total}")]
    LengthExceeded { end: u64, total: u64 },

    #[error("payload holds {payload} bytes, upload was created for {total}")]
    PayloadMismatch { payload: u64, total: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
