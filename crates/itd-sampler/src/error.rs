//! Error types.

use thiserror::Error;

/// Error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Core error (invalid buffer, sink closed, ...).
    #[error(transparent)]
    Core(#[from] itd_core::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hound error.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Unsupported sample layout.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Render thread could not be spawned.
    #[error("Failed to spawn {0} render thread")]
    Spawn(itd_core::ChannelSide, #[source] std::io::Error),
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
