use thiserror::Error;

/// All errors produced by uttercut.
#[derive(Debug, Error)]
pub enum UttercutError {
    #[error("only mono audio is supported (stream declares {0} channels)")]
    UnsupportedChannelCount(u16),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Internal contract breach — an implementation bug, not an input
    /// condition. Processing of the stream should stop.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("chunk receiver disconnected before the stream finished")]
    ChannelClosed,

    #[error("WAV write error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, UttercutError>;
