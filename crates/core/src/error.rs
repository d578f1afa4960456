/// Result alias that carries the custom [`ShowError`] type.
pub type Result<T> = std::result::Result<T, ShowError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum ShowError {
    /// The show duration was missing or zero. Raised before any frame data is
    /// allocated.
    #[error("show duration must be positive (got {duration_ms} ms); is an audio track loaded?")]
    InvalidDuration { duration_ms: u64 },
    /// The show needs more frames than the sequence header can describe.
    /// Also raised before allocation.
    #[error("show duration of {duration_ms} ms needs {frame_count} frames, more than a sequence can hold")]
    DurationTooLong { duration_ms: u64, frame_count: u64 },
    /// A share document was rejected while loading.
    #[error("invalid show file: {0}")]
    InvalidShowFile(String),
    /// A byte buffer could not be decoded as an FSEQ v2 sequence.
    #[error("malformed sequence: {0}")]
    MalformedSequence(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ShowError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub(crate) fn malformed<T: Into<String>>(msg: T) -> Self {
        Self::MalformedSequence(msg.into())
    }
}
