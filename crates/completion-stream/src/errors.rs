/// Errors surfaced by the decoder.
///
/// Only transport failures are fatal. Malformed records are skipped and
/// structurally incomplete or out-of-order protocol data is absorbed by the
/// decoding rules, so neither ever reaches the caller as an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// Reading the underlying byte stream failed before end-of-input.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl StreamError {
    /// Creates a transport-level error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}
