use thiserror::Error;

/// Configuration-time validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A configured numeric limit must be strictly greater than zero.
    #[error("limit `{limit}` must be greater than 0")]
    InvalidLimitValue {
        /// Name of the limit.
        limit: &'static str,
    },
}

/// Parser-level multipart failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Generic parser failure with message context.
    #[error("{message}")]
    Message {
        /// Parser failure message.
        message: String,
    },
}

impl ParseError {
    /// Creates a parser error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Content-Transfer-Encoding decode failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body is not valid base64.
    #[error("invalid base64 body: {message}")]
    Base64 {
        /// Decoder failure message.
        message: String,
    },
    /// The body contains a malformed quoted-printable sequence.
    #[error("invalid quoted-printable body: {message}")]
    QuotedPrintable {
        /// Decoder failure message.
        message: String,
    },
}

/// Storage backend failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Generic storage failure with message context.
    #[error("{message}")]
    Message {
        /// Storage failure message.
        message: String,
    },
}

impl StorageError {
    /// Creates a storage error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Runtime error type used by `mimesplit`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractError {
    /// Configuration error surfaced at runtime.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Multipart parser failure.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Transfer-encoding decode failure for a single leaf part.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Storage backend failure for a single leaf part.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// Reading the underlying input failed.
    #[error("failed to read message input: {0}")]
    Io(#[from] std::io::Error),
    /// The top-level message cannot be split at all.
    #[error("invalid message: {message}")]
    FatalInput {
        /// Reason the message was rejected.
        message: String,
    },
    /// A nested multipart part does not declare a usable boundary.
    #[error("`{media_type}` part has no usable boundary parameter")]
    Boundary {
        /// Declared media type of the offending part.
        media_type: String,
    },
    /// A part's `Content-Type` could not be parsed and the active policy rejects it.
    #[error("unparsable Content-Type `{value}`")]
    ContentType {
        /// Raw header value.
        value: String,
    },
    /// A nested multipart exceeded the configured maximum depth.
    #[error("multipart nesting exceeded max depth of {max_depth}")]
    DepthLimitExceeded {
        /// Configured maximum depth.
        max_depth: usize,
    },
    /// Multipart stream ended before a complete terminal boundary.
    #[error("multipart stream ended before the closing boundary")]
    IncompleteStream,
}

impl ExtractError {
    pub(crate) fn fatal(message: impl Into<String>) -> Self {
        Self::FatalInput {
            message: message.into(),
        }
    }
}
