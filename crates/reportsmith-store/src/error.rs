//! Storage error types

/// Errors raised by a [`crate::DurableStore`]
///
/// Field rehydration treats every variant as recoverable: the field falls
/// back to its default and the error is logged, never propagated.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying I/O failure
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored bytes are not valid JSON
    #[error("malformed stored value for {key}: {source}")]
    Malformed {
        /// Key whose value failed to parse
        key: String,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be serialized for storage
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
