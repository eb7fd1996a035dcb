use thiserror::Error;

///
/// Errors that can be produced while configuring or driving an image pipeline
///
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PixelStreamError {
    /// A constructor was supplied with arguments it cannot use (no partial state is created)
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A call broke the delivery contract (the call is rejected, existing state is left alone)
    #[error("delivery contract violated: {0}")]
    DeliveryViolation(String),

    /// A lookup was attempted with a sample that is not covered by the lookup table
    #[error("lookup index out of range: band {band} sample {sample} (offset {offset}, table length {table_len})")]
    LookupOutOfRange {
        band:       usize,
        sample:     i32,
        offset:     i32,
        table_len:  usize,
    },

    /// A colour model reached a code path that cannot interpret it
    #[error("unsupported colour model: {0}")]
    UnsupportedColorModel(String),
}

/// Result type used throughout the pipeline
pub type Result<T> = std::result::Result<T, PixelStreamError>;

impl PixelStreamError {
    #[inline]
    pub (crate) fn configuration(message: impl Into<String>) -> Self {
        PixelStreamError::InvalidConfiguration(message.into())
    }

    #[inline]
    pub (crate) fn delivery(message: impl Into<String>) -> Self {
        PixelStreamError::DeliveryViolation(message.into())
    }

    #[inline]
    pub (crate) fn unsupported(message: impl Into<String>) -> Self {
        PixelStreamError::UnsupportedColorModel(message.into())
    }
}
