use thiserror::Error;

/// Errors raised while building domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A candle's close time did not come strictly after its predecessor's.
    #[error("candle at index {index} does not close after the previous candle")]
    UnorderedSeries {
        /// Index of the offending candle.
        index: usize,
    },
}
