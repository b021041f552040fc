use thiserror::Error as DeriveError;

/// Errors that can be returned while building or querying a [`crate::Dac`].
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// An index passed to an accessor was not in `0..len`.
    #[error("index {index} out of range for a sequence of length {len}")]
    OutOfRange {
        index: usize,
        len: usize,
    },

    /// The input given to the builder cannot be encoded.
    #[error("invalid input: {reason}")]
    InvalidInput {
        reason: String,
    },

    /// Construction could not allocate the memory it needed.
    ///
    /// Never constructed by this crate: an ordinary allocation failure
    /// aborts the process rather than unwinding. The variant exists so
    /// callers can match on it without relying on `#[non_exhaustive]`
    /// forbidding it outright, and so a future allocator-aware build
    /// path has somewhere to report into.
    #[error("resource exhausted: {reason}")]
    ResourceExhausted {
        reason: String,
    },
}
