use thiserror::Error;

/// Errors returned by checked range operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("range start {0} exceeds range end {1}")]
    InvalidRange(usize, usize),
    #[error("range end {0} out of bounds for length {1}")]
    RangeOutOfBounds(usize, usize),
    #[error("range bound overflows usize")]
    RangeOverflow,
}
