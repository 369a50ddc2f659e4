use thiserror::Error;

/// Errors produced while reading a bit stream.
///
/// Any of these means the reader has lost sync with the writer; the rest of
/// the buffer cannot be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The reader tried to consume more bits than the buffer holds
    #[error("Attempted to read {requested} bits with only {remaining} bits remaining")]
    OutOfBits { requested: u32, remaining: u32 },

    /// A ranged value decoded outside of its declared range
    #[error("Decoded value {value} is outside of the declared range [{min}, {max}]")]
    ValueOutOfRange { value: i128, min: i128, max: i128 },

    /// An enum tag decoded to an index with no matching variant
    #[error("Decoded index {index} is not a valid {type_name} variant")]
    InvalidEnumIndex { type_name: &'static str, index: u32 },
}
