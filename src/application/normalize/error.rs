use thiserror::Error;

/// Why a market's selections could not be normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("unrecognized selections payload: {found}")]
    UnrecognizedShape { found: &'static str },

    #[error("record {index} is a {found}, expected an object")]
    InvalidRecord { index: usize, found: &'static str },
}
