//! Error taxonomy for coercion and the parse pipeline.

use salvage_core::NumberError;
use thiserror::Error;

/// A value could not be reshaped under the target shape.
#[derive(Debug, Error)]
pub enum CoerceError {
    /// No coercion rule maps this value kind onto the target.
    #[error("cannot coerce {from} into {to}")]
    TypeMismatch { from: &'static str, to: String },

    /// The shape asks for something the coercer does not support, e.g. a
    /// mapping keyed by a non-string shape.
    #[error("unsupported shape: {what}")]
    UnsupportedShape { what: String },

    /// A string failed to parse where a number was required.
    #[error(transparent)]
    Number(#[from] NumberError),
}

/// Why one extracted candidate was rejected.
#[derive(Debug, Error)]
pub enum CandidateError {
    /// Strict JSON parsing failed, after repair where repair was allowed.
    #[error("strict parse failed: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The parsed value did not coerce to the target shape.
    #[error(transparent)]
    Coerce(#[from] CoerceError),
}

/// Top-level pipeline failure.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The extractor produced zero candidates.
    #[error("no JSON found in input")]
    NoJsonFound,

    /// Every candidate was rejected; carries the most recent cause.
    #[error("all candidates failed: {last}")]
    AllCandidatesFailed { last: CandidateError },
}

impl From<salvage_core::ExtractError> for ParseError {
    fn from(e: salvage_core::ExtractError) -> ParseError {
        match e {
            salvage_core::ExtractError::NoJsonFound => ParseError::NoJsonFound,
        }
    }
}
