//! Error types shared across the toolkit
//!
//! Per-line protocol failures are recoverable: callers log and skip the
//! offending line. Only resource failures are fatal, and those live with
//! the drivers that own the resources.

use crate::numeric::NumericError;
use thiserror::Error;

/// Failure to decode one protocol line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("expected at least {expected} fields, got {actual}")]
    MissingFields { expected: usize, actual: usize },

    #[error("bad {field} field: {source}")]
    BadField {
        field: &'static str,
        #[source]
        source: NumericError,
    },

    #[error("unexpected record tag {found:?}, wanted {wanted}")]
    UnexpectedTag { found: String, wanted: &'static str },

    #[error("empty instrument field")]
    EmptyInstrument,
}

impl WireError {
    pub(crate) fn bad(field: &'static str) -> impl FnOnce(NumericError) -> WireError {
        move |source| WireError::BadField { field, source }
    }
}
