//! Error types for the prism engines

use thiserror::Error;

use super::{PrismId, SourceId};

/// Why a ray (or a source's population of rays) stopped without resolving.
///
/// Loops are not errors: they are reported through the `loop_tail` fields.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TraceError {
    #[error("infinite loop detected: budget of {limit} iterations exhausted")]
    BudgetExceeded { limit: usize },
}

/// Malformed input, reported before anything is traced.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum PrismError {
    #[error("duplicate prism id {0}")]
    DuplicatePrismId(PrismId),

    #[error("duplicate laser source id {0}")]
    DuplicateSourceId(SourceId),

    #[error("non-finite value in {0}")]
    NonFinite(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, PrismError>;
