use thiserror::Error;

use super::filter::FilterError;
use super::validate::InvalidField;

/// Failure of a plan catalogue operation.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("invalid plan payload ({} field error(s))", .0.len())]
    Invalid(Vec<InvalidField>),

    #[error("plan {0} not found")]
    NotFound(i32),

    #[error("plan code {0:?} already exists")]
    CodeExists(String),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("plan store failure: {0:#}")]
    Store(#[from] anyhow::Error),
}
