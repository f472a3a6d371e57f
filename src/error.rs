//! Crate-level error type.

use crate::fulfillment::{FulfillmentOutput, ValidationError};
use crate::mip::MipError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("solver error: {0}")]
    Solver(#[from] MipError),

    /// The solver returned no feasible point. Carries the `infeasible`
    /// output record so callers can still report it.
    #[error("no solution found")]
    NoSolution(Box<FulfillmentOutput>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
