//! Solving several independent instances.

use super::config::FulfillmentConfig;
use super::orchestrator::fulfill;
use super::types::{FulfillmentInput, FulfillmentOutput};
use crate::error::Result;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Solves every input with the same configuration. Results are returned in
/// input order; one failing instance does not affect the others.
///
/// With the `parallel` feature, instances are solved on the rayon thread
/// pool.
///
/// Every instance gets the configured `max_duration`. An instance that
/// times out returns at once, but its solver keeps running on a detached
/// thread until the search ends, so a batch with many time-outs can hold
/// that many busy threads after `solve_all` has returned. Pass
/// `with_max_duration(None)` to solve every instance to completion on the
/// calling thread instead.
pub fn solve_all(
    inputs: &[FulfillmentInput],
    config: &FulfillmentConfig,
) -> Vec<Result<FulfillmentOutput>> {
    tracing::info!(instances = inputs.len(), "batch solve");

    #[cfg(feature = "parallel")]
    let results = inputs.par_iter().map(|input| fulfill(input, config)).collect();

    #[cfg(not(feature = "parallel"))]
    let results = inputs.iter().map(|input| fulfill(input, config)).collect();

    results
}
