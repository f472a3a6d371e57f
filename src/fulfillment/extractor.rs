//! Conversion of solver output into a [`FulfillmentOutput`].

use super::builder::FulfillmentModel;
use super::types::{FulfillmentOutput, Statistics, Status};
use crate::error::{Error, Result};
use crate::mip::{MipSolution, SolverStatus};

/// Binary values above this count as selected.
pub const SELECTION_THRESHOLD: f64 = 0.5;

/// Builds the output record from a solution of `fm`.
///
/// Without a feasible point the record has status `infeasible` and is
/// returned inside [`Error::NoSolution`].
pub fn extract(
    solution: &MipSolution,
    fm: &FulfillmentModel,
    provider: &str,
) -> Result<FulfillmentOutput> {
    let mut output = FulfillmentOutput {
        status: Status::Infeasible,
        runtime: format!("{:?}", solution.runtime),
        value: None,
        assignments: Vec::new(),
        cartons: Default::default(),
        statistics: Statistics {
            provider: provider.to_string(),
            variables: fm.model.variable_count(),
            constraints: fm.model.constraint_count(),
            assignments: 0,
        },
    };

    let Some(values) = solution.values.as_deref() else {
        tracing::warn!(status = ?solution.status, runtime = %output.runtime, "no solution found");
        return Err(Error::NoSolution(Box::new(output)));
    };

    output.status = match solution.status {
        SolverStatus::Optimal => Status::Optimal,
        _ => Status::Suboptimal,
    };
    output.value = solution.objective_value;

    output.assignments = fm
        .assignment_vars
        .iter()
        .filter(|(_, var)| values.get(var.index()).is_some_and(|&v| v > SELECTION_THRESHOLD))
        .map(|(assignment, _)| assignment.clone())
        .collect();
    output.cartons = fm
        .carton_vars
        .iter()
        .map(|(key, var)| (key.to_string(), values.get(var.index()).copied().unwrap_or(0.0)))
        .collect();
    output.statistics.assignments = output.assignments.len();

    Ok(output)
}
