//! Exact branch-and-bound backend on top of the `microlp` crate.

use super::error::MipError;
use super::model::{ConstraintSense, MipModel, ObjectiveSense};
use super::solver::{MipSolution, MipSolver, SolveOptions, SolverStatus};
use super::variables::VarKind;
use super::report;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Tolerance used when checking constraints that have no terms.
const EMPTY_ROW_TOLERANCE: f64 = 1e-9;

/// How a variable is handed to `microlp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Domain {
    /// Keep the model's domain.
    Native,
    /// Drop integrality, keep bounds.
    Relaxed,
    /// Pin to a value.
    Fixed(f64),
}

/// Outcome of a `microlp` run, detached from the solver machinery so it can
/// cross the worker thread boundary.
pub(super) type LpOutcome = Result<(f64, Vec<f64>), ::microlp::Error>;

/// A `microlp` problem ready to solve, or the verdict that an empty row is
/// already violated.
pub(super) enum Lowered {
    Problem(::microlp::Problem, Vec<::microlp::Variable>),
    TriviallyInfeasible(String),
}

/// Translates the model into a `microlp` problem.
///
/// `domains` must have one entry per model variable. Constraints without
/// terms are evaluated here instead of being passed on.
pub(super) fn lower(model: &MipModel, domains: &[Domain]) -> Lowered {
    use ::microlp::{ComparisonOp, OptimizationDirection, Problem};

    let direction = match model.objective.sense {
        ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        ObjectiveSense::Maximize => OptimizationDirection::Maximize,
    };
    let mut problem = Problem::new(direction);
    let coeffs = model.objective.dense_coefficients(model.variable_count());

    let vars: Vec<::microlp::Variable> = model
        .variables
        .iter()
        .zip(domains)
        .zip(&coeffs)
        .map(|((var, domain), &obj)| match (domain, var.kind) {
            (Domain::Fixed(value), _) => problem.add_var(obj, (*value, *value)),
            (Domain::Native, VarKind::Binary) => problem.add_binary_var(obj),
            (Domain::Native, VarKind::Integer) => {
                problem.add_integer_var(obj, (var.lower.ceil() as i32, var.upper.floor() as i32))
            }
            (Domain::Native, VarKind::Continuous) | (Domain::Relaxed, _) => {
                problem.add_var(obj, (var.lower, var.upper))
            }
        })
        .collect();

    for constraint in &model.constraints {
        if constraint.terms.is_empty() {
            if constraint.sense.holds(0.0, constraint.rhs, EMPTY_ROW_TOLERANCE) {
                continue;
            }
            return Lowered::TriviallyInfeasible(constraint.name.clone());
        }
        let op = match constraint.sense {
            ConstraintSense::Equal => ComparisonOp::Eq,
            ConstraintSense::LessThanOrEqual => ComparisonOp::Le,
            ConstraintSense::GreaterThanOrEqual => ComparisonOp::Ge,
        };
        problem.add_constraint(
            constraint
                .terms
                .iter()
                .map(|&(v, c)| (vars[v.index()], c))
                .collect::<Vec<_>>(),
            op,
            constraint.rhs,
        );
    }

    Lowered::Problem(problem, vars)
}

/// Solves a lowered problem, returning the objective and one value per variable.
pub(super) fn run(problem: &::microlp::Problem, vars: &[::microlp::Variable]) -> LpOutcome {
    let solution = problem.solve()?;
    let values = vars.iter().map(|&v| *solution.var_value(v)).collect();
    Ok((solution.objective(), values))
}

/// Runs `job` on a worker thread and waits at most `limit` for it.
///
/// Returns `Ok(None)` when the limit expires. The job cannot be cancelled:
/// the worker thread keeps running until `job` returns and its result is
/// then discarded.
pub(super) fn run_with_limit<T, F>(
    limit: Option<Duration>,
    job: F,
) -> Result<Option<T>, MipError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let Some(limit) = limit else {
        return Ok(Some(job()));
    };

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("u-fulfill-solve".into())
        .spawn(move || {
            // The receiver is gone after a time-out.
            let _ = tx.send(job());
        })
        .map_err(|err| MipError::Backend(format!("cannot spawn solver thread: {err}")))?;

    match rx.recv_timeout(limit) {
        Ok(result) => Ok(Some(result)),
        Err(RecvTimeoutError::Timeout) => Ok(None),
        Err(RecvTimeoutError::Disconnected) => {
            Err(MipError::Backend("solver thread terminated without a result".into()))
        }
    }
}

/// Maps a `microlp` run to a solution handle.
pub(super) fn to_solution(
    outcome: LpOutcome,
    status: SolverStatus,
    runtime: Duration,
) -> Result<MipSolution, MipError> {
    match outcome {
        Ok((objective, values)) => {
            Ok(MipSolution::with_values(status, objective, values, runtime))
        }
        Err(::microlp::Error::Infeasible) => {
            Ok(MipSolution::empty(SolverStatus::Infeasible, runtime))
        }
        Err(::microlp::Error::Unbounded) => {
            Ok(MipSolution::empty(SolverStatus::Unbounded, runtime))
        }
        Err(err) => Err(MipError::Backend(err.to_string())),
    }
}

/// Exact MIP backend: LP-based branch and bound from `microlp`.
///
/// `microlp` has no time limit of its own, so the solve runs on a worker
/// thread and the call returns [`SolverStatus::TimeLimit`] once
/// `max_duration` expires. The backend always proves optimality, so any
/// relative gap is honoured.
///
/// A timed-out solve is abandoned, not stopped: its worker thread stays busy
/// until `microlp` finishes the search on its own. Long-lived processes and
/// batch callers should expect one such thread per timed-out call.
///
/// # Examples
///
/// ```
/// use u_fulfill::mip::{
///     ConstraintSense, LinearConstraint, MicroLpSolver, MipModel, MipSolver, SolveOptions,
/// };
///
/// let mut model = MipModel::new("pick-one");
/// let a = model.add_binary("a");
/// let b = model.add_binary("b");
/// model.add_constraint(
///     LinearConstraint::new("one", ConstraintSense::Equal, 1.0)
///         .with_term(1.0, a)
///         .with_term(1.0, b),
/// );
/// model.add_objective_term(3.0, a);
/// model.add_objective_term(2.0, b);
///
/// let solution = MicroLpSolver::new().solve(&model, &SolveOptions::default()).unwrap();
/// assert!(solution.is_optimal());
/// assert!(solution.value(b).unwrap() > 0.5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MipSolver for MicroLpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: &MipModel, options: &SolveOptions) -> Result<MipSolution, MipError> {
        options.validate()?;
        model.validate()?;

        let start = Instant::now();
        let (problem, vars) = match lower(model, &vec![Domain::Native; model.variable_count()]) {
            Lowered::Problem(problem, vars) => (problem, vars),
            Lowered::TriviallyInfeasible(name) => {
                report(
                    options.verbosity,
                    format_args!("constraint {name} has no terms and cannot hold"),
                );
                return Ok(MipSolution::empty(SolverStatus::Infeasible, start.elapsed()));
            }
        };
        if vars.is_empty() {
            return Ok(MipSolution::with_values(
                SolverStatus::Optimal,
                0.0,
                Vec::new(),
                start.elapsed(),
            ));
        }

        report(
            options.verbosity,
            format_args!(
                "microlp: solving {} with {} variables and {} constraints",
                model.name,
                model.variable_count(),
                model.constraint_count()
            ),
        );

        let outcome = run_with_limit(options.max_duration, move || run(&problem, &vars))?;
        let runtime = start.elapsed();
        let solution = match outcome {
            Some(outcome) => to_solution(outcome, SolverStatus::Optimal, runtime)?,
            None => MipSolution::empty(SolverStatus::TimeLimit, runtime),
        };

        report(
            options.verbosity,
            format_args!("microlp: finished with {:?} in {:?}", solution.status, runtime),
        );
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mip::{LinearConstraint, VarId};

    fn knapsack() -> (MipModel, Vec<VarId>) {
        // max 5a + 4b + 3c  s.t.  2a + 3b + c <= 4
        let mut model = MipModel::new("knapsack");
        let vars: Vec<VarId> = ["a", "b", "c"].iter().map(|n| model.add_binary(*n)).collect();
        let mut cap = LinearConstraint::new("cap", ConstraintSense::LessThanOrEqual, 4.0);
        for (v, w) in vars.iter().zip([2.0, 3.0, 1.0]) {
            cap.add_term(w, *v);
        }
        model.add_constraint(cap);
        model.maximize();
        for (v, p) in vars.iter().zip([5.0, 4.0, 3.0]) {
            model.add_objective_term(p, *v);
        }
        (model, vars)
    }

    #[test]
    fn test_knapsack_optimal() {
        let (model, vars) = knapsack();
        let solution = MicroLpSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();

        assert!(solution.is_optimal());
        assert!((solution.objective() - 8.0).abs() < 1e-6);
        assert!(solution.value(vars[0]).unwrap() > 0.5);
        assert!(solution.value(vars[1]).unwrap() < 0.5);
        assert!(solution.value(vars[2]).unwrap() > 0.5);
        assert!(model.violations(solution.values.as_ref().unwrap(), 1e-6).is_empty());
    }

    #[test]
    fn test_unbounded_duration() {
        let (model, _) = knapsack();
        let options = SolveOptions::default().with_max_duration(None);
        let solution = MicroLpSolver::new().solve(&model, &options).unwrap();
        assert!(solution.is_optimal());
    }

    #[test]
    fn test_infeasible() {
        let mut model = MipModel::new("infeasible");
        let x = model.add_binary("x");
        model.add_constraint(
            LinearConstraint::new("too-much", ConstraintSense::Equal, 2.0).with_term(1.0, x),
        );
        let solution = MicroLpSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert_eq!(solution.status, SolverStatus::Infeasible);
        assert!(!solution.has_values());
    }

    #[test]
    fn test_empty_row() {
        let mut model = MipModel::new("rows");
        let x = model.add_binary("x");
        model.add_objective_term(1.0, x);
        model.add_constraint(LinearConstraint::new("zero", ConstraintSense::Equal, 0.0));
        let solution = MicroLpSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert!(solution.is_optimal());

        model.add_constraint(LinearConstraint::new("one", ConstraintSense::Equal, 1.0));
        let solution = MicroLpSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_empty_model() {
        let model = MipModel::new("empty");
        let solution = MicroLpSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert!(solution.is_optimal());
        assert_eq!(solution.objective(), 0.0);
    }

    #[test]
    fn test_invalid_model_is_error() {
        let mut model = MipModel::new("bad");
        model.add_objective_term(1.0, VarId(4));
        let result = MicroLpSolver::new().solve(&model, &SolveOptions::default());
        assert!(matches!(result, Err(MipError::InvalidModel(_))));
    }

    #[test]
    fn test_invalid_options_is_error() {
        let (model, _) = knapsack();
        let options = SolveOptions::default().with_mip_gap_relative(-0.1);
        let result = MicroLpSolver::new().solve(&model, &options);
        assert!(matches!(result, Err(MipError::InvalidOption(_))));
    }

    #[test]
    fn test_run_with_limit() {
        let quick = run_with_limit(Some(Duration::from_secs(5)), || 42).unwrap();
        assert_eq!(quick, Some(42));

        let slow = run_with_limit(Some(Duration::from_millis(10)), || {
            thread::sleep(Duration::from_millis(500));
            1
        })
        .unwrap();
        assert_eq!(slow, None);

        assert_eq!(run_with_limit(None, || 7).unwrap(), Some(7));
    }

    #[test]
    fn test_timed_out_job_keeps_running() {
        let (done_tx, done_rx) = mpsc::channel();
        let result = run_with_limit(Some(Duration::from_millis(10)), move || {
            thread::sleep(Duration::from_millis(200));
            done_tx.send(()).unwrap();
        })
        .unwrap();
        assert_eq!(result, None);
        assert_eq!(done_rx.try_recv(), Err(mpsc::TryRecvError::Empty));
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }
}
