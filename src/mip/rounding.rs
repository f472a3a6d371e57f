//! LP relaxation + rounding heuristic backend.

use super::error::MipError;
use super::exact::{lower, run, run_with_limit, to_solution, Domain, Lowered};
use super::model::MipModel;
use super::report;
use super::solver::{MipSolution, MipSolver, SolveOptions, SolverStatus};
use super::variables::{VarKind, Variable};
use std::time::{Duration, Instant};

/// Distance from the nearest integer below which a relaxed value counts as integral.
const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Threshold above which a relaxed binary is rounded to 1.
const BINARY_THRESHOLD: f64 = 0.5;

/// Heuristic backend: solves the LP relaxation, rounds the integral
/// variables, fixes them and re-solves for the continuous ones.
///
/// Reports [`SolverStatus::Optimal`] when the relaxation is already
/// integral and [`SolverStatus::Feasible`] when the rounded point is
/// feasible. A rounded point that violates the model yields
/// [`SolverStatus::Unknown`] without values: the heuristic cannot tell
/// infeasibility apart from a bad rounding.
///
/// Each phase runs under the same time limit as [`MicroLpSolver`], so a
/// timed-out call leaves its worker thread running until the LP returns.
///
/// [`MicroLpSolver`]: super::MicroLpSolver
#[derive(Debug, Clone, Copy, Default)]
pub struct LpRoundingSolver;

impl LpRoundingSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Rounds a relaxed value according to the variable's domain.
fn round_value(var: &Variable, value: f64) -> f64 {
    match var.kind {
        VarKind::Binary => {
            if value > BINARY_THRESHOLD {
                1.0
            } else {
                0.0
            }
        }
        VarKind::Integer => value.round().clamp(var.lower.ceil(), var.upper.floor()),
        VarKind::Continuous => value,
    }
}

fn remaining(limit: Option<Duration>, start: Instant) -> Option<Duration> {
    // A spent budget still gets a sliver so the second phase reports a time-out.
    limit.map(|limit| limit.saturating_sub(start.elapsed()).max(Duration::from_millis(1)))
}

impl MipSolver for LpRoundingSolver {
    fn name(&self) -> &str {
        "lp-round"
    }

    fn solve(&self, model: &MipModel, options: &SolveOptions) -> Result<MipSolution, MipError> {
        options.validate()?;
        model.validate()?;

        let start = Instant::now();
        let n = model.variable_count();
        let (problem, vars) = match lower(model, &vec![Domain::Relaxed; n]) {
            Lowered::Problem(problem, vars) => (problem, vars),
            Lowered::TriviallyInfeasible(name) => {
                report(
                    options.verbosity,
                    format_args!("constraint {name} has no terms and cannot hold"),
                );
                return Ok(MipSolution::empty(SolverStatus::Infeasible, start.elapsed()));
            }
        };
        if n == 0 {
            return Ok(MipSolution::with_values(
                SolverStatus::Optimal,
                0.0,
                Vec::new(),
                start.elapsed(),
            ));
        }

        let relaxed = run_with_limit(options.max_duration, move || run(&problem, &vars))?;
        let Some(relaxed) = relaxed else {
            return Ok(MipSolution::empty(SolverStatus::TimeLimit, start.elapsed()));
        };
        let relaxed = to_solution(relaxed, SolverStatus::Optimal, start.elapsed())?;
        if !relaxed.has_values() {
            // An infeasible or unbounded relaxation settles the MIP as well.
            return Ok(relaxed);
        }
        let values = relaxed.values.as_deref().unwrap_or_default();

        let rounded: Vec<f64> = model
            .variables
            .iter()
            .zip(values)
            .map(|(var, &value)| round_value(var, value))
            .collect();
        let integral = model
            .variables
            .iter()
            .zip(values.iter().zip(&rounded))
            .filter(|(var, _)| var.kind.is_integral())
            .all(|(_, (value, rounded))| (value - rounded).abs() <= INTEGRALITY_TOLERANCE);

        if integral {
            report(
                options.verbosity,
                format_args!("lp-round: relaxation of {} is integral", model.name),
            );
            let objective = model.objective.evaluate(&rounded);
            return Ok(MipSolution::with_values(
                SolverStatus::Optimal,
                objective,
                rounded,
                start.elapsed(),
            ));
        }

        let domains: Vec<Domain> = model
            .variables
            .iter()
            .zip(&rounded)
            .map(|(var, &value)| {
                if var.kind.is_integral() {
                    Domain::Fixed(value)
                } else {
                    Domain::Relaxed
                }
            })
            .collect();
        let (problem, vars) = match lower(model, &domains) {
            Lowered::Problem(problem, vars) => (problem, vars),
            Lowered::TriviallyInfeasible(_) => {
                return Ok(MipSolution::empty(SolverStatus::Unknown, start.elapsed()));
            }
        };

        let limit = remaining(options.max_duration, start);
        let repaired = run_with_limit(limit, move || run(&problem, &vars))?;
        let runtime = start.elapsed();
        let solution = match repaired {
            None => MipSolution::empty(SolverStatus::TimeLimit, runtime),
            Some(Ok((_, mut values))) => {
                // Fixed columns come back with solver noise; snap them.
                let snapped = model.variables.iter().zip(values.iter_mut()).zip(&rounded);
                for ((var, value), fixed) in snapped {
                    if var.kind.is_integral() {
                        *value = *fixed;
                    }
                }
                let objective = model.objective.evaluate(&values);
                MipSolution::with_values(SolverStatus::Feasible, objective, values, runtime)
            }
            Some(Err(::microlp::Error::Infeasible)) => {
                report(
                    options.verbosity,
                    format_args!("lp-round: rounded point of {} is infeasible", model.name),
                );
                MipSolution::empty(SolverStatus::Unknown, runtime)
            }
            Some(Err(err)) => to_solution(Err(err), SolverStatus::Feasible, runtime)?,
        };

        report(
            options.verbosity,
            format_args!("lp-round: finished with {:?} in {:?}", solution.status, runtime),
        );
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mip::{ConstraintSense, LinearConstraint, VarId};

    #[test]
    fn test_round_value() {
        let b = Variable::binary("b");
        assert_eq!(round_value(&b, 0.51), 1.0);
        assert_eq!(round_value(&b, 0.5), 0.0);
        let i = Variable::integer("i", 0, 3);
        assert_eq!(round_value(&i, 2.6), 3.0);
        assert_eq!(round_value(&i, 7.2), 3.0);
        let c = Variable::continuous("c", 0.0, 1.0);
        assert_eq!(round_value(&c, 0.3), 0.3);
    }

    #[test]
    fn test_integral_relaxation_is_optimal() {
        // min 2a + b  s.t. a + b == 1 ; c == 4b
        let mut model = MipModel::new("assignment");
        let a = model.add_binary("a");
        let b = model.add_binary("b");
        let c = model.add_continuous("c", 0.0, 10.0);
        model.add_constraint(
            LinearConstraint::new("one", ConstraintSense::Equal, 1.0)
                .with_term(1.0, a)
                .with_term(1.0, b),
        );
        model.add_constraint(
            LinearConstraint::new("link", ConstraintSense::Equal, 0.0)
                .with_term(-1.0, c)
                .with_term(4.0, b),
        );
        model.add_objective_term(2.0, a);
        model.add_objective_term(1.0, b);

        let solution = LpRoundingSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert!(solution.is_optimal());
        assert_eq!(solution.value(b), Some(1.0));
        assert!((solution.value(c).unwrap() - 4.0).abs() < 1e-6);
        assert!((solution.objective() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_relaxation_is_repaired() {
        // max 3a + 2b + 0.1c  s.t. 2a + 2b <= 2.6 ; c <= 2a + 2b
        // The relaxation is a = 1, b = 0.3, c = 2.6. Rounding drops b and
        // the re-solve settles c = 2.
        let mut model = MipModel::new("fractional");
        let a = model.add_binary("a");
        let b = model.add_binary("b");
        let c = model.add_continuous("c", 0.0, 10.0);
        model.add_constraint(
            LinearConstraint::new("cap", ConstraintSense::LessThanOrEqual, 2.6)
                .with_term(2.0, a)
                .with_term(2.0, b),
        );
        model.add_constraint(
            LinearConstraint::new("link", ConstraintSense::LessThanOrEqual, 0.0)
                .with_term(1.0, c)
                .with_term(-2.0, a)
                .with_term(-2.0, b),
        );
        model.maximize();
        model.add_objective_term(3.0, a);
        model.add_objective_term(2.0, b);
        model.add_objective_term(0.1, c);

        let solution = LpRoundingSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert_eq!(solution.value(a), Some(1.0));
        assert_eq!(solution.value(b), Some(0.0));
        assert!((solution.value(c).unwrap() - 2.0).abs() < 1e-6);
        assert!((solution.objective() - 3.2).abs() < 1e-6);

        let values = solution.values.as_deref().unwrap();
        assert!(model.violations(values, 1e-6).is_empty());
    }

    #[test]
    fn test_infeasible_relaxation() {
        let mut model = MipModel::new("infeasible");
        let x = model.add_binary("x");
        model.add_constraint(
            LinearConstraint::new("two", ConstraintSense::GreaterThanOrEqual, 2.0)
                .with_term(1.0, x),
        );
        let solution = LpRoundingSolver::new()
            .solve(&model, &SolveOptions::default())
            .unwrap();
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_invalid_model_is_error() {
        let mut model = MipModel::new("bad");
        model.add_objective_term(1.0, VarId(1));
        assert!(LpRoundingSolver::new()
            .solve(&model, &SolveOptions::default())
            .is_err());
    }
}
