//! MIP solver interface.

use super::error::MipError;
use super::model::MipModel;
use super::variables::VarId;
use std::time::Duration;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not proven optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// The objective is unbounded.
    Unbounded,
    /// Duration budget exhausted before any feasible point was found.
    TimeLimit,
    /// No solution found for other reasons (e.g. a heuristic gave up).
    Unknown,
}

/// How much the backend reports while solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    #[default]
    Off,
    Low,
    Medium,
    High,
}

/// Solution handle returned by a [`MipSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct MipSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if a feasible point was found).
    pub objective_value: Option<f64>,
    /// Variable values indexed by [`VarId`], `None` without a feasible point.
    pub values: Option<Vec<f64>>,
    /// Wall-clock time spent in the backend.
    pub runtime: Duration,
}

impl MipSolution {
    /// Creates a solution without values.
    pub fn empty(status: SolverStatus, runtime: Duration) -> Self {
        Self {
            status,
            objective_value: None,
            values: None,
            runtime,
        }
    }

    /// Creates a solution carrying a feasible point.
    pub fn with_values(
        status: SolverStatus,
        objective_value: f64,
        values: Vec<f64>,
        runtime: Duration,
    ) -> Self {
        Self {
            status,
            objective_value: Some(objective_value),
            values: Some(values),
            runtime,
        }
    }

    /// Whether a feasible point is available.
    pub fn has_values(&self) -> bool {
        self.values.is_some()
    }

    /// Whether optimality was certified.
    pub fn is_optimal(&self) -> bool {
        self.status == SolverStatus::Optimal && self.has_values()
    }

    /// Objective value, `NaN` without a feasible point.
    pub fn objective(&self) -> f64 {
        self.objective_value.unwrap_or(f64::NAN)
    }

    /// Value of a variable, `None` without a feasible point.
    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.as_ref().and_then(|v| v.get(var.index()).copied())
    }
}

/// Options passed to a backend for one solve.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_fulfill::mip::{SolveOptions, Verbosity};
///
/// let options = SolveOptions::default()
///     .with_max_duration(Some(Duration::from_secs(30)))
///     .with_mip_gap_relative(0.0)
///     .with_verbosity(Verbosity::Off);
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOptions {
    /// Maximum solve duration. `None` = unbounded.
    pub max_duration: Option<Duration>,
    /// Allowed relative gap between incumbent and bound. 0 = prove optimality.
    pub mip_gap_relative: f64,
    /// Reporting level.
    pub verbosity: Verbosity,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            max_duration: Some(Duration::from_secs(10)),
            mip_gap_relative: 0.0,
            verbosity: Verbosity::Off,
        }
    }
}

impl SolveOptions {
    pub fn with_max_duration(mut self, duration: Option<Duration>) -> Self {
        self.max_duration = duration;
        self
    }

    /// Sets the duration from seconds. `0` means unbounded; negative or
    /// non-finite values are rejected.
    pub fn with_max_duration_secs(mut self, secs: f64) -> Result<Self, MipError> {
        self.max_duration = duration_from_secs(secs)?;
        Ok(self)
    }

    pub fn with_mip_gap_relative(mut self, gap: f64) -> Self {
        self.mip_gap_relative = gap;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Validates the options.
    pub fn validate(&self) -> Result<(), MipError> {
        if !(0.0..=1.0).contains(&self.mip_gap_relative) {
            return Err(MipError::InvalidOption(format!(
                "mip_gap_relative must be in [0, 1], got {}",
                self.mip_gap_relative
            )));
        }
        if self.max_duration == Some(Duration::ZERO) {
            return Err(MipError::InvalidOption(
                "max_duration of zero, use None for an unbounded solve".into(),
            ));
        }
        Ok(())
    }
}

/// Converts a duration in seconds to an optional limit (`0` = unbounded).
pub fn duration_from_secs(secs: f64) -> Result<Option<Duration>, MipError> {
    if secs == 0.0 {
        return Ok(None);
    }
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|err| MipError::InvalidOption(format!("invalid duration {secs}: {err}")))
}

/// Trait for MIP solver backends.
///
/// Implementors take a fully built model and return a solution handle.
/// Backends must not retain state between calls.
pub trait MipSolver: Send + Sync {
    /// Short provider name, reported in run statistics.
    fn name(&self) -> &str;

    /// Solves the model.
    ///
    /// Infeasibility, unboundedness and time-outs are reported through the
    /// returned [`MipSolution`]; errors are reserved for invalid models,
    /// invalid options and backend failures.
    fn solve(&self, model: &MipModel, options: &SolveOptions) -> Result<MipSolution, MipError>;
}
