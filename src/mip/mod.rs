//! Mixed-integer programming (MIP) layer.
//!
//! Provides a solver-independent model for linear programs with binary,
//! integer and continuous variables, and the narrow interface through which
//! backends solve them.
//!
//! # Key Components
//!
//! - **Variables**: [`Variable`], [`VarId`], [`VarKind`]
//! - **Constraints**: [`LinearConstraint`] with [`ConstraintSense`]
//! - **Model**: [`MipModel`], the container of variables, constraints and the objective
//! - **Solver**: [`MipSolver`] trait ("model in, solution out")
//! - **Backends**: [`MicroLpSolver`] (exact), [`LpRoundingSolver`] (heuristic),
//!   selected by [`Provider`]
//!
//! # Design
//!
//! Formulation code only talks to [`MipModel`] and [`MipSolver`]; the
//! LP/branch-and-bound machinery lives in the `microlp` crate and can be
//! replaced without touching it.

mod error;
mod exact;
mod model;
mod provider;
mod rounding;
mod solver;
mod variables;

pub use error::MipError;
pub use exact::MicroLpSolver;
pub use model::{ConstraintSense, LinearConstraint, MipModel, Objective, ObjectiveSense};
pub use provider::{new_solver, Provider};
pub use rounding::LpRoundingSolver;
pub use solver::{
    duration_from_secs, MipSolution, MipSolver, SolveOptions, SolverStatus, Verbosity,
};
pub use variables::{VarId, VarKind, Variable};

use std::fmt;

/// Backend progress message: `info` when the caller asked for output, `debug` otherwise.
pub(crate) fn report(verbosity: Verbosity, message: fmt::Arguments<'_>) {
    if verbosity > Verbosity::Off {
        tracing::info!(target: "u_fulfill::mip", "{message}");
    } else {
        tracing::debug!(target: "u_fulfill::mip", "{message}");
    }
}
