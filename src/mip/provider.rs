//! Backend selection by provider name.

use super::error::MipError;
use super::exact::MicroLpSolver;
use super::rounding::LpRoundingSolver;
use super::solver::MipSolver;
use std::fmt;
use std::str::FromStr;

/// A MIP backend that can be selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provider {
    /// Exact branch and bound ([`MicroLpSolver`]).
    #[default]
    MicroLp,
    /// LP relaxation + rounding ([`LpRoundingSolver`]).
    LpRound,
}

impl Provider {
    /// All providers, in the order they are listed to users.
    pub const ALL: [Provider; 2] = [Provider::MicroLp, Provider::LpRound];

    /// Canonical provider name.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::MicroLp => "microlp",
            Provider::LpRound => "lp-round",
        }
    }

    /// Comma-separated list of the supported names.
    pub fn supported() -> String {
        Self::ALL.iter().map(|p| p.as_str()).collect::<Vec<_>>().join(", ")
    }

    /// Creates the backend.
    pub fn solver(self) -> Box<dyn MipSolver> {
        match self {
            Provider::MicroLp => Box::new(MicroLpSolver::new()),
            Provider::LpRound => Box::new(LpRoundingSolver::new()),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = MipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MipError::UnknownProvider {
                name: s.to_string(),
                supported: Self::supported(),
            })
    }
}

/// Creates a backend from its provider name.
///
/// # Examples
///
/// ```
/// use u_fulfill::mip::new_solver;
///
/// assert_eq!(new_solver("microlp").unwrap().name(), "microlp");
/// assert!(new_solver("gurobi").is_err());
/// ```
pub fn new_solver(provider: &str) -> Result<Box<dyn MipSolver>, MipError> {
    Ok(provider.parse::<Provider>()?.solver())
}
