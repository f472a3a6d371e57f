//! MIP model definition.

use super::error::MipError;
use super::variables::{VarId, VarKind, Variable};

/// Relation between the left-hand side of a constraint and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintSense {
    /// `lhs == rhs`
    Equal,
    /// `lhs <= rhs`
    LessThanOrEqual,
    /// `lhs >= rhs`
    GreaterThanOrEqual,
}

impl ConstraintSense {
    /// Whether `lhs` relates to `rhs` as required, within `tolerance`.
    pub fn holds(self, lhs: f64, rhs: f64, tolerance: f64) -> bool {
        match self {
            ConstraintSense::Equal => (lhs - rhs).abs() <= tolerance,
            ConstraintSense::LessThanOrEqual => lhs <= rhs + tolerance,
            ConstraintSense::GreaterThanOrEqual => lhs >= rhs - tolerance,
        }
    }
}

fn value_of(values: &[f64], var: VarId) -> f64 {
    values.get(var.0).copied().unwrap_or(0.0)
}

/// A linear constraint `Σ coeff·var  (==|<=|>=)  rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Name used in diagnostics.
    pub name: String,
    /// `(variable, coefficient)` terms. A variable appears at most once.
    pub terms: Vec<(VarId, f64)>,
    /// Relation to the right-hand side.
    pub sense: ConstraintSense,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Creates an empty constraint.
    pub fn new(name: impl Into<String>, sense: ConstraintSense, rhs: f64) -> Self {
        Self {
            name: name.into(),
            terms: Vec::new(),
            sense,
            rhs,
        }
    }

    /// Adds a term. Coefficients for a variable that is already present are
    /// accumulated into the existing term.
    pub fn add_term(&mut self, coefficient: f64, var: VarId) {
        match self.terms.iter_mut().find(|(v, _)| *v == var) {
            Some((_, c)) => *c += coefficient,
            None => self.terms.push((var, coefficient)),
        }
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn with_term(mut self, coefficient: f64, var: VarId) -> Self {
        self.add_term(coefficient, var);
        self
    }

    /// Evaluates the left-hand side for the given variable values.
    ///
    /// Variables past the end of `values` count as 0.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(v, c)| c * value_of(values, *v)).sum()
    }

    /// Whether the constraint is satisfied by `values`, within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        self.sense.holds(self.lhs(values), self.rhs, tolerance)
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveSense {
    #[default]
    Minimize,
    Maximize,
}

/// Linear objective function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objective {
    /// Direction.
    pub sense: ObjectiveSense,
    /// `(variable, coefficient)` terms. Repeated variables are summed.
    pub terms: Vec<(VarId, f64)>,
}

impl Objective {
    /// Evaluates the objective for the given variable values.
    ///
    /// Variables past the end of `values` count as 0.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms.iter().map(|(v, c)| c * value_of(values, *v)).sum()
    }

    /// Objective coefficient per variable, with repeated terms summed.
    pub fn dense_coefficients(&self, num_vars: usize) -> Vec<f64> {
        let mut coeffs = vec![0.0; num_vars];
        for (v, c) in &self.terms {
            coeffs[v.0] += c;
        }
        coeffs
    }
}

/// A mixed-integer linear program.
///
/// Contains variables, linear constraints and a linear objective.
///
/// # Examples
///
/// ```
/// use u_fulfill::mip::{ConstraintSense, LinearConstraint, MipModel};
///
/// let mut model = MipModel::new("example");
/// let x = model.add_binary("x");
/// let y = model.add_continuous("y", 0.0, 10.0);
/// model.add_constraint(
///     LinearConstraint::new("link", ConstraintSense::Equal, 0.0)
///         .with_term(-1.0, y)
///         .with_term(2.5, x),
/// );
/// model.minimize();
/// model.add_objective_term(3.0, y);
/// assert!(model.validate().is_ok());
/// assert_eq!(model.variable_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MipModel {
    /// Model name.
    pub name: String,
    /// Variables, indexed by [`VarId`].
    pub variables: Vec<Variable>,
    /// Constraints.
    pub constraints: Vec<LinearConstraint>,
    /// Objective function.
    pub objective: Objective,
}

impl MipModel {
    /// Creates a new empty model (minimization by default).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a variable and returns its id.
    pub fn add_variable(&mut self, var: Variable) -> VarId {
        self.variables.push(var);
        VarId(self.variables.len() - 1)
    }

    /// Convenience: add a binary variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(Variable::binary(name))
    }

    /// Convenience: add an integer variable.
    pub fn add_integer(&mut self, name: impl Into<String>, lower: i32, upper: i32) -> VarId {
        self.add_variable(Variable::integer(name, lower, upper))
    }

    /// Convenience: add a continuous variable.
    pub fn add_continuous(&mut self, name: impl Into<String>, lower: f64, upper: f64) -> VarId {
        self.add_variable(Variable::continuous(name, lower, upper))
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// Sets the objective direction to minimization.
    pub fn minimize(&mut self) {
        self.objective.sense = ObjectiveSense::Minimize;
    }

    /// Sets the objective direction to maximization.
    pub fn maximize(&mut self) {
        self.objective.sense = ObjectiveSense::Maximize;
    }

    /// Adds `coefficient · var` to the objective.
    pub fn add_objective_term(&mut self, coefficient: f64, var: VarId) {
        self.objective.terms.push((var, coefficient));
    }

    /// Returns the variable behind an id.
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Whether any variable must take integral values.
    pub fn has_integer_vars(&self) -> bool {
        self.variables.iter().any(|v| v.kind.is_integral())
    }

    /// Validates the model for consistency.
    ///
    /// Checks that all referenced variables exist, bounds are ordered,
    /// every number is finite where it must be and no constraint lists the
    /// same variable twice.
    pub fn validate(&self) -> Result<(), MipError> {
        for var in &self.variables {
            if var.lower.is_nan() || var.upper.is_nan() || var.lower > var.upper {
                return Err(MipError::InvalidModel(format!(
                    "variable {} has invalid bounds [{}, {}]",
                    var.name, var.lower, var.upper
                )));
            }
        }

        let n = self.variables.len();
        for constraint in &self.constraints {
            if !constraint.rhs.is_finite() {
                return Err(MipError::InvalidModel(format!(
                    "constraint {} has non-finite rhs {}",
                    constraint.name, constraint.rhs
                )));
            }
            let mut seen = vec![false; n];
            for (var, coeff) in &constraint.terms {
                if var.0 >= n {
                    return Err(MipError::InvalidModel(format!(
                        "constraint {} references undefined variable {var}",
                        constraint.name
                    )));
                }
                if !coeff.is_finite() {
                    return Err(MipError::InvalidModel(format!(
                        "constraint {} has non-finite coefficient for {}",
                        constraint.name, self.variables[var.0].name
                    )));
                }
                if std::mem::replace(&mut seen[var.0], true) {
                    return Err(MipError::InvalidModel(format!(
                        "constraint {} lists {} twice",
                        constraint.name, self.variables[var.0].name
                    )));
                }
            }
        }

        for (var, coeff) in &self.objective.terms {
            if var.0 >= n {
                return Err(MipError::InvalidModel(format!(
                    "objective references undefined variable {var}"
                )));
            }
            if !coeff.is_finite() {
                return Err(MipError::InvalidModel(format!(
                    "objective has non-finite coefficient for {}",
                    self.variables[var.0].name
                )));
            }
        }
        Ok(())
    }

    /// Names of the variables and constraints violated by `values`.
    ///
    /// A short `values` slice is padded with zeros, so a missing value is
    /// reported only when 0 lies outside the variable's bounds or breaks a
    /// constraint.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<String> {
        let mut violated: Vec<String> = self
            .variables
            .iter()
            .enumerate()
            .filter(|&(i, var)| !var.admits(value_of(values, VarId(i)), tolerance))
            .map(|(_, var)| var.name.clone())
            .collect();
        violated.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(values, tolerance))
                .map(|c| c.name.clone()),
        );
        violated
    }

    /// Counts variables per domain as `(binary, integer, continuous)`.
    pub fn kind_counts(&self) -> (usize, usize, usize) {
        self.variables
            .iter()
            .fold((0, 0, 0), |(b, i, c), var| match var.kind {
                VarKind::Binary => (b + 1, i, c),
                VarKind::Integer => (b, i + 1, c),
                VarKind::Continuous => (b, i, c + 1),
            })
    }
}
