//! MIP variable types.

use std::fmt;

/// Dense index of a variable inside a [`MipModel`](super::MipModel).
///
/// Ids are handed out in creation order and are only meaningful for the
/// model that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in the model's variable list.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// 0/1 decision.
    Binary,
    /// Integer within `[lower, upper]`.
    Integer,
    /// Real within `[lower, upper]`.
    Continuous,
}

impl VarKind {
    /// Whether values of this kind must be integral.
    pub fn is_integral(self) -> bool {
        matches!(self, VarKind::Binary | VarKind::Integer)
    }
}

/// A decision variable with a name, a domain and bounds.
///
/// # Examples
///
/// ```
/// use u_fulfill::mip::{Variable, VarKind};
///
/// let x = Variable::binary("x");
/// assert_eq!(x.kind, VarKind::Binary);
/// assert_eq!((x.lower, x.upper), (0.0, 1.0));
///
/// let c = Variable::continuous("cartons", 0.0, 1000.0);
/// assert!(!c.kind.is_integral());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name (unique by convention, used in diagnostics).
    pub name: String,
    /// Domain.
    pub kind: VarKind,
    /// Lower bound (inclusive).
    pub lower: f64,
    /// Upper bound (inclusive).
    pub upper: f64,
}

impl Variable {
    /// Creates a binary variable.
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Creates an integer variable within `[lower, upper]`.
    pub fn integer(name: impl Into<String>, lower: i32, upper: i32) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Integer,
            lower: lower as f64,
            upper: upper as f64,
        }
    }

    /// Creates a continuous variable within `[lower, upper]`.
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Continuous,
            lower,
            upper,
        }
    }

    /// Whether `value` lies within the bounds (with tolerance) and is
    /// integral when the domain requires it.
    pub fn admits(&self, value: f64, tolerance: f64) -> bool {
        if value < self.lower - tolerance || value > self.upper + tolerance {
            return false;
        }
        !self.kind.is_integral() || (value - value.round()).abs() <= tolerance
    }
}
