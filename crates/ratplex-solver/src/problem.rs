use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::error::SolveError;
use crate::matrix::Matrix;
use crate::rational::{Rational, rational};

/// Direction of the objective
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    Max,
    Min,
}

impl Sense {
    /// Operator assumed for every row when none is given
    pub fn default_op(self) -> ConstraintOp {
        match self {
            Sense::Max => ConstraintOp::Le,
            Sense::Min => ConstraintOp::Ge,
        }
    }

    /// Prefix of the decision variables in the tableau built for this sense
    pub fn variable_prefix(self) -> &'static str {
        match self {
            Sense::Max => "x",
            Sense::Min => "y",
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Max => f.write_str("max"),
            Sense::Min => f.write_str("min"),
        }
    }
}

impl FromStr for Sense {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" => Ok(Sense::Max),
            "min" | "minimize" => Ok(Sense::Min),
            other => Err(SolveError::UnknownSense(other.to_string())),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Ge,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "=", alias = "=="))]
    Eq,
}

impl ConstraintOp {
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintOp::Le => "<=",
            ConstraintOp::Ge => ">=",
            ConstraintOp::Eq => "=",
        }
    }

    /// Whether `lhs <op> rhs` holds exactly
    pub fn holds(self, lhs: &Rational, rhs: &Rational) -> bool {
        match self {
            ConstraintOp::Le => lhs <= rhs,
            ConstraintOp::Ge => lhs >= rhs,
            ConstraintOp::Eq => lhs == rhs,
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ConstraintOp {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<=" => Ok(ConstraintOp::Le),
            ">=" => Ok(ConstraintOp::Ge),
            "=" | "==" => Ok(ConstraintOp::Eq),
            other => Err(SolveError::UnknownOperator(other.to_string())),
        }
    }
}

/// Caller-supplied linear program: optimize `c·x` subject to `A·x <op> b`, `x >= 0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemSpec {
    /// Constraint matrix, one row per constraint
    pub a: Vec<Vec<Rational>>,
    /// Right-hand sides
    pub b: Vec<Rational>,
    /// Objective coefficients
    pub c: Vec<Rational>,
    pub sense: Sense,
    /// Per-row operators; empty means every row uses `sense.default_op()`
    pub ops: Vec<ConstraintOp>,
}

impl ProblemSpec {
    pub fn new(a: Vec<Vec<Rational>>, b: Vec<Rational>, c: Vec<Rational>, sense: Sense) -> Self {
        Self {
            a,
            b,
            c,
            sense,
            ops: Vec::new(),
        }
    }

    /// Convenience constructor for integer data
    pub fn from_integers<R: AsRef<[i64]>>(a: &[R], b: &[i64], c: &[i64], sense: Sense) -> Self {
        let to_rationals = |values: &[i64]| values.iter().map(|&v| rational(v)).collect::<Vec<_>>();
        Self::new(
            a.iter().map(|row| to_rationals(row.as_ref())).collect(),
            to_rationals(b),
            to_rationals(c),
            sense,
        )
    }

    pub fn with_ops(mut self, ops: Vec<ConstraintOp>) -> Self {
        self.ops = ops;
        self
    }

    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    pub fn num_variables(&self) -> usize {
        self.c.len()
    }

    /// Operators with the sense default filled in
    pub fn resolved_ops(&self) -> Vec<ConstraintOp> {
        if self.ops.is_empty() {
            vec![self.sense.default_op(); self.b.len()]
        } else {
            self.ops.clone()
        }
    }

    /// Check that `A` is m×n, `b` has length m, `c` has length n
    pub fn validate(&self) -> Result<(), SolveError> {
        let m = self.b.len();
        let n = self.c.len();

        if self.a.len() != m {
            return Err(SolveError::DimensionMismatch(format!(
                "A has {} rows but b has {} entries",
                self.a.len(),
                m
            )));
        }
        for (i, row) in self.a.iter().enumerate() {
            if row.len() != n {
                return Err(SolveError::DimensionMismatch(format!(
                    "row {} of A has {} entries but c has {}",
                    i + 1,
                    row.len(),
                    n
                )));
            }
        }
        if !self.ops.is_empty() && self.ops.len() != m {
            return Err(SolveError::DimensionMismatch(format!(
                "{} constraint operators given for {} constraints",
                self.ops.len(),
                m
            )));
        }
        Ok(())
    }

    /// Rewrite every row to use the sense's default operator.
    ///
    /// Rows in the opposite direction are negated; `=` rows become a `<=`/`>=` pair.
    pub fn canonical(&self) -> Result<ProblemSpec, SolveError> {
        self.validate()?;
        let target = self.sense.default_op();
        let mut a = Vec::with_capacity(self.a.len());
        let mut b = Vec::with_capacity(self.b.len());

        for ((row, rhs), op) in self.a.iter().zip(&self.b).zip(self.resolved_ops()) {
            let negated = || (row.iter().map(|v| -v).collect::<Vec<_>>(), -rhs);
            match op {
                op if op == target => {
                    a.push(row.clone());
                    b.push(rhs.clone());
                }
                ConstraintOp::Eq => {
                    a.push(row.clone());
                    b.push(rhs.clone());
                    let (row, rhs) = negated();
                    a.push(row);
                    b.push(rhs);
                }
                _ => {
                    let (row, rhs) = negated();
                    a.push(row);
                    b.push(rhs);
                }
            }
        }

        let ops = vec![target; b.len()];
        Ok(ProblemSpec {
            a,
            b,
            c: self.c.clone(),
            sense: self.sense,
            ops,
        })
    }

    /// Transpose-based duality transform.
    ///
    /// Forms `[A | b]` with `[c | 0]` appended, transposes it, and reads the
    /// maximization problem back out of the transposed blocks.
    pub fn dual(&self) -> Result<ProblemSpec, SolveError> {
        self.validate()?;
        let m = self.b.len();
        let n = self.c.len();

        let mut augmented = Matrix::zeros(m + 1, n + 1);
        for (i, (row, rhs)) in self.a.iter().zip(&self.b).enumerate() {
            for (j, value) in row.iter().enumerate() {
                augmented[(i, j)] = value.clone();
            }
            augmented[(i, n)] = rhs.clone();
        }
        for (j, value) in self.c.iter().enumerate() {
            augmented[(m, j)] = value.clone();
        }

        let transposed = augmented.transpose();
        let a = (0..n).map(|i| transposed.row(i)[..m].to_vec()).collect();
        let b = (0..n).map(|i| transposed[(i, m)].clone()).collect();
        let c = transposed.row(n)[..m].to_vec();

        Ok(ProblemSpec {
            a,
            b,
            c,
            sense: Sense::Max,
            ops: vec![ConstraintOp::Le; n],
        })
    }
}

/// Maximization-form problem handed to the tableau builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedProblem {
    pub a: Vec<Vec<Rational>>,
    pub b: Vec<Rational>,
    pub c: Vec<Rational>,
    /// Sense of the problem as the caller posed it
    pub sense: Sense,
    /// Number of decision variables in the caller's problem
    pub variable_count: usize,
    /// Operators of the caller's rows, defaults filled in
    pub source_ops: Vec<ConstraintOp>,
    /// Operators of the maximization form (always `<=`)
    pub ops: Vec<ConstraintOp>,
}

/// Convert a problem into the canonical maximization form.
///
/// Minimization problems are replaced by their dual.
pub fn normalize(spec: &ProblemSpec) -> Result<NormalizedProblem, SolveError> {
    let canonical = spec.canonical()?;
    let source_ops = spec.resolved_ops();

    let max_form = match spec.sense {
        Sense::Max => canonical,
        Sense::Min => canonical.dual()?,
    };

    debug!(
        "normalized {} problem: {} constraints, {} variables (max form {}x{})",
        spec.sense,
        spec.num_constraints(),
        spec.num_variables(),
        max_form.b.len(),
        max_form.c.len(),
    );

    Ok(NormalizedProblem {
        ops: vec![ConstraintOp::Le; max_form.b.len()],
        a: max_form.a,
        b: max_form.b,
        c: max_form.c,
        sense: spec.sense,
        variable_count: spec.num_variables(),
        source_ops,
    })
}

impl NormalizedProblem {
    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    pub fn num_variables(&self) -> usize {
        self.c.len()
    }
}
