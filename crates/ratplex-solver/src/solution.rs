use num_traits::Zero;

use crate::problem::{ConstraintOp, ProblemSpec, Sense};
use crate::rational::{Rational, fraction_to_text};
use crate::tableau::{SLACK_PREFIX, Tableau};

/// Reserved solution key for the objective value
pub const OBJECTIVE_KEY: &str = "z";

/// How a solve ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An optimal basic feasible solution was found
    Optimal(Solution),
    /// The ratio test found no pivot row for `entering`
    Infeasible { entering: String },
}

/// Optimal values read from a terminal tableau
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Variable values in tableau column order; for minimization the
    /// recovered primal values (`x_*`) follow the dual ones
    values: Vec<(String, Rational)>,
    objective: Rational,
}

/// Information about a violated constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Zero-based constraint row
    pub row: usize,
    pub op: ConstraintOp,
    /// Required value (from constraint RHS)
    pub required: Rational,
    /// Actual value of `A·x` for the row
    pub actual: Rational,
    /// Human-readable description of what's wrong
    pub description: String,
}

impl Solution {
    pub fn objective(&self) -> &Rational {
        &self.objective
    }

    /// Look up a variable, or the objective under [`OBJECTIVE_KEY`]
    pub fn get(&self, name: &str) -> Option<&Rational> {
        if name == OBJECTIVE_KEY {
            return Some(&self.objective);
        }
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Rational)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Values of `x_1..x_n`, zero for any not present
    pub fn primal_values(&self, n: usize) -> Vec<Rational> {
        (1..=n)
            .map(|k| self.get(&format!("x_{k}")).cloned().unwrap_or_else(Rational::zero))
            .collect()
    }

    /// Substitute the primal values into every constraint of `spec`
    pub fn check_feasibility(&self, spec: &ProblemSpec) -> Vec<ConstraintViolation> {
        let x = self.primal_values(spec.num_variables());
        let mut violations = Vec::new();

        for (row, ((coefficients, rhs), op)) in spec.a.iter().zip(&spec.b).zip(spec.resolved_ops()).enumerate() {
            let lhs = coefficients
                .iter()
                .zip(&x)
                .fold(Rational::zero(), |acc, (a, v)| acc + a * v);

            if !op.holds(&lhs, rhs) {
                violations.push(ConstraintViolation {
                    row,
                    op,
                    description: format!(
                        "constraint {} requires {} {} but got {}",
                        row + 1,
                        op,
                        fraction_to_text(rhs),
                        fraction_to_text(&lhs)
                    ),
                    required: rhs.clone(),
                    actual: lhs,
                });
            }
        }

        violations
    }
}

/// Read the basic solution out of a terminal tableau.
///
/// Basic variables take their row's right-hand side, all others are zero.
/// For minimization the tableau holds the dual problem, so the primal values
/// are the objective row entries under the slack columns.
pub fn extract_solution(tableau: &Tableau, sense: Sense) -> Solution {
    let mut values: Vec<(String, Rational)> = tableau
        .variable_names()
        .iter()
        .map(|name| (name.clone(), tableau.value_of(name)))
        .collect();

    if sense == Sense::Min {
        let objective_row = tableau.objective_row();
        let slack_prefix = format!("{SLACK_PREFIX}_");
        for (col, name) in tableau.variable_names().iter().enumerate() {
            if let Some(k) = name.strip_prefix(&slack_prefix) {
                values.push((format!("x_{k}"), objective_row[col].clone()));
            }
        }
    }

    Solution {
        values,
        objective: tableau.objective_value().clone(),
    }
}
