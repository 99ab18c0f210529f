use num_traits::{One, Zero};

use crate::error::SolveError;
use crate::matrix::Matrix;
use crate::problem::NormalizedProblem;
use crate::rational::Rational;

/// Name of the right-hand side column
pub const RHS_NAME: &str = "b";
/// Prefix of slack variable names
pub const SLACK_PREFIX: &str = "s";

/// Simplex tableau: constraint rows, then the objective row.
///
/// Columns are the decision variables, the slack variables and finally the
/// right-hand side. `entering` names every column (the last one is
/// [`RHS_NAME`]); `departing` names the basic variable of each constraint row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tableau {
    pub(crate) cells: Matrix,
    pub(crate) entering: Vec<String>,
    pub(crate) departing: Vec<String>,
}

impl Tableau {
    /// Build the initial tableau with slack variables forming the basis
    pub fn build(problem: &NormalizedProblem) -> Self {
        let m = problem.num_constraints();
        let n = problem.num_variables();
        let slack = Matrix::identity(m);
        let mut cells = Matrix::zeros(m + 1, n + m + 1);

        for (i, (row, rhs)) in problem.a.iter().zip(&problem.b).enumerate() {
            let target = cells.row_mut(i);
            target[..n].clone_from_slice(row);
            target[n..n + m].clone_from_slice(slack.row(i));
            target[n + m] = rhs.clone();
        }

        let objective = cells.row_mut(m);
        for (cell, coef) in objective.iter_mut().zip(&problem.c) {
            *cell = -coef;
        }

        let prefix = problem.sense.variable_prefix();
        let slack_names: Vec<String> = (1..=m).map(|k| format!("{SLACK_PREFIX}_{k}")).collect();
        let mut entering: Vec<String> = (1..=n).map(|k| format!("{prefix}_{k}")).collect();
        entering.extend(slack_names.iter().cloned());
        entering.push(RHS_NAME.to_string());

        Self {
            cells,
            entering,
            departing: slack_names,
        }
    }

    /// Assemble a tableau from its parts, checking the shapes agree and that
    /// `departing` names a basis (see [`Tableau::basis_holds`]).
    pub fn from_parts(
        cells: Matrix,
        entering: Vec<String>,
        departing: Vec<String>,
    ) -> Result<Self, SolveError> {
        if cells.nrows() == 0 || cells.ncols() == 0 {
            return Err(SolveError::DimensionMismatch(
                "a tableau needs an objective row and a right-hand side column".to_string(),
            ));
        }
        if entering.len() != cells.ncols() {
            return Err(SolveError::DimensionMismatch(format!(
                "{} column names for {} columns",
                entering.len(),
                cells.ncols()
            )));
        }
        if departing.len() != cells.nrows() - 1 {
            return Err(SolveError::DimensionMismatch(format!(
                "{} basic variables for {} constraint rows",
                departing.len(),
                cells.nrows() - 1
            )));
        }
        let tableau = Self {
            cells,
            entering,
            departing,
        };
        if !tableau.basis_holds() {
            return Err(SolveError::InvalidBasis(tableau.departing.join(", ")));
        }
        Ok(tableau)
    }

    pub fn cells(&self) -> &Matrix {
        &self.cells
    }

    /// Column names, ending with [`RHS_NAME`]
    pub fn entering(&self) -> &[String] {
        &self.entering
    }

    /// Basic variable of each constraint row
    pub fn departing(&self) -> &[String] {
        &self.departing
    }

    /// Column names without the right-hand side
    pub fn variable_names(&self) -> &[String] {
        &self.entering[..self.rhs_column()]
    }

    pub fn constraint_count(&self) -> usize {
        self.cells.nrows() - 1
    }

    pub fn column_count(&self) -> usize {
        self.cells.ncols()
    }

    pub fn rhs_column(&self) -> usize {
        self.cells.ncols() - 1
    }

    pub fn rhs(&self, row: usize) -> &Rational {
        &self.cells[(row, self.rhs_column())]
    }

    pub fn objective_row(&self) -> &[Rational] {
        self.cells.row(self.constraint_count())
    }

    /// Current objective value (right-hand side of the objective row)
    pub fn objective_value(&self) -> &Rational {
        self.rhs(self.constraint_count())
    }

    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.entering.iter().position(|n| n == name)
    }

    /// Value of a variable in the current basic solution
    pub fn value_of(&self, name: &str) -> Rational {
        match self.departing.iter().position(|n| n == name) {
            Some(row) => self.rhs(row).clone(),
            None => Rational::zero(),
        }
    }

    /// Whether every basic column is a unit vector with its 1 in its own row
    pub fn basis_holds(&self) -> bool {
        self.departing.iter().enumerate().all(|(row, name)| {
            let Some(col) = self.column_of(name) else {
                return false;
            };
            (0..self.cells.nrows()).all(|i| {
                let cell = &self.cells[(i, col)];
                if i == row { cell.is_one() } else { cell.is_zero() }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ProblemSpec, Sense, normalize};
    use crate::rational::rational;

    fn build(spec: &ProblemSpec) -> Tableau {
        Tableau::build(&normalize(spec).unwrap())
    }

    #[test]
    fn test_initial_tableau_layout() {
        let spec = ProblemSpec::from_integers(&[[2, 1], [1, 2]], &[4, 3], &[1, 1], Sense::Max);
        let tableau = build(&spec);

        let expected = Matrix::from_rows(
            [
                [2, 1, 1, 0, 4],
                [1, 2, 0, 1, 3],
                [-1, -1, 0, 0, 0],
            ]
            .iter()
            .map(|row| row.iter().map(|&v| rational(v)).collect())
            .collect(),
        )
        .unwrap();
        assert_eq!(tableau.cells(), &expected);
        assert_eq!(tableau.entering(), ["x_1", "x_2", "s_1", "s_2", "b"]);
        assert_eq!(tableau.departing(), ["s_1", "s_2"]);
        assert_eq!(tableau.variable_names(), ["x_1", "x_2", "s_1", "s_2"]);
        assert_eq!(tableau.objective_value(), &rational(0));
        assert!(tableau.basis_holds());
    }

    #[test]
    fn test_min_tableau_uses_dual_names() {
        let spec = ProblemSpec::from_integers(&[[1, 2, 3]], &[5], &[7, 8, 9], Sense::Min);
        let tableau = build(&spec);
        assert_eq!(tableau.entering(), ["y_1", "s_1", "s_2", "s_3", "b"]);
        assert_eq!(tableau.departing(), ["s_1", "s_2", "s_3"]);
        assert_eq!(tableau.rhs(2), &rational(9));
        assert_eq!(tableau.objective_row()[0], rational(-5));
    }

    #[test]
    fn test_initial_values() {
        let spec = ProblemSpec::from_integers(&[[1, 1]], &[2], &[3, 2], Sense::Max);
        let tableau = build(&spec);
        assert_eq!(tableau.value_of("s_1"), rational(2));
        assert_eq!(tableau.value_of("x_1"), rational(0));
        assert_eq!(tableau.column_of("b"), Some(3));
    }

    #[test]
    fn test_basis_violation_detected() {
        let spec = ProblemSpec::from_integers(&[[1, 1]], &[2], &[3, 2], Sense::Max);
        let mut tableau = build(&spec);
        tableau.departing[0] = "x_1".to_string();
        assert!(!tableau.basis_holds());
    }

    #[test]
    fn test_from_parts_checks_shapes() {
        let cells = Matrix::from_rows(vec![
            vec![rational(2), rational(1), rational(4)],
            vec![rational(-3), rational(0), rational(0)],
        ])
        .unwrap();
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(Tableau::from_parts(cells.clone(), names(&["x_1", "s_1", "b"]), names(&["s_1"])).is_ok());
        assert!(matches!(
            Tableau::from_parts(cells.clone(), names(&["x_1", "b"]), names(&["s_1"])),
            Err(SolveError::DimensionMismatch(_))
        ));
        assert!(matches!(
            Tableau::from_parts(cells, names(&["x_1", "s_1", "b"]), names(&[])),
            Err(SolveError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_from_parts_rejects_broken_basis() {
        let names = |v: &[&str]| v.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let err = Tableau::from_parts(Matrix::zeros(2, 3), names(&["x_1", "s_1", "b"]), names(&["s_1"])).unwrap_err();
        assert_eq!(err, SolveError::InvalidBasis("s_1".to_string()));

        let err = Tableau::from_parts(Matrix::identity(2), names(&["x_1", "b"]), names(&["y_1"])).unwrap_err();
        assert_eq!(err, SolveError::InvalidBasis("y_1".to_string()));
    }
}
