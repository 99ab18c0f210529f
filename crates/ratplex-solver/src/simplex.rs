use log::{debug, info, trace};
use num_traits::{Signed, Zero};

use crate::error::SolveError;
use crate::problem::{NormalizedProblem, ProblemSpec, normalize};
use crate::rational::{Rational, fraction_to_text};
use crate::solution::{Outcome, Solution, extract_solution};
use crate::tableau::Tableau;

/// Rule used to choose the entering and departing variables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most negative objective entry; minimum strictly positive ratio.
    /// Ties go to the lowest index. Can cycle on degenerate problems.
    #[default]
    MostNegative,
    /// Bland's rule: lowest-index negative objective entry; minimum
    /// non-negative ratio over positive entries, ties to the basic variable
    /// with the lowest column index. Never cycles.
    Bland,
}

/// State of the pivot loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Optimal,
    /// No row passed the ratio test for the entering column
    Infeasible,
}

/// One pivot: `entering` replaces `departing` as the basic variable of `row`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pivot {
    pub row: usize,
    pub column: usize,
    pub entering: String,
    pub departing: String,
}

/// Snapshot of the tableau. Step 0 is the initial tableau; every later step
/// holds the tableau produced by `pivot`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub tableau: Tableau,
    pub pivot: Option<Pivot>,
}

/// Terminal result of [`Solver::run`]
#[derive(Debug, Clone)]
pub struct EngineRun {
    pub state: EngineState,
    pub tableau: Tableau,
    pub steps: Vec<Step>,
    pub iterations: usize,
    /// Entering column that failed the ratio test, for an infeasible run
    pub blocked_column: Option<usize>,
}

/// Everything produced by solving one problem
#[derive(Debug, Clone)]
pub struct SolveReport {
    pub spec: ProblemSpec,
    pub normalized: NormalizedProblem,
    pub outcome: Outcome,
    pub steps: Vec<Step>,
    pub iterations: usize,
}

impl SolveReport {
    pub fn solution(&self) -> Option<&Solution> {
        match &self.outcome {
            Outcome::Optimal(solution) => Some(solution),
            Outcome::Infeasible { .. } => None,
        }
    }

    pub fn is_infeasible(&self) -> bool {
        matches!(self.outcome, Outcome::Infeasible { .. })
    }
}

/// Tableau simplex solver over exact rationals
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum number of pivots; `None` runs until a terminal state
    max_iterations: Option<usize>,
    pivot_rule: PivotRule,
    /// Whether to record a [`Step`] per pivot
    record_steps: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: None,
            pivot_rule: PivotRule::default(),
            record_steps: true,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    pub fn with_snapshots(mut self, record: bool) -> Self {
        self.record_steps = record;
        self
    }

    /// Normalize, build the tableau, pivot to a terminal state and extract the solution
    pub fn solve(&self, spec: &ProblemSpec) -> Result<SolveReport, SolveError> {
        let normalized = normalize(spec)?;
        let tableau = Tableau::build(&normalized);
        let run = self.run(tableau)?;

        let outcome = match run.state {
            EngineState::Optimal => Outcome::Optimal(extract_solution(&run.tableau, normalized.sense)),
            EngineState::Infeasible | EngineState::Running => Outcome::Infeasible {
                entering: run
                    .blocked_column
                    .map(|col| run.tableau.entering()[col].clone())
                    .unwrap_or_default(),
            },
        };

        Ok(SolveReport {
            spec: spec.clone(),
            normalized,
            outcome,
            steps: run.steps,
            iterations: run.iterations,
        })
    }

    /// Drive a tableau to `Optimal` or `Infeasible`
    pub fn run(&self, mut tableau: Tableau) -> Result<EngineRun, SolveError> {
        let mut steps = Vec::new();
        if self.record_steps {
            steps.push(Step {
                index: 0,
                tableau: tableau.clone(),
                pivot: None,
            });
        }

        let mut state = EngineState::Running;
        let mut iterations = 0;
        let mut blocked_column = None;

        while state == EngineState::Running {
            trace!("tableau before pivot {}: {:?}", iterations + 1, tableau.cells());

            if self.should_terminate(&tableau) {
                state = EngineState::Optimal;
                continue;
            }

            let col = self.entering_column(&tableau);
            let Some(row) = self.departing_row(&tableau, col) else {
                debug!(
                    "no row passes the ratio test for entering variable {}",
                    tableau.entering[col]
                );
                blocked_column = Some(col);
                state = EngineState::Infeasible;
                continue;
            };

            if let Some(limit) = self.max_iterations {
                if iterations >= limit {
                    return Err(SolveError::IterationLimitExceeded { limit });
                }
            }

            let pivot = Pivot {
                row,
                column: col,
                entering: tableau.entering[col].clone(),
                departing: tableau.departing[row].clone(),
            };
            debug!(
                "pivot {}: {} enters, {} departs (pivot element {})",
                iterations + 1,
                pivot.entering,
                pivot.departing,
                fraction_to_text(&tableau.cells[(row, col)]),
            );

            self.pivot(&mut tableau, row, col);
            iterations += 1;

            if self.record_steps {
                steps.push(Step {
                    index: iterations,
                    tableau: tableau.clone(),
                    pivot: Some(pivot),
                });
            }
        }

        info!(
            "simplex finished: {:?} after {} pivots, objective {}",
            state,
            iterations,
            fraction_to_text(tableau.objective_value()),
        );

        Ok(EngineRun {
            state,
            tableau,
            steps,
            iterations,
            blocked_column,
        })
    }

    /// Optimal once no objective entry (ignoring the right-hand side) is negative
    fn should_terminate(&self, tableau: &Tableau) -> bool {
        tableau.objective_row()[..tableau.rhs_column()]
            .iter()
            .all(|v| !v.is_negative())
    }

    /// Only called when at least one objective entry is negative
    fn entering_column(&self, tableau: &Tableau) -> usize {
        let objective = &tableau.objective_row()[..tableau.rhs_column()];
        let mut best = 0;

        match self.pivot_rule {
            PivotRule::MostNegative => {
                for (j, value) in objective.iter().enumerate() {
                    if value < &objective[best] {
                        best = j;
                    }
                }
            }
            PivotRule::Bland => {
                if let Some(j) = objective.iter().position(Signed::is_negative) {
                    best = j;
                }
            }
        }

        best
    }

    fn departing_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let mut best: Option<(usize, Rational)> = None;

        for row in 0..tableau.constraint_count() {
            let entry = &tableau.cells[(row, col)];
            if entry.is_zero() {
                continue;
            }
            let ratio = tableau.rhs(row) / entry;

            let eligible = match self.pivot_rule {
                PivotRule::MostNegative => ratio.is_positive(),
                PivotRule::Bland => entry.is_positive() && !ratio.is_negative(),
            };
            if !eligible {
                continue;
            }

            let replace = match &best {
                None => true,
                Some((_, min)) if ratio < *min => true,
                Some((current, min)) if ratio == *min => {
                    self.pivot_rule == PivotRule::Bland
                        && self.basic_column(tableau, row) < self.basic_column(tableau, *current)
                }
                Some(_) => false,
            };
            if replace {
                best = Some((row, ratio));
            }
        }

        best.map(|(row, _)| row)
    }

    fn basic_column(&self, tableau: &Tableau, row: usize) -> usize {
        tableau
            .column_of(&tableau.departing[row])
            .unwrap_or(usize::MAX)
    }

    /// Gauss-Jordan elimination around `(row, col)`
    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.cells.nrows();
        let n_cols = tableau.cells.ncols();

        // Scale pivot row
        let pivot_val = tableau.cells[(row, col)].clone();
        for cell in tableau.cells.row_mut(row) {
            *cell = &*cell / &pivot_val;
        }

        // Eliminate column in other rows
        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = tableau.cells[(i, col)].clone();
            if factor.is_zero() {
                continue;
            }
            for j in 0..n_cols {
                let delta = &factor * &tableau.cells[(row, j)];
                tableau.cells[(i, j)] -= delta;
            }
        }

        tableau.departing[row] = tableau.entering[col].clone();
    }
}
