mod error;
mod matrix;
mod problem;
mod rational;
mod simplex;
mod solution;
mod tableau;

#[cfg(test)]
mod proptests;

pub use error::SolveError;
pub use matrix::Matrix;
pub use problem::{ConstraintOp, NormalizedProblem, ProblemSpec, Sense, normalize};
pub use rational::{ParseRationalError, Rational, fraction_to_text, parse_rational, ratio, rational};
pub use simplex::{EngineRun, EngineState, Pivot, PivotRule, SolveReport, Solver, Step};
pub use solution::{ConstraintViolation, OBJECTIVE_KEY, Outcome, Solution, extract_solution};
pub use tableau::{RHS_NAME, SLACK_PREFIX, Tableau};
