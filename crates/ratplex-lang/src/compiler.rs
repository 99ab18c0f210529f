use log::debug;
use ratplex_solver::{ConstraintOp, ProblemSpec, Rational, Sense, SolveError};
use thiserror::Error;

use crate::ast::*;
use crate::parser::{ParseError, Parser};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
    #[error("Field given more than once: {0}")]
    DuplicateField(String),
    #[error("Unknown field: {0} (expected A, b, c, or ops)")]
    UnknownField(String),
    #[error("{0} must be a list of rows of numbers, found {1}")]
    NotAMatrix(String, &'static str),
    #[error("{0} must be a list of numbers, found {1}")]
    NotAVector(String, &'static str),
    #[error("{0} must be a list of <=, >=, or =")]
    NotAnOperator(String),
    #[error(transparent)]
    Solver(#[from] SolveError),
}

/// Compiler for turning a parsed problem file into a [`ProblemSpec`]
#[derive(Debug, Default)]
pub struct Compiler {
    sense: Option<Sense>,
    a: Option<Vec<Vec<Rational>>>,
    b: Option<Vec<Rational>>,
    c: Option<Vec<Rational>>,
    ops: Option<Vec<ConstraintOp>>,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a program; the sense defaults to `max`
    pub fn compile(program: &Program) -> Result<ProblemSpec, CompileError> {
        let mut compiler = Compiler::new();
        compiler.load(program)?;
        compiler.finish()
    }

    /// Parse and compile a problem file
    pub fn compile_source(source: &str) -> Result<ProblemSpec, CompileError> {
        let program = Parser::parse(source)?;
        Self::compile(&program)
    }

    /// Compile bare literals, as given on a command line
    pub fn compile_literals(
        a: &str,
        b: &str,
        c: &str,
        ops: Option<&str>,
        sense: Sense,
    ) -> Result<ProblemSpec, CompileError> {
        let mut compiler = Compiler::new();
        compiler.sense = Some(sense);
        compiler.assign("A", &Parser::parse_value(a)?)?;
        compiler.assign("b", &Parser::parse_value(b)?)?;
        compiler.assign("c", &Parser::parse_value(c)?)?;
        if let Some(ops) = ops {
            compiler.assign("ops", &Parser::parse_value(ops)?)?;
        }
        compiler.finish()
    }

    pub fn load(&mut self, program: &Program) -> Result<(), CompileError> {
        for item in &program.items {
            match item {
                Item::Sense(decl) => {
                    if self.sense.replace(decl.sense).is_some() {
                        return Err(CompileError::DuplicateField("sense".to_string()));
                    }
                }
                Item::Assign(assignment) => self.assign(&assignment.name, &assignment.value)?,
            }
        }
        Ok(())
    }

    fn assign(&mut self, name: &str, value: &Value) -> Result<(), CompileError> {
        let duplicate = match name {
            "A" | "a" => {
                let matrix = value
                    .as_matrix()
                    .ok_or_else(|| CompileError::NotAMatrix(name.to_string(), value.kind_name()))?;
                self.a.replace(matrix).is_some()
            }
            "b" => self.b.replace(vector(name, value)?).is_some(),
            "c" => self.c.replace(vector(name, value)?).is_some(),
            "ops" => {
                let ops = value
                    .as_ops()
                    .ok_or_else(|| CompileError::NotAnOperator(name.to_string()))?;
                self.ops.replace(ops).is_some()
            }
            other => return Err(CompileError::UnknownField(other.to_string())),
        };
        if duplicate {
            return Err(CompileError::DuplicateField(name.to_string()));
        }
        Ok(())
    }

    fn finish(self) -> Result<ProblemSpec, CompileError> {
        let a = self.a.ok_or(CompileError::MissingField("A"))?;
        let b = self.b.ok_or(CompileError::MissingField("b"))?;
        let c = self.c.ok_or(CompileError::MissingField("c"))?;
        let sense = self.sense.unwrap_or_default();

        let spec = ProblemSpec::new(a, b, c, sense).with_ops(self.ops.unwrap_or_default());
        spec.validate()?;

        debug!(
            "compiled {} problem with {} constraints and {} variables",
            spec.sense,
            spec.num_constraints(),
            spec.num_variables()
        );
        Ok(spec)
    }
}

fn vector(name: &str, value: &Value) -> Result<Vec<Rational>, CompileError> {
    value
        .as_vector()
        .ok_or_else(|| CompileError::NotAVector(name.to_string(), value.kind_name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratplex_solver::{Solver, ratio, rational};

    #[test]
    fn test_compile_simple_problem() {
        let source = r#"
            max
            A = [[2, 1], [1, 2]]
            b = [4, 3]
            c = [1, 1]
        "#;
        let spec = Compiler::compile_source(source).unwrap();
        assert_eq!(spec, ProblemSpec::from_integers(&[[2, 1], [1, 2]], &[4, 3], &[1, 1], Sense::Max));
    }

    #[test]
    fn test_compile_and_solve() {
        let source = r#"
            min  # cheapest mix
            A = [[1, 1], [1, 3]]
            b = [4, 6]
            c = [2, 3]
            ops = [>=, >=]
        "#;
        let spec = Compiler::compile_source(source).unwrap();
        assert_eq!(spec.sense, Sense::Min);
        assert_eq!(spec.ops, vec![ConstraintOp::Ge; 2]);

        let report = Solver::new().solve(&spec).unwrap();
        let solution = report.solution().unwrap();
        assert_eq!(solution.objective(), &rational(9));
    }

    #[test]
    fn test_sense_defaults_to_max() {
        let spec = Compiler::compile_source("A = [[1, 1]]\nb = [2]\nc = [3, 2]").unwrap();
        assert_eq!(spec.sense, Sense::Max);
    }

    #[test]
    fn test_compile_literals() {
        let spec = Compiler::compile_literals("[[1, 1/2]]", "[3/2]", "[1, 1]", Some("[<=]"), Sense::Max).unwrap();
        assert_eq!(spec.a, vec![vec![rational(1), ratio(1, 2)]]);
        assert_eq!(spec.b, vec![ratio(3, 2)]);
        assert_eq!(spec.ops, vec![ConstraintOp::Le]);
    }

    #[test]
    fn test_missing_field() {
        let err = Compiler::compile_source("A = [[1]]\nb = [1]").unwrap_err();
        assert_eq!(err, CompileError::MissingField("c"));
    }

    #[test]
    fn test_duplicate_fields() {
        let err = Compiler::compile_source("b = [1]\nb = [2]").unwrap_err();
        assert_eq!(err, CompileError::DuplicateField("b".to_string()));
        let err = Compiler::compile_source("max\nmin").unwrap_err();
        assert_eq!(err, CompileError::DuplicateField("sense".to_string()));
    }

    #[test]
    fn test_wrong_shapes() {
        assert!(matches!(
            Compiler::compile_source("A = [1, 2]"),
            Err(CompileError::NotAMatrix(_, _))
        ));
        assert!(matches!(
            Compiler::compile_source("b = 4"),
            Err(CompileError::NotAVector(_, "number"))
        ));
        assert!(matches!(
            Compiler::compile_source("ops = [1]"),
            Err(CompileError::NotAnOperator(_))
        ));
        assert!(matches!(
            Compiler::compile_source("d = [1]"),
            Err(CompileError::UnknownField(_))
        ));
    }

    #[test]
    fn test_dimension_mismatch_surfaces() {
        let err = Compiler::compile_source("A = [[2, 1], [1, 2]]\nb = [4, 3, 1]\nc = [1, 1]").unwrap_err();
        assert!(matches!(err, CompileError::Solver(SolveError::DimensionMismatch(_))));
    }

    #[test]
    fn test_parse_errors_surface() {
        assert!(matches!(
            Compiler::compile_source("A = [[1, 2]"),
            Err(CompileError::Parse(_))
        ));
    }
}
