use std::path::{Path, PathBuf};

use ratplex_lang::{CompileError, Compiler};
use ratplex_solver::{ConstraintOp, ParseRationalError, ProblemSpec, Rational, Sense, SolveError, parse_rational};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON problem: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Compile(#[from] CompileError),
    #[error("Invalid number {text:?}: {source}")]
    Number {
        text: String,
        source: ParseRationalError,
    },
    #[error("Expected a number or a string, found {0}")]
    NotANumber(String),
    #[error(transparent)]
    Solver(#[from] SolveError),
    #[error("No problem given: pass a FILE or all of -A, -b and -c")]
    MissingProblem,
}

/// JSON problem file
#[derive(Debug, Deserialize)]
struct ProblemFile {
    #[serde(default)]
    sense: Sense,
    #[serde(alias = "A")]
    a: Vec<Vec<Value>>,
    b: Vec<Value>,
    c: Vec<Value>,
    #[serde(default)]
    ops: Vec<ConstraintOp>,
}

/// A JSON number, or a string such as `"3/4"`.
///
/// With `arbitrary_precision` a number keeps its source digits, so it is
/// parsed exactly rather than through `f64`.
fn to_rational(value: &Value) -> Result<Rational, InputError> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => return Err(InputError::NotANumber(other.to_string())),
    };
    parse_rational(&text).map_err(|source| InputError::Number { text, source })
}

fn rationals(values: &[Value]) -> Result<Vec<Rational>, InputError> {
    values.iter().map(to_rational).collect()
}

pub fn problem_from_json(source: &str) -> Result<ProblemSpec, InputError> {
    let file: ProblemFile = serde_json::from_str(source)?;
    let a = file
        .a
        .iter()
        .map(|row| rationals(row))
        .collect::<Result<Vec<_>, _>>()?;
    let spec = ProblemSpec::new(a, rationals(&file.b)?, rationals(&file.c)?, file.sense).with_ops(file.ops);
    spec.validate()?;
    Ok(spec)
}

pub fn read_source(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a `.json` problem or a problem in the text format
pub fn load_problem(path: &Path) -> Result<ProblemSpec, InputError> {
    let source = read_source(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        problem_from_json(&source)
    } else {
        Ok(Compiler::compile_source(&source)?)
    }
}

/// Problem given either as a file or as command line literals
pub struct ProblemArgs<'a> {
    pub file: Option<&'a Path>,
    pub a: Option<&'a str>,
    pub b: Option<&'a str>,
    pub c: Option<&'a str>,
    pub ops: Option<&'a str>,
    pub minimize: bool,
}

pub fn load(args: &ProblemArgs<'_>) -> Result<ProblemSpec, InputError> {
    if let Some(file) = args.file {
        return load_problem(file);
    }
    let (Some(a), Some(b), Some(c)) = (args.a, args.b, args.c) else {
        return Err(InputError::MissingProblem);
    };
    let sense = if args.minimize { Sense::Min } else { Sense::Max };
    Ok(Compiler::compile_literals(a, b, c, args.ops, sense)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratplex_solver::{fraction_to_text, ratio, rational};

    #[test]
    fn test_json_problem() {
        let spec = problem_from_json(
            r#"{ "sense": "min", "A": [[1, 1], [1, 3]], "b": [4, "6"], "c": [2, 0.5], "ops": [">=", ">="] }"#,
        )
        .unwrap();
        assert_eq!(spec.sense, Sense::Min);
        assert_eq!(spec.b, vec![rational(4), rational(6)]);
        assert_eq!(spec.c, vec![rational(2), ratio(1, 2)]);
        assert_eq!(spec.ops, vec![ConstraintOp::Ge; 2]);
    }

    #[test]
    fn test_json_defaults_to_max() {
        let spec = problem_from_json(r#"{ "a": [["1/3"]], "b": [1], "c": [1] }"#).unwrap();
        assert_eq!(spec.sense, Sense::Max);
        assert_eq!(spec.a, vec![vec![ratio(1, 3)]]);
        assert!(spec.ops.is_empty());
    }

    #[test]
    fn test_json_numbers_keep_every_digit() {
        let spec = problem_from_json(
            r#"{ "a": [[1, 1]], "b": [9223372036854775809], "c": [0.30000000000000001, 1.5e3] }"#,
        )
        .unwrap();
        assert_eq!(fraction_to_text(&spec.b[0]), "9223372036854775809");
        assert_eq!(fraction_to_text(&spec.c[0]), "30000000000000001/100000000000000000");
        assert_eq!(spec.c[1], rational(1500));
    }

    #[test]
    fn test_json_errors() {
        assert!(matches!(
            problem_from_json(r#"{ "a": [[true]], "b": [1], "c": [1] }"#),
            Err(InputError::NotANumber(_))
        ));
        assert!(matches!(
            problem_from_json(r#"{ "a": [["x"]], "b": [1], "c": [1] }"#),
            Err(InputError::Number { .. })
        ));
        assert!(matches!(
            problem_from_json(r#"{ "a": [[1]], "b": [1, 2], "c": [1] }"#),
            Err(InputError::Solver(SolveError::DimensionMismatch(_)))
        ));
        assert!(matches!(problem_from_json("{"), Err(InputError::Json(_))));
    }

    #[test]
    fn test_literal_args() {
        let args = ProblemArgs {
            file: None,
            a: Some("[[2,1],[1,2]]"),
            b: Some("[4,3]"),
            c: Some("[1,1]"),
            ops: None,
            minimize: true,
        };
        let spec = load(&args).unwrap();
        assert_eq!(spec.sense, Sense::Min);
        assert_eq!(spec.num_constraints(), 2);
    }

    #[test]
    fn test_missing_literals() {
        let args = ProblemArgs {
            file: None,
            a: Some("[[1]]"),
            b: None,
            c: Some("[1]"),
            ops: None,
            minimize: false,
        };
        assert!(matches!(load(&args), Err(InputError::MissingProblem)));
    }
}
