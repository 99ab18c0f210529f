use ratplex_solver::{ConstraintOp, Rational, Sense};

use crate::lexer::Span;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "lowercase"))]
pub enum Item {
    Sense(SenseDecl),
    Assign(Assignment),
}

/// `max` or `min` on its own line
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SenseDecl {
    pub span: Span,
    pub sense: Sense,
}

/// `name = value`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Assignment {
    pub span: Span,
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Value {
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_rational"))]
    Number(Rational),
    Op(ConstraintOp),
    List(Vec<Value>),
}

impl Value {
    pub fn as_number(&self) -> Option<&Rational> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// `[n, n, ...]`
    pub fn as_vector(&self) -> Option<Vec<Rational>> {
        match self {
            Value::List(items) => items.iter().map(|v| v.as_number().cloned()).collect(),
            _ => None,
        }
    }

    /// `[[n, ...], [n, ...], ...]`
    pub fn as_matrix(&self) -> Option<Vec<Vec<Rational>>> {
        match self {
            Value::List(rows) => rows.iter().map(Value::as_vector).collect(),
            _ => None,
        }
    }

    /// `[<=, >=, =, ...]`
    pub fn as_ops(&self) -> Option<Vec<ConstraintOp>> {
        match self {
            Value::List(items) => items
                .iter()
                .map(|v| match v {
                    Value::Op(op) => Some(*op),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    /// Short description used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Op(_) => "operator",
            Value::List(_) => "list",
        }
    }
}

impl Program {
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.items.iter().filter_map(|item| match item {
            Item::Assign(a) => Some(a),
            Item::Sense(_) => None,
        })
    }
}

/// Numbers serialize as `"n"` or `"n/d"` strings
#[cfg(feature = "serde")]
fn serialize_rational<S: serde::Serializer>(value: &Rational, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ratplex_solver::fraction_to_text(value))
}
