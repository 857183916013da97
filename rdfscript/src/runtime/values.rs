// Evaluated values

use crate::ast::{Expr, Identifier, Literal, Part, Term, Uri};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The result of evaluating an operand.
///
/// `Identifier` is a partially resolved reference: some fragments are still
/// waiting on parameters and can only be completed by a later pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    Uri(Uri),
    Literal(Literal),
    Identifier(Identifier),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Uri(_) => "uri",
            Value::Literal(literal) => literal.kind(),
            Value::Identifier(_) => "identifier",
        }
    }

    pub fn as_uri(&self) -> Option<&Uri> {
        match self {
            Value::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    /// Literals and complete references are terms; partial identifiers are not.
    pub fn into_term(self) -> Result<Term, Value> {
        match self {
            Value::Uri(uri) => Ok(Term::Uri(uri)),
            Value::Literal(literal) => Ok(Term::Literal(literal)),
            other => Err(other),
        }
    }
}

impl From<Uri> for Value {
    fn from(uri: Uri) -> Self {
        Value::Uri(uri)
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        Value::Literal(literal)
    }
}

impl From<Term> for Value {
    fn from(term: Term) -> Self {
        match term {
            Term::Uri(uri) => Value::Uri(uri),
            Term::Literal(literal) => Value::Literal(literal),
        }
    }
}

/// Turns a bound value back into an operand, so it can be the right-hand
/// side of a new assignment.
impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        match value {
            Value::Uri(uri) => Expr::Identifier(Identifier::new(vec![Part::Uri(uri)])),
            Value::Literal(literal) => Expr::Literal(literal),
            Value::Identifier(identifier) => Expr::Identifier(identifier),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Uri(uri) => uri.fmt(f),
            Value::Literal(literal) => literal.fmt(f),
            Value::Identifier(identifier) => identifier.fmt(f),
        }
    }
}
