// Abstract syntax for RDFScript documents
//
// The parser hands the core an ordered list of `TopLevel` forms. Every node
// carries a `Location`, which is diagnostic metadata only.

use itertools::Itertools;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;

/// Text of the reserved self-parameter.
pub const SELF_PARAMETER: &str = "self";

// --- Location ---

/// Position of a node in its source document.
///
/// Locations never take part in node equality or hashing: two nodes parsed
/// from different places in a document are the same node if their contents
/// are the same.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    pub filename: Option<String>,
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(filename: Option<&str>, line: usize, col: usize) -> Self {
        Location {
            filename: filename.map(str::to_string),
            line,
            col,
        }
    }
}

impl PartialEq for Location {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, _state: &mut H) {}
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.filename.as_deref().unwrap_or("<unknown>");
        write!(f, "{}:{}:{}", file, self.line, self.col)
    }
}

// --- Uri ---

/// An absolute (or, while being built, relative) reference.
///
/// Backed by its string; equality and hashing are by that string, so two
/// Uris built from the same text are interchangeable as map keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

impl Uri {
    pub fn new(uri: impl Into<String>) -> Self {
        Uri(uri.into())
    }

    pub fn empty() -> Self {
        Uri(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Concatenates `other` onto the end of this Uri.
    pub fn concat(&self, other: &Uri) -> Uri {
        let mut uri = String::with_capacity(self.0.len() + other.0.len());
        uri.push_str(&self.0);
        uri.push_str(&other.0);
        Uri(uri)
    }

    /// Splits the Uri into path fragments on `#`, `/` and `:`.
    pub fn split(&self) -> Vec<&str> {
        self.0.split(['#', '/', ':']).collect()
    }

    /// The fragment after the last `#`, `/` or `:`; empty when the Uri ends
    /// with a delimiter.
    pub fn last_fragment(&self) -> &str {
        self.0.rsplit(['#', '/', ':']).next().unwrap_or_default()
    }

    /// True if this Uri's text contains `other`'s text.
    pub fn contains(&self, other: &Uri) -> bool {
        self.0.contains(other.as_str())
    }
}

impl Add<&Uri> for &Uri {
    type Output = Uri;

    fn add(self, other: &Uri) -> Uri {
        self.concat(other)
    }
}

impl Add for Uri {
    type Output = Uri;

    fn add(self, other: Uri) -> Uri {
        self.concat(&other)
    }
}

impl From<&str> for Uri {
    fn from(uri: &str) -> Self {
        Uri::new(uri)
    }
}

impl From<String> for Uri {
    fn from(uri: String) -> Self {
        Uri(uri)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

// --- Literal ---

/// An RDF literal. Kinds never compare equal to each other, so
/// `Integer(1) != Float(1.0)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Literal {
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    String(String),
}

impl Literal {
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Boolean(_) => "boolean",
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Float(OrderedFloat(value))
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x.0),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// A literal or a reference: the things that may appear as an argument value
/// or in object position of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Term {
    Uri(Uri),
    Literal(Literal),
}

impl From<Uri> for Term {
    fn from(uri: Uri) -> Self {
        Term::Uri(uri)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Uri(uri) => uri.fmt(f),
            Term::Literal(literal) => literal.fmt(f),
        }
    }
}

// --- Name, Parameter, Argument ---

/// A single unqualified identifier fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub name: String,
    pub location: Location,
}

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Name {
            name: name.into(),
            location: Location::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// A name on its own is the relative reference made of its text.
    pub fn evaluate(&self) -> Uri {
        Uri::new(self.name.as_str())
    }
}

/// A template placeholder.
///
/// Slots are correlated with arguments by `position` only. `SelfRef` is the
/// template's implicit reference to the subject it is expanded on; it has
/// no position and is never filled by an argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    Slot {
        name: String,
        position: usize,
        location: Location,
    },
    SelfRef {
        location: Location,
    },
}

impl Parameter {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Parameter::Slot {
            name: name.into(),
            position,
            location: Location::default(),
        }
    }

    pub fn self_ref() -> Self {
        Parameter::SelfRef {
            location: Location::default(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Parameter::Slot { name, .. } => name,
            Parameter::SelfRef { .. } => SELF_PARAMETER,
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            Parameter::Slot { position, .. } => Some(*position),
            Parameter::SelfRef { .. } => None,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Parameter::Slot { location, .. } | Parameter::SelfRef { location } => location,
        }
    }

    pub fn is_self(&self) -> bool {
        matches!(self, Parameter::SelfRef { .. })
    }

    /// Rewrites every `Name` fragment of `candidate` spelled like this
    /// parameter into the parameter itself. Anything that is not an
    /// identifier passes through unchanged.
    pub fn substitute(&self, candidate: &Expr) -> Expr {
        match candidate {
            Expr::Identifier(identifier) => {
                let parts = identifier
                    .parts
                    .iter()
                    .map(|part| match part {
                        Part::Name(name) if name.name == self.name() => {
                            Part::Parameter(self.clone())
                        }
                        other => other.clone(),
                    })
                    .collect();
                Expr::Identifier(Identifier {
                    parts,
                    location: identifier.location.clone(),
                })
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An actual value supplied for the slot at `position`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    pub value: Term,
    pub position: usize,
    pub location: Location,
}

impl Argument {
    pub fn new(value: impl Into<Term>, position: usize) -> Self {
        Argument {
            value: value.into(),
            position,
            location: Location::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Fills `candidate` if it is the slot this argument was supplied for.
    pub fn marshal(&self, candidate: &Part) -> Part {
        match candidate {
            Part::Parameter(parameter) if parameter.position() == Some(self.position) => {
                Part::Argument(self.clone())
            }
            other => other.clone(),
        }
    }

    pub fn as_reference(&self) -> Option<&Uri> {
        match &self.value {
            Term::Uri(uri) => Some(uri),
            Term::Literal(_) => None,
        }
    }
}

// --- Identifier ---

/// One fragment of an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Name(Name),
    Parameter(Parameter),
    Uri(Uri),
    Argument(Argument),
}

impl Part {
    /// The reference this fragment contributes to a resolved identifier, or
    /// `None` while it is still abstract.
    pub fn as_reference(&self) -> Option<Uri> {
        match self {
            Part::Name(name) => Some(name.evaluate()),
            Part::Uri(uri) => Some(uri.clone()),
            Part::Argument(argument) => argument.as_reference().cloned(),
            Part::Parameter(_) => None,
        }
    }
}

impl From<Name> for Part {
    fn from(name: Name) -> Self {
        Part::Name(name)
    }
}

impl From<Parameter> for Part {
    fn from(parameter: Parameter) -> Self {
        Part::Parameter(parameter)
    }
}

impl From<Uri> for Part {
    fn from(uri: Uri) -> Self {
        Part::Uri(uri)
    }
}

impl From<Argument> for Part {
    fn from(argument: Argument) -> Self {
        Part::Argument(argument)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Part::Name(name) => write!(f, "{}", name.name),
            Part::Parameter(parameter) => parameter.fmt(f),
            Part::Uri(uri) => uri.fmt(f),
            Part::Argument(argument) => argument.value.fmt(f),
        }
    }
}

/// A possibly namespaced reference, e.g. `bio.Promoter`, that may need more
/// than one resolution pass before it is fully absolute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub parts: Vec<Part>,
    pub location: Location,
}

impl Identifier {
    pub fn new(parts: Vec<Part>) -> Self {
        Identifier {
            parts,
            location: Location::default(),
        }
    }

    /// Builds an identifier made only of names, e.g. `["bio", "Promoter"]`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Identifier::new(names.into_iter().map(|n| Part::Name(Name::new(n))).collect())
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn first(&self) -> Option<&Part> {
        self.parts.first()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parts.iter().filter_map(|part| match part {
            Part::Parameter(parameter) => Some(parameter),
            _ => None,
        })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.iter().join(":"))
    }
}

// --- Expressions and forms ---

/// An unevaluated operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Expr {
    Identifier(Identifier),
    Literal(Literal),
}

impl From<Identifier> for Expr {
    fn from(identifier: Identifier) -> Self {
        Expr::Identifier(identifier)
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Expr::Literal(literal)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Identifier(identifier) => identifier.fmt(f),
            Expr::Literal(literal) => literal.fmt(f),
        }
    }
}

/// `name = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: Expr,
    pub value: Expr,
    pub location: Location,
}

impl Assignment {
    pub fn new(name: impl Into<Expr>, value: impl Into<Expr>) -> Self {
        Assignment {
            name: name.into(),
            value: value.into(),
            location: Location::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// `subject > predicate > object`, either at top level or in a template body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Expr,
    pub predicate: Expr,
    pub object: Expr,
    pub location: Location,
}

impl Statement {
    pub fn new(subject: impl Into<Expr>, predicate: impl Into<Expr>, object: impl Into<Expr>) -> Self {
        Statement {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            location: Location::default(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    /// Applies `f` to the three operands.
    pub fn map_exprs(&self, mut f: impl FnMut(&Expr) -> Expr) -> Statement {
        Statement {
            subject: f(&self.subject),
            predicate: f(&self.predicate),
            object: f(&self.object),
            location: self.location.clone(),
        }
    }
}

/// `Template(args...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    pub template: Identifier,
    pub arguments: Vec<Expr>,
    pub location: Location,
}

impl Invocation {
    pub fn new(template: Identifier, arguments: Vec<Expr>) -> Self {
        Invocation {
            template,
            arguments,
            location: Location::default(),
        }
    }
}

/// Where a template's definition comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateSource {
    /// `Name(p1, p2) ( statements... )`
    Declared {
        parameters: Vec<Name>,
        body: Vec<Statement>,
    },
    /// `Name = Other(a1)`: a partial application of an existing template.
    Applied(Invocation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDef {
    pub name: Identifier,
    pub source: TemplateSource,
    pub location: Location,
}

impl TemplateDef {
    pub fn declared(name: Identifier, parameters: Vec<Name>, body: Vec<Statement>) -> Self {
        TemplateDef {
            name,
            source: TemplateSource::Declared { parameters, body },
            location: Location::default(),
        }
    }

    pub fn applied(name: Identifier, invocation: Invocation) -> Self {
        TemplateDef {
            name,
            source: TemplateSource::Applied(invocation),
            location: Location::default(),
        }
    }
}

/// `subject is a Template(args...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expansion {
    pub subject: Identifier,
    pub invocation: Invocation,
    pub location: Location,
}

impl Expansion {
    pub fn new(subject: Identifier, invocation: Invocation) -> Self {
        Expansion {
            subject,
            invocation,
            location: Location::default(),
        }
    }
}

/// `@import name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportPragma {
    pub module: String,
    pub location: Location,
}

impl ImportPragma {
    pub fn new(module: impl Into<String>) -> Self {
        ImportPragma {
            module: module.into(),
            location: Location::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pragma {
    /// `@prefix name = <uri>`
    Prefix {
        name: String,
        uri: Uri,
        location: Location,
    },
    /// `@prefix name` or `@prefix` (clears the active prefix)
    DefaultPrefix {
        name: Option<String>,
        location: Location,
    },
    Import(ImportPragma),
    /// `@extension Name(args...)`
    Extension {
        name: String,
        arguments: Vec<String>,
        location: Location,
    },
}

/// A top-level form of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TopLevel {
    Identifier(Identifier),
    Literal(Literal),
    Assignment(Assignment),
    Triple(Statement),
    Template(TemplateDef),
    Expansion(Expansion),
    Pragma(Pragma),
}
