// Error handling for the RDFScript runtime

use crate::ast::Location;
use crate::runtime::values::Value;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur while evaluating a document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A fragment names a prefix that is not registered in the environment.
    #[error("prefix not found: {prefix}")]
    PrefixNotFound { prefix: String },

    /// An operand did not evaluate to the kind of value its position needs.
    #[error("{location}: unexpected type: expected {expected}, got {} {actual}", .actual.kind())]
    UnexpectedType {
        expected: &'static str,
        actual: Value,
        location: Location,
    },

    #[error("{location}: template {name} is not defined")]
    UnknownTemplate { name: String, location: Location },

    #[error("{location}: parameter '{name}' is declared more than once")]
    DuplicateParameter { name: String, location: Location },

    #[error("{location}: '{name}' is reserved and cannot be declared as a parameter")]
    ReservedParameter { name: String, location: Location },

    #[error("{location}: module '{name}' not found")]
    ModuleNotFound { name: String, location: Location },

    #[error("cyclic import detected: {0}")]
    ImportCycle(String),

    #[error("{location}: unknown extension '{name}'")]
    UnknownExtension { name: String, location: Location },

    #[error("invalid arguments for extension '{name}': {message}")]
    InvalidExtensionArguments { name: String, message: String },
}

impl RuntimeError {
    pub fn unexpected_type(expected: &'static str, actual: Value, location: &Location) -> Self {
        RuntimeError::UnexpectedType {
            expected,
            actual,
            location: location.clone(),
        }
    }
}
