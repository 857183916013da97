// RDFScript evaluation core
// Compiles already-parsed RDFScript forms into RDF triples.
pub mod ast;
pub mod compiler;
pub mod config;
pub mod extensions;
pub mod runtime;
pub mod triples;

// Re-export the AST and the main entry points.
pub use ast::*;
pub use compiler::{Signature, Slot, Substitution, Template};
pub use config::{ConfigError, EvaluatorConfig, ImportScope};
pub use extensions::{Extension, ExtensionRegistry, Include};
pub use runtime::{
    resolve, Environment, Evaluator, Module, Resolution, RuntimeError, RuntimeResult, Value,
};
pub use triples::{Triple, TriplePack};
