//! RDFScript runtime
//!
//! Identifier resolution, the evaluation environment and the evaluation of
//! top-level forms.

pub mod environment;
pub mod error;
pub mod evaluator;
pub mod module_runtime;
pub mod resolve;
pub mod values;

pub use environment::Environment;
pub use error::{RuntimeError, RuntimeResult};
pub use evaluator::Evaluator;
pub use module_runtime::{Module, ModuleRegistry};
pub use resolve::{resolve, Resolution};
pub use values::Value;
