//! User-level extensions
//!
//! An extension is created by an `@extension Name(args...)` pragma and run
//! against the triple pack and environment at that point of the document.

pub mod include;

pub use include::Include;

use crate::config::ImportScope;
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::triples::TriplePack;
use indexmap::IndexMap;
use std::rc::Rc;

pub trait Extension {
    fn name(&self) -> &str;

    /// Runs the extension. The returned pack replaces the one passed in.
    fn run(&self, pack: TriplePack, env: &mut Environment) -> RuntimeResult<TriplePack>;
}

/// Builds an extension from the arguments of its pragma.
pub type ExtensionFactory = dyn Fn(&[String]) -> RuntimeResult<Box<dyn Extension>>;

/// Extensions available to `@extension` pragmas, by name.
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    factories: IndexMap<String, Rc<ExtensionFactory>>,
}

impl ExtensionRegistry {
    /// A registry with no extensions at all.
    pub fn empty() -> Self {
        ExtensionRegistry::default()
    }

    /// A registry with the built-in extensions; `Include` uses `scope`.
    pub fn with_defaults(scope: ImportScope) -> Self {
        let mut registry = ExtensionRegistry::empty();
        registry.register("Include", move |arguments: &[String]| {
            match arguments {
                [namespace] => Ok(Box::new(Include::with_scope(namespace, scope)) as Box<dyn Extension>),
                _ => Err(RuntimeError::InvalidExtensionArguments {
                    name: "Include".to_string(),
                    message: format!("expected one namespace, got {}", arguments.len()),
                }),
            }
        });
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&[String]) -> RuntimeResult<Box<dyn Extension>> + 'static,
    {
        self.factories.insert(name.into(), Rc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiates extension `name`; `None` if it is not registered.
    pub fn create(&self, name: &str, arguments: &[String]) -> Option<RuntimeResult<Box<dyn Extension>>> {
        self.factories.get(name).map(|factory| factory(arguments))
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
