// Module registry
// Keeps the namespaces an import pragma can load, and which of them have
// already been loaded into the environment.

use crate::ast::{TopLevel, Uri};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use indexmap::{IndexMap, IndexSet};
use std::rc::Rc;

/// A namespace that can be imported: the prefix it is bound to, the Uri
/// behind that prefix and the forms that define its contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub namespace: Uri,
    pub forms: Vec<TopLevel>,
}

impl Module {
    pub fn new(name: impl Into<String>, namespace: Uri, forms: Vec<TopLevel>) -> Self {
        Module {
            name: name.into(),
            namespace,
            forms,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    /// Map from module name to module
    modules: IndexMap<String, Rc<Module>>,

    /// Modules whose forms have been evaluated
    imported: IndexSet<String>,

    /// Modules currently being loaded (for circular import detection)
    loading_stack: Vec<String>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        ModuleRegistry::default()
    }

    /// Register a module. Registering a name again replaces the definition
    /// but does not re-import it.
    pub fn register_module(&mut self, module: Module) {
        log::debug!("registered module {} as {}", module.name, module.namespace);
        self.modules.insert(module.name.clone(), Rc::new(module));
    }

    pub fn get(&self, name: &str) -> Option<Rc<Module>> {
        self.modules.get(name).cloned()
    }

    pub fn is_imported(&self, name: &str) -> bool {
        self.imported.contains(name)
    }

    pub fn module_names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    /// Marks `name` as being loaded, failing if it is already on the stack.
    pub fn begin_loading(&mut self, name: &str) -> RuntimeResult<()> {
        if self.loading_stack.iter().any(|loading| loading == name) {
            let mut chain = self.loading_stack.clone();
            chain.push(name.to_string());
            return Err(RuntimeError::ImportCycle(chain.join(" -> ")));
        }
        self.loading_stack.push(name.to_string());
        Ok(())
    }

    /// Pops `name` off the loading stack, recording it as imported when its
    /// forms evaluated successfully.
    pub fn finish_loading(&mut self, name: &str, succeeded: bool) {
        if let Some(index) = self.loading_stack.iter().rposition(|loading| loading == name) {
            self.loading_stack.remove(index);
        }
        if succeeded {
            self.imported.insert(name.to_string());
        }
    }
}
