// Environment for prefix, symbol and template bindings

use crate::ast::Uri;
use crate::compiler::template::Template;
use crate::config::{ConfigError, EvaluatorConfig, ImportScope, DEFAULT_NAMESPACE};
use crate::extensions::ExtensionRegistry;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::module_runtime::{Module, ModuleRegistry};
use crate::runtime::values::Value;
use indexmap::IndexMap;
use std::rc::Rc;

/// The shared, mutable state every form of a document is evaluated against.
///
/// Template entries are reference counted: an alias created by an
/// assignment or an import shares the entry of the template it names.
#[derive(Clone)]
pub struct Environment {
    prefixes: IndexMap<String, Uri>,
    prefix: Option<String>,
    default_namespace: Uri,
    symbols: IndexMap<Uri, Value>,
    templates: IndexMap<Uri, Rc<Template>>,
    modules: ModuleRegistry,
    extensions: Rc<ExtensionRegistry>,
}

impl Environment {
    /// Creates an environment with no prefixes, resolving bare names under
    /// `default_namespace`.
    pub fn new(default_namespace: Uri) -> Self {
        Environment {
            prefixes: IndexMap::new(),
            prefix: None,
            default_namespace,
            symbols: IndexMap::new(),
            templates: IndexMap::new(),
            modules: ModuleRegistry::new(),
            extensions: Rc::new(ExtensionRegistry::with_defaults(ImportScope::default())),
        }
    }

    pub fn from_config(config: &EvaluatorConfig) -> Result<Self, ConfigError> {
        let mut env = Environment::new(Uri::new(config.default_namespace.as_str()));
        for (name, uri) in &config.prefixes {
            env.bind_prefix(name, Uri::new(uri.as_str()));
        }
        if let Some(prefix) = &config.default_prefix {
            env.set_prefix(Some(prefix))
                .map_err(|_| ConfigError::UnknownDefaultPrefix(prefix.clone()))?;
        }
        env.extensions = Rc::new(ExtensionRegistry::with_defaults(config.import.scope));
        Ok(env)
    }

    // --- Prefixes ---

    pub fn bind_prefix(&mut self, name: &str, uri: Uri) {
        log::debug!("prefix {} bound to {}", name, uri);
        self.prefixes.insert(name.to_string(), uri);
    }

    pub fn remove_prefix(&mut self, name: &str) -> Option<Uri> {
        self.prefixes.shift_remove(name)
    }

    pub fn has_prefix(&self, name: &str) -> bool {
        self.prefixes.contains_key(name)
    }

    /// The Uri bound to prefix `name`.
    pub fn uri_for_prefix(&self, name: &str) -> RuntimeResult<Uri> {
        self.prefixes
            .get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::PrefixNotFound {
                prefix: name.to_string(),
            })
    }

    pub fn prefixes(&self) -> &IndexMap<String, Uri> {
        &self.prefixes
    }

    /// The active default prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Activates prefix `name` (or clears the active prefix), returning the
    /// previously active one. The prefix must be registered.
    pub fn set_prefix(&mut self, name: Option<&str>) -> RuntimeResult<Option<String>> {
        if let Some(name) = name {
            self.uri_for_prefix(name)?;
        }
        Ok(self.replace_prefix(name.map(str::to_string)))
    }

    /// Unchecked counterpart of `set_prefix`, used to restore a saved prefix.
    pub(crate) fn replace_prefix(&mut self, name: Option<String>) -> Option<String> {
        std::mem::replace(&mut self.prefix, name)
    }

    pub fn default_namespace(&self) -> &Uri {
        &self.default_namespace
    }

    /// The namespace bare names resolve under: the active prefix's Uri, or
    /// the default namespace when no prefix is active.
    pub fn active_namespace(&self) -> RuntimeResult<Uri> {
        match &self.prefix {
            Some(prefix) => self.uri_for_prefix(prefix),
            None => Ok(self.default_namespace.clone()),
        }
    }

    // --- Symbols and templates ---

    /// Records a binding for `uri`.
    ///
    /// When `value` is the Uri of a defined template, `uri` becomes an alias
    /// of that template entry; otherwise `value` is recorded as a symbol.
    /// Either way `uri` ends up in exactly one of the two tables.
    pub fn assign(&mut self, uri: Uri, value: Value) {
        if let Some(template) = value.as_uri().and_then(|target| self.templates.get(target)) {
            log::debug!("{} aliases template {}", uri, template.name());
            let template = template.clone();
            self.symbols.shift_remove(&uri);
            self.templates.insert(uri, template);
            return;
        }
        log::debug!("{} = {}", uri, value);
        self.templates.shift_remove(&uri);
        self.symbols.insert(uri, value);
    }

    pub fn lookup(&self, uri: &Uri) -> Option<&Value> {
        self.symbols.get(uri)
    }

    pub fn symbols(&self) -> &IndexMap<Uri, Value> {
        &self.symbols
    }

    pub fn define_template(&mut self, uri: Uri, template: Template) -> Rc<Template> {
        let template = Rc::new(template);
        self.templates.insert(uri, template.clone());
        template
    }

    pub fn template(&self, uri: &Uri) -> Option<Rc<Template>> {
        self.templates.get(uri).cloned()
    }

    pub fn templates(&self) -> &IndexMap<Uri, Rc<Template>> {
        &self.templates
    }

    // --- Modules and extensions ---

    pub fn register_module(&mut self, module: Module) {
        self.modules.register_module(module);
    }

    pub fn modules(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn modules_mut(&mut self) -> &mut ModuleRegistry {
        &mut self.modules
    }

    pub fn extensions(&self) -> Rc<ExtensionRegistry> {
        self.extensions.clone()
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionRegistry {
        Rc::make_mut(&mut self.extensions)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(Uri::new(DEFAULT_NAMESPACE))
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("prefixes", &self.prefixes)
            .field("prefix", &self.prefix)
            .field("default_namespace", &self.default_namespace)
            .field("symbols", &self.symbols.len())
            .field("templates", &self.templates.len())
            .field("modules", &self.modules.module_names())
            .finish()
    }
}
