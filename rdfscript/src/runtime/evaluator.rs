// Evaluation of top-level forms
//
// Forms are evaluated in document order against one shared environment.
// Each may add triples to the pack and/or change the environment tables.

use crate::ast::{
    Argument, Assignment, Expansion, Expr, ImportPragma, Location, Pragma, Statement, TemplateDef,
    TemplateSource, Term, TopLevel, Uri,
};
use crate::compiler::template::Template;
use crate::config::{ConfigError, EvaluatorConfig};
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::Value;
use crate::triples::{Triple, TriplePack};

fn expect_uri(value: Value, location: &Location) -> RuntimeResult<Uri> {
    match value {
        Value::Uri(uri) => Ok(uri),
        other => Err(RuntimeError::unexpected_type("uri", other, location)),
    }
}

fn expect_term(value: Value, location: &Location) -> RuntimeResult<Term> {
    value
        .into_term()
        .map_err(|other| RuntimeError::unexpected_type("uri or literal", other, location))
}

/// Evaluates invocation arguments, giving each the position it was written at.
fn evaluate_arguments(
    arguments: &[Expr],
    env: &Environment,
    location: &Location,
) -> RuntimeResult<Vec<Argument>> {
    arguments
        .iter()
        .enumerate()
        .map(|(position, expr)| {
            let term = expect_term(expr.evaluate(env)?, location)?;
            Ok(Argument::new(term, position).at(location.clone()))
        })
        .collect()
}

impl Assignment {
    /// Binds the value to the Uri the name resolves to. A name that does not
    /// resolve to a Uri is an error.
    pub fn evaluate(&self, env: &mut Environment) -> RuntimeResult<Value> {
        let uri = expect_uri(self.name.evaluate(env)?, &self.location)?;
        let value = self.value.evaluate(env)?;
        env.assign(uri, value.clone());
        Ok(value)
    }
}

impl Statement {
    pub fn evaluate(&self, env: &Environment) -> RuntimeResult<Triple> {
        let subject = expect_uri(self.subject.evaluate(env)?, &self.location)?;
        let predicate = expect_uri(self.predicate.evaluate(env)?, &self.location)?;
        let object = expect_term(self.object.evaluate(env)?, &self.location)?;
        Ok(Triple {
            subject,
            predicate,
            object,
        })
    }
}

impl TemplateDef {
    /// Defines the template and returns the Uri it was defined under. The
    /// body resolves under the namespace active here, not at expansion.
    pub fn evaluate(&self, env: &mut Environment) -> RuntimeResult<Uri> {
        let name = expect_uri(self.name.evaluate(env)?.into(), &self.location)?;
        let template = match &self.source {
            TemplateSource::Declared { parameters, body } => {
                Template::declare(name.clone(), parameters, body, &self.location)?
                    .resolve_body(env)?
            }
            TemplateSource::Applied(invocation) => {
                let base_name =
                    expect_uri(invocation.template.evaluate(env)?.into(), &invocation.location)?;
                let base = env
                    .template(&base_name)
                    .ok_or_else(|| RuntimeError::UnknownTemplate {
                        name: base_name.to_string(),
                        location: invocation.location.clone(),
                    })?;
                let arguments = evaluate_arguments(&invocation.arguments, env, &invocation.location)?;
                base.partially_apply(name.clone(), &arguments)
            }
        };
        log::debug!(
            "defined template {} with {} parameter(s)",
            name,
            template.signature().arity()
        );
        env.define_template(name.clone(), template);
        Ok(name)
    }
}

impl Expansion {
    /// Instantiates the template on the subject and adds the resulting
    /// triples. Returns the number of triples added.
    pub fn evaluate(&self, env: &mut Environment, pack: &mut TriplePack) -> RuntimeResult<usize> {
        let invocation = &self.invocation;
        let name = expect_uri(invocation.template.evaluate(env)?.into(), &invocation.location)?;
        let template = env
            .template(&name)
            .ok_or_else(|| RuntimeError::UnknownTemplate {
                name: name.to_string(),
                location: invocation.location.clone(),
            })?;
        let subject = expect_uri(self.subject.evaluate(env)?.into(), &self.location)?;
        let arguments = evaluate_arguments(&invocation.arguments, env, &invocation.location)?;

        let triples = template
            .instantiate(&subject, &arguments)
            .iter()
            .map(|statement| statement.evaluate(env))
            .collect::<RuntimeResult<Vec<_>>>()?;
        let count = triples.len();
        log::debug!("expanded {} on {}: {} triple(s)", name, subject, count);
        pack.extend(triples);
        Ok(count)
    }
}

impl ImportPragma {
    /// Loads the named module's forms into the environment, under its own
    /// prefix. Importing an already imported module does nothing; a name
    /// with no module is accepted if it is already a registered prefix.
    ///
    /// When a form fails, the prefix binding is put back the way it was and
    /// the module stays unimported. Templates and symbols defined by the
    /// forms before the failing one are kept.
    pub fn evaluate(&self, env: &mut Environment, pack: &mut TriplePack) -> RuntimeResult<()> {
        let name = self.module.as_str();
        if env.modules().is_imported(name) {
            log::debug!("module {} already imported", name);
            return Ok(());
        }
        let Some(module) = env.modules().get(name) else {
            if env.has_prefix(name) {
                return Ok(());
            }
            return Err(RuntimeError::ModuleNotFound {
                name: name.to_string(),
                location: self.location.clone(),
            });
        };

        env.modules_mut().begin_loading(name)?;
        log::info!("importing module {} from {}", name, module.namespace);
        let previous_binding = env.prefixes().get(name).cloned();
        env.bind_prefix(name, module.namespace.clone());
        let previous = env.replace_prefix(Some(name.to_string()));

        let result = module
            .forms
            .iter()
            .try_for_each(|form| form.evaluate(env, pack).map(|_| ()));

        env.replace_prefix(previous);
        if let Err(e) = &result {
            log::warn!("import of module {} failed: {}", name, e);
            match previous_binding {
                Some(uri) => env.bind_prefix(name, uri),
                None => {
                    env.remove_prefix(name);
                }
            }
        }
        env.modules_mut().finish_loading(name, result.is_ok());
        result
    }
}

impl Pragma {
    pub fn evaluate(&self, env: &mut Environment, pack: &mut TriplePack) -> RuntimeResult<()> {
        match self {
            Pragma::Prefix { name, uri, .. } => {
                env.bind_prefix(name, uri.clone());
                Ok(())
            }
            Pragma::DefaultPrefix { name, .. } => env.set_prefix(name.as_deref()).map(|_| ()),
            Pragma::Import(import) => import.evaluate(env, pack),
            Pragma::Extension {
                name,
                arguments,
                location,
            } => {
                let extension = env
                    .extensions()
                    .create(name, arguments)
                    .ok_or_else(|| RuntimeError::UnknownExtension {
                        name: name.clone(),
                        location: location.clone(),
                    })??;
                log::info!("running extension {}({})", extension.name(), arguments.join(", "));
                let taken = std::mem::take(pack);
                *pack = extension.run(taken, env)?;
                Ok(())
            }
        }
    }
}

impl TopLevel {
    /// Evaluates one form. Forms that produce a value (identifiers, literals,
    /// assignments) return it.
    pub fn evaluate(&self, env: &mut Environment, pack: &mut TriplePack) -> RuntimeResult<Option<Value>> {
        match self {
            TopLevel::Identifier(identifier) => Ok(Some(identifier.evaluate(env)?.into())),
            TopLevel::Literal(literal) => Ok(Some(Value::Literal(literal.clone()))),
            TopLevel::Assignment(assignment) => assignment.evaluate(env).map(Some),
            TopLevel::Triple(statement) => {
                pack.add(statement.evaluate(env)?);
                Ok(None)
            }
            TopLevel::Template(definition) => {
                definition.evaluate(env)?;
                Ok(None)
            }
            TopLevel::Expansion(expansion) => {
                expansion.evaluate(env, pack)?;
                Ok(None)
            }
            TopLevel::Pragma(pragma) => {
                pragma.evaluate(env, pack)?;
                Ok(None)
            }
        }
    }
}

/// Evaluates whole documents against one environment.
#[derive(Debug, Default)]
pub struct Evaluator {
    env: Environment,
}

impl Evaluator {
    pub fn new() -> Self {
        Evaluator::default()
    }

    pub fn with_environment(env: Environment) -> Self {
        Evaluator { env }
    }

    pub fn with_config(config: &EvaluatorConfig) -> Result<Self, ConfigError> {
        Ok(Evaluator {
            env: Environment::from_config(config)?,
        })
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn into_environment(self) -> Environment {
        self.env
    }

    /// Evaluates `forms` in order into a fresh pack, stopping at the first error.
    pub fn evaluate_program(&mut self, forms: &[TopLevel]) -> RuntimeResult<TriplePack> {
        let mut pack = TriplePack::new();
        self.evaluate_into(forms, &mut pack)?;
        Ok(pack)
    }

    /// Evaluates `forms` in order, adding to an existing pack.
    pub fn evaluate_into(&mut self, forms: &[TopLevel], pack: &mut TriplePack) -> RuntimeResult<()> {
        for (index, form) in forms.iter().enumerate() {
            log::debug!("evaluating form {}", index);
            form.evaluate(&mut self.env, pack)?;
        }
        log::debug!("document produced {} triple(s)", pack.len());
        Ok(())
    }
}
