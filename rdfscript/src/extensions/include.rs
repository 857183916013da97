// Include: re-binds the templates and values of one namespace into the
// active namespace, so they can be used without the source prefix.

use crate::ast::{Assignment, Expr, Identifier, ImportPragma, Part, Uri};
use crate::config::ImportScope;
use crate::extensions::Extension;
use crate::runtime::environment::Environment;
use crate::runtime::error::RuntimeResult;
use crate::runtime::values::Value;
use crate::triples::TriplePack;

#[derive(Debug, Clone)]
pub struct Include {
    namespace: String,
    import_pragma: ImportPragma,
    scope: ImportScope,
}

impl Include {
    /// `namespace` may carry leading words (`"import bio"`); only the last
    /// one names the namespace.
    pub fn new(namespace: &str) -> Self {
        Include::with_scope(namespace, ImportScope::default())
    }

    pub fn with_scope(namespace: &str, scope: ImportScope) -> Self {
        let namespace = namespace
            .split_whitespace()
            .last()
            .unwrap_or_default()
            .to_string();
        Include {
            import_pragma: ImportPragma::new(namespace.clone()),
            namespace,
            scope,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn scope(&self) -> ImportScope {
        self.scope
    }

    /// Builds every alias assignment before any of them is evaluated, so an
    /// alias created by this run is never itself re-aliased.
    fn aliases(&self, env: &Environment) -> RuntimeResult<Vec<Assignment>> {
        let source = env.uri_for_prefix(&self.namespace)?;
        let destination = env.active_namespace()?;

        let templates = env
            .templates()
            .keys()
            .filter(|key| key.contains(&source))
            .filter_map(|key| alias(&destination, key, Value::Uri(key.clone())));

        let symbols = env
            .symbols()
            .iter()
            .filter(|(key, _)| self.scope == ImportScope::All || key.contains(&source))
            .filter_map(|(key, value)| alias(&destination, key, value.clone()));

        Ok(templates.chain(symbols).collect())
    }
}

fn alias(destination: &Uri, key: &Uri, value: Value) -> Option<Assignment> {
    let fragment = key.last_fragment();
    if fragment.is_empty() {
        log::warn!("not aliasing {}: it has no final path fragment", key);
        return None;
    }
    let name = Identifier::new(vec![
        Part::Uri(destination.clone()),
        Part::Uri(Uri::new(fragment)),
    ]);
    Some(Assignment::new(name, Expr::from(value)))
}

impl Extension for Include {
    fn name(&self) -> &str {
        "Include"
    }

    fn run(&self, mut pack: TriplePack, env: &mut Environment) -> RuntimeResult<TriplePack> {
        self.import_pragma.evaluate(env, &mut pack)?;

        let aliases = self.aliases(env)?;
        log::info!(
            "including {} into {}: {} aliases",
            self.namespace,
            env.active_namespace()?,
            aliases.len()
        );
        for assignment in &aliases {
            assignment.evaluate(env)?;
        }

        Ok(pack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_last_word_of_namespace() {
        assert_eq!(Include::new("import bio").namespace(), "bio");
        assert_eq!(Include::new("bio").namespace(), "bio");
        assert_eq!(Include::new("").namespace(), "");
    }

    #[test]
    fn alias_uses_final_fragment() {
        let assignment = alias(
            &Uri::new("http://lab/"),
            &Uri::new("http://bio/parts#Promoter"),
            Value::Uri(Uri::new("http://bio/parts#Promoter")),
        )
        .unwrap();
        assert_eq!(
            assignment.name,
            Expr::Identifier(Identifier::new(vec![
                Part::Uri(Uri::new("http://lab/")),
                Part::Uri(Uri::new("Promoter")),
            ]))
        );
        assert!(alias(&Uri::new("http://lab/"), &Uri::new("http://bio/"), Value::Uri(Uri::new("x"))).is_none());
    }
}
