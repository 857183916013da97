// Identifier resolution
//
// Reduces an identifier to an absolute Uri, or to a smaller identifier when
// some fragments are still abstract. Resolution never mutates the node it is
// given, so the same identifier can be resolved against several environments
// and re-resolved as more bindings become available.

use crate::ast::{Expr, Identifier, Part, Uri};
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::Value;

/// Outcome of resolving an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every fragment resolved.
    Complete(Uri),
    /// Resolution stopped at an abstract fragment. The identifier starts with
    /// whatever was accumulated so far followed by the unresolved fragments.
    Partial(Identifier),
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        matches!(self, Resolution::Complete(_))
    }

    pub fn as_uri(&self) -> Option<&Uri> {
        match self {
            Resolution::Complete(uri) => Some(uri),
            Resolution::Partial(_) => None,
        }
    }
}

impl From<Resolution> for Value {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Complete(uri) => Value::Uri(uri),
            Resolution::Partial(identifier) => Value::Identifier(identifier),
        }
    }
}

/// Resolve `identifier` against `env`.
pub fn resolve(identifier: &Identifier, env: &Environment) -> RuntimeResult<Resolution> {
    let parts = prefixify(identifier, env)?;

    let mut uri = Uri::empty();
    let mut stuck_at = None;
    for (index, part) in parts.iter().enumerate() {
        match part.as_reference() {
            Some(fragment) => uri = uri.concat(&fragment),
            None => {
                stuck_at = Some(index);
                break;
            }
        }
    }

    let Some(index) = stuck_at else {
        return Ok(Resolution::Complete(uri));
    };

    let remaining = if uri.is_empty() {
        parts
    } else {
        let mut remaining = Vec::with_capacity(parts.len() - index + 1);
        remaining.push(Part::Uri(uri));
        remaining.extend(parts.into_iter().skip(index));
        remaining
    };
    let partial = Identifier {
        parts: remaining,
        location: identifier.location.clone(),
    };
    log::debug!("partially resolved {} to {}", identifier, partial);
    Ok(Resolution::Partial(partial))
}

/// Puts a namespace in front of an identifier that starts with a bare name.
///
/// A leading name that is a registered prefix is replaced by the prefix's
/// Uri. Any other leading name is kept, and the active namespace is put in
/// front of it so that a later pass can still see the original fragment.
fn prefixify(identifier: &Identifier, env: &Environment) -> RuntimeResult<Vec<Part>> {
    let mut parts = identifier.parts.clone();
    let Some(Part::Name(first)) = parts.first() else {
        return Ok(parts);
    };
    let first = first.name.clone();

    let base = env.active_namespace()?;
    match env.uri_for_prefix(&first) {
        Ok(uri) => parts[0] = Part::Uri(uri),
        Err(RuntimeError::PrefixNotFound { .. }) => {
            log::debug!("'{}' is not a prefix, resolving under {}", first, base);
            parts.insert(0, Part::Uri(base));
        }
        Err(e) => return Err(e),
    }
    Ok(parts)
}

impl Identifier {
    pub fn evaluate(&self, env: &Environment) -> RuntimeResult<Resolution> {
        resolve(self, env)
    }
}

impl Expr {
    pub fn evaluate(&self, env: &Environment) -> RuntimeResult<Value> {
        match self {
            Expr::Identifier(identifier) => Ok(resolve(identifier, env)?.into()),
            Expr::Literal(literal) => Ok(Value::Literal(literal.clone())),
        }
    }
}
