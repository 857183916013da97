// Templates and the parameter/argument substitution protocol

use crate::ast::{Argument, Expr, Identifier, Location, Name, Parameter, Part, Statement, Term, Uri, SELF_PARAMETER};
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// The ordered, named and positioned slots of a template.
///
/// Slot `i` always has position `i`; names are unique and `self` is reserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    slots: Vec<Parameter>,
}

impl Signature {
    /// Validates a parameter list and assigns positions in declaration order.
    pub fn declare(names: &[Name]) -> RuntimeResult<Self> {
        let mut seen = IndexSet::new();
        let mut slots = Vec::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.name == SELF_PARAMETER {
                return Err(RuntimeError::ReservedParameter {
                    name: name.name.clone(),
                    location: name.location.clone(),
                });
            }
            if !seen.insert(name.name.as_str()) {
                return Err(RuntimeError::DuplicateParameter {
                    name: name.name.clone(),
                    location: name.location.clone(),
                });
            }
            slots.push(Parameter::Slot {
                name: name.name.clone(),
                position,
                location: name.location.clone(),
            });
        }
        Ok(Signature { slots })
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.slots
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    /// Correlates `arguments` with the slots by position.
    ///
    /// Each slot is offered to every argument in turn; a slot no argument
    /// claims stays abstract. Missing arguments are fine (partial
    /// application) and surplus ones are ignored.
    pub fn bind(&self, arguments: &[Argument]) -> Substitution {
        let slots = self
            .slots
            .iter()
            .map(|parameter| {
                let part = arguments
                    .iter()
                    .fold(Part::Parameter(parameter.clone()), |part, argument| {
                        argument.marshal(&part)
                    });
                match part {
                    Part::Argument(argument) => Slot::Bound(argument),
                    _ => Slot::Abstract(parameter.clone()),
                }
            })
            .collect();

        for argument in arguments.iter().filter(|a| a.position >= self.arity()) {
            log::warn!(
                "{}: argument {} at position {} has no matching parameter",
                argument.location,
                argument.value,
                argument.position
            );
        }

        Substitution {
            slots,
            subject: None,
        }
    }
}

/// What one slot is mapped to by a substitution.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Bound(Argument),
    Abstract(Parameter),
}

/// An explicit mapping from slot index to argument, plus the subject the
/// self-parameter stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    slots: Vec<Slot>,
    subject: Option<Uri>,
}

impl Substitution {
    pub fn with_subject(mut self, subject: Uri) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn slot(&self, position: usize) -> Option<&Slot> {
        self.slots.get(position)
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| matches!(slot, Slot::Bound(_)))
    }

    pub fn abstract_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Abstract(parameter) => Some(parameter),
            Slot::Bound(_) => None,
        })
    }

    /// Renumbers the abstract slots to `0..n`, returning the signature they
    /// form. Bound slots are untouched.
    fn compact(mut self) -> (Substitution, Signature) {
        let mut remaining = Vec::new();
        for slot in self.slots.iter_mut() {
            if let Slot::Abstract(parameter) = slot {
                let renumbered = Parameter::Slot {
                    name: parameter.name().to_string(),
                    position: remaining.len(),
                    location: parameter.location().clone(),
                };
                *parameter = renumbered.clone();
                remaining.push(renumbered);
            }
        }
        (self, Signature { slots: remaining })
    }

    pub fn apply_part(&self, part: &Part) -> Part {
        match part {
            Part::Parameter(Parameter::SelfRef { .. }) => match &self.subject {
                Some(subject) => Part::Uri(subject.clone()),
                None => part.clone(),
            },
            Part::Parameter(Parameter::Slot { position, .. }) => match self.slots.get(*position) {
                Some(Slot::Bound(argument)) => Part::Argument(argument.clone()),
                Some(Slot::Abstract(parameter)) => Part::Parameter(parameter.clone()),
                None => part.clone(),
            },
            other => other.clone(),
        }
    }

    /// Substitutes into one operand. An operand that is nothing but a filled
    /// slot becomes the argument's value itself.
    pub fn apply_expr(&self, expr: &Expr) -> Expr {
        let Expr::Identifier(identifier) = expr else {
            return expr.clone();
        };
        let parts: Vec<Part> = identifier.parts.iter().map(|p| self.apply_part(p)).collect();
        if let [Part::Argument(argument)] = parts.as_slice() {
            if let Term::Literal(literal) = &argument.value {
                return Expr::Literal(literal.clone());
            }
        }
        Expr::Identifier(Identifier {
            parts,
            location: identifier.location.clone(),
        })
    }

    pub fn apply_statement(&self, statement: &Statement) -> Statement {
        statement.map_exprs(|expr| self.apply_expr(expr))
    }
}

/// A template entry in the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    name: Uri,
    signature: Signature,
    body: Vec<Statement>,
    location: Location,
}

impl Template {
    /// Declares a template. Body names spelled like a parameter (or `self`)
    /// are turned into that parameter.
    pub fn declare(
        name: Uri,
        parameters: &[Name],
        body: &[Statement],
        location: &Location,
    ) -> RuntimeResult<Self> {
        let signature = Signature::declare(parameters)?;
        let mut placeholders = signature.parameters().to_vec();
        placeholders.push(Parameter::self_ref());

        let body = body
            .iter()
            .map(|statement| {
                statement.map_exprs(|expr| {
                    placeholders
                        .iter()
                        .fold(expr.clone(), |expr, parameter| parameter.substitute(&expr))
                })
            })
            .collect();

        Ok(Template {
            name,
            signature,
            body,
            location: location.clone(),
        })
    }

    /// Resolves every body operand against `env`, the environment the
    /// template is defined in. Operands that still hold a parameter are
    /// kept as partial identifiers and finish resolving on expansion.
    pub fn resolve_body(mut self, env: &Environment) -> RuntimeResult<Self> {
        self.body = self
            .body
            .iter()
            .map(|statement| {
                Ok(Statement {
                    subject: Expr::from(statement.subject.evaluate(env)?),
                    predicate: Expr::from(statement.predicate.evaluate(env)?),
                    object: Expr::from(statement.object.evaluate(env)?),
                    location: statement.location.clone(),
                })
            })
            .collect::<RuntimeResult<_>>()?;
        Ok(self)
    }

    pub fn name(&self) -> &Uri {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn body(&self) -> &[Statement] {
        &self.body
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Fills the slots `arguments` supply and returns a new template, named
    /// `name`, over the slots that remain. Remaining slots are renumbered
    /// from zero in their original order.
    pub fn partially_apply(&self, name: Uri, arguments: &[Argument]) -> Template {
        let (substitution, signature) = self.signature.bind(arguments).compact();
        Template {
            name,
            signature,
            body: self
                .body
                .iter()
                .map(|statement| substitution.apply_statement(statement))
                .collect(),
            location: self.location.clone(),
        }
    }

    /// The body with `self` replaced by `subject` and the supplied slots
    /// filled. Slots left abstract remain parameters in the result.
    pub fn instantiate(&self, subject: &Uri, arguments: &[Argument]) -> Vec<Statement> {
        let substitution = self.signature.bind(arguments).with_subject(subject.clone());
        self.body
            .iter()
            .map(|statement| substitution.apply_statement(statement))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    fn names(names: &[&str]) -> Vec<Name> {
        names.iter().map(|n| Name::new(*n)).collect()
    }

    fn body() -> Vec<Statement> {
        vec![
            Statement::new(
                Identifier::from_names(["self"]),
                Identifier::from_names(["role"]),
                Identifier::from_names(["x"]),
            ),
            Statement::new(
                Identifier::from_names(["self"]),
                Identifier::from_names(["length"]),
                Identifier::from_names(["y"]),
            ),
        ]
    }

    #[test]
    fn declare_rejects_duplicates_and_self() {
        assert!(matches!(
            Signature::declare(&names(&["a", "b", "a"])),
            Err(RuntimeError::DuplicateParameter { name, .. }) if name == "a"
        ));
        assert!(matches!(
            Signature::declare(&names(&["self"])),
            Err(RuntimeError::ReservedParameter { .. })
        ));
    }

    #[test]
    fn declare_assigns_positions_in_order() {
        let signature = Signature::declare(&names(&["a", "b"])).unwrap();
        let positions: Vec<_> = signature.parameters().iter().map(|p| p.position()).collect();
        assert_eq!(positions, vec![Some(0), Some(1)]);
    }

    #[test]
    fn bind_with_fewer_arguments_leaves_slots_abstract() {
        let signature = Signature::declare(&names(&["a", "b"])).unwrap();
        let argument = Argument::new(Literal::from(1i64), 1);
        let substitution = signature.bind(&[argument.clone()]);

        assert!(!substitution.is_complete());
        assert_eq!(substitution.slot(1), Some(&Slot::Bound(argument)));
        assert_eq!(
            substitution.abstract_parameters().cloned().collect::<Vec<_>>(),
            vec![Parameter::new("a", 0)]
        );
    }

    #[test]
    fn declare_turns_body_names_into_parameters() {
        let template =
            Template::declare(Uri::new("http://t/T"), &names(&["x", "y"]), &body(), &Location::default())
                .unwrap();
        let first = &template.body()[0];
        assert_eq!(
            first.subject,
            Expr::Identifier(Identifier::new(vec![Part::Parameter(Parameter::self_ref())]))
        );
        assert_eq!(
            first.object,
            Expr::Identifier(Identifier::new(vec![Part::Parameter(Parameter::new("x", 0))]))
        );
        assert_eq!(first.predicate, Expr::Identifier(Identifier::from_names(["role"])));
    }

    #[test]
    fn instantiate_fills_self_and_slots() {
        let template =
            Template::declare(Uri::new("http://t/T"), &names(&["x", "y"]), &body(), &Location::default())
                .unwrap();
        let subject = Uri::new("http://lab/p1");
        let statements = template.instantiate(
            &subject,
            &[
                Argument::new(Uri::new("http://so/promoter"), 0),
                Argument::new(Literal::from(120i64), 1),
            ],
        );

        assert_eq!(
            statements[0].subject,
            Expr::Identifier(Identifier::new(vec![Part::Uri(subject.clone())]))
        );
        assert_eq!(
            statements[0].object,
            Expr::Identifier(Identifier::new(vec![Part::Argument(Argument::new(
                Uri::new("http://so/promoter"),
                0
            ))]))
        );
        assert_eq!(statements[1].object, Expr::Literal(Literal::from(120i64)));
    }

    #[test]
    fn resolve_body_binds_names_to_the_defining_namespace() {
        let mut env = Environment::new(Uri::new("http://d/"));
        env.bind_prefix("bio", Uri::new("http://bio/"));
        env.set_prefix(Some("bio")).unwrap();
        let template =
            Template::declare(Uri::new("http://bio/T"), &names(&["x", "y"]), &body(), &Location::default())
                .unwrap()
                .resolve_body(&env)
                .unwrap();

        let first = &template.body()[0];
        assert_eq!(
            first.predicate,
            Expr::Identifier(Identifier::new(vec![Part::Uri(Uri::new("http://bio/role"))]))
        );
        assert_eq!(
            first.subject,
            Expr::Identifier(Identifier::new(vec![Part::Parameter(Parameter::self_ref())]))
        );

        env.bind_prefix("lab", Uri::new("http://lab/"));
        env.set_prefix(Some("lab")).unwrap();
        let statements = template.instantiate(
            &Uri::new("http://lab/p1"),
            &[Argument::new(Literal::from(1i64), 0), Argument::new(Literal::from(2i64), 1)],
        );
        assert_eq!(
            statements[1].evaluate(&env).unwrap(),
            crate::triples::Triple::new(
                Uri::new("http://lab/p1"),
                Uri::new("http://bio/length"),
                Literal::from(2i64)
            )
        );
    }

    #[test]
    fn partial_application_renumbers_remaining_slots() {
        let template =
            Template::declare(Uri::new("http://t/T"), &names(&["x", "y"]), &body(), &Location::default())
                .unwrap();
        let applied = template.partially_apply(
            Uri::new("http://t/U"),
            &[Argument::new(Uri::new("http://so/promoter"), 0)],
        );

        assert_eq!(applied.name(), &Uri::new("http://t/U"));
        assert_eq!(applied.signature().parameters(), &[Parameter::new("y", 0)]);
        assert_eq!(
            applied.body()[1].object,
            Expr::Identifier(Identifier::new(vec![Part::Parameter(Parameter::new("y", 0))]))
        );

        let statements = applied.instantiate(
            &Uri::new("http://lab/p1"),
            &[Argument::new(Literal::from(42i64), 0)],
        );
        assert_eq!(statements[1].object, Expr::Literal(Literal::from(42i64)));
    }
}
