use pretty_assertions::assert_eq;
use rdfscript::{
    Environment, EvaluatorConfig, Evaluator, Extension, Identifier, ImportScope, Include, Literal,
    Module, Name, Pragma, RuntimeError, Statement, TemplateDef, TopLevel, TriplePack, Uri, Value,
};
use std::rc::Rc;

const BIO: &str = "http://bio.example.org/";
const LAB: &str = "http://lab.example.org/";

fn bio_module() -> Module {
    let body = vec![Statement::new(
        Identifier::from_names(["self"]),
        Identifier::from_names(["role"]),
        Identifier::from_names(["x"]),
    )];
    Module::new(
        "bio",
        Uri::new(BIO),
        vec![
            TopLevel::Template(TemplateDef::declared(
                Identifier::from_names(["Promoter"]),
                vec![Name::new("x")],
                body.clone(),
            )),
            TopLevel::Template(TemplateDef::declared(
                Identifier::from_names(["Terminator"]),
                vec![Name::new("x")],
                body,
            )),
        ],
    )
}

fn lab_env(scope: ImportScope) -> Environment {
    let config = EvaluatorConfig::from_toml_str(&format!(
        "default_prefix = \"lab\"\n[prefixes]\nlab = \"{}\"\n[import]\nscope = \"{}\"\n",
        LAB,
        match scope {
            ImportScope::Namespace => "namespace",
            ImportScope::All => "all",
        }
    ))
    .unwrap();
    let mut env = Environment::from_config(&config).unwrap();
    env.register_module(bio_module());
    env
}

fn uri(base: &str, name: &str) -> Uri {
    Uri::new(format!("{}{}", base, name))
}

#[test]
fn include_aliases_templates_into_active_namespace() {
    let mut env = lab_env(ImportScope::Namespace);
    let pack = Include::new("bio").run(TriplePack::new(), &mut env).unwrap();
    assert!(pack.is_empty());

    for name in ["Promoter", "Terminator"] {
        let original = env.template(&uri(BIO, name)).expect("bio template");
        let alias = env.template(&uri(LAB, name)).expect("lab alias");
        assert!(Rc::ptr_eq(&original, &alias), "{} must alias, not copy", name);
    }
    assert_eq!(env.templates().len(), 4);
    assert_eq!(env.prefix(), Some("lab"));
}

#[test]
fn include_returns_the_pack_unchanged() {
    let mut env = lab_env(ImportScope::Namespace);
    let mut pack = TriplePack::new();
    pack.add(rdfscript::Triple::new(
        Uri::new("http://s"),
        Uri::new("http://p"),
        Literal::from(1i64),
    ));
    let before = pack.clone();
    let after = Include::new("bio").run(pack, &mut env).unwrap();
    assert_eq!(after, before);
}

#[test]
fn include_filters_symbols_by_namespace_by_default() {
    let mut env = lab_env(ImportScope::Namespace);
    env.bind_prefix("other", Uri::new("http://other.example.org/"));
    env.assign(uri(BIO, "length"), Value::Literal(Literal::from(120i64)));
    env.assign(uri("http://other.example.org/", "colour"), Value::Literal(Literal::from("red")));

    Include::new("bio").run(TriplePack::new(), &mut env).unwrap();

    assert_eq!(
        env.lookup(&uri(LAB, "length")),
        Some(&Value::Literal(Literal::from(120i64)))
    );
    assert_eq!(env.lookup(&uri(LAB, "colour")), None);
}

#[test]
fn unfiltered_symbol_import_is_opt_in() {
    let mut env = lab_env(ImportScope::All);
    env.assign(uri("http://other.example.org/", "colour"), Value::Literal(Literal::from("red")));

    Include::with_scope("bio", ImportScope::All)
        .run(TriplePack::new(), &mut env)
        .unwrap();

    assert_eq!(
        env.lookup(&uri(LAB, "colour")),
        Some(&Value::Literal(Literal::from("red")))
    );
}

#[test]
fn aliases_are_not_re_aliased_in_the_same_run() {
    // The destination lives inside the source namespace, so every alias
    // would match the source filter if it were visible during the scan.
    let mut env = Environment::new(Uri::new("http://example.org/"));
    env.bind_prefix("bio", Uri::new(BIO));
    env.bind_prefix("nested", uri(BIO, "nested/"));
    env.set_prefix(Some("nested")).unwrap();
    env.assign(uri(BIO, "a"), Value::Literal(Literal::from(1i64)));

    Include::new("bio").run(TriplePack::new(), &mut env).unwrap();

    assert_eq!(env.symbols().len(), 2);
    assert!(env.lookup(&uri(BIO, "nested/a")).is_some());
}

#[test]
fn include_of_unknown_namespace_fails() {
    let mut env = lab_env(ImportScope::Namespace);
    let err = Include::new("chem").run(TriplePack::new(), &mut env).unwrap_err();
    assert!(matches!(err, RuntimeError::ModuleNotFound { name, .. } if name == "chem"));
}

#[test]
fn include_of_inline_namespace_needs_no_module() {
    let mut env = lab_env(ImportScope::Namespace);
    env.bind_prefix("chem", Uri::new("http://chem.example.org/"));
    env.define_template(
        Uri::new("http://chem.example.org/Reagent"),
        rdfscript::Template::declare(
            Uri::new("http://chem.example.org/Reagent"),
            &[],
            &[],
            &Default::default(),
        )
        .unwrap(),
    );
    Include::new("chem").run(TriplePack::new(), &mut env).unwrap();
    assert!(env.template(&uri(LAB, "Reagent")).is_some());
}

#[test]
fn extension_pragma_runs_include_in_document_order() {
    let mut evaluator = Evaluator::with_environment(lab_env(ImportScope::Namespace));
    let forms = vec![
        TopLevel::Pragma(Pragma::Extension {
            name: "Include".to_string(),
            arguments: vec!["bio".to_string()],
            location: Default::default(),
        }),
        TopLevel::Expansion(rdfscript::Expansion::new(
            Identifier::from_names(["p1"]),
            rdfscript::Invocation::new(
                Identifier::from_names(["Promoter"]),
                vec![Identifier::from_names(["bio", "promoter_role"]).into()],
            ),
        )),
    ];

    let pack = evaluator.evaluate_program(&forms).unwrap();

    assert_eq!(
        pack.iter().cloned().collect::<Vec<_>>(),
        vec![rdfscript::Triple::new(
            uri(LAB, "p1"),
            uri(BIO, "role"),
            uri(BIO, "promoter_role"),
        )]
    );
}

#[test]
fn unknown_extension_is_reported() {
    let mut evaluator = Evaluator::new();
    let err = evaluator
        .evaluate_program(&[TopLevel::Pragma(Pragma::Extension {
            name: "Nope".to_string(),
            arguments: vec![],
            location: Default::default(),
        })])
        .unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownExtension { name, .. } if name == "Nope"));
}

#[test]
fn include_requires_exactly_one_argument() {
    let mut evaluator = Evaluator::new();
    let err = evaluator
        .evaluate_program(&[TopLevel::Pragma(Pragma::Extension {
            name: "Include".to_string(),
            arguments: vec!["a".to_string(), "b".to_string()],
            location: Default::default(),
        })])
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidExtensionArguments { .. }));
}
