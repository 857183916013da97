// Triple output
// The pack is threaded through every form and extension of a document;
// evaluation only ever adds to it.

use crate::ast::{Term, Uri};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Uri,
    pub predicate: Uri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Uri, predicate: Uri, object: impl Into<Term>) -> Self {
        Triple {
            subject,
            predicate,
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// The triples produced by a document, in production order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriplePack {
    triples: Vec<Triple>,
}

impl TriplePack {
    pub fn new() -> Self {
        TriplePack::default()
    }

    pub fn add(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Triples matching a pattern; `None` matches anything.
    pub fn search(
        &self,
        subject: Option<&Uri>,
        predicate: Option<&Uri>,
        object: Option<&Term>,
    ) -> Vec<&Triple> {
        self.triples
            .iter()
            .filter(|t| subject.map_or(true, |s| &t.subject == s))
            .filter(|t| predicate.map_or(true, |p| &t.predicate == p))
            .filter(|t| object.map_or(true, |o| &t.object == o))
            .collect()
    }

    /// Distinct subjects in order of first appearance.
    pub fn subjects(&self) -> Vec<&Uri> {
        self.triples
            .iter()
            .map(|t| &t.subject)
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    /// Drops repeated triples, keeping the first occurrence of each.
    pub fn dedup(&mut self) {
        let unique: IndexSet<Triple> = self.triples.drain(..).collect();
        self.triples = unique.into_iter().collect();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Extend<Triple> for TriplePack {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl<'a> IntoIterator for &'a TriplePack {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    fn pack() -> TriplePack {
        let mut pack = TriplePack::new();
        pack.add(Triple::new(Uri::new("s1"), Uri::new("p"), Uri::new("o")));
        pack.add(Triple::new(Uri::new("s2"), Uri::new("p"), Literal::from(1i64)));
        pack.add(Triple::new(Uri::new("s1"), Uri::new("q"), Literal::from("x")));
        pack
    }

    #[test]
    fn search_by_pattern() {
        let pack = pack();
        assert_eq!(pack.search(Some(&Uri::new("s1")), None, None).len(), 2);
        assert_eq!(pack.search(None, Some(&Uri::new("p")), None).len(), 2);
        let one = Term::Literal(Literal::from(1i64));
        assert_eq!(pack.search(None, None, Some(&one)).len(), 1);
    }

    #[test]
    fn subjects_are_distinct_and_ordered() {
        let pack = pack();
        assert_eq!(pack.subjects(), vec![&Uri::new("s1"), &Uri::new("s2")]);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let mut pack = pack();
        pack.add(Triple::new(Uri::new("s1"), Uri::new("p"), Uri::new("o")));
        assert_eq!(pack.len(), 4);
        pack.dedup();
        assert_eq!(pack.len(), 3);
        assert_eq!(
            pack.iter().next(),
            Some(&Triple::new(Uri::new("s1"), Uri::new("p"), Uri::new("o")))
        );
    }

    #[test]
    fn json_output() {
        let json = pack().to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["triples"][0]["subject"], "s1");
        assert_eq!(parsed["triples"][1]["object"]["literal"]["integer"], 1);
    }
}
