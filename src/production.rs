//! Productions and their place in the Chomsky hierarchy.
//!
//! There is one [`Production`] type. Its [`ProductionClass`] tag is attached
//! at construction time, after the predicates of the requested class *and of
//! every ancestor class* have accepted the pair of words.

use crate::error::GrammarError;
use crate::symbol::{Symbol, Word};
use core::fmt;
use core::hash::{Hash, Hasher};

/// Ordered from least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductionClass {
    Unrestricted,
    ContextSensitive,
    ContextFree,
    Regular,
}

const HIERARCHY: [ProductionClass; 4] = [
    ProductionClass::Unrestricted,
    ProductionClass::ContextSensitive,
    ProductionClass::ContextFree,
    ProductionClass::Regular,
];

impl fmt::Display for ProductionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProductionClass::Unrestricted => "unrestricted",
            ProductionClass::ContextSensitive => "context-sensitive",
            ProductionClass::ContextFree => "context-free",
            ProductionClass::Regular => "regular",
        })
    }
}

/// `uAv -> uβv`: some nonterminal of `left` sits between a prefix and a
/// suffix that `right` repeats verbatim.
fn is_context_sensitive<K: PartialEq>(left: &Word<K>, right: &Word<K>) -> bool {
    if !left.iter().any(Symbol::is_nonterminal) {
        return false;
    }
    if right.is_epsilon() {
        return left.len() == 1;
    }
    if left.len() > right.len() {
        return false;
    }
    left.nonterminal_positions()
        .any(|i| right.starts_with(&left[..i]) && right.ends_with(&left[i + 1..]))
}

fn is_context_free<K>(left: &Word<K>) -> bool {
    matches!(&left[..], [s] if s.is_nonterminal())
}

/// right linear: `A -> ε | a | a B`
fn is_regular<K>(right: &Word<K>) -> bool {
    match &right[..] {
        [] => true,
        [a] => a.is_terminal(),
        [a, b] => a.is_terminal() && b.is_nonterminal(),
        _ => false,
    }
}

impl ProductionClass {
    /// Checks only this class's own constraint, not its ancestors'.
    fn admits_own<K: PartialEq>(self, left: &Word<K>, right: &Word<K>) -> bool {
        match self {
            ProductionClass::Unrestricted => true,
            ProductionClass::ContextSensitive => is_context_sensitive(left, right),
            ProductionClass::ContextFree => is_context_free(left),
            ProductionClass::Regular => is_regular(right),
        }
    }

    /// The classes a production of this class must also belong to, root first,
    /// ending with `self`.
    pub fn lineage(self) -> impl Iterator<Item = ProductionClass> {
        HIERARCHY.into_iter().take_while(move |c| *c <= self)
    }

    pub fn admits<K: PartialEq>(self, left: &Word<K>, right: &Word<K>) -> bool {
        self.lineage().all(|c| c.admits_own(left, right))
    }

    /// Runs the predicates root first and reports the first class that rejects.
    pub fn validate<K: PartialEq + Clone>(
        self,
        left: &Word<K>,
        right: &Word<K>,
    ) -> Result<(), GrammarError<K>> {
        match self.lineage().find(|c| !c.admits_own(left, right)) {
            None => Ok(()),
            Some(class) => Err(GrammarError::MalformedProduction {
                class,
                left: left.clone(),
                right: right.clone(),
            }),
        }
    }

    /// Narrowest class the pair of words belongs to.
    pub fn classify<K: PartialEq>(left: &Word<K>, right: &Word<K>) -> ProductionClass {
        HIERARCHY
            .into_iter()
            .take_while(|c| c.admits_own(left, right))
            .last()
            .unwrap_or(ProductionClass::Unrestricted)
    }
}

/// A rewriting rule `left -> right`.
///
/// Equality and hashing look at the two words only; the class tag records what
/// was proven at construction.
#[derive(Debug, Clone)]
pub struct Production<K> {
    left: Word<K>,
    right: Word<K>,
    class: ProductionClass,
}

impl<K: PartialEq> PartialEq for Production<K> {
    fn eq(&self, other: &Self) -> bool {
        self.left == other.left && self.right == other.right
    }
}

impl<K: Eq> Eq for Production<K> {}

impl<K: Hash> Hash for Production<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.left.hash(state);
        self.right.hash(state);
    }
}

impl<K: PartialEq + Clone> Production<K> {
    pub fn new(
        left: impl Into<Word<K>>,
        right: impl Into<Word<K>>,
        class: ProductionClass,
    ) -> Result<Self, GrammarError<K>> {
        let (left, right) = (left.into(), right.into());
        class.validate(&left, &right)?;
        Ok(Production { left, right, class })
    }

    pub fn unrestricted(
        left: impl Into<Word<K>>,
        right: impl Into<Word<K>>,
    ) -> Result<Self, GrammarError<K>> {
        Self::new(left, right, ProductionClass::Unrestricted)
    }

    pub fn context_sensitive(
        left: impl Into<Word<K>>,
        right: impl Into<Word<K>>,
    ) -> Result<Self, GrammarError<K>> {
        Self::new(left, right, ProductionClass::ContextSensitive)
    }

    pub fn context_free(lhs: Symbol<K>, rhs: impl Into<Word<K>>) -> Result<Self, GrammarError<K>> {
        Self::new([lhs], rhs, ProductionClass::ContextFree)
    }

    pub fn regular(lhs: Symbol<K>, rhs: impl Into<Word<K>>) -> Result<Self, GrammarError<K>> {
        Self::new([lhs], rhs, ProductionClass::Regular)
    }

    pub fn narrowest_class(&self) -> ProductionClass {
        ProductionClass::classify(&self.left, &self.right)
    }

    /// `S′ -> start`, context free by construction.
    pub(crate) fn augmented(start: Symbol<K>) -> Self {
        Production {
            left: Word::from([Symbol::Start]),
            right: Word::from([start]),
            class: ProductionClass::ContextFree,
        }
    }
}

impl<K> Production<K> {
    pub fn left(&self) -> &Word<K> {
        &self.left
    }

    pub fn right(&self) -> &Word<K> {
        &self.right
    }

    pub fn class(&self) -> ProductionClass {
        self.class
    }

    /// The single left-hand nonterminal, for productions that have one.
    pub fn lhs(&self) -> Option<&Symbol<K>> {
        match &self.left[..] {
            [s] if s.is_nonterminal() => Some(s),
            _ => None,
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.right.is_epsilon()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol<K>> {
        self.left.iter().chain(self.right.iter())
    }
}
