//! Symbols, words and alphabets.
//!
//! A [`Symbol`] is either a *named* symbol (terminal or nonterminal) compared by
//! its payload, or one of the payload free sentinels ([`Symbol::Start`],
//! [`Symbol::Eof`], [`Symbol::Dot`]) which only ever equal themselves.

use crate::error::GrammarError;
use alloc::sync::Arc;
use core::borrow::Borrow;
use core::hash::Hash;
use core::ops::Deref;
use hashbrown::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol<K> {
    /// real token coming from the user's alphabet
    Terminal(K),
    /// derived symbol
    Nonterminal(K),
    /// augmented start symbol (S′) of the extended grammar
    Start,
    /// synthetic end-of-input symbol ($)
    Eof,
    /// position marker inside LR items
    Dot,
}

impl<K> Symbol<K> {
    pub fn terminal(k: impl Into<K>) -> Self {
        Symbol::Terminal(k.into())
    }

    pub fn nonterminal(k: impl Into<K>) -> Self {
        Symbol::Nonterminal(k.into())
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    /// `Start` counts as a nonterminal: it has exactly one production.
    #[inline]
    pub fn is_nonterminal(&self) -> bool {
        matches!(self, Symbol::Nonterminal(_) | Symbol::Start)
    }

    #[inline]
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Symbol::Start | Symbol::Eof | Symbol::Dot)
    }

    pub fn payload(&self) -> Option<&K> {
        match self {
            Symbol::Terminal(k) | Symbol::Nonterminal(k) => Some(k),
            _ => None,
        }
    }

    /// Compares the payload of a named symbol against a raw value.
    /// Sentinels never match anything.
    pub fn is<Q>(&self, raw: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.payload()
            .is_some_and(|k| <K as Borrow<Q>>::borrow(k) == raw)
    }

    /// Reinterprets the symbol as a nonterminal.
    pub fn into_nonterminal(self) -> Result<Self, GrammarError<K>> {
        match self {
            Symbol::Nonterminal(_) | Symbol::Start => Ok(self),
            Symbol::Terminal(k) => Err(GrammarError::TerminalAsNonterminal(k)),
            other => Err(GrammarError::NotANonterminal(other)),
        }
    }
}

/// An ordered sequence of symbols. The empty word is epsilon.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word<K>(Arc<[Symbol<K>]>);

impl<K> Word<K> {
    pub fn epsilon() -> Self {
        Word(Arc::from(Vec::new()))
    }

    #[inline]
    pub fn is_epsilon(&self) -> bool {
        self.0.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol<K>] {
        &self.0
    }

    pub fn nonterminal_positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_nonterminal().then_some(i))
    }
}

impl<K: Clone> Word<K> {
    /// Copy of this word with [`Symbol::Dot`] inserted before position `pos`.
    pub fn with_dot(&self, pos: usize) -> Self {
        let pos = pos.min(self.len());
        let mut v = Vec::with_capacity(self.len() + 1);
        v.extend_from_slice(&self.0[..pos]);
        v.push(Symbol::Dot);
        v.extend_from_slice(&self.0[pos..]);
        Word(v.into())
    }
}

impl<K: PartialEq> Word<K> {
    /// Contiguous sub-word containment. Epsilon is contained in every word.
    pub fn contains_word(&self, needle: &[Symbol<K>]) -> bool {
        needle.is_empty() || self.0.windows(needle.len()).any(|w| w == needle)
    }

    pub fn starts_with(&self, prefix: &[Symbol<K>]) -> bool {
        self.0.starts_with(prefix)
    }

    pub fn ends_with(&self, suffix: &[Symbol<K>]) -> bool {
        self.0.ends_with(suffix)
    }
}

impl<K> Deref for Word<K> {
    type Target = [Symbol<K>];

    fn deref(&self) -> &[Symbol<K>] {
        &self.0
    }
}

impl<K> Default for Word<K> {
    fn default() -> Self {
        Self::epsilon()
    }
}

impl<K> From<Vec<Symbol<K>>> for Word<K> {
    fn from(v: Vec<Symbol<K>>) -> Self {
        Word(v.into())
    }
}

impl<K, const N: usize> From<[Symbol<K>; N]> for Word<K> {
    fn from(v: [Symbol<K>; N]) -> Self {
        Word(Arc::from(Vec::from(v)))
    }
}

impl<K: Clone> From<&[Symbol<K>]> for Word<K> {
    fn from(v: &[Symbol<K>]) -> Self {
        Word(v.into())
    }
}

impl<K> FromIterator<Symbol<K>> for Word<K> {
    fn from_iter<I: IntoIterator<Item = Symbol<K>>>(iter: I) -> Self {
        Word(iter.into_iter().collect())
    }
}

/// A set of symbols; only membership matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet<K: Eq + Hash>(HashSet<Symbol<K>>);

impl<K: Eq + Hash> Default for Alphabet<K> {
    fn default() -> Self {
        Alphabet(HashSet::new())
    }
}

impl<K: Eq + Hash> Alphabet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol<K>) -> bool {
        self.0.insert(symbol)
    }

    pub fn contains(&self, symbol: &Symbol<K>) -> bool {
        self.0.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol<K>> {
        self.0.iter()
    }
}

impl<K: Eq + Hash> FromIterator<Symbol<K>> for Alphabet<K> {
    fn from_iter<I: IntoIterator<Item = Symbol<K>>>(iter: I) -> Self {
        Alphabet(iter.into_iter().collect())
    }
}

impl<K: Eq + Hash> Extend<Symbol<K>> for Alphabet<K> {
    fn extend<I: IntoIterator<Item = Symbol<K>>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<'a, K: Eq + Hash> IntoIterator for &'a Alphabet<K> {
    type Item = &'a Symbol<K>;
    type IntoIter = hashbrown::hash_set::Iter<'a, Symbol<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
