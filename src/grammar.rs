//! Grammars and the tables derived from them.
//!
//! A [`Grammar`] is immutable once built. Every derived table is computed on
//! first access and kept for the grammar's lifetime:
//!
//! ```text
//!   Grammar ──► FIRST ──► FOLLOW ─────────────┐
//!      │                                      ▼
//!      └──► ExtendedGrammar ──► CanonicalCollection ──► ActionTable
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use chomsky_lr::{Action, Grammar, Symbol};
//!
//! // S → E,  E → E '+' T | T,  T → 'id'
//! let t = |k: &str| Symbol::<String>::terminal(k);
//! let n = |k: &str| Symbol::<String>::nonterminal(k);
//! let g = Grammar::builder()
//!     .start("S")
//!     .rule("S", [n("E")])
//!     .rule("E", [n("E"), t("+"), n("T")])
//!     .rule("E", [n("T")])
//!     .rule("T", [t("id")])
//!     .build()
//!     .unwrap();
//!
//! let cc = g.canonical_collection().unwrap();
//! let table = g.action_table().unwrap();
//! let after_id = cc.goto(cc.initial(), &t("id")).unwrap();
//! assert_eq!(table.get(cc.initial(), &t("id")).unwrap(), Some(Action::Shift(after_id)));
//! assert!(matches!(table.get(after_id, &Symbol::Eof).unwrap(), Some(Action::Reduce(_))));
//! ```

use crate::action::ActionTable;
use crate::config::TableConfig;
use crate::error::GrammarError;
use crate::follow::{FirstTable, FollowTable};
use crate::lr::CanonicalCollection;
use crate::production::{Production, ProductionClass};
use crate::symbol::{Alphabet, Symbol};
use core::hash::Hash;
use either::Either;
use hashbrown::HashSet;
use log::debug;
use std::sync::OnceLock;

pub type ProdId = usize;

/// A validated grammar `(Σ, N, P, S)`.
#[derive(Debug, Clone)]
pub struct Grammar<K: Eq + Hash> {
    terminals: Alphabet<K>,
    nonterminals: Alphabet<K>,
    productions: Vec<Production<K>>,
    start: Symbol<K>,
    config: TableConfig,

    first: OnceLock<FirstTable<K>>,
    follow: OnceLock<FollowTable<K>>,
    collection: OnceLock<CanonicalCollection<K>>,
    actions: OnceLock<Result<ActionTable<K>, GrammarError<K>>>,
}

impl<K: Eq + Hash + Clone> Grammar<K> {
    pub fn builder() -> GrammarBuilder<K> {
        GrammarBuilder::new()
    }

    pub fn new(
        terminals: Alphabet<K>,
        nonterminals: Alphabet<K>,
        productions: impl IntoIterator<Item = Production<K>>,
        start: Symbol<K>,
    ) -> Result<Self, GrammarError<K>> {
        Self::with_config(terminals, nonterminals, productions, start, TableConfig::default())
    }

    pub fn with_config(
        terminals: Alphabet<K>,
        nonterminals: Alphabet<K>,
        productions: impl IntoIterator<Item = Production<K>>,
        start: Symbol<K>,
        config: TableConfig,
    ) -> Result<Self, GrammarError<K>> {
        for s in &terminals {
            if !s.is_terminal() {
                return Err(GrammarError::NotATerminal(s.clone()));
            }
        }
        for s in &nonterminals {
            match s {
                Symbol::Nonterminal(k) => {
                    if terminals.contains(&Symbol::Terminal(k.clone())) {
                        return Err(GrammarError::AmbiguousPayload(k.clone()));
                    }
                }
                Symbol::Terminal(k) => return Err(GrammarError::TerminalAsNonterminal(k.clone())),
                // the sentinels are reserved
                other => return Err(GrammarError::NotANonterminal(other.clone())),
            }
        }
        if !nonterminals.contains(&start) {
            return Err(GrammarError::StartNotInAlphabet(start));
        }

        let mut seen = HashSet::new();
        let productions: Vec<Production<K>> = productions
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();

        for s in productions.iter().flat_map(Production::symbols) {
            if !terminals.contains(s) && !nonterminals.contains(s) {
                return Err(GrammarError::UnknownSymbol(s.clone()));
            }
        }

        Ok(Grammar {
            terminals,
            nonterminals,
            productions,
            start,
            config,
            first: OnceLock::new(),
            follow: OnceLock::new(),
            collection: OnceLock::new(),
            actions: OnceLock::new(),
        })
    }

    /// Narrowest class every production belongs to.
    pub fn class(&self) -> ProductionClass {
        self.productions
            .iter()
            .map(Production::narrowest_class)
            .min()
            .unwrap_or(ProductionClass::Regular)
    }

    pub fn is_context_free(&self) -> bool {
        self.class() >= ProductionClass::ContextFree
    }

    fn require_context_free(&self) -> Result<(), GrammarError<K>> {
        match self.class() {
            c if c >= ProductionClass::ContextFree => Ok(()),
            c => Err(GrammarError::NotContextFree(c)),
        }
    }

    /// FIRST sets and nullability, computed once.
    pub fn first(&self) -> Result<&FirstTable<K>, GrammarError<K>> {
        self.require_context_free()?;
        Ok(self.first.get_or_init(|| FirstTable::compute(&self.productions)))
    }

    /// FOLLOW sets, computed once.
    pub fn follow(&self) -> Result<&FollowTable<K>, GrammarError<K>> {
        let first = self.first()?;
        Ok(self.follow.get_or_init(|| {
            let follow =
                FollowTable::compute(&self.productions, &self.nonterminals, &self.start, first);
            debug!("computed FOLLOW for {} nonterminals", follow.len());
            follow
        }))
    }

    /// The grammar plus `S′ -> S`.
    pub fn extended(&self) -> Result<ExtendedGrammar<K>, GrammarError<K>> {
        self.require_context_free()?;
        Ok(ExtendedGrammar::new(self))
    }

    /// LR(0) states and their goto function, computed once.
    pub fn canonical_collection(&self) -> Result<&CanonicalCollection<K>, GrammarError<K>> {
        self.require_context_free()?;
        Ok(self
            .collection
            .get_or_init(|| CanonicalCollection::build(ExtendedGrammar::new(self))))
    }

    /// The ACTION table, computed once. A rejected table is cached as well, so
    /// every call reports the same conflicts.
    pub fn action_table(&self) -> Result<&ActionTable<K>, GrammarError<K>> {
        let follow = self.follow()?;
        let collection = self.canonical_collection()?;
        self.actions
            .get_or_init(|| ActionTable::build(collection, follow, &self.terminals, &self.config))
            .as_ref()
            .map_err(GrammarError::clone)
    }
}

impl<K: Eq + Hash> Grammar<K> {
    pub fn terminals(&self) -> &Alphabet<K> {
        &self.terminals
    }

    pub fn nonterminals(&self) -> &Alphabet<K> {
        &self.nonterminals
    }

    pub fn productions(&self) -> &[Production<K>] {
        &self.productions
    }

    pub fn production(&self, id: ProdId) -> Option<&Production<K>> {
        self.productions.get(id)
    }

    pub fn start(&self) -> &Symbol<K> {
        &self.start
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Alternatives of `nonterminal`, with their ids.
    pub fn productions_of<'a>(
        &'a self,
        nonterminal: &'a Symbol<K>,
    ) -> impl Iterator<Item = (ProdId, &'a Production<K>)> + 'a {
        self.productions
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.lhs() == Some(nonterminal))
    }
}

/// The grammar's productions followed by the augmented `S′ -> S`, which is
/// always the last one. Ids below [`ExtendedGrammar::augmented`] match
/// [`Grammar::productions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedGrammar<K> {
    productions: Vec<Production<K>>,
    start: Symbol<K>,
}

impl<K: Eq + Hash + Clone> ExtendedGrammar<K> {
    fn new(grammar: &Grammar<K>) -> Self {
        let mut productions = grammar.productions.clone();
        productions.push(Production::augmented(grammar.start.clone()));
        ExtendedGrammar {
            productions,
            start: grammar.start.clone(),
        }
    }
}

impl<K: PartialEq> ExtendedGrammar<K> {
    pub fn productions(&self) -> &[Production<K>] {
        &self.productions
    }

    pub fn production(&self, id: ProdId) -> Option<&Production<K>> {
        self.productions.get(id)
    }

    pub fn augmented(&self) -> ProdId {
        self.productions.len() - 1
    }

    pub fn augmented_production(&self) -> &Production<K> {
        &self.productions[self.augmented()]
    }

    /// The start symbol `S` of the underlying grammar.
    pub fn start(&self) -> &Symbol<K> {
        &self.start
    }

    pub fn productions_of<'a>(
        &'a self,
        nonterminal: &'a Symbol<K>,
    ) -> impl Iterator<Item = (ProdId, &'a Production<K>)> + 'a {
        if matches!(nonterminal, Symbol::Start) {
            Either::Left(core::iter::once((self.augmented(), self.augmented_production())))
        } else {
            Either::Right(
                self.productions[..self.augmented()]
                    .iter()
                    .enumerate()
                    .filter(move |(_, p)| p.lhs() == Some(nonterminal)),
            )
        }
    }
}

/// Collects alphabets, productions and configuration for a [`Grammar`].
///
/// Alphabets are inferred from the tagged symbols used in [`GrammarBuilder::rule`];
/// the first invalid rule is remembered and reported by [`GrammarBuilder::build`].
#[derive(Debug, Clone)]
pub struct GrammarBuilder<K: Eq + Hash> {
    terminals: Alphabet<K>,
    nonterminals: Alphabet<K>,
    productions: Vec<Production<K>>,
    start: Option<Symbol<K>>,
    config: TableConfig,
    error: Option<GrammarError<K>>,
}

impl<K: Eq + Hash + Clone> Default for GrammarBuilder<K> {
    fn default() -> Self {
        Self {
            terminals: Alphabet::new(),
            nonterminals: Alphabet::new(),
            productions: Vec::new(),
            start: None,
            config: TableConfig::default(),
            error: None,
        }
    }
}

impl<K: Eq + Hash + Clone> GrammarBuilder<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminal(mut self, k: impl Into<K>) -> Self {
        self.terminals.insert(Symbol::Terminal(k.into()));
        self
    }

    pub fn nonterminal(mut self, k: impl Into<K>) -> Self {
        self.nonterminals.insert(Symbol::Nonterminal(k.into()));
        self
    }

    pub fn start(mut self, k: impl Into<K>) -> Self {
        let start = Symbol::Nonterminal(k.into());
        self.nonterminals.insert(start.clone());
        self.start = Some(start);
        self
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds the context-free production `lhs -> rhs`.
    pub fn rule(self, lhs: impl Into<K>, rhs: impl IntoIterator<Item = Symbol<K>>) -> Self {
        let rhs: Vec<Symbol<K>> = rhs.into_iter().collect();
        let production = Production::context_free(Symbol::Nonterminal(lhs.into()), rhs);
        self.try_production(production)
    }

    pub fn production(self, production: Production<K>) -> Self {
        self.try_production(Ok(production))
    }

    /// Adds `left -> right`, validated as a production of `class`.
    pub fn rewrite(
        self,
        left: impl IntoIterator<Item = Symbol<K>>,
        right: impl IntoIterator<Item = Symbol<K>>,
        class: ProductionClass,
    ) -> Self {
        let left: Vec<Symbol<K>> = left.into_iter().collect();
        let right: Vec<Symbol<K>> = right.into_iter().collect();
        self.try_production(Production::new(left, right, class))
    }

    fn try_production(mut self, production: Result<Production<K>, GrammarError<K>>) -> Self {
        match production {
            Ok(p) => {
                for s in p.symbols() {
                    match s {
                        Symbol::Terminal(_) => self.terminals.insert(s.clone()),
                        Symbol::Nonterminal(_) => self.nonterminals.insert(s.clone()),
                        _ => false,
                    };
                }
                self.productions.push(p);
            }
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    /// Without an explicit start symbol the left side of the first rule is used.
    pub fn build(self) -> Result<Grammar<K>, GrammarError<K>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let start = match self.start {
            Some(s) => s,
            None => self
                .productions
                .iter()
                .find_map(Production::lhs)
                .cloned()
                .ok_or(GrammarError::MissingStart)?,
        };
        Grammar::with_config(
            self.terminals,
            self.nonterminals,
            self.productions,
            start,
            self.config,
        )
    }
}
