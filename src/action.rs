//! The ACTION table and the decision procedure behind it.
//!
//! For a state `s` and lookahead `t` the candidates are gathered in this order,
//! and under [`ConflictPolicy::PreferShift`] the first one wins:
//!
//! 1. **Shift** `goto(s, t)` if some item of `s` has its dot right before `t`.
//! 2. **Reduce** `A → α` for every complete item `[A → α·]` with `A ≠ S′`
//!    and `t = $` or `t ∈ FOLLOW(A)`, in item order.
//! 3. **Accept** if `t = $` and `[S′ → S·] ∈ s`.
//!
//! No candidate means no action: a syntax error for whoever drives the table.

use crate::config::{ConflictPolicy, TableConfig};
use crate::error::GrammarError;
use crate::follow::FollowTable;
use crate::grammar::ProdId;
use crate::lr::{CanonicalCollection, Item, StateId};
use crate::production::Production;
use crate::symbol::{Alphabet, Symbol};
use core::hash::Hash;
use hashbrown::{HashMap, HashSet};
use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(StateId),
    /// index into [`Grammar::productions`](crate::Grammar::productions)
    Reduce(ProdId),
    Accept,
}

/// A cell of the table with more than one qualifying action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict<K> {
    pub state: StateId,
    pub lookahead: Symbol<K>,
    /// in precedence order
    pub candidates: Vec<Action>,
}

/// `$` or a terminal of the grammar; anything else is an invalid query.
fn check_lookahead<K: Eq + Hash + Clone>(
    terminals: &Alphabet<K>,
    lookahead: &Symbol<K>,
) -> Result<(), GrammarError<K>> {
    if matches!(lookahead, Symbol::Eof) || terminals.contains(lookahead) {
        Ok(())
    } else {
        Err(GrammarError::UnknownLookahead(lookahead.clone()))
    }
}

/// Every action that qualifies for `(state, lookahead)`, in precedence order.
///
/// `state` must belong to `collection` and `lookahead` must be `$` or one of
/// `terminals`, the same checks [`ActionTable::get`] applies.
pub fn candidates<K: Eq + Hash + Clone>(
    collection: &CanonicalCollection<K>,
    follow: &FollowTable<K>,
    terminals: &Alphabet<K>,
    config: &TableConfig,
    state: StateId,
    lookahead: &Symbol<K>,
) -> Result<Vec<Action>, GrammarError<K>> {
    let grammar = collection.grammar();
    let items = collection
        .state(state)
        .ok_or(GrammarError::UnknownState(state))?;
    check_lookahead(terminals, lookahead)?;
    let at_eof = matches!(lookahead, Symbol::Eof);
    let mut found = Vec::new();

    // dot right before t, i.e. [· t] occurs in the dotted right side
    if items.iter().any(|it| it.next_symbol(grammar) == Some(lookahead)) {
        if let Some(target) = collection.goto(state, lookahead) {
            found.push(Action::Shift(target));
        }
    }

    for item in items {
        if !item.is_complete(grammar) {
            continue;
        }
        let Some(lhs) = item.lhs(grammar) else {
            continue;
        };
        if matches!(lhs, Symbol::Start) {
            continue;
        }
        if (at_eof && config.reduce_on_any_eof) || follow.contains(lhs, lookahead) {
            found.push(Action::Reduce(item.production));
        }
    }

    if at_eof && items.contains(&Item::new(grammar.augmented(), 1)) {
        found.push(Action::Accept);
    }
    Ok(found)
}

/// Terminals in order of first appearance in the productions, then the unused
/// ones, then `$`. Unused terminals never get an action.
fn lookahead_order<K: Eq + Hash + Clone>(
    collection: &CanonicalCollection<K>,
    terminals: &Alphabet<K>,
) -> Vec<Symbol<K>> {
    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(terminals.len() + 1);
    for s in collection.grammar().productions().iter().flat_map(Production::symbols) {
        if terminals.contains(s) && seen.insert(s) {
            order.push(s.clone());
        }
    }
    order.extend(terminals.iter().filter(|s| !seen.contains(s)).cloned());
    order.push(Symbol::Eof);
    order
}

/// ACTION[state, terminal-or-$].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable<K: Eq + Hash> {
    rows: Vec<HashMap<Symbol<K>, Action>>,
    terminals: Alphabet<K>,
    conflicts: Vec<Conflict<K>>,
}

impl<K: Eq + Hash + Clone> ActionTable<K> {
    pub fn build(
        collection: &CanonicalCollection<K>,
        follow: &FollowTable<K>,
        terminals: &Alphabet<K>,
        config: &TableConfig,
    ) -> Result<Self, GrammarError<K>> {
        let mut rows = Vec::with_capacity(collection.len());
        let mut conflicts = Vec::new();

        let lookaheads = lookahead_order(collection, terminals);
        for state in 0..collection.len() {
            let mut row = HashMap::new();
            for lookahead in &lookaheads {
                let found = candidates(collection, follow, terminals, config, state, lookahead)?;
                if let Some(&action) = found.first() {
                    row.insert(lookahead.clone(), action);
                }
                if found.len() > 1 {
                    trace!("state {state}: {} candidates for one lookahead", found.len());
                    conflicts.push(Conflict {
                        state,
                        lookahead: lookahead.clone(),
                        candidates: found,
                    });
                }
            }
            rows.push(row);
        }

        debug!(
            "action table: {} states, {} entries, {} conflicts",
            rows.len(),
            rows.iter().map(HashMap::len).sum::<usize>(),
            conflicts.len()
        );

        if !conflicts.is_empty() && config.conflicts == ConflictPolicy::Reject {
            return Err(GrammarError::Conflicts(conflicts));
        }
        Ok(ActionTable {
            rows,
            terminals: terminals.clone(),
            conflicts,
        })
    }

    fn check(&self, state: StateId, lookahead: &Symbol<K>) -> Result<(), GrammarError<K>> {
        if state >= self.rows.len() {
            return Err(GrammarError::UnknownState(state));
        }
        check_lookahead(&self.terminals, lookahead)
    }

    /// `Ok(None)` is a legitimate answer: no action, i.e. a syntax error.
    pub fn get(&self, state: StateId, lookahead: &Symbol<K>) -> Result<Option<Action>, GrammarError<K>> {
        self.check(state, lookahead)?;
        Ok(self.rows[state].get(lookahead).copied())
    }

    /// Lookaheads with a defined action in `state`.
    pub fn expected(&self, state: StateId) -> Result<impl Iterator<Item = &Symbol<K>>, GrammarError<K>> {
        self.check(state, &Symbol::Eof)?;
        Ok(self.rows[state].keys())
    }
}

impl<K: Eq + Hash> ActionTable<K> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells resolved by precedence. Always empty for a table built with
    /// [`ConflictPolicy::Reject`].
    pub fn conflicts(&self) -> &[Conflict<K>] {
        &self.conflicts
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &Symbol<K>, Action)> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(state, row)| row.iter().map(move |(t, a)| (state, t, *a)))
    }
}
