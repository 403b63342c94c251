//! The LR(0) automaton: item sets closed under the closure rule, and the goto
//! function between them.

use crate::grammar::{ExtendedGrammar, ProdId};
use crate::symbol::{Symbol, Word};
use alloc::collections::{BTreeSet, VecDeque};
use core::hash::Hash;
use hashbrown::HashMap;
use log::debug;

/// Index of a state in the [`CanonicalCollection`].
pub type StateId = usize;

/// An LR(0) item: a production with a dot before `right[dot]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub production: ProdId,
    pub dot: usize,
}

/// Ordered, so equal sets hash and iterate identically.
pub type ItemSet = BTreeSet<Item>;

impl Item {
    pub fn new(production: ProdId, dot: usize) -> Self {
        Item { production, dot }
    }

    pub fn advance(self) -> Self {
        Item {
            production: self.production,
            dot: self.dot + 1,
        }
    }

    /// The symbol right after the dot, if any.
    pub fn next_symbol<'g, K: PartialEq>(
        &self,
        grammar: &'g ExtendedGrammar<K>,
    ) -> Option<&'g Symbol<K>> {
        grammar.production(self.production)?.right().get(self.dot)
    }

    /// An item naming a production `grammar` does not have is never complete.
    pub fn is_complete<K: PartialEq>(&self, grammar: &ExtendedGrammar<K>) -> bool {
        grammar
            .production(self.production)
            .is_some_and(|p| self.dot >= p.right().len())
    }

    pub fn lhs<'g, K: PartialEq>(&self, grammar: &'g ExtendedGrammar<K>) -> Option<&'g Symbol<K>> {
        grammar.production(self.production)?.lhs()
    }

    /// Right side with [`Symbol::Dot`] in place: `[E → E · + T]`. For
    /// diagnostics.
    pub fn dotted<K: PartialEq + Clone>(&self, grammar: &ExtendedGrammar<K>) -> Option<Word<K>> {
        Some(grammar.production(self.production)?.right().with_dot(self.dot))
    }
}

/// Adds `[B → ·γ]` for every item `[A → α·Bβ]` until nothing new appears.
pub fn closure<K: Eq + Hash>(grammar: &ExtendedGrammar<K>, kernel: ItemSet) -> ItemSet {
    let mut items = kernel;
    let mut queue: VecDeque<Item> = items.iter().copied().collect();

    while let Some(item) = queue.pop_front() {
        let Some(b) = item.next_symbol(grammar) else {
            continue;
        };
        if !b.is_nonterminal() {
            continue;
        }
        for (id, _) in grammar.productions_of(b) {
            let fresh = Item::new(id, 0);
            if items.insert(fresh) {
                queue.push_back(fresh);
            }
        }
    }
    items
}

/// `closure({ [A → αX·β] | [A → α·Xβ] ∈ items })`, or `None` when no item
/// can move over `symbol`.
pub fn goto<K: Eq + Hash>(
    grammar: &ExtendedGrammar<K>,
    items: &ItemSet,
    symbol: &Symbol<K>,
) -> Option<ItemSet> {
    let kernel: ItemSet = items
        .iter()
        .filter(|it| it.next_symbol(grammar) == Some(symbol))
        .map(|it| it.advance())
        .collect();

    if kernel.is_empty() {
        None
    } else {
        Some(closure(grammar, kernel))
    }
}

/// All item sets reachable from `closure({[S′ → ·S]})`, numbered in discovery
/// order, plus the goto transitions between them.
#[derive(Debug, Clone)]
pub struct CanonicalCollection<K: Eq + Hash> {
    grammar: ExtendedGrammar<K>,
    states: Vec<ItemSet>,
    index: HashMap<ItemSet, StateId>,
    transitions: Vec<HashMap<Symbol<K>, StateId>>,
}

impl<K: Eq + Hash + Clone> CanonicalCollection<K> {
    pub fn build(grammar: ExtendedGrammar<K>) -> Self {
        let initial = closure(&grammar, ItemSet::from([Item::new(grammar.augmented(), 0)]));
        let mut cc = CanonicalCollection {
            grammar,
            states: Vec::new(),
            index: HashMap::new(),
            transitions: Vec::new(),
        };
        cc.intern(initial);

        let mut queue = VecDeque::from([0]);
        while let Some(state) = queue.pop_front() {
            // symbols after a dot, in item order
            let mut symbols: Vec<Symbol<K>> = Vec::new();
            for item in &cc.states[state] {
                if let Some(x) = item.next_symbol(&cc.grammar) {
                    if !symbols.contains(x) {
                        symbols.push(x.clone());
                    }
                }
            }

            for x in symbols {
                let Some(items) = goto(&cc.grammar, &cc.states[state], &x) else {
                    continue;
                };
                let (target, fresh) = cc.intern(items);
                if fresh {
                    queue.push_back(target);
                }
                cc.transitions[state].insert(x, target);
            }
        }

        debug!(
            "canonical collection: {} states, {} transitions",
            cc.states.len(),
            cc.transitions.iter().map(HashMap::len).sum::<usize>()
        );
        cc
    }

    fn intern(&mut self, items: ItemSet) -> (StateId, bool) {
        if let Some(&id) = self.index.get(&items) {
            return (id, false);
        }
        let id = self.states.len();
        self.index.insert(items.clone(), id);
        self.states.push(items);
        self.transitions.push(HashMap::new());
        (id, true)
    }

    /// Whether applying the closure rule to `state` would add nothing.
    pub fn is_closed(&self, state: StateId) -> bool {
        self.states
            .get(state)
            .is_some_and(|items| closure(&self.grammar, items.clone()) == *items)
    }
}

impl<K: Eq + Hash> CanonicalCollection<K> {
    pub fn grammar(&self) -> &ExtendedGrammar<K> {
        &self.grammar
    }

    /// Always 0.
    pub fn initial(&self) -> StateId {
        0
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&ItemSet> {
        self.states.get(id)
    }

    /// Looks a state up by full item-set equality.
    pub fn find(&self, items: &ItemSet) -> Option<StateId> {
        self.index.get(items).copied()
    }

    pub fn goto(&self, state: StateId, symbol: &Symbol<K>) -> Option<StateId> {
        self.transitions.get(state)?.get(symbol).copied()
    }

    pub fn transitions(&self, state: StateId) -> impl Iterator<Item = (&Symbol<K>, StateId)> {
        self.transitions
            .get(state)
            .into_iter()
            .flat_map(|row| row.iter().map(|(s, t)| (s, *t)))
    }

    /// The state holding `[S′ → S·]`.
    pub fn accepting_state(&self) -> Option<StateId> {
        let done = Item::new(self.grammar.augmented(), 1);
        self.states.iter().position(|items| items.contains(&done))
    }
}
