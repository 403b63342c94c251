//! FIRST / FOLLOW fixed points over context-free productions.
//!
//! Both tables only ever grow (union only), so the loops below terminate once
//! a full pass adds nothing.
//!
//! ```text
//!   FirstTable::compute      (nullable + FIRST per nonterminal)
//!          │
//!          ▼
//!   FollowTable::compute     seed FOLLOW(start) = { $ }
//!          │
//!          ├── direct pass   FIRST(β) ⊆ FOLLOW(B)     for  A → α B β
//!          └── propagate     FOLLOW(A) ⊆ FOLLOW(B)    for  A → α B β, β ⇒* ε
//! ```

use crate::production::Production;
use crate::symbol::{Alphabet, Symbol};
use alloc::collections::VecDeque;
use core::hash::Hash;
use core::ops::Index;
use hashbrown::{HashMap, HashSet};

/// FIRST of a symbol string: the terminals (or `$`) it can start with, and
/// whether it can derive the empty word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSet<K: Eq + Hash> {
    pub terminals: HashSet<Symbol<K>>,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstTable<K: Eq + Hash> {
    /// FIRST(A), never containing ε (that lives in `nullable`)
    first: HashMap<Symbol<K>, HashSet<Symbol<K>>>,
    nullable: HashSet<Symbol<K>>,
}

impl<K: Eq + Hash + Clone> FirstTable<K> {
    /// Productions without a single left-hand nonterminal are ignored.
    pub fn compute(productions: &[Production<K>]) -> Self {
        let mut table = FirstTable {
            first: HashMap::new(),
            nullable: HashSet::new(),
        };
        for lhs in productions.iter().filter_map(Production::lhs) {
            table.first.entry(lhs.clone()).or_default();
        }

        loop {
            let mut changed = false;
            for p in productions {
                let Some(lhs) = p.lhs() else {
                    continue;
                };
                let found = table.first_of(p.right());
                let set = table.first.entry(lhs.clone()).or_default();
                for x in found.terminals {
                    changed |= set.insert(x);
                }
                if found.nullable {
                    changed |= table.nullable.insert(lhs.clone());
                }
            }
            if !changed {
                break;
            }
        }
        table
    }

    /// FIRST of an arbitrary symbol string. `Dot` markers are transparent.
    pub fn first_of(&self, symbols: &[Symbol<K>]) -> FirstSet<K> {
        let mut terminals = HashSet::new();
        for s in symbols {
            match s {
                Symbol::Terminal(_) | Symbol::Eof => {
                    terminals.insert(s.clone());
                    return FirstSet {
                        terminals,
                        nullable: false,
                    };
                }
                Symbol::Nonterminal(_) | Symbol::Start => {
                    if let Some(f) = self.first.get(s) {
                        terminals.extend(f.iter().cloned());
                    }
                    if !self.nullable.contains(s) {
                        return FirstSet {
                            terminals,
                            nullable: false,
                        };
                    }
                }
                Symbol::Dot => {}
            }
        }
        FirstSet {
            terminals,
            nullable: true,
        }
    }
}

impl<K: Eq + Hash> FirstTable<K> {
    pub fn get(&self, nonterminal: &Symbol<K>) -> Option<&HashSet<Symbol<K>>> {
        self.first.get(nonterminal)
    }

    pub fn is_nullable(&self, nonterminal: &Symbol<K>) -> bool {
        self.nullable.contains(nonterminal)
    }
}

/// Scans one right-hand side of `target` and records, for every nonterminal
/// occurrence `B`, the FIRST of what follows it. A nullable tail adds the edge
/// `target -> B` to `tails`. Returns whether any FOLLOW set grew.
#[inline(always)]
fn update_follow_con<K: Eq + Hash + Clone>(
    target: &Symbol<K>,
    tokens: &[Symbol<K>],
    first: &FirstTable<K>,
    follow: &mut HashMap<Symbol<K>, HashSet<Symbol<K>>>,
    tails: &mut HashMap<Symbol<K>, HashSet<Symbol<K>>>,
) -> bool {
    let mut grew = false;
    for (i, t) in tokens.iter().enumerate().rev() {
        if !t.is_nonterminal() {
            continue;
        }
        let suffix = first.first_of(&tokens[i + 1..]);

        let spot = follow.entry(t.clone()).or_default();
        for x in suffix.terminals {
            grew |= spot.insert(x);
        }

        if t != target && suffix.nullable {
            tails.entry(target.clone()).or_default().insert(t.clone());
        }
    }
    grew
}

/// FOLLOW(A) for every nonterminal A; may contain [`Symbol::Eof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowTable<K: Eq + Hash> {
    sets: HashMap<Symbol<K>, HashSet<Symbol<K>>>,
}

impl<K: Eq + Hash + Clone> FollowTable<K> {
    /// Every symbol of `nonterminals` gets an entry, empty if nothing can
    /// follow it.
    pub fn compute(
        productions: &[Production<K>],
        nonterminals: &Alphabet<K>,
        start: &Symbol<K>,
        first: &FirstTable<K>,
    ) -> Self {
        let mut table = FollowTable {
            sets: HashMap::new(),
        };
        for s in nonterminals.iter().chain(productions.iter().flat_map(Production::symbols)) {
            if s.is_nonterminal() {
                table.sets.entry(s.clone()).or_default();
            }
        }
        table.sets.entry(start.clone()).or_default().insert(Symbol::Eof);
        table.refine(productions, first);
        table
    }

    /// Runs the direct pass and the propagation again on top of the current
    /// sets. Returns `true` if anything was added; on a converged table it
    /// returns `false` and leaves it untouched.
    pub fn refine(&mut self, productions: &[Production<K>], first: &FirstTable<K>) -> bool {
        let mut grew = false;
        let mut tails = HashMap::new();
        for p in productions {
            let Some(target) = p.lhs() else {
                continue;
            };
            grew |= update_follow_con(target, p.right(), first, &mut self.sets, &mut tails);
        }

        let queue: VecDeque<Symbol<K>> = self.sets.keys().cloned().collect();
        grew |= self.propagate(queue, &tails);
        grew
    }

    fn propagate(
        &mut self,
        mut queue: VecDeque<Symbol<K>>,
        tails: &HashMap<Symbol<K>, HashSet<Symbol<K>>>,
    ) -> bool {
        let mut grew_any = false;
        let mut in_queue: HashSet<Symbol<K>> = queue.iter().cloned().collect();

        while let Some(u) = queue.pop_front() {
            in_queue.remove(&u);

            let Some(dests) = tails.get(&u) else {
                continue;
            };
            let src: Vec<Symbol<K>> = self.sets.get(&u).into_iter().flatten().cloned().collect();

            // for every edge  u → v
            for v in dests {
                let dest = self.sets.entry(v.clone()).or_default();

                let mut grew = false;
                for sym in &src {
                    grew |= dest.insert(sym.clone());
                }

                // if FOLLOW(v) grew, (re)-enqueue v exactly once
                if grew && in_queue.insert(v.clone()) {
                    queue.push_back(v.clone());
                }
                grew_any |= grew;
            }
        }
        grew_any
    }
}

impl<K: Eq + Hash> FollowTable<K> {
    pub fn get(&self, nonterminal: &Symbol<K>) -> Option<&HashSet<Symbol<K>>> {
        self.sets.get(nonterminal)
    }

    pub fn contains(&self, nonterminal: &Symbol<K>, lookahead: &Symbol<K>) -> bool {
        self.sets.get(nonterminal).is_some_and(|s| s.contains(lookahead))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol<K>, &HashSet<Symbol<K>>)> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl<K: Eq + Hash> Index<&Symbol<K>> for FollowTable<K> {
    type Output = HashSet<Symbol<K>>;

    fn index(&self, nonterminal: &Symbol<K>) -> &HashSet<Symbol<K>> {
        &self.sets[nonterminal]
    }
}

#[cfg(test)]
mod tests {
    use super::{FirstTable, FollowTable};
    use crate::production::Production;
    use crate::symbol::{Alphabet, Symbol};
    use hashbrown::HashSet;

    type S = Symbol<char>;

    fn t(k: char) -> S {
        Symbol::Terminal(k)
    }

    fn n(k: char) -> S {
        Symbol::Nonterminal(k)
    }

    /// Helper to build a context-free production
    fn rule(lhs: char, rhs: &[S]) -> Production<char> {
        Production::context_free(n(lhs), rhs.to_vec()).unwrap()
    }

    fn nonterminals(rules: &[Production<char>]) -> Alphabet<char> {
        rules.iter().filter_map(Production::lhs).cloned().collect()
    }

    fn set<T: Eq + core::hash::Hash + Clone>(xs: &[T]) -> HashSet<T> {
        xs.iter().cloned().collect()
    }

    //   S → A B
    //   A → ε | 'a'
    //   B → C | 'b'
    //   C → ε
    fn nullable_chain() -> Vec<Production<char>> {
        vec![
            rule('S', &[n('A'), n('B')]),
            rule('A', &[]),
            rule('A', &[t('a')]),
            rule('B', &[n('C')]),
            rule('B', &[t('b')]),
            rule('C', &[]),
        ]
    }

    #[test]
    fn first_and_nullable_propagation() {
        let mut rules = nullable_chain();
        // Z → $
        rules.push(rule('Z', &[S::Eof]));

        let first = FirstTable::compute(&rules);

        assert_eq!(first.get(&n('A')), Some(&set(&[t('a')])), "FIRST(A)");
        assert_eq!(first.get(&n('B')), Some(&set(&[t('b')])), "FIRST(B)");
        assert_eq!(first.get(&n('S')), Some(&set(&[t('a'), t('b')])), "FIRST(S)");
        assert_eq!(first.get(&n('Z')), Some(&set(&[S::Eof])), "FIRST(Z)");

        for nt in ['S', 'A', 'B', 'C'] {
            assert!(first.is_nullable(&n(nt)), "{nt} should be nullable");
        }
        assert!(!first.is_nullable(&n('Z')));
    }

    #[test]
    fn first_of_strings() {
        let first = FirstTable::compute(&nullable_chain());

        let f = first.first_of(&[n('A'), t('x')]);
        assert_eq!(f.terminals, set(&[t('a'), t('x')]));
        assert!(!f.nullable);

        let f = first.first_of(&[n('A'), n('C')]);
        assert_eq!(f.terminals, set(&[t('a')]));
        assert!(f.nullable);

        let f = first.first_of(&[]);
        assert!(f.terminals.is_empty());
        assert!(f.nullable);
    }

    #[test]
    fn follow_various_cases() {
        let rules = nullable_chain();
        let first = FirstTable::compute(&rules);
        let follow = FollowTable::compute(&rules, &nonterminals(&rules), &n('S'), &first);

        assert_eq!(follow[&n('S')], set(&[S::Eof]));

        // 'b' from S → A B, $ because B is nullable at the tail of S
        assert_eq!(follow[&n('A')], set(&[t('b'), S::Eof]));
        assert_eq!(follow[&n('B')], set(&[S::Eof]));

        // B → C •, then FOLLOW(B)
        assert_eq!(follow[&n('C')], set(&[S::Eof]));
    }

    #[test]
    fn follow_through_recursion() {
        //   E → E '+' T | T
        //   T → T '*' F | F
        //   F → '(' E ')' | 'i'
        let rules = vec![
            rule('E', &[n('E'), t('+'), n('T')]),
            rule('E', &[n('T')]),
            rule('T', &[n('T'), t('*'), n('F')]),
            rule('T', &[n('F')]),
            rule('F', &[t('('), n('E'), t(')')]),
            rule('F', &[t('i')]),
        ];
        let first = FirstTable::compute(&rules);
        let mut follow = FollowTable::compute(&rules, &nonterminals(&rules), &n('E'), &first);

        assert_eq!(follow[&n('E')], set(&[t('+'), t(')'), S::Eof]));
        assert_eq!(follow[&n('T')], set(&[t('+'), t('*'), t(')'), S::Eof]));
        assert_eq!(follow[&n('F')], set(&[t('+'), t('*'), t(')'), S::Eof]));

        let before = follow.clone();
        assert!(!follow.refine(&rules, &first), "converged table must not grow");
        assert_eq!(follow, before);
    }

    #[test]
    fn unreachable_nonterminal_has_empty_follow() {
        let rules = vec![rule('S', &[t('a')]), rule('U', &[t('u'), n('S')])];
        let first = FirstTable::compute(&rules);
        let follow = FollowTable::compute(&rules, &nonterminals(&rules), &n('S'), &first);

        assert!(follow.contains(&n('S'), &S::Eof));
        assert_eq!(follow.get(&n('U')), Some(&HashSet::new()));
        assert!(!follow.contains(&n('U'), &S::Eof));
    }

    #[test]
    fn declared_but_unused_nonterminal_has_empty_follow() {
        let rules = vec![rule('S', &[t('a')])];
        let first = FirstTable::compute(&rules);
        let declared: Alphabet<char> = [n('S'), n('X')].into_iter().collect();
        let follow = FollowTable::compute(&rules, &declared, &n('S'), &first);

        assert_eq!(follow.len(), 2);
        assert_eq!(follow.get(&n('X')), Some(&HashSet::new()));
        assert!(follow[&n('X')].is_empty());
    }
}
