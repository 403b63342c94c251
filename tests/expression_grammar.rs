//! The textbook expression grammar, end to end:
//!
//!   S → E
//!   E → E '+' T | T
//!   T → 'id'

use chomsky_lr::{Action, Grammar, GrammarError, Item, Production, ProductionClass, Symbol};

fn t(k: &str) -> Symbol<String> {
    Symbol::terminal(k)
}

fn n(k: &str) -> Symbol<String> {
    Symbol::nonterminal(k)
}

fn expression() -> Grammar<String> {
    Grammar::builder()
        .start("S")
        .rule("S", [n("E")])
        .rule("E", [n("E"), t("+"), n("T")])
        .rule("E", [n("T")])
        .rule("T", [t("id")])
        .build()
        .unwrap()
}

#[test]
fn alphabets_and_class() {
    let g = expression();
    assert_eq!(g.terminals().len(), 2);
    assert!(g.terminals().contains(&t("id")));
    assert!(g.terminals().contains(&t("+")));
    assert_eq!(g.nonterminals().len(), 3);
    assert_eq!(g.class(), ProductionClass::ContextFree);
    assert!(g.start().is("S"));
}

#[test]
fn follow_sets() {
    let g = expression();
    let follow = g.follow().unwrap();

    assert!(follow.contains(&n("S"), &Symbol::Eof));
    for nt in ["E", "T"] {
        assert!(follow.contains(&n(nt), &t("+")), "'+' follows {nt}");
        assert!(follow.contains(&n(nt), &Symbol::Eof), "$ follows {nt}");
        assert!(!follow.contains(&n(nt), &t("id")));
    }
}

#[test]
fn initial_state_mentions_every_nonterminal() {
    let g = expression();
    let cc = g.canonical_collection().unwrap();
    let ext = cc.grammar();
    let initial = cc.state(cc.initial()).unwrap();

    let mut lhs: Vec<_> = initial.iter().filter_map(|it| it.lhs(ext)).cloned().collect();
    lhs.dedup();
    for nt in [n("S"), n("E"), n("T")] {
        assert!(lhs.contains(&nt), "{nt:?} missing from the initial state");
    }
    // both E alternatives, dot at the front
    let e_items = initial
        .iter()
        .filter(|it| it.lhs(ext) == Some(&n("E")) && it.dot == 0)
        .count();
    assert_eq!(e_items, 2);
}

#[test]
fn id_is_shifted_then_reduced() {
    let g = expression();
    let cc = g.canonical_collection().unwrap();
    let table = g.action_table().unwrap();

    let init = cc.initial();
    let after_id = cc.goto(init, &t("id")).expect("goto(I0, id) is defined");

    let t_to_id = g
        .productions_of(&n("T"))
        .map(|(id, _)| id)
        .next()
        .unwrap();
    assert!(cc.state(after_id).unwrap().contains(&Item::new(t_to_id, 1)));

    assert_eq!(table.get(init, &t("id")), Ok(Some(Action::Shift(after_id))));
    assert_eq!(table.get(after_id, &t("+")), Ok(Some(Action::Reduce(t_to_id))));
    assert_eq!(table.get(after_id, &Symbol::Eof), Ok(Some(Action::Reduce(t_to_id))));
}

#[test]
fn single_accepting_cell() {
    let g = expression();
    let cc = g.canonical_collection().unwrap();
    let table = g.action_table().unwrap();

    let accepts: Vec<_> = table
        .iter()
        .filter(|(_, _, action)| *action == Action::Accept)
        .collect();
    assert_eq!(accepts.len(), 1);
    let (state, lookahead, _) = accepts[0];
    assert_eq!(Some(state), cc.accepting_state());
    assert_eq!(lookahead, &Symbol::Eof);
}

#[test]
fn unknown_terminal_is_a_validation_failure() {
    let g = expression();
    let table = g.action_table().unwrap();
    assert_eq!(
        table.get(0, &t("*")),
        Err(GrammarError::UnknownLookahead(t("*")))
    );
}

#[test]
fn terminal_left_side_is_rejected() {
    let err = Production::context_free(t("id"), [n("E")]).unwrap_err();
    // an ancestor check already rejects it
    assert!(matches!(err, GrammarError::MalformedProduction { .. }));
}
