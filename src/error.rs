use crate::action::Conflict;
use crate::lr::StateId;
use crate::production::ProductionClass;
use crate::symbol::{Symbol, Word};
use thiserror::Error;

/// Every way building or querying a grammar can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError<K> {
    #[error("{left:?} -> {right:?} is not a {class} production")]
    MalformedProduction {
        class: ProductionClass,
        left: Word<K>,
        right: Word<K>,
    },

    #[error("terminal {0:?} cannot be used as a nonterminal")]
    TerminalAsNonterminal(K),

    #[error("{0:?} is not a terminal")]
    NotATerminal(Symbol<K>),

    #[error("{0:?} is not a nonterminal")]
    NotANonterminal(Symbol<K>),

    #[error("{0:?} is used both as a terminal and as a nonterminal")]
    AmbiguousPayload(K),

    #[error("start symbol {0:?} is not in the nonterminal alphabet")]
    StartNotInAlphabet(Symbol<K>),

    #[error("grammar has no start symbol")]
    MissingStart,

    #[error("{0:?} appears in a production but in neither alphabet")]
    UnknownSymbol(Symbol<K>),

    #[error("LR tables need a context-free grammar, this one is {0}")]
    NotContextFree(ProductionClass),

    #[error("state {0} is not in the canonical collection")]
    UnknownState(StateId),

    #[error("{0:?} is neither end-of-input nor a terminal of the grammar")]
    UnknownLookahead(Symbol<K>),

    #[error("{} action table cells have more than one candidate", .0.len())]
    Conflicts(Vec<Conflict<K>>),
}
