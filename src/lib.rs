//! LR parsing tables for grammars of the Chomsky hierarchy.
//!
//! Productions are validated into one of four classes
//! ([`ProductionClass`]). For context-free grammars the crate derives, once
//! per [`Grammar`] value:
//!
//! * FOLLOW sets ([`FollowTable`]),
//! * the LR(0) canonical collection with its goto function ([`CanonicalCollection`]),
//! * the ACTION table mapping `(state, terminal or $)` to shift / reduce / accept
//!   ([`ActionTable`]).
//!
//! Running the table against a token stream is left to the caller.

extern crate alloc;

pub mod action;
pub mod config;
pub mod error;
pub mod follow;
pub mod grammar;
pub mod lr;
pub mod production;
pub mod symbol;

pub use action::{Action, ActionTable, Conflict};
pub use config::{ConflictPolicy, TableConfig};
pub use error::GrammarError;
pub use follow::{FirstSet, FirstTable, FollowTable};
pub use grammar::{ExtendedGrammar, Grammar, GrammarBuilder, ProdId};
pub use lr::{CanonicalCollection, Item, ItemSet, StateId};
pub use production::{Production, ProductionClass};
pub use symbol::{Alphabet, Symbol, Word};
