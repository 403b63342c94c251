/// What to do when a `(state, lookahead)` cell has more than one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConflictPolicy {
    /// Fail table construction with [`GrammarError::Conflicts`](crate::GrammarError::Conflicts).
    #[default]
    Reject,
    /// Shift beats reduce, the first qualifying reduce beats later ones and
    /// accept. Conflicts are still recorded on the table.
    PreferShift,
}

/// Configuration for action table construction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableConfig {
    pub conflicts: ConflictPolicy,

    /// Reduce a complete item on end-of-input even when `$` is not in the
    /// FOLLOW set of its left-hand side. Turning this off gives plain SLR(1).
    pub reduce_on_any_eof: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            conflicts: ConflictPolicy::Reject,
            reduce_on_any_eof: true,
        }
    }
}

impl TableConfig {
    /// First match wins, nothing is rejected.
    pub fn lenient() -> Self {
        Self {
            conflicts: ConflictPolicy::PreferShift,
            ..Self::default()
        }
    }
}
