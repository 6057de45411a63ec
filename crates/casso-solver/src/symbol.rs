//! Tableau symbols.

use std::fmt;

/// Symbol types used internally in the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum SymbolKind {
    /// An external variable (the actual unknowns we're solving for)
    External,
    /// A slack variable (for inequality constraints)
    Slack,
    /// An error variable (for non-required constraints)
    Error,
    /// A dummy variable (for required equality constraints)
    Dummy,
}

/// A column or row head of the tableau.
///
/// Symbols order by creation id, which gives every pivot choice a
/// deterministic lowest-symbol tie break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Symbol {
    id: usize,
    kind: SymbolKind,
}

impl Symbol {
    pub(crate) fn new(id: usize, kind: SymbolKind) -> Self {
        Self { id, kind }
    }

    pub(crate) fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    pub(crate) fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }

    pub(crate) fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    /// Slack and error symbols are restricted to be non-negative and may
    /// enter the basis during optimization.
    pub(crate) fn is_pivotable(&self) -> bool {
        matches!(self.kind, SymbolKind::Slack | SymbolKind::Error)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            SymbolKind::External => 'v',
            SymbolKind::Slack => 's',
            SymbolKind::Error => 'e',
            SymbolKind::Dummy => 'd',
        };
        write!(f, "{prefix}{}", self.id)
    }
}
