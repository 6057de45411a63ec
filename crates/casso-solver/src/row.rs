//! Tableau rows.

use std::collections::BTreeMap;
use std::fmt;

use crate::symbol::Symbol;

/// Tolerance for floating-point comparisons.
pub(crate) const EPSILON: f64 = 1e-8;

/// Near-zero check for floating point values.
pub(crate) fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// A row in the simplex tableau: `basic = constant + Σ coefficient * symbol`.
///
/// Cells are kept in symbol order and coefficients that cancel to (near)
/// zero are dropped, so a symbol is present exactly when it participates.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Row {
    pub(crate) constant: f64,
    pub(crate) cells: BTreeMap<Symbol, f64>,
}

impl Row {
    pub(crate) fn new(constant: f64) -> Self {
        Self {
            constant,
            cells: BTreeMap::new(),
        }
    }

    /// Add to the constant and return the new value.
    pub(crate) fn add(&mut self, value: f64) -> f64 {
        self.constant += value;
        self.constant
    }

    /// Add `coefficient * symbol`, merging with an existing cell.
    pub(crate) fn insert_symbol(&mut self, symbol: Symbol, coefficient: f64) {
        let entry = self.cells.entry(symbol).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.cells.remove(&symbol);
        }
    }

    /// Add `coefficient * other` to this row.
    pub(crate) fn insert_row(&mut self, other: &Row, coefficient: f64) {
        self.constant += other.constant * coefficient;
        for (&symbol, &c) in &other.cells {
            self.insert_symbol(symbol, c * coefficient);
        }
    }

    pub(crate) fn remove(&mut self, symbol: Symbol) {
        self.cells.remove(&symbol);
    }

    pub(crate) fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for coefficient in self.cells.values_mut() {
            *coefficient = -*coefficient;
        }
    }

    /// Solve the row for `symbol`.
    ///
    /// The row is read as `0 = constant + Σ cells`; afterwards it reads
    /// `symbol = constant + Σ cells` and `symbol` is no longer a cell.
    pub(crate) fn solve_for(&mut self, symbol: Symbol) {
        let Some(coefficient) = self.cells.remove(&symbol) else {
            return;
        };
        let multiplier = -1.0 / coefficient;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
    }

    /// Solve the row `lhs = ...` for `rhs`, turning `lhs` into a cell.
    pub(crate) fn solve_for_symbols(&mut self, lhs: Symbol, rhs: Symbol) {
        self.insert_symbol(lhs, -1.0);
        self.solve_for(rhs);
    }

    pub(crate) fn coefficient_for(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    /// Replace `symbol` by the right-hand side of `row`.
    pub(crate) fn substitute(&mut self, symbol: Symbol, row: &Row) {
        if let Some(coefficient) = self.cells.remove(&symbol) {
            self.insert_row(row, coefficient);
        }
    }

    /// Whether every cell is a dummy symbol.
    pub(crate) fn all_dummies(&self) -> bool {
        self.cells.keys().all(Symbol::is_dummy)
    }

    /// The first pivotable symbol, if any.
    pub(crate) fn any_pivotable_symbol(&self) -> Option<Symbol> {
        self.cells.keys().copied().find(Symbol::is_pivotable)
    }

    /// Entering symbol for the primal simplex when this row is the
    /// objective: the lowest non-dummy symbol with a negative coefficient.
    pub(crate) fn entering_symbol(&self) -> Option<Symbol> {
        self.cells
            .iter()
            .find(|(symbol, c)| !symbol.is_dummy() && **c < 0.0)
            .map(|(&symbol, _)| symbol)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.constant)?;
        for (symbol, coefficient) in &self.cells {
            write!(f, " + {coefficient} * {symbol}")?;
        }
        Ok(())
    }
}
