//! Cassowary constraint solver implementation.
//!
//! This is an implementation of the Cassowary linear constraint solving algorithm,
//! as described in "The Cassowary Linear Arithmetic Constraint Solving Algorithm"
//! by Greg J. Badros and Alan Borning.
//!
//! The tableau maps each basic symbol to a [`Row`] over non-basic symbols and
//! is kept primal feasible (every restricted basic symbol has a non-negative
//! constant) and optimal for the objective, a strength-weighted sum of error
//! symbols. Structural changes re-run the primal simplex; edit suggestions
//! only disturb feasibility and are repaired with the dual simplex.

use std::collections::BTreeMap;

use casso_core::{Constraint, Expression, RelationalOperator, SolverError, Strength, Variable};
use indexmap::IndexMap;

use crate::row::{near_zero, Row, EPSILON};
use crate::symbol::{Symbol, SymbolKind};

/// Symbols introduced for a constraint, needed to remove it later.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tag {
    pub(crate) marker: Symbol,
    pub(crate) other: Option<Symbol>,
}

/// Bookkeeping for an edit variable.
#[derive(Debug, Clone)]
pub(crate) struct EditInfo {
    pub(crate) tag: Tag,
    pub(crate) constraint: Constraint,
    /// Last suggested value.
    pub(crate) constant: f64,
}

/// Which objective a primal optimization runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Objective {
    Main,
    Artificial,
}

/// State restored when an added constraint turns out to be unsatisfiable.
struct Checkpoint {
    vars: usize,
    symbol_counter: usize,
}

/// The Cassowary constraint solver.
///
/// Variables are referenced, not owned: the solver keeps a handle to each
/// variable that appears in one of its constraints and writes solved values
/// into it on [`Solver::update_variables`].
#[derive(Debug, Default)]
pub struct Solver {
    /// Registered constraints and the symbols they introduced
    pub(crate) constraints: IndexMap<Constraint, Tag>,
    /// The tableau rows, keyed by their basic symbol
    pub(crate) rows: BTreeMap<Symbol, Row>,
    /// External symbol for every variable seen so far
    pub(crate) vars: IndexMap<Variable, Symbol>,
    /// Edit variables
    pub(crate) edits: IndexMap<Variable, EditInfo>,
    /// Rows whose constant may have gone negative
    pub(crate) infeasible_rows: Vec<Symbol>,
    /// The objective function row
    pub(crate) objective: Row,
    /// Artificial objective, only present while adding a constraint
    artificial: Option<Row>,
    /// Counter for generating unique symbol IDs
    symbol_counter: usize,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constraint to the solver.
    ///
    /// Fails with [`SolverError::DuplicateConstraint`] if the constraint is
    /// already registered, and with [`SolverError::UnsatisfiableConstraint`]
    /// if it is required and conflicts with the required constraints already
    /// present. In both cases the solver is left as it was.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        if self.constraints.contains_key(constraint) {
            return Err(SolverError::DuplicateConstraint {
                constraint: constraint.clone(),
            });
        }

        let checkpoint = Checkpoint {
            vars: self.vars.len(),
            symbol_counter: self.symbol_counter,
        };

        let (mut row, tag) = self.create_row(constraint);
        let mut subject = choose_subject(&row, &tag);

        // A row made only of dummies is either redundant (zero constant), in
        // which case the new dummy marker can enter the basis, or a conflict
        // between required equalities.
        if subject.is_none() && row.all_dummies() {
            if !near_zero(row.constant) {
                self.rollback(checkpoint, &tag);
                return Err(self.unsatisfiable(constraint));
            }
            subject = Some(tag.marker);
        }

        match subject {
            Some(subject) => {
                row.solve_for(subject);
                self.substitute(subject, &row);
                self.rows.insert(subject, row);
            }
            None => {
                if !self.add_with_artificial_variable(row)? {
                    self.rollback(checkpoint, &tag);
                    return Err(self.unsatisfiable(constraint));
                }
            }
        }

        self.constraints.insert(constraint.clone(), tag);

        // Optimizing after each constraint is added performs less aggregate
        // work due to a smaller average system size.
        self.optimize(Objective::Main)?;

        tracing::debug!(
            constraint = %constraint,
            rows = self.rows.len(),
            symbols = self.symbol_counter,
            "added constraint"
        );
        Ok(())
    }

    /// Add several constraints, stopping at the first failure.
    ///
    /// Constraints added before the failing one stay in the solver.
    pub fn add_constraints<'a>(
        &mut self,
        constraints: impl IntoIterator<Item = &'a Constraint>,
    ) -> Result<(), SolverError> {
        for constraint in constraints {
            self.add_constraint(constraint)?;
        }
        Ok(())
    }

    /// Remove a constraint from the solver.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<(), SolverError> {
        let tag = *self
            .constraints
            .get(constraint)
            .ok_or_else(|| SolverError::UnknownConstraint {
                constraint: constraint.clone(),
            })?;

        // A non-basic marker must be pivoted in through some row. Pick that
        // row before anything is mutated so a failure leaves the solver as is.
        let leaving = if self.rows.contains_key(&tag.marker) {
            None
        } else {
            Some(
                self.marker_leaving_symbol(tag.marker)
                    .ok_or(SolverError::Internal("Failed to find leaving row."))?,
            )
        };

        self.constraints.shift_remove(constraint);

        // Remove the error effects from the objective *before* pivoting, or
        // substitutions into the objective will lead to incorrect results.
        self.remove_constraint_effects(constraint, &tag);

        match leaving {
            None => {
                self.rows.remove(&tag.marker);
            }
            Some(leaving) => {
                let mut row = self
                    .rows
                    .remove(&leaving)
                    .ok_or(SolverError::Internal("Failed to find leaving row."))?;
                row.solve_for_symbols(leaving, tag.marker);
                self.substitute(tag.marker, &row);
            }
        }

        self.optimize(Objective::Main)?;

        tracing::debug!(
            constraint = %constraint,
            rows = self.rows.len(),
            "removed constraint"
        );
        Ok(())
    }

    /// Test whether a constraint has been added to the solver.
    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.constraints.contains_key(constraint)
    }

    /// Number of registered constraints, edit constraints included.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Add an edit variable to the solver.
    ///
    /// This registers a constraint `variable == variable.value()` at the given
    /// strength. It must be called before [`Solver::suggest_value`] is used
    /// for the variable. Required strength is rejected.
    pub fn add_edit_variable(
        &mut self,
        variable: &Variable,
        strength: Strength,
    ) -> Result<(), SolverError> {
        if self.edits.contains_key(variable) {
            return Err(SolverError::DuplicateEditVariable {
                variable: variable.clone(),
            });
        }
        let strength = Strength::clip(strength.value());
        if strength.is_required() {
            return Err(SolverError::RequiredEditStrength);
        }

        let value = variable.value();
        let constraint = Constraint::new(
            Expression::from(variable) - value,
            RelationalOperator::Equal,
            strength,
        );
        self.add_constraint(&constraint)?;
        let tag = *self
            .constraints
            .get(&constraint)
            .ok_or(SolverError::Internal("Edit constraint not in system."))?;

        tracing::debug!(variable = %variable, %strength, "added edit variable");
        self.edits.insert(
            variable.clone(),
            EditInfo {
                tag,
                constraint,
                constant: value,
            },
        );
        Ok(())
    }

    /// Remove an edit variable from the solver.
    pub fn remove_edit_variable(&mut self, variable: &Variable) -> Result<(), SolverError> {
        let constraint = self
            .edits
            .get(variable)
            .map(|info| info.constraint.clone())
            .ok_or_else(|| SolverError::UnknownEditVariable {
                variable: variable.clone(),
            })?;
        self.remove_constraint(&constraint).map_err(|err| match err {
            SolverError::UnknownConstraint { .. } => {
                SolverError::Internal("Edit constraint not in system.")
            }
            other => other,
        })?;
        self.edits.shift_remove(variable);
        tracing::debug!(variable = %variable, "removed edit variable");
        Ok(())
    }

    /// Test whether an edit variable has been added to the solver.
    pub fn has_edit_variable(&self, variable: &Variable) -> bool {
        self.edits.contains_key(variable)
    }

    pub fn edit_variable_count(&self) -> usize {
        self.edits.len()
    }

    /// Suggest a value for an edit variable.
    ///
    /// Only the rows touched by the edit change; feasibility is then restored
    /// with the dual simplex. Call [`Solver::update_variables`] to observe the
    /// new values.
    pub fn suggest_value(&mut self, variable: &Variable, value: f64) -> Result<(), SolverError> {
        let info = self
            .edits
            .get_mut(variable)
            .ok_or_else(|| SolverError::UnknownEditVariable {
                variable: variable.clone(),
            })?;
        let delta = value - info.constant;
        info.constant = value;
        let Tag { marker, other } = info.tag;

        tracing::debug!(variable = %variable, value, delta, "suggest value");

        // The edit constraint is `v - c = marker - other`. Shift whichever
        // error symbol is basic, or every row that depends on the marker.
        if let Some(row) = self.rows.get_mut(&marker) {
            if row.add(-delta) < 0.0 {
                self.infeasible_rows.push(marker);
            }
        } else if let Some(other) = other.filter(|o| self.rows.contains_key(o)) {
            if let Some(row) = self.rows.get_mut(&other) {
                if row.add(delta) < 0.0 {
                    self.infeasible_rows.push(other);
                }
            }
        } else {
            for (&symbol, row) in self.rows.iter_mut() {
                let coefficient = row.coefficient_for(marker);
                if coefficient != 0.0
                    && row.add(delta * coefficient) < 0.0
                    && !symbol.is_external()
                {
                    self.infeasible_rows.push(symbol);
                }
            }
        }

        self.dual_optimize()
    }

    /// Write the solved value of every known variable into its cell.
    pub fn update_variables(&self) {
        for (variable, symbol) in &self.vars {
            let value = self.rows.get(symbol).map_or(0.0, |row| row.constant);
            variable.set_value(value);
        }
    }

    /// Clear all constraints, edit variables and tableau state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Get the symbol for a variable, creating it on first use.
    fn var_symbol(&mut self, variable: &Variable) -> Symbol {
        if let Some(&symbol) = self.vars.get(variable) {
            return symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.vars.insert(variable.clone(), symbol);
        symbol
    }

    /// Generate a new symbol.
    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        self.symbol_counter += 1;
        Symbol::new(self.symbol_counter, kind)
    }

    /// Create a row for a constraint.
    ///
    /// Basic variables are substituted by their rows, and the slack, error or
    /// dummy symbols the operator calls for are added. The row is returned
    /// with a non-negative constant.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let expression = constraint.expression();
        let mut row = Row::new(expression.constant());

        for term in expression.terms() {
            let coefficient = term.coefficient();
            if near_zero(coefficient) {
                continue;
            }
            let symbol = self.var_symbol(term.variable());
            match self.rows.get(&symbol) {
                Some(basic) => row.insert_row(basic, coefficient),
                None => row.insert_symbol(symbol, coefficient),
            }
        }

        let strength = constraint.strength();
        let tag = match constraint.operator() {
            RelationalOperator::LessOrEqual | RelationalOperator::GreaterOrEqual => {
                let coefficient = if constraint.operator() == RelationalOperator::LessOrEqual {
                    1.0
                } else {
                    -1.0
                };
                let slack = self.new_symbol(SymbolKind::Slack);
                row.insert_symbol(slack, coefficient);
                if strength.is_required() {
                    Tag {
                        marker: slack,
                        other: None,
                    }
                } else {
                    let error = self.new_symbol(SymbolKind::Error);
                    row.insert_symbol(error, -coefficient);
                    self.objective.insert_symbol(error, strength.value());
                    Tag {
                        marker: slack,
                        other: Some(error),
                    }
                }
            }
            RelationalOperator::Equal => {
                if strength.is_required() {
                    let dummy = self.new_symbol(SymbolKind::Dummy);
                    row.insert_symbol(dummy, 1.0);
                    Tag {
                        marker: dummy,
                        other: None,
                    }
                } else {
                    // expression = errplus - errminus
                    let errplus = self.new_symbol(SymbolKind::Error);
                    let errminus = self.new_symbol(SymbolKind::Error);
                    row.insert_symbol(errplus, -1.0);
                    row.insert_symbol(errminus, 1.0);
                    self.objective.insert_symbol(errplus, strength.value());
                    self.objective.insert_symbol(errminus, strength.value());
                    Tag {
                        marker: errplus,
                        other: Some(errminus),
                    }
                }
            }
        };

        if row.constant < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Add the row to the tableau using an artificial variable.
    ///
    /// Returns `false` if the artificial objective cannot be driven to zero,
    /// meaning the constraint cannot be satisfied. The tableau is restored to
    /// its state on entry in that case.
    fn add_with_artificial_variable(&mut self, row: Row) -> Result<bool, SolverError> {
        let snapshot = (
            self.rows.clone(),
            self.objective.clone(),
            self.infeasible_rows.clone(),
        );

        let art = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(art, row.clone());
        self.artificial = Some(row);

        let optimized = self.optimize(Objective::Artificial);
        let success = self
            .artificial
            .take()
            .is_some_and(|objective| near_zero(objective.constant));
        optimized?;

        if !success {
            (self.rows, self.objective, self.infeasible_rows) = snapshot;
            return Ok(false);
        }

        // If the artificial variable is still basic, pivot it out. A constant
        // row means the constraint was redundant.
        if let Some(mut row) = self.rows.remove(&art) {
            if !row.cells.is_empty() {
                let Some(entering) = row.any_pivotable_symbol() else {
                    (self.rows, self.objective, self.infeasible_rows) = snapshot;
                    return Ok(false);
                };
                row.solve_for_symbols(art, entering);
                self.substitute(entering, &row);
                self.rows.insert(entering, row);
            }
        }

        for row in self.rows.values_mut() {
            row.remove(art);
        }
        self.objective.remove(art);
        Ok(true)
    }

    /// Undo the bookkeeping of a constraint that failed to be added.
    fn rollback(&mut self, checkpoint: Checkpoint, tag: &Tag) {
        self.vars.truncate(checkpoint.vars);
        self.objective.remove(tag.marker);
        if let Some(other) = tag.other {
            self.objective.remove(other);
        }
        self.symbol_counter = checkpoint.symbol_counter;
    }

    fn unsatisfiable(&self, constraint: &Constraint) -> SolverError {
        tracing::warn!(constraint = %constraint, "rejected unsatisfiable constraint");
        SolverError::UnsatisfiableConstraint {
            constraint: constraint.clone(),
        }
    }

    /// Substitute a symbol throughout the tableau and objectives.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for (&basic, other) in self.rows.iter_mut() {
            other.substitute(symbol, row);
            if !basic.is_external() && other.constant < 0.0 {
                self.infeasible_rows.push(basic);
            }
        }
        self.objective.substitute(symbol, row);
        if let Some(artificial) = self.artificial.as_mut() {
            artificial.substitute(symbol, row);
        }
    }

    /// Optimize an objective with the primal simplex method.
    ///
    /// Entering symbols are taken in symbol order (Bland's rule), which keeps
    /// degenerate pivots from cycling.
    fn optimize(&mut self, target: Objective) -> Result<(), SolverError> {
        loop {
            let objective = match target {
                Objective::Main => &self.objective,
                Objective::Artificial => self
                    .artificial
                    .as_ref()
                    .ok_or(SolverError::Internal("Missing artificial objective."))?,
            };
            let Some(entering) = objective.entering_symbol() else {
                return Ok(());
            };

            let (leaving, mut row) = self
                .leaving_row(entering)
                .ok_or(SolverError::Internal("The objective is unbounded."))?;

            tracing::trace!(%entering, %leaving, ?target, "pivot");
            row.solve_for_symbols(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
    }

    /// Restore feasibility with the dual simplex method.
    ///
    /// The objective is optimal on entry but some restricted rows may have a
    /// negative constant. The most negative one leaves first.
    fn dual_optimize(&mut self) -> Result<(), SolverError> {
        while let Some(leaving) = self.most_infeasible_row() {
            let mut row = self
                .rows
                .remove(&leaving)
                .ok_or(SolverError::Internal("Infeasible row vanished."))?;
            let entering = self
                .dual_entering_symbol(&row)
                .ok_or(SolverError::Internal("Dual optimize failed."))?;

            tracing::trace!(%entering, %leaving, constant = row.constant, "dual pivot");
            row.solve_for_symbols(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
        Ok(())
    }

    /// Pop the pending infeasible row with the most negative constant.
    fn most_infeasible_row(&mut self) -> Option<Symbol> {
        let rows = &self.rows;
        self.infeasible_rows
            .retain(|symbol| rows.get(symbol).is_some_and(|row| row.constant < -EPSILON));
        self.infeasible_rows.sort_unstable();
        self.infeasible_rows.dedup();

        let mut best: Option<(usize, f64)> = None;
        for (index, symbol) in self.infeasible_rows.iter().enumerate() {
            let constant = rows.get(symbol).map_or(0.0, |row| row.constant);
            if best.map_or(true, |(_, lowest)| constant < lowest) {
                best = Some((index, constant));
            }
        }
        best.map(|(index, _)| self.infeasible_rows.remove(index))
    }

    /// Entering symbol for a dual pivot on an infeasible row.
    ///
    /// Among the row's non-dummy symbols with a positive coefficient, pick the
    /// one with the smallest ratio of objective coefficient to row coefficient.
    fn dual_entering_symbol(&self, row: &Row) -> Option<Symbol> {
        let mut entering = None;
        let mut ratio = f64::INFINITY;
        for (&symbol, &coefficient) in &row.cells {
            if coefficient > 0.0 && !symbol.is_dummy() {
                let r = self.objective.coefficient_for(symbol) / coefficient;
                if r < ratio {
                    ratio = r;
                    entering = Some(symbol);
                }
            }
        }
        entering
    }

    /// Find and remove the row that leaves the basis when `entering` enters.
    ///
    /// Minimum ratio test over restricted rows where `entering` has a negative
    /// coefficient. `None` means the objective is unbounded.
    fn leaving_row(&mut self, entering: Symbol) -> Option<(Symbol, Row)> {
        let mut min_ratio = f64::INFINITY;
        let mut leaving = None;

        for (&symbol, row) in &self.rows {
            if symbol.is_external() {
                continue;
            }
            let coefficient = row.coefficient_for(entering);
            if coefficient < 0.0 {
                let ratio = -row.constant / coefficient;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    leaving = Some(symbol);
                }
            }
        }

        let symbol = leaving?;
        self.rows.remove(&symbol).map(|row| (symbol, row))
    }

    /// Basic symbol of the row to pivot a non-basic marker into the basis.
    ///
    /// Preference order:
    /// 1. restricted rows with a negative marker coefficient, smallest
    ///    `-constant / coefficient`;
    /// 2. restricted rows with a positive coefficient, smallest
    ///    `constant / coefficient`;
    /// 3. the first unrestricted (external) row holding the marker.
    fn marker_leaving_symbol(&self, marker: Symbol) -> Option<Symbol> {
        let mut r1 = f64::INFINITY;
        let mut r2 = f64::INFINITY;
        let mut first = None;
        let mut second = None;
        let mut third = None;

        for (&symbol, row) in &self.rows {
            let c = row.coefficient_for(marker);
            if c == 0.0 {
                continue;
            }
            if symbol.is_external() {
                if third.is_none() {
                    third = Some(symbol);
                }
            } else if c < 0.0 {
                let r = -row.constant / c;
                if r < r1 {
                    r1 = r;
                    first = Some(symbol);
                }
            } else {
                let r = row.constant / c;
                if r < r2 {
                    r2 = r;
                    second = Some(symbol);
                }
            }
        }

        first.or(second).or(third)
    }

    /// Remove the objective contributions of a constraint's error symbols.
    fn remove_constraint_effects(&mut self, constraint: &Constraint, tag: &Tag) {
        let strength = constraint.strength().value();
        if tag.marker.is_error() {
            self.remove_marker_effects(tag.marker, strength);
        }
        if let Some(other) = tag.other.filter(Symbol::is_error) {
            self.remove_marker_effects(other, strength);
        }
    }

    fn remove_marker_effects(&mut self, marker: Symbol, strength: f64) {
        match self.rows.get(&marker) {
            Some(row) => self.objective.insert_row(row, -strength),
            None => self.objective.insert_symbol(marker, -strength),
        }
    }
}

/// Choose the subject for entering a new row into the tableau.
///
/// An external symbol is preferred. Otherwise a slack or error marker with a
/// negative coefficient can be solved for while keeping the row feasible.
fn choose_subject(row: &Row, tag: &Tag) -> Option<Symbol> {
    if let Some(&symbol) = row.cells.keys().find(|s| s.is_external()) {
        return Some(symbol);
    }
    if tag.marker.is_pivotable() && row.coefficient_for(tag.marker) < 0.0 {
        return Some(tag.marker);
    }
    tag.other
        .filter(|other| other.is_pivotable() && row.coefficient_for(*other) < 0.0)
}
