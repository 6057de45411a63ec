//! Error types for the casso solver.

use crate::constraint::Constraint;
use crate::variable::Variable;
use thiserror::Error;

/// Top-level error type, for callers mixing algebra and solver calls.
#[derive(Debug, Error)]
pub enum CassoError {
    #[error(transparent)]
    Algebra(#[from] AlgebraError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Errors raised while building expressions and constraints.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlgebraError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Unsupported operation: {lhs} {operation} {rhs}")]
    UnsupportedOperation {
        operation: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Unknown strength name: {name:?}")]
    UnknownStrengthName { name: String },

    #[error("Invalid relational operator {symbol:?}: expected '<=', '==' or '>='")]
    UnknownOperator { symbol: String },
}

/// Errors raised by the solver.
///
/// Every variant except [`SolverError::Internal`] is detected before the
/// solver state is touched, or the state is rolled back before returning.
/// The solver stays usable after any of them.
#[derive(Debug, Clone, Error)]
pub enum SolverError {
    #[error("The constraint has already been added to the solver: {constraint}")]
    DuplicateConstraint { constraint: Constraint },

    #[error("The constraint has not been added to the solver: {constraint}")]
    UnknownConstraint { constraint: Constraint },

    #[error("The constraint can not be satisfied: {constraint}")]
    UnsatisfiableConstraint { constraint: Constraint },

    #[error("The edit variable has not been added to the solver: {variable}")]
    UnknownEditVariable { variable: Variable },

    #[error("The edit variable has already been added to the solver: {variable}")]
    DuplicateEditVariable { variable: Variable },

    #[error("A required strength cannot be used for an edit variable")]
    RequiredEditStrength,

    #[error("Internal solver error: {0}")]
    Internal(&'static str),
}
