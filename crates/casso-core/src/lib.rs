//! Core types for the casso constraint solver.
//!
//! This crate provides:
//! - Variables, terms and linear expressions
//! - Constraint strengths
//! - Constraints normalized to `expression OP 0`
//! - Error types shared with `casso-solver`
//!
//! # Example
//!
//! ```
//! use casso_core::{Relate, Strength, Variable};
//!
//! let left = Variable::named("left");
//! let width = Variable::named("width");
//! let right = Variable::named("right");
//!
//! let fits = (&left + &width).equals(&right);
//! let wide = width.ge(100.0) | Strength::STRONG;
//!
//! assert_eq!(fits.expression().terms().len(), 3);
//! assert_eq!(wide.strength(), Strength::STRONG);
//! ```

pub mod constraint;
pub mod errors;
pub mod expression;
pub mod operand;
mod ops;
pub mod strength;
pub mod variable;

pub use constraint::{Constraint, Relate, RelationalOperator};
pub use errors::{AlgebraError, CassoError, SolverError};
pub use expression::{Expression, Term};
pub use operand::{expression_from_operands, Comparison, Operand};
pub use strength::Strength;
pub use variable::{Context, Variable};
