//! Incremental Cassowary constraint solver.
//!
//! The solver maintains a simplex tableau over the variables of its
//! constraints. Constraints can be added and removed one at a time, and edit
//! variables can be nudged with [`Solver::suggest_value`] without re-solving
//! the whole system.
//!
//! # Example
//!
//! ```
//! use casso_solver::{Relate, Solver, Strength, Variable};
//!
//! let x = Variable::named("x");
//! let mut solver = Solver::new();
//! solver.add_constraint(&(&x).ge(0.0)).unwrap();
//! solver.add_constraint(&(&x).le(100.0)).unwrap();
//! solver.add_edit_variable(&x, Strength::STRONG).unwrap();
//!
//! solver.suggest_value(&x, 50.0).unwrap();
//! solver.update_variables();
//! assert!((x.value() - 50.0).abs() < 1e-8);
//! ```

mod debug;
mod row;
mod solver;
mod symbol;

pub use casso_core::*;
pub use solver::Solver;
