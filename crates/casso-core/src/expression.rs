//! Terms and linear expressions.
//!
//! Both are plain values: every operation returns a new value and leaves its
//! operands untouched. An [`Expression`] keeps its terms in the order they
//! were combined (left operand first) and never merges terms that share a
//! variable; the solver does that when it builds its rows.

use std::fmt;

use smallvec::SmallVec;

use crate::errors::AlgebraError;
use crate::variable::Variable;

/// A variable scaled by a constant coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    variable: Variable,
    coefficient: f64,
}

impl Term {
    pub fn new(variable: Variable, coefficient: f64) -> Self {
        Self {
            variable,
            coefficient,
        }
    }

    pub fn variable(&self) -> &Variable {
        &self.variable
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// Evaluate against the variable's current value.
    pub fn value(&self) -> f64 {
        self.coefficient * self.variable.value()
    }

    /// Multiply the coefficient by a constant.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.variable.clone(), self.coefficient * factor)
    }

    /// Divide the coefficient by a constant.
    pub fn checked_div(&self, denominator: f64) -> Result<Self, AlgebraError> {
        if denominator == 0.0 {
            return Err(AlgebraError::DivisionByZero);
        }
        Ok(self.scaled(1.0 / denominator))
    }
}

impl From<Variable> for Term {
    fn from(variable: Variable) -> Self {
        Self::new(variable, 1.0)
    }
}

impl From<&Variable> for Term {
    fn from(variable: &Variable) -> Self {
        Self::new(variable.clone(), 1.0)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} * {}", self.coefficient, self.variable)
    }
}

/// A linear expression: `constant + Σ coefficient * variable`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    terms: SmallVec<[Term; 4]>,
    constant: f64,
}

impl Expression {
    pub fn new(terms: impl IntoIterator<Item = Term>, constant: f64) -> Self {
        Self {
            terms: terms.into_iter().collect(),
            constant,
        }
    }

    /// Create a constant expression.
    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: SmallVec::new(),
            constant,
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Evaluate against the variables' current values.
    pub fn value(&self) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, term| acc + term.value())
    }

    /// Multiply every coefficient and the constant by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            terms: self.terms.iter().map(|t| t.scaled(factor)).collect(),
            constant: self.constant * factor,
        }
    }

    pub fn checked_div(&self, denominator: f64) -> Result<Self, AlgebraError> {
        if denominator == 0.0 {
            return Err(AlgebraError::DivisionByZero);
        }
        Ok(self.scaled(1.0 / denominator))
    }

    /// Append the terms of `other` and add its constant.
    pub fn plus(mut self, other: Expression) -> Self {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }

    /// Append the negated terms of `other` and subtract its constant.
    pub fn minus(self, other: Expression) -> Self {
        self.plus(other.negated())
    }

    pub fn negated(&self) -> Self {
        self.scaled(-1.0)
    }
}

impl From<f64> for Expression {
    fn from(constant: f64) -> Self {
        Self::from_constant(constant)
    }
}

impl From<Term> for Expression {
    fn from(term: Term) -> Self {
        Self {
            terms: smallvec::smallvec![term],
            constant: 0.0,
        }
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Term::from(variable).into()
    }
}

impl From<&Variable> for Expression {
    fn from(variable: &Variable) -> Self {
        Term::from(variable).into()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "{}", self.constant);
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{term}")?;
        }
        if self.constant != 0.0 {
            write!(f, " + {}", self.constant)?;
        }
        Ok(())
    }
}
