//! Operator overloads for building linear expressions.
//!
//! Only linear combinations are expressible: variables, terms and
//! expressions can be added to and subtracted from each other and from
//! scalars, negated, and scaled by an `f64`. Multiplying two non-scalar
//! operands has no impl and fails to compile. Division lives in
//! `checked_div`, which reports division by zero.

use std::ops::{Add, Mul, Neg, Sub};

use crate::expression::{Expression, Term};
use crate::variable::Variable;

impl<R: Into<Expression>> Add<R> for Expression {
    type Output = Expression;

    fn add(self, rhs: R) -> Expression {
        self.plus(rhs.into())
    }
}

impl<R: Into<Expression>> Sub<R> for Expression {
    type Output = Expression;

    fn sub(self, rhs: R) -> Expression {
        self.minus(rhs.into())
    }
}

impl<R: Into<Expression>> Add<R> for Term {
    type Output = Expression;

    fn add(self, rhs: R) -> Expression {
        Expression::from(self).plus(rhs.into())
    }
}

impl<R: Into<Expression>> Sub<R> for Term {
    type Output = Expression;

    fn sub(self, rhs: R) -> Expression {
        Expression::from(self).minus(rhs.into())
    }
}

impl<R: Into<Expression>> Add<R> for Variable {
    type Output = Expression;

    fn add(self, rhs: R) -> Expression {
        Expression::from(self).plus(rhs.into())
    }
}

impl<R: Into<Expression>> Sub<R> for Variable {
    type Output = Expression;

    fn sub(self, rhs: R) -> Expression {
        Expression::from(self).minus(rhs.into())
    }
}

impl<R: Into<Expression>> Add<R> for &Variable {
    type Output = Expression;

    fn add(self, rhs: R) -> Expression {
        Expression::from(self).plus(rhs.into())
    }
}

impl<R: Into<Expression>> Sub<R> for &Variable {
    type Output = Expression;

    fn sub(self, rhs: R) -> Expression {
        Expression::from(self).minus(rhs.into())
    }
}

/// Scalar on the left: `2.0 + x`, `10.0 - e`.
macro_rules! impl_scalar_lhs {
    ($($rhs:ty),*) => {
        $(
            impl Add<$rhs> for f64 {
                type Output = Expression;

                fn add(self, rhs: $rhs) -> Expression {
                    Expression::from_constant(self).plus(rhs.into())
                }
            }

            impl Sub<$rhs> for f64 {
                type Output = Expression;

                fn sub(self, rhs: $rhs) -> Expression {
                    Expression::from_constant(self).minus(rhs.into())
                }
            }
        )*
    };
}

impl_scalar_lhs!(Variable, &Variable, Term, Expression);

impl Neg for Variable {
    type Output = Term;

    fn neg(self) -> Term {
        Term::new(self, -1.0)
    }
}

impl Neg for &Variable {
    type Output = Term;

    fn neg(self) -> Term {
        Term::new(self.clone(), -1.0)
    }
}

impl Neg for Term {
    type Output = Term;

    fn neg(self) -> Term {
        self.scaled(-1.0)
    }
}

impl Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        self.negated()
    }
}

impl Mul<f64> for Variable {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self, rhs)
    }
}

impl Mul<f64> for &Variable {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        Term::new(self.clone(), rhs)
    }
}

impl Mul<f64> for Term {
    type Output = Term;

    fn mul(self, rhs: f64) -> Term {
        self.scaled(rhs)
    }
}

impl Mul<f64> for Expression {
    type Output = Expression;

    fn mul(self, rhs: f64) -> Expression {
        self.scaled(rhs)
    }
}

impl Mul<Variable> for f64 {
    type Output = Term;

    fn mul(self, rhs: Variable) -> Term {
        rhs * self
    }
}

impl Mul<&Variable> for f64 {
    type Output = Term;

    fn mul(self, rhs: &Variable) -> Term {
        rhs * self
    }
}

impl Mul<Term> for f64 {
    type Output = Term;

    fn mul(self, rhs: Term) -> Term {
        rhs * self
    }
}

impl Mul<Expression> for f64 {
    type Output = Expression;

    fn mul(self, rhs: Expression) -> Expression {
        rhs * self
    }
}
