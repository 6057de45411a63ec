//! Dynamically typed operands.
//!
//! [`Operand`] covers callers that only know operand kinds at runtime, such
//! as bindings or expression parsers. It follows the same linear rules as
//! the typed operators but reports violations as [`AlgebraError`] values:
//! non-scalar products and divisions, unsupported comparisons, division by
//! zero, and operands of the wrong kind.

use crate::constraint::{Constraint, RelationalOperator};
use crate::errors::AlgebraError;
use crate::expression::{Expression, Term};
use crate::strength::Strength;
use crate::variable::Variable;

/// A value that can take part in a linear expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(f64),
    Variable(Variable),
    Term(Term),
    Expression(Expression),
}

/// Comparison requested between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Comparison {
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Ge => ">=",
            Comparison::Gt => ">",
        }
    }

    fn relational(&self) -> Option<RelationalOperator> {
        match self {
            Comparison::Le => Some(RelationalOperator::LessOrEqual),
            Comparison::Eq => Some(RelationalOperator::Equal),
            Comparison::Ge => Some(RelationalOperator::GreaterOrEqual),
            Comparison::Lt | Comparison::Ne | Comparison::Gt => None,
        }
    }
}

impl Operand {
    pub fn kind(&self) -> &'static str {
        match self {
            Operand::Scalar(_) => "scalar",
            Operand::Variable(_) => "Variable",
            Operand::Term(_) => "Term",
            Operand::Expression(_) => "Expression",
        }
    }

    pub fn into_expression(self) -> Expression {
        match self {
            Operand::Scalar(value) => Expression::from_constant(value),
            Operand::Variable(v) => v.into(),
            Operand::Term(t) => t.into(),
            Operand::Expression(e) => e,
        }
    }

    /// Convert to a term; only variables and terms qualify.
    pub fn try_into_term(self) -> Result<Term, AlgebraError> {
        match self {
            Operand::Variable(v) => Ok(v.into()),
            Operand::Term(t) => Ok(t),
            other => Err(AlgebraError::TypeMismatch {
                expected: "Term",
                found: other.kind(),
            }),
        }
    }

    pub fn neg(self) -> Operand {
        match self {
            Operand::Scalar(value) => Operand::Scalar(-value),
            Operand::Variable(v) => Operand::Term(-v),
            Operand::Term(t) => Operand::Term(-t),
            Operand::Expression(e) => Operand::Expression(-e),
        }
    }

    pub fn add(self, rhs: Operand) -> Operand {
        match (self, rhs) {
            (Operand::Scalar(a), Operand::Scalar(b)) => Operand::Scalar(a + b),
            (lhs, rhs) => Operand::Expression(lhs.into_expression().plus(rhs.into_expression())),
        }
    }

    pub fn sub(self, rhs: Operand) -> Operand {
        match (self, rhs) {
            (Operand::Scalar(a), Operand::Scalar(b)) => Operand::Scalar(a - b),
            (lhs, rhs) => Operand::Expression(lhs.into_expression().minus(rhs.into_expression())),
        }
    }

    /// Multiply two operands. At least one side must be a scalar.
    pub fn mul(self, rhs: Operand) -> Result<Operand, AlgebraError> {
        match (self, rhs) {
            (Operand::Scalar(a), Operand::Scalar(b)) => Ok(Operand::Scalar(a * b)),
            (Operand::Scalar(k), other) | (other, Operand::Scalar(k)) => Ok(other.scaled(k)),
            (lhs, rhs) => Err(AlgebraError::UnsupportedOperation {
                operation: "*",
                lhs: lhs.kind(),
                rhs: rhs.kind(),
            }),
        }
    }

    /// Divide by a scalar.
    pub fn div(self, rhs: Operand) -> Result<Operand, AlgebraError> {
        match rhs {
            Operand::Scalar(k) if k == 0.0 => Err(AlgebraError::DivisionByZero),
            Operand::Scalar(k) => match self {
                Operand::Scalar(value) => Ok(Operand::Scalar(value / k)),
                other => Ok(other.scaled(1.0 / k)),
            },
            rhs => Err(AlgebraError::UnsupportedOperation {
                operation: "/",
                lhs: self.kind(),
                rhs: rhs.kind(),
            }),
        }
    }

    /// Build a required constraint `self OP rhs`.
    pub fn compare(self, comparison: Comparison, rhs: Operand) -> Result<Constraint, AlgebraError> {
        let operator = comparison
            .relational()
            .ok_or(AlgebraError::UnsupportedOperation {
                operation: comparison.symbol(),
                lhs: self.kind(),
                rhs: rhs.kind(),
            })?;
        Ok(Constraint::relate(
            self.into_expression(),
            operator,
            rhs.into_expression(),
        ))
    }

    /// Build `self OP 0` from an operator string and an optional strength
    /// name. A bare scalar has nothing to constrain and is rejected.
    pub fn into_constraint(
        self,
        operator: &str,
        strength: Option<&str>,
    ) -> Result<Constraint, AlgebraError> {
        if let Operand::Scalar(_) = self {
            return Err(AlgebraError::TypeMismatch {
                expected: "Expression",
                found: self.kind(),
            });
        }
        let operator: RelationalOperator = operator.parse()?;
        let strength = match strength {
            Some(name) => Strength::from_name(name)?,
            None => Strength::REQUIRED,
        };
        Ok(Constraint::new(self.into_expression(), operator, strength))
    }

    fn scaled(self, factor: f64) -> Operand {
        match self {
            Operand::Scalar(value) => Operand::Scalar(value * factor),
            Operand::Variable(v) => Operand::Term(v * factor),
            Operand::Term(t) => Operand::Term(t * factor),
            Operand::Expression(e) => Operand::Expression(e * factor),
        }
    }
}

/// Build an expression from operands that must each be a term or variable.
pub fn expression_from_operands(
    terms: impl IntoIterator<Item = Operand>,
    constant: f64,
) -> Result<Expression, AlgebraError> {
    let terms = terms
        .into_iter()
        .map(Operand::try_into_term)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expression::new(terms, constant))
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<Variable> for Operand {
    fn from(v: Variable) -> Self {
        Operand::Variable(v)
    }
}

impl From<&Variable> for Operand {
    fn from(v: &Variable) -> Self {
        Operand::Variable(v.clone())
    }
}

impl From<Term> for Operand {
    fn from(t: Term) -> Self {
        Operand::Term(t)
    }
}

impl From<Expression> for Operand {
    fn from(e: Expression) -> Self {
        Operand::Expression(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonlinear_products_fail() {
        let v = Variable::named("foo");
        let v2 = Variable::named("bar");
        let t = Term::new(v.clone(), 10.0);
        let e = t.clone() + 5.0;

        for (lhs, rhs) in [
            (Operand::from(&v), Operand::from(&v2)),
            (Operand::from(t.clone()), Operand::from(&v)),
            (Operand::from(e.clone()), Operand::from(&v)),
            (Operand::from(e.clone()), Operand::from(e.clone())),
        ] {
            assert!(matches!(
                lhs.mul(rhs),
                Err(AlgebraError::UnsupportedOperation { operation: "*", .. })
            ));
        }

        let mul = Operand::from(2.0).mul(Operand::from(&v)).unwrap();
        match mul {
            Operand::Term(t) => assert!(t.variable().is(&v) && t.coefficient() == 2.0),
            other => panic!("expected a term, got {other:?}"),
        }
    }

    #[test]
    fn test_division() {
        let v = Variable::named("foo");
        let v2 = Variable::named("bar");

        match Operand::from(&v).div(Operand::from(2.0)).unwrap() {
            Operand::Term(t) => assert!(t.variable().is(&v) && t.coefficient() == 0.5),
            other => panic!("expected a term, got {other:?}"),
        }

        assert_eq!(
            Operand::from(&v).div(Operand::from(0.0)),
            Err(AlgebraError::DivisionByZero)
        );
        assert!(matches!(
            Operand::from(&v).div(Operand::from(&v2)),
            Err(AlgebraError::UnsupportedOperation { operation: "/", .. })
        ));
        assert!(matches!(
            Operand::from(2.0).div(Operand::from(&v2)),
            Err(AlgebraError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_add_and_sub() {
        let v = Variable::named("foo");
        assert_eq!(Operand::from(1.0).add(Operand::from(2.0)), Operand::Scalar(3.0));

        let Operand::Expression(e) = Operand::from(2.0).sub(Operand::from(&v)) else {
            panic!("expected an expression");
        };
        assert_eq!(e.constant(), 2.0);
        assert_eq!(e.terms()[0].coefficient(), -1.0);

        let Operand::Term(t) = Operand::from(&v).neg() else {
            panic!("expected a term");
        };
        assert_eq!(t.coefficient(), -1.0);
    }

    #[test]
    fn test_compare() {
        let v1 = Variable::named("foo");
        let v2 = Variable::named("bar");
        let e1 = Term::new(v1.clone(), 10.0) + 5.0;
        let e2 = &v2 - 10.0;

        for comparison in [Comparison::Le, Comparison::Eq, Comparison::Ge] {
            let c = Operand::from(e1.clone())
                .compare(comparison, Operand::from(e2.clone()))
                .unwrap();
            let t = c.expression().terms();
            assert_eq!(t.len(), 2);
            assert!(t[0].variable().is(&v1) && t[0].coefficient() == 10.0);
            assert!(t[1].variable().is(&v2) && t[1].coefficient() == -1.0);
            assert_eq!(c.expression().constant(), 15.0);
            assert_eq!(c.operator().symbol(), comparison.symbol());
            assert_eq!(c.strength(), Strength::REQUIRED);
        }

        for comparison in [Comparison::Lt, Comparison::Ne, Comparison::Gt] {
            let err = Operand::from(e1.clone())
                .compare(comparison, Operand::from(e2.clone()))
                .unwrap_err();
            assert_eq!(
                err,
                AlgebraError::UnsupportedOperation {
                    operation: comparison.symbol(),
                    lhs: "Expression",
                    rhs: "Expression",
                }
            );
        }
    }

    #[test]
    fn test_into_constraint() {
        let v = Variable::named("foo");
        let c = Operand::from(&v + 1.0).into_constraint("<=", None).unwrap();
        assert_eq!(c.strength(), Strength::REQUIRED);

        let c = Operand::from(&v + 1.0)
            .into_constraint("<=", Some("weak"))
            .unwrap();
        assert_eq!(c.strength(), Strength::WEAK);

        assert_eq!(
            Operand::from(1.0).into_constraint("==", None).unwrap_err(),
            AlgebraError::TypeMismatch {
                expected: "Expression",
                found: "scalar",
            }
        );
        assert!(matches!(
            Operand::from(&v + 1.0).into_constraint("!=", None),
            Err(AlgebraError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            Operand::from(&v + 1.0).into_constraint("==", Some("bogus")),
            Err(AlgebraError::UnknownStrengthName { .. })
        ));
    }

    #[test]
    fn test_expression_from_operands() {
        let v = Variable::named("foo");
        let v2 = Variable::named("bar");
        let e = expression_from_operands(
            [Operand::from(&v), Operand::from(&v2 * 2.0)],
            3.0,
        )
        .unwrap();
        assert_eq!(e.terms().len(), 2);
        assert_eq!(e.constant(), 3.0);

        assert_eq!(
            expression_from_operands([Operand::from(1.0), Operand::from(&v2 * 2.0)], 0.0)
                .unwrap_err(),
            AlgebraError::TypeMismatch {
                expected: "Term",
                found: "scalar",
            }
        );
    }
}
