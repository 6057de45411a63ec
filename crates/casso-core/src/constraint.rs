//! Linear constraints.
//!
//! A constraint is normalized on construction to read `expression OP 0`.
//! Building one from two sides (`lhs OP rhs`) stores `lhs - rhs`. Terms that
//! reference the same variable are merged, keeping first-appearance order.
//! Constraints are shared handles: clones compare equal, two constraints
//! built from the same pieces do not.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::BitOr;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::errors::AlgebraError;
use crate::expression::{Expression, Term};
use crate::strength::Strength;
use crate::variable::Variable;

/// Tolerance used when checking equality constraints against values.
const EQ_TOLERANCE: f64 = 1e-8;

/// The relation of a constraint's expression to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RelationalOperator {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

impl RelationalOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            RelationalOperator::LessOrEqual => "<=",
            RelationalOperator::Equal => "==",
            RelationalOperator::GreaterOrEqual => ">=",
        }
    }
}

impl FromStr for RelationalOperator {
    type Err = AlgebraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<=" => Ok(RelationalOperator::LessOrEqual),
            "==" => Ok(RelationalOperator::Equal),
            ">=" => Ok(RelationalOperator::GreaterOrEqual),
            "<" => Err(unsupported("<")),
            ">" => Err(unsupported(">")),
            "!=" => Err(unsupported("!=")),
            _ => Err(AlgebraError::UnknownOperator {
                symbol: s.to_string(),
            }),
        }
    }
}

fn unsupported(operation: &'static str) -> AlgebraError {
    AlgebraError::UnsupportedOperation {
        operation,
        lhs: "Expression",
        rhs: "Expression",
    }
}

impl fmt::Display for RelationalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug)]
struct ConstraintData {
    expression: Expression,
    operator: RelationalOperator,
    strength: Strength,
}

/// A linear constraint `expression OP 0` with a strength.
#[derive(Clone)]
pub struct Constraint(Arc<ConstraintData>);

impl Constraint {
    /// Create a constraint `expression OP 0`.
    pub fn new(expression: Expression, operator: RelationalOperator, strength: Strength) -> Self {
        Self(Arc::new(ConstraintData {
            expression: reduce(&expression),
            operator,
            strength,
        }))
    }

    /// Create a required constraint `lhs OP rhs`.
    pub fn relate(
        lhs: impl Into<Expression>,
        operator: RelationalOperator,
        rhs: impl Into<Expression>,
    ) -> Self {
        Self::new(lhs.into().minus(rhs.into()), operator, Strength::REQUIRED)
    }

    pub fn expression(&self) -> &Expression {
        &self.0.expression
    }

    pub fn operator(&self) -> RelationalOperator {
        self.0.operator
    }

    pub fn strength(&self) -> Strength {
        self.0.strength
    }

    /// A new constraint with the same expression and operator.
    pub fn with_strength(&self, strength: Strength) -> Self {
        Self(Arc::new(ConstraintData {
            expression: self.0.expression.clone(),
            operator: self.0.operator,
            strength,
        }))
    }

    /// Like [`Constraint::with_strength`], taking `weak`, `medium`,
    /// `strong` or `required`.
    pub fn with_named_strength(&self, name: &str) -> Result<Self, AlgebraError> {
        Ok(self.with_strength(Strength::from_name(name)?))
    }

    /// Check the relation against the variables' current values.
    pub fn violated(&self) -> bool {
        let value = self.0.expression.value();
        match self.0.operator {
            RelationalOperator::Equal => value.abs() >= EQ_TOLERANCE,
            RelationalOperator::GreaterOrEqual => value < 0.0,
            RelationalOperator::LessOrEqual => value > 0.0,
        }
    }

    pub fn is(&self, other: &Constraint) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Merge terms that share a variable.
fn reduce(expression: &Expression) -> Expression {
    let mut coefficients: IndexMap<Variable, f64> = IndexMap::new();
    for term in expression.terms() {
        *coefficients.entry(term.variable().clone()).or_insert(0.0) += term.coefficient();
    }
    Expression::new(
        coefficients
            .into_iter()
            .map(|(variable, coefficient)| Term::new(variable, coefficient)),
        expression.constant(),
    )
}

impl BitOr<Strength> for Constraint {
    type Output = Constraint;

    fn bitor(self, rhs: Strength) -> Constraint {
        self.with_strength(rhs)
    }
}

impl BitOr<Strength> for &Constraint {
    type Output = Constraint;

    fn bitor(self, rhs: Strength) -> Constraint {
        self.with_strength(rhs)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as *const () as usize).hash(state);
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("expression", &self.0.expression)
            .field("operator", &self.0.operator)
            .field("strength", &self.0.strength)
            .finish()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} 0 | strength = {}",
            self.0.expression, self.0.operator, self.0.strength
        )
    }
}

/// Builders for required constraints between linear operands.
pub trait Relate: Into<Expression> + Sized {
    /// `self <= rhs`
    fn le(self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::relate(self, RelationalOperator::LessOrEqual, rhs)
    }

    /// `self == rhs`
    fn equals(self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::relate(self, RelationalOperator::Equal, rhs)
    }

    /// `self >= rhs`
    fn ge(self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::relate(self, RelationalOperator::GreaterOrEqual, rhs)
    }
}

impl Relate for Variable {}
impl Relate for &Variable {}
impl Relate for Term {}
impl Relate for Expression {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_creation() {
        let v = Variable::named("foo");
        for op in ["==", "<=", ">="] {
            let operator: RelationalOperator = op.parse().unwrap();
            let c = Constraint::new(&v + 1.0, operator, Strength::REQUIRED);
            assert_eq!(c.strength(), Strength::REQUIRED);
            assert_eq!(c.operator().symbol(), op);

            let e = c.expression();
            assert_eq!(e.constant(), 1.0);
            assert_eq!(e.terms().len(), 1);
            assert!(e.terms()[0].variable().is(&v));
            assert_eq!(e.terms()[0].coefficient(), 1.0);

            assert_eq!(
                c.to_string(),
                format!("1 * foo + 1 {op} 0 | strength = 1001001000")
            );

            for name in ["weak", "medium", "strong", "required"] {
                let c = Constraint::new(&v + 1.0, operator, Strength::from_name(name).unwrap());
                assert_eq!(c.strength(), Strength::from_name(name).unwrap());
            }
        }
    }

    #[test]
    fn test_operator_parsing() {
        assert!(matches!(
            "!=".parse::<RelationalOperator>(),
            Err(AlgebraError::UnsupportedOperation { operation: "!=", .. })
        ));
        assert!(matches!(
            "<".parse::<RelationalOperator>(),
            Err(AlgebraError::UnsupportedOperation { operation: "<", .. })
        ));
        assert!(matches!(
            "=>".parse::<RelationalOperator>(),
            Err(AlgebraError::UnknownOperator { .. })
        ));
    }

    #[test]
    fn test_relate_normalizes() {
        let v = Variable::named("foo");
        let v2 = Variable::named("γ");
        let builders: [(fn(&Variable, Expression) -> Constraint, &str); 3] = [
            (|a: &Variable, b: Expression| a.le(b), "<="),
            (|a: &Variable, b: Expression| a.equals(b), "=="),
            (|a: &Variable, b: Expression| a.ge(b), ">="),
        ];
        for (build, symbol) in builders {
            let c = build(&v, &v2 + 1.0);
            let t = c.expression().terms();
            assert_eq!(t.len(), 2);
            assert!(t[0].variable().is(&v) && t[0].coefficient() == 1.0);
            assert!(t[1].variable().is(&v2) && t[1].coefficient() == -1.0);
            assert_eq!(c.expression().constant(), -1.0);
            assert_eq!(c.operator().symbol(), symbol);
            assert_eq!(c.strength(), Strength::REQUIRED);
        }
    }

    #[test]
    fn test_reduce_merges_duplicate_variables() {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let e = &x * 2.0 + &y + &x * 3.0 - 4.0;
        assert_eq!(e.terms().len(), 3);

        let c = e.ge(0.0);
        let t = c.expression().terms();
        assert_eq!(t.len(), 2);
        assert!(t[0].variable().is(&x) && t[0].coefficient() == 5.0);
        assert!(t[1].variable().is(&y) && t[1].coefficient() == 1.0);
        assert_eq!(c.expression().constant(), -4.0);
    }

    #[test]
    fn test_strength_rebinding() {
        let v = Variable::named("foo");
        let c = (&v + 1.0).equals(0.0);

        for name in ["weak", "medium", "strong", "required"] {
            let c2 = c.with_named_strength(name).unwrap();
            assert_eq!(c2.strength(), Strength::from_name(name).unwrap());
            assert_eq!(c2.operator(), c.operator());
            assert_eq!(c2.expression(), c.expression());
            assert_ne!(c2, c);
        }

        let custom = Strength::create(1.0, 1.0, 0.0, 1.0);
        assert_eq!((&c | custom).strength(), custom);
        assert_eq!((c.clone() | Strength::STRONG).strength(), Strength::STRONG);

        assert!(matches!(
            c.with_named_strength("unknown"),
            Err(AlgebraError::UnknownStrengthName { .. })
        ));
    }

    #[test]
    fn test_identity() {
        let v = Variable::named("foo");
        let a = v.clone().le(10.0);
        let b = v.le(10.0);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_violated() {
        let x = Variable::named("x");
        let le = (&x).le(10.0);
        let ge = (&x).ge(10.0);
        let eq = (&x).equals(10.0);

        x.set_value(5.0);
        assert!(!le.violated());
        assert!(ge.violated());
        assert!(eq.violated());

        x.set_value(10.0);
        assert!(!le.violated() && !ge.violated() && !eq.violated());
    }
}
