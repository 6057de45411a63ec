use casso_core::{
    AlgebraError, Comparison, Constraint, Expression, Operand, Relate, RelationalOperator,
    Strength, Term, Variable,
};
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f64> {
    -1.0e6..1.0e6f64
}

fn non_zero() -> impl Strategy<Value = f64> {
    prop_oneof![-1.0e3..-1.0e-3f64, 1.0e-3..1.0e3f64]
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

proptest! {
    #[test]
    fn term_coefficient_and_negation(c in finite()) {
        let v = Variable::named("v");
        let t = &v * c;
        prop_assert_eq!(t.coefficient(), c);
        prop_assert_eq!((-t).coefficient(), -c);
    }

    #[test]
    fn expression_division_scales_everything(
        coefficients in prop::collection::vec(finite(), 0..6),
        constant in finite(),
        k in non_zero(),
    ) {
        let terms = coefficients
            .iter()
            .map(|&c| Term::new(Variable::new(), c))
            .collect::<Vec<_>>();
        let e = Expression::new(terms, constant);
        let divided = e.checked_div(k).unwrap();

        prop_assert!(close(divided.constant(), constant / k));
        prop_assert_eq!(divided.terms().len(), e.terms().len());
        for (before, after) in e.terms().iter().zip(divided.terms()) {
            prop_assert!(after.variable().is(before.variable()));
            prop_assert!(close(after.coefficient(), before.coefficient() / k));
        }
        prop_assert_eq!(e.checked_div(0.0), Err(AlgebraError::DivisionByZero));
    }

    #[test]
    fn addition_keeps_left_terms_first(a in finite(), b in finite(), ka in finite(), kb in finite()) {
        let x = Variable::named("x");
        let y = Variable::named("y");
        let lhs = &x * a + ka;
        let rhs = &y * b + kb;

        let xy = lhs.clone() + rhs.clone();
        let yx = rhs + lhs;
        prop_assert!(close(xy.constant(), yx.constant()));
        prop_assert!(xy.terms()[0].variable().is(&x));
        prop_assert!(yx.terms()[0].variable().is(&y));
        prop_assert_eq!(xy.terms().len(), 2);
    }

    #[test]
    fn strength_create_stays_below_required(
        strong in -10.0..2000.0f64,
        medium in -10.0..2000.0f64,
        weak in -10.0..2000.0f64,
        weight in 0.0..10.0f64,
    ) {
        let s = Strength::create(strong, medium, weak, weight);
        prop_assert!(s.value() >= 0.0);
        prop_assert!(s < Strength::REQUIRED);
        prop_assert!(!s.is_required());
    }

    #[test]
    fn constraint_reduces_repeated_variables(a in finite(), b in finite()) {
        let x = Variable::named("x");
        let c = (&x * a + &x * b).equals(0.0);
        prop_assert_eq!(c.expression().terms().len(), 1);
        prop_assert!(close(c.expression().terms()[0].coefficient(), a + b));
    }
}

#[test]
fn test_default_and_named_strengths() {
    let v = Variable::named("v");
    let c = Constraint::new(&v + 1.0, RelationalOperator::LessOrEqual, Strength::default());
    assert_eq!(c.strength(), Strength::REQUIRED);

    let weak = c.with_named_strength("weak").unwrap();
    assert_eq!(weak.strength(), Strength::WEAK);
    assert!(!weak.is(&c));

    let strong = &c | Strength::STRONG;
    assert_eq!(strong.strength(), Strength::STRONG);
    assert_eq!(strong.operator(), c.operator());
    assert_eq!(strong.expression(), c.expression());

    assert_eq!(
        c.with_named_strength("bogus").unwrap_err(),
        AlgebraError::UnknownStrengthName {
            name: "bogus".to_string()
        }
    );
}

#[test]
fn test_unsupported_comparisons() {
    let x = Variable::named("x");
    let y = Variable::named("y");

    for comparison in [Comparison::Lt, Comparison::Gt, Comparison::Ne] {
        let lhs = Operand::Expression(&x + 1.0);
        let rhs = Operand::Expression(&y * 2.0 + 0.0);
        assert!(matches!(
            lhs.compare(comparison, rhs),
            Err(AlgebraError::UnsupportedOperation { .. })
        ));
    }
}

#[test]
fn test_canonical_rendering() {
    let x = Variable::named("x");
    let y = Variable::named("y");

    insta::assert_snapshot!(&x * 2.0, @"2 * x");
    insta::assert_snapshot!(&x * 2.0 - &y * 0.5 + 3.0, @"2 * x + -0.5 * y + 3");
    insta::assert_snapshot!(Expression::from_constant(4.0), @"4");
    insta::assert_snapshot!(
        (&x + &y).le(10.0) | Strength::MEDIUM,
        @"1 * x + 1 * y + -10 <= 0 | strength = 1000"
    );
}

#[cfg(feature = "serde")]
#[test]
fn test_serde_round_trip() {
    let json = serde_json::to_string(&Strength::STRONG).unwrap();
    assert_eq!(json, "1000000.0");
    assert_eq!(
        serde_json::from_str::<Strength>(&json).unwrap(),
        Strength::STRONG
    );

    // Deserialized strengths are clipped into [0, REQUIRED].
    assert_eq!(
        serde_json::from_str::<Strength>("5e12").unwrap(),
        Strength::REQUIRED
    );
    assert_eq!(serde_json::from_str::<Strength>("-3.0").unwrap().value(), 0.0);

    let json = serde_json::to_string(&RelationalOperator::GreaterOrEqual).unwrap();
    assert_eq!(json, "\"GreaterOrEqual\"");
    assert_eq!(
        serde_json::from_str::<RelationalOperator>(&json).unwrap(),
        RelationalOperator::GreaterOrEqual
    );
}
