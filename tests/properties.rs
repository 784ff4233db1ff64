//! Property tests over randomly generated polynomial and trigonometric
//! expressions. Division is left out so every generated value is defined.

use proptest::prelude::*;
use stepcheck::expr::{add, mul, neg, pow, sub, Equation, Expr, Func, Statement};
use stepcheck::{
    canonical, equivalent, expand, parse_expr, pretty, verify, verify_step, Chain,
    CheckerConfig,
};

fn leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        Just(Expr::var("x")),
        Just(Expr::var("y")),
        (-3i32..=3).prop_map(Expr::integer),
    ]
}

fn expression() -> impl Strategy<Value = Expr> {
    leaf().prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| add(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| sub(a, b)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| mul(a, b)),
            inner.clone().prop_map(neg),
            (inner.clone(), 0i32..=3).prop_map(|(a, k)| pow(a, Expr::integer(k))),
            inner.clone().prop_map(|a| Expr::apply(Func::Sin, a)),
            inner.prop_map(|a| Expr::apply(Func::Cos, a)),
        ]
    })
}

fn equation() -> impl Strategy<Value = Statement> {
    (expression(), expression()).prop_map(|(lhs, rhs)| Statement::Equation(Equation::new(lhs, rhs)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn equations_are_equivalent_to_themselves(eq in equation()) {
        let verdict = equivalent(&eq, &eq, &CheckerConfig::default());
        prop_assert!(verdict.is_equivalent(), "{} against itself: {:?}", eq, verdict);
    }

    #[test]
    fn equation_check_is_symmetric(a in equation(), b in equation()) {
        let config = CheckerConfig::default();
        prop_assert_eq!(
            equivalent(&a, &b, &config).is_equivalent(),
            equivalent(&b, &a, &config).is_equivalent()
        );
    }

    #[test]
    fn printing_then_parsing_preserves_meaning(expr in expression()) {
        let config = CheckerConfig::default();
        let printed = pretty(&expr);
        let reparsed = parse_expr(&printed);
        prop_assert!(reparsed.is_ok(), "could not reparse {}", printed);
        let reparsed = reparsed.unwrap();
        prop_assert_eq!(canonical(&reparsed, &config), canonical(&expr, &config));
    }

    #[test]
    fn expanded_form_is_accepted_before_its_factored_form(expr in expression()) {
        let expanded = expand(&expr, &CheckerConfig::default()).unwrap();
        prop_assert!(
            verify_step(&expanded.to_string(), &expr.to_string()),
            "{} does not expand to {}",
            expr,
            expanded
        );
    }

    #[test]
    fn first_step_is_always_verified(steps in prop::collection::vec("\\PC{0,24}", 1..5)) {
        let mut chain = Chain::from_expressions("arbitrary", steps).unwrap();
        let verdicts = verify(&mut chain).unwrap();
        prop_assert!(verdicts[0].verified);
    }

    #[test]
    fn verifying_twice_gives_the_same_verdicts(
        exprs in prop::collection::vec(expression(), 1..5)
    ) {
        let texts: Vec<String> = exprs.iter().map(pretty).collect();
        let mut chain = Chain::from_expressions("generated", texts).unwrap();
        let first = verify(&mut chain).unwrap();
        let second = verify(&mut chain).unwrap();
        prop_assert_eq!(first, second);
    }
}
