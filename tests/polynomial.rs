use stepcheck::poly::{MultiPoly, Poly};
use stepcheck::simplify::expand_poly;
use stepcheck::{parse_expr, CheckerConfig, Expr, Rational};

fn multi(input: &str) -> MultiPoly {
    let expr = parse_expr(input).expect("parse polynomial");
    expand_poly(&expr, &CheckerConfig::default()).expect("expand polynomial")
}

fn poly(input: &str) -> Poly {
    Poly::from_multi(&multi(input), &Expr::var("x")).expect("build polynomial")
}

#[test]
fn polynomial_division_exact() {
    let dividend = poly("x^3 - 1");
    let divisor = poly("x - 1");
    let (quotient, remainder) = dividend.div_rem(&divisor);
    assert!(remainder.is_zero());
    assert_eq!(quotient, poly("x^2 + x + 1"));
}

#[test]
fn polynomial_division_remainder() {
    let dividend = poly("x^3 + x + 1");
    let divisor = poly("x^2 + 1");
    let (quotient, remainder) = dividend.div_rem(&divisor);
    assert_eq!(quotient, poly("x"));
    assert_eq!(remainder, poly("1"));
}

#[test]
fn polynomial_division_non_exact() {
    let dividend = poly("x^2 + 1");
    let divisor = poly("x + 1");
    assert!(dividend.div_exact(&divisor).is_none());
}

#[test]
fn polynomial_gcd_is_monic() {
    let a = poly("x^2 - 1");
    let b = poly("x^2 - x");
    let gcd = Poly::gcd(&a, &b);
    assert_eq!(gcd, poly("x - 1"));
}

#[test]
fn polynomial_gcd_ignores_content() {
    let a = poly("2*x^2 + 2*x");
    let b = poly("4*x");
    let gcd = Poly::gcd(&a, &b);
    assert_eq!(gcd, poly("x"));
}

#[test]
fn univariate_view_rejects_other_atoms() {
    assert!(Poly::from_multi(&multi("x^2 + y"), &Expr::var("x")).is_none());
    assert!(Poly::from_multi(&multi("x + 1/x"), &Expr::var("x")).is_none());
}

#[test]
fn univariate_view_converts_back() {
    let original = multi("3*x^4 - x/2 + 7");
    let x = Expr::var("x");
    let univariate = Poly::from_multi(&original, &x).unwrap();
    assert_eq!(univariate.degree(), Some(4));
    assert_eq!(univariate.coeff(1), Rational::new((-1).into(), 2.into()));
    assert_eq!(univariate.to_multi(&x), original);
}

#[test]
fn multivariate_expansion_collects_like_terms() {
    let p = multi("(x + y)^2 - (x - y)^2");
    assert_eq!(p, multi("4*x*y"));
    assert_eq!(p.term_count(), 1);
}

#[test]
fn monomial_denominators_become_negative_powers() {
    let p = multi("(x^2 + x)/x");
    assert_eq!(p, multi("x + 1"));
    assert!(multi("1/x + x").has_negative_exponent());
}
