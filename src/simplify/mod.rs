//! Canonical forms used by the equivalence checker, and substitution.

mod atoms;
mod expand;
mod identities;
mod substitute;
mod together;

use crate::config::CheckerConfig;
use crate::error::Result;
use crate::expr::{Expr, Rational};
use crate::poly::multi::MultiPoly;
use crate::poly::rational::RationalFunction;
use num_traits::{One, Signed};

pub use substitute::substitute;

/// Fully expanded form: products and integer powers are multiplied out and
/// like terms collected. A denominator that is a sum is kept as a single
/// factor `(sum)^-1`.
pub fn expand(expr: &Expr, config: &CheckerConfig) -> Result<Expr> {
    Ok(expand_poly(expr, config)?.to_expr())
}

pub fn expand_poly(expr: &Expr, config: &CheckerConfig) -> Result<MultiPoly> {
    config.check_depth(expr.depth())?;
    expand::expand_poly(expr, config)
}

/// Rational-function normal form `num / den`, with common univariate factors
/// cancelled.
pub fn canonical(expr: &Expr, config: &CheckerConfig) -> Result<Expr> {
    Ok(rational_function(expr, config)?.to_expr())
}

pub fn rational_function(expr: &Expr, config: &CheckerConfig) -> Result<RationalFunction> {
    config.check_depth(expr.depth())?;
    together::rational_function(expr, config)
}

/// Exact zero test: the numerator of the rational-function form is the zero
/// polynomial.
pub fn is_identically_zero(expr: &Expr, config: &CheckerConfig) -> Result<bool> {
    Ok(rational_function(expr, config)?.is_zero())
}

/// Whether `expr` is already written in expanded form: no sum is multiplied
/// by a non-constant factor and no sum is raised to an integer power other
/// than `1` or `-1`.
pub fn is_expanded(expr: &Expr) -> bool {
    match expr {
        Expr::Variable(_) | Expr::Constant(_) => true,
        Expr::Add(a, b) | Expr::Sub(a, b) => is_expanded(a) && is_expanded(b),
        Expr::Neg(a) | Expr::Func(_, a) => is_expanded(a),
        Expr::Pow(base, exp) => {
            let repeated_sum = is_symbolic_sum(base)
                && exp
                    .as_constant()
                    .is_some_and(|k| k.is_integer() && k.abs() > Rational::one());
            !repeated_sum && is_expanded(base) && is_expanded(exp)
        }
        Expr::Mul(_, _) | Expr::Div(_, _) => {
            let mut num = Vec::new();
            let mut den = Vec::new();
            collect_factors(expr, false, &mut num, &mut den);
            num.iter().chain(den.iter()).all(|f| is_expanded(f))
                && !distributes(&num, den.iter().any(|f| f.contains_variables()))
                && !distributes(&den, false)
        }
    }
}

/// True when the canonical form mentions a function or a non-integer power,
/// i.e. when a non-zero residual may still hide an identity.
pub fn has_transcendental_atoms(expr: &Expr) -> bool {
    match expr {
        Expr::Variable(_) | Expr::Constant(_) => false,
        Expr::Func(_, _) => true,
        Expr::Pow(base, exp) => {
            !exp.as_constant().is_some_and(|k| k.is_integer()) || has_transcendental_atoms(base)
        }
        Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
            has_transcendental_atoms(a) || has_transcendental_atoms(b)
        }
        Expr::Neg(a) => has_transcendental_atoms(a),
    }
}

fn is_symbolic_sum(expr: &Expr) -> bool {
    expr.is_sum() && expr.contains_variables()
}

// A sum factor must be distributed when any other factor carries a variable.
fn distributes(factors: &[&Expr], other_side_has_variables: bool) -> bool {
    factors.iter().enumerate().any(|(idx, factor)| {
        is_symbolic_sum(factor)
            && (other_side_has_variables
                || factors
                    .iter()
                    .enumerate()
                    .any(|(other, f)| other != idx && f.contains_variables()))
    })
}

fn collect_factors<'a>(
    expr: &'a Expr,
    inverted: bool,
    num: &mut Vec<&'a Expr>,
    den: &mut Vec<&'a Expr>,
) {
    match expr {
        Expr::Mul(a, b) => {
            collect_factors(a, inverted, num, den);
            collect_factors(b, inverted, num, den);
        }
        Expr::Div(a, b) => {
            collect_factors(a, inverted, num, den);
            collect_factors(b, !inverted, num, den);
        }
        Expr::Neg(a) if !a.is_sum() => collect_factors(a, inverted, num, den),
        other if inverted => den.push(other),
        other => num.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expr;

    fn expanded(text: &str) -> bool {
        is_expanded(&parse_expr(text).unwrap())
    }

    #[test]
    fn expanded_forms() {
        assert!(expanded("x^2 - 4"));
        assert!(expanded("2*(x + 1)"));
        assert!(expanded("x/(x + 1)"));
        assert!(expanded("sin(x)^2 + 1"));
    }

    #[test]
    fn unexpanded_forms() {
        assert!(!expanded("(x - 2)*(x + 2)"));
        assert!(!expanded("x*(x + 1)"));
        assert!(!expanded("(x + 1)^2"));
        assert!(!expanded("(x + 1)/y"));
        assert!(!expanded("1/(x*(x + 1))"));
        assert!(!expanded("2*x*(y - 1)"));
    }
}
