use num_traits::One;

use super::atoms::{self, Evaluated, Radical};
use super::identities;
use super::together::rational_function;
use crate::config::CheckerConfig;
use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational};
use crate::poly::multi::{Monomial, MultiPoly};

/// Multiplies out products and integer powers. Monomial denominators become
/// negative exponents; a denominator that is a sum stays behind as the atom
/// `(sum)^-1`.
pub(crate) fn expand_poly(expr: &Expr, config: &CheckerConfig) -> Result<MultiPoly> {
    let poly = expand_raw(expr, config)?;
    identities::reduce(poly, config)
}

fn expand_raw(expr: &Expr, config: &CheckerConfig) -> Result<MultiPoly> {
    match expr {
        Expr::Variable(_) => Ok(MultiPoly::atom(expr.clone())),
        Expr::Constant(c) => Ok(MultiPoly::constant(c.clone())),
        Expr::Add(a, b) => Ok(expand_raw(a, config)? + expand_raw(b, config)?),
        Expr::Sub(a, b) => Ok(expand_raw(a, config)? - expand_raw(b, config)?),
        Expr::Neg(a) => Ok(-expand_raw(a, config)?),
        Expr::Mul(a, b) => expand_raw(a, config)?.checked_mul(&expand_raw(b, config)?, config),
        Expr::Div(a, b) => {
            let inverse = invert(expand_raw(b, config)?, config)?;
            expand_raw(a, config)?.checked_mul(&inverse, config)
        }
        Expr::Pow(base, exp) => expand_pow(base, exp, config),
        Expr::Func(func, arg) => Ok(match atoms::apply_function(*func, arg, config)? {
            Evaluated::Constant(c) => MultiPoly::constant(c),
            Evaluated::Inner(inner) => expand_raw(&inner, config)?,
            Evaluated::Atom { atom, negated } => {
                let poly = MultiPoly::atom(atom);
                if negated {
                    -poly
                } else {
                    poly
                }
            }
        }),
    }
}

fn expand_pow(base: &Expr, exp: &Expr, config: &CheckerConfig) -> Result<MultiPoly> {
    let exponent = rational_function(exp, config)?;
    match exponent.as_constant() {
        Some(r) if r.is_integer() => {
            let k = atoms::integer_exponent(&r, config)?;
            integer_power(expand_raw(base, config)?, k, config)
        }
        Some(r) => match atoms::radical(base, &r, config)? {
            Radical::Exact(value) => Ok(MultiPoly::constant(value)),
            Radical::Split { whole, root, rem } => {
                let whole = integer_power(expand_raw(base, config)?, whole, config)?;
                whole.mul_monomial(&Monomial::power(root, rem), &Rational::one(), config)
            }
        },
        None => Ok(MultiPoly::atom(atoms::power_atom(base, exp, config)?)),
    }
}

pub(crate) fn integer_power(base: MultiPoly, k: i64, config: &CheckerConfig) -> Result<MultiPoly> {
    let magnitude = u32::try_from(k.unsigned_abs()).map_err(|_| CasError::LimitExceeded {
        what: "exponent",
        limit: config.max_exponent as usize,
    })?;
    let base = if k < 0 { invert(base, config)? } else { base };
    base.checked_pow(magnitude, config)
}

fn invert(poly: MultiPoly, config: &CheckerConfig) -> Result<MultiPoly> {
    let poly = identities::reduce(poly, config)?;
    if poly.is_zero() {
        return Err(CasError::Unsupported("division by zero".to_string()));
    }
    if let Some((monomial, coeff)) = poly.single_term() {
        return Ok(MultiPoly::term(monomial.inverse(), coeff.recip()));
    }
    Ok(MultiPoly::atom(Expr::Pow(
        poly.to_expr().boxed(),
        Expr::integer(-1).boxed(),
    )))
}
