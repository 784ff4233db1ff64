//! Rewrites applied to polynomials over atoms so that equal values get equal
//! representations.
//!
//! * `root^k` with `root = b^(1/q)` and `|k| >= q` is folded back into powers
//!   of `b`, expanded on the expansion path and kept as a fraction on the
//!   common-denominator path.
//! * `cos(u)^k` with `k >= 2` becomes `(1 - sin(u)^2)^(k/2) * cos(u)^(k%2)`.
//!   Every cosine is then of degree at most one, which makes the
//!   representation unique modulo `sin^2 + cos^2 = 1`.

use num_traits::{One, ToPrimitive, Zero};

use super::expand::{expand_poly, integer_power};
use super::together::rational_function;
use crate::config::CheckerConfig;
use crate::error::Result;
use crate::expr::{Expr, Func, Rational};
use crate::poly::multi::{Monomial, MultiPoly};
use crate::poly::rational::RationalFunction;

pub(crate) fn reduce(poly: MultiPoly, config: &CheckerConfig) -> Result<MultiPoly> {
    let poly = fold_radicals(poly, config)?;
    rewrite_even_cosines(poly, config)
}

/// The same rewrites for a quotient. Radical bases are brought over a common
/// denominator instead of expanded, so no `(sum)^-1` atom is introduced.
pub(crate) fn reduce_fraction(
    num: MultiPoly,
    den: MultiPoly,
    config: &CheckerConfig,
) -> Result<RationalFunction> {
    let num = fold_radicals_together(num, config)?;
    let den = fold_radicals_together(den, config)?;
    let (num, den) = num.div(&den, config)?.into_parts();
    RationalFunction::new(
        rewrite_even_cosines(num, config)?,
        rewrite_even_cosines(den, config)?,
    )
}

fn radical_index(atom: &Expr) -> Option<(&Expr, i32)> {
    match atom {
        Expr::Pow(base, exp) => {
            let r = exp.as_constant()?;
            if !r.numer().is_one() {
                return None;
            }
            let q = r.denom().to_i32()?;
            (q > 1).then_some((&**base, q))
        }
        _ => None,
    }
}

fn has_foldable_radical(poly: &MultiPoly) -> bool {
    poly.terms().any(|(monomial, _)| {
        monomial
            .factors()
            .any(|(atom, exp)| radical_index(atom).is_some_and(|(_, q)| exp.abs() >= q))
    })
}

fn fold_radicals(poly: MultiPoly, config: &CheckerConfig) -> Result<MultiPoly> {
    if !has_foldable_radical(&poly) {
        return Ok(poly);
    }

    let mut out = MultiPoly::zero();
    for (monomial, coeff) in poly.terms() {
        let mut rest = Monomial::one();
        let mut factor = MultiPoly::constant(coeff.clone());
        for (atom, exp) in monomial.factors() {
            match radical_index(atom) {
                Some((base, q)) if exp.abs() >= q => {
                    let whole = exp.div_euclid(q);
                    let base = expand_poly(base, config)?;
                    if whole < 0 && base.single_term().is_none() {
                        rest = rest.checked_mul(&Monomial::power(atom.clone(), exp), config)?;
                        continue;
                    }
                    factor = factor.checked_mul(&integer_power(base, whole.into(), config)?, config)?;
                    rest = rest.checked_mul(&Monomial::power(atom.clone(), exp.rem_euclid(q)), config)?;
                }
                _ => rest = rest.checked_mul(&Monomial::power(atom.clone(), exp), config)?,
            }
        }
        out = out + factor.mul_monomial(&rest, &Rational::one(), config)?;
        config.check_terms("radical folding", out.term_count())?;
    }
    Ok(out)
}

fn fold_radicals_together(poly: MultiPoly, config: &CheckerConfig) -> Result<RationalFunction> {
    if !has_foldable_radical(&poly) {
        return Ok(RationalFunction::from_poly(poly));
    }

    let mut out = RationalFunction::constant(Rational::zero());
    for (monomial, coeff) in poly.terms() {
        let mut rest = Monomial::one();
        let mut factor = RationalFunction::constant(coeff.clone());
        for (atom, exp) in monomial.factors() {
            match radical_index(atom) {
                Some((base, q)) if exp.abs() >= q => {
                    let base = rational_function(base, config)?;
                    factor = factor.mul(&base.pow(exp.div_euclid(q).into(), config)?, config)?;
                    rest = rest.checked_mul(&Monomial::power(atom.clone(), exp.rem_euclid(q)), config)?;
                }
                _ => rest = rest.checked_mul(&Monomial::power(atom.clone(), exp), config)?,
            }
        }
        let term = RationalFunction::from_poly(MultiPoly::term(rest, Rational::one()));
        out = out.add(&factor.mul(&term, config)?, config)?;
        config.check_terms("radical folding", out.numerator().term_count())?;
    }
    Ok(out)
}

fn rewrite_even_cosines(poly: MultiPoly, config: &CheckerConfig) -> Result<MultiPoly> {
    let needs_rewrite = poly.terms().any(|(monomial, _)| {
        monomial
            .factors()
            .any(|(atom, exp)| exp >= 2 && matches!(atom, Expr::Func(Func::Cos, _)))
    });
    if !needs_rewrite {
        return Ok(poly);
    }

    let mut out = MultiPoly::zero();
    for (monomial, coeff) in poly.terms() {
        let mut rest = Monomial::one();
        let mut factor = MultiPoly::constant(coeff.clone());
        for (atom, exp) in monomial.factors() {
            match atom {
                Expr::Func(Func::Cos, arg) if exp >= 2 => {
                    let sine = Expr::Func(Func::Sin, arg.clone());
                    let identity = MultiPoly::one()
                        - MultiPoly::term(Monomial::power(sine, 2), Rational::one());
                    let power = identity.checked_pow((exp / 2) as u32, config)?;
                    factor = factor.checked_mul(&power, config)?;
                    rest = rest.checked_mul(&Monomial::power(atom.clone(), exp % 2), config)?;
                }
                _ => rest = rest.checked_mul(&Monomial::power(atom.clone(), exp), config)?,
            }
        }
        out = out + factor.mul_monomial(&rest, &Rational::one(), config)?;
        config.check_terms("cosine rewrite", out.term_count())?;
    }
    Ok(out)
}
