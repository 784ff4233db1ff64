//! Sparse multivariate Laurent polynomials over atoms.
//!
//! An atom is any expression the algebra layer treats as an indeterminate:
//! a variable, or a non-polynomial subterm such as `sin(2*x + 1)` or
//! `x^(1/2)` whose inner arguments are already in canonical form.

use std::cmp::Reverse;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::CheckerConfig;
use crate::error::Result;
use crate::expr::{Expr, Rational};
use num_traits::{One, Signed, Zero};

/// Product of atoms raised to non-zero integer exponents.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(BTreeMap<Expr, i32>);

impl Monomial {
    pub fn one() -> Self {
        Monomial(BTreeMap::new())
    }

    pub fn atom(atom: Expr) -> Self {
        Monomial::power(atom, 1)
    }

    pub fn power(atom: Expr, exp: i32) -> Self {
        let mut factors = BTreeMap::new();
        if exp != 0 {
            factors.insert(atom, exp);
        }
        Monomial(factors)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree(&self) -> i64 {
        self.0.values().map(|exp| i64::from(*exp)).sum()
    }

    pub fn exponent(&self, atom: &Expr) -> i32 {
        self.0.get(atom).copied().unwrap_or(0)
    }

    pub fn factors(&self) -> impl Iterator<Item = (&Expr, i32)> + '_ {
        self.0.iter().map(|(atom, exp)| (atom, *exp))
    }

    pub fn has_negative_exponent(&self) -> bool {
        self.0.values().any(|exp| *exp < 0)
    }

    /// Product of two monomials. Fails when an atom's exponent would leave
    /// the configured degree range.
    pub fn checked_mul(&self, other: &Monomial, config: &CheckerConfig) -> Result<Monomial> {
        let mut factors = self.0.clone();
        for (atom, exp) in &other.0 {
            match factors.entry(atom.clone()) {
                Entry::Vacant(entry) => {
                    entry.insert(config.check_degree(i64::from(*exp))?);
                }
                Entry::Occupied(mut entry) => {
                    let updated = config.check_degree(i64::from(*entry.get()) + i64::from(*exp))?;
                    if updated == 0 {
                        entry.remove();
                    } else {
                        *entry.get_mut() = updated;
                    }
                }
            }
        }
        Ok(Monomial(factors))
    }

    /// `self^exp`, with the same degree bound as [`Monomial::checked_mul`].
    pub fn checked_pow(&self, exp: u32, config: &CheckerConfig) -> Result<Monomial> {
        self.0
            .iter()
            .map(|(atom, e)| {
                let degree = config.check_degree(i64::from(*e) * i64::from(exp))?;
                Ok((atom.clone(), degree))
            })
            .filter(|factor| !matches!(factor, Ok((_, 0))))
            .collect::<Result<BTreeMap<_, _>>>()
            .map(Monomial)
    }

    /// Exact quotient by a monomial that divides this one with positive
    /// exponents, as returned by [`Monomial::gcd`].
    pub fn quotient(&self, divisor: &Monomial) -> Monomial {
        let mut factors = self.0.clone();
        for (atom, exp) in &divisor.0 {
            if let Entry::Occupied(mut entry) = factors.entry(atom.clone()) {
                let remaining = *entry.get() - exp;
                if remaining == 0 {
                    entry.remove();
                } else {
                    *entry.get_mut() = remaining;
                }
            }
        }
        Monomial(factors)
    }

    pub fn inverse(&self) -> Monomial {
        Monomial(self.0.iter().map(|(atom, exp)| (atom.clone(), -exp)).collect())
    }

    /// Largest monomial with positive exponents dividing both.
    pub fn gcd(&self, other: &Monomial) -> Monomial {
        Monomial(
            self.0
                .iter()
                .filter_map(|(atom, exp)| {
                    let shared = (*exp).min(other.exponent(atom));
                    (shared > 0).then(|| (atom.clone(), shared))
                })
                .collect(),
        )
    }

    /// The same monomial with `atom` removed.
    pub fn without(&self, atom: &Expr) -> Monomial {
        let mut factors = self.0.clone();
        factors.remove(atom);
        Monomial(factors)
    }

    pub fn to_expr(&self) -> Expr {
        self.0
            .iter()
            .map(|(atom, exp)| render_power(atom, *exp))
            .reduce(|acc, factor| Expr::Mul(acc.boxed(), factor.boxed()))
            .unwrap_or_else(|| Expr::Constant(Rational::one()))
    }
}

// Radical atoms are stored as `base^(1/q)` and rendered with the merged exponent.
fn render_power(atom: &Expr, exp: i32) -> Expr {
    if let Expr::Pow(base, inner) = atom {
        if let Expr::Constant(r) = &**inner {
            let merged = r * Rational::from_integer(exp.into());
            return if merged.is_one() {
                (**base).clone()
            } else {
                Expr::Pow(base.clone(), Expr::Constant(merged).boxed())
            };
        }
    }
    if exp == 1 {
        atom.clone()
    } else {
        Expr::Pow(atom.clone().boxed(), Expr::integer(exp).boxed())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MultiPoly {
    terms: BTreeMap<Monomial, Rational>,
}

impl MultiPoly {
    pub fn zero() -> Self {
        MultiPoly {
            terms: BTreeMap::new(),
        }
    }

    pub fn one() -> Self {
        MultiPoly::constant(Rational::one())
    }

    pub fn constant(c: Rational) -> Self {
        MultiPoly::term(Monomial::one(), c)
    }

    pub fn atom(atom: Expr) -> Self {
        MultiPoly::term(Monomial::atom(atom), Rational::one())
    }

    pub fn term(monomial: Monomial, coeff: Rational) -> Self {
        let mut terms = BTreeMap::new();
        if !coeff.is_zero() {
            terms.insert(monomial, coeff);
        }
        MultiPoly { terms }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Rational)> + '_ {
        self.terms.iter()
    }

    /// The value of a polynomial with no atoms.
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::zero()),
            1 => self.terms.get(&Monomial::one()).cloned(),
            _ => None,
        }
    }

    pub fn single_term(&self) -> Option<(&Monomial, &Rational)> {
        if self.terms.len() == 1 {
            self.terms.iter().next()
        } else {
            None
        }
    }

    /// Highest-degree term, ties broken by monomial order. Its sign fixes the
    /// canonical orientation of the polynomial.
    pub fn leading_term(&self) -> Option<(&Monomial, &Rational)> {
        self.terms
            .iter()
            .max_by(|(a, _), (b, _)| a.degree().cmp(&b.degree()).then_with(|| a.cmp(b)))
    }

    pub fn leading_coeff(&self) -> Rational {
        self.leading_term()
            .map(|(_, c)| c.clone())
            .unwrap_or_else(Rational::zero)
    }

    pub fn atoms(&self) -> BTreeSet<Expr> {
        self.terms
            .keys()
            .flat_map(|m| m.factors().map(|(atom, _)| atom.clone()))
            .collect()
    }

    pub fn has_negative_exponent(&self) -> bool {
        self.terms.keys().any(Monomial::has_negative_exponent)
    }

    /// Monomial dividing every term. `None` for the zero polynomial.
    pub fn monomial_content(&self) -> Option<Monomial> {
        self.terms.keys().cloned().reduce(|acc, m| acc.gcd(&m))
    }

    pub fn scale(&self, k: &Rational) -> Self {
        if k.is_zero() {
            return MultiPoly::zero();
        }
        MultiPoly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * k))
                .collect(),
        }
    }

    pub fn mul_monomial(
        &self,
        monomial: &Monomial,
        coeff: &Rational,
        config: &CheckerConfig,
    ) -> Result<Self> {
        if coeff.is_zero() {
            return Ok(MultiPoly::zero());
        }
        config.check_coefficient(coeff, 1)?;
        let mut out = MultiPoly::zero();
        for (m, c) in &self.terms {
            out.add_term(m.checked_mul(monomial, config)?, c * coeff);
        }
        Ok(out)
    }

    /// Divides every term by a common monomial factor.
    pub fn divide_monomial(&self, divisor: &Monomial) -> Self {
        MultiPoly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.quotient(divisor), c.clone()))
                .collect(),
        }
    }

    pub fn checked_mul(&self, other: &Self, config: &CheckerConfig) -> Result<Self> {
        config.check_terms(
            "polynomial product",
            self.terms.len().saturating_mul(other.terms.len()),
        )?;
        config.check_bits(self.coefficient_bits() + other.coefficient_bits())?;
        let mut out = MultiPoly::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                out.add_term(ma.checked_mul(mb, config)?, ca * cb);
            }
        }
        config.check_terms("polynomial product", out.terms.len())?;
        Ok(out)
    }

    pub fn checked_pow(&self, exp: u32, config: &CheckerConfig) -> Result<Self> {
        config.check_exponent(exp)?;
        if exp == 0 {
            return Ok(MultiPoly::one());
        }
        if let Some((m, c)) = self.single_term() {
            config.check_coefficient(c, u64::from(exp))?;
            return Ok(MultiPoly::term(
                m.checked_pow(exp, config)?,
                num_traits::pow(c.clone(), exp as usize),
            ));
        }
        let mut result = MultiPoly::one();
        let mut base = self.clone();
        let mut n = exp;
        while n > 0 {
            if n % 2 == 1 {
                result = result.checked_mul(&base, config)?;
            }
            n /= 2;
            if n > 0 {
                base = base.checked_mul(&base, config)?;
            }
        }
        Ok(result)
    }

    /// Widest numerator plus denominator bit length over all coefficients.
    pub fn coefficient_bits(&self) -> u64 {
        self.terms
            .values()
            .map(|c| c.numer().bits() + c.denom().bits())
            .max()
            .unwrap_or(0)
    }

    fn add_term(&mut self, monomial: Monomial, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(entry) => {
                entry.insert(coeff);
            }
            Entry::Occupied(mut entry) => {
                let updated = entry.get() + coeff;
                if updated.is_zero() {
                    entry.remove();
                } else {
                    *entry.get_mut() = updated;
                }
            }
        }
    }

    /// Renders the polynomial with higher-degree terms first and the constant last.
    pub fn to_expr(&self) -> Expr {
        let mut items: Vec<(&Monomial, &Rational)> = self.terms.iter().collect();
        items.sort_by_key(|(m, _)| (m.is_one(), Reverse(m.degree()), *m));

        let mut iter = items.into_iter();
        let first = match iter.next() {
            Some((m, c)) => term_expr(m, c),
            None => return Expr::Constant(Rational::zero()),
        };
        iter.fold(first, |acc, (m, c)| {
            if c.is_negative() {
                Expr::Sub(acc.boxed(), term_expr(m, &-c).boxed())
            } else {
                Expr::Add(acc.boxed(), term_expr(m, c).boxed())
            }
        })
    }
}

fn term_expr(monomial: &Monomial, coeff: &Rational) -> Expr {
    if monomial.is_one() {
        return Expr::Constant(coeff.clone());
    }
    let base = monomial.to_expr();
    if coeff.is_one() {
        base
    } else if *coeff == -Rational::one() {
        Expr::Neg(base.boxed())
    } else {
        Expr::Mul(Expr::Constant(coeff.clone()).boxed(), base.boxed())
    }
}

impl std::ops::Add for MultiPoly {
    type Output = MultiPoly;
    fn add(self, rhs: MultiPoly) -> MultiPoly {
        let mut out = self;
        for (m, c) in rhs.terms {
            out.add_term(m, c);
        }
        out
    }
}

impl std::ops::Sub for MultiPoly {
    type Output = MultiPoly;
    fn sub(self, rhs: MultiPoly) -> MultiPoly {
        let mut out = self;
        for (m, c) in rhs.terms {
            out.add_term(m, -c);
        }
        out
    }
}

impl std::ops::Neg for MultiPoly {
    type Output = MultiPoly;
    fn neg(self) -> MultiPoly {
        MultiPoly {
            terms: self.terms.into_iter().map(|(m, c)| (m, -c)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> MultiPoly {
        MultiPoly::atom(Expr::var("x"))
    }

    #[test]
    fn like_terms_cancel() {
        let p = x() + MultiPoly::constant(Rational::one());
        let q = p.clone() - p;
        assert!(q.is_zero());
    }

    #[test]
    fn laurent_monomials_cancel() {
        let config = CheckerConfig::default();
        let m = Monomial::atom(Expr::var("x"));
        assert!(m.checked_mul(&m.inverse(), &config).unwrap().is_one());
    }

    #[test]
    fn exponents_stay_within_degree_limit() {
        let config = CheckerConfig::default();
        let m = Monomial::power(Expr::var("x"), 1024);
        assert!(m.checked_mul(&Monomial::atom(Expr::var("x")), &config).is_err());
        assert!(m.checked_pow(2, &config).is_err());
        let huge = Monomial::power(Expr::var("x"), i32::MAX);
        assert!(huge.checked_mul(&huge, &config).is_err());
    }

    #[test]
    fn products_of_wide_coefficients_are_rejected() {
        let config = CheckerConfig {
            max_coefficient_bits: 64,
            ..CheckerConfig::default()
        };
        let wide = MultiPoly::constant(Rational::from_integer(num_bigint::BigInt::from(1u8) << 100usize));
        assert!(wide.checked_mul(&x(), &config).is_err());
        assert!((x() + MultiPoly::constant(Rational::from_integer(1000.into())))
            .checked_pow(16, &config)
            .is_err());
    }

    #[test]
    fn square_of_binomial() {
        let config = CheckerConfig::default();
        let p = x() + MultiPoly::one();
        let sq = p.checked_pow(2, &config).unwrap();
        assert_eq!(sq.term_count(), 3);
        assert_eq!(sq.leading_coeff(), Rational::one());
    }

    #[test]
    fn product_respects_term_limit() {
        let config = CheckerConfig {
            max_terms: 2,
            ..CheckerConfig::default()
        };
        let p = x() + MultiPoly::one();
        assert!(p.checked_pow(3, &config).is_err());
    }
}
