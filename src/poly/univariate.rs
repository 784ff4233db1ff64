//! Dense-by-key univariate polynomials over the rationals in a single atom.
//! Used to cancel common factors of a rational function whose numerator and
//! denominator share exactly one atom.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::expr::{Expr, Rational};
use crate::poly::multi::{Monomial, MultiPoly};
use num_traits::{One, Zero};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: BTreeMap<u32, Rational>,
}

impl Poly {
    pub fn zero() -> Self {
        Poly {
            coeffs: BTreeMap::new(),
        }
    }

    pub fn one() -> Self {
        Poly::from_constant(Rational::one())
    }

    pub fn from_constant(c: Rational) -> Self {
        Poly::monomial(0, c)
    }

    pub fn monomial(exp: u32, c: Rational) -> Self {
        let mut coeffs = BTreeMap::new();
        if !c.is_zero() {
            coeffs.insert(exp, c);
        }
        Poly { coeffs }
    }

    pub fn degree(&self) -> Option<u32> {
        self.coeffs.keys().next_back().copied()
    }

    pub fn leading_coeff(&self) -> Rational {
        self.coeffs
            .values()
            .next_back()
            .cloned()
            .unwrap_or_else(Rational::zero)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs.get(&0).is_some_and(One::is_one)
    }

    pub fn coeff(&self, power: u32) -> Rational {
        self.coeffs.get(&power).cloned().unwrap_or_else(Rational::zero)
    }

    pub fn scale(&self, k: &Rational) -> Self {
        if k.is_zero() {
            return Poly::zero();
        }
        Poly {
            coeffs: self.coeffs.iter().map(|(e, c)| (*e, c * k)).collect(),
        }
    }

    pub fn monic(&self) -> Self {
        let lc = self.leading_coeff();
        if lc.is_zero() {
            return self.clone();
        }
        self.scale(&lc.recip())
    }

    /// Reads a polynomial in `atom` out of `poly`. Fails if any term mentions
    /// another atom or a negative power.
    pub fn from_multi(poly: &MultiPoly, atom: &Expr) -> Option<Self> {
        let mut out = Poly::zero();
        for (monomial, coeff) in poly.terms() {
            let exp = monomial.exponent(atom);
            if exp < 0 || !monomial.without(atom).is_one() {
                return None;
            }
            out.add_term(exp as u32, coeff.clone());
        }
        Some(out)
    }

    pub fn to_multi(&self, atom: &Expr) -> MultiPoly {
        self.coeffs.iter().fold(MultiPoly::zero(), |acc, (exp, c)| {
            acc + MultiPoly::term(Monomial::power(atom.clone(), *exp as i32), c.clone())
        })
    }

    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        let divisor_degree = match divisor.degree() {
            Some(deg) => deg,
            None => return (Poly::zero(), self.clone()),
        };
        let divisor_lc = divisor.leading_coeff();
        let mut remainder = self.clone();
        let mut quotient = Poly::zero();

        while let Some(r_deg) = remainder.degree() {
            if r_deg < divisor_degree {
                break;
            }
            let term = Poly::monomial(
                r_deg - divisor_degree,
                remainder.leading_coeff() / divisor_lc.clone(),
            );
            quotient = quotient + term.clone();
            remainder = remainder - term * divisor.clone();
        }

        (quotient, remainder)
    }

    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let (q, r) = self.div_rem(divisor);
        r.is_zero().then_some(q)
    }

    /// Monic greatest common divisor by the Euclidean algorithm.
    pub fn gcd(a: &Poly, b: &Poly) -> Poly {
        let mut r0 = a.clone();
        let mut r1 = b.clone();
        while !r1.is_zero() {
            let (_, r) = r0.div_rem(&r1);
            r0 = r1;
            r1 = r;
        }
        r0.monic()
    }

    fn add_term(&mut self, exp: u32, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        match self.coeffs.entry(exp) {
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
}

impl std::ops::Add for Poly {
    type Output = Poly;
    fn add(self, rhs: Poly) -> Poly {
        let mut out = self;
        for (exp, coeff) in rhs.coeffs {
            out.add_term(exp, coeff);
        }
        out
    }
}

impl std::ops::Sub for Poly {
    type Output = Poly;
    fn sub(self, rhs: Poly) -> Poly {
        let mut out = self;
        for (exp, coeff) in rhs.coeffs {
            out.add_term(exp, -coeff);
        }
        out
    }
}

impl std::ops::Mul for Poly {
    type Output = Poly;
    fn mul(self, rhs: Poly) -> Poly {
        let mut out = Poly::zero();
        for (exp_a, coeff_a) in &self.coeffs {
            for (exp_b, coeff_b) in &rhs.coeffs {
                out.add_term(exp_a + exp_b, coeff_a * coeff_b);
            }
        }
        out
    }
}

impl std::ops::Neg for Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        Poly {
            coeffs: self.coeffs.into_iter().map(|(e, c)| (e, -c)).collect(),
        }
    }
}
