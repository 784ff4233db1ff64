use crate::config::CheckerConfig;
use crate::error::{CasError, Result};
use crate::expr::{Expr, Rational};
use crate::poly::multi::MultiPoly;
use crate::poly::univariate::Poly;
use num_traits::{One, Signed};

/// Quotient of two polynomials over atoms. The denominator is never zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RationalFunction {
    num: MultiPoly,
    den: MultiPoly,
}

impl RationalFunction {
    pub fn new(num: MultiPoly, den: MultiPoly) -> Result<Self> {
        if den.is_zero() {
            return Err(CasError::Unsupported("division by zero".to_string()));
        }
        Ok(RationalFunction { num, den }.fold_constant_denominator())
    }

    pub fn from_poly(num: MultiPoly) -> Self {
        RationalFunction {
            num,
            den: MultiPoly::one(),
        }
    }

    pub fn constant(c: Rational) -> Self {
        RationalFunction::from_poly(MultiPoly::constant(c))
    }

    pub fn numerator(&self) -> &MultiPoly {
        &self.num
    }

    pub fn denominator(&self) -> &MultiPoly {
        &self.den
    }

    pub fn into_parts(self) -> (MultiPoly, MultiPoly) {
        (self.num, self.den)
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn as_constant(&self) -> Option<Rational> {
        let num = self.num.as_constant()?;
        let den = self.den.as_constant()?;
        Some(num / den)
    }

    pub fn neg(self) -> Self {
        RationalFunction {
            num: -self.num,
            den: self.den,
        }
    }

    pub fn add(&self, other: &Self, config: &CheckerConfig) -> Result<Self> {
        if self.den == other.den {
            return Ok(RationalFunction {
                num: self.num.clone() + other.num.clone(),
                den: self.den.clone(),
            });
        }
        let num = self.num.checked_mul(&other.den, config)?
            + other.num.checked_mul(&self.den, config)?;
        let den = self.den.checked_mul(&other.den, config)?;
        RationalFunction::new(num, den)
    }

    pub fn sub(&self, other: &Self, config: &CheckerConfig) -> Result<Self> {
        self.add(&other.clone().neg(), config)
    }

    pub fn mul(&self, other: &Self, config: &CheckerConfig) -> Result<Self> {
        RationalFunction::new(
            self.num.checked_mul(&other.num, config)?,
            self.den.checked_mul(&other.den, config)?,
        )
    }

    pub fn div(&self, other: &Self, config: &CheckerConfig) -> Result<Self> {
        self.mul(&other.recip()?, config)
    }

    pub fn recip(&self) -> Result<Self> {
        RationalFunction::new(self.den.clone(), self.num.clone())
    }

    pub fn pow(&self, exp: i64, config: &CheckerConfig) -> Result<Self> {
        let magnitude = u32::try_from(exp.unsigned_abs()).map_err(|_| CasError::LimitExceeded {
            what: "exponent",
            limit: config.max_exponent as usize,
        })?;
        let base = if exp < 0 { self.recip()? } else { self.clone() };
        RationalFunction::new(
            base.num.checked_pow(magnitude, config)?,
            base.den.checked_pow(magnitude, config)?,
        )
    }

    /// Flips the sign so the numerator's leading coefficient is positive.
    /// Returns whether a flip happened.
    pub fn sign_normalized(self) -> (Self, bool) {
        if self.num.leading_coeff().is_negative() {
            (self.neg(), true)
        } else {
            (self, false)
        }
    }

    /// Divides out the common monomial factor and makes the denominator's
    /// leading coefficient one. When both sides are polynomials in the same
    /// single atom their gcd is cancelled as well.
    pub fn normalized(self) -> Self {
        let (mut num, mut den) = (self.num, self.den);

        if let (Some(a), Some(b)) = (num.monomial_content(), den.monomial_content()) {
            let common = a.gcd(&b);
            if !common.is_one() {
                num = num.divide_monomial(&common);
                den = den.divide_monomial(&common);
            }
        }

        let scale = den.leading_coeff().recip();
        num = num.scale(&scale);
        den = den.scale(&scale);

        let atoms: Vec<Expr> = num.atoms().union(&den.atoms()).cloned().collect();
        if let [atom] = atoms.as_slice() {
            if let (Some(n), Some(d)) = (Poly::from_multi(&num, atom), Poly::from_multi(&den, atom)) {
                let g = Poly::gcd(&n, &d);
                if !g.is_one() && !g.is_zero() {
                    if let (Some(n), Some(d)) = (n.div_exact(&g), d.div_exact(&g)) {
                        let scale = d.leading_coeff().recip();
                        num = n.scale(&scale).to_multi(atom);
                        den = d.scale(&scale).to_multi(atom);
                    }
                }
            }
        }
        RationalFunction { num, den }.fold_constant_denominator()
    }

    pub fn to_expr(&self) -> Expr {
        let normal = self.clone().normalized();
        if normal.den == MultiPoly::one() {
            normal.num.to_expr()
        } else {
            Expr::Div(normal.num.to_expr().boxed(), normal.den.to_expr().boxed())
        }
    }

    fn fold_constant_denominator(self) -> Self {
        match self.den.as_constant() {
            Some(c) if !c.is_one() => RationalFunction {
                num: self.num.scale(&c.recip()),
                den: MultiPoly::one(),
            },
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poly::multi::Monomial;

    fn x() -> MultiPoly {
        MultiPoly::atom(Expr::var("x"))
    }

    fn int(n: i64) -> MultiPoly {
        MultiPoly::constant(Rational::from_integer(n.into()))
    }

    #[test]
    fn cancels_common_univariate_factor() {
        let config = CheckerConfig::default();
        // (x^2 - 1) / (x - 1) = x + 1
        let x2 = MultiPoly::term(Monomial::power(Expr::var("x"), 2), Rational::one());
        let rf = RationalFunction::new(x2 - int(1), x() - int(1)).unwrap();
        let expected = RationalFunction::from_poly(x() + int(1));
        assert_eq!(rf.clone().normalized(), expected);
        assert!(rf.sub(&expected, &config).unwrap().is_zero());
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert!(RationalFunction::new(x(), MultiPoly::zero()).is_err());
    }
}
