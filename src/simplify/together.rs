use num_traits::One;

use super::atoms::{self, Evaluated, Radical};
use super::identities;
use crate::config::CheckerConfig;
use crate::error::Result;
use crate::expr::{Expr, Rational};
use crate::poly::multi::{Monomial, MultiPoly};
use crate::poly::rational::RationalFunction;

/// Brings `expr` over a common denominator.
pub(crate) fn rational_function(expr: &Expr, config: &CheckerConfig) -> Result<RationalFunction> {
    let (num, den) = together(expr, config)?.into_parts();
    identities::reduce_fraction(num, den, config)
}

fn together(expr: &Expr, config: &CheckerConfig) -> Result<RationalFunction> {
    match expr {
        Expr::Variable(_) => Ok(RationalFunction::from_poly(MultiPoly::atom(expr.clone()))),
        Expr::Constant(c) => Ok(RationalFunction::constant(c.clone())),
        Expr::Add(a, b) => together(a, config)?.add(&together(b, config)?, config),
        Expr::Sub(a, b) => together(a, config)?.sub(&together(b, config)?, config),
        Expr::Neg(a) => Ok(together(a, config)?.neg()),
        Expr::Mul(a, b) => together(a, config)?.mul(&together(b, config)?, config),
        Expr::Div(a, b) => together(a, config)?.div(&together(b, config)?, config),
        Expr::Pow(base, exp) => together_pow(base, exp, config),
        Expr::Func(func, arg) => Ok(match atoms::apply_function(*func, arg, config)? {
            Evaluated::Constant(c) => RationalFunction::constant(c),
            Evaluated::Inner(inner) => together(&inner, config)?,
            Evaluated::Atom { atom, negated } => {
                let rf = RationalFunction::from_poly(MultiPoly::atom(atom));
                if negated {
                    rf.neg()
                } else {
                    rf
                }
            }
        }),
    }
}

fn together_pow(base: &Expr, exp: &Expr, config: &CheckerConfig) -> Result<RationalFunction> {
    let exponent = rational_function(exp, config)?;
    match exponent.as_constant() {
        Some(r) if r.is_integer() => {
            let k = atoms::integer_exponent(&r, config)?;
            together(base, config)?.pow(k, config)
        }
        Some(r) => match atoms::radical(base, &r, config)? {
            Radical::Exact(value) => Ok(RationalFunction::constant(value)),
            Radical::Split { whole, root, rem } => {
                let root = RationalFunction::from_poly(MultiPoly::term(
                    Monomial::power(root, rem),
                    Rational::one(),
                ));
                together(base, config)?.pow(whole, config)?.mul(&root, config)
            }
        },
        None => Ok(RationalFunction::from_poly(MultiPoly::atom(
            atoms::power_atom(base, exp, config)?,
        ))),
    }
}
