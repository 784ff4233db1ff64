//! Construction of atoms: function applications and non-integer powers whose
//! arguments are brought to canonical form first.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::together::rational_function;
use crate::config::CheckerConfig;
use crate::error::{CasError, Result};
use crate::expr::{Expr, Func, Rational};

/// Canonical rendering of an argument, plus the same value with its sign
/// normalized so that the leading coefficient is positive.
pub(crate) struct CanonicalArg {
    pub expr: Expr,
    pub positive: Expr,
    pub negated: bool,
}

pub(crate) fn canonical_argument(arg: &Expr, config: &CheckerConfig) -> Result<CanonicalArg> {
    let rf = rational_function(arg, config)?.normalized();
    let expr = rf.to_expr();
    let (positive, negated) = rf.sign_normalized();
    Ok(CanonicalArg {
        expr,
        positive: positive.to_expr(),
        negated,
    })
}

pub(crate) enum Evaluated {
    Constant(Rational),
    /// The function cancelled against its inverse. The payload is canonical.
    Inner(Expr),
    Atom { atom: Expr, negated: bool },
}

pub(crate) fn apply_function(func: Func, arg: &Expr, config: &CheckerConfig) -> Result<Evaluated> {
    let arg = canonical_argument(arg, config)?;

    if let Some(value) = arg.expr.as_constant().and_then(|c| special_value(func, c)) {
        return Ok(Evaluated::Constant(value));
    }

    match (func, &arg.expr) {
        (Func::Exp, Expr::Func(Func::Log, inner)) | (Func::Log, Expr::Func(Func::Exp, inner)) => {
            return Ok(Evaluated::Inner((**inner).clone()));
        }
        _ => {}
    }

    let (inner, negated) = if func.is_odd() {
        (arg.positive, arg.negated)
    } else if func.is_even() {
        (arg.positive, false)
    } else {
        (arg.expr, false)
    };

    // abs(abs(u)) = abs(u), and exp is positive
    if func == Func::Abs && matches!(inner, Expr::Func(Func::Abs | Func::Exp, _)) {
        return Ok(Evaluated::Atom {
            atom: inner,
            negated: false,
        });
    }

    Ok(Evaluated::Atom {
        atom: Expr::Func(func, inner.boxed()),
        negated,
    })
}

fn special_value(func: Func, c: &Rational) -> Option<Rational> {
    if c.is_zero() {
        return match func {
            Func::Sin | Func::Tan | Func::Asin | Func::Atan | Func::Sinh | Func::Tanh | Func::Abs => {
                Some(Rational::zero())
            }
            Func::Cos | Func::Cosh | Func::Exp => Some(Rational::one()),
            Func::Acos | Func::Log => None,
        };
    }
    match func {
        Func::Abs => Some(c.abs()),
        Func::Log if c.is_one() => Some(Rational::zero()),
        _ => None,
    }
}

/// Validated integer exponent.
pub(crate) fn integer_exponent(r: &Rational, config: &CheckerConfig) -> Result<i64> {
    let limit = CasError::LimitExceeded {
        what: "exponent",
        limit: config.max_exponent as usize,
    };
    let k = r.to_integer().to_i64().ok_or_else(|| limit.clone())?;
    if k.unsigned_abs() > u64::from(config.max_exponent) {
        return Err(limit);
    }
    Ok(k)
}

/// `base^(p/q)` written as `base^whole * root^rem`, where `root = base^(1/q)`
/// and `0 <= rem < q`.
pub(crate) enum Radical {
    Exact(Rational),
    Split { whole: i64, root: Expr, rem: i32 },
}

pub(crate) fn radical(base: &Expr, exponent: &Rational, config: &CheckerConfig) -> Result<Radical> {
    let q = exponent
        .denom()
        .to_u32()
        .filter(|q| *q <= config.max_exponent)
        .ok_or(CasError::LimitExceeded {
            what: "root index",
            limit: config.max_exponent as usize,
        })?;
    let p = exponent.numer();
    let (whole, rem) = p.div_mod_floor(&BigInt::from(q));
    let whole = integer_exponent(&Rational::from_integer(whole), config)?;
    let rem = rem.to_i32().unwrap_or(0);

    let arg = canonical_argument(base, config)?;
    if let Some(root) = arg.expr.as_constant().and_then(|c| exact_root(c, q)) {
        if root.is_zero() {
            return if p.is_negative() {
                Err(CasError::Unsupported("division by zero".to_string()))
            } else {
                Ok(Radical::Exact(Rational::zero()))
            };
        }
        let magnitude = p.magnitude().to_u64().unwrap_or(u64::MAX);
        config.check_coefficient(&root, magnitude)?;
        let value = num_traits::pow(root, magnitude as usize);
        return Ok(Radical::Exact(if p.is_negative() { value.recip() } else { value }));
    }

    Ok(Radical::Split {
        whole,
        root: Expr::Pow(arg.expr.boxed(), Expr::constant(1, q).boxed()),
        rem,
    })
}

/// Atom for a power with a non-constant exponent.
pub(crate) fn power_atom(base: &Expr, exp: &Expr, config: &CheckerConfig) -> Result<Expr> {
    let base = canonical_argument(base, config)?;
    let exp = canonical_argument(exp, config)?;
    Ok(Expr::Pow(base.expr.boxed(), exp.expr.boxed()))
}

fn exact_root(c: &Rational, q: u32) -> Option<Rational> {
    if c.is_negative() {
        return None;
    }
    let root_of = |n: &BigInt| {
        let root = n.nth_root(q);
        (num_traits::pow(root.clone(), q as usize) == *n).then_some(root)
    };
    Some(Rational::new(root_of(c.numer())?, root_of(c.denom())?))
}
