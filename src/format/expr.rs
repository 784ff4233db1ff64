use crate::expr::{Expr, Rational};
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// Plain-text rendering that the parser reads back to an equal tree.
pub fn pretty(expr: &Expr) -> String {
    fn pp(ctx: u8, expr: &Expr) -> String {
        match expr {
            Expr::Variable(v) => v.clone(),
            Expr::Constant(r) => show_rational(ctx, r),

            Expr::Add(a, b) => {
                let s_a = pp(1, a);
                let s_b = pp(2, b);
                bracket(ctx, 1, format!("{s_a} + {s_b}"))
            }

            Expr::Sub(a, b) => {
                let s_a = pp(1, a);
                let s_b = pp(2, b);
                bracket(ctx, 1, format!("{s_a} - {s_b}"))
            }

            Expr::Mul(a, b) => bracket(ctx, 2, format!("{}*{}", pp(2, a), pp(3, b))),

            Expr::Div(a, b) => bracket(ctx, 2, format!("{}/{}", pp(2, a), pp(3, b))),

            Expr::Pow(a, b) => bracket(ctx, 3, format!("{}^{}", pp(4, a), pp(3, b))),

            Expr::Neg(a) => bracket(ctx, 2, format!("-{}", pp(3, a))),

            Expr::Func(func, a) => format!("{}({})", func.name(), pp(0, a)),
        }
    }

    pp(0, expr)
}

// Contexts: 0 top level, 1 left of `+`/`-`, 2 right of `+`/`-` and left of
// `*`/`/`, 3 right of `*`/`/`, under unary minus and exponent, 4 power base.
fn bracket(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("({body})")
    } else {
        body
    }
}

// Terminating fractions print as decimals, which the parser reads back exactly.
fn show_rational(ctx: u8, r: &Rational) -> String {
    if r.is_integer() && !r.is_negative() {
        return format!("{}", r.numer());
    }
    let body = if r.is_integer() {
        format!("{}", r.numer())
    } else {
        decimal(r).unwrap_or_else(|| format!("{}/{}", r.numer(), r.denom()))
    };
    bracket(ctx, 2, body)
}

fn decimal(r: &Rational) -> Option<String> {
    let mut rest = r.denom().clone();
    let (mut twos, mut fives) = (0usize, 0usize);
    while (&rest % 2u32).is_zero() {
        rest /= 2u32;
        twos += 1;
    }
    while (&rest % 5u32).is_zero() {
        rest /= 5u32;
        fives += 1;
    }
    if !rest.is_one() {
        return None;
    }
    let places = twos.max(fives);

    let scaled = r.numer().abs() * num_traits::pow(BigInt::from(10u32), places) / r.denom();
    let digits = format!("{scaled:0>width$}", width = places + 1);
    let (whole, frac) = digits.split_at(digits.len() - places);
    let sign = if r.is_negative() { "-" } else { "" };
    Some(format!("{sign}{whole}.{frac}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{mul, neg, pow, sub};

    #[test]
    fn brackets_follow_precedence() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        assert_eq!(pretty(&sub(x.clone(), sub(y.clone(), x.clone()))), "x - (y - x)");
        assert_eq!(pretty(&pow(neg(x.clone()), Expr::integer(2))), "(-x)^2");
        assert_eq!(pretty(&neg(pow(x.clone(), Expr::integer(2)))), "-x^2");
        assert_eq!(pretty(&mul(Expr::constant(1, 4), x)), "0.25*x");
        assert_eq!(pretty(&Expr::constant(1, 3)), "1/3");
    }
}
