use crate::expr::{Equation, Expr, Func, Rational, Statement};
use num_traits::{One, Signed};

/// LaTeX rendering of an expression, for MathJax-style display.
pub fn latex(expr: &Expr) -> String {
    render(expr, 0)
}

pub fn latex_equation(eq: &Equation) -> String {
    format!("{} = {}", latex(&eq.lhs), latex(&eq.rhs))
}

pub fn latex_statement(statement: &Statement) -> String {
    match statement {
        Statement::Expression(expr) => latex(expr),
        Statement::Equation(eq) => latex_equation(eq),
        Statement::Branch(alternatives) => alternatives
            .iter()
            .map(latex_equation)
            .collect::<Vec<_>>()
            .join(" \\quad\\text{or}\\quad "),
    }
}

// Same context levels as the plain-text printer. `\frac` and `{..}^{..}`
// group on their own, so only sums, products and signs need `\left(`.
fn render(expr: &Expr, ctx: u8) -> String {
    match expr {
        Expr::Variable(name) => variable(name),
        Expr::Constant(r) => constant(r, ctx),
        Expr::Add(a, b) => paren(ctx, 1, format!("{} + {}", render(a, 1), render(b, 2))),
        Expr::Sub(a, b) => paren(ctx, 1, format!("{} - {}", render(a, 1), render(b, 2))),
        Expr::Mul(a, b) => paren(ctx, 2, format!("{}\\cdot {}", render(a, 2), render(b, 3))),
        Expr::Div(a, b) => format!("\\frac{{{}}}{{{}}}", render(a, 0), render(b, 0)),
        Expr::Neg(a) => paren(ctx, 2, format!("-{}", render(a, 3))),
        Expr::Pow(base, exp) => power(base, exp),
        Expr::Func(func, arg) => function(*func, arg),
    }
}

fn power(base: &Expr, exp: &Expr) -> String {
    if let Some(r) = exp.as_constant() {
        if r.numer().is_one() && !r.is_integer() {
            let radicand = render(base, 0);
            return if *r.denom() == 2.into() {
                format!("\\sqrt{{{radicand}}}")
            } else {
                format!("\\sqrt[{}]{{{radicand}}}", r.denom())
            };
        }
    }
    format!("{{{}}}^{{{}}}", render(base, 4), render(exp, 0))
}

fn function(func: Func, arg: &Expr) -> String {
    let inner = render(arg, 0);
    match func {
        Func::Exp => format!("e^{{{inner}}}"),
        Func::Abs => format!("\\left|{inner}\\right|"),
        Func::Asin => format!("\\arcsin\\left({inner}\\right)"),
        Func::Acos => format!("\\arccos\\left({inner}\\right)"),
        Func::Atan => format!("\\arctan\\left({inner}\\right)"),
        other => format!("\\{}\\left({inner}\\right)", other.name()),
    }
}

fn variable(name: &str) -> String {
    const GREEK: [&str; 10] = [
        "alpha", "beta", "gamma", "delta", "epsilon", "theta", "lambda", "mu", "phi", "pi",
    ];
    if GREEK.contains(&name) {
        format!("\\{name}")
    } else if name.chars().count() > 1 {
        format!("\\mathrm{{{name}}}")
    } else {
        name.to_string()
    }
}

fn constant(r: &Rational, ctx: u8) -> String {
    if r.is_integer() {
        let body = r.numer().to_string();
        return if r.is_negative() { paren(ctx, 2, body) } else { body };
    }
    let frac = format!("\\frac{{{}}}{{{}}}", r.numer().abs(), r.denom());
    if r.is_negative() {
        paren(ctx, 2, format!("-{frac}"))
    } else {
        frac
    }
}

fn paren(ctx: u8, prec: u8, body: String) -> String {
    if prec < ctx {
        format!("\\left({body}\\right)")
    } else {
        body
    }
}
