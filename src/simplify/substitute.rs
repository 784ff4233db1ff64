use crate::expr::Expr;

/// Substitute variable `var` with `replacement` throughout `expr`.
pub fn substitute(expr: &Expr, var: &str, replacement: &Expr) -> Expr {
    let sub = |e: &Expr| substitute(e, var, replacement).boxed();
    match expr {
        Expr::Variable(name) if name == var => replacement.clone(),
        Expr::Variable(_) | Expr::Constant(_) => expr.clone(),
        Expr::Add(a, b) => Expr::Add(sub(a), sub(b)),
        Expr::Sub(a, b) => Expr::Sub(sub(a), sub(b)),
        Expr::Mul(a, b) => Expr::Mul(sub(a), sub(b)),
        Expr::Div(a, b) => Expr::Div(sub(a), sub(b)),
        Expr::Pow(a, b) => Expr::Pow(sub(a), sub(b)),
        Expr::Neg(a) => Expr::Neg(sub(a)),
        Expr::Func(func, a) => Expr::Func(*func, sub(a)),
    }
}
