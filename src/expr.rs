//! Expression tree, equations and the tagged step payload.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

pub type Rational = BigRational;

/// Elementary functions understood by the parser and the algebra backend.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Abs,
}

impl Func {
    pub const ALL: [Func; 12] = [
        Func::Sin,
        Func::Cos,
        Func::Tan,
        Func::Asin,
        Func::Acos,
        Func::Atan,
        Func::Sinh,
        Func::Cosh,
        Func::Tanh,
        Func::Exp,
        Func::Log,
        Func::Abs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Asin => "asin",
            Func::Acos => "acos",
            Func::Atan => "atan",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Abs => "abs",
        }
    }

    /// Resolves a function name, accepting the usual aliases (`ln`, `arcsin`, ...).
    pub fn from_name(name: &str) -> Option<Func> {
        let func = match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" | "arcsin" => Func::Asin,
            "acos" | "arccos" => Func::Acos,
            "atan" | "arctan" => Func::Atan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "exp" => Func::Exp,
            "log" | "ln" => Func::Log,
            "abs" => Func::Abs,
            _ => return None,
        };
        Some(func)
    }

    /// `f(-u) = -f(u)`.
    pub fn is_odd(self) -> bool {
        matches!(
            self,
            Func::Sin | Func::Tan | Func::Asin | Func::Atan | Func::Sinh | Func::Tanh
        )
    }

    /// `f(-u) = f(u)`.
    pub fn is_even(self) -> bool {
        matches!(self, Func::Cos | Func::Cosh | Func::Abs)
    }
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Expr {
    Variable(String),
    Constant(Rational),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Func(Func, Box<Expr>),
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    pub fn constant(num: impl Into<BigInt>, den: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::new(num.into(), den.into()))
    }

    pub fn integer(value: impl Into<BigInt>) -> Self {
        Expr::Constant(Rational::from_integer(value.into()))
    }

    pub fn rational(value: Rational) -> Self {
        Expr::Constant(value)
    }

    pub fn apply(func: Func, arg: Expr) -> Self {
        Expr::Func(func, arg.boxed())
    }

    pub fn negate(self) -> Self {
        match self {
            Expr::Constant(r) => Expr::Constant(-r),
            Expr::Neg(inner) => *inner,
            other => Expr::Neg(Box::new(other)),
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Constant(r) if r.is_one())
    }

    pub fn as_variable(&self) -> Option<&str> {
        if let Expr::Variable(name) = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn as_constant(&self) -> Option<&Rational> {
        if let Expr::Constant(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// True for `Add`/`Sub` nodes, possibly under negation.
    pub fn is_sum(&self) -> bool {
        match self {
            Expr::Add(_, _) | Expr::Sub(_, _) => true,
            Expr::Neg(inner) => inner.is_sum(),
            _ => false,
        }
    }

    pub fn contains_variables(&self) -> bool {
        match self {
            Expr::Variable(_) => true,
            Expr::Constant(_) => false,
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
                a.contains_variables() || b.contains_variables()
            }
            Expr::Neg(inner) | Expr::Func(_, inner) => inner.contains_variables(),
        }
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => 1,
            Expr::Neg(inner) | Expr::Func(_, inner) => 1 + inner.size(),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) | Expr::Pow(a, b) => {
                1 + a.size() + b.size()
            }
        }
    }

    /// Height of the tree, counting a leaf as one. Walks with an explicit
    /// stack so arbitrarily deep trees can be measured.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1usize)];
        while let Some((expr, level)) = pending.pop() {
            deepest = deepest.max(level);
            match expr {
                Expr::Variable(_) | Expr::Constant(_) => {}
                Expr::Neg(inner) | Expr::Func(_, inner) => pending.push((inner, level + 1)),
                Expr::Add(a, b)
                | Expr::Sub(a, b)
                | Expr::Mul(a, b)
                | Expr::Div(a, b)
                | Expr::Pow(a, b) => {
                    pending.push((a, level + 1));
                    pending.push((b, level + 1));
                }
            }
        }
        deepest
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::format::pretty(self))
    }
}

/// `lhs = rhs`, semantically the single expression `lhs - rhs`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Equation {
    pub lhs: Expr,
    pub rhs: Expr,
}

impl Equation {
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Equation { lhs, rhs }
    }

    /// The canonical zero form `lhs - rhs`.
    pub fn zero_form(&self) -> Expr {
        sub(self.lhs.clone(), self.rhs.clone())
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

/// Payload of a derivation step, decided once when the raw text is parsed.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Statement {
    Expression(Expr),
    Equation(Equation),
    /// Two or more alternative equations joined by `or`.
    Branch(Vec<Equation>),
}

impl Statement {
    /// Depth of the deepest expression in the statement.
    pub fn depth(&self) -> usize {
        match self {
            Statement::Expression(expr) => expr.depth(),
            Statement::Equation(eq) => eq.lhs.depth().max(eq.rhs.depth()),
            Statement::Branch(alternatives) => alternatives
                .iter()
                .map(|eq| eq.lhs.depth().max(eq.rhs.depth()))
                .max()
                .unwrap_or(0),
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Statement::Expression(_) => "expression",
            Statement::Equation(_) => "equation",
            Statement::Branch(_) => "branch",
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Expression(expr) => write!(f, "{expr}"),
            Statement::Equation(eq) => write!(f, "{eq}"),
            Statement::Branch(alternatives) => {
                for (idx, eq) in alternatives.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{eq}")?;
                }
                Ok(())
            }
        }
    }
}

pub fn zero() -> Expr {
    Expr::Constant(Rational::zero())
}

pub fn one() -> Expr {
    Expr::Constant(Rational::one())
}

pub fn rational(num: i64, den: i64) -> Rational {
    Rational::new(num.into(), den.into())
}

pub fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::Pow(base.boxed(), exp.boxed())
}

pub fn add(a: Expr, b: Expr) -> Expr {
    Expr::Add(a.boxed(), b.boxed())
}

pub fn sub(a: Expr, b: Expr) -> Expr {
    Expr::Sub(a.boxed(), b.boxed())
}

pub fn mul(a: Expr, b: Expr) -> Expr {
    Expr::Mul(a.boxed(), b.boxed())
}

pub fn div(a: Expr, b: Expr) -> Expr {
    Expr::Div(a.boxed(), b.boxed())
}

pub fn neg(a: Expr) -> Expr {
    Expr::Neg(a.boxed())
}
