use crate::error::{CasError, Result};
use crate::expr::{Equation, Expr, Func, Rational, Statement};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace0};
use nom::combinator::{all_consuming, map, not, opt, recognize, verify};
use nom::error::{VerboseError, VerboseErrorKind};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;
use num_bigint::BigInt;
use num_traits::Num;

type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

const DISJUNCTION: &str = "or";
/// Deepest nesting of parentheses, signs and exponents the grammar follows.
const MAX_NESTING: usize = 64;
/// Tallest expression tree a statement may produce.
const MAX_DEPTH: usize = 256;
const TOO_DEEP: &str = "expression nested too deeply";

/// Parses a bare expression. `=` and `or` are rejected here.
pub fn parse_expr(input: &str) -> Result<Expr> {
    match all_consuming(ws(|i| parse_add_sub(i, 0)))(input) {
        Ok((_, expr)) => check_height(input, expr.depth()).map(|_| expr),
        Err(e) => Err(describe(input, e)),
    }
}

/// Parses the text of one derivation step into an expression, an equation or
/// a disjunction of equations.
pub fn parse_statement(input: &str) -> Result<Statement> {
    let (_, mut alternatives) =
        all_consuming(separated_list1(disjunction, parse_alternative))(input)
            .map_err(|e| describe(input, e))?;
    for (lhs, rhs) in &alternatives {
        check_height(input, lhs.depth().max(rhs.as_ref().map_or(0, Expr::depth)))?;
    }

    if alternatives.len() == 1 {
        return Ok(match alternatives.remove(0) {
            (lhs, Some(rhs)) => Statement::Equation(Equation::new(lhs, rhs)),
            (expr, None) => Statement::Expression(expr),
        });
    }

    alternatives
        .into_iter()
        .map(|(lhs, rhs)| match rhs {
            Some(rhs) => Ok(Equation::new(lhs, rhs)),
            None => Err(CasError::Parse(format!(
                "alternative `{lhs}` in a disjunction must be an equation"
            ))),
        })
        .collect::<Result<Vec<_>>>()
        .map(Statement::Branch)
}

/// Parses `lhs = rhs` into an equation.
pub fn parse_equation(input: &str) -> Result<Equation> {
    match parse_statement(input)? {
        Statement::Equation(eq) => Ok(eq),
        other => Err(CasError::Parse(format!(
            "expected an equation, found {}",
            other.shape()
        ))),
    }
}

fn parse_alternative(input: &str) -> PResult<'_, (Expr, Option<Expr>)> {
    pair(
        ws(|i| parse_add_sub(i, 0)),
        opt(preceded(char('='), ws(|i| parse_add_sub(i, 0)))),
    )(input)
}

fn disjunction(input: &str) -> PResult<'_, &str> {
    ws(terminated(tag(DISJUNCTION), not(alphanumeric1)))(input)
}

fn parse_add_sub(input: &str, nesting: usize) -> PResult<'_, Expr> {
    left_assoc(
        input,
        ws(alt((char('+'), char('-')))),
        |i| parse_mul_div(i, nesting),
        |op, acc, rhs| match op {
            '+' => Expr::Add(acc.boxed(), rhs.boxed()),
            _ => Expr::Sub(acc.boxed(), rhs.boxed()),
        },
    )
}

fn parse_mul_div(input: &str, nesting: usize) -> PResult<'_, Expr> {
    left_assoc(
        input,
        ws(alt((terminated(char('*'), not(char('*'))), char('/')))),
        |i| parse_unary(i, nesting),
        |op, acc, rhs| match op {
            '*' => Expr::Mul(acc.boxed(), rhs.boxed()),
            _ => Expr::Div(acc.boxed(), rhs.boxed()),
        },
    )
}

// Left-associative `operand (operator operand)*`. Every operator adds a level
// on top of the accumulated tree, so the height is checked as it grows.
fn left_assoc<'a, O, P>(
    input: &'a str,
    mut operator: O,
    mut operand: P,
    build: fn(char, Expr, Expr) -> Expr,
) -> PResult<'a, Expr>
where
    O: FnMut(&'a str) -> PResult<'a, char>,
    P: FnMut(&'a str) -> PResult<'a, Expr>,
{
    let (mut rest, mut acc) = operand(input)?;
    let mut height = acc.depth();
    loop {
        let (after_op, op) = match operator(rest) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(_)) => return Ok((rest, acc)),
            Err(e) => return Err(e),
        };
        let (after, rhs) = match operand(after_op) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(_)) => return Ok((rest, acc)),
            Err(e) => return Err(e),
        };
        height = 1 + height.max(rhs.depth());
        if height > MAX_DEPTH {
            return Err(nom::Err::Failure(context_error(rest, TOO_DEEP)));
        }
        acc = build(op, acc, rhs);
        rest = after;
    }
}

// Every recursive rule goes through here: parentheses, function arguments,
// signs and exponents.
fn parse_unary(input: &str, nesting: usize) -> PResult<'_, Expr> {
    if nesting >= MAX_NESTING {
        return Err(nom::Err::Failure(context_error(input, TOO_DEEP)));
    }
    let nesting = nesting + 1;

    // Unary minus binds looser than `^`, so `-x^2` is `-(x^2)`.
    if let Ok((rest, _)) = ws(char::<&str, VerboseError<&str>>('-'))(input) {
        let (rest, expr) = parse_unary(rest, nesting)?;
        Ok((rest, Expr::Neg(expr.boxed())))
    } else if let Ok((rest, _)) = ws(char::<&str, VerboseError<&str>>('+'))(input) {
        parse_unary(rest, nesting)
    } else {
        parse_pow(input, nesting)
    }
}

// `**` and `^` are the same operator. Right-associative.
fn parse_pow(input: &str, nesting: usize) -> PResult<'_, Expr> {
    let (rest, base) = parse_primary(input, nesting)?;
    match preceded(ws(alt((tag("**"), tag("^")))), |i| parse_unary(i, nesting))(rest) {
        Ok((next, exp)) => Ok((next, Expr::Pow(base.boxed(), exp.boxed()))),
        Err(nom::Err::Error(_)) => Ok((rest, base)),
        Err(e) => Err(e),
    }
}

fn parse_primary(input: &str, nesting: usize) -> PResult<'_, Expr> {
    alt((
        |i| parse_parens(i, nesting),
        parse_number,
        |i| parse_call_or_symbol(i, nesting),
    ))(input)
}

fn parse_parens(input: &str, nesting: usize) -> PResult<'_, Expr> {
    delimited(
        ws(char('(')),
        |i| parse_add_sub(i, nesting),
        ws(char(')')),
    )(input)
}

fn parse_number(input: &str) -> PResult<'_, Expr> {
    map(
        ws(recognize(pair(digit1, opt(pair(char('.'), digit1))))),
        |s: &str| Expr::Constant(decimal_to_rational(s)),
    )(input)
}

fn parse_call_or_symbol(input: &str, nesting: usize) -> PResult<'_, Expr> {
    let (rest, name) = ws(identifier)(input)?;

    match parse_parens(rest, nesting) {
        Ok((after, arg)) => {
            if name == "sqrt" {
                return Ok((after, Expr::Pow(arg.boxed(), Expr::constant(1, 2).boxed())));
            }
            return match Func::from_name(name) {
                Some(func) => Ok((after, Expr::Func(func, arg.boxed()))),
                None => Err(nom::Err::Failure(context_error(input, "unknown function"))),
            };
        }
        Err(e @ nom::Err::Failure(_)) => return Err(e),
        Err(_) => {}
    }

    if name == "sqrt" || Func::from_name(name).is_some() {
        return Err(nom::Err::Failure(context_error(
            input,
            "function name used without an argument",
        )));
    }

    Ok((rest, Expr::Variable(name.to_string())))
}

fn identifier(input: &str) -> PResult<'_, &str> {
    verify(
        recognize(pair(alt((alpha1, tag("_"))), many0(alt((alphanumeric1, tag("_")))))),
        |s: &str| s != DISJUNCTION,
    )(input)
}

// Signs and exponents stack on top of chains, so the whole tree is measured
// once more at the end.
fn check_height(input: &str, height: usize) -> Result<()> {
    if height > MAX_DEPTH {
        return Err(CasError::Parse(format!("{TOO_DEEP} in `{input}`")));
    }
    Ok(())
}

fn decimal_to_rational(text: &str) -> Rational {
    match text.split_once('.') {
        Some((whole, frac)) => {
            let digits = format!("{whole}{frac}");
            let num = BigInt::from_str_radix(&digits, 10).unwrap_or_default();
            let den = num_traits::pow(BigInt::from(10u32), frac.len());
            Rational::new(num, den)
        }
        None => Rational::from_integer(BigInt::from_str_radix(text, 10).unwrap_or_default()),
    }
}

fn context_error<'a>(input: &'a str, ctx: &'static str) -> VerboseError<&'a str> {
    VerboseError {
        errors: vec![(input, VerboseErrorKind::Context(ctx))],
    }
}

fn describe(input: &str, err: nom::Err<VerboseError<&str>>) -> CasError {
    let errors = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => e.errors,
        nom::Err::Incomplete(_) => return CasError::Parse("incomplete input".to_string()),
    };

    let context = errors.iter().find_map(|(_, kind)| match kind {
        VerboseErrorKind::Context(ctx) => Some(*ctx),
        _ => None,
    });
    // The innermost entry points at the furthest position the grammar reached.
    let rest = errors
        .iter()
        .map(|(rest, _)| *rest)
        .min_by_key(|rest| rest.len())
        .unwrap_or(input);
    let offset = input.len() - rest.len();
    let found = rest.trim();

    let location = if found.is_empty() {
        "unexpected end of input".to_string()
    } else {
        let snippet: String = found.chars().take(16).collect();
        format!("unexpected `{snippet}` at offset {offset}")
    };

    match context {
        Some(ctx) => CasError::Parse(format!("{ctx}: {location} in `{input}`")),
        None => CasError::Parse(format!("{location} in `{input}`")),
    }
}

fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> PResult<'a, O>
where
    F: FnMut(&'a str) -> PResult<'a, O>,
{
    delimited(multispace0, inner, multispace0)
}
