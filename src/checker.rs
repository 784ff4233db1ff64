//! Pairwise equivalence of consecutive steps.

use std::fmt;

use tracing::warn;

use crate::config::CheckerConfig;
use crate::error::{CasError, Result};
use crate::expr::{sub, Equation, Expr, Statement};
use crate::parser::parse_statement;
use crate::poly::MultiPoly;
use crate::simplify;

/// Why two statements were found not to be equivalent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mismatch {
    /// The statements have different shapes (expression, equation, branch).
    Shape {
        previous: &'static str,
        current: &'static str,
    },
    /// The difference of the two equations' zero forms, in canonical form.
    NonZeroDifference(Expr),
    /// The previous expression is not the expansion of the current one.
    ExpansionDiffers { expected: Expr, expanded: Expr },
    /// One of the two steps could not be parsed.
    ParseError { step: usize, message: String },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::Shape { .. } => write!(f, "shape mismatch"),
            Mismatch::NonZeroDifference(residual) => {
                write!(f, "difference does not reduce to zero: {residual}")
            }
            Mismatch::ExpansionDiffers { .. } => {
                write!(f, "expansion of step does not match previous expression")
            }
            Mismatch::ParseError { step, message } => {
                write!(f, "parse error in step {step}: {message}")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Equivalence {
    Equivalent,
    NotEquivalent(Mismatch),
    /// The backend gave up: a limit was hit, an operation is unsupported, or
    /// a non-zero residual still contains function atoms.
    Undecided(String),
}

impl Equivalence {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, Equivalence::Equivalent)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            Equivalence::Equivalent => None,
            Equivalence::NotEquivalent(mismatch) => Some(mismatch.to_string()),
            Equivalence::Undecided(reason) => Some(format!("undecided: {reason}")),
        }
    }
}

/// Decides whether `current` follows from `previous` by algebraic equivalence.
///
/// Equations are compared through their zero forms and the test is symmetric.
/// Expressions are compared directionally: `previous` has to be written in
/// expanded form and equal the expansion of `current`.
pub fn equivalent(previous: &Statement, current: &Statement, config: &CheckerConfig) -> Equivalence {
    // The canonical forms recurse over the tree.
    if let Err(err) = config.check_depth(previous.depth().max(current.depth())) {
        return Equivalence::Undecided(err.to_string());
    }
    match (previous, current) {
        (Statement::Equation(prev), Statement::Equation(curr)) => equations(prev, curr, config),
        (Statement::Expression(prev), Statement::Expression(curr)) => {
            expansion(prev, curr, config)
        }
        _ => Equivalence::NotEquivalent(Mismatch::Shape {
            previous: previous.shape(),
            current: current.shape(),
        }),
    }
}

/// [`equivalent`] over parse results, turning a parse failure into a verdict.
/// `indices` name the two steps in the message.
pub fn check_statements(
    previous: std::result::Result<&Statement, &CasError>,
    current: std::result::Result<&Statement, &CasError>,
    indices: (usize, usize),
    config: &CheckerConfig,
) -> Equivalence {
    match (previous, current) {
        (Ok(prev), Ok(curr)) => equivalent(prev, curr, config),
        (Err(err), _) => Equivalence::NotEquivalent(parse_failure(indices.0, err)),
        (_, Err(err)) => Equivalence::NotEquivalent(parse_failure(indices.1, err)),
    }
}

fn parse_failure(index: usize, err: &CasError) -> Mismatch {
    let message = match err {
        CasError::Parse(message) => message.clone(),
        other => other.to_string(),
    };
    Mismatch::ParseError {
        step: index,
        message,
    }
}

/// Checks a single pair of raw step texts with the default limits.
pub fn verify_step(previous: &str, current: &str) -> bool {
    verify_step_with(previous, current, &CheckerConfig::default())
}

pub fn verify_step_with(previous: &str, current: &str, config: &CheckerConfig) -> bool {
    let (prev, curr) = match parse_pair(previous, current) {
        Ok(pair) => pair,
        Err(err) => {
            warn!(target: "stepcheck::checker", previous, current, error = %err, "could not parse step");
            return false;
        }
    };
    let verdict = equivalent(&prev, &curr, config);
    if let Equivalence::Undecided(reason) = &verdict {
        warn!(target: "stepcheck::checker", previous, current, %reason, "could not decide step");
    }
    verdict.is_equivalent()
}

fn parse_pair(previous: &str, current: &str) -> Result<(Statement, Statement)> {
    Ok((parse_statement(previous)?, parse_statement(current)?))
}

fn equations(prev: &Equation, curr: &Equation, config: &CheckerConfig) -> Equivalence {
    let difference = sub(prev.zero_form(), curr.zero_form());
    let residual = match simplify::rational_function(&difference, config) {
        Ok(rf) => rf,
        Err(err) => return Equivalence::Undecided(err.to_string()),
    };
    if residual.is_zero() {
        return Equivalence::Equivalent;
    }
    let residual = residual.to_expr();
    if simplify::has_transcendental_atoms(&residual) {
        Equivalence::Undecided(format!("could not reduce {residual} to zero"))
    } else {
        Equivalence::NotEquivalent(Mismatch::NonZeroDifference(residual))
    }
}

fn expansion(prev: &Expr, curr: &Expr, config: &CheckerConfig) -> Equivalence {
    let expanded = match simplify::expand_poly(curr, config) {
        Ok(poly) => poly,
        Err(err) => return Equivalence::Undecided(err.to_string()),
    };
    let differs = |expanded: &MultiPoly| {
        Equivalence::NotEquivalent(Mismatch::ExpansionDiffers {
            expected: prev.clone(),
            expanded: expanded.to_expr(),
        })
    };
    if !simplify::is_expanded(prev) {
        return differs(&expanded);
    }
    match simplify::expand_poly(prev, config) {
        Ok(poly) if poly == expanded => Equivalence::Equivalent,
        Ok(_) => differs(&expanded),
        Err(err) => Equivalence::Undecided(err.to_string()),
    }
}
