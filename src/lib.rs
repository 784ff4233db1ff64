//! Verification of step-by-step algebraic derivations.
//!
//! A derivation is a chain of steps, each an expression, an equation or a
//! disjunction of equations. Every step after the first is checked for exact
//! algebraic equivalence with its predecessor; the result is an annotated
//! report with a verdict per step.

pub mod batch;
pub mod chain;
pub mod checker;
pub mod classify;
pub mod config;
pub mod error;
pub mod expr;
pub mod format;
pub mod parser;
pub mod poly;
pub mod report;
pub mod simplify;

pub use batch::{verify_many, verify_many_with_cancel};
pub use chain::{verify, verify_with, CancelFlag, Chain, Step, VerdictKind};
pub use checker::{
    check_statements, equivalent, verify_step, verify_step_with, Equivalence, Mismatch,
};
pub use classify::{classify, StepKind};
pub use config::CheckerConfig;
pub use error::{CasError, Result, VerifyError};
pub use expr::{
    add, div, mul, neg, one, pow, rational, sub, zero, Equation, Expr, Func, Rational, Statement,
};
pub use format::{latex, pretty};
pub use parser::{parse_equation, parse_expr, parse_statement};
pub use report::{
    verify_json, verify_record, verify_records, AnnotatedStep, ChainRecord, StepRecord,
    VerificationReport, VerificationVerdict,
};
pub use simplify::{canonical, expand, is_expanded, is_identically_zero, substitute};
