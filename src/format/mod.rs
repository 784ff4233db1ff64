//! Text renderings of expressions: re-parsable plain text and LaTeX.

pub mod expr;
pub mod latex;

pub use expr::pretty;
pub use latex::{latex, latex_equation, latex_statement};
