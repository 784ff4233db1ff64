use serde::{Deserialize, Serialize};

use crate::expr::Statement;

/// How a step relates to its neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// An ordinary expression or equation, checked against the previous step.
    Direct,
    /// A disjunction of alternatives (`x = 1 or x = 2`).
    Branch,
}

pub fn classify(statement: &Statement) -> StepKind {
    match statement {
        Statement::Branch(_) => StepKind::Branch,
        Statement::Expression(_) | Statement::Equation(_) => StepKind::Direct,
    }
}
