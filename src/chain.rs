//! Linear verification of a derivation chain.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::checker::{check_statements, Equivalence};
use crate::classify::{classify, StepKind};
use crate::config::CheckerConfig;
use crate::error::{CasError, Result, VerifyError};
use crate::expr::Statement;
use crate::parser::parse_statement;
use crate::report::VerificationVerdict;

/// How a verdict was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    /// Accepted without proof: the first step, or a step next to a branch.
    TrustedAxiom,
    /// Proved equivalent to the previous step.
    Checked,
    Rejected,
}

/// One step of a derivation. The reasoning and raw text are never modified;
/// the parsed statement is computed on first use and cached.
#[derive(Clone, Debug)]
pub struct Step {
    index: usize,
    reasoning: String,
    raw: String,
    parsed: OnceLock<Result<Statement>>,
    verdict: Option<VerificationVerdict>,
}

impl Step {
    pub fn new(reasoning: impl Into<String>, raw: impl Into<String>) -> Self {
        Step {
            index: 0,
            reasoning: reasoning.into(),
            raw: raw.into(),
            parsed: OnceLock::new(),
            verdict: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn statement(&self) -> std::result::Result<&Statement, &CasError> {
        self.parsed
            .get_or_init(|| parse_statement(&self.raw))
            .as_ref()
    }

    /// Unparseable steps count as direct so their parse error shows up in
    /// the verdict.
    pub fn kind(&self) -> StepKind {
        self.statement().map(classify).unwrap_or(StepKind::Direct)
    }

    pub fn verdict(&self) -> Option<&VerificationVerdict> {
        self.verdict.as_ref()
    }

    pub fn verified(&self) -> Option<bool> {
        self.verdict.as_ref().map(|v| v.verified)
    }
}

#[derive(Clone, Debug)]
pub struct Chain {
    problem: String,
    topic: Option<String>,
    steps: Vec<Step>,
}

impl Chain {
    pub fn new(
        problem: impl Into<String>,
        topic: Option<String>,
        mut steps: Vec<Step>,
    ) -> std::result::Result<Self, VerifyError> {
        if steps.is_empty() {
            return Err(VerifyError::EmptyChain);
        }
        for (index, step) in steps.iter_mut().enumerate() {
            step.index = index;
        }
        Ok(Chain {
            problem: problem.into(),
            topic,
            steps,
        })
    }

    /// A chain of bare expressions with empty reasoning.
    pub fn from_expressions<I, S>(
        problem: impl Into<String>,
        expressions: I,
    ) -> std::result::Result<Self, VerifyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let steps = expressions.into_iter().map(|raw| Step::new("", raw)).collect();
        Chain::new(problem, None, steps)
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Verdicts recorded so far, in step order.
    pub fn verdicts(&self) -> Vec<VerificationVerdict> {
        self.steps.iter().filter_map(|s| s.verdict.clone()).collect()
    }

    /// `None` while any step is unverified.
    pub fn all_verified(&self) -> Option<bool> {
        self.steps
            .iter()
            .map(Step::verified)
            .try_fold(true, |acc, v| v.map(|v| acc && v))
    }
}

/// Shared cancellation signal, checked before every step.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

pub fn verify(chain: &mut Chain) -> std::result::Result<Vec<VerificationVerdict>, VerifyError> {
    verify_with(chain, &CheckerConfig::default(), None)
}

/// Assigns a verdict to every step in order. Step 0 is trusted; every later
/// step is checked against its predecessor unless either one is a branch.
pub fn verify_with(
    chain: &mut Chain,
    config: &CheckerConfig,
    cancel: Option<&CancelFlag>,
) -> std::result::Result<Vec<VerificationVerdict>, VerifyError> {
    for index in 0..chain.steps.len() {
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            tracing::info!(
                target: "stepcheck::chain",
                completed = index,
                total = chain.steps.len(),
                "verification cancelled"
            );
            return Err(VerifyError::Cancelled { completed: index });
        }

        let verdict = if index == 0 {
            VerificationVerdict::trusted(0)
        } else {
            judge(&chain.steps[index - 1], &chain.steps[index], config)
        };
        tracing::debug!(
            target: "stepcheck::chain",
            step = index,
            kind = ?verdict.kind,
            reason = verdict.reason.as_deref().unwrap_or(""),
            "step verdict"
        );
        chain.steps[index].verdict = Some(verdict);
    }

    let verdicts = chain.verdicts();
    tracing::info!(
        target: "stepcheck::chain",
        steps = verdicts.len(),
        all_verified = verdicts.iter().all(|v| v.verified),
        "chain verified"
    );
    Ok(verdicts)
}

fn judge(prev: &Step, curr: &Step, config: &CheckerConfig) -> VerificationVerdict {
    if prev.kind() == StepKind::Branch || curr.kind() == StepKind::Branch {
        tracing::debug!(
            target: "stepcheck::chain",
            step = curr.index,
            "branch step accepted without derivation"
        );
        return VerificationVerdict::trusted(curr.index);
    }

    match check_statements(prev.statement(), curr.statement(), (prev.index, curr.index), config) {
        Equivalence::Equivalent => VerificationVerdict::checked(curr.index),
        verdict => {
            if let Equivalence::Undecided(reason) = &verdict {
                tracing::warn!(
                    target: "stepcheck::chain",
                    step = curr.index,
                    previous = prev.raw.as_str(),
                    current = curr.raw.as_str(),
                    %reason,
                    "could not decide step"
                );
            }
            let reason = verdict.reason().unwrap_or_default();
            VerificationVerdict::rejected(curr.index, reason)
        }
    }
}
