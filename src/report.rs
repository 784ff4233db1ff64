//! Verdicts, JSON step records and the annotated report handed back to callers.

use serde::{Deserialize, Serialize};

use crate::chain::{verify_with, CancelFlag, Chain, Step, VerdictKind};
use crate::config::CheckerConfig;
use crate::error::VerifyError;
use crate::format::latex_statement;

/// Outcome for one step. Produced once by the chain verifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationVerdict {
    pub step_index: usize,
    pub verified: bool,
    pub kind: VerdictKind,
    /// Present only when `verified` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationVerdict {
    pub fn trusted(step_index: usize) -> Self {
        VerificationVerdict {
            step_index,
            verified: true,
            kind: VerdictKind::TrustedAxiom,
            reason: None,
        }
    }

    pub fn checked(step_index: usize) -> Self {
        VerificationVerdict {
            step_index,
            verified: true,
            kind: VerdictKind::Checked,
            reason: None,
        }
    }

    pub fn rejected(step_index: usize, reason: impl Into<String>) -> Self {
        VerificationVerdict {
            step_index,
            verified: false,
            kind: VerdictKind::Rejected,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    #[serde(default)]
    pub reasoning: String,
    pub expression: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRecord {
    #[serde(default)]
    pub problem: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub steps: Vec<StepRecord>,
}

impl ChainRecord {
    pub fn into_chain(self) -> Result<Chain, VerifyError> {
        let steps = self
            .steps
            .into_iter()
            .map(|record| Step::new(record.reasoning, record.expression))
            .collect();
        Chain::new(self.problem, self.topic, steps)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnnotatedStep {
    pub reasoning: String,
    pub expression: String,
    /// LaTeX rendering of the expression, or the raw text if it did not parse.
    pub latex: String,
    pub verified: bool,
    pub kind: VerdictKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub steps: Vec<AnnotatedStep>,
    pub all_verified: bool,
    /// Steps with kind `Checked`.
    pub proved: usize,
    /// Steps with kind `TrustedAxiom`.
    pub assumed: usize,
    pub rejected: usize,
}

impl VerificationReport {
    /// Packages a verified chain. `None` if any step has no verdict yet.
    pub fn from_chain(chain: &Chain) -> Option<Self> {
        let steps = chain
            .steps()
            .iter()
            .map(|step| {
                let verdict = step.verdict()?;
                let latex = step
                    .statement()
                    .map(latex_statement)
                    .unwrap_or_else(|_| step.raw().to_string());
                Some(AnnotatedStep {
                    reasoning: step.reasoning().to_string(),
                    expression: step.raw().to_string(),
                    latex,
                    verified: verdict.verified,
                    kind: verdict.kind,
                    reason: verdict.reason.clone(),
                })
            })
            .collect::<Option<Vec<_>>>()?;

        let count = |kind: VerdictKind| steps.iter().filter(|s| s.kind == kind).count();
        Some(VerificationReport {
            problem: chain.problem().to_string(),
            topic: chain.topic().map(str::to_string),
            all_verified: steps.iter().all(|s| s.verified),
            proved: count(VerdictKind::Checked),
            assumed: count(VerdictKind::TrustedAxiom),
            rejected: count(VerdictKind::Rejected),
            steps,
        })
    }

    pub fn summary(&self) -> String {
        let verified = self.proved + self.assumed;
        let mut line = format!(
            "{verified} of {} steps verified ({} proved, {} assumed, {} rejected)",
            self.steps.len(),
            self.proved,
            self.assumed,
            self.rejected
        );
        if let Some((idx, step)) = self.first_failure() {
            line.push_str(&format!("; first failure at step {idx}"));
            if let Some(reason) = &step.reason {
                line.push_str(&format!(": {reason}"));
            }
        }
        line
    }

    pub fn first_failure(&self) -> Option<(usize, &AnnotatedStep)> {
        self.steps.iter().enumerate().find(|(_, s)| !s.verified)
    }

    pub fn to_json(&self) -> Result<String, VerifyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Verifies a chain given as step records.
pub fn verify_records(
    problem: impl Into<String>,
    topic: Option<String>,
    records: Vec<StepRecord>,
) -> Result<VerificationReport, VerifyError> {
    let record = ChainRecord {
        problem: problem.into(),
        topic,
        steps: records,
    };
    verify_record(record, &CheckerConfig::default(), None)
}

pub fn verify_record(
    record: ChainRecord,
    config: &CheckerConfig,
    cancel: Option<&CancelFlag>,
) -> Result<VerificationReport, VerifyError> {
    let mut chain = record.into_chain()?;
    verify_with(&mut chain, config, cancel)?;
    let completed = chain.verdicts().len();
    VerificationReport::from_chain(&chain).ok_or(VerifyError::Cancelled { completed })
}

/// JSON in, JSON out: `{"problem", "topic", "steps": [{"reasoning", "expression"}]}`
/// becomes the serialized [`VerificationReport`].
pub fn verify_json(input: &str) -> Result<String, VerifyError> {
    let record: ChainRecord = serde_json::from_str(input)?;
    verify_record(record, &CheckerConfig::default(), None)?.to_json()
}
