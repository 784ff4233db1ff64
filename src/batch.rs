//! Verification of many independent chains in parallel.

use rayon::prelude::*;

use crate::chain::CancelFlag;
use crate::config::CheckerConfig;
use crate::error::VerifyError;
use crate::report::{verify_record, ChainRecord, VerificationReport};

/// Verifies each chain on the rayon pool. Results keep the input order.
pub fn verify_many(
    records: Vec<ChainRecord>,
    config: &CheckerConfig,
) -> Vec<Result<VerificationReport, VerifyError>> {
    verify_many_with_cancel(records, config, &CancelFlag::new())
}

/// Like [`verify_many`]; every worker checks `cancel` between steps, and
/// chains not finished when it is set come back as `VerifyError::Cancelled`.
pub fn verify_many_with_cancel(
    records: Vec<ChainRecord>,
    config: &CheckerConfig,
    cancel: &CancelFlag,
) -> Vec<Result<VerificationReport, VerifyError>> {
    let reports: Vec<_> = records
        .into_par_iter()
        .map(|record| verify_record(record, config, Some(cancel)))
        .collect();

    tracing::info!(
        target: "stepcheck::batch",
        chains = reports.len(),
        verified = reports
            .iter()
            .filter(|r| matches!(r, Ok(report) if report.all_verified))
            .count(),
        "batch verification finished"
    );
    reports
}
