#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/subsidia/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod orchestrator;

// Re-export main types from sub-crates
pub use subsidia_edgar as edgar;
pub use subsidia_exhibit as exhibit;
pub use subsidia_output as output;

pub use error::{PipelineError, Result};
pub use orchestrator::{RunOptions, YearOrchestrator};
pub use subsidia_edgar::{FetcherConfig, FilerIdentity, RunContext};
pub use subsidia_exhibit::SubsidiaryRecord;
pub use subsidia_output::{CompanyReport, YearReport, YearStatus};

use std::ops::RangeInclusive;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a complete extraction with a fresh run context.
///
/// # Errors
/// Fails with a configuration error when no identification `User-Agent` is set, and otherwise
/// as [`YearOrchestrator::run`] does. No request is made before both checks pass.
pub async fn extract(
    config: FetcherConfig,
    symbol: &str,
    years: RangeInclusive<i32>,
    options: RunOptions,
) -> Result<CompanyReport> {
    let ctx = RunContext::new(config)?;
    YearOrchestrator::new(&ctx)
        .with_options(options)
        .run(symbol, years)
        .await
}
