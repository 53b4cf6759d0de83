//! Classification strategy interface.
//!
//! Two interchangeable implementations sit behind [`CatalystStrategy`]: the
//! LLM-backed classifier and the keyword heuristic. The analyzer owns the
//! fallback order; every way the LLM path can fail is a [`ClassifierError`]
//! variant so the fallback trigger is enumerated rather than implied.

use async_trait::async_trait;
use rust_decimal::Decimal;
use short_scan_core::CatalystAssessment;
use thiserror::Error;

/// Failure modes of a classification attempt.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("response contained no text content")]
    MissingContent,

    #[error("response was not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response JSON did not match the expected schema: {0}")]
    SchemaMismatch(String),

    #[error("classification timed out after {0}s")]
    Timeout(u64),
}

/// A strategy that classifies the catalyst behind a ticker's move.
#[async_trait]
pub trait CatalystStrategy: Send + Sync {
    /// Classifies the catalyst from recent headlines and the day's move.
    async fn classify(
        &self,
        ticker: &str,
        change_percent: Decimal,
        headlines: &[String],
    ) -> Result<CatalystAssessment, ClassifierError>;

    fn name(&self) -> &'static str;
}
