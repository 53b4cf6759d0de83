//! LLM-backed catalyst classification.
//!
//! Sends recent headlines to the Anthropic messages API and parses a strict
//! JSON verdict. Any transport problem, malformed payload, or timeout
//! surfaces as a [`ClassifierError`] so the analyzer can fall back to the
//! heuristic strategy.

use crate::strategy::{CatalystStrategy, ClassifierError};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use short_scan_core::{CatalystAssessment, CatalystConfig, CatalystType, SentimentLevel};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

const CLASSIFY_PROMPT: &str = r#"Analyze these news headlines for ticker {ticker} which gained {pct_change}% today.

Headlines (most recent first):
{headlines}

Your task: Determine what is driving this stock move and whether it justifies a permanent valuation change.

Respond ONLY with valid JSON (no markdown, no explanation):
{
  "catalyst_type": "<one of: EARNINGS, FDA, MERGER_ACQUISITION, UPGRADE, DOWNGRADE, CONTRACT, PRODUCT_LAUNCH, SPECULATIVE, MEME_SOCIAL, UNKNOWN>",
  "sentiment": "<one of: strongly_positive, positive, mixed, negative, strongly_negative>",
  "summary": "<one sentence describing the catalyst, max 100 chars>",
  "justifies_repricing": <true if this news justifies a permanent valuation change, false if speculative/temporary>,
  "confidence": <0.0 to 1.0, your confidence in this assessment>
}

Guidelines:
- EARNINGS: Quarterly results, revenue/profit beats or misses
- FDA: Drug approvals, clinical trial results, regulatory decisions
- MERGER_ACQUISITION: Merger, acquisition, buyout announcements
- UPGRADE/DOWNGRADE: Analyst rating changes
- CONTRACT: Major business wins, partnerships
- PRODUCT_LAUNCH: New product announcements
- SPECULATIVE: Vague PR, rumors, no clear fundamental driver
- MEME_SOCIAL: Social media driven, retail squeeze patterns
- UNKNOWN: Cannot determine catalyst

justifies_repricing should be TRUE for:
- Strong earnings beats with raised guidance
- FDA approvals for major drugs
- Confirmed M&A at premium
- Major contract wins that materially change revenue outlook

justifies_repricing should be FALSE for:
- Vague press releases without numbers
- Social media hype without fundamental news
- Minor partnerships or early-stage announcements
- Analyst upgrades without new information"#;

/// The strict JSON shape the model is asked to return.
#[derive(Debug, Deserialize)]
struct ClassifyVerdict {
    catalyst_type: String,
    sentiment: String,
    summary: String,
    justifies_repricing: bool,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

/// Catalyst classifier backed by the Anthropic messages API.
pub struct LlmClassifier {
    client: reqwest::Client,
    config: CatalystConfig,
    api_key: String,
}

impl LlmClassifier {
    /// Creates a classifier from config. Returns `None` when no API key is
    /// configured, in which case the analyzer runs heuristic-only.
    #[must_use]
    pub fn from_config(config: &CatalystConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            api_key,
        })
    }

    fn build_prompt(&self, ticker: &str, change_percent: Decimal, headlines: &[String]) -> String {
        let headline_block = headlines
            .iter()
            .take(self.config.max_headlines)
            .map(|title| format!("- {title}"))
            .collect::<Vec<_>>()
            .join("\n");

        CLASSIFY_PROMPT
            .replace("{ticker}", ticker)
            .replace(
                "{pct_change}",
                &format!("{:.1}", change_percent.to_f64().unwrap_or(0.0)),
            )
            .replace("{headlines}", &headline_block)
    }

    async fn call_api(&self, prompt: &str) -> Result<String, ClassifierError> {
        let payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status));
        }

        let body: ApiResponse = response.json().await?;
        body.content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or(ClassifierError::MissingContent)
    }
}

/// Parses the model's JSON verdict into an assessment.
///
/// Unknown enum strings degrade to UNKNOWN/mixed rather than failing; only a
/// structurally invalid payload is an error.
pub(crate) fn parse_verdict(text: &str) -> Result<CatalystAssessment, ClassifierError> {
    // Strip markdown fencing the model sometimes adds despite instructions.
    let mut cleaned = text.trim();
    if let Some(stripped) = cleaned.strip_prefix("```") {
        let stripped = stripped.strip_prefix("json").unwrap_or(stripped);
        cleaned = stripped.split("```").next().unwrap_or(stripped);
    }
    let cleaned = cleaned.trim();

    let verdict: ClassifyVerdict = serde_json::from_str(cleaned)?;

    let catalyst_type =
        serde_json::from_value::<CatalystType>(serde_json::Value::String(
            verdict.catalyst_type.to_uppercase(),
        ))
        .unwrap_or(CatalystType::Unknown);

    let sentiment = serde_json::from_value::<SentimentLevel>(serde_json::Value::String(
        verdict.sentiment.to_lowercase(),
    ))
    .unwrap_or(SentimentLevel::Mixed);

    if !verdict.confidence.is_finite() {
        return Err(ClassifierError::SchemaMismatch(format!(
            "confidence is not a number: {}",
            verdict.confidence
        )));
    }
    let confidence = Decimal::try_from(verdict.confidence.clamp(0.0, 1.0))
        .unwrap_or(Decimal::ZERO)
        .round_dp(2);

    let summary: String = verdict.summary.chars().take(100).collect();

    Ok(CatalystAssessment {
        catalyst_type,
        sentiment,
        summary,
        justifies_repricing: verdict.justifies_repricing,
        confidence,
    })
}

#[async_trait]
impl CatalystStrategy for LlmClassifier {
    async fn classify(
        &self,
        ticker: &str,
        change_percent: Decimal,
        headlines: &[String],
    ) -> Result<CatalystAssessment, ClassifierError> {
        let prompt = self.build_prompt(ticker, change_percent, headlines);

        let response = tokio::time::timeout(
            Duration::from_secs(self.config.timeout_secs),
            self.call_api(&prompt),
        )
        .await
        .map_err(|_| ClassifierError::Timeout(self.config.timeout_secs))??;

        parse_verdict(&response)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
