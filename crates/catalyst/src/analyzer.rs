//! Catalyst analysis orchestration: LLM first when configured, heuristic on
//! any failure, and a dedicated path when there is no news at all.

use crate::adjuster::{compute_score_adjustment, NO_NEWS_ADJUSTMENT};
use crate::heuristic::HeuristicClassifier;
use crate::llm::LlmClassifier;
use crate::strategy::CatalystStrategy;
use rust_decimal::Decimal;
use short_scan_core::{
    CatalystAssessment, CatalystConfig, CatalystType, NewsFeed, SentimentLevel,
};

/// Which strategy produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisSource {
    Llm,
    Heuristic,
    /// No news existed; neither strategy ran.
    NoNews,
}

impl AnalysisSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisSource::Llm => "llm",
            AnalysisSource::Heuristic => "heuristic",
            AnalysisSource::NoNews => "none",
        }
    }
}

/// Result of catalyst analysis for one ticker.
#[derive(Debug, Clone)]
pub struct SentimentOutcome {
    pub ticker: String,
    pub assessment: CatalystAssessment,
    /// Clamped adjustment applied to the final score.
    pub score_adjustment: f64,
    /// Pre-clamp value, kept for reporting.
    pub raw_adjustment: f64,
    pub source: AnalysisSource,
}

impl SentimentOutcome {
    /// Whether this looks like a high-conviction fundamental repricing.
    #[must_use]
    pub fn is_fundamental_repricing(&self) -> bool {
        self.assessment.justifies_repricing
    }
}

/// Runs catalyst classification with the fixed fallback order.
///
/// The LLM strategy is only consulted when an API key was configured; any
/// [`crate::strategy::ClassifierError`] it returns (transport, bad JSON,
/// schema mismatch, timeout) downgrades that ticker to the heuristic result
/// instead of failing the analysis.
pub struct CatalystAnalyzer {
    llm: Option<LlmClassifier>,
    heuristic: HeuristicClassifier,
    max_headlines: usize,
}

impl CatalystAnalyzer {
    #[must_use]
    pub fn new(config: &CatalystConfig) -> Self {
        let llm = LlmClassifier::from_config(config);
        if llm.is_none() {
            tracing::info!("no catalyst API key configured, running heuristic-only");
        }

        Self {
            llm,
            heuristic: HeuristicClassifier::new(),
            max_headlines: config.max_headlines,
        }
    }

    /// Heuristic-only analyzer, independent of configuration.
    #[must_use]
    pub fn heuristic_only(max_headlines: usize) -> Self {
        Self {
            llm: None,
            heuristic: HeuristicClassifier::new(),
            max_headlines,
        }
    }

    /// Analyzes the news catalyst for a ticker. Never fails; degraded inputs
    /// degrade the outcome instead.
    pub async fn analyze(
        &self,
        ticker: &str,
        change_percent: Decimal,
        news: Option<&NewsFeed>,
    ) -> SentimentOutcome {
        let Some(feed) = news.filter(|feed| !feed.is_empty()) else {
            return Self::no_news_outcome(ticker);
        };

        let headlines = feed.recent_headlines(self.max_headlines);

        if let Some(llm) = &self.llm {
            match llm.classify(ticker, change_percent, &headlines).await {
                Ok(assessment) => {
                    let (capped, raw) = compute_score_adjustment(&assessment);
                    return SentimentOutcome {
                        ticker: ticker.to_string(),
                        assessment,
                        score_adjustment: capped,
                        raw_adjustment: raw,
                        source: AnalysisSource::Llm,
                    };
                }
                Err(err) => {
                    tracing::warn!(ticker, error = %err, "LLM classification failed, using heuristic");
                }
            }
        }

        let assessment = self.heuristic.classify_headlines(&headlines, change_percent);
        let (capped, raw) = compute_score_adjustment(&assessment);

        SentimentOutcome {
            ticker: ticker.to_string(),
            assessment,
            score_adjustment: capped,
            raw_adjustment: raw,
            source: AnalysisSource::Heuristic,
        }
    }

    /// Absence of news on a large move is itself a mild bearish signal, so
    /// this path applies a fixed boost without any table lookup.
    fn no_news_outcome(ticker: &str) -> SentimentOutcome {
        SentimentOutcome {
            ticker: ticker.to_string(),
            assessment: CatalystAssessment {
                catalyst_type: CatalystType::Unknown,
                sentiment: SentimentLevel::Mixed,
                summary: "No news available".to_string(),
                justifies_repricing: false,
                confidence: Decimal::new(2, 1),
            },
            score_adjustment: NO_NEWS_ADJUSTMENT,
            raw_adjustment: NO_NEWS_ADJUSTMENT,
            source: AnalysisSource::NoNews,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use short_scan_core::NewsItem;

    fn feed(titles: &[&str]) -> NewsFeed {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap();
        NewsFeed {
            ticker: "TEST".to_string(),
            items: titles
                .iter()
                .map(|title| NewsItem {
                    title: (*title).to_string(),
                    source: "wire".to_string(),
                    published_at: now,
                    ticker_sentiment: None,
                })
                .collect(),
            fetched_at: now,
        }
    }

    #[tokio::test]
    async fn no_news_applies_fixed_boost() {
        let analyzer = CatalystAnalyzer::heuristic_only(10);

        let outcome = analyzer.analyze("TEST", dec!(75), None).await;

        assert_eq!(outcome.source, AnalysisSource::NoNews);
        assert_eq!(outcome.assessment.catalyst_type, CatalystType::Unknown);
        assert!((outcome.score_adjustment - 0.5).abs() < f64::EPSILON);
        assert_eq!(outcome.assessment.confidence, dec!(0.2));
    }

    #[tokio::test]
    async fn empty_feed_is_treated_as_no_news() {
        let analyzer = CatalystAnalyzer::heuristic_only(10);

        let outcome = analyzer.analyze("TEST", dec!(75), Some(&feed(&[]))).await;

        assert_eq!(outcome.source, AnalysisSource::NoNews);
    }

    #[tokio::test]
    async fn heuristic_path_classifies_fda_news() {
        let analyzer = CatalystAnalyzer::heuristic_only(10);

        let outcome = analyzer
            .analyze(
                "TEST",
                dec!(80),
                Some(&feed(&["FDA Approves New Drug Treatment"])),
            )
            .await;

        assert_eq!(outcome.source, AnalysisSource::Heuristic);
        assert_eq!(outcome.assessment.catalyst_type, CatalystType::Fda);
        assert!(outcome.assessment.justifies_repricing);
        assert!(
            outcome.score_adjustment <= -1.0,
            "expected a clearly negative adjustment, got {}",
            outcome.score_adjustment
        );
    }

    #[tokio::test]
    async fn misconfigured_llm_falls_back_to_heuristic() {
        // Endpoint that no request will ever reach successfully; the
        // transport error must degrade to the heuristic, not fail.
        let config = CatalystConfig {
            api_key: Some("test-key".to_string()),
            api_url: "http://127.0.0.1:1/v1/messages".to_string(),
            timeout_secs: 2,
            ..CatalystConfig::default()
        };
        let analyzer = CatalystAnalyzer::new(&config);

        let outcome = analyzer
            .analyze("TEST", dec!(40), Some(&feed(&["Buyout confirmed"])))
            .await;

        assert_eq!(outcome.source, AnalysisSource::Heuristic);
        assert_eq!(
            outcome.assessment.catalyst_type,
            CatalystType::MergerAcquisition
        );
    }

    #[tokio::test]
    async fn headline_limit_is_respected() {
        let analyzer = CatalystAnalyzer::heuristic_only(2);

        // The FDA headline sits beyond the limit, so only the first two count.
        let outcome = analyzer
            .analyze(
                "TEST",
                dec!(30),
                Some(&feed(&[
                    "Stock rises",
                    "Shares climb again",
                    "FDA approval granted",
                ])),
            )
            .await;

        assert_eq!(outcome.assessment.catalyst_type, CatalystType::Unknown);
    }
}
