//! Per-ticker analysis pipeline and batch orchestration.
//!
//! Each ticker flows indicators -> technical score -> catalyst analysis ->
//! risk flags -> ranking. A failing sub-component degrades its contribution
//! (catalyst falls back to the heuristic, short history yields an empty
//! technical state); only a ticker with no daily price data at all is
//! excluded, with the reason recorded.

use crate::prefilter::Prefilter;
use crate::ranking::{RankingEngine, RankingInput};
use crate::risk::RiskDetector;
use crate::warrant::is_warrant_ticker;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use short_scan_catalyst::CatalystAnalyzer;
use short_scan_core::{
    AppConfig, Fundamentals, KeyLevels, NewsFeed, OhlcvSeries, ShortCandidate,
};
use short_scan_technicals::compute_technical_score;

/// Point-in-time snapshot of everything known about one ticker. This is the
/// shape the ingestion layer delivers; the engine never fetches anything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerSnapshot {
    pub ticker: String,
    pub current_price: Decimal,
    pub change_percent: Decimal,
    pub daily: OhlcvSeries,
    #[serde(default)]
    pub intraday: Option<OhlcvSeries>,
    #[serde(default)]
    pub fundamentals: Option<Fundamentals>,
    #[serde(default)]
    pub news: Option<NewsFeed>,
    /// Analysis date, anchoring listing-age rules.
    pub as_of: NaiveDate,
}

/// A ticker the batch skipped, with the recorded reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedTicker {
    pub ticker: String,
    pub reason: String,
}

/// Ranked candidates plus the tickers that could not be analyzed.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub candidates: Vec<ShortCandidate>,
    pub skipped: Vec<SkippedTicker>,
}

impl BatchOutcome {
    /// Renders the fixed one-line-per-candidate report.
    #[must_use]
    pub fn report_lines(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(ShortCandidate::to_output_line)
            .collect()
    }
}

/// The full decision pipeline for short-candidate analysis.
pub struct AnalysisPipeline {
    config: AppConfig,
    catalyst: CatalystAnalyzer,
    prefilter: Prefilter,
    risk: RiskDetector,
    ranking: RankingEngine,
}

impl AnalysisPipeline {
    /// Builds a pipeline from config. The LLM classifier is active only when
    /// an API key is configured.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        let catalyst = CatalystAnalyzer::new(&config.catalyst);
        Self::with_analyzer(config, catalyst)
    }

    /// Builds a deterministic, heuristic-only pipeline regardless of config.
    #[must_use]
    pub fn heuristic_only(config: AppConfig) -> Self {
        let catalyst = CatalystAnalyzer::heuristic_only(config.catalyst.max_headlines);
        Self::with_analyzer(config, catalyst)
    }

    fn with_analyzer(config: AppConfig, catalyst: CatalystAnalyzer) -> Self {
        let prefilter = Prefilter::new(config.prefilter.clone(), config.risk.clone());
        let risk = RiskDetector::new(config.risk.clone());
        let ranking = RankingEngine::new(config.ranking.clone());
        Self {
            config,
            catalyst,
            prefilter,
            risk,
            ranking,
        }
    }

    /// Analyzes a single ticker snapshot into a scored candidate.
    ///
    /// # Errors
    ///
    /// Fails only when the snapshot carries no daily price data.
    pub async fn analyze_ticker(&self, snapshot: &TickerSnapshot) -> Result<ShortCandidate> {
        if snapshot.daily.is_empty() {
            bail!("{}: no daily price data", snapshot.ticker);
        }

        let (tech_score, breakdown, tech_state) = compute_technical_score(
            &snapshot.daily,
            snapshot.intraday.as_ref(),
            &self.config.technical,
        );

        let sentiment = self
            .catalyst
            .analyze(
                &snapshot.ticker,
                snapshot.change_percent,
                snapshot.news.as_ref(),
            )
            .await;

        let risk_flags = self.risk.detect(
            &snapshot.ticker,
            snapshot.change_percent,
            snapshot.current_price,
            snapshot.fundamentals.as_ref(),
            Some(&tech_state),
            Some(&sentiment.assessment),
            snapshot.as_of,
        );

        let candidate = self.ranking.rank_candidate(RankingInput {
            ticker: snapshot.ticker.clone(),
            current_price: snapshot.current_price,
            change_percent: snapshot.change_percent,
            tech_score,
            tech_state,
            sentiment,
            risk_flags,
            key_levels: derive_key_levels(snapshot),
            fundamentals: snapshot.fundamentals.clone(),
            is_warrant: is_warrant_ticker(&snapshot.ticker),
        });

        tracing::info!(
            ticker = %candidate.ticker,
            tech = %breakdown.summary(),
            final_score = %candidate.final_score,
            expression = candidate.preferred_expression.as_str(),
            "ticker analyzed"
        );

        Ok(candidate)
    }

    /// Analyzes a batch of snapshots and returns the ranked result.
    ///
    /// Each snapshot first passes the pre-filter; excluded tickers are
    /// skipped with the recorded reason and never reach the ranking engine.
    /// Tickers run sequentially: the upstream data APIs are rate-limited and
    /// the per-ticker work is cheap next to those fetches.
    pub async fn analyze_batch(&self, snapshots: &[TickerSnapshot]) -> BatchOutcome {
        let mut inputs = Vec::with_capacity(snapshots.len());
        let mut skipped = Vec::new();

        for snapshot in snapshots {
            let filtered = self.prefilter.filter_ticker(
                &snapshot.ticker,
                snapshot.fundamentals.as_ref(),
                snapshot.change_percent,
            );
            if !filtered.passed {
                let reason = filtered
                    .exclusion_reason
                    .unwrap_or_else(|| "excluded by pre-filter".to_string());
                tracing::info!(ticker = %snapshot.ticker, %reason, "pre-filter excluded ticker");
                skipped.push(SkippedTicker {
                    ticker: snapshot.ticker.clone(),
                    reason,
                });
                continue;
            }

            match self.analyze_ticker(snapshot).await {
                Ok(candidate) => inputs.push(candidate),
                Err(err) => {
                    tracing::warn!(ticker = %snapshot.ticker, error = %err, "skipping ticker");
                    skipped.push(SkippedTicker {
                        ticker: snapshot.ticker.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        BatchOutcome {
            candidates: crate::ranking::sort_and_dedupe(inputs),
            skipped,
        }
    }

    /// The ranking engine, for report filtering on a batch outcome.
    #[must_use]
    pub fn ranking(&self) -> &RankingEngine {
        &self.ranking
    }
}

/// Key price levels derivable from the snapshot alone.
fn derive_key_levels(snapshot: &TickerSnapshot) -> KeyLevels {
    let intraday_bars = snapshot
        .intraday
        .as_ref()
        .map(|series| series.sorted_ascending())
        .unwrap_or_default();

    let intraday_high = intraday_bars.iter().map(|b| b.high).max();
    let intraday_low = intraday_bars.iter().map(|b| b.low).min();

    let daily = snapshot.daily.sorted_ascending();
    let prior_day_close = if daily.len() >= 2 {
        Some(daily[daily.len() - 2].close)
    } else {
        None
    };

    KeyLevels {
        intraday_high,
        intraday_low,
        vwap: None,
        prior_day_close,
        resistance_1: snapshot.fundamentals.as_ref().and_then(|f| f.week_52_high),
        support_1: snapshot.fundamentals.as_ref().and_then(|f| f.week_52_low),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use short_scan_core::{Interval, OhlcvBar};

    fn daily_series(closes: &[f64]) -> OhlcvSeries {
        let base = Utc.with_ymd_and_hms(2025, 3, 3, 21, 0, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let c = Decimal::try_from(close).unwrap();
                OhlcvBar {
                    timestamp: base + Duration::days(i as i64),
                    open: c,
                    high: c + dec!(0.5),
                    low: c - dec!(0.5),
                    close: c,
                    volume: 1_000_000,
                }
            })
            .collect();
        OhlcvSeries::new("TEST", Interval::Daily, bars)
    }

    fn snapshot(closes: &[f64]) -> TickerSnapshot {
        let last = *closes.last().unwrap_or(&0.0);
        TickerSnapshot {
            ticker: "TEST".to_string(),
            current_price: Decimal::try_from(last).unwrap(),
            change_percent: dec!(20),
            daily: daily_series(closes),
            intraday: None,
            fundamentals: None,
            news: None,
            as_of: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        }
    }

    #[tokio::test]
    async fn empty_daily_series_is_an_error() {
        let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());
        let mut snap = snapshot(&[10.0, 11.0]);
        snap.daily.bars.clear();

        assert!(pipeline.analyze_ticker(&snap).await.is_err());
    }

    #[tokio::test]
    async fn short_history_degrades_to_empty_technicals() {
        let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());
        let candidate = pipeline
            .analyze_ticker(&snapshot(&[10.0, 11.0]))
            .await
            .unwrap();

        assert_eq!(candidate.tech_score, dec!(0.0));
        assert_eq!(candidate.technical_state.rsi_daily, None);
    }

    #[tokio::test]
    async fn batch_records_skip_reasons() {
        let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());
        let mut bad = snapshot(&[10.0, 11.0]);
        bad.ticker = "EMPT".to_string();
        bad.daily.bars.clear();

        let outcome = pipeline
            .analyze_batch(&[snapshot(&[10.0, 11.0]), bad])
            .await;

        assert_eq!(outcome.candidates.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].ticker, "EMPT");
        assert!(outcome.skipped[0].reason.contains("no daily price data"));
    }

    #[test]
    fn key_levels_come_from_the_snapshot() {
        let mut snap = snapshot(&[10.0, 11.0, 12.0]);
        snap.intraday = Some(OhlcvSeries::new(
            "TEST",
            Interval::Intraday("15min".to_string()),
            vec![
                OhlcvBar {
                    timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 15, 0, 0).unwrap(),
                    open: dec!(12),
                    high: dec!(13.4),
                    low: dec!(11.8),
                    close: dec!(12.2),
                    volume: 50_000,
                },
                OhlcvBar {
                    timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 15, 15, 0).unwrap(),
                    open: dec!(12.2),
                    high: dec!(12.9),
                    low: dec!(12.0),
                    close: dec!(12.5),
                    volume: 40_000,
                },
            ],
        ));

        let levels = derive_key_levels(&snap);
        assert_eq!(levels.intraday_high, Some(dec!(13.4)));
        assert_eq!(levels.intraday_low, Some(dec!(11.8)));
        assert_eq!(levels.prior_day_close, Some(dec!(11)));
    }
}
