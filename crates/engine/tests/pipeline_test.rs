//! End-to-end pipeline scenarios over synthetic snapshots.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use short_scan_core::{
    AppConfig, CatalystType, Fundamentals, Interval, NewsFeed, NewsItem, OhlcvBar, OhlcvSeries,
    RiskFlag, TradeExpression,
};
use short_scan_engine::{AnalysisPipeline, TickerSnapshot};

fn daily_series(ticker: &str, closes: &[f64], volume: u64) -> OhlcvSeries {
    let base = Utc.with_ymd_and_hms(2025, 4, 1, 20, 0, 0).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let c = Decimal::try_from(close).unwrap();
            OhlcvBar {
                timestamp: base + Duration::days(i as i64),
                open: c * dec!(0.98),
                high: c * dec!(1.02),
                low: c * dec!(0.97),
                close: c,
                volume,
            }
        })
        .collect();
    OhlcvSeries::new(ticker, Interval::Daily, bars)
}

fn news(ticker: &str, titles: &[&str]) -> NewsFeed {
    let now = Utc.with_ymd_and_hms(2025, 6, 2, 13, 0, 0).unwrap();
    NewsFeed {
        ticker: ticker.to_string(),
        items: titles
            .iter()
            .map(|t| NewsItem {
                title: (*t).to_string(),
                source: "wire".to_string(),
                published_at: now,
                ticker_sentiment: None,
            })
            .collect(),
        fetched_at: now,
    }
}

fn snapshot(ticker: &str, closes: &[f64], change: Decimal) -> TickerSnapshot {
    let last = *closes.last().unwrap();
    TickerSnapshot {
        ticker: ticker.to_string(),
        current_price: Decimal::try_from(last).unwrap(),
        change_percent: change,
        daily: daily_series(ticker, closes, 1_000_000),
        intraday: None,
        fundamentals: None,
        news: None,
        as_of: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
    }
}

/// Flat tape then a doubling: enough history for every indicator window.
fn doubling_closes() -> Vec<f64> {
    let mut closes = vec![5.0; 40];
    closes.push(10.0);
    closes
}

#[tokio::test]
async fn microcap_doubling_with_no_news_is_avoided() {
    let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());

    let mut snap = snapshot("TINY", &doubling_closes(), dec!(100));
    snap.fundamentals = Some(Fundamentals {
        ticker: "TINY".to_string(),
        exchange: Some("NASDAQ".to_string()),
        market_cap: Some(80_000_000),
        avg_volume: Some(2_000_000),
        ..Fundamentals::default()
    });

    let candidate = pipeline.analyze_ticker(&snap).await.unwrap();

    // The dangerous microcap + squeeze combination must resolve to AVOID no
    // matter how strong the technical setup looks.
    assert!(candidate.risk_flags.contains(&RiskFlag::Microcap));
    assert!(candidate.risk_flags.contains(&RiskFlag::HighSqueeze));
    assert_eq!(candidate.preferred_expression, TradeExpression::Avoid);

    // No news at all: fixed +0.5 adjustment and an UNKNOWN catalyst.
    assert_eq!(candidate.news_adjustment, dec!(0.5));
    assert_eq!(candidate.news_assessment.catalyst_type, CatalystType::Unknown);
}

#[tokio::test]
async fn fda_news_produces_negative_adjustment_end_to_end() {
    let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());

    let mut snap = snapshot("BIOX", &doubling_closes(), dec!(80));
    snap.news = Some(news("BIOX", &["FDA Approves New Drug Treatment"]));

    let candidate = pipeline.analyze_ticker(&snap).await.unwrap();

    assert_eq!(candidate.news_assessment.catalyst_type, CatalystType::Fda);
    assert!(candidate.news_assessment.justifies_repricing);
    assert_eq!(candidate.news_assessment.confidence, dec!(0.5));
    assert!(candidate.news_adjustment <= dec!(-1.0));
    assert!(candidate
        .risk_flags
        .contains(&RiskFlag::FundamentalRepricing));
}

#[tokio::test]
async fn final_scores_stay_in_range_across_extremes() {
    let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());

    let scenarios = vec![
        snapshot("FLAT", &[10.0; 41], dec!(0)),
        snapshot("MOON", &doubling_closes(), dec!(300)),
        {
            let mut s = snapshot("NEWS", &doubling_closes(), dec!(90));
            s.news = Some(news("NEWS", &["Merger agreed at a premium"]));
            s
        },
    ];

    for snap in &scenarios {
        let candidate = pipeline.analyze_ticker(snap).await.unwrap();
        assert!(
            candidate.final_score >= dec!(0) && candidate.final_score <= dec!(10),
            "{} scored {}",
            candidate.ticker,
            candidate.final_score
        );
    }
}

#[tokio::test]
async fn heuristic_pipeline_is_idempotent() {
    let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());

    let mut snap = snapshot("REPL", &doubling_closes(), dec!(95));
    snap.fundamentals = Some(Fundamentals {
        ticker: "REPL".to_string(),
        exchange: Some("NASDAQ".to_string()),
        market_cap: Some(450_000_000),
        avg_volume: Some(900_000),
        beta: Some(dec!(1.8)),
        week_52_low: Some(dec!(3.10)),
        ..Fundamentals::default()
    });
    snap.news = Some(news(
        "REPL",
        &["Company exploring strategic alternatives", "Shares surge"],
    ));
    let batch = vec![snap, snapshot("OTHR", &doubling_closes(), dec!(60))];

    let first = pipeline.analyze_batch(&batch).await;
    let second = pipeline.analyze_batch(&batch).await;

    assert_eq!(first.candidates, second.candidates);
    assert_eq!(first.report_lines(), second.report_lines());
}

#[tokio::test]
async fn batch_ranking_is_deterministic_and_sorted() {
    let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());

    // Identical setups force a final-score tie; tickers break it.
    let batch = vec![
        snapshot("ZZZZ", &doubling_closes(), dec!(40)),
        snapshot("AAAA", &doubling_closes(), dec!(40)),
        snapshot("MMMM", &[10.0; 41], dec!(0)),
    ];

    let outcome = pipeline.analyze_batch(&batch).await;
    let tickers: Vec<&str> = outcome
        .candidates
        .iter()
        .map(|c| c.ticker.as_str())
        .collect();

    assert_eq!(tickers, vec!["AAAA", "ZZZZ", "MMMM"]);

    let scores: Vec<Decimal> = outcome.candidates.iter().map(|c| c.final_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[tokio::test]
async fn duplicate_tickers_collapse_to_one_candidate() {
    let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());

    let batch = vec![
        snapshot("DUPE", &doubling_closes(), dec!(40)),
        snapshot("DUPE", &doubling_closes(), dec!(40)),
    ];

    let outcome = pipeline.analyze_batch(&batch).await;
    assert_eq!(outcome.candidates.len(), 1);
}

#[tokio::test]
async fn off_exchange_tickers_never_reach_ranking() {
    let pipeline = AnalysisPipeline::heuristic_only(AppConfig::default());

    let mut otc = snapshot("PINK", &doubling_closes(), dec!(120));
    otc.fundamentals = Some(Fundamentals {
        ticker: "PINK".to_string(),
        exchange: Some("OTC".to_string()),
        market_cap: Some(900_000_000),
        avg_volume: Some(1_500_000),
        ..Fundamentals::default()
    });

    let outcome = pipeline
        .analyze_batch(&[snapshot("FINE", &doubling_closes(), dec!(40)), otc])
        .await;

    assert_eq!(outcome.candidates.len(), 1);
    assert_eq!(outcome.candidates[0].ticker, "FINE");
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].ticker, "PINK");
    assert!(outcome.skipped[0].reason.contains("OTC"));
}

#[tokio::test]
async fn snapshot_round_trips_through_serde() {
    let snap = snapshot("SERD", &doubling_closes(), dec!(55));

    let json = serde_json::to_string(&snap).unwrap();
    let parsed: TickerSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.ticker, "SERD");
    assert_eq!(parsed.daily.bars.len(), snap.daily.bars.len());
    assert_eq!(parsed.change_percent, dec!(55));
}
