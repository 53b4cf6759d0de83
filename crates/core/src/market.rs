//! Raw market data models consumed from the ingestion layer.
//!
//! These are the shapes the decision engine receives; how they were fetched
//! (REST clients, caches, rate limiting) is the ingestion layer's concern.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bar interval for an OHLCV series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    /// Intraday granularity, e.g. "15min" or "5min".
    Intraday(String),
}

impl Interval {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Interval::Daily => "daily",
            Interval::Intraday(s) => s.as_str(),
        }
    }
}

/// A single OHLCV bar (works for both daily and intraday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

/// Time series of OHLCV bars for one ticker at one interval.
///
/// Upstream sources usually deliver bars newest-first; nothing here relies on
/// that. The indicator engine sorts ascending by timestamp before any
/// windowed calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvSeries {
    pub ticker: String,
    pub interval: Interval,
    pub bars: Vec<OhlcvBar>,
}

impl OhlcvSeries {
    #[must_use]
    pub fn new(ticker: impl Into<String>, interval: Interval, bars: Vec<OhlcvBar>) -> Self {
        Self {
            ticker: ticker.into(),
            interval,
            bars,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the bars sorted ascending by timestamp (oldest first).
    #[must_use]
    pub fn sorted_ascending(&self) -> Vec<OhlcvBar> {
        let mut bars = self.bars.clone();
        bars.sort_by_key(|b| b.timestamp);
        bars
    }
}

/// Company fundamentals. Any field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fundamentals {
    pub ticker: String,
    pub name: Option<String>,
    pub exchange: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<u64>,
    pub shares_outstanding: Option<u64>,
    /// Often unavailable from the overview endpoint.
    pub float_shares: Option<u64>,
    pub beta: Option<Decimal>,
    pub avg_volume: Option<u64>,
    pub week_52_high: Option<Decimal>,
    pub week_52_low: Option<Decimal>,
    pub ipo_date: Option<NaiveDate>,
}

impl Fundamentals {
    /// Market cap, falling back to shares outstanding times price when the
    /// overview endpoint omitted it.
    #[must_use]
    pub fn implied_market_cap(&self, price: Decimal) -> Option<Decimal> {
        if let Some(cap) = self.market_cap {
            return Some(Decimal::from(cap));
        }
        self.shares_outstanding
            .map(|shares| Decimal::from(shares) * price)
    }
}

/// Single news article for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    /// Upstream per-ticker sentiment score, when the feed provides one.
    pub ticker_sentiment: Option<Decimal>,
}

/// Ordered collection of news items for a ticker (most recent first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsFeed {
    pub ticker: String,
    pub items: Vec<NewsItem>,
    pub fetched_at: DateTime<Utc>,
}

impl NewsFeed {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Titles of the `limit` most recent items, for classification.
    #[must_use]
    pub fn recent_headlines(&self, limit: usize) -> Vec<String> {
        self.items
            .iter()
            .take(limit)
            .map(|item| item.title.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn bar(ts_hour: u32, close: Decimal) -> OhlcvBar {
        OhlcvBar {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 2, ts_hour, 0, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn sorted_ascending_ignores_input_order() {
        let series = OhlcvSeries::new(
            "TEST",
            Interval::Daily,
            vec![bar(15, dec!(3)), bar(13, dec!(1)), bar(14, dec!(2))],
        );

        let sorted = series.sorted_ascending();
        let closes: Vec<Decimal> = sorted.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(1), dec!(2), dec!(3)]);
    }

    #[test]
    fn implied_market_cap_prefers_reported_cap() {
        let fundamentals = Fundamentals {
            ticker: "TEST".to_string(),
            market_cap: Some(500_000_000),
            shares_outstanding: Some(10_000_000),
            ..Fundamentals::default()
        };

        assert_eq!(
            fundamentals.implied_market_cap(dec!(2)),
            Some(dec!(500000000))
        );
    }

    #[test]
    fn implied_market_cap_falls_back_to_shares_times_price() {
        let fundamentals = Fundamentals {
            ticker: "TEST".to_string(),
            shares_outstanding: Some(10_000_000),
            ..Fundamentals::default()
        };

        assert_eq!(
            fundamentals.implied_market_cap(dec!(8)),
            Some(dec!(80000000))
        );
    }

    #[test]
    fn recent_headlines_respects_limit() {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let feed = NewsFeed {
            ticker: "TEST".to_string(),
            items: (0..15)
                .map(|i| NewsItem {
                    title: format!("headline {i}"),
                    source: "wire".to_string(),
                    published_at: now,
                    ticker_sentiment: None,
                })
                .collect(),
            fetched_at: now,
        };

        let headlines = feed.recent_headlines(10);
        assert_eq!(headlines.len(), 10);
        assert_eq!(headlines[0], "headline 0");
    }
}
