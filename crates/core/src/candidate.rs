//! Derived analysis models: technical snapshots, catalyst assessments, risk
//! flags, and the fully scored short candidate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================
// Technical state
// ============================================

/// Direction of the on-balance-volume trend over recent bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObvTrend {
    Rising,
    Falling,
    Flat,
}

impl ObvTrend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ObvTrend::Rising => "rising",
            ObvTrend::Falling => "falling",
            ObvTrend::Flat => "flat",
        }
    }
}

/// Immutable snapshot of technical indicator values for a ticker.
///
/// Any field may be absent when the underlying series was too short; scoring
/// treats absence as a zero contribution for that component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalState {
    // RSI
    pub rsi_daily: Option<Decimal>,
    pub rsi_intraday: Option<Decimal>,

    // MACD
    pub macd_line: Option<Decimal>,
    pub macd_signal: Option<Decimal>,
    pub macd_histogram: Option<Decimal>,
    /// True iff the last three histogram values are strictly decreasing.
    pub macd_histogram_declining: bool,

    // Bollinger Bands
    pub bollinger_upper: Option<Decimal>,
    pub bollinger_middle: Option<Decimal>,
    pub bollinger_lower: Option<Decimal>,
    /// %B: 0 = lower band, 0.5 = middle, 1 = upper band.
    pub bollinger_position: Option<Decimal>,
    pub price_above_upper_band: bool,

    // Volatility
    pub atr_daily: Option<Decimal>,
    /// ATR one bar earlier, kept so risk rules can see expansion.
    pub atr_prior: Option<Decimal>,
    /// ATR as percentage of the current price.
    pub atr_percent: Option<Decimal>,

    // Volume
    pub obv_trend: Option<ObvTrend>,
    /// Last bar volume / trailing 20-bar average volume.
    pub volume_vs_avg: Option<Decimal>,
    pub volume_confirming_price: bool,

    // Momentum
    pub roc_1d: Option<Decimal>,
    pub roc_3d: Option<Decimal>,
    pub roc_5d: Option<Decimal>,

    // Pattern detection
    pub lower_high_forming: bool,
    pub exhaustion_candle: bool,
}

impl Default for TechnicalState {
    fn default() -> Self {
        Self {
            rsi_daily: None,
            rsi_intraday: None,
            macd_line: None,
            macd_signal: None,
            macd_histogram: None,
            macd_histogram_declining: false,
            bollinger_upper: None,
            bollinger_middle: None,
            bollinger_lower: None,
            bollinger_position: None,
            price_above_upper_band: false,
            atr_daily: None,
            atr_prior: None,
            atr_percent: None,
            obv_trend: None,
            volume_vs_avg: None,
            volume_confirming_price: true,
            roc_1d: None,
            roc_3d: None,
            roc_5d: None,
            lower_high_forming: false,
            exhaustion_candle: false,
        }
    }
}

impl TechnicalState {
    /// Compact technical notes for the one-line report output.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(rsi) = self.rsi_daily {
            parts.push(format!("RSI {rsi:.0}"));
            if let Some(intra) = self.rsi_intraday {
                parts.push(format!("(intra {intra:.0})"));
            }
        }

        if self.price_above_upper_band {
            parts.push("above upper BB".to_string());
        } else if let Some(pos) = self.bollinger_position {
            if pos > Decimal::new(8, 1) {
                parts.push("near upper BB".to_string());
            }
        }

        if self.macd_histogram_declining {
            parts.push("MACD fading".to_string());
        }

        if !self.volume_confirming_price {
            parts.push("vol divergence".to_string());
        }

        if self.lower_high_forming {
            parts.push("lower high forming".to_string());
        }

        if self.exhaustion_candle {
            parts.push("exhaustion candle".to_string());
        }

        if parts.is_empty() {
            "neutral".to_string()
        } else {
            parts.join(", ")
        }
    }
}

// ============================================
// Catalyst assessment
// ============================================

/// Classification of the news catalyst driving a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalystType {
    Earnings,
    Fda,
    #[serde(alias = "MA", alias = "M&A")]
    MergerAcquisition,
    Upgrade,
    Downgrade,
    Contract,
    ProductLaunch,
    Speculative,
    MemeSocial,
    Unknown,
}

impl CatalystType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CatalystType::Earnings => "EARNINGS",
            CatalystType::Fda => "FDA",
            CatalystType::MergerAcquisition => "MERGER_ACQUISITION",
            CatalystType::Upgrade => "UPGRADE",
            CatalystType::Downgrade => "DOWNGRADE",
            CatalystType::Contract => "CONTRACT",
            CatalystType::ProductLaunch => "PRODUCT_LAUNCH",
            CatalystType::Speculative => "SPECULATIVE",
            CatalystType::MemeSocial => "MEME_SOCIAL",
            CatalystType::Unknown => "UNKNOWN",
        }
    }

    /// True for catalyst types that typically justify repricing.
    #[must_use]
    pub fn is_fundamental(self) -> bool {
        matches!(
            self,
            CatalystType::Earnings
                | CatalystType::Fda
                | CatalystType::MergerAcquisition
                | CatalystType::Contract
        )
    }
}

/// Overall sentiment assessment on a 5-point ordinal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentLevel {
    StronglyPositive,
    Positive,
    Mixed,
    Negative,
    StronglyNegative,
}

impl SentimentLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLevel::StronglyPositive => "strongly_positive",
            SentimentLevel::Positive => "positive",
            SentimentLevel::Mixed => "mixed",
            SentimentLevel::Negative => "negative",
            SentimentLevel::StronglyNegative => "strongly_negative",
        }
    }
}

/// Classifier output for a ticker's news catalyst.
///
/// `catalyst_type` and `justifies_repricing` are always set together by the
/// same classification pass; nothing downstream overrides one without the
/// other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalystAssessment {
    pub catalyst_type: CatalystType,
    pub sentiment: SentimentLevel,
    pub summary: String,
    pub justifies_repricing: bool,
    /// Classifier confidence in [0, 1].
    pub confidence: Decimal,
}

impl CatalystAssessment {
    /// Compact news notes for the one-line report output.
    #[must_use]
    pub fn notes(&self) -> String {
        let mut out = self.catalyst_type.as_str().to_string();

        if !self.summary.is_empty() {
            out.push_str(": ");
            out.push_str(&self.summary);
        }

        out.push_str(&format!(" [{}]", self.sentiment.as_str()));

        if self.justifies_repricing {
            out.push_str(" **FUNDAMENTAL_REPRICING**");
        } else if matches!(
            self.catalyst_type,
            CatalystType::Speculative | CatalystType::MemeSocial | CatalystType::Unknown
        ) {
            out.push_str(" [LOW_QUALITY_CATALYST]");
        }

        out
    }
}

// ============================================
// Risk flags and trade expression
// ============================================

/// Risk flags that may be attached to a candidate.
///
/// The derived `Ord` gives flag sets a stable display order, roughly by
/// severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskFlag {
    HighSqueeze,
    ExtremeVolatility,
    FundamentalRepricing,
    Microcap,
    LowLiquidity,
    NonPrimaryExchange,
    NewListing,
    Warrant,
    None,
}

impl RiskFlag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RiskFlag::HighSqueeze => "HIGH_SQUEEZE",
            RiskFlag::ExtremeVolatility => "EXTREME_VOLATILITY",
            RiskFlag::FundamentalRepricing => "FUNDAMENTAL_REPRICING",
            RiskFlag::Microcap => "MICROCAP",
            RiskFlag::LowLiquidity => "LOW_LIQUIDITY",
            RiskFlag::NonPrimaryExchange => "NON_PRIMARY_EXCHANGE",
            RiskFlag::NewListing => "NEW_LISTING",
            RiskFlag::Warrant => "WARRANT",
            RiskFlag::None => "NONE",
        }
    }
}

/// Preferred way to express a short view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeExpression {
    ShortShares,
    BuyPuts,
    PutSpreads,
    Avoid,
}

impl TradeExpression {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TradeExpression::ShortShares => "SHORT_SHARES",
            TradeExpression::BuyPuts => "BUY_PUTS",
            TradeExpression::PutSpreads => "PUT_SPREADS",
            TradeExpression::Avoid => "AVOID",
        }
    }
}

// ============================================
// Key levels and the candidate itself
// ============================================

/// Key price levels for trade management.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyLevels {
    pub intraday_high: Option<Decimal>,
    pub intraday_low: Option<Decimal>,
    pub vwap: Option<Decimal>,
    pub prior_day_close: Option<Decimal>,
    pub resistance_1: Option<Decimal>,
    pub support_1: Option<Decimal>,
}

impl KeyLevels {
    /// Present levels as (label, value) pairs in display order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, Decimal)> {
        [
            ("intraday_high", self.intraday_high),
            ("intraday_low", self.intraday_low),
            ("vwap", self.vwap),
            ("prior_close", self.prior_day_close),
            ("resistance", self.resistance_1),
            ("support", self.support_1),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|v| (label, v)))
        .collect()
    }
}

/// A fully analyzed short candidate with scores and metadata.
///
/// Built once per analysis pass per ticker and never mutated afterwards; a
/// re-analysis produces a new instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortCandidate {
    pub ticker: String,
    pub current_price: Decimal,
    pub change_percent: Decimal,

    // Scores
    pub tech_score: Decimal,
    pub news_adjustment: Decimal,
    pub risk_penalty: Decimal,
    pub final_score: Decimal,

    // Analysis details
    pub technical_state: TechnicalState,
    pub news_assessment: CatalystAssessment,
    pub risk_flags: std::collections::BTreeSet<RiskFlag>,

    // Trade structure
    pub preferred_expression: TradeExpression,
    pub key_levels: KeyLevels,

    // Metadata
    pub market_cap: Option<u64>,
    pub avg_volume: Option<u64>,
    pub sector: Option<String>,
    pub is_warrant: bool,
}

impl ShortCandidate {
    /// One-line summary in the fixed pipe-delimited report format:
    /// `TICKER | SCORE | TECH_NOTES | NEWS_NOTES | RISK_FLAGS | EXPRESSION | KEY_LEVELS`.
    #[must_use]
    pub fn to_output_line(&self) -> String {
        let risk_str = if self.risk_flags.is_empty() {
            "NONE".to_string()
        } else {
            self.risk_flags
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(",")
        };

        let levels_str = self
            .key_levels
            .to_pairs()
            .into_iter()
            .map(|(label, value)| format!("{label}={value:.2}"))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{} | {:.1} | {} | {} | {} | {} | {}",
            self.ticker,
            self.final_score,
            self.technical_state.summary(),
            self.news_assessment.notes(),
            risk_str,
            self.preferred_expression.as_str(),
            levels_str,
        )
    }
}

/// Result of the pre-filter stage for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredTicker {
    pub ticker: String,
    pub passed: bool,
    pub risk_flags: std::collections::BTreeSet<RiskFlag>,
    pub exclusion_reason: Option<String>,
    pub market_cap: Option<u64>,
    pub avg_volume: Option<u64>,
    pub beta: Option<Decimal>,
}
