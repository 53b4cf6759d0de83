use serde::{Deserialize, Serialize};

/// Technical indicator parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    pub bollinger_std: f64,
    pub atr_period: usize,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_std: 2.0,
            atr_period: 14,
        }
    }
}

/// Catalyst classification settings. The API key is normally supplied via the
/// `SHORT_SCAN_CATALYST__API_KEY` environment variable rather than the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalystConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub max_headlines: usize,
}

impl Default for CatalystConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.anthropic.com/v1/messages".to_string(),
            api_key: None,
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 500,
            timeout_secs: 30,
            max_headlines: 10,
        }
    }
}

/// Pre-filter thresholds. Cap and volume shortfalls flag rather than exclude;
/// only the exchange requirement excludes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefilterConfig {
    pub min_market_cap: u64,
    pub min_avg_volume: u64,
    pub require_primary_exchange: bool,
    pub primary_exchange: String,
}

impl Default for PrefilterConfig {
    fn default() -> Self {
        Self {
            min_market_cap: 200_000_000,
            min_avg_volume: 500_000,
            require_primary_exchange: true,
            primary_exchange: "NASDAQ".to_string(),
        }
    }
}

/// Risk flag detection thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub microcap_market_cap: u64,
    pub low_liquidity_volume: u64,
    /// A move beyond this is squeeze risk on its own.
    pub squeeze_change_percent: f64,
    pub squeeze_shares_outstanding: u64,
    pub low_float_shares: u64,
    pub high_beta: f64,
    pub volatility_change_percent: f64,
    pub atr_expansion_multiple: f64,
    pub primary_exchange: String,
    pub new_listing_days: i64,
    /// Cap below which a >20% move counts as a squeeze signal.
    pub squeeze_cap_threshold: u64,
    pub squeeze_cap_move_percent: f64,
    pub squeeze_signal_threshold: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            microcap_market_cap: 300_000_000,
            low_liquidity_volume: 100_000,
            squeeze_change_percent: 100.0,
            squeeze_shares_outstanding: 50_000_000,
            low_float_shares: 10_000_000,
            high_beta: 2.5,
            volatility_change_percent: 50.0,
            atr_expansion_multiple: 5.0,
            primary_exchange: "NASDAQ".to_string(),
            new_listing_days: 90,
            squeeze_cap_threshold: 500_000_000,
            squeeze_cap_move_percent: 20.0,
            squeeze_signal_threshold: 2,
        }
    }
}

/// Final scoring and trade-expression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Candidates scoring below this resolve to AVOID.
    pub avoid_score_cutoff: f64,
    /// Above this beta, prefer puts; above 1.5x, avoid entirely.
    pub max_beta_for_shares: f64,
    /// Repricing confidence at or above this forces AVOID.
    pub repricing_confidence_avoid: f64,
    /// Minimum final score for the top-candidates report.
    pub min_report_score: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            avoid_score_cutoff: 4.0,
            max_beta_for_shares: 3.0,
            repricing_confidence_avoid: 0.7,
            min_report_score: 4.0,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub technical: TechnicalConfig,
    pub catalyst: CatalystConfig,
    pub prefilter: PrefilterConfig,
    pub risk: RiskConfig,
    pub ranking: RankingConfig,
}
