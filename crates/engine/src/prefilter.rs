//! Pre-filtering for candidate tickers.
//!
//! Applies safety checks before the expensive per-ticker analysis. Cap and
//! volume shortfalls only flag the ticker for risk assessment; the exchange
//! requirement is the one check that excludes, with a recorded reason.
//! Excluded tickers never reach the ranking engine.

use crate::risk::squeeze_signal_count;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use short_scan_core::{FilteredTicker, Fundamentals, PrefilterConfig, RiskConfig, RiskFlag};
use std::collections::BTreeSet;

/// Result of pre-filtering a batch of tickers.
#[derive(Debug, Clone)]
pub struct PrefilterOutcome {
    pub passed: Vec<FilteredTicker>,
    pub excluded: Vec<FilteredTicker>,
    pub total_input: usize,
}

impl PrefilterOutcome {
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passed.len()
    }

    #[must_use]
    pub fn exclude_count(&self) -> usize {
        self.excluded.len()
    }

    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total_input == 0 {
            return 0.0;
        }
        self.pass_count() as f64 / self.total_input as f64
    }

    /// Symbols that passed, in input order.
    #[must_use]
    pub fn passed_tickers(&self) -> Vec<String> {
        self.passed.iter().map(|t| t.ticker.clone()).collect()
    }
}

/// Pre-filter over (ticker, fundamentals, day change) tuples.
pub struct Prefilter {
    config: PrefilterConfig,
    risk_config: RiskConfig,
}

impl Prefilter {
    #[must_use]
    pub fn new(config: PrefilterConfig, risk_config: RiskConfig) -> Self {
        Self {
            config,
            risk_config,
        }
    }

    /// Applies all pre-filters to a single ticker.
    #[must_use]
    pub fn filter_ticker(
        &self,
        ticker: &str,
        fundamentals: Option<&Fundamentals>,
        change_percent: Decimal,
    ) -> FilteredTicker {
        let market_cap = fundamentals.and_then(|f| f.market_cap);
        let avg_volume = fundamentals.and_then(|f| f.avg_volume);
        let exchange = fundamentals.and_then(|f| f.exchange.as_deref());
        let beta = fundamentals.and_then(|f| f.beta);
        let float_shares = fundamentals.and_then(|f| f.float_shares);

        let mut flags = BTreeSet::new();
        let mut exclusion_reasons: Vec<String> = Vec::new();

        // Unknown cap or volume cannot be verified, so it is flagged too.
        match market_cap {
            Some(cap) if cap >= self.config.min_market_cap => {}
            _ => {
                flags.insert(RiskFlag::Microcap);
            }
        }

        match avg_volume {
            Some(volume) if volume >= self.config.min_avg_volume => {}
            _ => {
                flags.insert(RiskFlag::LowLiquidity);
            }
        }

        if self.config.require_primary_exchange {
            if let Some(exchange) = exchange {
                if !exchange
                    .to_uppercase()
                    .contains(&self.config.primary_exchange.to_uppercase())
                {
                    exclusion_reasons.push(format!(
                        "Not listed on {} (exchange: {exchange})",
                        self.config.primary_exchange
                    ));
                }
            }
        }

        let change = change_percent.to_f64().unwrap_or(0.0);
        if beta
            .and_then(|b| b.to_f64())
            .is_some_and(|b| b > self.risk_config.high_beta)
        {
            flags.insert(RiskFlag::ExtremeVolatility);
        }
        let signals = squeeze_signal_count(
            &self.risk_config,
            change,
            market_cap,
            float_shares,
            beta.and_then(|b| b.to_f64()),
            avg_volume,
        );
        if signals >= self.risk_config.squeeze_signal_threshold {
            flags.insert(RiskFlag::HighSqueeze);
        }

        let passed = exclusion_reasons.is_empty();
        if flags.is_empty() {
            flags.insert(RiskFlag::None);
        }

        FilteredTicker {
            ticker: ticker.to_string(),
            passed,
            risk_flags: flags,
            exclusion_reason: if exclusion_reasons.is_empty() {
                None
            } else {
                Some(exclusion_reasons.join("; "))
            },
            market_cap,
            avg_volume,
            beta,
        }
    }

    /// Applies the pre-filter to a batch, partitioning passed from excluded.
    #[must_use]
    pub fn filter_batch(
        &self,
        tickers: &[(String, Option<Fundamentals>, Decimal)],
    ) -> PrefilterOutcome {
        let mut passed = Vec::new();
        let mut excluded = Vec::new();

        for (ticker, fundamentals, change) in tickers {
            let result = self.filter_ticker(ticker, fundamentals.as_ref(), *change);
            if result.passed {
                passed.push(result);
            } else {
                excluded.push(result);
            }
        }

        tracing::info!(
            total = tickers.len(),
            passed = passed.len(),
            excluded = excluded.len(),
            "pre-filter complete"
        );

        PrefilterOutcome {
            passed,
            excluded,
            total_input: tickers.len(),
        }
    }
}
