//! Risk flag detection.
//!
//! A pure function of the snapshot: fundamentals, the technical state, the
//! day's move, and the catalyst assessment go in; a deduplicated flag set
//! comes out. Every rule is independent and flags may co-occur freely.

use crate::warrant::is_warrant_ticker;
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use short_scan_core::{CatalystAssessment, Fundamentals, RiskConfig, RiskFlag, TechnicalState};
use std::collections::BTreeSet;

/// Counts independent squeeze signals for the accumulation rule. Shared with
/// the pre-filter, which flags on the same evidence.
pub(crate) fn squeeze_signal_count(
    config: &RiskConfig,
    change_percent: f64,
    market_cap: Option<u64>,
    float_shares: Option<u64>,
    beta: Option<f64>,
    avg_volume: Option<u64>,
) -> u32 {
    let mut signals = 0;

    // Low float is the strongest single signal.
    if float_shares.is_some_and(|float| float < config.low_float_shares) {
        signals += 2;
    }

    if beta.is_some_and(|b| b > config.high_beta) {
        signals += 1;
    }

    if change_percent > 50.0 {
        signals += 2;
    } else if change_percent > 30.0 {
        signals += 1;
    }

    // Days to cover below one makes a squeeze mechanically easy.
    if let (Some(float), Some(volume)) = (float_shares, avg_volume) {
        if volume > 0 && (float as f64 / volume as f64) < 1.0 {
            signals += 1;
        }
    }

    if market_cap.is_some_and(|cap| cap < config.squeeze_cap_threshold)
        && change_percent > config.squeeze_cap_move_percent
    {
        signals += 1;
    }

    signals
}

/// Detects risk flags that affect scoring and trade expression.
pub struct RiskDetector {
    config: RiskConfig,
}

impl RiskDetector {
    #[must_use]
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Detects all applicable risk flags for one ticker.
    ///
    /// `as_of` anchors the listing-age rule so results stay reproducible.
    #[must_use]
    pub fn detect(
        &self,
        ticker: &str,
        change_percent: Decimal,
        current_price: Decimal,
        fundamentals: Option<&Fundamentals>,
        technicals: Option<&TechnicalState>,
        catalyst: Option<&CatalystAssessment>,
        as_of: NaiveDate,
    ) -> BTreeSet<RiskFlag> {
        let change = change_percent.to_f64().unwrap_or(0.0);
        let mut flags = BTreeSet::new();

        if self.detect_high_squeeze(change, fundamentals) {
            flags.insert(RiskFlag::HighSqueeze);
        }

        if self.detect_extreme_volatility(change, fundamentals, technicals) {
            flags.insert(RiskFlag::ExtremeVolatility);
        }

        if self.detect_microcap(current_price, fundamentals) {
            flags.insert(RiskFlag::Microcap);
        }

        if self.detect_low_liquidity(fundamentals) {
            flags.insert(RiskFlag::LowLiquidity);
        }

        if self.detect_non_primary_exchange(fundamentals) {
            flags.insert(RiskFlag::NonPrimaryExchange);
        }

        if self.detect_new_listing(fundamentals, as_of) {
            flags.insert(RiskFlag::NewListing);
        }

        if catalyst.is_some_and(|c| c.justifies_repricing) {
            flags.insert(RiskFlag::FundamentalRepricing);
        }

        if is_warrant_ticker(ticker) {
            flags.insert(RiskFlag::Warrant);
        }

        tracing::debug!(ticker, ?flags, "risk flags detected");
        flags
    }

    fn detect_high_squeeze(&self, change: f64, fundamentals: Option<&Fundamentals>) -> bool {
        if change > self.config.squeeze_change_percent {
            return true;
        }

        let shares = fundamentals.and_then(|f| f.shares_outstanding);
        if shares.is_some_and(|s| s < self.config.squeeze_shares_outstanding) {
            return true;
        }

        let signals = squeeze_signal_count(
            &self.config,
            change,
            fundamentals.and_then(|f| f.market_cap),
            fundamentals.and_then(|f| f.float_shares),
            fundamentals
                .and_then(|f| f.beta)
                .and_then(|b| b.to_f64()),
            fundamentals.and_then(|f| f.avg_volume),
        );
        signals >= self.config.squeeze_signal_threshold
    }

    fn detect_extreme_volatility(
        &self,
        change: f64,
        fundamentals: Option<&Fundamentals>,
        technicals: Option<&TechnicalState>,
    ) -> bool {
        if change > self.config.volatility_change_percent {
            return true;
        }

        if let Some(state) = technicals {
            if let (Some(atr), Some(prior)) = (state.atr_daily, state.atr_prior) {
                if prior > Decimal::ZERO {
                    let expansion = (atr / prior).to_f64().unwrap_or(0.0);
                    if expansion > self.config.atr_expansion_multiple {
                        return true;
                    }
                }
            }
        }

        fundamentals
            .and_then(|f| f.beta)
            .and_then(|b| b.to_f64())
            .is_some_and(|b| b > self.config.high_beta)
    }

    fn detect_microcap(&self, price: Decimal, fundamentals: Option<&Fundamentals>) -> bool {
        let Some(cap) = fundamentals.and_then(|f| f.implied_market_cap(price)) else {
            return false;
        };
        cap < Decimal::from(self.config.microcap_market_cap)
    }

    fn detect_low_liquidity(&self, fundamentals: Option<&Fundamentals>) -> bool {
        fundamentals
            .and_then(|f| f.avg_volume)
            .is_some_and(|v| v < self.config.low_liquidity_volume)
    }

    fn detect_non_primary_exchange(&self, fundamentals: Option<&Fundamentals>) -> bool {
        fundamentals
            .and_then(|f| f.exchange.as_deref())
            .is_some_and(|e| {
                !e.to_uppercase()
                    .contains(&self.config.primary_exchange.to_uppercase())
            })
    }

    fn detect_new_listing(&self, fundamentals: Option<&Fundamentals>, as_of: NaiveDate) -> bool {
        fundamentals
            .and_then(|f| f.ipo_date)
            .is_some_and(|ipo| (as_of - ipo).num_days() <= self.config.new_listing_days)
    }
}
