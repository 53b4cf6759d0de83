//! Technical scoring for short candidates.
//!
//! Combines the indicator snapshot into a single 0-10 score where 10 is
//! extremely overbought (high probability of a pullback) and 0 is a strong,
//! confirmed uptrend with no short edge. Each component is bounded; missing
//! inputs contribute 0 to their component.

use crate::frame::PriceFrame;
use crate::indicators::{
    atr_percent, current_atr, current_bollinger, current_macd, current_roc, current_rsi,
    detect_exhaustion_candle, detect_lower_high, obv_trend, volume_confirms_price,
    volume_vs_average,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use short_scan_core::{OhlcvSeries, TechnicalConfig, TechnicalState};

/// Maximum total technical score.
pub const MAX_TECHNICAL_SCORE: f64 = 10.0;

/// Detailed breakdown of the technical score components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub rsi_score: f64,
    pub bollinger_score: f64,
    pub macd_score: f64,
    pub volume_score: f64,
    pub momentum_score: f64,
    pub pattern_score: f64,
    pub total_score: f64,
}

impl ScoreBreakdown {
    /// Compact single-line rendering for logs and reports.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "RSI={:.1} BB={:.1} MACD={:.1} VOL={:.1} MOM={:.1} PAT={:.1} TOTAL={:.1}",
            self.rsi_score,
            self.bollinger_score,
            self.macd_score,
            self.volume_score,
            self.momentum_score,
            self.pattern_score,
            self.total_score,
        )
    }
}

fn as_f64(value: Option<Decimal>) -> Option<f64> {
    value.and_then(|v| v.to_f64())
}

// ============================================
// Component scores
// ============================================

/// RSI component, 0.0 to 2.0. Higher RSI = more overbought = higher score.
#[must_use]
pub fn score_rsi(rsi: Option<Decimal>) -> f64 {
    let Some(rsi) = as_f64(rsi) else {
        return 0.0;
    };

    if rsi >= 90.0 {
        2.0
    } else if rsi >= 80.0 {
        1.7
    } else if rsi >= 70.0 {
        1.3
    } else if rsi >= 60.0 {
        0.8
    } else if rsi >= 50.0 {
        0.3
    } else {
        0.0
    }
}

/// Bollinger component, 0.0 to 2.0. Price above the upper band is maximally
/// overextended; otherwise %B position sets the step.
#[must_use]
pub fn score_bollinger(price_above_upper: bool, percent_b: Option<Decimal>) -> f64 {
    if price_above_upper {
        return 2.0;
    }

    let Some(pct_b) = as_f64(percent_b) else {
        return 0.0;
    };

    if pct_b >= 0.95 {
        1.7
    } else if pct_b >= 0.80 {
        1.3
    } else if pct_b >= 0.60 {
        0.7
    } else if pct_b >= 0.50 {
        0.3
    } else {
        0.0
    }
}

/// MACD component, 0.0 to 1.5. A fading histogram after a run-up means the
/// momentum behind the move is draining.
#[must_use]
pub fn score_macd(
    line: Option<Decimal>,
    signal: Option<Decimal>,
    histogram: Option<Decimal>,
    histogram_declining: bool,
) -> f64 {
    let Some(hist) = as_f64(histogram) else {
        return 0.0;
    };

    let mut score = 0.0;

    if histogram_declining {
        score += 0.8;
    }

    // Positive but shrinking histogram: momentum weakening.
    if hist > 0.0 && hist < 0.1 {
        score += 0.4;
    }

    // Bearish crossover.
    if let (Some(line), Some(signal)) = (as_f64(line), as_f64(signal)) {
        if line < signal {
            score += 0.3;
        }
    }

    score.min(1.5)
}

/// Volume component, 0.0 to 1.5. Divergence (price up, volume fading) and
/// thin relative volume both mean weak conviction behind the move.
#[must_use]
pub fn score_volume(volume_vs_avg: Option<Decimal>, volume_confirming: bool) -> f64 {
    let mut score = 0.0;

    if !volume_confirming {
        score += 1.0;
    }

    if let Some(ratio) = as_f64(volume_vs_avg) {
        if ratio < 0.7 {
            score += 0.5;
        } else if ratio < 1.0 {
            score += 0.2;
        }
    }

    score.min(1.5)
}

/// Momentum component, 0.0 to 1.5. Parabolic rate-of-change readings plus a
/// deceleration bonus when the 1-day pace has dropped below the 5-day pace.
#[must_use]
pub fn score_momentum(roc_1d: Option<Decimal>, roc_5d: Option<Decimal>) -> f64 {
    let mut score = 0.0;
    let r1 = as_f64(roc_1d);
    let r5 = as_f64(roc_5d);

    if let Some(r1) = r1 {
        if r1 >= 50.0 {
            score += 0.6;
        } else if r1 >= 30.0 {
            score += 0.4;
        } else if r1 >= 20.0 {
            score += 0.2;
        }
    }

    if let Some(r5) = r5 {
        if r5 >= 100.0 {
            score += 0.6;
        } else if r5 >= 50.0 {
            score += 0.4;
        } else if r5 >= 30.0 {
            score += 0.2;
        }
    }

    // Deceleration: today's pace under 60% of the 5-day per-day pace.
    if let (Some(r1), Some(r5)) = (r1, r5) {
        if r5 > 0.0 && r1 < r5 / 5.0 * 0.6 {
            score += 0.3;
        }
    }

    score.min(1.5)
}

/// Pattern component, 0.0 to 1.5.
#[must_use]
pub fn score_patterns(lower_high: bool, exhaustion: bool) -> f64 {
    let mut score = 0.0;

    if lower_high {
        score += 0.8;
    }

    if exhaustion {
        score += 0.7;
    }

    score.min(1.5)
}

// ============================================
// Full scoring
// ============================================

/// Scores a technical snapshot. The six component maxima sum past 10, so the
/// final clamp binds on extreme setups.
#[must_use]
pub fn score_technical_state(state: &TechnicalState) -> ScoreBreakdown {
    // Daily RSI anchors the component; an intraday reading can only raise it.
    let rsi_for_scoring = match (state.rsi_daily, state.rsi_intraday) {
        (Some(daily), Some(intraday)) => Some(daily.max(intraday)),
        (daily, _) => daily,
    };

    let mut breakdown = ScoreBreakdown {
        rsi_score: score_rsi(rsi_for_scoring),
        bollinger_score: score_bollinger(state.price_above_upper_band, state.bollinger_position),
        macd_score: score_macd(
            state.macd_line,
            state.macd_signal,
            state.macd_histogram,
            state.macd_histogram_declining,
        ),
        volume_score: score_volume(state.volume_vs_avg, state.volume_confirming_price),
        momentum_score: score_momentum(state.roc_1d, state.roc_5d),
        pattern_score: score_patterns(state.lower_high_forming, state.exhaustion_candle),
        total_score: 0.0,
    };

    breakdown.total_score = (breakdown.rsi_score
        + breakdown.bollinger_score
        + breakdown.macd_score
        + breakdown.volume_score
        + breakdown.momentum_score
        + breakdown.pattern_score)
        .min(MAX_TECHNICAL_SCORE);

    breakdown
}

/// Builds the full technical snapshot from a daily series plus an optional
/// intraday series.
///
/// Intraday data sharpens the snapshot where available: intraday RSI is
/// recorded alongside the daily reading, and the pattern flags fire if the
/// pattern shows up on either timeframe.
#[must_use]
pub fn analyze_series(
    daily: &OhlcvSeries,
    intraday: Option<&OhlcvSeries>,
    config: &TechnicalConfig,
) -> TechnicalState {
    let daily_frame = PriceFrame::from_series(daily);
    let intraday_frame = intraday
        .filter(|s| !s.is_empty())
        .map(PriceFrame::from_series);

    let macd = current_macd(
        &daily_frame,
        config.macd_fast,
        config.macd_slow,
        config.macd_signal,
    );
    let bb = current_bollinger(&daily_frame, config.bollinger_window, config.bollinger_std);
    let atr = current_atr(&daily_frame, config.atr_period);

    let mut lower_high = detect_lower_high(&daily_frame, 10);
    let mut exhaustion = detect_exhaustion_candle(&daily_frame);
    if let Some(intra) = &intraday_frame {
        lower_high = lower_high || detect_lower_high(intra, 20);
        exhaustion = exhaustion || detect_exhaustion_candle(intra);
    }

    TechnicalState {
        rsi_daily: current_rsi(&daily_frame, config.rsi_period),
        rsi_intraday: intraday_frame
            .as_ref()
            .and_then(|f| current_rsi(f, config.rsi_period)),
        macd_line: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        macd_histogram_declining: macd.histogram_declining,
        bollinger_upper: bb.upper,
        bollinger_middle: bb.middle,
        bollinger_lower: bb.lower,
        bollinger_position: bb.percent_b,
        price_above_upper_band: bb.price_above_upper,
        atr_percent: atr_percent(atr.current, &daily_frame),
        atr_daily: atr.current,
        atr_prior: atr.prior,
        obv_trend: obv_trend(&daily_frame, 5),
        volume_vs_avg: volume_vs_average(&daily_frame, 20),
        volume_confirming_price: volume_confirms_price(&daily_frame, 5),
        roc_1d: current_roc(&daily_frame, 1),
        roc_3d: current_roc(&daily_frame, 3),
        roc_5d: current_roc(&daily_frame, 5),
        lower_high_forming: lower_high,
        exhaustion_candle: exhaustion,
    }
}

/// Full technical analysis: snapshot, breakdown, and the rounded 0-10 score.
#[must_use]
pub fn compute_technical_score(
    daily: &OhlcvSeries,
    intraday: Option<&OhlcvSeries>,
    config: &TechnicalConfig,
) -> (Decimal, ScoreBreakdown, TechnicalState) {
    let state = analyze_series(daily, intraday, config);
    let breakdown = score_technical_state(&state);

    tracing::debug!(
        ticker = %daily.ticker,
        breakdown = %breakdown.summary(),
        "technical score computed"
    );

    let score = Decimal::try_from(breakdown.total_score)
        .unwrap_or(Decimal::ZERO)
        .round_dp(1);

    (score, breakdown, state)
}
