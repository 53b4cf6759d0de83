//! Technical indicator calculations.
//!
//! All functions are pure and stateless: they take a [`PriceFrame`] and
//! return the most recent indicator value. Every indicator has a minimum
//! history requirement; below it the result is `None`, never an error.

use crate::frame::PriceFrame;
use rust_decimal::Decimal;
use short_scan_core::ObvTrend;

/// Rounds an `f64` into a `Decimal` with `dp` places, dropping NaN/inf.
fn round_decimal(value: f64, dp: u32) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok().map(|d| d.round_dp(dp))
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// EMA of `values` seeded with the SMA of the first `period` entries.
///
/// The result is aligned so that `out[0]` corresponds to input index
/// `period - 1`; empty when there is not enough history.
fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = mean(&values[..period]);

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        prev = alpha * value + (1.0 - alpha) * prev;
        out.push(prev);
    }

    out
}

// ============================================
// RSI
// ============================================

/// Most recent Wilder-smoothed RSI. Requires `period + 1` bars.
#[must_use]
pub fn current_rsi(frame: &PriceFrame, period: usize) -> Option<Decimal> {
    if period == 0 || frame.len() < period + 1 {
        return None;
    }

    let close = &frame.close;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    for i in 1..=period {
        let change = close[i] - close[i - 1];
        if change > 0.0 {
            gain_sum += change;
        } else {
            loss_sum -= change;
        }
    }

    let p = period as f64;
    let mut avg_gain = gain_sum / p;
    let mut avg_loss = loss_sum / p;

    for i in (period + 1)..close.len() {
        let change = close[i] - close[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
    }

    if avg_gain == 0.0 && avg_loss == 0.0 {
        // No movement at all in the window.
        return None;
    }

    let rsi = if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    };

    round_decimal(rsi, 2)
}

// ============================================
// MACD
// ============================================

/// MACD indicator values for the most recent bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdResult {
    pub line: Option<Decimal>,
    pub signal: Option<Decimal>,
    pub histogram: Option<Decimal>,
    /// True iff the last three histogram values are strictly decreasing.
    pub histogram_declining: bool,
}

/// Most recent MACD line/signal/histogram. Requires `slow + signal` bars.
#[must_use]
pub fn current_macd(frame: &PriceFrame, fast: usize, slow: usize, signal: usize) -> MacdResult {
    if fast == 0 || signal == 0 || fast >= slow || frame.len() < slow + signal {
        return MacdResult::default();
    }

    let close = &frame.close;
    let ema_fast = ema(close, fast);
    let ema_slow = ema(close, slow);

    // Both EMA vectors are aligned to their own start; the slow one begins
    // `slow - fast` entries later in the fast vector.
    let offset = slow - fast;
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .enumerate()
        .map(|(i, &s)| ema_fast[i + offset] - s)
        .collect();

    let signal_line = ema(&macd_line, signal);
    if signal_line.is_empty() {
        return MacdResult::default();
    }

    let histogram: Vec<f64> = signal_line
        .iter()
        .enumerate()
        .map(|(i, &s)| macd_line[i + signal - 1] - s)
        .collect();

    let n = histogram.len();
    let histogram_declining =
        n >= 3 && histogram[n - 1] < histogram[n - 2] && histogram[n - 2] < histogram[n - 3];

    MacdResult {
        line: macd_line.last().and_then(|&v| round_decimal(v, 4)),
        signal: signal_line.last().and_then(|&v| round_decimal(v, 4)),
        histogram: histogram.last().and_then(|&v| round_decimal(v, 4)),
        histogram_declining,
    }
}

// ============================================
// Bollinger Bands
// ============================================

/// Bollinger Band values for the most recent bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerResult {
    pub upper: Option<Decimal>,
    pub middle: Option<Decimal>,
    pub lower: Option<Decimal>,
    /// %B: 0 = at lower band, 1 = at upper band.
    pub percent_b: Option<Decimal>,
    pub price_above_upper: bool,
}

/// Most recent Bollinger Bands (SMA +/- `std_mult` population stdevs).
/// Requires `window` bars.
#[must_use]
pub fn current_bollinger(frame: &PriceFrame, window: usize, std_mult: f64) -> BollingerResult {
    if window == 0 || frame.len() < window {
        return BollingerResult::default();
    }

    let recent = &frame.close[frame.len() - window..];
    let middle = mean(recent);
    let variance = recent.iter().map(|c| (c - middle).powi(2)).sum::<f64>() / window as f64;
    let std_dev = variance.sqrt();

    let upper = middle + std_mult * std_dev;
    let lower = middle - std_mult * std_dev;
    let close = frame.close[frame.len() - 1];

    let width = upper - lower;
    let percent_b = if width > 0.0 {
        round_decimal((close - lower) / width, 4)
    } else {
        None
    };

    BollingerResult {
        upper: round_decimal(upper, 4),
        middle: round_decimal(middle, 4),
        lower: round_decimal(lower, 4),
        percent_b,
        price_above_upper: close > upper,
    }
}

// ============================================
// ATR
// ============================================

/// Most recent ATR plus the immediately preceding value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtrResult {
    pub current: Option<Decimal>,
    /// ATR one bar earlier, used by the volatility-expansion risk rule.
    pub prior: Option<Decimal>,
}

/// Wilder-smoothed ATR. Requires `period + 1` bars; the prior value needs
/// one more.
#[must_use]
pub fn current_atr(frame: &PriceFrame, period: usize) -> AtrResult {
    if period == 0 || frame.len() < period + 1 {
        return AtrResult::default();
    }

    let mut true_ranges = Vec::with_capacity(frame.len() - 1);
    for i in 1..frame.len() {
        let prev_close = frame.close[i - 1];
        let tr = (frame.high[i] - frame.low[i])
            .max((frame.high[i] - prev_close).abs())
            .max((frame.low[i] - prev_close).abs());
        true_ranges.push(tr);
    }

    let p = period as f64;
    let mut atr = mean(&true_ranges[..period]);
    let mut prior = None;

    for &tr in &true_ranges[period..] {
        prior = Some(atr);
        atr = (atr * (p - 1.0) + tr) / p;
    }

    AtrResult {
        current: round_decimal(atr, 4),
        prior: prior.and_then(|v| round_decimal(v, 4)),
    }
}

/// ATR as a percentage of the most recent close.
#[must_use]
pub fn atr_percent(atr: Option<Decimal>, frame: &PriceFrame) -> Option<Decimal> {
    use rust_decimal::prelude::ToPrimitive;

    let atr = atr?.to_f64()?;
    let close = frame.last_close()?;
    if close == 0.0 {
        return None;
    }
    round_decimal(atr / close * 100.0, 2)
}

// ============================================
// OBV
// ============================================

fn obv_series(frame: &PriceFrame) -> Vec<f64> {
    let mut out = Vec::with_capacity(frame.len());
    let mut obv = 0.0;
    for i in 0..frame.len() {
        if i == 0 {
            obv = frame.volume[0];
        } else if frame.close[i] > frame.close[i - 1] {
            obv += frame.volume[i];
        } else if frame.close[i] < frame.close[i - 1] {
            obv -= frame.volume[i];
        }
        out.push(obv);
    }
    out
}

/// OBV trend over the last `lookback` bars, from the sign of a least-squares
/// slope normalized by the window's OBV range.
#[must_use]
pub fn obv_trend(frame: &PriceFrame, lookback: usize) -> Option<ObvTrend> {
    if lookback < 2 || frame.len() < 2 {
        return None;
    }

    let obv = obv_series(frame);
    if obv.len() < lookback {
        return None;
    }

    let recent = &obv[obv.len() - lookback..];
    let n = lookback as f64;
    let x_mean = (n - 1.0) / 2.0;
    let y_mean = mean(recent);

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, &y) in recent.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    let slope = num / den;

    let min = recent.iter().copied().fold(f64::INFINITY, f64::min);
    let max = recent.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return Some(ObvTrend::Flat);
    }

    let normalized = slope / (range / n);
    if normalized > 0.1 {
        Some(ObvTrend::Rising)
    } else if normalized < -0.1 {
        Some(ObvTrend::Falling)
    } else {
        Some(ObvTrend::Flat)
    }
}

// ============================================
// ROC and volume analysis
// ============================================

/// Percentage rate of change over `period` bars. Requires `period + 1` bars.
#[must_use]
pub fn current_roc(frame: &PriceFrame, period: usize) -> Option<Decimal> {
    if period == 0 || frame.len() < period + 1 {
        return None;
    }

    let close = frame.close[frame.len() - 1];
    let base = frame.close[frame.len() - 1 - period];
    if base == 0.0 {
        return None;
    }

    round_decimal((close - base) / base * 100.0, 2)
}

/// Last bar volume as a multiple of the trailing `period`-bar average
/// (current bar included in the average).
#[must_use]
pub fn volume_vs_average(frame: &PriceFrame, period: usize) -> Option<Decimal> {
    if period == 0 || frame.len() < period {
        return None;
    }

    let avg = mean(&frame.volume[frame.len() - period..]);
    if avg == 0.0 {
        return None;
    }

    round_decimal(frame.volume[frame.len() - 1] / avg, 2)
}

/// Whether volume confirms the price move over the last `lookback` bars.
///
/// Rising volume counts as confirmation for either price direction: buyers
/// pressing an up move or sellers pressing a down move. Falling volume on an
/// up move is the divergence the volume score rewards.
#[must_use]
pub fn volume_confirms_price(frame: &PriceFrame, lookback: usize) -> bool {
    if lookback < 2 || frame.len() < lookback {
        // Default to confirming when there is not enough history to judge.
        return true;
    }

    let volume_change =
        frame.volume[frame.len() - 1] - frame.volume[frame.len() - lookback];
    volume_change > 0.0
}

// ============================================
// Pattern detection
// ============================================

/// Detects a lower-high pattern in the last `lookback` bars: at least two
/// local maxima with the most recent peak below the prior one.
#[must_use]
pub fn detect_lower_high(frame: &PriceFrame, lookback: usize) -> bool {
    if lookback < 3 || frame.len() < lookback {
        return false;
    }

    let highs = &frame.high[frame.len() - lookback..];
    let mut peaks = Vec::new();
    for i in 1..highs.len() - 1 {
        if highs[i] > highs[i - 1] && highs[i] > highs[i + 1] {
            peaks.push(highs[i]);
        }
    }

    peaks.len() >= 2 && peaks[peaks.len() - 1] < peaks[peaks.len() - 2]
}

/// Detects an exhaustion candle on the most recent bar.
///
/// All four conditions must hold: range > 1.5x the 20-bar average range,
/// upper wick > 40% of the range, close in the lower half of the range, and
/// volume > 1.5x the 20-bar average volume.
#[must_use]
pub fn detect_exhaustion_candle(frame: &PriceFrame) -> bool {
    const WINDOW: usize = 20;

    if frame.len() < WINDOW {
        return false;
    }

    let last = frame.len() - 1;
    let start = frame.len() - WINDOW;

    let avg_range = mean(
        &(start..frame.len())
            .map(|i| frame.high[i] - frame.low[i])
            .collect::<Vec<_>>(),
    );
    let current_range = frame.high[last] - frame.low[last];
    if current_range < avg_range * 1.5 {
        return false;
    }

    let body_top = frame.open[last].max(frame.close[last]);
    let upper_wick = frame.high[last] - body_top;
    let wick_ratio = if current_range > 0.0 {
        upper_wick / current_range
    } else {
        0.0
    };
    if wick_ratio < 0.4 {
        return false;
    }

    let close_position = if current_range > 0.0 {
        (frame.close[last] - frame.low[last]) / current_range
    } else {
        0.5
    };
    if close_position > 0.5 {
        return false;
    }

    let avg_volume = mean(&frame.volume[start..]);
    frame.volume[last] >= avg_volume * 1.5
}
