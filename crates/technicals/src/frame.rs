//! Column-oriented view of an OHLCV series for indicator math.
//!
//! Bars are sorted ascending by timestamp on construction, so windowed
//! calculations never depend on the order the ingestion layer delivered them
//! in. Prices are widened to `f64` here; results are rounded back to
//! `Decimal` at the indicator boundary.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use short_scan_core::OhlcvSeries;

/// Price/volume columns in ascending time order (oldest first).
#[derive(Debug, Clone, Default)]
pub struct PriceFrame {
    pub timestamps: Vec<DateTime<Utc>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl PriceFrame {
    #[must_use]
    pub fn from_series(series: &OhlcvSeries) -> Self {
        let bars = series.sorted_ascending();
        let mut frame = Self {
            timestamps: Vec::with_capacity(bars.len()),
            open: Vec::with_capacity(bars.len()),
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
            volume: Vec::with_capacity(bars.len()),
        };

        for bar in &bars {
            frame.timestamps.push(bar.timestamp);
            frame.open.push(bar.open.to_f64().unwrap_or(f64::NAN));
            frame.high.push(bar.high.to_f64().unwrap_or(f64::NAN));
            frame.low.push(bar.low.to_f64().unwrap_or(f64::NAN));
            frame.close.push(bar.close.to_f64().unwrap_or(f64::NAN));
            frame.volume.push(bar.volume as f64);
        }

        frame
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.close.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// Close of the most recent bar, if any.
    #[must_use]
    pub fn last_close(&self) -> Option<f64> {
        self.close.last().copied()
    }
}
