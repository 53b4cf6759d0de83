pub mod frame;
pub mod indicators;
pub mod scoring;

pub use frame::PriceFrame;
pub use indicators::{AtrResult, BollingerResult, MacdResult};
pub use scoring::{
    analyze_series, compute_technical_score, score_technical_state, ScoreBreakdown,
    MAX_TECHNICAL_SCORE,
};
