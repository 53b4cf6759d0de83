pub mod pipeline;
pub mod prefilter;
pub mod ranking;
pub mod risk;
pub mod warrant;

pub use pipeline::{AnalysisPipeline, BatchOutcome, SkippedTicker, TickerSnapshot};
pub use prefilter::{Prefilter, PrefilterOutcome};
pub use ranking::{
    compute_risk_penalty, has_dangerous_combination, penalty_for_flag, sort_and_dedupe,
    summarize_rankings, RankingEngine, RankingInput, RankingSummary,
};
pub use risk::RiskDetector;
pub use warrant::{expand_warrant_tickers, is_warrant_ticker, underlying_ticker};
