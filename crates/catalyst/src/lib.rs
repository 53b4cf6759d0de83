pub mod adjuster;
pub mod analyzer;
pub mod heuristic;
pub mod llm;
pub mod strategy;

pub use adjuster::{
    catalyst_adjustment, compute_score_adjustment, sentiment_adjustment, ADJUSTMENT_CEILING,
    ADJUSTMENT_FLOOR, NO_NEWS_ADJUSTMENT,
};
pub use analyzer::{AnalysisSource, CatalystAnalyzer, SentimentOutcome};
pub use heuristic::HeuristicClassifier;
pub use llm::LlmClassifier;
pub use strategy::{CatalystStrategy, ClassifierError};
