pub mod candidate;
pub mod config;
pub mod config_loader;
pub mod market;

pub use candidate::{
    CatalystAssessment, CatalystType, FilteredTicker, KeyLevels, ObvTrend, RiskFlag,
    SentimentLevel, ShortCandidate, TechnicalState, TradeExpression,
};
pub use config::{
    AppConfig, CatalystConfig, PrefilterConfig, RankingConfig, RiskConfig, TechnicalConfig,
};
pub use config_loader::ConfigLoader;
pub use market::{Fundamentals, Interval, NewsFeed, NewsItem, OhlcvBar, OhlcvSeries};
