//! Keyword-based catalyst detection, used standalone or as the fallback when
//! the LLM classifier is unavailable or fails.

use crate::strategy::{CatalystStrategy, ClassifierError};
use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use short_scan_core::{CatalystAssessment, CatalystType, SentimentLevel};

const FDA_KEYWORDS: &[&str] = &["fda", "approval", "approved", "clinical", "trial", "phase"];
const MA_KEYWORDS: &[&str] = &[
    "merger",
    "acquisition",
    "acquire",
    "buyout",
    "takeover",
    "deal",
];
const EARNINGS_KEYWORDS: &[&str] = &[
    "earnings", "eps", "revenue", "profit", "beat", "miss", "guidance",
];
const UPGRADE_KEYWORDS: &[&str] = &["upgrade", "price target", "outperform", "buy rating"];
const CONTRACT_KEYWORDS: &[&str] = &["contract", "award", "partnership", "agreement", "deal"];
const MEME_KEYWORDS: &[&str] = &["reddit", "wsb", "squeeze", "moon", "apes", "yolo"];
const SPECULATIVE_KEYWORDS: &[&str] = &["potential", "could", "may", "exploring", "considering"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Keyword classifier. Groups are checked in a fixed priority order and the
/// first match wins; heuristics always carry confidence 0.5.
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classifies from headlines alone. Infallible: with no recognizable
    /// keywords the result is UNKNOWN with mixed sentiment.
    #[must_use]
    pub fn classify_headlines(
        &self,
        headlines: &[String],
        change_percent: Decimal,
    ) -> CatalystAssessment {
        let text = headlines.join(" ").to_lowercase();

        // Priority order: fundamental catalysts first, then speculative ones.
        let (catalyst_type, mut sentiment, justifies_repricing, summary) =
            if contains_any(&text, FDA_KEYWORDS) {
                (
                    CatalystType::Fda,
                    SentimentLevel::StronglyPositive,
                    true,
                    "FDA/clinical news detected",
                )
            } else if contains_any(&text, MA_KEYWORDS) {
                (
                    CatalystType::MergerAcquisition,
                    SentimentLevel::StronglyPositive,
                    true,
                    "M&A activity detected",
                )
            } else if contains_any(&text, EARNINGS_KEYWORDS) {
                (
                    CatalystType::Earnings,
                    SentimentLevel::Positive,
                    true,
                    "Earnings-related news detected",
                )
            } else if contains_any(&text, UPGRADE_KEYWORDS) {
                // Upgrades don't always justify a repricing.
                (
                    CatalystType::Upgrade,
                    SentimentLevel::Positive,
                    false,
                    "Analyst upgrade detected",
                )
            } else if contains_any(&text, CONTRACT_KEYWORDS) {
                // Depends on contract size.
                (
                    CatalystType::Contract,
                    SentimentLevel::Positive,
                    false,
                    "Contract/partnership news detected",
                )
            } else if contains_any(&text, MEME_KEYWORDS) {
                (
                    CatalystType::MemeSocial,
                    SentimentLevel::Mixed,
                    false,
                    "Social/meme activity detected",
                )
            } else if contains_any(&text, SPECULATIVE_KEYWORDS) {
                (
                    CatalystType::Speculative,
                    SentimentLevel::Mixed,
                    false,
                    "Speculative/vague PR detected",
                )
            } else {
                (
                    CatalystType::Unknown,
                    SentimentLevel::Mixed,
                    false,
                    "No clear catalyst identified",
                )
            };

        // A big move with no justifying catalyst is suspicious whatever the
        // headlines sounded like.
        let change = change_percent.to_f64().unwrap_or(0.0);
        if change > 50.0 && !justifies_repricing {
            sentiment = SentimentLevel::Mixed;
        }

        CatalystAssessment {
            catalyst_type,
            sentiment,
            summary: summary.to_string(),
            justifies_repricing,
            confidence: Decimal::new(5, 1),
        }
    }
}

#[async_trait]
impl CatalystStrategy for HeuristicClassifier {
    async fn classify(
        &self,
        _ticker: &str,
        change_percent: Decimal,
        headlines: &[String],
    ) -> Result<CatalystAssessment, ClassifierError> {
        Ok(self.classify_headlines(headlines, change_percent))
    }

    fn name(&self) -> &'static str {
        "heuristic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn classify(headlines: &[&str], change: Decimal) -> CatalystAssessment {
        let headlines: Vec<String> = headlines.iter().map(|s| (*s).to_string()).collect();
        HeuristicClassifier::new().classify_headlines(&headlines, change)
    }

    #[test]
    fn fda_headline_classifies_as_fda() {
        let assessment = classify(&["FDA Approves New Drug Treatment"], dec!(80));

        assert_eq!(assessment.catalyst_type, CatalystType::Fda);
        assert!(assessment.justifies_repricing);
        assert_eq!(assessment.confidence, dec!(0.5));
        assert_eq!(assessment.sentiment, SentimentLevel::StronglyPositive);
    }

    #[test]
    fn fda_outranks_merger_keywords() {
        let assessment = classify(
            &["Clinical trial results boost buyout speculation"],
            dec!(30),
        );
        assert_eq!(assessment.catalyst_type, CatalystType::Fda);
    }

    #[test]
    fn merger_outranks_earnings_keywords() {
        let assessment = classify(&["Acquisition rumored after strong revenue"], dec!(30));
        assert_eq!(assessment.catalyst_type, CatalystType::MergerAcquisition);
    }

    #[test]
    fn earnings_outranks_upgrade_keywords() {
        let assessment = classify(&["EPS beat prompts price target hike"], dec!(20));
        assert_eq!(assessment.catalyst_type, CatalystType::Earnings);
    }

    #[test]
    fn upgrade_outranks_contract_keywords() {
        let assessment = classify(&["Upgrade follows partnership news"], dec!(20));
        assert_eq!(assessment.catalyst_type, CatalystType::Upgrade);
    }

    #[test]
    fn contract_outranks_meme_keywords() {
        let assessment = classify(&["Contract win has reddit buzzing"], dec!(20));
        assert_eq!(assessment.catalyst_type, CatalystType::Contract);
    }

    #[test]
    fn meme_outranks_speculative_keywords() {
        let assessment = classify(&["WSB sees potential in this one"], dec!(20));
        assert_eq!(assessment.catalyst_type, CatalystType::MemeSocial);
    }

    #[test]
    fn vague_pr_classifies_as_speculative() {
        let assessment = classify(&["Company exploring strategic alternatives"], dec!(20));
        assert_eq!(assessment.catalyst_type, CatalystType::Speculative);
        assert!(!assessment.justifies_repricing);
    }

    #[test]
    fn unrecognized_headlines_are_unknown() {
        let assessment = classify(&["Stock rises"], dec!(20));
        assert_eq!(assessment.catalyst_type, CatalystType::Unknown);
        assert_eq!(assessment.sentiment, SentimentLevel::Mixed);
    }

    #[test]
    fn big_move_without_justification_forces_mixed_sentiment() {
        // Contract news is Positive at a 20% move...
        let small = classify(&["Major contract awarded"], dec!(20));
        assert_eq!(small.sentiment, SentimentLevel::Positive);

        // ...but Mixed when the move is outsized for the catalyst.
        let big = classify(&["Major contract awarded"], dec!(80));
        assert_eq!(big.sentiment, SentimentLevel::Mixed);
    }

    #[test]
    fn justified_catalyst_keeps_sentiment_on_big_move() {
        let assessment = classify(&["FDA approval granted"], dec!(80));
        assert_eq!(assessment.sentiment, SentimentLevel::StronglyPositive);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let assessment = classify(&["BUYOUT CONFIRMED AT PREMIUM"], dec!(40));
        assert_eq!(assessment.catalyst_type, CatalystType::MergerAcquisition);
    }
}
