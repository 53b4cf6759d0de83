//! Converts a catalyst assessment into a signed score adjustment.
//!
//! Negative adjustments mean worse for shorting (a real catalyst is behind
//! the move), positive mean better (the move looks hollow). The raw value is
//! scaled by classifier confidence and clamped to [-5, +3].

use rust_decimal::prelude::ToPrimitive;
use short_scan_core::{CatalystAssessment, CatalystType, SentimentLevel};

/// Lower clamp on the final adjustment.
pub const ADJUSTMENT_FLOOR: f64 = -5.0;
/// Upper clamp on the final adjustment.
pub const ADJUSTMENT_CEILING: f64 = 3.0;
/// Fixed adjustment when a big mover has no news at all.
pub const NO_NEWS_ADJUSTMENT: f64 = 0.5;

/// Base adjustment for the catalyst type.
#[must_use]
pub fn catalyst_adjustment(catalyst: CatalystType) -> f64 {
    match catalyst {
        // Fundamental repricing: dangerous to short.
        CatalystType::Earnings => -3.0,
        CatalystType::Fda => -4.0,
        CatalystType::MergerAcquisition => -5.0,
        CatalystType::Upgrade => -2.0,
        CatalystType::Contract => -1.5,
        CatalystType::ProductLaunch => -1.0,
        // A downgrade driving a move up is itself a short signal.
        CatalystType::Downgrade => 1.0,
        // Speculative catalysts: better short candidates.
        CatalystType::Speculative => 1.5,
        CatalystType::MemeSocial => 2.0,
        CatalystType::Unknown => 0.5,
    }
}

/// Additional adjustment for how the sentiment matches the move. Positive
/// sentiment on a spike is expected; mixed or negative sentiment on the same
/// spike is suspicious and favors the short.
#[must_use]
pub fn sentiment_adjustment(sentiment: SentimentLevel) -> f64 {
    match sentiment {
        SentimentLevel::StronglyPositive => -1.0,
        SentimentLevel::Positive => -0.5,
        SentimentLevel::Mixed => 0.5,
        SentimentLevel::Negative => 1.0,
        SentimentLevel::StronglyNegative => 1.5,
    }
}

/// Computes the (clamped, raw) score adjustment for an assessment.
#[must_use]
pub fn compute_score_adjustment(assessment: &CatalystAssessment) -> (f64, f64) {
    let mut raw = catalyst_adjustment(assessment.catalyst_type)
        + sentiment_adjustment(assessment.sentiment);

    if assessment.justifies_repricing {
        raw -= 2.0;
    }

    raw *= assessment.confidence.to_f64().unwrap_or(0.0);

    let capped = raw.clamp(ADJUSTMENT_FLOOR, ADJUSTMENT_CEILING);
    (capped, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn assessment(
        catalyst: CatalystType,
        sentiment: SentimentLevel,
        justifies: bool,
        confidence: Decimal,
    ) -> CatalystAssessment {
        CatalystAssessment {
            catalyst_type: catalyst,
            sentiment,
            summary: String::new(),
            justifies_repricing: justifies,
            confidence,
        }
    }

    #[test]
    fn fda_with_repricing_is_strongly_negative() {
        let a = assessment(
            CatalystType::Fda,
            SentimentLevel::StronglyPositive,
            true,
            dec!(0.5),
        );

        let (capped, raw) = compute_score_adjustment(&a);
        // (-4.0 - 1.0 - 2.0) * 0.5 = -3.5
        assert!((raw - (-3.5)).abs() < f64::EPSILON);
        assert!(capped <= -1.0);
    }

    #[test]
    fn meme_pump_is_positive() {
        let a = assessment(
            CatalystType::MemeSocial,
            SentimentLevel::Negative,
            false,
            dec!(1),
        );

        let (capped, _) = compute_score_adjustment(&a);
        // 2.0 + 1.0 = 3.0, right at the ceiling
        assert!((capped - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_confidence_zeroes_the_raw_adjustment() {
        let a = assessment(
            CatalystType::MergerAcquisition,
            SentimentLevel::StronglyPositive,
            true,
            dec!(0),
        );

        let (capped, raw) = compute_score_adjustment(&a);
        assert!((raw - 0.0).abs() < f64::EPSILON);
        assert!((capped - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn adjustment_is_clamped_to_floor() {
        let a = assessment(
            CatalystType::MergerAcquisition,
            SentimentLevel::StronglyPositive,
            true,
            dec!(1),
        );

        let (capped, raw) = compute_score_adjustment(&a);
        assert!((raw - (-8.0)).abs() < f64::EPSILON);
        assert!((capped - ADJUSTMENT_FLOOR).abs() < f64::EPSILON);
    }

    #[test]
    fn adjustment_is_clamped_to_ceiling() {
        let a = assessment(
            CatalystType::MemeSocial,
            SentimentLevel::StronglyNegative,
            false,
            dec!(1),
        );

        let (capped, raw) = compute_score_adjustment(&a);
        assert!((raw - 3.5).abs() < f64::EPSILON);
        assert!((capped - ADJUSTMENT_CEILING).abs() < f64::EPSILON);
    }

    #[test]
    fn every_combination_stays_in_clamp_range() {
        let catalysts = [
            CatalystType::Earnings,
            CatalystType::Fda,
            CatalystType::MergerAcquisition,
            CatalystType::Upgrade,
            CatalystType::Downgrade,
            CatalystType::Contract,
            CatalystType::ProductLaunch,
            CatalystType::Speculative,
            CatalystType::MemeSocial,
            CatalystType::Unknown,
        ];
        let sentiments = [
            SentimentLevel::StronglyPositive,
            SentimentLevel::Positive,
            SentimentLevel::Mixed,
            SentimentLevel::Negative,
            SentimentLevel::StronglyNegative,
        ];

        for catalyst in catalysts {
            for sentiment in sentiments {
                for justifies in [false, true] {
                    for confidence in [dec!(0), dec!(0.3), dec!(0.7), dec!(1)] {
                        let a = assessment(catalyst, sentiment, justifies, confidence);
                        let (capped, _) = compute_score_adjustment(&a);
                        assert!(
                            (ADJUSTMENT_FLOOR..=ADJUSTMENT_CEILING).contains(&capped),
                            "{catalyst:?}/{sentiment:?} gave {capped}"
                        );
                    }
                }
            }
        }
    }
}
