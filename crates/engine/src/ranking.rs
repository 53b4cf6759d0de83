//! Final scoring and trade-expression selection.
//!
//! `final = clamp(technical + sentiment adjustment - risk penalties, 0, 10)`,
//! then a fixed decision table picks the expression. Batch ranking sorts by
//! final score descending with ticker ascending as the tie-break, and
//! deduplicates by ticker.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use short_scan_catalyst::SentimentOutcome;
use short_scan_core::{
    Fundamentals, KeyLevels, RankingConfig, RiskFlag, ShortCandidate, TechnicalState,
    TradeExpression,
};
use std::collections::{BTreeMap, BTreeSet};

/// Score penalty for a risk flag. Exhaustive on purpose: adding a flag
/// without deciding its penalty must not compile.
#[must_use]
pub fn penalty_for_flag(flag: RiskFlag) -> f64 {
    match flag {
        RiskFlag::HighSqueeze => 2.0,
        RiskFlag::ExtremeVolatility => 1.5,
        RiskFlag::FundamentalRepricing => 3.0,
        RiskFlag::Microcap => 1.0,
        RiskFlag::LowLiquidity => 0.5,
        RiskFlag::NonPrimaryExchange => 0.5,
        RiskFlag::NewListing => 1.0,
        RiskFlag::Warrant => 0.5,
        RiskFlag::None => 0.0,
    }
}

/// Total penalty over a flag set. The set type guarantees each flag is
/// counted once.
#[must_use]
pub fn compute_risk_penalty(flags: &BTreeSet<RiskFlag>) -> f64 {
    flags.iter().copied().map(penalty_for_flag).sum()
}

/// Flag combinations too dangerous to short in any form.
#[must_use]
pub fn has_dangerous_combination(flags: &BTreeSet<RiskFlag>) -> bool {
    let combos: [&[RiskFlag]; 3] = [
        &[RiskFlag::Microcap, RiskFlag::HighSqueeze],
        &[RiskFlag::HighSqueeze, RiskFlag::ExtremeVolatility],
        &[
            RiskFlag::Microcap,
            RiskFlag::HighSqueeze,
            RiskFlag::LowLiquidity,
        ],
    ];

    combos
        .iter()
        .any(|combo| combo.iter().all(|flag| flags.contains(flag)))
}

/// Everything the ranking step needs for one ticker.
#[derive(Debug, Clone)]
pub struct RankingInput {
    pub ticker: String,
    pub current_price: Decimal,
    pub change_percent: Decimal,
    pub tech_score: Decimal,
    pub tech_state: TechnicalState,
    pub sentiment: SentimentOutcome,
    pub risk_flags: BTreeSet<RiskFlag>,
    pub key_levels: KeyLevels,
    pub fundamentals: Option<Fundamentals>,
    pub is_warrant: bool,
}

/// Summary statistics over a ranked batch.
#[derive(Debug, Clone, Default)]
pub struct RankingSummary {
    pub total: usize,
    pub avg_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    pub actionable: usize,
    pub avoid: usize,
    pub by_expression: BTreeMap<&'static str, usize>,
}

/// Combines scores, flags, and sentiment into ranked candidates.
pub struct RankingEngine {
    config: RankingConfig,
}

impl RankingEngine {
    #[must_use]
    pub fn new(config: RankingConfig) -> Self {
        Self { config }
    }

    /// Picks the trade expression. This is a decision table evaluated in
    /// priority order; the first matching rule wins.
    #[must_use]
    pub fn determine_expression(
        &self,
        final_score: f64,
        flags: &BTreeSet<RiskFlag>,
        beta: Option<Decimal>,
        sentiment: &SentimentOutcome,
    ) -> TradeExpression {
        // 1. Dangerous flag combinations.
        if has_dangerous_combination(flags) {
            return TradeExpression::Avoid;
        }

        // 2. High-confidence fundamental repricing.
        if sentiment.is_fundamental_repricing()
            && sentiment.assessment.confidence.to_f64().unwrap_or(0.0)
                >= self.config.repricing_confidence_avoid
        {
            return TradeExpression::Avoid;
        }

        // 3. Not enough edge.
        if final_score < self.config.avoid_score_cutoff {
            return TradeExpression::Avoid;
        }

        // 4. Squeeze risk: defined-risk long premium only.
        if flags.contains(&RiskFlag::HighSqueeze) {
            return TradeExpression::BuyPuts;
        }

        // 5. Volatility: spreads keep the debit sane.
        if flags.contains(&RiskFlag::ExtremeVolatility) {
            return TradeExpression::PutSpreads;
        }

        // 6. Beta gates direct shorting.
        if let Some(beta) = beta.and_then(|b| b.to_f64()) {
            if beta > self.config.max_beta_for_shares * 1.5 {
                return TradeExpression::Avoid;
            }
            if beta > self.config.max_beta_for_shares {
                return TradeExpression::BuyPuts;
            }
        }

        // 7. Microcap alone: prefer defined risk.
        if flags.contains(&RiskFlag::Microcap) {
            return TradeExpression::PutSpreads;
        }

        // 8. Clean setup.
        TradeExpression::ShortShares
    }

    /// Scores one candidate and freezes the result into a `ShortCandidate`.
    #[must_use]
    pub fn rank_candidate(&self, input: RankingInput) -> ShortCandidate {
        let mut flags = input.risk_flags;

        // The sentiment pass can discover repricing the detector has not
        // seen; the set makes the merge idempotent.
        if input.sentiment.is_fundamental_repricing() {
            flags.insert(RiskFlag::FundamentalRepricing);
        }
        flags.remove(&RiskFlag::None);

        let tech = input.tech_score.to_f64().unwrap_or(0.0);
        let adjustment = input.sentiment.score_adjustment;
        let penalty = compute_risk_penalty(&flags);

        let final_score = (tech + adjustment - penalty).clamp(0.0, 10.0);

        let beta = input.fundamentals.as_ref().and_then(|f| f.beta);
        let expression = self.determine_expression(final_score, &flags, beta, &input.sentiment);

        if flags.is_empty() {
            flags.insert(RiskFlag::None);
        }

        tracing::debug!(
            ticker = %input.ticker,
            final_score,
            expression = expression.as_str(),
            "candidate ranked"
        );

        ShortCandidate {
            ticker: input.ticker,
            current_price: input.current_price,
            change_percent: input.change_percent,
            tech_score: input.tech_score,
            news_adjustment: Decimal::try_from(adjustment)
                .unwrap_or(Decimal::ZERO)
                .round_dp(2),
            risk_penalty: Decimal::try_from(penalty)
                .unwrap_or(Decimal::ZERO)
                .round_dp(2),
            final_score: Decimal::try_from(final_score)
                .unwrap_or(Decimal::ZERO)
                .round_dp(1),
            technical_state: input.tech_state,
            news_assessment: input.sentiment.assessment,
            risk_flags: flags,
            preferred_expression: expression,
            key_levels: input.key_levels,
            market_cap: input.fundamentals.as_ref().and_then(|f| f.market_cap),
            avg_volume: input.fundamentals.as_ref().and_then(|f| f.avg_volume),
            sector: input.fundamentals.and_then(|f| f.sector),
            is_warrant: input.is_warrant,
        }
    }

    /// Ranks a batch: best shorts first, ties broken by ticker ascending so
    /// runs are reproducible, duplicates collapsed to their best-scoring
    /// instance.
    #[must_use]
    pub fn rank_batch(&self, inputs: Vec<RankingInput>) -> Vec<ShortCandidate> {
        let candidates = inputs
            .into_iter()
            .map(|input| self.rank_candidate(input))
            .collect();

        sort_and_dedupe(candidates)
    }

    /// Candidates worth reporting: above the minimum score and, by default,
    /// excluding AVOID.
    #[must_use]
    pub fn top_candidates<'a>(
        &self,
        ranked: &'a [ShortCandidate],
        exclude_avoid: bool,
    ) -> Vec<&'a ShortCandidate> {
        let min_score = Decimal::try_from(self.config.min_report_score).unwrap_or(Decimal::ZERO);

        ranked
            .iter()
            .filter(|c| c.final_score >= min_score)
            .filter(|c| !exclude_avoid || c.preferred_expression != TradeExpression::Avoid)
            .collect()
    }
}

/// Sorts candidates best-first (final score descending, ticker ascending as
/// the deterministic tie-break) and keeps one candidate per ticker.
#[must_use]
pub fn sort_and_dedupe(mut candidates: Vec<ShortCandidate>) -> Vec<ShortCandidate> {
    candidates.sort_by(|a, b| {
        b.final_score
            .cmp(&a.final_score)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });

    let mut seen = BTreeSet::new();
    candidates.retain(|c| seen.insert(c.ticker.clone()));

    candidates
}

/// Summary statistics for a ranked batch.
#[must_use]
pub fn summarize_rankings(candidates: &[ShortCandidate]) -> RankingSummary {
    if candidates.is_empty() {
        return RankingSummary::default();
    }

    let scores: Vec<f64> = candidates
        .iter()
        .map(|c| c.final_score.to_f64().unwrap_or(0.0))
        .collect();

    let mut by_expression: BTreeMap<&'static str, usize> = BTreeMap::new();
    for candidate in candidates {
        *by_expression
            .entry(candidate.preferred_expression.as_str())
            .or_insert(0) += 1;
    }

    let avoid = by_expression
        .get(TradeExpression::Avoid.as_str())
        .copied()
        .unwrap_or(0);

    RankingSummary {
        total: candidates.len(),
        avg_score: scores.iter().sum::<f64>() / scores.len() as f64,
        max_score: scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min_score: scores.iter().copied().fold(f64::INFINITY, f64::min),
        actionable: candidates.len() - avoid,
        avoid,
        by_expression,
    }
}
