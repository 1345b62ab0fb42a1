//! Hybrid rule-based + model-based risk scoring.
//!
//! Rules are evaluated in a fixed priority order and their points are
//! additive; the ML contribution is added last, and the total is clamped
//! to 0..=100. Scoring is deterministic and side-effect free.

use crate::config::ScoringConfig;
use crate::features::{is_round_amount, sanitize_amount, ROUND_UNIT};
use crate::types::Transaction;

/// Combines rule points and the anomaly measure into a 0-100 risk score.
pub struct RiskScorer {
    config: ScoringConfig,
}

impl RiskScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score a transaction given the anomaly measure from the model.
    ///
    /// The anomaly convention follows the isolation-forest decision
    /// function: negative values signal an outlier. Pass 0.0 when no model
    /// output is available (rules-only scoring).
    ///
    /// Returns the clamped score and every triggered rule label in
    /// evaluation order. A score of 0 always has an empty flag list; a rule
    /// configured to 0 points contributes neither points nor a flag.
    pub fn score(&self, tx: &Transaction, anomaly: f64) -> (u8, Vec<String>) {
        let points = &self.config.point_values;
        let value = sanitize_amount(tx.value);

        let mut total: u32 = 0;
        let mut flags = Vec::new();
        let mut apply = |triggered: bool, rule_points: u32, label: &str| {
            if triggered && rule_points > 0 {
                total = total.saturating_add(rule_points);
                flags.push(label.to_string());
            }
        };

        apply(
            value > self.config.large_amount_threshold,
            points.large_amount,
            "Large Amount",
        );
        apply(
            value >= self.config.medium_amount_threshold
                && value <= self.config.large_amount_threshold,
            points.medium_amount,
            "Medium Amount",
        );
        // Zero-value transfers move nothing, so they are not dust.
        apply(
            value > 0.0 && value < self.config.dust_threshold,
            points.dust,
            "Dust Transaction",
        );
        apply(tx.is_error, points.transaction_error, "Transaction Error");
        apply(
            is_round_amount(value, ROUND_UNIT),
            points.round_amount,
            "Round Amount",
        );
        apply(
            !tx.from.is_empty() && tx.from.eq_ignore_ascii_case(&tx.to),
            points.self_transfer,
            "Self Transfer",
        );

        if anomaly < 0.0 {
            // Whole points only: a contribution that floors to 0 adds
            // neither points nor a flag, so a score of 0 keeps an empty
            // flag list.
            let ml = (anomaly.abs() * points.ml_multiplier)
                .min(points.ml_cap as f64)
                .floor() as u32;
            if ml > 0 {
                total = total.saturating_add(ml);
                flags.push("ML Anomaly".to_string());
            }
        }

        (total.min(100) as u8, flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> RiskScorer {
        RiskScorer::new(ScoringConfig::default())
    }

    fn tx(value: f64) -> Transaction {
        Transaction::new("0xabc", "0xaaa", "0xbbb").with_value(value)
    }

    #[test]
    fn test_large_amount_only() {
        // amount=15: large amount rule alone, 30 points
        let (score, flags) = scorer().score(&tx(15.0), 0.0);
        assert_eq!(score, 30);
        assert_eq!(flags, vec!["Large Amount"]);
    }

    #[test]
    fn test_medium_amount_boundaries_inclusive() {
        let (score, flags) = scorer().score(&tx(1.0), 0.0);
        assert_eq!(score, 15);
        assert_eq!(flags, vec!["Medium Amount"]);

        // 10 is medium and a round multiple of the round unit
        let (score, flags) = scorer().score(&tx(10.0), 0.0);
        assert_eq!(score, 30);
        assert_eq!(flags, vec!["Medium Amount", "Round Amount"]);
    }

    #[test]
    fn test_dust_plus_error() {
        // dust (+20) + error (+40) = 60
        let (score, flags) = scorer().score(&tx(0.0001).with_error(true), 0.0);
        assert_eq!(score, 60);
        assert_eq!(flags, vec!["Dust Transaction", "Transaction Error"]);
    }

    #[test]
    fn test_zero_value_is_not_dust() {
        let (score, flags) = scorer().score(&tx(0.0), 0.0);
        assert_eq!(score, 0);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_self_transfer_with_ml_contribution() {
        // self (+25) + min(30, 1.5 * 20) = 55
        let mut transfer = tx(0.0);
        transfer.to = transfer.from.clone();
        let (score, flags) = scorer().score(&transfer, -1.5);
        assert_eq!(score, 55);
        assert_eq!(flags, vec!["Self Transfer", "ML Anomaly"]);
    }

    #[test]
    fn test_self_transfer_case_insensitive() {
        let mut transfer = tx(0.0);
        transfer.from = "0xABCDEF".to_string();
        transfer.to = "0xabcdef".to_string();
        let (score, flags) = scorer().score(&transfer, 0.0);
        assert_eq!(score, 25);
        assert_eq!(flags, vec!["Self Transfer"]);
    }

    #[test]
    fn test_ml_contribution_is_capped() {
        let (score, flags) = scorer().score(&tx(0.0), -100.0);
        assert_eq!(score, 30);
        assert_eq!(flags, vec!["ML Anomaly"]);
    }

    #[test]
    fn test_positive_anomaly_adds_nothing() {
        let (score, flags) = scorer().score(&tx(0.0), 0.9);
        assert_eq!(score, 0);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_score_clamped_to_100() {
        // large(30) + error(40) + round(15) + self(25) + ml(30) > 100
        let mut transfer = tx(20.0).with_error(true);
        transfer.to = transfer.from.clone();
        let (score, _) = scorer().score(&transfer, -5.0);
        assert_eq!(score, 100);
    }

    #[test]
    fn test_determinism() {
        let transfer = tx(3.7).with_error(true);
        let first = scorer().score(&transfer, -0.42);
        for _ in 0..10 {
            assert_eq!(scorer().score(&transfer, -0.42), first);
        }
    }

    #[test]
    fn test_zero_score_has_empty_flags() {
        let (score, flags) = scorer().score(&tx(0.5), 0.0);
        assert_eq!(score, 0);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_negligible_anomaly_adds_neither_points_nor_flag() {
        // |-0.01| * 20 = 0.2 floors to 0 whole points; the flag must not
        // appear on an otherwise clean transaction.
        let (score, flags) = scorer().score(&tx(0.5), -0.01);
        assert_eq!(score, 0);
        assert!(flags.is_empty());
    }

    #[test]
    fn test_fractional_ml_contribution_floors_to_whole_points() {
        // |-0.07| * 20 = 1.4 floors to 1 point, and the flag comes with it.
        let (score, flags) = scorer().score(&tx(0.5), -0.07);
        assert_eq!(score, 1);
        assert_eq!(flags, vec!["ML Anomaly"]);
    }

    #[test]
    fn test_huge_configured_points_saturate_instead_of_overflowing() {
        let mut config = ScoringConfig::default();
        config.point_values.large_amount = u32::MAX;
        config.point_values.transaction_error = u32::MAX;
        let scorer = RiskScorer::new(config);
        let (score, flags) = scorer.score(&tx(15.0).with_error(true), -100.0);
        assert_eq!(score, 100);
        assert_eq!(flags.len(), 3);
    }

    #[test]
    fn test_zero_point_rule_adds_no_flag() {
        let mut config = ScoringConfig::default();
        config.point_values.large_amount = 0;
        let scorer = RiskScorer::new(config);
        let (score, flags) = scorer.score(&tx(15.0), 0.0);
        assert_eq!(score, 0);
        assert!(flags.is_empty());
    }
}
