//! Recommendation generator
//!
//! Deterministic rules over aggregate metrics. Each rule is independent and
//! may co-fire with the others; given identical aggregates the output is
//! identical.

use crate::error::Result;
use crate::models::{Aggregates, Snapshot};

use super::config::Thresholds;
use super::engine::Analyzer;
use super::types::{ActionKind, Insight, InsightAction, InsightType, Severity};

pub struct RecommendationGenerator {
    overall_reject_ratio: f64,
    reject_ratio_ceiling: f64,
    min_destinations: usize,
}

impl RecommendationGenerator {
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            overall_reject_ratio: thresholds.overall_reject_ratio,
            reject_ratio_ceiling: thresholds.reject_ratio_ceiling,
            min_destinations: thresholds.min_destinations,
        }
    }

    /// Apply every rule to the aggregates.
    pub fn recommend(&self, aggregates: &Aggregates) -> Vec<Insight> {
        let mut insights = Vec::new();

        if let Some(insight) = self.quality_rule(aggregates) {
            insights.push(insight);
        }
        if let Some(insight) = self.diversification_rule(aggregates) {
            insights.push(insight);
        }

        insights
    }

    /// Overall reject ratio above the trigger suggests a quality review.
    fn quality_rule(&self, aggregates: &Aggregates) -> Option<Insight> {
        let ratio = aggregates.reject_ratio()?;
        if ratio <= self.overall_reject_ratio {
            return None;
        }

        let severity = if ratio > self.reject_ratio_ceiling {
            Severity::High
        } else {
            Severity::Medium
        };

        Some(
            Insight::new(
                InsightType::Recommendation,
                severity,
                "Improve reject rate",
                format!(
                    "{:.1}% of shipped units were rejected ({:.0} of {:.0}); review supplier quality and inspection steps",
                    ratio * 100.0,
                    aggregates.total_rejects,
                    aggregates.total_quantity
                ),
                85.0,
            )
            .with_actions(vec![
                InsightAction::new("Review suppliers", ActionKind::Primary, "review_suppliers"),
                InsightAction::new(
                    "Audit inspection process",
                    ActionKind::Secondary,
                    "audit_process",
                ),
            ]),
        )
    }

    /// Few distinct destinations suggests concentration risk.
    fn diversification_rule(&self, aggregates: &Aggregates) -> Option<Insight> {
        if aggregates.record_count == 0
            || aggregates.distinct_destination_count >= self.min_destinations
        {
            return None;
        }

        Some(
            Insight::new(
                InsightType::Recommendation,
                Severity::Low,
                "Diversify destinations",
                format!(
                    "Shipments go to only {} destination(s); concentrating volume increases exposure to a single buyer",
                    aggregates.distinct_destination_count
                ),
                70.0,
            )
            .with_actions(vec![InsightAction::new(
                "Explore new destinations",
                ActionKind::Secondary,
                "explore_destinations",
            )]),
        )
    }
}

impl Analyzer for RecommendationGenerator {
    fn id(&self) -> InsightType {
        InsightType::Recommendation
    }

    fn name(&self) -> &'static str {
        "Recommendation Generator"
    }

    fn analyze(&self, snapshot: &Snapshot) -> Result<Vec<Insight>> {
        Ok(self.recommend(&snapshot.aggregates()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> RecommendationGenerator {
        RecommendationGenerator::new(&Thresholds::default())
    }

    fn aggregates(
        total_quantity: f64,
        total_rejects: f64,
        distinct_destination_count: usize,
    ) -> Aggregates {
        Aggregates {
            total_quantity,
            total_rejects,
            distinct_destination_count,
            record_count: 10,
        }
    }

    #[test]
    fn test_quality_rule_fires_above_ratio() {
        let insights = generator().recommend(&aggregates(1000.0, 150.0, 5));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::Recommendation);
        assert_eq!(insights[0].severity, Severity::Medium);
        assert!(insights[0].actionable);
        assert_eq!(insights[0].actions.len(), 2);
        assert_eq!(insights[0].actions[0].kind, ActionKind::Primary);
    }

    #[test]
    fn test_quality_rule_high_severity_past_ceiling() {
        let insights = generator().recommend(&aggregates(1000.0, 250.0, 5));
        assert_eq!(insights[0].severity, Severity::High);
    }

    #[test]
    fn test_quality_rule_quiet_at_boundary() {
        // Exactly 0.1 does not fire.
        let insights = generator().recommend(&aggregates(1000.0, 100.0, 5));
        assert!(insights.is_empty());
    }

    #[test]
    fn test_quality_rule_zero_quantity_guard() {
        let insights = generator().recommend(&aggregates(0.0, 50.0, 5));
        assert!(insights.is_empty());
    }

    #[test]
    fn test_diversification_rule() {
        let insights = generator().recommend(&aggregates(1000.0, 0.0, 2));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].severity, Severity::Low);
        assert_eq!(insights[0].confidence, 70);

        let quiet = generator().recommend(&aggregates(1000.0, 0.0, 3));
        assert!(quiet.is_empty());
    }

    #[test]
    fn test_rules_co_fire() {
        let insights = generator().recommend(&aggregates(1000.0, 150.0, 1));
        assert_eq!(insights.len(), 2);
    }

    #[test]
    fn test_deterministic_given_identical_aggregates() {
        let agg = aggregates(1000.0, 150.0, 1);
        let a = generator().recommend(&agg);
        let b = generator().recommend(&agg);

        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.severity, y.severity);
            assert_eq!(x.title, y.title);
            assert_eq!(x.description, y.description);
            assert_eq!(x.confidence, y.confidence);
            assert_eq!(x.actions, y.actions);
        }
    }
}
