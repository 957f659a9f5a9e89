//! Forecaster
//!
//! Projects a depletion horizon from recent consumption and looks for enough
//! calendar spread to report a seasonal pattern. Only near-term depletion
//! risk is surfaced; a comfortable horizon produces no insight.

use chrono::Datelike;

use crate::error::Result;
use crate::models::{ShipmentRecord, Snapshot};
use crate::stats;

use super::config::Thresholds;
use super::engine::Analyzer;
use super::types::{ActionKind, Insight, InsightAction, InsightType, Severity};

/// A projected depletion horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Depletion {
    pub days_remaining: f64,
    /// Scales with how much of the trailing window was observed
    pub confidence: u8,
}

pub struct Forecaster {
    /// Trailing record count used for the consumption average
    window: usize,
    critical_days: f64,
    high_days: f64,
    min_months: usize,
}

impl Forecaster {
    pub fn new(window: usize, thresholds: &Thresholds) -> Self {
        Self {
            window: window.max(1),
            critical_days: thresholds.depletion_critical_days,
            high_days: thresholds.depletion_high_days,
            min_months: thresholds.seasonality_min_months,
        }
    }

    /// Average per-record consumption over the trailing window and project
    /// how many days of stock remain.
    ///
    /// Returns `None` for empty history or zero average consumption; there is
    /// no depletion risk to report and no division by zero.
    pub fn forecast_depletion(
        &self,
        history: &[ShipmentRecord],
        stock_on_hand: f64,
    ) -> Option<Depletion> {
        let trailing = &history[history.len().saturating_sub(self.window)..];
        let consumption: Vec<f64> = trailing.iter().map(|r| r.quantity).collect();

        let average = stats::mean(&consumption).ok()?;
        if average == 0.0 {
            return None;
        }

        let fill = trailing.len() as f64 / self.window as f64;
        let confidence = (fill * 100.0).clamp(50.0, 100.0).round() as u8;

        Some(Depletion {
            days_remaining: stock_on_hand / average,
            confidence,
        })
    }

    /// Whether the history spans enough distinct calendar months for a
    /// seasonal pattern to be distinguishable from noise.
    pub fn forecast_seasonality(&self, history: &[ShipmentRecord]) -> bool {
        self.distinct_months(history) >= self.min_months
    }

    fn distinct_months(&self, history: &[ShipmentRecord]) -> usize {
        let mut months: Vec<(i32, u32)> = history
            .iter()
            .map(|r| (r.timestamp.year(), r.timestamp.month()))
            .collect();
        months.sort_unstable();
        months.dedup();
        months.len()
    }

    fn depletion_insight(&self, depletion: Depletion) -> Option<Insight> {
        let severity = if depletion.days_remaining <= self.critical_days {
            Severity::Critical
        } else if depletion.days_remaining < self.high_days {
            Severity::High
        } else {
            // A comfortable horizon is not worth surfacing.
            return None;
        };

        let mut insight = Insight::new(
            InsightType::Prediction,
            severity,
            "Stock depletion approaching",
            format!(
                "At the current consumption rate, stock runs out in {:.1} days",
                depletion.days_remaining
            ),
            depletion.confidence as f64,
        );

        if severity == Severity::Critical {
            insight = insight.with_actions(vec![InsightAction::new(
                "Reorder stock",
                ActionKind::Primary,
                "reorder_stock",
            )]);
        }

        Some(insight)
    }

    fn seasonality_insight(&self, history: &[ShipmentRecord]) -> Option<Insight> {
        let months = self.distinct_months(history);
        if months < self.min_months {
            return None;
        }

        let extra = (months - self.min_months) as f64;
        let confidence = (60.0 + 5.0 * extra).min(85.0);

        Some(Insight::new(
            InsightType::Prediction,
            Severity::Low,
            "Seasonal pattern observed",
            format!(
                "Shipment history spans {} distinct months; consumption may follow a seasonal cycle",
                months
            ),
            confidence,
        ))
    }
}

impl Analyzer for Forecaster {
    fn id(&self) -> InsightType {
        InsightType::Prediction
    }

    fn name(&self) -> &'static str {
        "Forecaster"
    }

    fn analyze(&self, snapshot: &Snapshot) -> Result<Vec<Insight>> {
        let mut insights = Vec::new();

        if let Some(depletion) =
            self.forecast_depletion(snapshot.records(), snapshot.stock_on_hand())
        {
            if let Some(insight) = self.depletion_insight(depletion) {
                insights.push(insight);
            }
        }

        if let Some(insight) = self.seasonality_insight(snapshot.records()) {
            insights.push(insight);
        }

        Ok(insights)
    }
}
