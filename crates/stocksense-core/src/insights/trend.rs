//! Trend analyzer
//!
//! Classifies a tracked metric series as up/down/stable with a strength
//! derived from the regression fit. Trend analysis is advisory: it degrades
//! to a zero-strength stable result on short series instead of failing.

use crate::error::Result;
use crate::models::Snapshot;
use crate::stats;

use super::config::Thresholds;
use super::engine::Analyzer;
use super::types::{Insight, InsightType, Severity, TrendDirection, TrendResult};

/// Metric series a trend analyzer tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricTrack {
    /// Headline track: per-record shipped quantity
    Quantity,
    /// Secondary track: per-record reject rate
    RejectRate,
}

impl MetricTrack {
    pub fn label(&self) -> &'static str {
        match self {
            MetricTrack::Quantity => "quantity",
            MetricTrack::RejectRate => "reject rate",
        }
    }

    fn series(&self, snapshot: &Snapshot) -> Vec<f64> {
        match self {
            MetricTrack::Quantity => snapshot.quantity_series(),
            MetricTrack::RejectRate => snapshot.reject_rate_series(),
        }
    }
}

/// Insight analyzer for one metric track
pub struct TrendAnalyzer {
    track: MetricTrack,
    /// |slope| at or below this reports as stable
    deadband: f64,
    /// Minimum strength before a trend is reported
    min_strength: f64,
}

impl TrendAnalyzer {
    pub fn new(track: MetricTrack, thresholds: &Thresholds) -> Self {
        let min_strength = match track {
            MetricTrack::Quantity => thresholds.quantity_strength,
            MetricTrack::RejectRate => thresholds.reject_rate_strength,
        };
        Self {
            track,
            deadband: thresholds.slope_deadband,
            min_strength,
        }
    }

    /// Classify an ordered series. Never fails; series shorter than two
    /// points yield a stable, zero-strength result.
    pub fn analyze(&self, series: &[f64]) -> TrendResult {
        let regression = match stats::linear_regression(series) {
            Ok(r) => r,
            Err(_) => {
                return TrendResult {
                    direction: TrendDirection::Stable,
                    strength: 0.0,
                    period: format!("{} records", series.len()),
                    factors: vec![format!(
                        "insufficient data for {} trend analysis",
                        self.track.label()
                    )],
                };
            }
        };

        let direction = if regression.slope > self.deadband {
            TrendDirection::Up
        } else if regression.slope < -self.deadband {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };

        let strength = (regression.r_squared.abs() * 100.0).clamp(0.0, 100.0);

        TrendResult {
            direction,
            strength,
            period: format!("{} records", series.len()),
            factors: vec![format!(
                "slope {:.3} per record over {} points",
                regression.slope,
                series.len()
            )],
        }
    }

    fn severity(&self, direction: TrendDirection) -> Severity {
        match (self.track, direction) {
            // A rising reject rate is a quality problem in the making.
            (MetricTrack::RejectRate, TrendDirection::Up) => Severity::High,
            (MetricTrack::Quantity, TrendDirection::Down) => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl Analyzer for TrendAnalyzer {
    fn id(&self) -> InsightType {
        InsightType::Trend
    }

    fn name(&self) -> &'static str {
        match self.track {
            MetricTrack::Quantity => "Quantity Trend",
            MetricTrack::RejectRate => "Reject-Rate Trend",
        }
    }

    fn analyze(&self, snapshot: &Snapshot) -> Result<Vec<Insight>> {
        let series = self.track.series(snapshot);
        let trend = TrendAnalyzer::analyze(self, &series);

        // Only directional trends above the per-track strength threshold are
        // worth surfacing; a stable classification is not news.
        if trend.direction == TrendDirection::Stable || trend.strength <= self.min_strength {
            tracing::debug!(
                track = self.track.label(),
                strength = trend.strength,
                "Trend below reporting threshold"
            );
            return Ok(vec![]);
        }

        let insight = Insight::new(
            InsightType::Trend,
            self.severity(trend.direction),
            format!(
                "{} trending {}",
                capitalize(self.track.label()),
                trend.direction
            ),
            format!(
                "The {} series is moving {} over the last {} ({})",
                self.track.label(),
                trend.direction,
                trend.period,
                trend.factors.join("; ")
            ),
            trend.strength,
        );

        Ok(vec![insight])
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
