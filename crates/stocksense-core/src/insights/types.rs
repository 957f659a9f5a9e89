//! Core types for the insight engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kinds of insights the engine can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// Directional classification of a tracked metric
    Trend,
    /// Statistically or rule-wise unusual records
    Anomaly,
    /// Forward-looking projection (depletion, seasonality)
    Prediction,
    /// Rule-based improvement suggestion
    Recommendation,
    /// Condition requiring immediate attention
    Alert,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Trend => "trend",
            InsightType::Anomaly => "anomaly",
            InsightType::Prediction => "prediction",
            InsightType::Recommendation => "recommendation",
            InsightType::Alert => "alert",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InsightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trend" => Ok(InsightType::Trend),
            "anomaly" => Ok(InsightType::Anomaly),
            "prediction" => Ok(InsightType::Prediction),
            "recommendation" => Ok(InsightType::Recommendation),
            "alert" => Ok(InsightType::Alert),
            _ => Err(format!("Unknown insight type: {}", s)),
        }
    }
}

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational, no urgency
    Low,
    /// Worth attention but not urgent
    Medium,
    /// Should be addressed soon
    High,
    /// Requires immediate attention
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// Visual weight of a suggested follow-up action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Primary,
    Secondary,
    Danger,
}

/// A named follow-up operation attached to an actionable insight.
///
/// `callback` is a symbolic operation name resolved by the UI layer; the
/// engine never invokes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightAction {
    pub label: String,
    pub kind: ActionKind,
    pub callback: String,
}

impl InsightAction {
    pub fn new(label: impl Into<String>, kind: ActionKind, callback: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind,
            callback: callback.into(),
        }
    }
}

/// A ranked, typed finding produced by one analyzer.
///
/// Insights are value objects: created fresh on every refresh, never mutated
/// afterwards, replaced wholesale by the next refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// Unique id, generated at creation, never reused
    pub id: Uuid,
    pub insight_type: InsightType,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// Engine certainty in [0, 100]; not a calibrated probability
    pub confidence: u8,
    pub timestamp: DateTime<Utc>,
    /// True if user-facing follow-up actions exist
    pub actionable: bool,
    pub actions: Vec<InsightAction>,
}

impl Insight {
    /// Create a new insight with the current timestamp.
    ///
    /// `confidence` is clamped into [0, 100]; out-of-range inputs are never
    /// rejected.
    pub fn new(
        insight_type: InsightType,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
        confidence: f64,
    ) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 100.0).round() as u8
        } else {
            0
        };

        Self {
            id: Uuid::new_v4(),
            insight_type,
            severity,
            title: title.into(),
            description: description.into(),
            confidence,
            timestamp: Utc::now(),
            actionable: false,
            actions: Vec::new(),
        }
    }

    /// Attach follow-up actions.
    ///
    /// A non-empty action list makes the insight actionable; this is the only
    /// way to set either field, which keeps the actions/actionable invariant.
    pub fn with_actions(mut self, actions: Vec<InsightAction>) -> Self {
        self.actionable = !actions.is_empty();
        self.actions = actions;
        self
    }
}

/// Direction of a metric trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Up => "up",
            TrendDirection::Down => "down",
            TrendDirection::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Intermediate trend classification; not persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    /// Trend strength in [0, 100], derived from R²
    pub strength: f64,
    /// Descriptive label of the period analyzed
    pub period: String,
    /// Free-text contributing factors
    pub factors: Vec<String>,
}

/// Evidence class of an anomaly finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Two-sided z-score outlier
    Statistical,
    /// Domain-rule reject-ratio ceiling breach
    RejectRatio,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::Statistical => "statistical",
            AnomalyKind::RejectRatio => "reject_ratio",
        }
    }
}

/// Intermediate anomaly finding; not persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub kind: AnomalyKind,
    pub description: String,
    pub severity: Severity,
    /// Ids of the records this finding covers
    pub affected_items: Vec<String>,
    pub detected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insight_type_round_trip() {
        assert_eq!(InsightType::Prediction.as_str(), "prediction");
        assert_eq!(
            InsightType::from_str("recommendation").unwrap(),
            InsightType::Recommendation
        );
        assert!(InsightType::from_str("bogus").is_err());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical.priority() > Severity::High.priority());
        assert!(Severity::High.priority() > Severity::Medium.priority());
        assert!(Severity::Medium.priority() > Severity::Low.priority());
    }

    #[test]
    fn test_insight_fields_round_trip() {
        let insight = Insight::new(
            InsightType::Trend,
            Severity::Medium,
            "Quantity trending up",
            "Shipment volume has grown steadily",
            83.0,
        );

        assert_eq!(insight.insight_type, InsightType::Trend);
        assert_eq!(insight.severity, Severity::Medium);
        assert_eq!(insight.title, "Quantity trending up");
        assert_eq!(insight.description, "Shipment volume has grown steadily");
        assert_eq!(insight.confidence, 83);
        assert!(!insight.actionable);
        assert!(insight.actions.is_empty());
    }

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(
            Insight::new(InsightType::Alert, Severity::Low, "t", "d", -5.0).confidence,
            0
        );
        assert_eq!(
            Insight::new(InsightType::Alert, Severity::Low, "t", "d", 240.7).confidence,
            100
        );
        assert_eq!(
            Insight::new(InsightType::Alert, Severity::Low, "t", "d", f64::NAN).confidence,
            0
        );
    }

    #[test]
    fn test_actions_imply_actionable() {
        let insight = Insight::new(InsightType::Recommendation, Severity::High, "t", "d", 85.0)
            .with_actions(vec![InsightAction::new(
                "Review suppliers",
                ActionKind::Primary,
                "review_suppliers",
            )]);

        assert!(insight.actionable);
        assert_eq!(insight.actions.len(), 1);

        let plain = Insight::new(InsightType::Recommendation, Severity::High, "t", "d", 85.0)
            .with_actions(vec![]);
        assert!(!plain.actionable);
    }

    #[test]
    fn test_unique_ids() {
        let a = Insight::new(InsightType::Trend, Severity::Low, "t", "d", 50.0);
        let b = Insight::new(InsightType::Trend, Severity::Low, "t", "d", 50.0);
        assert_ne!(a.id, b.id);
    }
}
