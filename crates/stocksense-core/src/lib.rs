//! Stocksense Core Library
//!
//! Analytics engine for the Stocksense inventory/quality tool:
//! - Statistics primitives (mean, stddev, linear regression)
//! - Trend classification over tracked metric series
//! - Statistical and rule-based anomaly detection
//! - Depletion and seasonality forecasting
//! - Rule-based recommendations
//! - An orchestrating insight engine with an optional periodic refresh task
//!
//! Storage, CRUD services, and UI rendering live elsewhere; this crate only
//! consumes record snapshots and produces a ranked insight feed.

pub mod error;
pub mod insights;
pub mod models;
pub mod stats;

pub use error::{Error, Result};
pub use insights::{
    ActionKind, Analyzer, AnomalyDetector, AnomalyKind, AnomalyRecord, Depletion, EngineConfig,
    Forecaster, Insight, InsightAction, InsightEngine, InsightType, MetricTrack, RealtimeHandle,
    RecommendationGenerator, Severity, SnapshotSource, Thresholds, TrendAnalyzer, TrendDirection,
    TrendResult,
};
pub use models::{Aggregates, ShipmentRecord, Snapshot};
