//! Insight engine - proactive inventory and quality analytics
//!
//! The insight engine ingests a snapshot of shipment records and derives a
//! ranked feed of actionable findings. Instead of waiting for someone to run
//! the right report, it surfaces what is trending, anomalous, at risk of
//! depletion, or worth improving.
//!
//! ## Analyzers
//!
//! - **Trend** - classifies the quantity and reject-rate series (direction +
//!   strength)
//! - **Anomaly** - z-score outliers and reject-ratio ceiling breaches
//! - **Forecast** - depletion horizon and seasonal spread
//! - **Recommendation** - rule-based improvement suggestions
//!
//! Analyzers are independent: they share no state, none consumes another's
//! output, and one failing never aborts a refresh.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stocksense_core::insights::{EngineConfig, InsightEngine};
//! use stocksense_core::models::Snapshot;
//!
//! let engine = InsightEngine::new(EngineConfig::default());
//! let insights = engine.refresh(&snapshot).await?;
//! ```

pub mod anomaly;
pub mod config;
pub mod engine;
pub mod forecast;
pub mod realtime;
pub mod recommend;
pub mod trend;
pub mod types;

pub use anomaly::AnomalyDetector;
pub use config::{EngineConfig, Thresholds};
pub use engine::{Analyzer, InsightEngine};
pub use forecast::{Depletion, Forecaster};
pub use realtime::{RealtimeHandle, SnapshotSource};
pub use recommend::RecommendationGenerator;
pub use trend::{MetricTrack, TrendAnalyzer};
pub use types::{
    ActionKind, AnomalyKind, AnomalyRecord, Insight, InsightAction, InsightType, Severity,
    TrendDirection, TrendResult,
};
