//! Insight engine - orchestrates the analyzers and owns the result feed

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::Snapshot;

use super::anomaly::AnomalyDetector;
use super::config::EngineConfig;
use super::forecast::Forecaster;
use super::recommend::RecommendationGenerator;
use super::trend::{MetricTrack, TrendAnalyzer};
use super::types::{Insight, InsightType};

/// Trait for insight analyzers.
///
/// Analysis is synchronous: once a snapshot is in hand there is no I/O left
/// to overlap, so analyzers are plain functions over immutable data.
pub trait Analyzer: Send + Sync {
    /// Insight type this analyzer produces
    fn id(&self) -> InsightType;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze the snapshot and produce insights
    fn analyze(&self, snapshot: &Snapshot) -> Result<Vec<Insight>>;
}

#[derive(Debug, Default)]
struct EngineState {
    insights: Vec<Insight>,
    last_run: Option<DateTime<Utc>>,
}

/// The main insight engine.
///
/// Owns its "last result" and "last run" state exclusively; each successful
/// [`refresh`](InsightEngine::refresh) replaces both atomically. There is no
/// mutation API for individual insights.
pub struct InsightEngine {
    config: EngineConfig,
    analyzers: Vec<Box<dyn Analyzer>>,
    /// Reentrancy guard: an overlapping refresh fails fast with `EngineBusy`
    busy: AtomicBool,
    /// Torn-down engines silently discard stale refresh completions
    closed: AtomicBool,
    state: Mutex<EngineState>,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InsightEngine {
    /// Create an engine with the built-in analyzers registered.
    pub fn new(config: EngineConfig) -> Self {
        let thresholds = &config.thresholds;

        let mut engine = Self {
            analyzers: vec![],
            busy: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            state: Mutex::new(EngineState::default()),
            config: config.clone(),
        };

        engine.register(Box::new(TrendAnalyzer::new(MetricTrack::Quantity, thresholds)));
        engine.register(Box::new(TrendAnalyzer::new(MetricTrack::RejectRate, thresholds)));
        engine.register(Box::new(AnomalyDetector::new(thresholds)));
        engine.register(Box::new(Forecaster::new(config.forecast_window, thresholds)));
        engine.register(Box::new(RecommendationGenerator::new(thresholds)));

        engine
    }

    /// Register an additional analyzer.
    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run all analyzers over the snapshot and replace the result feed.
    ///
    /// An empty snapshot is a degenerate success: the feed becomes empty and
    /// no analyzer is invoked. Every call, empty or not, is serialized under
    /// the same reentrancy guard, so overlapping calls are rejected with
    /// [`Error::EngineBusy`] and can never wipe an in-flight run's feed. A
    /// failing analyzer contributes nothing for the run; the others' results
    /// still surface.
    pub async fn refresh(&self, snapshot: &Snapshot) -> Result<Vec<Insight>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::EngineBusy);
        }

        let insights = if snapshot.is_empty() {
            Vec::new()
        } else {
            self.run_analyzers(snapshot)
        };

        self.apply(insights.clone());
        self.busy.store(false, Ordering::Release);

        Ok(insights)
    }

    fn run_analyzers(&self, snapshot: &Snapshot) -> Vec<Insight> {
        let mut all_insights = vec![];

        for analyzer in &self.analyzers {
            match analyzer.analyze(snapshot) {
                Ok(insights) => {
                    tracing::debug!(
                        analyzer = analyzer.name(),
                        count = insights.len(),
                        "Analyzer complete"
                    );
                    all_insights.extend(insights);
                }
                Err(e) => {
                    tracing::warn!(
                        analyzer = analyzer.name(),
                        error = %e,
                        "Analyzer failed, isolating"
                    );
                }
            }
        }

        // Severity first (critical -> low), confidence breaks ties.
        // sort_by is stable, so equal entries keep their relative order.
        all_insights.sort_by(|a, b| {
            b.severity
                .priority()
                .cmp(&a.severity.priority())
                .then_with(|| b.confidence.cmp(&a.confidence))
        });

        tracing::info!(count = all_insights.len(), "Insight refresh complete");
        all_insights
    }

    /// Atomically replace the feed, unless the engine has been torn down.
    fn apply(&self, insights: Vec<Insight>) {
        if self.closed.load(Ordering::Acquire) {
            tracing::debug!("Engine closed, discarding refresh result");
            return;
        }
        let mut state = self.state.lock().expect("engine state lock poisoned");
        state.insights = insights;
        state.last_run = Some(Utc::now());
    }

    /// The full ordered insight feed from the most recent refresh.
    pub fn all(&self) -> Vec<Insight> {
        self.state
            .lock()
            .expect("engine state lock poisoned")
            .insights
            .clone()
    }

    /// The subsequence of the feed with the given type, in feed order.
    pub fn by_type(&self, insight_type: InsightType) -> Vec<Insight> {
        self.state
            .lock()
            .expect("engine state lock poisoned")
            .insights
            .iter()
            .filter(|i| i.insight_type == insight_type)
            .cloned()
            .collect()
    }

    /// When the last successful refresh completed.
    pub fn last_run(&self) -> Option<DateTime<Utc>> {
        self.state
            .lock()
            .expect("engine state lock poisoned")
            .last_run
    }

    /// Tear the engine down. In-flight refreshes may finish but their results
    /// are discarded; the existing feed is left untouched.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Registered analyzer names, in registration order.
    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }
}
