//! Engine configuration
//!
//! Every tuning constant the analyzers use lives here with its default. The
//! defaults are carried over from the original operation of the system; none
//! of them is derived, so deployments are expected to tune them.

/// Analyzer thresholds
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Slope deadband: |slope| at or below this is reported as stable
    pub slope_deadband: f64,
    /// Minimum trend strength to report on the headline (quantity) track
    pub quantity_strength: f64,
    /// Minimum trend strength to report on the reject-rate track.
    /// Lower than the headline threshold: suppressing a real reject-rate
    /// trend costs more than suppressing an inventory-count trend.
    pub reject_rate_strength: f64,
    /// Z-score above which a record is a statistical outlier (strict)
    pub z_score: f64,
    /// Per-record reject ratio above which the domain rule fires (strict)
    pub reject_ratio_ceiling: f64,
    /// Affected-record count above which an anomaly escalates to high severity
    pub escalation_count: usize,
    /// Days-remaining at or below which depletion is critical
    pub depletion_critical_days: f64,
    /// Days-remaining below which depletion is high severity
    pub depletion_high_days: f64,
    /// Overall reject ratio above which a quality recommendation fires
    pub overall_reject_ratio: f64,
    /// Distinct destinations below which a diversification suggestion fires
    pub min_destinations: usize,
    /// Distinct calendar months needed before seasonality is reportable
    pub seasonality_min_months: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            slope_deadband: 0.1,
            quantity_strength: 70.0,
            reject_rate_strength: 60.0,
            z_score: 2.0,
            reject_ratio_ceiling: 0.2,
            escalation_count: 5,
            depletion_critical_days: 7.0,
            depletion_high_days: 30.0,
            overall_reject_ratio: 0.1,
            min_destinations: 3,
            seasonality_min_months: 3,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Enable the periodic refresh task
    pub real_time: bool,
    /// Interval between periodic refreshes, in milliseconds
    pub update_interval_ms: u64,
    /// Trailing window (record count) for depletion forecasting
    pub forecast_window: usize,
    pub thresholds: Thresholds,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            real_time: false,
            update_interval_ms: 60_000,
            forecast_window: 30,
            thresholds: Thresholds::default(),
        }
    }
}
