//! Anomaly detector
//!
//! Two independent passes over the snapshot:
//!
//! - a two-sided z-score test on quantity (strict `> zσ`)
//! - a domain rule on the per-record reject ratio (strict `> ceiling`)
//!
//! The passes represent different evidence and may both flag the same record;
//! their findings are reported separately, never merged.

use chrono::Utc;

use crate::error::Result;
use crate::models::{ShipmentRecord, Snapshot};
use crate::stats;

use super::config::Thresholds;
use super::engine::Analyzer;
use super::types::{AnomalyKind, AnomalyRecord, Insight, InsightType, Severity};

pub struct AnomalyDetector {
    z_score: f64,
    reject_ratio_ceiling: f64,
    escalation_count: usize,
}

impl AnomalyDetector {
    pub fn new(thresholds: &Thresholds) -> Self {
        Self {
            z_score: thresholds.z_score,
            reject_ratio_ceiling: thresholds.reject_ratio_ceiling,
            escalation_count: thresholds.escalation_count,
        }
    }

    /// Run both passes and return their findings.
    pub fn detect(&self, records: &[ShipmentRecord]) -> Vec<AnomalyRecord> {
        let mut anomalies = Vec::new();

        if let Some(statistical) = self.statistical_pass(records) {
            anomalies.push(statistical);
        }
        if let Some(domain) = self.domain_pass(records) {
            anomalies.push(domain);
        }

        anomalies
    }

    /// Flag records whose quantity deviates from the mean by strictly more
    /// than `z_score` standard deviations.
    fn statistical_pass(&self, records: &[ShipmentRecord]) -> Option<AnomalyRecord> {
        let quantities: Vec<f64> = records.iter().map(|r| r.quantity).collect();
        // Single-record or empty snapshots have no spread to test against.
        let (mean, sd) = match (stats::mean(&quantities), stats::stddev(&quantities)) {
            (Ok(m), Ok(s)) => (m, s),
            _ => return None,
        };
        if sd == 0.0 {
            return None;
        }

        let affected: Vec<String> = records
            .iter()
            .filter(|r| (r.quantity - mean).abs() > self.z_score * sd)
            .map(|r| r.id.clone())
            .collect();

        if affected.is_empty() {
            return None;
        }

        let severity = if affected.len() > self.escalation_count {
            Severity::High
        } else {
            Severity::Medium
        };

        Some(AnomalyRecord {
            kind: AnomalyKind::Statistical,
            description: format!(
                "{} record(s) deviate by more than {:.1} standard deviations from the mean quantity ({:.1})",
                affected.len(),
                self.z_score,
                mean
            ),
            severity,
            affected_items: affected,
            detected_at: Utc::now(),
        })
    }

    /// Flag records whose reject ratio exceeds the ceiling. Records with a
    /// zero denominator are excluded, not treated as 0% or infinite.
    fn domain_pass(&self, records: &[ShipmentRecord]) -> Option<AnomalyRecord> {
        let affected: Vec<String> = records
            .iter()
            .filter(|r| {
                r.reject_ratio()
                    .map(|ratio| ratio > self.reject_ratio_ceiling)
                    .unwrap_or(false)
            })
            .map(|r| r.id.clone())
            .collect();

        if affected.is_empty() {
            return None;
        }

        let severity = if affected.len() > self.escalation_count {
            Severity::High
        } else {
            Severity::Medium
        };

        Some(AnomalyRecord {
            kind: AnomalyKind::RejectRatio,
            description: format!(
                "{} record(s) exceed the {:.0}% reject-ratio ceiling",
                affected.len(),
                self.reject_ratio_ceiling * 100.0
            ),
            severity,
            affected_items: affected,
            detected_at: Utc::now(),
        })
    }

    fn confidence(&self, anomaly: &AnomalyRecord) -> f64 {
        match anomaly.kind {
            // Outlier evidence gains confidence with every extra record.
            AnomalyKind::Statistical => {
                (75.0 + 5.0 * anomaly.affected_items.len() as f64).min(95.0)
            }
            // Rule evidence is exact.
            AnomalyKind::RejectRatio => 90.0,
        }
    }
}

impl Analyzer for AnomalyDetector {
    fn id(&self) -> InsightType {
        InsightType::Anomaly
    }

    fn name(&self) -> &'static str {
        "Anomaly Detector"
    }

    fn analyze(&self, snapshot: &Snapshot) -> Result<Vec<Insight>> {
        let insights = self
            .detect(snapshot.records())
            .into_iter()
            .map(|anomaly| {
                let title = match anomaly.kind {
                    AnomalyKind::Statistical => "Unusual quantity outliers",
                    AnomalyKind::RejectRatio => "Reject ratio above ceiling",
                };
                let confidence = self.confidence(&anomaly);
                Insight::new(
                    InsightType::Anomaly,
                    anomaly.severity,
                    title,
                    format!(
                        "{} Affected records: {}",
                        anomaly.description,
                        anomaly.affected_items.join(", ")
                    ),
                    confidence,
                )
            })
            .collect();

        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    fn detector() -> AnomalyDetector {
        AnomalyDetector::new(&Thresholds::default())
    }

    /// A record sitting at exactly 3 standard deviations among a baseline
    /// within 1 sigma is flagged by the statistical pass, and nothing else is.
    #[test]
    fn test_statistical_pass_flags_single_outlier() {
        // Eight 10s, six 8s, three 12s, one 16. All arithmetic is exact in
        // binary: n = 18, sum = 180 so the mean is exactly 10, sum of squared
        // deviations = 36 + 3*4 + 6*4 = 72 so the population sd is exactly 2,
        // and the 16 sits at exactly z = 3. Every baseline value is within
        // 1 sigma.
        let mut quantities = vec![10.0; 8];
        quantities.extend([8.0; 6]);
        quantities.extend([12.0; 3]);
        quantities.push(16.0);

        let n = quantities.len() as f64;
        let m = quantities.iter().sum::<f64>() / n;
        let sd = (quantities.iter().map(|q| (q - m).powi(2)).sum::<f64>() / n).sqrt();
        assert_eq!(m, 10.0);
        assert_eq!(sd, 2.0);
        assert_eq!((16.0 - m) / sd, 3.0);
        for q in &quantities[..17] {
            assert!(((q - m) / sd).abs() <= 1.0);
        }

        let records: Vec<ShipmentRecord> = quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| ShipmentRecord::new(format!("r{i}"), q, 0.0, at(i as u32 + 1), "east"))
            .collect();

        let anomalies = detector().detect(&records);
        let statistical: Vec<_> = anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::Statistical)
            .collect();
        assert_eq!(statistical.len(), 1);
        assert_eq!(statistical[0].affected_items, vec!["r17".to_string()]);
        assert_eq!(statistical[0].severity, Severity::Medium);
    }

    #[test]
    fn test_two_sigma_boundary_not_flagged() {
        // Six 4s plus a 0 and an 8: mean 4, population sd exactly 2, so the
        // extremes sit at exactly 2 sigma. All arithmetic is exact in binary,
        // and the strict inequality must leave them unflagged.
        let quantities = [4.0, 4.0, 4.0, 4.0, 4.0, 4.0, 0.0, 8.0];
        let m = quantities.iter().sum::<f64>() / 8.0;
        let sd = (quantities.iter().map(|q| (q - m).powi(2)).sum::<f64>() / 8.0).sqrt();
        assert_eq!(m, 4.0);
        assert_eq!(sd, 2.0);

        let records: Vec<ShipmentRecord> = quantities
            .iter()
            .enumerate()
            .map(|(i, &q)| ShipmentRecord::new(format!("r{i}"), q, 0.0, at(i as u32 + 1), "east"))
            .collect();

        let anomalies = detector().detect(&records);
        assert!(anomalies
            .iter()
            .all(|a| a.kind != AnomalyKind::Statistical));
    }

    #[test]
    fn test_constant_quantities_no_statistical_anomaly() {
        let records: Vec<ShipmentRecord> = (1..=5)
            .map(|i| ShipmentRecord::new(format!("r{i}"), 10.0, 0.0, at(i), "east"))
            .collect();
        assert!(detector().detect(&records).is_empty());
    }

    #[test]
    fn test_domain_pass_strict_ceiling() {
        let records = vec![
            // ratio 0.25: flagged
            ShipmentRecord::new("over", 100.0, 25.0, at(1), "east"),
            // ratio exactly 0.2: not flagged
            ShipmentRecord::new("boundary", 100.0, 20.0, at(2), "east"),
            // ratio 0.1: not flagged
            ShipmentRecord::new("under", 100.0, 10.0, at(3), "east"),
        ];

        let anomalies = detector().detect(&records);
        let domain: Vec<_> = anomalies
            .iter()
            .filter(|a| a.kind == AnomalyKind::RejectRatio)
            .collect();
        assert_eq!(domain.len(), 1);
        assert_eq!(domain[0].affected_items, vec!["over".to_string()]);
    }

    #[test]
    fn test_zero_quantity_excluded_from_ratio_check() {
        let records = vec![
            ShipmentRecord::new("zero", 0.0, 50.0, at(1), "east"),
            ShipmentRecord::new("ok", 100.0, 5.0, at(2), "east"),
        ];
        let anomalies = detector().detect(&records);
        assert!(anomalies.iter().all(|a| a.kind != AnomalyKind::RejectRatio));
    }

    #[test]
    fn test_escalation_past_size_threshold() {
        // 6 records over the ceiling: > 5 escalates to high.
        let records: Vec<ShipmentRecord> = (1..=6)
            .map(|i| ShipmentRecord::new(format!("r{i}"), 100.0, 30.0, at(i), "east"))
            .collect();

        let anomalies = detector().detect(&records);
        let domain = anomalies
            .iter()
            .find(|a| a.kind == AnomalyKind::RejectRatio)
            .unwrap();
        assert_eq!(domain.severity, Severity::High);
        assert_eq!(domain.affected_items.len(), 6);
    }

    #[test]
    fn test_both_passes_report_separately() {
        // One record is both a quantity outlier and over the reject ceiling.
        let mut records: Vec<ShipmentRecord> = (1..=8)
            .map(|i| ShipmentRecord::new(format!("r{i}"), 10.0 + (i % 2) as f64, 0.0, at(i), "east"))
            .collect();
        records.push(ShipmentRecord::new("spike", 100.0, 40.0, at(9), "east"));

        let anomalies = detector().detect(&records);
        assert_eq!(anomalies.len(), 2);
        let kinds: Vec<AnomalyKind> = anomalies.iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&AnomalyKind::Statistical));
        assert!(kinds.contains(&AnomalyKind::RejectRatio));
        for anomaly in &anomalies {
            assert!(anomaly
                .affected_items
                .contains(&"spike".to_string()));
        }
    }

    #[test]
    fn test_insight_mapping() {
        let records = vec![
            ShipmentRecord::new("over", 100.0, 25.0, at(1), "east"),
            ShipmentRecord::new("ok", 100.0, 1.0, at(2), "east"),
        ];
        let snapshot = Snapshot::new(records, 500.0).unwrap();
        let insights = Analyzer::analyze(&detector(), &snapshot).unwrap();

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::Anomaly);
        assert_eq!(insights[0].confidence, 90);
        assert!(insights[0].description.contains("over"));
    }
}
