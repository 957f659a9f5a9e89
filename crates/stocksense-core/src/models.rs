//! Input data model for the analytics engine
//!
//! The storage layer hands the engine an ordered-by-time snapshot of shipment
//! records. Required fields are validated here, at the snapshot boundary, so
//! analyzers can assume well-formed numerics and never re-validate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single operational record as supplied by the storage layer.
///
/// Fields beyond the four the engine reads are preserved in `extra` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRecord {
    /// Record identifier, referenced by anomaly findings
    pub id: String,
    /// Units shipped/consumed in this record
    pub quantity: f64,
    /// Units rejected in this record
    pub rejects: f64,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
    /// Destination/category label
    pub destination: String,
    /// Fields the core does not use, passed through unchanged
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ShipmentRecord {
    pub fn new(
        id: impl Into<String>,
        quantity: f64,
        rejects: f64,
        timestamp: DateTime<Utc>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            quantity,
            rejects,
            timestamp,
            destination: destination.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Reject ratio for this record, or `None` when the denominator is zero.
    ///
    /// Zero-quantity records are excluded from ratio-based checks rather than
    /// treated as 0% or infinite.
    pub fn reject_ratio(&self) -> Option<f64> {
        if self.quantity > 0.0 {
            Some(self.rejects / self.quantity)
        } else {
            None
        }
    }
}

/// Aggregate metrics computed once per snapshot and shared with the
/// recommendation rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aggregates {
    pub total_quantity: f64,
    pub total_rejects: f64,
    pub distinct_destination_count: usize,
    pub record_count: usize,
}

impl Aggregates {
    /// Overall reject ratio, or `None` when no quantity was recorded.
    pub fn reject_ratio(&self) -> Option<f64> {
        if self.total_quantity > 0.0 {
            Some(self.total_rejects / self.total_quantity)
        } else {
            None
        }
    }
}

/// An immutable, time-ordered record snapshot plus the current stock total.
///
/// This is the unit of input to [`crate::insights::InsightEngine::refresh`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<ShipmentRecord>,
    stock_on_hand: f64,
}

impl Snapshot {
    /// Validate records at the boundary and order them by timestamp.
    ///
    /// Returns [`Error::InvalidRecord`] if any required numeric field is
    /// non-finite or negative.
    pub fn new(mut records: Vec<ShipmentRecord>, stock_on_hand: f64) -> Result<Self> {
        if !stock_on_hand.is_finite() || stock_on_hand < 0.0 {
            return Err(Error::InvalidRecord(format!(
                "stock_on_hand must be finite and non-negative, got {stock_on_hand}"
            )));
        }

        for record in &records {
            if !record.quantity.is_finite() || record.quantity < 0.0 {
                return Err(Error::InvalidRecord(format!(
                    "record {}: quantity must be finite and non-negative, got {}",
                    record.id, record.quantity
                )));
            }
            if !record.rejects.is_finite() || record.rejects < 0.0 {
                return Err(Error::InvalidRecord(format!(
                    "record {}: rejects must be finite and non-negative, got {}",
                    record.id, record.rejects
                )));
            }
        }

        records.sort_by_key(|r| r.timestamp);

        Ok(Self {
            records,
            stock_on_hand,
        })
    }

    /// Empty snapshot, for the degenerate no-data refresh.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            stock_on_hand: 0.0,
        }
    }

    pub fn records(&self) -> &[ShipmentRecord] {
        &self.records
    }

    pub fn stock_on_hand(&self) -> f64 {
        self.stock_on_hand
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Aggregate metrics over the whole snapshot.
    pub fn aggregates(&self) -> Aggregates {
        let mut destinations: Vec<&str> = self.records.iter().map(|r| r.destination.as_str()).collect();
        destinations.sort_unstable();
        destinations.dedup();

        Aggregates {
            total_quantity: self.records.iter().map(|r| r.quantity).sum(),
            total_rejects: self.records.iter().map(|r| r.rejects).sum(),
            distinct_destination_count: destinations.len(),
            record_count: self.records.len(),
        }
    }

    /// Per-record quantity series, in time order.
    pub fn quantity_series(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.quantity).collect()
    }

    /// Per-record reject-rate series, in time order.
    ///
    /// Records with a zero denominator contribute no point.
    pub fn reject_rate_series(&self) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.reject_ratio())
            .collect()
    }
}
