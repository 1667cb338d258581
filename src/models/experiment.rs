//! Experiment metadata and accumulated per-plateau results.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata for one experiment run plus the metrics accumulated for it.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentMeta {
    pub label: String,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub processed: ProcessedData,
}

impl ExperimentMeta {
    pub fn new(label: String, start_time: DateTime<Utc>, stop_time: DateTime<Utc>) -> Self {
        Self {
            label,
            start_time,
            stop_time,
            processed: ProcessedData::default(),
        }
    }
}

/// Per-plateau metric sequences.
///
/// Index-aligned: the k-th entry of every field describes the same plateau,
/// in chronological plateau order. Serializes to the metric-name → sequence
/// mapping the report consumes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    pub current_density_actual: Vec<f64>,
    pub current_density_categorical: Vec<i64>,
    pub stack_resistance: Vec<f64>,
    pub stack_resistance_error: Vec<f64>,
    pub current_efficiency: Vec<f64>,
    pub current_efficiency_error: Vec<f64>,
    pub power_consumption: Vec<f64>,
    pub power_consumption_error: Vec<f64>,
    #[serde(rename = "fluxCO2")]
    pub flux_co2: Vec<f64>,
    #[serde(rename = "fluxCO2Error")]
    pub flux_co2_error: Vec<f64>,
    #[serde(rename = "capturepHRange")]
    pub capture_ph_range: Vec<f64>,
    /// Experiment label, repeated once per plateau for downstream grouping.
    pub label: Vec<String>,
}

impl ProcessedData {
    pub fn plateau_count(&self) -> usize {
        self.label.len()
    }

    /// Append every sequence from `other`, preserving plateau order.
    pub fn extend_from(&mut self, other: &ProcessedData) {
        self.current_density_actual
            .extend_from_slice(&other.current_density_actual);
        self.current_density_categorical
            .extend_from_slice(&other.current_density_categorical);
        self.stack_resistance
            .extend_from_slice(&other.stack_resistance);
        self.stack_resistance_error
            .extend_from_slice(&other.stack_resistance_error);
        self.current_efficiency
            .extend_from_slice(&other.current_efficiency);
        self.current_efficiency_error
            .extend_from_slice(&other.current_efficiency_error);
        self.power_consumption
            .extend_from_slice(&other.power_consumption);
        self.power_consumption_error
            .extend_from_slice(&other.power_consumption_error);
        self.flux_co2.extend_from_slice(&other.flux_co2);
        self.flux_co2_error.extend_from_slice(&other.flux_co2_error);
        self.capture_ph_range
            .extend_from_slice(&other.capture_ph_range);
        self.label.extend_from_slice(&other.label);
    }
}
