//! Raw sensor data model.
//!
//! One experiment's readings arrive as a complete, bounded table sampled at a
//! nominal 10 s cadence; they are held only while that experiment is
//! processed and then dropped.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One row of the raw time-series table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub timestamp: DateTime<Utc>,
    /// Stack drive current in A.
    pub current: f64,
    /// Stack voltage in V.
    pub voltage: f64,
    /// CO2 concentration in the sweep gas, in ppm.
    pub co2_ppm: f64,
    /// Sweep-air volumetric flow in L/min.
    pub air_flow: f64,
    /// Capture-solution pH; absent when the probe channel was not recorded.
    pub ph: Option<f64>,
}

/// The raw sample table for one experiment, ordered by timestamp.
#[derive(Debug, Clone, Default)]
pub struct SensorSeries {
    pub readings: Vec<SensorReading>,
}

impl SensorSeries {
    pub fn new(readings: Vec<SensorReading>) -> Self {
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// All rows whose timestamp falls in `[end - minutes, end]`, inclusive
    /// on both ends.
    pub fn trailing_window(&self, end: DateTime<Utc>, minutes: i64) -> &[SensorReading] {
        let start = end - Duration::minutes(minutes);
        let from = self.readings.partition_point(|r| r.timestamp < start);
        let to = self.readings.partition_point(|r| r.timestamp <= end);
        &self.readings[from..to]
    }
}
