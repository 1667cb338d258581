//! Plateau detection over the current channel.
//!
//! The operator changes the current-density setpoint abruptly, so a reading
//! that deviates from a trailing rolling median by more than the tolerance
//! band marks the end of the outgoing plateau. The rolling median keeps the
//! detector robust to sensor noise while staying sensitive to step changes.

use chrono::{DateTime, Duration, Utc};

use crate::analysis::config::SegmentationConfig;
use crate::models::SensorSeries;

/// A time range believed to hold one stable current-density setpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateauWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Index positions marking the last stable sample of each plateau.
///
/// Scans the current sequence against a trailing rolling median of `roll`
/// samples. A reading outside `median * (1 ± tolerance)` records the index
/// *before* it (the last sample of the outgoing plateau) and skips
/// `2 * roll` samples to clear the transient. A forced tail boundary at
/// `len - tail_offset` captures the final plateau even when no further
/// setpoint change was seen.
pub fn detect_boundaries(currents: &[f64], config: &SegmentationConfig) -> Vec<usize> {
    let roll = config.roll.max(1);
    let tolerance = config.tolerance_percent / 100.0;
    let mut boundaries = Vec::new();

    let mut n = roll * 2;
    while n < currents.len() {
        let median = trailing_median(&currents[n + 1 - roll..=n]);
        let upper = median * (1.0 + tolerance);
        let lower = median * (1.0 - tolerance);
        if currents[n] > upper || currents[n] < lower {
            boundaries.push(n - 1);
            n += roll * 2;
        }
        n += 1;
    }

    boundaries.push(currents.len().saturating_sub(config.tail_offset));
    boundaries
}

/// Plateau windows for one experiment's series: a trailing
/// `window_minutes`-long range ending exactly at each boundary sample's
/// timestamp.
pub fn plateau_windows(series: &SensorSeries, config: &SegmentationConfig) -> Vec<PlateauWindow> {
    if series.is_empty() {
        return Vec::new();
    }

    let currents: Vec<f64> = series.readings.iter().map(|r| r.current).collect();
    detect_boundaries(&currents, config)
        .into_iter()
        .filter_map(|idx| series.readings.get(idx))
        .map(|reading| PlateauWindow {
            start_time: reading.timestamp - Duration::minutes(config.window_minutes),
            end_time: reading.timestamp,
        })
        .collect()
}

/// Median of a window of samples ending at the scan position.
fn trailing_median(window: &[f64]) -> f64 {
    let mut sorted = window.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
