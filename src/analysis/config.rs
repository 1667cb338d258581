/// Tuning parameters for plateau detection.
///
/// The defaults are empirical values tuned against the ED002 stand; they are
/// apparatus-specific, not derived from first principles.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Rolling-median window size, in samples.
    pub roll: usize,

    /// Allowed deviation of a reading from the rolling median, in percent.
    /// A reading outside this band marks the end of a plateau.
    pub tolerance_percent: f64,

    /// Length of the trailing steady-state window sliced at each boundary.
    pub window_minutes: i64,

    /// How many samples before the end of the series the forced tail
    /// boundary is placed.
    pub tail_offset: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            roll: 5,
            tolerance_percent: 10.0,
            window_minutes: 5,
            tail_offset: 5,
        }
    }
}

/// All tunables for the processing pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub segmentation: SegmentationConfig,

    /// Discrete current-density setpoints (A/m^2) that actual readings snap
    /// to for grouping. Only a plotting key, not a physical measurement.
    pub density_ladder: Vec<f64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segmentation: SegmentationConfig::default(),
            density_ladder: vec![120.0, 200.0, 280.0, 360.0, 440.0, 520.0],
        }
    }
}
