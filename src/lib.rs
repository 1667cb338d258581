pub mod analysis;
pub mod config;
pub mod models;
pub mod processor;
pub mod report;
pub mod sources;

pub use analysis::segmentation::{detect_boundaries, plateau_windows, PlateauWindow};
pub use analysis::uncertain::UncertainValue;
pub use analysis::{AnalysisConfig, SegmentationConfig};
pub use models::{ExperimentMeta, ProcessedData, SensorReading, SensorSeries};
pub use processor::ExperimentProcessor;
pub use sources::SeriesSource;
