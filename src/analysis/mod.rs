pub mod config;
pub mod constants;
pub mod metrics;
pub mod segmentation;
pub mod uncertain;

pub use config::{AnalysisConfig, SegmentationConfig};
pub use segmentation::{plateau_windows, PlateauWindow};
pub use uncertain::UncertainValue;
