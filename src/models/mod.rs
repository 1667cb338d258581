pub mod experiment;
pub mod reading;

pub use experiment::{ExperimentMeta, ProcessedData};
pub use reading::{SensorReading, SensorSeries};
