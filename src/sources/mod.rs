pub mod influx;
pub mod notion;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::SensorSeries;

pub use influx::{InfluxClient, InfluxConfig};
pub use notion::{DashboardRow, NotionClient};

/// Supplies the raw sample table for one experiment's time range.
pub trait SeriesSource {
    fn fetch(
        &self,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<SensorSeries>> + Send;
}
