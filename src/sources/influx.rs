//! InfluxDB time-series collaborator.
//!
//! Sends a Flux query for one experiment's time range and parses the
//! annotated-CSV response into a [`SensorSeries`]. The query aggregates to a
//! 10 s cadence and pivots so every sensor channel becomes a named column.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

use crate::config::Credentials;
use crate::models::{SensorReading, SensorSeries};
use crate::sources::SeriesSource;

/// Query parameters for the process-component bucket. The channel names are
/// the pivoted `field_componentId` column headers of the ED002 stand.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub bucket: String,
    pub measurement: String,
    pub location: String,
    pub stand_id: String,
    /// Aggregation window passed to the Flux query, e.g. "10s".
    pub aggregate_every: String,
    pub current_channel: String,
    pub voltage_channel: String,
    pub co2_channel: String,
    pub flow_channel: String,
    pub ph_channel: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            bucket: "MZT_Process_Components".into(),
            measurement: "component_value".into(),
            location: "arches".into(),
            stand_id: "ED002".into(),
            aggregate_every: "10s".into(),
            current_channel: "current_PSU001".into(),
            voltage_channel: "voltage_PSU001".into(),
            co2_channel: "CO2_PPM_CO2001".into(),
            flow_channel: "volumetric_flow_MFM001".into(),
            ph_channel: "pH_PH001".into(),
        }
    }
}

/// InfluxDB v2 HTTP API client.
#[derive(Debug, Clone)]
pub struct InfluxClient {
    url: String,
    token: String,
    org: String,
    config: InfluxConfig,
    client: reqwest::Client,
}

impl InfluxClient {
    pub fn new(credentials: &Credentials, config: InfluxConfig) -> Self {
        Self {
            url: credentials.influxdb_url.clone(),
            token: credentials.influxdb_api_key.clone(),
            org: credentials.influxdb_org.clone(),
            config,
            client: reqwest::Client::new(),
        }
    }

    fn flux_query(&self, start: i64, stop: i64) -> String {
        let c = &self.config;
        format!(
            r#"from(bucket: "{bucket}")
|> range(start: {start}, stop: {stop})
|> filter(fn: (r) => r["_measurement"] == "{measurement}")
|> filter(fn: (r) => r["location"] == "{location}")
|> filter(fn: (r) => r["stand_id"] == "{stand_id}")
|> aggregateWindow(every: {every}, fn: mean, createEmpty: false)
|> pivot(rowKey:["_time"], columnKey: ["_field","component_id"], valueColumn: "_value")
|> yield(name: "ED Data")"#,
            bucket = c.bucket,
            start = start,
            stop = stop,
            measurement = c.measurement,
            location = c.location,
            stand_id = c.stand_id,
            every = c.aggregate_every,
        )
    }

    async fn query_csv(&self, start: i64, stop: i64) -> Result<String> {
        let url = format!("{}/api/v2/query", self.url);
        let response = self
            .client
            .post(&url)
            .query(&[("org", self.org.as_str())])
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/vnd.flux")
            .header("Accept", "application/csv")
            .body(self.flux_query(start, stop))
            .send()
            .await
            .context("InfluxDB query request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read InfluxDB response body")?;
        if !status.is_success() {
            bail!("InfluxDB returned {status}: {}", body.trim());
        }
        Ok(body)
    }
}

impl SeriesSource for InfluxClient {
    async fn fetch(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<SensorSeries> {
        // The range() clause only accepts integral timestamps
        let body = self.query_csv(start.timestamp(), stop.timestamp()).await?;
        parse_annotated_csv(&body, &self.config)
    }
}

/// Parse an InfluxDB annotated-CSV payload into a sample table.
///
/// Annotation lines start with `#` and are skipped; the first remaining
/// record is the header. A channel cell that is empty or missing parses as
/// NaN so a patchy sensor shows up in the window statistics instead of
/// silently dropping rows. The pH channel is optional.
pub fn parse_annotated_csv(body: &str, config: &InfluxConfig) -> Result<SensorSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader
        .headers()
        .context("InfluxDB response has no header row")?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let time_idx = column("_time").context("InfluxDB response is missing the _time column")?;
    let current_idx = column(&config.current_channel)
        .with_context(|| format!("missing channel column {}", config.current_channel))?;
    let voltage_idx = column(&config.voltage_channel)
        .with_context(|| format!("missing channel column {}", config.voltage_channel))?;
    let co2_idx = column(&config.co2_channel)
        .with_context(|| format!("missing channel column {}", config.co2_channel))?;
    let flow_idx = column(&config.flow_channel)
        .with_context(|| format!("missing channel column {}", config.flow_channel))?;
    let ph_idx = column(&config.ph_channel);

    let numeric = |record: &csv::StringRecord, idx: usize| {
        record
            .get(idx)
            .filter(|cell| !cell.is_empty())
            .and_then(|cell| cell.parse::<f64>().ok())
            .unwrap_or(f64::NAN)
    };

    let mut readings = Vec::new();
    for record in reader.records() {
        let record = record.context("malformed CSV record in InfluxDB response")?;
        let Some(time_cell) = record.get(time_idx).filter(|cell| !cell.is_empty()) else {
            continue; // table separator rows repeat the annotations
        };
        let timestamp = DateTime::parse_from_rfc3339(time_cell)
            .with_context(|| format!("unparseable _time value {time_cell:?}"))?
            .with_timezone(&Utc);

        readings.push(SensorReading {
            timestamp,
            current: numeric(&record, current_idx),
            voltage: numeric(&record, voltage_idx),
            co2_ppm: numeric(&record, co2_idx),
            air_flow: numeric(&record, flow_idx),
            ph: ph_idx
                .and_then(|idx| record.get(idx))
                .filter(|cell| !cell.is_empty())
                .and_then(|cell| cell.parse::<f64>().ok()),
        });
    }

    readings.sort_by_key(|r| r.timestamp);
    Ok(SensorSeries::new(readings))
}
