use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use ed_analyzer::analysis::config::AnalysisConfig;
use ed_analyzer::config::Credentials;
use ed_analyzer::models::ExperimentMeta;
use ed_analyzer::processor::ExperimentProcessor;
use ed_analyzer::report;
use ed_analyzer::sources::{DashboardRow, InfluxClient, InfluxConfig, NotionClient};

/// Derive per-plateau performance metrics for electrodialysis experiment
/// runs and render them as an HTML report.
#[derive(Debug, Parser)]
#[command(name = "ed-analyzer", version)]
struct Cli {
    /// Experiment IDs to analyze; defaults to every completed experiment on
    /// the dashboard
    experiments: Vec<String>,

    /// Output path for the HTML report
    #[arg(short, long, default_value = "out.html")]
    output: PathBuf,

    /// Rolling-median window size, in samples
    #[arg(long)]
    roll: Option<usize>,

    /// Deviation band around the rolling median, in percent
    #[arg(long)]
    tolerance: Option<f64>,

    /// Trailing steady-state window length, in minutes
    #[arg(long)]
    window_minutes: Option<i64>,
}

impl Cli {
    fn analysis_config(&self) -> AnalysisConfig {
        let mut config = AnalysisConfig::default();
        if let Some(roll) = self.roll {
            config.segmentation.roll = roll;
        }
        if let Some(tolerance) = self.tolerance {
            config.segmentation.tolerance_percent = tolerance;
        }
        if let Some(minutes) = self.window_minutes {
            config.segmentation.window_minutes = minutes;
        }
        config
    }
}

/// Match CLI IDs against the dashboard, or fall back to every completed
/// experiment. An unknown ID is a warning; an empty completed set is fatal.
fn select_experiments(dashboard: &[DashboardRow], ids: &[String]) -> Result<Vec<ExperimentMeta>> {
    let rows: Vec<&DashboardRow> = if ids.is_empty() {
        let completed: Vec<&DashboardRow> = dashboard.iter().filter(|row| row.completed).collect();
        if completed.is_empty() {
            bail!("no experiment IDs were passed and the dashboard has no completed experiments");
        }
        completed
    } else {
        ids.iter()
            .filter_map(|id| {
                let row = dashboard.iter().find(|row| &row.name == id);
                if row.is_none() {
                    warn!("no experiment with ID \"{id}\" was found");
                }
                row
            })
            .collect()
    };

    Ok(rows
        .into_iter()
        .map(|row| ExperimentMeta::new(row.label.clone(), row.start_time, row.stop_time))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn dashboard() -> Vec<DashboardRow> {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        ["ED-041", "ED-042", "ED-043"]
            .iter()
            .enumerate()
            .map(|(i, name)| DashboardRow {
                name: (*name).into(),
                label: format!("amine {i}"),
                start_time: t0 + Duration::hours(i as i64),
                stop_time: t0 + Duration::hours(i as i64 + 4),
                completed: i != 1,
            })
            .collect()
    }

    #[test]
    fn explicit_ids_skip_unknown_names() {
        let experiments =
            select_experiments(&dashboard(), &["ED-042".into(), "ED-999".into()]).unwrap();

        assert_eq!(experiments.len(), 1);
        assert_eq!(experiments[0].label, "amine 1");
    }

    #[test]
    fn default_selection_takes_completed_rows_only() {
        let experiments = select_experiments(&dashboard(), &[]).unwrap();

        assert_eq!(experiments.len(), 2);
        assert!(experiments.iter().all(|exp| exp.label != "amine 1"));
    }

    #[test]
    fn empty_completed_set_is_fatal() {
        let mut rows = dashboard();
        for row in &mut rows {
            row.completed = false;
        }

        assert!(select_experiments(&rows, &[]).is_err());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let credentials = Credentials::from_env()?;

    let notion = NotionClient::new(&credentials);
    let dashboard = notion
        .fetch_dashboard()
        .await
        .context("there was an error communicating with the Notion API")?;
    info!("dashboard has {} experiment rows", dashboard.len());

    let mut experiments = select_experiments(&dashboard, &cli.experiments)?;
    if experiments.is_empty() {
        bail!("none of the requested experiment IDs exist on the dashboard");
    }

    let influx = InfluxClient::new(&credentials, InfluxConfig::default());
    let processor = ExperimentProcessor::new(influx, cli.analysis_config());
    processor.process_all(&mut experiments).await?;

    report::write_html(&experiments, &cli.output)?;
    let plateaus: usize = experiments
        .iter()
        .map(|exp| exp.processed.plateau_count())
        .sum();
    info!(
        "wrote {} ({} experiments, {} plateaus)",
        cli.output.display(),
        experiments.len(),
        plateaus
    );
    Ok(())
}
