//! Pipeline orchestration: fetch → segment → per-window metrics.
//!
//! Experiments are processed strictly one at a time. A failed fetch or an
//! empty table skips that experiment with a warning; a failed metric
//! computation substitutes the `(0, 0)` sentinel for that one value. Only a
//! batch where every experiment fails aborts the run.

use anyhow::{bail, Context, Result};
use log::warn;

use crate::analysis::config::AnalysisConfig;
use crate::analysis::metrics;
use crate::analysis::segmentation::plateau_windows;
use crate::analysis::uncertain::UncertainValue;
use crate::models::{ExperimentMeta, SensorReading};
use crate::sources::SeriesSource;

pub struct ExperimentProcessor<S> {
    source: S,
    config: AnalysisConfig,
}

impl<S: SeriesSource> ExperimentProcessor<S> {
    pub fn new(source: S, config: AnalysisConfig) -> Self {
        Self { source, config }
    }

    /// Process a batch of experiments, filling each one's `processed` data.
    ///
    /// Experiments are put in ascending chronological order of start time
    /// first (stable sort), so the aggregated result table is ordered even
    /// when the dashboard is not.
    pub async fn process_all(&self, experiments: &mut [ExperimentMeta]) -> Result<()> {
        experiments.sort_by_key(|exp| exp.start_time);

        let mut succeeded = 0usize;
        for experiment in experiments.iter_mut() {
            match self.process_one(experiment).await {
                Ok(()) => succeeded += 1,
                Err(err) => warn!("skipping experiment \"{}\": {err:#}", experiment.label),
            }
        }

        if succeeded == 0 && !experiments.is_empty() {
            bail!("all {} experiments failed to process", experiments.len());
        }
        Ok(())
    }

    async fn process_one(&self, experiment: &mut ExperimentMeta) -> Result<()> {
        let series = self
            .source
            .fetch(experiment.start_time, experiment.stop_time)
            .await
            .context("time-series fetch failed")?;
        if series.is_empty() {
            bail!("time-series query returned no rows");
        }

        for window in plateau_windows(&series, &self.config.segmentation) {
            let rows = series.trailing_window(window.end_time, self.config.segmentation.window_minutes);
            self.compute_window(experiment, rows);
        }
        Ok(())
    }

    /// Compute every metric for one plateau window and append the results.
    ///
    /// Each metric is checked independently, so one non-finite result is
    /// replaced by the sentinel without blocking the others.
    fn compute_window(&self, experiment: &mut ExperimentMeta, rows: &[SensorReading]) {
        let label = experiment.label.clone();
        let data = &mut experiment.processed;

        let (mut actual, mut categorical) =
            metrics::current_density(rows, &self.config.density_ladder);
        if !actual.is_finite() {
            warn!("failed to compute current density for experiment \"{label}\"; substituting zero");
            (actual, categorical) = (0.0, 0);
        }
        data.current_density_actual.push(actual);
        data.current_density_categorical.push(categorical);

        let resistance = sanitize("stack resistance", metrics::stack_resistance(rows), &label, actual);
        data.stack_resistance.push(resistance.value);
        data.stack_resistance_error.push(resistance.error);

        let efficiency = sanitize("current efficiency", metrics::current_efficiency(rows), &label, actual);
        data.current_efficiency.push(efficiency.value);
        data.current_efficiency_error.push(efficiency.error);

        let consumption = sanitize("power consumption", metrics::power_consumption(rows), &label, actual);
        data.power_consumption.push(consumption.value);
        data.power_consumption_error.push(consumption.error);

        let flux = sanitize("CO2 flux", metrics::co2_flux(rows), &label, actual);
        data.flux_co2.push(flux.value);
        data.flux_co2_error.push(flux.error);

        let ph_range = metrics::capture_ph_range(rows);
        data.capture_ph_range.push(if ph_range.is_finite() {
            ph_range
        } else {
            0.0
        });

        data.label.push(label);
    }
}

/// Replace a non-finite metric with the `(0, 0)` sentinel, logging which
/// experiment and current density it belonged to.
fn sanitize(name: &str, value: UncertainValue, label: &str, density: f64) -> UncertainValue {
    if value.is_finite() {
        value
    } else {
        warn!(
            "failed to compute {name} for experiment \"{label}\" at current density {density:.1} A/m^2; substituting zero"
        );
        UncertainValue::new(0.0, 0.0)
    }
}
