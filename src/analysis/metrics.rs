//! Per-window metric calculations.
//!
//! Each metric is computed from the column mean and sample standard
//! deviation over one plateau window, carried through the arithmetic as an
//! [`UncertainValue`]. An empty window (or a one-row window, whose sample
//! std is NaN) makes the results non-finite; callers substitute the sentinel
//! rather than fail the whole experiment.

use crate::analysis::constants::{
    CO2_DENSITY, CO2_MOLAR_MASS, FARADAY_CONSTANT, MEMBRANE_AREA, MEMBRANE_PAIRS,
};
use crate::analysis::uncertain::UncertainValue;
use crate::models::SensorReading;

/// Mean and sample standard deviation of one sensor channel over a window.
pub fn measure<F>(window: &[SensorReading], channel: F) -> UncertainValue
where
    F: Fn(&SensorReading) -> f64,
{
    let n = window.len();
    if n == 0 {
        return UncertainValue::new(f64::NAN, f64::NAN);
    }
    let mean = window.iter().map(&channel).sum::<f64>() / n as f64;
    if n < 2 {
        return UncertainValue::new(mean, f64::NAN);
    }
    let variance = window
        .iter()
        .map(|r| {
            let d = channel(r) - mean;
            d * d
        })
        .sum::<f64>()
        / (n - 1) as f64;
    UncertainValue::new(mean, variance.sqrt())
}

/// Actual current density (A/m^2) and its nearest ladder entry.
///
/// When two ladder entries are equally close the earlier one wins: only a
/// strictly smaller distance replaces the current pick.
pub fn current_density(window: &[SensorReading], ladder: &[f64]) -> (f64, i64) {
    let actual = measure(window, |r| r.current).value / MEMBRANE_AREA;

    let mut pick = 0;
    for (i, candidate) in ladder.iter().enumerate() {
        if (candidate - actual).abs() < (ladder[pick] - actual).abs() {
            pick = i;
        }
    }
    (actual, ladder[pick] as i64)
}

/// Stack resistance in Ω: voltage over current.
pub fn stack_resistance(window: &[SensorReading]) -> UncertainValue {
    let current = measure(window, |r| r.current);
    let voltage = measure(window, |r| r.voltage);
    voltage / current
}

/// Current efficiency in %, per membrane pair: the fraction of passed charge
/// accounted for by CO2 transfer.
pub fn current_efficiency(window: &[SensorReading]) -> UncertainValue {
    let current = measure(window, |r| r.current);

    let mol_co2_per_s = mol_co2_per_second(window);
    let mol_electrons_per_s = current / UncertainValue::exact(FARADAY_CONSTANT);

    mol_co2_per_s / mol_electrons_per_s * UncertainValue::exact(100.0)
        / UncertainValue::exact(MEMBRANE_PAIRS)
}

/// Power consumption in kWh per tonne of captured CO2.
pub fn power_consumption(window: &[SensorReading]) -> UncertainValue {
    let current = measure(window, |r| r.current);
    let voltage = measure(window, |r| r.voltage);

    // W → kWh/s
    let power = current * voltage / UncertainValue::exact(3_600_000.0);
    // g/s → tonnes/s
    let mass_co2 = gram_co2_per_second(window) / UncertainValue::exact(1_000_000.0);

    power / mass_co2
}

/// CO2 flux through the stack in mg m^-2 s^-1.
pub fn co2_flux(window: &[SensorReading]) -> UncertainValue {
    // g/s → mg/s
    let mass_co2 = gram_co2_per_second(window) * UncertainValue::exact(1000.0);
    mass_co2 / UncertainValue::exact(MEMBRANE_PAIRS * MEMBRANE_AREA)
}

/// Spread of the capture-solution pH over the window. Diagnostic only; NaN
/// when the probe channel is absent or the window is empty.
pub fn capture_ph_range(window: &[SensorReading]) -> f64 {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut seen = false;
    for ph in window.iter().filter_map(|r| r.ph) {
        min = min.min(ph);
        max = max.max(ph);
        seen = true;
    }
    if seen {
        max - min
    } else {
        f64::NAN
    }
}

/// Moles of CO2 leaving in the sweep gas per second.
fn mol_co2_per_second(window: &[SensorReading]) -> UncertainValue {
    gram_co2_per_second(window) / UncertainValue::exact(CO2_MOLAR_MASS)
}

/// Grams of CO2 leaving in the sweep gas per second.
fn gram_co2_per_second(window: &[SensorReading]) -> UncertainValue {
    let co2 = measure(window, |r| r.co2_ppm);
    let fraction_co2 = UncertainValue::new(co2.value / 1e6, co2.error / 1e6);

    // L/min → L/s
    let air_flow = measure(window, |r| r.air_flow) / UncertainValue::exact(60.0);

    fraction_co2 * air_flow * UncertainValue::exact(CO2_DENSITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn window(rows: &[(f64, f64, f64, f64)]) -> Vec<SensorReading> {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        rows.iter()
            .enumerate()
            .map(|(i, &(current, voltage, co2_ppm, air_flow))| SensorReading {
                timestamp: t0 + Duration::seconds(10 * i as i64),
                current,
                voltage,
                co2_ppm,
                air_flow,
                ph: None,
            })
            .collect()
    }

    const LADDER: [f64; 6] = [120.0, 200.0, 280.0, 360.0, 440.0, 520.0];

    #[test]
    fn measure_uses_sample_standard_deviation() {
        let rows = window(&[(1.0, 0.0, 0.0, 0.0), (2.0, 0.0, 0.0, 0.0), (3.0, 0.0, 0.0, 0.0)]);
        let m = measure(&rows, |r| r.current);

        assert_relative_eq!(m.value, 2.0);
        assert_relative_eq!(m.error, 1.0); // sqrt(((1)^2 + 0 + (1)^2) / 2)
    }

    #[test]
    fn single_row_window_has_nan_std() {
        let rows = window(&[(1.0, 4.0, 2000.0, 6.0)]);
        let m = measure(&rows, |r| r.current);

        assert_relative_eq!(m.value, 1.0);
        assert!(m.error.is_nan());
    }

    #[test]
    fn categorical_density_is_always_a_ladder_entry() {
        for mean_current in [0.1, 0.43, 0.72, 1.0, 1.3, 1.58, 1.872, 2.5] {
            let rows = window(&[(mean_current, 4.0, 0.0, 0.0); 2]);
            let (_, categorical) = current_density(&rows, &LADDER);
            assert!(LADDER.contains(&(categorical as f64)));
        }
    }

    #[test]
    fn categorical_density_tie_keeps_the_earlier_ladder_entry() {
        // 160 A/m^2 sits exactly between 120 and 200
        let current = 160.0 * MEMBRANE_AREA;
        let rows = window(&[(current, 4.0, 0.0, 0.0); 2]);

        let (actual, categorical) = current_density(&rows, &LADDER);

        assert_relative_eq!(actual, 160.0, max_relative = 1e-12);
        assert_eq!(categorical, 120);
    }

    #[test]
    fn stack_resistance_divides_voltage_stats_by_current_stats() {
        // currents {1.8, 2.2}: mean 2.0; voltages {9, 11}: mean 10
        let rows = window(&[(1.8, 9.0, 0.0, 0.0), (2.2, 11.0, 0.0, 0.0)]);

        let resistance = stack_resistance(&rows);

        assert_relative_eq!(resistance.value, 5.0);
        // both stds are sqrt(2) * half-spread: 0.2*sqrt(2) and sqrt(2)
        let expected_error = 5.0 * (2.0_f64.sqrt() / 10.0 + 0.2 * 2.0_f64.sqrt() / 2.0);
        assert_relative_eq!(resistance.error, expected_error, max_relative = 1e-12);
    }

    #[test]
    fn current_efficiency_matches_hand_computation() {
        // Constant channels with a tiny spread so stds stay finite.
        let rows = window(&[
            (2.0 - 1e-9, 4.0, 20_000.0, 6.0),
            (2.0 + 1e-9, 4.0, 20_000.0, 6.0),
        ]);

        let efficiency = current_efficiency(&rows);

        // mol CO2/s = 0.02 * (6/60) * 1.815 / 44.01
        let mol_co2 = 0.02 * 0.1 * CO2_DENSITY / CO2_MOLAR_MASS;
        // mol e-/s = 2 / 96485
        let mol_electrons = 2.0 / FARADAY_CONSTANT;
        let expected = mol_co2 / mol_electrons * 100.0 / MEMBRANE_PAIRS;
        assert_relative_eq!(efficiency.value, expected, max_relative = 1e-6);
    }

    #[test]
    fn co2_flux_matches_hand_computation() {
        let rows = window(&[
            (2.0, 4.0, 20_000.0 - 1e-6, 6.0 - 1e-9),
            (2.0, 4.0, 20_000.0 + 1e-6, 6.0 + 1e-9),
        ]);

        let flux = co2_flux(&rows);

        let mg_per_s = 0.02 * 0.1 * CO2_DENSITY * 1000.0;
        let expected = mg_per_s / (MEMBRANE_PAIRS * MEMBRANE_AREA);
        assert_relative_eq!(flux.value, expected, max_relative = 1e-6);
    }

    #[test]
    fn power_consumption_matches_hand_computation() {
        let rows = window(&[
            (2.0 - 1e-9, 4.0, 20_000.0, 6.0),
            (2.0 + 1e-9, 4.0, 20_000.0, 6.0),
        ]);

        let consumption = power_consumption(&rows);

        let kwh_per_s = 2.0 * 4.0 / 3_600_000.0;
        let tonnes_per_s = 0.02 * 0.1 * CO2_DENSITY / 1e6;
        assert_relative_eq!(
            consumption.value,
            kwh_per_s / tonnes_per_s,
            max_relative = 1e-6
        );
    }

    #[test]
    fn empty_window_yields_non_finite_metrics() {
        let rows: Vec<SensorReading> = Vec::new();

        assert!(!stack_resistance(&rows).is_finite());
        assert!(!current_efficiency(&rows).is_finite());
        assert!(!power_consumption(&rows).is_finite());
        assert!(!co2_flux(&rows).is_finite());
        assert!(current_density(&rows, &LADDER).0.is_nan());
        assert!(capture_ph_range(&rows).is_nan());
    }

    #[test]
    fn zero_current_window_yields_non_finite_resistance() {
        let rows = window(&[(0.0, 4.0, 2000.0, 6.0), (0.0, 4.1, 2000.0, 6.0)]);

        assert!(!stack_resistance(&rows).is_finite());
    }

    #[test]
    fn ph_range_spans_min_to_max() {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let rows: Vec<SensorReading> = [7.9, 8.4, 8.1]
            .iter()
            .enumerate()
            .map(|(i, &ph)| SensorReading {
                timestamp: t0 + Duration::seconds(10 * i as i64),
                current: 2.0,
                voltage: 4.0,
                co2_ppm: 2000.0,
                air_flow: 6.0,
                ph: Some(ph),
            })
            .collect();

        assert_relative_eq!(capture_ph_range(&rows), 0.5, max_relative = 1e-12);
    }
}
