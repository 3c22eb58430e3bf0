//! Precomputed, interpolated view of another atmosphere model.

use log::debug;

use crate::error::AtmosphereError;
use crate::interpolation::InterpolationType;
use crate::layered::LayeredAtmosphereModel;
use crate::negligible::{NegligibleAtmosphereEvent, NegligibleAtmosphereMonitor};
use crate::sample::AtmosphereSample;
use crate::AtmosphereModel;

/// Largest grid the tabulated model will allocate.
pub const MAX_GRID_SAMPLES: usize = 50_000_000;

/// Samples a source model on a uniform altitude grid once, then answers queries by
/// interpolating between the two bracketing samples.
///
/// Temperature, pressure, and density are interpolated independently. Interpolated
/// density therefore satisfies the ideal gas law only at grid nodes; between nodes it
/// deviates by an amount that shrinks with the step.
#[derive(Debug)]
pub struct TabulatedAtmosphereModel<S = LayeredAtmosphereModel> {
    source: S,
    interpolation: InterpolationType,
    step: f64,
    grid: Vec<AtmosphereSample>,
    monitor: NegligibleAtmosphereMonitor,
}

impl<S: AtmosphereModel> TabulatedAtmosphereModel<S> {
    /// Sample `source` at `0, step, 2·step, …` up to and including `max_altitude`.
    ///
    /// The table gets its own negligible-atmosphere monitor with the source's threshold;
    /// events the source raised while the grid was built stay with the source.
    pub fn new(
        source: S,
        interpolation: InterpolationType,
        step: f64,
        max_altitude: f64,
    ) -> Result<Self, AtmosphereError> {
        if !(step.is_finite() && step > 0.0) {
            return Err(AtmosphereError::invalid(format!(
                "tabulation step must be positive, got {step}"
            )));
        }
        if !(max_altitude.is_finite() && max_altitude > 0.0) {
            return Err(AtmosphereError::invalid(format!(
                "tabulation max altitude must be positive, got {max_altitude}"
            )));
        }
        let expected = (max_altitude / step).ceil() + 1.0;
        if expected > MAX_GRID_SAMPLES as f64 {
            return Err(AtmosphereError::invalid(format!(
                "tabulation step {step} m up to {max_altitude} m needs {expected} samples (limit {MAX_GRID_SAMPLES})"
            )));
        }

        let grid = build_grid(&source, step, max_altitude, expected as usize);
        debug!(
            "tabulated atmosphere: {} samples, step {} m, up to {} m ({})",
            grid.len(),
            step,
            max_altitude,
            interpolation
        );

        let monitor = source.fresh_monitor();
        Ok(Self {
            source,
            interpolation,
            step,
            grid,
            monitor,
        })
    }

    /// Replace the default negligible-atmosphere monitor.
    pub fn with_monitor(mut self, monitor: NegligibleAtmosphereMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// Interpolated sample without touching the negligible-atmosphere monitor.
    pub fn lookup(&self, altitude_m: f64) -> AtmosphereSample {
        let first = &self.grid[0];
        let last = &self.grid[self.grid.len() - 1];
        if !(altitude_m > first.altitude) {
            return *first;
        }
        if altitude_m >= last.altitude {
            return *last;
        }

        let i = self.bracket(altitude_m);
        let lower = &self.grid[i];
        let upper = &self.grid[i + 1];
        let frac = (altitude_m - lower.altitude) / (upper.altitude - lower.altitude);
        let blend = |a: f64, b: f64| self.interpolation.interpolate(a, b, frac);
        AtmosphereSample {
            altitude: altitude_m,
            temperature: blend(lower.temperature, upper.temperature),
            pressure: blend(lower.pressure, upper.pressure),
            density: blend(lower.density, upper.density),
        }
    }

    /// Index `i` with `grid[i].altitude <= h < grid[i + 1].altitude`, for `h` strictly
    /// inside the grid.
    fn bracket(&self, altitude_m: f64) -> usize {
        let last_interval = self.grid.len() - 2;
        let mut i = ((altitude_m / self.step).floor() as usize).min(last_interval);
        while i > 0 && self.grid[i].altitude > altitude_m {
            i -= 1;
        }
        while i < last_interval && self.grid[i + 1].altitude <= altitude_m {
            i += 1;
        }
        i
    }

    pub fn grid(&self) -> &[AtmosphereSample] {
        &self.grid
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn max_altitude(&self) -> f64 {
        self.grid[self.grid.len() - 1].altitude
    }

    pub fn interpolation(&self) -> InterpolationType {
        self.interpolation
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn build_grid<S: AtmosphereModel>(
    source: &S,
    step: f64,
    max_altitude: f64,
    capacity: usize,
) -> Vec<AtmosphereSample> {
    let mut grid = Vec::with_capacity(capacity);
    grid.push(sample_at(source, 0.0));
    let mut i: u64 = 1;
    loop {
        let altitude = i as f64 * step;
        // Absorb a final sliver left by rounding instead of emitting a near-duplicate node.
        if altitude >= max_altitude || max_altitude - altitude < step * 1e-9 {
            grid.push(sample_at(source, max_altitude));
            break;
        }
        grid.push(sample_at(source, altitude));
        i += 1;
    }
    grid
}

fn sample_at<S: AtmosphereModel>(source: &S, altitude: f64) -> AtmosphereSample {
    AtmosphereSample {
        altitude,
        ..source.properties(altitude)
    }
}

impl<S: AtmosphereModel> AtmosphereModel for TabulatedAtmosphereModel<S> {
    fn properties(&self, altitude_m: f64) -> AtmosphereSample {
        let sample = self.lookup(altitude_m);
        self.monitor.observe(altitude_m.max(0.0), sample.density);
        sample
    }

    fn negligible_event(&self) -> Option<NegligibleAtmosphereEvent> {
        self.monitor.event()
    }

    fn fresh_monitor(&self) -> NegligibleAtmosphereMonitor {
        self.monitor.detached()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AtmosphereParameters;
    use atmo_core::constants::R_AIR;

    fn table(step: f64, max_altitude: f64) -> TabulatedAtmosphereModel {
        TabulatedAtmosphereModel::new(
            LayeredAtmosphereModel::standard(),
            InterpolationType::Linear,
            step,
            max_altitude,
        )
        .expect("valid tabulation")
    }

    #[test]
    fn rejects_non_positive_step_and_extent() {
        let cases = [
            (0.0, 1_000.0),
            (-5.0, 1_000.0),
            (f64::NAN, 1_000.0),
            (10.0, 0.0),
            (10.0, -1.0),
        ];
        for (step, max) in cases {
            let result = TabulatedAtmosphereModel::new(
                LayeredAtmosphereModel::standard(),
                InterpolationType::Linear,
                step,
                max,
            );
            assert!(
                matches!(result, Err(AtmosphereError::InvalidConfiguration(_))),
                "step {step}, max {max}"
            );
        }
    }

    #[test]
    fn rejects_oversized_grid() {
        let result = TabulatedAtmosphereModel::new(
            LayeredAtmosphereModel::standard(),
            InterpolationType::Linear,
            1e-3,
            1.0e6,
        );
        assert!(matches!(result, Err(AtmosphereError::InvalidConfiguration(_))));
    }

    #[test]
    fn grid_is_uniform_and_ends_exactly_at_max() {
        let exact = table(1_000.0, 10_000.0);
        assert_eq!(exact.grid().len(), 11);
        assert_eq!(exact.grid()[3].altitude, 3_000.0);
        assert_eq!(exact.max_altitude(), 10_000.0);

        let partial = table(1_000.0, 10_500.0);
        assert_eq!(partial.grid().len(), 12);
        assert_eq!(partial.grid()[10].altitude, 10_000.0);
        assert_eq!(partial.max_altitude(), 10_500.0);

        let tiny = table(1_000.0, 10.0);
        assert_eq!(tiny.grid().len(), 2);
    }

    #[test]
    fn nodes_reproduce_source_exactly() {
        let model = table(500.0, 20_000.0);
        let source = LayeredAtmosphereModel::standard();
        for node in model.grid() {
            let expected = source.evaluate(node.altitude);
            assert_eq!(model.lookup(node.altitude).triple(), expected.triple());
        }
    }

    #[test]
    fn clamps_outside_the_grid() {
        let model = table(1_000.0, 10_000.0);
        assert_eq!(model.lookup(-50.0), model.grid()[0]);
        assert_eq!(model.lookup(25_000.0), model.grid()[10]);
        assert_eq!(model.lookup(25_000.0).altitude, 10_000.0);
    }

    #[test]
    fn linear_midpoint_between_nodes() {
        let model = table(1_000.0, 10_000.0);
        let lower = model.grid()[2];
        let upper = model.grid()[3];
        let mid = model.lookup(2_500.0);
        assert!((mid.temperature - 0.5 * (lower.temperature + upper.temperature)).abs() < 1e-9);
        assert!((mid.pressure - 0.5 * (lower.pressure + upper.pressure)).abs() < 1e-9);
        assert!((mid.density - 0.5 * (lower.density + upper.density)).abs() < 1e-12);
    }

    #[test]
    fn interpolated_density_is_only_approximately_ideal() {
        let model = table(1_000.0, 20_000.0);
        let s = model.lookup(5_500.0);
        let ideal = s.pressure / (R_AIR * s.temperature);
        let relative = (s.density - ideal).abs() / ideal;
        assert!(relative > 0.0, "density should be interpolated, not re-derived");
        assert!(relative < 5e-3, "relative mismatch {relative}");
    }

    #[test]
    fn source_events_do_not_leak_into_the_table() {
        let model = table(1_000.0, 200_000.0);
        assert!(model.source().negligible_event().is_some());
        assert!(model.negligible_event().is_none());
        model.properties(150_000.0);
        assert!(model.negligible_event().is_some());
    }

    #[test]
    fn event_records_the_query_altitude_beyond_the_grid() {
        let model = table(1_000.0, 120_000.0);
        let sample = model.properties(2.0e6);
        assert_eq!(sample.altitude, 120_000.0);
        let event = model.negligible_event().expect("event recorded");
        assert_eq!(event.altitude, 2.0e6);
        assert!(event.density_ratio < 1e-6);
    }

    #[test]
    fn threshold_comes_from_the_source_parameters() {
        let source = LayeredAtmosphereModel::new(AtmosphereParameters {
            negligible_ratio: 1e-2,
            ..Default::default()
        })
        .expect("valid parameters");
        let model =
            TabulatedAtmosphereModel::new(source, InterpolationType::Linear, 1_000.0, 50_000.0)
                .expect("valid tabulation");
        assert_eq!(model.interpolation(), InterpolationType::Linear);
        model.properties(20_000.0);
        assert!(model.negligible_event().is_none());
        model.properties(40_000.0);
        let event = model.negligible_event().expect("event recorded");
        assert_eq!(event.altitude, 40_000.0);
        assert!(event.density_ratio < 1e-2);
    }
}
