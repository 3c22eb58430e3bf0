//! Closed-form piecewise-layer atmosphere.

use log::debug;

use crate::error::AtmosphereError;
use crate::layers::LayerTable;
use crate::negligible::{
    NegligibleAtmosphereEvent, NegligibleAtmosphereMonitor, NegligibleObserver,
};
use crate::params::AtmosphereParameters;
use crate::sample::AtmosphereSample;
use crate::AtmosphereModel;

/// Analytic evaluator over a [`LayerTable`].
///
/// Three regimes, by altitude `h` (negative altitudes clamp to 0):
/// - `h < extend_top_altitude`: the layer containing `h`, gradient or isothermal closed form;
/// - `h <= upper_bound`: isothermal extension anchored at the top of the table;
/// - above: vacuum, zero pressure and density.
#[derive(Debug)]
pub struct LayeredAtmosphereModel {
    table: LayerTable,
    g0: f64,
    r_specific: f64,
    lapse_epsilon: f64,
    extend_top_altitude: f64,
    extend_top_temperature: f64,
    extend_top_pressure: f64,
    vacuum_temperature: f64,
    upper_bound: f64,
    monitor: NegligibleAtmosphereMonitor,
}

impl LayeredAtmosphereModel {
    /// Build a model from validated parameters.
    pub fn new(parameters: AtmosphereParameters) -> Result<Self, AtmosphereError> {
        parameters.validate()?;
        let table = match &parameters.layers {
            Some(layers) => LayerTable::new(layers.clone())?,
            None => LayerTable::standard(
                parameters.sea_level_temperature,
                parameters.sea_level_pressure,
                parameters.g0,
                parameters.r_specific,
                parameters.lapse_epsilon,
            )?,
        };
        if table.top().base_altitude >= parameters.extend_top_altitude {
            return Err(AtmosphereError::invalid(format!(
                "extend_top_altitude ({} m) must lie above the last layer base ({} m)",
                parameters.extend_top_altitude,
                table.top().base_altitude
            )));
        }
        let model = Self::assemble(parameters, table);
        let anchored = model.extend_top_temperature.is_finite()
            && model.extend_top_temperature > 0.0
            && model.extend_top_pressure.is_finite()
            && model.extend_top_pressure > 0.0;
        if !anchored {
            return Err(AtmosphereError::invalid(format!(
                "layer table gives a non-physical state at {} m ({} K, {} Pa)",
                model.extend_top_altitude, model.extend_top_temperature, model.extend_top_pressure
            )));
        }
        Ok(model)
    }

    /// The 1976 Standard Atmosphere with default constants.
    pub fn standard() -> Self {
        let parameters = AtmosphereParameters::default();
        let table = LayerTable::standard_unchecked(&parameters);
        Self::assemble(parameters, table)
    }

    /// Attach a callback for the one-shot negligible-atmosphere event.
    pub fn with_observer(mut self, observer: NegligibleObserver) -> Self {
        self.monitor = self.monitor.with_observer(observer);
        self
    }

    fn assemble(parameters: AtmosphereParameters, table: LayerTable) -> Self {
        let (top_temperature, top_pressure) = table.top().evaluate(
            parameters.extend_top_altitude,
            parameters.g0,
            parameters.r_specific,
            parameters.lapse_epsilon,
        );
        let extend_top_temperature = parameters.extend_top_temperature.unwrap_or(top_temperature);
        let extend_top_pressure = parameters.extend_top_pressure.unwrap_or(top_pressure);
        let vacuum_temperature = parameters.vacuum_temperature.unwrap_or(extend_top_temperature);
        debug!(
            "layered atmosphere: {} layers, extension at {} m ({:.2} K, {:.4} Pa), vacuum above {} m",
            table.len(),
            parameters.extend_top_altitude,
            extend_top_temperature,
            extend_top_pressure,
            parameters.upper_bound
        );

        Self {
            g0: parameters.g0,
            r_specific: parameters.r_specific,
            lapse_epsilon: parameters.lapse_epsilon,
            extend_top_altitude: parameters.extend_top_altitude,
            extend_top_temperature,
            extend_top_pressure,
            vacuum_temperature,
            upper_bound: parameters.upper_bound,
            monitor: NegligibleAtmosphereMonitor::new(
                parameters.sea_level_density,
                parameters.negligible_ratio,
            ),
            table,
        }
    }

    /// Pure evaluation without touching the negligible-atmosphere monitor.
    pub fn evaluate(&self, altitude_m: f64) -> AtmosphereSample {
        let h = altitude_m.max(0.0);
        let (temperature, pressure) = if h < self.extend_top_altitude {
            self.table
                .layer_at(h)
                .evaluate(h, self.g0, self.r_specific, self.lapse_epsilon)
        } else if h <= self.upper_bound {
            let dh = h - self.extend_top_altitude;
            let scale = self.r_specific * self.extend_top_temperature;
            (
                self.extend_top_temperature,
                self.extend_top_pressure * (-self.g0 * dh / scale).exp(),
            )
        } else {
            (self.vacuum_temperature, 0.0)
        };
        AtmosphereSample::from_state(h, temperature, pressure, self.r_specific)
    }

    pub fn table(&self) -> &LayerTable {
        &self.table
    }

    pub fn r_specific(&self) -> f64 {
        self.r_specific
    }

    pub fn extend_top_altitude(&self) -> f64 {
        self.extend_top_altitude
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }
}

impl Default for LayeredAtmosphereModel {
    fn default() -> Self {
        Self::standard()
    }
}

impl AtmosphereModel for LayeredAtmosphereModel {
    fn properties(&self, altitude_m: f64) -> AtmosphereSample {
        let sample = self.evaluate(altitude_m);
        self.monitor.observe(sample.altitude, sample.density);
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
    use crate::layers::AtmosphereLayer;
    use atmo_core::constants::{P0, R_AIR, T0};

    #[test]
    fn sea_level_state() {
        let model = LayeredAtmosphereModel::standard();
        let s = model.properties(0.0);
        assert!((s.temperature - T0).abs() / T0 < 1e-3);
        assert!((s.pressure - P0).abs() / P0 < 1e-3);
        assert!((s.density - 1.225).abs() < 1e-3, "rho0 = {}", s.density);
    }

    #[test]
    fn negative_altitude_clamps_to_sea_level() {
        let model = LayeredAtmosphereModel::standard();
        assert_eq!(model.properties(-500.0), model.properties(0.0));
    }

    #[test]
    fn tropopause_matches_reference_values() {
        let model = LayeredAtmosphereModel::standard();
        let (t, p, rho) = model.properties(11_000.0).triple();
        assert!((t - 216.65).abs() < 1e-9);
        assert!((p - 22_632.0).abs() / 22_632.0 < 1e-3, "p = {p}");
        assert!((rho - 0.3639).abs() < 1e-3, "rho = {rho}");
    }

    #[test]
    fn isothermal_layer_holds_temperature() {
        let model = LayeredAtmosphereModel::standard();
        assert!((model.temperature(15_000.0) - 216.65).abs() < 1e-9);
        assert_eq!(model.temperature(12_000.0), model.temperature(19_999.0));
        assert!((model.temperature(49_000.0) - 270.65).abs() < 1e-9);
    }

    #[test]
    fn extension_regime_is_isothermal_and_continuous() {
        let model = LayeredAtmosphereModel::standard();
        let below = model.evaluate(86_000.0 - 1e-6);
        let at = model.evaluate(86_000.0);
        assert!((below.temperature - at.temperature).abs() < 1e-6);
        assert!((below.pressure - at.pressure).abs() / at.pressure < 1e-6);
        assert!((at.temperature - 184.65).abs() < 1e-9);
        assert_eq!(model.temperature(500_000.0), at.temperature);
        assert!(model.pressure(500_000.0) < at.pressure);
        assert!(model.pressure(1_000_000.0) > 0.0);
    }

    #[test]
    fn vacuum_beyond_upper_bound() {
        let model = LayeredAtmosphereModel::standard();
        let s = model.properties(1_000_000.5);
        assert_eq!(s.pressure, 0.0);
        assert_eq!(s.density, 0.0);
        assert!((s.temperature - 184.65).abs() < 1e-9);
    }

    #[test]
    fn overridden_anchors_and_vacuum_temperature() {
        let model = LayeredAtmosphereModel::new(AtmosphereParameters {
            extend_top_temperature: Some(186.87),
            extend_top_pressure: Some(0.3734),
            vacuum_temperature: Some(3.0),
            ..Default::default()
        })
        .expect("valid parameters");
        assert_eq!(model.temperature(90_000.0), 186.87);
        assert_eq!(model.pressure(86_000.0), 0.3734);
        assert_eq!(model.temperature(2.0e6), 3.0);
    }

    #[test]
    fn custom_single_layer_table() {
        let model = LayeredAtmosphereModel::new(AtmosphereParameters {
            layers: Some(vec![AtmosphereLayer {
                base_altitude: 0.0,
                base_temperature: 250.0,
                base_pressure: 50_000.0,
                lapse_rate: 0.0,
            }]),
            ..Default::default()
        })
        .expect("valid parameters");
        let s = model.properties(5_000.0);
        assert_eq!(s.temperature, 250.0);
        assert!((s.density - s.pressure / (R_AIR * 250.0)).abs() < 1e-15);
    }

    #[test]
    fn extension_must_sit_above_the_table() {
        let err = LayeredAtmosphereModel::new(AtmosphereParameters {
            extend_top_altitude: 60_000.0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AtmosphereError::InvalidConfiguration(_)));
    }

    #[test]
    fn table_that_cools_to_zero_before_the_extension_is_rejected() {
        let err = LayeredAtmosphereModel::new(AtmosphereParameters {
            layers: Some(vec![AtmosphereLayer {
                base_altitude: 0.0,
                base_temperature: 100.0,
                base_pressure: 1_000.0,
                lapse_rate: -0.01,
            }]),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AtmosphereError::InvalidConfiguration(_)));

        let overridden = LayeredAtmosphereModel::new(AtmosphereParameters {
            layers: Some(vec![AtmosphereLayer {
                base_altitude: 0.0,
                base_temperature: 100.0,
                base_pressure: 1_000.0,
                lapse_rate: -0.01,
            }]),
            extend_top_altitude: 5_000.0,
            ..Default::default()
        })
        .expect("layer still warm at the extension base");
        let s = overridden.properties(5_000.0);
        assert!(s.pressure.is_finite() && s.pressure > 0.0);
        assert_eq!(s.temperature, 50.0);
    }

    #[test]
    fn evaluate_does_not_record_events() {
        let model = LayeredAtmosphereModel::standard();
        model.evaluate(2.0e6);
        assert!(model.negligible_event().is_none());
        model.properties(2.0e6);
        assert!(model.negligible_event().is_some());
    }
}
