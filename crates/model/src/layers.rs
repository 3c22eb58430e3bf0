//! Physical atmosphere layers and the ordered table that holds them.

use serde::Deserialize;

use crate::error::AtmosphereError;
use crate::params::AtmosphereParameters;

/// Base altitude (m) and lapse rate (K/m) of the 1976 Standard Atmosphere layers up to 86 km.
pub const STANDARD_LAPSE_RATES: [(f64, f64); 7] = [
    (0.0, -0.0065),
    (11_000.0, 0.0),
    (20_000.0, 0.001),
    (32_000.0, 0.0028),
    (47_000.0, 0.0),
    (51_000.0, -0.0028),
    (71_000.0, -0.002),
];

/// A contiguous altitude band with a constant lapse rate.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AtmosphereLayer {
    /// Altitude where the layer starts (m).
    pub base_altitude: f64,
    /// Temperature at the base (K).
    pub base_temperature: f64,
    /// Pressure at the base (Pa).
    pub base_pressure: f64,
    /// Temperature gradient (K/m); zero for an isothermal layer.
    pub lapse_rate: f64,
}

impl AtmosphereLayer {
    /// Temperature and pressure at `altitude` using this layer's closed form.
    ///
    /// Gradient layers use the power-law barometric formula, isothermal layers the
    /// exponential one. `lapse_epsilon` separates the two regimes.
    pub fn evaluate(
        &self,
        altitude: f64,
        g0: f64,
        r_specific: f64,
        lapse_epsilon: f64,
    ) -> (f64, f64) {
        let dh = altitude - self.base_altitude;
        if self.is_isothermal(lapse_epsilon) {
            let temperature = self.base_temperature;
            let pressure = self.base_pressure * (-g0 * dh / (r_specific * temperature)).exp();
            (temperature, pressure)
        } else {
            let temperature = (self.base_temperature + self.lapse_rate * dh).max(0.0);
            let exponent = -g0 / (r_specific * self.lapse_rate);
            let pressure =
                self.base_pressure * (temperature / self.base_temperature).powf(exponent);
            (temperature, pressure)
        }
    }

    pub fn is_isothermal(&self, lapse_epsilon: f64) -> bool {
        self.lapse_rate.abs() <= lapse_epsilon
    }
}

/// Ordered, immutable set of layers starting at sea level.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerTable {
    layers: Vec<AtmosphereLayer>,
}

impl LayerTable {
    /// Validate and wrap an explicit list of layers.
    ///
    /// The first base must be 0 m and bases must strictly increase. Continuity between
    /// neighbouring layers is the caller's responsibility; see [`LayerTable::continuity_defect`].
    pub fn new(layers: Vec<AtmosphereLayer>) -> Result<Self, AtmosphereError> {
        let first = layers
            .first()
            .ok_or_else(|| AtmosphereError::invalid("layer table is empty"))?;
        if first.base_altitude != 0.0 {
            return Err(AtmosphereError::invalid(format!(
                "first layer must start at 0 m, found {} m",
                first.base_altitude
            )));
        }
        for layer in &layers {
            let finite = layer.base_altitude.is_finite()
                && layer.base_temperature.is_finite()
                && layer.base_pressure.is_finite()
                && layer.lapse_rate.is_finite();
            if !finite || layer.base_temperature <= 0.0 || layer.base_pressure <= 0.0 {
                return Err(AtmosphereError::invalid(format!(
                    "layer at {} m needs finite, positive base temperature and pressure",
                    layer.base_altitude
                )));
            }
        }
        if let Some(pair) = layers
            .windows(2)
            .find(|pair| pair[1].base_altitude <= pair[0].base_altitude)
        {
            return Err(AtmosphereError::invalid(format!(
                "layer bases must strictly increase ({} m follows {} m)",
                pair[1].base_altitude, pair[0].base_altitude
            )));
        }
        Ok(Self { layers })
    }

    /// Build a table from `(base altitude, lapse rate)` pairs, propagating base temperature
    /// and pressure upward from the sea-level state so neighbouring layers join exactly.
    pub fn from_lapse_rates(
        lapse_rates: &[(f64, f64)],
        sea_level_temperature: f64,
        sea_level_pressure: f64,
        g0: f64,
        r_specific: f64,
        lapse_epsilon: f64,
    ) -> Result<Self, AtmosphereError> {
        Self::new(propagate(
            lapse_rates,
            sea_level_temperature,
            sea_level_pressure,
            g0,
            r_specific,
            lapse_epsilon,
        ))
    }

    /// The 1976 Standard Atmosphere table up to 86 km for the given sea-level state.
    pub fn standard(
        sea_level_temperature: f64,
        sea_level_pressure: f64,
        g0: f64,
        r_specific: f64,
        lapse_epsilon: f64,
    ) -> Result<Self, AtmosphereError> {
        Self::from_lapse_rates(
            &STANDARD_LAPSE_RATES,
            sea_level_temperature,
            sea_level_pressure,
            g0,
            r_specific,
            lapse_epsilon,
        )
    }

    /// Standard table for parameters that already passed validation.
    pub(crate) fn standard_unchecked(parameters: &AtmosphereParameters) -> Self {
        Self {
            layers: propagate(
                &STANDARD_LAPSE_RATES,
                parameters.sea_level_temperature,
                parameters.sea_level_pressure,
                parameters.g0,
                parameters.r_specific,
                parameters.lapse_epsilon,
            ),
        }
    }

    /// Index of the layer with the greatest base `<= altitude`.
    ///
    /// A boundary altitude belongs to the upper layer. Altitudes below the first base
    /// map to layer 0, altitudes above the last base to the last layer.
    pub fn locate(&self, altitude: f64) -> usize {
        self.layers
            .partition_point(|layer| layer.base_altitude <= altitude)
            .saturating_sub(1)
    }

    /// Layer containing `altitude`.
    pub fn layer_at(&self, altitude: f64) -> &AtmosphereLayer {
        &self.layers[self.locate(altitude)]
    }

    pub fn layers(&self) -> &[AtmosphereLayer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn top(&self) -> &AtmosphereLayer {
        // `new` rejects empty tables.
        &self.layers[self.layers.len() - 1]
    }

    /// Worst relative mismatch between a layer's computed top state and the declared base
    /// of the layer above it. Zero for tables built by [`LayerTable::from_lapse_rates`].
    pub fn continuity_defect(&self, g0: f64, r_specific: f64, lapse_epsilon: f64) -> f64 {
        self.layers
            .windows(2)
            .map(|pair| {
                let (t, p) =
                    pair[0].evaluate(pair[1].base_altitude, g0, r_specific, lapse_epsilon);
                let dt = (t - pair[1].base_temperature).abs() / pair[1].base_temperature;
                let dp = (p - pair[1].base_pressure).abs() / pair[1].base_pressure;
                dt.max(dp)
            })
            .fold(0.0, f64::max)
    }
}

fn propagate(
    lapse_rates: &[(f64, f64)],
    sea_level_temperature: f64,
    sea_level_pressure: f64,
    g0: f64,
    r_specific: f64,
    lapse_epsilon: f64,
) -> Vec<AtmosphereLayer> {
    let mut layers: Vec<AtmosphereLayer> = Vec::with_capacity(lapse_rates.len());
    for &(base_altitude, lapse_rate) in lapse_rates {
        let (base_temperature, base_pressure) = match layers.last() {
            Some(below) => below.evaluate(base_altitude, g0, r_specific, lapse_epsilon),
            None => (sea_level_temperature, sea_level_pressure),
        };
        layers.push(AtmosphereLayer {
            base_altitude,
            base_temperature,
            base_pressure,
            lapse_rate,
        });
    }
    layers
}
