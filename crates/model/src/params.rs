//! Overridable physical constants and regime boundaries for the layered model.

use atmo_core::constants::{G0, P0, R_AIR, RHO0, T0};
use serde::Deserialize;

use crate::error::AtmosphereError;
use crate::layers::AtmosphereLayer;

/// Top of the tabulated layers; isothermal extension starts here (m).
pub const EXTEND_TOP_ALTITUDE: f64 = 86_000.0;
/// Beyond this altitude the model reports vacuum (m).
pub const UPPER_BOUND: f64 = 1_000_000.0;
/// Density fraction of sea level below which the atmosphere counts as negligible.
pub const NEGLIGIBLE_RATIO: f64 = 1e-6;
/// Lapse rates at or below this magnitude are treated as isothermal (K/m).
pub const LAPSE_EPSILON: f64 = 1e-15;

/// Constants used to build a [`crate::LayeredAtmosphereModel`].
///
/// Layer bases are geometric altitudes. With the defaults, the extension anchor is
/// the top layer evaluated at 86 km, 184.65 K, which keeps the profile continuous
/// across the regime change. The tabulated 1976 values at 86 km (186.87 K, 0.3734 Pa)
/// can be set through `extend_top_temperature` and `extend_top_pressure`, at the cost
/// of a step at the boundary.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AtmosphereParameters {
    pub g0: f64,
    pub r_specific: f64,
    pub sea_level_temperature: f64,
    pub sea_level_pressure: f64,
    pub sea_level_density: f64,
    pub extend_top_altitude: f64,
    /// Extension temperature; derived from the top layer when absent.
    pub extend_top_temperature: Option<f64>,
    /// Extension pressure; derived from the top layer when absent.
    pub extend_top_pressure: Option<f64>,
    /// Temperature reported in vacuum; the extension temperature when absent.
    pub vacuum_temperature: Option<f64>,
    pub upper_bound: f64,
    pub negligible_ratio: f64,
    pub lapse_epsilon: f64,
    /// Explicit layers; the 1976 standard table when absent.
    pub layers: Option<Vec<AtmosphereLayer>>,
}

impl Default for AtmosphereParameters {
    fn default() -> Self {
        Self {
            g0: G0,
            r_specific: R_AIR,
            sea_level_temperature: T0,
            sea_level_pressure: P0,
            sea_level_density: RHO0,
            extend_top_altitude: EXTEND_TOP_ALTITUDE,
            extend_top_temperature: None,
            extend_top_pressure: None,
            vacuum_temperature: None,
            upper_bound: UPPER_BOUND,
            negligible_ratio: NEGLIGIBLE_RATIO,
            lapse_epsilon: LAPSE_EPSILON,
            layers: None,
        }
    }
}

impl AtmosphereParameters {
    /// Reject non-finite or non-physical constants.
    pub fn validate(&self) -> Result<(), AtmosphereError> {
        let positive = [
            ("g0", self.g0),
            ("r_specific", self.r_specific),
            ("sea_level_temperature", self.sea_level_temperature),
            ("sea_level_pressure", self.sea_level_pressure),
            ("sea_level_density", self.sea_level_density),
            ("extend_top_altitude", self.extend_top_altitude),
            ("negligible_ratio", self.negligible_ratio),
        ];
        for (name, value) in positive {
            require_positive(name, value)?;
        }
        for (name, value) in [
            ("extend_top_temperature", self.extend_top_temperature),
            ("extend_top_pressure", self.extend_top_pressure),
            ("vacuum_temperature", self.vacuum_temperature),
        ] {
            if let Some(value) = value {
                require_positive(name, value)?;
            }
        }
        if !self.lapse_epsilon.is_finite() || self.lapse_epsilon < 0.0 {
            return Err(AtmosphereError::invalid(format!(
                "lapse_epsilon must be finite and non-negative, got {}",
                self.lapse_epsilon
            )));
        }
        if !(self.upper_bound >= self.extend_top_altitude) {
            return Err(AtmosphereError::invalid(format!(
                "upper_bound ({}) must not lie below extend_top_altitude ({})",
                self.upper_bound, self.extend_top_altitude
            )));
        }
        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<(), AtmosphereError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AtmosphereError::invalid(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}
