//! Value interpolation strategies used by the tabulated model.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::AtmosphereError;

/// How the tabulated model blends two neighbouring grid samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationType {
    #[default]
    Linear,
}

impl InterpolationType {
    /// Blend `lower` and `upper` at fractional position `frac` in `[0, 1)`.
    #[inline]
    pub fn interpolate(self, lower: f64, upper: f64, frac: f64) -> f64 {
        match self {
            InterpolationType::Linear => lower + (upper - lower) * frac,
        }
    }
}

impl fmt::Display for InterpolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpolationType::Linear => f.write_str("linear"),
        }
    }
}

impl FromStr for InterpolationType {
    type Err = AtmosphereError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linear" => Ok(InterpolationType::Linear),
            other => Err(AtmosphereError::invalid(format!(
                "unknown interpolation `{other}`"
            ))),
        }
    }
}
