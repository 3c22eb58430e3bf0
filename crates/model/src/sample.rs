use serde::Serialize;

/// Temperature, pressure, and density at one altitude; the result of every query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtmosphereSample {
    /// Geometric altitude (m).
    pub altitude: f64,
    /// Temperature (K).
    pub temperature: f64,
    /// Pressure (Pa).
    pub pressure: f64,
    /// Density (kg/m³).
    pub density: f64,
}

impl AtmosphereSample {
    /// Build a sample from temperature and pressure, deriving density from the ideal gas law.
    pub fn from_state(altitude: f64, temperature: f64, pressure: f64, r_specific: f64) -> Self {
        Self {
            altitude,
            temperature,
            pressure,
            density: ideal_gas_density(pressure, temperature, r_specific),
        }
    }

    /// `(temperature, pressure, density)` triple.
    pub fn triple(&self) -> (f64, f64, f64) {
        (self.temperature, self.pressure, self.density)
    }

    /// Speed of sound for a calorically perfect gas (m/s). Zero in vacuum.
    pub fn speed_of_sound(&self, gamma: f64, r_specific: f64) -> f64 {
        if self.temperature > 0.0 && self.density > 0.0 {
            (gamma * r_specific * self.temperature).sqrt()
        } else {
            0.0
        }
    }

    /// Dynamic pressure `½ρv²` for a body moving at `speed_m_s` (Pa).
    pub fn dynamic_pressure(&self, speed_m_s: f64) -> f64 {
        0.5 * self.density * speed_m_s * speed_m_s
    }
}

/// `P / (R·T)` when both are positive, else zero.
pub fn ideal_gas_density(pressure: f64, temperature: f64, r_specific: f64) -> f64 {
    if pressure > 0.0 && temperature > 0.0 {
        pressure / (r_specific * temperature)
    } else {
        0.0
    }
}
