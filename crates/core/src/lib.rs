//! Physical constants and unit helpers shared across the standard atmosphere workspace.

/// Physical constants expressed in SI units.
pub mod constants {
    /// Standard gravity at Earth's surface (m/s²).
    pub const G0: f64 = 9.80665;
    /// Specific gas constant of dry air (J/(kg·K)).
    pub const R_AIR: f64 = 287.053;
    /// Sea-level standard temperature (K).
    pub const T0: f64 = 288.15;
    /// Sea-level standard pressure (Pa).
    pub const P0: f64 = 101_325.0;
    /// Sea-level standard density (kg/m³).
    pub const RHO0: f64 = 1.225;
    /// Ratio of specific heats for dry air.
    pub const GAMMA_AIR: f64 = 1.4;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert Kelvin per kilometre to Kelvin per metre.
    #[inline]
    pub fn k_per_km_to_k_per_m(v: f64) -> f64 {
        v / 1_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::constants::*;
    use super::units::*;

    #[test]
    fn sea_level_constants_satisfy_ideal_gas_law() {
        let rho = P0 / (R_AIR * T0);
        assert!((rho - RHO0).abs() / RHO0 < 1e-3, "rho = {rho}");
    }

    #[test]
    fn unit_helpers_are_inverse() {
        assert_eq!(m_to_km(km_to_m(86.0)), 86.0);
        assert_eq!(k_per_km_to_k_per_m(-6.5), -0.0065);
    }
}
