//! Standard atmosphere models: a closed-form layered evaluator, a tabulated
//! interpolating wrapper, and a factory that picks between them.
//!
//! Every model answers the same four queries through [`AtmosphereModel`]. Altitudes
//! are geometric metres; negative values clamp to sea level and altitudes beyond the
//! configured upper bound report vacuum, so queries never fail.

pub mod error;
pub mod factory;
pub mod interpolation;
pub mod layered;
pub mod layers;
pub mod negligible;
pub mod params;
pub mod sample;
pub mod tabulated;

pub use error::AtmosphereError;
pub use factory::{
    Atmosphere, AtmosphereFactory, AtmosphereKind, create_atmosphere, create_atmosphere_with,
};
pub use interpolation::InterpolationType;
pub use layered::LayeredAtmosphereModel;
pub use layers::{AtmosphereLayer, LayerTable};
pub use negligible::{NegligibleAtmosphereEvent, NegligibleAtmosphereMonitor, NegligibleObserver};
pub use params::AtmosphereParameters;
pub use sample::AtmosphereSample;
pub use tabulated::TabulatedAtmosphereModel;

/// Query contract shared by all atmosphere models.
///
/// Implementations must be safe to query concurrently. `properties` is the single
/// evaluation path; the scalar accessors project from it so the three values always
/// agree for one altitude.
pub trait AtmosphereModel: Send + Sync {
    /// Temperature, pressure, and density at `altitude_m`.
    fn properties(&self, altitude_m: f64) -> AtmosphereSample;

    /// Temperature (K).
    fn temperature(&self, altitude_m: f64) -> f64 {
        self.properties(altitude_m).temperature
    }

    /// Pressure (Pa).
    fn pressure(&self, altitude_m: f64) -> f64 {
        self.properties(altitude_m).pressure
    }

    /// Density (kg/m³).
    fn density(&self, altitude_m: f64) -> f64 {
        self.properties(altitude_m).density
    }

    /// The one-shot negligible-atmosphere event, once it has fired for this instance.
    fn negligible_event(&self) -> Option<NegligibleAtmosphereEvent>;

    /// A new, unobserved monitor using this model's sea-level density and threshold.
    fn fresh_monitor(&self) -> NegligibleAtmosphereMonitor;
}

impl<M: AtmosphereModel + ?Sized> AtmosphereModel for Box<M> {
    fn properties(&self, altitude_m: f64) -> AtmosphereSample {
        (**self).properties(altitude_m)
    }

    fn negligible_event(&self) -> Option<NegligibleAtmosphereEvent> {
        (**self).negligible_event()
    }

    fn fresh_monitor(&self) -> NegligibleAtmosphereMonitor {
        (**self).fresh_monitor()
    }
}

impl<M: AtmosphereModel + ?Sized> AtmosphereModel for std::sync::Arc<M> {
    fn properties(&self, altitude_m: f64) -> AtmosphereSample {
        (**self).properties(altitude_m)
    }

    fn negligible_event(&self) -> Option<NegligibleAtmosphereEvent> {
        (**self).negligible_event()
    }

    fn fresh_monitor(&self) -> NegligibleAtmosphereMonitor {
        (**self).fresh_monitor()
    }
}
