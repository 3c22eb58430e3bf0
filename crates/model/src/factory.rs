//! Maps a requested model kind onto a constructed model.

use std::fmt;
use std::str::FromStr;

use log::trace;
use serde::Deserialize;

use crate::error::AtmosphereError;
use crate::interpolation::InterpolationType;
use crate::layered::LayeredAtmosphereModel;
use crate::negligible::{
    NegligibleAtmosphereEvent, NegligibleAtmosphereMonitor, NegligibleObserver,
};
use crate::params::AtmosphereParameters;
use crate::sample::AtmosphereSample;
use crate::tabulated::TabulatedAtmosphereModel;
use crate::AtmosphereModel;

/// Model kinds the factory knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtmosphereKind {
    /// Closed-form layered 1976 Standard Atmosphere.
    Isa,
    /// The layered model precomputed on a grid and interpolated.
    IsaTable,
}

impl fmt::Display for AtmosphereKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtmosphereKind::Isa => f.write_str("isa"),
            AtmosphereKind::IsaTable => f.write_str("isa_table"),
        }
    }
}

impl FromStr for AtmosphereKind {
    type Err = AtmosphereError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "isa" => Ok(AtmosphereKind::Isa),
            "isa_table" => Ok(AtmosphereKind::IsaTable),
            _ => Err(AtmosphereError::UnsupportedModelKind(s.to_string())),
        }
    }
}

/// A constructed model; callers query it through [`AtmosphereModel`] without caring
/// which variant they hold.
#[derive(Debug)]
pub enum Atmosphere {
    Layered(LayeredAtmosphereModel),
    Tabulated(TabulatedAtmosphereModel<LayeredAtmosphereModel>),
}

impl Atmosphere {
    pub fn kind(&self) -> AtmosphereKind {
        match self {
            Atmosphere::Layered(_) => AtmosphereKind::Isa,
            Atmosphere::Tabulated(_) => AtmosphereKind::IsaTable,
        }
    }

    /// Specific gas constant of the underlying layered model (J/(kg·K)).
    pub fn r_specific(&self) -> f64 {
        match self {
            Atmosphere::Layered(model) => model.r_specific(),
            Atmosphere::Tabulated(model) => model.source().r_specific(),
        }
    }
}

impl AtmosphereModel for Atmosphere {
    fn properties(&self, altitude_m: f64) -> AtmosphereSample {
        match self {
            Atmosphere::Layered(model) => model.properties(altitude_m),
            Atmosphere::Tabulated(model) => model.properties(altitude_m),
        }
    }

    fn negligible_event(&self) -> Option<NegligibleAtmosphereEvent> {
        match self {
            Atmosphere::Layered(model) => model.negligible_event(),
            Atmosphere::Tabulated(model) => model.negligible_event(),
        }
    }

    fn fresh_monitor(&self) -> NegligibleAtmosphereMonitor {
        match self {
            Atmosphere::Layered(model) => model.fresh_monitor(),
            Atmosphere::Tabulated(model) => model.fresh_monitor(),
        }
    }
}

/// Builds models from shared parameters.
#[derive(Clone, Default)]
pub struct AtmosphereFactory {
    parameters: AtmosphereParameters,
    table_max_altitude: Option<f64>,
    observer: Option<NegligibleObserver>,
}

impl AtmosphereFactory {
    pub fn new(parameters: AtmosphereParameters) -> Self {
        Self {
            parameters,
            table_max_altitude: None,
            observer: None,
        }
    }

    /// Top of the tabulated grid; defaults to the layered model's upper bound.
    pub fn with_table_max_altitude(mut self, max_altitude: f64) -> Self {
        self.table_max_altitude = Some(max_altitude);
        self
    }

    /// Observer handed to every model this factory builds.
    pub fn with_observer(mut self, observer: NegligibleObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn parameters(&self) -> &AtmosphereParameters {
        &self.parameters
    }

    /// Build the analytic model. Only [`AtmosphereKind::Isa`] is available without
    /// interpolation settings.
    pub fn create(&self, kind: AtmosphereKind) -> Result<Atmosphere, AtmosphereError> {
        trace!("factory: create {kind}");
        match kind {
            AtmosphereKind::Isa => Ok(Atmosphere::Layered(self.layered()?)),
            other => Err(AtmosphereError::UnsupportedModelKind(other.to_string())),
        }
    }

    /// Build any supported model; `interpolation` and `step` only matter for
    /// [`AtmosphereKind::IsaTable`].
    pub fn create_with(
        &self,
        kind: AtmosphereKind,
        interpolation: InterpolationType,
        step: f64,
    ) -> Result<Atmosphere, AtmosphereError> {
        trace!("factory: create {kind} ({interpolation}, step {step} m)");
        match kind {
            AtmosphereKind::Isa => Ok(Atmosphere::Layered(self.layered()?)),
            AtmosphereKind::IsaTable => {
                // The source stays unobserved; grid construction would otherwise trip
                // the caller's observer before any query is made.
                let source = LayeredAtmosphereModel::new(self.parameters.clone())?;
                let max_altitude = self
                    .table_max_altitude
                    .unwrap_or(self.parameters.upper_bound);
                let model =
                    TabulatedAtmosphereModel::new(source, interpolation, step, max_altitude)?;
                Ok(Atmosphere::Tabulated(match &self.observer {
                    Some(observer) => {
                        let monitor = model.fresh_monitor().with_observer(observer.clone());
                        model.with_monitor(monitor)
                    }
                    None => model,
                }))
            }
        }
    }

    fn layered(&self) -> Result<LayeredAtmosphereModel, AtmosphereError> {
        let model = LayeredAtmosphereModel::new(self.parameters.clone())?;
        Ok(match &self.observer {
            Some(observer) => model.with_observer(observer.clone()),
            None => model,
        })
    }
}

impl fmt::Debug for AtmosphereFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtmosphereFactory")
            .field("parameters", &self.parameters)
            .field("table_max_altitude", &self.table_max_altitude)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// [`AtmosphereFactory::create`] with default parameters.
pub fn create_atmosphere(kind: AtmosphereKind) -> Result<Atmosphere, AtmosphereError> {
    AtmosphereFactory::default().create(kind)
}

/// [`AtmosphereFactory::create_with`] with default parameters.
pub fn create_atmosphere_with(
    kind: AtmosphereKind,
    interpolation: InterpolationType,
    step: f64,
) -> Result<Atmosphere, AtmosphereError> {
    AtmosphereFactory::default().create_with(kind, interpolation, step)
}
