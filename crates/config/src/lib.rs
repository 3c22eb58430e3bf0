//! Configuration models and loaders for standard atmosphere models.

use std::fs::File;
use std::path::Path;

use atmo_model::{
    Atmosphere, AtmosphereError, AtmosphereFactory, AtmosphereKind, AtmosphereParameters,
    InterpolationType,
};
use serde::Deserialize;
use thiserror::Error;

/// Default grid step for tabulated models (m).
pub const DEFAULT_TABLE_STEP_M: f64 = 100.0;

/// Which model to build and how to tabulate it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ModelSelection {
    /// Model kind name, e.g. `isa` or `isa_table`. Kept as text so unknown kinds
    /// surface as [`AtmosphereError::UnsupportedModelKind`].
    pub kind: String,
    pub interpolation: InterpolationType,
    pub step_m: f64,
    #[serde(default)]
    pub max_altitude_m: Option<f64>,
}

impl Default for ModelSelection {
    fn default() -> Self {
        Self {
            kind: AtmosphereKind::Isa.to_string(),
            interpolation: InterpolationType::Linear,
            step_m: DEFAULT_TABLE_STEP_M,
            max_altitude_m: None,
        }
    }
}

/// Complete atmosphere configuration file.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AtmosphereConfig {
    pub model: ModelSelection,
    pub parameters: AtmosphereParameters,
}

impl AtmosphereConfig {
    /// Factory carrying this configuration's parameters and grid extent.
    pub fn factory(&self) -> AtmosphereFactory {
        let factory = AtmosphereFactory::new(self.parameters.clone());
        match self.model.max_altitude_m {
            Some(max_altitude) => factory.with_table_max_altitude(max_altitude),
            None => factory,
        }
    }

    /// Build the selected model.
    pub fn build(&self) -> Result<Atmosphere, ConfigError> {
        self.build_with(&self.factory())
    }

    /// Build the selected model through a caller-supplied factory (e.g. one with an observer).
    pub fn build_with(&self, factory: &AtmosphereFactory) -> Result<Atmosphere, ConfigError> {
        let kind: AtmosphereKind = self.model.kind.parse()?;
        Ok(factory.create_with(kind, self.model.interpolation, self.model.step_m)?)
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Model(#[from] AtmosphereError),
}

/// Load an atmosphere configuration from a `.toml` file or, for any other extension, YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AtmosphereConfig, ConfigError> {
    let path = path.as_ref();
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atmo_model::AtmosphereModel;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let file = write_temp(".toml", "");
        let config = load_config(file.path()).expect("parse");
        assert_eq!(config, AtmosphereConfig::default());
        let model = config.build().expect("build");
        assert_eq!(model.kind(), AtmosphereKind::Isa);
    }

    #[test]
    fn toml_selects_table_and_overrides_constants() {
        let file = write_temp(
            ".toml",
            r#"
[model]
kind = "isa_table"
interpolation = "linear"
step_m = 500.0
max_altitude_m = 120000.0

[parameters]
negligible_ratio = 1e-5
sea_level_temperature = 300.0
"#,
        );
        let config = load_config(file.path()).expect("parse");
        assert_eq!(config.parameters.negligible_ratio, 1e-5);
        let model = config.build().expect("build");
        match &model {
            Atmosphere::Tabulated(table) => {
                assert_eq!(table.step(), 500.0);
                assert_eq!(table.max_altitude(), 120_000.0);
            }
            other => panic!("expected tabulated model, got {other:?}"),
        }
        assert!((model.temperature(0.0) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn yaml_with_custom_layers() {
        let file = write_temp(
            ".yaml",
            r#"
model:
  kind: isa
parameters:
  extend_top_altitude: 20000.0
  layers:
    - base_altitude: 0.0
      base_temperature: 288.15
      base_pressure: 101325.0
      lapse_rate: -0.0065
    - base_altitude: 11000.0
      base_temperature: 216.65
      base_pressure: 22632.06
      lapse_rate: 0.0
"#,
        );
        let config = load_config(file.path()).expect("parse");
        let model = config.build().expect("build");
        assert!((model.temperature(15_000.0) - 216.65).abs() < 1e-9);
        assert_eq!(model.temperature(30_000.0), model.temperature(25_000.0));
    }

    #[test]
    fn unknown_kind_is_unsupported() {
        let file = write_temp(".toml", "[model]\nkind = \"jacchia\"\n");
        let config = load_config(file.path()).expect("parse");
        assert!(matches!(
            config.build(),
            Err(ConfigError::Model(AtmosphereError::UnsupportedModelKind(kind))) if kind == "jacchia"
        ));
    }

    #[test]
    fn zero_step_is_invalid_configuration() {
        let file = write_temp(".toml", "[model]\nkind = \"isa_table\"\nstep_m = 0.0\n");
        let config = load_config(file.path()).expect("parse");
        assert!(matches!(
            config.build(),
            Err(ConfigError::Model(AtmosphereError::InvalidConfiguration(_)))
        ));
    }

    #[test]
    fn malformed_files_report_parse_errors() {
        let toml_file = write_temp(".toml", "[model\nkind = ");
        assert!(matches!(load_config(toml_file.path()), Err(ConfigError::Toml(_))));

        let yaml_file = write_temp(".yaml", "model: [unterminated");
        assert!(matches!(load_config(yaml_file.path()), Err(ConfigError::Parse(_))));

        assert!(matches!(
            load_config("does/not/exist.toml"),
            Err(ConfigError::Io(_))
        ));
    }
}
