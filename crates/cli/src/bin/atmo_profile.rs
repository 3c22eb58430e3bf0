use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;
use standard_atmosphere::config::{AtmosphereConfig, load_config};
use standard_atmosphere::constants::GAMMA_AIR;
use standard_atmosphere::export::{self, ProfileRange};
use standard_atmosphere::model::{AtmosphereKind, AtmosphereModel, InterpolationType};
use standard_atmosphere::units::m_to_km;

/// Print or export temperature, pressure, and density over an altitude range.
#[derive(Parser, Debug)]
#[command(author, version, about = "Standard atmosphere profile generator")]
struct Cli {
    /// Atmosphere configuration file (TOML or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Model kind (overrides the configuration file)
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Interpolation used by tabulated models
    #[arg(long, value_enum)]
    interpolation: Option<InterpolationArg>,

    /// Grid step in metres for tabulated models
    #[arg(long)]
    step: Option<f64>,

    /// Top of the tabulated grid in metres
    #[arg(long)]
    max_altitude: Option<f64>,

    /// First altitude of the profile (m)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    from: f64,

    /// Last altitude of the profile (m)
    #[arg(long, default_value_t = 100_000.0)]
    to: f64,

    /// Sampling interval of the profile (m)
    #[arg(long, default_value_t = 5_000.0)]
    every: f64,

    /// Write the profile as CSV (use '-' for stdout)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the profile as a JSON document
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum KindArg {
    Isa,
    IsaTable,
}

impl From<KindArg> for AtmosphereKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Isa => AtmosphereKind::Isa,
            KindArg::IsaTable => AtmosphereKind::IsaTable,
        }
    }
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum InterpolationArg {
    Linear,
}

impl From<InterpolationArg> for InterpolationType {
    fn from(value: InterpolationArg) -> Self {
        match value {
            InterpolationArg::Linear => InterpolationType::Linear,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AtmosphereConfig::default(),
    };
    apply_overrides(&mut config, &cli);

    let model = config.build()?;
    let label = model.kind().to_string();
    info!("built {label} atmosphere model");

    let range = ProfileRange {
        start_m: cli.from,
        end_m: cli.to,
        every_m: cli.every,
    };
    let samples = export::sample_profile(&model, &range)?;

    let mut csv_on_stdout = false;
    if let Some(path) = &cli.csv {
        let mut writer = export::writer_for_path(path)?;
        export::write_csv(&mut writer, &samples)?;
        csv_on_stdout = path.as_os_str() == "-";
        if !csv_on_stdout {
            info!("wrote {} samples to {}", samples.len(), path.display());
        }
    }
    if let Some(path) = &cli.json {
        export::write_json(path, &label, &range, &samples)?;
        info!("wrote profile JSON to {}", path.display());
    }
    if csv_on_stdout {
        return Ok(());
    }

    let r_specific = model.r_specific();
    println!("=== {label} atmosphere ===");
    println!(
        "{:>10} {:>10} {:>14} {:>14} {:>10}",
        "alt [km]", "T [K]", "P [Pa]", "rho [kg/m3]", "a [m/s]"
    );
    for sample in &samples {
        println!(
            "{:>10.3} {:>10.3} {:>14.6e} {:>14.6e} {:>10.2}",
            m_to_km(sample.altitude),
            sample.temperature,
            sample.pressure,
            sample.density,
            sample.speed_of_sound(GAMMA_AIR, r_specific)
        );
    }
    if let Some(event) = model.negligible_event() {
        println!(
            "Negligible atmosphere from {:.3} km (density ratio {:.3e})",
            m_to_km(event.altitude),
            event.density_ratio
        );
    }

    Ok(())
}

fn apply_overrides(config: &mut AtmosphereConfig, cli: &Cli) {
    if let Some(kind) = cli.kind {
        config.model.kind = AtmosphereKind::from(kind).to_string();
    }
    if let Some(interpolation) = cli.interpolation {
        config.model.interpolation = interpolation.into();
    }
    if let Some(step) = cli.step {
        config.model.step_m = step;
    }
    if let Some(max_altitude) = cli.max_altitude {
        config.model.max_altitude_m = Some(max_altitude);
    }
}
