//! Export helpers for atmosphere profiles as CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use atmo_model::{AtmosphereModel, AtmosphereSample};
use serde::Serialize;
use serde_json::to_writer_pretty;
use thiserror::Error;

const HEADER: &str = "altitude_m,temperature_k,pressure_pa,density_kg_m3";

/// Upper limit on the number of rows a single profile may contain.
pub const MAX_PROFILE_SAMPLES: usize = 10_000_000;

/// Errors raised while sampling or writing a profile.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid profile range: {0}")]
    InvalidRange(String),
    #[error("failed to write profile: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode profile JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Altitude range sampled into a profile (m).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileRange {
    pub start_m: f64,
    pub end_m: f64,
    pub every_m: f64,
}

impl ProfileRange {
    /// Altitudes `start, start + every, …`, with `end` always included.
    pub fn altitudes(&self) -> Result<Vec<f64>, ExportError> {
        let ProfileRange {
            start_m,
            end_m,
            every_m,
        } = *self;
        if !(start_m.is_finite() && end_m.is_finite()) || end_m < start_m {
            return Err(ExportError::InvalidRange(format!(
                "end ({end_m} m) must be finite and not below start ({start_m} m)"
            )));
        }
        if !(every_m.is_finite() && every_m > 0.0) {
            return Err(ExportError::InvalidRange(format!(
                "sampling interval must be positive, got {every_m}"
            )));
        }
        let count = ((end_m - start_m) / every_m).floor() + 1.0;
        if count > MAX_PROFILE_SAMPLES as f64 {
            return Err(ExportError::InvalidRange(format!(
                "{count} samples exceed the limit of {MAX_PROFILE_SAMPLES}"
            )));
        }

        let mut altitudes: Vec<f64> = (0..count as usize)
            .map(|i| start_m + i as f64 * every_m)
            .collect();
        if altitudes.last().is_some_and(|&last| last < end_m) {
            altitudes.push(end_m);
        }
        Ok(altitudes)
    }
}

/// Query `model` at every altitude of `range`.
pub fn sample_profile(
    model: &dyn AtmosphereModel,
    range: &ProfileRange,
) -> Result<Vec<AtmosphereSample>, ExportError> {
    Ok(range
        .altitudes()?
        .into_iter()
        .map(|altitude| model.properties(altitude))
        .collect())
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Write samples as CSV with the standard header.
pub fn write_csv(writer: &mut dyn Write, samples: &[AtmosphereSample]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for sample in samples {
        writeln!(
            writer,
            "{:.3},{:.6},{:.6e},{:.6e}",
            sample.altitude, sample.temperature, sample.pressure, sample.density
        )?;
    }
    writer.flush()
}

/// Envelope of an exported JSON profile.
#[derive(Debug, Serialize)]
pub struct ProfileDocument<'a> {
    pub model: &'a str,
    pub start_m: f64,
    pub end_m: f64,
    pub every_m: f64,
    pub samples: &'a [AtmosphereSample],
}

/// Write a pretty-printed JSON profile document.
pub fn write_json(
    path: &Path,
    model: &str,
    range: &ProfileRange,
    samples: &[AtmosphereSample],
) -> Result<(), ExportError> {
    let document = ProfileDocument {
        model,
        start_m: range.start_m,
        end_m: range.end_m,
        every_m: range.every_m,
        samples,
    };
    let mut writer = writer_for_path(path)?;
    to_writer_pretty(&mut writer, &document)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
