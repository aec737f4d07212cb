use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::volumes::HostVolume;

/// Payload for the generated group vars; field order here is the emitted
/// key order, deliberately not alphabetized.
#[derive(Serialize)]
struct GeneratedVars<'a> {
    nomad_host_volumes: &'a [HostVolume],
    nomad_enabled_jobs: &'a [String],
}

pub fn write_generated_vars(
    path: &Path,
    volumes: &[HostVolume],
    services: &[String],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let payload = GeneratedVars {
        nomad_host_volumes: volumes,
        nomad_enabled_jobs: services,
    };
    let body = serde_yaml::to_string(&payload).context("Failed to serialize generated vars")?;
    fs::write(path, format!("# Generated by nas-bootstrap\n{}", body))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote generated vars to {}", path.display());
    Ok(())
}
