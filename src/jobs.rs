use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::services::{job_base_name, JOB_EXTENSION};

/// Synchronize the staging directory's job files to exactly the selection:
/// stale files are deleted, selected ones (re)copied from the catalog. A
/// selected name missing from the catalog is a warning, not an error.
pub fn stage_jobs(source_dir: &Path, staging_dir: &Path, services: &[String]) -> Result<()> {
    fs::create_dir_all(staging_dir)
        .with_context(|| format!("Failed to create directory: {}", staging_dir.display()))?;

    let pattern = staging_dir.join(format!("*{}", JOB_EXTENSION));
    for entry in
        glob::glob(&pattern.to_string_lossy()).context("Invalid staging pattern")?
    {
        let path = entry?;
        let keep = job_base_name(&path).map_or(false, |name| services.contains(&name));
        if !keep {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    let mut staged = 0;
    for service in services {
        let file_name = format!("{}{}", service, JOB_EXTENSION);
        let src = source_dir.join(&file_name);
        if !src.exists() {
            println!("WARNING: {} missing, skipping.", src.display());
            continue;
        }
        let dest = staging_dir.join(&file_name);
        fs::copy(&src, &dest).with_context(|| {
            format!("Failed to copy {} to {}", src.display(), dest.display())
        })?;
        staged += 1;
    }

    if services.is_empty() {
        println!("No services selected; cleared {}", staging_dir.display());
    } else {
        println!("Staged {} Nomad job(s) in {}", staged, staging_dir.display());
    }
    Ok(())
}
