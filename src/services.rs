use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::io::BufRead;
use std::path::Path;

use crate::prompt::Prompter;

pub const JOB_EXTENSION: &str = ".nomad.hcl";

/// Base names of the job files available under the catalog dir, sorted.
pub fn available_services(jobs_dir: &Path) -> Result<Vec<String>> {
    let pattern = jobs_dir.join(format!("*{}", JOB_EXTENSION));
    let mut names = Vec::new();
    for entry in
        glob::glob(&pattern.to_string_lossy()).context("Invalid job catalog pattern")?
    {
        let path = entry?;
        if let Some(name) = job_base_name(&path) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// `media.nomad.hcl` -> `media`; anything else -> None.
pub fn job_base_name(path: &Path) -> Option<String> {
    path.file_name()?
        .to_str()?
        .strip_suffix(JOB_EXTENSION)
        .map(str::to_string)
}

/// Resolve one line of selector input against the catalog. `Err` carries
/// the unknown names (sorted) for the re-prompt message.
pub fn parse_selection(
    raw: &str,
    catalog: &[String],
    prior: Option<&[String]>,
) -> Result<Vec<String>, Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(match prior {
            Some(prior) => prior.to_vec(),
            None => catalog.to_vec(),
        });
    }
    let lowered = raw.to_lowercase();
    if lowered == "all" {
        return Ok(catalog.to_vec());
    }
    if lowered == "none" || lowered == "skip" {
        return Ok(Vec::new());
    }

    let chosen: BTreeSet<&str> = raw
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|item| !item.is_empty())
        .collect();
    let unknown: Vec<String> = chosen
        .iter()
        .filter(|name| !catalog.iter().any(|c| c.as_str() == **name))
        .map(|name| name.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }
    Ok(catalog
        .iter()
        .filter(|name| chosen.contains(name.as_str()))
        .cloned()
        .collect())
}

/// List the catalog (marking the prior selection) and prompt until the
/// input resolves to a valid subset.
pub fn choose_services<R: BufRead>(
    prompter: &mut Prompter<R>,
    jobs_dir: &Path,
    prior: Option<&[String]>,
) -> Result<Vec<String>> {
    println!();
    println!("==> Nomad services");

    let available = available_services(jobs_dir)?;
    if available.is_empty() {
        println!("No job files found under {}.", jobs_dir.display());
        return Ok(Vec::new());
    }

    println!("Available services:");
    for (idx, name) in available.iter().enumerate() {
        let marker = if prior.map_or(false, |p| p.contains(name)) {
            "*"
        } else {
            " "
        };
        println!("  {:2}) {}{}", idx + 1, name, marker);
    }

    let default_hint = match prior {
        Some(prior) => prior.join(","),
        None => "all".to_string(),
    };
    loop {
        let raw = prompter.line(&format!(
            "Select services (comma names, 'all', or leave blank for {})",
            default_hint
        ))?;
        match parse_selection(&raw, &available, prior) {
            Ok(selection) => return Ok(selection),
            Err(unknown) => println!("Unknown services: {}", unknown.join(", ")),
        }
    }
}
