use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::connection::Connection;
use crate::volumes::HostVolume;

/// Answers persisted from the previous run, used to prefill prompt defaults.
/// Read once at start, overwritten wholesale at the end of a successful run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupState {
    pub inventory_name: Option<String>,
    pub ansible_host: Option<String>,
    pub ansible_user: Option<String>,
    pub ansible_port: Option<u16>,
    pub ssh_key: Option<String>,
    pub nomad_host_volumes: Option<Vec<HostVolume>>,
    pub nomad_enabled_jobs: Option<Vec<String>>,
}

impl SetupState {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(SetupState::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Snapshot of everything the user accepted this session.
    pub fn from_run(
        connection: &Connection,
        volumes: Vec<HostVolume>,
        services: Vec<String>,
    ) -> Self {
        SetupState {
            inventory_name: Some(connection.inventory_name.clone()),
            ansible_host: Some(connection.host.clone()),
            ansible_user: Some(connection.user.clone()),
            ansible_port: Some(connection.port),
            ssh_key: Some(connection.ssh_key.display().to_string()),
            nomad_host_volumes: Some(volumes),
            nomad_enabled_jobs: Some(services),
        }
    }

    /// Prior volume list, treating an empty list the same as none.
    pub fn prior_volumes(&self) -> Option<&[HostVolume]> {
        self.nomad_host_volumes.as_deref().filter(|v| !v.is_empty())
    }

    /// Prior service selection, treating an empty list the same as none.
    pub fn prior_services(&self) -> Option<&[String]> {
        self.nomad_enabled_jobs.as_deref().filter(|v| !v.is_empty())
    }
}
