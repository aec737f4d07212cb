use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// Fixed repository-relative locations used across one run.
pub struct Paths {
    pub root: PathBuf,
    /// Persisted profile of prior answers.
    pub state_file: PathBuf,
    /// Generated single-host Ansible inventory.
    pub inventory: PathBuf,
    /// Generated group vars (volumes + enabled jobs).
    pub generated_vars: PathBuf,
    /// Role defaults seeding the host volume list.
    pub volume_defaults: PathBuf,
    /// Source catalog of Nomad job definitions.
    pub jobs_source: PathBuf,
    /// Staging directory synchronized to the current selection.
    pub jobs_staging: PathBuf,
}

impl Paths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Paths {
            state_file: root.join(".nas-setup.json"),
            inventory: root.join("ansible").join("inventory").join("hosts"),
            generated_vars: root.join("ansible").join("group_vars").join("generated.yml"),
            volume_defaults: root
                .join("ansible")
                .join("roles")
                .join("nomad")
                .join("defaults")
                .join("main.yml"),
            jobs_source: root.join("nomad").join("jobs"),
            jobs_staging: root.join("server").join("nomad-jobs"),
            root,
        }
    }

    /// Locate the deployment repo: `NAS_BOOTSTRAP_ROOT` override, then the
    /// first ancestor of the current directory containing `ansible/`, then
    /// the current directory itself.
    pub fn discover() -> Result<Self> {
        if let Ok(dir) = env::var("NAS_BOOTSTRAP_ROOT") {
            return Ok(Paths::new(dir));
        }

        let mut current = env::current_dir()?;
        loop {
            if current.join("ansible").is_dir() {
                return Ok(Paths::new(current));
            }
            if !current.pop() {
                break;
            }
        }

        Ok(Paths::new(env::current_dir()?))
    }
}
