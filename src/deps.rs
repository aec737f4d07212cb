use anyhow::{Context, Result};
use std::env;
use std::process::{Command, ExitStatus};

/// Warn early about the remote-access tools later steps shell out to.
/// `NAS_BOOTSTRAP_SKIP_PREFLIGHT=1` skips the check.
pub fn preflight() {
    if env::var("NAS_BOOTSTRAP_SKIP_PREFLIGHT").as_deref() == Ok("1") {
        return;
    }
    for tool in ["ssh", "ssh-keygen"] {
        if which::which(tool).is_err() {
            eprintln!(
                "Warning: {} not found on PATH; SSH key setup will fail without it.",
                tool
            );
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PackageManager {
    Brew,
    Apt,
    Dnf,
    Yum,
}

impl PackageManager {
    fn command(self) -> &'static str {
        match self {
            PackageManager::Brew => "brew",
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
        }
    }
}

/// First supported package manager found on PATH, in fixed priority order.
fn detect_package_manager() -> Option<PackageManager> {
    [PackageManager::Apt, PackageManager::Dnf, PackageManager::Yum]
        .into_iter()
        .find(|manager| which::which(manager.command()).is_ok())
}

/// Installs missing prerequisites through the host package manager. Holds
/// the ran-`apt-get update` flag for the lifetime of one run so the index
/// is refreshed at most once.
pub struct Installer {
    index_updated: bool,
}

impl Installer {
    pub fn new() -> Self {
        Installer {
            index_updated: false,
        }
    }

    pub fn ensure_dependencies(&mut self) -> Result<()> {
        println!("Detected host OS: {}", env::consts::OS);
        match env::consts::OS {
            "macos" => {
                if which::which("brew").is_err() {
                    eprintln!(
                        "Homebrew is required to install dependencies on macOS. Install it from https://brew.sh/ and rerun."
                    );
                    std::process::exit(1);
                }
                self.ensure_binary("ansible-playbook", PackageManager::Brew, "ansible")?;
                self.ensure_binary("nomad", PackageManager::Brew, "nomad")?;
            }
            "linux" => match detect_package_manager() {
                Some(manager) => {
                    self.ensure_binary("ansible-playbook", manager, "ansible")?;
                    self.ensure_binary("nomad", manager, "nomad")?;
                }
                None => println!(
                    "No supported package manager found. Please install Ansible and Nomad manually."
                ),
            },
            _ => println!(
                "Unsupported OS for automatic dependency install. Please ensure Ansible and Nomad are installed."
            ),
        }
        Ok(())
    }

    /// Skip when the binary is already on PATH; otherwise install its
    /// package and exit with the installer's status on failure.
    fn ensure_binary(
        &mut self,
        binary: &str,
        manager: PackageManager,
        package: &str,
    ) -> Result<()> {
        if which::which(binary).is_ok() {
            return Ok(());
        }
        println!("{} not found. Installing...", binary);
        let status = self.install(manager, package)?;
        if !status.success() {
            eprintln!("Failed to install {}", binary);
            std::process::exit(status.code().unwrap_or(1));
        }
        Ok(())
    }

    fn install(&mut self, manager: PackageManager, package: &str) -> Result<ExitStatus> {
        match manager {
            PackageManager::Brew => Command::new("brew")
                .args(["install", package])
                .status()
                .context("Failed to execute brew"),
            PackageManager::Apt => {
                if !self.index_updated {
                    let update = Command::new("sudo")
                        .args(["apt-get", "update"])
                        .status()
                        .context("Failed to execute apt-get update")?;
                    if !update.success() {
                        return Ok(update);
                    }
                    self.index_updated = true;
                }
                Command::new("sudo")
                    .args(["apt-get", "install", "-y", package])
                    .status()
                    .context("Failed to execute apt-get install")
            }
            PackageManager::Dnf | PackageManager::Yum => Command::new("sudo")
                .args([manager.command(), "install", "-y", package])
                .status()
                .with_context(|| format!("Failed to execute {}", manager.command())),
        }
    }
}

impl Default for Installer {
    fn default() -> Self {
        Installer::new()
    }
}
