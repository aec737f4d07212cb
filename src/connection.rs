use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::prompt::Prompter;
use crate::state::SetupState;

pub const DEFAULT_ALIAS: &str = "nas";
pub const DEFAULT_HOST: &str = "192.168.1.50";
pub const DEFAULT_USER: &str = "ansible";
pub const DEFAULT_SSH_KEY: &str = "~/.ssh/nas-server";

/// Connection profile for the managed host, assembled fresh each run.
#[derive(Debug, Clone)]
pub struct Connection {
    pub inventory_name: String,
    pub host: String,
    pub user: String,
    pub port: u16,
    /// Absolute path to the private key; the matching public key lives at
    /// the same path with a `.pub` suffix.
    pub ssh_key: PathBuf,
}

pub fn configure<R: BufRead>(
    prompter: &mut Prompter<R>,
    state: &SetupState,
) -> Result<Connection> {
    println!();
    println!("==> Connection details");

    let inventory_name = prompter.text(
        "Inventory host alias",
        Some(state.inventory_name.as_deref().unwrap_or(DEFAULT_ALIAS)),
    )?;
    let host = prompter.text(
        "Remote server IP or hostname",
        Some(state.ansible_host.as_deref().unwrap_or(DEFAULT_HOST)),
    )?;
    let user = prompter.text(
        "Ansible SSH user",
        Some(state.ansible_user.as_deref().unwrap_or(DEFAULT_USER)),
    )?;
    let port = prompter.port("SSH port", state.ansible_port.unwrap_or(22))?;

    let key_setting = state.ssh_key.as_deref().unwrap_or(DEFAULT_SSH_KEY);
    let ssh_key = ensure_ssh_key(prompter, &expand_home(key_setting)?)?;

    Ok(Connection {
        inventory_name,
        host,
        user,
        port,
        ssh_key,
    })
}

pub fn home_dir() -> Result<PathBuf> {
    let home = env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home))
}

/// Expand a leading `~/` against $HOME.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if path == "~" {
        return home_dir();
    }
    if let Some(rest) = path.strip_prefix("~/") {
        return Ok(home_dir()?.join(rest));
    }
    Ok(PathBuf::from(path))
}

/// Confirm the key exists, generating it when the user agrees. Declining
/// is fatal: nothing later in the run works without a key.
pub fn ensure_ssh_key<R: BufRead>(prompter: &mut Prompter<R>, path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    let create = prompter.confirm(
        &format!("SSH key {} does not exist. Create it?", path.display()),
        true,
    )?;
    if !create {
        bail!("Cannot continue without an SSH key.");
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let status = Command::new("ssh-keygen")
        .args(["-t", "ed25519", "-f"])
        .arg(path)
        .args(["-N", ""])
        .status()
        .context("Failed to execute ssh-keygen")?;
    if !status.success() {
        eprintln!("ssh-keygen failed");
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(path.to_path_buf())
}

/// Install the public key on the remote host: `ssh-copy-id` when present,
/// otherwise an ssh-executed append to `~/.ssh/authorized_keys`.
pub fn push_public_key(connection: &Connection) -> Result<()> {
    let pub_path = PathBuf::from(format!("{}.pub", connection.ssh_key.display()));
    if !pub_path.exists() {
        println!("Public key {} missing. Re-run ssh-keygen.", pub_path.display());
        return Ok(());
    }

    let target = format!("{}@{}", connection.user, connection.host);
    let mut cmd;
    if which::which("ssh-copy-id").is_ok() {
        cmd = Command::new("ssh-copy-id");
        cmd.arg("-i").arg(&pub_path);
        if connection.port != 22 {
            cmd.arg("-p").arg(connection.port.to_string());
        }
        cmd.arg(&target);
    } else {
        let pub_line = fs::read_to_string(&pub_path)
            .with_context(|| format!("Failed to read {}", pub_path.display()))?;
        cmd = Command::new("ssh");
        if connection.port != 22 {
            cmd.arg("-p").arg(connection.port.to_string());
        }
        cmd.arg(&target).arg(authorized_keys_command(pub_line.trim()));
    }

    println!("Uploading SSH public key...");
    let status = cmd.status().context("Failed to execute ssh")?;
    if !status.success() {
        eprintln!("Failed to upload SSH public key");
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

/// Remote command appending the key line, locking down `.ssh` permissions
/// first. The key line is shell-quoted before being embedded.
fn authorized_keys_command(pub_line: &str) -> String {
    format!(
        "mkdir -p ~/.ssh && chmod 700 ~/.ssh && echo {} >> ~/.ssh/authorized_keys && chmod 600 ~/.ssh/authorized_keys",
        shell_quote(pub_line)
    )
}

/// POSIX single-quote escaping for values embedded in a remote shell command.
pub fn shell_quote(value: &str) -> String {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c);
    if !value.is_empty() && value.chars().all(safe) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}
