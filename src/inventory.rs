use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::connection::{home_dir, Connection};

/// Render and write the single-host inventory, overwriting any previous one.
pub fn write_inventory(path: &Path, connection: &Connection) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let key_display = shrink_home(&connection.ssh_key)?;
    fs::write(path, render(connection, &key_display))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote inventory to {}", path.display());
    Ok(())
}

fn render(connection: &Connection, key_display: &str) -> String {
    format!(
        "# Generated by nas-bootstrap\n\
         [nas]\n\
         {} ansible_host={} ansible_user={} ansible_port={} ansible_ssh_private_key_file={}\n",
        connection.inventory_name, connection.host, connection.user, connection.port, key_display
    )
}

/// Collapse $HOME back to `~` for display when the key lives under it.
pub fn shrink_home(path: &Path) -> Result<String> {
    Ok(shrink_home_in(path, &home_dir()?))
}

fn shrink_home_in(path: &Path, home: &Path) -> String {
    match path.strip_prefix(home) {
        Ok(rest) => format!("~/{}", rest.display()),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_connection() -> Connection {
        Connection {
            inventory_name: "nas".into(),
            host: "192.168.1.50".into(),
            user: "ansible".into(),
            port: 22,
            ssh_key: PathBuf::from("/home/op/.ssh/nas-server"),
        }
    }

    #[test]
    fn renders_group_header_and_host_line() {
        let rendered = render(&sample_connection(), "~/.ssh/nas-server");
        assert_eq!(
            rendered,
            "# Generated by nas-bootstrap\n\
             [nas]\n\
             nas ansible_host=192.168.1.50 ansible_user=ansible ansible_port=22 \
             ansible_ssh_private_key_file=~/.ssh/nas-server\n"
        );
    }

    #[test]
    fn key_under_home_collapses_to_tilde() {
        let home = PathBuf::from("/home/op");
        assert_eq!(
            shrink_home_in(Path::new("/home/op/.ssh/nas-server"), &home),
            "~/.ssh/nas-server"
        );
    }

    #[test]
    fn key_outside_home_stays_absolute() {
        let home = PathBuf::from("/home/op");
        assert_eq!(
            shrink_home_in(Path::new("/etc/keys/nas-server"), &home),
            "/etc/keys/nas-server"
        );
    }

    #[test]
    fn writes_file_and_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ansible").join("inventory").join("hosts");

        // Key outside $HOME so the rendered path is stable in the test.
        let mut connection = sample_connection();
        connection.ssh_key = dir.path().join("nas-server");
        connection.port = 2222;

        write_inventory(&path, &connection).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# Generated by nas-bootstrap\n[nas]\n"));
        assert!(content.contains("ansible_port=2222"));
        assert!(content.ends_with(&format!(
            "ansible_ssh_private_key_file={}\n",
            connection.ssh_key.display()
        )));
    }
}
