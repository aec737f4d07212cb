use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufRead;
use std::path::Path;

use crate::prompt::Prompter;

fn default_true() -> bool {
    true
}

/// A named host path exposed to Nomad workloads, with ownership policy.
/// Optional fields stay out of the serialized entry when unset. Names are
/// not de-duplicated; the vars file carries whatever the user accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVolume {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default = "default_true")]
    pub ensure: bool,
    #[serde(default = "default_true")]
    pub recurse: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl HostVolume {
    fn blank() -> Self {
        HostVolume {
            name: String::new(),
            path: String::new(),
            read_only: false,
            ensure: true,
            recurse: true,
            owner: None,
            group: None,
            mode: None,
        }
    }
}

/// Walk the seed list (prior answers, else role defaults) letting the user
/// keep/edit/discard each entry, then offer to append new ones.
pub fn configure_volumes<R: BufRead>(
    prompter: &mut Prompter<R>,
    prior: Option<&[HostVolume]>,
    defaults_path: &Path,
) -> Result<Vec<HostVolume>> {
    println!();
    println!("==> Nomad host volumes");

    let seed = match prior {
        Some(volumes) => volumes.to_vec(),
        None => load_default_volumes(defaults_path)?,
    };

    let mut configured = Vec::new();
    for volume in &seed {
        if !prompter.confirm(&format!("  Keep '{}'?", volume.name), true)? {
            continue;
        }
        configured.push(edit_volume(prompter, volume)?);
    }
    while prompter.confirm("Add another host volume?", false)? {
        configured.push(edit_volume(prompter, &HostVolume::blank())?);
    }
    Ok(configured)
}

fn edit_volume<R: BufRead>(prompter: &mut Prompter<R>, current: &HostVolume) -> Result<HostVolume> {
    let name = prompter.text("  Volume name", non_empty(&current.name))?;
    let path = prompter.text("    Host path", non_empty(&current.path))?;
    let read_only = prompter.confirm("    Read only?", current.read_only)?;
    let ensure = prompter.confirm("    Create directory if missing?", current.ensure)?;
    let recurse = prompter.confirm("    Recurse when setting ownership?", current.recurse)?;
    let owner = prompter.optional("    Owner UID/GID (blank to skip)", current.owner.as_deref())?;
    let group = prompter.optional("    Group UID/GID (blank to skip)", current.group.as_deref())?;
    let mode = prompter.optional("    Directory mode (default 0755)", current.mode.as_deref())?;
    Ok(HostVolume {
        name,
        path,
        read_only,
        ensure,
        recurse,
        owner,
        group,
        mode,
    })
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Seed volumes from the Ansible role defaults. A missing or non-list
/// `nomad_host_volumes` key yields an empty seed; an unreadable file is fatal.
pub fn load_default_volumes(path: &Path) -> Result<Vec<HostVolume>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read volume defaults: {}", path.display()))?;
    let doc: serde_yaml::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse volume defaults: {}", path.display()))?;
    match doc.get("nomad_host_volumes") {
        Some(value @ serde_yaml::Value::Sequence(_)) => serde_yaml::from_value(value.clone())
            .with_context(|| format!("Invalid nomad_host_volumes in {}", path.display())),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()))
    }

    fn media_volume() -> HostVolume {
        HostVolume {
            name: "media".into(),
            path: "/tank/media".into(),
            owner: Some("1000".into()),
            ..HostVolume::blank()
        }
    }

    #[test]
    fn absent_optional_fields_are_omitted_from_yaml() {
        let volume = HostVolume {
            owner: None,
            ..media_volume()
        };
        let yaml = serde_yaml::to_string(&volume).unwrap();
        assert!(!yaml.contains("owner"));
        assert!(!yaml.contains("group"));
        assert!(!yaml.contains("mode"));
    }

    #[test]
    fn present_optional_fields_are_preserved_verbatim() {
        let volume = HostVolume {
            group: Some("1000".into()),
            mode: Some("02775".into()),
            ..media_volume()
        };
        let yaml = serde_yaml::to_string(&volume).unwrap();
        assert!(yaml.contains("owner: '1000'") || yaml.contains("owner: \"1000\""));
        assert!(yaml.contains("mode: '02775'") || yaml.contains("mode: \"02775\""));
    }

    #[test]
    fn defaults_apply_when_fields_are_missing() {
        let volume: HostVolume =
            serde_yaml::from_str("name: media\npath: /tank/media\n").unwrap();
        assert!(!volume.read_only);
        assert!(volume.ensure);
        assert!(volume.recurse);
        assert!(volume.owner.is_none());
    }

    #[test]
    fn load_default_volumes_reads_the_seed_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.yml");
        fs::write(
            &path,
            "nomad_host_volumes:\n  - name: media\n    path: /tank/media\n    read_only: true\n",
        )
        .unwrap();

        let volumes = load_default_volumes(&path).unwrap();
        assert_eq!(volumes.len(), 1);
        assert_eq!(volumes[0].name, "media");
        assert!(volumes[0].read_only);
    }

    #[test]
    fn non_list_defaults_are_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.yml");
        fs::write(&path, "nomad_host_volumes: disabled\n").unwrap();
        assert!(load_default_volumes(&path).unwrap().is_empty());

        fs::write(&path, "something_else: 1\n").unwrap();
        assert!(load_default_volumes(&path).unwrap().is_empty());
    }

    #[test]
    fn keeping_a_seeded_entry_with_all_defaults_returns_it_unchanged() {
        let seed = [media_volume()];
        // keep? -> blank (yes), then blank answers for every field,
        // then "add another?" -> blank (no).
        let mut p = prompter("\n\n\n\n\n\n\n\n\n\n");
        let dir = tempfile::tempdir().unwrap();
        let configured =
            configure_volumes(&mut p, Some(&seed), &dir.path().join("unused.yml")).unwrap();
        assert_eq!(configured, vec![media_volume()]);
    }

    #[test]
    fn discarding_a_seeded_entry_drops_it() {
        let seed = [media_volume()];
        let mut p = prompter("n\nn\n");
        let dir = tempfile::tempdir().unwrap();
        let configured =
            configure_volumes(&mut p, Some(&seed), &dir.path().join("unused.yml")).unwrap();
        assert!(configured.is_empty());
    }

    #[test]
    fn adding_a_volume_prompts_every_field() {
        // No seed entries: defaults file with no volume key.
        let dir = tempfile::tempdir().unwrap();
        let defaults = dir.path().join("main.yml");
        fs::write(&defaults, "{}\n").unwrap();

        // add? yes; name, path; read_only yes; ensure no; recurse blank (yes);
        // owner 1000; group blank; mode 0700; add? no.
        let input = "y\nscratch\n/tank/scratch\ny\nn\n\n1000\n\n0700\nn\n";
        let mut p = prompter(input);
        let configured = configure_volumes(&mut p, None, &defaults).unwrap();

        assert_eq!(
            configured,
            vec![HostVolume {
                name: "scratch".into(),
                path: "/tank/scratch".into(),
                read_only: true,
                ensure: false,
                recurse: true,
                owner: Some("1000".into()),
                group: None,
                mode: Some("0700".into()),
            }]
        );
    }

    #[test]
    fn duplicate_names_are_allowed() {
        let seed = [media_volume(), media_volume()];
        // keep both with default answers, then decline the add loop
        let input = "\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n";
        let mut p = prompter(input);
        let dir = tempfile::tempdir().unwrap();
        let configured =
            configure_volumes(&mut p, Some(&seed), &dir.path().join("unused.yml")).unwrap();
        assert_eq!(configured.len(), 2);
        assert_eq!(configured[0].name, configured[1].name);
    }
}
