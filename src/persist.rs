use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::TeamBundle;

pub const NAMESPACE: &str = "tcCanevaData";
const DATA_DIR: &str = "team_terminal";

#[derive(Debug, Serialize, Deserialize)]
struct StateFile {
    namespace: String,
    data: TeamBundle,
}

#[derive(Debug, Serialize)]
struct StateFileRef<'a> {
    namespace: &'a str,
    data: &'a TeamBundle,
}

/// Read the saved bundle. Anything missing, unreadable or foreign is `None`.
///
/// Besides the namespaced file this crate writes, a bare `{players, events, ..}`
/// object as exported from the browser app's storage is accepted.
pub fn load_bundle(path: &Path) -> Option<TeamBundle> {
    let raw = fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&raw).ok()?;
    let obj = value.as_object()?;
    if obj.contains_key("namespace") {
        let file = serde_json::from_value::<StateFile>(value).ok()?;
        return (file.namespace == NAMESPACE).then_some(file.data);
    }
    if obj.contains_key("players") || obj.contains_key("events") {
        return serde_json::from_value(value).ok();
    }
    None
}

/// Overwrite the saved bundle with `bundle` in one go.
pub fn save_bundle(path: &Path, bundle: &TeamBundle) -> Result<()> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let json = serde_json::to_string(&StateFileRef {
        namespace: NAMESPACE,
        data: bundle,
    })
    .context("serialize team data")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

/// Read a bundle exported by `team_sync fetch --out`.
pub fn load_snapshot(path: &Path) -> Result<TeamBundle> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let bundle: TeamBundle = serde_json::from_str(&raw).context("invalid snapshot json")?;
    if bundle.is_empty() {
        bail!("snapshot {} has no players or events", path.display());
    }
    Ok(bundle)
}

pub fn save_snapshot(path: &Path, bundle: &TeamBundle) -> Result<()> {
    let json = serde_json::to_string_pretty(bundle).context("serialize snapshot")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn default_data_path() -> Option<PathBuf> {
    let file = format!("{NAMESPACE}.json");
    if let Ok(base) = std::env::var("XDG_DATA_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(DATA_DIR).join(file));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(DATA_DIR)
            .join(file),
    )
}
