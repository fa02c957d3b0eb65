use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::{AppConfig, StoreConfig};
use crate::demo::demo_bundle;
use crate::fetch::{build_fetch_pool, load_team_bundle};
use crate::persist;
use crate::record_store::RecordStoreClient;
use crate::state::{DataSource, Delta, ProviderCommand, TeamBundle};

/// Pick the startup bundle: saved local state, then an exported snapshot, then demo data.
pub fn load_initial_bundle(config: &AppConfig) -> (TeamBundle, DataSource, Vec<String>) {
    let mut notes = Vec::new();

    if let Some(path) = config.data_file.as_deref()
        && let Some(bundle) = persist::load_bundle(path)
    {
        notes.push(format!("[INFO] Local data from {}", path.display()));
        return (bundle, DataSource::Local, notes);
    }

    if let Some(path) = config.snapshot_file.as_deref() {
        match persist::load_snapshot(path) {
            Ok(bundle) => {
                notes.push(format!("[INFO] Snapshot from {}", path.display()));
                return (bundle, DataSource::Snapshot, notes);
            }
            Err(err) => notes.push(format!("[WARN] Snapshot unusable: {err:#}")),
        }
    }

    notes.push("[WARN] No team data found, using demo data".to_string());
    (demo_bundle(), DataSource::Demo, notes)
}

/// Run remote refreshes off the UI thread. Each command yields exactly one
/// `SetBundle` or `RefreshFailed` delta.
pub fn spawn_provider(config: StoreConfig, tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let pool = build_fetch_pool();
        for cmd in cmd_rx {
            match cmd {
                ProviderCommand::Refresh => {
                    let _ = tx.send(Delta::Log("[INFO] Refreshing from record store".to_string()));
                    let delta = match refresh(&config, pool.as_ref()) {
                        Ok(bundle) => Delta::SetBundle {
                            bundle,
                            source: DataSource::Remote,
                        },
                        Err(err) => Delta::RefreshFailed(err.to_string()),
                    };
                    if tx.send(delta).is_err() {
                        return;
                    }
                }
            }
        }
    });
}

fn refresh(
    config: &StoreConfig,
    pool: Option<&rayon::ThreadPool>,
) -> crate::error::FetchResult<TeamBundle> {
    let client = RecordStoreClient::new(config.clone())?;
    load_team_bundle(&client, &config.team_name, pool)
}
