use std::env;
use std::path::PathBuf;

use crate::record_store::Table;

pub const DEFAULT_HOST: &str = "api.airtable.com";
pub const DEFAULT_BASE_ID: &str = "appakHgEWKsk7IWNK";
pub const DEFAULT_TEAM_NAME: &str = "TC Caneva";
pub const TOKEN_PLACEHOLDER: &str = "YOUR_TOKEN_HERE";

const DEFAULT_TABLE_PLAYERS: &str = "tblr9VNukwxd6LAuU";
const DEFAULT_TABLE_MATCHES: &str = "tbl5Kii1jfpoQHxSr";
const DEFAULT_TABLE_TRAININGS: &str = "tbleGoRCEQNGWyh32";
const DEFAULT_TABLE_GOALS: &str = "tblkzYPzyZXgUpb6Q";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub base_id: String,
    pub token: Option<String>,
    pub tables: TableIds,
    pub team_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableIds {
    pub players: String,
    pub matches: String,
    pub trainings: String,
    pub goals: String,
}

impl Default for TableIds {
    fn default() -> Self {
        Self {
            players: DEFAULT_TABLE_PLAYERS.to_string(),
            matches: DEFAULT_TABLE_MATCHES.to_string(),
            trainings: DEFAULT_TABLE_TRAININGS.to_string(),
            goals: DEFAULT_TABLE_GOALS.to_string(),
        }
    }
}

impl TableIds {
    pub fn id_for(&self, table: Table) -> &str {
        match table {
            Table::Players => &self.players,
            Table::Matches => &self.matches,
            Table::Trainings => &self.trainings,
            Table::Goals => &self.goals,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            base_id: DEFAULT_BASE_ID.to_string(),
            token: None,
            tables: TableIds::default(),
            team_name: DEFAULT_TEAM_NAME.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let defaults = TableIds::default();
        Self {
            host: env_string("AIRTABLE_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            base_id: env_string("AIRTABLE_BASE_ID").unwrap_or_else(|| DEFAULT_BASE_ID.to_string()),
            token: env_string("AIRTABLE_TOKEN").and_then(|t| usable_token(&t)),
            tables: TableIds {
                players: env_string("AIRTABLE_TABLE_PLAYERS").unwrap_or(defaults.players),
                matches: env_string("AIRTABLE_TABLE_MATCHES").unwrap_or(defaults.matches),
                trainings: env_string("AIRTABLE_TABLE_TRAININGS").unwrap_or(defaults.trainings),
                goals: env_string("AIRTABLE_TABLE_GOALS").unwrap_or(defaults.goals),
            },
            team_name: env_string("TEAM_NAME").unwrap_or_else(|| DEFAULT_TEAM_NAME.to_string()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn table_url(&self, table: Table) -> String {
        format!(
            "https://{}/v0/{}/{}",
            self.host,
            self.base_id,
            self.tables.id_for(table)
        )
    }
}

/// Settings for the terminal app itself, separate from the record store.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_file: Option<PathBuf>,
    pub snapshot_file: Option<PathBuf>,
    pub auto_refresh: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            data_file: env_string("TEAM_DATA_FILE")
                .map(PathBuf::from)
                .or_else(crate::persist::default_data_path),
            snapshot_file: env_string("TEAM_SNAPSHOT_FILE").map(PathBuf::from),
            auto_refresh: env_bool("AUTO_REFRESH", false),
        }
    }
}

pub fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(4)
        .clamp(1, 8)
}

pub fn http_timeout_secs() -> u64 {
    env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(10)
        .max(1)
}

fn usable_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == TOKEN_PLACEHOLDER {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(val) => matches!(
            val.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}
