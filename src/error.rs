use thiserror::Error;

use crate::record_store::Table;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http client build failed: {0}")]
    Client(String),

    #[error("no record store token configured (set AIRTABLE_TOKEN)")]
    MissingToken,

    #[error("{table} request failed: {source}")]
    Transport {
        table: Table,
        #[source]
        source: reqwest::Error,
    },

    #[error("{table} http {status}: {body}")]
    Status {
        table: Table,
        status: u16,
        body: String,
    },

    #[error("{table} response is not valid json: {source}")]
    Decode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn table(&self) -> Option<Table> {
        match self {
            FetchError::Transport { table, .. }
            | FetchError::Status { table, .. }
            | FetchError::Decode { table, .. } => Some(*table),
            FetchError::Client(_) | FetchError::MissingToken => None,
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
