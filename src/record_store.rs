use std::fmt;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::StoreConfig;
use crate::error::{FetchError, FetchResult};
use crate::http_client::http_client;
use crate::schema::fields;
use crate::state::{NewEvent, NewEventKind, NewPlayer};

/// The four tables the team base is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Players,
    Matches,
    Trainings,
    Goals,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Players, Table::Matches, Table::Trainings, Table::Goals];

    pub fn label(self) -> &'static str {
        match self {
            Table::Players => "players",
            Table::Matches => "matches",
            Table::Trainings => "trainings",
            Table::Goals => "goals",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One `{id, fields}` row exactly as the store returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RecordsPage {
    #[serde(default)]
    records: Vec<RawRecord>,
    #[serde(default)]
    offset: Option<String>,
}

pub trait TableSource: Sync {
    fn fetch_table(&self, table: Table) -> FetchResult<Vec<RawRecord>>;
}

pub struct RecordStoreClient {
    config: StoreConfig,
    client: &'static Client,
}

impl RecordStoreClient {
    pub fn new(config: StoreConfig) -> FetchResult<Self> {
        if !config.has_token() {
            return Err(FetchError::MissingToken);
        }
        Ok(Self {
            config,
            client: http_client()?,
        })
    }

    pub fn create_player(&self, player: &NewPlayer) -> FetchResult<RawRecord> {
        self.create_record(Table::Players, &player_body(player))
    }

    /// Matches and trainings live in separate tables; the event kind picks one.
    pub fn create_event(&self, event: &NewEvent) -> FetchResult<RawRecord> {
        let (table, body) = event_body(event);
        self.create_record(table, &body)
    }

    fn create_record(&self, table: Table, body: &Value) -> FetchResult<RawRecord> {
        let req = self.authorized(self.client.post(self.config.table_url(table)));
        let raw = send_for_body(req.json(body), table)?;
        serde_json::from_str(&raw).map_err(|source| FetchError::Decode { table, source })
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.config.token.as_deref() {
            Some(token) => req.header(AUTHORIZATION, format!("Bearer {token}")),
            None => req,
        }
    }
}

impl TableSource for RecordStoreClient {
    fn fetch_table(&self, table: Table) -> FetchResult<Vec<RawRecord>> {
        let url = self.config.table_url(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut req = self.authorized(self.client.get(&url));
            if let Some(offset) = offset.as_deref() {
                req = req.query(&[("offset", offset)]);
            }
            let raw = send_for_body(req, table)?;
            let page = parse_records_page(&raw, table)?;
            records.extend(page.records);

            match page.offset.filter(|o| !o.is_empty()) {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        log::debug!("{table}: {} records", records.len());
        Ok(records)
    }
}

/// `{"fields": {...}}` body for a new players row.
pub fn player_body(player: &NewPlayer) -> Value {
    let mut row = Map::new();
    row.insert(fields::FIRST_NAME.to_string(), json!(player.first_name));
    row.insert(fields::LAST_NAME.to_string(), json!(player.last_name));
    row.insert(fields::NUMBER.to_string(), json!(player.number));
    row.insert(fields::POSITION.to_string(), json!(player.position));
    json!({ "fields": row })
}

pub fn event_body(event: &NewEvent) -> (Table, Value) {
    let mut row = Map::new();
    row.insert(fields::DATE.to_string(), json!(event.date));
    row.insert(fields::TIME.to_string(), json!(event.time));
    row.insert(fields::LOCATION.to_string(), json!(event.location));
    let table = match &event.kind {
        NewEventKind::Match { opponent } => {
            row.insert(fields::OPPONENT.to_string(), json!(opponent));
            Table::Matches
        }
        NewEventKind::Training { notes } => {
            row.insert(fields::TITLE.to_string(), json!(event.title));
            row.insert(fields::NOTES.to_string(), json!(notes));
            Table::Trainings
        }
    };
    (table, json!({ "fields": row }))
}

fn send_for_body(req: RequestBuilder, table: Table) -> FetchResult<String> {
    let resp = req
        .send()
        .map_err(|source| FetchError::Transport { table, source })?;
    let status = resp.status();
    let body = resp
        .text()
        .map_err(|source| FetchError::Transport { table, source })?;
    if !status.is_success() {
        return Err(FetchError::Status {
            table,
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Decode a list response body into its records, ignoring pagination.
pub fn parse_records_json(raw: &str, table: Table) -> FetchResult<Vec<RawRecord>> {
    parse_records_page(raw, table).map(|page| page.records)
}

fn parse_records_page(raw: &str, table: Table) -> FetchResult<RecordsPage> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(RecordsPage {
            records: Vec::new(),
            offset: None,
        });
    }
    serde_json::from_str(trimmed).map_err(|source| FetchError::Decode { table, source })
}

#[cfg(test)]
mod tests {
    use super::{Table, event_body, parse_records_json, parse_records_page, player_body};
    use crate::error::FetchError;
    use crate::state::{NewEvent, NewEventKind, NewPlayer};

    #[test]
    fn records_without_fields_get_an_empty_map() {
        let raw = r#"{"records":[{"id":"rec1"},{"id":"rec2","fields":{"Nome":"Ada"}}]}"#;
        let records = parse_records_json(raw, Table::Players).expect("valid");
        assert_eq!(records.len(), 2);
        assert!(records[0].fields.is_empty());
        assert_eq!(records[1].fields["Nome"], "Ada");
    }

    #[test]
    fn empty_body_is_an_empty_table() {
        let records = parse_records_json("  ", Table::Goals).expect("valid");
        assert!(records.is_empty());
    }

    #[test]
    fn offset_is_picked_up_for_the_next_page() {
        let raw = r#"{"records":[],"offset":"itr123/rec9"}"#;
        let page = parse_records_page(raw, Table::Matches).expect("valid");
        assert_eq!(page.offset.as_deref(), Some("itr123/rec9"));
    }

    #[test]
    fn garbage_body_is_a_decode_error_for_that_table() {
        let err = parse_records_json("<html>", Table::Trainings).unwrap_err();
        assert!(matches!(err, FetchError::Decode { table: Table::Trainings, .. }));
        assert_eq!(err.table(), Some(Table::Trainings));
    }

    #[test]
    fn new_player_uses_store_column_names() {
        let body = player_body(&NewPlayer {
            first_name: "Ada".to_string(),
            last_name: "Neri".to_string(),
            number: 7,
            position: "Portiere".to_string(),
        });
        assert_eq!(body["fields"]["Nome"], "Ada");
        assert_eq!(body["fields"]["Cognome"], "Neri");
        assert_eq!(body["fields"]["Numero"], 7);
        assert_eq!(body["fields"]["Ruolo"], "Portiere");
    }

    #[test]
    fn event_kind_picks_the_target_table() {
        let mut event = NewEvent {
            title: "Tattica".to_string(),
            date: "2026-03-01".to_string(),
            time: "19:00".to_string(),
            location: "Palestra".to_string(),
            kind: NewEventKind::Training {
                notes: "pettorine".to_string(),
            },
        };
        let (table, body) = event_body(&event);
        assert_eq!(table, Table::Trainings);
        assert_eq!(body["fields"]["Titolo"], "Tattica");
        assert_eq!(body["fields"]["Note"], "pettorine");

        event.kind = NewEventKind::Match {
            opponent: "Rivals".to_string(),
        };
        let (table, body) = event_body(&event);
        assert_eq!(table, Table::Matches);
        assert_eq!(body["fields"]["Avversario"], "Rivals");
        assert_eq!(body["fields"]["Data"], "2026-03-01");
        assert!(body["fields"].get("Titolo").is_none());
    }
}
