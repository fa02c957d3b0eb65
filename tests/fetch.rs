use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::json;

use team_terminal::error::{FetchError, FetchResult};
use team_terminal::fetch::{fetch_all_tables, load_team_bundle};
use team_terminal::record_store::{RawRecord, Table, TableSource};

/// In-memory tables; a table listed in `failing` answers with an HTTP error.
#[derive(Default)]
struct StubSource {
    tables: HashMap<Table, Vec<RawRecord>>,
    failing: Vec<Table>,
    calls: Mutex<Vec<Table>>,
}

impl StubSource {
    fn with(mut self, table: Table, records: Vec<RawRecord>) -> Self {
        self.tables.insert(table, records);
        self
    }

    fn failing(mut self, table: Table) -> Self {
        self.failing.push(table);
        self
    }
}

impl TableSource for StubSource {
    fn fetch_table(&self, table: Table) -> FetchResult<Vec<RawRecord>> {
        self.calls.lock().expect("calls lock").push(table);
        if self.failing.contains(&table) {
            return Err(FetchError::Status {
                table,
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.tables.get(&table).cloned().unwrap_or_default())
    }
}

fn record(id: &str, fields: serde_json::Value) -> RawRecord {
    RawRecord {
        id: id.to_string(),
        fields: fields.as_object().cloned().unwrap_or_default(),
    }
}

#[test]
fn all_empty_tables_give_an_empty_bundle() {
    let source = StubSource::default();
    let bundle = load_team_bundle(&source, "TC Caneva", None).expect("empty fetch succeeds");
    assert!(bundle.players.is_empty());
    assert!(bundle.events.is_empty());

    let calls = source.calls.lock().expect("calls lock");
    assert_eq!(calls.len(), 4);
    for table in Table::ALL {
        assert!(calls.contains(&table), "{table} was not fetched");
    }
}

#[test]
fn one_failing_table_fails_the_whole_pass() {
    let source = StubSource::default()
        .with(Table::Players, vec![record("recP1", json!({"Nome": "Ada"}))])
        .failing(Table::Trainings);

    let err = load_team_bundle(&source, "TC Caneva", None).expect_err("fetch should fail");
    assert_eq!(err.table(), Some(Table::Trainings));
    assert!(matches!(err, FetchError::Status { status: 503, .. }));
}

#[test]
fn first_failure_in_table_order_is_reported() {
    let source = StubSource::default()
        .failing(Table::Goals)
        .failing(Table::Matches);
    let err = fetch_all_tables(&source, None).expect_err("fetch should fail");
    assert_eq!(err.table(), Some(Table::Matches));
}

#[test]
fn fetched_tables_land_in_their_slots() {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(2)
        .build()
        .expect("pool");
    let source = StubSource::default()
        .with(Table::Players, vec![record("recP1", json!({"Nome": "Ada"}))])
        .with(Table::Matches, vec![record("recM1", json!({"Avversario": "Rivals"}))])
        .with(Table::Trainings, vec![record("recT1", json!({}))])
        .with(
            Table::Goals,
            vec![record("recG1", json!({"Giocatore": ["recP1"], "Numero": 2}))],
        );

    let tables = fetch_all_tables(&source, Some(&pool)).expect("fetch succeeds");
    assert_eq!(tables.players[0].id, "recP1");
    assert_eq!(tables.matches[0].id, "recM1");
    assert_eq!(tables.trainings[0].id, "recT1");
    assert_eq!(tables.goals[0].id, "recG1");

    let bundle = load_team_bundle(&source, "Caneva", Some(&pool)).expect("fetch succeeds");
    assert_eq!(bundle.players[0].goals, 2);
    assert_eq!(bundle.events[0].title, "Caneva vs Rivals");
    assert_eq!(bundle.events.len(), 2);
}
