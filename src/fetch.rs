use rayon::prelude::*;

use crate::aggregate::{RawTables, normalize_bundle};
use crate::config::fetch_parallelism;
use crate::error::FetchResult;
use crate::record_store::{RawRecord, Table, TableSource};
use crate::state::TeamBundle;

/// Fetch the four tables concurrently. Any single failure fails the whole
/// pass; the error reported is the first failing table in `Table::ALL` order.
pub fn fetch_all_tables<S>(source: &S, pool: Option<&rayon::ThreadPool>) -> FetchResult<RawTables>
where
    S: TableSource + ?Sized,
{
    let results: Vec<(Table, FetchResult<Vec<RawRecord>>)> = with_fetch_pool(pool, || {
        Table::ALL
            .par_iter()
            .map(|table| (*table, source.fetch_table(*table)))
            .collect()
    });

    let mut tables = RawTables::default();
    let mut first_err = None;
    for (table, result) in results {
        match result {
            Ok(records) => {
                log::info!("{table}: {} records", records.len());
                match table {
                    Table::Players => tables.players = records,
                    Table::Matches => tables.matches = records,
                    Table::Trainings => tables.trainings = records,
                    Table::Goals => tables.goals = records,
                }
            }
            Err(err) => {
                log::warn!("{table} fetch failed: {err}");
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => Ok(tables),
    }
}

/// Fetch every table and aggregate it into a bundle; nothing is produced on failure.
pub fn load_team_bundle<S>(
    source: &S,
    team_name: &str,
    pool: Option<&rayon::ThreadPool>,
) -> FetchResult<TeamBundle>
where
    S: TableSource + ?Sized,
{
    let tables = fetch_all_tables(source, pool)?;
    let bundle = normalize_bundle(&tables, team_name);
    log::info!(
        "normalized {} players, {} events",
        bundle.players.len(),
        bundle.events.len()
    );
    Ok(bundle)
}

pub fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(fetch_parallelism())
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: Option<&rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool {
        pool.install(action)
    } else {
        action()
    }
}
