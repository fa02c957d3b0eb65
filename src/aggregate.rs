use std::collections::HashMap;

use crate::record_store::RawRecord;
use crate::schema::{MatchRecord, PlayerRecord, ScoringRecord, TrainingRecord, parse_shirt_number};
use crate::state::{
    Event, EventKind, MatchResult, Player, TRAINING_PLACEHOLDER_TITLE, TeamBundle, match_title,
};

/// The four raw tables exactly as fetched.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub players: Vec<RawRecord>,
    pub matches: Vec<RawRecord>,
    pub trainings: Vec<RawRecord>,
    pub goals: Vec<RawRecord>,
}

/// Per-player goal and assist totals folded from scoring records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringTally {
    goals: HashMap<String, u32>,
    assists: HashMap<String, u32>,
}

impl ScoringTally {
    pub fn goals(&self, player_id: &str) -> u32 {
        self.goals.get(player_id).copied().unwrap_or(0)
    }

    pub fn assists(&self, player_id: &str) -> u32 {
        self.assists.get(player_id).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.assists.is_empty()
    }
}

pub fn tally_scoring<'a>(records: impl IntoIterator<Item = &'a ScoringRecord>) -> ScoringTally {
    let mut tally = ScoringTally::default();
    for record in records {
        let n = record.multiplicity.max(1);
        // Scorer and assister are counted independently, even when they are the same player.
        if let Some(scorer) = record.scorer.as_deref() {
            let entry = tally.goals.entry(scorer.to_string()).or_insert(0);
            *entry = entry.saturating_add(n);
        }
        if let Some(assist) = record.assist.as_deref() {
            let entry = tally.assists.entry(assist.to_string()).or_insert(0);
            *entry = entry.saturating_add(n);
        }
    }
    tally
}

pub fn normalize_player(record: &PlayerRecord, tally: &ScoringTally) -> Player {
    Player {
        id: record.id.clone(),
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        number: parse_shirt_number(&record.shirt_number),
        position: record.position.clone(),
        goals: tally.goals(&record.id),
        assists: tally.assists(&record.id),
        motm: record.motm,
        gender: record.gender.clone(),
        birth_date: record.birth_date.clone(),
        birth_place: record.birth_place.clone(),
        address: record.address.clone(),
        street_number: record.street_number.clone(),
        city: record.city.clone(),
        province: record.province.clone(),
        postal_code: record.postal_code.clone(),
        phone_prefix: record.phone_prefix.clone(),
        phone: record.phone.clone(),
        fiscal_code: record.fiscal_code.clone(),
        id_card: record.id_card.clone(),
        kit: record.kit.clone(),
        bag: record.bag.clone(),
        jacket: record.jacket.clone(),
        size: record.size.clone(),
        jersey_number: record.shirt_number.clone(),
        jersey_training: record.jersey_training.clone(),
        photo_url: record.photo_url.clone(),
    }
}

pub fn normalize_match(record: &MatchRecord, team_name: &str) -> Event {
    Event {
        id: record.id.clone(),
        title: match_title(team_name, &record.opponent),
        date: record.date.clone(),
        time: record.time.clone(),
        location: record.location.clone(),
        kind: EventKind::Match {
            opponent: record.opponent.clone(),
            home: record.home,
            result: match_result(record),
        },
    }
}

pub fn normalize_training(record: &TrainingRecord) -> Event {
    let title = if record.title.is_empty() {
        TRAINING_PLACEHOLDER_TITLE.to_string()
    } else {
        record.title.clone()
    };
    Event {
        id: record.id.clone(),
        title,
        date: record.date.clone(),
        time: record.time.clone(),
        location: record.location.clone(),
        kind: EventKind::Training {
            notes: record.notes.clone(),
        },
    }
}

/// Join scoring records onto players and merge matches and trainings.
///
/// Players keep source order. Events are every match in source order followed
/// by every training in source order; sorting by date is left to the views.
pub fn normalize_bundle(tables: &RawTables, team_name: &str) -> TeamBundle {
    let scoring: Vec<ScoringRecord> = tables.goals.iter().map(ScoringRecord::from_raw).collect();
    let tally = tally_scoring(&scoring);

    let players = tables
        .players
        .iter()
        .map(|raw| normalize_player(&PlayerRecord::from_raw(raw), &tally))
        .collect();

    let mut events = Vec::with_capacity(tables.matches.len() + tables.trainings.len());
    events.extend(
        tables
            .matches
            .iter()
            .map(|raw| normalize_match(&MatchRecord::from_raw(raw), team_name)),
    );
    events.extend(
        tables
            .trainings
            .iter()
            .map(|raw| normalize_training(&TrainingRecord::from_raw(raw))),
    );

    TeamBundle { players, events }
}

/// Explicit goal counts win; otherwise a "3-1" style label; otherwise unplayed.
fn match_result(record: &MatchRecord) -> Option<MatchResult> {
    if let (Some(goals_for), Some(goals_against)) = (record.goals_for, record.goals_against) {
        return Some(MatchResult {
            goals_for,
            goals_against,
        });
    }
    parse_score_label(&record.result)
}

fn parse_score_label(raw: &str) -> Option<MatchResult> {
    let (left, right) = raw.split_once(['-', ':'])?;
    let goals_for = left.trim().parse::<u32>().ok()?;
    let goals_against = right.trim().parse::<u32>().ok()?;
    Some(MatchResult {
        goals_for,
        goals_against,
    })
}
