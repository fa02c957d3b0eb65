use std::fs;
use std::path::PathBuf;

use team_terminal::aggregate::{
    RawTables, normalize_bundle, normalize_match, normalize_player, tally_scoring,
};
use team_terminal::record_store::{Table, parse_records_json};
use team_terminal::schema::{MatchRecord, PlayerRecord, ScoringRecord};
use team_terminal::state::{EventKind, MatchResult, TRAINING_PLACEHOLDER_TITLE};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_tables() -> RawTables {
    RawTables {
        players: parse_records_json(&read_fixture("players.json"), Table::Players)
            .expect("players fixture should parse"),
        matches: parse_records_json(&read_fixture("matches.json"), Table::Matches)
            .expect("matches fixture should parse"),
        trainings: parse_records_json(&read_fixture("trainings.json"), Table::Trainings)
            .expect("trainings fixture should parse"),
        goals: parse_records_json(&read_fixture("goals.json"), Table::Goals)
            .expect("goals fixture should parse"),
    }
}

fn scoring(scorer: Option<&str>, assist: Option<&str>, n: u32) -> ScoringRecord {
    ScoringRecord {
        scorer: scorer.map(str::to_string),
        assist: assist.map(str::to_string),
        match_id: None,
        multiplicity: n,
    }
}

#[test]
fn multiplicities_fold_into_goals_and_assists() {
    let records = [
        scoring(Some("P1"), None, 2),
        scoring(Some("P1"), Some("P2"), 1),
    ];
    let tally = tally_scoring(&records);
    assert_eq!(tally.goals("P1"), 3);
    assert_eq!(tally.assists("P2"), 1);
    assert_eq!(tally.goals("P2"), 0);
    assert_eq!(tally.assists("P1"), 0);
}

#[test]
fn records_without_references_change_nothing() {
    let base = [scoring(Some("P1"), Some("P2"), 2)];
    let with_noise = [
        scoring(Some("P1"), Some("P2"), 2),
        scoring(None, None, 5),
        scoring(None, None, 1),
    ];
    assert_eq!(tally_scoring(&base), tally_scoring(&with_noise));
    assert!(tally_scoring(&[scoring(None, None, 3)]).is_empty());
}

#[test]
fn goals_equal_sum_of_scorer_multiplicities() {
    let records = [
        scoring(Some("A"), None, 1),
        scoring(Some("B"), Some("A"), 4),
        scoring(Some("A"), Some("B"), 3),
        scoring(Some("A"), None, 1),
    ];
    let tally = tally_scoring(&records);
    for id in ["A", "B"] {
        let expected: u32 = records
            .iter()
            .filter(|r| r.scorer.as_deref() == Some(id))
            .map(|r| r.multiplicity.max(1))
            .sum();
        assert_eq!(tally.goals(id), expected, "goals for {id}");
    }
}

#[test]
fn fixture_bundle_joins_goals_to_players() {
    let bundle = normalize_bundle(&fixture_tables(), "TC Caneva");

    assert_eq!(bundle.players.len(), 3);
    let luca = &bundle.players[0];
    assert_eq!(luca.id, "recP1");
    assert_eq!(luca.goals, 3);
    assert_eq!(luca.assists, 0);
    assert_eq!(luca.motm, 2);
    assert_eq!(luca.number, 9);
    assert_eq!(luca.jersey_number, "9");
    assert_eq!(luca.city, "Caneva");

    let marco = &bundle.players[1];
    assert_eq!(marco.number, 4);
    assert_eq!(marco.goals, 0);
    assert_eq!(marco.assists, 1);
}

#[test]
fn player_without_fields_gets_empty_strings() {
    let bundle = normalize_bundle(&fixture_tables(), "TC Caneva");
    let blank = &bundle.players[2];
    assert_eq!(blank.id, "recP3");
    assert_eq!(blank.number, 0);
    assert_eq!(blank.goals, 0);
    for value in [
        &blank.first_name,
        &blank.last_name,
        &blank.position,
        &blank.gender,
        &blank.birth_date,
        &blank.birth_place,
        &blank.address,
        &blank.street_number,
        &blank.city,
        &blank.province,
        &blank.postal_code,
        &blank.phone_prefix,
        &blank.phone,
        &blank.fiscal_code,
        &blank.id_card,
        &blank.kit,
        &blank.bag,
        &blank.jacket,
        &blank.size,
        &blank.jersey_number,
        &blank.jersey_training,
        &blank.photo_url,
    ] {
        assert_eq!(value, "");
    }

    let json = serde_json::to_value(blank).expect("player serializes");
    assert_eq!(json["birthPlace"], "");
    assert_eq!(json["jerseyTraining"], "");
}

#[test]
fn events_are_matches_then_trainings_in_source_order() {
    let tables = fixture_tables();
    let bundle = normalize_bundle(&tables, "TC Caneva");

    assert_eq!(
        bundle.events.len(),
        tables.matches.len() + tables.trainings.len()
    );
    let ids: Vec<&str> = bundle.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["recM1", "recM2", "recT1", "recT2"]);

    match &bundle.events[0].kind {
        EventKind::Match {
            opponent,
            home,
            result,
        } => {
            assert_eq!(opponent, "Rivals");
            assert_eq!(*home, Some(true));
            assert_eq!(
                *result,
                Some(MatchResult {
                    goals_for: 3,
                    goals_against: 1
                })
            );
        }
        EventKind::Training { .. } => panic!("first event should be a match"),
    }
    match &bundle.events[1].kind {
        EventKind::Match { result, .. } => assert_eq!(*result, None),
        EventKind::Training { .. } => panic!("second event should be a match"),
    }
    match &bundle.events[2].kind {
        EventKind::Training { notes } => assert_eq!(notes, "portare pettorine"),
        EventKind::Match { .. } => panic!("third event should be a training"),
    }
    assert_eq!(bundle.events[3].title, TRAINING_PLACEHOLDER_TITLE);
}

#[test]
fn match_title_uses_team_and_opponent() {
    let with_opponent = MatchRecord {
        id: "m1".to_string(),
        opponent: "Rivals".to_string(),
        ..MatchRecord::default()
    };
    let without = MatchRecord {
        id: "m2".to_string(),
        ..MatchRecord::default()
    };
    assert_eq!(
        normalize_match(&with_opponent, "Team").title,
        "Team vs Rivals"
    );
    assert_eq!(normalize_match(&without, "Team").title, "Partita");
}

#[test]
fn empty_tables_give_an_empty_bundle() {
    let bundle = normalize_bundle(&RawTables::default(), "TC Caneva");
    assert!(bundle.players.is_empty());
    assert!(bundle.events.is_empty());
}

#[test]
fn unmatched_player_has_zero_counters() {
    let tally = tally_scoring(&[scoring(Some("someone-else"), None, 4)]);
    let record = PlayerRecord {
        id: "lonely".to_string(),
        first_name: "Solo".to_string(),
        ..PlayerRecord::default()
    };
    let player = normalize_player(&record, &tally);
    assert_eq!(player.goals, 0);
    assert_eq!(player.assists, 0);
}
