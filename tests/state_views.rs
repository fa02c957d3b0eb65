use chrono::NaiveDate;

use team_terminal::state::{
    AppState, CalendarFilter, DataSource, Delta, Event, EventKind, FieldKey, Form, FormKind,
    FormOutput, Medal, NewEvent, NewEventKind, NewPlayer, Player, Screen, StatsTab, TeamBundle,
    UPCOMING_LIMIT, apply_delta, player_detail_sections,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn player(id: &str, last: &str, goals: u32, assists: u32, motm: u32) -> Player {
    Player {
        id: id.to_string(),
        first_name: format!("First{id}"),
        last_name: last.to_string(),
        goals,
        assists,
        motm,
        ..Player::default()
    }
}

fn event(id: &str, date: &str, training: bool) -> Event {
    Event {
        id: id.to_string(),
        title: format!("Event {id}"),
        date: date.to_string(),
        time: String::new(),
        location: String::new(),
        kind: if training {
            EventKind::Training {
                notes: String::new(),
            }
        } else {
            EventKind::Match {
                opponent: "Rivals".to_string(),
                home: None,
                result: None,
            }
        },
    }
}

fn state_with(players: Vec<Player>, events: Vec<Event>) -> AppState {
    let mut state = AppState::new();
    state.set_bundle(TeamBundle { players, events }, DataSource::Remote);
    state
}

#[test]
fn dashboard_counts_upcoming_and_played() {
    let state = state_with(
        vec![player("a", "Rossi", 3, 1, 0), player("b", "Verdi", 2, 0, 0)],
        vec![
            event("m1", "2026-01-10", false),
            event("m2", "2026-03-01", false),
            event("t1", "2026-01-12", true),
            event("t2", "2026-02-15", true),
            event("x", "", false),
        ],
    );
    let summary = state.dashboard(day(2026, 2, 15));
    assert_eq!(summary.total_players, 2);
    assert_eq!(summary.total_goals, 5);
    assert_eq!(summary.upcoming_events, 2);
    assert_eq!(summary.matches_played, 1);
}

#[test]
fn upcoming_events_are_soonest_first_and_capped() {
    let events = (1..=8)
        .rev()
        .map(|d| event(&format!("e{d}"), &format!("2026-05-0{d}"), d % 2 == 0))
        .collect();
    let state = state_with(Vec::new(), events);
    let upcoming = state.upcoming_events(day(2026, 5, 2), UPCOMING_LIMIT);
    let ids: Vec<&str> = upcoming.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e2", "e3", "e4", "e5", "e6"]);
}

#[test]
fn calendar_filters_and_sorts_newest_first() {
    let mut state = state_with(
        Vec::new(),
        vec![
            event("m1", "2026-01-10", false),
            event("t1", "2026-03-12", true),
            event("m2", "", false),
            event("m3", "2026-02-01", false),
        ],
    );

    let ids = |s: &AppState| -> Vec<String> {
        s.calendar_events().iter().map(|e| e.id.clone()).collect()
    };
    assert_eq!(ids(&state), vec!["t1", "m3", "m1", "m2"]);

    state.cycle_calendar_filter();
    assert_eq!(state.calendar_filter, CalendarFilter::Matches);
    assert_eq!(ids(&state), vec!["m3", "m1", "m2"]);

    state.cycle_calendar_filter();
    assert_eq!(state.calendar_filter, CalendarFilter::Trainings);
    assert_eq!(ids(&state), vec!["t1"]);
}

#[test]
fn roster_sorts_by_last_name_ignoring_case() {
    let state = state_with(
        vec![
            player("a", "zanin", 0, 0, 0),
            player("b", "Bianchi", 0, 0, 0),
            player("c", "Moro", 0, 0, 0),
        ],
        Vec::new(),
    );
    let names: Vec<&str> = state.roster().iter().map(|p| p.last_name.as_str()).collect();
    assert_eq!(names, vec!["Bianchi", "Moro", "zanin"]);
}

#[test]
fn leaderboards_rank_by_their_key() {
    let state = state_with(
        vec![
            player("a", "A", 1, 5, 0),
            player("b", "B", 4, 0, 2),
            player("c", "C", 2, 1, 7),
            player("d", "D", 0, 0, 0),
        ],
        Vec::new(),
    );

    let goals = state.leaderboard(StatsTab::Goals);
    let ids: Vec<&str> = goals.iter().map(|r| r.player.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a", "d"]);
    assert_eq!(goals[0].medal, Some(Medal::Gold));
    assert_eq!(goals[2].medal, Some(Medal::Bronze));
    assert_eq!(goals[3].medal, None);
    assert_eq!(goals[3].rank, 4);

    let contributions = state.leaderboard(StatsTab::Contributions);
    assert_eq!(contributions[0].player.id, "a");
    assert_eq!(contributions[0].value, 6);

    let motm = state.leaderboard(StatsTab::Motm);
    assert_eq!(motm[0].player.id, "c");
}

#[test]
fn leaderboard_ties_keep_bundle_order() {
    let state = state_with(
        vec![
            player("first", "Z", 2, 0, 0),
            player("second", "A", 2, 0, 0),
        ],
        Vec::new(),
    );
    let goals = state.leaderboard(StatsTab::Goals);
    assert_eq!(goals[0].player.id, "first");
    assert_eq!(goals[1].player.id, "second");
}

#[test]
fn local_ids_strictly_increase() {
    let mut state = state_with(vec![player("5000", "Old", 0, 0, 0)], Vec::new());
    let a = state.next_local_id(1000);
    let b = state.next_local_id(1000);
    let c = state.next_local_id(9000);
    assert_eq!(a, "5001");
    assert_eq!(b, "5002");
    assert_eq!(c, "9000");
}

#[test]
fn added_player_starts_with_zero_counters() {
    let mut state = AppState::new();
    let added = state
        .add_player(
            NewPlayer {
                first_name: "Ada".to_string(),
                last_name: "Neri".to_string(),
                number: 7,
                position: "Portiere".to_string(),
            },
            1_700_000_000_000,
        )
        .clone();
    assert_eq!(added.id, "1700000000000");
    assert_eq!(added.goals, 0);
    assert_eq!(added.assists, 0);
    assert_eq!(added.motm, 0);
    assert_eq!(added.jersey_number, "7");
    assert_eq!(state.bundle.players.len(), 1);
}

#[test]
fn added_event_keeps_its_kind() {
    let mut state = AppState::new();
    state.add_event(
        NewEvent {
            title: "Amichevole".to_string(),
            date: "2026-06-01".to_string(),
            time: "18:00".to_string(),
            location: "Campo".to_string(),
            kind: NewEventKind::Match {
                opponent: "Rivals".to_string(),
            },
        },
        42,
    );
    let stored = &state.bundle.events[0];
    assert_eq!(stored.id, "42");
    assert!(matches!(stored.kind, EventKind::Match { ref opponent, .. } if opponent == "Rivals"));
}

#[test]
fn match_form_builds_title_and_normalizes_date() {
    let mut form = Form::new(FormKind::Match);
    form.set_value(FieldKey::Opponent, "Rivals");
    form.set_value(FieldKey::Date, "05/10/2026");
    match form.submit("TC Caneva").expect("form is valid") {
        FormOutput::Event(event) => {
            assert_eq!(event.title, "TC Caneva vs Rivals");
            assert_eq!(event.date, "2026-10-05");
        }
        FormOutput::Player(_) => panic!("expected an event"),
    }
}

#[test]
fn event_form_without_date_is_rejected_and_stays_open() {
    let mut state = AppState::new();
    state.open_form(FormKind::Training);
    assert!(!state.submit_form(1));
    assert!(state.form.is_some());
    assert!(state.bundle.events.is_empty());
    assert!(state.logs.back().is_some_and(|l| l.starts_with("[WARN]")));
}

#[test]
fn toggling_event_form_keeps_shared_fields() {
    let mut form = Form::new(FormKind::Match);
    form.set_value(FieldKey::Date, "2026-01-01");
    form.set_value(FieldKey::Location, "Campo");
    form.set_value(FieldKey::Opponent, "Rivals");
    form.toggle_event_kind();
    assert_eq!(form.kind, FormKind::Training);
    assert_eq!(form.value(FieldKey::Date), "2026-01-01");
    assert_eq!(form.value(FieldKey::Location), "Campo");
    assert_eq!(form.value(FieldKey::Opponent), "");
}

#[test]
fn player_form_with_bad_number_defaults_to_zero() {
    let mut state = AppState::new();
    state.open_form(FormKind::Player);
    if let Some(form) = state.form.as_mut() {
        form.set_value(FieldKey::FirstName, "Ada");
        form.set_value(FieldKey::Number, "dieci");
    }
    assert!(state.submit_form(10));
    assert!(state.form.is_none());
    assert_eq!(state.bundle.players[0].number, 0);
}

#[test]
fn detail_sections_skip_empty_groups() {
    let mut p = player("a", "Rossi", 1, 2, 0);
    p.city = "Caneva".to_string();
    p.postal_code = "33070".to_string();
    let sections = player_detail_sections(&p);
    let titles: Vec<&str> = sections.iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Statistics", "Residence"]);
    assert_eq!(sections[1].rows, vec![("City", "Caneva (33070)".to_string())]);
    assert!(sections[0].rows.contains(&("Total contributions", "3".to_string())));
}

#[test]
fn failed_refresh_keeps_the_current_bundle() {
    let mut state = state_with(vec![player("a", "Rossi", 0, 0, 0)], Vec::new());
    state.refreshing = true;
    apply_delta(&mut state, Delta::RefreshFailed("players http 503".to_string()));
    assert!(!state.refreshing);
    assert_eq!(state.bundle.players.len(), 1);
    assert_eq!(state.source, DataSource::Remote);
}

#[test]
fn refresh_that_drops_the_open_player_returns_to_roster() {
    let mut state = state_with(vec![player("a", "Rossi", 0, 0, 0)], Vec::new());
    state.screen = Screen::Roster;
    state.open_selected_player();
    assert_eq!(
        state.screen,
        Screen::PlayerDetail {
            player_id: "a".to_string()
        }
    );
    apply_delta(
        &mut state,
        Delta::SetBundle {
            bundle: TeamBundle::default(),
            source: DataSource::Remote,
        },
    );
    assert_eq!(state.screen, Screen::Roster);
}
