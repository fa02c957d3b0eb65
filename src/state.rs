use std::cmp::Ordering;
use std::collections::VecDeque;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_TEAM_NAME;

pub const MATCH_PLACEHOLDER_TITLE: &str = "Partita";
pub const TRAINING_PLACEHOLDER_TITLE: &str = "Allenamento";
pub const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(deserialize_with = "count_from_any")]
    pub number: u32,
    pub position: String,
    #[serde(deserialize_with = "count_from_any")]
    pub goals: u32,
    #[serde(deserialize_with = "count_from_any")]
    pub assists: u32,
    #[serde(deserialize_with = "count_from_any")]
    pub motm: u32,

    // Personal and equipment attributes are passed through as text.
    pub gender: String,
    pub birth_date: String,
    pub birth_place: String,
    pub address: String,
    pub street_number: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub phone_prefix: String,
    pub phone: String,
    pub fiscal_code: String,
    pub id_card: String,
    pub kit: String,
    pub bag: String,
    pub jacket: String,
    pub size: String,
    pub jersey_number: String,
    pub jersey_training: String,
    pub photo_url: String,
}

impl Player {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn contributions(&self) -> u32 {
        self.goals.saturating_add(self.assists)
    }

    /// Shirt shown in headers: the numeric shirt, else the raw jersey text, else `?`.
    pub fn shirt_label(&self) -> String {
        if self.number > 0 {
            self.number.to_string()
        } else if !self.jersey_number.is_empty() {
            self.jersey_number.clone()
        } else {
            "?".to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "id_from_any")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(flatten)]
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    Match {
        #[serde(default)]
        opponent: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        home: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<MatchResult>,
    },
    Training {
        #[serde(default)]
        notes: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub goals_for: u32,
    pub goals_against: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn outcome(&self) -> Outcome {
        match self.goals_for.cmp(&self.goals_against) {
            Ordering::Greater => Outcome::Win,
            Ordering::Equal => Outcome::Draw,
            Ordering::Less => Outcome::Loss,
        }
    }
}

impl Event {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_event_date(&self.date)
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            EventKind::Match { .. } => "Match",
            EventKind::Training { .. } => "Training",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamBundle {
    pub players: Vec<Player>,
    pub events: Vec<Event>,
}

impl TeamBundle {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.events.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    pub number: u32,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub kind: NewEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewEventKind {
    Match { opponent: String },
    Training { notes: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Demo,
    Snapshot,
    Local,
    Remote,
}

pub fn data_source_label(source: DataSource) -> &'static str {
    match source {
        DataSource::Demo => "DEMO",
        DataSource::Snapshot => "SNAPSHOT",
        DataSource::Local => "LOCAL",
        DataSource::Remote => "REMOTE",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Roster,
    PlayerDetail { player_id: String },
    Calendar,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarFilter {
    All,
    Matches,
    Trainings,
}

impl CalendarFilter {
    pub fn accepts(self, kind: &EventKind) -> bool {
        match (self, kind) {
            (CalendarFilter::All, _) => true,
            (CalendarFilter::Matches, EventKind::Match { .. }) => true,
            (CalendarFilter::Trainings, EventKind::Training { .. }) => true,
            (CalendarFilter::Matches, EventKind::Training { .. })
            | (CalendarFilter::Trainings, EventKind::Match { .. }) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsTab {
    Goals,
    Contributions,
    Motm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

#[derive(Debug, Clone)]
pub struct LeaderboardRow<'a> {
    pub rank: usize,
    pub medal: Option<Medal>,
    pub player: &'a Player,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardSummary {
    pub total_players: usize,
    pub upcoming_events: usize,
    pub total_goals: u32,
    pub matches_played: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey {
    FirstName,
    LastName,
    Number,
    Position,
    Title,
    Date,
    Time,
    Location,
    Opponent,
    Notes,
}

impl FieldKey {
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::FirstName => "First name",
            FieldKey::LastName => "Last name",
            FieldKey::Number => "Number",
            FieldKey::Position => "Position",
            FieldKey::Title => "Title",
            FieldKey::Date => "Date (YYYY-MM-DD)",
            FieldKey::Time => "Time",
            FieldKey::Location => "Location",
            FieldKey::Opponent => "Opponent",
            FieldKey::Notes => "Notes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Player,
    Match,
    Training,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: FieldKey,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<FormField>,
    pub focus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutput {
    Player(NewPlayer),
    Event(NewEvent),
}

impl Form {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            fields: form_keys(kind)
                .iter()
                .map(|key| FormField {
                    key: *key,
                    value: String::new(),
                })
                .collect(),
            focus: 0,
        }
    }

    /// Switch between match and training, keeping the values the two share.
    pub fn toggle_event_kind(&mut self) {
        let next = match self.kind {
            FormKind::Player => return,
            FormKind::Match => FormKind::Training,
            FormKind::Training => FormKind::Match,
        };
        let mut form = Form::new(next);
        for field in &mut form.fields {
            field.value = self.value(field.key).to_string();
        }
        form.focus = self.focus.min(form.fields.len().saturating_sub(1));
        *self = form;
    }

    pub fn value(&self, key: FieldKey) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn set_value(&mut self, key: FieldKey, value: &str) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value.to_string();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn title(&self) -> &'static str {
        match self.kind {
            FormKind::Player => "Add player",
            FormKind::Match => "Add match",
            FormKind::Training => "Add training",
        }
    }

    pub fn submit(&self, team_name: &str) -> Result<FormOutput, String> {
        let get = |key: FieldKey| self.value(key).trim().to_string();
        match self.kind {
            FormKind::Player => {
                let first_name = get(FieldKey::FirstName);
                let last_name = get(FieldKey::LastName);
                if first_name.is_empty() && last_name.is_empty() {
                    return Err("player needs a name".to_string());
                }
                Ok(FormOutput::Player(NewPlayer {
                    first_name,
                    last_name,
                    number: get(FieldKey::Number).parse::<u32>().unwrap_or(0),
                    position: get(FieldKey::Position),
                }))
            }
            FormKind::Match => self.submit_event(
                NewEventKind::Match {
                    opponent: get(FieldKey::Opponent),
                },
                team_name,
            ),
            FormKind::Training => self.submit_event(
                NewEventKind::Training {
                    notes: get(FieldKey::Notes),
                },
                team_name,
            ),
        }
    }

    fn submit_event(&self, kind: NewEventKind, team_name: &str) -> Result<FormOutput, String> {
        let get = |key: FieldKey| self.value(key).trim().to_string();
        let date = normalize_form_date(&get(FieldKey::Date))
            .ok_or_else(|| "event needs a valid date".to_string())?;
        let mut title = get(FieldKey::Title);
        if title.is_empty() {
            title = default_event_title(&kind, team_name);
        }
        Ok(FormOutput::Event(NewEvent {
            title,
            date,
            time: get(FieldKey::Time),
            location: get(FieldKey::Location),
            kind,
        }))
    }
}

fn form_keys(kind: FormKind) -> &'static [FieldKey] {
    match kind {
        FormKind::Player => &[
            FieldKey::FirstName,
            FieldKey::LastName,
            FieldKey::Number,
            FieldKey::Position,
        ],
        FormKind::Match => &[
            FieldKey::Opponent,
            FieldKey::Title,
            FieldKey::Date,
            FieldKey::Time,
            FieldKey::Location,
        ],
        FormKind::Training => &[
            FieldKey::Title,
            FieldKey::Date,
            FieldKey::Time,
            FieldKey::Location,
            FieldKey::Notes,
        ],
    }
}

fn default_event_title(kind: &NewEventKind, team_name: &str) -> String {
    match kind {
        NewEventKind::Match { opponent } => match_title(team_name, opponent),
        NewEventKind::Training { .. } => TRAINING_PLACEHOLDER_TITLE.to_string(),
    }
}

pub fn match_title(team_name: &str, opponent: &str) -> String {
    let opponent = opponent.trim();
    if opponent.is_empty() {
        MATCH_PLACEHOLDER_TITLE.to_string()
    } else {
        format!("{team_name} vs {opponent}")
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetBundle {
        bundle: TeamBundle,
        source: DataSource,
    },
    RefreshFailed(String),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Refresh,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub team_name: String,
    pub bundle: TeamBundle,
    pub source: DataSource,
    pub screen: Screen,
    pub roster_selected: usize,
    pub calendar_filter: CalendarFilter,
    pub calendar_scroll: usize,
    pub stats_tab: StatsTab,
    pub form: Option<Form>,
    pub refreshing: bool,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    last_local_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_team(DEFAULT_TEAM_NAME)
    }

    pub fn with_team(team_name: &str) -> Self {
        Self {
            team_name: team_name.to_string(),
            bundle: TeamBundle::default(),
            source: DataSource::Demo,
            screen: Screen::Dashboard,
            roster_selected: 0,
            calendar_filter: CalendarFilter::All,
            calendar_scroll: 0,
            stats_tab: StatsTab::Goals,
            form: None,
            refreshing: false,
            logs: VecDeque::new(),
            help_overlay: false,
            last_local_id: 0,
        }
    }

    /// Replace the bundle. A remote bundle keeps the entries that were only
    /// ever added here, since they are never written back to the store.
    pub fn set_bundle(&mut self, mut bundle: TeamBundle, source: DataSource) {
        if source == DataSource::Remote {
            carry_local_entries(&self.bundle, &mut bundle);
        }
        self.last_local_id = self.last_local_id.max(max_numeric_id(&bundle));
        self.bundle = bundle;
        self.source = source;
        self.roster_selected = self
            .roster_selected
            .min(self.bundle.players.len().saturating_sub(1));
        self.calendar_scroll = 0;
        if let Screen::PlayerDetail { player_id } = &self.screen
            && self.player(player_id).is_none()
        {
            self.screen = Screen::Roster;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Hand out a local id from the clock, strictly above every id seen so far.
    pub fn next_local_id(&mut self, now_ms: u64) -> String {
        let id = now_ms.max(self.last_local_id.saturating_add(1));
        self.last_local_id = id;
        id.to_string()
    }

    pub fn add_player(&mut self, new: NewPlayer, now_ms: u64) -> &Player {
        let id = self.next_local_id(now_ms);
        let jersey_number = if new.number > 0 {
            new.number.to_string()
        } else {
            String::new()
        };
        self.bundle.players.push(Player {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            number: new.number,
            position: new.position,
            jersey_number,
            ..Player::default()
        });
        let idx = self.bundle.players.len() - 1;
        &self.bundle.players[idx]
    }

    pub fn add_event(&mut self, new: NewEvent, now_ms: u64) -> &Event {
        let id = self.next_local_id(now_ms);
        let kind = match new.kind {
            NewEventKind::Match { opponent } => EventKind::Match {
                opponent,
                home: None,
                result: None,
            },
            NewEventKind::Training { notes } => EventKind::Training { notes },
        };
        self.bundle.events.push(Event {
            id,
            title: new.title,
            date: new.date,
            time: new.time,
            location: new.location,
            kind,
        });
        let idx = self.bundle.events.len() - 1;
        &self.bundle.events[idx]
    }

    pub fn open_form(&mut self, kind: FormKind) {
        self.form = Some(Form::new(kind));
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Apply the open form to the bundle. Returns true when the bundle changed
    /// and needs persisting; a rejected form stays open.
    pub fn submit_form(&mut self, now_ms: u64) -> bool {
        let Some(form) = self.form.as_ref() else {
            return false;
        };
        match form.submit(&self.team_name) {
            Ok(FormOutput::Player(new)) => {
                let name = self.add_player(new, now_ms).full_name();
                self.push_log(format!("[INFO] Added player {name}"));
            }
            Ok(FormOutput::Event(new)) => {
                let title = self.add_event(new, now_ms).title.clone();
                self.push_log(format!("[INFO] Added event {title}"));
            }
            Err(reason) => {
                self.push_log(format!("[WARN] Form not saved: {reason}"));
                return false;
            }
        }
        self.form = None;
        true
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.bundle.players.iter().find(|p| p.id == id)
    }

    pub fn dashboard(&self, today: NaiveDate) -> DashboardSummary {
        let mut upcoming_events = 0;
        let mut matches_played = 0;
        for event in &self.bundle.events {
            let Some(date) = event.parsed_date() else {
                continue;
            };
            if date >= today {
                upcoming_events += 1;
            } else {
                match event.kind {
                    EventKind::Match { .. } => matches_played += 1,
                    EventKind::Training { .. } => {}
                }
            }
        }
        DashboardSummary {
            total_players: self.bundle.players.len(),
            upcoming_events,
            total_goals: self.bundle.players.iter().map(|p| p.goals).sum(),
            matches_played,
        }
    }

    /// Events on or after `today`, soonest first.
    pub fn upcoming_events(&self, today: NaiveDate, limit: usize) -> Vec<&Event> {
        let mut upcoming: Vec<(NaiveDate, &Event)> = self
            .bundle
            .events
            .iter()
            .filter_map(|e| e.parsed_date().map(|d| (d, e)))
            .filter(|(d, _)| *d >= today)
            .collect();
        upcoming.sort_by_key(|(d, _)| *d);
        upcoming.into_iter().take(limit).map(|(_, e)| e).collect()
    }

    /// Calendar rows for the active filter, newest first; undated events last.
    pub fn calendar_events(&self) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .bundle
            .events
            .iter()
            .filter(|e| self.calendar_filter.accepts(&e.kind))
            .collect();
        events.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        events
    }

    pub fn roster(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.bundle.players.iter().collect();
        players.sort_by_cached_key(|p| p.last_name.to_lowercase());
        players
    }

    pub fn selected_player(&self) -> Option<&Player> {
        self.roster().get(self.roster_selected).copied()
    }

    pub fn leaderboard(&self, tab: StatsTab) -> Vec<LeaderboardRow<'_>> {
        let key = |p: &Player| match tab {
            StatsTab::Goals => p.goals,
            StatsTab::Contributions => p.contributions(),
            StatsTab::Motm => p.motm,
        };
        let mut players: Vec<&Player> = self.bundle.players.iter().collect();
        players.sort_by(|a, b| key(*b).cmp(&key(*a)));
        players
            .into_iter()
            .enumerate()
            .map(|(idx, player)| LeaderboardRow {
                rank: idx + 1,
                medal: match idx {
                    0 => Some(Medal::Gold),
                    1 => Some(Medal::Silver),
                    2 => Some(Medal::Bronze),
                    _ => None,
                },
                player,
                value: key(player),
            })
            .collect()
    }

    pub fn open_selected_player(&mut self) {
        if let Some(id) = self.selected_player().map(|p| p.id.clone()) {
            self.screen = Screen::PlayerDetail { player_id: id };
        }
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Roster => {
                let total = self.bundle.players.len();
                if total == 0 {
                    self.roster_selected = 0;
                } else {
                    self.roster_selected = (self.roster_selected + 1) % total;
                }
            }
            Screen::Calendar => {
                let total = self.calendar_events().len();
                if self.calendar_scroll + 1 < total {
                    self.calendar_scroll += 1;
                }
            }
            _ => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Roster => {
                let total = self.bundle.players.len();
                if total == 0 {
                    self.roster_selected = 0;
                } else if self.roster_selected == 0 {
                    self.roster_selected = total - 1;
                } else {
                    self.roster_selected -= 1;
                }
            }
            Screen::Calendar => {
                self.calendar_scroll = self.calendar_scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    pub fn cycle_calendar_filter(&mut self) {
        self.calendar_filter = match self.calendar_filter {
            CalendarFilter::All => CalendarFilter::Matches,
            CalendarFilter::Matches => CalendarFilter::Trainings,
            CalendarFilter::Trainings => CalendarFilter::All,
        };
        self.calendar_scroll = 0;
    }

    pub fn cycle_stats_tab(&mut self) {
        self.stats_tab = match self.stats_tab {
            StatsTab::Goals => StatsTab::Contributions,
            StatsTab::Contributions => StatsTab::Motm,
            StatsTab::Motm => StatsTab::Goals,
        };
    }
}

/// Group a player's optional attributes for the detail view, dropping empty ones.
pub fn player_detail_sections(player: &Player) -> Vec<DetailSection> {
    let stats = DetailSection {
        title: "Statistics",
        rows: vec![
            ("Goals", player.goals.to_string()),
            ("Assists", player.assists.to_string()),
            ("Total contributions", player.contributions().to_string()),
            ("Man of the match", player.motm.to_string()),
        ],
    };

    let join = |a: &str, b: &str| format!("{a} {b}").trim().to_string();
    let city = if player.postal_code.is_empty() {
        player.city.clone()
    } else {
        format!("{} ({})", player.city, player.postal_code)
            .trim()
            .to_string()
    };

    let candidates = [
        (
            "Personal info",
            vec![
                ("Birth date", player.birth_date.clone()),
                ("Birth place", player.birth_place.clone()),
                ("Gender", player.gender.clone()),
                ("Fiscal code", player.fiscal_code.clone()),
                ("ID card", player.id_card.clone()),
            ],
        ),
        (
            "Residence",
            vec![
                ("Address", join(&player.address, &player.street_number)),
                ("City", if player.city.is_empty() { String::new() } else { city }),
                ("Province", player.province.clone()),
            ],
        ),
        (
            "Contacts",
            vec![(
                "Phone",
                if player.phone.is_empty() {
                    String::new()
                } else {
                    join(&player.phone_prefix, &player.phone)
                },
            )],
        ),
        (
            "Equipment",
            vec![
                ("Jersey number", player.jersey_number.clone()),
                ("Size", player.size.clone()),
                ("Kit", player.kit.clone()),
                ("Bag", player.bag.clone()),
                ("Jacket", player.jacket.clone()),
                ("Training jersey", player.jersey_training.clone()),
            ],
        ),
    ];

    let mut sections = vec![stats];
    for (title, rows) in candidates {
        let rows: Vec<(&'static str, String)> =
            rows.into_iter().filter(|(_, v)| !v.is_empty()).collect();
        if !rows.is_empty() {
            sections.push(DetailSection { title, rows });
        }
    }
    sections
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetBundle { bundle, source } => {
            let players = bundle.players.len();
            let events = bundle.events.len();
            state.set_bundle(bundle, source);
            state.refreshing = false;
            state.push_log(format!(
                "[INFO] Loaded {players} players, {events} events ({})",
                data_source_label(source)
            ));
            let kept = (state.bundle.players.len() - players) + (state.bundle.events.len() - events);
            if kept > 0 {
                state.push_log(format!("[INFO] Kept {kept} local additions"));
            }
        }
        Delta::RefreshFailed(err) => {
            state.refreshing = false;
            state.push_log(format!("[WARN] Refresh failed: {err}"));
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Datetime values keep only their date part.
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, fmt) {
            return Some(date);
        }
    }
    None
}

pub fn normalize_form_date(raw: &str) -> Option<String> {
    parse_event_date(raw).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Local additions get clock-derived numeric ids; store record ids never are numeric.
fn is_local_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}

fn carry_local_entries(current: &TeamBundle, incoming: &mut TeamBundle) {
    let local_players: Vec<Player> = current
        .players
        .iter()
        .filter(|p| is_local_id(&p.id) && !incoming.players.iter().any(|q| q.id == p.id))
        .cloned()
        .collect();
    let local_events: Vec<Event> = current
        .events
        .iter()
        .filter(|e| is_local_id(&e.id) && !incoming.events.iter().any(|f| f.id == e.id))
        .cloned()
        .collect();
    incoming.players.extend(local_players);
    incoming.events.extend(local_events);
}

fn max_numeric_id(bundle: &TeamBundle) -> u64 {
    let player_ids = bundle.players.iter().map(|p| p.id.as_str());
    let event_ids = bundle.events.iter().map(|e| e.id.as_str());
    player_ids
        .chain(event_ids)
        .filter_map(|id| id.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
}

fn id_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

fn count_from_any<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_f64().map(|v| v.max(0.0) as u32))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u32>().unwrap_or(0),
        _ => 0,
    })
}
