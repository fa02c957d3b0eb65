//! Typed views over raw store records.
//!
//! Field names are the store's own column names. Decoding never fails: a
//! missing or oddly typed field becomes the empty/zero default.

use serde_json::{Map, Value};

use crate::record_store::RawRecord;

pub mod fields {
    pub const FIRST_NAME: &str = "Nome";
    pub const LAST_NAME: &str = "Cognome";
    pub const SHIRT_NUMBER: &str = "n. maglia";
    pub const NUMBER: &str = "Numero";
    pub const POSITION: &str = "Ruolo";
    pub const MOTM: &str = "MOTM";
    pub const GENDER: &str = "Sesso";
    pub const BIRTH_DATE: &str = "Data di nascita";
    pub const BIRTH_PLACE: &str = "Luogo di nascita";
    pub const ADDRESS: &str = "Indirizzo";
    pub const STREET_NUMBER: &str = "N. Civico";
    pub const CITY: &str = "Città";
    pub const PROVINCE: &str = "Prov.";
    pub const POSTAL_CODE: &str = "C.A.P.";
    pub const PHONE_PREFIX: &str = "Pref.";
    pub const PHONE: &str = "Telefono";
    pub const FISCAL_CODE: &str = "Codice Fiscale";
    pub const ID_CARD: &str = "Carta d'identità";
    pub const KIT: &str = "Muta";
    pub const BAG: &str = "Borsa";
    pub const JACKET: &str = "Felpa/Giubbotto";
    pub const SIZE: &str = "taglia";
    pub const JERSEY_TRAINING: &str = "Maglia all.";
    pub const PHOTO: &str = "Foto";

    pub const OPPONENT: &str = "Avversario";
    pub const DATE: &str = "Data";
    pub const TIME: &str = "Ora";
    pub const LOCATION: &str = "Luogo";
    pub const RESULT: &str = "Risultato";
    pub const GOALS_FOR: &str = "Goal Fatti";
    pub const GOALS_AGAINST: &str = "Goal Subiti";
    pub const HOME: &str = "Casa";

    pub const TITLE: &str = "Titolo";
    pub const NOTES: &str = "Note";

    pub const SCORER: &str = "Giocatore";
    pub const ASSIST: &str = "Assist";
    pub const MATCH: &str = "Partita";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub shirt_number: String,
    pub position: String,
    pub motm: u32,
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
    pub jersey_training: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRecord {
    pub id: String,
    pub opponent: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub result: String,
    pub goals_for: Option<u32>,
    pub goals_against: Option<u32>,
    pub home: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingRecord {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoringRecord {
    pub scorer: Option<String>,
    pub assist: Option<String>,
    pub match_id: Option<String>,
    /// How many goals (and assists) this row stands for. Never zero.
    pub multiplicity: u32,
}

impl PlayerRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let f = &raw.fields;
        // Older bases keep the shirt in "Numero" instead of "n. maglia".
        let shirt_number = pick_text(f, &[fields::SHIRT_NUMBER, fields::NUMBER]);
        Self {
            id: raw.id.clone(),
            first_name: text(f, fields::FIRST_NAME),
            last_name: text(f, fields::LAST_NAME),
            shirt_number,
            position: text(f, fields::POSITION),
            motm: count(f, fields::MOTM).unwrap_or(0),
            gender: text(f, fields::GENDER),
            birth_date: text(f, fields::BIRTH_DATE),
            birth_place: text(f, fields::BIRTH_PLACE),
            address: text(f, fields::ADDRESS),
            street_number: text(f, fields::STREET_NUMBER),
            city: text(f, fields::CITY),
            province: text(f, fields::PROVINCE),
            postal_code: text(f, fields::POSTAL_CODE),
            phone_prefix: text(f, fields::PHONE_PREFIX),
            phone: text(f, fields::PHONE),
            fiscal_code: text(f, fields::FISCAL_CODE),
            id_card: text(f, fields::ID_CARD),
            kit: text(f, fields::KIT),
            bag: text(f, fields::BAG),
            jacket: text(f, fields::JACKET),
            size: text(f, fields::SIZE),
            jersey_training: text(f, fields::JERSEY_TRAINING),
            photo_url: attachment_url(f.get(fields::PHOTO)),
        }
    }
}

impl MatchRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let f = &raw.fields;
        Self {
            id: raw.id.clone(),
            opponent: text(f, fields::OPPONENT),
            date: text(f, fields::DATE),
            time: text(f, fields::TIME),
            location: text(f, fields::LOCATION),
            result: text(f, fields::RESULT),
            goals_for: count(f, fields::GOALS_FOR),
            goals_against: count(f, fields::GOALS_AGAINST),
            home: flag(f.get(fields::HOME)),
        }
    }
}

impl TrainingRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let f = &raw.fields;
        Self {
            id: raw.id.clone(),
            title: text(f, fields::TITLE),
            date: text(f, fields::DATE),
            time: text(f, fields::TIME),
            location: text(f, fields::LOCATION),
            notes: text(f, fields::NOTES),
        }
    }
}

impl ScoringRecord {
    pub fn from_raw(raw: &RawRecord) -> Self {
        let f = &raw.fields;
        let multiplicity = count(f, fields::NUMBER).filter(|n| *n > 0).unwrap_or(1);
        Self {
            scorer: first_link(f.get(fields::SCORER)),
            assist: first_link(f.get(fields::ASSIST)),
            match_id: first_link(f.get(fields::MATCH)),
            multiplicity,
        }
    }
}

/// Parse a shirt number the way the roster shows it: leading digits only.
pub fn parse_shirt_number(raw: &str) -> u32 {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().unwrap_or(0)
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    fields.get(key).and_then(as_text).unwrap_or_default()
}

fn pick_text(fields: &Map<String, Value>, keys: &[&str]) -> String {
    for key in keys {
        if let Some(value) = fields.get(*key).and_then(as_text) {
            return value;
        }
    }
    String::new()
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        // Stored text passes through as-is; only the empty string counts as absent.
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // Lookup fields come back as single-element arrays.
        Value::Array(items) => items.first().and_then(as_text),
        Value::Null | Value::Object(_) => None,
    }
}

fn count(fields: &Map<String, Value>, key: &str) -> Option<u32> {
    match fields.get(key)? {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                return Some(v.min(u32::MAX as u64) as u32);
            }
            // Negative or fractional counts clamp at zero/truncate.
            n.as_f64().map(|v| v.max(0.0) as u32)
        }
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "casa" | "home" | "true" | "si" | "sì" => Some(true),
            "trasferta" | "away" | "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn first_link(value: Option<&Value>) -> Option<String> {
    let link = match value? {
        Value::Array(items) => items.first()?.as_str()?,
        Value::String(s) => s.as_str(),
        _ => return None,
    };
    let trimmed = link.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn attachment_url(value: Option<&Value>) -> String {
    value
        .and_then(|v| v.as_array())
        .and_then(|items| items.first())
        .and_then(|item| item.get("url"))
        .and_then(|url| url.as_str())
        .map(|url| url.to_string())
        .unwrap_or_default()
}
