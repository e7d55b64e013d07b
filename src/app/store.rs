use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::db::Database;

use super::codec::{decode_watched, encode_watched};
use super::library::{IntervalDays, Library, Show, validate_first};

pub(crate) const STORAGE_KEY: &str = "airlog.shows";
const START_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredShow {
    name: String,
    start: String,
    first: i64,
    interval_days: i64,
    watched: String,
}

impl From<&Show> for StoredShow {
    fn from(show: &Show) -> Self {
        Self {
            name: show.name.clone(),
            start: show.start.format(START_DATE_FORMAT).to_string(),
            first: show.first,
            interval_days: i64::from(show.interval.get()),
            watched: encode_watched(&show.watched),
        }
    }
}

impl TryFrom<StoredShow> for Show {
    type Error = anyhow::Error;

    fn try_from(stored: StoredShow) -> Result<Self> {
        if stored.start.len() != 8 || !stored.start.bytes().all(|b| b.is_ascii_digit()) {
            return Err(anyhow!("start '{}' is not an 8-digit date", stored.start));
        }
        let start = NaiveDate::parse_from_str(&stored.start, START_DATE_FORMAT)
            .with_context(|| format!("start '{}' is not a calendar date", stored.start))?;
        let first = validate_first(stored.first)?;
        let interval = IntervalDays::new(stored.interval_days)?;
        let watched = decode_watched(&stored.watched)?;
        Ok(Self {
            name: stored.name,
            start,
            first,
            interval,
            watched,
        })
    }
}

pub(crate) fn serialize_library(library: &Library) -> Result<String> {
    let stored: BTreeMap<&str, StoredShow> = library
        .iter()
        .map(|(key, show)| (key, StoredShow::from(show)))
        .collect();
    serde_json::to_string(&stored).context("failed to serialize show collection")
}

/// Parses a stored blob. Never fails: a blob that is not a JSON object
/// yields an empty library, and records that fail validation are dropped.
pub(crate) fn deserialize_library(raw: &str) -> Library {
    let parsed: Map<String, Value> = match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            let kind = value_kind(&other);
            warn!(kind, "stored shows are not a JSON object; starting empty");
            return Library::default();
        }
        Err(err) => {
            warn!(error = %err, "stored shows are not valid JSON; starting empty");
            return Library::default();
        }
    };

    let mut shows = BTreeMap::new();
    for (key, value) in parsed {
        let record = serde_json::from_value::<StoredShow>(value)
            .map_err(anyhow::Error::from)
            .and_then(Show::try_from);
        match record {
            Ok(show) => {
                shows.insert(key, show);
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(key = %key, reason = %reason, "dropping invalid show record");
            }
        }
    }
    Library::from_shows(shows)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Loads the collection once at startup.
pub(crate) fn load_library(db: &Database) -> Result<Library> {
    match db.get_item(STORAGE_KEY)? {
        Some(raw) => {
            let library = deserialize_library(&raw);
            debug!(shows = library.len(), "loaded show collection");
            Ok(library)
        }
        None => Ok(Library::default()),
    }
}

/// Writes the whole collection after a state change. An empty collection
/// is only written when a snapshot already exists, so a fresh install
/// leaves storage untouched. Returns whether a write happened.
pub(crate) fn persist_library(db: &Database, library: &Library) -> Result<bool> {
    if library.is_empty() && db.get_item(STORAGE_KEY)?.is_none() {
        return Ok(false);
    }
    let blob = serialize_library(library)?;
    db.set_item(STORAGE_KEY, &blob)
        .context("failed to write show collection")?;
    debug!(shows = library.len(), bytes = blob.len(), "persisted show collection");
    Ok(true)
}
