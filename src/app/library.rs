use std::collections::{BTreeMap, BTreeSet};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

pub(crate) const MAX_INTERVAL_DAYS: u32 = 3650;
pub(crate) const MAX_EPISODE_INDEX: u32 = 99_999;
const KEY_BYTES: usize = 9;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum EditError {
    #[error("release interval must be between 1 and {MAX_INTERVAL_DAYS} days (got '{0}')")]
    InvalidInterval(String),
    #[error("first episode number must be an integer (got '{0}')")]
    InvalidFirst(String),
    #[error("show name must not be empty")]
    EmptyName,
    #[error("invalid date '{0}': expected YYYY-MM-DD, YYYY/MM/DD or YYYYMMDD")]
    InvalidDate(String),
    #[error("episode {episode} is out of range for a show starting at episode {first}")]
    EpisodeOutOfRange { episode: i64, first: i64 },
    #[error("no show matches key '{0}'")]
    UnknownShow(String),
    #[error("key prefix '{0}' matches more than one show")]
    AmbiguousKey(String),
}

/// A validated release interval, at least one day long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct IntervalDays(u32);

impl IntervalDays {
    pub(crate) fn new(days: i64) -> Result<Self, EditError> {
        if (1..=i64::from(MAX_INTERVAL_DAYS)).contains(&days) {
            Ok(Self(days as u32))
        } else {
            Err(EditError::InvalidInterval(days.to_string()))
        }
    }

    pub(crate) fn get(self) -> u32 {
        self.0
    }
}

/// One tracked show. Values are never mutated in place: every edit builds
/// a new record that replaces the old one in the [`Library`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Show {
    pub(crate) name: String,
    pub(crate) start: NaiveDate,
    pub(crate) first: i64,
    pub(crate) interval: IntervalDays,
    pub(crate) watched: BTreeSet<u32>,
}

impl Show {
    pub(crate) fn episode_number(&self, index: u32) -> i64 {
        self.first.saturating_add(i64::from(index))
    }

    pub(crate) fn episode_index(&self, episode: i64) -> Result<u32, EditError> {
        let index = episode.checked_sub(self.first);
        if let Some(index) = index
            && (0..=i64::from(MAX_EPISODE_INDEX)).contains(&index)
        {
            Ok(index as u32)
        } else {
            Err(EditError::EpisodeOutOfRange {
                episode,
                first: self.first,
            })
        }
    }

    fn with_watched(&self, index: u32, watched: bool) -> Self {
        let mut next = self.clone();
        if watched {
            next.watched.insert(index);
        } else {
            next.watched.remove(&index);
        }
        next
    }
}

/// Partial update for a show, already validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ShowUpdate {
    pub(crate) name: Option<String>,
    pub(crate) start: Option<NaiveDate>,
    pub(crate) first: Option<i64>,
    pub(crate) interval: Option<IntervalDays>,
}

impl ShowUpdate {
    /// Builds an update from raw text fields, as typed by the user.
    pub(crate) fn parse(
        name: Option<&str>,
        start: Option<&str>,
        first: Option<&str>,
        interval: Option<&str>,
    ) -> Result<Self, EditError> {
        let name = name.map(validate_name).transpose()?;
        let start = start.map(parse_date_input).transpose()?;
        let first = first.map(parse_first).transpose()?;
        let interval = interval.map(parse_interval).transpose()?;
        Ok(Self {
            name,
            start,
            first,
            interval,
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.name.is_none() && self.start.is_none() && self.first.is_none() && self.interval.is_none()
    }

    fn apply(&self, show: &Show) -> Show {
        Show {
            name: self.name.clone().unwrap_or_else(|| show.name.clone()),
            start: self.start.unwrap_or(show.start),
            first: self.first.unwrap_or(show.first),
            interval: self.interval.unwrap_or(show.interval),
            watched: show.watched.clone(),
        }
    }
}

pub(crate) fn validate_name(raw: &str) -> Result<String, EditError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EditError::EmptyName);
    }
    Ok(trimmed.to_string())
}

pub(crate) fn parse_first(raw: &str) -> Result<i64, EditError> {
    let first = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| EditError::InvalidFirst(raw.trim().to_string()))?;
    validate_first(first)
}

pub(crate) fn validate_first(first: i64) -> Result<i64, EditError> {
    if first.unsigned_abs() <= u64::from(MAX_EPISODE_INDEX) {
        Ok(first)
    } else {
        Err(EditError::InvalidFirst(first.to_string()))
    }
}

pub(crate) fn parse_interval(raw: &str) -> Result<IntervalDays, EditError> {
    let days = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| EditError::InvalidInterval(raw.trim().to_string()))?;
    IntervalDays::new(days)
}

pub(crate) fn parse_date_input(raw: &str) -> Result<NaiveDate, EditError> {
    let trimmed = raw.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| EditError::InvalidDate(trimmed.to_string()))
}

/// The whole collection, keyed by opaque show key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Library {
    shows: BTreeMap<String, Show>,
}

impl Library {
    pub(crate) fn from_shows(shows: BTreeMap<String, Show>) -> Self {
        Self { shows }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.shows.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.shows.len()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&Show> {
        self.shows.get(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &Show)> {
        self.shows.iter().map(|(key, show)| (key.as_str(), show))
    }

    pub(crate) fn add_show(&mut self, today: NaiveDate, interval: IntervalDays) -> String {
        let key = loop {
            let candidate = random_key();
            if !self.shows.contains_key(&candidate) {
                break candidate;
            }
        };
        let show = Show {
            name: format!("Show {}", self.shows.len() + 1),
            start: today,
            first: 1,
            interval,
            watched: BTreeSet::new(),
        };
        info!(key = %key, name = %show.name, "added show");
        self.shows.insert(key.clone(), show);
        key
    }

    pub(crate) fn update_show(&mut self, key: &str, update: &ShowUpdate) -> Result<(), EditError> {
        let current = self
            .shows
            .get(key)
            .ok_or_else(|| EditError::UnknownShow(key.to_string()))?;
        let next = update.apply(current);
        debug!(key, ?update, "updated show");
        self.shows.insert(key.to_string(), next);
        Ok(())
    }

    /// Returns whether the watched set actually changed.
    pub(crate) fn mark_watched(
        &mut self,
        key: &str,
        index: u32,
        watched: bool,
    ) -> Result<bool, EditError> {
        let current = self
            .shows
            .get(key)
            .ok_or_else(|| EditError::UnknownShow(key.to_string()))?;
        if index > MAX_EPISODE_INDEX {
            return Err(EditError::EpisodeOutOfRange {
                episode: current.episode_number(index),
                first: current.first,
            });
        }
        if current.watched.contains(&index) == watched {
            return Ok(false);
        }
        let next = current.with_watched(index, watched);
        debug!(key, index, watched, "toggled watched episode");
        self.shows.insert(key.to_string(), next);
        Ok(true)
    }

    pub(crate) fn delete_show(&mut self, key: &str) -> Result<Show, EditError> {
        let removed = self
            .shows
            .remove(key)
            .ok_or_else(|| EditError::UnknownShow(key.to_string()))?;
        info!(key, name = %removed.name, "deleted show");
        Ok(removed)
    }

    /// Resolves a full key or a unique key prefix.
    pub(crate) fn resolve_key(&self, prefix: &str) -> Result<String, EditError> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Err(EditError::UnknownShow(String::new()));
        }
        if self.shows.contains_key(prefix) {
            return Ok(prefix.to_string());
        }
        let mut matches = self.shows.keys().filter(|key| key.starts_with(prefix));
        match (matches.next(), matches.next()) {
            (Some(key), None) => Ok(key.clone()),
            (Some(_), Some(_)) => Err(EditError::AmbiguousKey(prefix.to_string())),
            (None, _) => Err(EditError::UnknownShow(prefix.to_string())),
        }
    }
}

fn random_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    fastrand::fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
