use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::app::IntervalDays;
use crate::paths::database_file_path;

pub const DB_PATH_VAR: &str = "AIRLOG_DB";
pub const DEFAULT_INTERVAL_VAR: &str = "AIRLOG_DEFAULT_INTERVAL";
pub const SHOW_ALL_VAR: &str = "AIRLOG_SHOW_ALL";

const DEFAULT_INTERVAL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub default_interval: IntervalDays,
    pub show_all: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_path = match lookup(DB_PATH_VAR).filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => PathBuf::from(raw.trim()),
            None => database_file_path()?,
        };
        let default_interval_days = parse_or_default(
            DEFAULT_INTERVAL_VAR,
            lookup(DEFAULT_INTERVAL_VAR),
            DEFAULT_INTERVAL_DAYS,
        )?;
        let default_interval = IntervalDays::new(default_interval_days).with_context(|| {
            format!("invalid {DEFAULT_INTERVAL_VAR} value '{default_interval_days}'")
        })?;
        let show_all = match lookup(SHOW_ALL_VAR) {
            Some(raw) => parse_flag(SHOW_ALL_VAR, &raw)?,
            None => false,
        };

        Ok(Self {
            database_path,
            default_interval,
            show_all,
        })
    }
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = raw else {
        debug!("{key} not set, using default: {default}");
        return Ok(default);
    };
    raw.trim()
        .parse::<T>()
        .map_err(|err| anyhow!("invalid {key} value '{raw}': {err}"))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("invalid {key} value '{other}': expected true/false")),
    }
}
