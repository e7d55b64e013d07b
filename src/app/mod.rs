mod codec;
mod display;
mod library;
mod schedule;
mod store;
mod tui;
mod view;

#[cfg(test)]
mod tests;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};

use crate::cli::{Cli, Command, ShowFields};
use crate::config::AppConfig;
use crate::db::Database;

use self::display::{format_date, truncate};
use self::library::{Library, ShowUpdate};
use self::store::{load_library, persist_library};
use self::view::{ViewMode, ViewRow, build_view};

pub(crate) use self::library::IntervalDays;

pub fn run(cli: Cli, config: &AppConfig) -> Result<()> {
    let db = open_db(config)?;
    let mut library = load_library(&db)?;
    let today = today();

    match cli.command {
        Some(Command::List { all }) => {
            let mode = ViewMode::from_show_all(all || config.show_all);
            print!("{}", render_list(&library, mode, today));
        }
        Some(Command::Shows) => print!("{}", render_shows(&library)),
        Some(Command::Add(fields)) => {
            let key = run_add(&mut library, &fields, today, config)?;
            persist_library(&db, &library)?;
            println!("Added show {key}.");
        }
        Some(Command::Edit { key, fields }) => {
            let key = run_edit(&mut library, &key, &fields)?;
            persist_library(&db, &library)?;
            println!("Updated show {key}.");
        }
        Some(Command::Watch { key, episode }) => {
            let message = run_mark(&mut library, &key, episode, true)?;
            persist_library(&db, &library)?;
            println!("{message}");
        }
        Some(Command::Unwatch { key, episode }) => {
            let message = run_mark(&mut library, &key, episode, false)?;
            persist_library(&db, &library)?;
            println!("{message}");
        }
        Some(Command::Delete { key, yes }) => {
            let key = library.resolve_key(&key)?;
            let name = library
                .get(&key)
                .map(|show| show.name.clone())
                .unwrap_or_default();
            if !yes && !confirm(&format!("Delete '{name}' and its watch history? [y/N] "))? {
                println!("Delete canceled.");
                return Ok(());
            }
            library.delete_show(&key)?;
            persist_library(&db, &library)?;
            println!("Deleted show: {name}");
        }
        Some(Command::Tui) | None => {
            tui::run_tui(&db, library, ViewMode::from_show_all(config.show_all), config)?
        }
    }

    Ok(())
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn open_db(config: &AppConfig) -> Result<Database> {
    let db = Database::open(&config.database_path)?;
    db.migrate()?;
    Ok(db)
}

fn fields_update(fields: &ShowFields) -> Result<ShowUpdate> {
    Ok(ShowUpdate::parse(
        fields.name.as_deref(),
        fields.start.as_deref(),
        fields.first.as_deref(),
        fields.interval.as_deref(),
    )?)
}

fn run_add(
    library: &mut Library,
    fields: &ShowFields,
    today: NaiveDate,
    config: &AppConfig,
) -> Result<String> {
    // Validate before inserting so a bad flag leaves the collection alone.
    let update = fields_update(fields)?;
    let key = library.add_show(today, config.default_interval);
    if !update.is_empty() {
        library.update_show(&key, &update)?;
    }
    Ok(key)
}

fn run_edit(library: &mut Library, key: &str, fields: &ShowFields) -> Result<String> {
    let key = library.resolve_key(key)?;
    let update = fields_update(fields)?;
    if update.is_empty() {
        return Err(anyhow!(
            "nothing to change: pass --name, --start, --first or --interval"
        ));
    }
    library.update_show(&key, &update)?;
    Ok(key)
}

fn run_mark(library: &mut Library, key: &str, episode: i64, watched: bool) -> Result<String> {
    let key = library.resolve_key(key)?;
    let show = library
        .get(&key)
        .ok_or_else(|| anyhow!("show {key} disappeared"))?;
    let name = show.name.clone();
    let index = show.episode_index(episode)?;
    let changed = library.mark_watched(&key, index, watched)?;
    let state = if watched { "watched" } else { "not watched" };
    Ok(if changed {
        format!("{name} episode {episode} marked {state}.")
    } else {
        format!("{name} episode {episode} was already {state}.")
    })
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush().context("failed to flush prompt")?;
    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn render_list(library: &Library, mode: ViewMode, today: NaiveDate) -> String {
    if library.is_empty() {
        return "No tracked shows yet. Run `airlog add --name <NAME>` first.\n".to_string();
    }

    let mut out = format!(
        "{:<14} {:<36} {:>6} {:<12} {:<8}\n",
        "KEY", "TITLE", "EP", "AVAILABLE", "WATCHED"
    );
    for row in build_view(library, mode, today) {
        match row {
            ViewRow::Today(date) => {
                out.push_str(&format!("---- today {} ----\n", format_date(date)));
            }
            ViewRow::Episode(episode) => {
                let Some(show) = library.get(&episode.show_key) else {
                    continue;
                };
                out.push_str(&format!(
                    "{:<14} {:<36} {:>6} {:<12} {:<8}\n",
                    episode.show_key,
                    truncate(&show.name, 36),
                    show.episode_number(episode.index),
                    format_date(episode.available),
                    if episode.watched { "yes" } else { "-" },
                ));
            }
        }
    }
    out
}

fn render_shows(library: &Library) -> String {
    if library.is_empty() {
        return "No tracked shows yet.\n".to_string();
    }
    let mut out = format!(
        "{:<14} {:<36} {:<12} {:>6} {:>9} {:>8}\n",
        "KEY", "TITLE", "START", "FIRST", "INTERVAL", "WATCHED"
    );
    for (key, show) in library.iter() {
        out.push_str(&format!(
            "{:<14} {:<36} {:<12} {:>6} {:>8}d {:>8}\n",
            key,
            truncate(&show.name, 36),
            format_date(show.start),
            show.first,
            show.interval.get(),
            show.watched.len(),
        ));
    }
    out
}
