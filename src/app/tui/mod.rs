mod actions;
mod render;
mod session;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::db::Database;

use super::library::{IntervalDays, Library, Show};
use super::schedule::EpisodeRow;
use super::store::persist_library;
use super::view::{ViewMode, ViewRow, build_view};
use super::today;

pub(crate) use self::actions::{KeyOutcome, handle_key};
use self::render::draw_tui;
use self::session::TerminalGuard;

pub(crate) const EDIT_FIELD_LABELS: [&str; 4] = [
    "Name",
    "Start (YYYY-MM-DD)",
    "First episode",
    "Interval (days)",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EditForm {
    pub(crate) key: String,
    pub(crate) fields: [String; 4],
    pub(crate) focus: usize,
}

impl EditForm {
    pub(crate) fn for_show(key: &str, show: &Show) -> Self {
        Self {
            key: key.to_string(),
            fields: [
                show.name.clone(),
                show.start.format("%Y-%m-%d").to_string(),
                show.first.to_string(),
                show.interval.get().to_string(),
            ],
            focus: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dialog {
    Edit(EditForm),
    ConfirmDelete { key: String, name: String },
}

pub(crate) struct TuiState {
    pub(crate) library: Library,
    pub(crate) mode: ViewMode,
    pub(crate) today: NaiveDate,
    pub(crate) default_interval: IntervalDays,
    pub(crate) rows: Vec<ViewRow>,
    pub(crate) table_state: TableState,
    pub(crate) dialog: Option<Dialog>,
    pub(crate) status: String,
}

impl TuiState {
    pub(crate) fn new(
        library: Library,
        mode: ViewMode,
        today: NaiveDate,
        default_interval: IntervalDays,
    ) -> Self {
        let status = if library.is_empty() {
            status_info("No tracked shows yet. Press `a` to add one.")
        } else {
            status_info("Ready.")
        };
        let mut state = Self {
            library,
            mode,
            today,
            default_interval,
            rows: Vec::new(),
            table_state: TableState::default(),
            dialog: None,
            status,
        };
        state.refresh_rows(None);
        state
    }

    /// Recomputes the visible rows, keeping the selection on `prefer` when
    /// that episode is still listed.
    pub(crate) fn refresh_rows(&mut self, prefer: Option<(String, u32)>) {
        self.rows = build_view(&self.library, self.mode, self.today);
        if self.rows.is_empty() {
            self.table_state.select(None);
            return;
        }

        if let Some((key, index)) = prefer
            && let Some(idx) = self.rows.iter().position(|row| {
                matches!(row, ViewRow::Episode(ep) if ep.show_key == key && ep.index == index)
            })
        {
            self.table_state.select(Some(idx));
            return;
        }

        match self.table_state.selected() {
            Some(selected) => self
                .table_state
                .select(Some(selected.min(self.rows.len() - 1))),
            None => self.table_state.select(Some(0)),
        }
    }

    pub(crate) fn selected_episode(&self) -> Option<&EpisodeRow> {
        match self.rows.get(self.table_state.selected()?)? {
            ViewRow::Episode(row) => Some(row),
            ViewRow::Today(_) => None,
        }
    }
}

pub(crate) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(crate) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

pub(crate) fn run_tui(
    db: &Database,
    library: Library,
    mode: ViewMode,
    config: &AppConfig,
) -> Result<()> {
    let mut state = TuiState::new(library, mode, today(), config.default_interval);

    let mut guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;
    info!(shows = state.library.len(), "table view opened");

    loop {
        terminal.draw(|frame| draw_tui(frame, &mut state))?;

        if !event::poll(Duration::from_millis(250))? {
            let now = today();
            if now != state.today {
                state.today = now;
                state.refresh_rows(None);
            }
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if handle_key(&mut state, key.code) == KeyOutcome::Quit {
            break;
        }

        if let Err(err) = persist_library(db, &state.library) {
            warn!(error = %err, "failed to persist show collection");
            state.status = status_error(&format!("Save failed: {err}"));
        }
    }

    terminal.show_cursor()?;
    guard.leave()?;
    Ok(())
}
