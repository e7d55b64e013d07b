use std::cmp::Reverse;

use chrono::NaiveDate;

use super::library::Library;
use super::schedule::{EpisodeRow, episode_rows};

const RECENT_WATCHED_CONTEXT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewMode {
    All,
    Unwatched,
}

impl ViewMode {
    pub(crate) fn from_show_all(show_all: bool) -> Self {
        if show_all { Self::All } else { Self::Unwatched }
    }

    pub(crate) fn toggle(self) -> Self {
        match self {
            Self::All => Self::Unwatched,
            Self::Unwatched => Self::All,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Unwatched => "UNWATCHED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ViewRow {
    Episode(EpisodeRow),
    /// Divider dated at the end of `today`.
    Today(NaiveDate),
}

impl ViewRow {
    pub(crate) fn date(&self) -> NaiveDate {
        match self {
            Self::Episode(row) => row.available,
            Self::Today(date) => *date,
        }
    }

    // The marker stands for the end of its day, so it sorts above episodes
    // released that same day.
    fn sort_key(&self) -> (NaiveDate, bool) {
        (self.date(), matches!(self, Self::Today(_)))
    }
}

pub(crate) fn build_view(library: &Library, mode: ViewMode, today: NaiveDate) -> Vec<ViewRow> {
    let mut shown = Vec::new();
    for (key, show) in library.iter() {
        let rows = episode_rows(key, show, today);
        match mode {
            ViewMode::All => shown.extend(rows.into_iter().map(ViewRow::Episode)),
            ViewMode::Unwatched => shown.extend(focus_unwatched(rows).map(ViewRow::Episode)),
        }
    }
    shown.push(ViewRow::Today(today));
    shown.sort_by_key(|row| Reverse(row.sort_key()));
    shown
}

/// Every unwatched row, plus the two most recent rows when they are watched.
/// Expects `rows` sorted most recent first.
fn focus_unwatched(rows: Vec<EpisodeRow>) -> impl Iterator<Item = EpisodeRow> {
    rows.into_iter()
        .enumerate()
        .filter(|(position, row)| !row.watched || *position < RECENT_WATCHED_CONTEXT)
        .map(|(_, row)| row)
}
