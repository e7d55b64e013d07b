use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::warn;

use super::library::Show;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EpisodeRow {
    pub(crate) show_key: String,
    pub(crate) index: u32,
    pub(crate) available: NaiveDate,
    pub(crate) watched: bool,
}

/// Date on which episode `index` becomes available: `start + index * interval`.
pub(crate) fn available_date(index: u32, show: &Show) -> Option<NaiveDate> {
    let offset = u64::from(index) * u64::from(show.interval.get());
    show.start.checked_add_days(Days::new(offset))
}

/// Rows for one show, most recent first.
///
/// Indices are enumerated from 0 while their date is on or before
/// `today + interval`. Index 0 is always kept, so a show whose start lies
/// beyond that bound still has one row. Watched indices are merged in
/// regardless of their date.
pub(crate) fn episode_rows(show_key: &str, show: &Show, today: NaiveDate) -> Vec<EpisodeRow> {
    let boundary = today.checked_add_days(Days::new(u64::from(show.interval.get())));
    let mut rows: BTreeMap<u32, EpisodeRow> = BTreeMap::new();

    for &index in &show.watched {
        match available_date(index, show) {
            Some(available) => {
                rows.insert(
                    index,
                    EpisodeRow {
                        show_key: show_key.to_string(),
                        index,
                        available,
                        watched: true,
                    },
                );
            }
            None => warn!(show_key, index, "watched episode date out of range; skipping"),
        }
    }

    for index in 0u32.. {
        let Some(available) = available_date(index, show) else {
            break;
        };
        let past_boundary = boundary.is_none_or(|boundary| available > boundary);
        if index != 0 && past_boundary {
            break;
        }
        rows.entry(index).or_insert_with(|| EpisodeRow {
            show_key: show_key.to_string(),
            index,
            available,
            watched: false,
        });
    }

    // Dates grow strictly with the index, so reversing the index order sorts
    // by date descending.
    rows.into_values().rev().collect()
}
