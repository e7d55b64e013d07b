use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::NaiveDate;
use crossterm::event::KeyCode;

use crate::cli::ShowFields;
use crate::config::AppConfig;

use super::library::*;
use super::tui::{Dialog, KeyOutcome, TuiState, handle_key};
use super::view::{ViewMode, ViewRow};
use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

fn weekly() -> IntervalDays {
    IntervalDays::new(7).expect("valid interval")
}

fn test_config() -> AppConfig {
    AppConfig {
        database_path: PathBuf::from(":memory:"),
        default_interval: weekly(),
        show_all: false,
    }
}

fn library_with_show(start: NaiveDate) -> (Library, String) {
    let mut library = Library::default();
    let key = library.add_show(start, weekly());
    (library, key)
}

#[test]
fn add_show_uses_defaults_and_unique_keys() {
    let today = date(2024, 4, 1);
    let mut library = Library::default();
    let first = library.add_show(today, weekly());
    let second = library.add_show(today, weekly());
    assert_ne!(first, second);
    assert_eq!(first.len(), 12);

    let show = library.get(&second).expect("second show exists");
    assert_eq!(show.name, "Show 2");
    assert_eq!(show.start, today);
    assert_eq!(show.first, 1);
    assert_eq!(show.interval.get(), 7);
    assert!(show.watched.is_empty());
}

#[test]
fn interval_must_be_positive() {
    assert_eq!(
        IntervalDays::new(0),
        Err(EditError::InvalidInterval("0".to_string()))
    );
    assert!(IntervalDays::new(-3).is_err());
    assert!(IntervalDays::new(i64::from(MAX_INTERVAL_DAYS) + 1).is_err());
    assert!(parse_interval("seven").is_err());
    assert_eq!(parse_interval(" 14 ").map(IntervalDays::get), Ok(14));
}

#[test]
fn first_must_be_an_integer() {
    assert_eq!(parse_first("-2"), Ok(-2));
    assert_eq!(
        parse_first("1.5"),
        Err(EditError::InvalidFirst("1.5".to_string()))
    );
    assert!(parse_first("").is_err());
}

#[test]
fn date_input_accepts_common_layouts() {
    for raw in ["2024-04-05", "2024/04/05", "20240405"] {
        assert_eq!(parse_date_input(raw), Ok(date(2024, 4, 5)), "input {raw}");
    }
    assert!(parse_date_input("05.04.2024").is_err());
    assert!(parse_date_input("2024-02-30").is_err());
}

#[test]
fn rejected_update_leaves_show_untouched() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    let before = library.get(&key).cloned();
    let err = ShowUpdate::parse(Some("Renamed"), None, None, Some("0"))
        .expect_err("zero interval should be rejected");
    assert!(matches!(err, EditError::InvalidInterval(_)));
    assert_eq!(library.get(&key).cloned(), before);

    let update = ShowUpdate::parse(Some("  Renamed  "), Some("2024-02-01"), Some("13"), None)
        .expect("valid update");
    library.update_show(&key, &update).expect("update applies");
    let show = library.get(&key).expect("show exists");
    assert_eq!(show.name, "Renamed");
    assert_eq!(show.start, date(2024, 2, 1));
    assert_eq!(show.first, 13);
    assert_eq!(show.interval.get(), 7);
}

#[test]
fn mark_watched_reports_changes_and_copies_records() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    let snapshot = library.clone();

    assert_eq!(library.mark_watched(&key, 2, true), Ok(true));
    assert_eq!(library.mark_watched(&key, 2, true), Ok(false));
    assert!(snapshot.get(&key).expect("snapshot show").watched.is_empty());
    assert_eq!(
        library.get(&key).expect("show").watched,
        BTreeSet::from([2])
    );

    assert_eq!(library.mark_watched(&key, 2, false), Ok(true));
    assert!(library.get(&key).expect("show").watched.is_empty());
    assert!(matches!(
        library.mark_watched("missing", 0, true),
        Err(EditError::UnknownShow(_))
    ));
}

#[test]
fn episode_numbers_below_first_are_rejected() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    let update = ShowUpdate::parse(None, None, Some("5"), None).expect("valid update");
    library.update_show(&key, &update).expect("update applies");
    let show = library.get(&key).expect("show");
    assert_eq!(show.episode_index(5), Ok(0));
    assert_eq!(show.episode_index(7), Ok(2));
    assert_eq!(
        show.episode_index(4),
        Err(EditError::EpisodeOutOfRange {
            episode: 4,
            first: 5
        })
    );
}

#[test]
fn resolve_key_accepts_unique_prefixes() {
    let mut library = Library::default();
    let key = library.add_show(date(2024, 1, 1), weekly());
    assert_eq!(library.resolve_key(&key), Ok(key.clone()));
    assert_eq!(library.resolve_key(&key[..4]), Ok(key.clone()));
    assert!(matches!(
        library.resolve_key("#not-a-key"),
        Err(EditError::UnknownShow(_))
    ));
    assert!(library.resolve_key("").is_err());
}

#[test]
fn delete_show_removes_record() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    let removed = library.delete_show(&key).expect("delete succeeds");
    assert_eq!(removed.name, "Show 1");
    assert!(library.is_empty());
    assert!(library.delete_show(&key).is_err());
}

#[test]
fn run_add_applies_fields_or_rejects_before_inserting() {
    let mut library = Library::default();
    let fields = ShowFields {
        name: Some("Dungeon Meshi".to_string()),
        start: Some("2024-01-04".to_string()),
        first: None,
        interval: Some("7".to_string()),
    };
    let key = run_add(&mut library, &fields, date(2024, 3, 1), &test_config()).expect("add");
    let show = library.get(&key).expect("added show");
    assert_eq!(show.name, "Dungeon Meshi");
    assert_eq!(show.start, date(2024, 1, 4));

    let bad = ShowFields {
        interval: Some("0".to_string()),
        ..ShowFields::default()
    };
    assert!(run_add(&mut library, &bad, date(2024, 3, 1), &test_config()).is_err());
    assert_eq!(library.len(), 1);
}

#[test]
fn run_add_uses_configured_default_interval() {
    let mut library = Library::default();
    let config = AppConfig {
        default_interval: IntervalDays::new(14).expect("valid interval"),
        ..test_config()
    };
    let key = run_add(&mut library, &ShowFields::default(), date(2024, 3, 1), &config)
        .expect("add");
    assert_eq!(library.get(&key).expect("added show").interval.get(), 14);
}

#[test]
fn run_edit_requires_some_field() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    let err = run_edit(&mut library, &key, &ShowFields::default()).expect_err("empty edit");
    assert!(err.to_string().contains("nothing to change"));
}

#[test]
fn run_mark_uses_display_episode_numbers() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    let message = run_mark(&mut library, &key, 3, true).expect("mark");
    assert!(message.contains("episode 3 marked watched"), "{message}");
    assert_eq!(
        library.get(&key).expect("show").watched,
        BTreeSet::from([2])
    );
    let again = run_mark(&mut library, &key, 3, true).expect("mark again");
    assert!(again.contains("already watched"), "{again}");
    assert!(run_mark(&mut library, &key, 0, true).is_err());
}

#[test]
fn run_mark_rejects_extreme_episode_numbers() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    assert!(run_mark(&mut library, &key, i64::MIN, true).is_err());
    assert!(run_mark(&mut library, &key, i64::MAX, true).is_err());
    assert!(library.get(&key).expect("show").watched.is_empty());
}

#[test]
fn first_is_bounded_at_the_edit_boundary() {
    assert_eq!(validate_first(-99_999), Ok(-99_999));
    assert!(validate_first(i64::MAX).is_err());
    assert!(validate_first(i64::MIN).is_err());
    assert!(parse_first("9223372036854775807").is_err());
}

#[test]
fn render_list_includes_today_divider_and_numbers() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    library.mark_watched(&key, 0, true).expect("mark");
    let out = render_list(&library, ViewMode::All, date(2024, 1, 9));
    assert!(out.contains("---- today 2024/01/09 ----"), "{out}");
    assert!(out.contains("2024/01/15"), "{out}");
    let today_line = out
        .lines()
        .position(|line| line.starts_with("---- today"))
        .expect("divider line");
    let first_episode_line = out
        .lines()
        .position(|line| line.contains("2024/01/01"))
        .expect("episode 1 line");
    assert!(today_line < first_episode_line);
}

#[test]
fn render_list_on_empty_library_prints_hint() {
    let out = render_list(&Library::default(), ViewMode::Unwatched, date(2024, 1, 1));
    assert!(out.contains("No tracked shows yet"));
}

fn tui_state(library: Library, today: NaiveDate) -> TuiState {
    TuiState::new(library, ViewMode::All, today, weekly())
}

fn select_episode(state: &mut TuiState, key: &str, index: u32) {
    let position = state
        .rows
        .iter()
        .position(|row| matches!(row, ViewRow::Episode(ep) if ep.show_key == key && ep.index == index))
        .expect("row to select");
    state.table_state.select(Some(position));
}

#[test]
fn tui_space_toggles_selected_episode() {
    let (library, key) = library_with_show(date(2024, 1, 1));
    let mut state = tui_state(library, date(2024, 1, 9));
    select_episode(&mut state, &key, 1);

    assert_eq!(handle_key(&mut state, KeyCode::Char(' ')), KeyOutcome::Continue);
    assert!(state.library.get(&key).expect("show").watched.contains(&1));
    assert_eq!(
        state.selected_episode().map(|row| (row.index, row.watched)),
        Some((1, true))
    );

    handle_key(&mut state, KeyCode::Char(' '));
    assert!(state.library.get(&key).expect("show").watched.is_empty());
}

#[test]
fn tui_toggle_on_today_marker_reports_error() {
    let mut state = tui_state(Library::default(), date(2024, 1, 1));
    assert_eq!(state.rows, vec![ViewRow::Today(date(2024, 1, 1))]);
    handle_key(&mut state, KeyCode::Enter);
    assert!(state.status.starts_with("ERROR:"));
}

#[test]
fn tui_add_opens_editor_and_enter_validates() {
    let mut state = tui_state(Library::default(), date(2024, 1, 1));
    handle_key(&mut state, KeyCode::Char('a'));
    assert_eq!(state.library.len(), 1);
    let Some(Dialog::Edit(form)) = state.dialog.clone() else {
        panic!("edit dialog should be open");
    };
    assert_eq!(form.fields[3], "7");

    // Clear the interval field and type 0.
    for _ in 0..3 {
        handle_key(&mut state, KeyCode::Tab);
    }
    handle_key(&mut state, KeyCode::Backspace);
    handle_key(&mut state, KeyCode::Char('0'));
    handle_key(&mut state, KeyCode::Enter);
    assert!(state.status.starts_with("ERROR:"), "{}", state.status);
    assert!(matches!(state.dialog, Some(Dialog::Edit(_))));

    handle_key(&mut state, KeyCode::Backspace);
    handle_key(&mut state, KeyCode::Char('3'));
    handle_key(&mut state, KeyCode::Enter);
    assert!(state.dialog.is_none());
    let show = state.library.get(&form.key).expect("show");
    assert_eq!(show.interval.get(), 3);
}

#[test]
fn tui_delete_requires_confirmation() {
    let (library, key) = library_with_show(date(2024, 1, 1));
    let mut state = tui_state(library, date(2024, 1, 2));
    select_episode(&mut state, &key, 0);

    handle_key(&mut state, KeyCode::Char('d'));
    handle_key(&mut state, KeyCode::Char('x'));
    assert!(matches!(state.dialog, Some(Dialog::ConfirmDelete { .. })));
    handle_key(&mut state, KeyCode::Char('n'));
    assert!(state.dialog.is_none());
    assert_eq!(state.library.len(), 1);

    handle_key(&mut state, KeyCode::Char('d'));
    handle_key(&mut state, KeyCode::Char('y'));
    assert!(state.library.is_empty());
    assert_eq!(state.rows.len(), 1);
}

#[test]
fn tui_view_toggle_and_quit() {
    let (mut library, key) = library_with_show(date(2024, 1, 1));
    for index in 0..4 {
        library.mark_watched(&key, index, true).expect("mark");
    }
    let mut state = tui_state(library, date(2024, 1, 20));
    let all_rows = state.rows.len();
    handle_key(&mut state, KeyCode::Char('v'));
    assert_eq!(state.mode, ViewMode::Unwatched);
    assert!(state.rows.len() < all_rows);
    assert_eq!(handle_key(&mut state, KeyCode::Char('q')), KeyOutcome::Quit);
}
