use crossterm::event::KeyCode;

use super::super::display::truncate;
use super::super::library::ShowUpdate;
use super::{Dialog, EDIT_FIELD_LABELS, EditForm, TuiState, status_error, status_info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyOutcome {
    Continue,
    Quit,
}

pub(crate) fn handle_key(state: &mut TuiState, code: KeyCode) -> KeyOutcome {
    match state.dialog.take() {
        Some(Dialog::Edit(form)) => {
            handle_edit_key(state, form, code);
            KeyOutcome::Continue
        }
        Some(Dialog::ConfirmDelete { key, name }) => {
            handle_delete_key(state, key, name, code);
            KeyOutcome::Continue
        }
        None => handle_table_key(state, code),
    }
}

fn handle_table_key(state: &mut TuiState, code: KeyCode) -> KeyOutcome {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
        KeyCode::Up => {
            if let Some(selected) = state.table_state.selected() {
                state.table_state.select(Some(selected.saturating_sub(1)));
            }
        }
        KeyCode::Down => {
            if let Some(selected) = state.table_state.selected()
                && !state.rows.is_empty()
            {
                let next = (selected + 1).min(state.rows.len().saturating_sub(1));
                state.table_state.select(Some(next));
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => toggle_selected(state),
        KeyCode::Char('v') => {
            state.mode = state.mode.toggle();
            let prefer = state
                .selected_episode()
                .map(|row| (row.show_key.clone(), row.index));
            state.refresh_rows(prefer);
            state.status = status_info(&format!("View: {}", state.mode.label()));
        }
        KeyCode::Char('a') => {
            let key = state.library.add_show(state.today, state.default_interval);
            state.refresh_rows(Some((key.clone(), 0)));
            if let Some(show) = state.library.get(&key) {
                state.dialog = Some(Dialog::Edit(EditForm::for_show(&key, show)));
            }
            state.status = status_info("Added show. Fill in its details.");
        }
        KeyCode::Char('e') => match state.selected_episode() {
            Some(row) => {
                let key = row.show_key.clone();
                if let Some(show) = state.library.get(&key) {
                    state.dialog = Some(Dialog::Edit(EditForm::for_show(&key, show)));
                    state.status = status_info("Tab/↑/↓ field  Enter save  Esc cancel");
                }
            }
            None => state.status = status_error("Edit failed: no episode row selected."),
        },
        KeyCode::Char('d') => match state.selected_episode() {
            Some(row) => {
                let key = row.show_key.clone();
                let name = state
                    .library
                    .get(&key)
                    .map(|show| show.name.clone())
                    .unwrap_or_default();
                state.dialog = Some(Dialog::ConfirmDelete { key, name });
                state.status = status_info("Confirm delete: y/Enter to delete, n/Esc to cancel.");
            }
            None => state.status = status_error("Delete failed: no episode row selected."),
        },
        _ => {}
    }
    KeyOutcome::Continue
}

fn toggle_selected(state: &mut TuiState) {
    let Some(row) = state.selected_episode() else {
        state.status = status_error("Select an episode row to toggle.");
        return;
    };
    let key = row.show_key.clone();
    let index = row.index;
    let watched = !row.watched;

    match state.library.mark_watched(&key, index, watched) {
        Ok(_) => {
            let label = state
                .library
                .get(&key)
                .map(|show| {
                    format!(
                        "{} episode {}",
                        truncate(&show.name, 40),
                        show.episode_number(index)
                    )
                })
                .unwrap_or_default();
            let verb = if watched { "watched" } else { "not watched" };
            state.status = status_info(&format!("{label} marked {verb}."));
            state.refresh_rows(Some((key, index)));
        }
        Err(err) => state.status = status_error(&format!("Toggle failed: {err}")),
    }
}

fn handle_edit_key(state: &mut TuiState, mut form: EditForm, code: KeyCode) {
    let field_count = EDIT_FIELD_LABELS.len();
    match code {
        KeyCode::Esc => {
            state.status = status_info("Edit canceled.");
            return;
        }
        KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % field_count,
        KeyCode::BackTab | KeyCode::Up => form.focus = (form.focus + field_count - 1) % field_count,
        KeyCode::Backspace => {
            form.fields[form.focus].pop();
        }
        KeyCode::Char(ch) => form.fields[form.focus].push(ch),
        KeyCode::Enter => {
            let update = ShowUpdate::parse(
                Some(form.fields[0].as_str()),
                Some(form.fields[1].as_str()),
                Some(form.fields[2].as_str()),
                Some(form.fields[3].as_str()),
            )
            .and_then(|update| state.library.update_show(&form.key, &update));
            match update {
                Ok(()) => {
                    state.status = status_info("Saved.");
                    state.refresh_rows(None);
                    return;
                }
                Err(err) => state.status = status_error(&format!("Not saved: {err}")),
            }
        }
        _ => {}
    }
    state.dialog = Some(Dialog::Edit(form));
}

fn handle_delete_key(state: &mut TuiState, key: String, name: String, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Enter => match state.library.delete_show(&key) {
            Ok(_) => {
                state.status = status_info(&format!("Deleted show: {name}"));
                state.refresh_rows(None);
            }
            Err(err) => {
                state.status = status_error(&format!("Delete failed: {err}"));
                state.refresh_rows(None);
            }
        },
        KeyCode::Esc | KeyCode::Char('n') => state.status = status_info("Delete canceled."),
        _ => state.dialog = Some(Dialog::ConfirmDelete { key, name }),
    }
}
