use std::sync::mpsc;

use crossterm::event::KeyCode;
use ratatui::widgets::TableState;

use super::super::cascade::{
    FetchOutcome, FetchRequest, GenreSelection, ServiceSelection, StageId, TitleSelection,
};
use super::super::episode::truncate;
use super::{DetailView, EditField, FieldEditor, Pane, TuiState};

#[derive(Debug, PartialEq)]
pub(super) enum KeyOutcome {
    Quit,
    Dispatch(Vec<FetchRequest>),
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

pub(super) fn genre_count(state: &TuiState) -> usize {
    state
        .cascade
        .genres()
        .success()
        .map_or(0, |envelope| envelope.data.genres.len())
}

pub(super) fn title_count(state: &TuiState) -> usize {
    state
        .cascade
        .titles()
        .success()
        .map_or(0, |envelope| envelope.data.results.len())
}

pub(super) fn service_count(state: &TuiState) -> usize {
    state
        .cascade
        .availability()
        .success()
        .map_or(0, |response| response.assessments.len())
}

fn sync_table(table: &mut TableState, len: usize) {
    if len == 0 {
        table.select(None);
        return;
    }
    match table.selected() {
        Some(selected) => table.select(Some(selected.min(len - 1))),
        None => table.select(Some(0)),
    }
}

/// Keeps each list's cursor inside whatever its stage currently holds.
pub(super) fn sync_tables(state: &mut TuiState) {
    let (genres, titles, services) = (genre_count(state), title_count(state), service_count(state));
    sync_table(&mut state.genre_table, genres);
    sync_table(&mut state.title_table, titles);
    sync_table(&mut state.service_table, services);
}

pub(super) fn drain_fetch_outcomes(rx: &mpsc::Receiver<FetchOutcome>, state: &mut TuiState) {
    while let Ok(outcome) = rx.try_recv() {
        apply_outcome(state, outcome);
    }
}

pub(super) fn apply_outcome(state: &mut TuiState, outcome: FetchOutcome) {
    let stage = outcome.stage();
    if !state.cascade.apply(outcome) {
        return;
    }
    let failure = match stage {
        StageId::Genres => state.cascade.genres().error(),
        StageId::Titles => state.cascade.titles().error(),
        StageId::Availability => state.cascade.availability().error(),
        StageId::Providers => state.cascade.providers().error(),
        StageId::Episodes => state.cascade.episodes().error(),
        StageId::Plan => state.cascade.plan().error(),
    };
    state.status = match failure {
        Some(err) => status_error(&format!("Loading {} failed. {}", stage.label(), err.summary())),
        None => status_info(&format!("Loaded {}.", stage.label())),
    };
}

fn move_selection(table: &mut TableState, len: usize, down: bool) {
    let Some(selected) = table.selected() else {
        return;
    };
    if down {
        table.select(Some((selected + 1).min(len.saturating_sub(1))));
    } else {
        table.select(Some(selected.saturating_sub(1)));
    }
}

fn activate_selection(state: &mut TuiState) -> Vec<FetchRequest> {
    match state.focus {
        Pane::Genres => {
            let Some(genre) = state
                .genre_table
                .selected()
                .and_then(|idx| state.cascade.genres().success()?.data.genres.get(idx).cloned())
            else {
                return Vec::new();
            };
            state.title_table.select(None);
            state.service_table.select(None);
            state.focus = Pane::Titles;
            state.status = status_info(&format!("Loading titles for {}...", genre.name));
            state.cascade.select_genre(GenreSelection {
                id: genre.id,
                name: genre.name,
            })
        }
        Pane::Titles => {
            let Some(title) = state
                .title_table
                .selected()
                .and_then(|idx| state.cascade.titles().success()?.data.results.get(idx).cloned())
            else {
                return Vec::new();
            };
            let name = title.display_name();
            state.service_table.select(None);
            state.focus = Pane::Services;
            state.status = status_info(&format!(
                "Loading availability for {}...",
                truncate(&name, 40)
            ));
            state.cascade.select_title(TitleSelection {
                tmdb_id: title.id,
                name,
            })
        }
        Pane::Services => {
            let Some(service) = state.service_table.selected().and_then(|idx| {
                state
                    .cascade
                    .availability()
                    .success()?
                    .assessments
                    .get(idx)
                    .map(ServiceSelection::from)
            }) else {
                return Vec::new();
            };
            state.detail = DetailView::Episodes;
            state.status = status_info(&format!("Loading episodes ({})...", service.service_id));
            state.cascade.select_service(service)
        }
    }
}

fn open_editor(state: &mut TuiState, field: EditField) {
    let current = match field {
        EditField::Country => state.cascade.country(),
        EditField::Horizon => state.cascade.horizon_days(),
        EditField::Permanent => state.cascade.permanent_service_ids(),
    };
    state.editor = Some(FieldEditor {
        field,
        buffer: current.to_string(),
    });
    state.status = status_info("Enter to apply, Esc to cancel.");
}

fn handle_editor_key(state: &mut TuiState, code: KeyCode) -> Vec<FetchRequest> {
    let Some(editor) = state.editor.as_mut() else {
        return Vec::new();
    };
    match code {
        KeyCode::Char(ch) => editor.buffer.push(ch),
        KeyCode::Backspace => {
            editor.buffer.pop();
        }
        KeyCode::Esc => {
            state.editor = None;
            state.status = status_info("Edit canceled.");
        }
        KeyCode::Enter => {
            let FieldEditor { field, buffer } = editor.clone();
            state.editor = None;
            state.status = status_info(&format!("{} set.", field.label()));
            return match field {
                EditField::Country => state.cascade.set_country(&buffer),
                EditField::Horizon => {
                    state.cascade.set_horizon_days(&buffer);
                    Vec::new()
                }
                EditField::Permanent => {
                    state.cascade.set_permanent_service_ids(&buffer);
                    Vec::new()
                }
            };
        }
        _ => {}
    }
    Vec::new()
}

pub(super) fn handle_key(state: &mut TuiState, code: KeyCode) -> KeyOutcome {
    if state.editor.is_some() {
        return KeyOutcome::Dispatch(handle_editor_key(state, code));
    }

    let requests = match code {
        KeyCode::Char('q') => return KeyOutcome::Quit,
        KeyCode::Tab => {
            state.focus = state.focus.cycle();
            Vec::new()
        }
        KeyCode::Left => {
            state.focus = state.focus.move_left();
            Vec::new()
        }
        KeyCode::Right => {
            state.focus = state.focus.move_right();
            Vec::new()
        }
        KeyCode::Up | KeyCode::Down => {
            let down = code == KeyCode::Down;
            match state.focus {
                Pane::Genres => {
                    let len = genre_count(state);
                    move_selection(&mut state.genre_table, len, down);
                }
                Pane::Titles => {
                    let len = title_count(state);
                    move_selection(&mut state.title_table, len, down);
                }
                Pane::Services => {
                    let len = service_count(state);
                    move_selection(&mut state.service_table, len, down);
                }
            }
            Vec::new()
        }
        KeyCode::Enter => activate_selection(state),
        KeyCode::Char('d') => {
            state.detail = state.detail.next();
            Vec::new()
        }
        KeyCode::Char('c') => {
            open_editor(state, EditField::Country);
            Vec::new()
        }
        KeyCode::Char('h') => {
            open_editor(state, EditField::Horizon);
            Vec::new()
        }
        KeyCode::Char('p') => {
            open_editor(state, EditField::Permanent);
            Vec::new()
        }
        KeyCode::Char('g') => match state.cascade.generate_plan() {
            Some(request) => {
                state.detail = DetailView::Plan;
                state.status = status_info("Generating plan...");
                vec![request]
            }
            None => {
                state.status = status_error("Load availability for a title before generating a plan.");
                Vec::new()
            }
        },
        KeyCode::Char('r') => match state.cascade.retry_genres() {
            Some(request) => {
                state.status = status_info("Retrying genres...");
                vec![request]
            }
            None => {
                state.status = status_info("Nothing to retry.");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };
    KeyOutcome::Dispatch(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Fetched;
    use crate::api::models::{
        AvailabilityResponse, DiscoverPage, DiscoverTitle, Envelope, Genre, GenreList,
    };
    use crate::app::cascade::Completion;
    use crate::config::Config;
    use crate::error::FetchError;
    use serde_json::{Value, json};

    fn state() -> TuiState {
        TuiState::new(&Config {
            api_base_url: "http://localhost:8000".to_string(),
            language: "en-US".to_string(),
            country: "US".to_string(),
            horizon_days: "30".to_string(),
            permanent_service_ids: "youtube_tv".to_string(),
        })
    }

    fn envelope<T>(data: T) -> Envelope<T> {
        Envelope {
            provider: "tmdb".to_string(),
            retrieved_at: "2026-10-18T12:00:00Z".to_string(),
            attribution: None,
            request: Value::Null,
            data,
        }
    }

    fn ok<T>(body: T) -> Result<Fetched<T>, FetchError> {
        Ok(Fetched {
            http_status: 200,
            body,
        })
    }

    fn dispatched(outcome: KeyOutcome) -> Vec<FetchRequest> {
        match outcome {
            KeyOutcome::Dispatch(requests) => requests,
            KeyOutcome::Quit => panic!("unexpected quit"),
        }
    }

    fn with_genres(state: &mut TuiState) {
        let request = state.cascade.start().expect("genres request");
        apply_outcome(
            state,
            FetchOutcome::Genres(Completion {
                token: request.token(),
                result: ok(envelope(GenreList {
                    genres: vec![
                        Genre {
                            id: 18,
                            name: "Drama".to_string(),
                        },
                        Genre {
                            id: 35,
                            name: "Comedy".to_string(),
                        },
                    ],
                })),
            }),
        );
        sync_tables(state);
    }

    #[test]
    fn enter_on_genre_requests_titles_and_moves_focus() {
        let mut state = state();
        with_genres(&mut state);
        handle_key(&mut state, KeyCode::Down);

        let requests = dispatched(handle_key(&mut state, KeyCode::Enter));

        assert!(matches!(requests[..], [FetchRequest::Titles { genre_id: 35, .. }]));
        assert_eq!(state.focus, Pane::Titles);
        assert_eq!(state.status, "INFO: Loading titles for Comedy...");
    }

    #[test]
    fn enter_on_title_requests_availability_and_providers() {
        let mut state = state();
        with_genres(&mut state);
        let titles = dispatched(handle_key(&mut state, KeyCode::Enter));
        apply_outcome(
            &mut state,
            FetchOutcome::Titles(Completion {
                token: titles[0].token(),
                result: ok(envelope(DiscoverPage {
                    page: Some(1),
                    results: vec![DiscoverTitle {
                        id: 100,
                        name: Some("Show X".to_string()),
                        original_name: None,
                        first_air_date: None,
                    }],
                })),
            }),
        );
        sync_tables(&mut state);

        let requests = dispatched(handle_key(&mut state, KeyCode::Enter));

        let stages: Vec<StageId> = requests.iter().map(FetchRequest::stage).collect();
        assert_eq!(stages, vec![StageId::Availability, StageId::Providers]);
        assert_eq!(state.focus, Pane::Services);
        assert_eq!(
            state.cascade.selected_title().map(|title| title.name.as_str()),
            Some("Show X")
        );
    }

    #[test]
    fn failed_stage_is_reported_in_status() {
        let mut state = state();
        let request = state.cascade.start().expect("genres request");
        apply_outcome(
            &mut state,
            FetchOutcome::Genres(Completion {
                token: request.token(),
                result: Err(FetchError::status(503, json!("down"))),
            }),
        );

        assert_eq!(
            state.status,
            "ERROR: Loading genres failed. Error: Request failed: 503 (HTTP 503)"
        );
        let retry = dispatched(handle_key(&mut state, KeyCode::Char('r')));
        assert_eq!(retry.len(), 1);
    }

    #[test]
    fn horizon_editor_updates_plan_inputs() {
        let mut state = state();
        handle_key(&mut state, KeyCode::Char('h'));
        handle_key(&mut state, KeyCode::Backspace);
        handle_key(&mut state, KeyCode::Backspace);
        handle_key(&mut state, KeyCode::Char('4'));
        handle_key(&mut state, KeyCode::Char('5'));
        // Keys go to the editor, not the key map.
        handle_key(&mut state, KeyCode::Char('q'));
        handle_key(&mut state, KeyCode::Backspace);
        let requests = dispatched(handle_key(&mut state, KeyCode::Enter));

        assert!(requests.is_empty());
        assert!(state.editor.is_none());
        assert_eq!(state.cascade.plan_inputs().horizon_days, "45");
    }

    #[test]
    fn canceled_edit_keeps_previous_value() {
        let mut state = state();
        handle_key(&mut state, KeyCode::Char('c'));
        handle_key(&mut state, KeyCode::Char('x'));
        handle_key(&mut state, KeyCode::Esc);
        assert_eq!(state.cascade.country(), "US");
    }

    #[test]
    fn plan_key_without_availability_reports_error() {
        let mut state = state();
        let requests = dispatched(handle_key(&mut state, KeyCode::Char('g')));
        assert!(requests.is_empty());
        assert!(state.status.starts_with("ERROR:"));
        assert!(state.cascade.plan().is_idle());
    }

    #[test]
    fn plan_key_with_availability_switches_detail() {
        let mut state = state();
        with_genres(&mut state);
        state.cascade.select_genre(GenreSelection {
            id: 18,
            name: "Drama".to_string(),
        });
        let requests = state.cascade.select_title(TitleSelection {
            tmdb_id: 100,
            name: "Show X".to_string(),
        });
        apply_outcome(
            &mut state,
            FetchOutcome::Availability(Completion {
                token: requests[0].token(),
                result: ok(AvailabilityResponse {
                    retrieved_at: "2026-10-18T12:00:00Z".to_string(),
                    assessments: Vec::new(),
                }),
            }),
        );

        let plan = dispatched(handle_key(&mut state, KeyCode::Char('g')));

        assert_eq!(plan.len(), 1);
        assert_eq!(state.detail, DetailView::Plan);
    }

    #[test]
    fn quit_key_stops_the_loop() {
        let mut state = state();
        assert_eq!(handle_key(&mut state, KeyCode::Char('q')), KeyOutcome::Quit);
    }
}
