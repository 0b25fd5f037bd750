use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;

use crate::api::{DEFAULT_SORT_BY, FacadeClient, Fetched};
use crate::error::{FetchError, normalize_error, normalize_panic};

use super::cascade::{Completion, FetchOutcome, FetchRequest};

/// Runs one fetch to completion. Errors and panics both come back as a
/// normalized [`FetchError`]; nothing escapes the call.
fn run_guarded<T>(fetch: impl FnOnce() -> anyhow::Result<Fetched<T>>) -> Result<Fetched<T>, FetchError> {
    match catch_unwind(AssertUnwindSafe(fetch)) {
        Ok(Ok(fetched)) => Ok(fetched),
        Ok(Err(err)) => Err(normalize_error(&err)),
        Err(payload) => Err(normalize_panic(payload.as_ref())),
    }
}

pub(crate) fn execute(client: &FacadeClient, request: FetchRequest) -> FetchOutcome {
    match request {
        FetchRequest::Genres { token, language } => FetchOutcome::Genres(Completion {
            token,
            result: run_guarded(|| client.genres(&language)),
        }),
        FetchRequest::Titles { token, genre_id } => FetchOutcome::Titles(Completion {
            token,
            result: run_guarded(|| client.titles_by_genre(genre_id, DEFAULT_SORT_BY, 1)),
        }),
        FetchRequest::Availability {
            token,
            title_id,
            country,
        } => FetchOutcome::Availability(Completion {
            token,
            result: run_guarded(|| client.availability(title_id, &country)),
        }),
        FetchRequest::Providers {
            token,
            title_id,
            country,
        } => FetchOutcome::Providers(Completion {
            token,
            result: run_guarded(|| client.watch_providers(title_id, &country)),
        }),
        FetchRequest::Episodes { token, title_name } => FetchOutcome::Episodes(Completion {
            token,
            result: run_guarded(|| client.episodes_for_title(&title_name)),
        }),
        FetchRequest::Plan { token, request } => FetchOutcome::Plan(Completion {
            token,
            result: run_guarded(|| client.generate_plan(&request)),
        }),
    }
}

/// Fire-and-forget: the outcome is sent back to the UI loop, which decides
/// whether it is still wanted.
pub(crate) fn spawn_fetch(
    client: &FacadeClient,
    request: FetchRequest,
    tx: &mpsc::Sender<FetchOutcome>,
) {
    let client = client.clone();
    let tx = tx.clone();
    std::thread::spawn(move || {
        let stage = request.stage();
        tracing::debug!(stage = stage.label(), "fetch started");
        let outcome = execute(&client, request);
        if tx.send(outcome).is_err() {
            tracing::debug!(stage = stage.label(), "receiver gone, dropping outcome");
        }
    });
}
