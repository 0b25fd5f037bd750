mod actions;
mod render;
mod session;

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;

use crate::api::FacadeClient;
use crate::config::Config;

use super::cascade::{Cascade, FetchOutcome, FetchRequest};
use super::worker::spawn_fetch;

use self::actions::{KeyOutcome, drain_fetch_outcomes, handle_key, status_info, sync_tables};
use self::render::draw_tui;
use self::session::{TuiSession, install_panic_hook};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pane {
    Genres,
    Titles,
    Services,
}

impl Pane {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Genres => "Genres",
            Self::Titles => "Titles",
            Self::Services => "Services",
        }
    }

    pub(crate) fn move_left(self) -> Self {
        match self {
            Self::Genres => Self::Genres,
            Self::Titles => Self::Genres,
            Self::Services => Self::Titles,
        }
    }

    pub(crate) fn move_right(self) -> Self {
        match self {
            Self::Genres => Self::Titles,
            Self::Titles => Self::Services,
            Self::Services => Self::Services,
        }
    }

    pub(crate) fn cycle(self) -> Self {
        match self {
            Self::Genres => Self::Titles,
            Self::Titles => Self::Services,
            Self::Services => Self::Genres,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DetailView {
    Episodes,
    Providers,
    Plan,
}

impl DetailView {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Episodes => "EPISODES",
            Self::Providers => "PROVIDERS",
            Self::Plan => "PLAN",
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Episodes => Self::Providers,
            Self::Providers => Self::Plan,
            Self::Plan => Self::Episodes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditField {
    Country,
    Horizon,
    Permanent,
}

impl EditField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Country => "Country",
            Self::Horizon => "Horizon (days)",
            Self::Permanent => "Permanent services",
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct FieldEditor {
    pub(super) field: EditField,
    pub(super) buffer: String,
}

#[derive(Debug)]
pub(super) struct TuiState {
    pub(super) cascade: Cascade,
    pub(super) api_base_url: String,
    pub(super) focus: Pane,
    pub(super) genre_table: TableState,
    pub(super) title_table: TableState,
    pub(super) service_table: TableState,
    pub(super) detail: DetailView,
    pub(super) editor: Option<FieldEditor>,
    pub(super) status: String,
}

impl TuiState {
    pub(super) fn new(config: &Config) -> Self {
        Self {
            cascade: Cascade::new(config),
            api_base_url: config.api_base_url.clone(),
            focus: Pane::Genres,
            genre_table: TableState::default(),
            title_table: TableState::default(),
            service_table: TableState::default(),
            detail: DetailView::Episodes,
            editor: None,
            status: status_info("Loading genres..."),
        }
    }
}

fn dispatch(client: &FacadeClient, tx: &mpsc::Sender<FetchOutcome>, requests: Vec<FetchRequest>) {
    for request in requests {
        spawn_fetch(client, request, tx);
    }
}

pub(crate) fn run_tui(config: &Config, client: &FacadeClient) -> Result<()> {
    install_panic_hook();
    let mut session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let (fetch_tx, fetch_rx) = mpsc::channel::<FetchOutcome>();
    let mut state = TuiState::new(config);
    tracing::info!(api_base_url = %config.api_base_url, "tui started");

    dispatch(client, &fetch_tx, state.cascade.start().into_iter().collect());

    loop {
        drain_fetch_outcomes(&fetch_rx, &mut state);
        sync_tables(&mut state);
        terminal.draw(|frame| draw_tui(frame, &mut state))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key(&mut state, key.code) {
            KeyOutcome::Quit => break,
            KeyOutcome::Dispatch(requests) => dispatch(client, &fetch_tx, requests),
        }
    }

    terminal.show_cursor()?;
    session.leave()?;
    tracing::info!("tui stopped");
    Ok(())
}
