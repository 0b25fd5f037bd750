mod cascade;
mod commands;
pub(crate) mod episode;
mod plan;
mod providers;
mod stage;
mod tui;
mod worker;

#[cfg(test)]
mod tests;

use anyhow::Result;

use crate::api::FacadeClient;
use crate::cli::{Cli, Command, PlanArgs, TuiArgs};
use crate::config::Config;
use crate::logging::init_tracing;
use crate::paths::log_file_path;

use self::commands::{
    run_availability, run_episodes, run_genres, run_plan, run_providers, run_titles,
};

pub fn run(cli: Cli) -> Result<()> {
    let command = cli.command.unwrap_or(Command::Tui(TuiArgs::default()));
    let plan_args = match &command {
        Command::Tui(args) => args.plan.clone(),
        Command::Plan { inputs, .. } => inputs.clone(),
        _ => PlanArgs::default(),
    };
    let config = Config::from_cli(&cli.global, &plan_args)?;

    // The TUI owns the terminal, so its log goes to a file.
    let logging = if matches!(command, Command::Tui(_)) {
        log_file_path().and_then(|path| init_tracing(Some(&path), "info"))
    } else {
        init_tracing(None, "warn")
    };
    if let Err(err) = logging {
        eprintln!("warning: logging disabled: {err:#}");
    }

    let client = FacadeClient::new(&config.api_base_url);
    match command {
        Command::Tui(_) => tui::run_tui(&config, &client)?,
        Command::Genres => run_genres(&client, &config)?,
        Command::Titles {
            genre_id,
            sort_by,
            page,
        } => run_titles(&client, genre_id, &sort_by, page)?,
        Command::Availability { tmdb_id } => run_availability(&client, &config, tmdb_id)?,
        Command::Providers { tmdb_id } => run_providers(&client, &config, tmdb_id)?,
        Command::Episodes {
            title,
            max_upcoming,
            max_past,
        } => run_episodes(&client, &title, max_upcoming, max_past)?,
        Command::Plan { tmdb_id, .. } => run_plan(&client, &config, tmdb_id)?,
    }

    Ok(())
}
