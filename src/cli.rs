use clap::{Args, Parser, Subcommand};

use crate::api::DEFAULT_SORT_BY;
use crate::app::episode::{DEFAULT_MAX_PAST, DEFAULT_MAX_UPCOMING};

#[derive(Debug, Parser)]
#[command(
    name = "streamplan",
    version,
    about = "Browse streaming availability by genre, check episode schedules and plan subscriptions"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Base URL of the availability/planning API.
    #[arg(
        long,
        global = true,
        env = "STREAMPLAN_API_BASE_URL",
        default_value = "http://localhost:8000"
    )]
    pub api_base_url: String,

    /// Region used for availability and watch providers.
    #[arg(long, global = true, env = "STREAMPLAN_COUNTRY", default_value = "US")]
    pub country: String,

    #[arg(long, global = true, env = "STREAMPLAN_LANGUAGE", default_value = "en-US")]
    pub language: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive drill-down (default).
    Tui(TuiArgs),
    /// List TV genres.
    Genres,
    /// Discover titles in a genre.
    Titles {
        genre_id: u64,
        #[arg(long, default_value = DEFAULT_SORT_BY)]
        sort_by: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Availability assessments for a title.
    Availability { tmdb_id: u64 },
    /// Watch providers for a title, merged across offer types.
    Providers { tmdb_id: u64 },
    /// Next and recent air times for a show, looked up by name.
    Episodes {
        title: String,
        #[arg(long, default_value_t = DEFAULT_MAX_UPCOMING)]
        max_upcoming: usize,
        #[arg(long, default_value_t = DEFAULT_MAX_PAST)]
        max_past: usize,
    },
    /// Generate a subscription plan from a title's availability.
    Plan {
        tmdb_id: u64,
        #[command(flatten)]
        inputs: PlanArgs,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct TuiArgs {
    #[command(flatten)]
    pub plan: PlanArgs,
}

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Planning horizon in days; non-numeric text falls back to 30.
    #[arg(long, default_value = "30")]
    pub horizon: String,

    /// Comma-separated service ids that are never cancelled.
    #[arg(long, default_value = "youtube_tv")]
    pub permanent: String,
}

impl Default for PlanArgs {
    fn default() -> Self {
        Self {
            horizon: "30".to_string(),
            permanent: "youtube_tv".to_string(),
        }
    }
}
