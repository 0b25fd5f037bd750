mod api;
mod app;
mod cli;
mod config;
mod error;
mod http;
mod logging;
mod paths;

#[cfg(test)]
mod test_server;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
