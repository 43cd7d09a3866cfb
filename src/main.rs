mod audit;
mod cli;
mod config;
mod discovery;
mod executor;
mod github;
mod orchestrator;
mod plan;
mod store;
mod types;
mod ui;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;
use config::Config;
use github::{GraphqlClient, client::build_http_client};
use orchestrator::{ListOutcome, Orchestrator, RunOutcome};
use ui::StdinPrompter;

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            ui::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Exit status 2 means the pass finished but some repositories still need a
/// retry.
async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(
        cli.config.as_deref(),
        |key| std::env::var(key).ok(),
        &cli.overrides(),
    )?;
    if config.skip.rename {
        ui::warn("Rename step disabled; repositories keep their current names.");
    }
    if config.skip.archive {
        ui::warn("Archive step disabled; repositories stay unarchived.");
    }

    let api = GraphqlClient::new(build_http_client()?, &config);
    let mut orchestrator = Orchestrator::new(&config, &api, StdinPrompter);

    let code = match orchestrator.run(cli.mode()).await? {
        RunOutcome::Declined => {
            ui::info("Stopped; nothing was modified.");
            ExitCode::SUCCESS
        }
        RunOutcome::Listed(ListOutcome::Generated(0)) => {
            ui::warn("No forks matched the configured user and organization.");
            ExitCode::SUCCESS
        }
        RunOutcome::Listed(_) => ExitCode::SUCCESS,
        RunOutcome::Executed(summary) => {
            ui::info(&format!(
                "Mutation log: {}",
                orchestrator.workspace().run_log.display()
            ));
            if summary.failed() > 0 {
                ExitCode::from(2)
            } else {
                ExitCode::SUCCESS
            }
        }
    };
    Ok(code)
}
