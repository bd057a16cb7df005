mod change;
mod cli_args;
mod config;
mod engine;
mod error;
mod formatter;
mod git;
mod llm;
mod logging;
mod setup;
mod spinner;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::cli_args::{Cli, Command};
use crate::config::Config;
use crate::git::DiffScope;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let cfg = Config::from_sources(&cli);
    log::debug!("Resolved config: {cfg:?}");

    match &cli.command {
        Some(Command::Review { branch, staged }) => {
            let scope = match (branch, staged) {
                (Some(name), _) => DiffScope::Branch(name.clone()),
                (None, true) => DiffScope::Staged,
                (None, false) => DiffScope::Working,
            };
            run_review(&cfg, &scope)
        }
        None => run_review(&cfg, &DiffScope::Working),
        Some(Command::Commit {
            context,
            ticket,
            apply,
        }) => run_commit(&cfg, context.as_deref(), ticket.as_deref(), *apply),
        Some(Command::Check) => run_check(&cfg),
        Some(Command::Config { key, set_model }) => run_config(&cfg, key.as_deref(), set_model.as_deref()),
    }
}

fn ensure_repository() -> Result<()> {
    if !git::is_repository() {
        bail!("Not a valid Git repository.");
    }
    Ok(())
}

/// Review mode: send every change in scope to the model and show its feedback.
fn run_review(cfg: &Config, scope: &DiffScope) -> Result<()> {
    ensure_repository()?;

    let changes = git::collect_change_records(scope)?;
    if changes.is_empty() {
        println!("No changes detected.");
        return Ok(());
    }

    let client = setup::build_llm_client(cfg)?;
    setup::verify_setup(&client, cfg)?;

    let suggestions = spinner::with_spinner(|| engine::review_changes(&client, &cfg.model, &changes))
        .context("code review failed")?;

    formatter::print_review(&suggestions);
    Ok(())
}

/// Commit mode: draft a commit message for the staged changes.
fn run_commit(
    cfg: &Config,
    context: Option<&str>,
    ticket: Option<&str>,
    apply: bool,
) -> Result<()> {
    ensure_repository()?;

    let changes = git::collect_change_records(&DiffScope::Staged)?;
    if changes.is_empty() {
        println!("No staged changes found.");
        return Ok(());
    }

    let client = setup::build_llm_client(cfg)?;
    setup::verify_setup(&client, cfg)?;

    let message = spinner::with_spinner(|| {
        engine::generate_commit_message(&client, &cfg.model, &changes, context, ticket)
    })
    .context("commit message generation failed")?;

    formatter::print_commit_message(&message);

    if apply {
        git::write_commit_editmsg(&message)?;
        println!("Wrote commit message to .git/COMMIT_EDITMSG");
    }

    Ok(())
}

fn run_check(cfg: &Config) -> Result<()> {
    let client = setup::build_llm_client(cfg)?;
    let availability = setup::check_availability(&client, &cfg.model);
    let message = availability.message(&cfg.model, &cfg.ollama_url);

    if availability != setup::Availability::Ready {
        bail!("Ollama setup incomplete: {message}");
    }
    println!("{message}");
    Ok(())
}

fn run_config(cfg: &Config, key: Option<&str>, set_model: Option<&str>) -> Result<()> {
    if let Some(model) = set_model {
        let path = config::save_default_model(model)?;
        println!("Saved default model '{}' to {}", model.trim(), path.display());
    }

    match key {
        Some(key) => match cfg.value(key) {
            Some(value) => println!("{value}"),
            None => bail!(
                "unknown config key '{key}' (expected one of: {})",
                config::KEYS.join(", ")
            ),
        },
        None if set_model.is_none() => {
            for key in config::KEYS {
                println!("{key} = {}", cfg.value(key).unwrap_or_default());
            }
        }
        None => {}
    }

    Ok(())
}
