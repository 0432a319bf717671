use std::{path::Path, sync::PoisonError};

use clap::Parser;
use cli::{Args, Commands};
use labelsmith_config::config::{self, generate_default_config, Config};
use labelsmith_core::{error::LabelsmithError, LabelsmithResult};
use labelsmith_github::create_api;
use labelsmith_operations::{
    create::create_labels, delete::delete_labels, empty::empty_labels, list::list_labels,
    merge::merge_labels, sync::sync_labels, LabelContext, OperationParams, Output,
};
use logging::setup_logging;
use nu_ansi_term::Color::Yellow;
use tracing::{debug, info, warn};
use utils::{confirm_action, resolve_labels, resolve_repos, Colored, COLOR};

mod cli;
mod logging;
mod utils;

/// Applies command-line overrides on top of the loaded configuration.
fn load_config(args: &Args, path: &Path) -> LabelsmithResult<Config> {
    let mut config = Config::load(path)?;

    if let Some(backend) = &args.backend {
        config.backend = Some(backend.parse()?);
    }
    if let Some(parallel) = args.parallel {
        config.parallel_limit = Some(parallel);
    }
    if let Some(token) = &args.token {
        config.token = Some(token.clone());
    }

    config.resolve()?;
    if config.token().is_none() {
        warn!("No API token configured; requests are unauthenticated");
    }
    Ok(config)
}

/// Asks before a destructive verb unless skipped or dry-running.
fn confirm(args: &Args, skip: bool, message: &str) -> LabelsmithResult<bool> {
    if skip || args.dry_run {
        return Ok(true);
    }
    let confirmed = confirm_action(&format!("{}", Colored(Yellow, message)))?;
    if !confirmed {
        info!("Aborted");
    }
    Ok(confirmed)
}

fn handle_cli() -> LabelsmithResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        *COLOR.write().unwrap_or_else(PoisonError::into_inner) = false;
    }

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    debug!(path = %config_path.display(), "using config file");

    if let Commands::DefConfig = args.command {
        generate_default_config(&config_path)?;
        return Ok(());
    }

    let config = load_config(&args, &config_path)?;

    if let Commands::Config = args.command {
        print!("{}", config.to_redacted_string()?);
        return Ok(());
    }

    let ctx = LabelContext::new(
        create_api(&config),
        OperationParams {
            dry_run: args.dry_run,
            parallel_limit: config.parallel_limit(),
        },
    );
    let out = Output::stdout();

    match &args.command {
        Commands::Create {
            repos,
            labels,
            force,
        } => {
            let repos = resolve_repos(repos)?;
            let labels = resolve_labels(labels)?;
            create_labels(&ctx, &out, &repos, &labels, *force)
        }
        Commands::Delete {
            repos,
            names,
            yes,
        } => {
            let repos = resolve_repos(repos)?;
            let message = format!(
                "Delete {} label(s) from {} repositories?",
                names.len(),
                repos.len()
            );
            if !confirm(&args, *yes, &message)? {
                return Ok(());
            }
            delete_labels(&ctx, &out, &repos, names)
        }
        Commands::Sync {
            repos,
            labels,
            yes,
            force,
        } => {
            let repos = resolve_repos(repos)?;
            let labels = resolve_labels(labels)?;
            let message = format!(
                "Sync {} repositories to {} label(s)? Labels not in the list will be deleted.",
                repos.len(),
                labels.len()
            );
            if !confirm(&args, *yes || *force, &message)? {
                return Ok(());
            }
            sync_labels(&ctx, &out, &repos, &labels)
        }
        Commands::Empty {
            repos,
            yes,
        } => {
            let repos = resolve_repos(repos)?;
            let message = format!("Delete ALL labels from {} repositories?", repos.len());
            if !confirm(&args, *yes, &message)? {
                return Ok(());
            }
            empty_labels(&ctx, &out, &repos)
        }
        Commands::Merge {
            repos,
            from,
            to,
            yes,
        } => {
            if from == to {
                return Err(LabelsmithError::Custom(format!(
                    "Cannot merge label '{from}' into itself"
                )));
            }
            let repos = resolve_repos(repos)?;
            let message = format!(
                "Merge label '{from}' into '{to}' in {} repositories?",
                repos.len()
            );
            if !confirm(&args, *yes, &message)? {
                return Ok(());
            }
            merge_labels(&ctx, &out, &repos, from, to)
        }
        Commands::List {
            repos,
        } => {
            let repos = resolve_repos(repos)?;
            list_labels(&ctx, &out, &repos)
        }
        Commands::Config | Commands::DefConfig => Ok(()),
    }
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
