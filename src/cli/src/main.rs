//! CLI for the Issue Migrator.
//!
//! Moves one issue from GitHub to Codeberg: fetches it, re-creates it with a
//! provenance footer, then closes the original with a link to the copy.

use clap::Parser;
use issue_migrator::{
    ConfigError, Credential, ForgejoClient, GitHubClient, MigrationController, MigrationError,
    MigrationState, MigratorConfig, SourceInput, TargetError, TargetInput,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

type Controller = MigrationController<GitHubClient, ForgejoClient>;

/// Issue Migrator - Move a GitHub issue to Codeberg and close the original.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Owner of the source repository.
    #[arg(long)]
    source_owner: String,

    /// Name of the source repository.
    #[arg(long)]
    source_repo: String,

    /// Number of the issue to migrate.
    #[arg(long)]
    issue: String,

    /// Source token. Optional for reading public issues, required for closing.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    source_token: Option<String>,

    /// Owner of the target repository.
    #[arg(long)]
    target_owner: String,

    /// Name of the target repository.
    #[arg(long)]
    target_repo: String,

    /// Target token with permission to create issues.
    #[arg(long, env = "CODEBERG_TOKEN", hide_env_values = true)]
    target_token: Option<String>,

    /// Path to a TOML file selecting the source and target services.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // octocrab and reqwest both pull in rustls; pick one provider for the process
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let args = Args::parse();
    let config_path = args.config.clone();

    let (source, target) = match migration_inputs(args) {
        Ok(inputs) => inputs,
        Err(e) => {
            error!(error = %e, "Invalid arguments");
            return ExitCode::from(2);
        }
    };

    let controller = match build_controller(config_path.as_deref()) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = %e, "Critical failure");
            return ExitCode::from(2);
        }
    };

    let outcome = migrate(&controller, source, target).await;
    print_summary(&controller.state());

    match outcome {
        Ok(()) => ExitCode::from(0),
        Err(e) if e.is_partial() => {
            error!(error = %e, "Migration partially completed");
            ExitCode::from(1)
        }
        Err(e) => {
            error!(error = %e, "Migration failed");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Errors that stop the CLI before a migration starts.
#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build target client: {0}")]
    TargetClient(#[from] TargetError),
}

/// Loads the config and wires both clients into a controller.
fn build_controller(config_path: Option<&Path>) -> Result<Controller, StartupError> {
    let config = MigratorConfig::load_or_default(config_path)?;
    info!(
        source = %config.source.name,
        target = %config.target.name,
        "Configured services"
    );

    let timeout = config.request_timeout();
    let target = ForgejoClient::new(&config.target, timeout)?;
    Ok(MigrationController::new(
        GitHubClient::new(&config.source, timeout),
        target,
    ))
}

/// Builds and checks the inputs for all three steps.
///
/// A run always ends by closing the source issue, so the source token is
/// required before the first step.
///
/// # Errors
///
/// Returns [`MigrationError::Validation`] for missing or malformed input.
fn migration_inputs(args: Args) -> Result<(SourceInput, TargetInput), MigrationError> {
    let source = SourceInput {
        owner: args.source_owner,
        repo: args.source_repo,
        issue_number: args.issue,
        credential: args.source_token.as_deref().and_then(Credential::from_input),
    };
    let target = TargetInput {
        owner: args.target_owner,
        repo: args.target_repo,
        credential: args.target_token.as_deref().and_then(Credential::from_input),
    };

    source.locator()?;
    target.locator()?;
    if source.credential.is_none() {
        return Err(MigrationError::Validation {
            field: "source token",
            message: "is required to close the issue (--source-token or GITHUB_TOKEN)".to_string(),
        });
    }

    Ok((source, target))
}

/// Runs the three migration steps in order, stopping at the first failure.
async fn migrate(
    controller: &Controller,
    source: SourceInput,
    target: TargetInput,
) -> Result<(), MigrationError> {
    let issue = controller.fetch_source(source).await?;
    info!(title = %issue.title, "Fetched issue");

    let created = controller.create_target(target).await?;
    info!(url = %created.url, "Created issue");

    controller.close_source().await
}

/// Prints the final migration state.
fn print_summary(state: &MigrationState) {
    println!("\nSummary:");
    println!("  Phase: {}", state.phase);
    println!(
        "  Migration complete: {}",
        if state.is_complete() { "yes" } else { "no" }
    );

    if let Some(issue) = &state.source_issue {
        println!("  Source issue: #{} {}", issue.number, issue.title);
        println!("  Author: @{}", issue.author_login);
        println!("  Labels: {}", issue.labels.join(", "));
    }
    if let Some(issue) = &state.target_issue {
        println!("  Target issue: {}", issue.url);
    }
    println!(
        "  Source closed: {}",
        if state.source_closed { "yes" } else { "no" }
    );

    if let Some(notice) = &state.notice {
        println!("  {notice}");
    }
    if let Some(last_error) = &state.last_error {
        println!("  Error ({}): {}", last_error.action, last_error.message);
    }
}
