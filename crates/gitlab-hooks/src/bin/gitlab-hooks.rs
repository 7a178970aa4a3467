//! GitLab hooks binary.
//!
//! Runs one hook reconciliation for an owner or a single project.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitlab_hooks::config::{ENV_ROOT_URL, ENV_SERVERS_CONFIG};
use gitlab_hooks::{
    GitLabConnector, HookReconciler, HooksConfig, NavigatorConfig, ReconcileOutcome,
    RegistrationMode, ServersFile, SourceConfig, Token,
};

#[derive(Parser, Debug)]
#[command(name = "gitlab-hooks", version, about = "Manage GitLab project webhooks")]
struct Cli {
    /// Servers file
    #[arg(long, global = true, env = ENV_SERVERS_CONFIG)]
    config: Option<PathBuf>,

    /// Public root URL of the automation server
    #[arg(long, global = true, env = ENV_ROOT_URL)]
    root_url: Option<String>,

    /// Registration mode: disable, system or item
    #[arg(long, global = true, default_value = "system")]
    mode: RegistrationMode,

    /// Item-level token, used with `--mode item`
    #[arg(long, global = true, env = "GITLAB_ITEM_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ensure every project of a user or group has the hook
    Owner {
        /// Server name from the servers file
        #[arg(long)]
        server: String,
        /// Username or group path
        owner: String,
    },
    /// Ensure a single project has the hook
    Project {
        /// Server name from the servers file
        #[arg(long)]
        server: String,
        /// Full project path
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("gitlab_hooks=info".parse()?))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(ServersFile::default_path()));
    let servers = ServersFile::load(&config_path)
        .with_context(|| format!("Failed to load servers from {}", config_path.display()))?;
    info!(
        count = servers.servers().len(),
        path = %config_path.display(),
        "Loaded GitLab servers"
    );

    let mut hooks = HooksConfig::default();
    if let Some(root_url) = cli.root_url {
        hooks.root_url = root_url;
    }

    let reconciler = HookReconciler::new(Arc::new(servers), Arc::new(GitLabConnector), hooks);
    let credentials = cli.token.map(Token::new);

    let outcome = match cli.command {
        Command::Owner { server, owner } => {
            let navigator = NavigatorConfig {
                server_name: server,
                project_owner: owner,
                credentials,
            };
            reconciler.reconcile_owner(&navigator, cli.mode).await
        }
        Command::Project { server, path } => {
            let source = SourceConfig {
                server_name: server,
                project_path: path,
                credentials,
            };
            reconciler.reconcile_project(&source, cli.mode).await
        }
    };

    match &outcome {
        ReconcileOutcome::Skipped(reason) => info!(reason = ?reason, "Nothing to do"),
        ReconcileOutcome::Completed(report) => info!(
            created = report.created.len(),
            existing = report.existing.len(),
            failed = report.failed.len(),
            "Hooks reconciled"
        ),
        ReconcileOutcome::Failed(e) => error!(error = %e, "Hook reconciliation failed"),
    }

    Ok(if outcome.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
