//! flowmgr - command-line interface for a workflow-automation server.

mod commands;
mod logging;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::ConnectionArgs;
use commands::executions::ExecuteOptions;
use logging::LoggingConfig;
use std::path::PathBuf;
use std::time::Duration;

/// flowmgr - manage workflows, executions and credentials from the shell.
#[derive(Parser)]
#[command(name = "flowmgr")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List workflows
    ListWorkflows {
        /// Only active workflows
        #[arg(long, conflicts_with = "inactive")]
        active: bool,

        /// Only inactive workflows
        #[arg(long)]
        inactive: bool,
    },

    /// Show a workflow as JSON
    GetWorkflow {
        /// Workflow ID
        workflow_id: String,

        /// Save to this file instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Deploy a workflow from a JSON file (supports templates)
    Deploy {
        /// Workflow JSON file
        file: PathBuf,

        /// Template variable (key=value), repeatable
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,

        /// Activate after deployment
        #[arg(long)]
        activate: bool,
    },

    /// Backup workflows to a directory
    Backup {
        /// Output directory
        #[arg(short, long, default_value = "./backups")]
        output: PathBuf,

        /// Only backup active workflows
        #[arg(long)]
        active_only: bool,
    },

    /// Restore workflows from a backup directory as new workflows
    Restore {
        /// Backup directory
        #[arg(short, long, default_value = "./backups")]
        input: PathBuf,
    },

    /// Execute a workflow
    Execute {
        /// Workflow ID
        workflow_id: String,

        /// Wait for the execution to finish (default)
        #[arg(long, overrides_with = "no_wait")]
        wait: bool,

        /// Return as soon as the execution is started
        #[arg(long, overrides_with = "wait")]
        no_wait: bool,

        /// Seconds to wait before giving up
        #[arg(long, default_value = "300")]
        timeout: u64,

        /// JSON file with input data
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// List executions
    ListExecutions {
        /// Only executions of this workflow
        #[arg(long)]
        workflow_id: Option<String>,

        /// Only executions in this status (success, error, running, waiting, ...)
        #[arg(long)]
        status: Option<String>,

        /// Maximum number of executions to show
        #[arg(long, default_value_t = flowmgr_client::DEFAULT_EXECUTION_LIMIT)]
        limit: u32,
    },

    /// Retry a failed execution
    Retry {
        /// Execution ID
        execution_id: String,
    },

    /// Activate a workflow
    Activate {
        /// Workflow ID
        workflow_id: String,
    },

    /// Deactivate a workflow
    Deactivate {
        /// Workflow ID
        workflow_id: String,
    },

    /// List credentials
    ListCredentials {
        /// Only credentials of this type
        #[arg(long = "type")]
        credential_type: Option<String>,
    },

    /// Check the API connection
    Health,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&LoggingConfig::from_env(cli.verbose))?;

    let conn = &cli.connection;
    match cli.command {
        Commands::ListWorkflows { active, inactive } => {
            let filter = match (active, inactive) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::workflows::list(conn, filter).await
        }
        Commands::GetWorkflow {
            workflow_id,
            output,
        } => commands::workflows::get(conn, &workflow_id, output.as_deref()).await,
        Commands::Deploy {
            file,
            vars,
            activate,
        } => commands::deploy::run(conn, &file, &vars, activate).await,
        Commands::Backup {
            output,
            active_only,
        } => commands::backup::backup(conn, &output, active_only).await,
        Commands::Restore { input } => commands::backup::restore(conn, &input).await,
        Commands::Execute {
            workflow_id,
            wait: _,
            no_wait,
            timeout,
            input,
        } => {
            let options = ExecuteOptions {
                workflow_id: &workflow_id,
                wait: !no_wait,
                timeout: Duration::from_secs(timeout),
                input: input.as_deref(),
            };
            commands::executions::execute(conn, options).await
        }
        Commands::ListExecutions {
            workflow_id,
            status,
            limit,
        } => {
            commands::executions::list(conn, workflow_id.as_deref(), status.as_deref(), limit)
                .await
        }
        Commands::Retry { execution_id } => commands::executions::retry(conn, &execution_id).await,
        Commands::Activate { workflow_id } => {
            commands::workflows::activate(conn, &workflow_id).await
        }
        Commands::Deactivate { workflow_id } => {
            commands::workflows::deactivate(conn, &workflow_id).await
        }
        Commands::ListCredentials { credential_type } => {
            commands::credentials::list(conn, credential_type.as_deref()).await
        }
        Commands::Health => commands::health::run(conn).await,
        Commands::Version => commands::version::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn execute_waits_unless_told_not_to() {
        let cli = Cli::try_parse_from(["flowmgr", "execute", "wf-1"]).unwrap();
        assert!(matches!(cli.command, Commands::Execute { no_wait: false, timeout: 300, .. }));

        let cli = Cli::try_parse_from(["flowmgr", "execute", "wf-1", "--no-wait"]).unwrap();
        assert!(matches!(cli.command, Commands::Execute { no_wait: true, .. }));

        let cli = Cli::try_parse_from(["flowmgr", "execute", "wf-1", "--no-wait", "--wait"]).unwrap();
        assert!(matches!(cli.command, Commands::Execute { no_wait: false, .. }));
    }

    #[test]
    fn deploy_collects_repeated_vars() {
        let cli = Cli::try_parse_from([
            "flowmgr", "deploy", "flow.json", "--var", "env=prod", "--var", "region=eu",
            "--activate",
        ])
        .unwrap();
        match cli.command {
            Commands::Deploy {
                file,
                vars,
                activate,
            } => {
                assert_eq!(file, PathBuf::from("flow.json"));
                assert_eq!(vars, ["env=prod", "region=eu"]);
                assert!(activate);
            }
            _ => panic!("expected deploy"),
        }
    }

    #[test]
    fn connection_flags_are_global() {
        let cli = Cli::try_parse_from([
            "flowmgr",
            "health",
            "--api-key",
            "k",
            "--base-url",
            "http://localhost:5678",
        ])
        .unwrap();
        assert_eq!(cli.connection.api_key.as_deref(), Some("k"));
        assert_eq!(cli.connection.base_url.as_deref(), Some("http://localhost:5678"));
    }
}
