//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Installs logging
//! - Creates the tokio runtime
//! - Dispatches to command handlers
//! - Handles all error output

use chrono::Local;
use clap::Parser;
use ggops_utils::logging::{init_tracing, log_file_path};
use tracing::{debug, error};

use super::args::{Cli, Commands};
use super::commands;
use crate::{ExitCode, GgError};

/// Main CLI execution function.
///
/// Prints everything, errors included, and returns the exit code on
/// failure. main.rs only calls `std::process::exit(code.as_i32())`.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();
    let operation = cli.command.name();

    let log_file = (!cli.no_log_file).then(|| log_file_path(&cli.logs_dir, operation, Local::now()));
    if let Err(e) = init_tracing(cli.verbose, log_file.as_deref()) {
        eprintln!("✗ Failed to initialize logging: {e:#}");
        return Err(ExitCode::INTERNAL);
    }
    if let Some(path) = &log_file {
        debug!(log_file = %path, command = operation, "Logging to file");
    }

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("✗ Failed to create async runtime: {e}");
            return Err(ExitCode::INTERNAL);
        }
    };

    let result: Result<(), GgError> = rt.block_on(async {
        match cli.command {
            Commands::GenPrms { config, env } => commands::execute_gen_prms(&config, &env),
            Commands::DeployPrms {
                config,
                env,
                force,
                password,
            } => commands::execute_deploy_prms(&config, &env, force, password).await,
            Commands::Gg {
                config,
                env,
                command,
                command_arg,
                command_arg_fn,
                command_args_json,
                gg_endpoint_url,
                password,
                client_cert,
                client_key,
                verify_cert,
            } => {
                let request = commands::GgRequest {
                    command,
                    command_arg,
                    command_arg_fn,
                    command_args_json,
                };
                let overrides = ggops_client::ConnectionOverrides {
                    url: gg_endpoint_url,
                    password,
                    client_cert,
                    client_key,
                    verify_cert,
                };
                commands::execute_gg(&config, &env, request, overrides).await
            }
            Commands::ListCommands { config } => commands::execute_list_commands(config.as_deref()),
        }
    });

    if let Err(err) = result {
        error!(command = operation, error = %err, "Command failed");
        eprintln!("{}", err.display_for_user());
        return Err(err.to_exit_code());
    }

    Ok(())
}
