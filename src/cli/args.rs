//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use ggops_config::VerifyCert;

/// Environment variable holding the GoldenGate admin password
pub const PASSWORD_ENV: &str = "GGOPS_PASSWORD";

/// ggops - generate, pack and deploy Oracle GoldenGate parameter files
#[derive(Parser, Debug)]
#[command(name = "ggops")]
#[command(about = "Generate, pack and deploy Oracle GoldenGate parameter files")]
#[command(long_about = r#"
ggops renders extract and replicat parameter files from templates, packs the
per-table sections into a fixed set of table prm files and deploys them to a
GoldenGate Microservices endpoint.

EXAMPLES:
  # Generate all prm files of the prod environment
  ggops gen-prms config.json prod

  # Generate, stop the processes, upload and restart them
  GGOPS_PASSWORD=... ggops deploy-prms config.json prod

  # Call a single REST command
  ggops gg config.json prod extract_retrieve_status --command-arg EXT

  # List the known REST commands
  ggops commands config.json

EXIT CODES:
  0 success, 1 internal error, 2 configuration error, 7 not enough table prm
  files, 10 process did not stop in time, 70 control plane failure
"#)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory receiving the per-run log file
    #[arg(long, global = true, default_value = "logs")]
    pub logs_dir: Utf8PathBuf,

    /// Log to stderr only
    #[arg(long, global = true)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate every prm file of an environment
    ///
    /// EXAMPLES:
    ///   ggops gen-prms config.json dev
    GenPrms {
        /// Configuration file (JSON, or TOML by extension)
        config: Utf8PathBuf,

        /// Environment name
        env: String,
    },

    /// Generate and deploy every prm file of an environment
    ///
    /// Existing processes are stopped (extract first), all files are
    /// uploaded, then the processes are started again.
    DeployPrms {
        /// Configuration file (JSON, or TOML by extension)
        config: Utf8PathBuf,

        /// Environment name
        env: String,

        /// Stop the processes with FORCESTOP
        #[arg(short, long)]
        force: bool,

        /// GGADMIN password
        #[arg(short, long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,
    },

    /// Call one control plane REST command and print the JSON response
    ///
    /// EXAMPLES:
    ///   ggops gg config.json prod list_extracts
    ///   ggops gg config.json prod replace_configuration_file --command-arg EXT.prm --command-arg-fn EXT.prm
    ///   ggops gg config.json prod extract_issue_command --command-arg EXT --command-args-json '{"command":"STOP"}'
    Gg {
        /// Configuration file (JSON, or TOML by extension)
        config: Utf8PathBuf,

        /// Environment name
        env: String,

        /// Command name, see `ggops commands`
        command: String,

        /// Value substituted for `$url_arg` in the command URL
        #[arg(long)]
        command_arg: Option<String>,

        /// File sent as `{"lines": [...]}`
        #[arg(long, conflicts_with = "command_args_json")]
        command_arg_fn: Option<Utf8PathBuf>,

        /// JSON request body
        #[arg(long)]
        command_args_json: Option<String>,

        /// Endpoint URL overriding the configured one
        #[arg(long)]
        gg_endpoint_url: Option<String>,

        /// GGADMIN password
        #[arg(short, long, env = PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,

        /// Client certificate (PEM), used together with --client-key
        #[arg(long, requires = "client_key")]
        client_cert: Option<Utf8PathBuf>,

        /// Client key (PEM), used together with --client-cert
        #[arg(long, requires = "client_cert")]
        client_key: Option<Utf8PathBuf>,

        /// Verify the server certificate: true, false or a CA bundle path
        #[arg(long)]
        verify_cert: Option<VerifyCert>,
    },

    /// List the known control plane commands
    #[command(name = "commands")]
    ListCommands {
        /// Configuration file whose endpoints_def_file extends the built-in commands
        config: Option<Utf8PathBuf>,
    },
}

impl Commands {
    /// Name used for the log file and error context.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GenPrms { .. } => "gen-prms",
            Self::DeployPrms { .. } => "deploy-prms",
            Self::Gg { .. } => "gg",
            Self::ListCommands { .. } => "commands",
        }
    }
}
