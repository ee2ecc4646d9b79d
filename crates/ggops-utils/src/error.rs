use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `GgError` is the error returned by the ggops workflows (prm generation,
/// deployment, raw control plane calls). It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration, template or catalog errors |
/// | 7 | Insufficient table prm files for the rendered content |
/// | 10 | Process did not stop in time |
/// | 70 | Control plane (REST) failure |
/// | 1 | Other errors |
///
/// Library code returns `GgError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum GgError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "Insufficient slots for {process}: {available} file(s) provided, {assigned} filled, {unplaced_blocks} block(s) left over"
    )]
    InsufficientSlots {
        process: String,
        available: usize,
        assigned: usize,
        unplaced_blocks: usize,
    },

    #[error("Process {process} did not stop within {waited_secs} seconds")]
    ProcessStopTimeout { process: String, waited_secs: u64 },

    #[error("Failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Template,
    FileSystem,
    ControlPlane,
    Capacity,
    Orchestration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Template => write!(f, "Template"),
            Self::FileSystem => write!(f, "File System"),
            Self::ControlPlane => write!(f, "Control Plane"),
            Self::Capacity => write!(f, "Capacity"),
            Self::Orchestration => write!(f, "Orchestration"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Environment '{env}' is not defined in the configuration")]
    UnknownEnvironment { env: String, available: Vec<String> },

    #[error("Configuration validation failed: {error_count} errors")]
    ValidationFailed {
        errors: Vec<String>,
        error_count: usize,
    },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => {
                format!("Configuration file not found: {path}")
            }
            Self::UnknownEnvironment { env, .. } => {
                format!("Environment '{env}' is not defined in the configuration file")
            }
            Self::ValidationFailed { errors, .. } => {
                format!(
                    "Configuration validation failed with {} errors: {}",
                    errors.len(),
                    errors.join(", ")
                )
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files are JSON (or TOML when the extension is .toml) with global keys plus one object per environment."
                    .to_string(),
            ),
            Self::MissingRequired(_) => None,
            Self::InvalidValue { key, .. } => Some(format!(
                "The '{key}' configuration option has specific format requirements."
            )),
            Self::NotFound { .. } => None,
            Self::UnknownEnvironment { available, .. } => {
                if available.is_empty() {
                    Some("The configuration file defines no environments.".to_string())
                } else {
                    Some(format!("Defined environments: {}", available.join(", ")))
                }
            }
            Self::ValidationFailed { .. } => Some(
                "Every process needs a name, a prm file, at least one table prm file, a template set and a positive line budget."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the JSON syntax of the configuration file".to_string(),
                "Make sure every environment object has gg_endpoint, trail, source_db, target_db, tables_file, lobs_file and processes".to_string(),
            ],
            Self::MissingRequired(key) => match key.as_str() {
                "password" => vec![
                    "Pass --password on the command line".to_string(),
                    "Or export GGOPS_PASSWORD before running ggops".to_string(),
                ],
                _ => vec![format!("Add '{key}' to the configuration file")],
            },
            Self::InvalidValue { key, .. } => match key.as_str() {
                "max_number_lines_per_default_tables_prm"
                | "default_max_number_lines_per_default_tables_prm" => vec![
                    "Use a positive integer value".to_string(),
                ],
                "verify_cert" => vec![
                    "Use true, false, or the path to a CA bundle in PEM format".to_string(),
                ],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                ],
            },
            Self::NotFound { .. } => vec![
                "Check the path passed as the first argument".to_string(),
            ],
            Self::UnknownEnvironment { .. } => vec![
                "Pass one of the environments defined in the configuration file".to_string(),
            ],
            Self::ValidationFailed { .. } => vec![
                "Fix the listed problems in the configuration file".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Template loading and rendering errors
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template syntax error in {template} at line {line}: {reason}")]
    Syntax {
        template: String,
        line: usize,
        reason: String,
    },
}

impl UserFriendlyError for TemplateError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { path, source } => {
                format!("Could not read template {}: {source}", path.display())
            }
            Self::Syntax {
                template,
                line,
                reason,
            } => format!("Template {template} is malformed at line {line}: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Read { .. } => Some(
                "Template paths are resolved relative to the current working directory."
                    .to_string(),
            ),
            Self::Syntax { .. } => Some(
                "Templates support {{ name }} and {{ nested.name }} substitutions and {# comments #}."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Read { .. } => vec![
                "Check default_templates and the process 'template' entries".to_string(),
            ],
            Self::Syntax { .. } => vec![
                "Close every '{{' with '}}' and every '{#' with '#}'".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Template
    }
}

/// Errors loading table, LOB and column catalogs
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed entry in {path} at line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl UserFriendlyError for CatalogError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { path, source } => {
                format!("Could not read {}: {source}", path.display())
            }
            Self::Malformed { path, line, reason } => {
                format!("{}:{line}: {reason}", path.display())
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some(
            "Tables files hold OWNER.TABLE per line; lobs files hold owner,table,column[,data_type]; columns files hold owner,table,column,data_type,data_length."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Read { .. } => vec![
                "Check tables_file, lobs_file and columns_file in the environment".to_string(),
            ],
            Self::Malformed { .. } => vec![
                "Fix or comment out (#) the offending line".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::FileSystem
    }
}

/// Errors talking to the GoldenGate REST control plane
#[derive(Error, Debug)]
pub enum ControlPlaneError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Command {command} needs an argument for '{url_suffix}'")]
    MissingCommandArg { command: String, url_suffix: String },

    #[error("Command {command} takes no argument, got '{arg}'")]
    UnexpectedCommandArg { command: String, arg: String },

    #[error("A JSON body and a body file are mutually exclusive")]
    ConflictingBody,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("HTTP call returned {status} for {method} {url}")]
    HttpStatus {
        status: u16,
        method: String,
        url: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Client misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("Unexpected response to {command}: {reason}")]
    UnexpectedResponse { command: String, reason: String },
}

impl UserFriendlyError for ControlPlaneError {
    fn user_message(&self) -> String {
        match self {
            Self::UnknownCommand(name) => format!("'{name}' is not a known control plane command"),
            Self::MissingCommandArg { command, .. } => {
                format!("Command {command} requires --command-arg")
            }
            Self::UnexpectedCommandArg { command, arg } => {
                format!("Command {command} does not take an argument (got '{arg}')")
            }
            Self::ConflictingBody => {
                "--command-args-json and --command-arg-fn cannot be used together".to_string()
            }
            Self::InvalidBody(reason) => format!("Request body is invalid: {reason}"),
            Self::HttpStatus {
                status,
                method,
                url,
            } => format!("{method} {url} returned HTTP {status}"),
            Self::Transport(reason) => format!("Could not reach the control plane: {reason}"),
            Self::Timeout { duration } => {
                format!("The control plane did not answer within {duration:?}")
            }
            Self::Misconfiguration(reason) => format!("HTTP client is misconfigured: {reason}"),
            Self::UnexpectedResponse { command, reason } => {
                format!("Response to {command} could not be interpreted: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::HttpStatus { status: 401, .. } | Self::HttpStatus { status: 403, .. } => {
                Some("The control plane rejected the credentials.".to_string())
            }
            Self::HttpStatus { .. } => Some("Only HTTP 200 and 201 count as success.".to_string()),
            Self::Transport(_) | Self::Timeout { .. } => Some(
                "Read-only calls are retried twice before giving up.".to_string(),
            ),
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownCommand(_) => vec!["Run 'ggops commands' to list known commands".to_string()],
            Self::HttpStatus { status: 401, .. } | Self::HttpStatus { status: 403, .. } => vec![
                "Check the endpoint user and the password".to_string(),
                "When using client certificates pass both --client-cert and --client-key"
                    .to_string(),
            ],
            Self::Transport(_) | Self::Timeout { .. } => vec![
                "Check the endpoint url and network reachability".to_string(),
                "Check verify_cert if the server uses a private CA".to_string(),
            ],
            _ => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownCommand(_)
            | Self::MissingCommandArg { .. }
            | Self::UnexpectedCommandArg { .. }
            | Self::ConflictingBody
            | Self::InvalidBody(_)
            | Self::Misconfiguration(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::ControlPlane,
        }
    }
}

impl UserFriendlyError for GgError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Template(err) => err.user_message(),
            Self::Catalog(err) => err.user_message(),
            Self::ControlPlane(err) => err.user_message(),
            Self::Io(err) => format!("File system operation failed: {err}"),
            Self::InsufficientSlots {
                process,
                available,
                assigned,
                unplaced_blocks,
            } => format!(
                "Not enough table prm files for {process}: all {available} were filled ({assigned} used) and {unplaced_blocks} table block(s) did not fit"
            ),
            Self::ProcessStopTimeout {
                process,
                waited_secs,
            } => format!("{process} was still running after {waited_secs} seconds"),
            Self::WriteFailed { path, reason } => format!("Could not write {path}: {reason}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Template(err) => err.context(),
            Self::Catalog(err) => err.context(),
            Self::ControlPlane(err) => err.context(),
            Self::Io(_) | Self::WriteFailed { .. } => {
                Some("This usually indicates a permissions issue or disk space problem.".to_string())
            }
            Self::InsufficientSlots { .. } => Some(
                "No prm file was written, so the previous files stay untouched.".to_string(),
            ),
            Self::ProcessStopTimeout { .. } => Some(
                "Nothing was deployed; processes stopped earlier in the run stay stopped."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Template(err) => err.suggestions(),
            Self::Catalog(err) => err.suggestions(),
            Self::ControlPlane(err) => err.suggestions(),
            Self::Io(_) | Self::WriteFailed { .. } => vec![
                "Check file permissions in the output directory".to_string(),
            ],
            Self::InsufficientSlots { .. } => vec![
                "Add more file names to prm_table_file_name".to_string(),
                "Or raise max_number_lines_per_default_tables_prm".to_string(),
            ],
            Self::ProcessStopTimeout { .. } => vec![
                "Retry with --force to issue FORCESTOP".to_string(),
                "Raise stop_timeout_secs in the configuration".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Template(_) => ErrorCategory::Template,
            Self::Catalog(err) => err.category(),
            Self::ControlPlane(err) => err.category(),
            Self::Io(_) | Self::WriteFailed { .. } => ErrorCategory::FileSystem,
            Self::InsufficientSlots { .. } => ErrorCategory::Capacity,
            Self::ProcessStopTimeout { .. } => ErrorCategory::Orchestration,
        }
    }
}

impl GgError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) | Self::Template(_) | Self::Catalog(_) => ExitCode::CONFIG,
            Self::InsufficientSlots { .. } => ExitCode::INSUFFICIENT_SLOTS,
            Self::ProcessStopTimeout { .. } => ExitCode::STOP_TIMEOUT,
            Self::ControlPlane(err) => match err.category() {
                ErrorCategory::Configuration => ExitCode::CONFIG,
                _ => ExitCode::CONTROL_PLANE_FAILURE,
            },
            Self::Io(_) | Self::WriteFailed { .. } => ExitCode::INTERNAL,
        }
    }
}
