//! Named control plane commands.

use camino::Utf8Path;
use ggops_utils::error::{ConfigError, ControlPlaneError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP operation of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpOp {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpOp {
    #[must_use]
    pub fn method(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }

    /// Only reads are retried.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// A command: an HTTP operation on a URL suffix below `services/v2/`.
///
/// The suffix may hold a `$url_arg` placeholder filled from the command
/// argument.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CommandDef {
    pub op: HttpOp,
    pub url_suffix: String,
}

impl CommandDef {
    fn new(op: HttpOp, url_suffix: &str) -> Self {
        Self {
            op,
            url_suffix: url_suffix.to_string(),
        }
    }
}

/// Command table, built in and optionally extended from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandDef>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CommandRegistry {
    /// The commands the deployment workflow relies on, plus the common
    /// extract, replicat and configuration calls.
    #[must_use]
    pub fn builtin() -> Self {
        use HttpOp::{Delete, Get, Patch, Post, Put};

        let table: &[(&str, HttpOp, &str)] = &[
            ("list_extracts", Get, "extracts"),
            ("retrieve_extract", Get, "extracts/$url_arg"),
            ("create_extract", Post, "extracts/$url_arg"),
            ("update_extract", Patch, "extracts/$url_arg"),
            ("delete_extract", Delete, "extracts/$url_arg"),
            ("extract_retrieve_status", Get, "extracts/$url_arg/info/status"),
            ("extract_issue_command", Post, "extracts/$url_arg/command"),
            ("list_replicats", Get, "replicats"),
            ("retrieve_replicat", Get, "replicats/$url_arg"),
            ("create_replicat", Post, "replicats/$url_arg"),
            ("update_replicat", Patch, "replicats/$url_arg"),
            ("delete_replicat", Delete, "replicats/$url_arg"),
            ("replicat_retrieve_status", Get, "replicats/$url_arg/info/status"),
            ("replicat_issue_command", Post, "replicats/$url_arg/command"),
            ("list_config_files", Get, "config/files"),
            ("retrieve_configuration_file", Get, "config/files/$url_arg"),
            ("create_configuration_file", Post, "config/files/$url_arg"),
            ("replace_configuration_file", Put, "config/files/$url_arg"),
            ("delete_configuration_file", Delete, "config/files/$url_arg"),
            ("list_configuration_data_types", Get, "config/types"),
            ("list_configuration_values", Get, "config/types/$url_arg/values"),
            ("execute_command", Post, "commands/execute"),
        ];

        Self {
            commands: table
                .iter()
                .map(|(name, op, suffix)| ((*name).to_string(), CommandDef::new(*op, suffix)))
                .collect(),
        }
    }

    /// Parse a command file: a JSON object of name to
    /// `{"op": "...", "url_suffix": "..."}`.
    pub fn from_json_str(content: &str) -> Result<BTreeMap<String, CommandDef>, ConfigError> {
        serde_json::from_str(content)
            .map_err(|e| ConfigError::InvalidFile(format!("command definitions: {e}")))
    }

    /// Built-in commands overridden and extended by the file at `path`.
    pub fn with_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::NotFound {
            path: path.to_string(),
        })?;
        let overrides = Self::from_json_str(&content).map_err(|e| match e {
            ConfigError::InvalidFile(reason) => ConfigError::InvalidFile(format!("{path}: {reason}")),
            other => other,
        })?;
        Ok(Self::builtin().extend(overrides))
    }

    #[must_use]
    pub fn extend(mut self, overrides: BTreeMap<String, CommandDef>) -> Self {
        self.commands.extend(overrides);
        self
    }

    pub fn get(&self, name: &str) -> Result<&CommandDef, ControlPlaneError> {
        self.commands
            .get(name)
            .ok_or_else(|| ControlPlaneError::UnknownCommand(name.to_string()))
    }

    /// Commands sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandDef)> {
        self.commands.iter().map(|(name, def)| (name.as_str(), def))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
