use camino::Utf8PathBuf;
use ggops_utils::error::ConfigError;
use serde_json::{Value, json};
use std::time::Duration;

use crate::model::{
    DEFAULT_POLL_INTERVAL_SECS, EndpointConfig, GgConfig, ProcessType, SourceDbConfig,
    TargetDbConfig, TemplateSet, VerifyCert,
};

/// Process option disabling FETCHCOLS generation.
pub const OPT_NO_FETCHCOLS: &str = "nofetchcols";

/// A process with environment level settings and defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProcess {
    pub env: String,
    pub process_type: ProcessType,
    pub process_name: String,
    pub prm_file: Utf8PathBuf,
    pub table_prm_files: Vec<Utf8PathBuf>,
    pub templates: TemplateSet,
    pub max_lines: usize,
    pub fetchcols: bool,
    /// Data handed to the process template
    pub context: Value,
}

impl ResolvedProcess {
    /// Files deployed for this process: table prm files first, then the
    /// process prm file.
    #[must_use]
    pub fn deploy_files(&self) -> Vec<Utf8PathBuf> {
        let mut files = self.table_prm_files.clone();
        files.push(self.prm_file.clone());
        files
    }
}

/// Everything a workflow needs to know about one environment.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEnvironment {
    pub name: String,
    pub endpoint: Option<(String, EndpointConfig)>,
    pub default_verify_cert: Option<VerifyCert>,
    pub endpoints_def_file: Option<Utf8PathBuf>,
    pub source_db: SourceDbConfig,
    pub target_db: TargetDbConfig,
    pub tables_file: Utf8PathBuf,
    pub lobs_file: Utf8PathBuf,
    pub columns_file: Option<Utf8PathBuf>,
    /// Processes in deployment order
    pub processes: Vec<ResolvedProcess>,
    pub poll_interval: Duration,
    pub stop_timeout: Option<Duration>,
}

impl ResolvedEnvironment {
    #[must_use]
    pub fn process(&self, process_type: ProcessType) -> Option<&ResolvedProcess> {
        self.processes
            .iter()
            .find(|p| p.process_type == process_type)
    }

    /// The endpoint this environment deploys to.
    pub fn require_endpoint(&self) -> Result<&(String, EndpointConfig), ConfigError> {
        self.endpoint
            .as_ref()
            .ok_or_else(|| ConfigError::MissingRequired(format!("{}.gg_endpoint", self.name)))
    }
}

impl GgConfig {
    /// Names of the environments defined in the file.
    #[must_use]
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.keys().cloned().collect()
    }

    /// Apply defaults to `env` and validate the result.
    ///
    /// All problems found are reported together in
    /// [`ConfigError::ValidationFailed`].
    pub fn resolve_environment(&self, env: &str) -> Result<ResolvedEnvironment, ConfigError> {
        let env_config =
            self.environments
                .get(env)
                .ok_or_else(|| ConfigError::UnknownEnvironment {
                    env: env.to_string(),
                    available: self.environment_names(),
                })?;

        let mut errors = Vec::new();

        let endpoint = match &env_config.gg_endpoint {
            Some(name) => match self.gg_endpoints.get(name) {
                Some(endpoint) => Some((name.clone(), endpoint.clone())),
                None => {
                    errors.push(format!("{env}.gg_endpoint '{name}' is not defined in gg_endpoints"));
                    None
                }
            },
            None => None,
        };

        let poll_interval_secs = self.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            errors.push("poll_interval_secs must be greater than 0".to_string());
        }
        if self.stop_timeout_secs == Some(0) {
            errors.push("stop_timeout_secs must be greater than 0".to_string());
        }
        if env_config.processes.is_empty() {
            errors.push(format!("{env}.processes defines no process"));
        }

        let mut processes = Vec::with_capacity(env_config.processes.len());
        for (process_type, process) in &env_config.processes {
            let key = format!("{env}.processes.{process_type}");

            let templates = process
                .template
                .clone()
                .or_else(|| self.default_templates.get(process_type).cloned());
            if templates.is_none() {
                errors.push(format!(
                    "{key}: no template and no default_templates.{process_type}"
                ));
            }

            let max_lines = process
                .max_number_lines_per_default_tables_prm
                .or(self.default_max_number_lines_per_default_tables_prm);
            match max_lines {
                None => errors.push(format!(
                    "{key}: max_number_lines_per_default_tables_prm is not set and has no default"
                )),
                Some(0) => errors.push(format!(
                    "{key}: max_number_lines_per_default_tables_prm must be greater than 0"
                )),
                Some(_) => {}
            }

            let table_prm_files = process.prm_table_file_name.to_vec();
            if table_prm_files.is_empty() {
                errors.push(format!("{key}: prm_table_file_name lists no file"));
            }
            if process.process_name.trim().is_empty() {
                errors.push(format!("{key}: process_name is empty"));
            }

            let (Some(templates), Some(max_lines)) = (templates, max_lines) else {
                continue;
            };

            let context = process_context(env, &env_config.trail, process, &templates, max_lines)?;
            processes.push(ResolvedProcess {
                env: env.to_string(),
                process_type: *process_type,
                process_name: process.process_name.clone(),
                prm_file: process.prm_file_name.clone(),
                table_prm_files,
                templates,
                max_lines,
                fetchcols: !process.opts.iter().any(|opt| opt == OPT_NO_FETCHCOLS),
                context,
            });
        }

        if !errors.is_empty() {
            return Err(ConfigError::ValidationFailed {
                error_count: errors.len(),
                errors,
            });
        }

        Ok(ResolvedEnvironment {
            name: env.to_string(),
            endpoint,
            default_verify_cert: self.default_verify_cert.clone(),
            endpoints_def_file: self.endpoints_def_file.clone(),
            source_db: env_config.source_db.clone(),
            target_db: env_config.target_db.clone(),
            tables_file: env_config.tables_file.clone(),
            lobs_file: env_config.lobs_file.clone(),
            columns_file: env_config.columns_file.clone(),
            processes,
            poll_interval: Duration::from_secs(poll_interval_secs),
            stop_timeout: self.stop_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// The process entry as the template sees it: the configured keys plus
/// `env`, `trail`, `template` and the effective line budget.
fn process_context(
    env: &str,
    trail: &Value,
    process: &crate::model::ProcessConfig,
    templates: &TemplateSet,
    max_lines: usize,
) -> Result<Value, ConfigError> {
    let mut context = serde_json::to_value(process)
        .map_err(|e| ConfigError::InvalidFile(format!("process {}: {e}", process.process_name)))?;
    if let Value::Object(map) = &mut context {
        map.insert("env".to_string(), json!(env));
        map.insert("trail".to_string(), trail.clone());
        map.insert(
            "template".to_string(),
            json!({
                "process": templates.process,
                "process_tables": templates.process_tables,
            }),
        );
        map.insert(
            "max_number_lines_per_default_tables_prm".to_string(),
            json!(max_lines),
        );
    }
    Ok(context)
}
