use camino::{Utf8Path, Utf8PathBuf};
use ggops_client::{ControlPlane, lines_body};
use ggops_config::{ProcessType, ResolvedEnvironment, ResolvedProcess};
use ggops_prm::{GeneratedProcess, PrmGenerator};
use ggops_utils::error::{ControlPlaneError, GgError};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Process states in which a stop is considered complete
const STOPPED_STATES: [&str; 2] = ["stopped", "abended"];

/// Control plane command names for one process type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessCommands {
    pub list: &'static str,
    pub issue_command: &'static str,
    pub retrieve_status: &'static str,
}

impl ProcessCommands {
    #[must_use]
    pub const fn for_type(process_type: ProcessType) -> Self {
        match process_type {
            ProcessType::Extract => Self {
                list: "list_extracts",
                issue_command: "extract_issue_command",
                retrieve_status: "extract_retrieve_status",
            },
            ProcessType::Replicat => Self {
                list: "list_replicats",
                issue_command: "replicat_issue_command",
                retrieve_status: "replicat_retrieve_status",
            },
        }
    }
}

/// Whether a file was created or replaced on the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Create,
    Replace,
}

impl UploadKind {
    const fn command(self) -> &'static str {
        match self {
            Self::Create => "create_configuration_file",
            Self::Replace => "replace_configuration_file",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub local: Utf8PathBuf,
    pub remote_name: String,
    pub kind: UploadKind,
}

/// Result of a full deployment.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub generated: Vec<GeneratedProcess>,
    /// Processes that existed and were stopped, then started again
    pub restarted: Vec<String>,
    pub uploads: Vec<FileUpload>,
}

/// Drives processes and configuration files through a [`ControlPlane`].
pub struct Deployer<'a, C: ControlPlane + ?Sized> {
    control_plane: &'a C,
    poll_interval: Duration,
    stop_timeout: Option<Duration>,
}

impl<'a, C: ControlPlane + ?Sized> Deployer<'a, C> {
    /// Deployer using the environment's poll interval and stop timeout.
    pub fn new(control_plane: &'a C, env: &ResolvedEnvironment) -> Self {
        Self::with_timing(control_plane, env.poll_interval, env.stop_timeout)
    }

    pub fn with_timing(
        control_plane: &'a C,
        poll_interval: Duration,
        stop_timeout: Option<Duration>,
    ) -> Self {
        Self {
            control_plane,
            poll_interval,
            stop_timeout,
        }
    }

    /// Whether the endpoint knows a process of this name and type.
    pub async fn process_exists(&self, process: &ResolvedProcess) -> Result<bool, GgError> {
        let command = ProcessCommands::for_type(process.process_type).list;
        let response = self.control_plane.call(command, None, None).await?;
        let names = item_names(command, &response)?;
        let exists = names.iter().any(|name| name == &process.process_name);
        debug!(process = %process.process_name, exists, "Checked process existence");
        Ok(exists)
    }

    /// Stop the process and wait until it reports `stopped` or `abended`.
    pub async fn stop_process(&self, process: &ResolvedProcess, force: bool) -> Result<(), GgError> {
        let commands = ProcessCommands::for_type(process.process_type);
        let name = process.process_name.as_str();
        let stop = if force { "FORCESTOP" } else { "STOP" };

        info!(process = name, command = stop, "Stopping process");
        self.control_plane
            .call(commands.issue_command, Some(name), Some(&json!({ "command": stop })))
            .await?;

        let started = Instant::now();
        let wait = self.wait_until_stopped(commands.retrieve_status, name);
        match self.stop_timeout {
            Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
                GgError::ProcessStopTimeout {
                    process: name.to_string(),
                    waited_secs: started.elapsed().as_secs(),
                }
            })??,
            None => wait.await?,
        }
        info!(process = name, "Process stopped");
        Ok(())
    }

    async fn wait_until_stopped(&self, status_command: &str, name: &str) -> Result<(), GgError> {
        loop {
            let response = self
                .control_plane
                .call(status_command, Some(name), None)
                .await?;
            let status = response
                .pointer("/response/status")
                .and_then(Value::as_str)
                .ok_or_else(|| ControlPlaneError::UnexpectedResponse {
                    command: status_command.to_string(),
                    reason: "missing response.status".to_string(),
                })?;
            if STOPPED_STATES.contains(&status) {
                return Ok(());
            }
            debug!(process = name, status, "Waiting for process to stop");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    pub async fn start_process(&self, process: &ResolvedProcess) -> Result<(), GgError> {
        info!(process = %process.process_name, "Starting process");
        let body = json!({
            "name": "start",
            "processName": process.process_name,
            "processType": process.process_type.as_str(),
        });
        self.control_plane
            .call("execute_command", None, Some(&body))
            .await?;
        Ok(())
    }

    /// Upload local files, replacing remote files of the same name and
    /// creating the others.
    pub async fn deploy_config_files(
        &self,
        files: &[Utf8PathBuf],
    ) -> Result<Vec<FileUpload>, GgError> {
        let command = "list_config_files";
        let response = self.control_plane.call(command, None, None).await?;
        let remote: BTreeSet<String> = item_names(command, &response)?.into_iter().collect();

        let mut uploads = Vec::with_capacity(files.len());
        for local in files {
            let remote_name = remote_file_name(local)?;
            let kind = if remote.contains(&remote_name) {
                UploadKind::Replace
            } else {
                UploadKind::Create
            };
            let content = std::fs::read_to_string(local)?;

            info!(file = %local, remote = %remote_name, command = kind.command(), "Uploading file");
            self.control_plane
                .call(kind.command(), Some(&remote_name), Some(&lines_body(&content)))
                .await?;

            uploads.push(FileUpload {
                local: local.clone(),
                remote_name,
                kind,
            });
        }
        Ok(uploads)
    }

    /// Generate, stop, upload and restart.
    ///
    /// Generation failures abort before any remote call. Processes stopped
    /// before a later failure are left stopped.
    pub async fn deploy_prms(
        &self,
        env: &ResolvedEnvironment,
        force: bool,
    ) -> Result<DeployReport, GgError> {
        let generated = PrmGenerator::new(env)?.generate_all()?;

        let processes: Vec<&ResolvedProcess> = ProcessType::ALL
            .iter()
            .filter_map(|pt| env.process(*pt))
            .collect();

        let mut existing = Vec::new();
        for process in &processes {
            if self.process_exists(process).await? {
                existing.push(*process);
            } else {
                warn!(process = %process.process_name, "Process not found on endpoint, it will not be restarted");
            }
        }

        for process in &existing {
            self.stop_process(process, force).await?;
        }

        let files: Vec<Utf8PathBuf> = processes
            .iter()
            .flat_map(|process| process.deploy_files())
            .collect();
        let uploads = self.deploy_config_files(&files).await?;

        for process in &existing {
            self.start_process(process).await?;
        }

        Ok(DeployReport {
            generated,
            restarted: existing.iter().map(|p| p.process_name.clone()).collect(),
            uploads,
        })
    }
}

fn item_names(command: &str, response: &Value) -> Result<Vec<String>, ControlPlaneError> {
    let items = response
        .pointer("/response/items")
        .and_then(Value::as_array)
        .ok_or_else(|| ControlPlaneError::UnexpectedResponse {
            command: command.to_string(),
            reason: "missing response.items".to_string(),
        })?;
    Ok(items
        .iter()
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

fn remote_file_name(local: &Utf8Path) -> Result<String, GgError> {
    local
        .file_name()
        .map(str::to_string)
        .ok_or_else(|| GgError::WriteFailed {
            path: local.to_string(),
            reason: "path has no file name".to_string(),
        })
}
