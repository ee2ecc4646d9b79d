//! CLI command implementations
//!
//! Each `execute_*` function handles one subcommand and prints its result to
//! stdout. Errors are returned to `run()` for reporting.

use camino::{Utf8Path, Utf8PathBuf};
use ggops_client::{
    CommandRegistry, ConnectionOverrides, ControlPlane, RestControlPlane, request_body,
};
use ggops_config::{GgConfig, ResolvedEnvironment};
use ggops_deploy::{Deployer, UploadKind};
use ggops_prm::{GeneratedProcess, PrmGenerator};
use tracing::info;

use crate::GgError;

fn load_environment(config: &Utf8Path, env: &str) -> Result<ResolvedEnvironment, GgError> {
    let config = GgConfig::load(config)?;
    Ok(config.resolve_environment(env)?)
}

fn print_generated(generated: &[GeneratedProcess]) {
    for process in generated {
        println!(
            "✓ {} {}: {} ({} table file(s) written, {} emptied)",
            process.process_type,
            process.process_name,
            process.prm_file,
            process.tables.written.len(),
            process.tables.truncated.len(),
        );
    }
}

// ============================================================================
// gen-prms
// ============================================================================

pub fn execute_gen_prms(config: &Utf8Path, env: &str) -> Result<(), GgError> {
    let environment = load_environment(config, env)?;
    let generated = PrmGenerator::new(&environment)?.generate_all()?;
    info!(env, processes = generated.len(), "Generated prm files");
    print_generated(&generated);
    Ok(())
}

// ============================================================================
// deploy-prms
// ============================================================================

pub async fn execute_deploy_prms(
    config: &Utf8Path,
    env: &str,
    force: bool,
    password: Option<String>,
) -> Result<(), GgError> {
    let environment = load_environment(config, env)?;
    let overrides = ConnectionOverrides {
        password,
        ..ConnectionOverrides::default()
    };
    let control_plane = RestControlPlane::for_environment(&environment, &overrides)?;

    let report = Deployer::new(&control_plane, &environment)
        .deploy_prms(&environment, force)
        .await?;

    print_generated(&report.generated);
    for upload in &report.uploads {
        let verb = match upload.kind {
            UploadKind::Create => "created",
            UploadKind::Replace => "replaced",
        };
        println!("✓ {} {verb}", upload.remote_name);
    }
    for process in &report.restarted {
        println!("✓ {process} restarted");
    }
    Ok(())
}

// ============================================================================
// gg
// ============================================================================

/// One REST call as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct GgRequest {
    pub command: String,
    pub command_arg: Option<String>,
    pub command_arg_fn: Option<Utf8PathBuf>,
    pub command_args_json: Option<String>,
}

pub async fn execute_gg(
    config: &Utf8Path,
    env: &str,
    request: GgRequest,
    overrides: ConnectionOverrides,
) -> Result<(), GgError> {
    let environment = load_environment(config, env)?;
    let body = request_body(
        request.command_args_json.as_deref(),
        request.command_arg_fn.as_deref(),
    )?;
    let control_plane = RestControlPlane::for_environment(&environment, &overrides)?;

    let response = control_plane
        .call(&request.command, request.command_arg.as_deref(), body.as_ref())
        .await?;
    let pretty = serde_json::to_string_pretty(&response).unwrap_or_else(|_| response.to_string());
    println!("{pretty}");
    Ok(())
}

// ============================================================================
// commands
// ============================================================================

pub fn execute_list_commands(config: Option<&Utf8Path>) -> Result<(), GgError> {
    let definitions = match config {
        Some(path) => GgConfig::load(path)?.endpoints_def_file,
        None => None,
    };
    let registry = match definitions {
        Some(path) => CommandRegistry::with_file(&path)?,
        None => CommandRegistry::builtin(),
    };

    let width = registry.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, def) in registry.iter() {
        println!("{name:<width$}  {:<6}  {}", def.op.to_string(), def.url_suffix);
    }
    Ok(())
}
