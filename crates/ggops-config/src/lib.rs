//! Configuration management for ggops
//!
//! A single JSON file (TOML when the extension is `.toml`) holds global
//! defaults, the GoldenGate endpoints and one object per environment.
//! [`GgConfig::resolve_environment`] applies the defaults to one environment
//! and validates it.

mod model;
mod resolve;

pub use model::*;
pub use resolve::{OPT_NO_FETCHCOLS, ResolvedEnvironment, ResolvedProcess};

use camino::Utf8Path;
use ggops_utils::error::ConfigError;
use tracing::debug;

impl GgConfig {
    /// Load a configuration file, choosing the parser by extension.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidFile(format!("{path}: {e}")))?;

        let config = if path.extension() == Some("toml") {
            Self::from_toml_str(&content)
        } else {
            Self::from_json_str(&content)
        }
        .map_err(|e| match e {
            ConfigError::InvalidFile(reason) => ConfigError::InvalidFile(format!("{path}: {reason}")),
            other => other,
        })?;

        debug!(
            config = %path,
            environments = config.environments.len(),
            endpoints = config.gg_endpoints.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::InvalidFile(e.to_string()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::InvalidFile(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use camino::Utf8PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "default_templates": {
            "extract":  { "process": "tpl/ext.prm.j2", "process_tables": "tpl/ext_tables.prm.j2" },
            "replicat": { "process": "tpl/rep.prm.j2", "process_tables": "tpl/rep_tables.prm.j2" }
        },
        "default_max_number_lines_per_default_tables_prm": 1000,
        "default_verify_cert": false,
        "gg_endpoints": {
            "ogg_prod": { "url": "https://ogg:443/", "user": "ggadmin", "verify_cert": "ca.pem" }
        },
        "prod": {
            "gg_endpoint": "ogg_prod",
            "trail": { "name": "aa" },
            "source_db": { "dsn": "SRC", "user": "ggadmin" },
            "target_db": { "dsn": "TGT", "owner": "LDZ" },
            "tables_file": "tables.txt",
            "lobs_file": "lobs.csv",
            "processes": {
                "replicat": { "process_name": "REP", "prm_file_name": "REP.prm",
                              "prm_table_file_name": "REP_T1.prm", "opts": ["nofetchcols"],
                              "max_number_lines_per_default_tables_prm": 50 },
                "extract":  { "process_name": "EXT", "prm_file_name": "EXT.prm",
                              "prm_table_file_name": ["EXT_T1.prm", "EXT_T2.prm"],
                              "exttrail_size": 500 }
            }
        }
    }"#;

    #[test]
    fn test_resolve_applies_defaults() -> Result<()> {
        let config = GgConfig::from_json_str(SAMPLE)?;
        assert_eq!(config.environment_names(), vec!["prod".to_string()]);

        let env = config.resolve_environment("prod")?;
        assert_eq!(env.processes.len(), 2);
        assert_eq!(env.poll_interval, Duration::from_secs(10));
        assert!(env.stop_timeout.is_none());

        let ext = &env.processes[0];
        assert_eq!(ext.process_type, ProcessType::Extract);
        assert_eq!(ext.max_lines, 1000);
        assert!(ext.fetchcols);
        assert_eq!(ext.templates.process, Utf8PathBuf::from("tpl/ext.prm.j2"));
        assert_eq!(ext.table_prm_files.len(), 2);
        assert_eq!(ext.context["env"], "prod");
        assert_eq!(ext.context["trail"]["name"], "aa");
        assert_eq!(ext.context["exttrail_size"], 500);
        assert_eq!(ext.context["template"]["process_tables"], "tpl/ext_tables.prm.j2");
        assert_eq!(ext.context["max_number_lines_per_default_tables_prm"], 1000);

        let rep = env.process(ProcessType::Replicat).unwrap();
        assert_eq!(rep.max_lines, 50);
        assert!(!rep.fetchcols);
        assert_eq!(
            rep.deploy_files(),
            vec![Utf8PathBuf::from("REP_T1.prm"), Utf8PathBuf::from("REP.prm")]
        );

        let (name, endpoint) = env.require_endpoint()?;
        assert_eq!(name, "ogg_prod");
        assert_eq!(endpoint.verify_cert, Some(VerifyCert::CaBundle("ca.pem".into())));
        Ok(())
    }

    #[test]
    fn test_unknown_environment() -> Result<()> {
        let config = GgConfig::from_json_str(SAMPLE)?;
        let err = config.resolve_environment("qa").unwrap_err();
        match err {
            ConfigError::UnknownEnvironment { env, available } => {
                assert_eq!(env, "qa");
                assert_eq!(available, vec!["prod".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn test_validation_collects_all_problems() -> Result<()> {
        let mut config = GgConfig::from_json_str(SAMPLE)?;
        config.default_templates.clear();
        config.default_max_number_lines_per_default_tables_prm = Some(0);
        config.poll_interval_secs = Some(0);
        if let Some(env) = config.environments.get_mut("prod") {
            env.gg_endpoint = Some("missing".to_string());
        }

        let err = config.resolve_environment("prod").unwrap_err();
        let ConfigError::ValidationFailed { errors, error_count } = err else {
            panic!("expected ValidationFailed");
        };
        assert_eq!(error_count, errors.len());
        assert!(errors.iter().any(|e| e.contains("'missing' is not defined")));
        assert!(errors.iter().any(|e| e.contains("poll_interval_secs")));
        assert!(errors.iter().any(|e| e.contains("prod.processes.extract: no template")));
        assert!(errors.iter().any(|e| e.contains("must be greater than 0")));
        Ok(())
    }

    #[test]
    fn test_load_by_extension() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf())?;

        let json_path = base.join("ggops.json");
        std::fs::write(&json_path, SAMPLE)?;
        assert!(GgConfig::load(&json_path)?.environments.contains_key("prod"));

        let toml_path = base.join("ggops.toml");
        std::fs::write(
            &toml_path,
            r#"
default_max_number_lines_per_default_tables_prm = 10

[dev]
tables_file = "tables.txt"
lobs_file = "lobs.csv"

[dev.source_db]
dsn = "SRC"

[dev.target_db]
dsn = "TGT"
owner = "LDZ"

[dev.processes.extract]
process_name = "EXT"
prm_file_name = "EXT.prm"
prm_table_file_name = "EXT_T.prm"
template = { process = "a.j2", process_tables = "b.j2" }
"#,
        )?;
        let config = GgConfig::load(&toml_path)?;
        let env = config.resolve_environment("dev")?;
        assert_eq!(env.processes[0].max_lines, 10);
        assert!(env.require_endpoint().is_err());
        Ok(())
    }

    #[test]
    fn test_load_errors() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf())?;

        let missing = GgConfig::load(&base.join("nope.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::NotFound { .. }));

        let broken = base.join("broken.json");
        std::fs::write(&broken, "{ not json")?;
        let err = GgConfig::load(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFile(ref msg) if msg.contains("broken.json")));
        Ok(())
    }
}
