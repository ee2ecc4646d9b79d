use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Default seconds between two status polls while stopping a process
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Kind of GoldenGate replication process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Extract,
    Replicat,
}

impl ProcessType {
    /// Deployment order: extract before replicat.
    pub const ALL: [ProcessType; 2] = [ProcessType::Extract, ProcessType::Replicat];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Replicat => "replicat",
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value.clone()],
            Self::Many(values) => values.clone(),
        }
    }
}

/// TLS server certificate verification setting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum VerifyCert {
    /// Verify against system roots (`true`) or not at all (`false`)
    Enabled(bool),
    /// Verify against the CA bundle at this path
    CaBundle(Utf8PathBuf),
}

impl Default for VerifyCert {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

impl FromStr for VerifyCert {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Self::Enabled(true),
            "false" | "no" | "0" => Self::Enabled(false),
            _ => Self::CaBundle(Utf8PathBuf::from(s)),
        })
    }
}

/// Templates used to render one process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TemplateSet {
    /// Template of the process prm file
    pub process: Utf8PathBuf,
    /// Template rendered once per table
    pub process_tables: Utf8PathBuf,
}

/// A GoldenGate Microservices admin endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointConfig {
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub verify_cert: Option<VerifyCert>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SourceDbConfig {
    pub dsn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TargetDbConfig {
    pub dsn: String,
    pub owner: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Process entry as written in the configuration file.
///
/// Keys not modelled here are kept in `extra` and handed to the process
/// template unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProcessConfig {
    pub process_name: String,
    pub prm_file_name: Utf8PathBuf,
    pub prm_table_file_name: OneOrMany<Utf8PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_number_lines_per_default_tables_prm: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opts: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One deployment environment (dev, test, prod, ...).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    #[serde(default)]
    pub gg_endpoint: Option<String>,
    #[serde(default)]
    pub trail: Value,
    pub source_db: SourceDbConfig,
    pub target_db: TargetDbConfig,
    pub tables_file: Utf8PathBuf,
    pub lobs_file: Utf8PathBuf,
    #[serde(default)]
    pub columns_file: Option<Utf8PathBuf>,
    pub processes: BTreeMap<ProcessType, ProcessConfig>,
}

/// Whole configuration file.
///
/// Every top-level key that is not one of the global keys below is an
/// environment.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GgConfig {
    #[serde(default)]
    pub default_templates: BTreeMap<ProcessType, TemplateSet>,
    #[serde(default)]
    pub default_max_number_lines_per_default_tables_prm: Option<usize>,
    #[serde(default)]
    pub default_verify_cert: Option<VerifyCert>,
    #[serde(default)]
    pub endpoints_def_file: Option<Utf8PathBuf>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub stop_timeout_secs: Option<u64>,
    #[serde(default)]
    pub gg_endpoints: BTreeMap<String, EndpointConfig>,
    #[serde(flatten)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<String> = serde_json::from_str(r#""T1.prm""#).unwrap();
        assert_eq!(one.to_vec(), vec!["T1.prm".to_string()]);

        let many: OneOrMany<String> = serde_json::from_str(r#"["T1.prm","T2.prm"]"#).unwrap();
        assert_eq!(many.to_vec().len(), 2);
    }

    #[test]
    fn test_verify_cert_forms() {
        let flag: VerifyCert = serde_json::from_str("true").unwrap();
        assert_eq!(flag, VerifyCert::Enabled(true));

        let bundle: VerifyCert = serde_json::from_str(r#""certs/ca.pem""#).unwrap();
        assert_eq!(bundle, VerifyCert::CaBundle(Utf8PathBuf::from("certs/ca.pem")));

        assert_eq!("False".parse::<VerifyCert>().unwrap(), VerifyCert::Enabled(false));
        assert_eq!(
            "ca.pem".parse::<VerifyCert>().unwrap(),
            VerifyCert::CaBundle(Utf8PathBuf::from("ca.pem"))
        );
    }

    #[test]
    fn test_process_extra_keys_are_kept() {
        let process: ProcessConfig = serde_json::from_str(
            r#"{"process_name":"EXT","prm_file_name":"EXT.prm",
                "prm_table_file_name":"EXT_T.prm","discard_file":"ext.dsc"}"#,
        )
        .unwrap();
        assert_eq!(process.extra["discard_file"], "ext.dsc");
        assert!(process.template.is_none());
        assert!(process.opts.is_empty());
    }
}
