use camino::Utf8PathBuf;
use ggops_config::{ProcessType, ResolvedEnvironment, ResolvedProcess};
use ggops_packet::{Block, PackError, PackOutcome, WriteSummary, pack, write_outcome};
use ggops_template::Template;
use ggops_utils::atomic_write::write_file_atomic;
use ggops_utils::error::{ConfigError, GgError};
use ggops_utils::logging::process_span;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::catalog::{ColumnCatalog, ColumnInfo, LobCatalog, TableRef, TablesCatalog};

/// Character columns longer than this need FETCHCOLS.
pub const FETCHCOLS_LENGTH_THRESHOLD: u64 = 4000;

/// LOB data types eligible for FETCHCOLS when listed in the LOB catalog.
pub const LOB_DATATYPES: [&str; 2] = ["CLOB", "BLOB"];

const WIDE_DATATYPES: [&str; 2] = ["RAW", "VARCHAR2"];

/// Rendered output of one process, not yet written.
#[derive(Debug, Clone)]
pub struct ProcessPlan {
    pub process_type: ProcessType,
    pub process_name: String,
    pub prm_file: Utf8PathBuf,
    pub prm_text: String,
    /// Every table prm file of the process, packed or not
    pub table_files: Vec<Utf8PathBuf>,
    pub tables: PackOutcome<Utf8PathBuf>,
}

/// Files written for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProcess {
    pub process_type: ProcessType,
    pub process_name: String,
    pub prm_file: Utf8PathBuf,
    pub tables: WriteSummary,
}

/// Generates the process and tables prm files of one environment.
#[derive(Debug)]
pub struct PrmGenerator<'a> {
    env: &'a ResolvedEnvironment,
    tables: TablesCatalog,
    lobs: LobCatalog,
    columns: Option<ColumnCatalog>,
}

impl<'a> PrmGenerator<'a> {
    /// Load the catalogs referenced by `env`.
    pub fn new(env: &'a ResolvedEnvironment) -> Result<Self, GgError> {
        let tables = TablesCatalog::load(&env.tables_file)?;
        let lobs = LobCatalog::load(&env.lobs_file)?;
        let columns = env
            .columns_file
            .as_deref()
            .map(ColumnCatalog::load)
            .transpose()?;

        info!(
            env = %env.name,
            tables = tables.tables().len(),
            lobs = lobs.len(),
            "Loaded catalogs"
        );
        Ok(Self::from_parts(env, tables, lobs, columns))
    }

    #[must_use]
    pub fn from_parts(
        env: &'a ResolvedEnvironment,
        tables: TablesCatalog,
        lobs: LobCatalog,
        columns: Option<ColumnCatalog>,
    ) -> Self {
        let wants_fetchcols = env
            .processes
            .iter()
            .any(|p| p.process_type == ProcessType::Extract && p.fetchcols);
        if columns.is_none() && wants_fetchcols {
            warn!(
                env = %env.name,
                "No columns_file configured; FETCHCOLS will not be generated"
            );
        }
        Self {
            env,
            tables,
            lobs,
            columns,
        }
    }

    /// Columns of `table` that need FETCHCOLS, in column order.
    #[must_use]
    pub fn fetchcols(&self, table: &TableRef) -> Vec<String> {
        let Some(columns) = &self.columns else {
            return Vec::new();
        };
        columns
            .columns(table)
            .iter()
            .filter(|column| self.needs_fetchcols(table, column))
            .map(|column| column.column_name.clone())
            .collect()
    }

    fn needs_fetchcols(&self, table: &TableRef, column: &ColumnInfo) -> bool {
        let data_type = column.data_type.as_str();
        if WIDE_DATATYPES.contains(&data_type) && column.data_length > FETCHCOLS_LENGTH_THRESHOLD {
            debug!(
                table = %table,
                column = %column.column_name,
                data_type,
                data_length = column.data_length,
                "Column longer than 4000 needs FETCHCOLS"
            );
            return true;
        }
        if LOB_DATATYPES.contains(&data_type)
            && self
                .lobs
                .is_member(&table.owner, &table.table_name, &column.column_name, data_type)
        {
            debug!(
                table = %table,
                column = %column.column_name,
                data_type,
                "LOB column listed in lobs file needs FETCHCOLS"
            );
            return true;
        }
        false
    }

    /// Template data for one table of `process`.
    #[must_use]
    pub fn table_mapping(&self, process: &ResolvedProcess, table: &TableRef) -> Value {
        let mut mapping = json!({
            "source_db": self.env.source_db.dsn,
            "target_db": self.env.target_db.dsn,
            "target_owner": self.env.target_db.owner,
            "source_owner": table.owner,
            "table_name": table.table_name,
        });
        if process.process_type == ProcessType::Extract && process.fetchcols {
            let cols = self.fetchcols(table);
            if !cols.is_empty() {
                mapping["fetchcols"] = json!(format!(",FETCHCOLS({})", cols.join(",")));
            }
        }
        mapping
    }

    /// Render both prm files of `process` and pack the tables prm.
    pub fn plan_process(&self, process: &ResolvedProcess) -> Result<ProcessPlan, GgError> {
        let _span = process_span(&process.env, &process.process_name).entered();

        let table_template = Template::load(&process.templates.process_tables)?;
        let blocks: Vec<Block> = self
            .tables
            .tables()
            .iter()
            .map(|table| Block::new(table_template.render(&self.table_mapping(process, table))))
            .collect();

        let tables = pack(&blocks, &process.table_prm_files, process.max_lines).map_err(
            |err| match err {
                PackError::InvalidMaxLines => GgError::Config(ConfigError::InvalidValue {
                    key: "max_number_lines_per_default_tables_prm".to_string(),
                    value: process.max_lines.to_string(),
                }),
                PackError::InsufficientSlots {
                    partial,
                    available,
                    unplaced_blocks,
                } => GgError::InsufficientSlots {
                    process: process.process_name.clone(),
                    available,
                    assigned: partial.len(),
                    unplaced_blocks,
                },
            },
        )?;
        if let PackOutcome::ExcessiveSlots { unused, .. } = &tables {
            warn!(
                process = %process.process_name,
                unused = unused.len(),
                "There are unused table prm files"
            );
        }

        let process_template = Template::load(&process.templates.process)?;
        let prm_text = process_template.render(&process.context);

        Ok(ProcessPlan {
            process_type: process.process_type,
            process_name: process.process_name.clone(),
            prm_file: process.prm_file.clone(),
            prm_text,
            table_files: process.table_prm_files.clone(),
            tables,
        })
    }

    /// Plan every process of the environment. Fails before anything is
    /// written if any process fails.
    pub fn plan_all(&self) -> Result<Vec<ProcessPlan>, GgError> {
        self.env
            .processes
            .iter()
            .map(|process| self.plan_process(process))
            .collect()
    }

    /// Generate and write the prm files of every process.
    pub fn generate_all(&self) -> Result<Vec<GeneratedProcess>, GgError> {
        let plans = self.plan_all()?;
        plans.into_iter().map(write_plan).collect()
    }
}

/// Write the tables prm files, then the process prm file.
pub fn write_plan(plan: ProcessPlan) -> Result<GeneratedProcess, GgError> {
    let tables = write_outcome(&plan.tables, &plan.table_files).map_err(|e| GgError::WriteFailed {
        path: plan.process_name.clone(),
        reason: format!("{e:#}"),
    })?;
    write_file_atomic(&plan.prm_file, &plan.prm_text).map_err(|e| GgError::WriteFailed {
        path: plan.prm_file.to_string(),
        reason: format!("{e:#}"),
    })?;
    info!(
        process = %plan.process_name,
        prm_file = %plan.prm_file,
        table_files = tables.written.len(),
        "Generated prm files"
    );
    Ok(GeneratedProcess {
        process_type: plan.process_type,
        process_name: plan.process_name,
        prm_file: plan.prm_file,
        tables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use camino::Utf8Path;
    use ggops_config::GgConfig;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        base: Utf8PathBuf,
    }

    impl Fixture {
        fn new() -> Result<Self> {
            let dir = TempDir::new()?;
            let base = Utf8PathBuf::try_from(dir.path().to_path_buf())?;
            fs::write(
                base.join("tables.txt"),
                "# tables\nSALES.ORDERS\nSALES.ITEMS\nHR.EMPLOYEES\n",
            )?;
            fs::write(base.join("lobs.csv"), "owner,table,column\nSALES,ORDERS,NOTES\n")?;
            fs::write(
                base.join("columns.csv"),
                "SALES,ORDERS,ID,NUMBER,22\n\
                 SALES,ORDERS,NOTES,CLOB,4000\n\
                 SALES,ORDERS,PAYLOAD,RAW,8000\n\
                 SALES,ITEMS,DOC,BLOB,4000\n\
                 HR,EMPLOYEES,NAME,VARCHAR2,4000\n",
            )?;
            fs::write(
                base.join("ext_tables.j2"),
                "TABLE {{ source_owner }}.{{ table_name }}{{ fetchcols }};\n",
            )?;
            fs::write(
                base.join("rep_tables.j2"),
                "MAP {{ source_owner }}.{{ table_name }}, TARGET {{ target_owner }}.{{ table_name }};\n",
            )?;
            fs::write(
                base.join("ext.j2"),
                "EXTRACT {{ process_name }}\nEXTTRAIL {{ trail.name }}\n{# tables follow #}INCLUDE {{ env }}\n",
            )?;
            fs::write(base.join("rep.j2"), "REPLICAT {{ process_name }}\n")?;
            Ok(Self { _dir: dir, base })
        }

        fn config(&self, ext_files: &[&str], rep_max: usize) -> Result<GgConfig> {
            let b = &self.base;
            let ext_files: Vec<String> = ext_files.iter().map(|f| b.join(f).to_string()).collect();
            let json = json!({
                "default_templates": {
                    "extract": { "process": b.join("ext.j2"), "process_tables": b.join("ext_tables.j2") },
                    "replicat": { "process": b.join("rep.j2"), "process_tables": b.join("rep_tables.j2") }
                },
                "default_max_number_lines_per_default_tables_prm": 2,
                "dev": {
                    "trail": { "name": "aa" },
                    "source_db": { "dsn": "SRC" },
                    "target_db": { "dsn": "TGT", "owner": "LDZ" },
                    "tables_file": b.join("tables.txt"),
                    "lobs_file": b.join("lobs.csv"),
                    "columns_file": b.join("columns.csv"),
                    "processes": {
                        "extract": { "process_name": "EXT", "prm_file_name": b.join("EXT.prm"),
                                     "prm_table_file_name": ext_files },
                        "replicat": { "process_name": "REP", "prm_file_name": b.join("REP.prm"),
                                      "prm_table_file_name": b.join("REP_T1.prm"),
                                      "max_number_lines_per_default_tables_prm": rep_max }
                    }
                }
            });
            Ok(serde_json::from_value(json)?)
        }

        fn read(&self, name: &str) -> Result<String> {
            Ok(fs::read_to_string(self.base.join(name))?)
        }

        fn exists(&self, name: &str) -> bool {
            Utf8Path::exists(&self.base.join(name))
        }
    }

    #[test]
    fn test_generate_all_writes_every_file() -> Result<()> {
        let fixture = Fixture::new()?;
        let config = fixture.config(&["EXT_T1.prm", "EXT_T2.prm", "EXT_T3.prm"], 10)?;
        let env = config.resolve_environment("dev")?;

        let generated = PrmGenerator::new(&env)?.generate_all()?;
        assert_eq!(generated.len(), 2);
        assert_eq!(generated[0].process_name, "EXT");
        assert_eq!(generated[0].tables.written.len(), 2);
        assert_eq!(generated[0].tables.truncated.len(), 1);

        assert_eq!(
            fixture.read("EXT_T1.prm")?,
            "TABLE SALES.ORDERS,FETCHCOLS(NOTES,PAYLOAD);\nTABLE SALES.ITEMS;"
        );
        assert_eq!(fixture.read("EXT_T2.prm")?, "TABLE HR.EMPLOYEES;");
        assert_eq!(fixture.read("EXT_T3.prm")?, "");
        assert_eq!(fixture.read("EXT.prm")?, "EXTRACT EXT\nEXTTRAIL aa\nINCLUDE dev");

        assert_eq!(
            fixture.read("REP_T1.prm")?,
            "MAP SALES.ORDERS, TARGET LDZ.ORDERS;\nMAP SALES.ITEMS, TARGET LDZ.ITEMS;\nMAP HR.EMPLOYEES, TARGET LDZ.EMPLOYEES;"
        );
        assert_eq!(fixture.read("REP.prm")?, "REPLICAT REP");
        Ok(())
    }

    #[test]
    fn test_empty_tables_catalog_empties_stale_table_files() -> Result<()> {
        let fixture = Fixture::new()?;
        fs::write(fixture.base.join("tables.txt"), "# nothing replicated yet\n")?;
        fs::write(fixture.base.join("EXT_T1.prm"), "TABLE OLD.STALE;\n")?;
        fs::write(fixture.base.join("REP_T1.prm"), "MAP OLD.STALE, TARGET LDZ.STALE;\n")?;
        let config = fixture.config(&["EXT_T1.prm", "EXT_T2.prm"], 10)?;
        let env = config.resolve_environment("dev")?;

        let generated = PrmGenerator::new(&env)?.generate_all()?;
        assert!(generated[0].tables.written.is_empty());
        assert_eq!(
            generated[0].tables.truncated,
            vec![fixture.base.join("EXT_T1.prm"), fixture.base.join("EXT_T2.prm")]
        );
        assert_eq!(fixture.read("EXT_T1.prm")?, "");
        assert_eq!(fixture.read("EXT_T2.prm")?, "");
        assert_eq!(fixture.read("REP_T1.prm")?, "");
        assert_eq!(fixture.read("EXT.prm")?, "EXTRACT EXT\nEXTTRAIL aa\nINCLUDE dev");
        Ok(())
    }

    #[test]
    fn test_insufficient_slots_writes_nothing() -> Result<()> {
        let fixture = Fixture::new()?;
        // replicat needs 3 files at 1 line each but has only one
        let config = fixture.config(&["EXT_T1.prm", "EXT_T2.prm"], 1)?;
        let env = config.resolve_environment("dev")?;

        let err = PrmGenerator::new(&env)?.generate_all().unwrap_err();
        match &err {
            GgError::InsufficientSlots {
                process,
                available,
                assigned,
                unplaced_blocks,
            } => {
                assert_eq!(process, "REP");
                assert_eq!(*available, 1);
                assert_eq!(*assigned, 1);
                assert_eq!(*unplaced_blocks, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_exit_code().as_i32(), 7);

        // the extract plan succeeded but nothing may be written
        assert!(!fixture.exists("EXT_T1.prm"));
        assert!(!fixture.exists("EXT.prm"));
        assert!(!fixture.exists("REP_T1.prm"));
        Ok(())
    }

    #[test]
    fn test_fetchcols_rules() -> Result<()> {
        let fixture = Fixture::new()?;
        let config = fixture.config(&["EXT_T1.prm"], 10)?;
        let env = config.resolve_environment("dev")?;
        let generator = PrmGenerator::new(&env)?;

        let table = |owner: &str, name: &str| TableRef {
            owner: owner.to_string(),
            table_name: name.to_string(),
        };
        assert_eq!(generator.fetchcols(&table("SALES", "ORDERS")), vec!["NOTES", "PAYLOAD"]);
        // BLOB not listed in the lobs file
        assert!(generator.fetchcols(&table("SALES", "ITEMS")).is_empty());
        // VARCHAR2 of exactly 4000 is not wide
        assert!(generator.fetchcols(&table("HR", "EMPLOYEES")).is_empty());

        let rep = env.process(ProcessType::Replicat).unwrap();
        let mapping = generator.table_mapping(rep, &table("SALES", "ORDERS"));
        assert!(mapping.get("fetchcols").is_none());
        assert_eq!(mapping["target_owner"], "LDZ");
        assert_eq!(mapping["source_db"], "SRC");
        assert_eq!(mapping["target_db"], "TGT");
        Ok(())
    }

    #[test]
    fn test_nofetchcols_and_missing_column_catalog() -> Result<()> {
        let fixture = Fixture::new()?;
        let mut config = fixture.config(&["EXT_T1.prm"], 10)?;
        if let Some(env) = config.environments.get_mut("dev") {
            if let Some(ext) = env.processes.get_mut(&ProcessType::Extract) {
                ext.opts.push("nofetchcols".to_string());
            }
        }
        let env = config.resolve_environment("dev")?;
        let generator = PrmGenerator::new(&env)?;
        let ext = env.process(ProcessType::Extract).unwrap();
        let orders = TableRef {
            owner: "SALES".to_string(),
            table_name: "ORDERS".to_string(),
        };
        assert!(generator.table_mapping(ext, &orders).get("fetchcols").is_none());

        let mut config = fixture.config(&["EXT_T1.prm"], 10)?;
        if let Some(env) = config.environments.get_mut("dev") {
            env.columns_file = None;
        }
        let env = config.resolve_environment("dev")?;
        let generator = PrmGenerator::new(&env)?;
        assert!(generator.fetchcols(&orders).is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_template_is_template_error() -> Result<()> {
        let fixture = Fixture::new()?;
        let config = fixture.config(&["EXT_T1.prm"], 10)?;
        let env = config.resolve_environment("dev")?;
        fs::remove_file(fixture.base.join("ext_tables.j2"))?;

        let err = PrmGenerator::new(&env)?.plan_all().unwrap_err();
        assert!(matches!(err, GgError::Template(_)));
        assert_eq!(err.to_exit_code().as_i32(), 2);
        Ok(())
    }
}
