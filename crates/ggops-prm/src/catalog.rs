//! Table, LOB and column catalogs read from plain text files.

use camino::Utf8Path;
use ggops_utils::error::CatalogError;
use std::collections::{HashMap, HashSet};

/// A replicated table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub owner: String,
    pub table_name: String,
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.owner, self.table_name)
    }
}

/// Non-blank, non-comment lines with their 1-based line numbers.
fn data_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn read(path: &Utf8Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.as_std_path().to_path_buf(),
        source,
    })
}

fn malformed(path: &Utf8Path, line: usize, reason: impl Into<String>) -> CatalogError {
    CatalogError::Malformed {
        path: path.as_std_path().to_path_buf(),
        line,
        reason: reason.into(),
    }
}

fn csv_fields(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn is_header(fields: &[&str]) -> bool {
    fields
        .first()
        .is_some_and(|first| first.eq_ignore_ascii_case("owner"))
}

/// Tables to replicate, one `OWNER.TABLE` or `OWNER,TABLE` per line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablesCatalog {
    tables: Vec<TableRef>,
}

impl TablesCatalog {
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        Self::parse(path, &read(path)?)
    }

    pub fn parse(path: &Utf8Path, content: &str) -> Result<Self, CatalogError> {
        let mut tables = Vec::new();
        for (line_no, line) in data_lines(content) {
            let Some((owner, table_name)) = line.split_once(['.', ',']) else {
                return Err(malformed(path, line_no, format!("expected OWNER.TABLE, got '{line}'")));
            };
            let (owner, table_name) = (owner.trim(), table_name.trim());
            if owner.is_empty() || table_name.is_empty() || table_name.contains(['.', ',']) {
                return Err(malformed(path, line_no, format!("expected OWNER.TABLE, got '{line}'")));
            }
            tables.push(TableRef {
                owner: owner.to_uppercase(),
                table_name: table_name.to_uppercase(),
            });
        }
        Ok(Self { tables })
    }

    #[must_use]
    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LobKey {
    owner: String,
    table_name: String,
    column_name: String,
}

/// LOB columns that must be fetched, as `owner,table,column[,data_type]`.
#[derive(Debug, Clone, Default)]
pub struct LobCatalog {
    entries: HashMap<LobKey, Option<String>>,
}

impl LobCatalog {
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        Self::parse(path, &read(path)?)
    }

    pub fn parse(path: &Utf8Path, content: &str) -> Result<Self, CatalogError> {
        let mut entries = HashMap::new();
        for (index, (line_no, line)) in data_lines(content).enumerate() {
            let fields = csv_fields(line);
            if index == 0 && is_header(&fields) {
                continue;
            }
            if !(3..=4).contains(&fields.len()) || fields[..3].iter().any(|f| f.is_empty()) {
                return Err(malformed(
                    path,
                    line_no,
                    "expected owner,table,column[,data_type]",
                ));
            }
            let key = LobKey {
                owner: fields[0].to_uppercase(),
                table_name: fields[1].to_uppercase(),
                column_name: fields[2].to_uppercase(),
            };
            let data_type = fields
                .get(3)
                .filter(|t| !t.is_empty())
                .map(|t| t.to_uppercase());
            entries.insert(key, data_type);
        }
        Ok(Self { entries })
    }

    /// Whether the column is listed. The data type is compared only when
    /// the listed entry carries one.
    #[must_use]
    pub fn is_member(&self, owner: &str, table_name: &str, column_name: &str, data_type: &str) -> bool {
        let key = LobKey {
            owner: owner.to_uppercase(),
            table_name: table_name.to_uppercase(),
            column_name: column_name.to_uppercase(),
        };
        match self.entries.get(&key) {
            Some(Some(listed)) => listed.eq_ignore_ascii_case(data_type),
            Some(None) => true,
            None => false,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Column definition of a source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub data_length: u64,
}

/// Source column definitions exported as
/// `owner,table,column,data_type,data_length`.
#[derive(Debug, Clone, Default)]
pub struct ColumnCatalog {
    by_table: HashMap<(String, String), Vec<ColumnInfo>>,
}

impl ColumnCatalog {
    pub fn load(path: &Utf8Path) -> Result<Self, CatalogError> {
        Self::parse(path, &read(path)?)
    }

    pub fn parse(path: &Utf8Path, content: &str) -> Result<Self, CatalogError> {
        let mut by_table: HashMap<(String, String), Vec<ColumnInfo>> = HashMap::new();
        let mut seen = HashSet::new();
        for (index, (line_no, line)) in data_lines(content).enumerate() {
            let fields = csv_fields(line);
            if index == 0 && is_header(&fields) {
                continue;
            }
            if fields.len() != 5 {
                return Err(malformed(
                    path,
                    line_no,
                    "expected owner,table,column,data_type,data_length",
                ));
            }
            let data_length = fields[4].parse::<u64>().map_err(|_| {
                malformed(path, line_no, format!("data_length '{}' is not a number", fields[4]))
            })?;
            let owner = fields[0].to_uppercase();
            let table_name = fields[1].to_uppercase();
            let column_name = fields[2].to_uppercase();
            if !seen.insert((owner.clone(), table_name.clone(), column_name.clone())) {
                return Err(malformed(
                    path,
                    line_no,
                    format!("duplicate column {owner}.{table_name}.{column_name}"),
                ));
            }
            by_table
                .entry((owner, table_name))
                .or_default()
                .push(ColumnInfo {
                    column_name,
                    data_type: fields[3].to_uppercase(),
                    data_length,
                });
        }
        Ok(Self { by_table })
    }

    /// Columns of the table in file order; empty when the table is unknown.
    #[must_use]
    pub fn columns(&self, table: &TableRef) -> &[ColumnInfo] {
        self.by_table
            .get(&(table.owner.clone(), table.table_name.clone()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Utf8Path {
        Utf8Path::new("fixture.txt")
    }

    #[test]
    fn test_tables_catalog() {
        let catalog = TablesCatalog::parse(
            path(),
            "# replicated tables\nsales.orders\n\n  HR,Employees  \n",
        )
        .unwrap();
        let names: Vec<String> = catalog.tables().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["SALES.ORDERS", "HR.EMPLOYEES"]);
    }

    #[test]
    fn test_tables_catalog_rejects_bad_line() {
        let err = TablesCatalog::parse(path(), "SALES.ORDERS\nORDERS\n").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { line: 2, .. }));

        let err = TablesCatalog::parse(path(), "A.B.C\n").unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_lob_membership() {
        let lobs = LobCatalog::parse(
            path(),
            "owner,table,column,data_type\nsales,orders,notes,CLOB\nSALES,ORDERS,SCAN\n",
        )
        .unwrap();
        assert_eq!(lobs.len(), 2);
        assert!(lobs.is_member("SALES", "ORDERS", "NOTES", "clob"));
        assert!(!lobs.is_member("SALES", "ORDERS", "NOTES", "BLOB"));
        assert!(lobs.is_member("sales", "orders", "scan", "BLOB"));
        assert!(!lobs.is_member("SALES", "ORDERS", "OTHER", "CLOB"));
    }

    #[test]
    fn test_column_catalog() {
        let columns = ColumnCatalog::parse(
            path(),
            "OWNER,TABLE_NAME,COLUMN_NAME,DATA_TYPE,DATA_LENGTH\nSALES,ORDERS,ID,NUMBER,22\nSALES,ORDERS,NOTES,CLOB,4000\n",
        )
        .unwrap();
        let table = TableRef {
            owner: "SALES".to_string(),
            table_name: "ORDERS".to_string(),
        };
        assert_eq!(columns.columns(&table).len(), 2);
        assert_eq!(columns.columns(&table)[1].data_type, "CLOB");

        let unknown = TableRef {
            owner: "HR".to_string(),
            table_name: "X".to_string(),
        };
        assert!(columns.columns(&unknown).is_empty());
    }

    #[test]
    fn test_column_catalog_errors() {
        let err = ColumnCatalog::parse(path(), "SALES,ORDERS,ID,NUMBER,big\n").unwrap_err();
        assert!(err.to_string().contains("not a number"));

        let err = ColumnCatalog::parse(
            path(),
            "SALES,ORDERS,ID,NUMBER,22\nSALES,ORDERS,ID,NUMBER,22\n",
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { line: 2, .. }));
    }
}
