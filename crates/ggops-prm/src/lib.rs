//! Parameter file generation.
//!
//! For every process of an environment the process template is rendered with
//! the process settings, and the tables template is rendered once per table
//! of the tables catalog. The table blocks are packed into the process's
//! table prm files under its line budget.

pub mod catalog;
mod generator;

pub use catalog::{ColumnCatalog, ColumnInfo, LobCatalog, TableRef, TablesCatalog};
pub use generator::{
    FETCHCOLS_LENGTH_THRESHOLD, GeneratedProcess, LOB_DATATYPES, PrmGenerator, ProcessPlan,
    write_plan,
};
