//! ggops - GoldenGate parameter file tooling
//!
//! ggops renders Oracle GoldenGate extract and replicat parameter (prm)
//! files from templates, packs the per-table sections into a fixed set of
//! table prm files under a line budget, and deploys them through the
//! GoldenGate Microservices REST API.
//!
//! # Crates
//!
//! - [`packet`]: bounded-capacity packing of rendered blocks into slots
//! - [`template`]: `{{ path }}` templates
//! - [`config`]: configuration model, defaults and validation
//! - [`prm`]: catalogs and prm file generation
//! - [`client`]: REST control plane client
//! - [`deploy`]: stop, upload and restart workflow
//!
//! # Example
//!
//! ```rust,no_run
//! use ggops::packet::{Block, pack};
//!
//! let blocks = vec![Block::from("TABLE A.B;"), Block::from("TABLE A.C;")];
//! let outcome = pack(&blocks, &["T1.prm", "T2.prm"], 1).unwrap();
//! assert_eq!(outcome.packed().len(), 2);
//! ```

pub mod cli;

pub use ggops_client as client;
pub use ggops_config as config;
pub use ggops_deploy as deploy;
pub use ggops_packet as packet;
pub use ggops_prm as prm;
pub use ggops_template as template;
pub use ggops_utils as utils;

pub use ggops_utils::error::{GgError, UserFriendlyError};
pub use ggops_utils::exit_codes::ExitCode;
