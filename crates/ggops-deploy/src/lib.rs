//! Deployment of generated parameter files.
//!
//! [`Deployer::deploy_prms`] regenerates the prm files of an environment,
//! stops the processes that exist on the endpoint, uploads every file and
//! starts the stopped processes again. Extracts always go before replicats.

mod deployer;

pub use deployer::{DeployReport, Deployer, FileUpload, ProcessCommands, UploadKind};
