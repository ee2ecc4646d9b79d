//! Foundation utilities shared by every ggops crate.

pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;
