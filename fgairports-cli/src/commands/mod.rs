//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`build`] - Rebuild the airport digest
//! - [`init`] - Configuration initialization
//! - [`list`] - Airport summaries from the digest
//! - [`show`] - Full detail of one airport
//! - [`status`] - Digest freshness and source files

pub mod build;
pub mod common;
pub mod init;
pub mod list;
pub mod show;
pub mod status;
