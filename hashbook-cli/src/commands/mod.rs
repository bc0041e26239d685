//! CLI command implementations.

pub mod build;
pub mod init;
pub mod verify;

pub use build::{build_site, BuildOverrides};
pub use init::init_project;
pub use verify::verify_site;
