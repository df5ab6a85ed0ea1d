//! Installer configuration
//!
//! Per package type, keeper.toml may supply:
//! - an install path template (`[custom-installer]`)
//! - a list of preserved sub-paths (`[merge-exclusions]`)
//!
//! A type with neither is installed the plain way under the vendor directory.

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_keeper_toml, parse_keeper_toml_str};
pub use paths::CONFIG_FILE_NAME;
pub use schema::{InstallerConfig, InstallerSettings};
pub use store::ConfigStore;
