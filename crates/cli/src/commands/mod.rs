//! Subcommand implementations

pub mod load;
pub mod providers;
pub mod version;
