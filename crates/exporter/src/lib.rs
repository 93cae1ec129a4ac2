//! Configuration export
//!
//! Writes a merged configuration to `.env`, JSON or YAML files addressed as
//! `format:path`.

pub mod format;
pub mod multi;
pub mod traits;

pub use format::{supported_formats, ExportFormat};
pub use multi::MultiFormatExporter;
pub use traits::{ConfigMap, Exporter};
