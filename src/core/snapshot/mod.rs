//! Snapshot export
//!
//! [`SnapshotExporter`] walks every collection of the store into a
//! [`Snapshot`], encodes it as indented JSON and writes it to an artifact sink
//! under a timestamped name. One configured collection is private: only its
//! designated document is exported.

pub mod encoder;
pub mod exporter;

pub use encoder::{checksum, format_timestamp};
pub use exporter::{backup_file_name, ExportReport, Snapshot, SnapshotExporter};
