//! Schema provisioning
//!
//! Typed templates for the four item categories ([`templates`]) and the
//! provisioner that writes them to `utils/schema_*` ([`provisioner`]).

pub mod provisioner;
pub mod templates;

pub use provisioner::{SchemaProvisioner, SeedReport};
pub use templates::{ProgressionTable, ProgressionValue, SchemaTemplate, TemplateKind};
