//! Document migrations
//!
//! - [`registry`] - named, versioned [`MigrationStep`]s and the stock
//!   [`StatsLayoutStep`]
//! - [`engine`] - single-document and collection-wide migration
//! - [`batch`] - per-document result collection for batches
//!
//! Every migration is a read followed by a full overwrite with no
//! compare-and-swap: a concurrent writer between the two is clobbered.

pub mod batch;
pub mod engine;
pub mod registry;

pub use batch::BatchResult;
pub use engine::{MigrationEngine, MigrationOutcome, MigrationTarget};
pub use registry::{MigrationRegistry, MigrationStep, StatsLayoutStep};
