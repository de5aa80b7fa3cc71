//! Migration steps and their registry
//!
//! A [`MigrationStep`] is a named, versioned structural transformation of a
//! document. The [`MigrationRegistry`] runs every applicable step in
//! registration order.

use crate::domain::{FieldValue, Fields};

/// A single document transformation
pub trait MigrationStep: Send + Sync {
    /// Stable step name, reported in migration outcomes
    fn name(&self) -> &'static str;

    /// Layout version the step migrates documents to
    fn version(&self) -> u32;

    /// Whether the step has anything to do for `fields`
    fn applies(&self, fields: &Fields) -> bool;

    /// Transform `fields` in place
    ///
    /// Only called when [`applies`](MigrationStep::applies) returned `true`.
    fn apply(&self, fields: &mut Fields);
}

/// Replaces the legacy `stats` subtree with the point/token layout
///
/// The new subtree holds exactly nine keys. Five are carried from the old
/// subtree when present and non-null; the four counters are reset. Anything
/// else under `stats` is dropped, and fields outside `stats` are untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct StatsLayoutStep;

impl StatsLayoutStep {
    /// Field holding the stat subtree
    pub const FIELD: &'static str = "stats";

    /// Carried keys and their defaults
    pub const CARRIED: [(&'static str, i64); 5] = [
        ("level", 1),
        ("hpTotal", 0),
        ("hpCurrent", 0),
        ("manaTotal", 0),
        ("manaCurrent", 0),
    ];

    /// Counters written with fixed values
    pub const RESET: [(&'static str, i64); 4] = [
        ("basePointsAvailable", 4),
        ("basePointsSpent", 0),
        ("combatTokensAvailable", 50),
        ("combatTokensSpent", 0),
    ];
}

impl MigrationStep for StatsLayoutStep {
    fn name(&self) -> &'static str {
        "stats-layout"
    }

    fn version(&self) -> u32 {
        2
    }

    fn applies(&self, fields: &Fields) -> bool {
        fields.contains_key(Self::FIELD)
    }

    fn apply(&self, fields: &mut Fields) {
        let legacy = fields.get(Self::FIELD).and_then(FieldValue::as_map);

        let mut stats = Fields::new();
        for (key, default) in Self::CARRIED {
            let value = legacy
                .and_then(|old| old.get(key))
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or(FieldValue::Integer(default));
            stats.insert(key.to_string(), value);
        }
        for (key, value) in Self::RESET {
            stats.insert(key.to_string(), FieldValue::Integer(value));
        }

        fields.insert(Self::FIELD.to_string(), FieldValue::Map(stats));
    }
}

/// Ordered collection of migration steps
pub struct MigrationRegistry {
    steps: Vec<Box<dyn MigrationStep>>,
}

impl MigrationRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Register a step; steps run in registration order
    pub fn register(mut self, step: impl MigrationStep + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Run every applicable step against `fields`
    ///
    /// Each step's predicate is evaluated against the output of the previous
    /// step. Returns the names of the steps that ran, empty when the document
    /// needed nothing.
    pub fn run(&self, fields: &mut Fields) -> Vec<String> {
        let mut applied = Vec::new();
        for step in &self.steps {
            if step.applies(fields) {
                step.apply(fields);
                tracing::debug!(
                    step = step.name(),
                    version = step.version(),
                    "Applied migration step"
                );
                applied.push(format!("{}@v{}", step.name(), step.version()));
            }
        }
        applied
    }
}

impl Default for MigrationRegistry {
    /// The stock registry: the stat layout step
    fn default() -> Self {
        Self::empty().register(StatsLayoutStep)
    }
}
