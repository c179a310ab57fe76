//! Run provenance recorded in manifests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Version of the export mapping layout; bumped when its shape changes.
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

fn current_schema() -> u32 {
    EXPORT_SCHEMA_VERSION
}

/// Where a set of exported numbers came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProvenance {
    /// Export layout version.
    #[serde(default = "current_schema")]
    pub schema_version: u32,
    /// Stable hash of the model definition.
    pub input_hash: String,
    /// Master seed; absent for entropy-seeded runs, which cannot be replayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// RFC 3339 timestamp.
    pub created_at: String,
    /// Crate name to version.
    pub tool_versions: BTreeMap<String, String>,
}

impl RunProvenance {
    /// Provenance for a definition hash and seed, stamped at `created_at`.
    pub fn new(
        input_hash: impl Into<String>,
        seed: Option<u64>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            input_hash: input_hash.into(),
            seed,
            created_at: created_at.into(),
            tool_versions: BTreeMap::new(),
        }
    }

    /// Records the version of a participating crate.
    pub fn with_tool(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.tool_versions.insert(name.into(), version.into());
        self
    }
}
