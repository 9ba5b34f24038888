use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::PrimitiveError;

/// The smallest supported Merkle tree depth.
pub const MIN_TREE_DEPTH: usize = 1;
/// The largest supported Merkle tree depth.
pub const MAX_TREE_DEPTH: usize = 32;
/// The tree depth of the standard Semaphore circuit.
pub const DEFAULT_TREE_DEPTH: usize = 20;

const fn default_tree_depth() -> usize {
    DEFAULT_TREE_DEPTH
}

/// Configuration shared by provers and verifiers.
///
/// Points at the circuit artifacts on disk and fixes the tree depth the circuit was compiled
/// for. Nothing in here is secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Depth of the Merkle tree the circuit was compiled for.
    #[serde(default = "default_tree_depth")]
    tree_depth: usize,
    /// Path to the proving key (`.zkey`).
    zkey_path: PathBuf,
    /// Path to the witness graph of the circuit.
    graph_path: PathBuf,
    /// Path to the snarkjs `verification_key.json`.
    verifying_key_path: PathBuf,
}

impl Config {
    /// Instantiates a new configuration.
    ///
    /// # Errors
    /// Will error if `tree_depth` is outside `MIN_TREE_DEPTH..=MAX_TREE_DEPTH`.
    pub fn new(
        tree_depth: usize,
        zkey_path: PathBuf,
        graph_path: PathBuf,
        verifying_key_path: PathBuf,
    ) -> Result<Self, PrimitiveError> {
        let config = Self {
            tree_depth,
            zkey_path,
            graph_path,
            verifying_key_path,
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from JSON.
    ///
    /// # Errors
    /// Will error if the JSON is not valid or the tree depth is unsupported.
    pub fn from_json(json_str: &str) -> Result<Self, PrimitiveError> {
        let config: Self = serde_json::from_str(json_str)
            .map_err(|e| PrimitiveError::Serialization(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), PrimitiveError> {
        if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&self.tree_depth) {
            return Err(PrimitiveError::InvalidInput {
                attribute: "tree_depth".to_string(),
                reason: format!(
                    "must be between {MIN_TREE_DEPTH} and {MAX_TREE_DEPTH}, got {}",
                    self.tree_depth
                ),
            });
        }
        Ok(())
    }

    /// Depth of the Merkle tree the circuit was compiled for.
    #[must_use]
    pub const fn tree_depth(&self) -> usize {
        self.tree_depth
    }

    /// Path to the proving key.
    #[must_use]
    pub fn zkey_path(&self) -> &Path {
        &self.zkey_path
    }

    /// Path to the witness graph.
    #[must_use]
    pub fn graph_path(&self) -> &Path {
        &self.graph_path
    }

    /// Path to the verifying key.
    #[must_use]
    pub fn verifying_key_path(&self) -> &Path {
        &self.verifying_key_path
    }
}
