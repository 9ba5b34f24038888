use semaphore_primitives::PrimitiveError;
use semaphore_proof::ProofError;

/// The category of a [`SemaphoreError`].
///
/// Callers that only need to branch on what went wrong (bad input, bad state, backend) match on
/// this instead of the individual variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An input could not be parsed or is out of range.
    InputMalformed,
    /// The operation is not valid in the current state of the object.
    StateInvalid,
    /// The proving backend or its artifacts failed.
    BackendFailure,
}

/// Errors of the Semaphore protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum SemaphoreError {
    /// A value failed to parse.
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
    /// Identity seeds must not be empty.
    #[error("identity seed must not be empty")]
    EmptySeed,
    /// The tree depth is outside the supported range.
    #[error("unsupported tree depth {depth}, expected {min}..={max}")]
    InvalidDepth {
        /// The requested depth.
        depth: usize,
        /// The smallest supported depth.
        min: usize,
        /// The largest supported depth.
        max: usize,
    },
    /// A supplied Merkle proof does not fit the circuit or is internally inconsistent.
    #[error("invalid merkle proof: {0}")]
    InvalidMerkleProof(String),
    /// Insertion into a tree that has no free leaves left.
    #[error("tree is full ({capacity} leaves)")]
    TreeFull {
        /// The number of leaves of the tree.
        capacity: u64,
    },
    /// A proof was requested for a leaf that has not been inserted.
    #[error("leaf {index} has not been inserted, the tree holds {len} leaves")]
    LeafNotInserted {
        /// The requested leaf index.
        index: u64,
        /// The number of inserted leaves.
        len: u64,
    },
    /// Errors from the proving backend or from loading its artifacts.
    #[error(transparent)]
    Proof(#[from] ProofError),
    /// The prover returned public signals that differ from the expected ones, i.e. the proving
    /// key does not belong to the Semaphore circuit.
    #[error("public signals returned by the prover do not match the inputs")]
    PublicSignalsMismatch,
}

impl SemaphoreError {
    /// The category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Primitive(_)
            | Self::EmptySeed
            | Self::InvalidDepth { .. }
            | Self::InvalidMerkleProof(_) => ErrorKind::InputMalformed,
            Self::TreeFull { .. } | Self::LeafNotInserted { .. } => ErrorKind::StateInvalid,
            Self::Proof(_) | Self::PublicSignalsMismatch => ErrorKind::BackendFailure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(SemaphoreError::EmptySeed.kind(), ErrorKind::InputMalformed);
        assert_eq!(
            SemaphoreError::from(PrimitiveError::NotInField).kind(),
            ErrorKind::InputMalformed
        );
        assert_eq!(
            SemaphoreError::TreeFull { capacity: 4 }.kind(),
            ErrorKind::StateInvalid
        );
        assert_eq!(
            SemaphoreError::LeafNotInserted { index: 3, len: 1 }.kind(),
            ErrorKind::StateInvalid
        );
        assert_eq!(
            SemaphoreError::PublicSignalsMismatch.kind(),
            ErrorKind::BackendFailure
        );
        assert_eq!(
            SemaphoreError::from(ProofError::Verifier("bad".to_string())).kind(),
            ErrorKind::BackendFailure
        );
        assert_eq!(
            SemaphoreError::from(ProofError::MalformedArtifact("capacity overflow".to_string()))
                .kind(),
            ErrorKind::BackendFailure
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            SemaphoreError::TreeFull { capacity: 4 }.to_string(),
            "tree is full (4 leaves)"
        );
        assert_eq!(
            SemaphoreError::InvalidDepth {
                depth: 0,
                min: 1,
                max: 32
            }
            .to_string(),
            "unsupported tree depth 0, expected 1..=32"
        );
    }
}
