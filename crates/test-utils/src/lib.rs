//! Test helpers for the Semaphore crates: deterministic fixtures and an in-process Groth16
//! backend with the public input layout of the Semaphore circuit.

mod backend;
mod circuit;
pub mod fixtures;

pub use backend::{FailingBackend, MismatchedBackend, ToyBackend, expected_public_signals};
pub use circuit::ToyCircuit;
