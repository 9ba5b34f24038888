//! Loaders for the circom proving material of the Semaphore circuit.
//!
//! The material bundles the proving key (`.zkey`) with the witness graph of the circuit. It is
//! loaded once per call site and can be reused for any number of proofs.

use std::{
    io::Read,
    panic::{AssertUnwindSafe, catch_unwind},
    path::Path,
};

use groth16_material::circom::{CircomGroth16Material, CircomGroth16MaterialBuilder};

use crate::ProofError;

fn build_semaphore_builder() -> CircomGroth16MaterialBuilder {
    CircomGroth16MaterialBuilder::new()
}

/// Runs the upstream builder, which panics on some malformed zkeys instead of returning an
/// error.
fn build_guarded(
    build: impl FnOnce(CircomGroth16MaterialBuilder) -> Result<CircomGroth16Material, ProofError>,
) -> Result<CircomGroth16Material, ProofError> {
    catch_unwind(AssertUnwindSafe(|| build(build_semaphore_builder()))).unwrap_or_else(|panic| {
        let reason = panic
            .downcast_ref::<&str>()
            .map(ToString::to_string)
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        tracing::warn!(%reason, "groth16 material builder panicked");
        Err(ProofError::MalformedArtifact(reason))
    })
}

/// Loads the [`CircomGroth16Material`] from the provided paths.
///
/// # Errors
/// Will return an error if an artifact cannot be read or parsed.
pub fn load_material_from_paths(
    zkey: impl AsRef<Path>,
    graph: impl AsRef<Path>,
) -> Result<CircomGroth16Material, ProofError> {
    let (zkey, graph) = (zkey.as_ref(), graph.as_ref());
    tracing::debug!(zkey = %zkey.display(), graph = %graph.display(), "loading groth16 material");
    for path in [zkey, graph] {
        if !path.is_file() {
            return Err(ProofError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
    }
    build_guarded(|builder| Ok(builder.build_from_paths(zkey, graph)?))
}

/// Loads the [`CircomGroth16Material`] from the provided readers.
///
/// # Errors
/// Will return an error if the material cannot be parsed.
pub fn load_material_from_reader(
    zkey: impl Read,
    graph: impl Read,
) -> Result<CircomGroth16Material, ProofError> {
    build_guarded(|builder| Ok(builder.build_from_reader(zkey, graph)?))
}

/// Loads the [`CircomGroth16Material`] from in-memory artifacts.
///
/// # Errors
/// Will return an error if the material cannot be parsed.
pub fn load_material_from_bytes(
    zkey: &[u8],
    graph: &[u8],
) -> Result<CircomGroth16Material, ProofError> {
    build_guarded(|builder| Ok(builder.build_from_bytes(zkey, graph)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_an_io_error() {
        let Err(err) =
            load_material_from_paths("/nonexistent/semaphore.zkey", "/nonexistent/graph.bin")
        else {
            panic!("missing artifacts must not load");
        };
        match err {
            ProofError::Io { path, .. } => {
                assert_eq!(path, Path::new("/nonexistent/semaphore.zkey"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_artifacts_are_rejected() {
        assert!(load_material_from_bytes(b"not a zkey", b"not a graph").is_err());
        assert!(load_material_from_reader(&b"zkey"[..], &b"graph"[..]).is_err());
    }

    #[test]
    fn garbage_artifacts_on_disk_are_rejected() {
        let dir = std::env::temp_dir().join(format!("semaphore-garbage-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let (zkey, graph) = (dir.join("semaphore.zkey"), dir.join("semaphore.graph"));
        std::fs::write(&zkey, [0xffu8; 64]).unwrap();
        std::fs::write(&graph, b"not a graph").unwrap();
        let result = load_material_from_paths(&zkey, &graph);
        std::fs::remove_dir_all(&dir).unwrap();
        assert!(result.is_err());
    }
}
