use std::path::PathBuf;

use ark_bn254::{Bn254, Fq2, G1Affine, G2Affine};
use ark_ec::pairing::Pairing;
use ark_groth16::VerifyingKey;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use semaphore_primitives::{Config, DEFAULT_TREE_DEPTH};
use serde_json::{Value, json};

/// Seeds of the identities the tests insert into group trees.
pub const SEEDS: [&str; 4] = ["s0", "s1", "s2", "s3"];

/// Environment variable naming a directory with the compiled Semaphore circuit artifacts.
pub const CIRCUIT_DIR_ENV: &str = "SEMAPHORE_CIRCUIT_DIR";

/// A deterministic RNG for tests.
#[must_use]
pub fn rng(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// The configuration for the depth 20 circuit artifacts in [`CIRCUIT_DIR_ENV`], if the variable
/// is set.
///
/// The directory must contain `semaphore.zkey`, `semaphore.graph` and
/// `verification_key.json`.
#[must_use]
pub fn circuit_config() -> Option<Config> {
    let dir = PathBuf::from(std::env::var_os(CIRCUIT_DIR_ENV)?);
    Config::new(
        DEFAULT_TREE_DEPTH,
        dir.join("semaphore.zkey"),
        dir.join("semaphore.graph"),
        dir.join("verification_key.json"),
    )
    .ok()
}

/// Renders an arkworks verifying key as a snarkjs `verification_key.json`.
#[must_use]
pub fn snarkjs_verifying_key_json(vk: &VerifyingKey<Bn254>) -> String {
    fn g1(point: &G1Affine) -> Value {
        json!([point.x.to_string(), point.y.to_string(), "1"])
    }
    fn fq2(value: &Fq2) -> Value {
        json!([value.c0.to_string(), value.c1.to_string()])
    }
    fn g2(point: &G2Affine) -> Value {
        json!([fq2(&point.x), fq2(&point.y), ["1", "0"]])
    }

    let alpha_beta = Bn254::pairing(vk.alpha_g1, vk.beta_g2).0;
    let fq6 = |value: &ark_bn254::Fq6| json!([fq2(&value.c0), fq2(&value.c1), fq2(&value.c2)]);
    json!({
        "protocol": "groth16",
        "curve": "bn128",
        "nPublic": vk.gamma_abc_g1.len() - 1,
        "vk_alpha_1": g1(&vk.alpha_g1),
        "vk_beta_2": g2(&vk.beta_g2),
        "vk_gamma_2": g2(&vk.gamma_g2),
        "vk_delta_2": g2(&vk.delta_g2),
        "vk_alphabeta_12": [fq6(&alpha_beta.c0), fq6(&alpha_beta.c1)],
        "IC": vk.gamma_abc_g1.iter().map(g1).collect::<Vec<_>>(),
    })
    .to_string()
}
