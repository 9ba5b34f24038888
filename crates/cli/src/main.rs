use std::{io::Read as _, path::Path, process::ExitCode};

use clap::Parser;
use eyre::{Context as _, OptionExt as _};
use semaphore::{
    Config, FieldElement, Identity, IncrementalMerkleTree, SemaphoreProof, hash_to_field,
    protocol::generate_proof_for_signal,
};
use semaphore_primitives::DEFAULT_TREE_DEPTH;
use semaphore_proof::{SemaphoreVerifyingKey, load_material_from_paths};
use tracing_subscriber::EnvFilter;

mod args;

use args::{Cli, Command, GroupArgs};

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let path = path.ok_or_eyre("this command needs --config or SEMAPHORE_CONFIG")?;
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("while reading config {}", path.display()))?;
    Config::from_json(&json).context("while parsing config")
}

fn build_group(group: &GroupArgs, config: Option<&Config>) -> eyre::Result<IncrementalMerkleTree> {
    let depth = group
        .depth
        .or_else(|| config.map(Config::tree_depth))
        .unwrap_or(DEFAULT_TREE_DEPTH);
    let mut tree = IncrementalMerkleTree::new(depth)?;
    for member in &group.members {
        tree.insert(*member)?;
    }
    Ok(tree)
}

fn read_proof(path: &Path) -> eyre::Result<SemaphoreProof> {
    let mut json = String::new();
    if path == Path::new("-") {
        std::io::stdin()
            .read_to_string(&mut json)
            .context("while reading proof from stdin")?;
    } else {
        json = std::fs::read_to_string(path)
            .with_context(|| format!("while reading proof {}", path.display()))?;
    }
    serde_json::from_str(&json).context("while parsing proof")
}

fn run(cli: Cli) -> eyre::Result<ExitCode> {
    match cli.command {
        Command::Commitment(identity) => {
            let identity = Identity::from_seed(identity.seed.as_bytes())?;
            println!("{}", identity.commitment());
        }
        Command::NullifierHash {
            identity,
            external_nullifier,
        } => {
            let identity = Identity::from_seed(identity.seed.as_bytes())?;
            println!(
                "{}",
                identity.nullifier_hash(hash_to_field(external_nullifier.as_bytes()))
            );
        }
        Command::Root(group) => {
            println!("{}", build_group(&group, None)?.root());
        }
        Command::Prove {
            identity,
            group,
            external_nullifier,
            signal,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let identity = Identity::from_seed(identity.seed.as_bytes())?;
            let tree = build_group(&group, Some(&config))?;
            let commitment = identity.commitment();
            let index = group
                .members
                .iter()
                .position(|member| *member == commitment)
                .ok_or_eyre("the identity is not a member of the group")?;
            let merkle_proof = tree.proof(index as u64)?;
            tracing::info!(depth = tree.depth(), index, "proving group membership");

            let material = load_material_from_paths(config.zkey_path(), config.graph_path())
                .context("while loading proving material")?;
            let proof = generate_proof_for_signal(
                &identity,
                external_nullifier.as_bytes(),
                signal.as_bytes(),
                &merkle_proof,
                &material,
                &mut rand::thread_rng(),
            )?;
            println!("{}", serde_json::to_string_pretty(&proof)?);
        }
        Command::Verify {
            proof,
            signal,
            external_nullifier,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let proof = read_proof(&proof)?;
            if !matches_hash(signal.as_deref(), proof.signal_hash)
                || !matches_hash(external_nullifier.as_deref(), proof.external_nullifier)
            {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
            let verifying_key = SemaphoreVerifyingKey::from_path(config.verifying_key_path())
                .context("while loading verifying key")?;
            if proof.verify(&verifying_key)? {
                println!("valid");
            } else {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn matches_hash(raw: Option<&str>, expected: FieldElement) -> bool {
    raw.is_none_or(|raw| hash_to_field(raw.as_bytes()) == expected)
}

fn main() -> eyre::Result<ExitCode> {
    install_tracing();
    run(Cli::parse())
}
