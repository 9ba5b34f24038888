use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use semaphore::FieldElement;

/// Semaphore identities, group roots and proofs from the command line.
#[derive(Parser, Debug)]
#[clap(name = "semaphore", version)]
pub struct Cli {
    /// Path to the JSON config with the circuit artifacts. Needed by `prove` and `verify`.
    #[clap(long, env = "SEMAPHORE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Prints the identity commitment for a seed.
    Commitment(IdentityArgs),
    /// Prints the nullifier hash of an identity for a topic.
    NullifierHash {
        #[clap(flatten)]
        identity: IdentityArgs,
        /// The topic, hashed into the field.
        #[clap(long)]
        external_nullifier: String,
    },
    /// Prints the root of a group.
    Root(GroupArgs),
    /// Proves membership in a group and prints the proof as JSON.
    Prove {
        #[clap(flatten)]
        identity: IdentityArgs,
        #[clap(flatten)]
        group: GroupArgs,
        /// The topic, hashed into the field.
        #[clap(long)]
        external_nullifier: String,
        /// The signal, hashed into the field.
        #[clap(long)]
        signal: String,
    },
    /// Verifies a proof printed by `prove`.
    Verify {
        /// File with the proof JSON, `-` for stdin.
        #[clap(long, default_value = "-")]
        proof: PathBuf,
        /// If given, the proof must be for this signal.
        #[clap(long)]
        signal: Option<String>,
        /// If given, the proof must be for this topic.
        #[clap(long)]
        external_nullifier: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct IdentityArgs {
    /// The identity seed.
    #[clap(long, env = "SEMAPHORE_SEED", hide_env_values = true)]
    pub seed: String,
}

#[derive(Args, Debug)]
pub struct GroupArgs {
    /// Depth of the group tree. Defaults to the depth in the config, or 20.
    #[clap(long)]
    pub depth: Option<usize>,
    /// Identity commitments of the group members, in insertion order.
    #[clap(long = "member", value_delimiter = ',')]
    pub members: Vec<FieldElement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prove() {
        let cli = Cli::try_parse_from([
            "semaphore",
            "--config",
            "config.json",
            "prove",
            "--seed",
            "alice",
            "--member",
            "0x1,0x2",
            "--member",
            "3",
            "--external-nullifier",
            "vote-42",
            "--signal",
            "hello",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("config.json")));
        let Command::Prove {
            identity,
            group,
            external_nullifier,
            signal,
        } = cli.command
        else {
            panic!("expected prove");
        };
        assert_eq!(identity.seed, "alice");
        assert_eq!(
            group.members,
            vec![
                FieldElement::from(1u64),
                FieldElement::from(2u64),
                FieldElement::from(3u64)
            ]
        );
        assert_eq!(group.depth, None);
        assert_eq!(external_nullifier, "vote-42");
        assert_eq!(signal, "hello");
    }

    #[test]
    fn rejects_non_canonical_members() {
        assert!(Cli::try_parse_from(["semaphore", "root", "--member", "0x01"]).is_err());
    }
}
