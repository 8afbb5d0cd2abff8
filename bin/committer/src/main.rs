//! Deposit commitment tool
//!
//! ```text
//! committer commit                 root of RECORDS_PATH -> OUTPUT_DIR/commitment.json
//! committer prove <index>...       witnesses          -> OUTPUT_DIR/witness-<index>.{json,bin}
//! committer verify <witness.json>  re-check a witness
//! ```
//!
//! Everything else comes from the environment, see `CommitterConfig::from_env`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use xbridge_host::{commands, commands::CommittedRecord, CommitterConfig, HasherKind, LayoutKind};
use xbridge_merkle::{AddressRecord, AttestedRecord, FieldHasher, Keccak256Hasher, PoseidonHasher};

enum Command {
    Commit,
    Prove(Vec<usize>),
    Verify(PathBuf),
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        match args {
            [cmd] if cmd == "commit" => Ok(Self::Commit),
            [cmd, indices @ ..] if cmd == "prove" && !indices.is_empty() => {
                let indices = indices
                    .iter()
                    .map(|s| s.parse().with_context(|| format!("invalid index {s:?}")))
                    .collect::<Result<_>>()?;
                Ok(Self::Prove(indices))
            }
            [cmd, path] if cmd == "verify" => Ok(Self::Verify(PathBuf::from(path))),
            _ => bail!("usage: committer commit | prove <index>... | verify <witness.json>"),
        }
    }
}

fn run<H: FieldHasher, R: CommittedRecord>(config: &CommitterConfig, command: &Command) -> Result<()> {
    match command {
        Command::Commit => {
            let summary = commands::commit::<H, R>(config)?;
            info!("Root: {}", summary.root);
        }
        Command::Prove(indices) => {
            commands::prove::<H, R>(config, indices)?;
        }
        Command::Verify(path) => {
            commands::verify::<H, R>(path)?;
            info!("Witness OK");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    // Setup logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    // Load config from environment
    let config = CommitterConfig::from_env();
    info!("Configuration:");
    info!("  Records:    {}", config.records_path.display());
    info!("  Output:     {}", config.output_dir.display());
    info!("  Hasher:     {:?}", config.hasher);
    info!("  Layout:     {:?} ({})", config.layout, config.byte_order);

    match (config.hasher, config.layout) {
        (HasherKind::Poseidon, LayoutKind::Attested) => run::<PoseidonHasher, AttestedRecord>(&config, &command),
        (HasherKind::Poseidon, LayoutKind::Address) => run::<PoseidonHasher, AddressRecord>(&config, &command),
        (HasherKind::Keccak, LayoutKind::Attested) => run::<Keccak256Hasher, AttestedRecord>(&config, &command),
        (HasherKind::Keccak, LayoutKind::Address) => run::<Keccak256Hasher, AddressRecord>(&config, &command),
    }
}
