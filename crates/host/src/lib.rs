//! Host-side commitment logic for the deposit bridge
//!
//! Reads the record set exported by the source-chain indexer, commits it with
//! `xbridge-merkle`, and produces the per-record witnesses that the proving
//! routine consumes.

pub mod commands;
pub mod committer;
pub mod config;
pub mod records;
pub mod witness;

pub use committer::Committer;
pub use config::{CommitterConfig, HasherKind, LayoutKind};
pub use records::RecordFile;
pub use witness::{CommitmentSummary, MembershipWitness};
