//! Commitment, matching and allocation arithmetic for quadratic funding rounds
//! tallied by MACI.
//!
//! A round's tally artifact is parsed into a [`TallyResult`], which is then
//! checked against the coordinator's claimed commitment before any of the
//! derived quantities (alpha, allocations, claim data) are trusted.

pub mod error;
pub mod hash;
pub mod tally;

pub use error::{CommitmentKind, Error, Result};
pub use hash::HashBytes;
pub use tally::*;
