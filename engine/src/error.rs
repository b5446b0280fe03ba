use core::fmt;
use num_bigint::BigUint;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Identifies one of the commitments making up the aggregate tally commitment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CommitmentKind
{
    /// Salted root of the vote option results tree.
    Results,

    /// Hash of the total spent voice credits and its salt.
    SpentVoiceCredits,

    /// Salted root of the per vote option spent voice credits tree.
    PerVOSpentVoiceCredits,

    /// The aggregate of the three commitments above.
    Tally
}

impl fmt::Display for CommitmentKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self
        {
            CommitmentKind::Results => "results",
            CommitmentKind::SpentVoiceCredits => "spent voice credits",
            CommitmentKind::PerVOSpentVoiceCredits => "per vote option spent voice credits",
            CommitmentKind::Tally => "tally",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum Error
{
    /// The tree depth is unsupported or too shallow for the number of leaves.
    #[error("a tree of depth {depth} cannot hold {leaves} leaves")]
    InvalidDepth { depth: u8, leaves: usize },

    /// A leaf index beyond the capacity of the tree was requested.
    #[error("index {index} is out of bounds for a tree of {capacity} leaves")]
    IndexOutOfBounds { index: u64, capacity: u64 },

    /// A recomputed commitment disagrees with the one the coordinator claimed.
    #[error("{kind} commitment mismatch: expected {expected}, computed {computed}")]
    CommitmentMismatch {
        kind: CommitmentKind,
        expected: String,
        computed: String
    },

    /// The matching pool cannot cover the contributions.
    #[error("budget is less than contributions ({budget} < {contributions})")]
    BudgetExceeded { budget: BigUint, contributions: BigUint },

    /// Every recipient received at most a single unit vote.
    #[error("no project has more than one vote")]
    DegenerateRound,

    /// The allocation numerator went negative, the tally data is inconsistent.
    #[error("allocation underflow for tally {tally} with spent {spent}")]
    AllocationUnderflow { tally: BigUint, spent: BigUint },

    /// A numeric parameter is outside of its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The value does not fit in the scalar field.
    #[error("invalid field element: {0}")]
    InvalidFieldElement(String),

    /// The tally artifact is structurally malformed.
    #[error("invalid tally artifact: {0}")]
    InvalidArtifact(String),

    /// The hash function did not succeed.
    #[error("poseidon hash failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
