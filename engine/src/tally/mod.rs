pub mod alpha;
pub mod allocation;
pub mod artifact;
pub mod batch;
pub mod claim;
pub mod commitment;
pub mod result;
pub mod tree;

pub use alpha::calc_alpha;
pub use allocation::{allocations, get_allocated_amount, Allocation};
pub use artifact::{parse_uint, SpentVoiceCredits, TallyArtifact, TallyVector};
pub use batch::{ResultsBatcher, TallyResultsBatch};
pub use claim::{build_claim_data, collect_claimable_indices, ClaimBatch, ClaimBuilder, ClaimData};
pub use commitment::{verify_tally, TallyCommitments};
pub use result::TallyResult;
pub use tree::{merkle_zeroes, tree_capacity, tree_commitment, Proof, QuinTree, MAX_TREE_DEPTH, TREE_ARITY};

/// The index of a recipient's slot in the vote option tree.
pub type VoteOptionIndex = u32;
