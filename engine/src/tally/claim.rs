use codec::{Decode, Encode};
use num_traits::Zero;
use scale_info::TypeInfo;

use crate::hash::{biguint_to_bytes, fr_to_bytes, HashBytes};
use crate::tally::{QuinTree, TallyCommitments, TallyResult, VoteOptionIndex, TREE_ARITY};
use crate::{Error, Result};

/// Everything the distribution contract needs to verify a single recipient's payout.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct ClaimData
{
    /// The vote option index of the recipient.
    pub recipient_index: VoteOptionIndex,

    /// The voice credits spent on the recipient.
    pub spent: HashBytes,

    /// Inclusion proof of `spent` in the per vote option spent voice credits tree.
    pub spent_proof: Vec<[HashBytes; TREE_ARITY - 1]>,

    /// The salt of the per vote option spent voice credits commitment.
    pub spent_salt: HashBytes,

    /// The results commitment.
    pub results_commitment: HashBytes,

    /// The spent voice credits commitment.
    pub spent_voice_credits_commitment: HashBytes
}

/// The claims carried by a single distribution transaction.
#[derive(Clone, Debug, Decode, Default, Encode, Eq, PartialEq, TypeInfo)]
pub struct ClaimBatch(pub Vec<ClaimData>);

/// Every vote option index whose results tally is non-zero, in ascending order.
pub fn collect_claimable_indices(tally: &TallyResult) -> Vec<VoteOptionIndex>
{
    tally.results_tally
        .iter()
        .enumerate()
        .filter(|(_, result)| !result.is_zero())
        .map(|(index, _)| index as VoteOptionIndex)
        .collect()
}

/// Builds claims against a single spent voice credits tree.
pub struct ClaimBuilder<'a>
{
    tally: &'a TallyResult,
    spent_tree: QuinTree,
    spent_salt: HashBytes,
    results_commitment: HashBytes,
    spent_voice_credits_commitment: HashBytes
}

impl<'a> ClaimBuilder<'a>
{
    /// - `tally`: The verified tally.
    /// - `commitments`: The commitments of `tally`.
    /// - `depth`: The vote option tree depth.
    pub fn new(tally: &'a TallyResult, commitments: &TallyCommitments, depth: u8) -> Result<Self>
    {
        Ok(ClaimBuilder {
            tally,
            spent_tree: QuinTree::build(&tally.spent_leaves()?, depth)?,
            spent_salt: fr_to_bytes(&tally.per_vo_spent_salt),
            results_commitment: fr_to_bytes(&commitments.results),
            spent_voice_credits_commitment: fr_to_bytes(&commitments.spent_voice_credits)
        })
    }

    pub fn build(&self, index: VoteOptionIndex) -> Result<ClaimData>
    {
        let Some(spent) = self.tally.spent(index) else {
            Err(Error::IndexOutOfBounds { index: index as u64, capacity: self.tally.len() as u64 })?
        };

        let proof = self.spent_tree.gen_proof(index as u64)?;

        Ok(ClaimData {
            recipient_index: index,
            spent: biguint_to_bytes(spent)?,
            spent_proof: proof.to_bytes(),
            spent_salt: self.spent_salt,
            results_commitment: self.results_commitment,
            spent_voice_credits_commitment: self.spent_voice_credits_commitment
        })
    }

    /// Build the claims of `indices`, preserving their order.
    pub fn build_batch(&self, indices: &[VoteOptionIndex]) -> Result<ClaimBatch>
    {
        indices
            .iter()
            .map(|&index| self.build(index))
            .collect::<Result<Vec<_>>>()
            .map(ClaimBatch)
    }
}

/// Build the claim data of a single recipient.
///
/// Rebuilds the spent voice credits tree; prefer [`ClaimBuilder`] when claiming many indices.
pub fn build_claim_data(index: VoteOptionIndex, depth: u8, tally: &TallyResult) -> Result<ClaimData>
{
    let commitments = TallyCommitments::compute(tally, depth)?;
    ClaimBuilder::new(tally, &commitments, depth)?.build(index)
}
