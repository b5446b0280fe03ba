use codec::{Decode, Encode};
use core::ops::Range;
use scale_info::TypeInfo;

use crate::hash::{biguint_to_bytes, fr_to_bytes, HashBytes};
use crate::tally::{QuinTree, TallyCommitments, TallyResult, VoteOptionIndex, TREE_ARITY};
use crate::{Error, Result};

/// The arguments of a single `addTallyResultsBatch` transaction.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct TallyResultsBatch
{
    /// The vote option indices covered by the batch, ascending.
    pub indices: Vec<VoteOptionIndex>,

    /// The results tally of each index.
    pub tally_values: Vec<HashBytes>,

    /// The results tree inclusion proof of each index.
    pub proofs: Vec<Vec<[HashBytes; TREE_ARITY - 1]>>,

    /// The salt of the results commitment.
    pub results_salt: HashBytes,

    /// The spent voice credits commitment.
    pub spent_voice_credits_hash: HashBytes,

    /// The per vote option spent voice credits commitment.
    pub per_vo_spent_voice_credits_hash: HashBytes
}

impl TallyResultsBatch
{
    pub fn len(&self) -> usize
    {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.indices.is_empty()
    }
}

/// Splits a verified tally into result batches, proving against a single tree
/// built from the complete, zero padded, results vector.
pub struct ResultsBatcher<'a>
{
    tally: &'a TallyResult,
    tree: QuinTree,
    results_salt: HashBytes,
    spent_voice_credits_hash: HashBytes,
    per_vo_spent_voice_credits_hash: HashBytes
}

impl<'a> ResultsBatcher<'a>
{
    /// - `tally`: The tally the batches are drawn from.
    /// - `commitments`: The verified commitments of `tally`.
    /// - `depth`: The vote option tree depth.
    pub fn new(tally: &'a TallyResult, commitments: &TallyCommitments, depth: u8) -> Result<Self>
    {
        let tree = QuinTree::build(&tally.results_leaves()?, depth)?;

        Ok(ResultsBatcher {
            tally,
            tree,
            results_salt: fr_to_bytes(&tally.results_salt),
            spent_voice_credits_hash: fr_to_bytes(&commitments.spent_voice_credits),
            per_vo_spent_voice_credits_hash: fr_to_bytes(&commitments.per_vo_spent_voice_credits)
        })
    }

    /// Build the batch covering `range`; indices past the end of the tally are rejected.
    pub fn batch(&self, range: Range<VoteOptionIndex>) -> Result<TallyResultsBatch>
    {
        let mut batch = TallyResultsBatch {
            indices: Vec::with_capacity(range.len()),
            tally_values: Vec::with_capacity(range.len()),
            proofs: Vec::with_capacity(range.len()),
            results_salt: self.results_salt,
            spent_voice_credits_hash: self.spent_voice_credits_hash,
            per_vo_spent_voice_credits_hash: self.per_vo_spent_voice_credits_hash
        };

        for index in range
        {
            let Some(value) = self.tally.result(index) else {
                Err(Error::IndexOutOfBounds { index: index as u64, capacity: self.tally.len() as u64 })?
            };

            let proof = self.tree.gen_proof(index as u64)?;

            batch.indices.push(index);
            batch.tally_values.push(biguint_to_bytes(value)?);
            batch.proofs.push(proof.to_bytes());
        }

        Ok(batch)
    }

    /// The root of the results tree.
    pub fn root(&self) -> ark_bn254::Fr
    {
        self.tree.root()
    }
}
