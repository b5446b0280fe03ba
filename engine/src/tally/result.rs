use ark_bn254::Fr;
use num_bigint::BigUint;
use num_traits::Zero;

use crate::hash::fr_from_biguint;
use crate::tally::VoteOptionIndex;
use crate::Result;

/// The parsed outcome of a round's off-chain tally.
///
/// Index `i` of `results_tally` and `per_vo_spent_voice_credits` refer to the same
/// vote option, i.e. the same recipient slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TallyResult
{
    /// The quadratic voting tally of each vote option.
    pub results_tally: Vec<BigUint>,

    /// The salt of the results commitment.
    pub results_salt: Fr,

    /// The linear spent voice credits of each vote option.
    pub per_vo_spent_voice_credits: Vec<BigUint>,

    /// The salt of the per vote option spent voice credits commitment.
    pub per_vo_spent_salt: Fr,

    /// The total spent voice credits across every vote option.
    pub total_spent_voice_credits: BigUint,

    /// The salt of the total spent voice credits commitment.
    pub total_spent_salt: Fr,

    /// The aggregate commitment claimed by the coordinator.
    pub new_tally_commitment: Fr,

    /// The results commitment, if recorded by the tally pipeline.
    pub claimed_results_commitment: Option<Fr>,

    /// The spent voice credits commitment, if recorded by the tally pipeline.
    pub claimed_spent_voice_credits_commitment: Option<Fr>,

    /// The per vote option spent voice credits commitment, if recorded by the tally pipeline.
    pub claimed_per_vo_spent_voice_credits_commitment: Option<Fr>
}

impl TallyResult
{
    /// The number of vote option slots present in the tally.
    pub fn len(&self) -> usize
    {
        self.results_tally.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.results_tally.is_empty()
    }

    /// The results tally as tree leaves.
    pub fn results_leaves(&self) -> Result<Vec<Fr>>
    {
        self.results_tally.iter().map(fr_from_biguint).collect()
    }

    /// The per vote option spent voice credits as tree leaves.
    pub fn spent_leaves(&self) -> Result<Vec<Fr>>
    {
        self.per_vo_spent_voice_credits.iter().map(fr_from_biguint).collect()
    }

    pub fn result(&self, index: VoteOptionIndex) -> Option<&BigUint>
    {
        self.results_tally.get(index as usize)
    }

    pub fn spent(&self, index: VoteOptionIndex) -> Option<&BigUint>
    {
        self.per_vo_spent_voice_credits.get(index as usize)
    }

    /// Sum of the squared results, the quantity the round contract accumulates as results are added.
    pub fn total_votes_squares(&self) -> BigUint
    {
        self.results_tally
            .iter()
            .fold(BigUint::zero(), |acc, tally| acc + tally * tally)
    }
}
