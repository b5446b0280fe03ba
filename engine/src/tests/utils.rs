use ark_bn254::Fr;
use num_bigint::BigUint;

use crate::{TallyCommitments, TallyResult};

pub const DEPTH: u8 = 1;

pub fn big(value: u64) -> BigUint
{
    BigUint::from(value)
}

/// An honestly committed tally over the given results and spent credits.
pub fn honest_tally(results: &[u64], spent: &[u64], depth: u8) -> TallyResult
{
    let mut tally = TallyResult {
        results_tally: results.iter().copied().map(big).collect(),
        results_salt: Fr::from(0xdead_u64),
        per_vo_spent_voice_credits: spent.iter().copied().map(big).collect(),
        per_vo_spent_salt: Fr::from(0xbeef_u64),
        total_spent_voice_credits: big(spent.iter().sum()),
        total_spent_salt: Fr::from(0xcafe_u64),
        new_tally_commitment: Fr::from(0u64),
        claimed_results_commitment: None,
        claimed_spent_voice_credits_commitment: None,
        claimed_per_vo_spent_voice_credits_commitment: None
    };

    let commitments = TallyCommitments::compute(&tally, depth).unwrap();
    tally.new_tally_commitment = commitments.tally;
    tally
}

/// The three slot round: nobody voted for slot 0, two voters (40 + 38) for
/// slot 1 and a single voter (22) for slot 2.
pub fn three_slot_round() -> TallyResult
{
    honest_tally(&[0, 78, 22], &[0, 3044, 484], DEPTH)
}

pub fn precision() -> BigUint
{
    big(10).pow(18)
}
