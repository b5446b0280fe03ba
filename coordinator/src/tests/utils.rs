use ark_bn254::Fr;
use num_bigint::BigUint;

use qf_engine::{TallyCommitments, TallyResult};

use crate::mock::MockRound;
use crate::CoordinatorConfig;

pub const DEPTH: u8 = 1;
pub const BUDGET: u64 = 10_000;

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

    tally.new_tally_commitment = TallyCommitments::compute(&tally, depth).unwrap().tally;
    tally
}

pub fn three_slot_round() -> TallyResult
{
    honest_tally(&[0, 78, 22], &[0, 3044, 484], DEPTH)
}

/// A seven recipient round over a depth two tree.
pub fn seven_slot_round() -> TallyResult
{
    honest_tally(&[0, 4, 0, 9, 2, 5, 1], &[0, 10, 0, 41, 4, 13, 1], 2)
}

/// A fake round whose poll was honestly tallied to `tally`, one recipient per slot.
pub fn mock_round(tally: &TallyResult, depth: u8, budget: u64) -> MockRound
{
    let commitments = TallyCommitments::compute(tally, depth).unwrap();
    MockRound::new(tally.len() as u32, &commitments, big(budget))
}

pub fn config(tally_batch_size: u32, distribute_batch_size: u32) -> CoordinatorConfig
{
    CoordinatorConfig {
        vote_option_tree_depth: DEPTH,
        tally_batch_size,
        distribute_batch_size,
        ..Default::default()
    }
}
