use num_bigint::BigUint;
use num_traits::Zero;

use crate::tally::{collect_claimable_indices, TallyResult, VoteOptionIndex};
use crate::{Error, Result};

/// The payout computed for a single recipient slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Allocation
{
    /// The vote option index of the recipient.
    pub index: VoteOptionIndex,

    /// The token amount allocated.
    pub amount: BigUint
}

/// Blend a recipient's quadratic matching term with its linear contributions.
///
/// - `tally_result`: The recipient's quadratic voting tally.
/// - `spent`: The voice credits spent on the recipient.
/// - `alpha`: The matching multiplier from [`crate::calc_alpha`].
/// - `voice_credit_factor`: Token units per voice credit.
/// - `alpha_precision`: The fixed point scale of `alpha`.
pub fn get_allocated_amount(
    tally_result: &BigUint,
    spent: &BigUint,
    alpha: &BigUint,
    voice_credit_factor: &BigUint,
    alpha_precision: &BigUint
) -> Result<BigUint>
{
    if alpha_precision.is_zero()
    {
        return Err(Error::InvalidParameter("alpha precision must be non-zero"));
    }

    let quadratic = alpha * voice_credit_factor * tally_result * tally_result;
    let total_spent_credits = voice_credit_factor * spent;
    let linear_precision = alpha_precision * &total_spent_credits;
    let linear_alpha = alpha * &total_spent_credits;

    let positive = quadratic + linear_precision;
    if positive < linear_alpha
    {
        return Err(Error::AllocationUnderflow {
            tally: tally_result.clone(),
            spent: spent.clone()
        });
    }

    Ok((positive - linear_alpha) / alpha_precision)
}

/// Allocations of every recipient slot that received votes, in index order.
pub fn allocations(
    tally: &TallyResult,
    alpha: &BigUint,
    voice_credit_factor: &BigUint,
    alpha_precision: &BigUint
) -> Result<Vec<Allocation>>
{
    collect_claimable_indices(tally)
        .into_iter()
        .map(|index| {
            let i = index as usize;
            let amount = get_allocated_amount(
                &tally.results_tally[i],
                &tally.per_vo_spent_voice_credits[i],
                alpha,
                voice_credit_factor,
                alpha_precision
            )?;
            Ok(Allocation { index, amount })
        })
        .collect()
}
