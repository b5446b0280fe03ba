use num_bigint::BigUint;
use num_traits::Zero;

use crate::{Error, Result};

/// Compute the fixed point matching multiplier of a round.
///
/// - `budget`: The matching pool, in token units.
/// - `total_votes_squares`: Sum of the squared results of every vote option.
/// - `total_spent`: Total voice credits spent.
/// - `voice_credit_factor`: Token units per voice credit.
/// - `alpha_precision`: The fixed point scale of the returned value.
///
/// Mirrors the integer arithmetic of the round contract: every product is taken
/// before the single floor division.
pub fn calc_alpha(
    budget: &BigUint,
    total_votes_squares: &BigUint,
    total_spent: &BigUint,
    voice_credit_factor: &BigUint,
    alpha_precision: &BigUint
) -> Result<BigUint>
{
    if voice_credit_factor.is_zero()
    {
        return Err(Error::InvalidParameter("voice credit factor must be non-zero"));
    }

    let contributions = total_spent * voice_credit_factor;
    if *budget < contributions
    {
        return Err(Error::BudgetExceeded { budget: budget.clone(), contributions });
    }

    if total_votes_squares <= total_spent
    {
        return Err(Error::DegenerateRound);
    }

    let numerator = (budget - &contributions) * alpha_precision;
    let denominator = voice_credit_factor * (total_votes_squares - total_spent);

    Ok(numerator / denominator)
}
