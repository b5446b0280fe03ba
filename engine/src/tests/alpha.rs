use num_bigint::BigUint;

use super::utils::*;
use crate::{allocations, calc_alpha, get_allocated_amount, Error};

#[test]
fn degenerate_round()
{
    assert!(matches!(
        calc_alpha(&big(100), &big(10), &big(10), &big(1), &precision()),
        Err(Error::DegenerateRound)
    ));
}

#[test]
fn budget_exceeded()
{
    let Err(Error::BudgetExceeded { budget, contributions }) =
        calc_alpha(&big(5), &big(100), &big(10), &big(1), &precision())
    else {
        panic!("expected the budget to be exceeded");
    };
    assert_eq!(budget, big(5));
    assert_eq!(contributions, big(10));
}

#[test]
fn zero_voice_credit_factor()
{
    assert!(matches!(
        calc_alpha(&big(100), &big(20), &big(10), &big(0), &precision()),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn exact_alpha()
{
    let alpha = calc_alpha(&big(10_000), &big(6568), &big(3528), &big(1), &precision()).unwrap();
    assert_eq!(alpha, BigUint::parse_bytes(b"2128947368421052631", 10).unwrap());
}

#[test]
fn alpha_increases_with_budget()
{
    let mut previous = None;
    for budget in 10_000u64..10_016
    {
        let alpha = calc_alpha(&big(budget), &big(6568), &big(3528), &big(1), &precision()).unwrap();
        if let Some(previous) = previous
        {
            assert!(alpha > previous);
        }
        previous = Some(alpha);
    }
}

#[test]
fn large_values_do_not_overflow()
{
    // Token amounts with 18 decimals and a large voice credit factor.
    let vcf = big(10).pow(12);
    let budget = big(10).pow(24);
    let alpha = calc_alpha(&budget, &big(6568), &big(3528), &vcf, &precision()).unwrap();

    let amount = get_allocated_amount(&big(78), &big(3044), &alpha, &vcf, &precision()).unwrap();
    assert!(amount < budget);
    assert!(amount > big(3044) * &vcf);
}

#[test]
fn exact_allocations()
{
    let tally = three_slot_round();
    let alpha = calc_alpha(&big(10_000), &tally.total_votes_squares(), &tally.total_spent_voice_credits, &big(1), &precision()).unwrap();

    let allocations = allocations(&tally, &alpha, &big(1), &precision()).unwrap();
    let amounts: Vec<_> = allocations.iter().map(|a| (a.index, a.amount.clone())).collect();
    assert_eq!(amounts, vec![(1, big(9515)), (2, big(484))]);
}

#[test]
fn allocations_conserve_the_budget()
{
    let tally = honest_tally(&[0, 12, 30, 7, 1, 45], &[0, 50, 400, 25, 1, 1000], 2);
    let vcf = big(10).pow(9);
    let budget = big(10).pow(15);

    let alpha = calc_alpha(&budget, &tally.total_votes_squares(), &tally.total_spent_voice_credits, &vcf, &precision()).unwrap();
    let allocations = allocations(&tally, &alpha, &vcf, &precision()).unwrap();
    assert_eq!(allocations.len(), 5);

    let total: BigUint = allocations.iter().map(|a| &a.amount).sum();
    assert!(total <= budget);
    assert!(&budget - &total <= precision() * big(allocations.len() as u64));
    // Far tighter in practice: one unit lost per floor division.
    assert!(&budget - &total <= big(allocations.len() as u64 + 1));
}

#[test]
fn inconsistent_allocation_underflows()
{
    // A spent amount exceeding the squared tally cannot come from honest votes.
    let alpha = precision() * big(3);
    assert!(matches!(
        get_allocated_amount(&big(1), &big(100), &alpha, &big(1), &precision()),
        Err(Error::AllocationUnderflow { .. })
    ));
}
