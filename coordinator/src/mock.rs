use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use ark_bn254::Fr;
use async_trait::async_trait;
use codec::Decode;
use num_bigint::BigUint;
use num_traits::Zero;

use qf_engine::hash::{fr_from_bytes, fr_to_biguint, hash3, hash_left_right, HashBytes};
use qf_engine::{
    calc_alpha, get_allocated_amount, ClaimBatch, ClaimData, Proof, TallyCommitments, TallyResult,
    TallyResultsBatch, VoteOptionIndex,
};

use crate::contract::*;
use crate::round::RoundStatus;
use crate::{Error, Result};

pub const GAS_PER_TX: Gas = 21_000;
pub const GAS_PER_ITEM: Gas = 50_000;

/// In-memory round contract enforcing the same lifecycle and proof checks as the real one.
pub struct MockRound
{
    state: Mutex<MockState>
}

pub struct MockState
{
    pub status: RoundStatus,
    pub recipients: Vec<RecipientInfo>,

    /// The commitment the tally contract accepted for the round's poll.
    pub tally_commitment: Fr,

    pub pool_amount: BigUint,
    pub balance: BigUint,
    pub voice_credit_factor: BigUint,
    pub alpha_precision: BigUint,
    pub alpha: Option<BigUint>,

    /// Results added so far, by vote option index.
    pub results: BTreeMap<VoteOptionIndex, BigUint>,
    pub total_votes_squares: BigUint,
    pub spent_voice_credits_hash: Option<Fr>,
    pub per_vo_spent_voice_credits_hash: Option<Fr>,
    pub total_spent: Option<BigUint>,

    pub claimed: BTreeSet<VoteOptionIndex>,
    pub payouts: BTreeMap<String, BigUint>,

    pub tally_hash: Option<String>,
    pub finalized_at: Timestamp,
    pub emergency_withdrawal_delay: Timestamp,
    pub now: Timestamp,

    /// Every write issued, by contract method name.
    pub calls: Vec<&'static str>,

    /// Revert any results batch starting at this index.
    pub revert_batch_at: Option<VoteOptionIndex>,

    /// Fail any results batch starting at this index without a receipt.
    pub drop_batch_at: Option<VoteOptionIndex>,

    /// Revert any claim batch starting at this index.
    pub revert_claim_at: Option<VoteOptionIndex>
}

impl MockRound
{
    /// A round with `recipient_count` registered recipients whose poll was tallied to `commitments`.
    pub fn new(recipient_count: u32, commitments: &TallyCommitments, budget: BigUint) -> Self
    {
        let recipients = (0..recipient_count)
            .map(|index| RecipientInfo {
                id: format!("recipient-{}", index),
                title: format!("Project {}", index),
                payout_address: format!("0x{:040x}", index + 1)
            })
            .collect();

        MockRound {
            state: Mutex::new(MockState {
                status: RoundStatus::TallyPublished,
                recipients,
                tally_commitment: commitments.tally,
                pool_amount: budget.clone(),
                balance: budget,
                voice_credit_factor: BigUint::from(1u32),
                alpha_precision: BigUint::from(10u64.pow(18)),
                alpha: None,
                results: BTreeMap::new(),
                total_votes_squares: BigUint::zero(),
                spent_voice_credits_hash: None,
                per_vo_spent_voice_credits_hash: None,
                total_spent: None,
                claimed: BTreeSet::new(),
                payouts: BTreeMap::new(),
                tally_hash: None,
                finalized_at: 0,
                emergency_withdrawal_delay: 3600,
                now: 1_700_000_000,
                calls: Vec::new(),
                revert_batch_at: None,
                drop_batch_at: None,
                revert_claim_at: None
            })
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MockState>
    {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MockState
{
    fn transition(&mut self, next: RoundStatus)
    {
        assert!(self.status.can_transition_to(next), "illegal transition {:?} -> {:?}", self.status, next);
        self.status = next;
    }

    fn is_finalized(&self) -> bool
    {
        matches!(
            self.status,
            RoundStatus::Finalized | RoundStatus::Distributing | RoundStatus::Distributed | RoundStatus::EmergencyWithdrawn
        )
    }

    fn is_open(&self) -> bool
    {
        matches!(self.status, RoundStatus::TallyPublished | RoundStatus::ResultsAdded)
    }

    /// Check a result against the poll's tally commitment, as the tally contract does.
    fn verify_result(&self, index: VoteOptionIndex, value: &HashBytes, path: &[[HashBytes; 4]], batch: &TallyResultsBatch) -> Result<bool>
    {
        let root = Proof::from_bytes(index as u64, path)?.compute_root(fr_from_bytes(value)?)?;
        let results = hash_left_right(root, fr_from_bytes(&batch.results_salt)?)?;
        let tally = hash3([
            results,
            fr_from_bytes(&batch.spent_voice_credits_hash)?,
            fr_from_bytes(&batch.per_vo_spent_voice_credits_hash)?,
        ])?;

        Ok(tally == self.tally_commitment)
    }

    fn verify_claim(&self, claim: &ClaimData) -> Result<bool>
    {
        let Some(per_vo) = self.per_vo_spent_voice_credits_hash else { return Ok(false) };

        let root = Proof::from_bytes(claim.recipient_index as u64, &claim.spent_proof)?
            .compute_root(fr_from_bytes(&claim.spent)?)?;

        Ok(hash_left_right(root, fr_from_bytes(&claim.spent_salt)?)? == per_vo)
    }

    fn payout(&self, claim: &ClaimData) -> Result<Option<BigUint>>
    {
        let (Some(alpha), Some(result)) = (&self.alpha, self.results.get(&claim.recipient_index)) else {
            return Ok(None);
        };

        Ok(Some(get_allocated_amount(
            result,
            &fr_to_biguint(&fr_from_bytes(&claim.spent)?),
            alpha,
            &self.voice_credit_factor,
            &self.alpha_precision
        )?))
    }
}

fn gas(items: usize) -> Gas
{
    GAS_PER_TX + GAS_PER_ITEM * items as Gas
}

#[async_trait]
impl RoundContract for MockRound
{
    async fn pool_amount(&self) -> Result<BigUint> { Ok(self.state().pool_amount.clone()) }

    async fn total_votes_squares(&self) -> Result<BigUint> { Ok(self.state().total_votes_squares.clone()) }

    async fn voice_credit_factor(&self) -> Result<BigUint> { Ok(self.state().voice_credit_factor.clone()) }

    async fn alpha_precision(&self) -> Result<BigUint> { Ok(self.state().alpha_precision.clone()) }

    async fn recipient_count(&self) -> Result<u32> { Ok(self.state().recipients.len() as u32) }

    async fn poll_contracts(&self) -> Result<PollContracts>
    {
        Ok(PollContracts {
            poll: "0xpoll".into(),
            message_processor: "0xmessageprocessor".into(),
            tally: "0xtally".into()
        })
    }

    async fn is_finalized(&self) -> Result<bool> { Ok(self.state().is_finalized()) }

    async fn is_cancelled(&self) -> Result<bool> { Ok(self.state().status == RoundStatus::Cancelled) }

    async fn finalized_at(&self) -> Result<Timestamp> { Ok(self.state().finalized_at) }

    async fn emergency_withdrawal_delay(&self) -> Result<Timestamp> { Ok(self.state().emergency_withdrawal_delay) }

    async fn now(&self) -> Result<Timestamp> { Ok(self.state().now) }

    async fn balance(&self, _asset: &Asset) -> Result<BigUint> { Ok(self.state().balance.clone()) }

    async fn recipient(&self, index: VoteOptionIndex) -> Result<Option<RecipientInfo>>
    {
        Ok(self.state().recipients.get(index as usize).cloned())
    }

    async fn add_tally_results_batch(&self, batch: &TallyResultsBatch) -> Result<Receipt>
    {
        let mut state = self.state();
        state.calls.push("addTallyResultsBatch");

        let start = batch.indices.first().copied();
        if start.is_some() && start == state.drop_batch_at
        {
            return Err(Error::Contract("connection reset".into()));
        }
        if start.is_some() && start == state.revert_batch_at
        {
            return Ok(Receipt::reverted("out of gas", GAS_PER_TX));
        }
        if !state.is_open()
        {
            return Ok(Receipt::reverted("round closed", GAS_PER_TX));
        }

        for ((index, value), path) in batch.indices.iter().zip(&batch.tally_values).zip(&batch.proofs)
        {
            if !state.verify_result(*index, value, path, batch)?
            {
                return Ok(Receipt::reverted(format!("invalid proof for index {}", index), GAS_PER_TX));
            }
        }

        let mut added = 0;
        for (index, value) in batch.indices.iter().zip(&batch.tally_values)
        {
            if state.results.contains_key(index) { continue; }

            let value = fr_to_biguint(&fr_from_bytes(value)?);
            state.total_votes_squares += &value * &value;
            state.results.insert(*index, value);
            added += 1;
        }

        state.spent_voice_credits_hash = Some(fr_from_bytes(&batch.spent_voice_credits_hash)?);
        state.per_vo_spent_voice_credits_hash = Some(fr_from_bytes(&batch.per_vo_spent_voice_credits_hash)?);

        if state.status == RoundStatus::TallyPublished && state.results.len() == state.recipients.len()
        {
            state.transition(RoundStatus::ResultsAdded);
        }

        Ok(Receipt::success(gas(added)))
    }

    async fn publish_tally_hash(&self, tally_hash: &str) -> Result<Receipt>
    {
        let mut state = self.state();
        state.calls.push("publishTallyHash");

        if !state.is_open() { return Ok(Receipt::reverted("round closed", GAS_PER_TX)); }

        state.tally_hash = Some(tally_hash.to_owned());
        Ok(Receipt::success(gas(0)))
    }

    async fn finalize(&self, args: &FinalizeArgs) -> Result<Receipt>
    {
        let mut state = self.state();
        state.calls.push("finalize");

        if state.status != RoundStatus::ResultsAdded
        {
            return Ok(Receipt::reverted("incomplete tally results", GAS_PER_TX));
        }

        let total_spent = fr_from_bytes(&args.total_spent)?;
        let spent_hash = hash_left_right(total_spent, fr_from_bytes(&args.total_spent_salt)?)?;
        if Some(spent_hash) != state.spent_voice_credits_hash
        {
            return Ok(Receipt::reverted("incorrect spent voice credits", GAS_PER_TX));
        }
        if Some(fr_from_bytes(&args.per_vo_spent_voice_credits_commitment)?) != state.per_vo_spent_voice_credits_hash
        {
            return Ok(Receipt::reverted("incorrect per vote option spent voice credits", GAS_PER_TX));
        }

        let total_spent = fr_to_biguint(&total_spent);
        let alpha = match calc_alpha(
            &state.pool_amount,
            &state.total_votes_squares,
            &total_spent,
            &state.voice_credit_factor,
            &state.alpha_precision
        )
        {
            Ok(alpha) => alpha,
            Err(e) => return Ok(Receipt::reverted(e.to_string(), GAS_PER_TX)),
        };

        state.alpha = Some(alpha);
        state.total_spent = Some(total_spent);
        state.finalized_at = state.now;
        state.transition(RoundStatus::Finalized);

        Ok(Receipt::success(gas(0)))
    }

    async fn distribute(&self, _pool_id: PoolId, recipients: &[String], claims: &[u8]) -> Result<Receipt>
    {
        let mut state = self.state();
        state.calls.push("distribute");

        if !state.is_finalized() || state.status == RoundStatus::EmergencyWithdrawn
        {
            return Ok(Receipt::reverted("not distributable", GAS_PER_TX));
        }

        let Ok(ClaimBatch(claims)) = ClaimBatch::decode(&mut &claims[..]) else {
            return Ok(Receipt::reverted("malformed claims", GAS_PER_TX));
        };
        if claims.first().map(|claim| claim.recipient_index).is_some_and(|start| Some(start) == state.revert_claim_at)
        {
            return Ok(Receipt::reverted("out of gas", GAS_PER_TX));
        }
        if claims.len() != recipients.len()
        {
            return Ok(Receipt::reverted("recipient count mismatch", GAS_PER_TX));
        }

        let mut payouts = Vec::with_capacity(claims.len());
        let mut total = BigUint::zero();
        for (claim, recipient) in claims.iter().zip(recipients)
        {
            if state.claimed.contains(&claim.recipient_index)
            {
                return Ok(Receipt::reverted("already claimed", GAS_PER_TX));
            }
            if !state.verify_claim(claim)?
            {
                return Ok(Receipt::reverted(format!("invalid claim for index {}", claim.recipient_index), GAS_PER_TX));
            }
            let Some(amount) = state.payout(claim)? else {
                return Ok(Receipt::reverted("no result for recipient", GAS_PER_TX));
            };

            total += &amount;
            payouts.push((claim.recipient_index, recipient.clone(), amount));
        }

        if total > state.balance
        {
            return Ok(Receipt::reverted("insufficient balance", GAS_PER_TX));
        }

        state.balance -= &total;
        for (index, recipient, amount) in payouts
        {
            state.claimed.insert(index);
            *state.payouts.entry(recipient).or_default() += amount;
        }

        if state.status == RoundStatus::Finalized
        {
            state.transition(RoundStatus::Distributing);
        }

        let outstanding = state.results.iter().any(|(index, result)| !result.is_zero() && !state.claimed.contains(index));
        if !outstanding && state.status != RoundStatus::Distributed
        {
            state.transition(RoundStatus::Distributed);
        }

        Ok(Receipt::success(gas(claims.len())))
    }

    async fn cancel(&self) -> Result<Receipt>
    {
        let mut state = self.state();
        state.calls.push("cancel");

        if !state.is_open() { return Ok(Receipt::reverted("round closed", GAS_PER_TX)); }

        state.transition(RoundStatus::Cancelled);
        Ok(Receipt::success(gas(0)))
    }

    async fn withdraw(&self, _asset: &Asset) -> Result<Receipt>
    {
        let mut state = self.state();
        state.calls.push("withdraw");

        if state.status != RoundStatus::Cancelled { return Ok(Receipt::reverted("round not cancelled", GAS_PER_TX)); }

        state.balance = BigUint::zero();
        Ok(Receipt::success(gas(0)))
    }

    async fn emergency_withdraw(&self, _asset: &Asset) -> Result<Receipt>
    {
        let mut state = self.state();
        state.calls.push("emergencyWithdraw");

        if !state.is_finalized() || state.status == RoundStatus::EmergencyWithdrawn
        {
            return Ok(Receipt::reverted("not finalized", GAS_PER_TX));
        }
        if state.now < state.finalized_at + state.emergency_withdrawal_delay
        {
            return Ok(Receipt::reverted("too early", GAS_PER_TX));
        }

        state.balance = BigUint::zero();
        state.transition(RoundStatus::EmergencyWithdrawn);
        Ok(Receipt::success(gas(0)))
    }
}

/// A tally engine handing back a fixed tally.
pub struct StaticTally(pub TallyResult);

#[async_trait]
impl crate::source::TallyEngine for StaticTally
{
    async fn compute_tally(&self, _poll: &PollContracts, _key: &crate::source::CoordinatorKey) -> Result<qf_engine::TallyArtifact>
    {
        Ok(qf_engine::TallyArtifact::from(&self.0))
    }
}
