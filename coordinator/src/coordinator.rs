use num_bigint::BigUint;
use tracing::{error, info, warn};

use qf_engine::hash::{biguint_to_bytes, fr_to_bytes};
use qf_engine::{allocations, calc_alpha, collect_claimable_indices, verify_tally, Allocation, TallyResult, VoteOptionIndex};

use crate::config::CoordinatorConfig;
use crate::contract::{Asset, FinalizeArgs, Gas, Receipt, RoundContract, TxStatus};
use crate::distribute::{DistributionOutcome, Distributor};
use crate::report::{collect_rows, ReportRow};
use crate::round::RoundSnapshot;
use crate::source::{CoordinatorKey, TallyEngine};
use crate::submit::TallySubmitter;
use crate::{Error, Result};

/// Drives a single round through publication, result submission, finalization and distribution.
pub struct Coordinator<C>
{
    contract: C,
    config: CoordinatorConfig
}

impl<C: RoundContract> Coordinator<C>
{
    pub fn new(contract: C, config: CoordinatorConfig) -> Self
    {
        Coordinator { contract, config }
    }

    pub fn contract(&self) -> &C
    {
        &self.contract
    }

    pub fn config(&self) -> &CoordinatorConfig
    {
        &self.config
    }

    /// Compute the round's tally and verify it before it is used for anything.
    pub async fn tally<E: TallyEngine + ?Sized>(&self, engine: &E, key: &CoordinatorKey) -> Result<TallyResult>
    {
        let poll = self.contract.poll_contracts().await?;
        let tally = engine.compute_tally(&poll, key).await?.parse()?;

        verify_tally(&tally, self.config.vote_option_tree_depth)?;
        info!(poll = %poll.poll, slots = tally.len(), "tally verified");

        Ok(tally)
    }

    /// Publish the location of the tally artifact.
    pub async fn publish_tally_hash(&self, tally_hash: &str) -> Result<Gas>
    {
        RoundSnapshot::read(&self.contract).await?.ensure_open()?;
        let receipt = self.contract.publish_tally_hash(tally_hash).await?;
        settle("publishTallyHash", receipt)
    }

    /// Add the tally's results from the configured start index.
    pub async fn submit_results(&self, tally: &TallyResult) -> Result<Gas>
    {
        TallySubmitter::new(&self.contract, self.config.vote_option_tree_depth)
            .submit_tally_batch(tally, self.config.tally_batch_size, self.config.start_index)
            .await
    }

    /// Fix the round's alpha from the added results.
    pub async fn finalize(&self, tally: &TallyResult) -> Result<Gas>
    {
        let commitments = verify_tally(tally, self.config.vote_option_tree_depth)?;
        RoundSnapshot::read(&self.contract).await?.ensure_open()?;

        let on_chain = self.contract.total_votes_squares().await?;
        let local = tally.total_votes_squares();
        if on_chain != local
        {
            warn!(%on_chain, %local, "on-chain total votes squares disagrees with the tally");
        }

        let args = FinalizeArgs {
            total_spent: biguint_to_bytes(&tally.total_spent_voice_credits)?,
            total_spent_salt: fr_to_bytes(&tally.total_spent_salt),
            results_commitment: fr_to_bytes(&commitments.results),
            per_vo_spent_voice_credits_commitment: fr_to_bytes(&commitments.per_vo_spent_voice_credits)
        };

        let receipt = self.contract.finalize(&args).await?;
        settle("finalize", receipt)
    }

    /// The alpha the round contract derives, from its current on-chain parameters.
    pub async fn alpha(&self, tally: &TallyResult) -> Result<BigUint>
    {
        let (budget, total_votes_squares, voice_credit_factor, alpha_precision) = futures::try_join!(
            self.contract.pool_amount(),
            self.contract.total_votes_squares(),
            self.contract.voice_credit_factor(),
            self.contract.alpha_precision()
        )?;

        Ok(calc_alpha(
            &budget,
            &total_votes_squares,
            &tally.total_spent_voice_credits,
            &voice_credit_factor,
            &alpha_precision
        )?)
    }

    /// The payout of every recipient that received votes.
    pub async fn allocations(&self, tally: &TallyResult) -> Result<Vec<Allocation>>
    {
        let alpha = self.alpha(tally).await?;
        let (voice_credit_factor, alpha_precision) = futures::try_join!(
            self.contract.voice_credit_factor(),
            self.contract.alpha_precision()
        )?;

        Ok(allocations(tally, &alpha, &voice_credit_factor, &alpha_precision)?)
    }

    /// The allocation report, with recipient metadata looked up on-chain.
    pub async fn report(&self, tally: &TallyResult) -> Result<Vec<ReportRow>>
    {
        let allocations = self.allocations(tally).await?;
        collect_rows(&self.contract, &allocations).await
    }

    /// Pay every recipient that received votes.
    pub async fn distribute(&self, tally: &TallyResult) -> Result<DistributionOutcome>
    {
        self.distribute_from(tally, 0).await
    }

    /// Pay every recipient that received votes from `start_index` onwards, resuming
    /// a distribution that failed with [`Error::SubmissionFailed`].
    pub async fn distribute_from(&self, tally: &TallyResult, start_index: VoteOptionIndex) -> Result<DistributionOutcome>
    {
        let claimable: Vec<_> = collect_claimable_indices(tally)
            .into_iter()
            .filter(|&index| index >= start_index)
            .collect();

        self.distribute_indices(tally, &claimable).await
    }

    /// Pay the recipients at `claimable`.
    pub async fn distribute_indices(&self, tally: &TallyResult, claimable: &[VoteOptionIndex]) -> Result<DistributionOutcome>
    {
        Distributor::new(
            &self.contract,
            self.config.vote_option_tree_depth,
            self.config.pool_id,
            self.config.asset()
        )
        .distribute(tally, claimable, self.config.distribute_batch_size)
        .await
    }

    pub async fn cancel(&self) -> Result<Gas>
    {
        RoundSnapshot::read(&self.contract).await?.ensure_open()?;
        let receipt = self.contract.cancel().await?;
        settle("cancel", receipt)
    }

    /// Recover the balance of a cancelled round.
    pub async fn withdraw(&self, asset: &Asset) -> Result<Gas>
    {
        RoundSnapshot::read(&self.contract).await?.ensure_withdrawable()?;
        let receipt = self.contract.withdraw(asset).await?;
        settle("withdraw", receipt)
    }

    /// Recover the remaining balance once the emergency delay has elapsed.
    pub async fn emergency_withdraw(&self, asset: &Asset) -> Result<Gas>
    {
        RoundSnapshot::read(&self.contract).await?.ensure_emergency_withdrawable()?;
        let receipt = self.contract.emergency_withdraw(asset).await?;
        settle("emergencyWithdraw", receipt)
    }
}

fn settle(call: &'static str, receipt: Receipt) -> Result<Gas>
{
    match receipt.status
    {
        TxStatus::Success => {
            info!(call, gas_used = receipt.gas_used, "transaction confirmed");
            Ok(receipt.gas_used)
        },
        TxStatus::Reverted(reason) => {
            error!(call, %reason, "transaction reverted");
            Err(Error::TransactionReverted { call, reason })
        },
    }
}
