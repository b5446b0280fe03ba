use codec::Encode;
use futures::future::try_join_all;
use num_bigint::BigUint;
use tracing::{error, info};

use qf_engine::{verify_tally, ClaimBuilder, TallyResult, VoteOptionIndex};

use crate::contract::{Asset, Gas, PoolId, RoundContract, TxStatus};
use crate::round::RoundSnapshot;
use crate::{Error, Result};

/// The pool balance around a distribution run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DistributionOutcome
{
    /// The balance read before the first batch.
    pub pool_before: BigUint,

    /// The balance read after the last batch.
    pub pool_after: BigUint,

    /// The number of claims paid.
    pub claims: usize,

    pub gas_used: Gas
}

impl DistributionOutcome
{
    /// The amount paid out by the run.
    pub fn distributed(&self) -> BigUint
    {
        if self.pool_before > self.pool_after { &self.pool_before - &self.pool_after } else { BigUint::default() }
    }
}

/// Pays recipients out of a finalized round.
pub struct Distributor<'a, C: ?Sized>
{
    contract: &'a C,
    depth: u8,
    pool_id: PoolId,
    asset: Asset
}

impl<'a, C: RoundContract + ?Sized> Distributor<'a, C>
{
    /// - `contract`: The finalized round.
    /// - `depth`: The vote option tree depth of the round's poll.
    /// - `pool_id`: The pool to pay out of.
    /// - `asset`: The token the pool holds.
    pub fn new(contract: &'a C, depth: u8, pool_id: PoolId, asset: Asset) -> Self
    {
        Distributor { contract, depth, pool_id, asset }
    }

    /// Claim the allocations of `claimable`, one transaction per `batch_size` recipients.
    ///
    /// - `tally`: The tally the round was finalized with.
    /// - `claimable`: The vote option indices to pay, see [`qf_engine::collect_claimable_indices`].
    /// - `batch_size`: The number of claims per transaction.
    pub async fn distribute(
        &self,
        tally: &TallyResult,
        claimable: &[VoteOptionIndex],
        batch_size: u32
    ) -> Result<DistributionOutcome>
    {
        if batch_size == 0
        {
            Err(qf_engine::Error::InvalidParameter("batch size must be non-zero"))?
        }

        let commitments = verify_tally(tally, self.depth)?;
        RoundSnapshot::read(self.contract).await?.ensure_finalized()?;

        let builder = ClaimBuilder::new(tally, &commitments, self.depth)?;
        let recipients = try_join_all(claimable.iter().map(|&index| self.recipient_id(index))).await?;

        let pool_before = self.contract.balance(&self.asset).await?;
        info!(pool = %pool_before, asset = %self.asset, claims = claimable.len(), "distributing");

        let mut gas_used: Gas = 0;
        let mut processed = 0usize;

        for (indices, ids) in claimable.chunks(batch_size as usize).zip(recipients.chunks(batch_size as usize))
        {
            let claims = builder.build_batch(indices)?;

            let failed = |reason: String, gas_used: Gas| {
                error!(start = indices[0], %reason, "distribution batch failed");
                Error::SubmissionFailed {
                    start_index: indices[0],
                    processed: processed as u32,
                    gas_used,
                    reason
                }
            };

            let receipt = self.contract
                .distribute(self.pool_id, ids, &claims.encode())
                .await
                .map_err(|e| failed(e.to_string(), gas_used))?;

            gas_used = gas_used.saturating_add(receipt.gas_used);

            if let TxStatus::Reverted(reason) = receipt.status
            {
                return Err(failed(reason, gas_used));
            }

            processed += indices.len();
        }

        let pool_after = self.contract.balance(&self.asset).await?;
        info!(pool = %pool_after, claims = processed, gas_used, "distribution complete");

        Ok(DistributionOutcome { pool_before, pool_after, claims: processed, gas_used })
    }

    async fn recipient_id(&self, index: VoteOptionIndex) -> Result<String>
    {
        let Some(recipient) = self.contract.recipient(index).await? else {
            Err(Error::UnknownRecipient(index))?
        };

        Ok(recipient.id)
    }
}
