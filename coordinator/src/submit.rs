use tracing::{debug, error, info};

use qf_engine::{verify_tally, ResultsBatcher, TallyResult, VoteOptionIndex};

use crate::contract::{Gas, RoundContract, TxStatus};
use crate::round::RoundSnapshot;
use crate::{Error, Result};

/// Adds a verified tally's results to the round, one batch per transaction.
pub struct TallySubmitter<'a, C: ?Sized>
{
    contract: &'a C,
    depth: u8
}

impl<'a, C: RoundContract + ?Sized> TallySubmitter<'a, C>
{
    /// - `contract`: The round the results are added to.
    /// - `depth`: The vote option tree depth of the round's poll.
    pub fn new(contract: &'a C, depth: u8) -> Self
    {
        TallySubmitter { contract, depth }
    }

    /// Submit the results of `start_index..recipient_count`, returning the total gas used.
    ///
    /// - `tally`: The tally to submit; it is verified before anything is sent.
    /// - `batch_size`: The number of results per transaction.
    /// - `start_index`: The first vote option index to submit, used to resume a failed run.
    ///
    /// Indices already recorded on-chain are skipped by the contract, so
    /// overlapping a previous run is harmless.
    pub async fn submit_tally_batch(
        &self,
        tally: &TallyResult,
        batch_size: u32,
        start_index: VoteOptionIndex
    ) -> Result<Gas>
    {
        if batch_size == 0
        {
            Err(qf_engine::Error::InvalidParameter("batch size must be non-zero"))?
        }

        let commitments = verify_tally(tally, self.depth)?;
        RoundSnapshot::read(self.contract).await?.ensure_open()?;

        let recipient_count = self.contract.recipient_count().await?;
        if recipient_count as usize > tally.len()
        {
            return Err(Error::RecipientCountExceedsTally { count: recipient_count, slots: tally.len() });
        }

        if start_index >= recipient_count
        {
            debug!(start_index, recipient_count, "no results left to submit");
            return Ok(0);
        }

        let batcher = ResultsBatcher::new(tally, &commitments, self.depth)?;
        let mut gas_used: Gas = 0;
        let mut index = start_index;

        while index < recipient_count
        {
            let end = index.saturating_add(batch_size).min(recipient_count);
            let batch = batcher.batch(index..end)?;

            info!(start = index, end, "adding tally results batch");

            let failed = |reason: String, gas_used: Gas| {
                error!(start = index, %reason, "tally results batch failed");
                Error::SubmissionFailed { start_index: index, processed: index - start_index, gas_used, reason }
            };

            let receipt = self.contract
                .add_tally_results_batch(&batch)
                .await
                .map_err(|e| failed(e.to_string(), gas_used))?;

            gas_used = gas_used.saturating_add(receipt.gas_used);

            if let TxStatus::Reverted(reason) = receipt.status
            {
                return Err(failed(reason, gas_used));
            }

            index = end;
        }

        info!(recipients = recipient_count - start_index, gas_used, "tally results added");
        Ok(gas_used)
    }
}
