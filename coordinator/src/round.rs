use tracing::warn;

use crate::contract::{RoundContract, Timestamp};
use crate::error::Precondition;
use crate::Result;

/// The lifecycle of a funding round.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RoundStatus
{
    /// The coordinator has published the tally; results may be added.
    TallyPublished,

    /// Every recipient's result has been added.
    ResultsAdded,

    /// Alpha is fixed and claims may be paid.
    Finalized,

    /// Some, but not all, claims have been paid.
    Distributing,

    /// Every claim has been paid.
    Distributed,

    /// The round was abandoned before finalization.
    Cancelled,

    /// The remaining funds were recovered after the emergency delay.
    EmergencyWithdrawn,
}

impl RoundStatus
{
    pub fn can_transition_to(self, next: RoundStatus) -> bool
    {
        use RoundStatus::*;

        matches!(
            (self, next),
            (TallyPublished, ResultsAdded)
                | (ResultsAdded, Finalized)
                | (Finalized, Distributing)
                | (Distributing, Distributed)
                | (TallyPublished | ResultsAdded, Cancelled)
                | (Finalized | Distributing | Distributed, EmergencyWithdrawn)
        )
    }

    pub fn is_terminal(self) -> bool
    {
        matches!(self, RoundStatus::Cancelled | RoundStatus::EmergencyWithdrawn)
    }
}

/// The round state the coordinator's preconditions are checked against.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RoundSnapshot
{
    pub is_finalized: bool,
    pub is_cancelled: bool,

    /// When the round was finalized, zero if it has not been.
    pub finalized_at: Timestamp,

    /// Seconds after finalization before funds may be recovered.
    pub emergency_withdrawal_delay: Timestamp,

    /// The timestamp of the latest block.
    pub now: Timestamp
}

impl RoundSnapshot
{
    /// Read the snapshot, issuing every call concurrently.
    pub async fn read<C: RoundContract + ?Sized>(contract: &C) -> Result<Self>
    {
        let (is_finalized, is_cancelled, finalized_at, emergency_withdrawal_delay, now) = futures::try_join!(
            contract.is_finalized(),
            contract.is_cancelled(),
            contract.finalized_at(),
            contract.emergency_withdrawal_delay(),
            contract.now()
        )?;

        Ok(RoundSnapshot { is_finalized, is_cancelled, finalized_at, emergency_withdrawal_delay, now })
    }

    /// Results may be added, the tally published, and the round finalized or cancelled.
    pub fn ensure_open(&self) -> core::result::Result<(), Precondition>
    {
        if self.is_cancelled { return Err(rejected(Precondition::RoundCancelled)); }
        if self.is_finalized { return Err(rejected(Precondition::RoundFinalized)); }
        Ok(())
    }

    /// Claims may be paid.
    pub fn ensure_finalized(&self) -> core::result::Result<(), Precondition>
    {
        if self.is_cancelled { return Err(rejected(Precondition::RoundCancelled)); }
        if !self.is_finalized { return Err(rejected(Precondition::RoundNotFinalized)); }
        Ok(())
    }

    /// Contributions may be recovered by the pool manager.
    pub fn ensure_withdrawable(&self) -> core::result::Result<(), Precondition>
    {
        if self.is_finalized { return Err(rejected(Precondition::RoundFinalized)); }
        if !self.is_cancelled { return Err(rejected(Precondition::RoundNotCancelled)); }
        Ok(())
    }

    /// The remaining funds may be recovered after a stalled distribution.
    pub fn ensure_emergency_withdrawable(&self) -> core::result::Result<(), Precondition>
    {
        if !self.is_finalized { return Err(rejected(Precondition::RoundNotFinalized)); }

        let unlocked_at = self.finalized_at.saturating_add(self.emergency_withdrawal_delay);
        if self.now < unlocked_at
        {
            return Err(rejected(Precondition::EmergencyDelayNotElapsed { remaining: unlocked_at - self.now }));
        }

        Ok(())
    }
}

fn rejected(precondition: Precondition) -> Precondition
{
    warn!(%precondition, "precondition not met");
    precondition
}
