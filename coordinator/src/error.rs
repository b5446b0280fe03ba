use thiserror::Error;

use crate::contract::Gas;

pub type Result<T> = core::result::Result<T, Error>;

/// A round state that rules out the requested action.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Precondition
{
    #[error("the round is cancelled")]
    RoundCancelled,

    #[error("the round is not finalized")]
    RoundNotFinalized,

    #[error("the round is already finalized")]
    RoundFinalized,

    #[error("the round is not cancelled")]
    RoundNotCancelled,

    #[error("the emergency withdrawal delay has not elapsed ({remaining}s remaining)")]
    EmergencyDelayNotElapsed { remaining: u64 },
}

#[derive(Debug, Error)]
pub enum Error
{
    /// Tally, commitment or arithmetic failure.
    #[error(transparent)]
    Engine(#[from] qf_engine::Error),

    /// The action would revert given the current round state.
    #[error("precondition not met: {0}")]
    PreconditionNotMet(#[from] Precondition),

    /// A batch transaction failed; `start_index` is the vote option index of its first entry.
    ///
    /// Resume result submission with `start_index` as the new start index, and
    /// distribution with [`crate::Coordinator::distribute_from`].
    #[error("batch starting at index {start_index} failed after {processed} recipients ({gas_used} gas used): {reason}")]
    SubmissionFailed {
        start_index: u32,
        processed: u32,
        gas_used: Gas,
        reason: String
    },

    /// A single round management transaction was reverted.
    #[error("{call} reverted: {reason}")]
    TransactionReverted { call: &'static str, reason: String },

    #[error("the contract reports {count} recipients but the tally has {slots} slots")]
    RecipientCountExceedsTally { count: u32, slots: usize },

    #[error("no recipient is registered at index {0}")]
    UnknownRecipient(u32),

    /// The contract could not be reached or returned garbage.
    #[error("contract call failed: {0}")]
    Contract(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
