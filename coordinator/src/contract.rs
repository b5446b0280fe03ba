use async_trait::async_trait;
use codec::{Decode, Encode};
use num_bigint::BigUint;
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use qf_engine::{HashBytes, TallyResultsBatch, VoteOptionIndex};

use crate::Result;

pub type Gas = u64;

/// Seconds since the unix epoch, as reported by the chain.
pub type Timestamp = u64;

/// The funding pool a distribution pays out of.
pub type PoolId = u64;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TxStatus
{
    Success,
    Reverted(String),
}

/// The mined outcome of a write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Receipt
{
    pub status: TxStatus,

    /// Gas consumed, charged whether or not the transaction reverted.
    pub gas_used: Gas
}

impl Receipt
{
    pub fn success(gas_used: Gas) -> Self
    {
        Receipt { status: TxStatus::Success, gas_used }
    }

    pub fn reverted(reason: impl Into<String>, gas_used: Gas) -> Self
    {
        Receipt { status: TxStatus::Reverted(reason.into()), gas_used }
    }

    pub fn is_success(&self) -> bool
    {
        self.status == TxStatus::Success
    }
}

/// The MACI contracts the round was created with.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollContracts
{
    pub poll: String,
    pub message_processor: String,
    pub tally: String
}

/// Registry metadata of a single recipient.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientInfo
{
    /// The registry identifier of the recipient.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub title: String,

    /// The address the allocation is paid to.
    #[serde(default)]
    pub payout_address: String
}

/// The token held by the round.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Asset
{
    #[default]
    Native,

    /// An ERC20 style token, by contract address.
    Token(String),
}

impl core::fmt::Display for Asset
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result
    {
        match self
        {
            Asset::Native => write!(f, "native"),
            Asset::Token(address) => write!(f, "{}", address),
        }
    }
}

/// The arguments of the `finalize` transaction.
#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo)]
pub struct FinalizeArgs
{
    /// The total spent voice credits.
    pub total_spent: HashBytes,

    /// The salt of the total spent voice credits commitment.
    pub total_spent_salt: HashBytes,

    /// The results commitment.
    pub results_commitment: HashBytes,

    /// The per vote option spent voice credits commitment.
    pub per_vo_spent_voice_credits_commitment: HashBytes
}

/// The funding round contract, as seen by the coordinator.
///
/// Reads have no side effects and may be issued concurrently. A write resolves
/// once its receipt is available; a reverted transaction is a successful call
/// carrying [`TxStatus::Reverted`], whereas `Err` means the outcome is unknown.
#[async_trait]
pub trait RoundContract: Send + Sync
{
    /// The matching budget, including contributions.
    async fn pool_amount(&self) -> Result<BigUint>;

    /// Sum of the squared results added so far.
    async fn total_votes_squares(&self) -> Result<BigUint>;

    async fn voice_credit_factor(&self) -> Result<BigUint>;

    async fn alpha_precision(&self) -> Result<BigUint>;

    async fn recipient_count(&self) -> Result<u32>;

    async fn poll_contracts(&self) -> Result<PollContracts>;

    async fn is_finalized(&self) -> Result<bool>;

    async fn is_cancelled(&self) -> Result<bool>;

    async fn finalized_at(&self) -> Result<Timestamp>;

    async fn emergency_withdrawal_delay(&self) -> Result<Timestamp>;

    /// The timestamp of the latest block.
    async fn now(&self) -> Result<Timestamp>;

    /// The round's balance of `asset`.
    async fn balance(&self, asset: &Asset) -> Result<BigUint>;

    /// Registry metadata of the recipient at `index`, if any is registered.
    async fn recipient(&self, index: VoteOptionIndex) -> Result<Option<RecipientInfo>>;

    async fn add_tally_results_batch(&self, batch: &TallyResultsBatch) -> Result<Receipt>;

    async fn publish_tally_hash(&self, tally_hash: &str) -> Result<Receipt>;

    async fn finalize(&self, args: &FinalizeArgs) -> Result<Receipt>;

    /// - `pool_id`: The pool to pay out of.
    /// - `recipients`: The registry identifiers of the claimed recipients, in claim order.
    /// - `claims`: A SCALE encoded [`qf_engine::ClaimBatch`].
    async fn distribute(&self, pool_id: PoolId, recipients: &[String], claims: &[u8]) -> Result<Receipt>;

    async fn cancel(&self) -> Result<Receipt>;

    async fn withdraw(&self, asset: &Asset) -> Result<Receipt>;

    async fn emergency_withdraw(&self, asset: &Asset) -> Result<Receipt>;
}
