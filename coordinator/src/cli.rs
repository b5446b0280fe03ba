//! The offline commands of the `qf-coordinator` binary, working from a tally
//! artifact alone.

use codec::Encode;
use num_bigint::BigUint;
use serde::Serialize;

use qf_engine::hash::{fr_to_biguint, fr_to_hex};
use qf_engine::{
    allocations, calc_alpha, collect_claimable_indices, parse_uint, ClaimBuilder, QuinTree, TallyCommitments,
    TallyResult, VoteOptionIndex,
};

use crate::report::{RecipientDirectory, ReportRow};
use crate::Result;

/// The round parameters the contract would hold.
#[derive(Clone, Debug, clap::Args)]
pub struct RoundParams
{
    #[arg(long, value_parser = parse_amount)]
    /// Matching budget in token units, contributions included
    pub budget: BigUint,

    #[arg(long, value_parser = parse_amount, default_value = "1")]
    /// Token units per voice credit
    pub voice_credit_factor: BigUint,

    #[arg(long, value_parser = parse_amount, default_value = "1000000000000000000")]
    /// Fixed point scale of alpha
    pub alpha_precision: BigUint,

    #[arg(long, value_parser = parse_amount)]
    /// Sum of squared results, derived from the tally when omitted
    pub total_votes_squares: Option<BigUint>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum TreeKind
{
    /// The results tree
    Results,

    /// The per vote option spent voice credits tree
    Spent,
}

/// The commitments of a verified tally, as printed by `verify`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentReport
{
    pub results: String,
    pub spent_voice_credits: String,
    #[serde(rename = "perVOSpentVoiceCredits")]
    pub per_vo_spent_voice_credits: String,
    pub tally: String
}

impl From<&TallyCommitments> for CommitmentReport
{
    fn from(commitments: &TallyCommitments) -> Self
    {
        CommitmentReport {
            results: fr_to_hex(&commitments.results),
            spent_voice_credits: fr_to_hex(&commitments.spent_voice_credits),
            per_vo_spent_voice_credits: fr_to_hex(&commitments.per_vo_spent_voice_credits),
            tally: fr_to_hex(&commitments.tally)
        }
    }
}

/// A single `distribute` transaction's payload.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct EncodedClaims
{
    /// The vote option indices claimed, in claim order.
    pub indices: Vec<VoteOptionIndex>,

    /// The `0x` prefixed SCALE encoded claim batch.
    pub claims: String
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofReport
{
    pub index: VoteOptionIndex,
    pub leaf: String,
    pub root: String,
    pub commitment: String,
    pub path_elements: Vec<Vec<String>>,
    pub path_indices: Vec<u8>
}

pub fn parse_amount(value: &str) -> core::result::Result<BigUint, String>
{
    parse_uint(value).map_err(|e| e.to_string())
}

/// The round's alpha, deriving the total votes squares from the tally unless given.
pub fn alpha(tally: &TallyResult, round: &RoundParams) -> Result<BigUint>
{
    let total_votes_squares = round.total_votes_squares.clone().unwrap_or_else(|| tally.total_votes_squares());

    Ok(calc_alpha(
        &round.budget,
        &total_votes_squares,
        &tally.total_spent_voice_credits,
        &round.voice_credit_factor,
        &round.alpha_precision
    )?)
}

/// The allocation report rows, named from `directory` where it knows the recipient.
pub fn report_rows(
    tally: &TallyResult,
    round: &RoundParams,
    directory: Option<&RecipientDirectory>
) -> Result<Vec<ReportRow>>
{
    let alpha = alpha(tally, round)?;
    let allocations = allocations(tally, &alpha, &round.voice_credit_factor, &round.alpha_precision)?;

    Ok(match directory
    {
        Some(directory) => directory.rows(&allocations),
        None => allocations.iter().map(ReportRow::anonymous).collect(),
    })
}

/// The claim batches paying every recipient that received votes.
///
/// - `tally`: The verified tally.
/// - `commitments`: The commitments of `tally`.
/// - `depth`: The vote option tree depth.
/// - `batch_size`: The number of claims per batch.
pub fn claim_batches(
    tally: &TallyResult,
    commitments: &TallyCommitments,
    depth: u8,
    batch_size: u32
) -> Result<Vec<EncodedClaims>>
{
    if batch_size == 0
    {
        return Err(qf_engine::Error::InvalidParameter("batch size must be non-zero").into());
    }

    let builder = ClaimBuilder::new(tally, commitments, depth)?;

    collect_claimable_indices(tally)
        .chunks(batch_size as usize)
        .map(|indices| {
            let claims = builder.build_batch(indices)?;
            Ok(EncodedClaims {
                indices: indices.to_vec(),
                claims: format!("0x{}", hex::encode(claims.encode()))
            })
        })
        .collect()
}

/// The inclusion proof of `index` in one of the tally's trees.
pub fn proof(tally: &TallyResult, depth: u8, index: VoteOptionIndex, kind: TreeKind) -> Result<ProofReport>
{
    let (leaves, salt) = match kind
    {
        TreeKind::Results => (tally.results_leaves()?, tally.results_salt),
        TreeKind::Spent => (tally.spent_leaves()?, tally.per_vo_spent_salt),
    };

    let tree = QuinTree::build(&leaves, depth)?;
    let proof = tree.gen_proof(index as u64)?;

    Ok(ProofReport {
        index,
        leaf: fr_to_biguint(&tree.leaf(index as u64)?).to_string(),
        root: fr_to_hex(&tree.root()),
        commitment: fr_to_hex(&tree.commitment(salt)?),
        path_elements: proof.path_elements
            .iter()
            .map(|siblings| siblings.iter().map(|s| fr_to_biguint(s).to_string()).collect())
            .collect(),
        path_indices: proof.path_indices
    })
}
