use ark_bn254::Fr;
use tracing::{debug, error};

use crate::hash::{fr_from_biguint, fr_to_hex, hash3, hash_left_right};
use crate::tally::{tree_commitment, TallyResult};
use crate::{CommitmentKind, Error, Result};

/// The commitments binding a tally, recomputed from its contents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TallyCommitments
{
    /// Salted root of the results tree.
    pub results: Fr,

    /// Hash of the total spent voice credits and its salt.
    pub spent_voice_credits: Fr,

    /// Salted root of the per vote option spent voice credits tree.
    pub per_vo_spent_voice_credits: Fr,

    /// `hash3(results, spent_voice_credits, per_vo_spent_voice_credits)`.
    pub tally: Fr
}

impl TallyCommitments
{
    /// Recompute every commitment of `tally` for trees of the given depth.
    pub fn compute(tally: &TallyResult, depth: u8) -> Result<Self>
    {
        let results = tree_commitment(&tally.results_leaves()?, tally.results_salt, depth)?;

        let spent_voice_credits = hash_left_right(
            fr_from_biguint(&tally.total_spent_voice_credits)?,
            tally.total_spent_salt
        )?;

        let per_vo_spent_voice_credits = tree_commitment(
            &tally.spent_leaves()?,
            tally.per_vo_spent_salt,
            depth
        )?;

        let aggregate = hash3([results, spent_voice_credits, per_vo_spent_voice_credits])?;

        Ok(TallyCommitments {
            results,
            spent_voice_credits,
            per_vo_spent_voice_credits,
            tally: aggregate
        })
    }
}

/// Check the tally against the commitment its coordinator claimed.
///
/// Any sub-commitments recorded in the artifact are checked first so that a
/// mismatch names the offending component. A mismatch is always an error.
pub fn verify_tally(tally: &TallyResult, depth: u8) -> Result<TallyCommitments>
{
    let computed = TallyCommitments::compute(tally, depth)?;

    let checks = [
        (CommitmentKind::Results, tally.claimed_results_commitment, computed.results),
        (CommitmentKind::SpentVoiceCredits, tally.claimed_spent_voice_credits_commitment, computed.spent_voice_credits),
        (CommitmentKind::PerVOSpentVoiceCredits, tally.claimed_per_vo_spent_voice_credits_commitment, computed.per_vo_spent_voice_credits),
        (CommitmentKind::Tally, Some(tally.new_tally_commitment), computed.tally),
    ];

    for (kind, claimed, recomputed) in checks
    {
        let Some(claimed) = claimed else { continue };
        ensure_matches(kind, claimed, recomputed)?;
    }

    debug!(commitment = %fr_to_hex(&computed.tally), "tally commitment verified");
    Ok(computed)
}

fn ensure_matches(kind: CommitmentKind, expected: Fr, computed: Fr) -> Result<()>
{
    if expected == computed { return Ok(()); }

    let expected = fr_to_hex(&expected);
    let computed = fr_to_hex(&computed);
    error!(%kind, %expected, %computed, "commitment mismatch");

    Err(Error::CommitmentMismatch { kind, expected, computed })
}
