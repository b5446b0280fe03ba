use std::path::Path;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::hash::{fr_from_biguint, fr_to_biguint, fr_to_hex};
use crate::tally::TallyResult;
use crate::{Error, Result};

/// A tallied vector, either the vote option results or the per vote option spent credits.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TallyVector
{
    /// One decimal string per vote option.
    pub tally: Vec<String>,

    /// The salt of the vector's commitment.
    pub salt: String,

    /// The salted commitment, if the pipeline recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct SpentVoiceCredits
{
    /// The total voice credits spent across every vote option.
    pub spent: String,

    /// The salt of the spent commitment.
    pub salt: String,

    /// The hash of `spent` and `salt`, if the pipeline recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>
}

/// The JSON tally file written by the off-chain tally pipeline.
///
/// Integers are carried as strings so that no precision is lost on the way in;
/// they are only parsed at this boundary.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyArtifact
{
    /// The results tally, one entry per vote option.
    pub results: TallyVector,

    /// The aggregate spent voice credits.
    pub total_spent_voice_credits: SpentVoiceCredits,

    /// The spent voice credits per vote option.
    #[serde(rename = "perVOSpentVoiceCredits")]
    pub per_vo_spent_voice_credits: TallyVector,

    /// The coordinator's claimed aggregate commitment.
    pub new_tally_commitment: String,

    /// Provenance fields (`maci`, `pollId`, `network`, ...), carried through untouched.
    #[serde(flatten)]
    pub metadata: Map<String, Value>
}

impl TallyArtifact
{
    pub fn from_json(json: &str) -> Result<Self>
    {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String>
    {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read the artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self>
    {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse every string into its numeric form, validating the structural invariants.
    pub fn parse(&self) -> Result<TallyResult>
    {
        let results_tally = parse_vector(&self.results.tally, "results.tally")?;
        let per_vo_spent_voice_credits = parse_vector(
            &self.per_vo_spent_voice_credits.tally,
            "perVOSpentVoiceCredits.tally"
        )?;

        if results_tally.len() != per_vo_spent_voice_credits.len()
        {
            return Err(Error::InvalidArtifact(format!(
                "results has {} entries but perVOSpentVoiceCredits has {}",
                results_tally.len(),
                per_vo_spent_voice_credits.len()
            )));
        }

        Ok(TallyResult {
            results_tally,
            results_salt: parse_field(&self.results.salt, "results.salt")?,
            per_vo_spent_voice_credits,
            per_vo_spent_salt: parse_field(&self.per_vo_spent_voice_credits.salt, "perVOSpentVoiceCredits.salt")?,
            total_spent_voice_credits: parse_bounded(&self.total_spent_voice_credits.spent, "totalSpentVoiceCredits.spent")?,
            total_spent_salt: parse_field(&self.total_spent_voice_credits.salt, "totalSpentVoiceCredits.salt")?,
            new_tally_commitment: parse_field(&self.new_tally_commitment, "newTallyCommitment")?,
            claimed_results_commitment: parse_optional_field(&self.results.commitment, "results.commitment")?,
            claimed_spent_voice_credits_commitment: parse_optional_field(
                &self.total_spent_voice_credits.commitment,
                "totalSpentVoiceCredits.commitment"
            )?,
            claimed_per_vo_spent_voice_credits_commitment: parse_optional_field(
                &self.per_vo_spent_voice_credits.commitment,
                "perVOSpentVoiceCredits.commitment"
            )?
        })
    }
}

impl From<&TallyResult> for TallyArtifact
{
    fn from(tally: &TallyResult) -> Self
    {
        let to_strings = |values: &[BigUint]| -> Vec<String> { values.iter().map(|v| v.to_string()).collect() };

        TallyArtifact {
            results: TallyVector {
                tally: to_strings(&tally.results_tally),
                salt: fr_to_biguint(&tally.results_salt).to_string(),
                commitment: tally.claimed_results_commitment.as_ref().map(fr_to_hex)
            },
            total_spent_voice_credits: SpentVoiceCredits {
                spent: tally.total_spent_voice_credits.to_string(),
                salt: fr_to_biguint(&tally.total_spent_salt).to_string(),
                commitment: tally.claimed_spent_voice_credits_commitment.as_ref().map(fr_to_hex)
            },
            per_vo_spent_voice_credits: TallyVector {
                tally: to_strings(&tally.per_vo_spent_voice_credits),
                salt: fr_to_biguint(&tally.per_vo_spent_salt).to_string(),
                commitment: tally.claimed_per_vo_spent_voice_credits_commitment.as_ref().map(fr_to_hex)
            },
            new_tally_commitment: fr_to_hex(&tally.new_tally_commitment),
            metadata: Map::new()
        }
    }
}

/// Parse a decimal or `0x` prefixed hexadecimal unsigned integer.
pub fn parse_uint(value: &str) -> Result<BigUint>
{
    let trimmed = value.trim();
    let (digits, radix) = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };

    if digits.is_empty()
    {
        return Err(Error::InvalidArtifact(format!("empty integer {:?}", value)));
    }

    // `parse_bytes` tolerates `_` separators and a leading sign; the artifact carries neither.
    if !digits.chars().all(|c| c.is_digit(radix))
    {
        return Err(Error::InvalidArtifact(format!("malformed integer {:?}", value)));
    }

    BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| Error::InvalidArtifact(format!("malformed integer {:?}", value)))
}

fn parse_vector(values: &[String], field: &str) -> Result<Vec<BigUint>>
{
    values
        .iter()
        .map(|value| parse_bounded(value, field))
        .collect()
}

/// Parse an integer which is later hashed, and so must be a field element.
fn parse_bounded(value: &str, field: &str) -> Result<BigUint>
{
    let parsed = parse_uint(value)?;
    fr_from_biguint(&parsed)
        .map_err(|_| Error::InvalidFieldElement(format!("{} = {}", field, value)))?;
    Ok(parsed)
}

fn parse_field(value: &str, field: &str) -> Result<ark_bn254::Fr>
{
    fr_from_biguint(&parse_uint(value)?)
        .map_err(|_| Error::InvalidFieldElement(format!("{} = {}", field, value)))
}

fn parse_optional_field(value: &Option<String>, field: &str) -> Result<Option<ark_bn254::Fr>>
{
    value
        .as_deref()
        .map(|v| parse_field(v, field))
        .transpose()
}
