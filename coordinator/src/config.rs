use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use qf_engine::{VoteOptionIndex, MAX_TREE_DEPTH};

use crate::contract::{Asset, PoolId};
use crate::{Error, Result};

/// Coordinator settings, read from a TOML file.
///
/// Absent keys take their default; unknown keys are rejected.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig
{
    /// Depth of the round's vote option tree.
    pub vote_option_tree_depth: u8,

    /// Results per `addTallyResultsBatch` transaction.
    pub tally_batch_size: u32,

    /// Claims per `distribute` transaction.
    pub distribute_batch_size: u32,

    /// The first vote option index to submit.
    pub start_index: VoteOptionIndex,

    /// The tally artifact.
    pub tally_file: PathBuf,

    /// The pool the distribution pays out of.
    pub pool_id: PoolId,

    /// The token contract the pool holds, the native asset when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Where the allocation report is written.
    pub report_file: PathBuf
}

impl Default for CoordinatorConfig
{
    fn default() -> Self
    {
        CoordinatorConfig {
            vote_option_tree_depth: 3,
            tally_batch_size: 20,
            distribute_batch_size: 20,
            start_index: 0,
            tally_file: PathBuf::from("tally.json"),
            pool_id: 0,
            token: None,
            report_file: PathBuf::from("allocations.csv")
        }
    }
}

impl CoordinatorConfig
{
    pub fn from_toml(source: &str) -> Result<Self>
    {
        let config: CoordinatorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self>
    {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()>
    {
        if self.vote_option_tree_depth == 0 || self.vote_option_tree_depth > MAX_TREE_DEPTH
        {
            return Err(Error::Config(format!(
                "vote_option_tree_depth must be between 1 and {}, got {}",
                MAX_TREE_DEPTH,
                self.vote_option_tree_depth
            )));
        }

        if self.tally_batch_size == 0 { return Err(Error::Config("tally_batch_size must be non-zero".into())); }
        if self.distribute_batch_size == 0 { return Err(Error::Config("distribute_batch_size must be non-zero".into())); }

        Ok(())
    }

    pub fn asset(&self) -> Asset
    {
        self.token.clone().map_or(Asset::Native, Asset::Token)
    }
}
