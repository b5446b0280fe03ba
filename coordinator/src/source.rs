use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use qf_engine::TallyArtifact;

use crate::contract::PollContracts;
use crate::Result;

/// The coordinator's serialized MACI private key.
#[derive(Clone, Eq, PartialEq)]
pub struct CoordinatorKey(String);

impl CoordinatorKey
{
    pub fn new(key: impl Into<String>) -> Self
    {
        CoordinatorKey(key.into())
    }

    pub fn expose(&self) -> &str
    {
        &self.0
    }
}

impl core::fmt::Debug for CoordinatorKey
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result
    {
        f.write_str("CoordinatorKey(<redacted>)")
    }
}

/// Produces the tally of a poll, including the zero knowledge proving that backs it.
#[async_trait]
pub trait TallyEngine: Send + Sync
{
    async fn compute_tally(&self, poll: &PollContracts, coordinator_key: &CoordinatorKey) -> Result<TallyArtifact>;
}

/// Reads the artifact an external tally pipeline has already written.
#[derive(Clone, Debug)]
pub struct FileTally
{
    path: PathBuf
}

impl FileTally
{
    pub fn new(path: impl Into<PathBuf>) -> Self
    {
        FileTally { path: path.into() }
    }
}

#[async_trait]
impl TallyEngine for FileTally
{
    async fn compute_tally(&self, poll: &PollContracts, _coordinator_key: &CoordinatorKey) -> Result<TallyArtifact>
    {
        debug!(path = %self.path.display(), poll = %poll.poll, "reading tally artifact");

        let json = tokio::fs::read_to_string(&self.path).await?;
        Ok(TallyArtifact::from_json(&json)?)
    }
}
