use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use qf_coordinator::cli::{self, CommitmentReport, RoundParams, TreeKind};
use qf_coordinator::{write_csv, CoordinatorConfig, CoordinatorKey, FileTally, PollContracts, RecipientDirectory, TallyEngine};
use qf_engine::{verify_tally, VoteOptionIndex};

#[derive(Parser)]
#[command(version, about = "Verify quadratic funding tallies and compute their payouts")]
struct Args
{
    #[arg(short, long)]
    /// TOML configuration file
    config: Option<PathBuf>,

    #[arg(short, long)]
    /// Tally artifact, overriding `tally_file`
    tally: Option<PathBuf>,

    #[arg(short, long)]
    /// Vote option tree depth, overriding `vote_option_tree_depth`
    depth: Option<u8>,

    #[command(subcommand)]
    /// Sub command to execute
    command: Subcmd,
}

#[derive(Subcommand)]
enum Subcmd
{
    /// Check the tally against its commitments
    Verify,

    /// Compute the round's matching multiplier
    Alpha {
        #[command(flatten)]
        round: RoundParams,
    },

    /// Write the allocation report as CSV
    Report {
        #[command(flatten)]
        round: RoundParams,

        #[arg(long)]
        /// JSON object mapping vote option indices to recipient metadata
        recipients: Option<PathBuf>,

        #[arg(short, long)]
        /// Output path, overriding `report_file`
        output: Option<PathBuf>,
    },

    /// Print the SCALE encoded claim batches of every recipient that received votes
    Claims {
        #[arg(long)]
        /// Claims per batch, overriding `distribute_batch_size`
        batch_size: Option<u32>,
    },

    /// Print the inclusion proof of a vote option
    Proof {
        /// Vote option index
        index: VoteOptionIndex,

        #[arg(long, value_enum, default_value = "results")]
        /// The tree to prove against
        tree: TreeKind,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()>
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config
    {
        Some(path) => CoordinatorConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => CoordinatorConfig::default(),
    };
    if let Some(tally) = args.tally { config.tally_file = tally; }
    if let Some(depth) = args.depth { config.vote_option_tree_depth = depth; }
    config.validate()?;

    let artifact = FileTally::new(&config.tally_file)
        .compute_tally(&PollContracts::default(), &CoordinatorKey::new(""))
        .await
        .with_context(|| format!("reading {}", config.tally_file.display()))?;
    let tally = artifact.parse()?;
    let depth = config.vote_option_tree_depth;

    let commitments = verify_tally(&tally, depth)?;
    let mut stdout = std::io::stdout().lock();

    match args.command
    {
        Subcmd::Verify => {
            serde_json::to_writer_pretty(&mut stdout, &CommitmentReport::from(&commitments))?;
        },

        Subcmd::Alpha { round } => {
            write!(stdout, "{}", cli::alpha(&tally, &round)?)?;
        },

        Subcmd::Report { round, recipients, output } => {
            let directory = match recipients
            {
                Some(path) => Some(RecipientDirectory::load(&path).with_context(|| format!("loading {}", path.display()))?),
                None => None,
            };
            let rows = cli::report_rows(&tally, &round, directory.as_ref())?;

            let output = output.unwrap_or(config.report_file);
            let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
            write_csv(&rows, BufWriter::new(file))?;

            info!(path = %output.display(), recipients = rows.len(), "allocation report written");
            return Ok(());
        },

        Subcmd::Claims { batch_size } => {
            let batch_size = batch_size.unwrap_or(config.distribute_batch_size);
            let batches = cli::claim_batches(&tally, &commitments, depth, batch_size)?;
            serde_json::to_writer_pretty(&mut stdout, &batches)?;
        },

        Subcmd::Proof { index, tree } => {
            serde_json::to_writer_pretty(&mut stdout, &cli::proof(&tally, depth, index, tree)?)?;
        },
    }

    writeln!(stdout)?;
    Ok(())
}
