//! Drives a quadratic funding round from a verified tally to executed payouts.
//!
//! Every write is issued sequentially and awaited before the next; all progress
//! lives on-chain, so an interrupted run is resumed by re-invoking it from the
//! index reported in the error.

pub mod cli;
pub mod config;
pub mod contract;
pub mod coordinator;
pub mod distribute;
pub mod error;
pub mod report;
pub mod round;
pub mod source;
pub mod submit;

pub use config::CoordinatorConfig;
pub use contract::*;
pub use coordinator::Coordinator;
pub use distribute::{DistributionOutcome, Distributor};
pub use error::{Error, Precondition, Result};
pub use report::{collect_rows, write_csv, RecipientDirectory, ReportRow, REPORT_HEADER};
pub use round::{RoundSnapshot, RoundStatus};
pub use source::{CoordinatorKey, FileTally, TallyEngine};
pub use submit::TallySubmitter;

#[cfg(test)]
mod mock;
