use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use futures::future::try_join_all;
use num_bigint::BigUint;
use tracing::warn;

use qf_engine::{Allocation, VoteOptionIndex};

use crate::contract::{RecipientInfo, RoundContract};
use crate::Result;

pub const REPORT_HEADER: [&str; 4] = ["Recipient ID", "Allocated Amount", "Title", "Payout Address"];

/// A single line of the allocation report.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReportRow
{
    pub recipient_id: String,
    pub allocated_amount: BigUint,
    pub title: String,
    pub payout_address: String
}

impl ReportRow
{
    /// A row for an allocation whose recipient metadata is unavailable; the
    /// vote option index stands in for the identifier.
    pub fn anonymous(allocation: &Allocation) -> Self
    {
        ReportRow {
            recipient_id: allocation.index.to_string(),
            allocated_amount: allocation.amount.clone(),
            title: String::new(),
            payout_address: String::new()
        }
    }

    pub fn with_recipient(allocation: &Allocation, recipient: RecipientInfo) -> Self
    {
        ReportRow {
            recipient_id: recipient.id,
            allocated_amount: allocation.amount.clone(),
            title: recipient.title,
            payout_address: recipient.payout_address
        }
    }
}

/// Recipient metadata keyed by vote option index, for reporting without a chain client.
///
/// The JSON form is an object mapping the index to a [`RecipientInfo`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RecipientDirectory(pub HashMap<VoteOptionIndex, RecipientInfo>);

impl RecipientDirectory
{
    pub fn from_json(json: &str) -> Result<Self>
    {
        let entries: HashMap<String, RecipientInfo> = serde_json::from_str(json)?;
        let mut directory = HashMap::with_capacity(entries.len());

        for (index, recipient) in entries
        {
            let Ok(index) = index.trim().parse::<VoteOptionIndex>() else {
                Err(crate::Error::Config(format!("recipient directory key {:?} is not a vote option index", index)))?
            };
            directory.insert(index, recipient);
        }

        Ok(RecipientDirectory(directory))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self>
    {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn rows(&self, allocations: &[Allocation]) -> Vec<ReportRow>
    {
        allocations
            .iter()
            .map(|allocation| match self.0.get(&allocation.index)
            {
                Some(recipient) => ReportRow::with_recipient(allocation, recipient.clone()),
                None => {
                    warn!(index = allocation.index, "no metadata for recipient");
                    ReportRow::anonymous(allocation)
                },
            })
            .collect()
    }
}

/// Look up every allocation's recipient on-chain, concurrently.
pub async fn collect_rows<C: RoundContract + ?Sized>(contract: &C, allocations: &[Allocation]) -> Result<Vec<ReportRow>>
{
    let lookups = allocations.iter().map(|allocation| async move {
        Ok::<_, crate::Error>(match contract.recipient(allocation.index).await?
        {
            Some(recipient) => ReportRow::with_recipient(allocation, recipient),
            None => {
                warn!(index = allocation.index, "no recipient registered");
                ReportRow::anonymous(allocation)
            },
        })
    });

    try_join_all(lookups).await
}

/// Write the report as CSV, header first.
pub fn write_csv<W: Write>(rows: &[ReportRow], mut writer: W) -> std::io::Result<()>
{
    writeln!(writer, "{}", REPORT_HEADER.join(","))?;

    for row in rows
    {
        writeln!(
            writer,
            "{},{},{},{}",
            escape(&row.recipient_id),
            row.allocated_amount,
            escape(&row.title),
            escape(&row.payout_address)
        )?;
    }

    writer.flush()
}

/// Quote a field containing a delimiter, quote or line break, doubling any quotes.
fn escape(field: &str) -> Cow<'_, str>
{
    if field.contains([',', '"', '\n', '\r'])
    {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    }
    else
    {
        Cow::Borrowed(field)
    }
}
