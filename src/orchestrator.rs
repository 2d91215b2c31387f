//! Fetches every catalogue entry in order and stops at the first failure.

use std::io::{self, Write};
use tracing::{error, info};

use crate::fetch::{FetchError, FetchReport, Fetcher};
use crate::templates::TemplateEntry;

/// All entries fetched, in catalogue order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<FetchReport>,
}

impl RunSummary {
    pub fn total_bytes(&self) -> u64 {
        self.reports.iter().map(|r| r.extracted.bytes).sum()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("template '{label}' failed")]
    Entry {
        label: String,
        #[source]
        source: FetchError,
    },
    #[error("write console output: {0}")]
    Console(#[from] io::Error),
}

/// Fetch each entry in turn, writing progress notices to `console`.
///
/// The first failure ends the run; later entries are not attempted.
pub async fn run_all<W: Write>(
    fetcher: &Fetcher,
    entries: &[TemplateEntry],
    console: &mut W,
) -> Result<RunSummary, RunError> {
    let mut summary = RunSummary::default();

    for (idx, entry) in entries.iter().enumerate() {
        writeln!(console, "Fetching {} ({}/{})...", entry.label(), idx + 1, entries.len())?;
        console.flush()?;

        match fetcher.fetch_and_verify(entry).await {
            Ok(report) => summary.reports.push(report),
            Err(err) => {
                if err.is_checksum_mismatch() {
                    writeln!(console, "Failed checksum!")?;
                }
                error!(label = entry.label(), kind = ?err.kind(), "{err}");
                return Err(RunError::Entry {
                    label: entry.label().to_string(),
                    source: err,
                });
            }
        }
    }

    info!(
        templates = summary.reports.len(),
        bytes = summary.total_bytes(),
        dest = %fetcher.destination().display(),
        "all templates fetched"
    );
    writeln!(console, "Done!")?;

    Ok(summary)
}
