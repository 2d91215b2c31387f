mod error;
pub mod pipeline;

pub use error::{FailureKind, FetchError};
pub use pipeline::{Extracted, verify_and_extract};

use anyhow::{Context, Result};
use bytes::Bytes;
use futures::stream;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Response};
use std::{
    io,
    path::{Path, PathBuf},
    time::Instant,
};
use tokio::sync::mpsc;
use tokio_util::io::{StreamReader, SyncIoBridge};
use tracing::{debug, info};

use crate::templates::TemplateEntry;

const USER_AGENT: &str = concat!("templateflow-fetch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Chunks the network side may run ahead of extraction before it blocks.
    pub channel_capacity: usize,
    pub show_progress: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
            show_progress: true,
        }
    }
}

/// Outcome of one verified fetch.
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub label: String,
    pub extracted: Extracted,
}

/// Downloads archives straight into the destination, hashing on the way.
pub struct Fetcher {
    client: Client,
    dest: PathBuf,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(dest: impl Into<PathBuf>, options: FetchOptions) -> Result<Self> {
        // Transparent decoding would change the bytes we hash
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            client,
            dest: dest.into(),
            options,
        })
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }

    /// GET `entry.url()`, extract it under the destination and verify the
    /// digest of everything received against `entry.sha256()`.
    ///
    /// One network read feeds both the extractor and the hasher. The read
    /// side waits whenever extraction falls `channel_capacity` chunks behind.
    pub async fn fetch_and_verify(&self, entry: &TemplateEntry) -> Result<FetchReport, FetchError> {
        let started = Instant::now();
        info!(%entry, "fetching template");

        let response = self
            .client
            .get(entry.url())
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|source| FetchError::Transport {
                url: entry.url().to_string(),
                source,
            })?;

        let total = response.content_length();
        let progress = self.progress_bar(entry.label(), total);

        // 1) Producer: network chunks into a bounded channel
        let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(self.options.channel_capacity.max(1));
        let producer = tokio::spawn(pump(response, tx, progress.clone()));

        // 2) Consumer: blocking hash + gunzip + untar over the channel
        let chunks = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) });
        let reader = SyncIoBridge::new(StreamReader::new(Box::pin(chunks)));
        let expected = entry.sha256().clone();
        let dest = self.dest.clone();
        let consumer = tokio::task::spawn_blocking(move || {
            pipeline::verify_and_extract(reader, &expected, total, &dest)
        });

        let consumed = join(consumer).await;
        let produced = join(producer).await;

        // A failed network read explains whatever the consumer saw
        if let Err(source) = produced {
            progress.abandon_with_message(format!("Failed {}", entry.label()));
            return Err(FetchError::Transport {
                url: entry.url().to_string(),
                source,
            });
        }

        match consumed {
            Ok(extracted) => {
                progress.finish_with_message(format!("Fetched {}", entry.label()));
                info!(
                    label = entry.label(),
                    bytes = extracted.bytes,
                    members = extracted.members,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "template verified"
                );
                Ok(FetchReport {
                    label: entry.label().to_string(),
                    extracted,
                })
            }
            Err(err) => {
                progress.abandon_with_message(format!("Failed {}", entry.label()));
                Err(err)
            }
        }
    }

    fn progress_bar(&self, label: &str, total: Option<u64>) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }

        let (pb, template) = match total {
            Some(len) => (
                ProgressBar::new(len),
                "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] \
                 {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            ),
            None => (
                ProgressBar::new_spinner(),
                "{msg}\n{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec})",
            ),
        };

        // A bad template only costs the styling, not the download
        if let Ok(style) = ProgressStyle::with_template(template) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(format!("Downloading {label}"));
        pb
    }
}

/// Read the body chunk by chunk into `tx`. Returns the bytes forwarded.
///
/// Stops early, without error, if the consumer has hung up.
async fn pump(
    mut response: Response,
    tx: mpsc::Sender<io::Result<Bytes>>,
    progress: ProgressBar,
) -> Result<u64, reqwest::Error> {
    let mut forwarded: u64 = 0;

    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let len = chunk.len() as u64;
                if tx.send(Ok(chunk)).await.is_err() {
                    debug!(forwarded, "consumer stopped reading");
                    break;
                }
                forwarded += len;
                progress.set_position(forwarded);
            }
            Ok(None) => {
                debug!(forwarded, "body complete");
                break;
            }
            Err(err) => {
                // The consumer only needs to know the stream broke
                let _ = tx
                    .send(Err(io::Error::new(io::ErrorKind::ConnectionAborted, err.to_string())))
                    .await;
                return Err(err);
            }
        }
    }

    Ok(forwarded)
}

async fn join<T>(handle: tokio::task::JoinHandle<T>) -> T {
    match handle.await {
        Ok(value) => value,
        Err(err) => std::panic::resume_unwind(err.into_panic()),
    }
}
