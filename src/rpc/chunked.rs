//! Chunked file download over the correlated command channel.
//!
//! The peripheral serves one file, one bounded notification at a time.
//! The host never asks for a chunk length; it asks for "bytes from
//! offset N" and takes whatever the peripheral sends (nominally 512 raw
//! bytes, hex-encoded).
//!
//! ```text
//! data_stats           ──▶  "<filename>,<total_bytes>"
//! data_bytes,0         ──▶  "<hex>"            append min(len, total-0)
//! data_bytes,<offset>  ──▶  "<hex>"            append min(len, total-offset)
//! ...                                          until offset == total
//! ```
//!
//! A failed round ends the download; nothing is retried. The partial
//! output is kept and reported, never silently discarded.

use core::time::Duration;
use std::io::Write;

use log::{info, warn};

use super::codec::{self, Command, FileStats};
use super::correlator::Correlator;
use super::transport::Transport;
use crate::app::events::{LinkEvent, percent};
use crate::app::ports::{EventSink, SinkProvider};
use crate::error::{Error, Result};

/// How a download ended once its sink was open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferStatus {
    /// `bytes_written == total_bytes`.
    Complete,
    /// The fetch loop stopped early for the given reason.
    Incomplete(Error),
}

/// Summary of one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    pub filename: String,
    pub total_bytes: u64,
    pub bytes_written: u64,
    pub status: TransferStatus,
}

impl TransferReport {
    pub fn is_complete(&self) -> bool {
        self.status == TransferStatus::Complete
    }

    pub fn percent(&self) -> f64 {
        percent(self.bytes_written, self.total_bytes)
    }

    /// Turn an incomplete transfer into its abort cause.
    pub fn into_result(self) -> Result<Self> {
        match self.status {
            TransferStatus::Complete => Ok(self),
            TransferStatus::Incomplete(cause) => Err(cause),
        }
    }
}

// ── Transfer session ─────────────────────────────────────────

/// Open download: declared size, progress, and the owned sink.
///
/// Invariant: `0 <= written <= total`. Appends are sequential only.
struct TransferSession<W: Write> {
    stats: FileStats,
    written: u64,
    sink: W,
}

impl<W: Write> TransferSession<W> {
    fn new(stats: FileStats, sink: W) -> Self {
        Self {
            stats,
            written: 0,
            sink,
        }
    }

    fn remaining(&self) -> u64 {
        self.stats.total_bytes - self.written
    }

    fn is_done(&self) -> bool {
        self.written == self.stats.total_bytes
    }

    /// Append the prefix of `chunk` that fits before the declared end of
    /// file. Returns the number of bytes written.
    fn append(&mut self, chunk: &[u8]) -> Result<u64> {
        let n = (chunk.len() as u64).min(self.remaining());
        self.sink.write_all(&chunk[..n as usize])?;
        self.written += n;
        Ok(n)
    }
}

// ── Driver ───────────────────────────────────────────────────

/// Stats query plus fetch loop.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedDownload {
    stats_timeout: Duration,
    chunk_timeout: Duration,
}

impl ChunkedDownload {
    pub const DEFAULT_STATS_TIMEOUT: Duration = Duration::from_secs(5);
    pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(stats_timeout: Duration, chunk_timeout: Duration) -> Self {
        Self {
            stats_timeout,
            chunk_timeout,
        }
    }

    /// Ask the peripheral which file it serves and how large it is.
    pub async fn query_stats<T: Transport>(&self, link: &mut Correlator<T>) -> Result<FileStats> {
        let outcome = link
            .send_and_await(&Command::data_stats(), self.stats_timeout)
            .await?;
        let Some(reply) = outcome.into_text() else {
            warn!("no reply to data_stats");
            return Err(Error::NoResponse);
        };
        // A filename may itself start with "error", so shape is checked first.
        let stats = match codec::parse_stats(&reply) {
            Ok(stats) => stats,
            Err(_) if codec::is_error_reply(&reply) => {
                warn!("data_stats rejected: {}", reply);
                return Err(Error::Peripheral(reply));
            }
            Err(e) => {
                warn!("unexpected stats reply format: {}", reply);
                return Err(e);
            }
        };
        info!("file: {}, total size: {} bytes", stats.filename, stats.total_bytes);
        Ok(stats)
    }

    /// Download the peripheral's file into a sink from `sinks`.
    ///
    /// Errors before the sink is opened (no stats reply, bad stats shape,
    /// sink creation failure, transport failure on the stats write) are
    /// returned as `Err`. Once the sink is open the result is always a
    /// report; an early stop is `TransferStatus::Incomplete`.
    pub async fn run<T, P, E>(
        &self,
        link: &mut Correlator<T>,
        sinks: &mut P,
        events: &mut E,
    ) -> Result<TransferReport>
    where
        T: Transport,
        P: SinkProvider,
        E: EventSink,
    {
        let stats = self.query_stats(link).await?;
        let sink = sinks.create(&stats.filename)?;

        events.emit(&LinkEvent::TransferStarted {
            filename: stats.filename.clone(),
            total_bytes: stats.total_bytes,
        });

        let mut session = TransferSession::new(stats, sink);
        let mut status = match self.fetch_all(link, &mut session, events).await {
            Ok(()) => TransferStatus::Complete,
            Err(cause) => TransferStatus::Incomplete(cause),
        };
        if let Err(e) = session.sink.flush() {
            if status == TransferStatus::Complete {
                status = TransferStatus::Incomplete(e.into());
            }
        }

        let TransferSession {
            stats,
            written,
            sink,
        } = session;
        drop(sink);

        match &status {
            TransferStatus::Complete => events.emit(&LinkEvent::TransferComplete {
                filename: stats.filename.clone(),
                bytes: written,
            }),
            TransferStatus::Incomplete(cause) => events.emit(&LinkEvent::TransferAborted {
                written,
                total: stats.total_bytes,
                cause: cause.clone(),
            }),
        }

        Ok(TransferReport {
            filename: stats.filename,
            total_bytes: stats.total_bytes,
            bytes_written: written,
            status,
        })
    }

    /// Fetch loop. Returns on completion or on the first failed round.
    async fn fetch_all<T, W, E>(
        &self,
        link: &mut Correlator<T>,
        session: &mut TransferSession<W>,
        events: &mut E,
    ) -> Result<()>
    where
        T: Transport,
        W: Write,
        E: EventSink,
    {
        let total = session.stats.total_bytes;

        while !session.is_done() {
            let offset = session.written;
            let outcome = link
                .send_and_await(&Command::data_bytes(offset), self.chunk_timeout)
                .await?;

            let Some(reply) = outcome.into_text() else {
                warn!("no response for offset {}", offset);
                return Err(Error::IncompleteTransfer { offset, total });
            };
            if codec::is_error_reply(&reply) {
                warn!("error at offset {}: {}", offset, reply);
                return Err(Error::Peripheral(reply));
            }
            let chunk = codec::decode_hex(&reply).inspect_err(|_| {
                warn!("failed to parse hex data at offset {}", offset);
            })?;

            let n = session.append(&chunk)?;
            if n == 0 {
                // Zero progress before EOF would otherwise loop forever.
                warn!("empty chunk at offset {}", offset);
                return Err(Error::Stalled { offset });
            }

            events.emit(&LinkEvent::TransferProgress {
                written: session.written,
                total,
            });
        }

        Ok(())
    }
}

impl Default for ChunkedDownload {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STATS_TIMEOUT, Self::DEFAULT_CHUNK_TIMEOUT)
    }
}

// ── Tests ────────────────────────────────────────────────────
