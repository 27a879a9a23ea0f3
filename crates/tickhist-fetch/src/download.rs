//! Streaming result download.

use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    ByteStream, DownloadState, ExtractionError, LogObserver, ProgressObserver, ProgressReporter,
    RawResult, Result,
};

/// Copies a result stream to a sink while reporting progress.
#[derive(Debug, Clone)]
pub struct Downloader {
    reporter: ProgressReporter,
}

impl Downloader {
    /// Creates a downloader that logs progress every `progress_interval`.
    #[must_use]
    pub fn new(progress_interval: Duration) -> Self {
        Self::with_observer(progress_interval, Arc::new(LogObserver))
    }

    /// Creates a downloader that sends progress to `observer`.
    #[must_use]
    pub fn with_observer(progress_interval: Duration, observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            reporter: ProgressReporter::new(progress_interval, observer),
        }
    }

    /// Copies `body` into `sink` chunk by chunk.
    ///
    /// `expected` is the declared size, zero when unknown. A progress task
    /// samples the byte count while the copy runs and reports the final
    /// count once it finishes. On error no final report is made and whatever
    /// reached the sink stays there.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Cancelled`] if `cancel` fires between
    /// chunks, a transport error if the stream fails, or an I/O error if the
    /// sink does.
    pub async fn download<W>(
        &self,
        body: ByteStream,
        expected: u64,
        destination: &str,
        sink: &mut W,
        cancel: &CancellationToken,
    ) -> Result<u64>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let state = Arc::new(DownloadState::new(destination, expected));
        let (done_tx, done_rx) = oneshot::channel();
        let reporter = self.reporter.spawn(Arc::clone(&state), done_rx);

        let copied = copy(body, sink, &state, cancel).await;
        match &copied {
            Ok(written) => {
                if done_tx.send(*written).is_err() {
                    debug!("progress reporter exited before completion");
                }
            }
            Err(err) => {
                warn!(%destination, %err, written = state.written(), "download aborted");
                drop(done_tx);
            }
        }
        if let Err(err) = reporter.await {
            warn!(%err, "progress reporter task failed");
        }
        copied
    }

    /// Writes a fetched result to `path`, creating or truncating the file.
    ///
    /// # Errors
    ///
    /// See [`download`](Self::download).
    pub async fn download_to_file(
        &self,
        result: RawResult,
        path: &Path,
        cancel: &CancellationToken,
    ) -> Result<u64> {
        let expected = result.content_length.unwrap_or_else(|| {
            warn!("result has no Content-Length, progress percentages will be capped");
            0
        });
        let destination = path.display().to_string();
        info!(%destination, expected, job_id = %result.job.job_id, "downloading result");

        let file = tokio::fs::File::create(path).await?;
        let mut writer = BufWriter::new(file);
        let written = self
            .download(result.body, expected, &destination, &mut writer, cancel)
            .await?;

        info!(%destination, written, "download complete");
        Ok(written)
    }
}

async fn copy<W>(
    mut body: ByteStream,
    sink: &mut W,
    state: &DownloadState,
    cancel: &CancellationToken,
) -> Result<u64>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(ExtractionError::Cancelled),
            next = body.next() => next,
        };
        let Some(chunk) = next else { break };
        let chunk = chunk?;
        sink.write_all(&chunk).await?;
        state.add(chunk.len() as u64);
    }
    sink.flush().await?;
    Ok(state.written())
}
