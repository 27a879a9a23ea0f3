//! Extract command implementation.
//!
//! Builds a market depth request from the command line, runs the job to
//! completion and saves the raw gzip result.

use anyhow::{Context, Result};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tickhist_lib::prelude::*;

use crate::display::{BarObserver, format_bytes, parse_timestamp, print_job_summary};
use crate::{Connection, ExtractArgs};

/// Content fields requested when none are given.
pub(crate) const DEFAULT_FIELDS: &[&str] = &[
    "Ask Price",
    "Ask Size",
    "Bid Price",
    "Bid Size",
    "Domain",
    "History End",
    "History Start",
    "Instrument ID",
    "Instrument ID Type",
    "Number of Buyers",
    "Number of Sellers",
    "Sample Data",
];

/// Run an extraction and write the result to disk.
pub(crate) async fn extract(
    connection: &Connection,
    args: &ExtractArgs,
    quiet: bool,
) -> Result<()> {
    let request = build_request(args)?;
    if args.dry_run {
        println!("{}", request.to_json()?);
        return Ok(());
    }

    let credential = super::credential(connection)?;
    let config = ClientConfig {
        poll_interval: Duration::from_secs(args.poll_interval),
        max_poll_wait: args.max_wait.map(Duration::from_secs),
        ..connection.config()
    };
    let client = ExtractionClient::new(config).context("Failed to create client")?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("output_{}.csv.gz", std::process::id())));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling extraction");
                cancel.cancel();
            }
        }
    });

    let observer = Arc::new(BarObserver::new(quiet)?);
    let downloader =
        Downloader::with_observer(client.config().progress_interval, observer.clone());

    observer.message("Requesting token");
    let token = cancellable(&cancel, client.request_token(&credential))
        .await
        .context("Authentication failed")?;

    let mut job = client.job(&token);
    observer.message("Submitting extraction");
    job.submit(&request, &cancel)
        .await
        .context("Submit failed")?;

    observer.message("Waiting for extraction to complete");
    job.wait(&cancel).await.context("Extraction failed")?;

    let result = job
        .fetch(&cancel)
        .await
        .context("Could not open result")?;
    let summary = result.job.clone();
    let written = downloader
        .download_to_file(result, &output, &cancel)
        .await
        .with_context(|| {
            format!(
                "Download failed; {} may hold a partial file",
                output.display()
            )
        })?;
    observer.finish();

    if !quiet {
        print_job_summary(&summary);
        println!(
            "Output written to: {} ({})",
            output.display(),
            format_bytes(written)
        );
    }

    Ok(())
}

/// Assemble the extraction request described by `args`.
pub(crate) fn build_request(args: &ExtractArgs) -> Result<ExtractionRequest> {
    let mut builder = ExtractionRequestBuilder::new()
        .view(args.view)
        .levels(args.levels);

    builder = if args.fields.is_empty() {
        builder.fields(DEFAULT_FIELDS.iter().copied())
    } else {
        builder.fields(args.fields.iter().cloned())
    };
    for ric in &args.rics {
        builder = builder.ric(ric.as_str());
    }

    builder = if args.user_preferences {
        builder.use_user_preferences(true)
    } else {
        builder.validation_options(ValidationOptions {
            allow_historical_instruments: !args.no_historical,
            allow_open_access_instruments: args.allow_open_access,
            ..ValidationOptions::default()
        })
    };

    if let (Some(start), Some(end)) = (&args.start, &args.end) {
        let start = parse_timestamp(start)?;
        let end = parse_timestamp(end)?;
        anyhow::ensure!(start <= end, "Start {start} is after end {end}");
        builder = builder.date_range(start, end);
    }

    let mut request = builder.build();
    let condition = &mut request.condition;
    condition.sort_by = args.sort;
    condition.message_time_stamp_in = args.timezone;
    condition.display_source_ric = !args.no_source_ric;
    if let Some(days) = args.days_ago {
        condition.report_date_range_type = ReportDateRangeType::Delta;
        condition.days_ago = Some(days);
    }
    Ok(request)
}

async fn cancellable<T>(
    cancel: &CancellationToken,
    step: impl Future<Output = std::result::Result<T, ExtractionError>>,
) -> std::result::Result<T, ExtractionError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ExtractionError::Cancelled),
        outcome = step => outcome,
    }
}
