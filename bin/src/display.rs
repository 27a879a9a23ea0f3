//! Terminal output for the tickhist CLI.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tickhist_lib::prelude::*;

/// Parses a `YYYY-MM-DD` date (midnight UTC) or an RFC 3339 timestamp.
pub(crate) fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {input}"))?;
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .with_context(|| format!("Invalid date: {input}"))
}

/// Renders download progress on an `indicatif` bar.
#[derive(Debug, Clone)]
pub(crate) struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    /// Creates a byte progress bar, hidden in quiet mode.
    pub(crate) fn new(quiet: bool) -> Result<Self> {
        if quiet {
            return Ok(Self {
                bar: ProgressBar::hidden(),
            });
        }
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}",
                )
                .context("Invalid progress template")?
                .progress_chars("=>-"),
        );
        Ok(Self { bar })
    }

    /// Shows a status message while no download is running.
    pub(crate) fn message(&self, message: impl Into<String>) {
        self.bar.set_message(message.into());
        self.bar.tick();
    }

    /// Clears the bar.
    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressObserver for BarObserver {
    fn on_progress(&self, destination: &str, report: &ProgressReport) {
        if report.expected > 0 {
            self.bar.set_length(report.expected);
        }
        self.bar.set_position(report.bytes_written);
        self.bar
            .set_message(format!("{destination} ({:.0}%)", report.percent));
        if report.finished {
            self.bar.finish_with_message(format!("{destination} done"));
        }
    }
}

/// Prints the server notes and identifier validation errors of a job.
pub(crate) fn print_job_summary(job: &JobHandle) {
    println!("Job: {}", job.job_id);

    if !job.notes.is_empty() {
        println!("\nNotes:");
        for note in &job.notes {
            for line in note.lines() {
                println!("  {line}");
            }
        }
    }

    if job.has_validation_errors() {
        println!(
            "\n{} identifier(s) failed validation:",
            job.identifier_validation_errors.len()
        );
        for error in &job.identifier_validation_errors {
            println!(
                "  {:<20} {:<10} {}",
                error.identifier.identifier, error.identifier.identifier_type, error.message
            );
        }
    }
}

/// Formats a byte count for humans.
pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
