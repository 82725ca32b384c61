#![forbid(unsafe_code)]

//! Simulated downloads.
//!
//! A request announces itself on the notification surface, waits the
//! configured delay, then produces a placeholder text artifact. Requests
//! are independent: a second request for the same file while the first is
//! pending gets its own job, and neither cancels the other.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use portal_core::artifact::Artifact;

use crate::config::SiteConfig;

/// Title shown while a download is in flight.
pub const ANNOUNCE_TITLE: &str = "Downloading...";

/// Handle to one download request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    /// Raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Where a job is in its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    /// Announced and waiting out the delay.
    Announced,
    /// Artifact produced and handed off.
    Completed,
}

/// One requested download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub id: JobId,
    /// Requested name, without the `.txt` suffix.
    pub filename: String,
    pub phase: DownloadPhase,
}

impl DownloadJob {
    /// Message shown while the job is announced.
    #[must_use]
    pub fn announce_message(&self) -> String {
        format!("Fetching {} from the server. Please wait...", self.filename)
    }
}

/// Build the placeholder artifact for `filename`.
///
/// The saved name always gets `.txt` appended, even when `filename` already
/// carries an extension.
#[must_use]
pub fn placeholder_artifact(filename: &str, at: NaiveDateTime, config: &SiteConfig) -> Artifact {
    let contents = format!(
        "This is a placeholder file for the {}.\n\nFile Name: {}\nDate: {}",
        config.artifact_project,
        filename,
        at.format(&config.timestamp_format),
    );
    Artifact::text(format!("{filename}.txt"), contents)
}

/// Tracks in-flight download jobs.
#[derive(Debug, Clone, Default)]
pub struct Downloads {
    next_id: u64,
    in_flight: BTreeMap<JobId, DownloadJob>,
}

impl Downloads {
    /// An empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a job. Returns the announced job.
    pub fn request(&mut self, filename: impl Into<String>) -> &DownloadJob {
        let id = JobId(self.next_id);
        self.next_id += 1;
        self.in_flight.entry(id).or_insert(DownloadJob {
            id,
            filename: filename.into(),
            phase: DownloadPhase::Announced,
        })
    }

    /// Finish a job and produce its artifact.
    ///
    /// The job is discarded once completed. Unknown or already completed
    /// jobs yield `None`.
    pub fn complete(
        &mut self,
        job: JobId,
        at: NaiveDateTime,
        config: &SiteConfig,
    ) -> Option<(DownloadJob, Artifact)> {
        let mut finished = self.in_flight.remove(&job)?;
        finished.phase = DownloadPhase::Completed;
        let artifact = placeholder_artifact(&finished.filename, at, config);
        Some((finished, artifact))
    }

    /// Jobs still waiting out their delay, oldest first.
    pub fn in_flight(&self) -> impl Iterator<Item = &DownloadJob> {
        self.in_flight.values()
    }

    /// Number of jobs waiting.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }
}
