//! Texture compressor
//!
//! The command surface a host drives: `start`, `cancel`, `tick` and the
//! progress/message queries. Owns the one current job and the one current
//! status message; a finished or cancelled job is dropped on the spot.

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use tracing::{info, warn};

use crate::config::{CompressionConfig, ConfigError};
use crate::job::{ChunkedBatchJob, JobStatus};
use crate::message::TimedMessage;
use crate::store::{AssetHandle, AssetStore, StoreError};

/// How long the completion message stays up
pub const COMPLETE_MESSAGE_SECONDS: f32 = 6.0;

/// How long the cancellation message stays up
pub const CANCEL_MESSAGE_SECONDS: f32 = 4.0;

type Mutation = Box<dyn FnMut(&AssetHandle) -> Result<(), StoreError>>;
type TextureJob = ChunkedBatchJob<AssetHandle, Mutation, StoreError>;

/// Compressor errors
#[derive(Debug, thiserror::Error)]
pub enum CompressorError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to query textures: {0}")]
    Store(#[from] StoreError),

    #[error("A compression job is already running")]
    JobAlreadyRunning,
}

/// Snapshot of a running job's progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub processed: usize,
    pub total: usize,
    pub fraction: f32,
}

impl Progress {
    /// Percentage with two decimals, e.g. `80.00%`
    pub fn formatted(&self) -> String {
        format_percent(self.fraction)
    }
}

fn format_percent(fraction: f32) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Outcome of the last job that finished or was cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub status: JobStatus,
    pub processed: usize,
    pub total: usize,
    /// Assets whose reimport failed, in processing order
    pub failed: Vec<AssetHandle>,
}

impl JobSummary {
    fn from_job(job: &TextureJob) -> Self {
        Self {
            status: job.status(),
            processed: job.progress_count(),
            total: job.total_count(),
            failed: job.failures().iter().map(|f| f.handle.clone()).collect(),
        }
    }
}

/// Drives texture compression jobs against an asset store
pub struct Compressor<S> {
    store: Rc<RefCell<S>>,
    job: Option<TextureJob>,
    message: TimedMessage,
    last_summary: Option<JobSummary>,
}

impl<S: AssetStore + 'static> Compressor<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
            job: None,
            message: TimedMessage::new(),
            last_summary: None,
        }
    }

    /// Borrow the underlying store (not while a tick is in progress)
    pub fn store(&self) -> Ref<'_, S> {
        self.store.borrow()
    }

    /// Textures that `config` would change, in store order.
    ///
    /// Assets without an importer are not eligible. An importer that fails
    /// to load is logged and skipped.
    pub fn eligible(&self, config: &CompressionConfig) -> Result<Vec<AssetHandle>, StoreError> {
        let store = self.store.borrow();
        let mut eligible = Vec::new();

        for handle in store.find_textures()? {
            match store.importer(&handle) {
                Ok(Some(settings)) if config.is_eligible(&settings) => eligible.push(handle),
                Ok(_) => {}
                Err(e) => warn!("Skipping {}: {}", handle, e),
            }
        }

        Ok(eligible)
    }

    /// Start a job. Eligibility is evaluated once, here; the job then works
    /// through that snapshot. Returns the number of textures to process.
    pub fn start(&mut self, config: &CompressionConfig) -> Result<usize, CompressorError> {
        if self.job.is_some() {
            return Err(CompressorError::JobAlreadyRunning);
        }

        config.validate()?;
        let chunk_size = config.chunk_size()?;

        self.message.clear();
        let eligible = self.eligible(config)?;
        let total = eligible.len();

        info!(
            "Compressing {} textures (quality {}, crunch {}, {} per tick)",
            total, config.compression_quality, config.use_crunch_compression, chunk_size
        );

        let store = Rc::clone(&self.store);
        let config = config.clone();
        let mutate: Mutation = Box::new(move |handle: &AssetHandle| {
            let mut store = store.borrow_mut();
            let mut settings = store
                .importer(handle)?
                .ok_or_else(|| StoreError::NotFound(handle.clone()))?;
            config.apply_to(&mut settings);
            store.apply(handle, &settings)
        });

        self.job = Some(ChunkedBatchJob::new(eligible, mutate, chunk_size));
        Ok(total)
    }

    /// Cancel the running job, if any. Textures already processed keep their
    /// new settings.
    ///
    /// A job that already finished but has not been ticked yet is reported
    /// as completed, not cancelled.
    pub fn cancel(&mut self) -> Option<JobSummary> {
        let mut job = self.job.take()?;
        job.cancel();
        Some(self.finish(job))
    }

    /// One host tick: decay the message, then process one chunk.
    ///
    /// Returns the job's status after the chunk, or `Idle` without a job.
    pub fn tick(&mut self, delta_seconds: f32) -> JobStatus {
        self.message.tick(delta_seconds);

        let Some(job) = self.job.as_mut() else {
            return JobStatus::Idle;
        };

        let status = job.advance();
        if status.is_terminal() {
            if let Some(job) = self.job.take() {
                self.finish(job);
            }
        }

        status
    }

    /// Record the outcome of a terminal job and show its message
    fn finish(&mut self, job: TextureJob) -> JobSummary {
        let summary = JobSummary::from_job(&job);

        match summary.status {
            JobStatus::Cancelled => self.message.show(
                format!("Cancelled. {} complete", format_percent(job.progress_fraction())),
                CANCEL_MESSAGE_SECONDS,
            ),
            _ => self
                .message
                .show("Compression complete", COMPLETE_MESSAGE_SECONDS),
        }

        self.last_summary = Some(summary.clone());
        summary
    }

    /// Current status; `Idle` when no job exists
    pub fn status(&self) -> JobStatus {
        self.job.as_ref().map(|j| j.status()).unwrap_or(JobStatus::Idle)
    }

    pub fn is_running(&self) -> bool {
        self.job.is_some()
    }

    /// Progress of the running job
    pub fn query_progress(&self) -> Option<Progress> {
        self.job.as_ref().map(|job| Progress {
            processed: job.progress_count(),
            total: job.total_count(),
            fraction: job.progress_fraction(),
        })
    }

    /// Active status message
    pub fn query_message(&self) -> Option<&str> {
        self.message.text()
    }

    /// Outcome of the most recent job that completed or was cancelled
    pub fn last_summary(&self) -> Option<&JobSummary> {
        self.last_summary.as_ref()
    }
}
