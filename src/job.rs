//! Chunked batch job
//!
//! Walks a fixed snapshot of assets and applies a mutation to at most
//! `chunk_size` of them per call to [`ChunkedBatchJob::advance`]. The host
//! calls `advance` once per tick, so a long batch never blocks it for more
//! than one chunk.
//!
//! Mutations are applied immediately and are never rolled back, neither on
//! failure nor on cancellation. A failed mutation is recorded and the batch
//! moves on.

use std::fmt;
use std::num::NonZeroUsize;
use tracing::{debug, info, warn};

/// Lifecycle of a batch job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// No job exists (only reported by the host side)
    Idle,
    /// Assets remain to be processed
    Running,
    /// Stopped by the host before the snapshot was exhausted
    Cancelled,
    /// Every asset in the snapshot has been processed
    Completed,
}

impl JobStatus {
    /// Whether the job will never process another asset
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Cancelled | JobStatus::Completed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Idle => write!(f, "idle"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Cancelled => write!(f, "cancelled"),
            JobStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A mutation that returned an error. The job skipped it and continued.
#[derive(Debug, thiserror::Error)]
#[error("Mutation failed for {handle}: {cause}")]
pub struct MutationFailure<H, E> {
    pub handle: H,
    pub cause: E,
}

/// Pull-based batch job over a snapshot of assets.
pub struct ChunkedBatchJob<H, F, E>
where
    F: FnMut(&H) -> Result<(), E>,
{
    snapshot: Vec<H>,
    mutate: F,
    chunk_size: NonZeroUsize,
    cursor: usize,
    progress_count: usize,
    status: JobStatus,
    failures: Vec<MutationFailure<H, E>>,
}

impl<H, F, E> ChunkedBatchJob<H, F, E>
where
    H: Clone + fmt::Display,
    E: fmt::Display,
    F: FnMut(&H) -> Result<(), E>,
{
    /// Create a job over `eligible`. The list is the snapshot: its length is
    /// the job's total and it is never re-queried.
    ///
    /// An empty snapshot yields a job that is already `Completed`.
    pub fn new(eligible: Vec<H>, mutate: F, chunk_size: NonZeroUsize) -> Self {
        let status = if eligible.is_empty() {
            JobStatus::Completed
        } else {
            JobStatus::Running
        };

        info!(
            "Batch job created: {} assets, {} per tick",
            eligible.len(),
            chunk_size
        );

        Self {
            snapshot: eligible,
            mutate,
            chunk_size,
            cursor: 0,
            progress_count: 0,
            status,
            failures: Vec::new(),
        }
    }

    /// Process the next chunk.
    ///
    /// Returns `Running` while assets remain and `Completed` once the
    /// snapshot is exhausted. On a job that is already terminal this does
    /// nothing and returns the current status.
    pub fn advance(&mut self) -> JobStatus {
        if self.status != JobStatus::Running {
            return self.status;
        }

        let end = (self.cursor + self.chunk_size.get()).min(self.snapshot.len());

        for handle in &self.snapshot[self.cursor..end] {
            if let Err(cause) = (self.mutate)(handle) {
                warn!("Skipping {}: {}", handle, cause);
                self.failures.push(MutationFailure {
                    handle: handle.clone(),
                    cause,
                });
            }
            self.progress_count += 1;
        }
        self.cursor = end;

        debug!(
            "Chunk done: {}/{} ({} failed)",
            self.progress_count,
            self.snapshot.len(),
            self.failures.len()
        );

        if self.cursor >= self.snapshot.len() {
            self.status = JobStatus::Completed;
            info!(
                "Batch job completed: {} processed, {} failed",
                self.progress_count,
                self.failures.len()
            );
        }

        self.status
    }

    /// Stop processing. Already-applied mutations stay applied.
    ///
    /// Idempotent; a completed job stays completed.
    pub fn cancel(&mut self) {
        if self.status == JobStatus::Running {
            self.status = JobStatus::Cancelled;
            info!(
                "Batch job cancelled at {}/{}",
                self.progress_count,
                self.snapshot.len()
            );
        }
    }

    /// Fraction of the snapshot processed, in `[0, 1]`.
    /// An empty snapshot counts as fully done.
    pub fn progress_fraction(&self) -> f32 {
        if self.snapshot.is_empty() {
            return 1.0;
        }
        self.progress_count as f32 / self.snapshot.len() as f32
    }

    pub fn progress_count(&self) -> usize {
        self.progress_count
    }

    pub fn total_count(&self) -> usize {
        self.snapshot.len()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn chunk_size(&self) -> NonZeroUsize {
        self.chunk_size
    }

    /// Mutations that failed so far, in snapshot order
    pub fn failures(&self) -> &[MutationFailure<H, E>] {
        &self.failures
    }
}

impl<H, F, E> fmt::Debug for ChunkedBatchJob<H, F, E>
where
    F: FnMut(&H) -> Result<(), E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedBatchJob")
            .field("total_count", &self.snapshot.len())
            .field("progress_count", &self.progress_count)
            .field("chunk_size", &self.chunk_size)
            .field("status", &self.status)
            .field("failures", &self.failures.len())
            .finish()
    }
}
