//! Host tick loop
//!
//! Stands in for an editor's per-frame callback: ticks a [`Compressor`] at a
//! fixed rate on the current thread, feeding it the real elapsed time, and
//! renders progress with indicatif. A cancel signal (Ctrl-C from the CLI)
//! cancels the job between ticks.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::compressor::{Compressor, JobSummary};
use crate::config::CompressionConfig;
use crate::job::JobStatus;
use crate::store::AssetStore;

/// Default tick rate (matches a 60 fps editor)
pub const DEFAULT_TICK_RATE: u32 = 60;

/// Options for the tick loop
#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Ticks per second
    pub tick_rate: u32,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            show_progress: true,
        }
    }
}

impl HostOptions {
    fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }
}

/// What happened during a run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final status (`Completed` or `Cancelled`)
    pub status: JobStatus,
    /// Number of ticks spent
    pub ticks: usize,
    /// Outcome of the job
    pub summary: Option<JobSummary>,
    /// Status message left by the compressor
    pub message: Option<String>,
}

fn progress_bar(total: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] Compressing [{bar:40.cyan/blue}] {pos}/{len} | {msg}")?
            .progress_chars("=>-"),
    );
    Ok(pb)
}

/// Resolve when the user presses Ctrl-C. If the handler can't be installed
/// this never resolves.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Start a job and tick it until it finishes or `cancel` resolves.
pub async fn run<S, C>(
    compressor: &mut Compressor<S>,
    config: &CompressionConfig,
    options: &HostOptions,
    cancel: C,
) -> Result<RunReport>
where
    S: AssetStore + 'static,
    C: Future<Output = ()>,
{
    let total = compressor.start(config)?;
    let pb = progress_bar(total, options.show_progress)?;

    let mut interval = tokio::time::interval(options.tick_period());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tokio::pin!(cancel);

    let mut last_tick = Instant::now();
    let mut ticks = 0;

    let status = loop {
        tokio::select! {
            biased;

            _ = &mut cancel => {
                debug!("Cancel requested after {} ticks", ticks);
                let status = compressor
                    .cancel()
                    .map(|summary| summary.status)
                    .unwrap_or(JobStatus::Idle);
                break status;
            }

            _ = interval.tick() => {
                let now = Instant::now();
                let delta = now.duration_since(last_tick).as_secs_f32();
                last_tick = now;

                let status = compressor.tick(delta);
                ticks += 1;

                if let Some(progress) = compressor.query_progress() {
                    pb.set_position(progress.processed as u64);
                    pb.set_message(progress.formatted());
                }

                if status.is_terminal() {
                    break status;
                }
            }
        }
    };

    pb.finish_and_clear();

    Ok(RunReport {
        status,
        ticks,
        summary: compressor.last_summary().cloned(),
        message: compressor.query_message().map(str::to_string),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::textures::TextureImportSettings;

    fn store(count: usize) -> MemoryStore {
        let mut store = MemoryStore::new();
        for i in 0..count {
            store.insert(format!("t{:03}.png", i), TextureImportSettings::default());
        }
        store
    }

    fn quiet(tick_rate: u32) -> HostOptions {
        HostOptions {
            tick_rate,
            show_progress: false,
        }
    }

    #[tokio::test]
    async fn test_run_to_completion() -> Result<()> {
        let mut compressor = Compressor::new(store(25));
        let report = run(
            &mut compressor,
            &CompressionConfig::default(),
            &quiet(1000),
            std::future::pending(),
        )
        .await?;

        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.ticks, 3);
        assert_eq!(report.message.as_deref(), Some("Compression complete"));
        assert_eq!(report.summary.map(|s| s.processed), Some(25));
        assert_eq!(compressor.store().writes(), 25);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_project_completes_in_one_tick() -> Result<()> {
        let mut compressor = Compressor::new(store(0));
        let report = run(
            &mut compressor,
            &CompressionConfig::default(),
            &quiet(1000),
            std::future::pending(),
        )
        .await?;

        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.ticks, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_between_ticks() -> Result<()> {
        let mut compressor = Compressor::new(store(100));
        let config = CompressionConfig {
            chunk_size: 1,
            ..Default::default()
        };

        // First tick fires immediately, the next one is a second away
        let report = run(
            &mut compressor,
            &config,
            &quiet(1),
            tokio::time::sleep(Duration::from_millis(100)),
        )
        .await?;

        assert_eq!(report.status, JobStatus::Cancelled);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.message.as_deref(), Some("Cancelled. 1.00% complete"));
        assert_eq!(compressor.store().writes(), 1);
        assert!(!compressor.is_running());
        Ok(())
    }

    #[test]
    fn test_tick_period() {
        assert_eq!(quiet(4).tick_period(), Duration::from_millis(250));
        assert_eq!(quiet(0).tick_period(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancel_before_first_tick_of_empty_job() -> Result<()> {
        let mut compressor = Compressor::new(store(0));
        let report = run(
            &mut compressor,
            &CompressionConfig::default(),
            &quiet(1000),
            std::future::ready(()),
        )
        .await?;

        assert_eq!(report.ticks, 0);
        assert_eq!(report.status, JobStatus::Completed);
        assert_eq!(report.message.as_deref(), Some("Compression complete"));
        Ok(())
    }
}
