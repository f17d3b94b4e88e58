//! The batch build driver.
//!
//! Walks every (sample, agent) pair in the store through
//! assemble → post-process → split → write, strictly sequentially and with
//! no shared mutable state between passes. A fatal converter error aborts
//! only the offending agent; a failed file write drops only that sample.
//! Both are counted in the [`BuildReport`] so a batch run is diagnosable
//! without ever throwing for a skip.

use crate::assembler::TimelineAssembler;
use crate::postprocess::apply_time_tokens;
use crate::splitter::WindowSplitter;
use crate::writer::SampleWriter;
use missionloom_core::error::Error;
use missionloom_core::event::TrainingSample;
use missionloom_store::SqliteStore;
use std::path::Path;
use tracing::{info, warn};

/// Counters accumulated over one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// (sample, agent) pairs that completed the pipeline.
    pub agents_processed: usize,
    /// Events assembled across all completed pairs.
    pub events_assembled: usize,
    /// Training samples written to disk.
    pub samples_written: usize,
    /// Targets dropped for an empty filtered context.
    pub targets_skipped: usize,
    /// Pairs aborted by a fatal converter error.
    pub agents_failed: usize,
    /// Samples dropped by a file-write failure.
    pub write_failures: usize,
}

/// Output of one per-agent pass, before writing.
#[derive(Debug, Clone)]
pub struct AgentOutput {
    pub samples: Vec<TrainingSample>,
    pub events_assembled: usize,
    pub targets_skipped: usize,
}

/// Drives the full pipeline over a store.
pub struct DatasetBuilder {
    store: SqliteStore,
    assembler: TimelineAssembler,
    splitter: WindowSplitter,
    dataset_version: u32,
}

impl DatasetBuilder {
    pub fn new(
        store: SqliteStore,
        assembler: TimelineAssembler,
        splitter: WindowSplitter,
        dataset_version: u32,
    ) -> Self {
        Self {
            store,
            assembler,
            splitter,
            dataset_version,
        }
    }

    /// Run the pipeline for one (sample, agent) pair.
    ///
    /// Safe to re-invoke with identical inputs: the pass reads the store,
    /// builds fresh values, and touches nothing else.
    pub async fn process_agent(&self, sample_id: i64, agent_id: i64) -> Result<AgentOutput, Error> {
        let events = self.assembler.assemble(&self.store, sample_id, agent_id).await?;
        let events_assembled = events.len();

        let timeline = apply_time_tokens(events, self.splitter.target_category);
        let outcome = self.splitter.split(&timeline);
        let samples = self.splitter.into_samples(&outcome.windows);

        info!(
            "sample {sample_id} agent {agent_id}: {events_assembled} events, \
             {} windows, {} targets skipped",
            samples.len(),
            outcome.skipped_targets
        );
        Ok(AgentOutput {
            samples,
            events_assembled,
            targets_skipped: outcome.skipped_targets,
        })
    }

    /// Run the whole batch and write samples under `output_dir`.
    pub async fn build(&self, output_dir: &Path) -> Result<BuildReport, Error> {
        let mut writer = SampleWriter::prepare(output_dir, self.dataset_version)?;
        let mut report = BuildReport::default();

        let sample_ids = self.store.list_sample_ids().await?;
        info!("found {} samples in the store", sample_ids.len());
        if sample_ids.is_empty() {
            warn!("no samples in the store, nothing to build");
            return Ok(report);
        }

        for sample_id in sample_ids {
            for agent in self.store.fetch_agents(sample_id).await? {
                let output = match self.process_agent(sample_id, agent.id).await {
                    Ok(output) => output,
                    Err(e) => {
                        warn!("sample {sample_id} agent {}: aborted: {e}", agent.id);
                        report.agents_failed += 1;
                        continue;
                    }
                };
                report.agents_processed += 1;
                report.events_assembled += output.events_assembled;
                report.targets_skipped += output.targets_skipped;

                for sample in &output.samples {
                    match writer.write(sample, sample_id, agent.id) {
                        Ok(_) => {
                            report.samples_written += 1;
                        }
                        Err(e) => {
                            warn!("sample write failed: {e}");
                            report.write_failures += 1;
                        }
                    }
                }
            }
        }

        info!(
            "build complete: {} agents, {} samples written, {} targets skipped, \
             {} agents failed, {} write failures",
            report.agents_processed,
            report.samples_written,
            report.targets_skipped,
            report.agents_failed,
            report.write_failures
        );
        Ok(report)
    }
}
