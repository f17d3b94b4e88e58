//! Sample writing: Alpaca-format JSON plus per-sample annotations.
//!
//! Each training sample becomes `<out>/samples/NNNN.json` in the Alpaca
//! instruction/input/output/system shape, with a matching provenance record
//! at `<out>/annotations/NNNN.json`. A failed write is reported per sample;
//! it never aborts the remaining samples of a run.

use chrono::Local;
use missionloom_core::error::WriteError;
use missionloom_core::event::{SampleMetadata, TrainingSample};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// The Alpaca instruction-tuning record shape.
///
/// This dataset carries its whole learning signal in `input`/`output`;
/// `instruction` and `system` stay empty.
#[derive(Debug, Clone, Serialize)]
pub struct AlpacaRecord {
    pub instruction: String,
    pub input: String,
    pub output: String,
    pub system: String,
}

impl From<&TrainingSample> for AlpacaRecord {
    fn from(sample: &TrainingSample) -> Self {
        Self {
            instruction: String::new(),
            input: sample.learning_data.clone(),
            output: sample.target_data.clone(),
            system: String::new(),
        }
    }
}

/// Writes samples and annotations under one prepared run directory.
pub struct SampleWriter {
    samples_dir: PathBuf,
    annotations_dir: PathBuf,
    dataset_version: u32,
    next_index: usize,
}

impl SampleWriter {
    /// Prepare the output directory structure.
    ///
    /// If `output_dir` already exists, a sibling directory suffixed with the
    /// current time and dataset version is used instead, so a re-run never
    /// overwrites an earlier dataset.
    pub fn prepare(output_dir: &Path, dataset_version: u32) -> Result<Self, WriteError> {
        let run_dir = if output_dir.exists() {
            let stamp = Local::now().format("%Y%m%d_%H%M%S");
            let named = format!(
                "{}_{stamp}_dataset_version_{dataset_version}",
                output_dir.display()
            );
            info!("output dir exists, writing to {named} instead");
            PathBuf::from(named)
        } else {
            output_dir.to_path_buf()
        };

        let samples_dir = run_dir.join("samples");
        let annotations_dir = run_dir.join("annotations");
        for dir in [&samples_dir, &annotations_dir] {
            fs::create_dir_all(dir).map_err(|e| WriteError::Io {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        info!(
            "prepared sample and annotation directories under {}",
            run_dir.display()
        );

        Ok(Self {
            samples_dir,
            annotations_dir,
            dataset_version,
            next_index: 0,
        })
    }

    /// Write one sample and its annotation; returns the provenance record.
    ///
    /// The index advances even on failure so a partially written pair can
    /// never be silently overwritten by the next sample.
    pub fn write(
        &mut self,
        sample: &TrainingSample,
        sample_id: i64,
        agent_id: i64,
    ) -> Result<SampleMetadata, WriteError> {
        let index = self.next_index;
        self.next_index += 1;

        let sample_path = self.samples_dir.join(format!("{index:04}.json"));
        let annotation_path = self.annotations_dir.join(format!("{index:04}.json"));

        write_json(&sample_path, &AlpacaRecord::from(sample))?;

        let metadata = SampleMetadata {
            sample_id,
            agent_id,
            path: sample_path.display().to_string(),
            dataset_version: self.dataset_version,
            rollout_length: sample.rollout_length,
            start_timestamp: sample.start_timestamp,
            end_timestamp: sample.end_timestamp,
            target_timestamp: sample.target_timestamp,
        };
        write_json(&annotation_path, &metadata)?;
        Ok(metadata)
    }

    /// Number of write slots handed out so far.
    pub fn written(&self) -> usize {
        self.next_index
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), WriteError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| WriteError::Serialize {
        path: path.display().to_string(),
        source: e,
    })?;
    fs::write(path, json).map_err(|e| WriteError::Io {
        path: path.display().to_string(),
        source: e,
    })
}
