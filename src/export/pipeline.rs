//! Export pipeline
//!
//! Decodes one export file and writes it out category by category:
//! metrics, workouts, state of mind, ecg, heart rate notifications,
//! symptoms, then the manifest, then (best effort) the import batches.
//! A failure in any step before the manifest aborts the run; files
//! already written stay on disk.

use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::error::{ExportError, ExportResult};
use super::manifest::ExportManifest;
use super::writer::{file_timestamp, sanitize_filename, write_json};
use crate::memory::{write_import_script, BatchSizes, BatchSummary, ImportBatcher};
use crate::model::{Data, HealthExport, Metric, StateOfMindEntry, Workout};
use crate::summary::{MetricSummary, StateOfMindSummary, WorkoutSummary};
use crate::version::VersionInfo;

pub const MANIFEST_FILE: &str = "manifest.json";
pub const IMPORT_DIR: &str = "import";

/// Everything one run needs, resolved from CLI, environment and config
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOptions {
    pub source: PathBuf,
    pub export_dir: PathBuf,
    pub collections: Vec<String>,
    pub batch_sizes: BatchSizes,
    /// Write `import/` batch files after the manifest
    pub import_batches: bool,
    /// Also write `import/import.sh`
    pub generate_import_script: bool,
    /// Importer invoked by the replay script
    pub memory_binary: String,
}

impl ProcessOptions {
    pub fn new(source: impl Into<PathBuf>, export_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            export_dir: export_dir.into(),
            collections: Vec::new(),
            batch_sizes: BatchSizes::default(),
            import_batches: true,
            generate_import_script: false,
            memory_binary: "memory".to_string(),
        }
    }

    /// Reject options that cannot produce a valid export
    pub fn validate(&self) -> ExportResult<()> {
        if self.export_dir.as_os_str().is_empty() {
            return Err(ExportError::InvalidOptions(
                "export directory must not be empty".to_string(),
            ));
        }

        let sizes = [
            ("workouts", self.batch_sizes.workouts),
            ("state of mind", self.batch_sizes.state_of_mind),
            ("metrics", self.batch_sizes.metrics),
        ];
        for (category, size) in sizes {
            if size == 0 {
                return Err(ExportError::InvalidOptions(format!(
                    "{} batch size must be at least 1",
                    category
                )));
            }
        }

        Ok(())
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub trace_id: String,
    pub manifest_path: PathBuf,
    pub manifest: ExportManifest,
    /// `None` when batching was disabled or failed
    pub batches: Option<BatchSummary>,
}

/// Summaries built while exporting, reused for batching
#[derive(Default)]
struct Summaries {
    workouts: Vec<WorkoutSummary>,
    state_of_mind: Vec<StateOfMindSummary>,
    metrics: Vec<MetricSummary>,
}

/// File name bases already used in this run, per category directory
#[derive(Default)]
struct FileNames {
    used: HashSet<(&'static str, String)>,
}

impl FileNames {
    /// `base`, or `base_2`, `base_3`, ... when an earlier record of the
    /// same category already took it
    fn claim(&mut self, category: &'static str, base: String) -> String {
        if self.used.insert((category, base.clone())) {
            return base;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.used.insert((category, candidate.clone())) {
                tracing::warn!(
                    category,
                    name = %base,
                    renamed = %candidate,
                    "Duplicate timestamp and name, renamed file"
                );
                return candidate;
            }
            n += 1;
        }
    }
}

/// Runs the export for one set of options
pub struct HealthExporter {
    options: ProcessOptions,
    started_at: DateTime<Local>,
}

impl HealthExporter {
    /// Validates `options` before any I/O happens
    pub fn new(options: ProcessOptions) -> ExportResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            started_at: Local::now(),
        })
    }

    /// Override the wall-clock time used to name passthrough files
    pub fn with_start_time(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Decode the source file and export it
    pub fn run(&self) -> ExportResult<RunReport> {
        let trace_id = Uuid::new_v4().to_string();
        let version = VersionInfo::current().short_string();

        let span = tracing::info_span!("process", trace_id = %trace_id, version = %version);
        let _guard = span.enter();

        tracing::info!(
            source = %self.options.source.display(),
            export = %self.options.export_dir.display(),
            "Processing health data"
        );

        let export = self
            .load()
            .map_err(|e| e.during("reading health data"))?;

        self.export(&export.data, &trace_id, &version)
    }

    fn load(&self) -> ExportResult<HealthExport> {
        let source = &self.options.source;
        if !source.exists() {
            return Err(ExportError::InputNotFound(source.clone()));
        }

        let bytes = fs::read(source).map_err(|e| ExportError::Read {
            path: source.clone(),
            source: e,
        })?;

        Ok(HealthExport::from_slice(&bytes)?)
    }

    /// Write every category of `data`, the manifest and the import batches
    pub fn export(&self, data: &Data, trace_id: &str, version: &str) -> ExportResult<RunReport> {
        let root = &self.options.export_dir;
        let mut manifest = ExportManifest::new(
            data,
            self.options.source.display().to_string(),
            trace_id,
            version,
            self.options.batch_sizes,
        );
        let mut summaries = Summaries::default();
        let mut names = FileNames::default();

        self.export_metrics(&data.metrics, &mut manifest, &mut summaries, &mut names)
            .map_err(|e| e.during("exporting metrics"))?;
        self.export_workouts(&data.workouts, &mut manifest, &mut summaries, &mut names)
            .map_err(|e| e.during("exporting workouts"))?;
        self.export_state_of_mind(
            &data.state_of_mind,
            &mut manifest,
            &mut summaries,
            &mut names,
        )
        .map_err(|e| e.during("exporting state of mind data"))?;
        self.export_passthrough(&data.ecg, "ecg")
            .map_err(|e| e.during("exporting ECG data"))?;
        self.export_passthrough(&data.heart_rate_notifications, "heart_rate_notifications")
            .map_err(|e| e.during("exporting heart rate notifications"))?;
        self.export_passthrough(&data.symptoms, "symptoms")
            .map_err(|e| e.during("exporting symptoms data"))?;

        let manifest_path = root.join(MANIFEST_FILE);
        write_json(&manifest, &manifest_path).map_err(|e| e.during("exporting manifest"))?;
        tracing::info!(file = %manifest_path.display(), "Exported manifest");

        let batches = if self.options.import_batches {
            self.generate_batches(&summaries)
        } else {
            None
        };

        Ok(RunReport {
            trace_id: trace_id.to_string(),
            manifest_path,
            manifest,
            batches,
        })
    }

    fn export_metrics(
        &self,
        metrics: &[Metric],
        manifest: &mut ExportManifest,
        summaries: &mut Summaries,
        names: &mut FileNames,
    ) -> ExportResult<()> {
        self.ensure_dir("metrics")?;

        for metric in metrics {
            summaries.metrics.push(MetricSummary::build(metric));

            let Some(first) = metric.first_timestamp() else {
                tracing::debug!(metric = %metric.name, "Skipping metric without data");
                continue;
            };

            let base = names.claim(
                "metrics",
                format!("{}_{}", file_timestamp(&first), sanitize_filename(&metric.name)),
            );
            let rel = format!("metrics/{}.json", base);
            self.write_relative(metric, &rel)
                .map_err(|e| e.during(format!("exporting metric {}", metric.name)))?;
            manifest.metrics.push(rel);
        }

        tracing::info!(count = metrics.len(), "Exported metrics");
        Ok(())
    }

    fn export_workouts(
        &self,
        workouts: &[Workout],
        manifest: &mut ExportManifest,
        summaries: &mut Summaries,
        names: &mut FileNames,
    ) -> ExportResult<()> {
        self.ensure_dir("workouts")?;
        self.ensure_dir("workout_details")?;

        for workout in workouts {
            let base = names.claim(
                "workouts",
                format!(
                    "{}_{}",
                    file_timestamp(&workout.start),
                    sanitize_filename(&workout.name)
                ),
            );

            let summary = WorkoutSummary::build(workout);
            let rel = format!("workouts/{}_summary.json", base);
            self.write_relative(&summary, &rel)
                .map_err(|e| e.during(format!("exporting workout summary {}", workout.name)))?;
            manifest.workouts.push(rel);
            summaries.workouts.push(summary);

            let details = &mut manifest.workout_details;
            if let Some(rel) =
                self.write_detail(&base, "heart_rate", &workout.heart_rate_data)?
            {
                details.heart_rate.push(rel);
            }
            if let Some(rel) =
                self.write_detail(&base, "heart_rate_recovery", &workout.heart_rate_recovery)?
            {
                details.heart_rate_recovery.push(rel);
            }
            if let Some(rel) = self.write_detail(&base, "active_energy", &workout.active_energy)? {
                details.energy.push(rel);
            }
            if let Some(rel) = self.write_detail(&base, "step_count", &workout.step_count)? {
                details.steps.push(rel);
            }
        }

        tracing::info!(count = workouts.len(), "Exported workouts");
        Ok(())
    }

    /// Write one non-empty workout series; returns its relative path
    fn write_detail<T: Serialize>(
        &self,
        base: &str,
        series: &str,
        points: &[T],
    ) -> ExportResult<Option<String>> {
        if points.is_empty() {
            return Ok(None);
        }

        let rel = format!("workout_details/{}/{}.json", base, series);
        self.write_relative(points, &rel)
            .map_err(|e| e.during(format!("exporting {} data", series.replace('_', " "))))?;
        tracing::debug!(workout = %base, series, points = points.len(), "Exported workout detail");

        Ok(Some(rel))
    }

    fn export_state_of_mind(
        &self,
        entries: &[StateOfMindEntry],
        manifest: &mut ExportManifest,
        summaries: &mut Summaries,
        names: &mut FileNames,
    ) -> ExportResult<()> {
        self.ensure_dir("state_of_mind")?;

        for entry in entries {
            let base = names.claim(
                "state_of_mind",
                format!("{}_{}", file_timestamp(&entry.start), sanitize_filename(&entry.kind)),
            );
            let rel = format!("state_of_mind/{}.json", base);
            self.write_relative(entry, &rel)
                .map_err(|e| e.during("exporting state of mind record"))?;
            manifest.state_of_mind.push(rel);
            summaries.state_of_mind.push(StateOfMindSummary::build(entry));
        }

        tracing::info!(count = entries.len(), "Exported state of mind records");
        Ok(())
    }

    /// Opaque records, one file each, named by run time and sequence number
    fn export_passthrough(&self, records: &[Value], name: &str) -> ExportResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let timestamp = file_timestamp(&self.started_at);
        for (index, record) in records.iter().enumerate() {
            let number = index + 1;
            let rel = format!("{}/{}_{}_{:03}.json", name, timestamp, name, number);
            self.write_relative(record, &rel)
                .map_err(|e| e.during(format!("exporting {} record {}", name, number)))?;
        }

        tracing::info!(kind = name, count = records.len(), "Exported records");
        Ok(())
    }

    /// Batching and the replay script never fail the run
    fn generate_batches(&self, summaries: &Summaries) -> Option<BatchSummary> {
        let import_dir = self.options.export_dir.join(IMPORT_DIR);
        let batcher = ImportBatcher::new(
            &import_dir,
            self.options.batch_sizes,
            self.options.collections.clone(),
        );

        let summary = match batcher.run(
            &summaries.workouts,
            &summaries.state_of_mind,
            &summaries.metrics,
        ) {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to generate import batches");
                return None;
            }
        };

        if self.options.generate_import_script {
            match write_import_script(&summary, &self.options.memory_binary, &import_dir) {
                Ok(path) => tracing::info!(path = %path.display(), "Generated import script"),
                Err(e) => tracing::warn!(error = %e, "Failed to generate import script"),
            }
        }

        Some(summary)
    }

    fn ensure_dir(&self, rel: &str) -> ExportResult<()> {
        let dir = self.options.export_dir.join(rel);
        fs::create_dir_all(&dir).map_err(|e| ExportError::io(&dir, e))
    }

    fn write_relative<T: Serialize + ?Sized>(&self, value: &T, rel: &str) -> ExportResult<()> {
        write_json(value, &self.options.export_dir.join(Path::new(rel)))
    }
}
