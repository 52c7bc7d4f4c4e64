//! End-to-end orchestration: labeling, splitting, training and packaging.
//!
//! The labeling GUI, the trainer and the dependency freezer are external
//! programs started through a [`CommandRunner`]. Failures are handled per
//! step:
//!
//! - labeling tool missing or failing: fatal;
//! - strict preparation unavailable or failed: logged, lenient split used;
//! - trainer failing: fatal;
//! - model exports, dependency freeze and validation failing: logged, run
//!   continues.

pub mod package;
pub mod runner;

pub use package::{DatasetConfig, PackageMeta};
pub use runner::{CommandRunner, CommandStatus, ExternalCommand, SystemRunner};

use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::classes::read_class_list;
use crate::error::LabelprepError;
use crate::layout::ProjectLayout;
use crate::split::{prepare_dataset, split_dataset, PrepareOutcome, SplitOptions, SplitReport};

/// Pipeline options. Defaults match the `pipeline` subcommand.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub skip_labeling: bool,
    /// Model size suffix: `n`, `s`, `m`, `l` or `x`.
    pub model_size: String,
    pub epochs: u32,
    pub imgsz: u32,
    pub batch: u32,
    /// Keep an existing processed split instead of regenerating it.
    pub reuse_split: bool,
    pub label_tool: PathBuf,
    pub trainer: PathBuf,
    pub pip: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            skip_labeling: false,
            model_size: "n".to_string(),
            epochs: 100,
            imgsz: 640,
            batch: 16,
            reuse_split: false,
            label_tool: PathBuf::from("labelImg"),
            trainer: PathBuf::from("yolo"),
            pip: PathBuf::from("pip"),
        }
    }
}

impl PipelineOptions {
    pub fn run_name(&self) -> String {
        format!("teat_detector_v8{}", self.model_size)
    }
}

/// Where the processed split came from.
#[derive(Debug)]
pub enum SplitSource {
    Reused,
    Prepared(SplitReport),
    Fallback { reason: String, report: SplitReport },
}

/// What a pipeline run produced.
#[derive(Debug)]
pub struct PipelineSummary {
    pub run_name: String,
    pub split: SplitSource,
    /// `models/best_<run>.pt`, when the trainer produced best weights.
    pub weights: Option<PathBuf>,
    pub package_dir: PathBuf,
    /// Directory holding the validation metrics, when validation ran.
    pub validation: Option<PathBuf>,
    /// Best-effort steps that failed or were skipped.
    pub soft_failures: Vec<String>,
}

impl fmt::Display for PipelineSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run: {}", self.run_name)?;
        match &self.split {
            SplitSource::Reused => writeln!(f, "Split: reused existing processed dataset")?,
            SplitSource::Prepared(report) => write!(f, "Split: {}", report)?,
            SplitSource::Fallback { reason, report } => {
                writeln!(f, "Split (fallback, {}):", reason)?;
                write!(f, "{}", report)?;
            }
        }
        match &self.weights {
            Some(path) => writeln!(f, "Weights: {}", path.display())?,
            None => writeln!(f, "Weights: best.pt not found")?,
        }
        writeln!(f, "Package: {}", self.package_dir.display())?;
        match &self.validation {
            Some(dir) => writeln!(f, "Validation: {}", dir.display())?,
            None => writeln!(f, "Validation: not run")?,
        }
        if !self.soft_failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Warnings ({}):", self.soft_failures.len())?;
            for failure in &self.soft_failures {
                writeln!(f, "  - {}", failure)?;
            }
        }
        Ok(())
    }
}

/// Runs the whole pipeline for the project at `layout`.
///
/// A relative root is resolved against the current directory first, so
/// every path handed to an external tool is absolute. `input` is read for
/// the "press Enter" confirmation before labeling.
pub fn run_pipeline(
    layout: &ProjectLayout,
    opts: &PipelineOptions,
    runner: &mut dyn CommandRunner,
    input: &mut dyn BufRead,
) -> Result<PipelineSummary, LabelprepError> {
    let layout = &layout.absolute()?;
    layout.ensure()?;

    if opts.skip_labeling {
        info!("Skipping labeling phase (--skip-labeling).");
    } else {
        wait_for_confirmation(layout, input)?;
        start_labeling(layout, opts, runner)?;
    }

    let split = build_split(layout, opts)?;

    let classes = read_class_list(&layout.classes_file())?;
    let config = DatasetConfig::new(&layout.processed_dir(), classes.clone());
    package::write_yaml(&layout.dataset_config(), &config)?;
    info!("Training with classes: {:?}", classes);

    let run_name = opts.run_name();
    train(layout, opts, runner, &run_name)?;

    let mut soft_failures = Vec::new();
    let weights_dir = layout.run_dir(&run_name).join("weights");
    let best_src = weights_dir.join("best.pt");
    let best_dst = layout.models_dir().join(format!("best_{run_name}.pt"));

    let weights = if best_src.is_file() {
        fs::copy(&best_src, &best_dst).map_err(LabelprepError::Io)?;
        info!("Best weights copied to {}", best_dst.display());
        Some(best_dst.clone())
    } else {
        warn!("best.pt not found at {}", best_src.display());
        soft_failures.push(format!("best.pt not found at {}", best_src.display()));
        None
    };

    for (format, extra) in [("onnx", Some(("opset", 12))), ("torchscript", None)] {
        if weights.is_none() {
            warn!("{format} export skipped: no trained weights");
            soft_failures.push(format!("{format} export skipped: best.pt missing"));
            continue;
        }
        if let Err(message) = export(runner, opts, &best_src, format, extra) {
            warn!("{format} export failed: {message}");
            soft_failures.push(format!("{format} export failed: {message}"));
        }
    }

    let freeze_file = layout.models_dir().join("requirements_freeze.txt");
    match freeze_requirements(runner, opts, &freeze_file) {
        Ok(()) => info!("Environment frozen to {}", freeze_file.display()),
        Err(message) => {
            warn!("Requirements freeze failed: {message}");
            soft_failures.push(format!("requirements freeze failed: {message}"));
        }
    }

    let meta = PackageMeta {
        run_name: run_name.clone(),
        classes,
        epochs: opts.epochs,
        imgsz: opts.imgsz,
        timestamp: package::package_timestamp(),
        weights: format!("best_{run_name}.pt"),
    };
    let artifacts = [
        best_dst,
        layout.dataset_config(),
        layout.classes_file(),
        weights_dir.join("best.onnx"),
        weights_dir.join("best.torchscript"),
        freeze_file,
    ];
    let package_dir = package::package_artifacts(&layout.packages_dir(), &meta, &artifacts)?;

    let validation = match &weights {
        Some(model) => match validate_model(layout, opts, runner, model) {
            Ok(dir) => Some(dir),
            Err(err) => {
                warn!("{err}");
                soft_failures.push(err.to_string());
                None
            }
        },
        None => {
            warn!("validation skipped: no trained weights");
            soft_failures.push("validation skipped: best.pt missing".to_string());
            None
        }
    };

    Ok(PipelineSummary {
        run_name,
        split,
        weights,
        package_dir,
        validation,
        soft_failures,
    })
}

/// Evaluates `model` on the validation split described by the project's
/// `dataset.yaml`. Metrics land in `results/<run_name>`, which is returned.
pub fn validate_model(
    layout: &ProjectLayout,
    opts: &PipelineOptions,
    runner: &mut dyn CommandRunner,
    model: &Path,
) -> Result<PathBuf, LabelprepError> {
    let run_name = opts.run_name();
    let failure = |message: String| LabelprepError::ValidationFailed {
        model: model.to_path_buf(),
        message,
    };
    if !model.is_file() {
        return Err(failure("weights file not found".to_string()));
    }

    let cmd = ExternalCommand::new(&opts.trainer)
        .arg("detect")
        .arg("val")
        .kv("model", model.display())
        .kv("data", layout.dataset_config().display())
        .kv("imgsz", opts.imgsz)
        .kv("project", layout.results_dir().display())
        .kv("name", &run_name)
        .kv("exist_ok", "True")
        .current_dir(layout.root());

    info!("Validating: {cmd}");
    match runner.run(&cmd, None) {
        Ok(status) if status.success => Ok(layout.results_dir().join(run_name)),
        Ok(status) => Err(failure(format!("validator exited with {status}"))),
        Err(err) => Err(failure(format!(
            "could not start {}: {err}",
            opts.trainer.display()
        ))),
    }
}

fn wait_for_confirmation(
    layout: &ProjectLayout,
    input: &mut dyn BufRead,
) -> Result<(), LabelprepError> {
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "1. Place images in {}",
        layout.raw_images_dir().display()
    )?;
    writeln!(
        stdout,
        "2. Label when tool opens (YOLO format). Press Enter to continue."
    )?;
    stdout.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

/// Launches the labeling GUI and blocks until it exits.
pub fn start_labeling(
    layout: &ProjectLayout,
    opts: &PipelineOptions,
    runner: &mut dyn CommandRunner,
) -> Result<(), LabelprepError> {
    info!(
        "Starting {} on {}",
        opts.label_tool.display(),
        layout.raw_images_dir().display()
    );
    let cmd = ExternalCommand::new(&opts.label_tool)
        .arg(layout.raw_images_dir().display().to_string())
        .arg(layout.classes_file().display().to_string())
        .arg(layout.labels_dir().display().to_string());

    let failure = |message: String| LabelprepError::LabelToolFailed {
        program: opts.label_tool.clone(),
        message,
    };

    match runner.run(&cmd, None) {
        Ok(status) if status.success => Ok(()),
        Ok(status) => Err(failure(format!("labeling tool exited with {status}"))),
        Err(err) => Err(failure(format!(
            "{err} (install it with: pip install --force-reinstall labelImg)"
        ))),
    }
}

fn build_split(
    layout: &ProjectLayout,
    opts: &PipelineOptions,
) -> Result<SplitSource, LabelprepError> {
    if opts.reuse_split && layout.has_processed_split() {
        info!("Reusing existing processed dataset split.");
        return Ok(SplitSource::Reused);
    }

    info!("Preparing dataset...");
    let split_opts = SplitOptions::for_layout(layout);
    let reason = match prepare_dataset(&split_opts) {
        PrepareOutcome::Prepared(report) => return Ok(SplitSource::Prepared(report)),
        PrepareOutcome::Unavailable { reason } => reason,
        PrepareOutcome::Failed(err) => err.to_string(),
    };

    warn!("dataset preparation did not run ({reason}); using simple splitter");
    let report = split_dataset(&split_opts)?;
    info!(
        "Fallback dataset prepared: {} train, {} val images",
        report.train.images.len(),
        report.val.images.len()
    );
    Ok(SplitSource::Fallback { reason, report })
}

fn train(
    layout: &ProjectLayout,
    opts: &PipelineOptions,
    runner: &mut dyn CommandRunner,
    run_name: &str,
) -> Result<(), LabelprepError> {
    let cmd = ExternalCommand::new(&opts.trainer)
        .arg("detect")
        .arg("train")
        .kv("data", layout.dataset_config().display())
        .kv("model", format!("yolov8{}.pt", opts.model_size))
        .kv("epochs", opts.epochs)
        .kv("imgsz", opts.imgsz)
        .kv("batch", opts.batch)
        .kv("name", run_name)
        .kv("project", layout.root().join("runs").join("detect").display())
        .kv("exist_ok", "True")
        .current_dir(layout.root());

    info!("Starting training: {cmd}");
    let failure = |message: String| LabelprepError::TrainerFailed {
        run_name: run_name.to_string(),
        message,
    };
    match runner.run(&cmd, None) {
        Ok(status) if status.success => Ok(()),
        Ok(status) => Err(failure(format!("trainer exited with {status}"))),
        Err(err) => Err(failure(format!(
            "could not start {}: {err}",
            opts.trainer.display()
        ))),
    }
}

fn export(
    runner: &mut dyn CommandRunner,
    opts: &PipelineOptions,
    weights: &Path,
    format: &str,
    extra: Option<(&str, u32)>,
) -> Result<(), String> {
    info!("Exporting {format}...");
    let mut cmd = ExternalCommand::new(&opts.trainer)
        .arg("export")
        .kv("model", weights.display())
        .kv("format", format)
        .kv("imgsz", opts.imgsz);
    if let Some((key, value)) = extra {
        cmd = cmd.kv(key, value);
    }

    match runner.run(&cmd, None) {
        Ok(status) if status.success => Ok(()),
        Ok(status) => Err(format!("exporter exited with {status}")),
        Err(err) => Err(err.to_string()),
    }
}

fn freeze_requirements(
    runner: &mut dyn CommandRunner,
    opts: &PipelineOptions,
    output: &Path,
) -> Result<(), String> {
    let cmd = ExternalCommand::new(&opts.pip).arg("freeze");
    match runner.run(&cmd, Some(output)) {
        Ok(status) if status.success => Ok(()),
        Ok(status) => Err(format!("pip exited with {status}")),
        Err(err) => Err(err.to_string()),
    }
}
