//! Labelprep: YOLO dataset preparation utilities.
//!
//! Labelprep covers the file-level chores around training an object
//! detector on a hand-labeled image set: turning pixel boxes into YOLO label
//! files, remapping class ids in existing labels, splitting images into
//! reproducible train/val partitions, and driving the external labeling and
//! training tools end to end.
//!
//! # Modules
//!
//! - [`label`]: typed boxes, pixel label records and YOLO label lines
//! - [`normalize`]: pixel boxes to normalized label files
//! - [`remap`]: class id remapping with dry-run support
//! - [`split`]: seeded train/val splitting with paired label copies
//! - [`pipeline`]: labeling → split → train → package orchestration
//! - [`error`]: error types for labelprep operations

pub mod classes;
pub mod error;
pub mod label;
pub mod layout;
pub mod normalize;
pub mod pipeline;
pub mod remap;
pub mod split;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::LabelprepError;

/// The labelprep CLI application.
#[derive(Parser)]
#[command(name = "labelprep")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert pixel boxes (CSV or JSON) into YOLO label files.
    Normalize(NormalizeArgs),
    /// Rewrite class ids in label files (dry run unless --apply).
    Remap(RemapArgs),
    /// Split images into train/val and copy matching labels.
    Split(SplitArgs),
    /// Run labeling, splitting, training and packaging.
    Pipeline(PipelineArgs),
    /// Evaluate trained weights on the validation split.
    Validate(ValidateArgs),
}

/// Report output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::Args)]
struct NormalizeArgs {
    /// Annotation file with pixel boxes.
    input: PathBuf,

    /// Directory the label files are written to.
    #[arg(long, default_value = "datasets/labels")]
    output_dir: PathBuf,

    /// Input format ('csv' or 'json'); inferred from the extension by default.
    #[arg(long)]
    format: Option<String>,

    /// Where images are looked up when JSON entries omit their size.
    #[arg(long)]
    images_dir: Option<PathBuf>,

    /// Handling of boxes that are degenerate or outside the image.
    #[arg(long, value_enum, default_value_t = normalize::BoundsPolicy::Passthrough)]
    bounds: normalize::BoundsPolicy,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(clap::Args)]
struct RemapArgs {
    /// Directory containing the label files.
    #[arg(long, default_value = "datasets/labels")]
    root: PathBuf,

    /// Actually modify files.
    #[arg(long)]
    apply: bool,

    /// Override the class mapping, e.g. '1:0,2:1,3:2,4:3'.
    #[arg(long = "map")]
    mapping: Option<remap::ClassMapping>,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(clap::Args)]
struct SplitArgs {
    /// Project root used for the default directories.
    #[arg(long, env = "LABELPREP_PROJECT", default_value = ".")]
    project: PathBuf,

    /// Source images (default: <project>/datasets/raw_images).
    #[arg(long)]
    images: Option<PathBuf>,

    /// Source labels (default: <project>/datasets/labels).
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Output root (default: <project>/datasets/processed).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Fraction of images assigned to train.
    #[arg(long, default_value_t = split::DEFAULT_TRAIN_RATIO)]
    ratio: f64,

    /// Shuffle seed.
    #[arg(long, default_value_t = split::DEFAULT_SEED)]
    seed: u64,

    /// Fail instead of splitting when labels are missing or a partition
    /// would be empty.
    #[arg(long)]
    strict: bool,

    /// Empty the train/val output directories before copying.
    #[arg(long)]
    clean: bool,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

#[derive(clap::Args)]
struct PipelineArgs {
    /// Project root.
    #[arg(long, env = "LABELPREP_PROJECT", default_value = ".")]
    project: PathBuf,

    /// Skip the interactive labeling phase.
    #[arg(long)]
    skip_labeling: bool,

    /// Detector size suffix (n, s, m, l, x).
    #[arg(long, default_value = "n")]
    model_size: String,

    #[arg(long, default_value_t = 100)]
    epochs: u32,

    #[arg(long, default_value_t = 640)]
    imgsz: u32,

    /// Do not regenerate the train/val split if processed data exists.
    #[arg(long)]
    reuse_split: bool,

    /// Labeling GUI executable.
    #[arg(long, env = "LABELPREP_LABEL_TOOL", default_value = "labelImg")]
    label_tool: PathBuf,

    /// Trainer CLI executable.
    #[arg(long, env = "LABELPREP_TRAINER", default_value = "yolo")]
    trainer: PathBuf,

    /// pip executable used to freeze dependencies.
    #[arg(long, env = "LABELPREP_PIP", default_value = "pip")]
    pip: PathBuf,
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Project root.
    #[arg(long, env = "LABELPREP_PROJECT", default_value = ".")]
    project: PathBuf,

    /// Detector size suffix the weights were trained with.
    #[arg(long, default_value = "n")]
    model_size: String,

    /// Weights to evaluate (default: <project>/models/best_<run>.pt).
    #[arg(long)]
    weights: Option<PathBuf>,

    #[arg(long, default_value_t = 640)]
    imgsz: u32,

    /// Trainer CLI executable.
    #[arg(long, env = "LABELPREP_TRAINER", default_value = "yolo")]
    trainer: PathBuf,
}

/// Run the labelprep CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelprepError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Normalize(args)) => run_normalize(args),
        Some(Commands::Remap(args)) => run_remap(args),
        Some(Commands::Split(args)) => run_split(args),
        Some(Commands::Pipeline(args)) => run_pipeline(args),
        Some(Commands::Validate(args)) => run_validate(args),
        None => {
            println!("labelprep {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("YOLO dataset preparation utilities.");
            println!();
            println!("Run 'labelprep --help' for usage information.");
            Ok(())
        }
    }
}

fn emit<T: Serialize + std::fmt::Display>(
    report: &T,
    output: OutputFormat,
) -> Result<(), LabelprepError> {
    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).map_err(io::Error::from)?;
            println!("{json}");
        }
        OutputFormat::Text => print!("{report}"),
    }
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<(), LabelprepError> {
    let format = match args.format.as_deref() {
        Some(name) => normalize::input::AnnotationFormat::from_name(name)?,
        None => normalize::input::AnnotationFormat::from_path(&args.input)?,
    };
    let images = normalize::input::read_annotations(&args.input, format, args.images_dir.as_deref())?;

    let opts = normalize::NormalizeOptions {
        bounds: args.bounds,
    };
    let report = normalize::normalize_batch(&images, &args.output_dir, &opts)?;
    emit(&report, args.output)
}

fn run_remap(args: RemapArgs) -> Result<(), LabelprepError> {
    let opts = remap::RemapOptions {
        dry_run: !args.apply,
        mapping: args.mapping.unwrap_or_default(),
    };
    let report = remap::remap_labels(&args.root, &opts)?;
    emit(&report, args.output)
}

fn run_split(args: SplitArgs) -> Result<(), LabelprepError> {
    let layout = layout::ProjectLayout::new(&args.project);
    let defaults = split::SplitOptions::for_layout(&layout);
    let opts = split::SplitOptions {
        images_dir: args.images.unwrap_or(defaults.images_dir),
        labels_dir: args.labels.unwrap_or(defaults.labels_dir),
        output_dir: args.out.unwrap_or(defaults.output_dir),
        ratio: args.ratio,
        seed: args.seed,
        clean: args.clean,
    };

    let report = if args.strict {
        match split::prepare_dataset(&opts) {
            split::PrepareOutcome::Prepared(report) => report,
            split::PrepareOutcome::Unavailable { reason } => {
                return Err(LabelprepError::InvalidSplitParams { message: reason });
            }
            split::PrepareOutcome::Failed(err) => return Err(err),
        }
    } else {
        split::split_dataset(&opts)?
    };
    emit(&report, args.output)
}

fn run_pipeline(args: PipelineArgs) -> Result<(), LabelprepError> {
    let layout = layout::ProjectLayout::new(&args.project);
    let opts = pipeline::PipelineOptions {
        skip_labeling: args.skip_labeling,
        model_size: args.model_size,
        epochs: args.epochs,
        imgsz: args.imgsz,
        reuse_split: args.reuse_split,
        label_tool: args.label_tool,
        trainer: args.trainer,
        pip: args.pip,
        ..Default::default()
    };

    let mut runner = pipeline::SystemRunner;
    let mut stdin = io::stdin().lock();
    let summary = pipeline::run_pipeline(&layout, &opts, &mut runner, &mut stdin)?;
    print!("{summary}");
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), LabelprepError> {
    let layout = layout::ProjectLayout::new(&args.project).absolute()?;
    let opts = pipeline::PipelineOptions {
        model_size: args.model_size,
        imgsz: args.imgsz,
        trainer: args.trainer,
        ..Default::default()
    };
    let weights = args.weights.unwrap_or_else(|| {
        layout
            .models_dir()
            .join(format!("best_{}.pt", opts.run_name()))
    });

    let mut runner = pipeline::SystemRunner;
    let results = pipeline::validate_model(&layout, &opts, &mut runner, &weights)?;
    println!("Validation results: {}", results.display());
    Ok(())
}
