//! dualsvm Command Line Interface
//!
//! Train, evaluate, and inspect kernel SVM models on LibSVM and CSV data.

use clap::{Args, Parser, Subcommand, ValueEnum};
use dualsvm::api::{quick, SVM};
use dualsvm::core::{GradientRule, ReadConsistency, Result, SVMError, Sample, SolverType};
use dualsvm::persistence::{SerializableModel, TrainingParams};
use dualsvm::utils::{export, validation};
use dualsvm::{CSVDataset, Dataset, KernelType, LibSVMDataset};
use env_logger::Env;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "dualsvm")]
#[command(about = "Kernel SVM trained by parallel dual ascent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new SVM model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
    /// Quick operations without model saving
    Quick(QuickArgs),
}

/// Options shared by every command that trains
#[derive(Args, Debug, Clone)]
struct TrainingOptions {
    /// Regularization parameter C (upper bound of every alpha)
    #[arg(short = 'C', long, default_value = "256.0")]
    c: f64,

    /// Kernel function
    #[arg(long, default_value = "linear")]
    kernel: CliKernel,

    /// Gaussian kernel bandwidth
    #[arg(long, default_value = "0.005")]
    bandwidth: f64,

    /// Training algorithm
    #[arg(long, default_value = "ascent")]
    solver: CliSolver,

    /// Step-size rule of the dual ascent solver
    #[arg(long, default_value = "adadelta")]
    gradient: CliGradient,

    /// AdaDelta decay rate
    #[arg(long, default_value = "0.95")]
    rho: f64,

    /// AdaDelta stabilizer
    #[arg(long, default_value = "1e-6")]
    eps: f64,

    /// Learning rate of the fixed step rule
    #[arg(long, default_value = "0.001")]
    eta: f64,

    /// Read other partitions' alphas from a per-round snapshot
    #[arg(long)]
    snapshot_reads: bool,

    /// Pegasos regularization strength
    #[arg(long, default_value = "0.01")]
    lambda: f64,

    /// Pegasos steps per round
    #[arg(long, default_value = "100")]
    steps: usize,

    /// Number of training rounds
    #[arg(long, default_value = "1000")]
    rounds: usize,

    /// Worker threads per round (and for threaded prediction)
    #[arg(long, default_value = "1")]
    threads: usize,

    /// Normalize alphas before every round
    #[arg(long)]
    normalize: bool,

    /// Random seed for the initial alphas and Pegasos draws
    #[arg(long, default_value = "1234")]
    seed: u64,

    /// Initial alphas are drawn from [0, alpha-scale)
    #[arg(long, default_value = "10.0")]
    alpha_scale: f64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    /// K(x, y) = x·y
    #[value(name = "linear")]
    Linear,
    /// K(x, y) = exp(-||x - y||² / bandwidth²)
    #[value(name = "gaussian")]
    Gaussian,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliSolver {
    /// Parallel per-sample dual ascent
    #[value(name = "ascent")]
    Ascent,
    /// Sequential stochastic sub-gradient
    #[value(name = "pegasos")]
    Pegasos,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliGradient {
    /// AdaDelta adaptive step
    #[value(name = "adadelta")]
    AdaDelta,
    /// Fixed learning rate
    #[value(name = "fixed")]
    Fixed,
}

impl From<CliSolver> for SolverType {
    fn from(cli_solver: CliSolver) -> Self {
        match cli_solver {
            CliSolver::Ascent => SolverType::DualAscent,
            CliSolver::Pegasos => SolverType::Pegasos,
        }
    }
}

impl TrainingOptions {
    fn kernel_type(&self) -> KernelType {
        match self.kernel {
            CliKernel::Linear => KernelType::Linear,
            CliKernel::Gaussian => KernelType::Gaussian {
                bandwidth: self.bandwidth,
            },
        }
    }

    fn gradient_rule(&self) -> GradientRule {
        match self.gradient {
            CliGradient::AdaDelta => GradientRule::AdaDelta {
                rho: self.rho,
                eps: self.eps,
            },
            CliGradient::Fixed => GradientRule::Fixed { eta: self.eta },
        }
    }

    fn to_svm(&self) -> SVM {
        let consistency = if self.snapshot_reads {
            ReadConsistency::Snapshot
        } else {
            ReadConsistency::Relaxed
        };

        SVM::new()
            .with_c(self.c)
            .with_kernel(self.kernel_type())
            .with_solver(self.solver.into())
            .with_gradient_rule(self.gradient_rule())
            .with_read_consistency(consistency)
            .with_pegasos_lambda(self.lambda)
            .with_pegasos_steps(self.steps)
            .with_rounds(self.rounds)
            .with_threads(self.threads)
            .with_normalization(self.normalize)
            .with_seed(self.seed)
            .with_initial_alpha_scale(self.alpha_scale)
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (LibSVM or CSV format)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    #[command(flatten)]
    training: TrainingOptions,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Show confidence scores
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

#[derive(Args)]
struct QuickArgs {
    #[command(subcommand)]
    operation: QuickOperation,
}

#[derive(Subcommand)]
enum QuickOperation {
    /// Train on one file and run the threaded confusion matrix on another
    Eval {
        /// Training data file
        train: PathBuf,
        /// Test data file
        test: PathBuf,
        /// Print the weight vector in export formats (linear kernel only)
        #[arg(long)]
        export_weights: bool,
        #[command(flatten)]
        training: TrainingOptions,
    },
    /// Hold-out validation on a single dataset
    Cv {
        /// Data file
        data: PathBuf,
        /// Training ratio (0.0-1.0)
        #[arg(short, long, default_value = "0.8")]
        ratio: f64,
        #[command(flatten)]
        training: TrainingOptions,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::Quick(args) => quick_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn resolve_format(format: &str, path: &Path) -> String {
    if format == "auto" {
        detect_format(path)
    } else {
        format.to_string()
    }
}

fn unsupported_format(format: &str) -> SVMError {
    SVMError::InvalidParameter(format!(
        "Unsupported format: {format}. Use 'libsvm' or 'csv'"
    ))
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training SVM model...");
    info!("Data file: {:?}", args.data);
    info!(
        "Parameters: C={}, kernel={}, solver={:?}, rounds={}, threads={}",
        args.training.c,
        args.training.kernel_type().name(),
        args.training.solver,
        args.training.rounds,
        args.training.threads
    );

    let format = resolve_format(&args.format, &args.data);
    info!("Loading dataset as {format} format");

    match format.as_str() {
        "libsvm" => {
            let dataset = LibSVMDataset::from_file(&args.data)?;
            train_with_dataset(&args, dataset)
        }
        "csv" => {
            let dataset = CSVDataset::from_file(&args.data)?;
            train_with_dataset(&args, dataset)
        }
        _ => Err(unsupported_format(&format)),
    }
}

fn train_with_dataset<D: Dataset>(args: &TrainArgs, dataset: D) -> Result<()> {
    info!(
        "Loaded {} samples with {} dimensions",
        dataset.len(),
        dataset.dim()
    );

    validation::validate_binary_labels(&dataset)?;
    let (positive, negative, ratio) = validation::check_label_balance(&dataset);
    info!("Labels: {positive} positive, {negative} negative (ratio {ratio:.3})");
    if positive == 0 || negative == 0 {
        warn!("Training data contains a single class");
    }

    let svm = args.training.to_svm();
    let params = TrainingParams::from(&svm);
    let model = svm.train(&dataset)?;

    info!("Training completed successfully");

    let info = model.info();
    info!("Support vectors: {}", info.n_support_vectors);
    info!("Bias: {:.6}", info.bias);

    let serializable = SerializableModel::from_trained_model(&model, params);
    serializable.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    let accuracy = model.evaluate(&dataset)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading prediction data from: {:?}", args.data);
    let format = resolve_format(&args.format, &args.data);

    info!(
        "Making predictions using model with {} support vectors",
        serializable_model.metadata.n_support_vectors
    );

    let predictions = match format.as_str() {
        "libsvm" => model.predict_from_file(&args.data)?,
        "csv" => model.predict_from_csv(&args.data)?,
        _ => return Err(unsupported_format(&format)),
    };

    let mut lines = Vec::with_capacity(predictions.len() + 2);
    lines.push(format!("# Predictions for {} samples", predictions.len()));
    lines.push(format!(
        "# Format: sample_index predicted_label{}",
        if args.confidence { " confidence" } else { "" }
    ));
    for (i, pred) in predictions.iter().enumerate() {
        if args.confidence {
            lines.push(format!("{} {:.0} {:.6}", i, pred.label, pred.confidence()));
        } else {
            lines.push(format!("{} {:.0}", i, pred.label));
        }
    }

    if let Some(output_path) = args.output {
        use std::fs::File;
        use std::io::{BufWriter, Write};

        let file = File::create(&output_path).map_err(SVMError::IoError)?;
        let mut writer = BufWriter::new(file);
        for line in &lines {
            writeln!(writer, "{line}").map_err(SVMError::IoError)?;
        }
        writer.flush().map_err(SVMError::IoError)?;

        info!("Predictions saved to: {output_path:?}");
    } else {
        for line in &lines {
            println!("{line}");
        }
    }

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading test data from: {:?}", args.data);
    let format = resolve_format(&args.format, &args.data);

    info!(
        "Evaluating model with {} support vectors",
        serializable_model.metadata.n_support_vectors
    );

    let metrics = match format.as_str() {
        "libsvm" => {
            let dataset = LibSVMDataset::from_file_with_dim(&args.data, model.inner().dim())?;
            model.evaluate_detailed(&dataset)?
        }
        "csv" => {
            let dataset = CSVDataset::from_file(&args.data)?;
            model.evaluate_detailed(&dataset)?
        }
        _ => return Err(unsupported_format(&format)),
    };

    println!("=== Model Evaluation ===");
    serializable_model.print_summary();

    println!("\nTest Results:");
    println!("  Samples:  {}", metrics.total());
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        println!("\nDetailed Metrics:");
        println!("  True Positives:  {}", metrics.true_positives);
        println!("  True Negatives:  {}", metrics.true_negatives);
        println!("  False Positives: {}", metrics.false_positives);
        println!("  False Negatives: {}", metrics.false_negatives);
        println!("  Precision:       {:.4}", metrics.precision());
        println!("  Recall:          {:.4}", metrics.recall());
        println!("  F1 Score:        {:.4}", metrics.f1_score());
        println!("  Specificity:     {:.4}", metrics.specificity());
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;

    serializable_model.print_summary();

    println!("\nSupport Vector Details:");
    println!("  Total: {}", serializable_model.support_vectors.len());

    if let Some(first_sv) = serializable_model.support_vectors.first() {
        let shown = first_sv.features.len().min(5);
        println!("  First SV features: {:?}", &first_sv.features[..shown]);
        if first_sv.features.len() > shown {
            println!("    ... ({} more)", first_sv.features.len() - shown);
        }
    }

    let indices = &serializable_model.support_indices;
    if !indices.is_empty() {
        let shown = indices.len().min(10);
        println!("  Training indices: {:?}", &indices[..shown]);
        if indices.len() > shown {
            println!("    ... ({} more)", indices.len() - shown);
        }
    }

    println!("\nAlpha*Y values:");
    let alpha_y = &serializable_model.alpha_y;
    let n_show = alpha_y.len().min(10);
    for (i, &alpha_y_val) in alpha_y.iter().enumerate().take(n_show) {
        println!("  α{i}*y{i}: {alpha_y_val:.6}");
    }
    if alpha_y.len() > n_show {
        println!("  ... ({} more)", alpha_y.len() - n_show);
    }

    Ok(())
}

/// Load `path` by extension; LibSVM files are read with `dimension` when given
fn load_samples(path: &Path, dimension: Option<usize>) -> Result<Vec<Sample>> {
    let format = detect_format(path);
    match (format.as_str(), dimension) {
        ("libsvm", Some(dim)) => Ok(LibSVMDataset::from_file_with_dim(path, dim)?.samples()),
        ("libsvm", None) => Ok(LibSVMDataset::from_file(path)?.samples()),
        ("csv", _) => Ok(CSVDataset::from_file(path)?.samples()),
        _ => Err(unsupported_format(&format)),
    }
}

fn quick_command(args: QuickArgs) -> Result<()> {
    match args.operation {
        QuickOperation::Eval {
            train,
            test,
            export_weights,
            training,
        } => {
            info!("Quick evaluation: train on {train:?}, test on {test:?}");

            let svm = training.to_svm();
            let train_samples = load_samples(&train, None)?;
            let mut optimizer = svm.fit(&train_samples)?;

            let test_samples = load_samples(&test, Some(optimizer.dim()))?;
            let queries: Vec<_> = test_samples.iter().map(|s| s.features.clone()).collect();
            let truth: Vec<bool> = test_samples.iter().map(|s| s.label > 0.0).collect();

            let ids = optimizer.create_predict_cache(&queries)?;
            let metrics =
                optimizer.predict_test_cached(&ids, &queries, &truth, training.threads)?;

            println!("=== Quick Evaluation Results ===");
            println!("Training file: {train:?}");
            println!("Test file: {test:?}");
            println!("Kernel: {}", svm.config().kernel.name());
            println!("C parameter: {}", svm.config().c);
            println!("Support vectors: {}", optimizer.support_vector_count());
            println!("Dual objective: {:.6}", optimizer.objective());
            println!("\nConfusion Matrix:");
            println!("  True Positives:  {}", metrics.true_positives);
            println!("  True Negatives:  {}", metrics.true_negatives);
            println!("  False Positives: {}", metrics.false_positives);
            println!("  False Negatives: {}", metrics.false_negatives);
            println!("Test accuracy: {:.2}%", metrics.accuracy() * 100.0);

            let stats = optimizer.prediction_cache_stats();
            info!(
                "Prediction cache: {} entries, hit rate {:.2}%",
                stats.size,
                stats.hit_rate() * 100.0
            );

            if export_weights {
                if optimizer.kernel().has_explicit_weights() {
                    let w = optimizer.w()?;
                    println!("\nWeights:");
                    println!("{}", export::amplitude_line(&w));
                    println!("{}", export::phase_line(&w));
                    println!("{}", export::to_json_string(&w));
                } else {
                    warn!("Weight export needs the linear kernel");
                }
            }

            Ok(())
        }
        QuickOperation::Cv {
            data,
            ratio,
            training,
        } => {
            info!("Hold-out validation on {data:?} with ratio {ratio}");

            let format = detect_format(&data);
            let svm = training.to_svm();

            let accuracy = match format.as_str() {
                "libsvm" => {
                    let dataset = LibSVMDataset::from_file(&data)?;
                    quick::simple_validation(svm.clone(), &dataset, ratio)?
                }
                "csv" => {
                    let dataset = CSVDataset::from_file(&data)?;
                    quick::simple_validation(svm.clone(), &dataset, ratio)?
                }
                _ => return Err(unsupported_format(&format)),
            };

            println!("=== Cross-Validation Results ===");
            println!("Data file: {data:?}");
            println!("Train/test ratio: {ratio:.1}/{:.1}", 1.0 - ratio);
            println!("Kernel: {}", svm.config().kernel.name());
            println!("C parameter: {}", svm.config().c);
            println!("CV accuracy: {:.2}%", accuracy * 100.0);

            Ok(())
        }
    }
}

fn detect_format(path: &Path) -> String {
    if let Some(ext) = path.extension() {
        match ext.to_str() {
            Some("csv") => "csv".to_string(),
            Some("libsvm") | Some("svm") => "libsvm".to_string(),
            _ => {
                warn!("Unknown file extension, assuming LibSVM format");
                "libsvm".to_string()
            }
        }
    } else {
        warn!("No file extension, assuming LibSVM format");
        "libsvm".to_string()
    }
}
