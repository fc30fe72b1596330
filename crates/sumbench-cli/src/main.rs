//! sumbench CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sumbench", version, about = "LLM summarization eval harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate summaries of a task's article with one or more models
    Summarize {
        /// Path to a .toml task file
        #[arg(long)]
        task: PathBuf,

        /// Models to run (e.g. "groq/llama3-8b-8192,anthropic/claude-3-5-haiku-20241022")
        #[arg(long)]
        models: Option<String>,

        /// Max concurrent provider calls
        #[arg(long)]
        parallelism: Option<usize>,

        /// Generation temperature
        #[arg(long)]
        temperature: Option<f64>,

        /// Output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long, env = "SUMBENCH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Score the summaries listed in a task and write comparison reports
    Analyze {
        /// Path to a .toml task file or directory
        #[arg(long)]
        task: PathBuf,

        /// Output directory
        #[arg(long, default_value = "./sumbench-results")]
        output: PathBuf,

        /// Output formats: md, json, html, all (comma-separated)
        #[arg(long, default_value = "md")]
        format: String,
    },

    /// Re-render a saved JSON report
    Render {
        /// Report JSON written by `analyze`
        #[arg(long)]
        report: PathBuf,

        /// Output format: md, html
        #[arg(long, default_value = "md")]
        format: String,

        /// Output path (defaults to the report path with a new extension)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Compare two JSON reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold in score points
        #[arg(long, default_value = "1.0")]
        threshold: f64,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check a markdown report for internally consistent scores
    Check {
        /// Markdown report
        #[arg(long)]
        report: PathBuf,
    },

    /// Print line, word and character counts of a report
    Stats {
        /// Report file
        #[arg(long)]
        report: PathBuf,
    },

    /// List the requirements of a dependency manifest
    Deps {
        /// Manifest path
        #[arg(long, default_value = "requirements.txt")]
        manifest: PathBuf,
    },

    /// Validate task TOML files
    Validate {
        /// Path to a task file or directory
        #[arg(long)]
        task: PathBuf,
    },

    /// List models offered by the configured providers
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long, env = "SUMBENCH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Create starter config and example task
    Init,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sumbench=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summarize {
            task,
            models,
            parallelism,
            temperature,
            output,
            config,
        } => {
            commands::summarize::execute(task, models, parallelism, temperature, output, config)
                .await
        }
        Commands::Analyze {
            task,
            output,
            format,
        } => commands::analyze::execute(task, output, format),
        Commands::Render {
            report,
            format,
            output,
        } => commands::render::execute(report, format, output),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Check { report } => commands::check::execute(report),
        Commands::Stats { report } => commands::stats::execute(report),
        Commands::Deps { manifest } => commands::deps::execute(manifest),
        Commands::Validate { task } => commands::validate::execute(task),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
