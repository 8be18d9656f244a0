use crate::estimate::{run_estimate, run_models, run_score_batch, BatchArgs, EstimateArgs};
use crate::server;
use admission_engine::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Hostel Admission Predictor",
    about = "Serve and run hostel admission predictions from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Estimate the admission chance of a single applicant
    Estimate(EstimateArgs),
    /// Score every applicant in a CSV file
    ScoreBatch(BatchArgs),
    /// List the servable gender and semester model pairs
    Models(ModelDirArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    #[command(flatten)]
    pub(crate) models: ModelDirArgs,
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ModelDirArgs {
    /// Override the directory holding the trained model artifacts
    #[arg(long)]
    pub(crate) model_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Estimate(args) => run_estimate(args),
        Command::ScoreBatch(args) => run_score_batch(args),
        Command::Models(args) => run_models(args),
    }
}
