use crate::cli::ModelDirArgs;
use crate::infra::{build_dispatcher, load_config, Dispatcher};
use admission_engine::batch::{score_batch, score_file};
use admission_engine::error::AppError;
use admission_engine::scoring::{PipelineKind, PredictionOutcome};
use clap::Args;
use serde_json::{json, Value};
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// Applicant gender (male or female)
    #[arg(long)]
    pub(crate) gender: String,
    /// Semester the applicant is applying for, e.g. S1
    #[arg(long)]
    pub(crate) semester: String,
    /// Annual family income in rupees
    #[arg(long)]
    pub(crate) income: f64,
    /// Home district
    #[arg(long)]
    pub(crate) district: String,
    /// Reservation category, e.g. GENERAL or SC
    #[arg(long)]
    pub(crate) category: String,
    /// SGPA on a 0-10 scale (semesters other than the rank semester)
    #[arg(long, conflicts_with = "keam_rank")]
    pub(crate) sgpa: Option<f64>,
    /// KEAM rank (rank semester only)
    #[arg(long)]
    pub(crate) keam_rank: Option<u64>,
    #[command(flatten)]
    pub(crate) models: ModelDirArgs,
}

impl EstimateArgs {
    fn request_body(&self) -> Value {
        let mut body = json!({
            "gender": self.gender,
            "semester": self.semester,
            "income": self.income,
            "district": self.district,
            "category": self.category,
        });
        if let Some(sgpa) = self.sgpa {
            body["sgpa"] = json!(sgpa);
        }
        if let Some(rank) = self.keam_rank {
            body["keam_rank"] = json!(rank);
        }
        body
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with gender, semester, income, district, category, sgpa and keam_rank columns
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write the scored CSV (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) models: ModelDirArgs,
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let config = load_config(&args.models)?;
    let dispatcher = build_dispatcher(&config.models)?;
    let outcome = estimate(&dispatcher, &args)?;
    print!("{}", render_estimate(&args, &outcome));
    Ok(())
}

fn estimate(dispatcher: &Dispatcher, args: &EstimateArgs) -> Result<PredictionOutcome, AppError> {
    Ok(dispatcher.predict_json(&args.request_body())?)
}

fn render_estimate(args: &EstimateArgs, outcome: &PredictionOutcome) -> String {
    let response = outcome.result.response();
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Hostel admission estimate for {} / {} ({} pipeline)",
        args.gender,
        args.semester,
        outcome.pipeline.label()
    );
    if outcome.pipeline == PipelineKind::RankBased {
        if let Some(rank) = args.keam_rank {
            let _ = writeln!(output, "  KEAM rank:            {rank}");
        }
    }
    let _ = writeln!(output, "  Total score:          {}", response.total_score);
    let _ = writeln!(
        output,
        "  Predicted percentage: {:.1}%",
        response.predicted_percentage
    );
    let _ = writeln!(output, "  Admission chance:     {}", outcome.chance());
    let _ = writeln!(output, "  Approval prediction:  {}", response.approval_prediction);
    output
}

pub(crate) fn run_score_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = load_config(&args.models)?;
    let dispatcher = build_dispatcher(&config.models)?;

    let summary = match &args.output {
        Some(output) => score_file(dispatcher.as_ref(), &args.input, output)?,
        None => {
            let input = std::fs::File::open(&args.input)?;
            score_batch(dispatcher.as_ref(), input, std::io::stdout().lock())?
        }
    };

    eprintln!(
        "scored {} applicants ({} rejected)",
        summary.scored + summary.failed,
        summary.failed
    );
    Ok(())
}

pub(crate) fn run_models(args: ModelDirArgs) -> Result<(), AppError> {
    let config = load_config(&args)?;
    let dispatcher = build_dispatcher(&config.models)?;
    print!("{}", render_models(&dispatcher));
    Ok(())
}

fn render_models(dispatcher: &Dispatcher) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Rank semester: {} (models read per request)",
        dispatcher.rank_semester()
    );
    let servable = dispatcher.registry().servable();
    if servable.is_empty() {
        let _ = writeln!(output, "No registered model pairs");
    }
    for key in servable {
        let _ = writeln!(output, "  {}/{}", key.gender, key.semester);
    }
    output
}
