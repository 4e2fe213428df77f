use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use text_align::{AlignerParameters, AlignmentContext, AlignmentRequest, OutputKind, Score};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Score and both texts with `-` at gaps
    Aligned,
    /// Common and distinct segments as JSON
    Graph,
    /// Run-length encoded gap vectors as JSON
    Runs,
}

/// Local alignment of two texts with affine gap costs.
#[derive(Debug, Parser)]
#[command(name = "text-align", version)]
struct Args {
    /// Left text
    #[arg(long, conflicts_with = "lhs_file")]
    lhs: Option<String>,
    /// Right text
    #[arg(long, conflicts_with = "rhs_file")]
    rhs: Option<String>,
    /// Read the left text from a file
    #[arg(long)]
    lhs_file: Option<PathBuf>,
    /// Read the right text from a file
    #[arg(long)]
    rhs_file: Option<PathBuf>,

    #[arg(long = "match", default_value_t = 2.0, allow_negative_numbers = true)]
    identity_score: f64,
    #[arg(long = "mismatch", default_value_t = -2.0, allow_negative_numbers = true)]
    mismatch_penalty: f64,
    #[arg(long = "gap-start", default_value_t = -3.0, allow_negative_numbers = true)]
    gap_start_penalty: f64,
    #[arg(long = "gap", default_value_t = -1.0, allow_negative_numbers = true)]
    gap_penalty: f64,

    /// Floating point scores instead of integers
    #[arg(long)]
    scoring_fp: bool,

    /// Defaults to `aligned`, or to what a request file asks for
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    /// Read texts and parameters from a JSON request file
    #[arg(long, conflicts_with_all = ["lhs", "rhs", "lhs_file", "rhs_file"])]
    request: Option<PathBuf>,

    /// Refuse inputs needing more dynamic programming cells than this
    #[arg(long)]
    max_cells: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.request {
        let json = fs::read_to_string(path)?;
        return if args.scoring_fp {
            run_request::<f32>(&args, &json)
        } else {
            run_request::<i32>(&args, &json)
        };
    }

    let lhs = read_text(args.lhs.as_deref(), args.lhs_file.as_ref(), "lhs")?;
    let rhs = read_text(args.rhs.as_deref(), args.rhs_file.as_ref(), "rhs")?;
    let format = args.output.unwrap_or(OutputFormat::Aligned);

    if args.scoring_fp {
        let params = AlignerParameters::new(
            args.identity_score as f32,
            args.mismatch_penalty as f32,
            args.gap_start_penalty as f32,
            args.gap_penalty as f32,
        );
        run(AlignmentContext::new(&lhs, &rhs).with_parameters(params), &args, format)
    } else {
        let params = AlignerParameters::new(
            whole_score("match", args.identity_score)?,
            whole_score("mismatch", args.mismatch_penalty)?,
            whole_score("gap-start", args.gap_start_penalty)?,
            whole_score("gap", args.gap_penalty)?,
        );
        run(AlignmentContext::new(&lhs, &rhs).with_parameters(params), &args, format)
    }
}

fn run_request<S>(args: &Args, json: &str) -> Result<(), Box<dyn Error>>
where
    S: Score + serde::de::DeserializeOwned,
{
    let request: AlignmentRequest<S> = serde_json::from_str(json)?;
    let format = args.output.unwrap_or(match request.output_kind() {
        OutputKind::Graph => OutputFormat::Graph,
        OutputKind::RunVectors => OutputFormat::Runs,
    });
    run(request.to_context(), args, format)
}

fn run<S: Score>(mut ctx: AlignmentContext<S>, args: &Args, format: OutputFormat) -> Result<(), Box<dyn Error>> {
    if let Some(limit) = args.max_cells {
        ctx = ctx.with_cell_limit(limit);
    }

    info!(
        "Aligning {} against {} characters ({} cells)",
        ctx.lhs().len(),
        ctx.rhs().len(),
        ctx.matrix_cells()
    );
    let score = ctx.align()?;

    match format {
        OutputFormat::Aligned => {
            let (lhs_row, rhs_row) = ctx.aligned_texts()?;
            println!("Score: {}", score);
            println!("{}", lhs_row);
            println!("{}", rhs_row);
        }
        OutputFormat::Graph => {
            let output = ctx.make_output(OutputKind::Graph)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Runs => {
            let output = ctx.make_output(OutputKind::RunVectors)?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    let stats = ctx.statistics()?;
    info!(
        "{} matches, {} mismatches, {} gaps in {:.3} ms",
        stats.matches, stats.mismatches, stats.gaps, stats.execution_time_ms
    );
    Ok(())
}

fn read_text(inline: Option<&str>, file: Option<&PathBuf>, side: &str) -> Result<String, Box<dyn Error>> {
    match (inline, file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => {
            let text = fs::read_to_string(path)?;
            Ok(text.trim_end_matches(&['\r', '\n'][..]).to_string())
        }
        (None, None) => Err(format!("missing --{side} or --{side}-file").into()),
    }
}

fn whole_score(name: &str, value: f64) -> Result<i32, Box<dyn Error>> {
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(format!("--{name} must be a whole number without --scoring-fp, got {value}").into());
    }
    Ok(value as i32)
}
