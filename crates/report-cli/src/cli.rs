use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueEnum};
use report_xlsx::{ConvertOptions, LayoutConfig, StyleMode};
use serde::Serialize;

use crate::{run_batch, BatchCounts, BatchOptions, FileOutcome, FileStatus};

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(
    name = "report2xlsx",
    about = "Convert generated HTML reports (.xls/.mht with embedded images) into XLSX workbooks."
)]
pub struct Args {
    /// Report files or directories to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Scan directories recursively.
    #[arg(short, long)]
    recursive: bool,

    /// Extensions picked up when scanning directories (comma separated).
    #[arg(long, value_delimiter = ',', default_values = ["xls", "mht", "mhtml", "htm", "html"])]
    ext: Vec<String>,

    /// Directory for the generated workbooks (default: next to each input).
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Replace existing output files instead of skipping them.
    #[arg(long)]
    overwrite: bool,

    /// Ignore the documents' `<style>` rules and cell outlines; use the built-in row styles only.
    #[arg(long)]
    fixed_styles: bool,

    /// Upper bound for auto-sized column widths, in characters.
    #[arg(long, value_name = "CHARS")]
    max_column_width: Option<f64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct JsonFile<'a> {
    input: String,
    status: &'static str,
    output: Option<String>,
    sheet_name: Option<&'a str>,
    warnings: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    converted: usize,
    skipped: usize,
    failed: usize,
    files: Vec<JsonFile<'a>>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    run_with_args(args)
}

pub fn run_with_args(args: Args) -> Result<()> {
    init_logging(args.verbose);

    let mut layout = LayoutConfig::default();
    if let Some(width) = args.max_column_width {
        if !(width.is_finite() && width > 0.0) {
            anyhow::bail!("--max-column-width must be a positive number, got {width}");
        }
        layout.max_column_width = width;
    }

    let options = BatchOptions {
        recursive: args.recursive,
        extensions: args
            .ext
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect(),
        output_dir: args.output_dir.clone(),
        overwrite: args.overwrite,
        convert: ConvertOptions {
            layout,
            style_mode: if args.fixed_styles {
                StyleMode::Fixed
            } else {
                StyleMode::Css
            },
        },
    };

    let outcomes = run_batch(&args.inputs, &options);
    let counts = BatchCounts::tally(&outcomes);

    match args.format {
        OutputFormat::Text => {
            for outcome in &outcomes {
                if let FileStatus::Failed { error } = &outcome.status {
                    eprintln!("FAILED {}: {error:#}", outcome.input.display());
                }
            }
            println!(
                "converted={} skipped={} failed={}",
                counts.converted, counts.skipped, counts.failed
            );
        }
        OutputFormat::Json => {
            let report = JsonReport {
                converted: counts.converted,
                skipped: counts.skipped,
                failed: counts.failed,
                files: outcomes.iter().map(json_file).collect(),
            };
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer(&mut handle, &report)?;
            handle.write_all(b"\n")?;
        }
    }

    if counts.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn json_file(outcome: &FileOutcome) -> JsonFile<'_> {
    let input = outcome.input.to_string_lossy().into_owned();
    match &outcome.status {
        FileStatus::Converted { output, report } => JsonFile {
            input,
            status: "converted",
            output: Some(output.to_string_lossy().into_owned()),
            sheet_name: Some(&report.sheet_name),
            warnings: report.warnings.iter().map(ToString::to_string).collect(),
            error: None,
        },
        FileStatus::Skipped { output } => JsonFile {
            input,
            status: "skipped",
            output: Some(output.to_string_lossy().into_owned()),
            sheet_name: None,
            warnings: Vec::new(),
            error: None,
        },
        FileStatus::Failed { error } => JsonFile {
            input,
            status: "failed",
            output: None,
            sheet_name: None,
            warnings: Vec::new(),
            error: Some(format!("{error:#}")),
        },
    }
}
