//! Batch conversion of report files to XLSX.
//!
//! Each input is converted independently: a failure is recorded for that file
//! and the batch moves on.

pub mod cli;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use report_xlsx::{convert_path, ConversionReport, ConvertOptions};

/// Extensions scanned for when an input is a directory.
pub const DEFAULT_EXTENSIONS: &[&str] = &["xls", "mht", "mhtml", "htm", "html"];

#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Descend into subdirectories of directory inputs.
    pub recursive: bool,
    /// Lowercase extensions (without the dot) picked up from directories.
    pub extensions: Vec<String>,
    /// Write outputs here instead of next to each input.
    pub output_dir: Option<PathBuf>,
    pub overwrite: bool,
    pub convert: ConvertOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            recursive: false,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            output_dir: None,
            overwrite: false,
            convert: ConvertOptions::default(),
        }
    }
}

#[derive(Debug)]
pub enum FileStatus {
    Converted {
        output: PathBuf,
        report: ConversionReport,
    },
    /// The output already existed and `overwrite` was off.
    Skipped { output: PathBuf },
    Failed { error: anyhow::Error },
}

#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub status: FileStatus,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchCounts {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchCounts {
    pub fn tally(outcomes: &[FileOutcome]) -> Self {
        let mut counts = Self::default();
        for outcome in outcomes {
            match outcome.status {
                FileStatus::Converted { .. } => counts.converted += 1,
                FileStatus::Skipped { .. } => counts.skipped += 1,
                FileStatus::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Expand the command-line inputs into the files to convert.
///
/// Files are taken as given (whatever their extension); directories are
/// scanned for matching extensions, sorted per directory input.
pub fn collect_inputs(inputs: &[PathBuf], options: &BatchOptions) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut walker = walkdir::WalkDir::new(input).follow_links(false);
        if !options.recursive {
            walker = walker.max_depth(1);
        }
        let mut found: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("skipping unreadable entry under {}: {err}", input.display());
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| has_extension(path, &options.extensions))
            .collect();
        found.sort();
        log::debug!("{}: {} matching file(s)", input.display(), found.len());
        files.extend(found);
    }
    files
}

/// Where the workbook for `input` is written: the input stem plus `.xlsx`,
/// next to the input or under `output_dir`.
pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let mut file_name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    file_name.push(".xlsx");
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// Convert one file, never failing the caller.
pub fn convert_file(input: &Path, options: &BatchOptions) -> FileOutcome {
    let output = output_path(input, options.output_dir.as_deref());
    let status = if output.exists() && !options.overwrite {
        log::info!("{} exists, skipping", output.display());
        FileStatus::Skipped { output }
    } else {
        match try_convert(input, &output, &options.convert) {
            Ok(report) => {
                for warning in &report.warnings {
                    log::warn!("{}: {warning}", input.display());
                }
                FileStatus::Converted { output, report }
            }
            Err(error) => FileStatus::Failed { error },
        }
    };
    FileOutcome {
        input: input.to_path_buf(),
        status,
    }
}

fn try_convert(input: &Path, output: &Path, options: &ConvertOptions) -> Result<ConversionReport> {
    if input == output {
        return Err(anyhow!("output path {} is the input itself", output.display()));
    }
    convert_path(input, output, options).with_context(|| format!("convert {}", input.display()))
}

/// Convert every file named by `inputs`.
pub fn run_batch(inputs: &[PathBuf], options: &BatchOptions) -> Vec<FileOutcome> {
    collect_inputs(inputs, options)
        .iter()
        .map(|input| convert_file(input, options))
        .collect()
}
