//! Batch driver for the `xtf2ifc` binary.
//!
//! Every input file is converted on its own: a failure is recorded for that
//! file and the batch moves on.

mod args;
pub mod config;

pub use args::Args;

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use xtf2ifc_algo::{convert_survey, output_name};
use xtf2ifc_core::report::{BatchReport, ConversionReport, FileOutcome};
use xtf2ifc_core::ConversionConfig;
use xtf2ifc_import_xtf::import_xtf;

fn is_xtf(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xtf"))
}

/// Files are taken as given; directories contribute their `.xtf` files,
/// sorted by name.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("read directory: {input:?}"))?
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.is_file() && is_xtf(path))
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("no .xtf files in {}", input.display());
            }
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

pub fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let default = output_name(input);
    match (output_dir, default.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => default,
    }
}

fn convert_file(input: &Path, output: &Path, cfg: &ConversionConfig) -> Result<ConversionReport> {
    let survey = import_xtf(input, cfg)?;
    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    let conversion = convert_survey(survey, cfg, name).with_context(|| format!("convert: {input:?}"))?;
    conversion.save_to_file(output)?;
    Ok(conversion.report)
}

/// Converts one file and never fails: errors end up in the outcome.
pub fn process_file(input: &Path, output_dir: Option<&Path>, cfg: &ConversionConfig) -> FileOutcome {
    let output = output_path(input, output_dir);
    info!("converting {} -> {}", input.display(), output.display());

    match convert_file(input, &output, cfg) {
        Ok(report) => {
            info!(
                "{}: {} shafts, {} pipe runs, {} warnings",
                input.display(),
                report.shafts_authored,
                report.runs_authored,
                report.warnings.len()
            );
            FileOutcome {
                input: input.display().to_string(),
                output: Some(output.display().to_string()),
                error: None,
                report: Some(report),
            }
        }
        Err(err) => {
            error!("{}: {err:#}", input.display());
            FileOutcome {
                input: input.display().to_string(),
                output: None,
                error: Some(format!("{err:#}")),
                report: None,
            }
        }
    }
}

pub fn convert_batch(inputs: &[PathBuf], output_dir: Option<&Path>, cfg: &ConversionConfig) -> Result<BatchReport> {
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir).with_context(|| format!("create output directory: {dir:?}"))?;
    }
    let mut batch = BatchReport::default();
    for input in collect_inputs(inputs)? {
        batch.push(process_file(&input, output_dir, cfg));
    }
    info!(
        "{} converted, {} failed",
        batch.converted.len(),
        batch.failed.len()
    );
    Ok(batch)
}

pub fn write_report(batch: &BatchReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(batch).context("serialize report")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("create directory: {parent:?}"))?;
        }
    }
    fs::write(path, json).with_context(|| format!("write report: {path:?}"))?;
    Ok(())
}

/// Loads the configuration, converts every input and writes the optional
/// JSON summary.
pub fn run(args: &Args) -> Result<BatchReport> {
    let mut cfg = config::load_config(args.config.as_deref())?;
    if args.highlight_incomplete {
        cfg.highlight_incomplete = true;
    }

    let batch = convert_batch(&args.inputs, args.output_dir.as_deref(), &cfg)?;
    if let Some(path) = &args.report {
        write_report(&batch, path)?;
    }
    Ok(batch)
}
