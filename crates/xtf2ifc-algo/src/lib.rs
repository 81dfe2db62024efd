use anyhow::Context;
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use xtf2ifc_core::model::SurveyModel;
use xtf2ifc_core::normalize::normalize;
use xtf2ifc_core::report::ConversionReport;
use xtf2ifc_core::{ConversionConfig, Result};

pub mod assemble;
pub mod authoring;
pub mod classify;
pub mod guid;
pub mod ifc_writer;
pub mod solid;

use authoring::ModelAuthoring;
use ifc_writer::IfcWriter;

/// A finished IFC document and what went into it.
pub struct Conversion {
    pub content: String,
    pub report: ConversionReport,
}

impl Conversion {
    /// Writes to a temporary file in the target directory and renames it over
    /// `path`, so a failed write leaves no partial document behind.
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir).with_context(|| format!("create temporary file in {dir:?}"))?;
        file.write_all(self.content.as_bytes())
            .and_then(|_| file.flush())
            .with_context(|| format!("write IFC: {path:?}"))?;
        file.persist(path)
            .map_err(|err| err.error)
            .with_context(|| format!("move IFC into place: {path:?}"))?;
        Ok(())
    }
}

/// `input` with its extension replaced by `.ifc`.
pub fn output_name(input: &Path) -> PathBuf {
    input.with_extension("ifc")
}

/// Normalizes, builds and authors one survey into an in-memory IFC document.
/// Nothing is written unless every step succeeds.
pub fn convert_survey(survey: SurveyModel, cfg: &ConversionConfig, name: &str) -> Result<Conversion> {
    cfg.validate()?;
    let dialect = survey.dialect.label().to_string();
    let parsed = survey.counts();

    // 1. Origin + consistency checks
    let normalized = normalize(survey, cfg)?;

    // 2. Solids, classification and authoring
    let mut writer = IfcWriter::new(name);
    let summary = assemble::assemble(&mut writer, &normalized, cfg)?;

    // 3. Serialize
    let content = writer.serialize()?;
    info!("{name}: {} IFC entities", writer.entity_count());

    let consistency = normalized.stats;
    let survey = normalized.survey;
    let mut unprocessed_shafts = survey.unprocessed_shafts;
    unprocessed_shafts.extend(summary.demoted_shafts);
    let mut unprocessed_runs = survey.unprocessed_runs;
    unprocessed_runs.extend(summary.demoted_runs);
    let mut warnings = survey.warnings;
    warnings.extend(summary.warnings);

    Ok(Conversion {
        content,
        report: ConversionReport {
            dialect,
            parsed,
            shafts_authored: summary.shafts_authored,
            runs_authored: summary.runs_authored,
            unprocessed_shafts,
            unprocessed_runs,
            consistency,
            shaft_grades: summary.shaft_grades,
            run_grades: summary.run_grades,
            warnings,
        },
    })
}
