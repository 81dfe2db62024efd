//! Reader for INTERLIS 2 transfer files (`.xtf`) of the Swiss wastewater
//! data models. Produces a [`SurveyModel`] with every entity kind resolved
//! through the dialect table independently.

pub mod dialect;
pub mod entities;
pub mod locate;
pub mod xml;

use anyhow::{Context, Result};
use log::{info, warn};
use roxmltree::{Document, Node};
use std::path::Path;
use xtf2ifc_core::model::{Dialect, EntityKind, KindResolution, SurveyModel};
use xtf2ifc_core::{ConversionConfig, ConvertError};

use dialect::{identify_dialect, resolve_kind};
use xml::Diagnostics;

pub fn import_xtf(path: &Path, cfg: &ConversionConfig) -> Result<SurveyModel> {
    let xml = std::fs::read_to_string(path).with_context(|| format!("read XTF: {path:?}"))?;
    parse_survey(&xml, cfg).with_context(|| format!("parse XTF: {path:?}"))
}

pub fn parse_survey(xml: &str, cfg: &ConversionConfig) -> Result<SurveyModel, ConvertError> {
    let doc = Document::parse(xml).map_err(|e| ConvertError::MalformedDocument(e.to_string()))?;

    let dialect = identify_dialect(&doc);
    if dialect == Dialect::Generic {
        warn!("no known dialect topic found, using generic element names");
    } else {
        info!("identified dialect {dialect}");
    }

    let elements: Vec<Node<'_, '_>> = doc.descendants().filter(|n| n.is_element()).collect();
    let mut survey = SurveyModel::empty(dialect);
    let mut resolve = |kind: EntityKind| {
        let resolved = resolve_kind(&elements, kind);
        if resolved.elements.is_empty() {
            warn!("no {kind} elements found");
        } else {
            info!(
                "found {} {kind} elements ({})",
                resolved.elements.len(),
                resolved.dialect
            );
        }
        survey.resolutions.push(KindResolution {
            kind,
            dialect: resolved.dialect,
            elements: resolved.elements.len(),
        });
        resolved
    };

    let points = resolve(EntityKind::NodePoint);
    let nodes = resolve(EntityKind::SewerNode);
    let shafts = resolve(EntityKind::StandardShaft);
    let channels = resolve(EntityKind::Channel);
    let runs = resolve(EntityKind::PipeRun);

    let mut diag = Diagnostics::default();
    survey.node_points = entities::parse_node_points(&points.elements, cfg, &mut diag);
    survey.sewer_nodes = entities::parse_sewer_nodes(&nodes.elements, cfg, &mut diag);
    let (parsed_shafts, unprocessed_shafts) = entities::parse_shafts(
        &shafts.elements,
        &survey.sewer_nodes,
        &survey.node_points,
        cfg,
        &mut diag,
    );
    survey.shafts = parsed_shafts;
    survey.unprocessed_shafts = unprocessed_shafts;
    survey.channels = entities::parse_channels(&channels.elements, &mut diag);
    let (parsed_runs, unprocessed_runs) =
        entities::parse_pipe_runs(&runs.elements, &survey.node_points, &mut diag);
    survey.pipe_runs = parsed_runs;
    survey.unprocessed_runs = unprocessed_runs;
    survey.warnings = diag.warnings;

    Ok(survey)
}
