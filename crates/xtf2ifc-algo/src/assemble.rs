use crate::authoring::{ElementKind, Handle, ModelAuthoring, Property};
use crate::classify::{classify_pipe_run, classify_shaft};
use crate::solid::{build_pipe_solid, build_shaft_solid, shaft_openings, Solid};
use log::{debug, info, warn};
use std::collections::HashSet;
use xtf2ifc_core::geom::Vec3;
use xtf2ifc_core::model::{PipeRun, StandardShaft};
use xtf2ifc_core::normalize::NormalizedSurvey;
use xtf2ifc_core::report::{EntityGrade, Warning};
use xtf2ifc_core::{ConversionConfig, Result};

pub const PROJECT_NAME: &str = "Sewer network";
pub const SITE_NAME: &str = "Perimeter";
pub const PIPE_RUN_GROUP: &str = "Pipe runs";
pub const SHAFT_GROUP: &str = "Shafts";
pub const PIPE_RUN_PSET: &str = "Pset_SurveyPipeRun";
pub const SHAFT_PSET: &str = "Pset_SurveyShaft";

#[derive(Debug, Clone, Default)]
pub struct AssemblySummary {
    pub shafts_authored: usize,
    pub runs_authored: usize,
    /// Parsed entities whose geometry turned out degenerate.
    pub demoted_shafts: Vec<String>,
    pub demoted_runs: Vec<String>,
    pub shaft_grades: Vec<EntityGrade>,
    pub run_grades: Vec<EntityGrade>,
    pub warnings: Vec<Warning>,
}

/// Authors `solid` bottom-up and returns the handle of its root.
pub fn author_solid<A: ModelAuthoring + ?Sized>(authoring: &mut A, solid: &Solid) -> Result<Handle> {
    match solid {
        Solid::Extrusion {
            radius,
            depth,
            position,
            axis,
        } => authoring.create_extrusion(*radius, *depth, *position, *axis),
        Solid::Difference { first, second } => {
            let first = author_solid(authoring, first)?;
            let second = author_solid(authoring, second)?;
            authoring.create_difference(first, second)
        }
        Solid::Union { first, second } => {
            let first = author_solid(authoring, first)?;
            let second = author_solid(authoring, second)?;
            authoring.create_union(first, second)
        }
        Solid::SweptDisk {
            directrix,
            radius,
            inner_radius,
        } => authoring.create_swept_disk(directrix, *radius, *inner_radius),
    }
}

fn display_name<'a>(designation: &'a str, id: &'a str) -> &'a str {
    if designation.trim().is_empty() {
        id
    } else {
        designation
    }
}

pub fn pipe_properties(run: &PipeRun) -> Vec<Property> {
    let mut props = vec![
        Property::text("Designation", &run.designation),
        Property::text("Material", &run.material),
    ];
    if let Some(length) = run.effective_length {
        props.push(Property::length("EffectiveLength", length));
    }
    props.push(Property::length("InternalDiameter", run.internal_diameter));
    props
}

/// Shaft properties; dimensions and elevation still at their fallback are
/// left out.
pub fn shaft_properties(shaft: &StandardShaft, cfg: &ConversionConfig) -> Vec<Property> {
    let mut props = Vec::new();
    for (name, value) in [
        ("Designation", &shaft.designation),
        ("LocationName", &shaft.location_name),
        ("Function", &shaft.function),
        ("Material", &shaft.material),
    ] {
        if !value.trim().is_empty() {
            props.push(Property::text(name, value));
        }
    }
    if shaft.diameter.surveyed {
        props.push(Property::length("Diameter", shaft.diameter.meters()));
    }
    if shaft.height.surveyed {
        props.push(Property::length("Height", shaft.height.meters()));
    }
    if let Some(z) = shaft.invert_elevation {
        if !cfg.is_missing_invert(Some(z)) {
            props.push(Property::length("InvertElevation", z));
        }
    }
    props
}

/// Drives `authoring` through one normalized survey. Geometry problems demote
/// single entities; any authoring error aborts.
pub fn assemble<A: ModelAuthoring + ?Sized>(
    authoring: &mut A,
    normalized: &NormalizedSurvey,
    cfg: &ConversionConfig,
) -> Result<AssemblySummary> {
    let survey = &normalized.survey;
    let origin = normalized.origin;
    let mut summary = AssemblySummary::default();

    let project = authoring.create_project(PROJECT_NAME, &origin)?;
    let site_placement = authoring.create_placement(None, Vec3::new(0.0, 0.0, 0.0), None)?;
    let site = authoring.create_site(SITE_NAME, site_placement, &origin)?;
    authoring.aggregate(project, &[site])?;
    let run_group = authoring.create_group(PIPE_RUN_GROUP)?;
    let shaft_group = authoring.create_group(SHAFT_GROUP)?;

    let mut run_elements = Vec::with_capacity(survey.pipe_runs.len());
    let mut authored_runs: HashSet<&str> = HashSet::new();
    for run in &survey.pipe_runs {
        let solid = match build_pipe_solid(run, cfg) {
            Ok(solid) => solid,
            Err(err) => {
                warn!("{err}; pipe run not authored");
                summary.warnings.push(Warning::new("degenerate_geometry", err.to_string()));
                summary.demoted_runs.push(run.id.clone());
                continue;
            }
        };
        let quality = classify_pipe_run(run, &survey.shafts, cfg);

        let placement = authoring.create_placement(Some(site_placement), origin.to_local(solid.placement), None)?;
        let item = author_solid(authoring, &solid.solid)?;
        let element = authoring.create_element(
            ElementKind::PipeSegment,
            display_name(&run.designation, &run.id),
            placement,
            &[item],
        )?;
        authoring.apply_color(item, quality.rgb())?;
        authoring.attach_properties(element, PIPE_RUN_PSET, &pipe_properties(run))?;

        debug!("pipe run '{}' authored, {}", run.id, quality.label());
        summary.run_grades.push(EntityGrade::new(&run.id, quality.label()));
        authored_runs.insert(run.id.as_str());
        run_elements.push(element);
    }

    let opening_runs: Vec<PipeRun> = if cfg.cut_pipe_openings {
        survey
            .pipe_runs
            .iter()
            .filter(|r| authored_runs.contains(r.id.as_str()))
            .cloned()
            .collect()
    } else {
        Vec::new()
    };

    let mut shaft_elements = Vec::with_capacity(survey.shafts.len());
    for shaft in &survey.shafts {
        let openings = shaft_openings(shaft, &opening_runs, cfg);
        let solid = match build_shaft_solid(shaft, &openings, cfg) {
            Ok(solid) => solid,
            Err(err) => {
                warn!("{err}; shaft not authored");
                summary.warnings.push(Warning::new("degenerate_geometry", err.to_string()));
                summary.demoted_shafts.push(shaft.id.clone());
                continue;
            }
        };
        let quality = classify_shaft(shaft, cfg);

        let placement = authoring.create_placement(Some(site_placement), origin.to_local(solid.placement), None)?;
        let item = author_solid(authoring, &solid.body)?;
        let element = authoring.create_element(
            ElementKind::DistributionChamber,
            display_name(&shaft.designation, &shaft.id),
            placement,
            &[item],
        )?;
        authoring.apply_color(item, quality.rgb())?;
        authoring.attach_properties(element, SHAFT_PSET, &shaft_properties(shaft, cfg))?;

        debug!(
            "shaft '{}' authored with {} openings, {}",
            shaft.id,
            openings.len(),
            quality.label()
        );
        summary.shaft_grades.push(EntityGrade::new(&shaft.id, quality.label()));
        shaft_elements.push(element);
    }

    let contained: Vec<Handle> = run_elements.iter().chain(&shaft_elements).copied().collect();
    authoring.contain_in_spatial_structure(site, &contained)?;
    authoring.assign_to_group(run_group, &run_elements)?;
    authoring.assign_to_group(shaft_group, &shaft_elements)?;

    summary.runs_authored = run_elements.len();
    summary.shafts_authored = shaft_elements.len();
    info!(
        "authored {} pipe runs and {} shafts",
        summary.runs_authored, summary.shafts_authored
    );
    Ok(summary)
}
