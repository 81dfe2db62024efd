use crate::config::ConversionConfig;
use crate::error::{ConvertError, Result};
use crate::geom::{approx_same_position, floor_to_multiple, Vec3};
use crate::model::{EntityKind, SurveyModel};
use crate::report::Warning;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

const ORIGIN_STEP: f64 = 10.0;

/// Local origin of the authored model: the floored componentwise minimum of
/// all positioned entities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalOrigin {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl GlobalOrigin {
    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_local(&self, world: Vec3) -> Vec3 {
        world.sub(&self.as_vec3())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NormalizeStats {
    pub removed_duplicates: usize,
    pub dangling_shaft_links: usize,
    pub degenerate_runs: usize,
    pub shared_sewer_nodes: usize,
}

#[derive(Debug, Clone)]
pub struct NormalizedSurvey {
    pub survey: SurveyModel,
    pub origin: GlobalOrigin,
    pub stats: NormalizeStats,
}

pub fn normalize(mut survey: SurveyModel, cfg: &ConversionConfig) -> Result<NormalizedSurvey> {
    let mut stats = NormalizeStats::default();
    let mut warnings = Vec::new();

    stats.removed_duplicates = drop_duplicates(&mut survey, &mut warnings);
    check_shaft_links(&survey, &mut stats, &mut warnings);
    check_runs(&survey, &mut stats, &mut warnings);

    let origin = global_origin(&survey, cfg)?;
    info!(
        "global origin ({}, {}, {}); {} consistency warnings",
        origin.x,
        origin.y,
        origin.z,
        warnings.len()
    );

    survey.warnings.extend(warnings);
    Ok(NormalizedSurvey {
        survey,
        origin,
        stats,
    })
}

pub fn global_origin(survey: &SurveyModel, cfg: &ConversionConfig) -> Result<GlobalOrigin> {
    let mut min = [f64::INFINITY; 3];
    let mut include = |x: f64, y: f64, z: f64| {
        for (slot, v) in min.iter_mut().zip([x, y, z]) {
            if v.is_finite() {
                *slot = slot.min(v);
            }
        }
    };

    for p in &survey.node_points {
        include(p.position.x, p.position.y, p.elevation);
    }
    for n in &survey.sewer_nodes {
        include(n.position.x, n.position.y, cfg.effective_invert(n.invert_elevation));
    }
    for s in &survey.shafts {
        include(s.position.x, s.position.y, cfg.effective_invert(s.invert_elevation));
    }

    let [x, y, z] = min.map(|v| floor_to_multiple(v, ORIGIN_STEP));
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return Err(ConvertError::DegenerateOrigin { x, y, z });
    }
    Ok(GlobalOrigin { x, y, z })
}

fn drop_duplicates(survey: &mut SurveyModel, warnings: &mut Vec<Warning>) -> usize {
    fn retain_unique<T>(
        items: &mut Vec<T>,
        kind: EntityKind,
        id: impl Fn(&T) -> &str,
        warnings: &mut Vec<Warning>,
    ) -> usize {
        let mut seen = HashSet::new();
        let before = items.len();
        items.retain(|item| {
            let key = id(item).to_string();
            if seen.insert(key.clone()) {
                true
            } else {
                warn!("duplicate {kind} '{key}' dropped");
                warnings.push(Warning::new(
                    "duplicate_id",
                    format!("duplicate {kind} '{key}' dropped"),
                ));
                false
            }
        });
        before - items.len()
    }

    retain_unique(&mut survey.node_points, EntityKind::NodePoint, |p| p.id.as_str(), warnings)
        + retain_unique(&mut survey.sewer_nodes, EntityKind::SewerNode, |n| n.id.as_str(), warnings)
        + retain_unique(&mut survey.shafts, EntityKind::StandardShaft, |s| s.id.as_str(), warnings)
        + retain_unique(&mut survey.channels, EntityKind::Channel, |c| c.id.as_str(), warnings)
        + retain_unique(&mut survey.pipe_runs, EntityKind::PipeRun, |r| r.id.as_str(), warnings)
}

fn check_shaft_links(survey: &SurveyModel, stats: &mut NormalizeStats, warnings: &mut Vec<Warning>) {
    let mut users: HashMap<&str, Vec<&str>> = HashMap::new();
    for shaft in &survey.shafts {
        let Some(node_id) = shaft.sewer_node.as_deref() else {
            continue;
        };
        if survey.sewer_node(node_id).is_none() {
            stats.dangling_shaft_links += 1;
            warnings.push(Warning::new(
                "dangling_shaft_link",
                format!("shaft '{}' links missing sewer node '{node_id}'", shaft.id),
            ));
        }
        users.entry(node_id).or_default().push(&shaft.id);
    }

    let mut shared: Vec<_> = users.into_iter().filter(|(_, s)| s.len() > 1).collect();
    shared.sort();
    for (node_id, shafts) in shared {
        stats.shared_sewer_nodes += 1;
        warnings.push(Warning::new(
            "shared_sewer_node",
            format!("sewer node '{node_id}' is linked by shafts {}", shafts.join(", ")),
        ));
    }
}

fn check_runs(survey: &SurveyModel, stats: &mut NormalizeStats, warnings: &mut Vec<Warning>) {
    for run in &survey.pipe_runs {
        if run.path.is_empty() && approx_same_position(run.start.position, run.end.position) {
            stats.degenerate_runs += 1;
            warnings.push(Warning::new(
                "degenerate_run",
                format!(
                    "pipe run '{}' starts and ends at the same planar position",
                    run.id
                ),
            ));
        }
    }
}
