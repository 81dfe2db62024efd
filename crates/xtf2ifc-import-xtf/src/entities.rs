use crate::locate::{default_chain, locate_shaft, LocateContext, ShaftCandidate};
use crate::xml::{descendant, find_path, optional_text, reference, text, tid, Diagnostics};
use log::{debug, error, info, warn};
use roxmltree::Node;
use xtf2ifc_core::model::{
    Channel, Dimension, EntityKind, NodePoint, PathPoint, PipeRun, SewerNode, StandardShaft,
};
use xtf2ifc_core::report::Warning;
use xtf2ifc_core::{ConversionConfig, ConvertError};

/// Internal diameter assumed for pipe runs without `Lichte_Hoehe`, meters.
pub const DEFAULT_INTERNAL_DIAMETER: f64 = 0.5;

fn element_id(node: Node<'_, '_>, kind: EntityKind, diag: &mut Diagnostics) -> Option<String> {
    let id = tid(node);
    if id.is_none() {
        warn!("{kind} element without TID skipped");
        diag.push(Warning::new("missing_tid", format!("{kind} element without TID skipped")));
    }
    id
}

/// Surveyed millimeter value, or `None` when absent or zero.
fn surveyed_dimension(diag: &mut Diagnostics, node: Node<'_, '_>, field: &str, id: &str) -> Option<f64> {
    diag.number(node, field, id).filter(|v| *v != 0.0)
}

pub fn parse_node_points(
    elements: &[Node<'_, '_>],
    cfg: &ConversionConfig,
    diag: &mut Diagnostics,
) -> Vec<NodePoint> {
    let mut points = Vec::with_capacity(elements.len());
    for &element in elements {
        let Some(id) = element_id(element, EntityKind::NodePoint, diag) else {
            continue;
        };
        let Some(position) = diag.location(element, &id) else {
            debug!("node point '{id}' has no usable Lage/COORD");
            continue;
        };
        let elevation = match diag.number(element, "Kote", &id) {
            Some(z) => z,
            None => {
                let message = format!(
                    "node point '{id}' has no Kote, using default {}",
                    cfg.default_invert_elevation
                );
                warn!("{message}");
                diag.push(Warning::new("defaulted_elevation", message));
                cfg.default_invert_elevation
            }
        };
        points.push(NodePoint {
            network_element: reference(element, "AbwasserNetzelementRef"),
            id,
            position,
            elevation,
        });
    }
    info!("parsed {} node points", points.len());
    points
}

pub fn parse_sewer_nodes(
    elements: &[Node<'_, '_>],
    cfg: &ConversionConfig,
    diag: &mut Diagnostics,
) -> Vec<SewerNode> {
    let mut nodes = Vec::with_capacity(elements.len());
    for &element in elements {
        let Some(id) = element_id(element, EntityKind::SewerNode, diag) else {
            continue;
        };
        let Some(position) = diag.location(element, &id) else {
            error!("sewer node '{id}' has no coordinates, dropped");
            diag.push(Warning::new(
                "missing_position",
                format!("sewer node '{id}' has no coordinates, dropped"),
            ));
            continue;
        };

        let diameter = surveyed_dimension(diag, element, "Dimension1", &id)
            .map(Dimension::surveyed)
            .unwrap_or_else(|| Dimension::fallback(cfg.default_shaft_diameter_mm()));
        let height = surveyed_dimension(diag, element, "Dimension2", &id)
            .map(Dimension::surveyed)
            .unwrap_or_else(|| Dimension::fallback(cfg.default_shaft_height_mm()));

        nodes.push(SewerNode {
            invert_elevation: diag.number(element, "Sohlenkote", &id),
            diameter,
            height,
            structure_ref: reference(element, "AbwasserbauwerkRef"),
            designation: text(element, "Bezeichnung"),
            location_name: text(element, "Standortname"),
            last_change: text(element, "Letzte_Aenderung"),
            id,
            position,
        });
    }
    info!("parsed {} sewer nodes", nodes.len());
    nodes
}

pub fn parse_shafts(
    elements: &[Node<'_, '_>],
    sewer_nodes: &[SewerNode],
    node_points: &[NodePoint],
    cfg: &ConversionConfig,
    diag: &mut Diagnostics,
) -> (Vec<StandardShaft>, Vec<String>) {
    let chain = default_chain(cfg);
    let ctx = LocateContext {
        sewer_nodes,
        node_points,
    };
    let mut shafts = Vec::with_capacity(elements.len());
    let mut unprocessed = Vec::new();

    for &element in elements {
        let Some(id) = element_id(element, EntityKind::StandardShaft, diag) else {
            continue;
        };
        let explicit_ref = reference(element, "AbwasserbauwerkRef");
        let own_position = diag.location(element, &id);
        let candidate = ShaftCandidate {
            id: &id,
            explicit_ref: explicit_ref.as_deref(),
            own_position,
        };

        let Some(location) = locate_shaft(&chain, &candidate, &ctx) else {
            let reason = match &explicit_ref {
                Some(target) => format!("references unknown sewer node '{target}' and has no position"),
                None => "has no linked sewer node and no position".to_string(),
            };
            diag.record(&ConvertError::UnresolvedReference {
                kind: EntityKind::StandardShaft,
                id: id.clone(),
                reason,
            });
            unprocessed.push(id);
            continue;
        };

        let node = location
            .sewer_node
            .as_deref()
            .and_then(|node_id| sewer_nodes.iter().find(|n| n.id == node_id));
        let diameter = surveyed_dimension(diag, element, "Dimension1", &id)
            .map(Dimension::surveyed)
            .or_else(|| node.map(|n| n.diameter).filter(|d| d.surveyed))
            .unwrap_or_else(|| Dimension::fallback(cfg.default_shaft_diameter_mm()));
        let height = surveyed_dimension(diag, element, "Dimension2", &id)
            .map(Dimension::surveyed)
            .or_else(|| node.map(|n| n.height).filter(|d| d.surveyed))
            .unwrap_or_else(|| Dimension::fallback(cfg.default_shaft_height_mm()));

        shafts.push(StandardShaft {
            sewer_node: location.sewer_node.or(explicit_ref),
            position: location.position,
            invert_elevation: location.invert_elevation,
            location_source: location.source,
            diameter,
            height,
            designation: text(element, "Bezeichnung"),
            location_name: text(element, "Standortname"),
            function: text(element, "Funktion"),
            material: text(element, "Material"),
            id,
        });
    }
    info!(
        "parsed {} standard shafts, {} unprocessed",
        shafts.len(),
        unprocessed.len()
    );
    (shafts, unprocessed)
}

pub fn parse_channels(elements: &[Node<'_, '_>], diag: &mut Diagnostics) -> Vec<Channel> {
    let channels: Vec<Channel> = elements
        .iter()
        .filter_map(|&element| {
            let id = element_id(element, EntityKind::Channel, diag)?;
            Some(Channel {
                id,
                designation: optional_text(element, "Bezeichnung"),
                location_name: optional_text(element, "Standortname"),
                accessibility: optional_text(element, "Zugaenglichkeit"),
                usage_current: optional_text(element, "Nutzungsart_Ist"),
                last_change: optional_text(element, "Letzte_Aenderung"),
            })
        })
        .collect();
    info!("parsed {} channels", channels.len());
    channels
}

fn parse_path(element: Node<'_, '_>, id: &str, diag: &mut Diagnostics) -> Vec<PathPoint> {
    let Some(polyline) = find_path(element, &["Verlauf", "POLYLINE"]) else {
        return Vec::new();
    };
    polyline
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "COORD")
        .filter_map(|coord| {
            let position = diag.coord(coord, id)?;
            let elevation = diag.component(coord, "C3", id);
            Some(PathPoint {
                position,
                elevation,
            })
        })
        .collect()
}

fn find_point<'p>(points: &'p [NodePoint], target: Option<&str>) -> Option<&'p NodePoint> {
    let target = target?;
    points.iter().find(|p| p.id == target)
}

pub fn parse_pipe_runs(
    elements: &[Node<'_, '_>],
    node_points: &[NodePoint],
    diag: &mut Diagnostics,
) -> (Vec<PipeRun>, Vec<String>) {
    let mut runs = Vec::with_capacity(elements.len());
    let mut unprocessed = Vec::new();

    for &element in elements {
        let Some(id) = element_id(element, EntityKind::PipeRun, diag) else {
            continue;
        };
        let from_ref = reference(element, "vonHaltungspunktRef");
        let to_ref = reference(element, "nachHaltungspunktRef");

        let (start, end) = match (
            find_point(node_points, from_ref.as_deref()),
            find_point(node_points, to_ref.as_deref()),
        ) {
            (Some(start), Some(end)) => (start.clone(), end.clone()),
            (start, _) => {
                let (which, target) = if start.is_none() {
                    ("start", from_ref)
                } else {
                    ("end", to_ref)
                };
                let reason = match target {
                    Some(t) => format!("{which} references unknown node point '{t}'"),
                    None => format!("has no {which} node point reference"),
                };
                diag.record(&ConvertError::UnresolvedReference {
                    kind: EntityKind::PipeRun,
                    id: id.clone(),
                    reason,
                });
                unprocessed.push(id);
                continue;
            }
        };

        let clear_height = diag
            .number(element, "Lichte_Hoehe", &id)
            .filter(|v| *v != 0.0);
        let (internal_diameter, diameter_surveyed) = match clear_height {
            Some(mm) => (mm / 1000.0, true),
            None => (DEFAULT_INTERNAL_DIAMETER, false),
        };
        if descendant(element, "Verlauf").is_none() {
            debug!("pipe run '{id}' has no Verlauf");
        }

        runs.push(PipeRun {
            designation: text(element, "Bezeichnung"),
            material: text(element, "Material"),
            internal_diameter,
            diameter_surveyed,
            effective_length: diag.number(element, "LaengeEffektiv", &id),
            path: parse_path(element, &id, diag),
            start,
            end,
            id,
        });
    }
    info!(
        "parsed {} pipe runs, {} unprocessed",
        runs.len(),
        unprocessed.len()
    );
    (runs, unprocessed)
}
