//! Strategies that place a standard shaft.
//!
//! Each [`ShaftLocator`] answers one question about a shaft and the already
//! parsed sewer nodes and node points. [`locate_shaft`] walks an ordered chain
//! and takes the first answer.

use log::debug;
use xtf2ifc_core::geom::{centroid, Vec2};
use xtf2ifc_core::model::{LocationSource, NodePoint, SewerNode};
use xtf2ifc_core::ConversionConfig;

/// What the parser knows about a shaft before it is located.
#[derive(Debug, Clone, Copy)]
pub struct ShaftCandidate<'a> {
    pub id: &'a str,
    pub explicit_ref: Option<&'a str>,
    pub own_position: Option<Vec2>,
}

pub struct LocateContext<'a> {
    pub sewer_nodes: &'a [SewerNode],
    pub node_points: &'a [NodePoint],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub source: LocationSource,
    pub position: Vec2,
    pub invert_elevation: Option<f64>,
    /// Id of the linked sewer node, when the location came from one.
    pub sewer_node: Option<String>,
}

pub trait ShaftLocator {
    fn name(&self) -> &'static str;
    fn locate(&self, shaft: &ShaftCandidate<'_>, ctx: &LocateContext<'_>) -> Option<Location>;
}

fn node_matches(node: &SewerNode, target: &str) -> bool {
    let target = target.trim();
    node.id.trim() == target || node.structure_ref.as_deref().map(str::trim) == Some(target)
}

fn from_node(node: &SewerNode) -> Location {
    Location {
        source: LocationSource::SewerNode,
        position: node.position,
        invert_elevation: node.invert_elevation,
        sewer_node: Some(node.id.clone()),
    }
}

/// Follows the shaft's own structure reference.
pub struct ExplicitReference;

impl ShaftLocator for ExplicitReference {
    fn name(&self) -> &'static str {
        "explicit reference"
    }

    fn locate(&self, shaft: &ShaftCandidate<'_>, ctx: &LocateContext<'_>) -> Option<Location> {
        let target = shaft.explicit_ref?;
        ctx.sewer_nodes
            .iter()
            .find(|n| node_matches(n, target))
            .map(from_node)
    }
}

/// Shaft and sewer node share an identity. Only consulted when the shaft
/// names no reference of its own.
pub struct IdentityMatch;

impl ShaftLocator for IdentityMatch {
    fn name(&self) -> &'static str {
        "identity match"
    }

    fn locate(&self, shaft: &ShaftCandidate<'_>, ctx: &LocateContext<'_>) -> Option<Location> {
        if shaft.explicit_ref.is_some() {
            return None;
        }
        ctx.sewer_nodes
            .iter()
            .find(|n| node_matches(n, shaft.id))
            .map(from_node)
    }
}

pub struct OwnCoordinate;

impl ShaftLocator for OwnCoordinate {
    fn name(&self) -> &'static str {
        "own coordinate"
    }

    fn locate(&self, shaft: &ShaftCandidate<'_>, _ctx: &LocateContext<'_>) -> Option<Location> {
        shaft.own_position.map(|position| Location {
            source: LocationSource::OwnCoordinate,
            position,
            invert_elevation: None,
            sewer_node: None,
        })
    }
}

/// Centroid of the node points whose id contains the shaft id.
///
/// Heuristic of last resort: needs at least two such points.
pub struct NodePointCentroid;

impl NodePointCentroid {
    pub const MIN_POINTS: usize = 2;
}

impl ShaftLocator for NodePointCentroid {
    fn name(&self) -> &'static str {
        "node point centroid"
    }

    fn locate(&self, shaft: &ShaftCandidate<'_>, ctx: &LocateContext<'_>) -> Option<Location> {
        let id = shaft.id.trim();
        if id.is_empty() {
            return None;
        }
        let points: Vec<Vec2> = ctx
            .node_points
            .iter()
            .filter(|p| p.id.contains(id) && p.position.is_finite())
            .map(|p| p.position)
            .collect();
        if points.len() < Self::MIN_POINTS {
            return None;
        }
        centroid(&points).map(|position| Location {
            source: LocationSource::NodePointCentroid,
            position,
            invert_elevation: None,
            sewer_node: None,
        })
    }
}

pub fn default_chain(cfg: &ConversionConfig) -> Vec<Box<dyn ShaftLocator>> {
    let mut chain: Vec<Box<dyn ShaftLocator>> = vec![
        Box::new(ExplicitReference),
        Box::new(IdentityMatch),
        Box::new(OwnCoordinate),
    ];
    if cfg.shaft_centroid_fallback {
        chain.push(Box::new(NodePointCentroid));
    }
    chain
}

pub fn locate_shaft(
    chain: &[Box<dyn ShaftLocator>],
    shaft: &ShaftCandidate<'_>,
    ctx: &LocateContext<'_>,
) -> Option<Location> {
    chain.iter().find_map(|locator| {
        let found = locator.locate(shaft, ctx)?;
        debug!("shaft '{}' located by {}", shaft.id, locator.name());
        Some(found)
    })
}
