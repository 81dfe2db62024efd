use crate::geom::Vec2;
use crate::report::{EntityCounts, Warning};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    NodePoint,
    SewerNode,
    StandardShaft,
    Channel,
    PipeRun,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::NodePoint,
        EntityKind::SewerNode,
        EntityKind::StandardShaft,
        EntityKind::Channel,
        EntityKind::PipeRun,
    ];
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::NodePoint => "node point",
            EntityKind::SewerNode => "sewer node",
            EntityKind::StandardShaft => "standard shaft",
            EntityKind::Channel => "channel",
            EntityKind::PipeRun => "pipe run",
        };
        f.write_str(name)
    }
}

/// Historical naming variant of the survey schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dialect {
    Dss2020Lv95,
    Sia405Abwasser2015Lv95,
    Dss2015Lv95,
    Generic,
}

impl Dialect {
    pub fn label(&self) -> &'static str {
        match self {
            Dialect::Dss2020Lv95 => "DSS_2020_LV95",
            Dialect::Sia405Abwasser2015Lv95 => "SIA405_ABWASSER_2015_LV95",
            Dialect::Dss2015Lv95 => "DSS_2015_LV95",
            Dialect::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A nominal dimension in millimeters. `surveyed` is false when the value is
/// the configured fallback.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub millimeters: f64,
    pub surveyed: bool,
}

impl Dimension {
    pub fn surveyed(millimeters: f64) -> Self {
        Self {
            millimeters,
            surveyed: true,
        }
    }

    pub fn fallback(millimeters: f64) -> Self {
        Self {
            millimeters,
            surveyed: false,
        }
    }

    pub fn meters(&self) -> f64 {
        self.millimeters / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePoint {
    pub id: String,
    pub position: Vec2,
    pub elevation: f64,
    pub network_element: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SewerNode {
    pub id: String,
    pub position: Vec2,
    pub invert_elevation: Option<f64>,
    pub diameter: Dimension,
    pub height: Dimension,
    pub structure_ref: Option<String>,
    pub designation: String,
    pub location_name: String,
    pub last_change: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSource {
    SewerNode,
    OwnCoordinate,
    NodePointCentroid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardShaft {
    pub id: String,
    pub sewer_node: Option<String>,
    pub position: Vec2,
    pub invert_elevation: Option<f64>,
    pub location_source: LocationSource,
    pub diameter: Dimension,
    pub height: Dimension,
    pub designation: String,
    pub location_name: String,
    pub function: String,
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub designation: Option<String>,
    pub location_name: Option<String>,
    pub accessibility: Option<String>,
    pub usage_current: Option<String>,
    pub last_change: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub position: Vec2,
    pub elevation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeRun {
    pub id: String,
    pub designation: String,
    pub material: String,
    /// Meters.
    pub internal_diameter: f64,
    pub diameter_surveyed: bool,
    pub effective_length: Option<f64>,
    pub path: Vec<PathPoint>,
    pub start: NodePoint,
    pub end: NodePoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindResolution {
    pub kind: EntityKind,
    pub dialect: Dialect,
    pub elements: usize,
}

/// Everything one parse produces. Owned by a single conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyModel {
    pub dialect: Dialect,
    pub resolutions: Vec<KindResolution>,
    pub node_points: Vec<NodePoint>,
    pub sewer_nodes: Vec<SewerNode>,
    pub shafts: Vec<StandardShaft>,
    pub channels: Vec<Channel>,
    pub pipe_runs: Vec<PipeRun>,
    pub unprocessed_shafts: Vec<String>,
    pub unprocessed_runs: Vec<String>,
    pub warnings: Vec<Warning>,
}

impl SurveyModel {
    pub fn empty(dialect: Dialect) -> Self {
        Self {
            dialect,
            resolutions: Vec::new(),
            node_points: Vec::new(),
            sewer_nodes: Vec::new(),
            shafts: Vec::new(),
            channels: Vec::new(),
            pipe_runs: Vec::new(),
            unprocessed_shafts: Vec::new(),
            unprocessed_runs: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn sewer_node(&self, id: &str) -> Option<&SewerNode> {
        self.sewer_nodes.iter().find(|n| n.id == id)
    }

    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            node_points: self.node_points.len(),
            sewer_nodes: self.sewer_nodes.len(),
            standard_shafts: self.shafts.len(),
            channels: self.channels.len(),
            pipe_runs: self.pipe_runs.len(),
        }
    }
}
