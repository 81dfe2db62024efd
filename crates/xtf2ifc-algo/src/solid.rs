//! Constructive-solid descriptions of shafts and pipe runs.
//!
//! Nothing here is tessellated: a [`Solid`] names extrusions, boolean
//! differences and swept disks the way an IFC body representation does.
//! Positions inside a solid are relative to the element placement.

use nalgebra::Point3;
use thiserror::Error;
use xtf2ifc_core::geom::{
    approx_same_position, interpolate_elevation, planar_direction, Vec2, Vec3,
};
use xtf2ifc_core::model::{PipeRun, StandardShaft};
use xtf2ifc_core::ConversionConfig;

const POINT_EPS: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum Solid {
    /// Circular profile at `position`, extruded `depth` along `axis`.
    Extrusion {
        radius: f64,
        depth: f64,
        position: Vec3,
        axis: Vec3,
    },
    Difference {
        first: Box<Solid>,
        second: Box<Solid>,
    },
    Union {
        first: Box<Solid>,
        second: Box<Solid>,
    },
    /// `inner_radius` 0 is a solid disk.
    SweptDisk {
        directrix: Vec<Point3<f64>>,
        radius: f64,
        inner_radius: f64,
    },
}

impl Solid {
    pub fn vertical_cylinder(radius: f64, depth: f64, base_z: f64) -> Self {
        Solid::Extrusion {
            radius,
            depth,
            position: Vec3::new(0.0, 0.0, base_z),
            axis: Vec3::unit_z(),
        }
    }

    pub fn minus(self, other: Solid) -> Self {
        Solid::Difference {
            first: Box::new(self),
            second: Box::new(other),
        }
    }

    pub fn plus(self, other: Solid) -> Self {
        Solid::Union {
            first: Box::new(self),
            second: Box::new(other),
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Solid::Difference { .. } | Solid::Union { .. })
    }

    /// Number of operands cut away from the base solid.
    pub fn cut_count(&self) -> usize {
        match self {
            Solid::Difference { first, .. } => 1 + first.cut_count(),
            Solid::Union { first, .. } => first.cut_count(),
            _ => 0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SolidError {
    #[error("pipe run '{id}' has a zero-length centerline")]
    DegenerateDirectrix { id: String },

    #[error("shaft '{id}' has non-positive {what} {value}")]
    DegenerateShaft {
        id: String,
        what: &'static str,
        value: f64,
    },

    #[error("pipe run '{id}' has non-positive internal diameter {value}")]
    DegeneratePipe { id: String, value: f64 },

    #[error("{id}: non-finite geometry")]
    NonFinite { id: String },
}

/// A horizontal hole cut into a shaft wall where a pipe run meets it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeOpening {
    pub direction: Vec2,
    pub radius: f64,
    /// Centerline height above the shaft placement.
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShaftSolid {
    /// World position of the shaft floor center.
    pub placement: Vec3,
    pub outer_radius: f64,
    pub inner_radius: Option<f64>,
    pub depth: f64,
    /// Walls of a hollow shaft joined with its bottom slab, or a plain
    /// cylinder.
    pub body: Solid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipeSolid {
    /// World position of the raised start point.
    pub placement: Vec3,
    pub outer_radius: f64,
    /// 0 when the pipe has no wall.
    pub inner_radius: f64,
    pub solid: Solid,
}

impl PipeSolid {
    pub fn directrix(&self) -> &[Point3<f64>] {
        match &self.solid {
            Solid::SweptDisk { directrix, .. } => directrix,
            _ => &[],
        }
    }
}

pub fn pipe_outer_radius(run: &PipeRun, cfg: &ConversionConfig) -> f64 {
    run.internal_diameter / 2.0 + cfg.default_pipe_wall_thickness
}

pub fn build_shaft_solid(
    shaft: &StandardShaft,
    openings: &[PipeOpening],
    cfg: &ConversionConfig,
) -> Result<ShaftSolid, SolidError> {
    let width = shaft.diameter.meters();
    let depth = shaft.height.meters();
    for (what, value) in [("diameter", width), ("height", depth)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(SolidError::DegenerateShaft {
                id: shaft.id.clone(),
                what,
                value,
            });
        }
    }

    let z = cfg.effective_invert(shaft.invert_elevation);
    let placement = shaft.position.with_z(z);
    if !placement.is_finite() {
        return Err(SolidError::NonFinite {
            id: shaft.id.clone(),
        });
    }

    let radius = width / 2.0;
    let wall = cfg.default_wall_thickness;
    if wall <= 0.0 || width <= 2.0 * wall {
        return Ok(ShaftSolid {
            placement,
            outer_radius: radius,
            inner_radius: None,
            depth,
            body: Solid::vertical_cylinder(radius, depth, 0.0),
        });
    }

    let inner = radius - wall;
    let mut body = Solid::vertical_cylinder(radius, depth, 0.0)
        .minus(Solid::vertical_cylinder(inner, depth, 0.0));
    for opening in openings {
        body = body.minus(Solid::Extrusion {
            radius: opening.radius,
            depth: radius,
            position: Vec3::new(0.0, 0.0, opening.height),
            axis: Vec3::new(opening.direction.x, opening.direction.y, 0.0),
        });
    }

    let bottom = cfg.default_bottom_thickness;
    if bottom > 0.0 {
        body = body.plus(Solid::vertical_cylinder(inner, bottom, -bottom));
    }

    Ok(ShaftSolid {
        placement,
        outer_radius: radius,
        inner_radius: Some(inner),
        depth,
        body,
    })
}

/// Holes for every run that starts or ends at the shaft center in plan.
pub fn shaft_openings(
    shaft: &StandardShaft,
    runs: &[PipeRun],
    cfg: &ConversionConfig,
) -> Vec<PipeOpening> {
    let center = shaft.position;
    let floor = cfg.effective_invert(shaft.invert_elevation);
    let mut openings = Vec::new();

    for run in runs {
        if !valid_diameter(run.internal_diameter) {
            continue;
        }
        let outer = pipe_outer_radius(run, cfg);
        let (endpoint, toward) = if approx_same_position(run.start.position, center) {
            let next = run
                .path
                .iter()
                .map(|p| p.position)
                .find(|p| !approx_same_position(*p, center))
                .unwrap_or(run.end.position);
            (&run.start, next)
        } else if approx_same_position(run.end.position, center) {
            let previous = run
                .path
                .iter()
                .rev()
                .map(|p| p.position)
                .find(|p| !approx_same_position(*p, center))
                .unwrap_or(run.start.position);
            (&run.end, previous)
        } else {
            continue;
        };

        let Some(direction) = planar_direction(center, toward) else {
            continue;
        };
        let centerline = cfg.effective_invert(Some(endpoint.elevation)) + outer;
        openings.push(PipeOpening {
            direction,
            radius: outer,
            height: centerline - floor,
        });
    }
    openings
}

fn valid_diameter(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

pub fn build_pipe_solid(run: &PipeRun, cfg: &ConversionConfig) -> Result<PipeSolid, SolidError> {
    if !valid_diameter(run.internal_diameter) {
        return Err(SolidError::DegeneratePipe {
            id: run.id.clone(),
            value: run.internal_diameter,
        });
    }
    let outer = pipe_outer_radius(run, cfg);
    let inner = if cfg.default_pipe_wall_thickness > 0.0 {
        run.internal_diameter / 2.0
    } else {
        0.0
    };

    let start = run.start.position;
    let end = run.end.position;
    // Centerline sits one outer radius above the invert.
    let start_z = cfg.effective_invert(Some(run.start.elevation)) + outer;
    let end_z = cfg.effective_invert(Some(run.end.elevation)) + outer;

    let relative = |at: Vec2, z: f64| Point3::new(at.x - start.x, at.y - start.y, z - start_z);

    let mut directrix = Vec::with_capacity(run.path.len() + 2);
    let starts_at_start = run
        .path
        .first()
        .is_some_and(|p| approx_same_position(p.position, start));
    if !starts_at_start {
        directrix.push(relative(start, start_z));
    }
    for point in &run.path {
        let z = match point.elevation {
            Some(explicit) if explicit != 0.0 => explicit,
            _ => interpolate_elevation(
                start,
                end,
                start_z,
                end_z,
                point.position,
                cfg.clamp_interpolated_elevation,
            ),
        };
        directrix.push(relative(point.position, z));
    }
    let ends_at_end = run
        .path
        .last()
        .is_some_and(|p| approx_same_position(p.position, end));
    if !ends_at_end {
        directrix.push(relative(end, end_z));
    }

    directrix.dedup_by(|a, b| (*a - *b).norm() < POINT_EPS);

    if directrix.iter().any(|p| !p.coords.iter().all(|c| c.is_finite())) {
        return Err(SolidError::NonFinite { id: run.id.clone() });
    }
    let length: f64 = directrix.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    if directrix.len() < 2 || length < POINT_EPS {
        return Err(SolidError::DegenerateDirectrix { id: run.id.clone() });
    }

    Ok(PipeSolid {
        placement: start.with_z(start_z),
        outer_radius: outer,
        inner_radius: inner,
        solid: Solid::SweptDisk {
            directrix,
            radius: outer,
            inner_radius: inner,
        },
    })
}
