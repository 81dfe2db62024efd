//! In-memory IFC4X3_ADD2 writer producing ISO-10303-21 text.

use crate::authoring::{ElementKind, Handle, ModelAuthoring, Property, PropertyValue};
use crate::guid::new_ifc_guid;
use chrono::{DateTime, Local};
use itertools::Itertools;
use log::debug;
use nalgebra::Point3;
use std::fmt::Write as _;
use xtf2ifc_core::geom::Vec3;
use xtf2ifc_core::normalize::GlobalOrigin;
use xtf2ifc_core::{ConvertError, Result};

pub const SCHEMA: &str = "IFC4X3_ADD2";

const SOLIDS: &[&str] = &["IFCEXTRUDEDAREASOLID", "IFCBOOLEANRESULT", "IFCSWEPTDISKSOLID"];
const ELEMENTS: &[&str] = &["IFCPIPESEGMENT", "IFCDISTRIBUTIONCHAMBERELEMENT"];

pub struct IfcWriter {
    name: String,
    created: DateTime<Local>,
    next_id: u32,
    lines: Vec<String>,
    /// Entity type per id, index `id - 1`.
    types: Vec<&'static str>,
    body_context: Option<u32>,
    up: Option<u32>,
}

fn failure(message: impl Into<String>) -> ConvertError {
    ConvertError::AuthoringFailure(message.into())
}

impl IfcWriter {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            created: Local::now(),
            next_id: 1,
            lines: Vec::new(),
            types: Vec::new(),
            body_context: None,
            up: None,
        }
    }

    pub fn entity_count(&self) -> usize {
        self.lines.len()
    }

    fn push(&mut self, entity: &'static str, args: String) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.lines.push(format!("#{id}={entity}({args});"));
        self.types.push(entity);
        id
    }

    fn kind_of(&self, handle: Handle) -> Option<&'static str> {
        let index = handle.0.checked_sub(1)? as usize;
        self.types.get(index).copied()
    }

    fn checked(&self, handle: Handle, allowed: &[&str], role: &str) -> Result<u32> {
        match self.kind_of(handle) {
            Some(kind) if allowed.contains(&kind) => Ok(handle.0),
            Some(kind) => Err(failure(format!(
                "{role} #{} is {kind}, expected one of {}",
                handle.0,
                allowed.join(", ")
            ))),
            None => Err(failure(format!("{role} #{} does not exist", handle.0))),
        }
    }

    fn point(&mut self, x: f64, y: f64, z: f64) -> u32 {
        self.push(
            "IFCCARTESIANPOINT",
            format!("({},{},{})", f64_step(x), f64_step(y), f64_step(z)),
        )
    }

    fn direction(&mut self, v: Vec3) -> u32 {
        self.push(
            "IFCDIRECTION",
            format!("({},{},{})", f64_step(v.x), f64_step(v.y), f64_step(v.z)),
        )
    }

    fn up_direction(&mut self) -> u32 {
        match self.up {
            Some(id) => id,
            None => {
                let id = self.direction(Vec3::unit_z());
                self.up = Some(id);
                id
            }
        }
    }

    fn boolean(&mut self, operator: &str, first: Handle, second: Handle) -> Result<Handle> {
        let first = self.checked(first, SOLIDS, "first operand")?;
        let second = self.checked(second, SOLIDS, "second operand")?;
        let id = self.push(
            "IFCBOOLEANRESULT",
            format!(".{operator}.,#{first},#{second}"),
        );
        Ok(Handle(id))
    }

    fn axis_placement(&mut self, location: Vec3, axis: Option<Vec3>) -> u32 {
        let origin = self.point(location.x, location.y, location.z);
        match axis {
            None => self.push("IFCAXIS2PLACEMENT3D", format!("#{origin},$,$")),
            Some(axis) => {
                let reference = if axis.z.abs() < 0.9 {
                    Vec3::unit_z()
                } else {
                    Vec3::new(1.0, 0.0, 0.0)
                };
                let axis = self.direction(axis);
                let reference = self.direction(reference);
                self.push(
                    "IFCAXIS2PLACEMENT3D",
                    format!("#{origin},#{axis},#{reference}"),
                )
            }
        }
    }
}

/// GlobalId, owner history, name and description of a relationship.
fn rel_header() -> String {
    format!("'{}',$,$,$", new_ifc_guid())
}

fn finite(values: &[f64], what: &str) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(failure(format!("{what} has non-finite values {values:?}")))
    }
}

fn positive(value: f64, what: &str) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(failure(format!("{what} must be positive, got {value}")))
    }
}

fn unit(v: Vec3, what: &str) -> Result<Vec3> {
    finite(&[v.x, v.y, v.z], what)?;
    let len = (v.x * v.x + v.y * v.y + v.z * v.z).sqrt();
    if len < 1e-12 {
        return Err(failure(format!("{what} has zero length")));
    }
    Ok(Vec3::new(v.x / len, v.y / len, v.z / len))
}

fn refs(ids: impl IntoIterator<Item = u32>) -> String {
    ids.into_iter().map(|id| format!("#{id}")).join(",")
}

impl ModelAuthoring for IfcWriter {
    fn create_project(&mut self, name: &str, origin: &GlobalOrigin) -> Result<Handle> {
        if self.body_context.is_some() {
            return Err(failure("project already created"));
        }
        finite(&[origin.x, origin.y, origin.z], "global origin")?;

        let wcs = self.axis_placement(Vec3::new(0.0, 0.0, 0.0), None);
        let context = self.push(
            "IFCGEOMETRICREPRESENTATIONCONTEXT",
            format!("$,'Model',3,1.E-05,#{wcs},$"),
        );
        let body = self.push(
            "IFCGEOMETRICREPRESENTATIONSUBCONTEXT",
            format!("'Body','Model',*,*,*,*,#{context},$,.MODEL_VIEW.,$"),
        );
        self.body_context = Some(body);

        let metre = self.push("IFCSIUNIT", "*,.LENGTHUNIT.,$,.METRE.".to_string());
        let area = self.push("IFCSIUNIT", "*,.AREAUNIT.,$,.SQUARE_METRE.".to_string());
        let volume = self.push("IFCSIUNIT", "*,.VOLUMEUNIT.,$,.CUBIC_METRE.".to_string());
        let angle = self.push("IFCSIUNIT", "*,.PLANEANGLEUNIT.,$,.RADIAN.".to_string());
        let units = self.push(
            "IFCUNITASSIGNMENT",
            format!("({})", refs([metre, area, volume, angle])),
        );

        let project = self.push(
            "IFCPROJECT",
            format!(
                "'{}',$,'{}',$,$,$,$,(#{context}),#{units}",
                new_ifc_guid(),
                escape_step_string(name)
            ),
        );

        let crs = self.push(
            "IFCPROJECTEDCRS",
            format!(
                "'EPSG:2056','CH1903+ / LV95','CH1903+','LN02','Swiss Oblique Mercator','CH1903+ / LV95',#{metre}"
            ),
        );
        self.push(
            "IFCMAPCONVERSION",
            format!(
                "#{context},#{crs},{},{},{},1.,0.,1.,$,$",
                f64_step(origin.x),
                f64_step(origin.y),
                f64_step(origin.z)
            ),
        );
        Ok(Handle(project))
    }

    fn create_site(&mut self, name: &str, placement: Handle, origin: &GlobalOrigin) -> Result<Handle> {
        let placement = self.checked(placement, &["IFCLOCALPLACEMENT"], "site placement")?;
        finite(&[origin.z], "site elevation")?;
        let site = self.push(
            "IFCSITE",
            format!(
                "'{}',$,'{}',$,$,#{placement},$,$,.ELEMENT.,$,$,{},$,$",
                new_ifc_guid(),
                escape_step_string(name),
                f64_step(origin.z)
            ),
        );
        Ok(Handle(site))
    }

    fn aggregate(&mut self, whole: Handle, parts: &[Handle]) -> Result<()> {
        let whole = self.checked(whole, &["IFCPROJECT", "IFCSITE"], "aggregate whole")?;
        let mut ids = Vec::with_capacity(parts.len());
        for part in parts {
            ids.push(self.checked(*part, &["IFCSITE"], "aggregate part")?);
        }
        if ids.is_empty() {
            return Err(failure("aggregate without parts"));
        }
        let header = rel_header();
        self.push(
            "IFCRELAGGREGATES",
            format!("{header},#{whole},({})", refs(ids)),
        );
        Ok(())
    }

    fn create_placement(
        &mut self,
        relative_to: Option<Handle>,
        location: Vec3,
        axis: Option<Vec3>,
    ) -> Result<Handle> {
        finite(&[location.x, location.y, location.z], "placement")?;
        let axis = match axis {
            Some(a) => Some(unit(a, "placement axis")?),
            None => None,
        };
        let parent = match relative_to {
            Some(h) => format!("#{}", self.checked(h, &["IFCLOCALPLACEMENT"], "parent placement")?),
            None => "$".to_string(),
        };
        let axis = self.axis_placement(location, axis);
        let id = self.push("IFCLOCALPLACEMENT", format!("{parent},#{axis}"));
        Ok(Handle(id))
    }

    fn create_extrusion(&mut self, radius: f64, depth: f64, position: Vec3, axis: Vec3) -> Result<Handle> {
        positive(radius, "extrusion radius")?;
        positive(depth, "extrusion depth")?;
        finite(&[position.x, position.y, position.z], "extrusion position")?;
        let axis = unit(axis, "extrusion axis")?;
        let tilted = (axis.z - 1.0).abs() > 1e-12;

        let profile = self.push(
            "IFCCIRCLEPROFILEDEF",
            format!(".AREA.,$,$,{}", f64_step(radius)),
        );
        let placement = self.axis_placement(position, tilted.then_some(axis));
        let up = self.up_direction();
        let id = self.push(
            "IFCEXTRUDEDAREASOLID",
            format!("#{profile},#{placement},#{up},{}", f64_step(depth)),
        );
        Ok(Handle(id))
    }

    fn create_difference(&mut self, first: Handle, second: Handle) -> Result<Handle> {
        self.boolean("DIFFERENCE", first, second)
    }

    fn create_union(&mut self, first: Handle, second: Handle) -> Result<Handle> {
        self.boolean("UNION", first, second)
    }

    fn create_swept_disk(
        &mut self,
        directrix: &[Point3<f64>],
        radius: f64,
        inner_radius: f64,
    ) -> Result<Handle> {
        positive(radius, "swept disk radius")?;
        if !inner_radius.is_finite() || inner_radius < 0.0 || inner_radius >= radius {
            return Err(failure(format!(
                "inner radius {inner_radius} must lie in [0, {radius})"
            )));
        }
        for p in directrix {
            finite(&[p.x, p.y, p.z], "directrix point")?;
        }
        let distinct = directrix
            .iter()
            .tuple_windows()
            .any(|(a, b)| (b - a).norm() > 1e-9);
        if directrix.len() < 2 || !distinct {
            return Err(failure("directrix needs two distinct points"));
        }

        let points: Vec<u32> = directrix
            .iter()
            .map(|p| self.point(p.x, p.y, p.z))
            .collect();
        let polyline = self.push("IFCPOLYLINE", format!("({})", refs(points)));
        let inner = if inner_radius > 0.0 {
            f64_step(inner_radius)
        } else {
            "$".to_string()
        };
        let id = self.push(
            "IFCSWEPTDISKSOLID",
            format!("#{polyline},{},{inner},$,$", f64_step(radius)),
        );
        Ok(Handle(id))
    }

    fn create_element(
        &mut self,
        kind: ElementKind,
        name: &str,
        placement: Handle,
        items: &[Handle],
    ) -> Result<Handle> {
        let context = self
            .body_context
            .ok_or_else(|| failure("element created before the project"))?;
        let placement = self.checked(placement, &["IFCLOCALPLACEMENT"], "element placement")?;
        if items.is_empty() {
            return Err(failure(format!("element '{name}' has no representation items")));
        }
        let mut item_ids = Vec::with_capacity(items.len());
        let mut booleans = 0;
        for item in items {
            let id = self.checked(*item, SOLIDS, "representation item")?;
            if self.kind_of(*item) == Some("IFCBOOLEANRESULT") {
                booleans += 1;
            }
            item_ids.push(id);
        }

        // 'CSG' admits boolean results only, 'SweptSolid' no boolean at all.
        let rep_type = match booleans {
            0 => "SweptSolid",
            n if n == items.len() => "CSG",
            _ => {
                return Err(failure(format!(
                    "element '{name}' mixes boolean results and primitives"
                )))
            }
        };
        let representation = self.push(
            "IFCSHAPEREPRESENTATION",
            format!("#{context},'Body','{rep_type}',({})", refs(item_ids)),
        );
        let shape = self.push(
            "IFCPRODUCTDEFINITIONSHAPE",
            format!("$,$,(#{representation})"),
        );
        let (entity, predefined) = match kind {
            ElementKind::PipeSegment => ("IFCPIPESEGMENT", ".RIGIDSEGMENT."),
            ElementKind::DistributionChamber => ("IFCDISTRIBUTIONCHAMBERELEMENT", ".MANHOLE."),
        };
        let id = self.push(
            entity,
            format!(
                "'{}',$,'{}',$,$,#{placement},#{shape},$,{predefined}",
                new_ifc_guid(),
                escape_step_string(name)
            ),
        );
        debug!("{entity} #{id} '{name}'");
        Ok(Handle(id))
    }

    fn apply_color(&mut self, item: Handle, rgb: [f64; 3]) -> Result<()> {
        let item = self.checked(item, SOLIDS, "styled item")?;
        if rgb.iter().any(|c| !c.is_finite() || !(0.0..=1.0).contains(c)) {
            return Err(failure(format!("color {rgb:?} outside [0, 1]")));
        }
        let colour = self.push(
            "IFCCOLOURRGB",
            format!("$,{},{},{}", f64_step(rgb[0]), f64_step(rgb[1]), f64_step(rgb[2])),
        );
        let rendering = self.push(
            "IFCSURFACESTYLERENDERING",
            format!("#{colour},$,$,$,$,$,$,$,.NOTDEFINED."),
        );
        let style = self.push(
            "IFCSURFACESTYLE",
            format!("$,.BOTH.,(#{rendering})"),
        );
        self.push("IFCSTYLEDITEM", format!("#{item},(#{style}),$"));
        Ok(())
    }

    fn attach_properties(&mut self, element: Handle, set_name: &str, properties: &[Property]) -> Result<()> {
        let element = self.checked(element, ELEMENTS, "property owner")?;
        if properties.is_empty() {
            return Ok(());
        }
        let mut ids = Vec::with_capacity(properties.len());
        for property in properties {
            let value = match &property.value {
                PropertyValue::Text(s) => format!("IFCTEXT('{}')", escape_step_string(s)),
                PropertyValue::Length(v) => {
                    finite(&[*v], property.name)?;
                    format!("IFCLENGTHMEASURE({})", f64_step(*v))
                }
            };
            ids.push(self.push(
                "IFCPROPERTYSINGLEVALUE",
                format!("'{}',$,{value},$", escape_step_string(property.name)),
            ));
        }
        let set = self.push(
            "IFCPROPERTYSET",
            format!(
                "'{}',$,'{}',$,({})",
                new_ifc_guid(),
                escape_step_string(set_name),
                refs(ids)
            ),
        );
        let header = rel_header();
        self.push(
            "IFCRELDEFINESBYPROPERTIES",
            format!("{header},(#{element}),#{set}"),
        );
        Ok(())
    }

    fn create_group(&mut self, name: &str) -> Result<Handle> {
        let id = self.push(
            "IFCGROUP",
            format!("'{}',$,'{}',$,$", new_ifc_guid(), escape_step_string(name)),
        );
        Ok(Handle(id))
    }

    fn assign_to_group(&mut self, group: Handle, members: &[Handle]) -> Result<()> {
        let group = self.checked(group, &["IFCGROUP"], "group")?;
        if members.is_empty() {
            return Ok(());
        }
        let mut ids = Vec::with_capacity(members.len());
        for member in members {
            ids.push(self.checked(*member, ELEMENTS, "group member")?);
        }
        let header = rel_header();
        self.push(
            "IFCRELASSIGNSTOGROUP",
            format!("{header},({}),$,#{group}", refs(ids)),
        );
        Ok(())
    }

    fn contain_in_spatial_structure(&mut self, structure: Handle, elements: &[Handle]) -> Result<()> {
        let structure = self.checked(structure, &["IFCSITE"], "spatial structure")?;
        if elements.is_empty() {
            return Ok(());
        }
        let mut ids = Vec::with_capacity(elements.len());
        for element in elements {
            ids.push(self.checked(*element, ELEMENTS, "contained element")?);
        }
        let header = rel_header();
        self.push(
            "IFCRELCONTAINEDINSPATIALSTRUCTURE",
            format!("{header},({}),#{structure}", refs(ids)),
        );
        Ok(())
    }

    fn serialize(&self) -> Result<String> {
        let name = if self.name.is_empty() {
            "xtf2ifc"
        } else {
            self.name.as_str()
        };
        let timestamp = self.created.format("%Y-%m-%dT%H:%M:%S");
        let version = env!("CARGO_PKG_VERSION");

        let mut out = String::new();
        let io = |_| failure("formatting IFC output");
        writeln!(out, "ISO-10303-21;").map_err(io)?;
        writeln!(out, "HEADER;").map_err(io)?;
        writeln!(out, "FILE_DESCRIPTION(('ViewDefinition [ReferenceView]'),'2;1');").map_err(io)?;
        writeln!(
            out,
            "FILE_NAME('{}','{timestamp}',(''),(''),'xtf2ifc {version}','xtf2ifc','');",
            escape_step_string(&format!("{name}.ifc"))
        )
        .map_err(io)?;
        writeln!(out, "FILE_SCHEMA(('{SCHEMA}'));").map_err(io)?;
        writeln!(out, "ENDSEC;").map_err(io)?;
        writeln!(out, "DATA;").map_err(io)?;
        for line in &self.lines {
            writeln!(out, "{line}").map_err(io)?;
        }
        writeln!(out, "ENDSEC;").map_err(io)?;
        writeln!(out, "END-ISO-10303-21;").map_err(io)?;
        Ok(out)
    }
}

/// STEP string literal body: quotes and backslashes doubled, non-ASCII as
/// `\X2\` hex runs of UTF-16 code units.
pub fn escape_step_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut wide = String::new();
    let flush = |out: &mut String, wide: &mut String| {
        if !wide.is_empty() {
            out.push_str("\\X2\\");
            out.push_str(wide);
            out.push_str("\\X0\\");
            wide.clear();
        }
    };
    for c in s.chars() {
        if c.is_ascii() {
            flush(&mut out, &mut wide);
            match c {
                '\'' => out.push_str("''"),
                '\\' => out.push_str("\\\\"),
                c if c.is_ascii_control() => out.push(' '),
                c => out.push(c),
            }
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                let _ = write!(wide, "{unit:04X}");
            }
        }
    }
    flush(&mut out, &mut wide);
    out
}

pub fn f64_step(v: f64) -> String {
    if !v.is_finite() {
        return "0.".to_string();
    }
    let mut s = format!("{v:.6}");
    if s == "-0.000000" {
        s = "0.000000".to_string();
    }
    s
}
