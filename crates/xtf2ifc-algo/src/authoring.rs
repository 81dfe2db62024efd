use nalgebra::Point3;
use xtf2ifc_core::geom::Vec3;
use xtf2ifc_core::normalize::GlobalOrigin;
use xtf2ifc_core::Result;

/// Opaque reference to something an authoring backend created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    PipeSegment,
    DistributionChamber,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Length(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: &'static str,
    pub value: PropertyValue,
}

impl Property {
    pub fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: PropertyValue::Text(value.into()),
        }
    }

    pub fn length(name: &'static str, value: f64) -> Self {
        Self {
            name,
            value: PropertyValue::Length(value),
        }
    }
}

/// The model-authoring capability the assembler drives.
///
/// Every operation either succeeds or returns
/// [`ConvertError::AuthoringFailure`](xtf2ifc_core::ConvertError::AuthoringFailure);
/// the assembler aborts the document on the first failure.
pub trait ModelAuthoring {
    fn create_project(&mut self, name: &str, origin: &GlobalOrigin) -> Result<Handle>;

    fn create_site(&mut self, name: &str, placement: Handle, origin: &GlobalOrigin) -> Result<Handle>;

    fn aggregate(&mut self, whole: Handle, parts: &[Handle]) -> Result<()>;

    /// Local placement at `location`, relative to another placement or to
    /// the world when `relative_to` is `None`. `axis` tilts the local z axis.
    fn create_placement(
        &mut self,
        relative_to: Option<Handle>,
        location: Vec3,
        axis: Option<Vec3>,
    ) -> Result<Handle>;

    fn create_extrusion(&mut self, radius: f64, depth: f64, position: Vec3, axis: Vec3) -> Result<Handle>;

    fn create_difference(&mut self, first: Handle, second: Handle) -> Result<Handle>;

    fn create_union(&mut self, first: Handle, second: Handle) -> Result<Handle>;

    fn create_swept_disk(
        &mut self,
        directrix: &[Point3<f64>],
        radius: f64,
        inner_radius: f64,
    ) -> Result<Handle>;

    /// Items must be all boolean results or all primitives.
    fn create_element(
        &mut self,
        kind: ElementKind,
        name: &str,
        placement: Handle,
        items: &[Handle],
    ) -> Result<Handle>;

    /// Surface color on one representation item.
    fn apply_color(&mut self, item: Handle, rgb: [f64; 3]) -> Result<()>;

    fn attach_properties(&mut self, element: Handle, set_name: &str, properties: &[Property]) -> Result<()>;

    fn create_group(&mut self, name: &str) -> Result<Handle>;

    fn assign_to_group(&mut self, group: Handle, members: &[Handle]) -> Result<()>;

    fn contain_in_spatial_structure(&mut self, structure: Handle, elements: &[Handle]) -> Result<()>;

    fn serialize(&self) -> Result<String>;
}
