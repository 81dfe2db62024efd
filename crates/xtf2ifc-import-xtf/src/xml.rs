use log::warn;
use roxmltree::Node;
use xtf2ifc_core::geom::Vec2;
use xtf2ifc_core::report::Warning;
use xtf2ifc_core::ConvertError;

pub fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

pub fn child<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// First descendant named `path[0]`, then direct children for the rest.
pub fn find_path<'a, 'input>(node: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    let (first, rest) = path.split_first()?;
    let mut current = descendant(node, first)?;
    for name in rest {
        current = child(current, name)?;
    }
    Some(current)
}

/// Trimmed text of the first descendant named `name`, or empty.
pub fn text(node: Node<'_, '_>, name: &str) -> String {
    descendant(node, name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

pub fn optional_text(node: Node<'_, '_>, name: &str) -> Option<String> {
    let value = text(node, name);
    (!value.is_empty()).then_some(value)
}

/// `REF` attribute of the first descendant named `name`.
pub fn reference(node: Node<'_, '_>, name: &str) -> Option<String> {
    descendant(node, name)
        .and_then(|n| n.attribute("REF"))
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

pub fn tid(node: Node<'_, '_>) -> Option<String> {
    node.attribute("TID").map(str::to_string)
}

/// Empty input is `Ok(None)`; anything that is not a finite number is an
/// `InvalidNumericValue`.
pub fn parse_number(raw: &str, field: &str, id: &str) -> Result<Option<f64>, ConvertError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(ConvertError::InvalidNumericValue {
            field: field.to_string(),
            id: id.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Collects the non-fatal findings of one parse.
#[derive(Debug, Default)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn push(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn record(&mut self, err: &ConvertError) {
        warn!("{err}");
        self.warnings.push(Warning::from(err));
    }

    /// Numeric value of the first descendant named `field`. Invalid values
    /// are recorded and read as absent.
    pub fn number(&mut self, node: Node<'_, '_>, field: &str, id: &str) -> Option<f64> {
        self.number_text(&text(node, field), field, id)
    }

    pub fn number_text(&mut self, raw: &str, field: &str, id: &str) -> Option<f64> {
        match parse_number(raw, field, id) {
            Ok(v) => v,
            Err(err) => {
                self.record(&err);
                None
            }
        }
    }

    /// Planar position from a `COORD` element; both `C1` and `C2` must be
    /// numeric.
    pub fn coord(&mut self, coord: Node<'_, '_>, id: &str) -> Option<Vec2> {
        let c1 = self.component(coord, "C1", id)?;
        let c2 = self.component(coord, "C2", id)?;
        Some(Vec2::new(c1, c2))
    }

    pub fn component(&mut self, coord: Node<'_, '_>, name: &str, id: &str) -> Option<f64> {
        let raw = child(coord, name).and_then(|n| n.text()).unwrap_or("");
        self.number_text(raw, name, id)
    }

    /// Position from `Lage/COORD` below `node`.
    pub fn location(&mut self, node: Node<'_, '_>, id: &str) -> Option<Vec2> {
        let coord = find_path(node, &["Lage", "COORD"])?;
        self.coord(coord, id)
    }
}
