use roxmltree::{Document, Node};
use xtf2ifc_core::model::{Dialect, EntityKind};

/// One known schema dialect: the topic element that wraps its baskets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectEntry {
    pub dialect: Dialect,
    pub topic: &'static str,
}

/// Known dialects, most specific first. Adding a dialect is a table change.
pub const DIALECTS: [DialectEntry; 3] = [
    DialectEntry {
        dialect: Dialect::Dss2020Lv95,
        topic: "DSS_2020_LV95.Siedlungsentwaesserung",
    },
    DialectEntry {
        dialect: Dialect::Sia405Abwasser2015Lv95,
        topic: "SIA405_ABWASSER_2015_LV95.SIA405_Abwasser",
    },
    DialectEntry {
        dialect: Dialect::Dss2015Lv95,
        topic: "DSS_2015_LV95.Siedlungsentwaesserung",
    },
];

pub fn class_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::NodePoint => "Haltungspunkt",
        EntityKind::SewerNode => "Abwasserknoten",
        EntityKind::StandardShaft => "Normschacht",
        EntityKind::Channel => "Kanal",
        EntityKind::PipeRun => "Haltung",
    }
}

/// Qualified element name of `kind` in `dialect`; the bare class name for
/// [`Dialect::Generic`].
pub fn element_name(dialect: Dialect, kind: EntityKind) -> String {
    match DIALECTS.iter().find(|e| e.dialect == dialect) {
        Some(entry) => format!("{}.{}", entry.topic, class_name(kind)),
        None => class_name(kind).to_string(),
    }
}

/// Whether the tag `name` is a `kind` element of `dialect`. Generic names
/// match the bare class or any qualified name ending in `.{class}`.
pub fn is_element_of(dialect: Dialect, kind: EntityKind, name: &str) -> bool {
    if dialect != Dialect::Generic {
        return name == element_name(dialect, kind);
    }
    let class = class_name(kind);
    name == class
        || name
            .strip_suffix(class)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// First dialect whose topic element occurs in the document.
pub fn identify_dialect(doc: &Document<'_>) -> Dialect {
    let names: Vec<&str> = doc
        .descendants()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name())
        .collect();
    identify_from_names(&names)
}

pub fn identify_from_names(names: &[&str]) -> Dialect {
    DIALECTS
        .iter()
        .find(|entry| names.iter().any(|n| *n == entry.topic))
        .map(|entry| entry.dialect)
        .unwrap_or(Dialect::Generic)
}

/// Elements of one kind and the dialect that produced them.
#[derive(Debug, Clone)]
pub struct Resolved<'a, 'input> {
    pub dialect: Dialect,
    pub elements: Vec<Node<'a, 'input>>,
}

/// Probes the dialect table in order for `kind` and returns the first
/// non-empty match, falling back to the generic class name.
pub fn resolve_kind<'a, 'input>(
    elements: &[Node<'a, 'input>],
    kind: EntityKind,
) -> Resolved<'a, 'input> {
    let candidates = DIALECTS
        .iter()
        .map(|e| e.dialect)
        .chain(std::iter::once(Dialect::Generic));

    for dialect in candidates {
        let found: Vec<_> = elements
            .iter()
            .copied()
            .filter(|n| is_element_of(dialect, kind, n.tag_name().name()))
            .collect();
        if !found.is_empty() {
            return Resolved {
                dialect,
                elements: found,
            };
        }
    }

    Resolved {
        dialect: Dialect::Generic,
        elements: Vec::new(),
    }
}
