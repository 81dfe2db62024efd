use xtf2ifc_core::config::ConversionConfig;
use xtf2ifc_core::geom::Vec2;
use xtf2ifc_core::model::{
    Dialect, Dimension, LocationSource, NodePoint, SewerNode, StandardShaft, SurveyModel,
};
use xtf2ifc_core::normalize::{global_origin, normalize};
use xtf2ifc_core::ConvertError;

fn node_point(id: &str, x: f64, y: f64, z: f64) -> NodePoint {
    NodePoint {
        id: id.to_string(),
        position: Vec2::new(x, y),
        elevation: z,
        network_element: None,
    }
}

fn sewer_node(id: &str, x: f64, y: f64, kote: Option<f64>) -> SewerNode {
    SewerNode {
        id: id.to_string(),
        position: Vec2::new(x, y),
        invert_elevation: kote,
        diameter: Dimension::fallback(800.0),
        height: Dimension::fallback(800.0),
        structure_ref: None,
        designation: String::new(),
        location_name: String::new(),
        last_change: String::new(),
    }
}

fn shaft(id: &str, node: Option<&str>, x: f64, y: f64) -> StandardShaft {
    StandardShaft {
        id: id.to_string(),
        sewer_node: node.map(str::to_string),
        position: Vec2::new(x, y),
        invert_elevation: None,
        location_source: LocationSource::OwnCoordinate,
        diameter: Dimension::fallback(800.0),
        height: Dimension::fallback(800.0),
        designation: String::new(),
        location_name: String::new(),
        function: String::new(),
        material: String::new(),
    }
}

#[test]
fn origin_is_floored_minimum_of_all_positions() {
    let cfg = ConversionConfig::default();
    let mut survey = SurveyModel::empty(Dialect::Generic);
    survey.node_points = vec![
        node_point("P1", 2_600_123.4, 1_200_456.7, 412.3),
        node_point("P2", 2_600_140.0, 1_200_401.2, 418.0),
    ];
    survey.sewer_nodes = vec![sewer_node("K1", 2_600_131.0, 1_200_470.0, Some(409.9))];
    survey.shafts = vec![shaft("S1", None, 2_600_119.5, 1_200_480.0)];

    let origin = global_origin(&survey, &cfg).expect("origin");
    assert_eq!(2_600_110.0, origin.x);
    assert_eq!(1_200_400.0, origin.y);
    // The shaft has no invert of its own and contributes the default (100).
    assert_eq!(100.0, origin.z);

    for p in &survey.node_points {
        assert!(origin.x <= p.position.x && origin.y <= p.position.y && origin.z <= p.elevation);
    }
    for v in [origin.x, origin.y, origin.z] {
        assert_eq!(0.0, v % 10.0);
    }
}

#[test]
fn empty_survey_has_degenerate_origin() {
    let survey = SurveyModel::empty(Dialect::Generic);
    let err = normalize(survey, &ConversionConfig::default()).unwrap_err();
    assert!(matches!(err, ConvertError::DegenerateOrigin { .. }));
}

#[test]
fn non_finite_positions_are_ignored() {
    let mut survey = SurveyModel::empty(Dialect::Generic);
    survey.node_points = vec![
        node_point("P1", f64::INFINITY, 15.0, 33.0),
        node_point("P2", 21.0, f64::NAN, 44.0),
    ];
    let origin = global_origin(&survey, &ConversionConfig::default()).expect("origin");
    assert_eq!((20.0, 10.0, 30.0), (origin.x, origin.y, origin.z));
}

#[test]
fn duplicates_and_dangling_links_are_reported() {
    let mut survey = SurveyModel::empty(Dialect::Generic);
    survey.node_points = vec![
        node_point("P1", 10.0, 10.0, 5.0),
        node_point("P1", 90.0, 90.0, 5.0),
    ];
    survey.shafts = vec![
        shaft("S1", Some("missing"), 10.0, 10.0),
        shaft("S2", Some("K1"), 12.0, 10.0),
        shaft("S3", Some("K1"), 14.0, 10.0),
    ];
    survey.sewer_nodes = vec![sewer_node("K1", 12.0, 10.0, Some(5.0))];

    let normalized = normalize(survey, &ConversionConfig::default()).expect("normalize");
    assert_eq!(1, normalized.stats.removed_duplicates);
    assert_eq!(1, normalized.stats.dangling_shaft_links);
    assert_eq!(1, normalized.stats.shared_sewer_nodes);
    assert_eq!(1, normalized.survey.node_points.len());
    assert_eq!(10.0, normalized.survey.node_points[0].position.x);

    let codes: Vec<_> = normalized
        .survey
        .warnings
        .iter()
        .map(|w| w.code.as_str())
        .collect();
    assert!(codes.contains(&"duplicate_id"));
    assert!(codes.contains(&"dangling_shaft_link"));
    assert!(codes.contains(&"shared_sewer_node"));
}
