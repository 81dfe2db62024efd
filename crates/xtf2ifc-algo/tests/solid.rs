use approx::assert_relative_eq;
use xtf2ifc_algo::solid::{build_pipe_solid, build_shaft_solid, shaft_openings, Solid, SolidError};
use xtf2ifc_core::geom::Vec2;
use xtf2ifc_core::model::{Dimension, LocationSource, NodePoint, PathPoint, PipeRun, StandardShaft};
use xtf2ifc_core::ConversionConfig;

fn cfg() -> ConversionConfig {
    ConversionConfig {
        default_pipe_wall_thickness: 0.03,
        ..ConversionConfig::default()
    }
}

fn point(id: &str, x: f64, y: f64, z: f64) -> NodePoint {
    NodePoint {
        id: id.to_string(),
        position: Vec2::new(x, y),
        elevation: z,
        network_element: None,
    }
}

fn run(path: Vec<PathPoint>, start: NodePoint, end: NodePoint) -> PipeRun {
    PipeRun {
        id: "H1".to_string(),
        designation: String::new(),
        material: String::new(),
        internal_diameter: 0.5,
        diameter_surveyed: true,
        effective_length: None,
        path,
        start,
        end,
    }
}

fn shaft(diameter_mm: f64, height_mm: f64, invert: Option<f64>) -> StandardShaft {
    StandardShaft {
        id: "S1".to_string(),
        sewer_node: Some("K1".to_string()),
        position: Vec2::new(100.0, 200.0),
        invert_elevation: invert,
        location_source: LocationSource::SewerNode,
        diameter: Dimension::surveyed(diameter_mm),
        height: Dimension::surveyed(height_mm),
        designation: String::new(),
        location_name: String::new(),
        function: String::new(),
        material: String::new(),
    }
}

#[test]
fn hollow_shaft_with_bottom_slab() {
    let solid = build_shaft_solid(&shaft(800.0, 800.0, Some(50.0)), &[], &cfg()).expect("shaft");

    assert_relative_eq!(100.0, solid.placement.x);
    assert_relative_eq!(200.0, solid.placement.y);
    assert_relative_eq!(50.0, solid.placement.z);
    assert_relative_eq!(0.4, solid.outer_radius);
    assert_relative_eq!(0.36, solid.inner_radius.expect("hollow"));
    assert!(solid.body.is_boolean());

    let Solid::Union { first, second } = &solid.body else {
        panic!("expected walls joined with the slab, got {:?}", solid.body);
    };
    assert_eq!(1, first.cut_count());
    match second.as_ref() {
        Solid::Extrusion {
            radius,
            depth,
            position,
            ..
        } => {
            assert_relative_eq!(0.36, *radius);
            assert_relative_eq!(0.02, *depth);
            // Slab sits directly below the floor.
            assert_relative_eq!(-0.02, position.z);
        }
        other => panic!("unexpected bottom slab {other:?}"),
    }
}

#[test]
fn thin_shaft_is_a_single_cylinder() {
    // 80 mm wide with 40 mm walls: width == 2 * wall.
    let solid = build_shaft_solid(&shaft(80.0, 1200.0, None), &[], &cfg()).expect("shaft");
    assert!(solid.inner_radius.is_none());
    assert_eq!(Solid::vertical_cylinder(0.04, 1.2, 0.0), solid.body);
    // No invert: the default elevation is used.
    assert_relative_eq!(100.0, solid.placement.z);
}

#[test]
fn zero_sized_shaft_is_rejected() {
    let err = build_shaft_solid(&shaft(0.0, 800.0, None), &[], &cfg()).unwrap_err();
    assert!(matches!(err, SolidError::DegenerateShaft { what: "diameter", .. }));
}

#[test]
fn pipe_endpoints_are_raised_by_outer_radius() {
    let r = run(
        Vec::new(),
        point("P1", 100.0, 200.0, 48.0),
        point("P2", 120.0, 210.0, 46.0),
    );
    let pipe = build_pipe_solid(&r, &cfg()).expect("pipe");

    assert_relative_eq!(0.28, pipe.outer_radius);
    assert_relative_eq!(0.25, pipe.inner_radius);
    assert_relative_eq!(48.28, pipe.placement.z, epsilon = 1e-9);

    let directrix = pipe.directrix();
    assert_eq!(2, directrix.len());
    assert_relative_eq!(0.0, directrix[0].z);
    assert_relative_eq!(20.0, directrix[1].x);
    assert_relative_eq!(10.0, directrix[1].y);
    // 46.28 - 48.28
    assert_relative_eq!(-2.0, directrix[1].z, epsilon = 1e-9);
}

#[test]
fn intermediate_points_interpolate_or_use_explicit_elevation() {
    let r = run(
        vec![
            PathPoint {
                position: Vec2::new(5.0, 0.0),
                elevation: None,
            },
            PathPoint {
                position: Vec2::new(7.5, 0.0),
                elevation: Some(49.0),
            },
            PathPoint {
                position: Vec2::new(10.0, 0.0),
                elevation: Some(0.0),
            },
        ],
        point("P1", 0.0, 0.0, 50.0),
        point("P2", 10.0, 0.0, 48.0),
    );
    let pipe = build_pipe_solid(&r, &cfg()).expect("pipe");
    let directrix = pipe.directrix();

    // Start prepended; the last path point already sits on the end.
    assert_eq!(4, directrix.len());
    assert_relative_eq!(0.0, directrix[0].x);
    assert_relative_eq!(-1.0, directrix[1].z, epsilon = 1e-9);
    // Explicit elevation is the absolute centerline height.
    assert_relative_eq!(49.0 - 50.28, directrix[2].z, epsilon = 1e-9);
    // Zero counts as no elevation: interpolated to the end height.
    assert_relative_eq!(-2.0, directrix[3].z, epsilon = 1e-9);
}

#[test]
fn interpolation_clamping_is_configurable() {
    let path = vec![PathPoint {
        position: Vec2::new(20.0, 0.0),
        elevation: None,
    }];
    let r = run(path, point("P1", 0.0, 0.0, 50.0), point("P2", 10.0, 0.0, 48.0));

    let clamped = build_pipe_solid(&r, &cfg()).expect("pipe");
    assert_relative_eq!(-2.0, clamped.directrix()[1].z, epsilon = 1e-9);

    let unclamped_cfg = ConversionConfig {
        clamp_interpolated_elevation: false,
        ..cfg()
    };
    let unclamped = build_pipe_solid(&r, &unclamped_cfg).expect("pipe");
    assert_relative_eq!(-4.0, unclamped.directrix()[1].z, epsilon = 1e-9);
}

#[test]
fn zero_elevation_endpoint_uses_default() {
    let r = run(Vec::new(), point("P1", 0.0, 0.0, 0.0), point("P2", 10.0, 0.0, 99.0));
    let pipe = build_pipe_solid(&r, &cfg()).expect("pipe");
    assert_relative_eq!(100.28, pipe.placement.z, epsilon = 1e-9);
}

#[test]
fn coincident_endpoints_are_degenerate() {
    let r = run(Vec::new(), point("P1", 3.0, 3.0, 10.0), point("P2", 3.0, 3.0, 10.0));
    let err = build_pipe_solid(&r, &cfg()).unwrap_err();
    assert_eq!(
        SolidError::DegenerateDirectrix {
            id: "H1".to_string()
        },
        err
    );
}

#[test]
fn openings_follow_connected_runs() {
    let s = shaft(1000.0, 2000.0, Some(47.0));
    let runs = vec![
        run(Vec::new(), point("P1", 100.0, 200.0, 48.0), point("P2", 110.0, 200.0, 47.5)),
        run(Vec::new(), point("P3", 100.0, 150.0, 49.0), point("P4", 100.0, 200.0, 48.5)),
        run(Vec::new(), point("P5", 0.0, 0.0, 49.0), point("P6", 5.0, 0.0, 48.5)),
    ];
    let openings = shaft_openings(&s, &runs, &cfg());
    assert_eq!(2, openings.len());

    assert_relative_eq!(1.0, openings[0].direction.x);
    assert_relative_eq!(0.28, openings[0].radius);
    assert_relative_eq!(48.28 - 47.0, openings[0].height, epsilon = 1e-9);

    // Run ending at the shaft points back toward its start.
    assert_relative_eq!(-1.0, openings[1].direction.y);

    let solid = build_shaft_solid(&s, &openings, &cfg()).expect("shaft");
    assert_eq!(3, solid.body.cut_count());
}

#[test]
fn shaft_without_bottom_is_walls_only() {
    let no_bottom = ConversionConfig {
        default_bottom_thickness: 0.0,
        ..cfg()
    };
    let solid = build_shaft_solid(&shaft(800.0, 800.0, None), &[], &no_bottom).expect("shaft");
    assert!(matches!(solid.body, Solid::Difference { .. }));
}

#[test]
fn pipe_without_wall_is_a_solid_disk() {
    let no_wall = ConversionConfig {
        default_pipe_wall_thickness: 0.0,
        ..cfg()
    };
    let r = run(Vec::new(), point("P1", 0.0, 0.0, 50.0), point("P2", 10.0, 0.0, 48.0));
    let pipe = build_pipe_solid(&r, &no_wall).expect("pipe");

    assert_relative_eq!(0.25, pipe.outer_radius);
    assert_relative_eq!(0.0, pipe.inner_radius);
    assert_relative_eq!(50.25, pipe.placement.z, epsilon = 1e-9);
    match &pipe.solid {
        Solid::SweptDisk {
            radius,
            inner_radius,
            ..
        } => {
            assert_relative_eq!(0.25, *radius);
            assert_relative_eq!(0.0, *inner_radius);
        }
        other => panic!("unexpected pipe solid {other:?}"),
    }
}

#[test]
fn pipe_needs_a_positive_diameter() {
    for diameter in [0.0, -0.3, f64::NAN] {
        let mut r = run(Vec::new(), point("P1", 0.0, 0.0, 50.0), point("P2", 10.0, 0.0, 48.0));
        r.internal_diameter = diameter;
        let err = build_pipe_solid(&r, &cfg()).unwrap_err();
        assert!(
            matches!(&err, SolidError::DegeneratePipe { id, .. } if id == "H1"),
            "{diameter}: {err:?}"
        );
    }
}

#[test]
fn runs_without_diameter_cut_no_opening() {
    let s = shaft(1000.0, 2000.0, Some(47.0));
    let mut r = run(Vec::new(), point("P1", 100.0, 200.0, 48.0), point("P2", 110.0, 200.0, 47.5));
    r.internal_diameter = -0.3;
    assert!(shaft_openings(&s, &[r], &cfg()).is_empty());
}
