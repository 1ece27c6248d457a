use chrono::NaiveDate;
use survey_footprint::domain::model::Crs;
use survey_footprint::geometry::{build_hull_with, clip_with_outcome, engine_for, ClipKind};
use survey_footprint::core::EngineKind;
use survey_footprint::{
    build_hull, clip, read_shapefile, write_shapefile, FootprintError, Point, Polygon,
    ShapefileWriter,
};
use tempfile::TempDir;

fn points(coords: &[(f64, f64)]) -> Vec<Point> {
    coords.iter().copied().map(Point::from).collect()
}

fn square(min: f64, max: f64) -> Polygon {
    Polygon::from_coords(&[(min, min), (max, min), (max, max), (min, max)]).unwrap()
}

#[test]
fn test_interior_point_is_dropped_from_hull() {
    let hull = build_hull(&points(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (1.0, 1.0)]))
        .unwrap();
    assert_eq!(hull, square(0.0, 2.0));
}

#[test]
fn test_repeated_point_has_no_hull() {
    for engine in [EngineKind::Geo, EngineKind::Planar] {
        let engine = engine_for(engine);
        assert!(matches!(
            build_hull_with(engine.as_ref(), &points(&[(5.0, 5.0), (5.0, 5.0)])),
            Err(FootprintError::EmptyGeometry { .. })
        ));
    }
}

#[test]
fn test_disjoint_reference_returns_hull() {
    let hull = square(0.0, 1.0);
    let reference = square(10.0, 11.0);

    assert_eq!(clip(&hull, &reference), hull);

    let outcome = clip_with_outcome(engine_for(EngineKind::Planar).as_ref(), &hull, &reference);
    assert_eq!(outcome.kind, ClipKind::Fallback);
    assert_eq!(outcome.polygon, hull);
}

#[test]
fn test_overlapping_corner_is_clipped() {
    let expected =
        Polygon::from_coords(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]).unwrap();

    for engine in [EngineKind::Geo, EngineKind::Planar] {
        let engine = engine_for(engine);
        let outcome = clip_with_outcome(engine.as_ref(), &square(0.0, 2.0), &square(1.0, 3.0));
        assert_eq!(outcome.kind, ClipKind::Clipped);
        assert!(outcome.polygon.same_ring(&expected, 1e-9));
    }
}

#[test]
fn test_shapefile_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let hull = build_hull(&points(&[
        (-9.4512, 38.7021),
        (-9.4104, 38.7093),
        (-9.4021, 38.7488),
        (-9.4387, 38.7702),
        (-9.4299, 38.7301),
    ]))
    .unwrap();

    let paths = write_shapefile(&hull, 3, temp_dir.path().join("mission_3_polygon")).unwrap();
    assert!(paths.shx.exists() && paths.dbf.exists() && paths.prj.exists());

    let feature = read_shapefile(&paths.shp).unwrap();
    assert_eq!(feature.id, 3);
    assert_eq!(feature.crs, Crs::Wgs84);
    assert_eq!(feature.polygon.vertices().len(), hull.vertices().len());
    for (read, written) in feature.polygon.vertices().iter().zip(hull.vertices()) {
        assert!((read.x - written.x).abs() < 1e-9);
        assert!((read.y - written.y).abs() < 1e-9);
    }
}

#[test]
fn test_writer_output_is_byte_stable() {
    let temp_dir = TempDir::new().unwrap();
    let writer = ShapefileWriter::new().with_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    let polygon = square(0.0, 1.0);

    let first = writer.write(&polygon, 1, temp_dir.path().join("a.shp")).unwrap();
    let second = writer.write(&polygon, 1, temp_dir.path().join("b.shp")).unwrap();

    for (a, b) in [
        (&first.shp, &second.shp),
        (&first.shx, &second.shx),
        (&first.dbf, &second.dbf),
        (&first.prj, &second.prj),
    ] {
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }
}

#[test]
fn test_write_footprint_keeps_feature_id() {
    let temp_dir = TempDir::new().unwrap();
    let footprint = survey_footprint::Footprint {
        polygon: square(0.0, 1.0),
        id: 17,
        crs: Crs::Wgs84,
        mission_id: 5,
    };

    let paths = survey_footprint::shapefile::write_footprint(
        &footprint,
        temp_dir.path().join("mission_5_polygon.shp"),
    )
    .unwrap();

    let feature = read_shapefile(&paths.shp).unwrap();
    assert_eq!(feature.id, 17);
    assert_eq!(feature.polygon, footprint.polygon);
}

#[test]
fn test_planar_engine_keeps_simple_ring_for_concave_reference() {
    let hull = build_hull(&points(&[(0.0, 0.0), (10.0, 0.0), (10.0, 2.0), (0.0, 2.0)])).unwrap();
    let reference = Polygon::from_coords(&[
        (1.0, -1.0),
        (2.0, -1.0),
        (2.0, 5.0),
        (5.0, 5.0),
        (5.0, -1.0),
        (8.0, -1.0),
        (8.0, 6.0),
        (1.0, 6.0),
    ])
    .unwrap();

    let outcome = clip_with_outcome(engine_for(EngineKind::Planar).as_ref(), &hull, &reference);

    assert_eq!(outcome.kind, ClipKind::LargestPiece { discarded: 1 });
    let expected =
        Polygon::from_coords(&[(5.0, 0.0), (8.0, 0.0), (8.0, 2.0), (5.0, 2.0)]).unwrap();
    assert!(outcome.polygon.same_ring(&expected, 1e-9));
}
