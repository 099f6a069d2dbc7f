//! Write features, read them back, and check both the decoded features and
//! the bytes they left behind.

use geo_types::{Coord, Geometry, MultiLineString, Point, Polygon, line_string};
use tab::{
    Bounds, BrushDef, Color, Feature, GeomType, MapFile, PenDef, Shape, SymbolDef, feature::Text,
};

#[test]
fn symbol() {
    let mut map = MapFile::memory();
    let feature = Feature::symbol(
        Point::new(10., 20.),
        SymbolDef {
            shape: 35,
            point_size: 12,
            color: Color::from(0xff0000),
        },
    );
    let tag = map.write_feature(&feature, false).unwrap();
    assert_eq!(GeomType::Symbol, tag);
    assert_eq!(
        &[0x01, 10, 0, 0, 0, 20, 0, 0, 0, 1],
        map.object().get_ref().get_ref().as_slice()
    );
    assert_eq!(1, map.styles().symbol_count());

    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    assert_eq!(
        Some(Geometry::Point(Point::new(10., 20.))),
        read.geometry
    );
    assert_eq!(feature, read);
}

#[test]
fn line() {
    let mut map = MapFile::memory();
    let feature = Feature::polyline(
        line_string![(x: 0., y: 0.), (x: 100., y: 50.)],
        PenDef::default(),
        false,
    );
    let tag = map.write_feature(&feature, false).unwrap();
    assert_eq!(GeomType::Line, tag);
    assert_eq!(
        &[0x04, 0, 0, 0, 0, 0, 0, 0, 0, 100, 0, 0, 0, 50, 0, 0, 0, 0x01],
        map.object().get_ref().get_ref().as_slice()
    );

    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    match read.geometry {
        Some(Geometry::LineString(ref line)) => {
            assert_eq!(
                vec![Coord { x: 0., y: 0. }, Coord { x: 100., y: 50. }],
                line.0
            );
        }
        _ => panic!("lines decode into line strings"),
    }
    assert_eq!(feature, read);
}

#[test]
fn pline_with_smooth_flag() {
    let mut map = MapFile::memory();
    let feature = Feature::polyline(
        line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.), (x: 2., y: 1.)],
        PenDef::default(),
        true,
    );
    let tag = map.write_feature(&feature, false).unwrap();
    assert_eq!(GeomType::Pline, tag);

    map.rewind().unwrap();
    let object = map.object_mut();
    assert_eq!(0x07, object.read_u8().unwrap());
    assert_eq!(0, object.read_i32().unwrap()); // coordinate stream offset
    assert_eq!(
        32 | 0x8000_0000u32,
        object.read_i32().unwrap() as u32,
        "the smooth flag rides the top bit of the data size"
    );

    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    match read.shape {
        Shape::Polyline { smooth, .. } => assert!(smooth),
        _ => panic!("plines keep their shape class"),
    }
    match read.geometry {
        Some(Geometry::LineString(ref line)) => assert_eq!(4, line.0.len()),
        _ => panic!("plines decode into line strings"),
    }
    assert_eq!(feature, read);
}

#[test]
fn region_with_one_hole() {
    let exterior = line_string![
        (x: 0., y: 0.),
        (x: 10., y: 0.),
        (x: 10., y: 10.),
        (x: 0., y: 10.),
        (x: 0., y: 0.)
    ];
    let hole = line_string![
        (x: 2., y: 2.),
        (x: 4., y: 2.),
        (x: 4., y: 4.),
        (x: 2., y: 2.)
    ];
    let feature = Feature::region(
        Polygon::new(exterior, vec![hole]),
        PenDef::default(),
        BrushDef {
            pattern: 2,
            ..Default::default()
        },
    );
    let mut map = MapFile::memory();
    map.write_feature(&feature, false).unwrap();

    // Two section headers precede the packed vertices in the coordinate
    // stream.
    map.rewind().unwrap();
    let coord = map.coord_mut();
    assert_eq!(5, coord.read_i16().unwrap());
    assert_eq!(0, coord.read_i16().unwrap());
    coord.seek_rel(16).unwrap(); // section bounds
    assert_eq!(48, coord.read_i32().unwrap()); // 2 * 24
    assert_eq!(4, coord.read_i16().unwrap());
    assert_eq!(0, coord.read_i16().unwrap());
    coord.seek_rel(16).unwrap();
    assert_eq!(88, coord.read_i32().unwrap()); // 2 * 24 + 5 * 8

    map.rewind().unwrap();
    let object = map.object_mut();
    assert_eq!(0x0d, object.read_u8().unwrap());
    object.seek_rel(8).unwrap(); // offset and data size
    assert_eq!(2, object.read_i16().unwrap());

    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    match read.geometry {
        Some(Geometry::Polygon(ref polygon)) => {
            assert_eq!(5, polygon.exterior().0.len());
            assert_eq!(1, polygon.interiors().len());
            assert_eq!(4, polygon.interiors()[0].0.len());
        }
        _ => panic!("regions decode into polygons"),
    }
    assert_eq!(feature, read);
}

#[test]
fn multipolyline() {
    let feature = Feature::multipolyline(
        MultiLineString::new(vec![
            line_string![(x: 0., y: 0.), (x: 5., y: 5.)],
            line_string![(x: 10., y: 0.), (x: 15., y: 5.), (x: 20., y: 0.)],
        ]),
        PenDef::default(),
    );
    let mut map = MapFile::memory();
    let tag = map.write_feature(&feature, false).unwrap();
    assert_eq!(GeomType::Multipline, tag);
    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    match read.geometry {
        Some(Geometry::MultiLineString(ref lines)) => {
            assert_eq!(2, lines.0.len());
            assert_eq!(2, lines.0[0].0.len());
            assert_eq!(3, lines.0[1].0.len());
        }
        _ => panic!("multipolylines decode into multi line strings"),
    }
    assert_eq!(feature, read);
}

#[test]
fn arc() {
    let mut map = MapFile::memory();
    let feature = Feature::arc(
        Coord { x: 0., y: 0. },
        Coord { x: 10., y: 5. },
        30.,
        60.,
        PenDef::default(),
    );
    let tag = map.write_feature(&feature, false).unwrap();
    assert_eq!(GeomType::Arc, tag);

    // Angles are stored mirrored, end before start.
    map.rewind().unwrap();
    let object = map.object_mut();
    assert_eq!(0x0a, object.read_u8().unwrap());
    assert_eq!(1200, object.read_i16().unwrap());
    assert_eq!(1500, object.read_i16().unwrap());

    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    match read.shape {
        Shape::Arc {
            start_angle,
            end_angle,
            ..
        } => {
            assert_eq!(30., start_angle);
            assert_eq!(60., end_angle);
        }
        _ => panic!("arcs keep their shape class"),
    }
    match read.geometry {
        Some(Geometry::LineString(ref line)) => assert_eq!(16, line.0.len()),
        _ => panic!("arcs decode into line strings"),
    }
    // The stored bounds are the integer-rounded envelope, so compare
    // everything but them.
    assert_eq!(feature.shape, read.shape);
    assert_eq!(feature.geometry, read.geometry);
}

#[test]
fn rect() {
    let feature = Feature::rectangle(
        Bounds::new(1., 2., 9., 8.),
        PenDef::default(),
        BrushDef::default(),
    );
    let mut map = MapFile::memory();
    let tag = map.write_feature(&feature, false).unwrap();
    assert_eq!(GeomType::Rect, tag);
    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    assert_eq!(Bounds::new(1., 2., 9., 8.), read.bounds);
    assert_eq!(feature, read);
}

#[test]
fn text_rotated_90_degrees() {
    let text = Text {
        string: "Hi".to_string(),
        height: 2.,
        angle: 90.,
        ..Default::default()
    };
    // The anchor is sent as (0, 0); after a 90 degree rotation around the
    // upper-left corner the box covers (-2, 0)..(0, width).
    let feature = Feature::text(Point::new(0., 0.), text, Bounds::new(-2., 0., 0., 1.));
    let mut map = MapFile::memory();
    let tag = map.write_feature(&feature, false).unwrap();
    assert_eq!(GeomType::Text, tag);
    assert_eq!(b"Hi", map.coord().get_ref().get_ref().as_slice());

    map.rewind().unwrap();
    let read = map.read_feature().unwrap();
    assert_eq!(
        Some(Geometry::Point(Point::new(0., 0.))),
        read.geometry,
        "the lower-left anchor is recovered from the rotated bounds"
    );
    match read.shape {
        Shape::Text(ref text) => {
            assert_eq!("Hi", text.string);
            assert_eq!(2., text.height);
            assert_eq!(90., text.angle);
        }
        _ => panic!("texts keep their shape class"),
    }
    assert_eq!(feature, read);
}

#[test]
fn every_variant_roundtrips_compressed() {
    let features = vec![
        Feature::symbol(Point::new(1., 2.), SymbolDef::default()),
        Feature::polyline(
            line_string![(x: 0., y: 0.), (x: 10., y: 10.)],
            PenDef::default(),
            false,
        ),
        Feature::polyline(
            line_string![(x: 0., y: 0.), (x: 10., y: 10.), (x: 20., y: 0.)],
            PenDef::default(),
            false,
        ),
        Feature::rectangle(
            Bounds::new(0., 0., 10., 10.),
            PenDef::default(),
            BrushDef::default(),
        ),
        Feature::ellipse(
            Coord { x: 0., y: 0. },
            Coord { x: 10., y: 20. },
            PenDef::default(),
            BrushDef::default(),
        ),
        Feature::arc(
            Coord { x: 0., y: 0. },
            Coord { x: 10., y: 20. },
            90.,
            180.,
            PenDef::default(),
        ),
    ];
    for feature in features {
        let mut map = MapFile::memory();
        let tag = map.write_feature(&feature, true).unwrap();
        assert!(tag.is_compressed(), "{:?} should compress", tag);
        map.rewind().unwrap();
        let read = map.read_feature().unwrap();
        assert_eq!(feature.shape, read.shape, "compressed {:?} roundtrip", tag);
        assert_eq!(
            feature.geometry, read.geometry,
            "compressed {:?} roundtrip",
            tag
        );
        // Bounds may be recomputed through integer rounding.
        assert!((feature.bounds.min.x - read.bounds.min.x).abs() < 1.);
        assert!((feature.bounds.min.y - read.bounds.min.y).abs() < 1.);
        assert!((feature.bounds.max.x - read.bounds.max.x).abs() < 1.);
        assert!((feature.bounds.max.y - read.bounds.max.y).abs() < 1.);
    }
}

#[test]
fn scaled_transform_stays_within_one_ulp() {
    use tab::{Transform, Vector};
    let transforms = Vector {
        x: Transform::from((0.01, -10.)),
        y: Transform::from((0.01, -10.)),
    };
    let line = line_string![(x: -1.13, y: 4.27), (x: 2.11, y: -3.37), (x: 5.01, y: 0.99)];
    let feature = Feature::polyline(line, PenDef::default(), false);

    let decode = |compress: bool| {
        let mut map = MapFile::new(
            std::io::Cursor::new(Vec::new()),
            std::io::Cursor::new(Vec::new()),
            transforms,
        );
        map.write_feature(&feature, compress).unwrap();
        map.rewind().unwrap();
        map.read_feature().unwrap()
    };
    let plain = decode(false);
    let packed = decode(true);
    let coords = |feature: &Feature| match feature.geometry {
        Some(Geometry::LineString(ref line)) => line.0.clone(),
        _ => panic!("polylines decode into line strings"),
    };
    for (a, b) in coords(&plain).iter().zip(coords(&packed).iter()) {
        assert!((a.x - b.x).abs() <= 0.01);
        assert!((a.y - b.y).abs() <= 0.01);
    }
}

#[test]
fn style_indices_are_stable_across_features() {
    let mut map = MapFile::memory();
    let red_pen = PenDef {
        color: Color::from(0xff0000),
        ..Default::default()
    };
    let blue_pen = PenDef {
        color: Color::from(0x0000ff),
        ..Default::default()
    };
    for pen in [red_pen, blue_pen, red_pen] {
        let feature = Feature::polyline(
            line_string![(x: 0., y: 0.), (x: 1., y: 1.)],
            pen,
            false,
        );
        map.write_feature(&feature, false).unwrap();
    }
    assert_eq!(2, map.styles().pen_count());

    map.rewind().unwrap();
    let first = map.read_feature().unwrap();
    let second = map.read_feature().unwrap();
    let third = map.read_feature().unwrap();
    let pen = |feature: &Feature| match feature.shape {
        Shape::Polyline { pen, .. } => pen,
        _ => panic!("lines keep their shape class"),
    };
    assert_eq!(red_pen, pen(&first));
    assert_eq!(blue_pen, pen(&second));
    assert_eq!(red_pen, pen(&third));
}

#[test]
fn features_interleave_in_both_streams() {
    let mut map = MapFile::memory();
    let pline = Feature::polyline(
        line_string![(x: 0., y: 0.), (x: 1., y: 0.), (x: 2., y: 1.)],
        PenDef::default(),
        false,
    );
    let symbol = Feature::symbol(Point::new(7., 8.), SymbolDef::default());
    let region = Feature::region(
        Polygon::new(
            line_string![(x: 0., y: 0.), (x: 3., y: 0.), (x: 3., y: 3.), (x: 0., y: 0.)],
            Vec::new(),
        ),
        PenDef::default(),
        BrushDef::default(),
    );
    map.write_feature(&pline, false).unwrap();
    map.write_feature(&symbol, false).unwrap();
    map.write_feature(&region, false).unwrap();

    map.rewind().unwrap();
    assert_eq!(pline, map.read_feature().unwrap());
    assert_eq!(symbol, map.read_feature().unwrap());
    assert_eq!(region, map.read_feature().unwrap());
}
