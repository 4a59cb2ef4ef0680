use kurbo::{Affine, Point, Shape};
use tileink_core::fill::{FillRenderData, bez_to_skia, discover};
use tileink_core::{
    ClosedLoop, Deleted, Design, DesignStore, FillCache, FillConfig, FillRegion, InkPrimitive, Primitive, TileFrame,
    TileShape, loops_to_bez_path, vectorize,
};
use tiny_skia::{FillRule, Paint, Pixmap, Transform};

fn square() -> TileFrame {
    TileFrame::new(TileShape::Square, 100.0)
}

/// Two diagonals crossing at the tile centre, ids 1 and 2.
fn x_ink() -> Vec<InkPrimitive> {
    vec![
        InkPrimitive::new(1, Primitive::line(Point::new(-0.5, -0.5), Point::new(0.5, 0.5))),
        InkPrimitive::new(2, Primitive::line(Point::new(0.5, -0.5), Point::new(-0.5, 0.5))),
    ]
}

fn assert_area_close(actual: f64, expected: f64, tolerance: f64) {
    let rel = (actual - expected).abs() / expected;
    assert!(rel < tolerance, "area {actual:.1} vs expected {expected:.1} ({:.2}%)", rel * 100.0);
}

/// Rasterize loops even-odd onto the mask's own pixel grid.
fn rasterize_loops(loops: &[ClosedLoop], data: &FillRenderData) -> Vec<bool> {
    let to_pixels = Affine::scale(data.scale) * Affine::translate(-data.origin_local.to_vec2());
    let mut path = loops_to_bez_path(loops, 0.01);
    path.apply_affine(to_pixels);
    let path = bez_to_skia(&path).expect("loops produce a path");

    let mut pixmap = Pixmap::new(data.mask.width(), data.mask.height()).expect("pixmap");
    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color_rgba8(0, 0, 0, 255);
    pixmap.fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
    pixmap.data().chunks_exact(4).map(|px| px[3] > 0).collect()
}

fn symmetric_difference(a: &[bool], b: &[bool]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

#[test]
fn scenario_a_empty_triangle() {
    let config = FillConfig::default();
    let tile = TileFrame::new(TileShape::Triangle, 100.0);
    let found = discover(Point::ZERO, &tile, &[], &config).unwrap();

    assert!(found.boundary_ink_ids.is_empty());
    assert!(found.uses_tile_boundary);
    assert_area_close(found.data.mask_area_local(), tile.area(), 0.06);
}

#[test]
fn scenario_b_circle_in_square() {
    let config = FillConfig::default();
    let tile = square();
    let ink = vec![InkPrimitive::new(7, Primitive::circle(Point::ZERO, 0.25))];
    let found = discover(Point::new(40.0, 0.0), &tile, &ink, &config).unwrap();

    assert_eq!(found.boundary_ink_ids, vec![7]);
    assert!(found.uses_tile_boundary);
    let disk = std::f64::consts::PI * 25.0 * 25.0;
    assert_area_close(found.data.mask_area_local(), tile.area() - disk, 0.06);
    assert!(!found.data.contains(Point::ZERO));
}

#[test]
fn scenario_c_four_quadrants() {
    let config = FillConfig::default();
    let tile = square();
    let ink = x_ink();
    let seeds = [
        Point::new(0.0, -30.0),
        Point::new(30.0, 0.0),
        Point::new(0.0, 30.0),
        Point::new(-30.0, 0.0),
    ];

    let masks: Vec<FillRenderData> = seeds
        .iter()
        .map(|seed| {
            let found = discover(*seed, &tile, &ink, &config).unwrap();
            assert_eq!(found.boundary_ink_ids, vec![1, 2], "seed {seed:?}");
            found.data
        })
        .collect();

    for (i, a) in masks.iter().enumerate() {
        for (j, b) in masks.iter().enumerate().skip(i + 1) {
            let shared = a
                .mask
                .as_slice()
                .iter()
                .zip(b.mask.as_slice())
                .filter(|(x, y)| **x && **y)
                .count();
            assert_eq!(shared, 0, "quadrants {i} and {j} overlap");
            assert!(!a.contains(seeds[j]));
        }
    }
}

#[test]
fn scenario_d_delete_line_prunes_open_fills() {
    let mut store = DesignStore::default();
    let tile = square();
    let d = store.add_design(TileShape::Square);
    let a = store
        .add_ink(d, Primitive::line(Point::new(-0.5, -0.5), Point::new(0.5, 0.5)))
        .unwrap();
    store
        .add_ink(d, Primitive::line(Point::new(0.5, -0.5), Point::new(-0.5, 0.5)))
        .unwrap();
    let ring = store.add_ink(d, Primitive::circle(Point::new(-0.3, 0.0), 0.06)).unwrap();

    let quadrant = store.create_fill(d, &tile, Point::new(0.0, -30.0)).unwrap();
    let inner = store.create_fill(d, &tile, Point::new(-30.0, 0.0)).unwrap();
    let before = store.render_fill(d, &tile, inner).unwrap().signature;
    assert_eq!(
        store.design(d).unwrap().get_fill(inner).unwrap().boundary_ink_ids,
        Some(vec![ring])
    );

    match store.delete_at_point(d, &tile, Point::new(20.0, 20.0)) {
        Some(Deleted::Ink(ink)) => assert_eq!(ink.id, a),
        other => panic!("expected ink deletion, got {other:?}"),
    }

    let design = store.design(d).unwrap();
    assert!(design.get_fill(quadrant).is_none());
    let kept = design.get_fill(inner).unwrap().clone();
    assert_eq!(kept.boundary_ink_ids, Some(vec![ring]));
    assert_eq!(store.render_fill(d, &tile, inner).unwrap().signature, before);
}

#[test]
fn discovery_is_deterministic() {
    let config = FillConfig::default();
    let tile = TileFrame::new(TileShape::Hexagon, 120.0);
    let mut ink = x_ink();
    ink.push(InkPrimitive::new(3, Primitive::arc(Point::ZERO, 0.3, 0.4, 2.8)));

    let first = discover(Point::new(0.0, -50.0), &tile, &ink, &config).unwrap();
    let second = discover(Point::new(0.0, -50.0), &tile, &ink, &config).unwrap();
    assert_eq!(first.boundary_ink_ids, second.boundary_ink_ids);
    assert_eq!(first.data.signature, second.data.signature);
    assert_eq!(first.data.mask, second.data.mask);
}

#[test]
fn discovered_boundary_is_minimal() {
    let config = FillConfig::default();
    let tile = square();
    let mut ink = x_ink();
    // Lies entirely in the right quadrant and never bounds the top one.
    ink.push(InkPrimitive::new(3, Primitive::circle(Point::new(0.3, 0.0), 0.05)));
    let seed = Point::new(0.0, -30.0);

    let found = discover(seed, &tile, &ink, &config).unwrap();
    assert_eq!(found.boundary_ink_ids, vec![1, 2]);

    for id in &found.boundary_ink_ids {
        let without: Vec<InkPrimitive> = ink.iter().filter(|i| i.id != *id).copied().collect();
        match discover(seed, &tile, &without, &config) {
            Ok(other) => assert_ne!(other.data.signature, found.data.signature, "ink {id} is redundant"),
            Err(_) => {}
        }
    }
}

#[test]
fn vector_loops_round_trip_to_mask() {
    let config = FillConfig::default();
    let tile = square();
    // Exact areas: square minus a radius 25 disk, and a quarter of the square.
    let cases = [
        (
            vec![InkPrimitive::new(1, Primitive::circle(Point::ZERO, 0.25))],
            Point::new(40.0, 0.0),
            10_000.0 - std::f64::consts::PI * 625.0,
        ),
        (x_ink(), Point::new(0.0, -30.0), 2_500.0),
    ];

    for (ink, seed_local, exact_area) in cases {
        let mut design = Design::new(TileShape::Square);
        design.ink = ink;
        let mut cache = FillCache::new();
        let mut fill = FillRegion::new(1, tile.to_world(seed_local));

        let data = cache.render(&mut fill, &tile, &design, &config).unwrap();
        let loops = vectorize(&mut cache, &mut fill, &tile, &design, &config);
        assert!(!loops.is_empty());

        // Loops follow the stroke centrelines, so their area is checked
        // against the exact region rather than the dilated mask.
        let loop_area = loops_to_bez_path(&loops, 0.01).area().abs();
        assert_area_close(loop_area, exact_area, 0.005);

        let drawn = rasterize_loops(&loops, &data);
        let diff = symmetric_difference(&drawn, data.mask.as_slice());
        let ratio = diff as f64 / data.mask.count() as f64;
        assert!(ratio < 0.05, "round trip differs by {:.2}%", ratio * 100.0);
    }
}

#[test]
fn contains_matches_mask() {
    let config = FillConfig::default();
    let tile = TileFrame::new(TileShape::Octagon, 80.0);
    let ink = vec![InkPrimitive::new(4, Primitive::circle(Point::new(0.1, 0.1), 0.3))];
    let found = discover(Point::new(8.0, 8.0), &tile, &ink, &config).unwrap();
    let data = &found.data;

    for y in 0..data.mask.height() {
        for x in 0..data.mask.width() {
            if data.mask.get(x, y) {
                let p = data.origin_local + kurbo::Vec2::new(x as f64 + 0.5, y as f64 + 0.5) / data.scale;
                assert!(data.contains(p), "pixel ({x}, {y})");
            }
        }
    }

    let bounds = data.bounds();
    for p in [
        Point::new(bounds.x0 - 1.0, bounds.center().y),
        Point::new(bounds.x1 + 1.0, bounds.center().y),
        Point::new(bounds.center().x, bounds.y0 - 1.0),
        Point::new(bounds.center().x, bounds.y1 + 1.0),
    ] {
        assert!(!tileink_core::contains(data, p));
    }
}
