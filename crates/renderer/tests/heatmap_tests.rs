//! End-to-end tests for the heatmap rasterizer.

use heatmap_common::{Color, Point};
use renderer::style::StyleConfig;
use renderer::{HeatmapConfig, HeatmapRasterizer};
use test_utils::{
    assert_channel_near, create_cluster, create_scattered_points, grayscale_ramp, sizes,
    solid_color, two_state_colors, SAMPLE_STYLE_JSON,
};

const RED: Color = Color::new(255, 0, 0, 255);

// ============================================================================
// Edge case tests
// ============================================================================

#[test]
fn test_empty_input_draws_out_of_range_entry_zero() {
    let mut rasterizer = HeatmapRasterizer::new();
    let surface = rasterizer.render(&[], 10, 10, |v| v, &two_state_colors(), |a| a > 0.0);

    assert_eq!(surface.width(), 10);
    assert_eq!(surface.height(), 10);
    for px in surface.pixels().chunks_exact(4) {
        // Out-of-range color is red; alpha stays 0
        assert_eq!(px, &[255, 0, 0, 0]);
    }
}

#[test]
fn test_off_surface_point_leaves_surface_unpainted() {
    let mut rasterizer = HeatmapRasterizer::new();
    let points = [Point::new(-1000.0, -1000.0, 1.0)];
    let surface = rasterizer.render(&points, 10, 10, |v| v, &grayscale_ramp(), |_| true);
    assert!(surface.pixels().chunks_exact(4).all(|px| px[3] == 0));

    let blank = rasterizer.render(&[], 10, 10, |v| v, &grayscale_ramp(), |_| true);
    assert_eq!(surface, blank);
}

#[test]
fn test_zero_sized_surface_is_empty() {
    let mut rasterizer = HeatmapRasterizer::new();
    let (w, h) = sizes::EMPTY;
    let points = create_cluster(5.0, 5.0, 20, 4.0);
    let surface = rasterizer.render(&points, w, h, |v| v, &grayscale_ramp(), |_| true);
    assert!(surface.is_empty());
    assert!(surface.pixels().is_empty());
    assert_eq!(rasterizer.gradient_builds(), 0);
}

#[test]
fn test_non_finite_points_are_ignored() {
    let mut rasterizer = HeatmapRasterizer::new();
    let points = [
        Point::new(f64::NAN, 5.0, 1.0),
        Point::new(5.0, f64::INFINITY, 1.0),
    ];
    let surface = rasterizer.render(&points, 10, 10, |v| v, &grayscale_ramp(), |_| true);
    assert!(surface.pixels().chunks_exact(4).all(|px| px[3] == 0));
}

#[test]
fn test_far_away_points_are_clipped() {
    let mut rasterizer = HeatmapRasterizer::new();
    let (w, h) = sizes::PIXEL;
    let points = [
        Point::new(1e300, 0.0, 1.0),
        Point::new(0.0, 1e300, 1.0),
        Point::new(-1e300, -1e300, 1.0),
    ];
    let surface = rasterizer.render(&points, w, h, |v| v, &solid_color(RED), |_| true);
    assert_eq!(surface.pixels(), &[255, 0, 0, 0]);
}

// ============================================================================
// Scenario tests
// ============================================================================

#[test]
fn test_single_point_fills_small_surface_with_red() {
    let mut rasterizer = HeatmapRasterizer::new();
    rasterizer.set_blur_size(0).unwrap();
    rasterizer.set_opacity(1.0).unwrap();

    let points = [Point::new(5.0, 5.0, 1.0)];
    let surface = rasterizer.render(&points, 10, 10, |v| v, &solid_color(RED), |_| true);

    let center = surface.pixel(5, 5).unwrap();
    assert!(center.a > 0);
    assert_eq!((center.r, center.g, center.b), (255, 0, 0));

    // The whole surface lies inside the 20px brush
    for y in 0..10 {
        for x in 0..10 {
            let px = surface.pixel(x, y).unwrap();
            assert_eq!((px.r, px.g, px.b), (255, 0, 0));
            assert!(px.a > 0, "pixel ({}, {}) unpainted", x, y);
        }
    }
}

#[test]
fn test_half_opacity_halves_alpha() {
    let points = create_cluster(64.0, 64.0, 40, 30.0);
    let colors = grayscale_ramp();

    let mut full = HeatmapRasterizer::new();
    let mut half = HeatmapRasterizer::with_config(HeatmapConfig {
        opacity: 0.5,
        ..HeatmapConfig::default()
    })
    .unwrap();

    let a = full.render(&points, 128, 128, |v| v, &colors, |_| true);
    let b = half.render(&points, 128, 128, |v| v, &colors, |_| true);

    for (pa, pb) in a.pixels().chunks_exact(4).zip(b.pixels().chunks_exact(4)) {
        assert_eq!(&pa[..3], &pb[..3]);
        assert_channel_near!(pb[3] as f64, pa[3] as f64 / 2.0, 1);
    }
}

#[test]
fn test_dense_core_is_denser_than_rim() {
    let mut rasterizer = HeatmapRasterizer::new();
    let points = create_cluster(100.0, 100.0, 200, 60.0);
    let surface = rasterizer.render(&points, 200, 200, |v| v, &grayscale_ramp(), |_| true);

    let core = surface.pixel(100, 100).unwrap();
    let rim = surface.pixel(100, 185).unwrap();
    assert!(core.a > rim.a);
    assert!(core.r > rim.r);
}

#[test]
fn test_render_is_repeatable() {
    let mut rasterizer = HeatmapRasterizer::new();
    let points = create_scattered_points(256.0, 256.0, 500, 7);
    let (w, h) = sizes::TILE;
    let a = rasterizer.render(&points, w, h, |v| v, &grayscale_ramp(), |a| a > 0.2);
    let b = rasterizer.render(&points, w, h, |v| v, &grayscale_ramp(), |a| a > 0.2);
    assert_eq!(a, b);
}

#[test]
fn test_blur_change_alters_output() {
    let points = [Point::new(20.0, 20.0, 1.0)];
    let mut rasterizer = HeatmapRasterizer::new();
    let (w, h) = sizes::SMALL;
    let soft = rasterizer.render(&points, w, h, |v| v, &grayscale_ramp(), |_| true);
    rasterizer.set_blur_size(0).unwrap();
    let sharp = rasterizer.render(&points, w, h, |v| v, &grayscale_ramp(), |_| true);
    assert_ne!(soft, sharp);
    assert_eq!(rasterizer.brush().blur_size(), 0);
}

// ============================================================================
// Gradient cache tests
// ============================================================================

#[test]
fn test_visual_map_reuses_gradient_tables() {
    let config = StyleConfig::from_json(SAMPLE_STYLE_JSON).unwrap();
    let map = config.compile_style("density").unwrap();
    let points = create_cluster(32.0, 32.0, 10, 8.0);

    let mut rasterizer = HeatmapRasterizer::new();
    let first = rasterizer.render_with_style(&points, 64, 64, &map);
    let second = rasterizer.render_with_style(&points, 64, 64, &map);
    assert_eq!(rasterizer.gradient_builds(), 1);
    assert_eq!(first, second);

    rasterizer.invalidate_gradients();
    let third = rasterizer.render_with_style(&points, 64, 64, &map);
    assert_eq!(rasterizer.gradient_builds(), 2);
    assert_eq!(first, third);
}

#[test]
fn test_closures_rebuild_tables_every_render() {
    let mut rasterizer = HeatmapRasterizer::new();
    let colors = grayscale_ramp();
    rasterizer.render(&[], 4, 4, |v| v, &colors, |_| true);
    rasterizer.render(&[], 4, 4, |v| v, &colors, |_| true);
    assert_eq!(rasterizer.gradient_builds(), 2);
}

#[test]
fn test_style_range_hides_low_density() {
    let config = StyleConfig::from_json(SAMPLE_STYLE_JSON).unwrap();
    let style = config.get_style("hotspots").unwrap();
    let map = style.compile().unwrap();

    let mut rasterizer = HeatmapRasterizer::with_config(style.heatmap_config()).unwrap();
    assert_eq!(rasterizer.blur_size(), 10);

    let points = [Point::new(30.0, 30.0, 1.0)];
    let surface = rasterizer.render_with_style(&points, 60, 60, &map);

    // Near the edge of the stamp density is low, so the gray out-of-range
    // color shows through.
    let mut saw_gray = false;
    let mut saw_warm = false;
    for px in surface.pixels().chunks_exact(4) {
        if px[3] == 0 {
            continue;
        }
        match (px[0], px[1], px[2]) {
            (128, 128, 128) => saw_gray = true,
            (255, _, 0) => saw_warm = true,
            other => panic!("unexpected color {:?}", other),
        }
    }
    assert!(saw_gray);
    assert!(saw_warm);
}
