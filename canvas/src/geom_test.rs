#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-10;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

// --- Point ---

#[test]
fn point_new() {
    let p = Point::new(3.0, 4.0);
    assert_eq!(p.x, 3.0);
    assert_eq!(p.y, 4.0);
}

#[test]
fn point_default_is_origin() {
    assert!(Point::default().is_origin());
    assert!(!Point::new(0.0, 1.0).is_origin());
}

#[test]
fn point_distance_sq() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert_eq!(a.distance_sq(b), 25.0);
    assert_eq!(b.distance_sq(a), 25.0);
}

#[test]
fn point_offset() {
    assert_eq!(Point::new(1.0, 2.0).offset(10.0, -2.0), Point::new(11.0, 0.0));
}

#[test]
fn point_serde_uses_plain_fields() {
    let json = serde_json::to_string(&Point::new(1.5, 2.0)).unwrap();
    assert_eq!(json, r#"{"x":1.5,"y":2.0}"#);
}

// --- CanvasSize ---

#[test]
fn canvas_size_accepts_positive() {
    let size = CanvasSize::new(600.0, 800.0).unwrap();
    assert_eq!(size.width, 600.0);
    assert_eq!(size.height, 800.0);
}

#[test]
fn canvas_size_rejects_zero() {
    let err = CanvasSize::new(0.0, 800.0).unwrap_err();
    assert!(matches!(err, GeometryError::NonPositive { .. }));
    assert_eq!(err.error_code(), "E_GEOMETRY_NON_POSITIVE");
}

#[test]
fn canvas_size_rejects_nan() {
    let err = CanvasSize::new(f64::NAN, 800.0).unwrap_err();
    assert!(matches!(err, GeometryError::NonFinite { .. }));
}

#[test]
fn canvas_size_clamped_replaces_negative() {
    let size = CanvasSize::clamped(-10.0, -5.0);
    assert_eq!(size.width, MIN_CANVAS_WIDTH);
    assert_eq!(size.height, MIN_CANVAS_HEIGHT);
}

#[test]
fn canvas_size_clamped_raises_small() {
    let size = CanvasSize::clamped(10.0, 10_000.0);
    assert_eq!(size.width, MIN_CANVAS_WIDTH);
    assert_eq!(size.height, 10_000.0);
}

#[test]
fn canvas_size_clamped_keeps_normal() {
    let size = CanvasSize::clamped(600.0, 800.0);
    assert_eq!(size, CanvasSize { width: 600.0, height: 800.0 });
}

// --- angle_deg ---

#[test]
fn angle_deg_cardinal_directions() {
    let c = Point::new(100.0, 100.0);
    assert!(approx_eq(angle_deg(c, Point::new(200.0, 100.0)), 0.0));
    assert!(approx_eq(angle_deg(c, Point::new(100.0, 200.0)), 90.0));
    assert!(approx_eq(angle_deg(c, Point::new(0.0, 100.0)), 180.0));
    assert!(approx_eq(angle_deg(c, Point::new(100.0, 0.0)), -90.0));
}

// --- clamping ---

#[test]
fn clamp_axis_inside_is_identity() {
    assert_eq!(clamp_axis(50.0, 132.0, 600.0), 50.0);
}

#[test]
fn clamp_axis_negative_goes_to_zero() {
    assert_eq!(clamp_axis(-20.0, 132.0, 600.0), 0.0);
}

#[test]
fn clamp_axis_overflow_goes_to_edge() {
    assert_eq!(clamp_axis(590.0, 132.0, 600.0), 468.0);
}

#[test]
fn clamp_axis_never_negative_on_tiny_canvas() {
    assert_eq!(clamp_axis(10.0, 132.0, 100.0), 0.0);
}

#[test]
fn centered_clamped_subtracts_half_extent() {
    let canvas = CanvasSize { width: 600.0, height: 800.0 };
    let p = centered_clamped(Point::new(300.0, 400.0), 132.0, canvas);
    assert_eq!(p, Point::new(234.0, 334.0));
}
