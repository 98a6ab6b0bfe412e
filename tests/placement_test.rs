use cgmath::{Point3, Transform, Vector3, Vector4};
use desk_scene::{Placement, desk_placements};

use crate::common::test_utils::approx_eq;

mod common;

fn transform(placement: &Placement, point: [f32; 3]) -> [f32; 3] {
    let p = placement.to_matrix() * Vector4::new(point[0], point[1], point[2], 1.0);
    [p.x, p.y, p.z]
}

fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!(approx_eq(*a, e), "{actual:?} != {expected:?}");
    }
}

#[test]
fn should_scale_then_translate_corner() {
    let placement = Placement::new(
        "tabletop",
        [5.0, 0.1, 3.0],
        [0.0, 1.5, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    );

    assert_close(transform(&placement, [0.5, 0.5, 0.5]), [2.5, 1.55, 1.5]);
    assert_close(transform(&placement, [-0.5, -0.5, -0.5]), [-2.5, 1.45, -1.5]);
}

#[test]
fn should_map_every_desk_corner_by_scale_and_position() {
    for placement in desk_placements() {
        let expected = [
            placement.position.x + 0.5 * placement.scale.x,
            placement.position.y + 0.5 * placement.scale.y,
            placement.position.z + 0.5 * placement.scale.z,
        ];
        assert_close(transform(&placement, [0.5, 0.5, 0.5]), expected);
    }
}

#[test]
fn should_rotate_z_before_translation() {
    let placement = Placement::new("probe", [1.0; 3], [0.0; 3], [1.0; 4]).with_rotation(0.0, 0.0, 90.0);

    let x = placement.to_matrix().transform_vector(Vector3::unit_x());
    assert_close([x.x, x.y, x.z], [0.0, 1.0, 0.0]);
}

#[test]
fn should_compose_rotations_as_z_y_x() {
    // x first: +Y goes to +Z, then y: +Z goes to +X
    let placement = Placement::new("probe", [1.0; 3], [0.0; 3], [1.0; 4]).with_rotation(90.0, 90.0, 0.0);

    let y = placement.to_matrix().transform_vector(Vector3::unit_y());
    assert_close([y.x, y.y, y.z], [1.0, 0.0, 0.0]);
}

#[test]
fn should_scale_before_rotating() {
    let placement = Placement::new("probe", [2.0, 1.0, 1.0], [1.0, 0.0, 0.0], [1.0; 4])
        .with_rotation(0.0, 0.0, 90.0);

    let p = placement.to_matrix().transform_point(Point3::new(0.5, 0.0, 0.0));
    assert_close([p.x, p.y, p.z], [1.0, 1.0, 0.0]);
}

#[test]
fn should_list_desk_in_draw_order() {
    let placements = desk_placements();

    assert_eq!(placements.len(), 9);
    assert_eq!(placements[0].name, "tabletop");
    assert_eq!(placements[8].name, "mouse");
    assert!(placements.iter().all(|p| p.rotation == [0.0; 3] && !p.textured));

    let legs: Vec<_> = placements[1..5].iter().map(|p| p.position).collect();
    assert_eq!(
        legs,
        [
            Vector3::new(-2.0, 0.5, -1.0),
            Vector3::new(2.0, 0.5, -1.0),
            Vector3::new(-2.0, 0.5, 1.0),
            Vector3::new(2.0, 0.5, 1.0),
        ]
    );
    assert_eq!(placements[6].scale, Vector3::new(1.0, 0.6, 0.1));
    assert_eq!(placements[7].color, [0.2, 0.2, 0.2, 1.0]);
}

#[test]
fn should_flag_textured_placements() {
    let placement = Placement::new("probe", [1.0; 3], [0.0; 3], [1.0; 4]).with_texture();

    assert!(placement.textured);
}
