use cgmath::{Deg, InnerSpace};
use desk_scene::{
    SceneConfig, UniformValue,
    camera::{Camera, Projection, push_camera},
};

use crate::common::test_utils::{FakeShader, RecordingGraphics, approx_eq};

mod common;

#[test]
fn should_follow_surface_aspect_on_resize() {
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 100.0);
    assert!(approx_eq(projection.aspect(), 800.0 / 600.0));

    projection.resize(1920, 1080);
    assert!(approx_eq(projection.aspect(), 16.0 / 9.0));

    projection.resize(300, 600);
    assert!(approx_eq(projection.aspect(), 0.5));
}

#[test]
fn should_keep_aspect_finite_for_zero_sized_surfaces() {
    let mut projection = Projection::new(640, 0, Deg(45.0), 0.1, 100.0);
    assert!(approx_eq(projection.aspect(), 640.0));

    projection.resize(0, 0);
    assert!(approx_eq(projection.aspect(), 1.0));
    assert!(
        Into::<[[f32; 4]; 4]>::into(projection.matrix())
            .iter()
            .flatten()
            .all(|v| v.is_finite())
    );
}

#[test]
fn should_build_projection_from_config() {
    let config = SceneConfig::default();
    let projection = config.projection(1024, 512);

    assert!(approx_eq(projection.aspect(), 2.0));
}

#[test]
fn should_look_along_negative_z_at_default_yaw() {
    let camera = Camera::new([0.0, 4.5, 7.0], Deg(-90.0), Deg(0.0));
    let forward = camera.forward();

    assert!(approx_eq(forward.magnitude(), 1.0));
    assert!(approx_eq(forward.x, 0.0));
    assert!(approx_eq(forward.y, 0.0));
    assert!(approx_eq(forward.z, -1.0));
}

#[test]
fn should_push_view_projection_and_position() {
    let mut gfx = RecordingGraphics::new();
    let shader = FakeShader::new(gfx.handles());
    let config = SceneConfig::default();
    let camera = config.camera();
    let projection = config.projection(800, 600);

    push_camera(&mut gfx, &shader, &camera, &projection);

    let pushed = gfx.uniforms(&shader);
    let names: Vec<&str> = pushed.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, ["view", "projection", "viewPosition"]);
    assert_eq!(pushed[1].1, UniformValue::from(projection.matrix()));
    assert_eq!(pushed[2].1, UniformValue::Vec3(config.camera_position));
}
