//! Fixed viewpoint onto the desk.
//!
//! [`Camera`] is a position plus yaw/pitch, [`Projection`] a perspective
//! frustum that follows the surface size. [`push_camera`] hands both to the
//! shader as the `view`, `projection` and `viewPosition` uniforms.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};

use crate::graphics::{GraphicsContext, ShaderProgram, set_uniform_by_name};

/// cgmath produces OpenGL clip space (z in -1..1), wgpu expects 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub position: Point3<f32>,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl Camera {
    pub fn new<V: Into<Point3<f32>>, Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(
        position: V,
        yaw: Y,
        pitch: P,
    ) -> Self {
        Self {
            position: position.into(),
            yaw: yaw.into(),
            pitch: pitch.into(),
        }
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vector3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        Vector3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw).normalize()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.position, self.forward(), Vector3::unit_y())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Pushes `view`, `projection` and `viewPosition`.
pub fn push_camera<G, S>(gfx: &mut G, shader: &S, camera: &Camera, projection: &Projection)
where
    G: GraphicsContext + ?Sized,
    S: ShaderProgram + ?Sized,
{
    set_uniform_by_name(gfx, shader, "view", camera.view_matrix().into());
    set_uniform_by_name(gfx, shader, "projection", projection.matrix().into());
    let position: [f32; 3] = camera.position.into();
    set_uniform_by_name(gfx, shader, "viewPosition", crate::graphics::UniformValue::Vec3(position));
}
