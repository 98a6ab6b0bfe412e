//! Object placements for the shared box mesh.
//!
//! A placement describes one draw of the unit cube: how it is scaled,
//! rotated and moved into the world, and what color it is shaded with.

use cgmath::{Deg, Matrix4, Vector3};

/// One draw of the unit cube: scale, rotation, translation and material.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub name: &'static str,
    pub scale: Vector3<f32>,
    /// Rotation about the x, y and z axes in degrees.
    pub rotation: [f32; 3],
    pub position: Vector3<f32>,
    pub color: [f32; 4],
    /// Sample the shared texture instead of using `color`.
    pub textured: bool,
}

impl Placement {
    /// An untextured, unrotated placement.
    pub fn new(
        name: &'static str,
        scale: [f32; 3],
        position: [f32; 3],
        color: [f32; 4],
    ) -> Self {
        Self {
            name,
            scale: scale.into(),
            rotation: [0.0; 3],
            position: position.into(),
            color,
            textured: false,
        }
    }

    pub fn with_rotation(mut self, x_degrees: f32, y_degrees: f32, z_degrees: f32) -> Self {
        self.rotation = [x_degrees, y_degrees, z_degrees];
        self
    }

    pub fn with_texture(mut self) -> Self {
        self.textured = true;
        self
    }

    /// `T * Rz * Ry * Rx * S`: scale first, then rotate about x, y, z, then translate.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let [x, y, z] = self.rotation;
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_z(Deg(z))
            * Matrix4::from_angle_y(Deg(y))
            * Matrix4::from_angle_x(Deg(x))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// The desk arrangement, in draw order.
pub fn desk_placements() -> Vec<Placement> {
    let leg = [0.2, 1.0, 0.2];
    vec![
        Placement::new("tabletop", [5.0, 0.1, 3.0], [0.0, 1.5, 0.0], BLACK),
        Placement::new("leg back-left", leg, [-2.0, 0.5, -1.0], BLACK),
        Placement::new("leg back-right", leg, [2.0, 0.5, -1.0], BLACK),
        Placement::new("leg front-left", leg, [-2.0, 0.5, 1.0], BLACK),
        Placement::new("leg front-right", leg, [2.0, 0.5, 1.0], BLACK),
        Placement::new(
            "monitor stand",
            [0.3, 0.1, 0.3],
            [0.0, 2.5, 0.0],
            [0.3, 0.3, 0.3, 1.0],
        ),
        Placement::new("monitor", [1.0, 0.6, 0.1], [0.0, 3.2, 0.0], BLACK),
        Placement::new(
            "keyboard",
            [1.0, 0.1, 0.5],
            [0.0, 1.0, 0.0],
            [0.2, 0.2, 0.2, 1.0],
        ),
        // Sits next to the keyboard
        Placement::new(
            "mouse",
            [0.1, 0.1, 0.2],
            [0.4, 0.9, 0.0],
            [0.1, 0.1, 0.1, 1.0],
        ),
    ]
}
