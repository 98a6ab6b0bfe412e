use cgmath::Vector3;

/// A point light as seen by the scene shader.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
}

impl Light {
    pub const fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self {
            position: Vector3 {
                x: position[0],
                y: position[1],
                z: position[2],
            },
            color: Vector3 {
                x: color[0],
                y: color[1],
                z: color[2],
            },
        }
    }
}

pub const LIGHT_COUNT: usize = 2;

/// Uniform names for each light slot, as `(position, color)`.
pub const LIGHT_UNIFORMS: [(&str, &str); LIGHT_COUNT] = [
    ("lightPos1", "lightColor1"),
    ("lightPos2", "lightColor2"),
];

/// Back light and overhead light, both white.
pub const DESK_LIGHTS: [Light; LIGHT_COUNT] = [
    Light::new([0.0, 5.0, -5.0], [1.0, 1.0, 1.0]),
    Light::new([0.0, 10.0, 0.0], [1.0, 1.0, 1.0]),
];
