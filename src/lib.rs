//! desk-scene
//!
//! Renders a static desk (tabletop, four legs, monitor stand, monitor,
//! keyboard and mouse) from a single shared unit-cube mesh. Every object is
//! one draw of that cube with its own model transform and colour, lit by two
//! fixed white point lights.
//!
//! High-level modules
//! - `graphics`: the explicit-state graphics context the scene draws through
//! - `render`: wgpu implementation of that context
//! - `pipelines`: the scene shader, its uniform block and render pipeline
//! - `data_structures`: box mesh, placements, lights and GPU textures
//! - `scene`: the renderer that sequences uniforms and draws per frame
//! - `resources`: image decoding and asset paths
//! - `camera`, `config`, `context`, `flow`: the demo application around it
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod graphics;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use config::SceneConfig;
pub use data_structures::{
    light::Light,
    mesh::{BoxMesh, TextureState},
    placement::{Placement, desk_placements},
};
pub use graphics::{GraphicsContext, ShaderProgram, UniformValue};
pub use scene::SceneRenderer;
