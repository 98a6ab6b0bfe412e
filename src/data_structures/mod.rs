//! Scene data: the shared box mesh, object placements, lights and GPU textures.
//!
//! - `mesh` owns the unit cube's vertex array, buffers and texture
//! - `placement` describes one draw of the cube and lists the desk arrangement
//! - `light` holds the two fixed point lights
//! - `texture` wraps wgpu textures, the depth buffer and mip chains

pub mod light;
pub mod mesh;
pub mod placement;
pub mod texture;
