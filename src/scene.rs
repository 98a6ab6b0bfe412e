//! The desk scene.
//!
//! [`SceneRenderer`] owns the box mesh, the placement list and the two
//! lights. `render` pushes the lights once and then draws the box once per
//! placement with that placement's model matrix and colour.

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::{
    data_structures::{
        light::{DESK_LIGHTS, LIGHT_COUNT, LIGHT_UNIFORMS, Light},
        mesh::{BoxMesh, TextureState},
        placement::{Placement, desk_placements},
    },
    graphics::{GraphicsContext, ShaderProgram, UniformValue, set_uniform_by_name},
    resources::ImageDecoder,
};

/// Texture unit the shared box texture is sampled from.
const OBJECT_TEXTURE_UNIT: i32 = 0;

#[derive(Debug)]
pub struct SceneRenderer<S> {
    shader: S,
    mesh: BoxMesh,
    placements: Vec<Placement>,
    lights: [Light; LIGHT_COUNT],
}

impl<S: ShaderProgram> SceneRenderer<S> {
    pub fn new(shader: S, texture_path: impl Into<PathBuf>) -> Self {
        Self {
            shader,
            mesh: BoxMesh::new(texture_path),
            placements: desk_placements(),
            lights: DESK_LIGHTS,
        }
    }

    /// Loads the mesh. Must happen before the first [`render`](Self::render).
    pub fn prepare<G, D>(&mut self, gfx: &mut G, decoder: &D) -> Result<TextureState>
    where
        G: GraphicsContext + ?Sized,
        D: ImageDecoder + ?Sized,
    {
        self.mesh.load(gfx, decoder)
    }

    pub fn render<G>(&self, gfx: &mut G) -> Result<()>
    where
        G: GraphicsContext + ?Sized,
    {
        for (light, (position, color)) in self.lights.iter().zip(LIGHT_UNIFORMS) {
            set_uniform_by_name(gfx, &self.shader, position, light.position.into());
            set_uniform_by_name(gfx, &self.shader, color, light.color.into());
        }
        set_uniform_by_name(gfx, &self.shader, "bUseLighting", UniformValue::Bool(true));
        set_uniform_by_name(
            gfx,
            &self.shader,
            "objectTexture",
            UniformValue::Int(OBJECT_TEXTURE_UNIT),
        );

        for placement in &self.placements {
            set_uniform_by_name(gfx, &self.shader, "model", placement.to_matrix().into());
            set_uniform_by_name(gfx, &self.shader, "objectColor", UniformValue::Vec4(placement.color));
            set_uniform_by_name(
                gfx,
                &self.shader,
                "bUseTexture",
                UniformValue::Bool(placement.textured),
            );
            self.mesh
                .draw(gfx)
                .with_context(|| format!("failed to draw {}", placement.name))?;
        }
        Ok(())
    }

    pub fn release<G>(&mut self, gfx: &mut G)
    where
        G: GraphicsContext + ?Sized,
    {
        self.mesh.release(gfx);
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn lights(&self) -> &[Light; LIGHT_COUNT] {
        &self.lights
    }

    pub fn shader(&self) -> &S {
        &self.shader
    }

    pub fn mesh(&self) -> &BoxMesh {
        &self.mesh
    }
}
