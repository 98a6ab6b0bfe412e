//! The shared unit-cube mesh.
//!
//! Every object in the scene is this one box, scaled and moved by its
//! placement. [`BoxMesh`] owns the vertex array, vertex buffer, index buffer
//! and texture as a single unit: they are allocated together by
//! [`BoxMesh::load`] and released together by [`BoxMesh::release`].

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

use crate::{
    graphics::{BufferId, BufferKind, GraphicsContext, TextureId, VertexArrayId, VertexAttribute},
    resources::ImageDecoder,
};

/// Corners of a unit cube centered at the origin.
pub const BOX_VERTICES: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5], // bottom-left-back
    [0.5, -0.5, -0.5],  // bottom-right-back
    [0.5, 0.5, -0.5],   // top-right-back
    [-0.5, 0.5, -0.5],  // top-left-back
    [-0.5, -0.5, 0.5],  // bottom-left-front
    [0.5, -0.5, 0.5],   // bottom-right-front
    [0.5, 0.5, 0.5],    // top-right-front
    [-0.5, 0.5, 0.5],   // top-left-front
];

/// Two triangles per face. Windings are mixed, so the pipeline draws both sides.
#[rustfmt::skip]
pub const BOX_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 0, // back
    4, 5, 6, 6, 7, 4, // front
    0, 1, 5, 5, 4, 0, // bottom
    2, 3, 7, 7, 6, 2, // top
    0, 3, 7, 7, 4, 0, // left
    1, 2, 6, 6, 5, 1, // right
];

pub const BOX_INDEX_COUNT: u32 = BOX_INDICES.len() as u32;

/// Attribute 0: three floats of position, tightly packed.
pub const POSITION_ATTRIBUTE: VertexAttribute = VertexAttribute {
    location: 0,
    components: 3,
    stride: 3 * std::mem::size_of::<f32>() as u64,
    offset: 0,
};

/// What ended up in the box texture after loading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureState {
    Uploaded { width: u32, height: u32 },
    /// Allocated but without pixels; sampling yields black.
    Empty,
}

#[derive(Debug)]
struct MeshHandles {
    vertex_array: VertexArrayId,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    texture: TextureId,
    texture_state: TextureState,
}

/// A handle created during a load that has not finished yet.
enum Allocated {
    VertexArray(VertexArrayId),
    Buffer(BufferId),
    Texture(TextureId),
}

impl Allocated {
    fn delete<G>(self, gfx: &mut G)
    where
        G: GraphicsContext + ?Sized,
    {
        match self {
            Allocated::VertexArray(id) => gfx.delete_vertex_array(id),
            Allocated::Buffer(id) => gfx.delete_buffer(id),
            Allocated::Texture(id) => gfx.delete_texture(id),
        }
    }
}

#[derive(Debug)]
pub struct BoxMesh {
    texture_path: PathBuf,
    handles: Option<MeshHandles>,
}

impl BoxMesh {
    pub fn new(texture_path: impl Into<PathBuf>) -> Self {
        Self {
            texture_path: texture_path.into(),
            handles: None,
        }
    }

    pub fn texture_path(&self) -> &Path {
        &self.texture_path
    }

    pub fn is_loaded(&self) -> bool {
        self.handles.is_some()
    }

    /// `None` until loaded.
    pub fn texture_state(&self) -> Option<TextureState> {
        self.handles.as_ref().map(|h| h.texture_state)
    }

    /// Uploads the cube geometry and the surface texture.
    ///
    /// A texture that cannot be decoded or uploaded is logged and left empty;
    /// the mesh still loads. Calling this on a loaded mesh does nothing.
    /// If the geometry cannot be set up, everything created so far is deleted
    /// again and the mesh stays unloaded.
    pub fn load<G, D>(&mut self, gfx: &mut G, decoder: &D) -> Result<TextureState>
    where
        G: GraphicsContext + ?Sized,
        D: ImageDecoder + ?Sized,
    {
        if let Some(handles) = &self.handles {
            log::debug!("box mesh already loaded, keeping {:?}", handles.vertex_array);
            return Ok(handles.texture_state);
        }

        let mut created = Vec::new();
        let (vertex_array, vertex_buffer, index_buffer, texture) =
            match Self::allocate(gfx, &mut created) {
                Ok(handles) => handles,
                Err(e) => {
                    for allocated in created.into_iter().rev() {
                        allocated.delete(gfx);
                    }
                    return Err(e);
                }
            };

        gfx.bind_texture(Some(texture));
        let texture_state = match self.upload_texture(gfx, decoder, texture) {
            Ok(state) => state,
            Err(e) => {
                log::error!("Failed to load texture {}: {e:#}", self.texture_path.display());
                TextureState::Empty
            }
        };

        log::info!(
            "box mesh loaded: {} vertices, {} indices, texture {:?}",
            BOX_VERTICES.len(),
            BOX_INDEX_COUNT,
            texture_state
        );
        self.handles = Some(MeshHandles {
            vertex_array,
            vertex_buffer,
            index_buffer,
            texture,
            texture_state,
        });
        Ok(texture_state)
    }

    /// Creates the geometry and an empty texture, recording each handle in
    /// `created` as soon as it exists.
    fn allocate<G>(
        gfx: &mut G,
        created: &mut Vec<Allocated>,
    ) -> Result<(VertexArrayId, BufferId, BufferId, TextureId)>
    where
        G: GraphicsContext + ?Sized,
    {
        let vertex_array = gfx.create_vertex_array()?;
        created.push(Allocated::VertexArray(vertex_array));
        let vertex_buffer =
            gfx.create_buffer(BufferKind::Vertex, bytemuck::cast_slice(&BOX_VERTICES))?;
        created.push(Allocated::Buffer(vertex_buffer));
        gfx.set_vertex_attribute(vertex_array, vertex_buffer, POSITION_ATTRIBUTE)
            .context("failed to describe box vertex positions")?;

        let index_buffer =
            gfx.create_buffer(BufferKind::Index, bytemuck::cast_slice(&BOX_INDICES))?;
        created.push(Allocated::Buffer(index_buffer));
        gfx.set_index_buffer(vertex_array, index_buffer)
            .context("failed to attach box indices")?;

        let texture = gfx.create_texture()?;
        created.push(Allocated::Texture(texture));
        Ok((vertex_array, vertex_buffer, index_buffer, texture))
    }

    fn upload_texture<G, D>(&self, gfx: &mut G, decoder: &D, texture: TextureId) -> Result<TextureState>
    where
        G: GraphicsContext + ?Sized,
        D: ImageDecoder + ?Sized,
    {
        let image = decoder.decode(&self.texture_path)?;
        if !image.is_rgb() {
            bail!(
                "expected {}x{} RGB pixels, got {} channels and {} bytes",
                image.width,
                image.height,
                image.channels,
                image.pixels.len()
            );
        }
        gfx.upload_texture_rgb(texture, image.width, image.height, &image.pixels)?;
        gfx.generate_mipmaps(texture)?;
        Ok(TextureState::Uploaded {
            width: image.width,
            height: image.height,
        })
    }

    /// Draws the whole box with the texture and vertex array bound.
    ///
    /// Leaves the texture bound and the vertex array unbound.
    pub fn draw<G>(&self, gfx: &mut G) -> Result<()>
    where
        G: GraphicsContext + ?Sized,
    {
        let Some(handles) = &self.handles else {
            bail!("box mesh drawn before it was loaded");
        };
        gfx.bind_texture(Some(handles.texture));
        gfx.bind_vertex_array(Some(handles.vertex_array));
        let drawn = gfx.draw_triangles(BOX_INDEX_COUNT);
        gfx.bind_vertex_array(None);
        drawn
    }

    /// Frees all GPU objects. Safe to call on an unloaded mesh.
    pub fn release<G>(&mut self, gfx: &mut G)
    where
        G: GraphicsContext + ?Sized,
    {
        if let Some(handles) = self.handles.take() {
            gfx.delete_vertex_array(handles.vertex_array);
            gfx.delete_buffer(handles.vertex_buffer);
            gfx.delete_buffer(handles.index_buffer);
            gfx.delete_texture(handles.texture);
            log::debug!("box mesh released");
        }
    }
}

impl Drop for BoxMesh {
    fn drop(&mut self) {
        if let Some(handles) = &self.handles {
            log::warn!(
                "box mesh dropped without release, {:?} lives until the graphics context goes",
                handles.vertex_array
            );
        }
    }
}
