//! Graphics context abstraction.
//!
//! The scene code never touches wgpu directly. Every GPU state change goes
//! through [`GraphicsContext`], where binding and unbinding are explicit calls
//! and vertex/index buffers are attached to a vertex array by handle instead
//! of through ambient bind points. This keeps the draw sequence observable:
//! the engine ships [`crate::render::WgpuGraphics`] for real rendering, tests
//! plug in a recorder.
//!
//! # Key types
//!
//! - [`GraphicsContext`] is the sink for resource creation, binds, uniforms and draws
//! - [`ShaderProgram`] resolves uniform names to [`UniformLocation`]s
//! - [`HandleAllocator`] hands out the non-zero handle ids used by both

use std::num::NonZeroU32;

use anyhow::{Result, anyhow};

macro_rules! gpu_handle {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            pub fn get(self) -> u32 {
                self.0.get()
            }
        }
    };
}

gpu_handle!(
    /// A vertex array: one vertex buffer with its attribute layout plus one index buffer.
    VertexArrayId
);
gpu_handle!(
    /// A vertex or index buffer.
    BufferId
);
gpu_handle!(
    /// A 2D texture.
    TextureId
);
gpu_handle!(
    /// The linked shader program uniforms are resolved against.
    ProgramHandle
);

/// Resolved uniform slot. Only meaningful for the program that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Monotonic source of handle ids. Zero is never handed out.
#[derive(Debug)]
pub struct HandleAllocator {
    /// `None` once `u32::MAX` has been handed out.
    next: Option<NonZeroU32>,
}

impl HandleAllocator {
    pub fn new() -> Self {
        Self::starting_at(NonZeroU32::MIN)
    }

    /// An allocator whose first handle is `first`.
    pub fn starting_at(first: NonZeroU32) -> Self {
        Self { next: Some(first) }
    }

    fn bump(&mut self) -> Result<NonZeroU32> {
        let id = self
            .next
            .ok_or_else(|| anyhow!("GPU handle space exhausted"))?;
        self.next = id.checked_add(1);
        Ok(id)
    }

    pub fn vertex_array(&mut self) -> Result<VertexArrayId> {
        self.bump().map(VertexArrayId)
    }

    pub fn buffer(&mut self) -> Result<BufferId> {
        self.bump().map(BufferId)
    }

    pub fn texture(&mut self) -> Result<TextureId> {
        self.bump().map(TextureId)
    }

    pub fn program(&mut self) -> Result<ProgramHandle> {
        self.bump().map(ProgramHandle)
    }
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Float vertex attribute read from a tightly described vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components (1 to 4).
    pub components: u32,
    /// Distance between consecutive vertices in bytes.
    pub stride: u64,
    pub offset: u64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    /// Column-major 4x4 matrix.
    Mat4([[f32; 4]; 4]),
    Vec4([f32; 4]),
    Vec3([f32; 3]),
    Int(i32),
    Bool(bool),
}

impl From<cgmath::Matrix4<f32>> for UniformValue {
    fn from(m: cgmath::Matrix4<f32>) -> Self {
        UniformValue::Mat4(m.into())
    }
}

impl From<cgmath::Vector3<f32>> for UniformValue {
    fn from(v: cgmath::Vector3<f32>) -> Self {
        UniformValue::Vec3(v.into())
    }
}

impl From<cgmath::Vector4<f32>> for UniformValue {
    fn from(v: cgmath::Vector4<f32>) -> Self {
        UniformValue::Vec4(v.into())
    }
}

/// A linked shader program with named uniforms.
pub trait ShaderProgram {
    fn handle(&self) -> ProgramHandle;

    /// `None` when the program has no active uniform of that name.
    fn uniform_location(&self, name: &str) -> Option<UniformLocation>;
}

impl<S: ShaderProgram + ?Sized> ShaderProgram for &S {
    fn handle(&self) -> ProgramHandle {
        (**self).handle()
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        (**self).uniform_location(name)
    }
}

/// Explicit, handle-based GPU command sink.
///
/// Resource creation fails only when the context runs out of handles; calls
/// that reference a handle fail when the handle is unknown to the context. Bind state set through
/// [`bind_texture`](Self::bind_texture) and
/// [`bind_vertex_array`](Self::bind_vertex_array) persists until the next bind
/// call and is shared by everyone drawing through the same context.
pub trait GraphicsContext {
    fn create_vertex_array(&mut self) -> Result<VertexArrayId>;

    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> Result<BufferId>;

    /// Reads `attribute` of the vertex array from `buffer`.
    fn set_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayId,
        buffer: BufferId,
        attribute: VertexAttribute,
    ) -> Result<()>;

    /// Attaches a `u32` index buffer to the vertex array.
    fn set_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId) -> Result<()>;

    /// Allocates a texture without any pixel storage uploaded.
    fn create_texture(&mut self) -> Result<TextureId>;

    /// Uploads tightly packed 8-bit RGB pixels as mip level 0.
    fn upload_texture_rgb(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<()>;

    /// Fills every mip level below 0 from the uploaded base level.
    fn generate_mipmaps(&mut self, texture: TextureId) -> Result<()>;

    fn bind_texture(&mut self, texture: Option<TextureId>);

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>);

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Indexed triangle-list draw of the bound vertex array.
    fn draw_triangles(&mut self, index_count: u32) -> Result<()>;

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);

    fn delete_buffer(&mut self, buffer: BufferId);

    fn delete_texture(&mut self, texture: TextureId);
}

/// Resolves `name` against `shader` and pushes `value`.
///
/// Returns `false` when the program has no such uniform; the value is dropped
/// the same way GL ignores location -1.
pub fn set_uniform_by_name<G, S>(gfx: &mut G, shader: &S, name: &str, value: UniformValue) -> bool
where
    G: GraphicsContext + ?Sized,
    S: ShaderProgram + ?Sized,
{
    match shader.uniform_location(name) {
        Some(location) => {
            gfx.set_uniform(location, value);
            true
        }
        None => {
            log::trace!(
                "program {:?} has no uniform named {name}, value dropped",
                shader.handle()
            );
            false
        }
    }
}
