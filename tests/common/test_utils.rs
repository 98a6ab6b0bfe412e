#![allow(dead_code)]

use std::{collections::HashMap, path::Path};

use desk_scene::{
    graphics::{
        BufferId, BufferKind, GraphicsContext, HandleAllocator, ProgramHandle, ShaderProgram,
        TextureId, UniformLocation, UniformValue, VertexArrayId, VertexAttribute,
    },
    resources::{DecodedImage, ImageDecoder},
};

/// One call made against [`RecordingGraphics`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    CreateVertexArray(VertexArrayId),
    CreateBuffer(BufferId, BufferKind),
    SetVertexAttribute(VertexArrayId, BufferId, VertexAttribute),
    SetIndexBuffer(VertexArrayId, BufferId),
    CreateTexture(TextureId),
    UploadTexture {
        texture: TextureId,
        width: u32,
        height: u32,
    },
    GenerateMipmaps(TextureId),
    BindTexture(Option<TextureId>),
    BindVertexArray(Option<VertexArrayId>),
    SetUniform(UniformLocation, UniformValue),
    Draw {
        vertex_array: VertexArrayId,
        texture: Option<TextureId>,
        index_count: u32,
    },
    DeleteVertexArray(VertexArrayId),
    DeleteBuffer(BufferId),
    DeleteTexture(TextureId),
}

/// A graphics context that keeps every call and buffer upload for inspection.
pub(crate) struct RecordingGraphics {
    handles: HandleAllocator,
    pub(crate) calls: Vec<Call>,
    buffers: HashMap<BufferId, (BufferKind, Vec<u8>)>,
    bound_texture: Option<TextureId>,
    bound_vertex_array: Option<VertexArrayId>,
    /// Makes `upload_texture_rgb` fail.
    pub(crate) fail_uploads: bool,
    /// Makes `set_index_buffer` fail.
    pub(crate) fail_index_buffer: bool,
}

impl RecordingGraphics {
    pub(crate) fn new() -> Self {
        Self::with_handles(HandleAllocator::new())
    }

    /// A context drawing its handles from `handles`.
    pub(crate) fn with_handles(handles: HandleAllocator) -> Self {
        Self {
            handles,
            calls: Vec::new(),
            buffers: HashMap::new(),
            bound_texture: None,
            bound_vertex_array: None,
            fail_uploads: false,
            fail_index_buffer: false,
        }
    }

    /// Allocator shared with fake shaders so their handles never collide.
    pub(crate) fn handles(&mut self) -> &mut HandleAllocator {
        &mut self.handles
    }

    pub(crate) fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Contents of the only live buffer of `kind`.
    pub(crate) fn buffer_contents(&self, kind: BufferKind) -> &[u8] {
        let mut matching = self.buffers.values().filter(|(k, _)| *k == kind);
        let (_, bytes) = matching.next().expect("no buffer of that kind");
        assert!(matching.next().is_none(), "more than one {kind:?} buffer");
        bytes
    }

    /// The vertex buffer read back as `f32`s.
    pub(crate) fn vertex_floats(&self) -> Vec<f32> {
        self.buffer_contents(BufferKind::Vertex)
            .chunks_exact(4)
            .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    /// The index buffer read back as `u32`s.
    pub(crate) fn indices(&self) -> Vec<u32> {
        self.buffer_contents(BufferKind::Index)
            .chunks_exact(4)
            .map(|b| u32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    pub(crate) fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub(crate) fn draws(&self) -> Vec<&Call> {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Draw { .. }))
            .collect()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// Uniform pushes in call order, resolved back to names through `shader`.
    pub(crate) fn uniforms<'s>(&self, shader: &'s FakeShader) -> Vec<(&'s str, UniformValue)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetUniform(location, value) => Some((shader.name_of(*location), *value)),
                _ => None,
            })
            .collect()
    }
}

impl GraphicsContext for RecordingGraphics {
    fn create_vertex_array(&mut self) -> anyhow::Result<VertexArrayId> {
        let id = self.handles.vertex_array()?;
        self.calls.push(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> anyhow::Result<BufferId> {
        let id = self.handles.buffer()?;
        self.buffers.insert(id, (kind, contents.to_vec()));
        self.calls.push(Call::CreateBuffer(id, kind));
        Ok(id)
    }

    fn set_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayId,
        buffer: BufferId,
        attribute: VertexAttribute,
    ) -> anyhow::Result<()> {
        self.calls
            .push(Call::SetVertexAttribute(vertex_array, buffer, attribute));
        Ok(())
    }

    fn set_index_buffer(
        &mut self,
        vertex_array: VertexArrayId,
        buffer: BufferId,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(!self.fail_index_buffer, "index buffer rejected by test");
        self.calls.push(Call::SetIndexBuffer(vertex_array, buffer));
        Ok(())
    }

    fn create_texture(&mut self) -> anyhow::Result<TextureId> {
        let id = self.handles.texture()?;
        self.calls.push(Call::CreateTexture(id));
        Ok(id)
    }

    fn upload_texture_rgb(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> anyhow::Result<()> {
        anyhow::ensure!(!self.fail_uploads, "upload rejected by test");
        anyhow::ensure!(pixels.len() == (width * height * 3) as usize, "bad pixel count");
        self.calls.push(Call::UploadTexture {
            texture,
            width,
            height,
        });
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: TextureId) -> anyhow::Result<()> {
        self.calls.push(Call::GenerateMipmaps(texture));
        Ok(())
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.bound_texture = texture;
        self.calls.push(Call::BindTexture(texture));
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.bound_vertex_array = vertex_array;
        self.calls.push(Call::BindVertexArray(vertex_array));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.calls.push(Call::SetUniform(location, value));
    }

    fn draw_triangles(&mut self, index_count: u32) -> anyhow::Result<()> {
        let Some(vertex_array) = self.bound_vertex_array else {
            anyhow::bail!("draw with no vertex array bound");
        };
        self.calls.push(Call::Draw {
            vertex_array,
            texture: self.bound_texture,
            index_count,
        });
        Ok(())
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.calls.push(Call::DeleteVertexArray(vertex_array));
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.calls.push(Call::DeleteBuffer(buffer));
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.calls.push(Call::DeleteTexture(texture));
    }
}

/// Every uniform the desk scene pushes.
pub(crate) const SCENE_UNIFORMS: [&str; 12] = [
    "model",
    "view",
    "projection",
    "viewPosition",
    "objectColor",
    "objectTexture",
    "bUseTexture",
    "bUseLighting",
    "lightPos1",
    "lightPos2",
    "lightColor1",
    "lightColor2",
];

/// Shader that resolves a fixed list of names to their index.
pub(crate) struct FakeShader {
    handle: ProgramHandle,
    names: Vec<&'static str>,
}

impl FakeShader {
    pub(crate) fn new(handles: &mut HandleAllocator) -> Self {
        Self::with_names(handles, &SCENE_UNIFORMS)
    }

    pub(crate) fn with_names(handles: &mut HandleAllocator, names: &[&'static str]) -> Self {
        Self {
            handle: handles.program().expect("program handle"),
            names: names.to_vec(),
        }
    }

    pub(crate) fn name_of(&self, location: UniformLocation) -> &'static str {
        self.names[location.0 as usize]
    }
}

impl ShaderProgram for FakeShader {
    fn handle(&self) -> ProgramHandle {
        self.handle
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| UniformLocation(i as u32))
    }
}

pub(crate) struct FailingDecoder;

impl ImageDecoder for FailingDecoder {
    fn decode(&self, path: &Path) -> anyhow::Result<DecodedImage> {
        anyhow::bail!("no such file {}", path.display())
    }
}

/// Produces a single-colour image with `channels` bytes per pixel.
pub(crate) struct SolidDecoder {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) channels: u8,
}

impl SolidDecoder {
    pub(crate) fn rgb(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: 3,
        }
    }
}

impl ImageDecoder for SolidDecoder {
    fn decode(&self, _: &Path) -> anyhow::Result<DecodedImage> {
        let len = self.width as usize * self.height as usize * self.channels as usize;
        Ok(DecodedImage {
            width: self.width,
            height: self.height,
            channels: self.channels,
            pixels: vec![128; len],
        })
    }
}

pub(crate) fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

/// Device and queue on whatever adapter wgpu picks by default.
#[cfg(feature = "integration-tests")]
pub(crate) async fn headless_device() -> anyhow::Result<(wgpu::Device, wgpu::Queue)> {
    use anyhow::Context as _;

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .await
        .context("no adapter for headless rendering")?;
    desk_scene::context::request_device(&adapter).await
}
