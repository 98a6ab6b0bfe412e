//! wgpu implementation of [`GraphicsContext`].
//!
//! wgpu has no immediate-mode draw calls, so [`WgpuGraphics`] records them.
//! Each [`draw_triangles`](GraphicsContext::draw_triangles) snapshots the
//! currently staged uniforms together with the bound vertex array and texture.
//! [`WgpuGraphics::encode_frame`] then uploads all snapshots into one uniform
//! buffer and replays the draws in a single render pass, each with its own
//! dynamic offset.
//!
//! # Key types
//!
//! - [`WgpuGraphics`] owns the handle registries and the recorded frame
//! - [`DrawCommand`] is one recorded draw, ready to replay

use std::collections::HashMap;

use anyhow::{Context as _, Result, anyhow, bail, ensure};
use image::RgbaImage;
use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{self, Texture},
    graphics::{
        BufferId, BufferKind, GraphicsContext, HandleAllocator, TextureId, UniformLocation,
        UniformValue, VertexArrayId, VertexAttribute,
    },
    pipelines::scene::{ScenePipeline, SceneUniform, UniformSlot},
};

struct GpuBuffer {
    kind: BufferKind,
    buffer: wgpu::Buffer,
}

#[derive(Default)]
struct VertexArray {
    vertex: Option<(BufferId, VertexAttribute)>,
    index: Option<BufferId>,
}

struct GpuTexture {
    texture: Texture,
    bind_group: wgpu::BindGroup,
    /// Base level kept on the CPU until mipmaps are generated from it.
    base_level: Option<RgbaImage>,
}

/// One recorded draw.
#[derive(Clone, Debug)]
pub struct DrawCommand {
    pub uniform: SceneUniform,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub texture: wgpu::BindGroup,
}

pub struct WgpuGraphics {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: ScenePipeline,
    handles: HandleAllocator,
    buffers: HashMap<BufferId, GpuBuffer>,
    vertex_arrays: HashMap<VertexArrayId, VertexArray>,
    textures: HashMap<TextureId, GpuTexture>,
    bound_texture: Option<TextureId>,
    bound_vertex_array: Option<VertexArrayId>,
    staged: SceneUniform,
    draws: Vec<DrawCommand>,
    /// Texture used when a draw happens with nothing bound.
    fallback_texture: wgpu::BindGroup,
    uniform_stride: u64,
    uniform_capacity: u64,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
}

impl WgpuGraphics {
    /// Draws that fit the uniform buffer before it has to grow.
    const INITIAL_DRAWS: u64 = 16;

    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        handles: HandleAllocator,
    ) -> Result<Self> {
        let pipeline = ScenePipeline::new(
            device,
            color_format,
            crate::data_structures::mesh::POSITION_ATTRIBUTE,
        )?;
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = (std::mem::size_of::<SceneUniform>() as u64).next_multiple_of(alignment);
        let uniform_capacity = Self::INITIAL_DRAWS;
        let (uniform_buffer, uniform_bind_group) =
            mk_uniform_buffer(device, &pipeline.uniform_layout, uniform_stride * uniform_capacity);
        let fallback = Texture::create_empty(device, "fallback texture");
        let fallback_texture = mk_texture_bind_group(device, &pipeline.texture_layout, &fallback);

        Ok(Self {
            device: device.clone(),
            queue: queue.clone(),
            pipeline,
            handles,
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            bound_texture: None,
            bound_vertex_array: None,
            staged: SceneUniform::default(),
            draws: Vec::new(),
            fallback_texture,
            uniform_stride,
            uniform_capacity,
            uniform_buffer,
            uniform_bind_group,
        })
    }

    /// Draws recorded since the last [`encode_frame`](Self::encode_frame).
    pub fn pending_draws(&self) -> &[DrawCommand] {
        &self.draws
    }

    /// Forgets the draws recorded so far, e.g. after a frame failed halfway.
    pub fn discard_frame(&mut self) {
        if !self.draws.is_empty() {
            log::debug!("discarding {} recorded draws", self.draws.len());
            self.draws.clear();
        }
    }

    fn ensure_uniform_capacity(&mut self, draws: u64) {
        if draws <= self.uniform_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("growing scene uniform buffer to {capacity} draws");
        let (buffer, bind_group) = mk_uniform_buffer(
            &self.device,
            &self.pipeline.uniform_layout,
            self.uniform_stride * capacity,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.uniform_capacity = capacity;
    }

    /// Replays every recorded draw into one render pass and clears the record.
    ///
    /// Returns the number of draws encoded.
    pub fn encode_frame(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        clear_colour: wgpu::Color,
    ) -> usize {
        let draws = std::mem::take(&mut self.draws);
        self.ensure_uniform_capacity(draws.len() as u64);

        if !draws.is_empty() {
            let stride = self.uniform_stride as usize;
            let mut staging = vec![0u8; stride * draws.len()];
            for (chunk, draw) in staging.chunks_exact_mut(stride).zip(&draws) {
                let bytes = bytemuck::bytes_of(&draw.uniform);
                chunk[..bytes.len()].copy_from_slice(bytes);
            }
            self.queue.write_buffer(&self.uniform_buffer, 0, &staging);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_colour),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
            multiview_mask: None,
        });

        render_pass.set_pipeline(&self.pipeline.pipeline);
        for (i, draw) in draws.iter().enumerate() {
            let offset = (i as u64 * self.uniform_stride) as wgpu::DynamicOffset;
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
            render_pass.set_bind_group(1, &draw.texture, &[]);
            render_pass.set_vertex_buffer(0, draw.vertex_buffer.slice(..));
            render_pass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..draw.index_count, 0, 0..1);
        }
        log::trace!("encoded {} draws", draws.len());
        draws.len()
    }

    fn buffer(&self, id: BufferId, kind: BufferKind) -> Result<&wgpu::Buffer> {
        match self.buffers.get(&id) {
            Some(gpu) if gpu.kind == kind => Ok(&gpu.buffer),
            Some(gpu) => bail!("{id:?} is a {:?} buffer, expected {kind:?}", gpu.kind),
            None => bail!("unknown {id:?}"),
        }
    }

    fn texture_mut(&mut self, id: TextureId) -> Result<&mut GpuTexture> {
        self.textures
            .get_mut(&id)
            .ok_or_else(|| anyhow!("unknown {id:?}"))
    }
}

impl GraphicsContext for WgpuGraphics {
    fn create_vertex_array(&mut self) -> Result<VertexArrayId> {
        let id = self.handles.vertex_array()?;
        self.vertex_arrays.insert(id, VertexArray::default());
        Ok(id)
    }

    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8]) -> Result<BufferId> {
        let id = self.handles.buffer()?;
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{kind:?} Buffer {}", id.get())),
                contents,
                usage,
            });
        self.buffers.insert(id, GpuBuffer { kind, buffer });
        Ok(id)
    }

    fn set_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayId,
        buffer: BufferId,
        attribute: VertexAttribute,
    ) -> Result<()> {
        self.buffer(buffer, BufferKind::Vertex)?;
        // The pipeline layout is fixed, attributes have to match it.
        ensure!(
            attribute == crate::data_structures::mesh::POSITION_ATTRIBUTE,
            "scene pipeline only reads {:?}, got {attribute:?}",
            crate::data_structures::mesh::POSITION_ATTRIBUTE
        );
        let vao = self
            .vertex_arrays
            .get_mut(&vertex_array)
            .ok_or_else(|| anyhow!("unknown {vertex_array:?}"))?;
        vao.vertex = Some((buffer, attribute));
        Ok(())
    }

    fn set_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId) -> Result<()> {
        self.buffer(buffer, BufferKind::Index)?;
        let vao = self
            .vertex_arrays
            .get_mut(&vertex_array)
            .ok_or_else(|| anyhow!("unknown {vertex_array:?}"))?;
        vao.index = Some(buffer);
        Ok(())
    }

    fn create_texture(&mut self) -> Result<TextureId> {
        let id = self.handles.texture()?;
        let texture = Texture::create_empty(&self.device, &format!("Texture {}", id.get()));
        let bind_group =
            mk_texture_bind_group(&self.device, &self.pipeline.texture_layout, &texture);
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                bind_group,
                base_level: None,
            },
        );
        Ok(id)
    }

    fn upload_texture_rgb(
        &mut self,
        texture: TextureId,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<()> {
        ensure!(
            pixels.len() == width as usize * height as usize * 3,
            "{} bytes is not {width}x{height} RGB",
            pixels.len()
        );
        let rgba = texture::rgb_to_rgba(width, height, pixels)?;
        let uploaded = Texture::from_base_level(
            &self.device,
            &self.queue,
            &rgba,
            &format!("Texture {}", texture.get()),
        )
        .context("failed to upload texture pixels")?;
        let bind_group =
            mk_texture_bind_group(&self.device, &self.pipeline.texture_layout, &uploaded);
        let gpu = self.texture_mut(texture)?;
        gpu.texture = uploaded;
        gpu.bind_group = bind_group;
        gpu.base_level = Some(rgba);
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: TextureId) -> Result<()> {
        let queue = self.queue.clone();
        let gpu = self.texture_mut(texture)?;
        let Some(base) = gpu.base_level.take() else {
            bail!("{texture:?} has no uploaded pixels to build mipmaps from");
        };
        gpu.texture.write_mip_chain(&queue, &base);
        Ok(())
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) {
        self.bound_texture = texture;
    }

    fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) {
        self.bound_vertex_array = vertex_array;
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        match UniformSlot::from_location(location) {
            Some(slot) => {
                if !self.staged.apply(slot, value) {
                    log::warn!("uniform {slot:?} cannot hold {value:?}");
                }
            }
            None => log::warn!("{location:?} does not belong to the scene shader"),
        }
    }

    fn draw_triangles(&mut self, index_count: u32) -> Result<()> {
        let Some(vao_id) = self.bound_vertex_array else {
            bail!("draw with no vertex array bound");
        };
        let vao = self
            .vertex_arrays
            .get(&vao_id)
            .ok_or_else(|| anyhow!("bound {vao_id:?} was deleted"))?;
        let (vertex_id, _) = vao
            .vertex
            .ok_or_else(|| anyhow!("{vao_id:?} has no vertex buffer"))?;
        let index_id = vao
            .index
            .ok_or_else(|| anyhow!("{vao_id:?} has no index buffer"))?;
        let vertex_buffer = self.buffer(vertex_id, BufferKind::Vertex)?.clone();
        let index_buffer = self.buffer(index_id, BufferKind::Index)?.clone();

        let texture = match self.bound_texture.and_then(|id| self.textures.get(&id)) {
            Some(gpu) => gpu.bind_group.clone(),
            None => self.fallback_texture.clone(),
        };

        self.draws.push(DrawCommand {
            uniform: self.staged,
            vertex_buffer,
            index_buffer,
            index_count,
            texture,
        });
        Ok(())
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        if self.vertex_arrays.remove(&vertex_array).is_none() {
            log::warn!("delete of unknown {vertex_array:?}");
        }
        if self.bound_vertex_array == Some(vertex_array) {
            self.bound_vertex_array = None;
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_none() {
            log::warn!("delete of unknown {buffer:?}");
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_none() {
            log::warn!("delete of unknown {texture:?}");
        }
        if self.bound_texture == Some(texture) {
            self.bound_texture = None;
        }
    }
}

fn mk_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    size: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Scene Uniform Buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<SceneUniform>() as u64),
            }),
        }],
        label: Some("scene_uniform_bind_group"),
    });
    (buffer, bind_group)
}

fn mk_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    texture: &Texture,
) -> wgpu::BindGroup {
    let sampler = texture
        .sampler
        .clone()
        .unwrap_or_else(|| texture::create_default_sampler(device));
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
        label: Some("scene_texture_bind_group"),
    })
}
