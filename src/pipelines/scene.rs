use std::num::NonZeroU64;

use crate::{
    data_structures::{light::LIGHT_COUNT, texture::Texture},
    graphics::{
        HandleAllocator, ProgramHandle, ShaderProgram, UniformLocation, UniformValue,
        VertexAttribute,
    },
};

/// Uniform block of `scene_shader.wgsl`. One copy is uploaded per draw.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    // vec3s are stored as vec4 to keep the 16 byte uniform alignment
    pub view_position: [f32; 4],
    pub object_color: [f32; 4],
    pub light_position: [[f32; 4]; LIGHT_COUNT],
    pub light_color: [[f32; 4]; LIGHT_COUNT],
    pub use_texture: u32,
    pub use_lighting: u32,
    pub object_texture: u32,
    _padding: u32,
}

impl Default for SceneUniform {
    fn default() -> Self {
        use cgmath::SquareMatrix;
        let identity: [[f32; 4]; 4] = cgmath::Matrix4::identity().into();
        Self {
            model: identity,
            view: identity,
            projection: identity,
            view_position: [0.0; 4],
            object_color: [1.0; 4],
            light_position: [[0.0; 4]; LIGHT_COUNT],
            light_color: [[0.0; 4]; LIGHT_COUNT],
            use_texture: 0,
            use_lighting: 0,
            object_texture: 0,
            _padding: 0,
        }
    }
}

/// Every uniform the scene shader exposes by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformSlot {
    Model,
    View,
    Projection,
    ViewPosition,
    ObjectColor,
    ObjectTexture,
    UseTexture,
    UseLighting,
    LightPosition(usize),
    LightColor(usize),
}

impl UniformSlot {
    const NAMED: [(&'static str, UniformSlot); 12] = [
        ("model", UniformSlot::Model),
        ("view", UniformSlot::View),
        ("projection", UniformSlot::Projection),
        ("viewPosition", UniformSlot::ViewPosition),
        ("objectColor", UniformSlot::ObjectColor),
        ("objectTexture", UniformSlot::ObjectTexture),
        ("bUseTexture", UniformSlot::UseTexture),
        ("bUseLighting", UniformSlot::UseLighting),
        ("lightPos1", UniformSlot::LightPosition(0)),
        ("lightPos2", UniformSlot::LightPosition(1)),
        ("lightColor1", UniformSlot::LightColor(0)),
        ("lightColor2", UniformSlot::LightColor(1)),
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, slot)| *slot)
    }

    pub fn location(self) -> UniformLocation {
        let index = Self::NAMED
            .iter()
            .position(|(_, slot)| *slot == self)
            .unwrap_or_default();
        UniformLocation(index as u32)
    }

    pub fn from_location(location: UniformLocation) -> Option<Self> {
        Self::NAMED.get(location.0 as usize).map(|(_, slot)| *slot)
    }
}

impl SceneUniform {
    /// Writes `value` into the field behind `slot`.
    ///
    /// Returns `false` when the value has the wrong shape for the slot.
    pub fn apply(&mut self, slot: UniformSlot, value: UniformValue) -> bool {
        match (slot, value) {
            (UniformSlot::Model, UniformValue::Mat4(m)) => self.model = m,
            (UniformSlot::View, UniformValue::Mat4(m)) => self.view = m,
            (UniformSlot::Projection, UniformValue::Mat4(m)) => self.projection = m,
            (UniformSlot::ViewPosition, UniformValue::Vec3(v)) => self.view_position = extend(v),
            (UniformSlot::ObjectColor, UniformValue::Vec4(c)) => self.object_color = c,
            (UniformSlot::ObjectTexture, UniformValue::Int(unit)) if unit >= 0 => {
                self.object_texture = unit as u32
            }
            (UniformSlot::UseTexture, UniformValue::Bool(b)) => self.use_texture = b.into(),
            (UniformSlot::UseLighting, UniformValue::Bool(b)) => self.use_lighting = b.into(),
            (UniformSlot::LightPosition(i), UniformValue::Vec3(v)) if i < LIGHT_COUNT => {
                self.light_position[i] = extend(v)
            }
            (UniformSlot::LightColor(i), UniformValue::Vec3(v)) if i < LIGHT_COUNT => {
                self.light_color[i] = extend(v)
            }
            _ => return false,
        }
        true
    }
}

fn extend(v: [f32; 3]) -> [f32; 4] {
    [v[0], v[1], v[2], 1.0]
}

/// The shared shader program: resolves the names of [`UniformSlot`].
#[derive(Clone, Copy, Debug)]
pub struct SceneShader {
    handle: ProgramHandle,
}

impl SceneShader {
    pub fn new(handles: &mut HandleAllocator) -> anyhow::Result<Self> {
        Ok(Self {
            handle: handles.program()?,
        })
    }
}

impl ShaderProgram for SceneShader {
    fn handle(&self) -> ProgramHandle {
        self.handle
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        UniformSlot::from_name(name).map(UniformSlot::location)
    }
}

pub fn uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(std::mem::size_of::<SceneUniform>() as u64),
            },
            count: None,
        }],
        label: Some("scene_uniform_bind_group_layout"),
    })
}

pub fn texture_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("scene_texture_bind_group_layout"),
    })
}

/// Converts the backend-neutral attribute description for wgpu.
pub fn vertex_format(attribute: &VertexAttribute) -> Option<wgpu::VertexFormat> {
    match attribute.components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

/// Pipeline and layouts for drawing the box mesh with the scene shader.
#[derive(Debug)]
pub struct ScenePipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
}

impl ScenePipeline {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        position: VertexAttribute,
    ) -> anyhow::Result<Self> {
        let format = vertex_format(&position).ok_or_else(|| {
            anyhow::anyhow!("{} float components is not a vertex format", position.components)
        })?;
        let uniform_layout = uniform_bind_group_layout(device);
        let texture_layout = texture_bind_group_layout(device);
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene_shader.wgsl").into()),
        };

        let attributes = [wgpu::VertexAttribute {
            offset: position.offset,
            shader_location: position.location,
            format,
        }];
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: position.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };

        let pipeline = mk_render_pipeline(
            device,
            &layout,
            color_format,
            Some(wgpu::BlendState::REPLACE),
            Some(Texture::DEPTH_FORMAT),
            &[vertex_layout],
            shader,
        );

        Ok(Self {
            pipeline,
            uniform_layout,
            texture_layout,
        })
    }
}

pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Scene Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // the box indices do not share one winding
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
