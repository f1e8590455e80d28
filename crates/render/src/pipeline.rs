//! Render pipelines for the cube, screen quad, isometric icon and text passes.

use anyhow::{ensure, Result};
use blockshade_core::{
    cube_mesh, isometric_block_mesh, screen_quad_mesh, AlphaPolicy, BasicInstance, CubeInstance,
    CubeUniforms, Mesh, ScreenTransform, TextVertex, GLYPH_CORNER_COUNT,
};
use wgpu::util::DeviceExt;

use crate::context::{RenderContext, COLOR_FORMAT, DEPTH_FORMAT};
use crate::layout::{
    basic_cube_vertex_layout, basic_instance_layout, glyph_instance_layout,
    lit_cube_vertex_layout, lit_instance_layout, screen_vertex_layout,
};
use crate::texture::{texture_bind_group_layout, GpuTexture};
use crate::uniforms::{CubeUniform, IsometricUniform, ScreenUniform};

/// Which cube shader a [`CubePipeline`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeVariant {
    /// Per-face light from the packed payload, with the given alpha policy.
    Lit(AlphaPolicy),
    /// Full light, texel alpha passed through.
    Basic,
}

impl CubeVariant {
    fn label(self) -> &'static str {
        match self {
            CubeVariant::Lit(_) => "Lit Cube",
            CubeVariant::Basic => "Basic Cube",
        }
    }

    fn fragment_entry_point(self) -> &'static str {
        match self {
            CubeVariant::Lit(AlphaPolicy::CutoutOpaque) => "fs_cutout_opaque",
            CubeVariant::Lit(AlphaPolicy::CutoutPassthrough) => "fs_cutout_passthrough",
            CubeVariant::Basic => "fs_main",
        }
    }
}

fn uniform_bind_group_layout(
    device: &wgpu::Device,
    label: &str,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn uniform_bind_group<T: bytemuck::Pod>(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    uniform: &T,
) -> wgpu::BindGroup {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(uniform),
        usage: wgpu::BufferUsages::UNIFORM,
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

/// Shared description of one of our pipelines.
struct PipelineSpec<'a> {
    label: &'a str,
    shader: &'a wgpu::ShaderModule,
    fragment_entry_point: &'a str,
    bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    blend: wgpu::BlendState,
    depth: bool,
}

fn create_pipeline(ctx: &RenderContext, spec: PipelineSpec<'_>) -> Result<wgpu::RenderPipeline> {
    ctx.validated(spec.label, |device| {
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(spec.label),
            bind_group_layouts: spec.bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: spec.shader,
                entry_point: "vs_main",
                buffers: spec.buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: spec.shader,
                entry_point: spec.fragment_entry_point,
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(spec.blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: spec.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: spec.depth.then(|| wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
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
            multiview: None,
        })
    })
}

/// Static indexed geometry on the GPU.
struct MeshBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl MeshBuffers {
    fn upload<V: bytemuck::Pod>(device: &wgpu::Device, label: &str, mesh: &Mesh<V>) -> Self {
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertices,
            indices,
            index_count: mesh.indices.len() as u32,
        }
    }
}

/// Per-draw resources of a cube batch.
pub struct CubeBatch {
    instances: wgpu::Buffer,
    instance_count: u32,
    uniforms: wgpu::BindGroup,
    textures: wgpu::BindGroup,
}

/// Instanced cube pipeline drawing the shared cube mesh once per instance.
pub struct CubePipeline {
    variant: CubeVariant,
    render_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    mesh: MeshBuffers,
}

impl CubePipeline {
    /// Create a cube pipeline for `variant`.
    pub fn new(ctx: &RenderContext, variant: CubeVariant) -> Result<Self> {
        let device = &ctx.device;
        let label = variant.label();

        let uniform_layout =
            uniform_bind_group_layout(device, "Cube Uniform Layout", wgpu::ShaderStages::VERTEX);
        let texture_layout = texture_bind_group_layout(
            device,
            "Cube Texture Layout",
            wgpu::TextureViewDimension::D2Array,
        );

        let source = match variant {
            CubeVariant::Lit(_) => include_str!("shaders/cube.wgsl"),
            CubeVariant::Basic => include_str!("shaders/cube_basic.wgsl"),
        };
        let shader = ctx.validated(label, |device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;

        let buffers = match variant {
            CubeVariant::Lit(_) => [lit_cube_vertex_layout(), lit_instance_layout()],
            CubeVariant::Basic => [basic_cube_vertex_layout(), basic_instance_layout()],
        };
        let render_pipeline = create_pipeline(
            ctx,
            PipelineSpec {
                label,
                shader: &shader,
                fragment_entry_point: variant.fragment_entry_point(),
                bind_group_layouts: &[&uniform_layout, &texture_layout],
                buffers: &buffers,
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: wgpu::BlendState::REPLACE,
                depth: true,
            },
        )?;

        tracing::info!(?variant, "Cube pipeline created");

        Ok(Self {
            variant,
            render_pipeline,
            uniform_layout,
            texture_layout,
            mesh: MeshBuffers::upload(device, "Cube Mesh", &cube_mesh()),
        })
    }

    fn prepare_bytes(
        &self,
        ctx: &RenderContext,
        instances: &[u8],
        instance_count: u32,
        uniforms: &CubeUniforms,
        textures: &GpuTexture,
    ) -> CubeBatch {
        let device = &ctx.device;
        let instances = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cube Instance Buffer"),
            contents: instances,
            usage: wgpu::BufferUsages::VERTEX,
        });
        CubeBatch {
            instances,
            instance_count,
            uniforms: uniform_bind_group(
                device,
                &self.uniform_layout,
                "Cube Uniform Buffer",
                &CubeUniform::from_uniforms(uniforms),
            ),
            textures: textures.bind_group(device, &self.texture_layout),
        }
    }

    /// Upload lit instances for one draw. Fails on a basic pipeline.
    pub fn prepare_lit(
        &self,
        ctx: &RenderContext,
        instances: &[CubeInstance],
        uniforms: &CubeUniforms,
        textures: &GpuTexture,
    ) -> Result<CubeBatch> {
        ensure!(
            matches!(self.variant, CubeVariant::Lit(_)),
            "lit instances submitted to a {:?} cube pipeline",
            self.variant
        );
        ensure!(!instances.is_empty(), "cube batch has no instances");
        Ok(self.prepare_bytes(
            ctx,
            bytemuck::cast_slice(instances),
            instances.len() as u32,
            uniforms,
            textures,
        ))
    }

    /// Upload unlit instances for one draw. Fails on a lit pipeline.
    pub fn prepare_basic(
        &self,
        ctx: &RenderContext,
        instances: &[BasicInstance],
        uniforms: &CubeUniforms,
        textures: &GpuTexture,
    ) -> Result<CubeBatch> {
        ensure!(
            self.variant == CubeVariant::Basic,
            "basic instances submitted to a {:?} cube pipeline",
            self.variant
        );
        ensure!(!instances.is_empty(), "cube batch has no instances");
        Ok(self.prepare_bytes(
            ctx,
            bytemuck::cast_slice(instances),
            instances.len() as u32,
            uniforms,
            textures,
        ))
    }

    /// Record the draw of a prepared batch.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, batch: &'a CubeBatch) {
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, &batch.uniforms, &[]);
        pass.set_bind_group(1, &batch.textures, &[]);
        pass.set_vertex_buffer(0, self.mesh.vertices.slice(..));
        pass.set_vertex_buffer(1, batch.instances.slice(..));
        pass.set_index_buffer(self.mesh.indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.mesh.index_count, 0, 0..batch.instance_count);
    }
}

/// Per-draw resources of a screen-space draw.
pub struct OverlayBatch {
    uniforms: wgpu::BindGroup,
    texture: wgpu::BindGroup,
    instances: Option<(wgpu::Buffer, u32)>,
}

/// Pipeline drawing a mesh in screen space with a textured fragment stage.
struct OverlayPipeline {
    render_pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
}

struct OverlaySpec<'a> {
    label: &'a str,
    source: &'a str,
    uniform_visibility: wgpu::ShaderStages,
    view_dimension: wgpu::TextureViewDimension,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    blend: wgpu::BlendState,
}

impl OverlayPipeline {
    fn new(ctx: &RenderContext, spec: OverlaySpec<'_>) -> Result<Self> {
        let device = &ctx.device;
        let uniform_layout = uniform_bind_group_layout(device, spec.label, spec.uniform_visibility);
        let texture_layout = texture_bind_group_layout(device, spec.label, spec.view_dimension);
        let shader = ctx.validated(spec.label, |device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(spec.label),
                source: wgpu::ShaderSource::Wgsl(spec.source.into()),
            })
        })?;
        let render_pipeline = create_pipeline(
            ctx,
            PipelineSpec {
                label: spec.label,
                shader: &shader,
                fragment_entry_point: "fs_main",
                bind_group_layouts: &[&uniform_layout, &texture_layout],
                buffers: spec.buffers,
                topology: spec.topology,
                blend: spec.blend,
                depth: false,
            },
        )?;
        tracing::info!(label = spec.label, "Overlay pipeline created");
        Ok(Self {
            render_pipeline,
            uniform_layout,
            texture_layout,
        })
    }

    fn batch<T: bytemuck::Pod>(
        &self,
        ctx: &RenderContext,
        uniform: &T,
        texture: &GpuTexture,
    ) -> OverlayBatch {
        OverlayBatch {
            uniforms: uniform_bind_group(
                &ctx.device,
                &self.uniform_layout,
                "Overlay Uniform",
                uniform,
            ),
            texture: texture.bind_group(&ctx.device, &self.texture_layout),
            instances: None,
        }
    }

    fn bind<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, batch: &'a OverlayBatch) {
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, &batch.uniforms, &[]);
        pass.set_bind_group(1, &batch.texture, &[]);
    }
}

/// Textured quads in screen space (`screen.wgsl`).
pub struct ScreenPipeline {
    overlay: OverlayPipeline,
    mesh: MeshBuffers,
}

impl ScreenPipeline {
    /// Create the screen quad pipeline.
    pub fn new(ctx: &RenderContext) -> Result<Self> {
        let overlay = OverlayPipeline::new(
            ctx,
            OverlaySpec {
                label: "Screen Quad",
                source: include_str!("shaders/screen.wgsl"),
                uniform_visibility: wgpu::ShaderStages::VERTEX,
                view_dimension: wgpu::TextureViewDimension::D2,
                buffers: &[screen_vertex_layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: wgpu::BlendState::REPLACE,
            },
        )?;
        Ok(Self {
            overlay,
            mesh: MeshBuffers::upload(&ctx.device, "Screen Quad Mesh", &screen_quad_mesh()),
        })
    }

    /// Resources for one quad draw.
    pub fn prepare(
        &self,
        ctx: &RenderContext,
        transform: &ScreenTransform,
        texture: &GpuTexture,
    ) -> OverlayBatch {
        self.overlay
            .batch(ctx, &ScreenUniform::from_transform(transform), texture)
    }

    /// Record the draw of a prepared quad.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, batch: &'a OverlayBatch) {
        self.overlay.bind(pass, batch);
        pass.set_vertex_buffer(0, self.mesh.vertices.slice(..));
        pass.set_index_buffer(self.mesh.indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}

/// Isometric block icons sampling one texture-array layer (`isometric.wgsl`).
pub struct IsometricPipeline {
    overlay: OverlayPipeline,
    mesh: MeshBuffers,
}

impl IsometricPipeline {
    /// Create the isometric icon pipeline.
    pub fn new(ctx: &RenderContext) -> Result<Self> {
        let overlay = OverlayPipeline::new(
            ctx,
            OverlaySpec {
                label: "Isometric Block",
                source: include_str!("shaders/isometric.wgsl"),
                uniform_visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                view_dimension: wgpu::TextureViewDimension::D2Array,
                buffers: &[screen_vertex_layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                blend: wgpu::BlendState::REPLACE,
            },
        )?;
        Ok(Self {
            overlay,
            mesh: MeshBuffers::upload(&ctx.device, "Isometric Block Mesh", &isometric_block_mesh()),
        })
    }

    /// Resources for one icon draw of `layer`.
    pub fn prepare(
        &self,
        ctx: &RenderContext,
        transform: &ScreenTransform,
        layer: u32,
        textures: &GpuTexture,
    ) -> OverlayBatch {
        self.overlay
            .batch(ctx, &IsometricUniform::new(transform, layer), textures)
    }

    /// Record the draw of a prepared icon.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, batch: &'a OverlayBatch) {
        self.overlay.bind(pass, batch);
        pass.set_vertex_buffer(0, self.mesh.vertices.slice(..));
        pass.set_index_buffer(self.mesh.indices.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..self.mesh.index_count, 0, 0..1);
    }
}

/// Alpha-blended glyph quads, one instance per glyph (`text.wgsl`).
pub struct TextPipeline {
    overlay: OverlayPipeline,
}

impl TextPipeline {
    /// Create the text pipeline.
    pub fn new(ctx: &RenderContext) -> Result<Self> {
        let overlay = OverlayPipeline::new(
            ctx,
            OverlaySpec {
                label: "Text",
                source: include_str!("shaders/text.wgsl"),
                uniform_visibility: wgpu::ShaderStages::VERTEX,
                view_dimension: wgpu::TextureViewDimension::D2,
                buffers: &[glyph_instance_layout()],
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                blend: wgpu::BlendState::ALPHA_BLENDING,
            },
        )?;
        Ok(Self { overlay })
    }

    /// Upload glyph records for one text draw.
    pub fn prepare(
        &self,
        ctx: &RenderContext,
        glyphs: &[TextVertex],
        transform: &ScreenTransform,
        coverage: &GpuTexture,
    ) -> Result<OverlayBatch> {
        ensure!(!glyphs.is_empty(), "text batch has no glyphs");
        let mut batch = self
            .overlay
            .batch(ctx, &ScreenUniform::from_transform(transform), coverage);
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Glyph Instance Buffer"),
                contents: bytemuck::cast_slice(glyphs),
                usage: wgpu::BufferUsages::VERTEX,
            });
        batch.instances = Some((buffer, glyphs.len() as u32));
        Ok(batch)
    }

    /// Record the draw of prepared glyphs.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, batch: &'a OverlayBatch) {
        let Some((instances, count)) = &batch.instances else {
            return;
        };
        self.overlay.bind(pass, batch);
        pass.set_vertex_buffer(0, instances.slice(..));
        pass.draw(0..GLYPH_CORNER_COUNT, 0..*count);
    }
}
