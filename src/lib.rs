pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod galaxy;
pub mod gpu;
pub mod panel;
pub mod params;
pub mod scene;
pub mod viewport;

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use camera::Camera;
use gpu::GpuContext;
use scene::{BlendMode, DrawableId, PointMaterial, PointScene};
use viewport::Viewport;

const CLEAR_COLOR: wgpu::Color = wgpu::Color::BLACK;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
const VERTICES_PER_POINT: u32 = 6;
const FLOATS_PER_INSTANCE: u64 = 6; // 3 position + 3 color

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct PointUniform {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    viewport: [f32; 2],
    size: f32,
    size_attenuation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    blend: BlendMode,
    depth_write: bool,
}

impl From<&PointMaterial> for PipelineKey {
    fn from(material: &PointMaterial) -> Self {
        Self {
            blend: material.blend,
            depth_write: material.depth_write,
        }
    }
}

struct GpuPointCloud {
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: PipelineKey,
    material: PointMaterial,
    model: [[f32; 4]; 4],
    count: u32,
}

impl GpuPointCloud {
    fn destroy(self) {
        self.instance_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

enum RenderTarget {
    Window {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen {
        texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
}

/// Draws the attached drawables of a [`PointScene`] as point sprites.
pub struct Renderer {
    target: RenderTarget,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    // Resolution point sizes are computed against; smaller than the target
    // when the pixel ratio is capped.
    drawing_buffer: (u32, u32),
    depth_view: wgpu::TextureView,
    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    clouds: HashMap<DrawableId, GpuPointCloud>,
    camera: Camera,
}

impl Renderer {
    /// Renderer presenting to a window surface.
    pub fn new(
        gpu: &GpuContext,
        surface: wgpu::Surface<'static>,
        viewport: Viewport,
    ) -> Result<Self> {
        let surface_caps = surface.get_capabilities(&gpu.adapter);
        // Colors are linear end to end, so prefer a non-sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let (width, height) = viewport.surface_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);
        log::info!("Configured surface {}x{} ({:?})", width, height, surface_format);

        let target = RenderTarget::Window { surface, config };
        let mut renderer =
            Self::with_target(gpu, target, surface_format, width, height, viewport.aspect());
        renderer.drawing_buffer = viewport.drawing_buffer_size();
        Ok(renderer)
    }

    /// Renderer drawing into a texture that can be read back with
    /// [`Renderer::capture_frame`].
    pub fn new_offscreen(gpu: &GpuContext, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("Offscreen target must be non-empty, got {}x{}", width, height));
        }

        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Offscreen Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let target = RenderTarget::Offscreen { texture, view };
        let aspect = width as f32 / height as f32;
        Ok(Self::with_target(gpu, target, OFFSCREEN_FORMAT, width, height, aspect))
    }

    fn with_target(
        gpu: &GpuContext,
        target: RenderTarget,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        aspect: f32,
    ) -> Self {
        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/points.wgsl").into()),
        });

        Self {
            target,
            format,
            width,
            height,
            drawing_buffer: (width, height),
            depth_view: Self::create_depth_view(gpu, width, height),
            shader,
            bind_group_layout: Self::create_bind_group_layout(gpu),
            pipelines: HashMap::new(),
            clouds: HashMap::new(),
            camera: Camera::new(aspect),
        }
    }

    /// Mirrors the attached drawables of `scene`: uploads new ones,
    /// releases buffers of ones no longer attached and copies rotations.
    pub fn update(&mut self, gpu: &GpuContext, scene: &PointScene) {
        let stale: Vec<DrawableId> = self
            .clouds
            .keys()
            .filter(|id| !scene.is_attached(**id))
            .copied()
            .collect();
        for id in stale {
            if let Some(cloud) = self.clouds.remove(&id) {
                log::debug!("Releasing GPU buffers of {:?}", id);
                cloud.destroy();
            }
        }

        for (id, cloud) in scene.attached() {
            let model = cloud.model_matrix().to_cols_array_2d();
            if let Some(gpu_cloud) = self.clouds.get_mut(&id) {
                gpu_cloud.model = model;
                continue;
            }
            if cloud.field.is_empty() {
                continue;
            }

            let gpu_cloud = self.upload(gpu, id, cloud);
            self.clouds.insert(id, gpu_cloud);
        }
    }

    fn upload(&mut self, gpu: &GpuContext, id: DrawableId, cloud: &scene::PointCloud) -> GpuPointCloud {
        let instances = instance_data(cloud);
        let instance_buffer = gpu.create_buffer_init(
            &format!("{:?} Instance Buffer", id),
            bytemuck::cast_slice(&instances),
            wgpu::BufferUsages::VERTEX,
        );

        let uniform = self.point_uniform(&cloud.material, cloud.model_matrix().to_cols_array_2d());
        let uniform_buffer = gpu.create_buffer_init(
            &format!("{:?} Uniform Buffer", id),
            bytemuck::cast_slice(&[uniform]),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{:?} Bind Group", id)),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline = PipelineKey::from(&cloud.material);
        if !self.pipelines.contains_key(&pipeline) {
            let render_pipeline = self.create_render_pipeline(gpu, pipeline);
            self.pipelines.insert(pipeline, render_pipeline);
        }

        log::debug!("Uploaded {} points for {:?}", cloud.field.len(), id);

        GpuPointCloud {
            instance_buffer,
            uniform_buffer,
            bind_group,
            pipeline,
            material: cloud.material,
            model: cloud.model_matrix().to_cols_array_2d(),
            count: cloud.field.len() as u32,
        }
    }

    pub fn render(&self, gpu: &GpuContext) -> Result<(), wgpu::SurfaceError> {
        self.write_uniforms(gpu);

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        match &self.target {
            RenderTarget::Window { surface, .. } => {
                let output = surface.get_current_texture()?;
                let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
                self.encode_render_pass(&mut encoder, &view);
                gpu.queue.submit(Some(encoder.finish()));
                output.present();
            }
            RenderTarget::Offscreen { view, .. } => {
                self.encode_render_pass(&mut encoder, view);
                gpu.queue.submit(Some(encoder.finish()));
            }
        }

        Ok(())
    }

    /// Reads the offscreen target back as tightly packed RGBA8 rows.
    /// Returns `None` for window renderers or if the readback fails.
    pub fn capture_frame(&self, gpu: &GpuContext) -> Option<Vec<u8>> {
        let RenderTarget::Offscreen { texture, .. } = &self.target else {
            return None;
        };

        let unpadded_bytes_per_row = self.width * 4;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let bytes_per_row = ((unpadded_bytes_per_row + align - 1) / align) * align;

        let staging_buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Capture Staging Buffer"),
            size: bytes_per_row as u64 * self.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Capture Encoder"),
        });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &staging_buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );

        let copy_submission = gpu.queue.submit(Some(encoder.finish()));
        gpu.device.poll(wgpu::Maintain::WaitForSubmissionIndex(copy_submission));

        let buffer_slice = staging_buffer.slice(..);
        let (tx, rx) = futures::channel::oneshot::channel();

        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        gpu.device.poll(wgpu::Maintain::Wait);

        if let Err(e) = pollster::block_on(rx).ok()? {
            log::error!("Frame readback failed: {:?}", e);
            return None;
        }

        let data = buffer_slice.get_mapped_range();

        let mut frame_data = Vec::with_capacity((unpadded_bytes_per_row * self.height) as usize);
        for y in 0..self.height {
            let row_start = (y * bytes_per_row) as usize;
            let row_end = row_start + unpadded_bytes_per_row as usize;
            frame_data.extend_from_slice(&data[row_start..row_end]);
        }

        drop(data);
        staging_buffer.unmap();

        Some(frame_data)
    }

    pub fn resize(&mut self, gpu: &GpuContext, viewport: Viewport) {
        let (width, height) = viewport.surface_size();
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return;
        }

        if let RenderTarget::Window { surface, config } = &mut self.target {
            config.width = width;
            config.height = height;
            surface.configure(&gpu.device, config);
        } else {
            // The offscreen texture has a fixed size.
            return;
        }

        self.width = width;
        self.height = height;
        self.drawing_buffer = viewport.drawing_buffer_size();
        self.depth_view = Self::create_depth_view(gpu, width, height);
        self.camera.update_aspect_ratio(viewport.aspect());
        log::debug!("Resized to {}x{} (pixel ratio {})", width, height, viewport.pixel_ratio());
    }

    /// Reconfigures the surface at its current size, after `SurfaceError::Lost`.
    pub fn reconfigure(&mut self, gpu: &GpuContext) {
        if let RenderTarget::Window { surface, config } = &self.target {
            surface.configure(&gpu.device, config);
        }
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    fn point_uniform(&self, material: &PointMaterial, model: [[f32; 4]; 4]) -> PointUniform {
        PointUniform {
            view_proj: self.camera.view_projection_matrix_transposed(),
            model,
            viewport: [self.drawing_buffer.0 as f32, self.drawing_buffer.1 as f32],
            size: material.size,
            size_attenuation: if material.size_attenuation { 1.0 } else { 0.0 },
        }
    }

    fn write_uniforms(&self, gpu: &GpuContext) {
        for cloud in self.clouds.values() {
            let uniform = self.point_uniform(&cloud.material, cloud.model);
            gpu.queue.write_buffer(&cloud.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    fn create_depth_view(gpu: &GpuContext, width: u32, height: u32) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_bind_group_layout(gpu: &GpuContext) -> wgpu::BindGroupLayout {
        gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Point Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        })
    }

    fn create_render_pipeline(&self, gpu: &GpuContext, key: PipelineKey) -> wgpu::RenderPipeline {
        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Pipeline Layout"),
            bind_group_layouts: &[&self.bind_group_layout],
            push_constant_ranges: &[],
        });

        gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("Point Pipeline {:?}", key)),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: "vs_main",
                buffers: &[Self::instance_buffer_layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: Some(blend_state(key.blend)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: key.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn instance_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: FLOATS_PER_INSTANCE * 4,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: 3 * 4,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }

    fn encode_render_pass(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Galaxy Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let mut ids: Vec<&DrawableId> = self.clouds.keys().collect();
        ids.sort();

        for id in ids {
            let cloud = &self.clouds[id];
            let Some(pipeline) = self.pipelines.get(&cloud.pipeline) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &cloud.bind_group, &[]);
            render_pass.set_vertex_buffer(0, cloud.instance_buffer.slice(..));
            render_pass.draw(0..VERTICES_PER_POINT, 0..cloud.count);
        }
    }
}

/// Interleaved instance data for `cloud`. Materials without vertex colors
/// draw every point white.
fn instance_data(cloud: &scene::PointCloud) -> Vec<f32> {
    let mut instances = cloud.field.interleaved();
    if !cloud.material.vertex_colors {
        for instance in instances.chunks_exact_mut(FLOATS_PER_INSTANCE as usize) {
            instance[3..6].copy_from_slice(&[1.0, 1.0, 1.0]);
        }
    }
    instances
}

fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Normal => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => wgpu::BlendState {
            color: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
            alpha: wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::One,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            },
        },
    }
}

/// Loads `path` if given, then applies command-line overrides.
pub fn load_config(
    path: Option<&std::path::Path>,
    seed: Option<u64>,
    count: Option<u32>,
) -> Result<config::GalaxyConfig> {
    let mut config = match path {
        Some(path) => config::GalaxyConfig::load(path)
            .with_context(|| format!("Loading {}", path.display()))?,
        None => config::GalaxyConfig::default(),
    };

    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(count) = count {
        config.galaxy.count = count;
        config.galaxy.validate()?;
    }
    Ok(config)
}
