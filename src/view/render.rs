use glam::Vec3;
use wgpu::*;

use crate::config;
use crate::model::Camera;
use crate::utils::{Mesh, MeshBuffer, Vertex};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self { view_proj: camera.view_proj().to_cols_array_2d() }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub ambient: f32,
    pub _pad1: f32,
    pub _pad2: f32,
    pub _pad3: f32,
}

impl Default for LightingUniform {
    /// Directional sun shining from the configured sun position
    fn default() -> Self {
        let sun_dir = Vec3::from(config::lighting::SUN_POSITION).normalize();
        Self {
            sun_dir: sun_dir.to_array(),
            sun_intensity: config::lighting::SUN_INTENSITY,
            ambient: config::lighting::AMBIENT,
            _pad1: 0.0,
            _pad2: 0.0,
            _pad3: 0.0,
        }
    }
}

pub struct CameraResources {
    pub camera_buffer: Buffer,
    pub lighting_buffer: Buffer,
    pub bind_group_layout: BindGroupLayout,
    pub camera_bind_group: BindGroup,
}

pub fn create_depth_texture(device: &Device, width: u32, height: u32) -> (Texture, TextureView) {
    let depth_texture = device.create_texture(&TextureDescriptor {
        label: Some("depth_texture"),
        size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn create_camera_resources(device: &Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer(&BufferDescriptor {
        label: Some("lighting_buffer"),
        size: std::mem::size_of::<LightingUniform>() as BufferAddress,
        usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            uniform_entry(0, ShaderStages::VERTEX),
            uniform_entry(1, ShaderStages::FRAGMENT),
        ],
    });

    let camera_bind_group = device.create_bind_group(&BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, camera_bind_group }
}

/// Lit, vertex-coloured pipeline shared by the floor, frames and hand
pub fn create_scene_pipeline(
    device: &Device,
    format: TextureFormat,
    bind_group_layout: &BindGroupLayout,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some("scene_pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as BufferAddress,
                step_mode: VertexStepMode::Vertex,
                attributes: &[
                    VertexAttribute { offset: 0, shader_location: 0, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 12, shader_location: 1, format: VertexFormat::Float32x3 },
                    VertexAttribute { offset: 24, shader_location: 2, format: VertexFormat::Float32x4 },
                    VertexAttribute { offset: 40, shader_location: 3, format: VertexFormat::Float32x2 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(ColorTargetState {
                format,
                blend: Some(BlendState::ALPHA_BLENDING),
                write_mask: ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(Face::Back),
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        }),
        multisample: MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// Tessellated egui output for one frame
pub struct UiFrame {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// Everything needed to put one frame on screen
pub struct RenderState {
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,

    pub pipeline: RenderPipeline,
    pub camera: CameraResources,
    depth_view: TextureView,

    /// Static floor
    ground: MeshBuffer,

    pub egui_renderer: egui_wgpu::Renderer,
}

impl RenderState {
    pub fn new(
        device: &Device,
        queue: &Queue,
        format: TextureFormat,
        alpha_mode: CompositeAlphaMode,
        width: u32,
        height: u32,
        ground: &Mesh,
    ) -> Self {
        let camera = create_camera_resources(device);
        queue.write_buffer(&camera.lighting_buffer, 0, bytemuck::bytes_of(&LightingUniform::default()));

        let pipeline = create_scene_pipeline(device, format, &camera.bind_group_layout);
        let (_, depth_view) = create_depth_texture(device, width, height);
        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            format,
            alpha_mode,
            width,
            height,
            pipeline,
            camera,
            depth_view,
            ground: ground.upload(device),
            egui_renderer,
        }
    }

    fn surface_config(&self) -> SurfaceConfiguration {
        SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: PresentMode::Fifo,
            alpha_mode: self.alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Reconfigure the surface and recreate the depth buffer
    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        surface.configure(device, &self.surface_config());
        self.depth_view = create_depth_texture(device, width, height).1;
    }

    pub fn update_camera(&self, queue: &Queue, camera: &Camera) {
        queue.write_buffer(
            &self.camera.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );
    }

    pub fn draw_frame(
        &mut self,
        device: &Device,
        queue: &Queue,
        surface: &Surface,
        dynamic: &Mesh,
        ui: Option<UiFrame>,
    ) -> Result<(), SurfaceError> {
        let frame = match surface.get_current_texture() {
            Ok(frame) => frame,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                surface.configure(device, &self.surface_config());
                surface.get_current_texture()?
            }
            Err(e) => return Err(e),
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        let dynamic = (!dynamic.is_empty()).then(|| dynamic.upload(device));
        let [r, g, b] = config::lighting::SKY_COLOR;

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color { r, g, b, a: 1.0 }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera.camera_bind_group, &[]);

            for mesh_buffer in std::iter::once(&self.ground).chain(dynamic.as_ref()) {
                if mesh_buffer.index_count == 0 {
                    continue;
                }
                rp.set_vertex_buffer(0, mesh_buffer.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh_buffer.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh_buffer.index_count, 0, 0..1);
            }
        }

        if let Some(ui) = ui {
            self.draw_ui(device, queue, &mut encoder, &view, ui);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn draw_ui(
        &mut self,
        device: &Device,
        queue: &Queue,
        encoder: &mut CommandEncoder,
        view: &TextureView,
        ui: UiFrame,
    ) {
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.width, self.height],
            pixels_per_point: ui.pixels_per_point,
        };

        for (id, image_delta) in &ui.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, encoder, &ui.primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &ui.primitives, &screen_descriptor);
        }

        for id in &ui.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
        assert_eq!(std::mem::size_of::<LightingUniform>(), 32);
    }

    #[test]
    fn test_sun_points_up_toward_sun() {
        let light = LightingUniform::default();
        let dir = Vec3::from(light.sun_dir);
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.y > 0.0);
        assert_eq!(light.ambient, 0.3);
    }
}
