use crate::constants::{AMBIENT_INTENSITY, DIRECTIONAL_INTENSITY, DIRECTIONAL_POSITION, SKY_COLOR};
use glam::{Mat4, Vec2, Vec3};
use landing_core::{Camera, SegmentScene};
use web_sys as web;
use wgpu::util::DeviceExt;

mod helpers;

static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
    uv: [f32; 2],
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
    light: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct NodeUniforms {
    model: [[f32; 4]; 4],
    normal: [[f32; 4]; 4],
    color: [f32; 4],
}

// One uploaded scene node; `node` indexes `SegmentScene::nodes()`.
struct GpuMesh {
    node: usize,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuState<'a> {
    surface: wgpu::Surface<'a>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    _depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    // 1x1 white, bound for meshes without a base colour texture
    white: wgpu::TextureView,
    meshes: Vec<GpuMesh>,
    uploaded_nodes: usize,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,
}

impl<'a> GpuState<'a> {
    pub async fn new(canvas: &'a web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width();
        let height = canvas.height();

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (depth_tex, depth_view) = helpers::create_depth_texture(&device, width, height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(SCENE_WGSL.into()),
        });
        let scene_layout = helpers::uniform_layout(&device, "scene_bgl");
        let node_layout = helpers::textured_layout(&device, "node_bgl");
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene_pipeline_layout"),
            bind_group_layouts: &[&scene_layout, &node_layout],
            push_constant_ranges: &[],
        });
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        };
        let pipeline =
            helpers::make_scene_pipeline(&device, &pipeline_layout, &shader, vertex_layout, format);

        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene_uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let scene_bind_group =
            helpers::uniform_bind_group(&device, "scene_bg", &scene_layout, &scene_buffer);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("base_color_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = helpers::create_rgba_texture(&device, &queue, "white_tex", 1, 1, &[255; 4]);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            _depth_tex: depth_tex,
            depth_view,
            scene_buffer,
            scene_bind_group,
            node_layout,
            sampler,
            white,
            meshes: Vec::new(),
            uploaded_nodes: 0,
            width: width.max(1),
            height: height.max(1),
            clear_color: wgpu::Color {
                r: helpers::srgb_to_linear(SKY_COLOR[0]),
                g: helpers::srgb_to_linear(SKY_COLOR[1]),
                b: helpers::srgb_to_linear(SKY_COLOR[2]),
                a: 1.0,
            },
        })
    }

    /// Number of scene nodes the current GPU buffers were built from.
    pub fn uploaded_nodes(&self) -> usize {
        self.uploaded_nodes
    }

    /// (Re)build textures and vertex/index/uniform buffers for every mesh node.
    pub fn upload_scene(&mut self, scene: &SegmentScene) {
        self.meshes.clear();
        let textures: Vec<wgpu::TextureView> = scene
            .textures()
            .iter()
            .map(|img| {
                helpers::create_rgba_texture(
                    &self.device,
                    &self.queue,
                    "base_color_tex",
                    img.width,
                    img.height,
                    &img.rgba,
                )
            })
            .collect();
        for (i, node) in scene.nodes().iter().enumerate() {
            let mesh = &node.mesh;
            if mesh.indices.is_empty() {
                continue;
            }
            let vertices: Vec<Vertex> = mesh
                .positions
                .iter()
                .zip(mesh.normals.iter().chain(std::iter::repeat(&Vec3::Y)))
                .zip(mesh.uvs.iter().chain(std::iter::repeat(&Vec2::ZERO)))
                .map(|((p, n), uv)| Vertex {
                    position: p.to_array(),
                    normal: n.to_array(),
                    uv: uv.to_array(),
                })
                .collect();
            let vertex_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("node_vb"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("node_ib"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
            let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("node_uniforms"),
                size: std::mem::size_of::<NodeUniforms>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let view = mesh
                .texture
                .and_then(|t| textures.get(t))
                .unwrap_or(&self.white);
            let bind_group = helpers::textured_bind_group(
                &self.device,
                "node_bg",
                &self.node_layout,
                &uniform_buffer,
                view,
                &self.sampler,
            );
            self.meshes.push(GpuMesh {
                node: i,
                vertex_buffer,
                index_buffer,
                index_count: mesh.indices.len() as u32,
                uniform_buffer,
                bind_group,
            });
        }
        self.uploaded_nodes = scene.len();
        log::info!(
            "[render] uploaded {} meshes, {} textures",
            self.meshes.len(),
            textures.len()
        );
    }

    pub fn resize_if_needed(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
            let (depth_tex, depth_view) = helpers::create_depth_texture(&self.device, width, height);
            self._depth_tex = depth_tex;
            self.depth_view = depth_view;
        }
    }

    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn render(&mut self, camera: &Camera, scene: &SegmentScene) -> Result<(), wgpu::SurfaceError> {
        let light_dir = Vec3::from(DIRECTIONAL_POSITION).normalize();
        let su = SceneUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_dir: light_dir.extend(0.0).to_array(),
            light: [AMBIENT_INTENSITY, DIRECTIONAL_INTENSITY, 0.0, 0.0],
        };
        self.queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::bytes_of(&su));

        for mesh in &self.meshes {
            let (Some(model), Some(node)) = (scene.world_matrix(mesh.node), scene.nodes().get(mesh.node))
            else {
                continue;
            };
            let nu = NodeUniforms {
                model: model.to_cols_array_2d(),
                normal: normal_matrix(model).to_cols_array_2d(),
                color: node.mesh.base_color,
            };
            self.queue
                .write_buffer(&mesh.uniform_buffer, 0, bytemuck::bytes_of(&nu));
        }

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
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
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.scene_bind_group, &[]);
            for mesh in &self.meshes {
                rpass.set_bind_group(1, &mesh.bind_group, &[]);
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn normal_matrix(model: Mat4) -> Mat4 {
    if model.determinant().abs() <= f32::EPSILON {
        return Mat4::IDENTITY;
    }
    model.inverse().transpose()
}
