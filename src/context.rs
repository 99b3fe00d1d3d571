use std::sync::Arc;

use winit::window::Window;

use crate::{
    camera::{Camera, CameraResources, CameraUniform, Projection},
    data_structures::{model::DrawModel, texture::Texture},
    pipelines::{
        light::{LightResources, LightUniform},
        Pipelines,
    },
    scene::Scene,
};

/// Backdrop, also the fog colour, so distant geometry dissolves into the sky.
pub const BACKDROP: wgpu::Color = wgpu::Color {
    r: 0.757,
    g: 0.694,
    b: 0.667,
    a: 1.0,
};
pub const FOG_COLOR: [f32; 3] = [0.757, 0.694, 0.667];
pub const FOG_NEAR: f32 = 5.0;
pub const FOG_FAR: f32 = 10.0;

/// The GPU context: surface, device, pipelines, and the camera and light
/// resources every frame binds.
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: Camera,
    pub projection: Projection,
    pub camera_resources: CameraResources,
    pub light: LightResources,
    pub pipelines: Pipelines,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader assumes an sRGB surface; a linear one would come out darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let camera = Camera::new((-5.0, 2.0, 25.0).into(), (-5.0, 1.0, 0.0).into());
        let projection = Projection::new(
            config.width,
            config.height,
            cgmath::Deg(75.0).into(),
            0.1,
            100.0,
        );

        let mut camera_uniform = CameraUniform::new(FOG_COLOR, FOG_NEAR, FOG_FAR);
        camera_uniform.update_view_proj(&camera, &projection);
        let camera_resources = CameraResources::new(&device, camera_uniform);

        // Warm directional light plus an orange ambient wash.
        let light_uniform = LightUniform::new(
            [0.577, 0.577, 0.577],
            [1.0, 1.0, 1.0],
            [0.7, 0.45, 0.0],
        );
        let light = LightResources::new(&device, light_uniform);

        let pipelines = Pipelines::new(
            &device,
            &config,
            &light.bind_group_layout,
            &camera_resources.bind_group_layout,
        );

        let depth_texture = Texture::create_depth_texture(&device, &config, "depth_texture");

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            projection,
            camera_resources,
            light,
            pipelines,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, &self.config, "depth_texture");
        self.projection.resize(width, height);
    }

    /// Draw one frame: opaque batch first, transparent batch on top.
    pub fn render(&mut self, scene: &mut Scene) -> Result<(), wgpu::SurfaceError> {
        self.camera_resources
            .upload(&self.queue, &self.camera, &self.projection);
        scene.prepare_render(&self.device, &self.queue);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(BACKDROP),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let batches = scene.collect_batches();

            render_pass.set_pipeline(&self.pipelines.basic);
            for item in &batches.opaque {
                render_pass.set_vertex_buffer(1, item.instance_buffer.slice(..));
                render_pass.draw_model_instanced(
                    item.model,
                    item.instances.clone(),
                    &self.camera_resources.bind_group,
                    &self.light.bind_group,
                );
            }

            render_pass.set_pipeline(&self.pipelines.transparent);
            for item in &batches.transparent {
                render_pass.set_vertex_buffer(1, item.instance_buffer.slice(..));
                render_pass.draw_model_instanced(
                    item.model,
                    item.instances.clone(),
                    &self.camera_resources.bind_group,
                    &self.light.bind_group,
                );
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
