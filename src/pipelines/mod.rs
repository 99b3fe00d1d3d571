//! Render pipelines: opaque and alpha-blended variants of the scene shader,
//! plus the directional light resources they share.

pub mod basic;
pub mod light;
pub mod transparent;

/// The two pipelines a frame renders with.
pub struct Pipelines {
    pub basic: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        light_bind_group_layout: &wgpu::BindGroupLayout,
        camera_bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            basic: basic::mk_basic_pipeline(
                device,
                config,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
            transparent: transparent::mk_transparent_pipeline(
                device,
                config,
                light_bind_group_layout,
                camera_bind_group_layout,
            ),
        }
    }
}
