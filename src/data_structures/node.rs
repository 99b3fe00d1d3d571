//! The scene node tree.
//!
//! Entities own a small tree of nodes: a container root placed in the world,
//! with the loaded glTF nodes underneath. Nodes flagged `animated` get their
//! local transform overwritten by the entity's animation player each frame.

use wgpu::util::DeviceExt;

use crate::data_structures::bounds::Aabb;
use crate::data_structures::instance::Instance;
use crate::data_structures::model::Model;
use crate::render::Instanced;

#[derive(Debug)]
pub struct SceneNode {
    pub model: Option<Model>,
    pub local: Instance,
    world: Instance,
    pub animated: bool,
    children: Vec<SceneNode>,
    instance_buffer: Option<wgpu::Buffer>,
}

impl SceneNode {
    /// A node with no geometry of its own, used as a placement root.
    pub fn container(local: Instance) -> Self {
        Self {
            model: None,
            local,
            world: Instance::new(),
            animated: false,
            children: Vec::new(),
            instance_buffer: None,
        }
    }

    pub fn with_model(model: Model, local: Instance) -> Self {
        Self {
            model: Some(model),
            local,
            world: Instance::new(),
            animated: false,
            children: Vec::new(),
            instance_buffer: None,
        }
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Recompute world transforms top-down from `parent`.
    pub fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        for child in &mut self.children {
            child.update_world_transforms(&self.world);
        }
    }

    /// Overwrite the local transform of every animated node with `pose`.
    pub fn apply_to_animated(&mut self, pose: &Instance) {
        if self.animated {
            self.local = pose.clone();
        }
        for child in &mut self.children {
            child.apply_to_animated(pose);
        }
    }

    /// Upload current world transforms to the per-node instance buffers,
    /// creating them on first use.
    pub fn write_to_buffers(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.model.is_some() {
            let raw = [self.world.to_raw()];
            match &self.instance_buffer {
                Some(buffer) => queue.write_buffer(buffer, 0, bytemuck::cast_slice(&raw)),
                None => {
                    self.instance_buffer =
                        Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("node instance buffer"),
                            contents: bytemuck::cast_slice(&raw),
                            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                        }));
                }
            }
        }
        for child in &mut self.children {
            child.write_to_buffers(device, queue);
        }
    }

    /// World-space bounds of this subtree's geometry.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let own = self
            .model
            .as_ref()
            .and_then(|m| m.bounds())
            .map(|b| b.transformed(&self.world));
        self.children
            .iter()
            .filter_map(|c| c.world_bounds())
            .fold(own, |acc, b| match acc {
                Some(a) => Some(a.union(b)),
                None => Some(b),
            })
    }

    /// Flatten this subtree into draw records. Nodes without an uploaded
    /// instance buffer are skipped until the next `write_to_buffers`.
    pub fn collect_renders<'a>(&'a self, out: &mut Vec<Instanced<'a>>) {
        if let (Some(model), Some(buffer)) = (&self.model, &self.instance_buffer) {
            out.push(Instanced {
                model,
                instance_buffer: buffer,
                instances: 0..1,
            });
        }
        for child in &self.children {
            child.collect_renders(out);
        }
    }
}
