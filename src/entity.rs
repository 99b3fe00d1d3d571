//! Scene entities.
//!
//! An entity is a placed, optionally interactive thing in the town: a house,
//! a prop, the walking character. Its visual node tree arrives later from an
//! async load; until then the entity exists with a placement and no geometry.

use cgmath::{EuclideanSpace, Point3};

use crate::animation::AnimationPlayer;
use crate::camera::Camera;
use crate::data_structures::bounds::Aabb;
use crate::data_structures::instance::Instance;
use crate::data_structures::model::Model;
use crate::data_structures::node::SceneNode;
use crate::render::FrameBatches;
use crate::resources::LoadedAsset;
use crate::tween::{Easing, Tween};

/// How long an entity takes to walk to a clicked point, in seconds.
pub const WALK_DURATION: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Everything needed to spawn an entity before its asset has loaded.
#[derive(Clone, Debug)]
pub struct EntityDesc {
    pub name: String,
    pub file_name: String,
    pub placement: Instance,
    /// Interactive entities walk to clicked points.
    pub interactive: bool,
    /// Overrides every material colour factor. An alpha below `1.0` moves
    /// the entity to the transparent render batch.
    pub tint: Option<[f32; 4]>,
}

pub struct Entity {
    id: EntityId,
    name: String,
    placement: Instance,
    interactive: bool,
    tint: Option<[f32; 4]>,
    node: Option<SceneNode>,
    player: Option<AnimationPlayer>,
    walk: Option<Tween>,
    /// Entity-local bounds of the attached geometry, cached at attach time.
    local_bounds: Option<Aabb>,
}

impl Entity {
    pub fn new(id: EntityId, desc: &EntityDesc) -> Self {
        Self {
            id,
            name: desc.name.clone(),
            placement: desc.placement.clone(),
            interactive: desc.interactive,
            tint: desc.tint,
            node: None,
            player: None,
            walk: None,
            local_bounds: None,
        }
    }

    /// An entity that already has its geometry, like the generated floor.
    pub fn from_model(id: EntityId, name: &str, model: Model, placement: Instance) -> Self {
        let mut node = SceneNode::with_model(model, Instance::new());
        node.update_world_transforms(&Instance::new());
        let local_bounds = node.world_bounds();
        Self {
            id,
            name: name.to_string(),
            placement,
            interactive: false,
            tint: None,
            node: Some(node),
            player: None,
            walk: None,
            local_bounds,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point3<f32> {
        Point3::from_vec(self.placement.position)
    }

    pub fn is_loaded(&self) -> bool {
        self.node.is_some()
    }

    pub fn is_walking(&self) -> bool {
        self.walk.is_some()
    }

    pub fn walk_target(&self) -> Option<Point3<f32>> {
        self.walk.as_ref().map(|t| t.target())
    }

    fn is_transparent(&self) -> bool {
        self.tint.map(|t| t[3] < 1.0).unwrap_or(false)
    }

    /// Hook the loaded node tree onto this entity. Picks the file's first
    /// animation clip, if it has one.
    pub fn attach_asset(&mut self, asset: LoadedAsset) {
        let mut node = asset.root;
        node.update_world_transforms(&Instance::new());
        self.local_bounds = node.world_bounds();
        self.node = Some(node);
        match asset.animations.into_iter().next() {
            Some(clip) => self.player = Some(AnimationPlayer::new(clip)),
            None => log::info!("no animation in {}", self.name),
        }
    }

    /// World-space bounds, `None` while the asset is still loading.
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.local_bounds.map(|b| b.transformed(&self.placement))
    }

    /// React to a pointer hit somewhere in the world. Interactive entities
    /// start walking there; a walk already underway is replaced.
    pub fn on_intersect(&mut self, point: Point3<f32>) {
        if !self.interactive {
            return;
        }
        self.walk = Some(Tween::new(
            self.position(),
            point,
            WALK_DURATION,
            Easing::QuadInOut,
        ));
    }

    /// Per-frame update: advance the walk, keep the camera on a walking
    /// entity, advance the animation, and recompute node world transforms.
    pub fn update(&mut self, dt: f32, camera: &mut Camera) {
        if let Some(walk) = &mut self.walk {
            self.placement.position = walk.advance(dt).to_vec();
            camera.look_at(Point3::from_vec(self.placement.position));
            if walk.is_finished() {
                self.walk = None;
            }
        }

        if let Some(node) = &mut self.node {
            if let Some(player) = &mut self.player {
                let pose = player.update(dt);
                node.apply_to_animated(&pose);
            }
            node.update_world_transforms(&self.placement);
        }
    }

    /// Upload instance data for this entity's nodes.
    pub fn prepare_render(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if let Some(node) = &mut self.node {
            node.write_to_buffers(device, queue);
        }
    }

    pub fn collect_renders<'a>(&'a self, batches: &mut FrameBatches<'a>) {
        if let Some(node) = &self.node {
            let out = if self.is_transparent() {
                &mut batches.transparent
            } else {
                &mut batches.opaque
            };
            node.collect_renders(out);
        }
    }

    /// Override the hit-test bounds, e.g. for entities without geometry.
    /// Replaced if an asset attaches later.
    pub fn set_local_bounds(&mut self, bounds: Aabb) {
        self.local_bounds = Some(bounds);
    }
}
