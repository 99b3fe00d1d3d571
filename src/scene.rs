//! The scene aggregate: every entity in the town, keyed by id.

use std::collections::BTreeMap;

use cgmath::Point3;

use crate::camera::{Camera, Ray};
use crate::data_structures::instance::Instance;
use crate::data_structures::model::Model;
use crate::entity::{Entity, EntityDesc, EntityId};
use crate::render::FrameBatches;
use crate::resources::LoadedAsset;

/// An asset load the app still has to kick off for a spawned entity.
#[derive(Clone, Debug)]
pub struct LoadRequest {
    pub entity: EntityId,
    pub file_name: String,
    pub tint: Option<[f32; 4]>,
}

#[derive(Default)]
pub struct Scene {
    entities: BTreeMap<EntityId, Entity>,
    pending: Vec<LoadRequest>,
    next_id: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawn an entity whose asset still has to load. The load request is
    /// queued for the app to pick up.
    pub fn spawn(&mut self, desc: EntityDesc) -> EntityId {
        let id = self.next_id();
        self.pending.push(LoadRequest {
            entity: id,
            file_name: desc.file_name.clone(),
            tint: desc.tint,
        });
        self.entities.insert(id, Entity::new(id, &desc));
        id
    }

    /// Spawn an entity around an already-built model, like the floor.
    pub fn spawn_with_model(&mut self, name: &str, model: Model, placement: Instance) -> EntityId {
        let id = self.next_id();
        self.entities
            .insert(id, Entity::from_model(id, name, model, placement));
        id
    }

    /// Drain the load requests queued since the last call.
    pub fn take_pending_loads(&mut self) -> Vec<LoadRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Hook a finished load onto its entity.
    pub fn attach(&mut self, id: EntityId, asset: LoadedAsset) {
        match self.entities.get_mut(&id) {
            Some(entity) => entity.attach_asset(asset),
            None => log::warn!("asset arrived for unknown entity {:?}", id),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Advance every entity by `dt` seconds.
    pub fn update(&mut self, dt: f32, camera: &mut Camera) {
        for entity in self.entities.values_mut() {
            entity.update(dt, camera);
        }
    }

    /// Broadcast a pointer hit point to every entity.
    pub fn on_intersect(&mut self, point: Point3<f32>) {
        for entity in self.entities.values_mut() {
            entity.on_intersect(point);
        }
    }

    /// Closest entity bounds hit by `ray`, with the hit point. Entities
    /// whose assets are still loading have no bounds and are skipped.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<(EntityId, Point3<f32>)> {
        self.entities
            .values()
            .filter_map(|entity| {
                let bounds = entity.world_bounds()?;
                let t = ray.intersect_aabb(&bounds)?;
                Some((entity.id(), t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, t)| (id, ray.point_at(t)))
    }

    pub fn prepare_render(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        for entity in self.entities.values_mut() {
            entity.prepare_render(device, queue);
        }
    }

    pub fn collect_batches(&self) -> FrameBatches<'_> {
        let mut batches = FrameBatches::default();
        for entity in self.entities.values() {
            entity.collect_renders(&mut batches);
        }
        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::bounds::Aabb;
    use cgmath::Vector3;

    fn desc(name: &str, at: Vector3<f32>, interactive: bool) -> EntityDesc {
        EntityDesc {
            name: name.into(),
            file_name: format!("{name}.glb"),
            placement: Instance::from(at),
            interactive,
            tint: None,
        }
    }

    #[test]
    fn spawn_queues_one_load_per_entity() {
        let mut scene = Scene::new();
        scene.spawn(desc("a", Vector3::new(0.0, 0.0, 0.0), false));
        scene.spawn(desc("b", Vector3::new(1.0, 0.0, 0.0), true));

        let pending = scene.take_pending_loads();
        assert_eq!(pending.len(), 2);
        assert!(scene.take_pending_loads().is_empty());
    }

    #[test]
    fn hit_point_is_broadcast_to_every_interactive_entity() {
        let mut scene = Scene::new();
        let walker = scene.spawn(desc("walker", Vector3::new(0.0, 0.0, 0.0), true));
        let house = scene.spawn(desc("house", Vector3::new(5.0, 0.0, 0.0), false));

        scene.on_intersect(Point3::new(3.0, 0.0, 3.0));

        assert!(scene.entity(walker).unwrap().is_walking());
        assert!(!scene.entity(house).unwrap().is_walking());
    }

    #[test]
    fn nearest_hit_prefers_the_closer_entity() {
        let mut scene = Scene::new();
        let near = scene.spawn(desc("near", Vector3::new(0.0, 0.0, 2.0), false));
        let far = scene.spawn(desc("far", Vector3::new(0.0, 0.0, -6.0), false));
        let cube = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        scene.entity_mut(near).unwrap().set_local_bounds(cube);
        scene.entity_mut(far).unwrap().set_local_bounds(cube);

        let ray = Ray {
            origin: Point3::new(0.0, 0.0, 10.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        let (hit, point) = scene.nearest_hit(&ray).unwrap();
        assert_eq!(hit, near);
        assert_eq!(point, Point3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn entities_without_bounds_never_block_the_ray() {
        let mut scene = Scene::new();
        scene.spawn(desc("still_loading", Vector3::new(0.0, 0.0, 0.0), true));
        let ray = Ray {
            origin: Point3::new(0.0, 0.0, 10.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        assert!(scene.nearest_hit(&ray).is_none());
    }
}
