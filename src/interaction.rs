//! Pointer interaction: cursor tracking, press-to-ray, hit dispatch.
//!
//! While the pointer is pressed, every frame casts a ray through the cursor
//! against the bounds of the registered entities. The nearest hit's world
//! point is broadcast to every entity in the scene; no hit means no
//! dispatch. The floor takes part like any other entity, through its own
//! flat bounds.

use winit::dpi::PhysicalPosition;

use crate::camera::{Camera, Projection};
use crate::scene::Scene;

#[derive(Default)]
pub struct InteractionController {
    cursor: Option<PhysicalPosition<f64>>,
    pressed: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Some(position);
    }

    pub fn on_pointer_down(&mut self) {
        self.pressed = true;
    }

    pub fn on_pointer_up(&mut self) {
        self.pressed = false;
    }

    /// Cursor position in normalized device coordinates, y up.
    pub fn normalized_coords(&self, width: u32, height: u32) -> Option<(f32, f32)> {
        let cursor = self.cursor?;
        if width == 0 || height == 0 {
            return None;
        }
        let x = 2.0 * cursor.x as f32 / width as f32 - 1.0;
        let y = -(2.0 * cursor.y as f32 / height as f32 - 1.0);
        Some((x, y))
    }

    /// Resolve the cursor against the scene while the pointer is pressed.
    /// Runs once per frame, before entity updates, so a new walk starts this
    /// same frame. A no-op when nothing is pressed.
    pub fn tick(
        &self,
        width: u32,
        height: u32,
        camera: &Camera,
        projection: &Projection,
        scene: &mut Scene,
    ) {
        if !self.pressed {
            return;
        }

        let Some(ndc) = self.normalized_coords(width, height) else {
            return;
        };
        let ray = camera.pointer_ray(ndc, projection);
        if let Some((_, point)) = scene.nearest_hit(&ray) {
            scene.on_intersect(point);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::bounds::Aabb;
    use crate::data_structures::instance::Instance;
    use crate::entity::EntityDesc;
    use cgmath::{Deg, Point3, Vector3};

    fn test_setup() -> (Camera, Projection) {
        let camera = Camera::new(Point3::new(0.0, 2.0, 10.0), Point3::new(0.0, 2.0, 0.0));
        let projection = Projection::new(800, 600, Deg(75.0).into(), 0.1, 100.0);
        (camera, projection)
    }

    /// A ground entity with flat bounds, standing in for the loaded floor.
    fn spawn_floor(scene: &mut Scene) {
        let id = scene.spawn(EntityDesc {
            name: "floor".into(),
            file_name: "ground.glb".into(),
            placement: Instance::new(),
            interactive: false,
            tint: None,
        });
        scene.entity_mut(id).unwrap().set_local_bounds(Aabb::new(
            Point3::new(-50.0, 0.0, -50.0),
            Point3::new(50.0, 0.0, 50.0),
        ));
    }

    #[test]
    fn coords_map_corners_to_unit_square() {
        let mut controller = InteractionController::new();
        controller.on_cursor_moved(PhysicalPosition::new(0.0, 0.0));
        assert_eq!(controller.normalized_coords(800, 600), Some((-1.0, 1.0)));

        controller.on_cursor_moved(PhysicalPosition::new(800.0, 600.0));
        assert_eq!(controller.normalized_coords(800, 600), Some((1.0, -1.0)));

        controller.on_cursor_moved(PhysicalPosition::new(400.0, 300.0));
        assert_eq!(controller.normalized_coords(800, 600), Some((0.0, 0.0)));
    }

    #[test]
    fn press_without_cursor_is_a_no_op() {
        let (camera, projection) = test_setup();
        let mut scene = Scene::new();
        let mut controller = InteractionController::new();
        controller.on_pointer_down();
        controller.tick(800, 600, &camera, &projection, &mut scene);
    }

    #[test]
    fn press_on_empty_scene_does_not_panic() {
        let (camera, projection) = test_setup();
        let mut scene = Scene::new();
        let mut controller = InteractionController::new();
        controller.on_cursor_moved(PhysicalPosition::new(400.0, 300.0));
        controller.on_pointer_down();
        controller.tick(800, 600, &camera, &projection, &mut scene);
        assert!(scene.is_empty());
    }

    #[test]
    fn center_click_walks_entity_toward_the_view_axis() {
        // Camera looks down at the origin, so the center ray hits the floor.
        let camera = Camera::new(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 0.0, 0.0));
        let projection = Projection::new(800, 600, Deg(75.0).into(), 0.1, 100.0);
        let mut scene = Scene::new();
        spawn_floor(&mut scene);
        let walker = scene.spawn(EntityDesc {
            name: "walker".into(),
            file_name: "walker.glb".into(),
            placement: Instance::from(Vector3::new(3.0, 0.0, 3.0)),
            interactive: true,
            tint: None,
        });

        let mut controller = InteractionController::new();
        controller.on_cursor_moved(PhysicalPosition::new(400.0, 300.0));
        controller.on_pointer_down();
        controller.tick(800, 600, &camera, &projection, &mut scene);

        let target = scene.entity(walker).unwrap().walk_target().unwrap();
        assert!(target.y.abs() < 1e-4);
        assert!(target.x.abs() < 1e-4);
        assert!(target.z.abs() < 1e-4);
    }

    #[test]
    fn press_without_any_intersection_dispatches_nothing() {
        // The walker is still loading (no bounds) and nothing else is
        // registered, so the ray hits nothing and no entity reacts.
        let camera = Camera::new(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 0.0, 0.0));
        let projection = Projection::new(800, 600, Deg(75.0).into(), 0.1, 100.0);
        let mut scene = Scene::new();
        let walker = scene.spawn(EntityDesc {
            name: "walker".into(),
            file_name: "walker.glb".into(),
            placement: Instance::from(Vector3::new(0.0, 0.0, 0.0)),
            interactive: true,
            tint: None,
        });

        let mut controller = InteractionController::new();
        controller.on_cursor_moved(PhysicalPosition::new(400.0, 300.0));
        controller.on_pointer_down();
        controller.tick(800, 600, &camera, &projection, &mut scene);

        assert!(!scene.entity(walker).unwrap().is_walking());
        assert!(scene.entity(walker).unwrap().walk_target().is_none());
    }

    #[test]
    fn release_stops_hit_dispatch() {
        // Camera looks down at the origin, so the center ray hits the floor.
        let camera = Camera::new(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 0.0, 0.0));
        let projection = Projection::new(800, 600, Deg(75.0).into(), 0.1, 100.0);
        let mut scene = Scene::new();
        spawn_floor(&mut scene);
        let walker = scene.spawn(EntityDesc {
            name: "walker".into(),
            file_name: "walker.glb".into(),
            placement: Instance::from(Vector3::new(0.0, 0.0, 0.0)),
            interactive: true,
            tint: None,
        });

        let mut controller = InteractionController::new();
        controller.on_cursor_moved(PhysicalPosition::new(400.0, 300.0));
        controller.on_pointer_down();
        controller.tick(800, 600, &camera, &projection, &mut scene);
        assert!(scene.entity(walker).unwrap().is_walking());

        // While held, every tick re-targets the walk at the current hit.
        controller.tick(800, 600, &camera, &projection, &mut scene);
        assert!(scene.entity(walker).unwrap().is_walking());

        // After release, the walk finishes undisturbed by further ticks.
        controller.on_pointer_up();
        let mut cam = camera.clone();
        scene.update(10.0, &mut cam);
        controller.tick(800, 600, &camera, &projection, &mut scene);
        assert!(!scene.entity(walker).unwrap().is_walking());
    }
}
