//! A small scrollable town: a textured floor, a handful of animated props,
//! and a character that walks wherever you click. Scrolling the mouse wheel
//! tours the camera through the town's sections.

use std::f32::consts::PI;

use walkabout::{
    app::{run, SceneConstructor, SceneSetup},
    data_structures::instance::Instance,
    entity::EntityDesc,
    resources::mk_floor,
    scene::Scene,
    sections::ScrollSections,
};
use walkabout::{Point3, Quaternion, Rad, Rotation3, Vector3};

/// The glb exports are huge; this brings them down to town scale.
const MODEL_SCALE: f32 = 0.0065;

fn place(position: (f32, f32, f32), rot_y: f32, scale: f32) -> Instance {
    Instance {
        position: Vector3::new(position.0, position.1, position.2),
        rotation: Quaternion::from_angle_y(Rad(rot_y)),
        scale: Vector3::new(scale, scale, scale),
    }
}

fn prop(name: &str, file: &str, placement: Instance) -> EntityDesc {
    EntityDesc {
        name: name.into(),
        file_name: file.into(),
        placement,
        interactive: false,
        tint: None,
    }
}

fn main() -> anyhow::Result<()> {
    let constructor: SceneConstructor = Box::new(|init| {
        Box::pin(async move {
            let mut scene = Scene::new();

            let floor =
                mk_floor(Some("ground.jpg"), 100.0, 10.0, &init.device, &init.queue).await?;
            scene.spawn_with_model("floor", floor, Instance::new());

            // The character that walks to clicked points.
            scene.spawn(EntityDesc {
                name: "player".into(),
                file_name: "tex_move.glb".into(),
                placement: place((-5.0, 0.0, 20.0), 0.0, MODEL_SCALE),
                interactive: true,
                tint: None,
            });

            scene.spawn(prop(
                "charge",
                "tex_charge.glb",
                place((10.4, 0.3, 10.0), -PI / 3.4, MODEL_SCALE),
            ));
            scene.spawn(prop(
                "hose",
                "hose1.glb",
                place((-12.95, 0.25, 0.0), PI / 4.0, MODEL_SCALE),
            ));
            scene.spawn(prop(
                "hose_legs",
                "hose2.glb",
                place((-13.0, 0.0, 0.0), PI / 4.0, MODEL_SCALE),
            ));
            scene.spawn(prop(
                "ear",
                "tex_ear.glb",
                place((13.5, 0.3, -10.0), -PI / 3.0, MODEL_SCALE),
            ));
            // Translucent rain cloud over the ear.
            scene.spawn(EntityDesc {
                name: "rain".into(),
                file_name: "rain_2.glb".into(),
                placement: place((13.5, 1.7, -10.0), 0.0, 0.008),
                interactive: false,
                tint: Some([0.851, 0.851, 0.851, 0.7]),
            });

            // One scroll section per stop on the tour.
            let anchors = vec![
                Point3::new(-5.0, 0.0, 20.0),
                Point3::new(7.0, 0.0, 10.0),
                Point3::new(-10.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, -10.0),
                Point3::new(-5.0, 0.0, -20.0),
            ];
            let sections = ScrollSections::new(anchors, init.viewport_height);

            Ok(SceneSetup {
                scene,
                sections,
                camera: None,
            })
        })
    });

    run(constructor)
}
