use std::{
    collections::HashMap,
    io::{BufReader, Cursor},
};

use futures::future::join_all;

use crate::{
    animation::AnimationClip,
    data_structures::{
        bounds::Aabb,
        instance::Instance,
        model::{Material, Mesh, Model, ModelVertex},
        node::SceneNode,
        texture::Texture,
    },
    resources::{
        animation::{merge_channels, Keyframes, RawChannel},
        texture::{load_binary, load_texture, material_layout},
    },
};

/// Loading of meshes, textures and animations from external files.
pub mod animation;
pub mod texture;

/// Everything a finished model load produces: a node tree ready to hang off
/// an entity, and the clips found in the file.
pub struct LoadedAsset {
    pub root: SceneNode,
    pub animations: Vec<AnimationClip>,
}

/// Load a `.glb`/`.gltf` file into a node tree. `tint` overrides every
/// material's colour factor, which is also how translucency is requested
/// (alpha below `1.0`).
pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    tint: Option<[f32; 4]>,
) -> anyhow::Result<LoadedAsset> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_cursor = Cursor::new(gltf_bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers, fetching external ones concurrently.
    let buffer_futures = gltf.buffers().map(|buffer| {
        let blob = gltf.blob.as_deref();
        async move {
            match buffer.source() {
                gltf::buffer::Source::Bin => blob
                    .map(|b| b.to_vec())
                    .ok_or_else(|| anyhow::anyhow!("missing binary blob in {}", buffer.index())),
                gltf::buffer::Source::Uri(uri) => load_binary(uri).await,
            }
        }
    });
    let buffer_data = join_all(buffer_futures)
        .await
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()?;

    // Collect animation channels per target node, then merge each node's
    // channels into one clip of full poses.
    let mut raw_channels: HashMap<usize, Vec<RawChannel>> = HashMap::new();
    let mut clip_names: HashMap<usize, String> = HashMap::new();
    for animation in gltf.animations() {
        for channel in animation.channels() {
            let reader = channel.reader(|buffer| Some(&buffer_data[buffer.index()]));
            let timestamps = match reader.read_inputs() {
                Some(gltf::accessor::Iter::Standard(times)) => times.collect(),
                Some(gltf::accessor::Iter::Sparse(_)) | None => {
                    log::warn!("unsupported animation inputs in channel {}", channel.index());
                    Vec::new()
                }
            };
            let keyframes = match reader.read_outputs() {
                Some(gltf::animation::util::ReadOutputs::Translations(translations)) => {
                    Keyframes::Translation(translations.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Rotations(rotations)) => {
                    Keyframes::Rotation(rotations.into_f32().map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::Scales(scales)) => {
                    Keyframes::Scale(scales.map(Into::into).collect())
                }
                Some(gltf::animation::util::ReadOutputs::MorphTargetWeights(_)) | None => {
                    Keyframes::Other
                }
            };
            let node_index = channel.target().node().index();
            clip_names
                .entry(node_index)
                .or_insert_with(|| animation.name().unwrap_or("Default").to_string());
            raw_channels
                .entry(node_index)
                .or_default()
                .push(RawChannel {
                    timestamps,
                    keyframes,
                });
        }
    }
    let mut clips: HashMap<usize, AnimationClip> = HashMap::new();
    for (node_index, channels) in &raw_channels {
        let name = clip_names
            .get(node_index)
            .map(String::as_str)
            .unwrap_or("Default");
        if let Some(clip) = merge_channels(name, channels) {
            clips.insert(*node_index, clip);
        }
    }

    // Load materials. Untextured ones sample a 1x1 white pixel so the
    // colour factor alone decides their look.
    let layout = material_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr
            .base_color_texture()
            .map(|tex| tex.texture().source().source())
        {
            Some(gltf::image::Source::View { view, mime_type: _ }) => Texture::from_bytes(
                device,
                queue,
                &buffer_data[view.buffer().index()]
                    [view.offset()..view.offset() + view.length()],
                file_name,
            )?,
            Some(gltf::image::Source::Uri { uri, mime_type: _ }) => {
                load_texture(uri, device, queue).await?
            }
            None => Texture::solid(device, queue, [255, 255, 255, 255], file_name),
        };
        let base_color = tint.unwrap_or(pbr.base_color_factor());
        let name = material.name().unwrap_or(file_name);
        materials.push(Material::new(
            device,
            name,
            diffuse_texture,
            base_color,
            &layout,
        ));
    }
    if materials.is_empty() {
        let diffuse_texture = Texture::solid(device, queue, [255, 255, 255, 255], file_name);
        materials.push(Material::new(
            device,
            file_name,
            diffuse_texture,
            tint.unwrap_or([1.0, 1.0, 1.0, 1.0]),
            &layout,
        ));
    }

    // Wrap the file's scene nodes in a container so entity placement and the
    // file's own transforms never fight over the same node.
    let mut root = SceneNode::container(Instance::new());
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            root.add_child(to_scene_node(node, &buffer_data, device, &materials, &clips));
        }
    }

    Ok(LoadedAsset {
        root,
        animations: clips.into_values().collect(),
    })
}

fn to_scene_node(
    node: gltf::scene::Node,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    materials: &[Material],
    clips: &HashMap<usize, AnimationClip>,
) -> SceneNode {
    use wgpu::util::DeviceExt;

    let decomposed = node.transform().decomposed();
    let local = Instance {
        position: decomposed.0.into(),
        rotation: decomposed.1.into(),
        scale: decomposed.2.into(),
    };

    let mut scene_node = match node.mesh() {
        Some(mesh) => {
            let mut meshes = Vec::new();
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| Some(&buffer_data[buffer.index()]));

                let mut vertices: Vec<ModelVertex> = Vec::new();
                if let Some(positions) = reader.read_positions() {
                    vertices.extend(positions.map(|position| ModelVertex {
                        position,
                        tex_coords: Default::default(),
                        normal: Default::default(),
                    }));
                }
                if let Some(normals) = reader.read_normals() {
                    for (vertex, normal) in vertices.iter_mut().zip(normals) {
                        vertex.normal = normal;
                    }
                }
                if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                    for (vertex, tex_coord) in vertices.iter_mut().zip(tex_coords) {
                        vertex.tex_coords = tex_coord;
                    }
                }

                let mut indices = Vec::new();
                if let Some(indices_raw) = reader.read_indices() {
                    indices.extend(indices_raw.into_u32());
                }

                let bounds =
                    Aabb::from_points(vertices.iter().map(|v| v.position.into()))
                        .unwrap_or(Aabb::new([0.0; 3].into(), [0.0; 3].into()));

                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Vertex Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} Index Buffer", mesh.name())),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

                meshes.push(Mesh {
                    name: mesh.name().unwrap_or("unknown_mesh").to_string(),
                    vertex_buffer,
                    index_buffer,
                    num_elements: indices.len() as u32,
                    material: primitive.material().index().unwrap_or(0),
                    bounds,
                });
            }
            let model = Model {
                meshes,
                materials: materials.to_vec(),
            };
            SceneNode::with_model(model, local)
        }
        None => SceneNode::container(local),
    };
    scene_node.animated = clips.contains_key(&node.index());

    for child in node.children() {
        scene_node.add_child(to_scene_node(child, buffer_data, device, materials, clips));
    }

    scene_node
}

/// A flat textured ground plane centered on the origin at `y = 0`, `size`
/// units on each side with the texture tiled `uv_repeat` times.
pub async fn mk_floor(
    texture_file: Option<&str>,
    size: f32,
    uv_repeat: f32,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<Model> {
    use wgpu::util::DeviceExt;

    let diffuse_texture = match texture_file {
        Some(file_name) => load_texture(file_name, device, queue).await?,
        None => Texture::solid(device, queue, [140, 130, 120, 255], "floor"),
    };
    let layout = material_layout(device);
    let material = Material::new(device, "floor", diffuse_texture, [1.0, 1.0, 1.0, 1.0], &layout);

    let half = size / 2.0;
    let up = [0.0, 1.0, 0.0];
    let vertices = [
        ModelVertex {
            position: [-half, 0.0, -half],
            tex_coords: [0.0, 0.0],
            normal: up,
        },
        ModelVertex {
            position: [-half, 0.0, half],
            tex_coords: [0.0, uv_repeat],
            normal: up,
        },
        ModelVertex {
            position: [half, 0.0, half],
            tex_coords: [uv_repeat, uv_repeat],
            normal: up,
        },
        ModelVertex {
            position: [half, 0.0, -half],
            tex_coords: [uv_repeat, 0.0],
            normal: up,
        },
    ];
    let indices: [u32; 6] = [0, 1, 2, 0, 2, 3];

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Floor Vertex Buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Floor Index Buffer"),
        contents: bytemuck::cast_slice(&indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    Ok(Model {
        meshes: vec![Mesh {
            name: "floor".to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
            material: 0,
            bounds: Aabb::new(
                [-half, 0.0, -half].into(),
                [half, 0.0, half].into(),
            ),
        }],
        materials: vec![material],
    })
}
