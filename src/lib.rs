//! walkabout
//!
//! A lightweight, cross-platform 3D scene runtime for a scrolling "town" page:
//! a sequence of asynchronously loaded glTF entities, a scroll-driven camera
//! that flies between section anchors, and a click-to-walk character. The
//! crate owns the per-frame update loop and the interaction logic; rendering
//! is a thin instanced wgpu pass.
//!
//! High-level modules
//! - `animation`: animation clips and the single-clip player
//! - `app`: the winit event loop, frame timing and async asset resolution
//! - `camera`: look-at camera, projection, pointer rays and uniforms
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, materials, textures, bounds, scene nodes
//! - `entity`: loadable scene entities with optional animation and walking
//! - `interaction`: pointer state and ray-based hit dispatch
//! - `pipelines`: render pipelines (basic, transparent) and the light uniform
//! - `render`: per-frame batches handed to the render pass
//! - `resources`: glTF/texture loading and procedural floor geometry
//! - `scene`: the entity collection and its per-frame update
//! - `sections`: scroll offset to camera-anchor mapping
//! - `tween`: eased, time-bounded position interpolation
//!

pub mod animation;
pub mod app;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod entity;
pub mod interaction;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;
pub mod sections;
pub mod tween;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use winit::dpi::PhysicalPosition;
pub use winit::event::DeviceEvent;
pub use winit::event::WindowEvent;
