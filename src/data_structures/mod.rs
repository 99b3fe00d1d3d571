//! Engine data structures: models, textures, bounds, scene nodes and instances.
//!
//! - `bounds` holds axis-aligned bounding boxes used for ray hit testing
//! - `instance` holds the position/rotation/scale transform and its GPU layout
//! - `model` contains mesh and material definitions with their GPU resources
//! - `node` is the concrete scene node tree entities hang their visuals on
//! - `texture` contains the GPU texture wrapper and creation utilities

pub mod bounds;
pub mod instance;
pub mod model;
pub mod node;
pub mod texture;
