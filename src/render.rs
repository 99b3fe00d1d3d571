//! Per-frame draw batches.
//!
//! Entities flatten their node trees into [`Instanced`] draw records each
//! frame. Opaque records render first with depth writes, transparent ones
//! after with alpha blending, so translucent props composite over the town.

use std::ops::Range;

use crate::data_structures::model::Model;

/// One model plus the instance buffer slice to draw it with.
pub struct Instanced<'a> {
    pub model: &'a Model,
    pub instance_buffer: &'a wgpu::Buffer,
    pub instances: Range<u32>,
}

/// Everything the render pass needs for one frame, already split by pipeline.
#[derive(Default)]
pub struct FrameBatches<'a> {
    pub opaque: Vec<Instanced<'a>>,
    pub transparent: Vec<Instanced<'a>>,
}
