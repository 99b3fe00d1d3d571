//! Per-node transformation data for GPU rendering.
//!
//! Every scene node carries an [`Instance`] (position, rotation, scale).
//! World transforms are composed parent × local while walking the node tree,
//! then packed into an [`InstanceRaw`] vertex buffer for the shaders.

use std::ops::Mul;

use cgmath::{One, Point3};

use crate::data_structures::model;

/// Position, rotation (quaternion) and scale of a scene node.
#[derive(Clone, Debug)]
pub struct Instance {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Instance {
    /// Identity transform: no move, no rotation, unit scale.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Apply scale, then rotation, then translation to a point.
    pub fn transform_point(&self, p: Point3<f32>) -> Point3<f32> {
        let scaled = cgmath::Vector3::new(p.x * self.scale.x, p.y * self.scale.y, p.z * self.scale.z);
        let v = self.position + self.rotation * scaled;
        Point3::new(v.x, v.y, v.z)
    }

    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
        }
    }
}

impl Mul<&Instance> for &Instance {
    type Output = Instance;

    /// Compose parent (self) with a child's local transform.
    fn mul(self, rhs: &Instance) -> Instance {
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Instance {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: cgmath::Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

impl From<cgmath::Vector3<f32>> for Instance {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Instance {
            position,
            ..Default::default()
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

/// The raw per-instance data as stored on the GPU: the model matrix plus the
/// rotation-only normal matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

impl model::Vertex for InstanceRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            // Advance per instance, not per vertex.
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // mat4 occupies four vec4 slots
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // mat3 as three vec3 slots
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Quaternion, Rotation3, Vector3};

    #[test]
    fn compose_applies_parent_scale_to_child_offset() {
        let parent = Instance {
            position: Vector3::new(1.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let child = Instance {
            position: Vector3::new(3.0, 0.0, 0.0),
            ..Default::default()
        };
        let world = &parent * &child;
        assert_eq!(world.position, Vector3::new(7.0, 0.0, 0.0));
        assert_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn transform_point_rotates_about_origin() {
        let t = Instance {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::from_angle_y(Deg(90.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        };
        let p = t.transform_point(cgmath::Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-5);
        assert!((p.z - -1.0).abs() < 1e-5);
    }
}
