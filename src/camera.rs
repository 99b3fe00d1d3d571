//! Camera, projection and pointer ray casting.
//!
//! The camera is a position/target pair. Section scrolling flies the
//! position along a [`Tween`]; walking entities retarget it every frame so
//! the view tracks them. Pointer picking builds a world-space [`Ray`] from
//! normalized device coordinates.

use cgmath::{Angle, InnerSpace, Matrix4, Point3, Rad, Vector3};
use wgpu::util::DeviceExt;

use crate::data_structures::bounds::Aabb;
use crate::tween::{Easing, Tween};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    target: Point3<f32>,
    tween: Option<Tween>,
}

impl Camera {
    pub fn new(position: Point3<f32>, target: Point3<f32>) -> Self {
        Self {
            position,
            target,
            tween: None,
        }
    }

    pub fn look_at(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    /// Start an eased flight to `to`. Any flight in progress is replaced.
    pub fn fly_to(&mut self, to: Point3<f32>, duration: f32) {
        self.tween = Some(Tween::new(self.position, to, duration, Easing::QuadInOut));
    }

    pub fn is_flying(&self) -> bool {
        self.tween.is_some()
    }

    /// Where the current flight ends, if one is in progress.
    pub fn flight_target(&self) -> Option<Point3<f32>> {
        self.tween.as_ref().map(|t| t.target())
    }

    /// Advance any flight in progress by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if let Some(tween) = &mut self.tween {
            self.position = tween.advance(dt);
            if tween.is_finished() {
                self.tween = None;
            }
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }

    /// The world-space ray under the pointer. `ndc` is (x, y) in `[-1, 1]`
    /// with y pointing up.
    pub fn pointer_ray(&self, ndc: (f32, f32), projection: &Projection) -> Ray {
        let forward = (self.target - self.position).normalize();
        // A vertical view has no y-derived right vector; fall back to x.
        let right = {
            let r = forward.cross(Vector3::unit_y());
            if r.magnitude2() < 1e-8 {
                Vector3::unit_x()
            } else {
                r.normalize()
            }
        };
        let up = right.cross(forward);

        let half_h = (projection.fovy / 2.0).tan();
        let half_w = half_h * projection.aspect;
        let direction =
            (right * (ndc.0 * half_w) + up * (ndc.1 * half_h) + forward).normalize();

        Ray {
            origin: self.position,
            direction,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy: Rad<f32>, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// A world-space ray for pointer picking.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// Distance along the ray to `aabb`, or `None` on a miss. Uses the slab
    /// method; IEEE infinities from zero direction components fall out
    /// correctly.
    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f32> {
        let origin: [f32; 3] = self.origin.into();
        let direction: [f32; 3] = self.direction.into();
        let min: [f32; 3] = aabb.min.into();
        let max: [f32; 3] = aabb.max.into();

        let mut t_enter = 0.0f32;
        let mut t_exit = f32::INFINITY;
        for axis in 0..3 {
            let inv = 1.0 / direction[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // Explicit comparisons so NaN (origin exactly on a face of a
            // parallel slab) leaves the running interval untouched.
            if t0 > t_enter {
                t_enter = t0;
            }
            if t1 < t_exit {
                t_exit = t1;
            }
            if t_enter > t_exit {
                return None;
            }
        }
        Some(t_enter)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view_position: [f32; 4],
    fog_color: [f32; 4],
    /// x = fog near, y = fog far, zw unused.
    fog_params: [f32; 4],
}

impl CameraUniform {
    pub fn new(fog_color: [f32; 3], fog_near: f32, fog_far: f32) -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
            view_position: [0.0; 4],
            fog_color: [fog_color[0], fog_color[1], fog_color[2], 1.0],
            fog_params: [fog_near, fog_far, 0.0, 0.0],
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_proj = (projection.matrix() * camera.view_matrix()).into();
        self.view_position = camera.position.to_homogeneous().into();
    }
}

/// The camera's GPU-side resources, bound at group 1.
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, uniform: CameraUniform) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera bind group layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera bind group"),
        });

        Self {
            uniform,
            buffer,
            bind_group_layout,
            bind_group,
        }
    }

    pub fn upload(&mut self, queue: &wgpu::Queue, camera: &Camera, projection: &Projection) {
        self.uniform.update_view_proj(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_replaces_flight() {
        let mut camera = Camera::new(Point3::new(0.0, 2.0, 0.0), Point3::new(0.0, 0.0, -1.0));
        camera.fly_to(Point3::new(10.0, 2.0, 0.0), 1.0);
        camera.update(0.25);
        camera.fly_to(Point3::new(-10.0, 2.0, 0.0), 1.0);
        camera.update(1.0);
        assert_eq!(camera.position, Point3::new(-10.0, 2.0, 0.0));
        assert!(!camera.is_flying());
    }

    #[test]
    fn ray_hits_box_in_front() {
        let ray = Ray {
            origin: Point3::new(0.0, 0.0, 5.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let t = ray.intersect_aabb(&aabb).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn ray_misses_box_behind() {
        let ray = Ray {
            origin: Point3::new(0.0, 0.0, 5.0),
            direction: Vector3::new(0.0, 0.0, 1.0),
        };
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let ray = Ray {
            origin: Point3::new(0.0, 5.0, 5.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert!(ray.intersect_aabb(&aabb).is_none());
    }

    #[test]
    fn ray_hits_flat_box() {
        // A ground plane is a zero-height box; entry and exit coincide.
        let ray = Ray {
            origin: Point3::new(0.0, 10.0, 0.0),
            direction: Vector3::new(1.0, -1.0, 0.0).normalize(),
        };
        let floor = Aabb::new(Point3::new(-50.0, 0.0, -50.0), Point3::new(50.0, 0.0, 50.0));
        let t = ray.intersect_aabb(&floor).unwrap();
        let p = ray.point_at(t);
        assert!(p.y.abs() < 1e-4);
        assert!((p.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn center_pointer_ray_points_at_target() {
        let camera = Camera::new(Point3::new(0.0, 2.0, 10.0), Point3::new(0.0, 2.0, 0.0));
        let projection = Projection::new(800, 600, cgmath::Deg(75.0).into(), 0.1, 100.0);
        let ray = camera.pointer_ray((0.0, 0.0), &projection);
        assert!((ray.direction.z - -1.0).abs() < 1e-5);
        assert!(ray.direction.x.abs() < 1e-5);
    }

    #[test]
    fn pointer_ray_survives_straight_down_view() {
        let camera = Camera::new(Point3::new(0.0, 10.0, 0.0), Point3::new(0.0, 0.0, 0.0));
        let projection = Projection::new(800, 600, cgmath::Deg(75.0).into(), 0.1, 100.0);

        let center = camera.pointer_ray((0.0, 0.0), &projection);
        assert!((center.direction.y - -1.0).abs() < 1e-5);

        let corner = camera.pointer_ray((1.0, 1.0), &projection);
        assert!(corner.direction.x.is_finite());
        assert!(corner.direction.y.is_finite());
        assert!(corner.direction.z.is_finite());
        assert!((corner.direction.magnitude() - 1.0).abs() < 1e-5);
    }
}
