//! Axis-aligned bounding boxes.
//!
//! Meshes carry a model-space [`Aabb`]; entities expose world-space boxes for
//! the interaction controller's ray hit test. World boxes are obtained by
//! transforming the eight corners, so they stay conservative under rotation.

use cgmath::Point3;

use crate::data_structures::instance::Instance;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Smallest box containing all `points`, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3<f32>>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Aabb::new(first, first);
        for p in points {
            bounds = bounds.union_point(p);
        }
        Some(bounds)
    }

    pub fn union_point(self, p: Point3<f32>) -> Self {
        Aabb::new(
            Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        )
    }

    pub fn union(self, other: Aabb) -> Self {
        self.union_point(other.min).union_point(other.max)
    }

    /// The box containing this box after applying `transform`.
    pub fn transformed(&self, transform: &Instance) -> Self {
        let corners = [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ];
        // from_points on a non-empty array never yields None
        Aabb::from_points(corners.into_iter().map(|c| transform.transform_point(c)))
            .unwrap_or(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Quaternion, Rotation3, Vector3};

    #[test]
    fn from_points_and_union() {
        let a = Aabb::from_points(vec![
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(-2.0, 3.0, 1.0),
        ])
        .unwrap();
        assert_eq!(a.min, Point3::new(-2.0, -1.0, 0.0));
        assert_eq!(a.max, Point3::new(1.0, 3.0, 1.0));

        let b = Aabb::new(Point3::new(0.0, 0.0, -5.0), Point3::new(0.0, 5.0, 0.0));
        let u = a.union(b);
        assert_eq!(u.min, Point3::new(-2.0, -1.0, -5.0));
        assert_eq!(u.max, Point3::new(1.0, 5.0, 1.0));
    }

    #[test]
    fn empty_point_set_has_no_bounds() {
        assert!(Aabb::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn transform_translates_and_scales() {
        let unit = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let t = Instance {
            position: Vector3::new(10.0, 0.0, 0.0),
            rotation: Quaternion::from_angle_y(cgmath::Deg(0.0)),
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        let moved = unit.transformed(&t);
        assert_eq!(moved.min, Point3::new(8.0, -2.0, -2.0));
        assert_eq!(moved.max, Point3::new(12.0, 2.0, 2.0));
    }
}
