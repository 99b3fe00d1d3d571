//! Scroll-driven camera sections.
//!
//! The town is toured by scrolling: a virtual scroll offset maps to a
//! section index, and entering a new section flies the camera to a viewing
//! spot in front of that section's anchor.

use cgmath::Point3;

use crate::camera::Camera;

/// How far in front of an anchor (along +z) the camera settles.
pub const FORWARD_BIAS: f32 = 5.0;
/// Flight time between sections, in seconds.
pub const SECTION_TWEEN_SECS: f32 = 1.0;

/// Nearest section for a scroll offset, clamped to the available range.
pub fn section_index(offset: f32, viewport_height: f32, section_count: usize) -> usize {
    if section_count == 0 || viewport_height <= 0.0 {
        return 0;
    }
    let raw = (offset / viewport_height).round().max(0.0) as usize;
    raw.min(section_count - 1)
}

pub struct ScrollSections {
    anchors: Vec<Point3<f32>>,
    offset: f32,
    viewport_height: f32,
    current: usize,
}

impl ScrollSections {
    pub fn new(anchors: Vec<Point3<f32>>, viewport_height: f32) -> Self {
        Self {
            anchors,
            offset: 0.0,
            viewport_height,
            current: 0,
        }
    }

    pub fn current_section(&self) -> usize {
        self.current
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Track window resizes; one section stays one viewport of scrolling.
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
    }

    /// Apply a scroll delta. Crossing into a new section starts a camera
    /// flight to that section's viewing spot; scrolling within a section
    /// leaves the camera alone.
    pub fn on_scroll(&mut self, delta: f32, camera: &mut Camera) {
        self.offset = (self.offset + delta).max(0.0);
        let index = section_index(self.offset, self.viewport_height, self.anchors.len());
        if index == self.current {
            return;
        }
        self.current = index;

        let anchor = self.anchors[index];
        // Keep the current flying height; only x and z are toured.
        camera.fly_to(
            Point3::new(anchor.x, camera.position.y, anchor.z + FORWARD_BIAS),
            SECTION_TWEEN_SECS,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors() -> Vec<Point3<f32>> {
        vec![
            Point3::new(-5.0, 0.0, 20.0),
            Point3::new(7.0, 0.0, 10.0),
            Point3::new(-10.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, -10.0),
            Point3::new(-5.0, 0.0, -20.0),
        ]
    }

    #[test]
    fn offsets_round_to_the_nearest_section() {
        assert_eq!(section_index(0.0, 800.0, 5), 0);
        assert_eq!(section_index(399.0, 800.0, 5), 0);
        assert_eq!(section_index(750.0, 800.0, 5), 1);
        assert_eq!(section_index(1600.0, 800.0, 5), 2);
    }

    #[test]
    fn overscroll_clamps_to_the_last_section() {
        assert_eq!(section_index(4200.0, 800.0, 5), 4);
        assert_eq!(section_index(1.0e9, 800.0, 5), 4);
    }

    #[test]
    fn no_sections_means_index_zero() {
        assert_eq!(section_index(1000.0, 800.0, 0), 0);
    }

    #[test]
    fn crossing_a_section_flies_to_its_viewing_spot() {
        let mut camera = Camera::new(Point3::new(-5.0, 2.0, 25.0), Point3::new(-5.0, 1.0, 0.0));
        let mut sections = ScrollSections::new(anchors(), 800.0);

        sections.on_scroll(800.0, &mut camera);
        assert_eq!(sections.current_section(), 1);
        // x of the anchor, unchanged height, z shifted toward the viewer.
        assert_eq!(camera.flight_target(), Some(Point3::new(7.0, 2.0, 15.0)));

        camera.update(SECTION_TWEEN_SECS);
        assert_eq!(camera.position, Point3::new(7.0, 2.0, 15.0));
    }

    #[test]
    fn scrolling_within_a_section_does_not_restart_the_flight() {
        let mut camera = Camera::new(Point3::new(-5.0, 2.0, 25.0), Point3::new(-5.0, 1.0, 0.0));
        let mut sections = ScrollSections::new(anchors(), 800.0);

        sections.on_scroll(800.0, &mut camera);
        camera.update(SECTION_TWEEN_SECS);
        assert!(!camera.is_flying());

        // Small wiggles around the same section leave the camera parked.
        sections.on_scroll(10.0, &mut camera);
        sections.on_scroll(-10.0, &mut camera);
        assert!(!camera.is_flying());
        assert_eq!(camera.position, Point3::new(7.0, 2.0, 15.0));
    }

    #[test]
    fn scroll_offset_never_goes_negative() {
        let mut camera = Camera::new(Point3::new(0.0, 2.0, 25.0), Point3::new(0.0, 0.0, 0.0));
        let mut sections = ScrollSections::new(anchors(), 800.0);
        sections.on_scroll(-5000.0, &mut camera);
        assert_eq!(sections.offset(), 0.0);
        assert_eq!(sections.current_section(), 0);
    }
}
