//! Keyframe animation playback.
//!
//! Clips come out of the glTF loader as parallel timestamp/transform arrays.
//! The player loops its clip and produces one interpolated [`Instance`] per
//! frame, which entities apply to their animated scene nodes.

use cgmath::Vector3;

use crate::data_structures::instance::Instance;

#[derive(Clone, Debug)]
pub struct AnimationClip {
    pub name: String,
    /// Seconds, strictly increasing.
    pub timestamps: Vec<f32>,
    /// One pose per timestamp.
    pub transforms: Vec<Instance>,
}

impl AnimationClip {
    pub fn duration(&self) -> f32 {
        self.timestamps.last().copied().unwrap_or(0.0)
    }

    /// Pose at time `t`, looping. Interpolates between the two bracketing
    /// keyframes: lerp for position and scale, slerp for rotation.
    pub fn sample(&self, t: f32) -> Instance {
        if self.transforms.is_empty() {
            return Instance::new();
        }
        if self.transforms.len() == 1 || self.duration() <= 0.0 {
            return self.transforms[0].clone();
        }

        let t = t % self.duration();
        let next = self
            .timestamps
            .iter()
            .position(|&ts| ts > t)
            .unwrap_or(self.timestamps.len() - 1);
        let prev = next.saturating_sub(1);
        let span = self.timestamps[next] - self.timestamps[prev];
        let k = if span > 0.0 {
            (t - self.timestamps[prev]) / span
        } else {
            0.0
        };

        let a = &self.transforms[prev];
        let b = &self.transforms[next];
        Instance {
            position: lerp(a.position, b.position, k),
            rotation: a.rotation.slerp(b.rotation, k),
            scale: lerp(a.scale, b.scale, k),
        }
    }
}

fn lerp(a: Vector3<f32>, b: Vector3<f32>, k: f32) -> Vector3<f32> {
    a + (b - a) * k
}

/// Drives one clip on loop.
#[derive(Clone, Debug)]
pub struct AnimationPlayer {
    clip: AnimationClip,
    elapsed: f32,
}

impl AnimationPlayer {
    pub fn new(clip: AnimationClip) -> Self {
        Self { clip, elapsed: 0.0 }
    }

    /// Advance by `dt` seconds and return the current pose.
    pub fn update(&mut self, dt: f32) -> Instance {
        self.elapsed += dt;
        self.clip.sample(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{One, Quaternion};

    fn pose(x: f32) -> Instance {
        Instance::from(Vector3::new(x, 0.0, 0.0))
    }

    fn walk_clip() -> AnimationClip {
        AnimationClip {
            name: "walk".into(),
            timestamps: vec![0.0, 1.0, 2.0],
            transforms: vec![pose(0.0), pose(2.0), pose(0.0)],
        }
    }

    #[test]
    fn sample_interpolates_between_keyframes() {
        let clip = walk_clip();
        assert_eq!(clip.sample(0.5).position.x, 1.0);
        assert_eq!(clip.sample(1.5).position.x, 1.0);
    }

    #[test]
    fn playback_loops_past_the_end() {
        let clip = walk_clip();
        // 2.5s into a 2s clip is the same pose as 0.5s.
        assert_eq!(clip.sample(2.5).position.x, clip.sample(0.5).position.x);
    }

    #[test]
    fn single_keyframe_clip_holds_its_pose() {
        let clip = AnimationClip {
            name: "idle".into(),
            timestamps: vec![0.0],
            transforms: vec![pose(7.0)],
        };
        assert_eq!(clip.sample(0.0).position.x, 7.0);
        assert_eq!(clip.sample(123.0).position.x, 7.0);
    }

    #[test]
    fn player_advances_with_frame_time() {
        let mut player = AnimationPlayer::new(walk_clip());
        let p = player.update(0.5);
        assert_eq!(p.position.x, 1.0);
        assert_eq!(p.rotation, Quaternion::one());
    }
}
