//! Raw glTF animation channels and their merge into playable clips.

use cgmath::{Quaternion, Vector3};

use crate::animation::AnimationClip;
use crate::data_structures::instance::Instance;

#[derive(Clone, Debug)]
pub enum Keyframes {
    Translation(Vec<Vector3<f32>>),
    Rotation(Vec<Quaternion<f32>>),
    Scale(Vec<Vector3<f32>>),
    Other,
}

/// One glTF channel as read from the file: timestamps plus one property's
/// keyframes. A node's translation/rotation/scale arrive as separate
/// channels and are merged afterwards.
#[derive(Clone, Debug)]
pub struct RawChannel {
    pub timestamps: Vec<f32>,
    pub keyframes: Keyframes,
}

/// Merge a node's channels into a single clip of full poses. The densest
/// channel donates the timeline; sparser channels hold their last key.
pub fn merge_channels(name: &str, channels: &[RawChannel]) -> Option<AnimationClip> {
    let timestamps = channels
        .iter()
        .filter(|c| !matches!(c.keyframes, Keyframes::Other))
        .map(|c| &c.timestamps)
        .max_by_key(|t| t.len())?
        .clone();
    if timestamps.is_empty() {
        return None;
    }

    let transforms = (0..timestamps.len())
        .map(|i| {
            let mut pose = Instance::new();
            for channel in channels {
                match &channel.keyframes {
                    Keyframes::Translation(keys) => {
                        if let Some(p) = clamped(keys, i) {
                            pose.position = p;
                        }
                    }
                    Keyframes::Rotation(keys) => {
                        if let Some(r) = clamped(keys, i) {
                            pose.rotation = r;
                        }
                    }
                    Keyframes::Scale(keys) => {
                        if let Some(s) = clamped(keys, i) {
                            pose.scale = s;
                        }
                    }
                    Keyframes::Other => {}
                }
            }
            pose
        })
        .collect();

    Some(AnimationClip {
        name: name.to_string(),
        timestamps,
        transforms,
    })
}

fn clamped<T: Copy>(keys: &[T], i: usize) -> Option<T> {
    keys.get(i.min(keys.len().checked_sub(1)?)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_combines_properties_on_one_timeline() {
        let channels = vec![
            RawChannel {
                timestamps: vec![0.0, 1.0, 2.0],
                keyframes: Keyframes::Translation(vec![
                    Vector3::new(0.0, 0.0, 0.0),
                    Vector3::new(1.0, 0.0, 0.0),
                    Vector3::new(2.0, 0.0, 0.0),
                ]),
            },
            RawChannel {
                timestamps: vec![0.0, 2.0],
                keyframes: Keyframes::Scale(vec![
                    Vector3::new(1.0, 1.0, 1.0),
                    Vector3::new(2.0, 2.0, 2.0),
                ]),
            },
        ];
        let clip = merge_channels("walk", &channels).unwrap();
        assert_eq!(clip.timestamps.len(), 3);
        assert_eq!(clip.transforms[1].position.x, 1.0);
        // sparse channel holds its last key past its end
        assert_eq!(clip.transforms[2].scale.x, 2.0);
    }

    #[test]
    fn channels_without_keyframes_merge_to_nothing() {
        let channels = vec![RawChannel {
            timestamps: vec![0.0, 1.0],
            keyframes: Keyframes::Other,
        }];
        assert!(merge_channels("empty", &channels).is_none());
    }
}
