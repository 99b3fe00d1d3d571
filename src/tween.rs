//! Eased, time-bounded position interpolation.
//!
//! A [`Tween`] moves a 3D point from a start to an end value over a fixed
//! duration. Owners hold at most one tween per animated property and replace
//! it wholesale when a new target arrives, so two interpolations never run
//! concurrently on the same property.

use cgmath::Point3;

/// Easing curves for tweened properties.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    /// Quadratic ease in/out: slow start, slow finish.
    QuadInOut,
}

impl Easing {
    /// Evaluate the curve at `t`. Input is clamped to `[0, 1]` and the
    /// result stays in `[0, 1]`.
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u / 2.0
                }
            }
        }
    }
}

/// A time-bounded interpolation of a position.
#[derive(Clone, Debug)]
pub struct Tween {
    from: Point3<f32>,
    to: Point3<f32>,
    duration: f32,
    elapsed: f32,
    easing: Easing,
}

impl Tween {
    pub fn new(from: Point3<f32>, to: Point3<f32>, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            // A zero duration would divide by zero when sampling; treat it
            // as instantly finished instead.
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
            easing,
        }
    }

    /// Advance by `dt` seconds and return the current position.
    pub fn advance(&mut self, dt: f32) -> Point3<f32> {
        self.elapsed += dt;
        self.sample()
    }

    /// The position at the current elapsed time.
    pub fn sample(&self) -> Point3<f32> {
        let k = self.easing.evaluate(self.elapsed / self.duration);
        self.from + (self.to - self.from) * k
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// The end value this tween settles on.
    pub fn target(&self) -> Point3<f32> {
        self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point3;

    #[test]
    fn quad_in_out_shape() {
        let e = Easing::QuadInOut;
        assert_eq!(e.evaluate(0.0), 0.0);
        assert_eq!(e.evaluate(0.25), 0.125);
        assert_eq!(e.evaluate(0.5), 0.5);
        assert_eq!(e.evaluate(0.75), 0.875);
        assert_eq!(e.evaluate(1.0), 1.0);
    }

    #[test]
    fn easing_clamps_out_of_range_input() {
        assert_eq!(Easing::Linear.evaluate(-1.0), 0.0);
        assert_eq!(Easing::Linear.evaluate(2.0), 1.0);
        assert_eq!(Easing::QuadInOut.evaluate(3.0), 1.0);
    }

    #[test]
    fn tween_reaches_target_and_stays_there() {
        let from = Point3::new(0.0, 0.0, 0.0);
        let to = Point3::new(4.0, 0.0, -8.0);
        let mut tween = Tween::new(from, to, 2.0, Easing::QuadInOut);
        assert!(!tween.is_finished());
        let mid = tween.advance(1.0);
        assert_eq!(mid, Point3::new(2.0, 0.0, -4.0)); // quad in/out is 0.5 at t=0.5
        let end = tween.advance(1.0);
        assert!(tween.is_finished());
        assert_eq!(end, to);
        // Overshooting the duration must not overshoot the value.
        assert_eq!(tween.advance(5.0), to);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let to = Point3::new(1.0, 2.0, 3.0);
        let mut tween = Tween::new(Point3::new(0.0, 0.0, 0.0), to, 0.0, Easing::Linear);
        assert_eq!(tween.advance(0.001), to);
        assert!(tween.is_finished());
    }
}
