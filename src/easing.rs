//! Easing curves for fader transitions.

use serde::{Deserialize, Serialize};

/// Easing characteristic of a fader transition.
///
/// All curves are continuous and monotonic on `[0, 1]` with
/// `f(0) = 0` and `f(1) = 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Slow start, fast end
    EaseIn,
    /// Fast start, slow end
    EaseOut,
    /// Slow start and end
    EaseInOut,
}

impl Easing {
    /// Apply the curve to a fraction `t` in `[0, 1]`
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const CURVES: [Easing; 4] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
    ];

    #[test]
    fn endpoints() {
        for easing in CURVES {
            assert_abs_diff_eq!(easing.apply(0.0), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(easing.apply(1.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn monotonic() {
        for easing in CURVES {
            let mut prev = easing.apply(0.0);
            for i in 1..=100 {
                let next = easing.apply(i as f64 / 100.0);
                assert!(next >= prev, "{easing:?} not monotonic at step {i}");
                prev = next;
            }
        }
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        for i in 0..=50 {
            let t = i as f64 / 100.0;
            let a = Easing::EaseInOut.apply(t);
            let b = Easing::EaseInOut.apply(1.0 - t);
            assert_abs_diff_eq!(a + b, 1.0, epsilon = 1e-12);
        }
    }
}
