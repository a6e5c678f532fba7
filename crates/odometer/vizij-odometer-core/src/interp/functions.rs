//! Interpolation helpers:
//! - lerp_f32 (scalar blend)
//! - bezier_ease_t (cubic-bezier timing curve)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

const INVERT_STEPS: usize = 24;
const INVERT_EPSILON: f32 = 1e-6;

/// One axis of a cubic bezier anchored at (0, 0) and (1, 1).
#[inline]
fn sample_axis(c1: f32, c2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * s * (inv * c1 + s * c2) + s * s * s
}

/// Curve parameter whose x equals `x`; x is monotonic for x1, x2 in [0, 1].
fn solve_param(x: f32, x1: f32, x2: f32) -> f32 {
    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    let mut s = x;
    for _ in 0..INVERT_STEPS {
        let err = sample_axis(x1, x2, s) - x;
        if err.abs() < INVERT_EPSILON {
            break;
        }
        if err < 0.0 {
            lo = s;
        } else {
            hi = s;
        }
        s = 0.5 * (lo + hi);
    }
    s
}

/// Eased progress for `t` under the timing curve (x1, y1, x2, y2).
#[inline]
pub fn bezier_ease_t(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let linear = x1 == y1 && x2 == y2;
    if linear || t <= 0.0 || t >= 1.0 {
        return t;
    }
    sample_axis(y1, y2, solve_param(t, x1, x2))
}
