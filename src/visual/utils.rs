// ============================================================================
// EASING FUNCTIONS for the marker fade transition
// ============================================================================

/// Control points of the CSS `ease` timing function
const EASE: (f32, f32, f32, f32) = (0.25, 0.1, 0.25, 1.0);

/// CSS `ease`: quick start, long gentle settle
pub fn ease(t: f32) -> f32 {
    let (x1, y1, x2, y2) = EASE;
    cubic_bezier(x1, y1, x2, y2, t)
}

/// One axis of a cubic Bézier from (0,0) to (1,1) with control values a1, a2
fn bezier_axis(a1: f32, a2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * s * a1 + 3.0 * inv * s * s * a2 + s * s * s
}

fn bezier_axis_slope(a1: f32, a2: f32, s: f32) -> f32 {
    let inv = 1.0 - s;
    3.0 * inv * inv * a1 + 6.0 * inv * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
}

/// Evaluate a CSS-style `cubic-bezier(x1, y1, x2, y2)` timing function at `t`
///
/// Solves x(s) = t for the curve parameter (Newton, then bisection if Newton
/// stalls) and returns y(s). x1 and x2 must lie in [0, 1].
pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let mut s = t;
    for _ in 0..8 {
        let err = bezier_axis(x1, x2, s) - t;
        if err.abs() < 1e-6 {
            return bezier_axis(y1, y2, s);
        }
        let slope = bezier_axis_slope(x1, x2, s);
        if slope.abs() < 1e-6 {
            break;
        }
        s = (s - err / slope).clamp(0.0, 1.0);
    }

    // x(s) is monotonic for x1, x2 in [0, 1]
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    s = t;
    for _ in 0..32 {
        let x = bezier_axis(x1, x2, s);
        if (x - t).abs() < 1e-6 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) * 0.5;
    }

    bezier_axis(y1, y2, s)
}
