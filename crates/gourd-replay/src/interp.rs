//! Interpolation primitives for keyframe playback.
//!
//! Two flavors: plain per-axis [`lerp`] for free-moving entities, and
//! axis-decomposed [`manhattan_lerp`] for chain segments, which walk
//! the grid one axis at a time rather than drifting diagonally.

/// Below this combined per-axis delta the motion counts as degenerate
/// and interpolation holds the start position.
const DEGENERATE_EPS: f64 = 1e-6;

/// Linear interpolation between `a` and `b` at factor `alpha`.
pub fn lerp(a: f64, b: f64, alpha: f64) -> f64 {
    a + (b - a) * alpha
}

/// Axis-decomposed interpolation from `(ax, ay)` to `(bx, by)`.
///
/// Let `p = |dx| / (|dx| + |dy|)` be the share of the total Manhattan
/// distance on the x axis. While `alpha <= p` only x moves, at
/// progress `alpha / p`; afterwards x sits at `bx` and y moves at
/// progress `(alpha - p) / (1 - p)`. Zero motion on either axis
/// short-circuits to a single-axis [`lerp`].
pub fn manhattan_lerp(ax: f64, ay: f64, bx: f64, by: f64, alpha: f64) -> (f64, f64) {
    let dx = bx - ax;
    let dy = by - ay;
    let total = dx.abs() + dy.abs();
    if total < DEGENERATE_EPS {
        return (ax, ay);
    }
    if dx.abs() < DEGENERATE_EPS {
        return (ax, lerp(ay, by, alpha));
    }
    if dy.abs() < DEGENERATE_EPS {
        return (lerp(ax, bx, alpha), ay);
    }

    let p = dx.abs() / total;
    if alpha <= p {
        (lerp(ax, bx, alpha / p), ay)
    } else {
        (bx, lerp(ay, by, (alpha - p) / (1.0 - p)))
    }
}
