//! One-dimensional interpolation over sorted knots.
//!
//! Both functions take query points `x` and knots `(xp, yp)` with `xp`
//! sorted ascending and `xp.len() == yp.len()`. Sortedness is a precondition
//! and is not checked.

/// Backward-fill (step) interpolation for rate vectors.
///
/// Each query point takes the value of the leftmost knot `>= x`. Points before
/// the first knot get `fill_below`, points after the last knot get
/// `fill_above`. With no knots every point gets `fill_above`.
pub fn interpolate_backfill(
    x: &[i64],
    xp: &[i64],
    yp: &[f64],
    fill_below: f64,
    fill_above: f64,
) -> Vec<f64> {
    debug_assert_eq!(xp.len(), yp.len());
    let Some(&first) = xp.first() else {
        return vec![fill_above; x.len()];
    };

    x.iter()
        .map(|&q| {
            if q < first {
                return fill_below;
            }
            let idx = xp.partition_point(|&k| k < q);
            yp.get(idx).copied().unwrap_or(fill_above)
        })
        .collect()
}

/// Piecewise linear interpolation, clamped to the edge values outside the
/// knot range.
///
/// With no knots every point is `NaN`.
pub fn interpolate_linear(x: &[i64], xp: &[i64], yp: &[f64]) -> Vec<f64> {
    debug_assert_eq!(xp.len(), yp.len());
    let (Some(&first), Some(&last)) = (xp.first(), xp.last()) else {
        return vec![f64::NAN; x.len()];
    };

    x.iter()
        .map(|&q| {
            if q <= first {
                return yp[0];
            }
            if q >= last {
                return yp[yp.len() - 1];
            }
            let idx = xp.partition_point(|&k| k < q);
            if xp[idx] == q {
                return yp[idx];
            }
            blend(xp[idx - 1], xp[idx], yp[idx - 1], yp[idx], q)
        })
        .collect()
}

/// Linear blend between `(x0, y0)` and `(x1, y1)` at `q`, with `x0 < q < x1`.
pub(crate) fn blend(x0: i64, x1: i64, y0: f64, y1: f64, q: i64) -> f64 {
    let t = (q - x0) as f64 / (x1 - x0) as f64;
    y0 + t * (y1 - y0)
}
