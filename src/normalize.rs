//! Linear normalization of a value series into a target range.

/// Map `values` from their own `[min, max]` span into `[min, max]`.
///
/// Each value becomes
/// `min + (value - current_min) * (max - min) / (current_max - current_min)`.
/// An empty input yields an empty output. A flat series maps every value to
/// `min`. When the series contains an infinity, finite values map to `min` and
/// `+inf` to `max`. Outputs always lie within `[min, max]`.
///
/// # Example
/// ```
/// use bevy_metrics_overlay::normalize;
///
/// assert_eq!(normalize(&[20.0, 30.0, 40.0], 0.0, 100.0), vec![0.0, 50.0, 100.0]);
/// ```
pub fn normalize(values: &[f32], min: f32, max: f32) -> Vec<f32> {
    let mut out = Vec::with_capacity(values.len());
    normalize_into(values, min, max, &mut out);
    out
}

/// Same as [`normalize`], writing into a reusable buffer.
///
/// `out` is cleared first.
pub fn normalize_into(values: &[f32], min: f32, max: f32, out: &mut Vec<f32>) {
    out.clear();
    if values.is_empty() {
        return;
    }

    let (current_min, current_max) = values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    // f64 keeps spans of extreme f32 values finite
    let lo = f64::from(current_min);
    let span = f64::from(current_max) - lo;
    let target = f64::from(max) - f64::from(min);

    out.extend(values.iter().map(|&v| {
        let t = if span.is_finite() && span > 0.0 {
            (f64::from(v) - lo) / span
        } else if span.is_infinite() && v == f32::INFINITY {
            1.0
        } else {
            0.0
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        (f64::from(min) + t * target) as f32
    }));
}
