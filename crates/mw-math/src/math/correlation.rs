//! Pearson correlation over paired samples.

/// Arithmetic mean, `None` for empty input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Pearson product-moment correlation of `xs` and `ys`.
///
/// Computed from centered sums. Returns `None` when the slices differ in
/// length, hold fewer than two pairs, contain non-finite values, or either
/// side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    let mean_x = mean(xs)?;
    let mean_y = mean(ys)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    let r = sxy / (sxx.sqrt() * syy.sqrt());
    Some(r.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn mean_basic() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn pearson_perfect_positive() {
        let r = pearson(&[100.0, 150.0, 200.0], &[104.0, 154.0, 204.0]).unwrap();
        assert!(approx_eq(r, 1.0, 1e-12));
    }

    #[test]
    fn pearson_perfect_negative() {
        let r = pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!(approx_eq(r, -1.0, 1e-12));
    }

    #[test]
    fn pearson_known_value() {
        // sxy = 6, sxx = 10, syy = 5.2 -> r = 6 / sqrt(52)
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 3.0, 3.0, 5.0, 4.0];
        let r = pearson(&xs, &ys).unwrap();
        assert!(approx_eq(r, 6.0 / 52.0f64.sqrt(), 1e-12));
    }

    #[test]
    fn pearson_single_pair_undefined() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    #[test]
    fn pearson_zero_variance_undefined() {
        assert_eq!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn pearson_length_mismatch_undefined() {
        assert_eq!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn pearson_nan_undefined() {
        assert_eq!(pearson(&[1.0, f64::NAN], &[1.0, 2.0]), None);
    }
}
