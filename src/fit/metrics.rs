//! Held-out regression metrics.

/// Coefficient of determination.
///
/// Returns `None` for empty input or when `y_true` has zero variance.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return None;
    }
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    if ss_tot <= 0.0 {
        return None;
    }
    let ss_res: f64 = residuals(y_true, y_pred).map(|r| r * r).sum();
    Some(1.0 - ss_res / ss_tot)
}

pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return None;
    }
    let sse: f64 = residuals(y_true, y_pred).map(|r| r * r).sum();
    Some((sse / y_true.len() as f64).sqrt())
}

pub fn mae(y_true: &[f64], y_pred: &[f64]) -> Option<f64> {
    if y_true.is_empty() || y_true.len() != y_pred.len() {
        return None;
    }
    let sae: f64 = residuals(y_true, y_pred).map(f64::abs).sum();
    Some(sae / y_true.len() as f64)
}

fn residuals<'a>(y_true: &'a [f64], y_pred: &'a [f64]) -> impl Iterator<Item = f64> + 'a {
    y_true.iter().zip(y_pred).map(|(y, p)| y - p)
}
