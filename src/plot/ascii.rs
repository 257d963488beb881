//! ASCII bar chart of feature attributions for terminal output.
//!
//! Fixed-width and deterministic. Each row is centered on a `|` axis:
//! negative contributions grow left as `-`, positive ones grow right as `+`.

use crate::explain::Explanation;

/// Render one row per attribution, in the explanation's column order.
pub fn render_attribution_bars(explanation: &Explanation, width: usize) -> String {
    let half = width.max(10) / 2;
    let scale = explanation
        .attributions
        .iter()
        .map(|a| a.contribution.abs())
        .fold(0.0_f64, f64::max);

    let mut out = String::new();
    out.push_str(&format!("Attributions (scale: {half} columns = {scale:.3})\n"));

    for a in &explanation.attributions {
        let len = bar_len(a.contribution.abs(), scale, half);
        let (left, right) = if a.contribution < 0.0 {
            (format!("{:>half$}", "-".repeat(len)), String::new())
        } else {
            (" ".repeat(half), "+".repeat(len))
        };
        let line = format!(
            "{:<28} {left}|{right:<half$} {:+.3}",
            a.feature.label(),
            a.contribution
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn bar_len(magnitude: f64, scale: f64, half: usize) -> usize {
    if scale <= 0.0 || !magnitude.is_finite() {
        return 0;
    }
    let len = (magnitude / scale * half as f64).round();
    len.clamp(0.0, half as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Feature;
    use crate::explain::Attribution;

    fn explanation(contribs: &[(Feature, f64)]) -> Explanation {
        Explanation {
            attributions: contribs
                .iter()
                .map(|&(feature, contribution)| Attribution {
                    feature,
                    value: 0.0,
                    contribution,
                })
                .collect(),
            base_value: 3.0,
            prediction: 3.0,
        }
    }

    #[test]
    fn bars_scale_to_the_largest_magnitude() {
        let e = explanation(&[
            (Feature::G1, 0.4),
            (Feature::G2, -0.2),
            (Feature::Goout, 0.0),
        ]);
        let text = render_attribution_bars(&e, 20);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);

        assert!(lines[1].contains("|++++++++++ +0.400"));
        assert!(lines[2].contains("     -----| "));
        assert!(lines[2].ends_with("-0.200"));
        assert!(lines[3].ends_with("|           +0.000"));
    }

    #[test]
    fn all_zero_contributions_render_empty_bars() {
        let e = explanation(&[(Feature::G1, 0.0)]);
        let text = render_attribution_bars(&e, 10);
        assert!(text.lines().nth(1).unwrap().ends_with("|      +0.000"));
    }
}
