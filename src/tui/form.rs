//! Form state for the prediction UI.
//!
//! Plain data plus key-driven transitions; the render functions read it every
//! frame and never mutate it.

use crate::domain::{CGPA_MAX, CGPA_MIN, DEFAULT_INPUTS, Feature, StudentInputs, studytime_label};

/// GPA fields move by this much per ←/→ press.
pub const GPA_STEP: f64 = 0.1;

/// One selectable row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormRow {
    Field(Feature),
    Submit,
}

/// Rows top to bottom: the nine inputs, then the submit button.
pub const ROW_COUNT: usize = Feature::ALL.len() + 1;

pub fn row_at(index: usize) -> FormRow {
    Feature::ALL
        .get(index)
        .copied()
        .map_or(FormRow::Submit, FormRow::Field)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub inputs: StudentInputs,
    pub selected: usize,
    /// Typed GPA entry in progress (buffer for the selected field).
    pub editing: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            inputs: DEFAULT_INPUTS,
            selected: 0,
            editing: None,
        }
    }
}

impl FormState {
    pub fn row(&self) -> FormRow {
        row_at(self.selected)
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < ROW_COUNT {
            self.selected += 1;
        }
    }

    /// Step the selected field by `delta` units, staying inside its bounds.
    ///
    /// Flags flip on any step.
    pub fn adjust(&mut self, delta: i32) {
        let FormRow::Field(feature) = self.row() else {
            return;
        };
        let inputs = &mut self.inputs;
        match feature {
            Feature::G1 => inputs.g1 = step_gpa(inputs.g1, delta),
            Feature::G2 => inputs.g2 = step_gpa(inputs.g2, delta),
            Feature::Failures => inputs.failures = step_int(inputs.failures, delta, feature),
            Feature::Absences => inputs.absences = step_int(inputs.absences, delta, feature),
            Feature::Studytime => inputs.studytime = step_level(inputs.studytime, delta, feature),
            Feature::Health => inputs.health = step_level(inputs.health, delta, feature),
            Feature::Goout => inputs.goout = step_level(inputs.goout, delta, feature),
            Feature::Higher | Feature::Activities => self.toggle(),
        }
    }

    /// Flip the selected checkbox; no-op on other rows.
    pub fn toggle(&mut self) {
        match self.row() {
            FormRow::Field(Feature::Higher) => self.inputs.higher = !self.inputs.higher,
            FormRow::Field(Feature::Activities) => self.inputs.activities = !self.inputs.activities,
            _ => {}
        }
    }

    /// Start typed entry on a GPA row. Returns `false` on other rows.
    pub fn begin_edit(&mut self) -> bool {
        let value = match self.row() {
            FormRow::Field(Feature::G1) => self.inputs.g1,
            FormRow::Field(Feature::G2) => self.inputs.g2,
            _ => return false,
        };
        self.editing = Some(format!("{value:.2}"));
        true
    }

    pub fn push_char(&mut self, c: char) {
        let Some(buf) = &mut self.editing else {
            return;
        };
        if c.is_ascii_digit() || (c == '.' && !buf.contains('.')) {
            buf.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(buf) = &mut self.editing {
            buf.pop();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Finish typed entry. Invalid or out-of-range text leaves the value unchanged.
    pub fn apply_edit(&mut self) -> Result<f64, String> {
        let Some(buf) = self.editing.take() else {
            return Err("Not editing.".to_string());
        };
        let FormRow::Field(feature) = self.row() else {
            return Err("Not editing.".to_string());
        };

        let text = buf.trim();
        let value: f64 = text
            .parse()
            .map_err(|_| format!("Invalid number '{text}' for {}.", feature.label()))?;
        if !value.is_finite() || !(CGPA_MIN..=CGPA_MAX).contains(&value) {
            return Err(format!(
                "{} must be within [{CGPA_MIN:.1}, {CGPA_MAX:.1}], got {text}.",
                feature.label()
            ));
        }

        let value = round2(value);
        match feature {
            Feature::G1 => self.inputs.g1 = value,
            Feature::G2 => self.inputs.g2 = value,
            _ => return Err("Only CGPA fields accept typed entry.".to_string()),
        }
        Ok(value)
    }
}

/// Widget text for one field.
pub fn field_text(inputs: &StudentInputs, feature: Feature) -> String {
    match feature {
        Feature::G1 => format!("{:.2}", inputs.g1),
        Feature::G2 => format!("{:.2}", inputs.g2),
        Feature::Failures => inputs.failures.to_string(),
        Feature::Absences => inputs.absences.to_string(),
        Feature::Studytime => format!("◀ {} ▶", studytime_label(inputs.studytime)),
        Feature::Health => format!("{}/5", inputs.health),
        Feature::Goout => format!("{}/5", inputs.goout),
        Feature::Higher => checkbox(inputs.higher).to_string(),
        Feature::Activities => checkbox(inputs.activities).to_string(),
    }
}

fn checkbox(v: bool) -> &'static str {
    if v { "[x]" } else { "[ ]" }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn step_gpa(v: f64, delta: i32) -> f64 {
    round2(v + GPA_STEP * f64::from(delta)).clamp(CGPA_MIN, CGPA_MAX)
}

fn step_int(v: u32, delta: i32, feature: Feature) -> u32 {
    let (lo, hi) = feature.bounds();
    (i64::from(v) + i64::from(delta)).clamp(lo as i64, hi as i64) as u32
}

fn step_level(v: u8, delta: i32, feature: Feature) -> u8 {
    let (lo, hi) = feature.bounds();
    (i64::from(v) + i64::from(delta)).clamp(lo as i64, hi as i64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(feature: Feature) -> FormState {
        FormState {
            selected: Feature::ALL.iter().position(|&f| f == feature).unwrap(),
            ..FormState::default()
        }
    }

    #[test]
    fn rows_end_with_submit() {
        assert_eq!(row_at(0), FormRow::Field(Feature::G1));
        assert_eq!(row_at(8), FormRow::Field(Feature::Activities));
        assert_eq!(row_at(9), FormRow::Submit);

        let mut form = FormState::default();
        form.select_prev();
        assert_eq!(form.selected, 0);
        for _ in 0..20 {
            form.select_next();
        }
        assert_eq!(form.row(), FormRow::Submit);
    }

    #[test]
    fn gpa_steps_by_a_tenth_within_bounds() {
        let mut form = at(Feature::G2);
        form.adjust(1);
        assert!((form.inputs.g2 - 3.9).abs() < 1e-12);
        for _ in 0..30 {
            form.adjust(1);
        }
        assert_eq!(form.inputs.g2, 5.0);

        let mut form = at(Feature::G1);
        for _ in 0..50 {
            form.adjust(-1);
        }
        assert_eq!(form.inputs.g1, 0.0);
    }

    #[test]
    fn integer_and_slider_fields_clamp() {
        let mut form = at(Feature::Failures);
        form.adjust(-1);
        assert_eq!(form.inputs.failures, 0);
        for _ in 0..15 {
            form.adjust(1);
        }
        assert_eq!(form.inputs.failures, 10);

        let mut form = at(Feature::Studytime);
        form.adjust(1);
        form.adjust(1);
        assert_eq!(form.inputs.studytime, 3);
        assert_eq!(field_text(&form.inputs, Feature::Studytime), "◀ 5-10h ▶");
        for _ in 0..5 {
            form.adjust(1);
        }
        assert_eq!(form.inputs.studytime, 4);

        let mut form = at(Feature::Goout);
        for _ in 0..5 {
            form.adjust(-1);
        }
        assert_eq!(form.inputs.goout, 1);
    }

    #[test]
    fn checkboxes_toggle() {
        let mut form = at(Feature::Higher);
        form.toggle();
        assert!(!form.inputs.higher);
        assert_eq!(field_text(&form.inputs, Feature::Higher), "[ ]");
        form.adjust(1);
        assert!(form.inputs.higher);

        let mut form = at(Feature::Absences);
        form.toggle();
        assert_eq!(form.inputs, DEFAULT_INPUTS);
    }

    #[test]
    fn typed_entry_accepts_valid_gpa() {
        let mut form = at(Feature::G1);
        assert!(form.begin_edit());
        assert_eq!(form.editing.as_deref(), Some("3.50"));
        for _ in 0..4 {
            form.pop_char();
        }
        for c in "4.25".chars() {
            form.push_char(c);
        }
        form.push_char('.');
        form.push_char('x');
        assert_eq!(form.apply_edit(), Ok(4.25));
        assert_eq!(form.inputs.g1, 4.25);
        assert!(form.editing.is_none());
    }

    #[test]
    fn typed_entry_rejects_out_of_range_and_keeps_value() {
        let mut form = at(Feature::G2);
        form.begin_edit();
        form.editing = Some("7.5".to_string());
        let err = form.apply_edit().unwrap_err();
        assert!(err.contains("Year 2 CGPA"));
        assert_eq!(form.inputs.g2, 3.8);

        form.begin_edit();
        form.editing = Some(String::new());
        assert!(form.apply_edit().is_err());
        assert_eq!(form.inputs.g2, 3.8);
    }

    #[test]
    fn typed_entry_only_on_gpa_rows() {
        let mut form = at(Feature::Health);
        assert!(!form.begin_edit());
        assert!(form.editing.is_none());

        let mut form = at(Feature::G1);
        form.begin_edit();
        form.cancel_edit();
        assert!(form.editing.is_none());
        assert_eq!(form.inputs.g1, 3.5);
    }
}
