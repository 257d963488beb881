//! Dataset CSV ingest.
//!
//! Turns the synthesizer's CSV back into `StudentRecord`s for training and for
//! drawing the attribution background sample.
//!
//! - **Strict schema**: all ten columns must be present (found by name, so
//!   column order in the file does not matter)
//! - **Strict rows**: the dataset is machine-generated, so any malformed row is
//!   fatal and reported with its line number

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CGPA_MAX, CGPA_MIN, Feature, LABEL_COLUMN, StudentInputs, StudentRecord};
use crate::error::AppError;

/// Load every record from a dataset CSV.
pub fn load_students(path: &Path) -> Result<Vec<StudentRecord>, AppError> {
    if !path.exists() {
        return Err(AppError::missing_file("Dataset", path, "Run `cgpa generate` first."));
    }

    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(3, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &columns));
        let row = parsed.map_err(|msg| AppError::new(3, format!("line {line}: {msg}")))?;
        records.push(row);
    }

    if records.is_empty() {
        return Err(AppError::new(3, format!("Dataset '{}' has no rows.", path.display())));
    }

    tracing::debug!(rows = records.len(), path = %path.display(), "Loaded dataset");
    Ok(records)
}

/// Column positions for each feature plus the label.
#[derive(Debug, Clone)]
struct ColumnMap {
    features: HashMap<Feature, usize>,
    label: usize,
}

fn resolve_columns(headers: &StringRecord) -> Result<ColumnMap, AppError> {
    let by_name: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();

    let mut missing = Vec::new();
    let mut features = HashMap::new();
    for f in Feature::ALL {
        match by_name.get(f.column()) {
            Some(&i) => {
                features.insert(f, i);
            }
            None => missing.push(f.column()),
        }
    }
    let label = by_name.get(LABEL_COLUMN).copied();
    if label.is_none() {
        missing.push(LABEL_COLUMN);
    }

    match label {
        Some(label) if missing.is_empty() => Ok(ColumnMap { features, label }),
        _ => {
            let missing = missing.join(", ");
            Err(AppError::new(
                3,
                format!("Dataset is missing required column(s): {missing}"),
            ))
        }
    }
}

fn parse_row(record: &StringRecord, columns: &ColumnMap) -> Result<StudentRecord, String> {
    let field = |f: Feature| field_value(record, columns, f);

    let inputs = StudentInputs {
        g1: parse_f64(field(Feature::G1)?, Feature::G1.column())?,
        g2: parse_f64(field(Feature::G2)?, Feature::G2.column())?,
        failures: parse_int(field(Feature::Failures)?, Feature::Failures.column())?,
        absences: parse_int(field(Feature::Absences)?, Feature::Absences.column())?,
        studytime: parse_int(field(Feature::Studytime)?, Feature::Studytime.column())?,
        health: parse_int(field(Feature::Health)?, Feature::Health.column())?,
        goout: parse_int(field(Feature::Goout)?, Feature::Goout.column())?,
        higher: parse_flag(field(Feature::Higher)?, Feature::Higher.column())?,
        activities: parse_flag(field(Feature::Activities)?, Feature::Activities.column())?,
    };

    let g3_raw = record
        .get(columns.label)
        .ok_or_else(|| format!("missing value for '{LABEL_COLUMN}'"))?;
    let g3 = parse_f64(g3_raw, LABEL_COLUMN)?;

    inputs.validate().map_err(|e| e.to_string())?;
    let (lo, hi) = (CGPA_MIN, CGPA_MAX);
    if !(lo..=hi).contains(&g3) {
        return Err(format!("{LABEL_COLUMN} must be within [{lo}, {hi}], got {g3}."));
    }

    Ok(StudentRecord { inputs, g3 })
}

fn field_value<'a>(
    record: &'a StringRecord,
    columns: &ColumnMap,
    f: Feature,
) -> Result<&'a str, String> {
    columns
        .features
        .get(&f)
        .and_then(|&idx| record.get(idx))
        .ok_or_else(|| format!("missing value for '{}'", f.column()))
}

fn parse_f64(raw: &str, column: &str) -> Result<f64, String> {
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("invalid number '{raw}' in column '{column}'"))?;
    if !v.is_finite() {
        return Err(format!("non-finite value '{raw}' in column '{column}'"));
    }
    Ok(v)
}

fn parse_int<T: std::str::FromStr>(raw: &str, column: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("invalid non-negative integer '{raw}' in column '{column}'"))
}

fn parse_flag(raw: &str, column: &str) -> Result<bool, String> {
    match raw {
        "1" | "true" | "True" => Ok(true),
        "0" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid 0/1 flag '{raw}' in column '{column}'")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_rows_in_any_column_order() {
        let file = write_csv(
            "G3,activities,higher,goout,health,studytime,absences,failures,G2,G1\n\
             3.91,1,0,2,5,3,4,0,3.80,3.50\n",
        );
        let rows = load_students(file.path()).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.g3, 3.91);
        assert_eq!(r.inputs.g1, 3.5);
        assert_eq!(r.inputs.g2, 3.8);
        assert_eq!(r.inputs.absences, 4);
        assert_eq!(r.inputs.studytime, 3);
        assert!(r.inputs.activities);
        assert!(!r.inputs.higher);
    }

    #[test]
    fn missing_file_names_the_generate_command() {
        let err = load_students(Path::new("definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("cgpa generate"));
    }

    #[test]
    fn missing_column_is_reported() {
        let file = write_csv(
            "G1,G2,failures,absences,studytime,health,goout,higher,G3\n\
             1,1,0,0,1,1,1,1,1\n",
        );
        let err = load_students(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("activities"));
    }

    #[test]
    fn bad_row_reports_line_number() {
        let file = write_csv(
            "G1,G2,failures,absences,studytime,health,goout,higher,activities,G3\n\
             3.0,3.0,0,1,2,3,3,1,0,3.10\n\
             3.0,3.0,-1,1,2,3,3,1,0,3.10\n",
        );
        let err = load_students(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().starts_with("line 3:"), "{err}");
        assert!(err.to_string().contains("failures"));
    }

    #[test]
    fn out_of_range_values_are_rejected_with_line_numbers() {
        let header = "G1,G2,failures,absences,studytime,health,goout,higher,activities,G3\n";
        let good = "3.0,3.0,0,1,2,3,3,1,0,3.10\n";

        let file = write_csv(&format!("{header}{good}{good}3.0,3.0,0,1,9,3,3,1,0,3.10\n"));
        let err = load_students(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().starts_with("line 4:"), "{err}");
        assert!(err.to_string().contains("studytime"));

        let file = write_csv(&format!("{header}7.0,3.0,0,1,2,3,3,1,0,3.10\n"));
        let err = load_students(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"), "{err}");
        assert!(err.to_string().contains("G1"));

        let file = write_csv(&format!("{header}{good}3.0,3.0,0,1,2,3,3,1,0,5.40\n"));
        let err = load_students(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().starts_with("line 3:"), "{err}");
        assert!(err.to_string().contains("G3"));
    }
}
