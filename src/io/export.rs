//! Write the synthetic dataset to CSV.
//!
//! The layout is the one `ingest` reads back: one header row with the nine
//! feature columns in canonical order followed by the `G3` label.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::Path;

use crate::domain::{Feature, LABEL_COLUMN, StudentRecord};
use crate::error::AppError;

/// Write records to a CSV file, creating parent directories as needed.
pub fn write_students_csv(path: &Path, records: &[StudentRecord]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;

    let shown = path.display();
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dataset CSV '{shown}': {e}")))?;

    let header: Vec<&str> = Feature::ALL.iter().map(|f| f.column()).collect();
    writeln!(file, "{},{LABEL_COLUMN}", header.join(","))
        .map_err(|e| AppError::new(2, format!("Failed to write dataset CSV header: {e}")))?;

    for r in records {
        let x = &r.inputs;
        writeln!(
            file,
            "{:.2},{:.2},{},{},{},{},{},{},{},{:.2}",
            x.g1,
            x.g2,
            x.failures,
            x.absences,
            x.studytime,
            x.health,
            x.goout,
            u8::from(x.higher),
            u8::from(x.activities),
            r.g3,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write dataset CSV row: {e}")))?;
    }

    Ok(())
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let shown = parent.display();
        create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create directory '{shown}': {e}")))?;
    }
    Ok(())
}
