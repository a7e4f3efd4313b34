//! CSV loading and row normalization.
//!
//! The loader resolves the fixed columns against the header once, then
//! normalizes every data row independently: rows with an unrecognized
//! label or a non-numeric feature are counted and skipped, never fatal.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::errors::TrainerError;

/// Feature columns, in the order the model consumes them.
pub const FEATURE_COLUMNS: [&str; 3] = ["Credit_Score", "Income", "Loan_Amount(s)"];

/// Column holding the approval outcome.
pub const TARGET_COLUMN: &str = "Loan_Approved";

/// Validated training data: parallel feature rows and labels.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
    pub rows_skipped: usize,
}

impl Dataset {
    /// Load and normalize a CSV file.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, TrainerError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path.as_ref())?;
        Self::read_rows(&mut reader)
    }

    /// Load and normalize CSV text from any reader.
    pub fn from_csv_reader<R: Read>(source: R) -> Result<Self, TrainerError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
        Self::read_rows(&mut reader)
    }

    fn read_rows<R: Read>(reader: &mut csv::Reader<R>) -> Result<Self, TrainerError> {
        let headers = reader.headers()?.clone();
        let (feature_idx, target_idx) = resolve_columns(&headers)?;

        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut rows_skipped = 0usize;

        for record in reader.records() {
            let record = record?;
            match normalize_row(&record, &feature_idx, target_idx) {
                Some((vector, label)) => {
                    features.push(vector);
                    labels.push(label);
                }
                None => rows_skipped += 1,
            }
        }

        debug!(
            valid = features.len(),
            skipped = rows_skipped,
            "dataset normalized"
        );

        if features.len() < 2 {
            return Err(TrainerError::NotEnoughRows {
                valid: features.len(),
                skipped: rows_skipped,
            });
        }

        Ok(Self {
            features,
            labels,
            rows_skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Map a raw target cell to a binary label.
///
/// Accepts the textual, boolean, and numeric spellings that show up in
/// exported loan sheets. Anything else invalidates the row.
pub fn normalize_label(raw: &str) -> Option<u8> {
    match raw.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "1" | "approved" | "approve" => Some(1),
        "no" | "n" | "false" | "0" | "rejected" | "reject" => Some(0),
        _ => None,
    }
}

/// Parse one feature cell to a finite number.
fn parse_feature(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Resolve the fixed columns against the header, failing on the first
/// missing one.
fn resolve_columns(headers: &csv::StringRecord) -> Result<([usize; 3], usize), TrainerError> {
    let position = |name: &str| headers.iter().position(|header| header == name);

    let mut feature_idx = [0usize; 3];
    for (slot, name) in feature_idx.iter_mut().zip(FEATURE_COLUMNS) {
        *slot = position(name).ok_or_else(|| TrainerError::MissingColumn(name.to_string()))?;
    }
    let target_idx =
        position(TARGET_COLUMN).ok_or_else(|| TrainerError::MissingColumn(TARGET_COLUMN.to_string()))?;

    Ok((feature_idx, target_idx))
}

/// Turn one record into a feature vector and label, or `None` to skip it.
fn normalize_row(
    record: &csv::StringRecord,
    feature_idx: &[usize; 3],
    target_idx: usize,
) -> Option<(Vec<f64>, u8)> {
    let label = normalize_label(record.get(target_idx)?)?;
    let mut vector = Vec::with_capacity(FEATURE_COLUMNS.len());
    for &idx in feature_idx {
        vector.push(parse_feature(record.get(idx)?)?);
    }
    Some((vector, label))
}
