use thiserror::Error;

/// Errors surfaced by dataset loading and tree induction.
#[derive(Debug, Error)]
pub enum TrainerError {
    /// The CSV header lacks a required column.
    #[error("dataset is missing required column: {0}")]
    MissingColumn(String),

    /// Normalization left fewer rows than training needs.
    #[error("not enough valid rows to train (got {valid}, skipped {skipped})")]
    NotEnoughRows { valid: usize, skipped: usize },

    /// The row source itself could not be read.
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
}
