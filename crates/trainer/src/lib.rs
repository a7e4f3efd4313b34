//! Training pipeline for the lendtree approval classifier: CSV rows in,
//! a decision tree plus its metadata out.

pub mod cart;
pub mod dataset;
pub mod errors;

use std::path::Path;

use lendtree_model::{ModelMeta, TrainedModel};

pub use cart::{TreeBuilder, TreeConfig};
pub use dataset::{normalize_label, Dataset, FEATURE_COLUMNS, TARGET_COLUMN};
pub use errors::TrainerError;

/// Train the approval classifier from a CSV file.
///
/// Loads and normalizes the rows, induces the tree with the default
/// configuration, and pairs it with the metadata the prediction path needs.
pub fn train_from_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel, TrainerError> {
    let dataset = Dataset::from_csv_path(path)?;
    train_dataset(&dataset)
}

/// Train from an already-normalized dataset.
pub fn train_dataset(dataset: &Dataset) -> Result<TrainedModel, TrainerError> {
    let tree = TreeBuilder::new(dataset, TreeConfig::default()).build()?;
    let meta = ModelMeta {
        feature_names: FEATURE_COLUMNS.iter().map(|name| name.to_string()).collect(),
        target_name: TARGET_COLUMN.to_string(),
        samples_used: dataset.len(),
        rows_skipped: dataset.rows_skipped,
    };
    Ok(TrainedModel { tree, meta })
}
