//! Core model types for lendtree: the decision tree, the metadata that
//! describes how it was trained, and the artifact store both the trainer
//! and the prediction path go through.

pub mod errors;
pub mod meta;
pub mod store;
pub mod tree;

pub use errors::ModelError;
pub use meta::ModelMeta;
pub use store::{ModelStore, TrainedModel, META_FILE, TREE_FILE};
pub use tree::TreeNode;
