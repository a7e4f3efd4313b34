//! Durable storage for the trained model.
//!
//! The artifact pair lives in one directory: `tree.json` holds the
//! serialized tree and `meta.json` the metadata record. Each write goes to
//! a temporary file in the same directory and is renamed into place, so a
//! reader never observes a half-written artifact. Metadata lands first and
//! the tree rename completes the generation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::ModelError;
use crate::meta::ModelMeta;
use crate::tree::TreeNode;

/// File name of the serialized tree artifact.
pub const TREE_FILE: &str = "tree.json";
/// File name of the metadata artifact.
pub const META_FILE: &str = "meta.json";

/// A trained model reconstructed from (or headed for) storage.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    pub tree: TreeNode,
    pub meta: ModelMeta,
}

/// Handle to the artifact directory.
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether both artifacts are currently present.
    pub fn exists(&self) -> bool {
        self.dir.join(TREE_FILE).exists() && self.dir.join(META_FILE).exists()
    }

    /// Persist a freshly trained model, replacing any previous generation.
    pub fn save(&self, tree: &TreeNode, meta: &ModelMeta) -> Result<(), ModelError> {
        fs::create_dir_all(&self.dir)?;
        self.write_atomic(META_FILE, meta)?;
        self.write_atomic(TREE_FILE, tree)?;
        debug!(dir = %self.dir.display(), "model artifacts written");
        Ok(())
    }

    /// Read both artifacts back and validate the tree against the metadata.
    pub fn load(&self) -> Result<TrainedModel, ModelError> {
        let tree_path = self.dir.join(TREE_FILE);
        let meta_path = self.dir.join(META_FILE);
        if !tree_path.exists() || !meta_path.exists() {
            return Err(ModelError::NotTrained(
                "no model artifacts found; train first".to_string(),
            ));
        }

        let meta: ModelMeta = read_artifact(&meta_path)?;
        let tree: TreeNode = read_artifact(&tree_path)?;
        tree.validate(meta.feature_names.len())
            .map_err(ModelError::Corrupt)?;

        Ok(TrainedModel { tree, meta })
    }

    fn write_atomic<T: Serialize>(&self, name: &str, value: &T) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(value)?;
        let tmp_path = self.dir.join(format!("{name}.tmp"));
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, self.dir.join(name))?;
        Ok(())
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|err| ModelError::Corrupt(format!("{}: {err}", path.display())))
}
