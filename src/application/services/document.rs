//! Tree document persistence
//!
//! Saves a [`TreeModel`] as a flat record document and loads it back through
//! the same insertion path interactive edits use.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::application::codec::{Codec, Format};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{TreeDocument, TreeModel};
use crate::infrastructure::traits::FileSystem;

/// Service for saving and loading tree documents.
pub struct DocumentService<C = Format> {
    fs: Arc<dyn FileSystem>,
    codec: C,
}

impl<C: Codec> DocumentService<C> {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>, codec: C) -> Self {
        Self { fs, codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.fs.exists(path)
    }

    /// Flatten `model` and write it to `path`. Returns the number of records.
    #[instrument(level = "debug", skip(self, model))]
    pub fn save<P>(&self, model: &TreeModel<P>, path: &Path) -> ApplicationResult<usize>
    where
        P: Serialize + Clone,
    {
        let doc = TreeDocument::from(model.flatten());
        let bytes = self.codec.encode(&doc)?;
        self.fs
            .write_replace(path, &bytes)
            .with_path_context("write tree document", path)?;
        info!(
            "saved {} nodes to {} ({})",
            doc.nodes.len(),
            path.display(),
            self.codec.format()
        );
        Ok(doc.nodes.len())
    }

    /// Read and decode the document at `path` without touching any model.
    #[instrument(level = "debug", skip(self))]
    pub fn read_document<P: DeserializeOwned>(
        &self,
        path: &Path,
    ) -> ApplicationResult<TreeDocument<P>> {
        let bytes = self
            .fs
            .read(path)
            .with_path_context("read tree document", path)?;
        debug!("read {} bytes from {}", bytes.len(), path.display());
        Ok(self.codec.decode(&bytes)?)
    }

    /// Replace the contents of `model` with the document at `path`.
    ///
    /// Reading, decoding and record validation all happen before the model is
    /// cleared, so any failure leaves the previous tree intact.
    #[instrument(level = "debug", skip(self, model))]
    pub fn load<P: DeserializeOwned>(
        &self,
        model: &mut TreeModel<P>,
        path: &Path,
    ) -> ApplicationResult<usize> {
        let doc = self.read_document(path)?;
        let loaded = model.load_records(doc.nodes)?;
        info!("loaded {} nodes from {}", loaded, path.display());
        Ok(loaded)
    }
}
