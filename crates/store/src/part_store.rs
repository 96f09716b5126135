//! Single-writer part store with all-or-nothing persistence.
//!
//! Every mutation runs against a copy of the catalog. The copy is written
//! to disk and only swapped in once the write succeeded, so a failed write
//! leaves both memory and disk at the previous state.
//!
//! The write and the swap happen in a spawned task that owns the lock
//! guard. Dropping the caller (client gone, request timed out) cannot stop
//! the swap once the write has started.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use piniplm_core::catalog::Catalog;
use piniplm_core::error::CoreError;
use piniplm_core::flatten::{flatten, Flattened};
use piniplm_core::part::{Instance, NewPart, Part, PartView, UpdatePart};
use piniplm_core::selection::{self, Selection};
use piniplm_core::types::{InstanceId, PartId, Transform, TransformPatch, Vec3};
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::snapshot::{read_snapshot, write_snapshot};

#[derive(Debug)]
pub struct PartStore {
    catalog: Arc<Mutex<Catalog>>,
    /// `None` for in-memory stores used in tests.
    path: Option<PathBuf>,
}

impl PartStore {
    /// A store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            catalog: Arc::new(Mutex::new(Catalog::new())),
            path: None,
        }
    }

    /// Open (or create) the snapshot at `path`.
    ///
    /// A missing file starts an empty catalog. An unreadable or invalid file
    /// is an error rather than silently discarding existing data.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await?;
        }

        let load_path = path.clone();
        let loaded = tokio::task::spawn_blocking(move || read_snapshot(&load_path)).await??;
        let catalog = match loaded {
            Some(catalog) => {
                tracing::info!(path = %path.display(), parts = catalog.len(), "Loaded part snapshot");
                catalog
            }
            None => {
                tracing::info!(path = %path.display(), "No snapshot found, starting empty");
                Catalog::new()
            }
        };

        Ok(Self {
            catalog: Arc::new(Mutex::new(catalog)),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run a read-only closure against the current catalog.
    pub async fn read<T>(&self, f: impl FnOnce(&Catalog) -> T) -> T {
        let guard = self.catalog.lock().await;
        f(&guard)
    }

    /// Apply `f` to a copy of the catalog, persist the copy, then publish it.
    ///
    /// Holds the lock for the whole read-modify-persist cycle, so mutations
    /// never interleave. Cancelling the returned future before `f` runs
    /// changes nothing; after that, the write and publish run to completion.
    pub async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Catalog) -> Result<T, CoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = Arc::clone(&self.catalog).lock_owned().await;
        let mut working = guard.clone();
        let out = f(&mut working)?;

        let Some(path) = self.path.clone() else {
            *guard = working;
            return Ok(out);
        };

        let publish = tokio::spawn(async move {
            let written = tokio::task::spawn_blocking(move || {
                write_snapshot(&path, &working).map(|()| working)
            })
            .await??;
            *guard = written;
            Ok::<(), StoreError>(())
        });
        publish.await??;

        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Parts
    // -----------------------------------------------------------------------

    pub async fn create_part(&self, input: NewPart) -> Result<Part, StoreError> {
        self.mutate(|c| Ok(c.create_part(input))).await
    }

    pub async fn get_part(&self, id: PartId) -> Result<PartView, StoreError> {
        Ok(self.read(|c| c.view(id)).await?)
    }

    pub async fn list_parts(&self) -> Vec<PartView> {
        self.read(Catalog::to_views).await
    }

    pub async fn metadata_map(&self) -> IndexMap<PartId, PartView> {
        self.read(Catalog::metadata_map).await
    }

    pub async fn count(&self) -> usize {
        self.read(Catalog::len).await
    }

    pub async fn update_part(&self, id: PartId, update: UpdatePart) -> Result<PartView, StoreError> {
        self.mutate(|c| {
            c.update_part(id, update)?;
            c.view(id)
        })
        .await
    }

    pub async fn update_part_transform(
        &self,
        id: PartId,
        patch: TransformPatch,
    ) -> Result<PartView, StoreError> {
        self.mutate(|c| {
            c.update_part_transform(id, patch)?;
            c.view(id)
        })
        .await
    }

    /// Delete a part, cascading its placements. The caller removes the
    /// stored file.
    pub async fn delete_part(&self, id: PartId) -> Result<Part, StoreError> {
        self.mutate(|c| c.delete_part(id)).await
    }

    // -----------------------------------------------------------------------
    // Assembly relations
    // -----------------------------------------------------------------------

    pub async fn attach_child(
        &self,
        parent_id: PartId,
        child_id: PartId,
        position: Option<Vec3>,
        rotation: Option<Vec3>,
    ) -> Result<Instance, StoreError> {
        self.mutate(|c| c.attach_child(parent_id, child_id, position, rotation))
            .await
    }

    pub async fn detach_child(
        &self,
        parent_id: PartId,
        instance_id: InstanceId,
    ) -> Result<Instance, StoreError> {
        self.mutate(|c| c.detach_child(parent_id, instance_id)).await
    }

    pub async fn replace_child(
        &self,
        parent_id: PartId,
        instance_id: InstanceId,
        new_child_id: PartId,
        patch: TransformPatch,
    ) -> Result<Instance, StoreError> {
        self.mutate(|c| c.replace_child(parent_id, instance_id, new_child_id, patch))
            .await
    }

    pub async fn update_relation(
        &self,
        parent_id: PartId,
        instance_id: InstanceId,
        patch: TransformPatch,
    ) -> Result<Instance, StoreError> {
        self.mutate(|c| c.update_relation(parent_id, instance_id, patch))
            .await
    }

    // -----------------------------------------------------------------------
    // Scene
    // -----------------------------------------------------------------------

    /// Flatten the current catalog. Recomputed on every call.
    pub async fn scene(&self) -> Result<Flattened, StoreError> {
        let flat = self.read(flatten).await?;
        for dangling in &flat.dangling {
            tracing::warn!(
                parent_id = %dangling.parent_id,
                instance_id = %dangling.instance_id,
                part_id = ?dangling.part_id,
                "Skipping unresolvable child reference",
            );
        }
        Ok(flat)
    }

    pub async fn resolve(&self, render_key: &str) -> Result<Selection, StoreError> {
        Ok(self
            .read(|c| {
                let scene = flatten(c)?;
                selection::resolve(render_key, &scene.instances)
            })
            .await?)
    }

    /// Resolve `render_key` and route the transform edit, atomically.
    pub async fn apply_selection_transform(
        &self,
        render_key: &str,
        patch: TransformPatch,
    ) -> Result<(Selection, Transform), StoreError> {
        self.mutate(|c| {
            let scene = flatten(c)?;
            let selected = selection::resolve(render_key, &scene.instances)?;
            let transform = selection::apply_transform(c, &selected, patch)?;
            Ok((selected, transform))
        })
        .await
    }

    /// Edit the metadata of the part behind `render_key`.
    pub async fn update_selection_metadata(
        &self,
        render_key: &str,
        update: UpdatePart,
    ) -> Result<PartView, StoreError> {
        self.mutate(|c| {
            let scene = flatten(c)?;
            let target = selection::resolve(render_key, &scene.instances)?.metadata_target();
            c.update_part(target, update)?;
            c.view(target)
        })
        .await
    }
}
