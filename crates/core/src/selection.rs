//! Mapping a selected render key back to the record it edits.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::flatten::RenderInstance;
use crate::types::{InstanceId, PartId, Transform, TransformPatch};

pub const ENTITY_RENDER_INSTANCE: &str = "RenderInstance";

/// What a render key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    /// A part rendered at top level with its own default transform.
    Root { part_id: PartId },
    /// One placement of `part_id` under `parent_id`.
    ChildInstance {
        parent_id: PartId,
        instance_id: InstanceId,
        part_id: PartId,
    },
}

impl Selection {
    /// The part whose metadata an edit through this selection changes.
    /// Metadata is shared by every instance of a part.
    pub fn metadata_target(&self) -> PartId {
        match *self {
            Selection::Root { part_id } | Selection::ChildInstance { part_id, .. } => part_id,
        }
    }
}

/// Resolve `render_key` against a flattened scene.
pub fn resolve(render_key: &str, scene: &[RenderInstance]) -> Result<Selection, CoreError> {
    let hit = scene
        .iter()
        .find(|r| r.render_key == render_key)
        .ok_or_else(|| CoreError::not_found(ENTITY_RENDER_INSTANCE, render_key))?;

    match (hit.parent_id, hit.instance_id) {
        (Some(parent_id), Some(instance_id)) => Ok(Selection::ChildInstance {
            parent_id,
            instance_id,
            part_id: hit.part_id,
        }),
        (None, None) => Ok(Selection::Root {
            part_id: hit.part_id,
        }),
        _ => Err(CoreError::Internal(format!(
            "render instance {render_key} has inconsistent back-references"
        ))),
    }
}

/// Route a transform edit to the record that owns it: the part's default
/// transform for roots, the instance relation for child placements.
pub fn apply_transform(
    catalog: &mut Catalog,
    selection: &Selection,
    patch: TransformPatch,
) -> Result<Transform, CoreError> {
    match *selection {
        Selection::Root { part_id } => catalog
            .update_part_transform(part_id, patch)
            .map(|p| p.transform()),
        Selection::ChildInstance {
            parent_id,
            instance_id,
            ..
        } => catalog
            .update_relation(parent_id, instance_id, patch)
            .map(|i| i.transform()),
    }
}
