//! Flattening of the part graph into an ordered list of render instances.
//!
//! Roots are parts that no instance places. Each root is expanded
//! depth-first, parent before children, children in stored order. A part
//! placed several times under the same parent gets an ordinal suffix
//! (`"bolt [1]"`, `"bolt [2]"`) so each placement is distinguishable.
//!
//! The same part legitimately appears many times in the output, so cycle
//! protection tracks the chain of parts currently being expanded rather
//! than a global visited set.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::part::{Instance, Part};
use crate::types::{InstanceId, PartId, Vec3};

/// Deepest allowed render instance; roots are depth 0.
pub const MAX_ASSEMBLY_DEPTH: usize = 64;

/// Upper bound on the flattened scene. A part placed twice at every level
/// doubles the output per level, so this caps memory per flatten.
pub const MAX_RENDER_INSTANCES: usize = 100_000;

/// One placement of a part in the rendered scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderInstance {
    /// Instance ID for child placements, part ID for roots.
    pub render_key: String,
    pub part_id: PartId,
    pub display_name: String,
    pub position: Vec3,
    pub rotation: Vec3,
    pub parent_id: Option<PartId>,
    pub instance_id: Option<InstanceId>,
    pub is_child_instance: bool,
    /// 0 for roots.
    pub depth: usize,
    /// Stored geometry file, if the part has one.
    pub filename: Option<String>,
}

/// A child entry that could not be resolved and was left out of the scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DanglingRef {
    pub parent_id: PartId,
    pub instance_id: InstanceId,
    /// `None` when the instance record itself is missing.
    pub part_id: Option<PartId>,
}

/// Size of the flattened scene, computed without materializing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneExtent {
    pub instances: usize,
    /// Depth of the deepest render instance.
    pub depth: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Flattened {
    pub instances: Vec<RenderInstance>,
    pub dangling: Vec<DanglingRef>,
}

/// Parts that are not placed by any instance, in catalog order.
pub fn root_ids(catalog: &Catalog) -> Vec<PartId> {
    let referenced: HashSet<PartId> = catalog
        .parts()
        .flat_map(|p| p.children.iter())
        .filter_map(|iid| catalog.instance(*iid))
        .map(|i| i.part_id)
        .collect();

    catalog
        .parts()
        .map(|p| p.id)
        .filter(|id| !referenced.contains(id))
        .collect()
}

/// Count what [`flatten`] would emit, memoized per part.
///
/// Chains are not followed past [`MAX_ASSEMBLY_DEPTH`]; once the limit is
/// crossed the exact figures no longer matter. Cycles contribute nothing
/// here and are left to [`flatten`] to report.
pub fn extent(catalog: &Catalog) -> SceneExtent {
    let mut memo = HashMap::new();
    let mut active = HashSet::new();
    let mut total = SceneExtent::default();
    for id in root_ids(catalog) {
        let sub = subtree_extent(catalog, id, &mut memo, &mut active);
        total.instances = total.instances.saturating_add(sub.instances);
        total.depth = total.depth.max(sub.depth);
    }
    total
}

fn subtree_extent(
    catalog: &Catalog,
    id: PartId,
    memo: &mut HashMap<PartId, SceneExtent>,
    active: &mut HashSet<PartId>,
) -> SceneExtent {
    if let Some(known) = memo.get(&id) {
        return *known;
    }
    if active.len() > MAX_ASSEMBLY_DEPTH || !active.insert(id) {
        return SceneExtent {
            instances: 1,
            depth: 0,
        };
    }

    let mut out = SceneExtent {
        instances: 1,
        depth: 0,
    };
    if let Ok(part) = catalog.part(id) {
        for iid in &part.children {
            let Some(instance) = catalog.instance(*iid) else {
                continue;
            };
            if !catalog.contains(instance.part_id) {
                continue;
            }
            let child = subtree_extent(catalog, instance.part_id, memo, active);
            out.instances = out.instances.saturating_add(child.instances);
            out.depth = out.depth.max(child.depth + 1);
        }
    }

    active.remove(&id);
    memo.insert(id, out);
    out
}

/// Fail if the scene is deeper than [`MAX_ASSEMBLY_DEPTH`] or larger than
/// [`MAX_RENDER_INSTANCES`].
pub fn check_limits(catalog: &Catalog) -> Result<(), CoreError> {
    let extent = extent(catalog);
    if extent.depth > MAX_ASSEMBLY_DEPTH {
        return Err(CoreError::DepthExceeded {
            limit: MAX_ASSEMBLY_DEPTH,
        });
    }
    if extent.instances > MAX_RENDER_INSTANCES {
        return Err(too_many_instances());
    }
    Ok(())
}

fn too_many_instances() -> CoreError {
    CoreError::Validation(format!(
        "assembly expands to more than {MAX_RENDER_INSTANCES} render instances"
    ))
}

/// Expand every root into render instances.
///
/// Unresolvable children are skipped and reported in
/// [`Flattened::dangling`]. Fails with [`CoreError::CycleDetected`] if a
/// part is reached again while it is still being expanded, and with
/// [`CoreError::DepthExceeded`] or [`CoreError::Validation`] if the scene
/// is past its limits.
pub fn flatten(catalog: &Catalog) -> Result<Flattened, CoreError> {
    let mut walker = Walker {
        catalog,
        path: Vec::new(),
        out: Flattened::default(),
    };
    for id in root_ids(catalog) {
        let part = catalog.part(id)?;
        let root = RenderInstance {
            render_key: part.id.to_string(),
            part_id: part.id,
            display_name: part.name.clone(),
            position: part.position,
            rotation: part.rotation,
            parent_id: None,
            instance_id: None,
            is_child_instance: false,
            depth: 0,
            filename: filename_of(part),
        };
        walker.visit(part, root)?;
    }
    Ok(walker.out)
}

struct Walker<'a> {
    catalog: &'a Catalog,
    path: Vec<PartId>,
    out: Flattened,
}

impl<'a> Walker<'a> {
    fn visit(&mut self, part: &'a Part, emitted: RenderInstance) -> Result<(), CoreError> {
        if self.path.contains(&part.id) {
            return Err(CoreError::CycleDetected {
                parent: self.path.last().copied().unwrap_or(part.id),
                child: part.id,
            });
        }
        if emitted.depth > MAX_ASSEMBLY_DEPTH {
            return Err(CoreError::DepthExceeded {
                limit: MAX_ASSEMBLY_DEPTH,
            });
        }
        if self.out.instances.len() >= MAX_RENDER_INSTANCES {
            return Err(too_many_instances());
        }
        let depth = emitted.depth;
        self.out.instances.push(emitted);
        self.path.push(part.id);

        let children = self.resolve_children(part);

        let mut totals: HashMap<PartId, usize> = HashMap::new();
        for (instance, _) in &children {
            *totals.entry(instance.part_id).or_default() += 1;
        }

        let mut seen: HashMap<PartId, usize> = HashMap::new();
        for (instance, child) in children {
            let ordinal = seen.entry(instance.part_id).or_default();
            *ordinal += 1;
            let display_name = if totals[&instance.part_id] > 1 {
                format!("{} [{}]", child.name, ordinal)
            } else {
                child.name.clone()
            };

            let emitted = RenderInstance {
                render_key: instance.id.to_string(),
                part_id: child.id,
                display_name,
                position: instance.position,
                rotation: instance.rotation,
                parent_id: Some(part.id),
                instance_id: Some(instance.id),
                is_child_instance: true,
                depth: depth + 1,
                filename: filename_of(child),
            };
            self.visit(child, emitted)?;
        }

        self.path.pop();
        Ok(())
    }

    /// Pair each child instance with its part, recording the ones that do
    /// not resolve.
    fn resolve_children(&mut self, part: &'a Part) -> Vec<(&'a Instance, &'a Part)> {
        let catalog = self.catalog;
        let mut resolved = Vec::with_capacity(part.children.len());
        for iid in &part.children {
            let Some(instance) = catalog.instance(*iid) else {
                self.out.dangling.push(DanglingRef {
                    parent_id: part.id,
                    instance_id: *iid,
                    part_id: None,
                });
                continue;
            };
            match catalog.part(instance.part_id) {
                Ok(child) => resolved.push((instance, child)),
                Err(_) => self.out.dangling.push(DanglingRef {
                    parent_id: part.id,
                    instance_id: *iid,
                    part_id: Some(instance.part_id),
                }),
            }
        }
        resolved
    }
}

fn filename_of(part: &Part) -> Option<String> {
    part.file.as_ref().map(|f| f.filename.clone())
}
