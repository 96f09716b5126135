//! In-memory part catalog: an arena of parts plus a table of instances.
//!
//! Parts are keyed by [`PartId`] in insertion order, which makes root
//! ordering in [`flatten`](crate::flatten) reproducible. Instances live in
//! their own table keyed by [`InstanceId`]; a part's `children` list only
//! holds instance IDs. Relationship mutations live in
//! [`assembly`](crate::assembly).

use std::collections::HashMap;

use chrono::Utc;
use indexmap::IndexMap;

use crate::error::CoreError;
use crate::part::{ChildView, Instance, NewPart, Part, PartView, UpdatePart};
use crate::types::{InstanceId, PartId, TransformPatch};

pub const ENTITY_PART: &str = "Part";
pub const ENTITY_INSTANCE: &str = "Instance";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub(crate) parts: IndexMap<PartId, Part>,
    pub(crate) instances: HashMap<InstanceId, Instance>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from its serialized form, splitting embedded
    /// children back out into the instance table.
    ///
    /// Children pointing at parts that do not exist are kept; flattening
    /// skips them. A repeated instance ID is rejected because it would make
    /// render keys ambiguous.
    pub fn from_views(views: Vec<PartView>) -> Result<Self, CoreError> {
        let mut catalog = Self::new();
        for PartView { mut part, children } in views {
            if catalog.parts.contains_key(&part.id) {
                return Err(CoreError::Validation(format!(
                    "duplicate part id {}",
                    part.id
                )));
            }
            part.children = Vec::with_capacity(children.len());
            for child in children {
                let instance = Instance {
                    id: child.instance_id,
                    parent_id: part.id,
                    part_id: child.part_id,
                    position: child.position,
                    rotation: child.rotation,
                };
                if catalog.instances.insert(instance.id, instance).is_some() {
                    return Err(CoreError::Validation(format!(
                        "duplicate instance id {}",
                        child.instance_id
                    )));
                }
                part.children.push(child.instance_id);
            }
            catalog.parts.insert(part.id, part);
        }
        Ok(catalog)
    }

    /// Serialize every part with its children expanded, in catalog order.
    pub fn to_views(&self) -> Vec<PartView> {
        self.parts.values().map(|p| self.expand(p)).collect()
    }

    /// All parts keyed by ID, children expanded.
    pub fn metadata_map(&self) -> IndexMap<PartId, PartView> {
        self.parts
            .iter()
            .map(|(id, p)| (*id, self.expand(p)))
            .collect()
    }

    pub fn view(&self, id: PartId) -> Result<PartView, CoreError> {
        self.part(id).map(|p| self.expand(p))
    }

    fn expand(&self, part: &Part) -> PartView {
        let children = part
            .children
            .iter()
            .filter_map(|iid| self.instances.get(iid))
            .map(ChildView::from)
            .collect();
        PartView {
            part: part.clone(),
            children,
        }
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn contains(&self, id: PartId) -> bool {
        self.parts.contains_key(&id)
    }

    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    pub fn part(&self, id: PartId) -> Result<&Part, CoreError> {
        self.parts
            .get(&id)
            .ok_or_else(|| CoreError::not_found(ENTITY_PART, id))
    }

    pub(crate) fn part_mut(&mut self, id: PartId) -> Result<&mut Part, CoreError> {
        self.parts
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found(ENTITY_PART, id))
    }

    pub fn instance(&self, id: InstanceId) -> Option<&Instance> {
        self.instances.get(&id)
    }

    /// The instances placed directly under `id`, in stored order.
    pub fn children_of(&self, id: PartId) -> Result<Vec<&Instance>, CoreError> {
        let part = self.part(id)?;
        Ok(part
            .children
            .iter()
            .filter_map(|iid| self.instances.get(iid))
            .collect())
    }

    // -----------------------------------------------------------------------
    // Part operations
    // -----------------------------------------------------------------------

    pub fn create_part(&mut self, input: NewPart) -> Part {
        let part = Part::new(input, Utc::now());
        self.parts.insert(part.id, part.clone());
        part
    }

    pub fn update_part(&mut self, id: PartId, update: UpdatePart) -> Result<Part, CoreError> {
        update.check()?;
        let part = self.part_mut(id)?;
        update.apply(part);
        part.touch(Utc::now());
        Ok(part.clone())
    }

    /// Update a part's own default transform (used when it renders as a root).
    pub fn update_part_transform(
        &mut self,
        id: PartId,
        patch: TransformPatch,
    ) -> Result<Part, CoreError> {
        patch.validate()?;
        let part = self.part_mut(id)?;
        let transform = patch.apply_to(part.transform());
        part.set_transform(transform);
        part.touch(Utc::now());
        Ok(part.clone())
    }

    /// Delete a part and cascade through the assembly graph.
    ///
    /// Removes the instances the part owns and every instance, under any
    /// parent, that places it. Parents that lose a child get a refreshed
    /// modified timestamp. Parts placed by the removed instances are kept.
    pub fn delete_part(&mut self, id: PartId) -> Result<Part, CoreError> {
        let part = self
            .parts
            .shift_remove(&id)
            .ok_or_else(|| CoreError::not_found(ENTITY_PART, id))?;

        for iid in &part.children {
            self.instances.remove(iid);
        }

        let placements: Vec<(InstanceId, PartId)> = self
            .instances
            .values()
            .filter(|i| i.part_id == id)
            .map(|i| (i.id, i.parent_id))
            .collect();

        let now = Utc::now();
        for (iid, parent_id) in placements {
            self.instances.remove(&iid);
            if let Some(parent) = self.parts.get_mut(&parent_id) {
                parent.children.retain(|c| *c != iid);
                parent.touch(now);
            }
        }

        Ok(part)
    }
}
