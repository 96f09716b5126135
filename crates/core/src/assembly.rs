//! Assembly graph mutations: attach, detach, replace and re-transform child
//! instances under a parent part.
//!
//! A returned error always means nothing changed. Scene limits are checked
//! against the edited graph, which is rolled back if they fail.

use std::collections::HashSet;

use chrono::Utc;

use crate::catalog::{Catalog, ENTITY_INSTANCE};
use crate::error::CoreError;
use crate::flatten::check_limits;
use crate::part::Instance;
use crate::types::{InstanceId, PartId, Transform, TransformPatch, Vec3};

impl Catalog {
    /// Place `child_id` under `parent_id` as a new instance.
    ///
    /// The same child may be attached any number of times; each call yields
    /// an independent instance with its own ID and transform.
    pub fn attach_child(
        &mut self,
        parent_id: PartId,
        child_id: PartId,
        position: Option<Vec3>,
        rotation: Option<Vec3>,
    ) -> Result<Instance, CoreError> {
        let patch = TransformPatch { position, rotation };
        patch.validate()?;
        self.part(parent_id)?;
        self.part(child_id)?;
        if self.would_create_cycle(parent_id, child_id) {
            return Err(CoreError::CycleDetected {
                parent: parent_id,
                child: child_id,
            });
        }

        let transform = patch.apply_to(Transform::default());
        let instance = Instance {
            id: InstanceId::new(),
            parent_id,
            part_id: child_id,
            position: transform.position,
            rotation: transform.rotation,
        };

        self.part_mut(parent_id)?.children.push(instance.id);
        self.instances.insert(instance.id, instance.clone());
        if let Err(err) = check_limits(self) {
            self.instances.remove(&instance.id);
            self.part_mut(parent_id)?.children.pop();
            return Err(err);
        }

        self.part_mut(parent_id)?.touch(Utc::now());
        Ok(instance)
    }

    /// Remove one instance from `parent_id`. The referenced part and any
    /// other instance of it are untouched.
    pub fn detach_child(
        &mut self,
        parent_id: PartId,
        instance_id: InstanceId,
    ) -> Result<Instance, CoreError> {
        self.owned_instance(parent_id, instance_id)?;

        let parent = self.part_mut(parent_id)?;
        parent.children.retain(|c| *c != instance_id);
        parent.touch(Utc::now());
        self.instances
            .remove(&instance_id)
            .ok_or_else(|| CoreError::not_found(ENTITY_INSTANCE, instance_id))
    }

    /// Point an existing instance slot at a different part, keeping its ID.
    /// Omitted transform fields keep the slot's prior values.
    pub fn replace_child(
        &mut self,
        parent_id: PartId,
        instance_id: InstanceId,
        new_child_id: PartId,
        patch: TransformPatch,
    ) -> Result<Instance, CoreError> {
        patch.validate()?;
        self.owned_instance(parent_id, instance_id)?;
        self.part(new_child_id)?;
        if self.would_create_cycle(parent_id, new_child_id) {
            return Err(CoreError::CycleDetected {
                parent: parent_id,
                child: new_child_id,
            });
        }

        let instance = self.instance_mut(instance_id)?;
        let previous = instance.clone();
        instance.part_id = new_child_id;
        let transform = patch.apply_to(instance.transform());
        instance.set_transform(transform);
        let replaced = instance.clone();
        if let Err(err) = check_limits(self) {
            *self.instance_mut(instance_id)? = previous;
            return Err(err);
        }

        self.part_mut(parent_id)?.touch(Utc::now());
        Ok(replaced)
    }

    /// Partially update an instance's position and/or rotation.
    pub fn update_relation(
        &mut self,
        parent_id: PartId,
        instance_id: InstanceId,
        patch: TransformPatch,
    ) -> Result<Instance, CoreError> {
        patch.validate()?;
        self.owned_instance(parent_id, instance_id)?;

        self.part_mut(parent_id)?.touch(Utc::now());
        let instance = self.instance_mut(instance_id)?;
        let transform = patch.apply_to(instance.transform());
        instance.set_transform(transform);
        Ok(instance.clone())
    }

    /// Whether placing `child_id` under `parent_id` would make a part
    /// contain itself, directly or transitively.
    pub fn would_create_cycle(&self, parent_id: PartId, child_id: PartId) -> bool {
        parent_id == child_id || self.descendants(child_id).contains(&parent_id)
    }

    /// Every part reachable from `id` through child instances, excluding
    /// `id` itself unless it is part of a cycle. Dangling references are
    /// ignored.
    pub fn descendants(&self, id: PartId) -> HashSet<PartId> {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(part) = self.parts.get(&current) else {
                continue;
            };
            for iid in &part.children {
                if let Some(instance) = self.instances.get(iid) {
                    if seen.insert(instance.part_id) {
                        stack.push(instance.part_id);
                    }
                }
            }
        }
        seen
    }

    /// Check that `instance_id` is one of `parent_id`'s children.
    fn owned_instance(&self, parent_id: PartId, instance_id: InstanceId) -> Result<(), CoreError> {
        let parent = self.part(parent_id)?;
        let listed = parent.children.contains(&instance_id);
        let owned = self
            .instances
            .get(&instance_id)
            .is_some_and(|i| i.parent_id == parent_id);
        if listed && owned {
            Ok(())
        } else {
            Err(CoreError::not_found(ENTITY_INSTANCE, instance_id))
        }
    }

    fn instance_mut(&mut self, id: InstanceId) -> Result<&mut Instance, CoreError> {
        self.instances
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found(ENTITY_INSTANCE, id))
    }
}
