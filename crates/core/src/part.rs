//! Part and Instance records plus their request/response shapes.
//!
//! A [`Part`] is a reusable component definition. An [`Instance`] is one
//! placement of a part inside another part's assembly, carrying its own
//! transform. Parts reference their instances by [`InstanceId`] only; the
//! instance records themselves live in the catalog's instance table.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{InstanceId, PartId, Timestamp, Transform, Vec3};

/// Revision assigned to freshly uploaded parts.
pub const DEFAULT_REVISION: &str = "1";

// ---------------------------------------------------------------------------
// Lifecycle status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartStatus {
    #[default]
    Draft,
    #[serde(rename = "In Review")]
    InReview,
    Approved,
    Released,
    Obsolete,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Reference to the uploaded geometry file backing a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    /// Name as supplied by the uploader.
    pub original_name: String,
    /// Unique name under the uploads directory.
    pub filename: String,
    pub size: u64,
    pub uploaded_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    #[serde(default)]
    pub nomenclature: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub part_number: String,
    #[serde(default = "default_revision")]
    pub revision: String,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub status: PartStatus,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default)]
    pub file: Option<FileRef>,
    pub created_at: Timestamp,
    pub modified_at: Timestamp,
    /// Ordered placements of other parts inside this one.
    #[serde(skip)]
    pub children: Vec<InstanceId>,
}

fn default_revision() -> String {
    DEFAULT_REVISION.to_string()
}

impl Part {
    /// Build a part with blank metadata, zero transform and no children.
    pub fn new(input: NewPart, now: Timestamp) -> Self {
        Self {
            id: PartId::new(),
            name: input.name,
            nomenclature: String::new(),
            description: String::new(),
            part_number: String::new(),
            revision: default_revision(),
            material: String::new(),
            weight: String::new(),
            cost: String::new(),
            supplier: String::new(),
            status: PartStatus::Draft,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            file: input.file,
            created_at: now,
            modified_at: now,
            children: Vec::new(),
        }
    }

    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
        }
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.modified_at = now;
    }
}

/// One placement of `part_id` inside the assembly of `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: InstanceId,
    pub parent_id: PartId,
    pub part_id: PartId,
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Instance {
    pub fn transform(&self) -> Transform {
        Transform {
            position: self.position,
            rotation: self.rotation,
        }
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
    }
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Input for creating a part (one per upload).
#[derive(Debug, Clone)]
pub struct NewPart {
    pub name: String,
    pub file: Option<FileRef>,
}

/// Partial metadata update. Relationship, identity and timestamp fields are
/// deliberately absent, so a client echoing back a whole part record cannot
/// overwrite `children` through this path.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePart {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 4096))]
    pub nomenclature: Option<String>,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub part_number: Option<String>,
    #[validate(length(max = 255))]
    pub revision: Option<String>,
    #[validate(length(max = 255))]
    pub material: Option<String>,
    #[validate(length(max = 255))]
    pub weight: Option<String>,
    #[validate(length(max = 255))]
    pub cost: Option<String>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    pub status: Option<PartStatus>,
}

impl UpdatePart {
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))
    }

    /// Merge the supplied fields into `part`.
    pub fn apply(self, part: &mut Part) {
        let fields = [
            (self.name, &mut part.name),
            (self.nomenclature, &mut part.nomenclature),
            (self.description, &mut part.description),
            (self.part_number, &mut part.part_number),
            (self.revision, &mut part.revision),
            (self.material, &mut part.material),
            (self.weight, &mut part.weight),
            (self.cost, &mut part.cost),
            (self.supplier, &mut part.supplier),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(status) = self.status {
            part.status = status;
        }
    }
}

/// A child entry as it appears on the wire and on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildView {
    pub instance_id: InstanceId,
    pub part_id: PartId,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
}

impl From<&Instance> for ChildView {
    fn from(instance: &Instance) -> Self {
        Self {
            instance_id: instance.id,
            part_id: instance.part_id,
            position: instance.position,
            rotation: instance.rotation,
        }
    }
}

/// A part with its children expanded from the instance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartView {
    #[serde(flatten)]
    pub part: Part,
    #[serde(default)]
    pub children: Vec<ChildView>,
}
