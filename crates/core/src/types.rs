//! Identifier newtypes and spatial value types shared across the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id! {
    /// Identity of a [`Part`](crate::part::Part). Never reused after deletion.
    PartId
}

uuid_id! {
    /// Identity of one placement of a part inside a parent's assembly.
    /// Distinct from every [`PartId`] and unique across all parents.
    InstanceId
}

/// A 3-component vector used for both positions and Euler rotations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Position plus rotation of a part or instance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// Partial transform edit; omitted fields keep their prior value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformPatch {
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
}

impl TransformPatch {
    /// Reject NaN or infinite components before they reach the store.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [("position", self.position), ("rotation", self.rotation)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(CoreError::Validation(format!(
                        "{field} components must be finite numbers"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Overlay this patch on `base`.
    pub fn apply_to(&self, base: Transform) -> Transform {
        Transform {
            position: self.position.unwrap_or(base.position),
            rotation: self.rotation.unwrap_or(base.rotation),
        }
    }
}
