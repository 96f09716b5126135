use crate::types::PartId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Attaching `child` under `parent` (or expanding it) would make a part
    /// contain itself.
    #[error("Cycle detected: part {child} cannot be placed under {parent}")]
    CycleDetected { parent: PartId, child: PartId },

    /// A render instance would sit more than `limit` levels below its root.
    #[error("Assembly too deep: nesting is limited to {limit} levels")]
    DepthExceeded { limit: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
