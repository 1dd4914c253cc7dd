//! Simulation error taxonomy
//!
//! Only content-authoring mistakes surface as errors. Recoverable situations
//! (a detour that cannot be placed, zero-length movement) are handled where
//! they occur.

use glam::Vec2;
use thiserror::Error;

use crate::sim::{AreaId, EntityId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Collision resolution kept proposing positions it had already rejected.
    /// The obstacles leave a gap the mover cannot fit through.
    #[error("unsolvable collision for entity {entity:?} at {position}")]
    UnsolvableCollision { entity: EntityId, position: Vec2 },

    #[error("area {0:?} is not registered")]
    UnknownArea(AreaId),

    #[error("route has no waypoints")]
    EmptyRoute,
}

pub type SimResult<T> = Result<T, SimError>;
