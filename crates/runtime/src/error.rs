//! Error types surfaced by the runtime API.
//!
//! Unreachable goals are not errors (see [`nav_core::PathResult::found`]) and
//! unknown state names are logged and published rather than returned, so
//! this enum only covers misuse of the controller API itself.
use nav_core::{ErrorSeverity, GridError, NavError};
use state_machine::DefinitionError;
use thiserror::Error;

use crate::entity::{Archetype, EntityId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no behavior registered for archetype {0}")]
    UnknownArchetype(Archetype),

    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    #[error("controller requires a grid to be configured before building")]
    MissingGrid,

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("invalid behavior definition: {0}")]
    Definition(#[from] DefinitionError),
}

impl NavError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::UnknownArchetype(_) | RuntimeError::EntityNotFound(_) => {
                ErrorSeverity::Recoverable
            }
            RuntimeError::MissingGrid | RuntimeError::Definition(_) => ErrorSeverity::Validation,
            RuntimeError::Grid(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::UnknownArchetype(_) => "RUNTIME_UNKNOWN_ARCHETYPE",
            RuntimeError::EntityNotFound(_) => "RUNTIME_ENTITY_NOT_FOUND",
            RuntimeError::MissingGrid => "RUNTIME_MISSING_GRID",
            RuntimeError::Grid(err) => err.error_code(),
            RuntimeError::Definition(_) => "RUNTIME_INVALID_DEFINITION",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definition_error_message_is_kept() {
        let err = RuntimeError::from(DefinitionError::DuplicateState {
            behavior: "guard",
            state: "patrol",
        });
        assert_eq!(
            err.to_string(),
            "invalid behavior definition: behavior 'guard' registers state 'patrol' twice"
        );
        assert_eq!(err.error_code(), "RUNTIME_INVALID_DEFINITION");
    }
}
