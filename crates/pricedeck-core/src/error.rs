#![forbid(unsafe_code)]

use thiserror::Error;

use crate::item::{ContainerId, ItemId};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Contract violations raised by the registry and the drag session API.
///
/// None of these are expected during normal interaction. Callers either
/// surface them (strict mode) or log and treat the operation as a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown container: {container}")]
    NotFound { container: ContainerId },

    #[error("item {item} not found in container {container}")]
    ItemNotFound { container: ContainerId, item: ItemId },

    #[error("index {index} out of range for container {container} (len {len})")]
    IndexOutOfRange {
        container: ContainerId,
        index: usize,
        len: usize,
    },

    #[error("invalid session state: {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: &'static str,
    },

    #[error("duplicate container: {container}")]
    DuplicateContainer { container: ContainerId },

    #[error("duplicate item {item} in container {container}")]
    DuplicateItem { container: ContainerId, item: ItemId },
}

/// Copyable discriminant of [`EngineError`], handy for logs and matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    ItemNotFound,
    IndexOutOfRange,
    InvalidState,
    DuplicateContainer,
    DuplicateItem,
}

impl EngineError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ItemNotFound { .. } => ErrorKind::ItemNotFound,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::DuplicateContainer { .. } => ErrorKind::DuplicateContainer,
            Self::DuplicateItem { .. } => ErrorKind::DuplicateItem,
        }
    }

    #[must_use]
    pub fn not_found(container: &ContainerId) -> Self {
        Self::NotFound {
            container: container.clone(),
        }
    }

    #[must_use]
    pub fn item_not_found(container: &ContainerId, item: &ItemId) -> Self {
        Self::ItemNotFound {
            container: container.clone(),
            item: item.clone(),
        }
    }

    #[must_use]
    pub const fn invalid_state(operation: &'static str, state: &'static str) -> Self {
        Self::InvalidState { operation, state }
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineError, ErrorKind};
    use crate::item::{ContainerId, ItemId};

    #[test]
    fn display_names_the_container_and_item() {
        let error = EngineError::item_not_found(&ContainerId::new("tierA"), &ItemId::new("p9"));
        assert_eq!(error.to_string(), "item p9 not found in container tierA");
        assert_eq!(error.kind(), ErrorKind::ItemNotFound);
    }

    #[test]
    fn invalid_state_message() {
        let error = EngineError::invalid_state("begin", "dragging");
        assert_eq!(error.to_string(), "invalid session state: begin while dragging");
        assert_eq!(error.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn index_out_of_range_reports_len() {
        let error = EngineError::IndexOutOfRange {
            container: ContainerId::new("tierB"),
            index: 7,
            len: 1,
        };
        assert_eq!(
            error.to_string(),
            "index 7 out of range for container tierB (len 1)"
        );
    }
}
