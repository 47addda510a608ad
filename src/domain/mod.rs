//! Domain layer: entities and hierarchy logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;

pub use arena::{ForestNode, NodeForest};
pub use entities::*;
pub use error::{DomainError, DomainResult};
