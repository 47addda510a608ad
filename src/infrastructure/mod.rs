//! Infrastructure layer: store implementations and DI container
//!
//! This layer implements the I/O boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod file_store;
pub mod memory_store;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use file_store::FileNodeStore;
pub use memory_store::InMemoryNodeStore;
