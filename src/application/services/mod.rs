//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the `NodeStore` boundary trait but are themselves
//! concrete structs, not traits.

mod cascade;
mod hierarchy;
mod topology;

pub use cascade::CascadeEngine;
pub use hierarchy::HierarchyManager;
pub use topology::TopologyService;
