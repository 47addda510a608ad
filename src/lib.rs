//! breakertree: breaker hierarchies with cycle-safe parent links and
//! best-effort state cascades.
//!
//! Layers, innermost first:
//! - `domain`: nodes, cascade results, the in-memory forest
//! - `application`: `HierarchyManager`, `CascadeEngine`, `TopologyService`
//! - `infrastructure`: `NodeStore` adapters and service wiring
//! - `cli`: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
