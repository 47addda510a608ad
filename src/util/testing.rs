//! Test helpers shared by unit and integration tests.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::domain::{Node, NodeId};

static TEST_SETUP: Once = Once::new();

/// Install a stderr tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to `debug`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let layer = fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_filter(filter);

        if tracing::dispatcher::has_been_set() {
            return;
        }
        if let Err(e) = tracing_subscriber::registry().with(layer).try_init() {
            eprintln!("Error: Failed to set up logging: {}", e);
        }
        info!("test logging ready");
    });
}

/// Build nodes from `(id, parent)` pairs, all switched on.
pub fn nodes(edges: &[(&str, Option<&str>)]) -> Vec<Node> {
    edges
        .iter()
        .map(|(id, parent)| {
            let node = Node::new(NodeId::from(*id));
            match parent {
                Some(p) => node.with_parent(NodeId::from(*p)),
                None => node,
            }
        })
        .collect()
}

/// Ids as owned `NodeId`s.
pub fn ids(raw: &[&str]) -> Vec<NodeId> {
    raw.iter().map(|id| NodeId::from(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_edges_when_building_nodes_then_parents_are_set() {
        init_test_setup();
        let built = nodes(&[("main", None), ("kitchen", Some("main"))]);
        assert!(built[0].is_root());
        assert_eq!(built[1].parent_id, Some(NodeId::from("main")));
        assert!(built[1].state);
    }
}
