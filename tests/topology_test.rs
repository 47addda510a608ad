//! Tests for TopologyService

use std::sync::Arc;

use rstest::{fixture, rstest};

use breakertree::application::services::{HierarchyManager, TopologyService};
use breakertree::application::ApplicationError;
use breakertree::domain::{DomainError, NodeId, DEFAULT_KIND};
use breakertree::infrastructure::InMemoryNodeStore;
use breakertree::util::testing::{ids, init_test_setup, nodes};

struct Fixture {
    store: Arc<InMemoryNodeStore>,
    hierarchy: Arc<HierarchyManager>,
    topology: TopologyService,
}

fn setup(edges: &[(&str, Option<&str>)]) -> Fixture {
    init_test_setup();
    let store = Arc::new(InMemoryNodeStore::with_nodes(nodes(edges)));
    let hierarchy = Arc::new(HierarchyManager::new(store.clone(), DEFAULT_KIND));
    let topology = TopologyService::new(hierarchy.clone());
    Fixture {
        store,
        hierarchy,
        topology,
    }
}

/// a -> b -> c, d
#[fixture]
fn chain() -> Fixture {
    setup(&[("a", None), ("b", Some("a")), ("c", Some("b")), ("d", None)])
}

fn parent_of(f: &Fixture, id: &str) -> Option<NodeId> {
    f.store.get(&id.into()).and_then(|n| n.parent_id)
}

#[rstest]
#[case("a", "c")]
#[case("a", "b")]
#[case("b", "c")]
#[case("c", "c")]
fn given_chain_when_reparenting_into_own_subtree_then_rejected_without_write(
    chain: Fixture,
    #[case] node: &str,
    #[case] parent: &str,
) {
    let before = chain.store.snapshot();

    let err = chain
        .topology
        .reparent(&node.into(), Some(&parent.into()))
        .unwrap_err();

    assert!(err.is_cycle());
    assert_eq!(chain.store.snapshot(), before);
}

#[rstest]
fn given_chain_when_reparenting_to_unrelated_node_then_parent_changes(chain: Fixture) {
    chain
        .topology
        .reparent(&"b".into(), Some(&"d".into()))
        .unwrap();

    assert_eq!(parent_of(&chain, "b"), Some("d".into()));
    assert_eq!(
        chain.hierarchy.get_parent_chain(&"c".into()).unwrap(),
        ids(&["b", "d"])
    );
}

#[rstest]
fn given_child_when_reparenting_to_none_then_becomes_root(chain: Fixture) {
    chain.topology.reparent(&"c".into(), None).unwrap();

    assert_eq!(parent_of(&chain, "c"), None);
    assert_eq!(chain.hierarchy.get_roots().unwrap(), ids(&["a", "c", "d"]));
}

#[rstest]
#[case("ghost", Some("a"))]
#[case("b", Some("ghost"))]
#[case("ghost", None)]
fn given_unknown_node_or_parent_when_reparenting_then_not_found(
    chain: Fixture,
    #[case] node: &str,
    #[case] parent: Option<&str>,
) {
    let parent = parent.map(NodeId::from);

    let err = chain
        .topology
        .reparent(&node.into(), parent.as_ref())
        .unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::NodeNotFound(_))
    ));
}

#[rstest]
fn given_unavailable_store_when_reparenting_then_store_unavailable(chain: Fixture) {
    chain.store.set_available(false);

    let err = chain
        .topology
        .reparent(&"d".into(), Some(&"a".into()))
        .unwrap_err();

    assert!(err.is_unavailable());
}

#[test]
fn given_parent_with_children_when_orphaning_then_children_become_roots() {
    let f = setup(&[
        ("main", None),
        ("kitchen", Some("main")),
        ("garage", Some("main")),
        ("oven", Some("kitchen")),
    ]);

    let orphaned = f.topology.orphan_children(&"main".into()).unwrap();

    assert_eq!(orphaned, ids(&["kitchen", "garage"]));
    assert_eq!(
        f.hierarchy.get_roots().unwrap(),
        ids(&["main", "kitchen", "garage"])
    );
    // grandchildren keep their parent
    assert_eq!(parent_of(&f, "oven"), Some("kitchen".into()));
}

#[test]
fn given_orphaned_children_when_removing_parent_then_no_dangling_links() {
    let f = setup(&[("main", None), ("kitchen", Some("main"))]);

    f.topology.orphan_children(&"main".into()).unwrap();
    f.store.remove(&"main".into()).unwrap();

    assert!(f.store.snapshot().iter().all(|n| n.parent_id.is_none()));
    assert_eq!(f.hierarchy.get_roots().unwrap(), ids(&["kitchen"]));
}

#[test]
fn given_leaf_when_orphaning_then_nothing_changes() {
    let f = setup(&[("main", None), ("kitchen", Some("main"))]);

    assert!(f
        .topology
        .orphan_children(&"kitchen".into())
        .unwrap()
        .is_empty());
}

/// Small deterministic generator so the property run is reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((self.0 >> 33) as usize) % bound
    }
}

#[test]
fn given_random_parent_changes_when_applied_through_checks_then_forest_stays_acyclic() {
    let names: Vec<String> = (0..12).map(|i| format!("n{}", i)).collect();
    let edges: Vec<(&str, Option<&str>)> = names.iter().map(|n| (n.as_str(), None)).collect();
    let f = setup(&edges);
    let mut rng = Lcg(42);
    let (mut applied, mut rejected) = (0, 0);

    for _ in 0..300 {
        let node = NodeId::from(names[rng.next(names.len())].as_str());
        let parent = match rng.next(5) {
            0 => None,
            _ => Some(NodeId::from(names[rng.next(names.len())].as_str())),
        };

        match f.topology.reparent(&node, parent.as_ref()) {
            Ok(()) => applied += 1,
            Err(e) if e.is_cycle() => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }

        // every parent chain ends at a root within |nodes| steps
        for name in &names {
            let chain = f.hierarchy.get_parent_chain(&name.as_str().into()).unwrap();
            assert!(chain.len() < names.len());
        }
    }

    assert!(applied > 0);
    assert!(rejected > 0);
}
