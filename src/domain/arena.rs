use std::collections::{HashMap, HashSet};

use generational_arena::{Arena, Index};
use tracing::{instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::{Node, NodeId};

/// Forest node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct ForestNode {
    /// Node record as listed by the store
    pub data: Node,
    /// Index of the parent in the arena, None for roots and dangling parents
    pub parent: Option<Index>,
    /// Indices of child nodes, in store order
    pub children: Vec<Index>,
}

/// Arena-backed view of a flat node listing.
///
/// Rebuilt from scratch for every query: nodes only carry a parent id, the
/// child lists here are derived and never cached across listings.
#[derive(Debug, Default)]
pub struct NodeForest {
    arena: Arena<ForestNode>,
    index: HashMap<NodeId, Index>,
    /// Store order of the listing
    order: Vec<Index>,
    roots: Vec<Index>,
}

impl NodeForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the forest from a flat listing.
    ///
    /// Duplicate ids keep the first record. A parent id that is not part of
    /// the listing leaves the node without a parent index, so it renders as a
    /// root. Self-parents and longer loops are linked as stored; traversals
    /// guard against them.
    #[instrument(level = "debug", skip(nodes), fields(count = nodes.len()))]
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        let mut forest = Self::new();

        for node in nodes {
            if forest.index.contains_key(&node.id) {
                warn!("duplicate node id {}, keeping first record", node.id);
                continue;
            }
            let id = node.id.clone();
            let idx = forest.arena.insert(ForestNode {
                data: node,
                parent: None,
                children: Vec::new(),
            });
            forest.index.insert(id, idx);
            forest.order.push(idx);
        }

        for &idx in &forest.order {
            let parent_idx = forest.arena[idx]
                .data
                .parent_id
                .as_ref()
                .and_then(|p| forest.index.get(p).copied());

            match parent_idx {
                Some(parent) => {
                    forest.arena[idx].parent = Some(parent);
                    forest.arena[parent].children.push(idx);
                }
                None => {
                    if let Some(missing) = &forest.arena[idx].data.parent_id {
                        warn!(
                            "node {} references unknown parent {}",
                            forest.arena[idx].data.id, missing
                        );
                    }
                    forest.roots.push(idx);
                }
            }
        }

        forest
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &NodeId) -> Option<&Node> {
        self.index.get(id).map(|&idx| &self.arena[idx].data)
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn root_indices(&self) -> &[Index] {
        &self.roots
    }

    pub fn roots(&self) -> Vec<NodeId> {
        self.ids(&self.roots)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn children(&self, id: &NodeId) -> Vec<NodeId> {
        self.index
            .get(id)
            .map(|&idx| self.ids(&self.arena[idx].children))
            .unwrap_or_default()
    }

    /// All nodes below `id`, each exactly once, parents before their children.
    ///
    /// Iterative depth-first walk with an explicit visited set; the start node
    /// is never part of the result even if corrupted data loops back to it.
    #[instrument(level = "trace", skip(self))]
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(&start) = self.index.get(id) else {
            return Vec::new();
        };

        let mut visited = HashSet::from([start]);
        let mut stack: Vec<Index> = self.arena[start].children.iter().rev().copied().collect();
        let mut result = Vec::new();

        while let Some(idx) = stack.pop() {
            if !visited.insert(idx) {
                continue;
            }
            let node = &self.arena[idx];
            result.push(node.data.id.clone());
            // Push children in reverse order for left-to-right traversal
            stack.extend(node.children.iter().rev().copied());
        }

        result
    }

    /// Ancestors of `id`, nearest first.
    ///
    /// Fails with `CycleDetected` when an ancestor repeats. The walk stops at a
    /// root or at a parent id that is not part of the listing.
    #[instrument(level = "trace", skip(self))]
    pub fn parent_chain(&self, id: &NodeId) -> DomainResult<Vec<NodeId>> {
        let Some(&start) = self.index.get(id) else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::from([start]);
        let mut chain = Vec::new();
        let mut current = start;

        while let Some(parent) = self.arena[current].parent {
            let parent_id = &self.arena[parent].data.id;
            if !seen.insert(parent) {
                return Err(DomainError::CycleDetected(parent_id.clone()));
            }
            chain.push(parent_id.clone());
            current = parent;
        }

        Ok(chain)
    }

    /// True if making `proposed_parent` the parent of `id` would close a loop.
    pub fn would_create_cycle(&self, id: &NodeId, proposed_parent: &NodeId) -> bool {
        id == proposed_parent || self.descendants(id).contains(proposed_parent)
    }

    /// Pre-order walk over every tree, roots in store order.
    pub fn iter(&self) -> ForestIterator<'_> {
        ForestIterator::new(self)
    }

    /// Number of levels in the deepest tree.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(Index, usize)> = self.roots.iter().map(|&r| (r, 1)).collect();
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for &child in &self.arena[idx].children {
                stack.push((child, depth + 1));
            }
        }
        max_depth
    }

    /// Nodes no root can reach, i.e. members of stored loops.
    pub fn unreachable(&self) -> Vec<NodeId> {
        let reachable: HashSet<Index> = self.iter().map(|(idx, _)| idx).collect();
        self.order
            .iter()
            .filter(|idx| !reachable.contains(idx))
            .map(|&idx| self.arena[idx].data.id.clone())
            .collect()
    }

    fn ids(&self, indices: &[Index]) -> Vec<NodeId> {
        indices
            .iter()
            .map(|&idx| self.arena[idx].data.id.clone())
            .collect()
    }
}

pub struct ForestIterator<'a> {
    forest: &'a NodeForest,
    stack: Vec<Index>,
}

impl<'a> ForestIterator<'a> {
    fn new(forest: &'a NodeForest) -> Self {
        let stack = forest.roots.iter().rev().copied().collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for ForestIterator<'a> {
    type Item = (Index, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.forest.get_node(current_idx)?;
        for &child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some((current_idx, node))
    }
}
