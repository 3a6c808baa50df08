//! Relationship graph and cycle detection
//!
//! The graph maps each entity to the entities it references, without
//! self-edges and without inheritance edges. Cycle detection enumerates
//! simple cycles by depth-first search with backtracking, which is
//! exponential in the worst case. Entity models have tens of entities, not
//! thousands, so the search is kept simple and made cancellable instead of
//! being optimised.

use anyhow::{Result, bail};
use log::{debug, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    cancellation::CancellationToken,
    model::{RelationType, RelationshipInfo},
    types::FxIndexMap,
};

/// A closed chain of relationships returning to its starting entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    pub relationships: Vec<RelationshipInfo>,
}

impl Cycle {
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// Entities along the cycle in traversal order
    pub fn entities(&self) -> Vec<&str> {
        self.relationships
            .iter()
            .map(|relationship| relationship.source_entity.as_str())
            .collect()
    }

    pub fn contains(&self, relationship: &RelationshipInfo) -> bool {
        self.relationships
            .iter()
            .any(|member| member.key() == relationship.key())
    }

    /// `Department -> Employee -> Department`
    pub fn describe(&self) -> String {
        let mut names: Vec<&str> = self
            .relationships
            .iter()
            .map(RelationshipInfo::source_simple_name)
            .collect();
        if let Some(first) = self.relationships.first() {
            names.push(first.source_simple_name());
        }
        names.join(" -> ")
    }
}

/// Whether a relationship contributes an edge to the graph
fn is_graph_edge(relationship: &RelationshipInfo) -> bool {
    relationship.relation_type != RelationType::Inheritance
        && relationship.has_target()
        && !relationship.is_self_reference()
}

/// Directed entity dependency graph
#[derive(Debug)]
pub struct RelationshipGraph {
    graph: DiGraph<String, ()>,
    node_indices: FxIndexMap<String, NodeIndex>,
}

impl RelationshipGraph {
    /// Build the graph from all relationships of the project
    pub fn build(relationships: &[RelationshipInfo]) -> Self {
        let mut graph = Self {
            graph: DiGraph::new(),
            node_indices: FxIndexMap::default(),
        };

        for relationship in relationships {
            let from = graph.ensure_node(&relationship.source_entity);
            if !is_graph_edge(relationship) {
                continue;
            }
            let to = graph.ensure_node(&relationship.target_entity);
            if !graph.graph.contains_edge(from, to) {
                graph.graph.add_edge(from, to, ());
            }
        }

        debug!(
            "Built relationship graph with {} entities and {} edges",
            graph.graph.node_count(),
            graph.graph.edge_count()
        );
        graph
    }

    fn ensure_node(&mut self, entity: &str) -> NodeIndex {
        if let Some(&index) = self.node_indices.get(entity) {
            return index;
        }
        let index = self.graph.add_node(entity.to_owned());
        self.node_indices.insert(entity.to_owned(), index);
        index
    }

    pub fn entity_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Entities `entity` depends on, in the order their edges were added
    pub fn dependencies(&self, entity: &str) -> Vec<&str> {
        let Some(&index) = self.node_indices.get(entity) else {
            return Vec::new();
        };
        self.neighbors(index)
            .into_iter()
            .map(|neighbor| self.graph[neighbor].as_str())
            .collect()
    }

    /// petgraph yields neighbors newest-first; reverse to declaration order
    fn neighbors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<_> = self
            .graph
            .neighbors_directed(index, Direction::Outgoing)
            .collect();
        neighbors.reverse();
        neighbors
    }
}

/// Mutable state of one cycle search
struct CycleSearchState {
    path: Vec<NodeIndex>,
    on_path: FxHashSet<NodeIndex>,
    /// Sorted relationship indices of every recorded cycle
    seen: FxHashSet<Vec<usize>>,
    cycles: Vec<Vec<usize>>,
}

/// Finds all simple cycles in the relationship graph
#[derive(Debug)]
pub struct CycleDetector<'a> {
    relationships: &'a [RelationshipInfo],
    graph: RelationshipGraph,
    /// First relationship index for each (source, target) node pair
    edge_origin: FxHashMap<(NodeIndex, NodeIndex), usize>,
    cancel: &'a CancellationToken,
}

impl<'a> CycleDetector<'a> {
    pub fn new(relationships: &'a [RelationshipInfo], cancel: &'a CancellationToken) -> Self {
        let graph = RelationshipGraph::build(relationships);
        let mut edge_origin = FxHashMap::default();
        for (index, relationship) in relationships.iter().enumerate() {
            if !is_graph_edge(relationship) {
                continue;
            }
            let from = graph.node_indices[relationship.source_entity.as_str()];
            let to = graph.node_indices[relationship.target_entity.as_str()];
            edge_origin.entry((from, to)).or_insert(index);
        }
        Self {
            relationships,
            graph,
            edge_origin,
            cancel,
        }
    }

    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    /// Enumerate every distinct cycle, self-references included as
    /// single-edge cycles
    pub fn detect(&self) -> Result<Vec<Cycle>> {
        let mut state = CycleSearchState {
            path: Vec::new(),
            on_path: FxHashSet::default(),
            seen: FxHashSet::default(),
            cycles: Vec::new(),
        };

        for (index, relationship) in self.relationships.iter().enumerate() {
            if relationship.relation_type != RelationType::Inheritance
                && relationship.has_target()
                && relationship.is_self_reference()
            {
                Self::record(&mut state, vec![index]);
            }
        }

        for &start in self.graph.node_indices.values() {
            self.dfs(start, &mut state)?;
        }

        debug!("Detected {} relationship cycles", state.cycles.len());
        Ok(state
            .cycles
            .into_iter()
            .map(|indices| Cycle {
                relationships: indices
                    .into_iter()
                    .map(|index| self.relationships[index].clone())
                    .collect(),
            })
            .collect())
    }

    fn dfs(&self, node: NodeIndex, state: &mut CycleSearchState) -> Result<()> {
        if self.cancel.is_cancelled() {
            bail!("Cycle detection cancelled");
        }

        state.path.push(node);
        state.on_path.insert(node);

        for neighbor in self.graph.neighbors(node) {
            if state.on_path.contains(&neighbor) {
                if let Some(start) = state.path.iter().position(|&n| n == neighbor) {
                    let cycle = self.translate(&state.path[start..]);
                    trace!("Cycle candidate through {} edges", cycle.len());
                    Self::record(state, cycle);
                }
            } else {
                self.dfs(neighbor, state)?;
            }
        }

        state.path.pop();
        state.on_path.remove(&node);
        Ok(())
    }

    /// Map consecutive node pairs (closing back to the first) to relationships
    fn translate(&self, nodes: &[NodeIndex]) -> Vec<usize> {
        let closing = nodes.first().copied();
        nodes
            .iter()
            .zip(nodes.iter().skip(1).copied().chain(closing))
            .filter_map(|(&from, to)| self.edge_origin.get(&(from, to)).copied())
            .collect()
    }

    fn record(state: &mut CycleSearchState, cycle: Vec<usize>) {
        if cycle.is_empty() {
            return;
        }
        let mut signature = cycle.clone();
        signature.sort_unstable();
        signature.dedup();
        if signature.len() == cycle.len() && state.seen.insert(signature) {
            state.cycles.push(cycle);
        }
    }
}

/// Detect all cycles among the given relationships
pub fn detect_circular_dependencies(
    relationships: &[RelationshipInfo],
    cancel: &CancellationToken,
) -> Result<Vec<Cycle>> {
    CycleDetector::new(relationships, cancel).detect()
}

/// Flag every relationship that appears in at least one cycle
pub fn mark_circular(relationships: Vec<RelationshipInfo>, cycles: &[Cycle]) -> Vec<RelationshipInfo> {
    relationships
        .into_iter()
        .map(|relationship| {
            if cycles.iter().any(|cycle| cycle.contains(&relationship)) {
                relationship.marked_circular()
            } else {
                relationship
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn many_to_one(source: &str, target: &str, field: &str) -> RelationshipInfo {
        RelationshipInfo::new(source, target, RelationType::ManyToOne, field, target, None)
    }

    fn detect(relationships: &[RelationshipInfo]) -> Vec<Cycle> {
        detect_circular_dependencies(relationships, &CancellationToken::new())
            .expect("detection is not cancelled")
    }

    #[test]
    fn test_three_entity_cycle_is_found_once() {
        let relationships = vec![
            many_to_one("A", "B", "b"),
            many_to_one("B", "C", "c"),
            many_to_one("C", "A", "a"),
        ];
        let cycles = detect(&relationships);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 3);
        for relationship in &relationships {
            assert!(cycles[0].contains(relationship));
        }
        assert_eq!(cycles[0].describe(), "A -> B -> C -> A");
    }

    #[test]
    fn test_mutual_one_to_one_is_a_two_edge_cycle() {
        let relationships = vec![
            RelationshipInfo::new("A", "B", RelationType::OneToOne, "b", "B", None),
            RelationshipInfo::new("B", "A", RelationType::OneToOne, "a", "A", Some("b".into())),
        ];
        let cycles = detect(&relationships);

        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 2);
    }

    #[test]
    fn test_acyclic_chain_has_no_cycles() {
        let relationships = vec![many_to_one("A", "B", "b"), many_to_one("B", "C", "c")];
        assert!(detect(&relationships).is_empty());
    }

    #[test]
    fn test_cycles_sharing_a_node_are_all_found() {
        let relationships = vec![
            many_to_one("A", "B", "b"),
            many_to_one("B", "A", "a"),
            many_to_one("B", "C", "c"),
            many_to_one("C", "B", "b"),
        ];
        let cycles = detect(&relationships);
        assert_eq!(cycles.len(), 2);
        assert!(cycles.iter().all(|cycle| cycle.len() == 2));
    }

    #[test]
    fn test_self_reference_is_a_single_edge_cycle() {
        let relationships = vec![many_to_one("Employee", "Employee", "manager")];
        let graph = RelationshipGraph::build(&relationships);
        assert_eq!(graph.edge_count(), 0);

        let cycles = detect(&relationships);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 1);
    }

    #[test]
    fn test_inheritance_and_unresolved_edges_are_excluded() {
        let relationships = vec![
            RelationshipInfo::new(
                "Manager",
                "Employee",
                RelationType::Inheritance,
                "superclass",
                "Employee",
                None,
            ),
            many_to_one("Employee", "Manager", "boss"),
            many_to_one("Employee", "", "broken"),
        ];
        let graph = RelationshipGraph::build(&relationships);

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.dependencies("Employee"), vec!["Manager"]);
        assert!(detect(&relationships).is_empty());
    }

    #[test]
    fn test_mark_circular_flags_only_cycle_members() {
        let relationships = vec![
            many_to_one("A", "B", "b"),
            many_to_one("B", "A", "a"),
            many_to_one("B", "C", "c"),
        ];
        let cycles = detect(&relationships);
        let marked = mark_circular(relationships, &cycles);

        assert!(marked[0].is_circular);
        assert!(marked[1].is_circular);
        assert!(!marked[2].is_circular);
    }

    #[test]
    fn test_cancelled_detection_fails() {
        let relationships = vec![many_to_one("A", "B", "b"), many_to_one("B", "A", "a")];
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(detect_circular_dependencies(&relationships, &cancel).is_err());
    }
}
