//! Intra-repository dependency graph backed by petgraph::DiGraph.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::config::{Confidence, DependencyEdge, ReferenceKind};

/// Directed file-to-file graph. Nodes are inventory paths; parallel edges
/// with the same `(from, to, kind)` collapse to one. Cycles are allowed.
pub struct DependencyGraph {
    graph: DiGraph<String, (ReferenceKind, Confidence)>,
    /// O(1) path → NodeIndex lookup.
    path_index: HashMap<String, NodeIndex>,
    seen_edges: HashSet<(NodeIndex, NodeIndex, ReferenceKind)>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            path_index: HashMap::new(),
            seen_edges: HashSet::new(),
        }
    }

    fn ensure_node(&mut self, path: &str) -> NodeIndex {
        if let Some(&idx) = self.path_index.get(path) {
            idx
        } else {
            let idx = self.graph.add_node(path.to_string());
            self.path_index.insert(path.to_string(), idx);
            idx
        }
    }

    /// Register an inventory file so it appears as a node even without edges.
    pub fn add_file(&mut self, path: &str) {
        self.ensure_node(path);
    }

    /// Add a resolved edge. Self-references and duplicates of an existing
    /// `(from, to, kind)` are dropped; returns whether an edge was added.
    pub fn add_edge(
        &mut self,
        from: &str,
        to: &str,
        kind: ReferenceKind,
        confidence: Confidence,
    ) -> bool {
        if from == to {
            return false;
        }
        let a = self.ensure_node(from);
        let b = self.ensure_node(to);
        if !self.seen_edges.insert((a, b, kind)) {
            return false;
        }
        self.graph.add_edge(a, b, (kind, confidence));
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges, sorted by `(from, to, kind)` for stable output.
    pub fn edges(&self) -> Vec<DependencyEdge> {
        let mut edges: Vec<DependencyEdge> = self
            .graph
            .edge_references()
            .map(|e| DependencyEdge {
                from: self.graph[e.source()].clone(),
                to: self.graph[e.target()].clone(),
                kind: e.weight().0,
                confidence: e.weight().1,
            })
            .collect();
        edges.sort_by(|a, b| {
            (&a.from, &a.to, a.kind).cmp(&(&b.from, &b.to, b.kind))
        });
        edges
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicate_edges_collapse() {
        let mut g = DependencyGraph::new();
        assert!(g.add_edge("a.py", "b.py", ReferenceKind::Import, Confidence::Exact));
        assert!(!g.add_edge("a.py", "b.py", ReferenceKind::Import, Confidence::Exact));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn same_pair_different_kind_kept() {
        let mut g = DependencyGraph::new();
        g.add_edge("a.py", "b.py", ReferenceKind::Import, Confidence::Exact);
        g.add_edge("a.py", "b.py", ReferenceKind::Extends, Confidence::Heuristic);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn self_reference_dropped() {
        let mut g = DependencyGraph::new();
        assert!(!g.add_edge("a.py", "a.py", ReferenceKind::Import, Confidence::Exact));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn cycles_are_allowed() {
        let mut g = DependencyGraph::new();
        g.add_edge("a.py", "b.py", ReferenceKind::Import, Confidence::Exact);
        g.add_edge("b.py", "a.py", ReferenceKind::Import, Confidence::Exact);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn edges_sorted_for_stable_output() {
        let mut g = DependencyGraph::new();
        g.add_edge("z.py", "a.py", ReferenceKind::Import, Confidence::Exact);
        g.add_edge("a.py", "z.py", ReferenceKind::Import, Confidence::Exact);
        g.add_edge("a.py", "b.py", ReferenceKind::Import, Confidence::Exact);
        let edges = g.edges();
        let froms: Vec<_> = edges.iter().map(|e| e.from.as_str()).collect();
        assert_eq!(froms, vec!["a.py", "a.py", "z.py"]);
        assert_eq!(edges[0].to, "b.py");
    }

    #[test]
    fn files_without_edges_are_nodes() {
        let mut g = DependencyGraph::new();
        g.add_file("lonely.py");
        assert_eq!(g.node_count(), 1);
        assert!(g.edges().is_empty());
    }
}
