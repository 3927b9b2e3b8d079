use crate::hierarchy::Hierarchy;
use petgraph::algo::toposort;
use petgraph::graphmap::{DiGraphMap, NodeTrait};
use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};

/// Frozen directed graph stored as `parent -> sorted children`.
///
/// Every node is a key, including pure leaves. Reverse links and the
/// acyclicity check are computed on first use and cached.
#[derive(Debug, Clone)]
pub struct Graph<N: NodeTrait> {
    adj: BTreeMap<N, Vec<N>>,
    rev: OnceCell<BTreeMap<N, Vec<N>>>,
    is_dag: OnceCell<bool>,
}

impl<N: NodeTrait> Graph<N> {
    /// Normalizes the adjacency: children sorted and deduplicated, and
    /// nodes that only appear as children added as keys.
    pub fn new(mut adj: BTreeMap<N, Vec<N>>) -> Self {
        let mut leaves = Vec::new();
        for children in adj.values_mut() {
            children.sort();
            children.dedup();
            leaves.extend(children.iter().copied());
        }
        for leaf in leaves {
            adj.entry(leaf).or_default();
        }
        Self { adj, rev: OnceCell::new(), is_dag: OnceCell::new() }
    }

    /// Builds a graph from `(parent, child)` pairs; `None` registers a
    /// parent without adding an edge.
    pub fn from_links(links: impl IntoIterator<Item = (N, Option<N>)>) -> Self {
        let mut adj: BTreeMap<N, Vec<N>> = BTreeMap::new();
        for (parent, child) in links {
            let children = adj.entry(parent).or_default();
            if let Some(child) = child {
                children.push(child);
            }
        }
        Self::new(adj)
    }

    pub fn len(&self) -> usize {
        self.adj.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adj.is_empty()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.adj.contains_key(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = N> + '_ {
        self.adj.keys().copied()
    }

    pub fn adjacency(&self) -> &BTreeMap<N, Vec<N>> {
        &self.adj
    }

    pub fn children(&self, node: &N) -> &[N] {
        self.adj.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parents(&self, node: &N) -> &[N] {
        self.rev().get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `child -> sorted parents`, covering every node.
    pub fn rev(&self) -> &BTreeMap<N, Vec<N>> {
        self.rev.get_or_init(|| {
            let mut rev: BTreeMap<N, Vec<N>> = self.adj.keys().map(|&n| (n, Vec::new())).collect();
            for (&parent, children) in &self.adj {
                for child in children {
                    rev.entry(*child).or_default().push(parent);
                }
            }
            rev
        })
    }

    /// Drops cached derived data and recomputes the reverse links.
    pub fn update_rev(&mut self) {
        self.rev = OnceCell::new();
        self.is_dag = OnceCell::new();
        self.rev();
    }

    /// All edges in parent order.
    pub fn links(&self) -> impl Iterator<Item = (N, N)> + '_ {
        self.adj
            .iter()
            .flat_map(|(&parent, children)| children.iter().map(move |&child| (parent, child)))
    }

    /// Nodes with neither parents nor children.
    pub fn isolates(&self) -> Vec<N> {
        self.adj
            .iter()
            .filter(|(node, children)| children.is_empty() && self.parents(node).is_empty())
            .map(|(&node, _)| node)
            .collect()
    }

    /// Nodes without parents, isolates included.
    pub fn sources(&self) -> Vec<N> {
        let mut sources = self.isolates();
        sources.extend(
            self.adj
                .iter()
                .filter(|(node, children)| !children.is_empty() && self.parents(node).is_empty())
                .map(|(&node, _)| node),
        );
        sources.sort();
        sources
    }

    pub fn as_graphmap(&self) -> DiGraphMap<N, ()> {
        let mut graph = DiGraphMap::new();
        for (parent, child) in self.links() {
            graph.add_edge(parent, child, ());
        }
        for node in self.nodes() {
            graph.add_node(node);
        }
        graph
    }

    pub fn is_dag(&self) -> bool {
        *self.is_dag.get_or_init(|| toposort(&self.as_graphmap(), None).is_ok())
    }

    /// Parents before children, or `None` when the graph has a cycle.
    pub fn toposort(&self) -> Option<Vec<N>> {
        toposort(&self.as_graphmap(), None).ok()
    }

    /// Depth-first walk from every source; see [`Hierarchy`].
    pub fn iter_hierarchy(&self) -> Hierarchy<'_, N> {
        Hierarchy::new(self)
    }

    /// Switches to the mutable edge-set form.
    pub fn thaw(self) -> GraphMut<N> {
        GraphMut {
            adj: self
                .adj
                .into_iter()
                .map(|(node, children)| (node, children.into_iter().collect()))
                .collect(),
        }
    }
}

impl<N: NodeTrait> Default for Graph<N> {
    fn default() -> Self {
        Self::new(BTreeMap::new())
    }
}

impl<N: NodeTrait> PartialEq for Graph<N> {
    fn eq(&self, other: &Self) -> bool {
        self.adj == other.adj
    }
}

impl<N: NodeTrait> Eq for Graph<N> {}

/// Mutable form used while edges are being rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphMut<N: NodeTrait> {
    adj: BTreeMap<N, BTreeSet<N>>,
}

impl<N: NodeTrait> GraphMut<N> {
    pub fn nodes(&self) -> Vec<N> {
        self.adj.keys().copied().collect()
    }

    pub fn children(&self, node: &N) -> Vec<N> {
        self.adj.get(node).map(|c| c.iter().copied().collect()).unwrap_or_default()
    }

    pub fn has_link(&self, parent: &N, child: &N) -> bool {
        self.adj.get(parent).map_or(false, |c| c.contains(child))
    }

    /// Returns `false` when the edge already existed.
    pub fn add_link(&mut self, parent: N, child: N) -> bool {
        self.adj.entry(child).or_default();
        self.adj.entry(parent).or_default().insert(child)
    }

    /// Whether `to` can be reached from `from` along existing edges.
    pub fn reaches(&self, from: N, to: N) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == to {
                return true;
            }
            if seen.insert(node) {
                stack.extend(self.adj.get(&node).into_iter().flatten().copied());
            }
        }
        false
    }

    /// Adds the edge unless it would close a cycle. Returns `false` when the
    /// edge was refused or already existed.
    pub fn add_link_acyclic(&mut self, parent: N, child: N) -> bool {
        if self.reaches(child, parent) {
            return false;
        }
        self.add_link(parent, child)
    }

    pub fn remove_link(&mut self, parent: &N, child: &N) -> bool {
        self.adj.get_mut(parent).map_or(false, |c| c.remove(child))
    }

    /// Keeps only the edges for which `keep(parent, child)` holds.
    pub fn retain_links(&mut self, mut keep: impl FnMut(N, N) -> bool) -> usize {
        let mut removed = 0;
        for (&parent, children) in self.adj.iter_mut() {
            let before = children.len();
            children.retain(|&child| keep(parent, child));
            removed += before - children.len();
        }
        removed
    }

    pub fn freeze(self) -> Graph<N> {
        let adj = self
            .adj
            .into_iter()
            .map(|(node, children)| (node, children.into_iter().collect()))
            .collect();
        let mut graph = Graph::new(adj);
        graph.update_rev();
        graph
    }
}
