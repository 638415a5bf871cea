//! Dependency graph and topological ordering for components.
//!
//! Edges point from dependent to dependency: if `wifi_udp` depends on
//! `wifi`, the edge is `wifi_udp -> wifi`. Topological sort returns
//! components in dependency-first order (`wifi` before `wifi_udp`).
//!
//! # Example
//!
//! ```
//! use fw_component::dependency::DependencyGraph;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node("wifi");
//! graph.add_node("wifi_udp");
//! graph.add_edge("wifi_udp", "wifi");
//!
//! let order = graph.topological_sort().unwrap();
//! assert_eq!(order, vec!["wifi", "wifi_udp"]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::ComponentDescriptor;
use crate::error::{Error, Result};

/// Directed graph of dependencies between components.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<String>,
    /// Adjacency list: key depends on each value.
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create an empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph holding every descriptor and its declared edges.
    pub fn from_descriptors<'a, I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = &'a ComponentDescriptor>,
    {
        let mut graph = Self::new();
        for d in descriptors {
            graph.add_node(d.name());
            for dep in d.dependencies() {
                graph.add_edge(d.name(), dep);
            }
        }
        graph
    }

    /// Add a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, id: &str) {
        self.nodes.insert(id.to_string());
        self.edges.entry(id.to_string()).or_default();
    }

    /// Declare that `from` depends on `to`.
    ///
    /// `to` does not have to be a node yet; dangling edges are reported by
    /// [`missing_dependencies`](Self::missing_dependencies).
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    /// Return the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Whether `id` is a node.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    /// Get the direct dependencies of a node, sorted.
    pub fn dependencies_of(&self, id: &str) -> Vec<&str> {
        self.edges
            .get(id)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Every `(component, dependency)` edge whose target is not a node,
    /// sorted by component then dependency.
    pub fn missing_dependencies(&self) -> Vec<(&str, &str)> {
        self.edges
            .iter()
            .flat_map(|(from, deps)| {
                deps.iter()
                    .filter(|to| !self.nodes.contains(*to))
                    .map(move |to| (from.as_str(), to.as_str()))
            })
            .collect()
    }

    /// Perform a topological sort using Kahn's algorithm.
    ///
    /// Returns node ids in dependency-first order. Among nodes that are
    /// ready at the same time, the alphabetically smallest comes first.
    /// Dangling edges are ignored.
    ///
    /// # Errors
    ///
    /// Returns `Error::DependencyCycle` if the graph contains a cycle.
    pub fn topological_sort(&self) -> Result<Vec<String>> {
        // Number of unsatisfied dependencies per node
        let mut pending: BTreeMap<&str, usize> = self
            .nodes
            .iter()
            .map(|id| {
                let count = self
                    .edges
                    .get(id)
                    .map(|deps| deps.iter().filter(|d| self.nodes.contains(*d)).count())
                    .unwrap_or(0);
                (id.as_str(), count)
            })
            .collect();

        // Reverse edges: dependency -> dependents
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (from, deps) in &self.edges {
            for to in deps {
                if self.nodes.contains(to) && self.nodes.contains(from) {
                    dependents.entry(to.as_str()).or_default().push(from.as_str());
                }
            }
        }

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());

        while let Some(current) = ready.pop_first() {
            result.push(current.to_string());

            for &dependent in dependents.get(current).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if result.len() != self.nodes.len() {
            let sorted: BTreeSet<&str> = result.iter().map(String::as_str).collect();
            let participants = self
                .nodes
                .iter()
                .filter(|id| !sorted.contains(id.as_str()))
                .cloned()
                .collect();
            return Err(Error::DependencyCycle { participants });
        }

        Ok(result)
    }
}
