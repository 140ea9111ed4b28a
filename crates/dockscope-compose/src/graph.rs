//! Service dependency graph using `petgraph`.
//!
//! Builds a directed acyclic graph from `depends_on` and resolves the order
//! in which services have to be started.

use std::collections::HashMap;

use dockscope_common::error::ConfigError;
use indexmap::IndexMap;
use petgraph::graph::NodeIndex;

use crate::schema::Service;

/// A dependency graph of services.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: petgraph::Graph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph from a compose `services` map.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] when a service depends on a service
    /// that is not defined.
    pub fn from_services(services: &IndexMap<String, Service>) -> Result<Self, ConfigError> {
        let mut graph = Self::new();
        for name in services.keys() {
            let _ = graph.add_service(name);
        }
        for (name, service) in services {
            for dependency in service.depends_on_names() {
                if !services.contains_key(&dependency) {
                    return Err(ConfigError::Schema {
                        message: format!(
                            "service \"{name}\" depends on undefined service \"{dependency}\""
                        ),
                    });
                }
                graph.add_dependency(name, &dependency);
            }
        }
        Ok(graph)
    }

    /// Adds a service node, returning the existing node if already present.
    pub fn add_service(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        let _ = self.nodes.insert(name.to_string(), index);
        index
    }

    /// Adds a dependency edge: `dependent` depends on `dependency`.
    ///
    /// The graph edge points from `dependency` to `dependent`
    /// so that topological sort yields dependencies first.
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        let dependent = self.add_service(dependent);
        let dependency = self.add_service(dependency);
        let _ = self.graph.add_edge(dependency, dependent, ());
    }

    /// Returns the services in start order, dependencies first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Schema`] naming a service on the cycle if the
    /// graph is cyclic.
    pub fn start_order(&self) -> Result<Vec<String>, ConfigError> {
        petgraph::algo::toposort(&self.graph, None)
            .map(|indices| {
                indices
                    .iter()
                    .filter_map(|&idx| self.graph.node_weight(idx).cloned())
                    .collect()
            })
            .map_err(|cycle| {
                let service = self
                    .graph
                    .node_weight(cycle.node_id())
                    .map_or("?", String::as_str);
                ConfigError::Schema {
                    message: format!("cyclic depends_on involving service \"{service}\""),
                }
            })
    }
}

/// Start order of a compose `services` map.
///
/// # Errors
///
/// Returns an error for undefined dependencies or cycles.
pub fn service_start_order(
    services: &IndexMap<String, Service>,
) -> Result<Vec<String>, ConfigError> {
    DependencyGraph::from_services(services)?.start_order()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_compose;

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).expect(name)
    }

    #[test]
    fn empty_graph_resolves_to_empty() {
        let order = DependencyGraph::new().start_order().expect("should resolve");
        assert!(order.is_empty());
    }

    #[test]
    fn dependencies_come_first() {
        let config = parse_compose(
            "services:\n  web:\n    depends_on: [api]\n  api:\n    depends_on:\n      db:\n        condition: service_healthy\n  db: {}\n",
        )
        .expect("parse");
        let order = service_start_order(&config.services).expect("order");
        assert_eq!(order.len(), 3);
        assert!(position(&order, "db") < position(&order, "api"));
        assert!(position(&order, "api") < position(&order, "web"));
    }

    #[test]
    fn diamond_dependency() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        graph.add_dependency("a", "c");
        graph.add_dependency("b", "d");
        graph.add_dependency("c", "d");

        let order = graph.start_order().expect("should resolve");
        assert_eq!(order.len(), 4);
        assert!(position(&order, "d") < position(&order, "b"));
        assert!(position(&order, "d") < position(&order, "c"));
        assert!(position(&order, "b") < position(&order, "a"));
    }

    #[test]
    fn cycle_detection() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        graph.add_dependency("b", "a");

        let msg = graph.start_order().unwrap_err().to_string();
        assert!(msg.contains("cyclic"), "got: {msg}");
    }

    #[test]
    fn undefined_dependency_is_an_error() {
        let config = parse_compose("services:\n  web:\n    depends_on: [ghost]\n").expect("parse");
        let msg = service_start_order(&config.services).unwrap_err().to_string();
        assert!(msg.contains("ghost"), "got: {msg}");
    }

    #[test]
    fn add_service_is_idempotent() {
        let mut graph = DependencyGraph::new();
        let first = graph.add_service("x");
        let second = graph.add_service("x");
        assert_eq!(first, second);
        assert_eq!(graph.start_order().expect("order"), vec!["x"]);
    }
}
