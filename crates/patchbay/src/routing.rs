//! Audio reachability over evaluated connections.
//!
//! The graph is rebuilt from scratch for every query batch: one node per
//! placed instance, one directed edge per audio-carrying, non-invalid
//! connection, pointing from the side that can send to the side that can
//! receive. Two `in_out` ports yield an edge in each direction.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, EdgeRef};
use serde::{Deserialize, Serialize};

use crate::types::{Connection, ConnectionStatus, DeviceInstance, InstanceId};

/// Everything fed, directly or indirectly, by one source instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downstream {
    pub instances: Vec<InstanceId>,
    pub connections: Vec<String>,
}

pub struct AudioRoutes<'a> {
    graph: DiGraph<&'a DeviceInstance, String>,
    index_map: HashMap<&'a InstanceId, NodeIndex>,
}

impl<'a> AudioRoutes<'a> {
    pub fn build(instances: &'a [DeviceInstance], connections: &[Connection]) -> Self {
        let mut graph = DiGraph::new();
        let mut index_map = HashMap::new();

        for instance in instances {
            let idx = graph.add_node(instance);
            index_map.insert(&instance.id, idx);
        }

        for connection in connections {
            if connection.status == ConnectionStatus::Invalid {
                continue;
            }

            let (Some(&from_idx), Some(&to_idx)) = (
                index_map.get(&connection.from.instance_id),
                index_map.get(&connection.to.instance_id),
            ) else {
                continue;
            };

            let (from_instance, to_instance): (&DeviceInstance, &DeviceInstance) =
                (graph[from_idx], graph[to_idx]);
            let from_port = from_instance.device.port(&connection.from.port_id);
            let to_port = to_instance.device.port(&connection.to.port_id);
            let (Some(from_port), Some(to_port)) = (from_port, to_port) else {
                continue;
            };

            if !from_port.shared_signals(to_port).iter().any(|s| s.is_audio()) {
                continue;
            }

            if from_port.direction.can_send() && to_port.direction.can_receive() {
                graph.add_edge(from_idx, to_idx, connection.id.clone());
            }
            if to_port.direction.can_send() && from_port.direction.can_receive() {
                graph.add_edge(to_idx, from_idx, connection.id.clone());
            }
        }

        Self { graph, index_map }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_monitor(&self) -> bool {
        self.graph.node_weights().any(|i| i.device.is_monitor())
    }

    /// True if any monitor other than `source` itself is reachable.
    pub fn reaches_monitor(&self, source: &InstanceId) -> bool {
        let Some(&start) = self.index_map.get(source) else {
            return false;
        };

        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(idx) = bfs.next(&self.graph) {
            if idx != start && self.graph[idx].device.is_monitor() {
                return true;
            }
        }
        false
    }

    /// Whether the workspace should offer a test tone for this instance.
    pub fn test_tone_available(&self, instance: &InstanceId) -> bool {
        let Some(&idx) = self.index_map.get(instance) else {
            return false;
        };
        let device = &self.graph[idx].device;

        !device.is_monitor() && device.test_tone && self.has_monitor() && self.reaches_monitor(instance)
    }

    /// Instances and connections fed by `source`, in breadth-first order.
    pub fn downstream(&self, source: &InstanceId) -> Downstream {
        let Some(&start) = self.index_map.get(source) else {
            return Downstream::default();
        };

        let mut result = Downstream::default();
        let mut visited = HashSet::from([start]);
        let mut seen_connections = HashSet::new();
        // `Bfs` yields nodes only; edge ids are collected here as well.
        let mut queue = VecDeque::from([start]);

        while let Some(idx) = queue.pop_front() {
            for edge in self.graph.edges(idx) {
                if seen_connections.insert(edge.weight().as_str()) {
                    result.connections.push(edge.weight().clone());
                }
                let target = edge.target();
                if visited.insert(target) {
                    result.instances.push(self.graph[target].id.clone());
                    queue.push_back(target);
                }
            }
        }

        result
    }
}
