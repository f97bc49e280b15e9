//! Serializable view of a trained graph for renderers and storage.

use serde::{Deserialize, Serialize};

use crate::graph::{PowerStateGraph, VertexId};
use crate::statistic::RunningStatistic;

/// One power state as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexSnapshot {
    pub id: VertexId,
    pub is_off: bool,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub stdev: f64,
    pub num_data_points: usize,
}

/// One transition as exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: VertexId,
    pub target: VertexId,
    pub delta: RunningStatistic,
    pub duration: RunningStatistic,
    pub count: u64,
}

/// Point-in-time copy of everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    pub vertices: Vec<VertexSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_consumption: Option<RunningStatistic>,
}

impl PowerStateGraph {
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            device_name: self.device_name().map(str::to_owned),
            vertices: self
                .vertices()
                .map(|(id, stat)| VertexSnapshot {
                    id,
                    is_off: id.is_off(),
                    min: stat.min(),
                    mean: stat.mean(),
                    max: stat.max(),
                    stdev: stat.stdev(),
                    num_data_points: stat.num_data_points(),
                })
                .collect(),
            edges: self
                .edges()
                .map(|(source, target, edge)| EdgeSnapshot {
                    source,
                    target,
                    delta: edge.delta().clone(),
                    duration: edge.duration().clone(),
                    count: edge.count(),
                })
                .collect(),
            total_count: self.total_count(),
            energy_consumption: self.energy_consumption().cloned(),
        }
    }

    /// Pretty-printed JSON of [`Self::snapshot`].
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.snapshot())
    }
}

impl std::fmt::Display for PowerStateGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = self.device_name() {
            writeln!(f, "{name}")?;
        }
        for (id, stat) in self.vertices() {
            let marker = if id.is_off() { " (off)" } else { "" };
            writeln!(f, "{id}{marker}: {stat}")?;
        }
        for (source, target, edge) in self.edges() {
            writeln!(
                f,
                "{source} -> {target}: count={} delta={:.1} duration={:.1}",
                edge.count(),
                edge.delta().mean(),
                edge.duration().mean()
            )?;
        }
        write!(f, "total_count={}", self.total_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Signature;
    use crate::spike::Spike;
    use std::time::Duration;

    fn trained() -> PowerStateGraph {
        let mut readings = vec![800.0; 40];
        readings.extend(std::iter::repeat(100.0).take(40));
        let sig = Signature::new(readings, Duration::from_secs(2))
            .unwrap()
            .with_device_name("toaster");
        let mut graph = PowerStateGraph::new();
        graph
            .incorporate(&sig, &[Spike::new(39, -700.0, 1)])
            .unwrap();
        graph
    }

    #[test]
    fn snapshot_mirrors_graph() {
        let graph = trained();
        let snap = graph.snapshot();

        assert_eq!(snap.device_name.as_deref(), Some("toaster"));
        assert_eq!(snap.vertices.len(), graph.vertex_count());
        assert!(snap.vertices[0].is_off);
        assert_eq!(snap.vertices[1].mean, 800.0);
        assert_eq!(snap.vertices[1].num_data_points, 39);
        assert_eq!(snap.edges.len(), 1);
        assert_eq!(snap.total_count, 1);

        let energy = snap.energy_consumption.unwrap();
        assert_eq!(energy.mean(), (800.0 * 40.0 + 100.0 * 40.0) * 2.0);
    }

    #[test]
    fn json_round_trips() {
        let graph = trained();
        let json = graph.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["vertices"][0]["id"], 0);
        assert_eq!(value["edges"][0]["count"], 1);

        let back: GraphSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph.snapshot());
    }

    #[test]
    fn display_marks_off_vertex() {
        let text = trained().to_string();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("toaster"));
        assert!(lines.next().unwrap().starts_with("v0 (off): "));
        assert!(text.contains("v0 -> v0: count=1"));
        assert!(text.ends_with("total_count=1"));
    }
}
