//! The power state graph.
//!
//! Vertices are learned power levels, each summarized by a
//! [`RunningStatistic`]; edges are observed transitions between them.
//! Vertices live in an arena addressed by [`VertexId`], and edges are keyed
//! by the ordered `(source, target)` pair, so there is never more than one
//! edge per direction between two states.
//!
//! Vertex 0 is the synthetic off state. Every transition walk starts and
//! ends there, and it is never updated or merged.
//!
//! Incorporating a signature runs two independent passes over the same
//! salient spikes: [`PowerStateGraph::update_vertices`] then
//! [`PowerStateGraph::update_edges`].

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use psg_config::{validate_config, GraphConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::error::{Error, Result};
use crate::filter::{classify_spike, SpikeVerdict};
use crate::logging::event_names;
use crate::signature::Signature;
use crate::spike::{detect_spikes, select_salient, Spike};
use crate::statistic::RunningStatistic;

/// Handle to a vertex in a [`PowerStateGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(usize);

impl VertexId {
    /// The off state, present from construction.
    pub const OFF: VertexId = VertexId(0);

    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Statistics of one observed transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerStateEdge {
    delta: RunningStatistic,
    duration: RunningStatistic,
    count: u64,
}

impl PowerStateEdge {
    fn first_observation(delta: f64, duration: usize) -> Self {
        Self {
            delta: RunningStatistic::from_value(delta),
            duration: RunningStatistic::from_value(duration as f64),
            count: 1,
        }
    }

    fn observe(&mut self, delta: f64, duration: usize) {
        self.delta.update_value(delta);
        self.duration.update_value(duration as f64);
        self.count += 1;
    }

    /// Power jumps seen on this transition.
    pub fn delta(&self) -> &RunningStatistic {
        &self.delta
    }

    /// Samples spent in the source state before this transition.
    pub fn duration(&self) -> &RunningStatistic {
        &self.duration
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Best-scoring vertex for a query statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexMatch {
    pub vertex: VertexId,
    pub score: f64,
}

/// Counters from one vertex pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VertexPassSummary {
    /// Spikes left after salience selection.
    pub spikes_considered: usize,
    /// Spikes the noise filter would reject. Diagnostic only.
    pub spikes_rejected: usize,
    pub segments_skipped: usize,
    pub vertices_inserted: usize,
    pub vertices_updated: usize,
    /// Segments that matched the off state and were dropped.
    pub off_matches: usize,
}

/// Counters from one edge pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdgePassSummary {
    pub segments_skipped: usize,
    /// Segments that matched no vertex; the walk does not advance.
    pub segments_unmatched: usize,
    pub edges_inserted: usize,
    pub edges_updated: usize,
}

/// Outcome of incorporating one signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IncorporationReport {
    pub vertices: VertexPassSummary,
    pub edges: EdgePassSummary,
}

/// Learned state/transition model for one appliance.
#[derive(Debug, Clone)]
pub struct PowerStateGraph {
    config: GraphConfig,
    device_name: Option<String>,
    vertices: Vec<RunningStatistic>,
    edges: BTreeMap<(VertexId, VertexId), PowerStateEdge>,
    total_count: u64,
    energy_consumption: Option<RunningStatistic>,
}

impl Default for PowerStateGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerStateGraph {
    /// A graph holding only the off state, with default tuning.
    pub fn new() -> Self {
        Self::from_valid_config(GraphConfig::default())
    }

    /// A graph with custom tuning. The config is validated first.
    pub fn with_config(config: GraphConfig) -> Result<Self> {
        validate_config(&config)?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: GraphConfig) -> Self {
        Self {
            config,
            device_name: None,
            vertices: vec![RunningStatistic::from_value(0.0)],
            edges: BTreeMap::new(),
            total_count: 0,
            energy_consumption: None,
        }
    }

    pub fn with_device_name(mut self, name: impl Into<String>) -> Self {
        self.device_name = Some(name.into());
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn off_vertex(&self) -> VertexId {
        VertexId::OFF
    }

    pub fn vertex(&self, id: VertexId) -> Option<&RunningStatistic> {
        self.vertices.get(id.0)
    }

    /// All vertices in insertion order, off state first.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &RunningStatistic)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, stat)| (VertexId(i), stat))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// All edges ordered by `(source, target)`.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId, &PowerStateEdge)> + '_ {
        self.edges.iter().map(|(&(s, t), e)| (s, t, e))
    }

    pub fn edge(&self, source: VertexId, target: VertexId) -> Option<&PowerStateEdge> {
        self.edges.get(&(source, target))
    }

    /// Edges leaving `source`, ordered by target.
    pub fn out_edges(
        &self,
        source: VertexId,
    ) -> impl Iterator<Item = (VertexId, &PowerStateEdge)> + '_ {
        self.edges
            .range((source, VertexId(0))..=(source, VertexId(usize::MAX)))
            .map(|(&(_, t), e)| (t, e))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Sum of all edge traversal counts.
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Energy per incorporated signature; `None` before the first one.
    pub fn energy_consumption(&self) -> Option<&RunningStatistic> {
        self.energy_consumption.as_ref()
    }

    /// Highest-scoring vertex for `stat`, if its score exceeds `alpha / 2`.
    ///
    /// Linear scan in insertion order; the first vertex wins ties.
    pub fn most_similar_vertex(&self, stat: &RunningStatistic, alpha: f64) -> Option<VertexMatch> {
        let mut best: Option<VertexMatch> = None;
        for (vertex, candidate) in self.vertices() {
            let score = stat.score(candidate);
            if best.map_or(true, |b| score > b.score) {
                best = Some(VertexMatch { vertex, score });
            }
        }
        best.filter(|b| b.score > alpha / 2.0)
    }

    /// Fold a signature's power levels into the vertex set.
    ///
    /// Segments are the stretch before the first salient spike and a fixed
    /// window after each later spike's predecessor. Each segment either
    /// updates its best-matching vertex or becomes a new one.
    pub fn update_vertices(
        &mut self,
        signature: &Signature,
        spikes: &[Spike],
    ) -> Result<VertexPassSummary> {
        let readings = signature.readings();
        let ordered = self.ordered_spikes(readings.len(), spikes)?;
        let mut summary = VertexPassSummary {
            spikes_considered: ordered.len(),
            ..Default::default()
        };

        // Diagnostic only: the verdict is logged and counted, never used to drop a spike.
        for spike in &ordered {
            if let Some(verdict) = self.spike_verdict(readings, spike)? {
                if verdict.is_rejected() {
                    summary.spikes_rejected += 1;
                }
            }
        }

        let mut segments = Vec::with_capacity(ordered.len());
        if let Some(first) = ordered.first() {
            segments.push((0, first.index));
        }
        for pair in ordered.windows(2) {
            segments.push(self.segment_bounds(pair[0].index, readings.len()));
        }

        for (begin, end) in segments {
            let Some(stat) = self.segment_statistic(readings, begin, end)? else {
                trace!(
                    event = event_names::SEGMENT_SKIPPED,
                    begin,
                    end,
                    "segment too short"
                );
                summary.segments_skipped += 1;
                continue;
            };

            match self.most_similar_vertex(&stat, self.config.vertex_alpha) {
                Some(found) if found.vertex.is_off() => {
                    debug!(begin, end, mean = stat.mean(), "segment matches off state");
                    summary.off_matches += 1;
                }
                Some(found) => {
                    if let Some(vertex) = self.vertices.get_mut(found.vertex.0) {
                        vertex.update(readings, begin, end)?;
                        debug!(
                            event = event_names::VERTEX_UPDATED,
                            vertex = %found.vertex,
                            score = found.score,
                            mean = vertex.mean(),
                            n = vertex.num_data_points(),
                            "power state updated"
                        );
                        summary.vertices_updated += 1;
                    }
                }
                None => {
                    let id = VertexId(self.vertices.len());
                    debug!(
                        event = event_names::VERTEX_INSERTED,
                        vertex = %id,
                        mean = stat.mean(),
                        stdev = stat.stdev(),
                        "new power state"
                    );
                    self.vertices.push(stat);
                    summary.vertices_inserted += 1;
                }
            }
        }

        info!(
            event = event_names::VERTEX_PASS_DONE,
            signature = signature.id().unwrap_or("-"),
            spikes = summary.spikes_considered,
            rejected = summary.spikes_rejected,
            inserted = summary.vertices_inserted,
            updated = summary.vertices_updated,
            skipped = summary.segments_skipped,
            "vertex pass complete"
        );
        Ok(summary)
    }

    /// Fold a signature's transitions into the edge set.
    ///
    /// Walks the salient spikes from the off state, advancing whenever the
    /// window after a spike matches a vertex other than the current one,
    /// and always closes with an edge back to the off state.
    pub fn update_edges(&mut self, signature: &Signature, spikes: &[Spike]) -> Result<EdgePassSummary> {
        let readings = signature.readings();
        let ordered = self.ordered_spikes(readings.len(), spikes)?;
        let mut summary = EdgePassSummary::default();

        let mut current = VertexId::OFF;
        let mut current_since = 0usize;

        for pair in ordered.windows(2) {
            let spike = pair[0];
            let (begin, end) = self.segment_bounds(spike.index, readings.len());
            let Some(stat) = self.segment_statistic(readings, begin, end)? else {
                trace!(
                    event = event_names::SEGMENT_SKIPPED,
                    begin,
                    end,
                    "segment too short"
                );
                summary.segments_skipped += 1;
                continue;
            };

            match self.most_similar_vertex(&stat, self.config.edge_alpha) {
                Some(found) if found.vertex != current => {
                    let duration = spike.index.saturating_sub(current_since);
                    self.upsert_edge(current, found.vertex, spike.delta, duration, &mut summary);
                    current = found.vertex;
                    current_since = spike.index;
                }
                Some(_) => {}
                None => summary.segments_unmatched += 1,
            }
        }

        if let Some(last) = ordered.last() {
            let duration = last.index.saturating_sub(current_since);
            self.upsert_edge(current, VertexId::OFF, last.delta, duration, &mut summary);
        }

        info!(
            event = event_names::EDGE_PASS_DONE,
            signature = signature.id().unwrap_or("-"),
            inserted = summary.edges_inserted,
            updated = summary.edges_updated,
            unmatched = summary.segments_unmatched,
            skipped = summary.segments_skipped,
            total_count = self.total_count,
            "edge pass complete"
        );
        Ok(summary)
    }

    /// Run the vertex pass then the edge pass, and record the signature's energy.
    pub fn incorporate(
        &mut self,
        signature: &Signature,
        spikes: &[Spike],
    ) -> Result<IncorporationReport> {
        let vertices = self.update_vertices(signature, spikes)?;
        let edges = self.update_edges(signature, spikes)?;

        let energy = signature.energy_consumption();
        match self.energy_consumption.as_mut() {
            Some(stat) => stat.update_value(energy),
            None => self.energy_consumption = Some(RunningStatistic::from_value(energy)),
        }
        if self.device_name.is_none() {
            self.device_name = signature.device_name().map(str::to_owned);
        }

        Ok(IncorporationReport { vertices, edges })
    }

    /// Detect spikes with the configured detector, then [`Self::incorporate`].
    pub fn train(&mut self, signature: &Signature) -> Result<IncorporationReport> {
        let spikes = detect_spikes(signature, &self.config.detection);
        self.incorporate(signature, &spikes)
    }

    /// Salient spikes in temporal order, rejecting empty or out-of-range input.
    fn ordered_spikes(&self, len: usize, spikes: &[Spike]) -> Result<Vec<Spike>> {
        if spikes.is_empty() {
            return Err(Error::NoSpikes);
        }
        let ordered = select_salient(spikes, self.config.salient_spike_count);
        if let Some(beyond) = ordered.iter().find(|s| s.index >= len) {
            return Err(Error::RangeOutOfBounds {
                end: beyond.index + 1,
                len,
            });
        }
        Ok(ordered)
    }

    /// `[index + 1, index + segment_window)`, clamped to the signature.
    fn segment_bounds(&self, index: usize, len: usize) -> (usize, usize) {
        let begin = index + 1;
        let end = index.saturating_add(self.config.segment_window).min(len);
        (begin, end)
    }

    /// `None` when the range holds fewer than `min_segment_len` samples.
    fn segment_statistic(
        &self,
        readings: &[f64],
        begin: usize,
        end: usize,
    ) -> Result<Option<RunningStatistic>> {
        if end <= begin || end - begin < self.config.min_segment_len {
            return Ok(None);
        }
        RunningStatistic::from_range(readings, begin, end).map(Some)
    }

    /// Noise-filter verdict from the flanks around `spike`, or `None` when a
    /// flank is empty after clamping.
    fn spike_verdict(&self, readings: &[f64], spike: &Spike) -> Result<Option<SpikeVerdict>> {
        let window = self.config.flank_window;
        let before_begin = spike.index.saturating_sub(window);
        let after_begin = spike.index.saturating_add(spike.duration).saturating_add(1);
        let after_end = after_begin.saturating_add(window).min(readings.len());

        if spike.index <= before_begin || after_end <= after_begin {
            return Ok(None);
        }

        let before = RunningStatistic::from_range(readings, before_begin, spike.index)?;
        let after = RunningStatistic::from_range(readings, after_begin, after_end)?;
        let verdict = classify_spike(&before, &after, &self.config.spike_filter);

        debug!(
            event = event_names::SPIKE_VERDICT,
            index = spike.index,
            delta = spike.delta,
            duration = spike.duration,
            verdict = %verdict,
            before_mean = before.mean(),
            before_stdev = before.stdev(),
            after_mean = after.mean(),
            after_stdev = after.stdev(),
            "spike classified"
        );
        Ok(Some(verdict))
    }

    fn upsert_edge(
        &mut self,
        source: VertexId,
        target: VertexId,
        delta: f64,
        duration: usize,
        summary: &mut EdgePassSummary,
    ) {
        match self.edges.entry((source, target)) {
            Entry::Occupied(mut slot) => {
                let edge = slot.get_mut();
                edge.observe(delta, duration);
                debug!(
                    event = event_names::EDGE_UPDATED,
                    source = %source,
                    target = %target,
                    delta,
                    duration,
                    count = edge.count,
                    "transition updated"
                );
                summary.edges_updated += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(PowerStateEdge::first_observation(delta, duration));
                debug!(
                    event = event_names::EDGE_INSERTED,
                    source = %source,
                    target = %target,
                    delta,
                    duration,
                    "new transition"
                );
                summary.edges_inserted += 1;
            }
        }
        self.total_count += 1;
    }
}
