//! End-to-end training over synthetic appliance signatures.
//!
//! Readings alternate ±3 W inside each level so that in-state gradient
//! noise stays below the spike detector's magnitude floor. The two samples
//! at either edge of a level sit exactly on it, so the steps around a level
//! change are flat and never merge into the change itself.

use std::time::Duration;

use psg_core::{
    detect_spikes, reject_spike, select_salient, Error, GraphConfig, PowerStateGraph,
    RunningStatistic, Signature, Spike, SpikeDetectionConfig, SpikeFilterConfig, VertexId,
};

fn appliance(levels: &[(f64, usize)]) -> Signature {
    let mut readings = Vec::new();
    for &(level, len) in levels {
        for i in 0..len {
            let noise = match i {
                _ if i < 2 || i + 2 >= len => 0.0,
                _ if i % 2 == 0 => -3.0,
                _ => 3.0,
            };
            readings.push(level + noise);
        }
    }
    Signature::new(readings, Duration::from_secs(1)).unwrap()
}

/// Heater, motor, heater, motor.
fn washer() -> Signature {
    appliance(&[(2000.0, 60), (200.0, 60), (2000.0, 60), (200.0, 60)]).with_id("washer-1")
}

fn assert_counts_consistent(graph: &PowerStateGraph) {
    let summed: u64 = graph.edges().map(|(_, _, e)| e.count()).sum();
    assert_eq!(summed, graph.total_count());

    let mut pairs: Vec<_> = graph.edges().map(|(s, t, _)| (s, t)).collect();
    let before = pairs.len();
    pairs.dedup();
    assert_eq!(pairs.len(), before, "duplicate edge for an ordered pair");
}

#[test]
fn detector_finds_level_changes_only() {
    let spikes = detect_spikes(&washer(), &SpikeDetectionConfig::default());
    assert_eq!(
        spikes,
        vec![
            Spike::new(59, -1800.0, 1),
            Spike::new(119, 1800.0, 1),
            Spike::new(179, -1800.0, 1),
        ]
    );
}

#[test]
fn first_signature_builds_states_and_transitions() {
    let mut graph = PowerStateGraph::new();
    let report = graph.train(&washer()).unwrap();

    assert_eq!(report.vertices.spikes_considered, 3);
    assert_eq!(report.vertices.spikes_rejected, 0);
    assert_eq!(report.vertices.vertices_inserted, 2);
    assert_eq!(report.vertices.vertices_updated, 1);
    assert_eq!(report.vertices.segments_skipped, 0);
    assert_eq!(graph.vertex_count(), 3);

    let (heater_id, heater_stat) = graph
        .vertices()
        .find(|(_, s)| s.mean() > 1000.0)
        .expect("heater state");
    assert!(!heater_id.is_off());
    assert!((heater_stat.mean() - 2000.0).abs() < 0.1);
    assert_eq!(heater_stat.num_data_points(), 59 + 49);

    let (motor_id, motor_stat) = graph
        .vertices()
        .find(|(_, s)| s.mean() > 100.0 && s.mean() < 300.0)
        .expect("motor state");
    assert_eq!(motor_stat.num_data_points(), 49);

    assert_eq!(report.edges.edges_inserted, 3);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.total_count(), 3);

    let into_motor = graph.edge(VertexId::OFF, motor_id).unwrap();
    assert_eq!(into_motor.delta().mean(), -1800.0);
    assert_eq!(into_motor.duration().mean(), 59.0);

    let motor_to_heater = graph.edge(motor_id, heater_id).unwrap();
    assert_eq!(motor_to_heater.delta().mean(), 1800.0);
    assert_eq!(motor_to_heater.duration().mean(), 60.0);

    let back_to_off = graph.edge(heater_id, VertexId::OFF).unwrap();
    assert_eq!(back_to_off.delta().mean(), -1800.0);
    assert_eq!(back_to_off.duration().mean(), 60.0);

    assert_counts_consistent(&graph);
}

#[test]
fn repeated_signature_updates_instead_of_duplicating() {
    let mut graph = PowerStateGraph::new();
    graph.train(&washer()).unwrap();
    let report = graph.train(&washer()).unwrap();

    assert_eq!(report.vertices.vertices_inserted, 0);
    assert_eq!(report.vertices.vertices_updated, 3);
    assert_eq!(report.edges.edges_inserted, 0);
    assert_eq!(report.edges.edges_updated, 3);

    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.edge_count(), 3);
    assert_eq!(graph.total_count(), 6);
    for (_, _, edge) in graph.edges() {
        assert_eq!(edge.count(), 2);
    }

    let energy = graph.energy_consumption().unwrap();
    assert_eq!(energy.num_data_points(), 2);
    assert_eq!(energy.stdev(), 0.0);
    assert_counts_consistent(&graph);
}

#[test]
fn new_level_adds_a_vertex() {
    let mut graph = PowerStateGraph::new();
    graph.train(&washer()).unwrap();

    let eco = appliance(&[(2000.0, 60), (200.0, 60), (1000.0, 60), (200.0, 60)]);
    let report = graph.train(&eco).unwrap();

    assert_eq!(report.vertices.vertices_inserted, 1);
    assert_eq!(graph.vertex_count(), 4);
    assert!(graph
        .vertices()
        .any(|(_, s)| (s.mean() - 1000.0).abs() < 1.0));
    assert_counts_consistent(&graph);
}

#[test]
fn off_vertex_survives_training() {
    let mut graph = PowerStateGraph::new();
    let pristine = graph.vertex(VertexId::OFF).unwrap().clone();

    graph.train(&washer()).unwrap();
    graph
        .train(&appliance(&[(500.0, 60), (2500.0, 60), (500.0, 60)]))
        .unwrap();

    let (first_id, first_stat) = graph.vertices().next().unwrap();
    assert_eq!(first_id, graph.off_vertex());
    assert_eq!(first_stat, &pristine);
}

#[test]
fn top_k_selection_keeps_largest_in_time_order() {
    let spikes: Vec<Spike> = (0..15)
        .map(|i| {
            // Magnitudes 100..1500 in scrambled temporal order.
            let magnitude = 100.0 * (((i * 7) % 15) + 1) as f64;
            let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
            Spike::new(10 + i * 10, sign * magnitude, 1)
        })
        .collect();

    let selected = select_salient(&spikes, 10);
    assert_eq!(selected.len(), 10);
    assert!(selected.windows(2).all(|w| w[0].index < w[1].index));
    assert!(selected.iter().all(|s| s.magnitude() >= 600.0));

    let sig = appliance(&[(400.0, 200)]);
    let mut graph = PowerStateGraph::new();
    let summary = graph.update_vertices(&sig, &spikes).unwrap();
    assert_eq!(summary.spikes_considered, 10);
}

#[test]
fn config_controls_salience_budget() {
    let config = GraphConfig {
        salient_spike_count: 2,
        ..GraphConfig::default()
    };
    let mut graph = PowerStateGraph::with_config(config).unwrap();
    let report = graph.train(&washer()).unwrap();
    assert_eq!(report.vertices.spikes_considered, 2);
}

#[test]
fn spike_filter_scenarios() {
    let cfg = SpikeFilterConfig::default();
    let stat = |xs: &[f64]| RunningStatistic::from_samples(xs).unwrap();

    let noisy = stat(&[60.0, 100.0, 140.0]);
    let quiet_high = stat(&[495.0, 500.0, 505.0]);
    assert!(reject_spike(&noisy, &quiet_high, &cfg));
    assert!(reject_spike(&quiet_high, &noisy, &cfg));

    let level = stat(&[90.0, 100.0, 110.0]);
    let nearby = stat(&[105.0, 115.0, 125.0]);
    assert!(reject_spike(&level, &nearby, &cfg));

    let quiet_low = stat(&[95.0, 100.0, 105.0]);
    assert!(!reject_spike(&quiet_low, &quiet_high, &cfg));
}

#[test]
fn flat_signature_has_nothing_to_learn() {
    let mut graph = PowerStateGraph::new();
    let err = graph.train(&appliance(&[(1500.0, 80)])).unwrap_err();
    assert!(matches!(err, Error::NoSpikes));
    assert!(err.is_precondition());
    assert_eq!(graph.vertex_count(), 1);
    assert_eq!(graph.total_count(), 0);
}

#[test]
fn training_continues_after_a_rejected_signature() {
    let mut graph = PowerStateGraph::new();
    let bad = appliance(&[(1500.0, 80)]);

    for sig in [washer(), bad, washer()] {
        if let Err(err) = graph.train(&sig) {
            assert!(err.is_precondition());
        }
    }
    assert_eq!(graph.total_count(), 6);
}

#[test]
fn snapshot_reflects_training() {
    let mut graph = PowerStateGraph::new().with_device_name("washer");
    graph.train(&washer()).unwrap();

    let snap = graph.snapshot();
    assert_eq!(snap.device_name.as_deref(), Some("washer"));
    assert_eq!(snap.vertices.len(), 3);
    assert_eq!(snap.vertices.iter().filter(|v| v.is_off).count(), 1);
    assert_eq!(snap.edges.len(), 3);
    assert_eq!(snap.total_count, 3);

    let json = graph.to_json().unwrap();
    assert!(json.contains("\"total_count\": 3"));
}
