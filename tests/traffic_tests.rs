//! Tests for the traffic generator, its observers and exports

mod common;

use std::fs;

use common::{MESH_4X4, corridor, mesh, network, network_with};
use gridroute::{
    Error, Position, RouteOutcome, Topology,
    config::{PlannerConfig, RouterConfig, RouterKind},
    pipeline::{
        DEFAULT_TIMEOUT_PENALTY, JsonlObserver, MetricsObserver, Observer, PacketRecord,
        TrafficConfig, TrafficEvent, TrafficGenerator, TrafficResult,
    },
    planning::DynamicProgrammingSolver,
    ports::Router,
    routing::{QRouter, SarsaRouter},
};

fn planner(text: &str, seed: u64) -> DynamicProgrammingSolver {
    planner_with(text, Topology::Bounded, seed)
}

fn planner_with(text: &str, topology: Topology, seed: u64) -> DynamicProgrammingSolver {
    let mut solver = DynamicProgrammingSolver::new(
        network_with(text, topology, seed),
        PlannerConfig::default().with_seed(seed),
    )
    .unwrap();
    solver.plan().unwrap();
    solver
}

/// Counts events and remembers every topology change
#[derive(Default)]
struct Recorder {
    started: Option<usize>,
    packets: Vec<PacketRecord>,
    changes: Vec<(usize, Vec<Position>)>,
    finished: bool,
}

impl Observer for Recorder {
    fn on_simulation_start(&mut self, total_packets: usize) -> gridroute::Result<()> {
        self.started = Some(total_packets);
        Ok(())
    }

    fn on_packet(&mut self, record: &PacketRecord) -> gridroute::Result<()> {
        self.packets.push(record.clone());
        Ok(())
    }

    fn on_topology_changed(
        &mut self,
        after_packet: usize,
        disabled: &[Position],
    ) -> gridroute::Result<()> {
        self.changes.push((after_packet, disabled.to_vec()));
        Ok(())
    }

    fn on_simulation_end(&mut self) -> gridroute::Result<()> {
        self.finished = true;
        Ok(())
    }
}

#[test]
fn test_planner_traffic_without_failures_is_optimal() {
    let mut router = planner(MESH_4X4, 1);
    let config = TrafficConfig::default()
        .with_packets(500)
        .without_perturbation()
        .with_seed(1);

    let result = TrafficGenerator::new(config).run(&mut router).unwrap();
    assert_eq!(result.packets, 500);
    assert_eq!(result.delivered, 500);
    assert_eq!(result.timed_out, 0);
    assert_eq!(result.perturbations, 0);
    assert!(result.ratios.iter().all(|&ratio| ratio == 1.0));
    assert_eq!(result.mean_ratio, 1.0);
    assert_eq!(result.router, "Value Iteration");
}

/// Wrap-around paths count towards the optimal distance on a torus
#[test]
fn test_planner_traffic_on_torus_is_optimal() {
    let maps = [
        (corridor(6), Position::new(0, 5)),
        (MESH_4X4.to_string(), Position::new(2, 3)),
    ];
    for (seed, (text, destination)) in maps.iter().enumerate() {
        let mut router = planner_with(text, Topology::Torus, seed as u64);
        let mut recorder = Recorder::default();
        let result = TrafficGenerator::new(
            TrafficConfig::default()
                .with_packets(200)
                .with_destination(*destination)
                .without_perturbation()
                .with_seed(seed as u64),
        )
        .with_observer(Box::new(&mut recorder))
        .run(&mut router)
        .unwrap();

        assert_eq!(result.delivered, 200);
        assert!(result.ratios.iter().all(|&ratio| ratio == 1.0), "{:?}", result.ratios);
        assert!(
            recorder
                .packets
                .iter()
                .all(|record| record.optimal_distance <= record.origin.manhattan(*destination))
        );
    }
}

#[test]
fn test_observer_event_sequence() {
    let mut router = planner(MESH_4X4, 2);
    let config = TrafficConfig::default()
        .with_packets(250)
        .with_perturbation(100, 3)
        .with_seed(2);

    let mut recorder = Recorder::default();
    let result = TrafficGenerator::new(config)
        .with_observer(Box::new(&mut recorder))
        .run(&mut router)
        .unwrap();

    assert_eq!(recorder.started, Some(250));
    assert!(recorder.finished);
    assert_eq!(recorder.packets.len(), 250);
    assert_eq!(result.perturbations, 2);

    let after: Vec<usize> = recorder.changes.iter().map(|(n, _)| *n).collect();
    assert_eq!(after, vec![100, 200]);

    for (i, record) in recorder.packets.iter().enumerate() {
        assert_eq!(record.packet, i + 1);
        assert_eq!(record.destination, Position::new(2, 3));
        assert_eq!(record.optimal_distance, record.origin.manhattan(record.destination));
        assert_eq!(record.ratio, result.ratios[i]);
    }
    for (_, disabled) in &recorder.changes {
        assert!(disabled.len() <= 3);
        assert!(!disabled.contains(&Position::new(2, 3)));
    }
}

#[test]
fn test_ratios_follow_outcomes() {
    let config = RouterConfig::for_kind(RouterKind::QRouting).with_seed(3);
    let mut router = QRouter::new(network(MESH_4X4, 3), &config).unwrap();

    let mut recorder = Recorder::default();
    TrafficGenerator::new(
        TrafficConfig::default()
            .with_packets(300)
            .with_max_hops(20)
            .with_seed(3),
    )
    .with_observer(Box::new(&mut recorder))
    .run(&mut router)
    .unwrap();

    for record in &recorder.packets {
        let expected = match record.outcome {
            _ if record.optimal_distance == 0 => 1.0,
            RouteOutcome::Delivered(hops) => hops as f64 / record.optimal_distance as f64,
            RouteOutcome::TimedOut => DEFAULT_TIMEOUT_PENALTY,
        };
        assert_eq!(record.ratio, expected);
        if let RouteOutcome::Delivered(hops) = record.outcome {
            assert!(hops <= 20);
        }
    }
}

#[test]
fn test_planner_stays_optimal_under_failures() {
    let mut router = planner(&mesh(5, 5, Position::new(2, 3)), 4);
    let config = TrafficConfig::default()
        .with_packets(2_000)
        .with_perturbation(200, 3)
        .with_seed(4);

    let result = TrafficGenerator::new(config).run(&mut router).unwrap();
    assert_eq!(result.perturbations, 10);
    // Detours only lengthen paths; delivered packets never beat Manhattan
    for &ratio in &result.ratios {
        assert!(ratio >= 1.0);
    }
    assert_eq!(result.delivered + result.timed_out, 2_000);
}

#[test]
fn test_sarsa_learns_under_traffic() {
    let config = RouterConfig::for_kind(RouterKind::Sarsa)
        .with_epsilon(0.0)
        .with_seed(5);
    let mut router = SarsaRouter::new(network(MESH_4X4, 5), &config).unwrap();

    let mut metrics = MetricsObserver::new();
    let result = TrafficGenerator::new(
        TrafficConfig::default()
            .with_packets(3_000)
            .without_perturbation()
            .with_seed(5),
    )
    .with_observer(Box::new(&mut metrics))
    .run(&mut router)
    .unwrap();

    let summary = metrics.summary();
    assert_eq!(summary.total_packets, 3_000);
    assert_eq!(summary.delivered, result.delivered);
    assert_eq!(summary.timed_out, result.timed_out);

    // The tail of the run is much closer to optimal than the start
    let head: f64 = result.ratios[..300].iter().sum::<f64>() / 300.0;
    let tail: f64 = result.ratios[2_700..].iter().sum::<f64>() / 300.0;
    assert!(tail < head, "head {head}, tail {tail}");
    assert!(tail < 1.5, "tail {tail}");
}

#[test]
fn test_rejects_destination_that_is_not_a_destination_node() {
    let mut router = planner(MESH_4X4, 6);
    let config = TrafficConfig::default()
        .with_packets(10)
        .with_destination(Position::new(0, 0));
    let err = TrafficGenerator::new(config).run(&mut router).unwrap_err();
    assert!(matches!(err, Error::NotADestination { .. }));

    let outside = TrafficConfig::default()
        .with_packets(10)
        .with_destination(Position::new(7, 7));
    assert!(matches!(
        TrafficGenerator::new(outside).run(&mut router),
        Err(Error::OutOfRange { .. })
    ));
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let config = RouterConfig::for_kind(RouterKind::QRouting).with_seed(7);
        let mut router = QRouter::new(network(MESH_4X4, 7), &config).unwrap();
        TrafficGenerator::new(
            TrafficConfig::default()
                .with_packets(1_500)
                .with_perturbation(500, 3)
                .with_seed(7),
        )
        .run(&mut router)
        .unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_jsonl_observations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("observations.jsonl");
    let mut router = planner(MESH_4X4, 8);

    {
        let observer = JsonlObserver::new(&path).unwrap();
        TrafficGenerator::new(
            TrafficConfig::default()
                .with_packets(30)
                .with_perturbation(10, 3)
                .with_seed(8),
        )
        .with_observer(Box::new(observer))
        .run(&mut router)
        .unwrap();
    }

    let events: Vec<TrafficEvent> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 33);

    let packets = events
        .iter()
        .filter(|event| matches!(event, TrafficEvent::Packet(_)))
        .count();
    assert_eq!(packets, 30);
    assert!(matches!(
        events[10],
        TrafficEvent::TopologyChanged {
            after_packet: 10,
            ..
        }
    ));
}

#[test]
fn test_result_exports() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = planner(MESH_4X4, 9);
    let result = TrafficGenerator::new(
        TrafficConfig::default()
            .with_packets(40)
            .without_perturbation()
            .with_seed(9),
    )
    .run(&mut router)
    .unwrap();

    let json = dir.path().join("summary.json");
    result.save(&json).unwrap();
    assert_eq!(TrafficResult::load(&json).unwrap(), result);

    let csv = dir.path().join("ratios.csv");
    result.export_ratios(&csv).unwrap();
    let text = fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "packet,ratio");
    assert_eq!(lines.len(), 41);
    assert!(lines[1].starts_with("1,"));
}

#[test]
fn test_router_keeps_failures_after_run() {
    let mut router = planner(MESH_4X4, 10);
    let mut recorder = Recorder::default();
    TrafficGenerator::new(
        TrafficConfig::default()
            .with_packets(100)
            .with_perturbation(100, 3)
            .with_seed(10),
    )
    .with_observer(Box::new(&mut recorder))
    .run(&mut router)
    .unwrap();

    let (_, disabled) = &recorder.changes[0];
    for pos in disabled {
        assert!(router.network().node_type(*pos).unwrap().is_inactive());
    }
}
