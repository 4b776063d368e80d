//! Simulate command - Route random traffic through a learning or planned router

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    cli::{
        config::ExperimentConfig,
        output::{print_kv, print_section, print_subsection, print_traffic_summary},
    },
    config::{RouterConfig, RouterKind},
    network::{GridNetwork, Topology},
    pipeline::{JsonlObserver, MetricsObserver, ProgressObserver, TrafficGenerator},
    planning::DynamicProgrammingSolver,
    ports::Router,
    render::PolicyRenderer,
    routing::build_router,
    selection::{NETWORK_SEED_STREAM, SOLVER_SEED_STREAM, build_rng, derive_seed},
    types::Position,
};

#[derive(Parser, Debug)]
#[command(about = "Send random packets through a router and measure hop ratios")]
pub struct SimulateArgs {
    /// Path to a whitespace-separated map file (-1 destination, 0 active, 1 inactive)
    pub map: PathBuf,

    /// Router to use (q-routing, sarsa, planner)
    #[arg(long, short = 'r', default_value = "q-routing")]
    pub router: String,

    /// Number of packets to send
    #[arg(long, short = 'n')]
    pub packets: Option<usize>,

    /// Hop budget per packet
    #[arg(long)]
    pub max_hops: Option<usize>,

    /// Destination used for the optimal-distance baseline, as ROW,COL
    #[arg(long, value_parser = parse_position)]
    pub destination: Option<Position>,

    /// Exploration rate ε
    #[arg(long)]
    pub epsilon: Option<f64>,

    /// Learning rate α
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Discount factor γ
    #[arg(long)]
    pub discount: Option<f64>,

    /// Grid topology (bounded, torus)
    #[arg(long)]
    pub topology: Option<Topology>,

    /// Do not disable random nodes during the run
    #[arg(long)]
    pub no_perturb: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Experiment configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Write every packet and topology change as JSON Lines
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Write per-packet hop ratios as CSV
    #[arg(long)]
    pub ratios: Option<PathBuf>,

    /// Write the run summary as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Write the final rendered policy to a file
    #[arg(long)]
    pub render: Option<PathBuf>,
}

/// Parse `ROW,COL` into a position
pub fn parse_position(value: &str) -> std::result::Result<Position, String> {
    let (row, col) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got '{value}'"))?;
    let row = row
        .trim()
        .parse()
        .map_err(|_| format!("invalid row '{row}'"))?;
    let col = col
        .trim()
        .parse()
        .map_err(|_| format!("invalid column '{col}'"))?;
    Ok(Position::new(row, col))
}

pub fn execute(args: SimulateArgs) -> Result<()> {
    let experiment = match &args.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ExperimentConfig::default(),
    };

    let mut traffic = experiment.traffic.clone();
    if let Some(packets) = args.packets {
        traffic = traffic.with_packets(packets);
    }
    if let Some(max_hops) = args.max_hops {
        traffic = traffic.with_max_hops(max_hops);
    }
    if args.no_perturb {
        traffic = traffic.without_perturbation();
    }
    if let Some(seed) = args.seed {
        traffic = traffic.with_seed(seed);
    }

    let topology = args.topology.unwrap_or(experiment.topology);
    let mut rng = build_rng(derive_seed(traffic.seed, NETWORK_SEED_STREAM));
    let network = GridNetwork::load(&args.map, topology, &mut rng)
        .with_context(|| format!("Failed to load map from {}", args.map.display()))?;

    // Without an explicit choice, measure against the map's own destination
    match args.destination {
        Some(destination) => traffic = traffic.with_destination(destination),
        None if args.config.is_none() => {
            if let Some(&destination) = network.destinations().first() {
                traffic = traffic.with_destination(destination);
            }
        }
        None => {}
    }

    let mut router = create_router(
        &args,
        &experiment,
        network,
        derive_seed(traffic.seed, SOLVER_SEED_STREAM),
    )?;

    print_section(&format!("{}: {}", router.name(), args.map.display()));
    let (rows, cols) = router.network().shape();
    print_kv("Grid", &format!("{rows}x{cols} ({topology})"));
    print_kv("Destination", &traffic.destination.to_string());
    print_kv("Max hops", &traffic.max_hops.to_string());
    if traffic.perturb {
        print_kv(
            "Perturbation",
            &format!(
                "up to {} nodes every {} packets",
                traffic.max_disabled, traffic.perturb_every
            ),
        );
    } else {
        print_kv("Perturbation", "off");
    }
    if let Some(seed) = traffic.seed {
        print_kv("Seed", &seed.to_string());
    }
    println!();

    let mut metrics = MetricsObserver::new();
    let result = {
        let mut generator = TrafficGenerator::new(traffic).with_observer(Box::new(&mut metrics));
        if !args.quiet {
            generator = generator.with_observer(Box::new(ProgressObserver::new()));
        }
        if let Some(path) = &args.observations {
            let observer = JsonlObserver::new(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            generator = generator.with_observer(Box::new(observer));
        }
        generator.run(router.as_mut())?
    };

    print_subsection("Results");
    print_traffic_summary(&result, &metrics.summary());

    let renderer = PolicyRenderer::for_solver(router.name());
    print_subsection("Final policy");
    print!("{}", renderer.render(router.network()));

    if let Some(path) = &args.observations {
        println!("\n✓ Observations written to: {}", path.display());
    }
    if let Some(path) = &args.ratios {
        result
            .export_ratios(path)
            .with_context(|| format!("Failed to export ratios to {}", path.display()))?;
        println!("✓ Ratios exported to: {}", path.display());
    }
    if let Some(path) = &args.summary {
        result
            .save(path)
            .with_context(|| format!("Failed to save summary to {}", path.display()))?;
        println!("✓ Summary saved to: {}", path.display());
    }
    if let Some(path) = &args.render {
        renderer.render_to_file(router.network(), path)?;
        println!("✓ Policy rendered to: {}", path.display());
    }

    Ok(())
}

fn create_router(
    args: &SimulateArgs,
    experiment: &ExperimentConfig,
    network: GridNetwork,
    seed: Option<u64>,
) -> Result<Box<dyn Router>> {
    if args.router.trim().eq_ignore_ascii_case("planner") {
        let mut planner = experiment.planner.clone();
        if let Some(discount) = args.discount {
            planner = planner.with_discount(discount);
        }
        if let Some(seed) = seed {
            planner = planner.with_seed(seed);
        }
        let mut solver = DynamicProgrammingSolver::new(network, planner)?;
        solver.plan()?;
        return Ok(Box::new(solver));
    }

    let kind: RouterKind = args.router.parse().map_err(|err| {
        anyhow!("{err}. The planner is also available as 'planner'")
    })?;

    let mut config: RouterConfig = experiment.router.apply(RouterConfig::for_kind(kind));
    if let Some(epsilon) = args.epsilon {
        config = config.with_epsilon(epsilon);
    }
    if let Some(alpha) = args.alpha {
        config = config.with_learning_rate(alpha);
    }
    if let Some(discount) = args.discount {
        config = config.with_discount(discount);
    }
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }

    Ok(build_router(kind, network, &config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("2,3").unwrap(), Position::new(2, 3));
        assert_eq!(parse_position(" 0 , 1 ").unwrap(), Position::new(0, 1));
        assert!(parse_position("2").is_err());
        assert!(parse_position("a,1").is_err());
    }
}
