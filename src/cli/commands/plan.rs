//! Plan command - Compute a routing policy with dynamic programming

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::ExperimentConfig,
        output::{print_kv, print_plan_report, print_section, print_subsection},
    },
    config::PlanningMethod,
    network::{GridNetwork, Topology},
    planning::DynamicProgrammingSolver,
    ports::Router,
    render::PolicyRenderer,
    selection::{NETWORK_SEED_STREAM, SOLVER_SEED_STREAM, build_rng, derive_seed},
};

#[derive(Parser, Debug)]
#[command(about = "Plan a routing policy with value or policy iteration")]
pub struct PlanArgs {
    /// Path to a whitespace-separated map file (-1 destination, 0 active, 1 inactive)
    pub map: PathBuf,

    /// Planning method (value, policy)
    #[arg(long, short = 'm')]
    pub method: Option<PlanningMethod>,

    /// Discount factor γ
    #[arg(long)]
    pub discount: Option<f64>,

    /// Convergence threshold θ
    #[arg(long)]
    pub theta: Option<f64>,

    /// Maximum policy-iteration rounds
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Grid topology (bounded, torus)
    #[arg(long)]
    pub topology: Option<Topology>,

    /// Random seed for the initial policy and tie-breaking
    #[arg(long)]
    pub seed: Option<u64>,

    /// Experiment configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print every sweep's largest value change
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Also print the value table
    #[arg(long)]
    pub values: bool,

    /// Write the rendered policy to a file
    #[arg(long)]
    pub render: Option<PathBuf>,

    /// Export the convergence report as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let experiment = match &args.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ExperimentConfig::default(),
    };

    let mut config = experiment.planner;
    if let Some(method) = args.method {
        config = config.with_method(method);
    }
    if let Some(discount) = args.discount {
        config = config.with_discount(discount);
    }
    if let Some(theta) = args.theta {
        config = config.with_theta(theta);
    }
    if let Some(max_rounds) = args.max_rounds {
        config = config.with_max_rounds(max_rounds);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    let user_seed = config.seed;
    config.seed = derive_seed(user_seed, SOLVER_SEED_STREAM);
    let topology = args.topology.unwrap_or(experiment.topology);

    let mut rng = build_rng(derive_seed(user_seed, NETWORK_SEED_STREAM));
    let network = GridNetwork::load(&args.map, topology, &mut rng)
        .with_context(|| format!("Failed to load map from {}", args.map.display()))?;
    let method = config.method;

    print_section(&format!("{method}: {}", args.map.display()));
    let (rows, cols) = network.shape();
    print_kv("Grid", &format!("{rows}x{cols} ({topology})"));
    print_kv("Discount", &config.discount.to_string());
    print_kv("Theta", &config.theta.to_string());
    if method == PlanningMethod::PolicyIteration {
        print_kv("Max rounds", &config.max_rounds.to_string());
    }

    let mut solver = DynamicProgrammingSolver::new(network, config)?;
    let report = solver.plan()?;

    print_subsection("Convergence");
    print_plan_report(&report, args.verbose);

    let renderer = PolicyRenderer::for_solver(method);
    print_subsection("Policy");
    print!("{}", renderer.render(solver.network()));

    if args.values {
        print_subsection("Values");
        print!("{}", renderer.render_values(solver.network()));
    }

    if let Some(path) = &args.render {
        renderer.render_to_file(solver.network(), path)?;
        println!("\n✓ Policy rendered to: {}", path.display());
    }

    if let Some(path) = &args.export {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        println!("✓ Report exported to: {}", path.display());
    }

    Ok(())
}
