//! Output formatting for CLI

use crate::{
    pipeline::{MetricsSummary, RatioStats, TrafficResult},
    planning::{ConvergenceReport, PlanReport},
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

fn print_sweeps(report: &ConvergenceReport) {
    for (i, delta) in report.deltas.iter().enumerate() {
        println!("    sweep {:>4}  max delta {delta:.6}", i + 1);
    }
}

/// Print the convergence history of a planning run
pub fn print_plan_report(report: &PlanReport, verbose: bool) {
    match report {
        PlanReport::Value(report) => {
            print_kv("Sweeps", &format_number(report.sweeps));
            print_kv("Final delta", &format!("{:.6}", report.final_delta()));
            if verbose {
                print_sweeps(report);
            }
        }
        PlanReport::Policy(report) => {
            print_kv("Rounds", &report.rounds.len().to_string());
            print_kv("Evaluation sweeps", &format_number(report.total_sweeps()));
            print_kv("Policy stable", if report.stable { "yes" } else { "no" });
            for round in &report.rounds {
                println!(
                    "    round {:>3}  {} sweeps, {} policy changes",
                    round.round + 1,
                    round.evaluation.sweeps,
                    round.policy_changes
                );
                if verbose {
                    print_sweeps(&round.evaluation);
                }
            }
        }
    }
}

fn print_ratio_stats(label: &str, stats: &RatioStats) {
    print_kv(
        label,
        &format!(
            "mean {:.3}, median {:.3}, sd {:.3}, range [{:.3}, {:.3}]",
            stats.mean, stats.median, stats.std_dev, stats.min, stats.max
        ),
    );
}

/// Print the outcome of a traffic simulation
pub fn print_traffic_summary(result: &TrafficResult, metrics: &MetricsSummary) {
    print_kv("Router", &result.router);
    print_kv("Packets", &format_number(result.packets));
    print_kv(
        "Delivered",
        &format!(
            "{} ({:.1}%)",
            format_number(result.delivered),
            result.delivery_rate() * 100.0
        ),
    );
    print_kv("Timed out", &format_number(result.timed_out));
    print_kv("Topology changes", &result.perturbations.to_string());
    print_kv("Nodes disabled", &metrics.nodes_disabled.to_string());
    print_ratio_stats("Hop ratio", &result.stats());
    print_ratio_stats("Hops (delivered)", &metrics.hops);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(10_000), "10,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }
}
