//! Action selection shared by the planners and the online routers.
//!
//! Every solver ranks the four actions by a per-action score and needs the
//! same two rules: exact ties are broken uniformly at random, and exploration
//! picks any action with probability ε.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::types::Action;

/// Seeded generator when a seed is given, entropy-seeded otherwise.
pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Stream of the initial random policy drawn when a network is loaded.
pub const NETWORK_SEED_STREAM: u64 = 1;

/// Stream of a solver's exploration and tie-breaking.
pub const SOLVER_SEED_STREAM: u64 = 2;

/// Seed for one of several generators driven by a single user seed.
///
/// Stream 0 returns the seed unchanged; other streams are mixed with the
/// 64-bit golden ratio so no two generators share a sequence.
pub fn derive_seed(seed: Option<u64>, stream: u64) -> Option<u64> {
    seed.map(|seed| seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Per-action scores, indexed by [`Action::index`].
pub type ActionScores = [f64; Action::COUNT];

/// Direction in which scores are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Higher is better (returns, values)
    Maximize,
    /// Lower is better (costs, hop estimates)
    Minimize,
}

impl Objective {
    fn improves(self, candidate: f64, best: f64) -> bool {
        match self {
            Objective::Maximize => candidate > best,
            Objective::Minimize => candidate < best,
        }
    }

    fn worst(self) -> f64 {
        match self {
            Objective::Maximize => f64::NEG_INFINITY,
            Objective::Minimize => f64::INFINITY,
        }
    }
}

/// Uniformly random action.
pub fn random_action<R: Rng + ?Sized>(rng: &mut R) -> Action {
    Action::ALL[rng.random_range(0..Action::COUNT)]
}

/// Best score and every action attaining it.
///
/// Ties are exact floating-point equality. The action list is empty only
/// when no score compares (all NaN).
pub fn best_actions(scores: &ActionScores, objective: Objective) -> (f64, Vec<Action>) {
    let mut best = objective.worst();
    let mut winners = Vec::with_capacity(Action::COUNT);
    for action in Action::ALL {
        let score = scores[action.index()];
        if objective.improves(score, best) {
            best = score;
            winners.clear();
            winners.push(action);
        } else if score == best {
            winners.push(action);
        }
    }
    (best, winners)
}

/// Pick a best action, breaking ties uniformly at random.
///
/// Falls back to a uniformly random action when nothing ranks.
pub fn pick_best<R: Rng + ?Sized>(
    scores: &ActionScores,
    objective: Objective,
    rng: &mut R,
) -> (f64, Action) {
    let (best, winners) = best_actions(scores, objective);
    let action = match winners.len() {
        0 => random_action(rng),
        1 => winners[0],
        n => winners[rng.random_range(0..n)],
    };
    (best, action)
}

/// ε-greedy selection: explore with probability `epsilon`, otherwise
/// exploit via [`pick_best`].
pub fn epsilon_greedy<R: Rng + ?Sized>(
    scores: &ActionScores,
    epsilon: f64,
    objective: Objective,
    rng: &mut R,
) -> Action {
    if rng.random::<f64>() < epsilon {
        random_action(rng)
    } else {
        pick_best(scores, objective, rng).1
    }
}
