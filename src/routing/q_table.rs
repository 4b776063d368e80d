//! Q-table implementation for temporal difference routing

use serde::{Deserialize, Serialize};

use crate::{
    network::Grid,
    selection::ActionScores,
    types::{Action, Position},
};

/// Dense Q-table mapping (node, action) pairs to Q-values
///
/// Shaped like the network grid, one score per action in each cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QTable {
    /// Q-values per cell, indexed by [`Action::index`]
    q_values: Grid<ActionScores>,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
    /// Initial Q-value for every pair
    q_init: f64,
}

impl QTable {
    /// Create a new Q-table for a `rows` x `cols` grid
    pub fn new(
        rows: usize,
        cols: usize,
        learning_rate: f64,
        discount_factor: f64,
        q_init: f64,
    ) -> Self {
        Self {
            q_values: Grid::filled(rows, cols, [q_init; Action::COUNT]),
            learning_rate,
            discount_factor,
            q_init,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.q_values.shape()
    }

    pub fn q_init(&self) -> f64 {
        self.q_init
    }

    /// Get Q-value for a node-action pair
    ///
    /// Positions outside the grid read as the initial value.
    pub fn get(&self, state: Position, action: Action) -> f64 {
        self.q_values
            .get(state)
            .map_or(self.q_init, |row| row[action.index()])
    }

    /// Set Q-value for a node-action pair; positions outside the grid are ignored
    pub fn set(&mut self, state: Position, action: Action, value: f64) {
        debug_assert!(self.q_values.contains(state), "{state} outside Q-table");
        if let Some(row) = self.q_values.get_mut(state) {
            row[action.index()] = value;
        }
    }

    /// All action values at a node
    pub fn row(&self, state: Position) -> ActionScores {
        self.q_values
            .get(state)
            .copied()
            .unwrap_or([self.q_init; Action::COUNT])
    }

    /// Lowest Q-value at a node
    pub fn min_q(&self, state: Position) -> f64 {
        self.row(state).into_iter().fold(f64::INFINITY, f64::min)
    }

    /// Q-routing update: bootstrapped cost propagation
    ///
    /// Q(s,a) ← Q(s,a) + α[min_a' Q(s',a') - Q(s,a)]
    ///
    /// The reward is not used; a destination successor costs nothing more.
    pub fn cost_update(&mut self, state: Position, action: Action, next_state: Position, done: bool) {
        let current_q = self.get(state, action);
        let next_cost = if done { 0.0 } else { self.min_q(next_state) };
        let new_q = current_q + self.learning_rate * (next_cost - current_q);
        self.set(state, action, new_q);
    }

    /// SARSA update: on-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ Q(s',a') - Q(s,a)]
    pub fn sarsa_update(
        &mut self,
        state: Position,
        action: Action,
        reward: f64,
        next_state: Position,
        next_action: Action,
        done: bool,
    ) {
        let current_q = self.get(state, action);
        let next_q = if done {
            0.0
        } else {
            self.get(next_state, next_action)
        };
        let td_target = reward + self.discount_factor * next_q;
        let td_error = td_target - current_q;
        let new_q = current_q + self.learning_rate * td_error;
        self.set(state, action, new_q);
    }

    /// Reset all Q-values to the initial value
    pub fn reset(&mut self) {
        let (rows, cols) = self.shape();
        self.q_values = Grid::filled(rows, cols, [self.q_init; Action::COUNT]);
    }

    /// Iterate over every stored Q-value
    pub fn values(&self) -> impl Iterator<Item = (Position, Action, f64)> + '_ {
        self.q_values.iter().flat_map(|(pos, row)| {
            Action::ALL
                .into_iter()
                .map(move |action| (pos, action, row[action.index()]))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qtable_initialization() {
        let qtable = QTable::new(2, 2, 0.5, 0.9, 10.0);
        assert_eq!(qtable.get(Position::new(1, 1), Action::Up), 10.0);
        assert_eq!(qtable.values().count(), 2 * 2 * Action::COUNT);
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = QTable::new(2, 2, 0.5, 0.9, 0.0);
        let state = Position::new(0, 1);
        qtable.set(state, Action::Down, 1.5);
        assert_eq!(qtable.get(state, Action::Down), 1.5);
        assert_eq!(qtable.get(state, Action::Up), 0.0);
    }

    #[test]
    fn test_min_q() {
        let mut qtable = QTable::new(1, 1, 0.5, 0.9, 0.0);
        let state = Position::new(0, 0);
        qtable.set(state, Action::Right, 0.5);
        qtable.set(state, Action::Left, 1.5);
        qtable.set(state, Action::Up, -0.8);

        assert_eq!(qtable.min_q(state), -0.8);
    }

    #[test]
    fn test_cost_update() {
        let mut qtable = QTable::new(1, 2, 0.5, 0.9, 10.0);
        let state = Position::new(0, 0);
        let next_state = Position::new(0, 1);
        qtable.set(next_state, Action::Left, 2.0);

        // Q = 10 + 0.5 * (2 - 10) = 6
        qtable.cost_update(state, Action::Right, next_state, false);
        assert!((qtable.get(state, Action::Right) - 6.0).abs() < 1e-12);

        // Terminal successor costs nothing: Q = 6 + 0.5 * (0 - 6) = 3
        qtable.cost_update(state, Action::Right, next_state, true);
        assert!((qtable.get(state, Action::Right) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_sarsa_update() {
        let mut qtable = QTable::new(1, 2, 0.5, 0.99, 0.0);
        let state = Position::new(0, 0);
        let next_state = Position::new(0, 1);
        qtable.set(next_state, Action::Up, 1.5);

        qtable.sarsa_update(state, Action::Right, 0.0, next_state, Action::Up, false);

        // Q(s,a) = 0.0 + 0.5 * (0.0 + 0.99 * 1.5 - 0.0) = 0.7425
        let updated_q = qtable.get(state, Action::Right);
        assert!((updated_q - 0.7425).abs() < 0.01);
    }

    #[test]
    fn test_sarsa_update_terminal_ignores_next() {
        let mut qtable = QTable::new(1, 2, 1.0, 0.9, 0.0);
        let state = Position::new(0, 0);
        let next_state = Position::new(0, 1);
        qtable.set(next_state, Action::Up, -5.0);
        qtable.sarsa_update(state, Action::Right, -1.0, next_state, Action::Up, true);
        assert_eq!(qtable.get(state, Action::Right), -1.0);
    }

    #[test]
    fn test_reset() {
        let mut qtable = QTable::new(2, 1, 0.5, 0.9, 3.0);
        qtable.set(Position::new(1, 0), Action::Left, -7.0);
        qtable.reset();
        assert!(qtable.values().all(|(_, _, q)| q == 3.0));
    }
}
