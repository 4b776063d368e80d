//! Core domain types shared by the network and every solver.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
///
/// Coordinates are signed so that a candidate move past an edge can be
/// represented before it is rejected or wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Position reached by applying an action's displacement, without any
    /// bounds handling.
    pub fn offset(self, action: Action) -> Self {
        let (d_row, d_col) = action.delta();
        Self::new(self.row + d_row, self.col + d_col)
    }

    /// L1 distance between two positions.
    pub fn manhattan(self, other: Position) -> usize {
        (self.row.abs_diff(other.row) + self.col.abs_diff(other.col)) as usize
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// Where every packet is headed
    Destination,
    /// Can receive and forward packets
    Active,
    /// Failed node; never entered, never forwards
    Inactive,
}

impl NodeType {
    /// Numeric code used in map files.
    pub fn code(self) -> i8 {
        match self {
            NodeType::Destination => -1,
            NodeType::Active => 0,
            NodeType::Inactive => 1,
        }
    }

    pub fn from_code(code: i8) -> Option<NodeType> {
        match code {
            -1 => Some(NodeType::Destination),
            0 => Some(NodeType::Active),
            1 => Some(NodeType::Inactive),
            _ => None,
        }
    }

    pub fn is_inactive(self) -> bool {
        self == NodeType::Inactive
    }
}

/// One of the four routing moves.
///
/// `Up` decreases the row index (towards the first line of a map file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Right,
    Left,
    Up,
    Down,
}

impl Action {
    /// Every action, in index order.
    pub const ALL: [Action; 4] = [Action::Right, Action::Left, Action::Up, Action::Down];

    /// Number of actions available at every node.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the displacement (d_row, d_col) for this action
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::Right => (0, 1),
            Action::Left => (0, -1),
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
        }
    }

    /// Stable index into per-action tables.
    pub fn index(self) -> usize {
        match self {
            Action::Right => 0,
            Action::Left => 1,
            Action::Up => 2,
            Action::Down => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    /// Arrow glyph used when rendering a policy.
    pub fn arrow(self) -> char {
        match self {
            Action::Right => '→',
            Action::Left => '←',
            Action::Up => '↑',
            Action::Down => '↓',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Right => "right",
            Action::Left => "left",
            Action::Up => "up",
            Action::Down => "down",
        };
        f.write_str(name)
    }
}

/// Result of routing a single packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteOutcome {
    /// The packet reached the destination after this many hops
    Delivered(usize),
    /// The hop budget ran out before the destination was reached
    TimedOut,
}

impl RouteOutcome {
    /// Hop count for a delivered packet.
    pub fn hops(self) -> Option<usize> {
        match self {
            RouteOutcome::Delivered(hops) => Some(hops),
            RouteOutcome::TimedOut => None,
        }
    }

    pub fn is_delivered(self) -> bool {
        matches!(self, RouteOutcome::Delivered(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_delta() {
        assert_eq!(Action::Right.delta(), (0, 1));
        assert_eq!(Action::Left.delta(), (0, -1));
        assert_eq!(Action::Up.delta(), (-1, 0));
        assert_eq!(Action::Down.delta(), (1, 0));
    }

    #[test]
    fn test_action_index_matches_all() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(Action::COUNT), None);
    }

    #[test]
    fn test_node_codes() {
        for node in [NodeType::Destination, NodeType::Active, NodeType::Inactive] {
            assert_eq!(NodeType::from_code(node.code()), Some(node));
        }
        assert_eq!(NodeType::from_code(2), None);
    }

    #[test]
    fn test_manhattan() {
        let a = Position::new(0, 0);
        let b = Position::new(2, 3);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(b.manhattan(a), 5);
        assert_eq!(a.offset(Action::Down), Position::new(1, 0));
    }

    #[test]
    fn test_route_outcome_hops() {
        assert_eq!(RouteOutcome::Delivered(3).hops(), Some(3));
        assert_eq!(RouteOutcome::TimedOut.hops(), None);
        assert!(!RouteOutcome::TimedOut.is_delivered());
    }
}
