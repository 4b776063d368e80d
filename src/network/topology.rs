//! Edge behaviour of the grid.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, types::Position};

/// How a move past the edge of the grid is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Moves off the grid are absorbed as self-loops
    #[default]
    Bounded,
    /// Moves off one edge re-enter from the opposite edge
    Torus,
}

impl Topology {
    /// Resolve a candidate position against a `rows` x `cols` grid.
    ///
    /// Returns `None` when the move leaves a bounded grid.
    pub fn resolve(self, candidate: Position, rows: usize, cols: usize) -> Option<Position> {
        if rows == 0 || cols == 0 {
            return None;
        }
        let (rows, cols) = (rows as i32, cols as i32);
        match self {
            Topology::Bounded => {
                let inside = (0..rows).contains(&candidate.row) && (0..cols).contains(&candidate.col);
                inside.then_some(candidate)
            }
            Topology::Torus => Some(Position::new(
                candidate.row.rem_euclid(rows),
                candidate.col.rem_euclid(cols),
            )),
        }
    }

    /// Fewest hops between two cells of a `rows` x `cols` grid with no
    /// failed nodes. On a torus each axis may go either way round.
    pub fn distance(self, a: Position, b: Position, rows: usize, cols: usize) -> usize {
        match self {
            Topology::Bounded => a.manhattan(b),
            Topology::Torus => {
                let d_row = a.row.abs_diff(b.row) as usize;
                let d_col = a.col.abs_diff(b.col) as usize;
                d_row.min(rows.saturating_sub(d_row)) + d_col.min(cols.saturating_sub(d_col))
            }
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::Bounded => f.write_str("bounded"),
            Topology::Torus => f.write_str("torus"),
        }
    }
}

impl FromStr for Topology {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounded" | "mesh" => Ok(Topology::Bounded),
            "torus" | "wrap" => Ok(Topology::Torus),
            other => Err(Error::UnknownVariant {
                kind: "topology",
                input: other.to_string(),
                expected: "bounded, torus".to_string(),
            }),
        }
    }
}
