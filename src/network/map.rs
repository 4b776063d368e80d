//! Map file loading.
//!
//! A map is a whitespace-delimited numeric matrix, one grid row per line.
//! Cell codes are `-1` (destination), `0` (active) and `1` (inactive).
//! Numeric matrix writers often emit floats, so `-1.0` or `1e0` are accepted
//! as long as they are integral.

use std::{fs, io, path::Path};

use rand::Rng;

use super::{grid::Grid, mdp::GridNetwork, topology::Topology};
use crate::{Error, Result, types::NodeType};

/// Parse map text into a node grid.
///
/// # Errors
///
/// Returns [`Error::InvalidNumber`] for non-numeric tokens,
/// [`Error::InvalidNodeCode`] for numbers that are not node codes,
/// [`Error::RaggedMap`] for rows of unequal width and [`Error::EmptyMap`]
/// when no rows are present.
pub fn parse_nodes(text: &str) -> Result<Grid<NodeType>> {
    let mut rows = Vec::new();
    for line in text.lines().filter(|line| !line.trim().is_empty()) {
        let row = rows.len();
        let cells = line
            .split_whitespace()
            .enumerate()
            .map(|(col, token)| parse_cell(token, row, col))
            .collect::<Result<Vec<_>>>()?;
        rows.push(cells);
    }
    Grid::from_rows(rows)
}

fn parse_cell(token: &str, row: usize, col: usize) -> Result<NodeType> {
    let code: f64 = token.parse().map_err(|_| Error::InvalidNumber {
        token: token.to_string(),
        row,
        col,
    })?;
    let invalid = || Error::InvalidNodeCode { code, row, col };
    if code.fract() != 0.0 || !(-1.0..=1.0).contains(&code) {
        return Err(invalid());
    }
    NodeType::from_code(code as i8).ok_or_else(invalid)
}

/// Format a node grid in the map file format.
pub fn format_nodes(nodes: &Grid<NodeType>) -> String {
    let mut out = String::new();
    for row in 0..nodes.rows() {
        let line = nodes.as_slice()[row * nodes.cols()..(row + 1) * nodes.cols()]
            .iter()
            .map(|node| node.code().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

impl GridNetwork {
    /// Build a network from map text.
    pub fn parse<R: Rng + ?Sized>(text: &str, topology: Topology, rng: &mut R) -> Result<Self> {
        Ok(Self::new(parse_nodes(text)?, topology, rng))
    }

    /// Load a network from a map file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MapNotFound`] for a missing file, [`Error::Io`] for
    /// other read failures, and any error of [`parse_nodes`].
    pub fn load<P: AsRef<Path>, R: Rng + ?Sized>(
        path: P,
        topology: Topology,
        rng: &mut R,
    ) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => Error::MapNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io {
                operation: format!("read map '{}'", path.display()),
                source,
            },
        })?;
        Self::parse(&text, topology, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    #[test]
    fn test_parse_codes() {
        let grid = parse_nodes("0 1\n-1 0\n").unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid[Position::new(0, 1)], NodeType::Inactive);
        assert_eq!(grid[Position::new(1, 0)], NodeType::Destination);
    }

    #[test]
    fn test_parse_float_codes_and_blank_lines() {
        let grid = parse_nodes("\n0.0 -1.0\n\n1.0 0.0\n").unwrap();
        assert_eq!(grid.shape(), (2, 2));
        assert_eq!(grid[Position::new(0, 1)], NodeType::Destination);
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        assert!(matches!(
            parse_nodes("0 2"),
            Err(Error::InvalidNodeCode { row: 0, col: 1, .. })
        ));
        assert!(matches!(
            parse_nodes("0 0.5"),
            Err(Error::InvalidNodeCode { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_nodes("0 x"),
            Err(Error::InvalidNumber { col: 1, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_ragged_and_empty() {
        assert!(matches!(
            parse_nodes("0 0\n0"),
            Err(Error::RaggedMap { row: 1, .. })
        ));
        assert!(matches!(parse_nodes("  \n"), Err(Error::EmptyMap)));
    }

    #[test]
    fn test_format_round_trips() {
        let text = "0 0 1\n0 -1 0\n";
        let grid = parse_nodes(text).unwrap();
        assert_eq!(format_nodes(&grid), text);
    }
}
