//! Plain-text rendering of a network's policy and value tables.
//!
//! ```text
//! Value Iteration: Network Policy
//!    0 1 2 3
//! 0  → → → ↓
//! 1  → → → ↓
//! 2  → → → *
//! 3  → # → ↑
//! ```

use std::{fmt, fs, path::Path};

use crate::{
    Error, Result,
    network::GridNetwork,
    types::{NodeType, Position},
};

/// Renders policy and value tables under a title.
#[derive(Debug, Clone)]
pub struct PolicyRenderer {
    title: String,
}

impl PolicyRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Renderer titled "`solver`: Network Policy".
    pub fn for_solver(solver: impl fmt::Display) -> Self {
        Self::new(format!("{solver}: Network Policy"))
    }

    /// `#` for inactive cells, `*` for destinations, otherwise the policy arrow.
    pub fn render(&self, network: &GridNetwork) -> String {
        Table {
            title: &self.title,
            network,
            width: 1,
            cell: |pos: Position| match network.nodes()[pos] {
                NodeType::Inactive => "#".to_string(),
                NodeType::Destination => "*".to_string(),
                NodeType::Active => network.policies()[pos].arrow().to_string(),
            },
        }
        .to_string()
    }

    /// Value table, inactive cells shown as `#`.
    pub fn render_values(&self, network: &GridNetwork) -> String {
        Table {
            title: &self.title,
            network,
            width: 8,
            cell: |pos: Position| match network.nodes()[pos] {
                NodeType::Inactive => "#".to_string(),
                _ => format!("{:.3}", network.values()[pos]),
            },
        }
        .to_string()
    }

    /// Write the policy rendering to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn render_to_file<P: AsRef<Path>>(&self, network: &GridNetwork, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.render(network)).map_err(|source| Error::Io {
            operation: format!("write render '{}'", path.display()),
            source,
        })
    }
}

struct Table<'a, F> {
    title: &'a str,
    network: &'a GridNetwork,
    width: usize,
    cell: F,
}

impl<F> fmt::Display for Table<'_, F>
where
    F: Fn(Position) -> String,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.network.shape();
        let label_width = rows.saturating_sub(1).to_string().len();
        let width = self.width;

        writeln!(f, "{}", self.title)?;
        write!(f, "{:label_width$} ", "")?;
        for col in 0..cols {
            write!(f, " {col:>width$}")?;
        }
        writeln!(f)?;

        for row in 0..rows {
            write!(f, "{row:<label_width$} ")?;
            for col in 0..cols {
                let pos = Position::new(row as i32, col as i32);
                write!(f, " {:>width$}", (self.cell)(pos))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{network::Topology, types::Action};

    fn network() -> GridNetwork {
        let mut rng = StdRng::seed_from_u64(0);
        let mut network = GridNetwork::parse("0 -1\n1 0", Topology::Bounded, &mut rng).unwrap();
        network
            .set_policy(Position::new(0, 0), Action::Right)
            .unwrap();
        network
            .set_policy(Position::new(1, 1), Action::Up)
            .unwrap();
        network
    }

    #[test]
    fn test_render_policy() {
        let text = PolicyRenderer::for_solver("Value Iteration").render(&network());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Value Iteration: Network Policy");
        assert_eq!(lines[1], "   0 1");
        assert_eq!(lines[2], "0  → *");
        assert_eq!(lines[3], "1  # ↑");
    }

    #[test]
    fn test_render_values_marks_inactive() {
        let mut network = network();
        network
            .set_value(Position::new(0, 0), -1.5)
            .unwrap();
        let text = PolicyRenderer::new("values").render_values(&network);
        assert!(text.contains("  -1.500"));
        assert!(text.lines().nth(3).unwrap().contains('#'));
    }

    #[test]
    fn test_render_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.txt");
        let renderer = PolicyRenderer::new("SARSA: Network Policy");
        renderer.render_to_file(&network(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, renderer.render(&network()));
    }
}
