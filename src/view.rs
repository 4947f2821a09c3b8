use serde::{Deserialize, Serialize};

use crate::engine::Lattice;
use crate::placement::{Anchor, Placement};

/// The read-only state a renderer needs: placed words in commit order, frontier candidates in
/// frontier order, and blocked markers sorted by (x, y, direction).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotView {
    pub placements: Vec<Placement>,
    pub frontier: Vec<Anchor>,
    pub blocked: Vec<Anchor>,
}

impl Lattice {
    pub fn view(&self) -> SnapshotView {
        let mut blocked: Vec<Anchor> = self.blocked.iter().cloned().collect();
        blocked.sort();

        SnapshotView {
            placements: self.placements().to_vec(),
            frontier: self.frontier.iter().cloned().collect(),
            blocked,
        }
    }
}

/// Render every letter on the grid over the bounding box of the placements, one line per row,
/// with `.` for empty cells. An empty lattice renders as an empty string.
pub fn render_grid(lattice: &Lattice) -> String {
    let cells: Vec<_> = lattice.ledger.cells().map(|(cell, _)| cell).collect();
    if cells.is_empty() {
        return String::new();
    }

    let min_x = cells.iter().map(|cell| cell.0).min().unwrap_or(0);
    let max_x = cells.iter().map(|cell| cell.0).max().unwrap_or(0);
    let min_y = cells.iter().map(|cell| cell.1).min().unwrap_or(0);
    let max_y = cells.iter().map(|cell| cell.1).max().unwrap_or(0);

    let mut result = String::new();
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            result.push(lattice.letter_at((x, y)).unwrap_or('.'));
        }
        result.push('\n');
    }
    result
}
