use std::collections::BTreeSet;

use crate::blocking::BlockedSet;
use crate::ledger::Ledger;
use crate::placement::{Anchor, Coord, Direction, Placement, Rect};
use crate::MAX_WORD_LENGTH;

/// Could a word of `anchor.direction` start at this anchor? It must not be blocked, the cell
/// before it must be empty (otherwise the word would really start earlier), and if the start cell
/// is empty its neighbors across the word must be empty too. A start cell that already carries a
/// letter is an intersection, so its neighbors belong to the word being crossed.
pub fn is_viable_start(ledger: &Ledger, blocked: &BlockedSet, anchor: &Anchor) -> bool {
    if blocked.contains(anchor) || ledger.is_occupied(anchor.cell_at(-1)) {
        return false;
    }
    ledger.is_occupied(anchor.cell())
        || anchor.direction.beside(anchor.cell()).iter().all(|&cell| !ledger.is_occupied(cell))
}

/// Every anchor from which a perpendicular word of up to `MAX_WORD_LENGTH` letters could reach one
/// of this placement's cells: for each covered cell, the cell itself and the cells up to
/// `MAX_WORD_LENGTH - 1` steps before it along the crossing direction.
pub fn crossing_starts(placement: &Placement) -> Vec<Anchor> {
    let crossing_direction = placement.direction.perpendicular();
    let mut starts = Vec::with_capacity(placement.len() * MAX_WORD_LENGTH);

    for (cell, _) in placement.cells() {
        for depth in 0..MAX_WORD_LENGTH as i32 {
            starts.push(Anchor::at(crossing_direction.advance(cell, -depth), crossing_direction));
        }
    }

    starts
}

/// Same-direction anchors on the placement's own line, from two cells before its first letter
/// through the cell after its last. A word can't restart inside or right beside itself.
pub fn own_span(placement: &Placement) -> impl Iterator<Item=Anchor> {
    let anchor = placement.anchor();
    (-2..=placement.len() as i32).map(move |offset| Anchor::at(anchor.cell_at(offset), anchor.direction))
}

/// Anchors whose viability may have changed because `new_cells` gained letters: the new cells
/// themselves and their four neighbors, in both directions.
pub fn neighbors_of(new_cells: &[Coord]) -> Vec<Anchor> {
    let mut anchors = Vec::with_capacity(new_cells.len() * 10);
    for &(x, y) in new_cells {
        for cell in [(x, y), (x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            anchors.push(Anchor::at(cell, Direction::Horizontal));
            anchors.push(Anchor::at(cell, Direction::Vertical));
        }
    }
    anchors
}

/// The set of anchors where a new word could start. Kept ordered so that generation is
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    candidates: BTreeSet<Anchor>,
}

impl Frontier {
    pub fn new() -> Frontier {
        Frontier::default()
    }

    pub fn contains(&self, anchor: &Anchor) -> bool {
        self.candidates.contains(anchor)
    }

    pub fn insert(&mut self, anchor: Anchor) -> bool {
        self.candidates.insert(anchor)
    }

    pub fn remove(&mut self, anchor: &Anchor) -> bool {
        self.candidates.remove(anchor)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item=&Anchor> {
        self.candidates.iter()
    }

    /// Candidates whose start cell lies inside `rect`.
    pub fn within(&self, rect: &Rect) -> Vec<Anchor> {
        self.candidates.iter().filter(|anchor| rect.contains(anchor.cell())).cloned().collect()
    }
}
