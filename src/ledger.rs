use smallvec::SmallVec;
use std::collections::HashMap;

use crate::placement::{Coord, Placement};
use crate::MAX_WORD_LENGTH;

/// The ordered list of committed placements, plus a sparse map from cell to letter so that
/// `letter_at` doesn't have to scan every placement.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    placements: Vec<Placement>,
    letters: HashMap<Coord, char>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger::default()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn letter_at(&self, cell: Coord) -> Option<char> {
        self.letters.get(&cell).cloned()
    }

    pub fn is_occupied(&self, cell: Coord) -> bool {
        self.letters.contains_key(&cell)
    }

    /// Number of cells carrying a letter.
    pub fn cell_count(&self) -> usize {
        self.letters.len()
    }

    pub fn cells(&self) -> impl Iterator<Item=(Coord, char)> + '_ {
        self.letters.iter().map(|(&cell, &letter)| (cell, letter))
    }

    /// Append a placement and return the cells that carried no letter before it. The caller is
    /// responsible for having checked that any letters already present agree with the word.
    pub fn push(&mut self, placement: Placement) -> SmallVec<[Coord; MAX_WORD_LENGTH]> {
        let mut new_cells = SmallVec::new();
        for (cell, letter) in placement.cells() {
            let previous = self.letters.insert(cell, letter);
            debug_assert!(previous.map(|p| p == letter).unwrap_or(true), "letter clash at {:?}", cell);
            if previous.is_none() {
                new_cells.push(cell);
            }
        }
        self.placements.push(placement);
        new_cells
    }

    /// Undo the most recent `push`, given the new cells it reported.
    pub fn pop(&mut self, new_cells: &[Coord]) -> Option<Placement> {
        for cell in new_cells {
            self.letters.remove(cell);
        }
        self.placements.pop()
    }
}
