use log::debug;
use smallvec::SmallVec;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::blocking::{markers_for, BlockedSet};
use crate::config::EngineOptions;
use crate::error::{LatticeError, Result};
use crate::frontier::{crossing_starts, is_viable_start, neighbors_of, own_span, Frontier};
use crate::ledger::Ledger;
use crate::placement::{Anchor, Coord, Direction, Placement, Rect};
use crate::word_index::{normalize_word, WordId, WordIndex};
use crate::{MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// Source of unique lattice ids, so a snapshot can't be restored into the wrong lattice.
static NEXT_LATTICE_ID: AtomicU64 = AtomicU64::new(1);

/// Everything a single commit changed, recorded so that it can be undone exactly.
#[derive(Debug)]
struct CommitRecord {
    /// Unique (per lattice) and never reused, even after the record is rolled back.
    serial: u64,
    new_cells: SmallVec<[Coord; MAX_WORD_LENGTH]>,
    retired_word: Option<WordId>,
    added_markers: Vec<Anchor>,
    purged_candidates: Vec<Anchor>,
    added_candidates: Vec<Anchor>,
}

/// A checkpoint in a lattice's commit history. Restoring it undoes every commit made since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    lattice_id: u64,
    journal_len: usize,
    last_serial: Option<u64>,
}

/// The state of one generation session: placed words, the letters they put on the grid, the
/// blocked markers they imply, the frontier of possible next starts, and the dictionary with its
/// record of used words.
pub struct Lattice {
    id: u64,
    pub(crate) options: EngineOptions,
    pub(crate) index: WordIndex,
    pub(crate) ledger: Ledger,
    pub(crate) blocked: BlockedSet,
    pub(crate) frontier: Frontier,
    journal: Vec<CommitRecord>,
    next_serial: u64,
}

impl Debug for Lattice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lattice")
            .field("id", &self.id)
            .field("placements", &self.ledger.len())
            .field("frontier", &self.frontier.len())
            .field("blocked", &self.blocked.len())
            .field("live_words", &self.index.live_count())
            .finish()
    }
}

impl Lattice {
    /// A lattice with nothing placed yet.
    pub fn empty(index: WordIndex, options: EngineOptions) -> Lattice {
        Lattice {
            id: NEXT_LATTICE_ID.fetch_add(1, Ordering::Relaxed),
            options,
            index,
            ledger: Ledger::new(),
            blocked: BlockedSet::new(),
            frontier: Frontier::new(),
            journal: vec![],
            next_serial: 0,
        }
    }

    /// A lattice seeded with `seed` at `origin`. The seed doesn't have to be in the dictionary,
    /// but it has to be a well-formed word.
    pub fn new(
        index: WordIndex,
        seed: &str,
        origin: Coord,
        direction: Direction,
        options: EngineOptions,
    ) -> Result<Lattice> {
        let word = normalize_word(seed)
            .map_err(|reason| LatticeError::InvalidWord { word: seed.to_string(), reason })?;

        let mut lattice = Lattice::empty(index, options);
        lattice.commit(Placement::new(&word, origin.0, origin.1, direction));
        Ok(lattice)
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn index(&self) -> &WordIndex {
        &self.index
    }

    pub fn placements(&self) -> &[Placement] {
        self.ledger.placements()
    }

    pub fn letter_at(&self, cell: Coord) -> Option<char> {
        self.ledger.letter_at(cell)
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn blocked(&self) -> &BlockedSet {
        &self.blocked
    }

    pub fn is_blocked(&self, anchor: &Anchor) -> bool {
        self.blocked.contains(anchor)
    }

    /// Placements lying entirely inside `rect`.
    pub fn placements_in(&self, rect: &Rect) -> Vec<&Placement> {
        self.placements().iter().filter(|p| rect.contains_placement(p)).collect()
    }

    /// Check a prospective crossing placement against the grid, returning its number of
    /// intersections if it's legal. A legal placement:
    /// * has nothing directly before its first letter or after its last;
    /// * doesn't run through any cell blocked for its direction;
    /// * agrees with every letter already on the grid under it;
    /// * has empty neighbors beside each of its new letters;
    /// * crosses at least one existing letter and adds at least one new one.
    pub fn check_placement(&self, placement: &Placement) -> std::result::Result<usize, &'static str> {
        let anchor = placement.anchor();
        let len = placement.len();

        if len < MIN_WORD_LENGTH || len > MAX_WORD_LENGTH {
            return Err("length out of range");
        }
        if self.ledger.is_occupied(anchor.cell_at(-1)) {
            return Err("touches a letter before its start");
        }
        if self.ledger.is_occupied(anchor.cell_at(len as i32)) {
            return Err("touches a letter after its end");
        }

        let mut intersections = 0;
        for (cell, letter) in placement.cells() {
            if self.blocked.contains(&Anchor::at(cell, placement.direction)) {
                return Err("runs through a blocked cell");
            }
            match self.ledger.letter_at(cell) {
                Some(existing) if existing == letter => intersections += 1,
                Some(_) => return Err("disagrees with an existing letter"),
                None => {
                    if placement.direction.beside(cell).iter().any(|&c| self.ledger.is_occupied(c)) {
                        return Err("runs alongside existing letters");
                    }
                }
            }
        }

        if intersections == 0 {
            return Err("doesn't cross any existing letter");
        }
        if intersections == len {
            return Err("adds no new letters");
        }

        Ok(intersections)
    }

    /// Validate and commit a caller-supplied placement. The first placement on an empty lattice
    /// is treated as a seed and only has to be a well-formed word.
    pub fn place(&mut self, placement: Placement) -> Result<()> {
        let word = normalize_word(&placement.word).map_err(|reason| {
            LatticeError::InvalidWord { word: placement.word.clone(), reason }
        })?;
        let placement = Placement { word, ..placement };

        if !self.ledger.is_empty() {
            if !self.options.allow_repeats && self.placements().iter().any(|p| p.word == placement.word) {
                return Err(LatticeError::IllegalPlacement { placement, reason: "word already placed" });
            }
            if let Err(reason) = self.check_placement(&placement) {
                return Err(LatticeError::IllegalPlacement { placement, reason });
            }
        }

        self.commit(placement);
        Ok(())
    }

    /// Append a placement and bring the blocked set, the frontier and the word index up to date,
    /// journaling every change. Callers are responsible for legality.
    pub(crate) fn commit(&mut self, placement: Placement) {
        let serial = self.next_serial;
        self.next_serial += 1;

        let new_cells = self.ledger.push(placement.clone());

        let mut retired_word = None;
        if !self.options.allow_repeats {
            if let Some(id) = self.index.id_of(&placement.word) {
                if self.index.remove_word(id) {
                    retired_word = Some(id);
                }
            }
        }

        let mut added_markers = vec![];
        for marker in markers_for(&placement) {
            if self.blocked.insert(marker) {
                added_markers.push(marker);
            }
        }

        // Drop candidates that are now blocked, that sit on the new word's own line, or that the
        // new letters have made unusable.
        let mut purged_candidates = vec![];
        for anchor in added_markers.iter().cloned().chain(own_span(&placement)) {
            if self.frontier.remove(&anchor) {
                purged_candidates.push(anchor);
            }
        }
        for anchor in neighbors_of(&new_cells) {
            if self.frontier.contains(&anchor) && !is_viable_start(&self.ledger, &self.blocked, &anchor) {
                self.frontier.remove(&anchor);
                purged_candidates.push(anchor);
            }
        }

        let mut added_candidates = vec![];
        for anchor in crossing_starts(&placement) {
            if !self.frontier.contains(&anchor) && is_viable_start(&self.ledger, &self.blocked, &anchor) {
                self.frontier.insert(anchor);
                added_candidates.push(anchor);
            }
        }

        debug!(
            "committed {:?}: {} new cells, {} new markers, frontier -{} +{} = {}",
            placement,
            new_cells.len(),
            added_markers.len(),
            purged_candidates.len(),
            added_candidates.len(),
            self.frontier.len(),
        );

        self.journal.push(CommitRecord {
            serial,
            new_cells,
            retired_word,
            added_markers,
            purged_candidates,
            added_candidates,
        });
    }

    /// Undo a single commit, in the reverse order of how it was applied.
    fn undo(&mut self, record: CommitRecord) {
        for anchor in &record.added_candidates {
            self.frontier.remove(anchor);
        }
        for &anchor in &record.purged_candidates {
            self.frontier.insert(anchor);
        }
        for anchor in &record.added_markers {
            self.blocked.remove(anchor);
        }
        if let Some(id) = record.retired_word {
            self.index.restore_word(id);
        }
        self.ledger.pop(&record.new_cells);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lattice_id: self.id,
            journal_len: self.journal.len(),
            last_serial: self.journal.last().map(|record| record.serial),
        }
    }

    /// Roll back every commit made since `snapshot` was taken. The snapshot has to come from this
    /// lattice and still be part of its history (it can't have been rolled back past); otherwise
    /// nothing is changed and an error is returned.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        if snapshot.lattice_id != self.id {
            return Err(LatticeError::ForeignSnapshot);
        }
        if snapshot.journal_len > self.journal.len() {
            return Err(LatticeError::StaleSnapshot);
        }
        let serial_at_checkpoint = match snapshot.journal_len {
            0 => None,
            len => Some(self.journal[len - 1].serial),
        };
        if serial_at_checkpoint != snapshot.last_serial {
            return Err(LatticeError::StaleSnapshot);
        }

        while self.journal.len() > snapshot.journal_len {
            if let Some(record) = self.journal.pop() {
                self.undo(record);
            }
        }

        Ok(())
    }

    /// Commit the single best-scoring crossing placement anywhere on the frontier. Returns
    /// `None` (and changes nothing) if there's no legal placement left.
    pub fn generate_word(&mut self, depth: usize) -> Result<Option<Placement>> {
        let anchors: Vec<Anchor> = self.frontier.iter().cloned().collect();

        match self.best_option(&anchors, depth, None)? {
            Some(option) => {
                self.commit(option.placement.clone());
                Ok(Some(option.placement))
            }
            None => {
                debug!("no legal placement left after {} words", self.ledger.len());
                Ok(None)
            }
        }
    }

    /// Generate up to `count` words, stopping early if we run out of legal placements.
    pub fn generate(&mut self, count: usize, depth: usize) -> Result<Vec<Placement>> {
        let mut added = vec![];

        for _ in 0..count {
            match self.generate_word(depth)? {
                Some(placement) => added.push(placement),
                None => break,
            }
        }

        Ok(added)
    }
}
