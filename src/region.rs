//! Viewport-driven expansion: grow the lattice inside a rectangle the client is looking at, and
//! drop an unconnected "island" word when nothing in view can be crossed.

use instant::Instant;
use log::{debug, trace};
use smallvec::SmallVec;

use crate::config::ExpandOptions;
use crate::engine::Lattice;
use crate::error::{LatticeError, Result};
use crate::placement::{Anchor, Coord, Direction, Placement, Rect};
use crate::search::deadline_passed;
use crate::word_index::WordId;
use crate::{INTERRUPT_FREQUENCY, MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// The cells on the square ring `radius` steps out from `center`, clockwise from the top-left
/// corner.
fn ring(center: Coord, radius: i32) -> Vec<Coord> {
    let (cx, cy) = center;
    if radius == 0 {
        return vec![center];
    }

    let mut cells = Vec::with_capacity(8 * radius as usize);
    for x in cx - radius..=cx + radius {
        cells.push((x, cy - radius));
    }
    for y in cy - radius + 1..=cy + radius {
        cells.push((cx + radius, y));
    }
    for x in (cx - radius..cx + radius).rev() {
        cells.push((x, cy + radius));
    }
    for y in (cy - radius + 1..cy + radius).rev() {
        cells.push((cx - radius, y));
    }
    cells
}

impl Lattice {
    /// Grow the lattice inside `rect`, committing the best crossing placement that starts within
    /// `rect` (enlarged by `options.margin`) until `options.max_words` have been added or
    /// `options.max_duration` has passed. When no crossing placement is left in view, an island is
    /// dropped instead; when there's no room for one either, we stop. Returns the placements added,
    /// in commit order.
    pub fn expand_region(&mut self, rect: Rect, options: &ExpandOptions) -> Result<Vec<Placement>> {
        if rect.is_inverted() {
            return Err(LatticeError::InvertedRect(rect));
        }

        let deadline = Instant::now() + options.max_duration;
        let area = rect.enlarged(options.margin);
        let mut added = vec![];

        while added.len() < options.max_words && Instant::now() < deadline {
            let anchors = self.frontier.within(&area);
            let placement = match self.best_option(&anchors, options.depth, Some(deadline))? {
                Some(option) => option.placement,
                None => {
                    if Instant::now() >= deadline {
                        break;
                    }
                    match self.find_island(&rect, Some(deadline)) {
                        Some(island) => {
                            debug!("nothing to cross in {:?}, dropping island {:?}", rect, island);
                            island
                        }
                        None => {
                            debug!("{:?} is full after {} new words", rect, added.len());
                            break;
                        }
                    }
                }
            };

            self.commit(placement.clone());
            added.push(placement);
        }

        debug!("expanded {:?} by {} words, {} in total", rect, added.len(), self.ledger.len());
        Ok(added)
    }

    /// Look for room to place a word that touches nothing, spiraling out from the center of
    /// `rect`. Each cell inside the rect is tried as a horizontal start, then a vertical one, and
    /// the first fit wins with the shortest live word that fits there (earliest in the dictionary
    /// among words of that length). Gives up once `deadline` passes.
    pub fn find_island(&self, rect: &Rect, deadline: Option<Instant>) -> Option<Placement> {
        if rect.is_inverted() {
            return None;
        }

        // The earliest live word of each length; a run of cells only needs checking against
        // lengths that have one.
        let mut first_by_length: SmallVec<[Option<WordId>; MAX_WORD_LENGTH + 1]> = SmallVec::new();
        for length in 0..=MAX_WORD_LENGTH {
            first_by_length.push(if length < MIN_WORD_LENGTH { None } else { self.index.first_of_length(length) });
        }
        if first_by_length.iter().all(Option::is_none) {
            trace!("no live words left for an island");
            return None;
        }

        let center = rect.center();
        let max_radius = (center.0 - rect.x0)
            .max(rect.x1 - center.0)
            .max(center.1 - rect.y0)
            .max(rect.y1 - center.1);
        trace!("searching {:?} for an island, up to {} rings around {:?}", rect, max_radius, center);

        let mut scanned = 0;
        for radius in 0..=max_radius {
            for cell in ring(center, radius) {
                if !rect.contains(cell) {
                    continue;
                }
                if scanned % INTERRUPT_FREQUENCY == 0 && deadline_passed(deadline) {
                    trace!("deadline passed after scanning {} cells for an island", scanned);
                    return None;
                }
                scanned += 1;

                for direction in [Direction::Horizontal, Direction::Vertical] {
                    if let Some(island) = self.island_at(rect, Anchor::at(cell, direction), &first_by_length) {
                        return Some(island);
                    }
                }
            }
        }

        None
    }

    /// A cell is clear if neither it nor the cells beside it (across `direction`) carry a letter.
    fn is_clear(&self, cell: Coord, direction: Direction) -> bool {
        !self.ledger.is_occupied(cell)
            && direction.beside(cell).iter().all(|&c| !self.ledger.is_occupied(c))
    }

    fn island_at(&self, rect: &Rect, anchor: Anchor, first_by_length: &[Option<WordId>]) -> Option<Placement> {
        let direction = anchor.direction;
        if !self.is_clear(anchor.cell_at(-1), direction) {
            return None;
        }

        for offset in 0..MAX_WORD_LENGTH {
            let cell = anchor.cell_at(offset as i32);
            if !rect.contains(cell)
                || self.blocked.contains(&Anchor::at(cell, direction))
                || !self.is_clear(cell, direction)
            {
                break;
            }

            let length = offset + 1;
            let id = match first_by_length.get(length).cloned().flatten() {
                Some(id) => id,
                None => continue,
            };
            if self.is_clear(anchor.cell_at(length as i32), direction) {
                return Some(Placement::new(&self.index.word(id).string, anchor.x, anchor.y, direction));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use instant::{Duration, Instant};

    use crate::config::{EngineOptions, ExpandOptions};
    use crate::engine::tests::{assert_invariants, init_logging, seeded, test_index};
    use crate::engine::Lattice;
    use crate::error::LatticeError;
    use crate::placement::{Direction::*, Placement, Rect};
    use crate::region::ring;
    use crate::word_index::WordIndex;

    fn unhurried(max_words: usize) -> ExpandOptions {
        ExpandOptions { max_words, max_duration: Duration::from_secs(30), ..ExpandOptions::default() }
    }

    #[test]
    fn test_ring_walks_the_perimeter() {
        assert_eq!(ring((0, 0), 0), vec![(0, 0)]);
        let cells = ring((0, 0), 1);
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], (-1, -1));
        assert!(!cells.contains(&(0, 0)));
        assert_eq!(ring((3, 3), 2).len(), 16);
    }

    /// Far away from everything, a single cell can hold neither a crossing nor an island.
    #[test]
    fn test_expand_tiny_empty_region_adds_nothing() {
        let mut lattice = seeded(EngineOptions::default());
        let added = lattice.expand_region(Rect::new(100, 100, 100, 100), &unhurried(20)).unwrap();
        assert!(added.is_empty());
        assert_eq!(lattice.placements().len(), 1);
    }

    #[test]
    fn test_expand_rejects_inverted_rect() {
        let mut lattice = seeded(EngineOptions::default());
        match lattice.expand_region(Rect::new(5, 0, 0, 5), &ExpandOptions::default()) {
            Err(LatticeError::InvertedRect(rect)) => assert_eq!(rect, Rect::new(5, 0, 0, 5)),
            other => panic!("expected InvertedRect, got {:?}", other),
        }
    }

    #[test]
    fn test_expand_respects_word_budget() {
        let mut lattice = seeded(EngineOptions::default());
        let added = lattice.expand_region(Rect::new(-5, -5, 15, 5), &unhurried(3)).unwrap();
        assert_eq!(added.len(), 3);
        assert_eq!(lattice.placements().len(), 4);
        assert_eq!(&lattice.placements()[1..], added.as_slice());
        assert_invariants(&lattice);
    }

    #[test]
    fn test_expand_with_no_time_adds_nothing() {
        let mut lattice = seeded(EngineOptions::default());
        let options = ExpandOptions { max_duration: Duration::from_millis(0), ..ExpandOptions::default() };
        assert!(lattice.expand_region(Rect::new(-5, -5, 15, 5), &options).unwrap().is_empty());
    }

    #[test]
    fn test_expand_without_island_room_stays_within_budget() {
        init_logging();
        // The only word is the seed itself, so there's nothing left to place anywhere.
        let index = WordIndex::from_words(["ab"]);
        let mut lattice = Lattice::new(index, "ab", (0, 0), Horizontal, EngineOptions::default()).unwrap();

        let budget = Duration::from_millis(50);
        let options = ExpandOptions { max_duration: budget, ..ExpandOptions::default() };
        let started = Instant::now();
        let added = lattice.expand_region(Rect::new(-100, -100, 100, 100), &options).unwrap();

        assert!(added.is_empty());
        assert!(started.elapsed() < budget * 10, "expansion took {:?}", started.elapsed());
    }

    #[test]
    fn test_deep_expansion_stays_within_budget() {
        let mut lattice = seeded(EngineOptions { branching: 6, ..EngineOptions::default() });
        lattice.generate(15, 0).unwrap();

        let budget = Duration::from_millis(50);
        let options = ExpandOptions { depth: 3, max_words: 1, max_duration: budget, ..ExpandOptions::default() };
        let started = Instant::now();
        let added = lattice.expand_region(Rect::new(-10, -10, 10, 10), &options).unwrap();

        assert!(added.len() <= 1);
        assert!(started.elapsed() < budget * 10, "expansion took {:?}", started.elapsed());
        assert_invariants(&lattice);
    }

    #[test]
    fn test_island_search_gives_up_at_deadline() {
        let lattice = Lattice::empty(test_index(), EngineOptions::default());
        let rect = Rect::new(-1000, -1000, 1000, 1000);

        assert!(lattice.find_island(&rect, None).is_some());
        assert_eq!(lattice.find_island(&rect, Some(Instant::now())), None);
    }

    #[test]
    fn test_expand_empty_lattice_starts_with_island() {
        init_logging();
        let mut lattice = Lattice::empty(test_index(), EngineOptions::default());
        let added = lattice.expand_region(Rect::new(0, 0, 9, 9), &unhurried(5)).unwrap();

        // The first three-letter word fits right at the center.
        assert_eq!(added[0], Placement::new("row", 4, 4, Horizontal));
        assert!(added.len() > 1);
        assert!(added[1].cells().iter().any(|&(cell, _)| added[0].covers(cell)));
        assert_invariants(&lattice);
    }

    #[test]
    fn test_island_keeps_a_buffer() {
        let lattice = seeded(EngineOptions::default());

        // Every cell of the row right under the seed touches it.
        assert_eq!(lattice.find_island(&Rect::new(0, 1, 8, 1), None), None);
        assert_eq!(lattice.find_island(&Rect::new(0, 0, 8, 0), None), None);
        // One row further down there's room.
        assert_eq!(lattice.find_island(&Rect::new(0, 2, 8, 2), None), Some(Placement::new("row", 4, 2, Horizontal)));
    }

    #[test]
    fn test_expansion_around_a_seed_stays_legal() {
        let mut lattice = seeded(EngineOptions::default());
        for rect in [Rect::new(-10, -10, 0, 0), Rect::new(0, 0, 10, 10), Rect::new(20, 20, 30, 30)] {
            lattice.expand_region(rect, &unhurried(6)).unwrap();
            assert_invariants(&lattice);
        }
    }
}
