//! Enumerating and scoring candidate placements. Scores come from the configured
//! `ScoringPolicy`, optionally extended by a bounded lookahead: speculatively commit the
//! candidate, follow the best few continuations a ply deeper, and roll back.

use instant::Instant;
use log::trace;
use smallvec::SmallVec;

use crate::engine::Lattice;
use crate::error::Result;
use crate::frontier::is_viable_start;
use crate::placement::{Anchor, Placement};
use crate::{INTERRUPT_FREQUENCY, MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// A legal placement along with its immediate score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOption {
    pub placement: Placement,
    pub intersections: usize,
    pub score: u32,
}

impl Lattice {
    /// Every legal crossing placement starting at `anchor`, shortest words first and in
    /// dictionary order within a length.
    ///
    /// We walk outward from the anchor one cell at a time, collecting the letters already on the
    /// grid as (offset, letter) constraints. A cell that's blocked, or that's empty but has a
    /// letter beside it, ends the walk, since no longer word could pass through it either. Each
    /// length is only worth querying if it crosses something, adds something, and doesn't end
    /// right before another letter.
    pub fn options_at(&self, anchor: &Anchor) -> Vec<PlacementOption> {
        let mut options = vec![];
        if !is_viable_start(&self.ledger, &self.blocked, anchor) {
            return options;
        }

        let direction = anchor.direction;
        let mut constraints: SmallVec<[(usize, char); MAX_WORD_LENGTH]> = SmallVec::new();

        for offset in 0..MAX_WORD_LENGTH {
            let cell = anchor.cell_at(offset as i32);
            if self.blocked.contains(&Anchor::at(cell, direction)) {
                break;
            }
            match self.ledger.letter_at(cell) {
                Some(letter) => constraints.push((offset, letter)),
                None => {
                    if direction.beside(cell).iter().any(|&c| self.ledger.is_occupied(c)) {
                        break;
                    }
                }
            }

            let length = offset + 1;
            if length < MIN_WORD_LENGTH || constraints.is_empty() || constraints.len() == length {
                continue;
            }
            if self.ledger.is_occupied(anchor.cell_at(length as i32)) {
                continue;
            }

            let score = self.options.scoring.score(length, constraints.len());
            for id in self.index.find_matching(&constraints, length, length) {
                options.push(PlacementOption {
                    placement: Placement::new(&self.index.word(id).string, anchor.x, anchor.y, direction),
                    intersections: constraints.len(),
                    score,
                });
            }
        }

        options
    }

    /// Every legal crossing placement on the whole frontier.
    pub fn all_options(&self) -> Vec<PlacementOption> {
        self.frontier.iter().flat_map(|anchor| self.options_at(anchor)).collect()
    }

    /// Like `all_options`, but gives up with whatever it has collected once `deadline` passes.
    fn options_until(&self, deadline: Option<Instant>) -> Vec<PlacementOption> {
        let mut options = vec![];
        for (idx, anchor) in self.frontier.iter().enumerate() {
            if idx % INTERRUPT_FREQUENCY == 0 && deadline_passed(deadline) {
                break;
            }
            options.extend(self.options_at(anchor));
        }
        options
    }

    /// Score `option` looking `depth` plies ahead. At depth 0 this is just its immediate score.
    /// Otherwise we commit it, rank every placement that would then be available, follow only
    /// the best `branching` of them one ply shallower, and add the best continuation's score
    /// (0 if there's nothing left to place). The lattice is restored before returning, whether
    /// or not the continuations could be scored.
    ///
    /// Once `deadline` passes, no further continuations are explored and the best total found so
    /// far is returned.
    pub fn lookahead(&mut self, option: &PlacementOption, depth: usize, deadline: Option<Instant>) -> Result<u32> {
        if depth == 0 || deadline_passed(deadline) {
            return Ok(option.score);
        }

        let checkpoint = self.snapshot();
        self.commit(option.placement.clone());
        let best_continuation = self.best_continuation(depth - 1, deadline);
        self.restore(checkpoint)?;
        let best_continuation = best_continuation?;

        trace!(
            "lookahead {:?} depth {}: {} + {}",
            option.placement, depth, option.score, best_continuation,
        );

        Ok(option.score + best_continuation)
    }

    /// The best lookahead total among the top `branching` placements available right now.
    fn best_continuation(&mut self, depth: usize, deadline: Option<Instant>) -> Result<u32> {
        let mut continuations = self.options_until(deadline);
        continuations.sort_by(|a, b| b.score.cmp(&a.score));
        continuations.truncate(self.options.branching);

        let mut best = 0;
        for continuation in &continuations {
            if deadline_passed(deadline) {
                trace!("deadline passed during lookahead at depth {}", depth);
                break;
            }
            best = best.max(self.lookahead(continuation, depth, deadline)?);
        }
        Ok(best)
    }

    /// Score every option at each of `anchors` and return the best one, with its total
    /// (lookahead-inclusive) score in `score`. Ties go to whichever option was seen first. If a
    /// deadline is given, it's checked every `INTERRUPT_FREQUENCY` anchors and before every
    /// lookahead, and we settle for the best option found so far once it passes.
    pub(crate) fn best_option(
        &mut self,
        anchors: &[Anchor],
        depth: usize,
        deadline: Option<Instant>,
    ) -> Result<Option<PlacementOption>> {
        let mut best: Option<PlacementOption> = None;

        for (idx, anchor) in anchors.iter().enumerate() {
            if idx % INTERRUPT_FREQUENCY == 0 && deadline_passed(deadline) {
                trace!("deadline passed after {} of {} anchors", idx, anchors.len());
                break;
            }

            for option in self.options_at(anchor) {
                if depth > 0 && deadline_passed(deadline) {
                    trace!("deadline passed while scoring anchor {} of {}", idx, anchors.len());
                    return Ok(best);
                }
                let score = self.lookahead(&option, depth, deadline)?;
                if best.as_ref().map(|b| score > b.score).unwrap_or(true) {
                    best = Some(PlacementOption { score, ..option });
                }
            }
        }

        Ok(best)
    }
}

pub(crate) fn deadline_passed(deadline: Option<Instant>) -> bool {
    deadline.map(|deadline| Instant::now() >= deadline).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use instant::{Duration, Instant};

    use crate::config::{EngineOptions, ScoringPolicy};
    use crate::engine::tests::{assert_invariants, seeded, test_index};
    use crate::engine::Lattice;
    use crate::placement::{Anchor, Direction::*, Placement};

    #[test]
    fn test_options_at_match_check_placement() {
        let mut lattice = seeded(EngineOptions::default());
        lattice.generate(4, 0).unwrap();

        let options = lattice.all_options();
        assert!(!options.is_empty());
        for option in &options {
            assert_eq!(lattice.check_placement(&option.placement), Ok(option.intersections));
            assert!(lattice.index().has_word(&option.placement.word));
        }
    }

    #[test]
    fn test_options_at_seed_column() {
        let lattice = seeded(EngineOptions::default());

        // Down from the "c" of "crossword": words starting with c.
        let words: Vec<String> = lattice.options_at(&Anchor::new(0, 0, Vertical)).into_iter()
            .map(|o| o.placement.word).collect();
        assert!(words.contains(&"cord".to_string()));
        assert!(words.contains(&"cross".to_string()));
        assert!(words.iter().all(|w| w.starts_with('c')));

        // Ending on the "d": words whose last letter is d, placed above it.
        let options = lattice.options_at(&Anchor::new(8, -3, Vertical));
        assert!(options.iter().any(|o| o.placement.word == "word"));
        assert!(options.iter().all(|o| o.intersections == 1 && o.score as usize == o.placement.len() + 1));

        // Right below the seed nothing can start.
        assert!(lattice.options_at(&Anchor::new(3, 1, Vertical)).is_empty());
    }

    #[test]
    fn test_scoring_policy_changes_scores() {
        let sum = seeded(EngineOptions::default());
        let product = seeded(EngineOptions { scoring: ScoringPolicy::Product, ..EngineOptions::default() });

        let anchor = Anchor::new(0, 0, Vertical);
        let sum_scores: Vec<u32> = sum.options_at(&anchor).iter().map(|o| o.score).collect();
        let product_scores: Vec<u32> = product.options_at(&anchor).iter().map(|o| o.score).collect();
        assert_eq!(sum_scores.len(), product_scores.len());
        for (s, p) in sum_scores.iter().zip(&product_scores) {
            // One intersection: length + 1 versus length × 1.
            assert_eq!(*s, *p + 1);
        }
    }

    #[test]
    fn test_lookahead_adds_best_continuation() {
        crate::engine::tests::init_logging();
        // Hanging "yak" off the "y" of "by" leaves exactly one continuation: "ka" across its "k".
        let index = crate::word_index::WordIndex::from_words(["bay", "yak", "ka"]);
        let mut lattice = Lattice::new(index, "by", (0, 0), Horizontal, EngineOptions::default()).unwrap();

        let option = lattice.options_at(&Anchor::new(1, 0, Vertical)).into_iter()
            .find(|o| o.placement.word == "yak")
            .expect("yak should hang off the y");
        assert_eq!(option.score, 4);

        let deep = lattice.lookahead(&option, 1, None).unwrap();
        // "ka" scores 2 + 1.
        assert_eq!(deep, 4 + 3);
        assert_invariants(&lattice);

        // Out of time, only the immediate score counts.
        assert_eq!(lattice.lookahead(&option, 1, Some(Instant::now())).unwrap(), 4);
        assert_eq!(lattice.placements().len(), 1);
    }

    #[test]
    fn test_deep_lookahead_stops_at_deadline() {
        let mut lattice = seeded(EngineOptions { branching: 6, ..EngineOptions::default() });
        lattice.generate(15, 0).unwrap();
        let before = lattice.view();
        let option = lattice.all_options().into_iter().next().unwrap();

        let budget = Duration::from_millis(50);
        let started = Instant::now();
        let score = lattice.lookahead(&option, 4, Some(started + budget)).unwrap();

        assert!(started.elapsed() < budget * 10, "lookahead took {:?}", started.elapsed());
        assert!(score >= option.score);
        assert_eq!(lattice.view(), before);
    }

    #[test]
    fn test_best_option_prefers_first_on_ties() {
        let mut lattice = Lattice::new(
            test_index(), "crossword", (0, 0), Horizontal, EngineOptions::default(),
        ).unwrap();
        let anchors: Vec<Anchor> = lattice.frontier().iter().cloned().collect();
        let best = lattice.best_option(&anchors, 0, None).unwrap().unwrap();

        let top = lattice.all_options().into_iter().map(|o| o.score).max().unwrap();
        assert_eq!(best.score, top);
        let first_top = lattice.all_options().into_iter().find(|o| o.score == top).unwrap();
        assert_eq!(best.placement, first_top.placement);
        assert_eq!(lattice.placements(), &[Placement::new("crossword", 0, 0, Horizontal)]);
    }
}
