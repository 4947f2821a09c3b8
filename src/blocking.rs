use std::collections::HashSet;

use crate::placement::{Anchor, Direction, Placement};

/// Generate the blocked markers implied by a placement:
/// * both caps (the cell just before the first letter and just after the last) are blocked in
///   both directions, so nothing can extend the word or touch its ends;
/// * every covered cell, and the cells directly beside it, are blocked for the placement's own
///   direction, so no parallel word can start in, overlap, or run alongside it.
///
/// Crossing words are unaffected by the covered cells since those are only blocked for the
/// placement's own direction.
pub fn markers_for(placement: &Placement) -> Vec<Anchor> {
    let anchor = placement.anchor();
    let direction = placement.direction;
    let len = placement.len() as i32;

    let mut markers = Vec::with_capacity(4 + 3 * placement.len());
    for cap in [anchor.cell_at(-1), anchor.cell_at(len)] {
        markers.push(Anchor::at(cap, Direction::Horizontal));
        markers.push(Anchor::at(cap, Direction::Vertical));
    }
    for offset in 0..len {
        let cell = anchor.cell_at(offset);
        let [before, after] = direction.beside(cell);
        markers.push(Anchor::at(before, direction));
        markers.push(Anchor::at(cell, direction));
        markers.push(Anchor::at(after, direction));
    }

    markers
}

/// The set of blocked markers accumulated from every committed placement. During forward
/// generation it only grows; markers are only removed when a commit is rolled back.
#[derive(Debug, Clone, Default)]
pub struct BlockedSet {
    markers: HashSet<Anchor>,
}

impl BlockedSet {
    pub fn new() -> BlockedSet {
        BlockedSet::default()
    }

    pub fn contains(&self, anchor: &Anchor) -> bool {
        self.markers.contains(anchor)
    }

    /// Returns true if the marker wasn't already present.
    pub fn insert(&mut self, anchor: Anchor) -> bool {
        self.markers.insert(anchor)
    }

    pub fn remove(&mut self, anchor: &Anchor) -> bool {
        self.markers.remove(anchor)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item=&Anchor> {
        self.markers.iter()
    }
}
