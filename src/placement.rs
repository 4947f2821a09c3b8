use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt::{Debug, Display, Formatter};

use crate::MAX_WORD_LENGTH;

/// x and y coords for a cell in the grid. x grows to the right and y grows downward.
pub type Coord = (i32, i32);

/// Direction that a word runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    /// The other direction; crossing words always run perpendicular to the word they cross.
    pub fn perpendicular(self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }

    /// Unit step along this direction.
    pub fn step(self) -> Coord {
        match self {
            Direction::Horizontal => (1, 0),
            Direction::Vertical => (0, 1),
        }
    }

    /// The cell `offset` steps along this direction from `cell`.
    pub fn advance(self, cell: Coord, offset: i32) -> Coord {
        let (dx, dy) = self.step();
        (cell.0 + dx * offset, cell.1 + dy * offset)
    }

    /// The two cells beside `cell` across this direction (above/below for horizontal words,
    /// left/right for vertical ones).
    pub fn beside(self, cell: Coord) -> [Coord; 2] {
        let (px, py) = self.perpendicular().step();
        [(cell.0 - px, cell.1 - py), (cell.0 + px, cell.1 + py)]
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Horizontal => write!(f, "horizontal"),
            Direction::Vertical => write!(f, "vertical"),
        }
    }
}

/// A cell plus a direction. Frontier candidates ("a word of this direction could start here")
/// and blocked markers ("no word of this direction may start at or run through here") are both
/// anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Anchor {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

impl Anchor {
    pub fn new(x: i32, y: i32, direction: Direction) -> Anchor {
        Anchor { x, y, direction }
    }

    pub fn at(cell: Coord, direction: Direction) -> Anchor {
        Anchor { x: cell.0, y: cell.1, direction }
    }

    pub fn cell(&self) -> Coord {
        (self.x, self.y)
    }

    /// The cell `offset` steps from this anchor along its direction.
    pub fn cell_at(&self, offset: i32) -> Coord {
        self.direction.advance(self.cell(), offset)
    }
}

/// A word committed to the grid. Immutable once created.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub word: String,
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

impl Debug for Placement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let arrow = match self.direction {
            Direction::Horizontal => "→",
            Direction::Vertical => "↓",
        };
        write!(f, "{:?}@({}, {}){}", self.word, self.x, self.y, arrow)
    }
}

impl Placement {
    pub fn new(word: &str, x: i32, y: i32, direction: Direction) -> Placement {
        Placement { word: word.to_string(), x, y, direction }
    }

    pub fn anchor(&self) -> Anchor {
        Anchor::new(self.x, self.y, self.direction)
    }

    /// Length in chars, which is also the number of cells covered.
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    /// Generate the coords and letters of every cell this placement covers.
    pub fn cells(&self) -> SmallVec<[(Coord, char); MAX_WORD_LENGTH]> {
        let anchor = self.anchor();
        self.word
            .chars()
            .enumerate()
            .map(|(idx, letter)| (anchor.cell_at(idx as i32), letter))
            .collect()
    }

    /// Does this placement cover `cell`?
    pub fn covers(&self, cell: Coord) -> bool {
        let len = self.len() as i32;
        match self.direction {
            Direction::Horizontal => cell.1 == self.y && self.x <= cell.0 && cell.0 < self.x + len,
            Direction::Vertical => cell.0 == self.x && self.y <= cell.1 && cell.1 < self.y + len,
        }
    }
}

/// An inclusive rectangle of cells, as sent by a viewport client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// A rect is inverted if either of its max bounds is below the matching min bound.
    pub fn is_inverted(&self) -> bool {
        self.x1 < self.x0 || self.y1 < self.y0
    }

    pub fn contains(&self, cell: Coord) -> bool {
        self.x0 <= cell.0 && cell.0 <= self.x1 && self.y0 <= cell.1 && cell.1 <= self.y1
    }

    /// This rect grown by `margin` cells on every side.
    pub fn enlarged(&self, margin: i32) -> Rect {
        Rect::new(self.x0 - margin, self.y0 - margin, self.x1 + margin, self.y1 + margin)
    }

    /// The center cell, rounding toward the min corner.
    pub fn center(&self) -> Coord {
        (
            self.x0 + (self.x1 - self.x0) / 2,
            self.y0 + (self.y1 - self.y0) / 2,
        )
    }

    /// Does `placement` lie inside this rect with room to spare after its last letter? The cell
    /// just past the end has to be inside too, so a word running right up to the far edge doesn't
    /// count.
    pub fn contains_placement(&self, placement: &Placement) -> bool {
        let anchor = placement.anchor();
        self.contains(anchor.cell()) && self.contains(anchor.cell_at(placement.len() as i32))
    }
}

#[cfg(test)]
mod tests {
    use crate::placement::{Anchor, Direction, Placement, Rect};

    #[test]
    fn test_cells_follow_direction() {
        let across = Placement::new("cat", 2, -1, Direction::Horizontal);
        let cells: Vec<_> = across.cells().into_iter().collect();
        assert_eq!(cells, vec![((2, -1), 'c'), ((3, -1), 'a'), ((4, -1), 't')]);

        let down = Placement::new("dog", 0, 5, Direction::Vertical);
        let cells: Vec<_> = down.cells().into_iter().map(|(cell, _)| cell).collect();
        assert_eq!(cells, vec![(0, 5), (0, 6), (0, 7)]);

        assert!(down.covers((0, 7)));
        assert!(!down.covers((0, 8)));
        assert!(!down.covers((1, 6)));
    }

    #[test]
    fn test_cells_count_chars_not_bytes() {
        let placement = Placement::new("кот", 0, 0, Direction::Horizontal);
        assert_eq!(placement.len(), 3);
        assert_eq!(placement.cells()[2], ((2, 0), 'т'));
    }

    #[test]
    fn test_beside_is_perpendicular() {
        assert_eq!(Direction::Horizontal.beside((3, 3)), [(3, 2), (3, 4)]);
        assert_eq!(Direction::Vertical.beside((3, 3)), [(2, 3), (4, 3)]);
        assert_eq!(Anchor::new(1, 1, Direction::Vertical).cell_at(-1), (1, 0));
    }

    #[test]
    fn test_rect_geometry() {
        let rect = Rect::new(-4, -2, 5, 3);
        assert!(!rect.is_inverted());
        assert!(Rect::new(1, 0, 0, 0).is_inverted());
        assert_eq!(rect.center(), (0, 0));
        assert_eq!(rect.enlarged(2), Rect::new(-6, -4, 7, 5));
        assert!(rect.contains_placement(&Placement::new("abc", 2, 3, Direction::Horizontal)));
        // Ending exactly on the right edge is one cell too far.
        assert!(!rect.contains_placement(&Placement::new("abcd", 2, 3, Direction::Horizontal)));
        assert!(rect.contains_placement(&Placement::new("ab", 5, -2, Direction::Vertical)));
        assert!(!rect.contains_placement(&Placement::new("abcdef", 5, -2, Direction::Vertical)));
    }
}
