//! Incremental construction of crossword-style word lattices on an unbounded grid.
//!
//! A `Lattice` starts from a seed word and grows by repeatedly choosing a frontier position and a
//! dictionary word that crosses letters already on the grid. Generation can run globally
//! (`Lattice::generate`) or restricted to a viewport rectangle (`Lattice::expand_region`), and a
//! `SessionStore` keeps independent lattices alive for a client that pans around the grid.

use instant::Duration;

pub mod blocking;
pub mod config;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod ledger;
pub mod placement;
pub mod region;
pub mod search;
pub mod session;
pub mod view;
pub mod word_index;

pub use config::{EngineOptions, ExpandOptions, ScoringPolicy};
pub use engine::{Lattice, Snapshot};
pub use error::{LatticeError, Result};
pub use placement::{Anchor, Coord, Direction, Placement, Rect};
pub use session::{SessionId, SessionStore};
pub use view::{render_grid, SnapshotView};
pub use word_index::{WordId, WordIndex, WordTable};

/// The longest word we'll ever place. This also bounds how far before a placed word a crossing
/// word's first letter can sit.
pub const MAX_WORD_LENGTH: usize = 10;

/// The shortest word we'll accept into the dictionary.
pub const MIN_WORD_LENGTH: usize = 2;

/// How many continuations the lookahead search explores at each ply.
pub const DEFAULT_BRANCHING: usize = 3;

/// How many cells we add around an expansion rectangle when collecting frontier candidates.
pub const DEFAULT_REGION_MARGIN: i32 = 2;

/// How many placements a single expansion may commit by default.
pub const DEFAULT_EXPAND_WORDS: usize = 20;

/// How many frontier candidates we scan between deadline checks.
pub const INTERRUPT_FREQUENCY: usize = 16;

/// How long a session may sit idle before `SessionStore::sweep_expired` reclaims it.
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(60 * 60);

/// Default wall-clock budget for a single expansion.
pub const DEFAULT_EXPAND_DURATION: Duration = Duration::from_millis(200);
