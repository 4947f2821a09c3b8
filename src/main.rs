use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use xword_lattice::{
    render_grid, Direction, EngineOptions, ExpandOptions, Rect, ScoringPolicy, SessionStore,
    WordTable, DEFAULT_BRANCHING, DEFAULT_REGION_MARGIN,
};

/// Grow a crossword-style word lattice from a seed word and print it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Dictionary file: one word per line, anything after a `,` or `;` (e.g. a score) is ignored.
    dictionary: PathBuf,

    /// Word to start from.
    #[arg(long, default_value = "crossword")]
    seed: String,

    /// Place the seed vertically instead of horizontally.
    #[arg(long)]
    vertical: bool,

    /// How many words to generate.
    #[arg(long, default_value_t = 30)]
    count: usize,

    /// Lookahead depth used to score candidates.
    #[arg(long, default_value_t = 0)]
    depth: usize,

    /// How many continuations each lookahead ply follows.
    #[arg(long, default_value_t = DEFAULT_BRANCHING)]
    branching: usize,

    /// Allow the same word to be placed more than once.
    #[arg(long)]
    allow_repeats: bool,

    /// `sum` (length + intersections) or `product` (length × intersections).
    #[arg(long, default_value = "sum")]
    scoring: ScoringPolicy,

    /// Instead of generating globally, expand the rectangle X0 Y0 X1 Y1.
    #[arg(long, num_args = 4, value_names = ["X0", "Y0", "X1", "Y1"], allow_hyphen_values = true)]
    expand: Option<Vec<i32>>,

    /// Time budget for `--expand`, in milliseconds.
    #[arg(long, default_value_t = 200)]
    expand_ms: u64,

    /// Cells around the `--expand` rectangle whose frontier candidates are also considered.
    #[arg(long, default_value_t = DEFAULT_REGION_MARGIN, allow_hyphen_values = true)]
    margin: i32,

    /// Print the placements, frontier and blocked markers as JSON instead of a grid.
    #[arg(long)]
    json: bool,
}

fn load_dictionary(path: &Path) -> anyhow::Result<Vec<String>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("couldn't read dictionary {}", path.display()))?;

    Ok(contents
        .lines()
        .filter_map(|line| line.split(|c| c == ',' || c == ';').next())
        .map(|word| word.trim().to_string())
        .filter(|word| !word.is_empty())
        .collect())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let table = WordTable::new(load_dictionary(&args.dictionary)?);
    if table.is_empty() {
        bail!("no usable words in {}", args.dictionary.display());
    }
    info!("loaded {} words from {}", table.len(), args.dictionary.display());

    let options = EngineOptions {
        allow_repeats: args.allow_repeats,
        scoring: args.scoring,
        branching: args.branching,
    };
    let direction = if args.vertical { Direction::Vertical } else { Direction::Horizontal };

    let mut store = SessionStore::new(Arc::new(table));
    let session = store.create_session(&args.seed, (0, 0), direction, options)?;

    let added = match &args.expand {
        Some(bounds) => {
            let rect = Rect::new(bounds[0], bounds[1], bounds[2], bounds[3]);
            let expand_options = ExpandOptions {
                depth: args.depth,
                max_words: args.count,
                max_duration: instant::Duration::from_millis(args.expand_ms),
                margin: args.margin,
            };
            store.expand_region(session, rect, &expand_options)?
        }
        None => store.generate_words(session, args.count, args.depth)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&store.snapshot_view(session)?)?);
    } else {
        let lattice = store.lattice(session)?;
        println!("{}", render_grid(lattice));
        println!(
            "{} words added, {} placed, {} frontier candidates",
            added.len(),
            lattice.placements().len(),
            lattice.frontier().len(),
        );
    }

    Ok(())
}
