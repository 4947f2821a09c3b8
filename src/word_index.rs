use bit_set::BitSet;
use log::warn;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::{MAX_WORD_LENGTH, MIN_WORD_LENGTH};

/// An identifier for a given word, based on its index in the WordTable's `words` field. Lower ids
/// came earlier in the source dictionary.
pub type WordId = usize;

/// A dictionary entry, normalized to lowercase.
#[derive(Debug, Clone)]
pub struct Word {
    pub string: String,
    pub letters: SmallVec<[char; MAX_WORD_LENGTH]>,
}

impl Word {
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// Trim and lowercase a raw dictionary entry, or explain why it can't be used.
pub fn normalize_word(raw: &str) -> Result<String, &'static str> {
    let word = raw.trim().to_lowercase();
    let len = word.chars().count();

    if len < MIN_WORD_LENGTH {
        return Err("too short");
    }
    if len > MAX_WORD_LENGTH {
        return Err("too long");
    }
    if !word.chars().all(char::is_alphabetic) {
        return Err("contains non-letters");
    }

    Ok(word)
}

/// The immutable part of the word index: every dictionary word plus inverted indexes by length
/// and by (offset, letter). Built once and shared between sessions.
pub struct WordTable {
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,

    /// `ids_by_length[n]` lists the ids of all words with n letters, in dictionary order.
    ids_by_length: Vec<Vec<WordId>>,

    /// `ids_by_letter[offset][letter]` lists the ids of all words with `letter` at `offset`, in
    /// dictionary order.
    ids_by_letter: Vec<HashMap<char, Vec<WordId>>>,
}

impl Debug for WordTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordTable")
            .field("words", &(["(", &self.words.len().to_string(), " entries)"].join("")))
            .finish()
    }
}

impl WordTable {
    /// Build a table from raw dictionary entries. Entries that don't normalize to a usable word
    /// are skipped, and repeated entries keep their first position.
    pub fn new<I, S>(raw_words: I) -> WordTable
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        let mut table = WordTable {
            words: vec![],
            ids_by_string: HashMap::new(),
            ids_by_length: (0..=MAX_WORD_LENGTH).map(|_| vec![]).collect(),
            ids_by_letter: (0..MAX_WORD_LENGTH).map(|_| HashMap::new()).collect(),
        };

        for raw in raw_words {
            let raw = raw.as_ref();
            if raw.trim().is_empty() {
                continue;
            }

            let string = match normalize_word(raw) {
                Ok(string) => string,
                Err(reason) => {
                    warn!("skipping dictionary entry {:?}: {}", raw, reason);
                    continue;
                }
            };
            if table.ids_by_string.contains_key(&string) {
                continue;
            }

            let id = table.words.len();
            let letters: SmallVec<[char; MAX_WORD_LENGTH]> = string.chars().collect();

            table.ids_by_length[letters.len()].push(id);
            for (offset, &letter) in letters.iter().enumerate() {
                table.ids_by_letter[offset].entry(letter).or_insert_with(|| vec![]).push(id);
            }
            table.ids_by_string.insert(string.clone(), id);
            table.words.push(Word { string, letters });
        }

        table
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn word(&self, id: WordId) -> &Word {
        &self.words[id]
    }

    pub fn id_of(&self, string: &str) -> Option<WordId> {
        self.ids_by_string.get(string).cloned()
    }
}

/// A word table plus the per-session record of which words are still available. Words are never
/// removed from the underlying indexes; taking a word just clears its liveness bit, and queries
/// skip dead words.
#[derive(Clone)]
pub struct WordIndex {
    table: Arc<WordTable>,
    live: BitSet,
}

impl Debug for WordIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordIndex")
            .field("words", &self.table.len())
            .field("live", &self.live.len())
            .finish()
    }
}

impl WordIndex {
    /// A fresh index over `table` with every word available.
    pub fn new(table: Arc<WordTable>) -> WordIndex {
        let live = (0..table.len()).collect();
        WordIndex { table, live }
    }

    pub fn from_words<I, S>(raw_words: I) -> WordIndex
        where
            I: IntoIterator<Item=S>,
            S: AsRef<str>,
    {
        WordIndex::new(Arc::new(WordTable::new(raw_words)))
    }

    pub fn table(&self) -> &Arc<WordTable> {
        &self.table
    }

    pub fn word(&self, id: WordId) -> &Word {
        self.table.word(id)
    }

    pub fn id_of(&self, string: &str) -> Option<WordId> {
        self.table.id_of(string)
    }

    pub fn is_live(&self, id: WordId) -> bool {
        self.live.contains(id)
    }

    /// Is `string` in the dictionary and still available?
    pub fn has_word(&self, string: &str) -> bool {
        self.id_of(string).map(|id| self.is_live(id)).unwrap_or(false)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// All live words with exactly `length` letters, in dictionary order.
    pub fn words_of_length(&self, length: usize) -> Vec<WordId> {
        match self.table.ids_by_length.get(length) {
            Some(ids) => ids.iter().cloned().filter(|&id| self.is_live(id)).collect(),
            None => vec![],
        }
    }

    /// The earliest live word with exactly `length` letters, if any.
    pub fn first_of_length(&self, length: usize) -> Option<WordId> {
        self.table.ids_by_length.get(length)?.iter().cloned().find(|&id| self.is_live(id))
    }

    /// All live words whose length is in `min_length..=max_length` and which have the required
    /// letter at every constrained offset, in dictionary order. We start from the smallest
    /// (offset, letter) bucket so the cost tracks the rarest constraint rather than the size of
    /// the dictionary.
    pub fn find_matching(
        &self,
        constraints: &[(usize, char)],
        min_length: usize,
        max_length: usize,
    ) -> Vec<WordId> {
        let max_length = max_length.min(MAX_WORD_LENGTH);
        if min_length > max_length {
            return vec![];
        }

        if constraints.is_empty() {
            let mut result: Vec<WordId> =
                (min_length..=max_length).flat_map(|length| self.words_of_length(length)).collect();
            result.sort_unstable();
            return result;
        }

        let mut smallest_bucket: Option<&Vec<WordId>> = None;
        for &(offset, letter) in constraints {
            let bucket = match self.table.ids_by_letter.get(offset).and_then(|b| b.get(&letter)) {
                Some(bucket) => bucket,
                None => return vec![],
            };
            if smallest_bucket.map(|smallest| bucket.len() < smallest.len()).unwrap_or(true) {
                smallest_bucket = Some(bucket);
            }
        }

        let bucket = match smallest_bucket {
            Some(bucket) => bucket,
            None => return vec![],
        };

        bucket.iter().cloned().filter(|&id| {
            if !self.is_live(id) {
                return false;
            }
            let word = self.table.word(id);
            word.len() >= min_length && word.len() <= max_length &&
                constraints.iter().all(|&(offset, letter)| word.letters.get(offset) == Some(&letter))
        }).collect()
    }

    /// Mark a word as used. Returns false if it was already unavailable.
    pub fn remove_word(&mut self, id: WordId) -> bool {
        self.live.remove(id)
    }

    /// Make a used word available again. Returns false if it was already available.
    pub fn restore_word(&mut self, id: WordId) -> bool {
        id < self.table.len() && self.live.insert(id)
    }

    pub fn snapshot_liveness(&self) -> BitSet {
        self.live.clone()
    }

    pub fn restore_liveness(&mut self, snapshot: BitSet) {
        self.live = snapshot;
    }
}
