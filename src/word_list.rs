use std::collections::HashMap;
use std::fs;
use std::path::Path;

use smallvec::SmallVec;
use tracing::debug;

use crate::error::{Error, Result};
use crate::{WordId, MAX_SLOT_LENGTH};

/// A struct representing a word that can be chosen for a given slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    fn new(string: String) -> Word {
        let chars = string.chars().collect();
        Word { string, chars }
    }

    /// Length in characters, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The character at the given cell index, or `None` if the word is too short to reach it.
    pub fn char_at(&self, cell_idx: usize) -> Option<char> {
        self.chars.get(cell_idx).copied()
    }
}

/// The vocabulary available for filling a grid. Words are trimmed and upper-cased, blank lines
/// are dropped, and duplicates collapse into a single entry, so each distinct word has exactly
/// one `WordId`. Ids follow first-seen order.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<Word>,
    ids_by_string: HashMap<String, WordId>,
}

impl WordList {
    pub fn new<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut word_list = WordList::default();

        for raw in words {
            let normalized = raw.as_ref().trim().to_uppercase();
            if normalized.is_empty() || word_list.ids_by_string.contains_key(&normalized) {
                continue;
            }

            word_list.ids_by_string.insert(normalized.clone(), word_list.words.len());
            word_list.words.push(Word::new(normalized));
        }

        word_list
    }

    /// Load a word list with one word per line.
    pub fn from_file(path: impl AsRef<Path>) -> Result<WordList> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let word_list = WordList::new(contents.lines());
        debug!(path = %path.display(), words = word_list.len(), "loaded word list");

        Ok(word_list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Panics if `word_id` didn't come from this list.
    pub fn get(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    /// Look up the id of a word, applying the same normalization used when loading.
    pub fn id_of(&self, word: &str) -> Option<WordId> {
        self.ids_by_string.get(&word.trim().to_uppercase()).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WordId, &Word)> {
        self.words.iter().enumerate()
    }
}
