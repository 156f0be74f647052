use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use unicode_normalization::UnicodeNormalization;

use crate::types::{GlobalWordId, GlyphId, WordId};
use crate::{MAX_GLYPH_COUNT, MAX_SLOT_LENGTH};

/// A struct representing a word in the word list.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid -- only lowercase letters or other valid glyphs.
    pub normalized_string: String,

    /// The word as it appears in the user's word list, with arbitrary formatting.
    pub canonical_string: String,

    /// The glyph ids making up `normalized_string`.
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

/// Given a canonical word string from a vocabulary file, turn it into the normalized form we'll
/// use in the actual fill engine.
#[must_use]
pub fn normalize_word(canonical: &str) -> String {
    canonical
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordListError {
    InvalidPath(String),
    InvalidWord(String),
}

impl fmt::Display for WordListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            WordListError::InvalidPath(path) => format!("Can’t read file: “{path}”"),
            WordListError::InvalidWord(word) => {
                format!("Word list contains invalid word: “{word}”")
            }
        };
        write!(f, "{string}")
    }
}

/// A struct representing the loaded vocabulary. This is static regardless of grid geometry or our
/// progress through a fill; each slot's domain is a subset of these words identified by
/// `GlobalWordId`.
pub struct WordList {
    /// A list of all characters that occur in any (normalized) word. `GlyphId`s used everywhere
    /// else are indices into this list.
    pub glyphs: SmallVec<[char; MAX_GLYPH_COUNT]>,

    /// The inverse of `glyphs`: a map from a character to the `GlyphId` representing it.
    pub glyph_id_by_char: HashMap<char, GlyphId>,

    /// A list of all loaded words, bucketed by length. An index into `words` is the length of the
    /// words in the bucket, so `words[0]` is always an empty vec.
    pub words: Vec<Vec<Word>>,

    /// A map from a normalized string to the id of the `Word` representing it.
    pub word_id_by_string: HashMap<String, WordId>,
}

impl WordList {
    /// Construct a `WordList` from in-memory entries. Duplicate words (after normalization) are
    /// collapsed into a single entry.
    pub fn from_words<S: AsRef<str>>(raw_words: &[S]) -> Result<WordList, WordListError> {
        let mut instance = WordList {
            glyphs: smallvec![],
            glyph_id_by_char: HashMap::new(),
            words: vec![vec![]],
            word_id_by_string: HashMap::new(),
        };

        for raw_word in raw_words {
            instance.add_word(raw_word.as_ref())?;
        }

        Ok(instance)
    }

    /// Construct a `WordList` from the contents of a vocabulary file, one word per line. Blank
    /// lines are skipped.
    pub fn from_file_contents(contents: &str) -> Result<WordList, WordListError> {
        let raw_words: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        WordList::from_words(&raw_words)
    }

    /// Add a single word to the list, registering any new glyphs. No-op if the word is already
    /// present.
    fn add_word(&mut self, canonical: &str) -> Result<GlobalWordId, WordListError> {
        let normalized = normalize_word(canonical);
        if normalized.is_empty() {
            return Err(WordListError::InvalidWord(canonical.into()));
        }

        if let Some(&word_id) = self.word_id_by_string.get(&normalized) {
            return Ok((normalized.chars().count(), word_id));
        }

        let glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]> = normalized
            .chars()
            .map(|c| self.glyph_id_for_char(c))
            .collect();

        let word_length = glyphs.len();

        while self.words.len() < word_length + 1 {
            self.words.push(vec![]);
        }

        let word_id = self.words[word_length].len();

        self.words[word_length].push(Word {
            normalized_string: normalized.clone(),
            canonical_string: canonical.into(),
            glyphs,
        });

        self.word_id_by_string.insert(normalized, word_id);

        Ok((word_length, word_id))
    }

    /// Borrow an existing word using its global id.
    #[must_use]
    pub fn get_word(&self, global_word_id: GlobalWordId) -> &Word {
        &self.words[global_word_id.0][global_word_id.1]
    }

    /// The total number of words in the list, across all length buckets.
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.words.iter().map(Vec::len).sum()
    }

    /// What's the unique glyph id for the given char? We do this lazily, instead of just mapping
    /// every letter up front, because word list entries may also contain numbers, non-English
    /// letters, or punctuation.
    pub fn glyph_id_for_char(&mut self, ch: char) -> GlyphId {
        self.glyph_id_by_char.get(&ch).copied().unwrap_or_else(|| {
            self.glyphs.push(ch);
            let id = self.glyphs.len() - 1;
            self.glyph_id_by_char.insert(ch, id);
            id
        })
    }
}

impl Debug for WordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordList")
            .field("glyphs", &self.glyphs)
            .field(
                "words",
                &self.words.iter().map(Vec::len).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub mod tests {
    use crate::word_list::{normalize_word, WordList, WordListError};

    #[test]
    fn test_loads_words_into_length_buckets() {
        let word_list =
            WordList::from_words(&["cat", "car", "arm", "skate"]).expect("valid word list");

        assert_eq!(
            word_list.words.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![0, 0, 0, 3, 0, 1]
        );

        let &word_id = word_list
            .word_id_by_string
            .get("skate")
            .expect("word list should include 'skate'");

        let word = &word_list.words[5][word_id];
        assert_eq!(word.normalized_string, "skate");
        assert_eq!(word.canonical_string, "skate");
        assert_eq!(word.glyphs.len(), 5);
    }

    #[test]
    fn test_normalization_lowercases_and_strips_whitespace() {
        assert_eq!(normalize_word("CAT"), "cat");
        assert_eq!(normalize_word("ice cream"), "icecream");
    }

    #[test]
    fn test_duplicate_words_are_collapsed() {
        let word_list = WordList::from_words(&["cat", "CAT", "Cat"]).expect("valid word list");

        assert_eq!(word_list.word_count(), 1);
    }

    #[test]
    fn test_rejects_empty_word() {
        let result = WordList::from_words(&["cat", "   "]);

        assert_eq!(result.err(), Some(WordListError::InvalidWord("   ".into())));
    }

    #[test]
    fn test_from_file_contents_skips_blank_lines() {
        let word_list =
            WordList::from_file_contents("cat\n\ncar\n  \narm\n").expect("valid word list");

        assert_eq!(word_list.word_count(), 3);
        assert!(word_list.word_id_by_string.contains_key("arm"));
    }

    #[test]
    #[allow(clippy::unicode_not_nfc)]
    fn test_unusual_characters() {
        let word_list = WordList::from_words(&[
            // Non-English character expressed as one two-byte `char`
            "monsutâ",
            // Non-English character expressed as two chars w/ combining form
            "hélen",
        ])
        .expect("valid word list");

        assert_eq!(
            word_list.words.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![0, 0, 0, 0, 0, 1, 0, 1]
        );
    }
}
