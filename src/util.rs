use smallvec::SmallVec;

use crate::types::GlobalWordId;
use crate::word_list::WordList;
use crate::MAX_GLYPH_COUNT;

/// Number of occurrences of each glyph at a single cell of a slot, across a set of candidate
/// words. Indexed by `GlyphId`.
pub type GlyphCounts = SmallVec<[u32; MAX_GLYPH_COUNT]>;

/// Count how many of the given candidate words place each glyph in the given cell. Words too
/// short to reach the cell contribute nothing.
#[must_use]
pub fn build_glyph_counts_at_cell(
    word_list: &WordList,
    cell_idx: usize,
    options: &[GlobalWordId],
) -> GlyphCounts {
    let mut result: GlyphCounts = (0..word_list.glyphs.len()).map(|_| 0).collect();

    for &(length, word_id) in options {
        let word = &word_list.words[length][word_id];
        if let Some(&glyph) = word.glyphs.get(cell_idx) {
            result[glyph] += 1;
        }
    }

    result
}
