/// An identifier for a letter or symbol, based on its index in the `WordList`'s `glyphs` field.
pub type GlyphId = usize;

/// An identifier for a word within one of the `WordList`'s length buckets. Only meaningful
/// together with the bucket's length.
pub type WordId = usize;

/// An identifier that fully specifies a word: its length (bucket index) plus its `WordId`.
/// Domains and assignments use this form so that words of every length can mix freely before
/// node consistency has pruned by length.
pub type GlobalWordId = (usize, WordId);
