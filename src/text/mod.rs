//! Transcript post-processing: the normalization pipeline and the user
//! vocabulary feeding it.
//!
//! Everything here is pure given its inputs — the orchestrator snapshots the
//! active vocabulary rules and the relevant settings per episode and calls
//! [`normalize`] on the transcript before injection.

pub mod normalize;
pub mod vocabulary;

pub use normalize::{
    apply_vocabulary, collapse_whitespace, convert_punctuation, normalize, space_cjk_latin,
    NormalizeOptions, PunctuationStyle,
};
pub use vocabulary::{VocabularyEntry, VocabularyLibrary};
