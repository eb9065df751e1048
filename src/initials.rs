use compact_str::CompactString;
use smallvec::smallvec;
use unicode_segmentation::UnicodeSegmentation;

use crate::utils::join_words;
use crate::WordList;

/// Abbreviate a first name to its initial, as in "Roland" to "R.".
///
/// Names of at most two characters are already no longer than an initial,
/// and names opening with a control sequence have no plain first letter to
/// keep; both pass through unchanged, which also makes abbreviation
/// idempotent.
pub(crate) fn abbreviate_word(word: &str) -> CompactString {
    if word.chars().count() <= 2 || word.starts_with("{\\") {
        return word.into();
    }
    // The initial is a grapheme cluster, not a char, so a combining accent
    // stays attached to its letter.
    match word.graphemes(true).next() {
        Some(initial) => {
            let mut out = CompactString::from(initial);
            out.push('.');
            out
        }
        None => word.into(),
    }
}

/// Abbreviate a whole first-name part into at most one word.
///
/// Multi-word first names are joined before abbreviating, so "Juan Carlos"
/// becomes the single word "J.".
pub(crate) fn abbreviate(first: &[CompactString]) -> WordList {
    if first.is_empty() {
        return WordList::new();
    }
    smallvec![abbreviate_word(&join_words(first))]
}
