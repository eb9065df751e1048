use std::borrow::Cow;

use compact_str::CompactString;

/// Join words with single spaces, borrowing when no join is needed.
pub(crate) fn join_words(words: &[CompactString]) -> Cow<'_, str> {
    match words {
        [] => Cow::Borrowed(""),
        [word] => Cow::Borrowed(word.as_str()),
        _ => Cow::Owned(words.join(" ")),
    }
}

/// Whether the string is a single brace group: it opens at the first
/// character and that brace's match is the final character.
pub(crate) fn enclosed_in_braces(s: &str) -> bool {
    if !s.starts_with('{') {
        return false;
    }
    let mut depth = 0i32;
    let mut closed = false;
    for c in s.chars() {
        if closed {
            // The opening brace matched before the final character.
            return false;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    closed = true;
                }
            }
            _ => {}
        }
    }
    closed
}

/// Remove every brace, keeping the remaining characters intact.
pub(crate) fn strip_braces(s: &str) -> Cow<'_, str> {
    if s.contains(['{', '}']) {
        Cow::Owned(s.chars().filter(|c| !matches!(c, '{' | '}')).collect())
    } else {
        Cow::Borrowed(s)
    }
}
