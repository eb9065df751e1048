use std::collections::{HashMap, HashSet};

use compact_str::CompactString;
use smallvec::{smallvec, SmallVec};

use crate::initials::abbreviate_word;
use crate::utils::{enclosed_in_braces, join_words, strip_braces};
use crate::{Name, WordList};

/// Registry of names whose shape the splitter alone cannot recover.
///
/// Two sources feed it. Explicit overrides come from configuration and map
/// a whole name string to its replacement. Mined names come from the
/// bibliography itself: a name already written with a brace-protected last
/// name, like "Manuel {Ojeda Aciego}", registers its last-name words, so a
/// later occurrence written without braces resolves to the protected form.
#[derive(Debug, Clone, Default)]
pub struct SpecialNames {
    /// Replacement strings looked up by the name with all braces removed.
    overrides: HashMap<String, String>,
    /// Mined names keyed by their last-name words.
    by_last: HashMap<WordList, Name>,
    /// Proper suffixes of every multi-word key in `by_last`.
    partial: HashSet<WordList>,
}

impl SpecialNames {
    pub fn new() -> SpecialNames {
        SpecialNames::default()
    }

    /// Register a pre-formatted replacement for a name.
    ///
    /// Input names are matched against `name` with all braces removed, so
    /// "Manuel Ojeda Aciego" covers "Manuel {Ojeda Aciego}" as well.
    pub fn insert_override(
        &mut self,
        name: impl Into<String>,
        replacement: impl Into<String>,
    ) {
        self.overrides.insert(name.into(), replacement.into());
    }

    pub(crate) fn override_for(&self, name: &str) -> Option<&str> {
        self.overrides
            .get(strip_braces(name).as_ref())
            .map(String::as_str)
    }

    /// Learn a special name from a name occurring in the corpus.
    ///
    /// A brace-enclosed last name registers under its inner words. A von
    /// part written like "{O}jeda" registers a second key joining the
    /// reconstructed von words with the last-name words, so the same person
    /// written entirely without braces is still recognized.
    pub fn learn(&mut self, name: &Name) {
        if name.last.is_empty() {
            return;
        }

        let last = join_words(&name.last);
        let mut key_last = name.last.clone();
        if enclosed_in_braces(&last) {
            let inner = &last[1..last.len() - 1];
            key_last = inner.split_whitespace().map(CompactString::from).collect();
            self.register(key_last.clone(), name.clone());
        }

        if name.von.is_empty() {
            return;
        }
        if let Some(mut key) = braced_initial_words(&join_words(&name.von)) {
            key.extend(key_last.iter().cloned());
            self.register(key, name.clone());
        }
    }

    fn register(&mut self, key: WordList, name: Name) {
        for i in 1..key.len() {
            self.partial.insert(key[i..].iter().cloned().collect());
        }
        self.by_last.insert(key, name);
    }

    /// Find the registered name whose key matches a suffix of this name's
    /// words.
    ///
    /// Candidate keys grow from the final last-name word backward through
    /// the remaining last, von, and first words. The longest registered
    /// match whose abbreviated first name agrees wins; the scan stops as
    /// soon as the candidate is no suffix of any longer key.
    pub(crate) fn resolve(&self, name: &Name) -> Option<Name> {
        let final_word = name.last.last()?;
        let mut remaining: Vec<&CompactString> = name
            .first
            .iter()
            .chain(name.von.iter())
            .chain(name.last[..name.last.len() - 1].iter())
            .collect();
        let mut candidate: WordList = smallvec![final_word.clone()];
        let mut matched: Option<&Name> = None;

        loop {
            if let Some(registered) = self.by_last.get(&candidate) {
                if first_name_agrees(&remaining, registered) {
                    matched = Some(registered);
                }
            }
            if !self.partial.contains(&candidate) {
                return matched.cloned();
            }
            match remaining.pop() {
                Some(word) => candidate.insert(0, word.clone()),
                None => return None,
            }
        }
    }
}

// Both sides are abbreviated before comparing, so an input "M." agrees
// with a registered "Manuel" and vice versa.
fn first_name_agrees(remaining: &[&CompactString], registered: &Name) -> bool {
    let mut joined = String::new();
    for word in remaining {
        if !joined.is_empty() {
            joined.push(' ');
        }
        joined.push_str(word);
    }
    abbreviate_word(&joined) == abbreviate_word(&join_words(&registered.first))
}

// A von part shaped like "{V}an der" reconstructs to the words of "Van
// der". The brace pair around the initial must be the last one matched in
// the string and the letter inside must be uppercase.
fn braced_initial_words(von: &str) -> Option<WordList> {
    if last_matched_pair(von) != Some((0, 2)) {
        return None;
    }
    let letter = von.chars().nth(1)?;
    if !letter.is_uppercase() {
        return None;
    }
    let rest = &von[2 + letter.len_utf8()..];
    let mut rebuilt = String::with_capacity(letter.len_utf8() + rest.len());
    rebuilt.push(letter);
    rebuilt.push_str(rest);
    Some(rebuilt.split_whitespace().map(CompactString::from).collect())
}

// Matching brace pairs by character position, in the order they close.
fn last_matched_pair(s: &str) -> Option<(usize, usize)> {
    let mut stack: SmallVec<[usize; 4]> = SmallVec::new();
    let mut last = None;
    for (i, c) in s.chars().enumerate() {
        match c {
            '{' => stack.push(i),
            '}' => {
                if let Some(open) = stack.pop() {
                    last = Some((open, i));
                }
            }
            _ => {}
        }
    }
    last
}
