use smallvec::SmallVec;

use crate::error::InvalidName;
use crate::segment::{split_sections, Case, Mode, Section, Sections, Word};
use crate::{Name, WordList};

/// Split a BibTeX name into its first, von, last, and jr parts.
///
/// The three accepted shapes are "First von Last", "von Last, First", and
/// "von Last, Jr, First". Whitespace-only input produces the empty name.
pub(crate) fn split(name: &str, mode: Mode) -> Result<Name, InvalidName> {
    let mut sections = split_sections(name, mode)?;

    // A trailing comma leaves an empty final section behind.
    if sections.last().map_or(false, |s| s.is_empty()) {
        if sections.len() > 1 && mode == Mode::Strict {
            return Err(InvalidName::trailing_comma(name));
        }
        sections.pop();
    }

    if sections.iter().all(|s| s.is_empty()) {
        return Ok(Name::default());
    }

    if sections.len() == 1 {
        let section = sections.pop().unwrap();
        Ok(from_single_section(section))
    } else {
        Ok(from_multiple_sections(sections))
    }
}

fn words(section: impl IntoIterator<Item = Word>) -> WordList {
    section.into_iter().map(|w| w.text).collect()
}

/// "First von Last". Without commas the von part can only be told apart
/// from an uncapitalized stretch of the last name by counting capitals.
fn from_single_section(section: Section) -> Name {
    debug_assert!(!section.is_empty());

    let mut name = Name::default();

    match section.len() {
        // One word can only be a last name.
        1 => name.last = words(section),
        2 => {
            let mut iter = section.into_iter();
            name.first = iter.by_ref().take(1).map(|w| w.text).collect();
            name.last = iter.map(|w| w.text).collect();
        }
        _ => {
            // A second word like "E." marks the end of the first name.
            if section[1].text.chars().nth(1) == Some('.') {
                let mut iter = section.into_iter();
                name.first = iter.by_ref().take(2).map(|w| w.text).collect();
                name.last = iter.map(|w| w.text).collect();
                return name;
            }

            let capitals: SmallVec<[usize; 4]> = section
                .iter()
                .enumerate()
                .filter(|(_, w)| w.case == Case::Uppercase)
                .map(|(i, _)| i)
                .collect();

            if capitals.len() > 2 {
                let third_from_last = capitals[capitals.len() - 3];
                let second_from_last = capitals[capitals.len() - 2];

                let mut iter = section.into_iter();
                name.first = iter
                    .by_ref()
                    .take(third_from_last + 1)
                    .map(|w| w.text)
                    .collect();
                name.von = iter
                    .by_ref()
                    .take(second_from_last - third_from_last - 1)
                    .map(|w| w.text)
                    .collect();
                name.last = iter.map(|w| w.text).collect();
            } else {
                let mut iter = section.into_iter();
                name.first = iter.by_ref().take(1).map(|w| w.text).collect();
                name.last = iter.map(|w| w.text).collect();
            }
        }
    }

    name
}

/// "von Last, First" or "von Last, Jr, First".
fn from_multiple_sections(mut sections: Sections) -> Name {
    debug_assert!(matches!(sections.len(), 2 | 3));

    let mut name = Name::default();

    name.first = words(sections.pop().unwrap());
    if sections.len() == 2 {
        name.jr = words(sections.pop().unwrap());
    }

    let head = sections.pop().unwrap();
    if head.len() == 1 {
        // The last name cannot be empty.
        name.last = words(head);
    } else if let Some(i) = head.iter().rposition(|w| w.case == Case::Lowercase) {
        // Von runs through the rightmost lowercase word; but when that is
        // the final word of the section, everything is last instead.
        let split = if i + 1 == head.len() { 0 } else { i + 1 };
        let mut iter = head.into_iter();
        name.von = iter.by_ref().take(split).map(|w| w.text).collect();
        name.last = iter.map(|w| w.text).collect();
    } else {
        name.last = words(head);
    }

    name
}
