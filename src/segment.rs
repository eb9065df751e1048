use compact_str::CompactString;
use smallvec::SmallVec;

use crate::error::InvalidName;

/// Word separators under BibTeX's name grammar. Ties count as whitespace.
pub(crate) const WHITESPACE: &[char] = &[' ', '~', '\r', '\n', '\t'];

/// Error-handling mode for name splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Malformed names fail with [`InvalidName`](crate::InvalidName).
    #[default]
    Strict,
    /// Malformed names are repaired: unmatched braces are balanced, surplus
    /// commas become word separators, a trailing comma is deleted.
    Lenient,
}

/// Case signal of a word, determined by its first case-bearing character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Case {
    Uppercase,
    Lowercase,
    Caseless,
}

#[derive(Debug, Clone)]
pub(crate) struct Word {
    pub text: CompactString,
    pub case: Case,
}

pub(crate) type Section = SmallVec<[Word; 4]>;
pub(crate) type Sections = SmallVec<[Section; 3]>;

/// Scanner sub-state inside a braced group. A group opened by `{\` is a
/// special character; while its leading control sequence is still consuming
/// alphabetic characters they carry no case, but the first ordinary letter
/// after it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Neutral,
    ControlSeq,
    SpecialChar,
}

#[inline]
fn case_of(c: char) -> Case {
    if c.is_uppercase() {
        Case::Uppercase
    } else {
        Case::Lowercase
    }
}

/// Split a name into comma-separated sections of whitespace-separated words,
/// assigning each word its case signal in the same pass.
///
/// Commas and whitespace inside braces are ordinary content. At most three
/// sections are produced; in lenient mode any further comma acts as a word
/// separator within the third section.
pub(crate) fn split_sections(name: &str, mode: Mode) -> Result<Sections, InvalidName> {
    let mut sections = Sections::new();
    sections.push(Section::new());

    let mut word = CompactString::default();
    let mut case = Case::Caseless;
    let mut level = 0u32;
    let mut brace_start = false;
    let mut scan = Scan::Neutral;

    let mut chars = name.chars();
    while let Some(mut c) = chars.next() {
        // An escape. The iterator lets us consume the escaped character
        // in the same step.
        if c == '\\' {
            match chars.next() {
                Some(escaped) if WHITESPACE.contains(&escaped) => {
                    // BibTeX does not allow whitespace escaping. Keep the
                    // slash and let the separator be handled as usual.
                    word.push(c);
                    c = escaped;
                }
                Some(escaped) => {
                    if brace_start {
                        // The group is a special character; an alphabetic
                        // escape opens a control sequence.
                        brace_start = false;
                        scan = if escaped.is_alphabetic() {
                            Scan::ControlSeq
                        } else {
                            Scan::SpecialChar
                        };
                    } else if case == Case::Caseless && escaped.is_alphabetic() {
                        case = case_of(escaped);
                    }
                    word.push(c);
                    word.push(escaped);
                    continue;
                }
                None => {
                    // Trailing lone backslash; keep it as a literal.
                    word.push(c);
                    break;
                }
            }
        }

        if c == '{' {
            level += 1;
            word.push(c);
            brace_start = true;
            scan = Scan::Neutral;
            continue;
        }

        // Every case below implies this.
        brace_start = false;

        if c == '}' {
            if level > 0 {
                level -= 1;
            } else if mode == Mode::Strict {
                return Err(InvalidName::unmatched_close(name));
            } else {
                let mut repaired = CompactString::from("{");
                repaired.push_str(&word);
                word = repaired;
            }
            scan = Scan::Neutral;
            word.push(c);
            continue;
        }

        // Inside a braced group everything is content; only a special
        // character can still decide the case.
        if level > 0 {
            match scan {
                Scan::ControlSeq => {
                    if !c.is_alphabetic() {
                        scan = Scan::SpecialChar;
                    }
                }
                Scan::SpecialChar => {
                    if case == Case::Caseless && c.is_alphabetic() {
                        case = case_of(c);
                    }
                }
                Scan::Neutral => {}
            }
            word.push(c);
            continue;
        }

        // End of a word; repeated separators produce no empty words.
        if c == ',' || WHITESPACE.contains(&c) {
            if !word.is_empty() {
                let text = std::mem::take(&mut word);
                sections.last_mut().unwrap().push(Word { text, case });
                case = Case::Caseless;
                scan = Scan::Neutral;
            }

            if c == ',' {
                if sections.len() < 3 {
                    sections.push(Section::new());
                } else if mode == Mode::Strict {
                    return Err(InvalidName::too_many_commas(name));
                }
            }
            continue;
        }

        word.push(c);
        if case == Case::Caseless && c.is_alphabetic() {
            case = case_of(c);
        }
    }

    if level > 0 {
        if mode == Mode::Strict {
            return Err(InvalidName::unterminated_open(name));
        }
        for _ in 0..level {
            word.push('}');
        }
    }

    if !word.is_empty() {
        sections.last_mut().unwrap().push(Word { text: word, case });
    }

    Ok(sections)
}
