//! Format and check BibTeX bibliographies.
//!
//! The centerpiece is a name splitter implementing BibTeX's rules for the
//! "First von Last", "von Last, First", and "von Last, Jr, First" forms,
//! together with a formatter that abbreviates first names and keeps
//! multi-word last names intact:
//!
//! ```
//! use bibfmt::Name;
//!
//! # fn main() -> Result<(), bibfmt::InvalidName> {
//! let name = Name::parse("Ojeda Aciego, Manuel")?;
//! assert_eq!(name.last(), "Ojeda Aciego");
//! assert_eq!(name.abbreviated().display(), "M. {Ojeda Aciego}");
//! # Ok(())
//! # }
//! ```
//!
//! On top of that sit a permissive BibTeX reader, a canonical writer, and a
//! LaTeX cleanup pass, which together back the `bibfmt` command-line tool.

mod entry;
mod error;
mod formatter;
mod initials;
mod latex;
mod parse;
mod reader;
mod segment;
mod special;
mod utils;
mod writer;

#[cfg(feature = "cli")]
pub mod config;
#[cfg(feature = "serialization")]
mod serialization;

pub use crate::entry::{Database, Entry, Piece, Value};
pub use crate::error::{Error, InvalidName};
pub use crate::formatter::NameFormatter;
pub use crate::segment::Mode;
pub use crate::special::SpecialNames;

use std::borrow::Cow;
use std::fmt;

use compact_str::CompactString;
use smallvec::SmallVec;

use crate::utils::{enclosed_in_braces, join_words};

pub(crate) type WordList = SmallVec<[CompactString; 2]>;

/// A personal name split into its BibTeX parts.
///
/// Each part holds the words it consists of; any of them may be empty. The
/// empty name (all parts empty) is what blank input parses to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Name {
    pub(crate) first: WordList,
    pub(crate) von: WordList,
    pub(crate) last: WordList,
    pub(crate) jr: WordList,
}

impl Name {
    /// Splits a BibTeX name into its parts.
    ///
    /// Fails on unbalanced braces, more than two commas, or a trailing
    /// comma. The error carries the offending name.
    pub fn parse(name: &str) -> Result<Name, InvalidName> {
        parse::split(name, Mode::Strict)
    }

    /// Splits a BibTeX name, repairing malformed input instead of failing.
    ///
    /// Stray closing braces attach to the word they appear in, unclosed
    /// braces are closed at the end, surplus comma sections are folded into
    /// the jr part, and a trailing comma is dropped.
    pub fn parse_lenient(name: &str) -> Name {
        parse::split(name, Mode::Lenient).unwrap_or_default()
    }

    /// The first-name words, joined with single spaces.
    pub fn first(&self) -> Cow<'_, str> {
        join_words(&self.first)
    }

    /// The von words, joined with single spaces.
    pub fn von(&self) -> Cow<'_, str> {
        join_words(&self.von)
    }

    /// The last-name words, joined with single spaces.
    pub fn last(&self) -> Cow<'_, str> {
        join_words(&self.last)
    }

    /// The jr words, joined with single spaces.
    pub fn jr(&self) -> Cow<'_, str> {
        join_words(&self.jr)
    }

    /// True when every part is empty.
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.von.is_empty() && self.last.is_empty() && self.jr.is_empty()
    }

    /// Copy of this name with the first name abbreviated to an initial.
    ///
    /// The whole first name becomes a single word: "Juan Carlos" turns into
    /// "J.". Names of at most two characters and names opening with a
    /// control sequence are kept unchanged, so abbreviating is idempotent.
    pub fn abbreviated(&self) -> Name {
        Name {
            first: initials::abbreviate(&self.first),
            von: self.von.clone(),
            last: self.last.clone(),
            jr: self.jr.clone(),
        }
    }

    /// Renders the name back into a single BibTeX name string.
    ///
    /// A multi-word last name is wrapped in braces so it survives
    /// resplitting, and a capitalized von part has its first letter braced
    /// to keep BibTeX from counting it as part of the last name.
    pub fn display(&self) -> String {
        let first = join_words(&self.first);
        let von = protect_von(join_words(&self.von));
        let last = protect_last(join_words(&self.last));
        let jr = join_words(&self.jr);

        let mut out = String::with_capacity(first.len() + von.len() + last.len() + jr.len() + 3);
        for part in [&*first, &*von, &*last, &*jr] {
            if part.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(part);
        }
        out
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

// "Van der" must render as "{V}an der" or the whole von part would be read
// back as last-name words.
fn protect_von(von: Cow<'_, str>) -> Cow<'_, str> {
    let mut chars = von.chars();
    match (chars.next(), chars.next()) {
        (Some(head), Some(_)) if head.is_uppercase() => {
            Cow::Owned(format!("{{{head}}}{}", &von[head.len_utf8()..]))
        }
        _ => von,
    }
}

fn protect_last(last: Cow<'_, str>) -> Cow<'_, str> {
    if last.contains(' ') && !enclosed_in_braces(&last) {
        Cow::Owned(format!("{{{last}}}"))
    } else {
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn blank_name_is_empty_and_renders_empty() {
        let name = Name::parse("  ").unwrap();
        assert!(name.is_empty());
        assert_eq!(name.display(), "");
    }

    #[test]
    fn display_joins_parts_with_single_spaces() {
        let name = Name::parse("Kaminski, Roland").unwrap();
        assert_eq!(name.display(), "Roland Kaminski");
    }

    #[test]
    fn display_skips_empty_parts_without_extra_spaces() {
        let name = Name::parse("Knuth").unwrap();
        assert_eq!(name.first(), "");
        assert_eq!(name.display(), "Knuth");
    }

    #[test]
    fn multi_word_last_name_is_braced() {
        let name = Name {
            first: smallvec!["M.".into()],
            von: smallvec![],
            last: smallvec!["Ojeda".into(), "Aciego".into()],
            jr: smallvec![],
        };
        assert_eq!(name.display(), "M. {Ojeda Aciego}");
    }

    #[test]
    fn already_braced_last_name_is_not_braced_again() {
        let name = Name::parse("{Ojeda Aciego}, Manuel").unwrap();
        assert_eq!(name.display(), "Manuel {Ojeda Aciego}");
    }

    #[test]
    fn capitalized_von_gets_a_brace_shield() {
        let name = Name::parse("Van der Berg, Philippe").unwrap();
        assert_eq!(name.von(), "Van der");
        assert_eq!(name.display(), "Philippe {V}an der Berg");
    }

    #[test]
    fn lowercase_von_is_left_alone() {
        let name = Name::parse("van der Berg, Philippe").unwrap();
        assert_eq!(name.display(), "Philippe van der Berg");
    }

    #[test]
    fn jr_renders_after_the_last_name() {
        let name = Name::parse("Ford, Jr., Henry").unwrap();
        assert_eq!(name.jr(), "Jr.");
        assert_eq!(name.display(), "Henry Ford Jr.");
    }

    #[test]
    fn abbreviated_shortens_the_whole_first_name() {
        let name = Name::parse("Nieves, Juan Carlos").unwrap();
        assert_eq!(name.abbreviated().display(), "J. Nieves");
    }

    #[test]
    fn abbreviated_keeps_short_and_control_sequence_names() {
        let already = Name::parse("Kaminski, R.").unwrap();
        assert_eq!(already.abbreviated().display(), "R. Kaminski");

        let accented = Name::parse(r"Dupont, {\'E}mile").unwrap();
        assert_eq!(accented.abbreviated().display(), r"{\'E}mile Dupont");
    }

    #[test]
    fn abbreviation_is_idempotent() {
        let name = Name::parse("Kaminski, Roland").unwrap();
        let once = name.abbreviated();
        assert_eq!(once, once.abbreviated());
    }

    #[test]
    fn lenient_parse_of_invalid_name_still_produces_a_name() {
        assert!(Name::parse("Foo}").is_err());
        let repaired = Name::parse_lenient("Foo}");
        assert_eq!(repaired.last(), "{Foo}");
    }

    #[test]
    fn display_round_trips_through_parse() {
        for input in ["Roland Kaminski", "Manuel {Ojeda Aciego}", "Kaminski, Roland"] {
            let name = Name::parse(input).unwrap();
            let rendered = name.display();
            assert_eq!(Name::parse(&rendered).unwrap(), name, "{input}");
        }
    }
}
