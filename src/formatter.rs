use tracing::{debug, warn};

use crate::entry::{Database, Value};
use crate::error::InvalidName;
use crate::segment::Mode;
use crate::special::SpecialNames;

/// Fields holding `and`-separated name lists.
const NAME_FIELDS: [&str; 2] = ["author", "editor"];

/// Rewrites author and editor lists into their abbreviated form.
///
/// Special names take precedence over the plain parse: an override wins
/// outright, and a match in the learned table replaces the heuristic
/// first/von/last split before abbreviation.
pub struct NameFormatter {
    specials: SpecialNames,
    mode: Mode,
}

impl NameFormatter {
    pub fn new(specials: SpecialNames, mode: Mode) -> NameFormatter {
        NameFormatter { specials, mode }
    }

    /// Register every author and editor of `db` as a potential special
    /// name. Names that fail to parse are skipped.
    pub fn learn(&mut self, db: &Database) {
        for entry in &db.entries {
            for field in NAME_FIELDS {
                let text = match entry.get(field) {
                    Some(Value::Text(text)) => text,
                    _ => continue,
                };
                for name in text.replace('\n', " ").split(" and ") {
                    match crate::parse::split(name, self.mode) {
                        Ok(parsed) => self.specials.learn(&parsed),
                        Err(error) => {
                            debug!(entry = %entry.key, %error, "not learning from name")
                        }
                    }
                }
            }
        }
    }

    /// Format a single name.
    pub fn format_name(&self, name: &str) -> Result<String, InvalidName> {
        if let Some(replacement) = self.specials.override_for(name) {
            return Ok(replacement.to_string());
        }
        let parsed = crate::parse::split(name, self.mode)?;
        let resolved = self.specials.resolve(&parsed).unwrap_or(parsed);
        Ok(resolved.abbreviated().display())
    }

    /// Format an `and`-separated name list.
    pub fn format_names(&self, names: &str) -> Result<String, InvalidName> {
        let mut formatted = Vec::new();
        for name in names.replace('\n', " ").split(" and ") {
            formatted.push(self.format_name(name)?);
        }
        Ok(formatted.join(" and "))
    }

    /// Format the author and editor fields of every entry. A list that
    /// fails to parse is kept as written.
    pub fn format_database(&self, db: &mut Database) {
        for entry in &mut db.entries {
            for field in NAME_FIELDS {
                let formatted = match entry.get(field) {
                    Some(Value::Text(text)) => self.format_names(text),
                    _ => continue,
                };
                match formatted {
                    Ok(text) => entry.set(field, Value::Text(text)),
                    Err(error) => {
                        warn!(entry = %entry.key, %error, "keeping name list as written")
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Name;

    fn plain(mode: Mode) -> NameFormatter {
        NameFormatter::new(SpecialNames::new(), mode)
    }

    #[test]
    fn abbreviates_a_plain_name() {
        let formatter = plain(Mode::Strict);
        assert_eq!(formatter.format_name("Roland Kaminski").unwrap(), "R. Kaminski");
    }

    #[test]
    fn comma_form_keeps_the_von_part() {
        let formatter = plain(Mode::Strict);
        assert_eq!(
            formatter.format_name("von Neumann, John").unwrap(),
            "J. von Neumann"
        );
    }

    #[test]
    fn multi_word_last_names_get_braced() {
        let formatter = plain(Mode::Strict);
        assert_eq!(
            formatter.format_name("Ojeda Aciego, Manuel").unwrap(),
            "M. {Ojeda Aciego}"
        );
    }

    #[test]
    fn blank_names_format_to_nothing() {
        let formatter = plain(Mode::Strict);
        assert_eq!(formatter.format_name("").unwrap(), "");
        assert_eq!(formatter.format_name("   ").unwrap(), "");
    }

    #[test]
    fn strict_mode_rejects_unmatched_braces() {
        assert!(plain(Mode::Strict).format_name("Foo}").is_err());
        assert_eq!(plain(Mode::Lenient).format_name("Foo}").unwrap(), "{Foo}");
    }

    #[test]
    fn learned_names_repair_a_misattributed_split() {
        let mut specials = SpecialNames::new();
        specials.learn(&Name::parse("Manuel {Ojeda Aciego}").unwrap());
        let formatter = NameFormatter::new(specials, Mode::Strict);

        // Without the table, "Ojeda" would land in the first name.
        assert_eq!(
            formatter.format_name("Aciego, Manuel Ojeda").unwrap(),
            "M. {Ojeda Aciego}"
        );
    }

    #[test]
    fn overrides_win_over_parsing() {
        let mut specials = SpecialNames::new();
        specials.insert_override("Some Body", "S. {Body III}");
        let formatter = NameFormatter::new(specials, Mode::Strict);

        assert_eq!(formatter.format_name("{Some} Body").unwrap(), "S. {Body III}");
    }

    #[test]
    fn formats_an_and_separated_list() {
        let formatter = plain(Mode::Strict);
        assert_eq!(
            formatter
                .format_names("Roland Kaminski and Torsten Schaub")
                .unwrap(),
            "R. Kaminski and T. Schaub"
        );
    }

    #[test]
    fn newlines_in_a_list_read_as_spaces() {
        let formatter = plain(Mode::Strict);
        assert_eq!(
            formatter
                .format_names("Roland\nKaminski and Benjamin\nKaufmann")
                .unwrap(),
            "R. Kaminski and B. Kaufmann"
        );
    }

    #[test]
    fn one_bad_name_fails_the_whole_list_in_strict_mode() {
        let formatter = plain(Mode::Strict);
        assert!(formatter.format_names("Roland Kaminski and Foo}").is_err());
    }

    #[test]
    fn formatting_is_idempotent() {
        let formatter = plain(Mode::Strict);
        let once = formatter.format_name("Manuel Ojeda Aciego").unwrap();
        assert_eq!(once, "M. {Ojeda Aciego}");
        assert_eq!(formatter.format_name(&once).unwrap(), once);
    }

    #[test]
    fn database_author_and_editor_fields_are_rewritten() {
        let mut db = Database::parse(
            "@article{k, author = {Roland Kaminski and Torsten Schaub}, editor = {Martin Gebser}, title = {Untouched}}",
        );
        plain(Mode::Strict).format_database(&mut db);

        let entry = &db.entries[0];
        assert_eq!(
            entry.get("author"),
            Some(&Value::Text("R. Kaminski and T. Schaub".into()))
        );
        assert_eq!(entry.get("editor"), Some(&Value::Text("M. Gebser".into())));
        assert_eq!(entry.get("title"), Some(&Value::Text("Untouched".into())));
    }

    #[test]
    fn unparseable_lists_are_kept_as_written() {
        let mut db = Database::parse("@article{k, author = {One, Two, Three, Four}}");
        plain(Mode::Strict).format_database(&mut db);

        assert_eq!(
            db.entries[0].get("author"),
            Some(&Value::Text("One, Two, Three, Four".into()))
        );
    }

    #[test]
    fn expression_valued_fields_are_left_alone() {
        let input = "@article{k, author = people # { and More}}";
        let mut db = Database::parse(input);
        plain(Mode::Strict).format_database(&mut db);
        assert_eq!(db.to_bibtex(false), Database::parse(input).to_bibtex(false));
    }

    #[test]
    fn learning_from_a_database_feeds_resolution() {
        let db = Database::parse(
            "@article{a, author = {One, Two, Three, Four and Manuel {Ojeda Aciego}}}",
        );
        let mut formatter = plain(Mode::Strict);
        formatter.learn(&db);

        assert_eq!(
            formatter.format_name("Aciego, Manuel Ojeda").unwrap(),
            "M. {Ojeda Aciego}"
        );
    }
}
