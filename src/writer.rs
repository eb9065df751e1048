use crate::entry::{Database, Entry, Piece, Value};

// Fields listed here come first, in this order; everything else follows
// alphabetically.
const DISPLAY_ORDER: [&str; 3] = ["title", "author", "editor"];
const INDENT: &str = "  ";

pub(crate) fn to_bibtex(db: &Database, sort: bool) -> String {
    let mut out = String::new();

    for comment in &db.comments {
        out.push_str("@comment{");
        out.push_str(comment);
        out.push_str("}\n\n");
    }
    for preamble in &db.preambles {
        out.push_str("@preamble{");
        out.push_str(preamble);
        out.push_str("}\n\n");
    }

    let mut strings: Vec<&(String, Value)> = db.strings.iter().collect();
    if sort {
        strings.sort_by(|a, b| a.0.cmp(&b.0));
    }
    for (name, value) in strings {
        out.push_str("@string{");
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&render_value(value));
        out.push_str("}\n\n");
    }

    let mut entries: Vec<&Entry> = db.entries.iter().collect();
    if sort {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
    }
    for entry in entries {
        write_entry(&mut out, entry);
    }

    out
}

fn write_entry(out: &mut String, entry: &Entry) {
    out.push('@');
    out.push_str(&entry.kind);
    out.push('{');
    out.push_str(&entry.key);
    for (name, value) in ordered_fields(entry) {
        out.push_str(",\n");
        out.push_str(INDENT);
        out.push_str(name);
        out.push_str(" = ");
        out.push_str(&render_value(value));
    }
    out.push_str("\n}\n\n");
}

fn ordered_fields(entry: &Entry) -> Vec<&(String, Value)> {
    let mut ordered = Vec::with_capacity(entry.fields.len());
    for name in DISPLAY_ORDER {
        ordered.extend(entry.fields.iter().filter(|(n, _)| n.as_str() == name));
    }

    let mut rest: Vec<&(String, Value)> = entry
        .fields
        .iter()
        .filter(|(n, _)| !DISPLAY_ORDER.contains(&n.as_str()))
        .collect();
    rest.sort_by(|a, b| a.0.cmp(&b.0));

    ordered.extend(rest);
    ordered
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Text(text) => format!("{{{text}}}"),
        Value::Expression(pieces) => pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => format!("{{{text}}}"),
                Piece::Macro(name) => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(" # "),
    }
}

#[cfg(test)]
mod tests {
    use crate::entry::Database;

    #[test]
    fn entries_use_the_canonical_layout() {
        let db = Database::parse("@article{k, year = {2000}, author = {A}, title = {T}}");
        assert_eq!(
            db.to_bibtex(false),
            "@article{k,\n  title = {T},\n  author = {A},\n  year = {2000}\n}\n\n"
        );
    }

    #[test]
    fn remaining_fields_are_alphabetical() {
        let db = Database::parse("@article{k, volume = {1}, pages = {1-2}, journal = {J}}");
        assert_eq!(
            db.to_bibtex(false),
            "@article{k,\n  journal = {J},\n  pages = {1-2},\n  volume = {1}\n}\n\n"
        );
    }

    #[test]
    fn entry_without_fields_omits_the_comma() {
        let db = Database::parse("@misc{lonely}");
        assert_eq!(db.to_bibtex(false), "@misc{lonely\n}\n\n");
    }

    #[test]
    fn sorting_orders_entries_by_key_and_strings_by_name() {
        let input = "@string{zz = {Z}}\n@string{aa = {A}}\n@misc{beta, note = {b}}\n@misc{alpha, note = {a}}";
        let sorted = Database::parse(input).to_bibtex(true);

        let aa = sorted.find("@string{aa").unwrap();
        let zz = sorted.find("@string{zz").unwrap();
        let alpha = sorted.find("@misc{alpha").unwrap();
        let beta = sorted.find("@misc{beta").unwrap();
        assert!(aa < zz);
        assert!(zz < alpha);
        assert!(alpha < beta);
    }

    #[test]
    fn unsorted_output_keeps_input_order() {
        let input = "@misc{beta, note = {b}}\n@misc{alpha, note = {a}}";
        let out = Database::parse(input).to_bibtex(false);
        assert!(out.find("@misc{beta").unwrap() < out.find("@misc{alpha").unwrap());
    }

    #[test]
    fn expressions_render_with_concatenation() {
        let db = Database::parse("@inproceedings{k, series = lncs # { 4711}}");
        assert_eq!(
            db.to_bibtex(false),
            "@inproceedings{k,\n  series = lncs # { 4711}\n}\n\n"
        );
    }

    #[test]
    fn blocks_come_out_grouped_by_kind() {
        let input = "@misc{k, note = {n}}\n@comment{kept}\n@string{s = {v}}\n@preamble{\"p\"}";
        assert_eq!(
            Database::parse(input).to_bibtex(false),
            "@comment{kept}\n\n@preamble{\"p\"}\n\n@string{s = {v}}\n\n@misc{k,\n  note = {n}\n}\n\n"
        );
    }

    #[test]
    fn canonical_form_is_a_fixed_point() {
        let input = r#"
Stray text the file once held.
@string{lncs = {Lecture Notes in Computer Science}}
@article{knuth84, author = "Donald E. Knuth", title = {The {\TeX}book}, year = 1984}
@inproceedings{g, series = lncs # { 4711}, title = {T}}
"#;
        let once = Database::parse(input).to_bibtex(true);
        let again = Database::parse(&once).to_bibtex(true);
        assert_eq!(once, again);
    }
}
