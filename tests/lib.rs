use std::fs::File;
use std::io::{BufRead, BufReader};

use bibfmt::{Database, Mode, Name, NameFormatter, SpecialNames, Value};

#[test]
fn name_cases() {
    let file = File::open("tests/name-cases.txt").unwrap();
    let reader = BufReader::new(file);

    for line in reader.lines() {
        let line = line.unwrap();
        if line.starts_with('#') || !line.contains('|') {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        assert_eq!(fields.len(), 6, "[{line}] malformed case");
        let input = fields[0];

        let name = Name::parse(input).unwrap_or_else(|error| panic!("[{input}] {error}"));
        assert_eq!(name.first(), fields[1], "[{input}] first part");
        assert_eq!(name.von(), fields[2], "[{input}] von part");
        assert_eq!(name.last(), fields[3], "[{input}] last part");
        assert_eq!(name.jr(), fields[4], "[{input}] jr part");
        assert_eq!(
            name.abbreviated().display(),
            fields[5],
            "[{input}] rendering"
        );
    }
}

#[test]
fn formats_a_bibliography_end_to_end() {
    let input = r#"
@article{zola02,
  Author = "Émile Zola and Manuel {Ojeda Aciego}",
  Title = {Th\'eorie  des {M}odèles},
  pages = {100–200},
  Year = 2002,
}
@misc{knuth84, author = {Donald E. Knuth}, title = {The {\TeX}book}}
"#;

    let mut db = Database::parse(input);
    db.cleanup();

    let mut formatter = NameFormatter::new(SpecialNames::new(), Mode::Strict);
    formatter.learn(&db);
    formatter.format_database(&mut db);

    assert_eq!(
        db.to_bibtex(false),
        r#"@article{zola02,
  title = {Th\'eorie des {M}od{\`e}les},
  author = {{\'E}mile Zola and M. {Ojeda Aciego}},
  pages = {100-200},
  year = {2002}
}

@misc{knuth84,
  title = {The {\TeX}book},
  author = {D. Knuth}
}

"#
    );
}

#[test]
fn learned_names_guide_later_files() {
    let corpus = Database::parse("@article{a, author = {Manuel {Ojeda Aciego}}}");
    let mut incoming = Database::parse("@article{b, author = {Aciego, Manuel Ojeda}}");

    let mut formatter = NameFormatter::new(SpecialNames::new(), Mode::Strict);
    formatter.learn(&corpus);
    formatter.learn(&incoming);
    formatter.format_database(&mut incoming);

    assert_eq!(
        incoming.entries[0].get("author"),
        Some(&Value::Text("M. {Ojeda Aciego}".into()))
    );
}

#[test]
fn canonical_form_survives_a_disk_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("refs.bib");
    std::fs::write(&path, "@article{b, title = {B}}\n@article{a, title = {A}}\n").unwrap();

    let mut db = Database::from_path(&path).unwrap();
    db.cleanup();
    let canonical = db.to_bibtex(true);
    std::fs::write(&path, &canonical).unwrap();

    let again = Database::from_path(&path).unwrap().to_bibtex(true);
    assert_eq!(again, canonical);
    assert!(canonical.find("@article{a").unwrap() < canonical.find("@article{b").unwrap());
}

#[test]
fn missing_files_report_their_path() {
    let error = Database::from_path("no-such-file.bib").unwrap_err();
    assert!(error.to_string().contains("no-such-file.bib"));
}
