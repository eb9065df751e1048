#![no_main]
use bibfmt::{Database, Mode, NameFormatter, SpecialNames};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let mut db = Database::parse(data);
    db.cleanup();

    let mut formatter = NameFormatter::new(SpecialNames::new(), Mode::Lenient);
    formatter.learn(&db);
    formatter.format_database(&mut db);

    let out = db.to_bibtex(true);
    Database::parse(&out);
});
