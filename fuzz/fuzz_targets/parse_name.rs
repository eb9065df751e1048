#![no_main]
use bibfmt::Name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let lenient = Name::parse_lenient(data);
    lenient.abbreviated().display();

    // Lenient parsing only diverges on inputs strict parsing rejects.
    if let Ok(strict) = Name::parse(data) {
        assert_eq!(strict, lenient);
    }
});
