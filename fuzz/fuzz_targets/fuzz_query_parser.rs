#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Any string is a valid query
    let query = famdex::query::parse_query(data);

    // Stored tokens never keep their markers
    for token in query.freetext.include.iter().chain(&query.freetext.exclude) {
        assert!(!token.is_empty());
        assert!(!token.starts_with('-'));
    }
    for token in query.keywords.include.iter().chain(&query.keywords.exclude) {
        assert!(!token.is_empty());
    }

    assert_eq!(query, famdex::query::parse_query(data));
});
