#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(query) = fuzzdex::query::parse_query(data, 1) {
        assert!(!query.word.is_empty());
        let _ = query.within_recommended_bound();
    }
});
