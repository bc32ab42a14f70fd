#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let lines: Vec<&str> = data.split('\n').collect();
    for occurrence in fuzzdex::utils::tokenize(data) {
        assert!(!occurrence.word.is_empty());
        let line = lines[occurrence.position.line as usize - 1];
        let start = occurrence.position.offset as usize;
        let len = occurrence.word.chars().count();
        let original: String = line.chars().skip(start).take(len).collect();
        assert_eq!(original.to_ascii_lowercase(), occurrence.word);
    }
});
