#![no_main]

use arbitrary::Arbitrary;
use fuzzdex::index::{Document, DocumentTrie};
use fuzzdex::query::matcher::match_word;
use fuzzdex::utils::levenshtein_distance;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input<'a> {
    text: &'a str,
    query: &'a str,
    max_distance: u8,
}

fuzz_target!(|input: Input| {
    let max = (input.max_distance % 4) as usize;
    let trie = DocumentTrie::build(&Document::new(0, "f", "/f", input.text));
    for m in match_word(&trie.root, input.query, max) {
        assert_eq!(m.distance, levenshtein_distance(input.query, m.prefix));
        assert!(m.distance <= max);
    }
});
