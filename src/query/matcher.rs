//! Bounded edit-distance search over a trie.
//!
//! Each trie node extends the Levenshtein DP matrix by one row: the row holds
//! the cost of aligning the node's prefix against every prefix of the query.
//! A word-end node whose last cell is within the bound is a match. If no cell
//! of a row is within the bound, no descendant can be either, so the subtree
//! is pruned. Results are exact Levenshtein distances.

use crate::index::trie::TrieNode;
use crate::index::types::Position;
use std::rc::Rc;

/// A word-end node within the requested distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieMatch<'a> {
    pub prefix: &'a str,
    pub positions: &'a [Position],
    pub distance: usize,
}

/// DP row for the empty prefix: `0, 1, ..., |query|`
fn first_row(query: &[char]) -> Vec<usize> {
    (0..=query.len()).collect()
}

/// Compute the row for `letter` from its parent's row.
/// Returns the row and its minimum cell.
fn next_row(query: &[char], letter: char, previous_row: &[usize]) -> (Vec<usize>, usize) {
    let mut current_row = Vec::with_capacity(previous_row.len());
    current_row.push(previous_row[0] + 1);
    let mut row_min = current_row[0];

    for i in 1..previous_row.len() {
        let cost = if query[i - 1] == letter {
            previous_row[i - 1]
        } else {
            1 + current_row[i - 1]
                .min(previous_row[i])
                .min(previous_row[i - 1])
        };
        row_min = row_min.min(cost);
        current_row.push(cost);
    }

    (current_row, row_min)
}

/// Search the subtree rooted at `child` (a direct child of a trie root),
/// appending matches to `out` in pre-order.
///
/// Traversal uses an explicit stack so very long indexed words cannot
/// exhaust the call stack. Sibling subtrees share their parent's row.
fn match_child<'a>(
    child: &'a TrieNode,
    query: &[char],
    max_distance: usize,
    previous_row: &[usize],
    out: &mut Vec<TrieMatch<'a>>,
) {
    let mut stack: Vec<(&'a TrieNode, Rc<Vec<usize>>)> =
        vec![(child, Rc::new(previous_row.to_vec()))];

    while let Some((node, parent_row)) = stack.pop() {
        // Only the root lacks a letter and it is never pushed
        let Some(letter) = node.letter else { continue };

        let (current_row, row_min) = next_row(query, letter, &parent_row);
        let last = current_row[current_row.len() - 1];

        if last <= max_distance && node.end_of_word {
            out.push(TrieMatch {
                prefix: &node.prefix,
                positions: &node.positions,
                distance: last,
            });
        }

        if row_min <= max_distance && !node.children.is_empty() {
            let row = Rc::new(current_row);
            // Reverse so the smallest letter is popped first (pre-order)
            for grandchild in node.children.values().rev() {
                stack.push((grandchild, Rc::clone(&row)));
            }
        }
    }
}

/// All indexed words in `root`'s trie within `max_distance` of `query`,
/// in trie traversal order.
pub fn match_word<'a>(root: &'a TrieNode, query: &str, max_distance: usize) -> Vec<TrieMatch<'a>> {
    let query: Vec<char> = query.chars().collect();
    let row = first_row(&query);
    let mut out = Vec::new();

    // An empty query matches only an empty word, which can only live on the root
    if query.is_empty() {
        if root.end_of_word {
            out.push(TrieMatch {
                prefix: &root.prefix,
                positions: &root.positions,
                distance: 0,
            });
        }
        return out;
    }

    if root.end_of_word && query.len() <= max_distance {
        out.push(TrieMatch {
            prefix: &root.prefix,
            positions: &root.positions,
            distance: query.len(),
        });
    }

    for child in root.children.values() {
        match_child(child, &query, max_distance, &row, &mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::trie::DocumentTrie;
    use crate::index::types::Document;
    use crate::utils::levenshtein::levenshtein_distance;

    fn trie(contents: &str) -> DocumentTrie {
        DocumentTrie::build(&Document::new(1, "f", "/f", contents))
    }

    fn matched(root: &TrieNode, query: &str, d: usize) -> Vec<(String, usize)> {
        match_word(root, query, d)
            .into_iter()
            .map(|m| (m.prefix.to_string(), m.distance))
            .collect()
    }

    #[test]
    fn test_exact_match() {
        let t = trie("This is a test file.");
        assert_eq!(matched(&t.root, "test", 0), vec![("test".to_string(), 0)]);
    }

    #[test]
    fn test_distance_one_variants() {
        let t = trie("We are testing text files in this test of texts.");
        let got = matched(&t.root, "text", 1);
        assert_eq!(
            got,
            vec![
                ("test".to_string(), 1),
                ("text".to_string(), 0),
                ("texts".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_positions_are_carried() {
        let t = trie("test\nthe test again");
        let matches = match_word(&t.root, "test", 0);
        assert_eq!(matches.len(), 1);
        assert_eq!(
            matches[0].positions,
            &[Position::new(1, 0, 0), Position::new(2, 1, 4)]
        );
    }

    #[test]
    fn test_query_longer_than_any_word_with_zero_distance() {
        let t = trie("a ab abc");
        assert!(match_word(&t.root, "abcdefgh", 0).is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let t = trie("a bb ccc I x");
        for d in 0..4 {
            assert!(match_word(&t.root, "", d).is_empty(), "distance {d}");
        }
    }

    #[test]
    fn test_empty_trie() {
        let t = trie("");
        assert!(match_word(&t.root, "anything", 3).is_empty());
    }

    #[test]
    fn test_root_word_end_matches_empty_query() {
        let mut root = TrieNode::root();
        root.insert("", Position::new(1, 0, 0));
        root.insert("a", Position::new(1, 1, 1));
        let matches = match_word(&root, "", 2);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].prefix, "");
        assert_eq!(matches[0].distance, 0);
    }

    #[test]
    fn test_distances_match_reference() {
        let t = trie("kitten sitting mitten fitting knitting bitten sit kit");
        for query in ["kitten", "sitting", "kit", "zzz"] {
            for d in 0..4 {
                for m in match_word(&t.root, query, d) {
                    assert_eq!(m.distance, levenshtein_distance(query, m.prefix));
                    assert!(m.distance <= d);
                }
            }
        }
    }

    #[test]
    fn test_long_word_does_not_overflow() {
        let long: String = std::iter::repeat('a').take(5_000).collect();
        let t = trie(&long);
        let matches = match_word(&t.root, &long[..10], 0);
        assert!(matches.is_empty());
        let matches = match_word(&t.root, "a", 1);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_next_row_substitution() {
        let query: Vec<char> = "ab".chars().collect();
        let row = first_row(&query);
        let (r, min) = next_row(&query, 'x', &row);
        assert_eq!(r, vec![1, 1, 2]);
        assert_eq!(min, 1);
        let (r, min) = next_row(&query, 'a', &row);
        assert_eq!(r, vec![1, 0, 1]);
        assert_eq!(min, 0);
    }
}
