use crate::index::types::Position;

/// A normalized word together with where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOccurrence {
    pub word: String,
    pub position: Position,
}

/// Split text into lower-cased alphanumeric words, tagging each with its
/// line, index within the line, and character offset within the line.
///
/// Every character outside `[A-Za-z0-9]` acts as a separator. Because the
/// replacement is one-for-one, offsets refer equally to the raw line.
/// Runs of separators never produce empty words.
pub fn tokenize(text: &str) -> Vec<WordOccurrence> {
    let mut occurrences = Vec::with_capacity(text.len() / 6);

    for (line_idx, line) in text.split('\n').enumerate() {
        let line_number = (line_idx + 1) as u32;
        let mut word_index = 0u32;
        let mut current = String::new();
        let mut start = 0u32;

        for (char_idx, ch) in line.chars().enumerate() {
            if ch.is_ascii_alphanumeric() {
                if current.is_empty() {
                    start = char_idx as u32;
                }
                current.push(ch.to_ascii_lowercase());
            } else if !current.is_empty() {
                occurrences.push(WordOccurrence {
                    word: std::mem::take(&mut current),
                    position: Position::new(line_number, word_index, start),
                });
                word_index += 1;
            }
        }

        if !current.is_empty() {
            occurrences.push(WordOccurrence {
                word: current,
                position: Position::new(line_number, word_index, start),
            });
        }
    }

    occurrences
}

/// Normalize a single query word the same way indexed words are normalized
/// (trimmed, ASCII lower-cased).
pub fn normalize_word(word: &str) -> String {
    word.trim().to_ascii_lowercase()
}
