use crate::error::{Result, SearchError};
use crate::utils::tokenizer::normalize_word;
use std::fmt;

/// A parsed fuzzy query: one word and the largest edit distance to accept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyQuery {
    pub word: String,
    pub max_distance: usize,
}

impl FuzzyQuery {
    /// Build a query from already-separated parts.
    ///
    /// The word is trimmed and lower-cased to match indexed words.
    pub fn new(word: &str, max_distance: i64) -> Result<Self> {
        let word = normalize_word(word);
        if word.is_empty() {
            return Err(SearchError::invalid_argument("query word must not be empty"));
        }
        // Indexed words never contain whitespace
        if word.chars().any(char::is_whitespace) {
            return Err(SearchError::invalid_argument(format!(
                "query must be a single word (got {word:?})"
            )));
        }
        if max_distance < 0 {
            return Err(SearchError::invalid_argument(format!(
                "max distance must not be negative (got {max_distance})"
            )));
        }
        Ok(Self {
            word,
            max_distance: max_distance as usize,
        })
    }

    /// Whether `len / 2 > max_distance` holds.
    ///
    /// Above that bound pruning stops paying off and nearly every short
    /// word matches. Not enforced; callers decide what to do.
    pub fn within_recommended_bound(&self) -> bool {
        self.word.chars().count() / 2 > self.max_distance
    }

    /// Reject the query when it breaks [`within_recommended_bound`](Self::within_recommended_bound).
    pub fn check_recommended_bound(&self) -> Result<()> {
        if self.within_recommended_bound() {
            return Ok(());
        }
        Err(SearchError::invalid_argument(format!(
            "query {:?} is too short for edit distance {}",
            self.word, self.max_distance
        )))
    }
}

impl fmt::Display for FuzzyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.word, self.max_distance)
    }
}

/// Parse `word` or `word/distance`.
///
/// The distance follows the last `/`; without one, `default_distance` is used.
pub fn parse_query(input: &str, default_distance: usize) -> Result<FuzzyQuery> {
    let input = input.trim();
    match input.rsplit_once('/') {
        Some((word, distance)) => {
            let distance = distance.trim();
            let distance: i64 = distance.parse().map_err(|_| {
                SearchError::invalid_argument(format!("invalid edit distance: {distance:?}"))
            })?;
            FuzzyQuery::new(word, distance)
        }
        None => FuzzyQuery::new(input, default_distance as i64),
    }
}
