//! Output formatting for fuzzy search results

use crate::index::types::MatchResult;
use crate::query::executor::QueryResponse;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use termcolor::{Color, ColorSpec, WriteColor};

/// Source lines of matched files, read once per file
#[derive(Default)]
pub struct LineCache {
    files: HashMap<PathBuf, Option<Vec<String>>>,
}

impl LineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The 1-based `line` of `path`, or None if the file can no longer be read
    pub fn line(&mut self, path: &Path, line: u32) -> Option<&str> {
        let lines = self.files.entry(path.to_path_buf()).or_insert_with(|| {
            std::fs::read_to_string(path)
                .ok()
                .map(|text| text.split('\n').map(|l| l.trim_end_matches('\r').to_string()).collect())
        });
        lines
            .as_ref()?
            .get((line as usize).checked_sub(1)?)
            .map(String::as_str)
    }
}

/// Byte range of `char_len` characters starting at char `offset`
fn char_span(text: &str, offset: usize, char_len: usize) -> Option<(usize, usize)> {
    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let start = indices.nth(offset)?;
    let end = if char_len == 0 {
        start
    } else {
        indices.nth(char_len - 1)?
    };
    Some((start, end))
}

/// Print matches as `file:line:col:text` with the matched word highlighted
/// and its edit distance appended.
pub fn print_matches<W: WriteColor>(
    out: &mut W,
    matches: &[MatchResult],
    lines: &mut LineCache,
) -> io::Result<()> {
    for m in matches {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", m.filename)?;
        out.reset()?;
        write!(out, ":")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{}", m.position.line)?;
        out.reset()?;
        write!(out, ":{}:", m.position.offset + 1)?;

        let word_len = m.matched_word.chars().count();
        match lines.line(&m.file_path, m.position.line) {
            Some(text) => match char_span(text, m.position.offset as usize, word_len) {
                Some((start, end)) => {
                    write!(out, "{}", &text[..start])?;
                    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                    write!(out, "{}", &text[start..end])?;
                    out.reset()?;
                    write!(out, "{}", &text[end..])?;
                }
                None => write!(out, "{}", text)?,
            },
            None => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
                write!(out, "{}", m.matched_word)?;
                out.reset()?;
            }
        }

        out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        writeln!(out, "  [{} ~{}]", m.matched_word, m.distance)?;
        out.reset()?;
    }

    Ok(())
}

/// One JSON object per match, one per line
pub fn print_json_lines<W: Write>(out: &mut W, matches: &[MatchResult]) -> io::Result<()> {
    for m in matches {
        serde_json::to_writer(&mut *out, m)?;
        writeln!(out)?;
    }
    Ok(())
}

/// Print only filenames (for -l flag)
pub fn print_files_only<W: WriteColor>(out: &mut W, matches: &[MatchResult]) -> io::Result<()> {
    let mut seen = std::collections::HashSet::new();
    for m in matches {
        if seen.insert(m.filename.as_str()) {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
            writeln!(out, "{}", m.filename)?;
            out.reset()?;
        }
    }
    Ok(())
}

/// Print match count per file (for -c flag)
pub fn print_match_counts<W: WriteColor>(out: &mut W, matches: &[MatchResult]) -> io::Result<()> {
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for m in matches {
        *counts.entry(m.filename.as_str()).or_insert(0) += 1;
    }

    for (filename, count) in counts {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", filename)?;
        out.reset()?;
        write!(out, ":")?;
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(out, "{}", count)?;
        out.reset()?;
    }
    Ok(())
}

/// `N matches in M documents (T ms)`
pub fn summary_line(response: &QueryResponse) -> String {
    format!(
        "{} matches in {} documents ({:.2}ms)",
        response.match_count,
        response.corpus_size,
        response.duration.as_secs_f64() * 1000.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::Position;
    use std::time::Duration;
    use termcolor::Buffer;

    fn result(filename: &str, path: &Path, word: &str, distance: usize, pos: Position) -> MatchResult {
        MatchResult {
            filename: filename.to_string(),
            file_path: path.to_path_buf(),
            matched_word: word.to_string(),
            distance,
            position: pos,
        }
    }

    fn text(buf: Buffer) -> String {
        String::from_utf8(buf.into_inner()).unwrap()
    }

    #[test]
    fn test_char_span() {
        assert_eq!(char_span("a test", 2, 4), Some((2, 6)));
        assert_eq!(char_span("é test", 2, 4), Some((3, 7)));
        assert_eq!(char_span("short", 3, 9), None);
    }

    #[test]
    fn test_print_matches_with_line_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "first line\nThis is a Test file.\n").unwrap();

        let mut buf = Buffer::no_color();
        let matches = vec![result("a.txt", &path, "test", 1, Position::new(2, 3, 10))];
        print_matches(&mut buf, &matches, &mut LineCache::new()).unwrap();
        assert_eq!(text(buf), "a.txt:2:11:This is a Test file.  [test ~1]\n");
    }

    #[test]
    fn test_print_matches_missing_file() {
        let mut buf = Buffer::no_color();
        let matches = vec![result("gone.txt", Path::new("/nope/gone.txt"), "tex", 1, Position::new(1, 3, 11))];
        print_matches(&mut buf, &matches, &mut LineCache::new()).unwrap();
        assert_eq!(text(buf), "gone.txt:1:12:tex  [tex ~1]\n");
    }

    #[test]
    fn test_json_lines() {
        let mut out = Vec::new();
        let matches = vec![
            result("a", Path::new("/w/a"), "text", 0, Position::new(1, 0, 0)),
            result("b", Path::new("/w/b"), "test", 1, Position::new(3, 2, 5)),
        ];
        print_json_lines(&mut out, &matches).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: MatchResult = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second, matches[1]);
    }

    #[test]
    fn test_counts_and_files() {
        let matches = vec![
            result("b", Path::new("/w/b"), "x", 0, Position::new(1, 0, 0)),
            result("a", Path::new("/w/a"), "x", 0, Position::new(1, 0, 0)),
            result("b", Path::new("/w/b"), "x", 0, Position::new(2, 0, 0)),
        ];
        let mut buf = Buffer::no_color();
        print_match_counts(&mut buf, &matches).unwrap();
        assert_eq!(text(buf), "a:1\nb:2\n");

        let mut buf = Buffer::no_color();
        print_files_only(&mut buf, &matches).unwrap();
        assert_eq!(text(buf), "b\na\n");
    }

    #[test]
    fn test_summary_line() {
        let response = QueryResponse {
            match_count: 6,
            corpus_size: 4,
            duration: Duration::from_micros(1500),
            results: Vec::new(),
        };
        assert_eq!(summary_line(&response), "6 matches in 4 documents (1.50ms)");
    }
}
