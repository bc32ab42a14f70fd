//! Integration tests for the fuzzdex binary.
//!
//! Each test gets its own workspace and its own app data directory (via
//! `FUZZDEX_DATA_DIR`) so cached indexes never leak between tests.

use fuzzdex::index::MatchResult;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

struct Fixture {
    workspace: TempDir,
    data_dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let workspace = tempfile::tempdir().unwrap();
        let dir = workspace.path();
        // Marks the workspace root so detection never walks further up
        fs::create_dir(dir.join(".git")).unwrap();
        fs::create_dir(dir.join("notes")).unwrap();
        fs::write(dir.join("file1.txt"), "This is a test file.\n").unwrap();
        fs::write(dir.join("file2.txt"), "Another text file.\n").unwrap();
        fs::write(
            dir.join("notes/file3.txt"),
            "We are testing text files in this test of texts.\n",
        )
        .unwrap();
        fs::write(dir.join("notes/file4.txt"), "My name is Tex.\n").unwrap();

        Self {
            workspace,
            data_dir: tempfile::tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.workspace.path()
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_fuzzdex"))
            .args(args)
            .env("FUZZDEX_DATA_DIR", self.data_dir.path())
            .env_remove("FUZZDEX_BACKEND")
            .env_remove("FUZZDEX_DEFAULT_DISTANCE")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run fuzzdex")
    }

    fn search(&self, word: &str, extra: &[&str]) -> Output {
        let root = self.root().to_str().unwrap();
        let mut args = vec!["search", word, "-p", root, "--color", "never"];
        args.extend_from_slice(extra);
        self.run(&args)
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn search_builds_index_and_prints_matches() {
    let fx = Fixture::new();
    let out = fx.search("text/1", &[]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let text = stdout(&out);
    assert_eq!(text.lines().count(), 6, "output:\n{text}");
    assert!(text.contains("file1.txt:1:11:This is a test file.  [test ~1]"));
    assert!(text.contains("notes/file4.txt:1:12:My name is Tex.  [tex ~1]"));

    let blob = fs::read_dir(fx.data_dir.path().join("indexes"))
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path().join("fuzzy-index.json"))
        .find(|p| p.exists());
    assert!(blob.is_some(), "index was not persisted");
}

#[test]
fn json_output_is_one_match_per_line() {
    let fx = Fixture::new();
    let out = fx.search("test", &["--json"]);
    assert!(out.status.success());

    let results: Vec<MatchResult> = stdout(&out)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.matched_word == "test" && r.distance == 0));
    let canonical_root = fx.root().canonicalize().unwrap();
    assert!(results.iter().all(|r| r.file_path.starts_with(&canonical_root)));
}

#[test]
fn distance_flag_is_the_default_for_bare_words() {
    let fx = Fixture::new();
    let out = fx.search("text", &["-d", "1"]);
    assert_eq!(stdout(&out).lines().count(), 6);

    // An explicit suffix wins over the flag
    let out = fx.search("text/0", &["-d", "1"]);
    assert_eq!(stdout(&out).lines().count(), 2);
}

#[test]
fn no_matches_exits_with_one() {
    let fx = Fixture::new();
    let out = fx.search("zebra", &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
}

#[test]
fn negative_distance_is_rejected() {
    let fx = Fixture::new();
    let out = fx.search("text/-1", &[]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Invalid argument"), "stderr: {}", stderr(&out));
}

#[test]
fn counts_and_file_lists() {
    let fx = Fixture::new();
    let out = fx.search("text/1", &["--count"]);
    assert_eq!(
        stdout(&out),
        "file1.txt:1\nfile2.txt:1\nnotes/file3.txt:3\nnotes/file4.txt:1\n"
    );

    let out = fx.search("texts", &["-l"]);
    assert_eq!(stdout(&out), "notes/file3.txt\n");
}

#[test]
fn sorted_output_puts_exact_matches_first() {
    let fx = Fixture::new();
    let out = fx.search("text/1", &["--sort"]);
    let text = stdout(&out);
    let first_two: Vec<_> = text.lines().take(2).collect();
    assert!(first_two.iter().all(|l| l.ends_with("[text ~0]")), "output:\n{text}");
}

#[test]
fn vptree_backend_finds_the_same_matches() {
    let fx = Fixture::new();
    let trie = fx.search("text/1", &["--count"]);
    let vp = fx.search("text/1", &["--count", "--backend", "vptree"]);
    assert_eq!(stdout(&trie), stdout(&vp));
}

#[test]
fn cached_index_stays_stale_until_forced() {
    let fx = Fixture::new();
    assert!(fx.search("test", &[]).status.success());

    fs::write(fx.root().join("file5.txt"), "a brand new test\n").unwrap();
    assert_eq!(stdout(&fx.search("test", &[])).lines().count(), 2);

    let root = fx.root().to_str().unwrap();
    let out = fx.run(&["index", root, "--force"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&fx.search("test", &[])).lines().count(), 3);
}

#[test]
fn bare_word_searches() {
    let fx = Fixture::new();
    let root = fx.root().to_str().unwrap();
    let out = fx.run(&["-p", root, "texts"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).lines().count(), 1);
}

#[test]
fn bare_mode_rejects_several_words() {
    let fx = Fixture::new();
    let root = fx.root().to_str().unwrap();
    let out = fx.run(&["-p", root, "text", "file"]);
    assert!(!out.status.success());
    assert_eq!(out.status.code(), Some(1));
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("single word"), "stderr: {}", stderr(&out));
}

#[test]
fn strict_rejects_short_words_for_the_distance() {
    let fx = Fixture::new();
    // "tex" is too short for distance 2, but still runs without --strict
    let out = fx.search("tex/2", &["--count"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let out = fx.search("tex/2", &["--strict"]);
    assert!(!out.status.success());
    assert!(stdout(&out).is_empty());
    assert!(stderr(&out).contains("too short"), "stderr: {}", stderr(&out));
}

#[test]
fn list_stats_and_remove() {
    let fx = Fixture::new();
    let root = fx.root().to_str().unwrap();
    assert!(fx.run(&["index", root]).status.success());

    let canonical: PathBuf = fx.root().canonicalize().unwrap();
    let listed = stdout(&fx.run(&["list"]));
    assert!(listed.contains(&canonical.display().to_string()), "list:\n{listed}");

    let stats = stdout(&fx.run(&["stats", root]));
    assert!(stats.contains("Document count:   4"), "stats:\n{stats}");

    let removed = stdout(&fx.run(&["remove", root]));
    assert!(removed.starts_with("Removed index for:"));
    assert!(stdout(&fx.run(&["list"])).contains("No indexed workspaces found."));
}
